// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Remediation messages for failed blocking rules.
//
// Every blocking rule maps to exactly one fixed, plain-English next action.
// The strings are stable: downstream tooling keys off them, so wording
// changes here are breaking changes to the API contract.

/// The five blocking eligibility rules, in evaluation (and reporting) order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockingRule {
    /// Document expiry must clear the minimum-validity window.
    ValidityWindow,
    /// Applicant must meet the minimum age, inclusive.
    MinimumAge,
    /// Nationality allow/deny policy; deny list is authoritative.
    NationalityPolicy,
    /// Visa-type allow/deny policy, same precedence as nationality.
    VisaTypePolicy,
    /// Every MRZ check digit must pass when the policy requires it.
    MrzChecksum,
}

impl BlockingRule {
    /// Stable check id used in `CheckResult::id`.
    pub fn id(&self) -> &'static str {
        match self {
            Self::ValidityWindow => "validityWindow",
            Self::MinimumAge => "minimumAge",
            Self::NationalityPolicy => "nationalityPolicy",
            Self::VisaTypePolicy => "visaTypePolicy",
            Self::MrzChecksum => "mrzChecksum",
        }
    }

    /// The fixed remediation shown when this rule fails.
    pub fn next_action(&self) -> &'static str {
        match self {
            Self::ValidityWindow => {
                "Resubmit a document with more remaining validity."
            }
            Self::MinimumAge => {
                "Verify the applicant's date of birth; the minimum age requirement is not met."
            }
            Self::NationalityPolicy => {
                "Confirm the applicant's nationality against the programme's nationality policy."
            }
            Self::VisaTypePolicy => {
                "Choose a visa type permitted by the policy and resubmit."
            }
            Self::MrzChecksum => {
                "Request a clearer capture of the document or escalate to manual review."
            }
        }
    }
}
