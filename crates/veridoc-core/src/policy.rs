// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Eligibility policy configuration.
//
// An explicit immutable value passed into the rule evaluator — never
// module-level state. Every field has a default so callers can omit any
// subset (or the whole policy) from the request.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Eligibility policy applied to the canonical record.
///
/// Allow/deny sets are matched on uppercased, trimmed codes; the deny list
/// is always authoritative over the allow list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Policy {
    /// Minimum document validity remaining, counted from today.
    pub min_passport_validity_months: u32,
    /// Minimum applicant age in whole years, inclusive boundary.
    pub min_applicant_age_years: u32,
    pub allowed_nationalities: BTreeSet<String>,
    pub disallowed_nationalities: BTreeSet<String>,
    pub allowed_visa_types: BTreeSet<String>,
    pub disallowed_visa_types: BTreeSet<String>,
    /// When true, every MRZ check digit on the canonical block must pass.
    pub require_mrz_checksum_pass: bool,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            min_passport_validity_months: 6,
            min_applicant_age_years: 18,
            allowed_nationalities: BTreeSet::new(),
            disallowed_nationalities: BTreeSet::new(),
            allowed_visa_types: BTreeSet::new(),
            disallowed_visa_types: BTreeSet::new(),
            require_mrz_checksum_pass: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let policy = Policy::default();
        assert_eq!(policy.min_passport_validity_months, 6);
        assert_eq!(policy.min_applicant_age_years, 18);
        assert!(policy.allowed_nationalities.is_empty());
        assert!(policy.require_mrz_checksum_pass);
    }

    #[test]
    fn omitted_fields_take_defaults() {
        let policy: Policy =
            serde_json::from_str(r#"{"minApplicantAgeYears": 21}"#).unwrap();
        assert_eq!(policy.min_applicant_age_years, 21);
        assert_eq!(policy.min_passport_validity_months, 6);
        assert!(policy.require_mrz_checksum_pass);
    }

    #[test]
    fn empty_object_is_the_default_policy() {
        let policy: Policy = serde_json::from_str("{}").unwrap();
        assert_eq!(policy, Policy::default());
    }
}
