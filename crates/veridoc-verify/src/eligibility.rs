// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Eligibility rule evaluation.
//
// Blocking rules run in a fixed order and any failure makes the applicant
// ineligible; advisory rules compare applicant-declared data against the
// extracted record and are recorded without ever blocking on their own.
// Rules that cannot establish their requirement (missing expiry, no usable
// birth date, absent MRZ under a checksum requirement) fail rather than
// pass vacuously.

use chrono::{Months, NaiveDate};

use veridoc_core::policy::Policy;
use veridoc_core::remediation::BlockingRule;
use veridoc_core::types::{
    Applicant, CanonicalField, CanonicalRecord, CheckResult, EligibilityResult, Severity,
};

/// The checks produced by one evaluation plus the derived verdict.
#[derive(Debug, Clone)]
pub struct EligibilityOutcome {
    pub checks: Vec<CheckResult>,
    pub result: EligibilityResult,
}

/// Evaluate `policy` against the canonical record and applicant-declared
/// data. `today` anchors the validity window and age computation.
pub fn evaluate(
    record: &CanonicalRecord,
    applicant: &Applicant,
    policy: &Policy,
    today: NaiveDate,
) -> EligibilityOutcome {
    let mut checks = Vec::new();
    let mut reasons = Vec::new();
    let mut next_actions = Vec::new();

    let mut blocking = |rule: BlockingRule,
                        description: String,
                        passed: bool,
                        details: Option<String>| {
        if !passed {
            reasons.push(description.clone());
            next_actions.push(rule.next_action().to_owned());
        }
        checks.push(CheckResult {
            id: rule.id().to_owned(),
            description,
            passed,
            severity: Severity::Blocking,
            details,
        });
    };

    // 1. Validity window.
    let required_until = today
        .checked_add_months(Months::new(policy.min_passport_validity_months))
        .unwrap_or(NaiveDate::MAX);
    match parsed_date(record.value(CanonicalField::DateOfExpiry)) {
        Some(expiry) => blocking(
            BlockingRule::ValidityWindow,
            format!(
                "Document retains at least {} months of validity",
                policy.min_passport_validity_months
            ),
            expiry >= required_until,
            Some(format!("expires {expiry}, required through {required_until}")),
        ),
        None => blocking(
            BlockingRule::ValidityWindow,
            format!(
                "Document retains at least {} months of validity",
                policy.min_passport_validity_months
            ),
            false,
            Some("date of expiry not extracted".into()),
        ),
    }

    // 2. Minimum age; canonical birth date with applicant-declared fallback.
    let birth = parsed_date(record.value(CanonicalField::DateOfBirth))
        .or_else(|| parsed_date(Some(&applicant.dob)));
    let age = birth.and_then(|b| today.years_since(b));
    blocking(
        BlockingRule::MinimumAge,
        format!(
            "Applicant is at least {} years old",
            policy.min_applicant_age_years
        ),
        age.is_some_and(|a| a >= policy.min_applicant_age_years),
        match age {
            Some(a) => Some(format!("computed age {a}")),
            None => Some("no usable date of birth".into()),
        },
    );

    // 3. Nationality allow/deny. Deny list is authoritative.
    let nationality = record.value(CanonicalField::Nationality).map(norm_code);
    blocking(
        BlockingRule::NationalityPolicy,
        "Nationality satisfies the allow/deny policy".into(),
        allow_deny_pass(
            nationality.as_deref(),
            &policy.allowed_nationalities,
            &policy.disallowed_nationalities,
        ),
        nationality
            .clone()
            .or_else(|| Some("nationality not extracted".into())),
    );

    // 4. Visa type, identical precedence.
    let visa = applicant.intended_visa_type.as_deref().map(norm_code);
    blocking(
        BlockingRule::VisaTypePolicy,
        "Intended visa type satisfies the allow/deny policy".into(),
        allow_deny_pass(
            visa.as_deref(),
            &policy.allowed_visa_types,
            &policy.disallowed_visa_types,
        ),
        visa.clone()
            .or_else(|| Some("no intended visa type declared".into())),
    );

    // 5. MRZ checksum requirement. An absent MRZ fails: an unreadable
    // document must not bypass the strongest control.
    if policy.require_mrz_checksum_pass {
        let (passed, details) = match &record.mrz {
            Some(block) => {
                let failing = block.checks.iter().filter(|c| !c.passed).count();
                (failing == 0, format!("{failing} failing check digit(s)"))
            }
            None => (false, "no MRZ block extracted".into()),
        };
        blocking(
            BlockingRule::MrzChecksum,
            "All MRZ check digits pass".into(),
            passed,
            Some(details),
        );
    }

    // Advisory comparisons, only for values the applicant declared.
    if let Some(declared) = &applicant.passport_number {
        checks.push(advisory_match(
            "passportNumberMatch",
            "Declared passport number matches the extracted document number",
            Some(norm_document_number(declared)),
            record
                .value(CanonicalField::DocumentNumber)
                .map(norm_document_number),
        ));
    }
    if let Some(declared) = &applicant.nationality {
        checks.push(advisory_match(
            "nationalityMatch",
            "Declared nationality matches the extracted nationality",
            Some(norm_code(declared)),
            record.value(CanonicalField::Nationality).map(norm_code),
        ));
    }
    checks.push(advisory_match(
        "dobMatch",
        "Declared date of birth matches the extracted date of birth",
        parsed_date(Some(&applicant.dob)).map(|d| d.to_string()),
        parsed_date(record.value(CanonicalField::DateOfBirth)).map(|d| d.to_string()),
    ));

    let eligible = checks
        .iter()
        .filter(|c| c.severity == Severity::Blocking)
        .all(|c| c.passed);

    EligibilityOutcome {
        checks,
        result: EligibilityResult {
            eligible,
            reasons,
            next_actions,
        },
    }
}

/// Allow/deny membership test with the deny list authoritative.
///
/// A missing value is not a member of anything: it passes only when the
/// allow list is empty.
fn allow_deny_pass(
    value: Option<&str>,
    allowed: &std::collections::BTreeSet<String>,
    disallowed: &std::collections::BTreeSet<String>,
) -> bool {
    let member_of = |set: &std::collections::BTreeSet<String>| {
        value.is_some_and(|v| set.iter().any(|entry| norm_code(entry) == v))
    };
    if !disallowed.is_empty() && member_of(disallowed) {
        return false;
    }
    if !allowed.is_empty() && !member_of(allowed) {
        return false;
    }
    true
}

fn advisory_match(
    id: &str,
    description: &str,
    declared: Option<String>,
    extracted: Option<String>,
) -> CheckResult {
    let (passed, details) = match (&declared, &extracted) {
        (Some(d), Some(e)) if d == e => (true, None),
        (Some(d), Some(e)) => (false, Some(format!("declared {d}, extracted {e}"))),
        (Some(_), None) => (false, Some("no extracted value to compare".into())),
        (None, _) => (false, Some("declared value is not usable".into())),
    };
    CheckResult {
        id: id.to_owned(),
        description: description.to_owned(),
        passed,
        severity: Severity::Advisory,
        details,
    }
}

fn parsed_date(value: Option<&str>) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value?.trim(), "%Y-%m-%d").ok()
}

fn norm_code(code: &str) -> String {
    code.trim().to_uppercase()
}

/// Uppercase, non-alphanumerics stripped — document numbers are compared
/// ignoring separators and case.
fn norm_document_number(number: &str) -> String {
    number
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_uppercase()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use veridoc_core::types::{FusedField, MrzBlock};

    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 28).unwrap()
    }

    fn applicant() -> Applicant {
        Applicant {
            name: "Anna Maria Eriksson".into(),
            dob: "1974-08-12".into(),
            passport_number: None,
            nationality: None,
            intended_visa_type: None,
        }
    }

    fn record_with(fields: &[(CanonicalField, &str)], mrz_pass: Option<bool>) -> CanonicalRecord {
        let mut record = CanonicalRecord::default();
        for (index, (name, value)) in fields.iter().enumerate() {
            record.fields.insert(
                *name,
                FusedField {
                    value: (*value).to_owned(),
                    confidence: 0.9,
                    source_index: index,
                },
            );
        }
        if let Some(passed) = mrz_pass {
            record.mrz = Some(MrzBlock {
                raw: "RAW".into(),
                checks: vec![CheckResult {
                    id: "compositeCheck".into(),
                    description: "MRZ composite check digit".into(),
                    passed,
                    severity: Severity::Advisory,
                    details: None,
                }],
            });
        }
        record
    }

    fn eligible_record() -> CanonicalRecord {
        record_with(
            &[
                (CanonicalField::DateOfExpiry, "2031-01-01"),
                (CanonicalField::DateOfBirth, "1974-08-12"),
                (CanonicalField::Nationality, "UTO"),
            ],
            Some(true),
        )
    }

    fn check<'a>(outcome: &'a EligibilityOutcome, id: &str) -> &'a CheckResult {
        outcome
            .checks
            .iter()
            .find(|c| c.id == id)
            .unwrap_or_else(|| panic!("missing check {id}"))
    }

    #[test]
    fn clean_record_under_default_policy_is_eligible() {
        let outcome = evaluate(&eligible_record(), &applicant(), &Policy::default(), today());
        assert!(outcome.result.eligible, "{:?}", outcome.result.reasons);
        assert!(outcome.result.reasons.is_empty());
        assert!(outcome.result.next_actions.is_empty());
    }

    #[test]
    fn expiry_inside_the_window_fails_validity() {
        let mut record = eligible_record();
        record.fields.get_mut(&CanonicalField::DateOfExpiry).unwrap().value =
            "2026-10-01".into(); // ~1 month out, policy wants 6
        let outcome = evaluate(&record, &applicant(), &Policy::default(), today());
        assert!(!outcome.result.eligible);
        assert!(!check(&outcome, "validityWindow").passed);
        assert_eq!(
            outcome.result.next_actions,
            vec!["Resubmit a document with more remaining validity."]
        );
    }

    #[test]
    fn missing_expiry_fails_validity() {
        let mut record = eligible_record();
        record.fields.remove(&CanonicalField::DateOfExpiry);
        let outcome = evaluate(&record, &applicant(), &Policy::default(), today());
        assert!(!check(&outcome, "validityWindow").passed);
    }

    #[test]
    fn age_boundary_is_inclusive() {
        let mut record = eligible_record();
        // Exactly 18 today.
        record.fields.get_mut(&CanonicalField::DateOfBirth).unwrap().value =
            "2008-08-28".into();
        let outcome = evaluate(&record, &applicant(), &Policy::default(), today());
        assert!(check(&outcome, "minimumAge").passed);

        // One day short of 18.
        record.fields.get_mut(&CanonicalField::DateOfBirth).unwrap().value =
            "2008-08-29".into();
        let outcome = evaluate(&record, &applicant(), &Policy::default(), today());
        assert!(!check(&outcome, "minimumAge").passed);
    }

    #[test]
    fn applicant_dob_is_the_fallback_for_age() {
        let mut record = eligible_record();
        record.fields.remove(&CanonicalField::DateOfBirth);
        let mut applicant = applicant();
        applicant.dob = "2010-01-01".into();
        let outcome = evaluate(&record, &applicant, &Policy::default(), today());
        assert!(!check(&outcome, "minimumAge").passed);
    }

    #[test]
    fn deny_list_is_authoritative_over_allow_list() {
        let policy = Policy {
            allowed_nationalities: BTreeSet::from(["UTO".to_owned()]),
            disallowed_nationalities: BTreeSet::from(["UTO".to_owned()]),
            ..Policy::default()
        };
        let outcome = evaluate(&eligible_record(), &applicant(), &policy, today());
        assert!(!outcome.result.eligible);
        assert!(!check(&outcome, "nationalityPolicy").passed);
    }

    #[test]
    fn allow_list_excludes_non_members() {
        let policy = Policy {
            allowed_nationalities: BTreeSet::from(["XXA".to_owned()]),
            ..Policy::default()
        };
        let outcome = evaluate(&eligible_record(), &applicant(), &policy, today());
        assert!(!check(&outcome, "nationalityPolicy").passed);
    }

    #[test]
    fn nationality_codes_match_case_insensitively() {
        let policy = Policy {
            allowed_nationalities: BTreeSet::from(["uto".to_owned()]),
            ..Policy::default()
        };
        let outcome = evaluate(&eligible_record(), &applicant(), &policy, today());
        assert!(check(&outcome, "nationalityPolicy").passed);
    }

    #[test]
    fn visa_type_precedence_mirrors_nationality() {
        let policy = Policy {
            allowed_visa_types: BTreeSet::from(["WORK".to_owned()]),
            disallowed_visa_types: BTreeSet::from(["WORK".to_owned()]),
            ..Policy::default()
        };
        let mut applicant = applicant();
        applicant.intended_visa_type = Some("work".into());
        let outcome = evaluate(&eligible_record(), &applicant, &policy, today());
        assert!(!check(&outcome, "visaTypePolicy").passed);
    }

    #[test]
    fn one_failing_check_digit_fails_the_checksum_rule() {
        let record = record_with(
            &[
                (CanonicalField::DateOfExpiry, "2031-01-01"),
                (CanonicalField::DateOfBirth, "1974-08-12"),
            ],
            Some(false),
        );
        let outcome = evaluate(&record, &applicant(), &Policy::default(), today());
        assert!(!outcome.result.eligible);
        assert!(!check(&outcome, "mrzChecksum").passed);
        assert!(
            outcome
                .result
                .reasons
                .iter()
                .any(|r| r.contains("MRZ check digits")),
            "reasons must include an MRZ-related entry: {:?}",
            outcome.result.reasons
        );
    }

    #[test]
    fn absent_mrz_fails_the_checksum_rule_when_required() {
        let record = record_with(&[(CanonicalField::DateOfExpiry, "2031-01-01")], None);
        let outcome = evaluate(&record, &applicant(), &Policy::default(), today());
        assert!(!check(&outcome, "mrzChecksum").passed);
    }

    #[test]
    fn checksum_rule_is_skipped_when_not_required() {
        let policy = Policy {
            require_mrz_checksum_pass: false,
            ..Policy::default()
        };
        let record = record_with(&[(CanonicalField::DateOfExpiry, "2031-01-01")], None);
        let outcome = evaluate(&record, &applicant(), &policy, today());
        assert!(!outcome.checks.iter().any(|c| c.id == "mrzChecksum"));
    }

    #[test]
    fn reasons_follow_rule_table_order() {
        let record = CanonicalRecord::default();
        let mut applicant = applicant();
        applicant.dob = "2020-01-01".into();
        let outcome = evaluate(&record, &applicant, &Policy::default(), today());
        assert_eq!(outcome.result.reasons.len(), 3);
        assert!(outcome.result.reasons[0].contains("validity"));
        assert!(outcome.result.reasons[1].contains("years old"));
        assert!(outcome.result.reasons[2].contains("MRZ check digits"));
        assert_eq!(outcome.result.next_actions.len(), 3);
    }

    #[test]
    fn advisory_mismatch_never_blocks() {
        let mut applicant = applicant();
        applicant.passport_number = Some("X-999".into());
        let outcome = evaluate(&eligible_record(), &applicant, &Policy::default(), today());
        let advisory = check(&outcome, "passportNumberMatch");
        assert!(!advisory.passed);
        assert_eq!(advisory.severity, Severity::Advisory);
        assert!(outcome.result.eligible);
    }

    #[test]
    fn passport_numbers_compare_ignoring_separators_and_case() {
        let mut record = eligible_record();
        record.fields.insert(
            CanonicalField::DocumentNumber,
            FusedField {
                value: "L898902C3".into(),
                confidence: 0.9,
                source_index: 0,
            },
        );
        let mut applicant = applicant();
        applicant.passport_number = Some("l898-902-c3".into());
        let outcome = evaluate(&record, &applicant, &Policy::default(), today());
        assert!(check(&outcome, "passportNumberMatch").passed);
    }

    #[test]
    fn dob_advisory_compares_parsed_dates() {
        let outcome = evaluate(&eligible_record(), &applicant(), &Policy::default(), today());
        assert!(check(&outcome, "dobMatch").passed);
    }

    #[test]
    fn check_ids_are_unique_within_one_evaluation() {
        let mut applicant = applicant();
        applicant.passport_number = Some("L898902C3".into());
        applicant.nationality = Some("UTO".into());
        let outcome = evaluate(&eligible_record(), &applicant, &Policy::default(), today());
        let mut ids: Vec<&str> = outcome.checks.iter().map(|c| c.id.as_str()).collect();
        ids.sort_unstable();
        let len = ids.len();
        ids.dedup();
        assert_eq!(ids.len(), len);
    }
}
