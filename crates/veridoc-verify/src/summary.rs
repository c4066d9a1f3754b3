// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Confidence scoring and summary synthesis.
//
// Both functions are pure: identical inputs always yield identical output.

use veridoc_core::types::{
    Applicant, CanonicalField, CanonicalRecord, CheckResult, EligibilityResult, Severity,
    Summary,
};

/// Confidence ceiling applied when no MRZ block was extracted. Identity
/// fields without a validated MRZ have categorically lower trust, whatever
/// the per-field OCR confidence says.
const NO_MRZ_CONFIDENCE_CEILING: f64 = 0.3;

/// At most this many failed checks are surfaced as top concerns.
const MAX_TOP_CONCERNS: usize = 5;

const TIER_LOW_BELOW: f64 = 0.4;
const TIER_MEDIUM_BELOW: f64 = 0.75;

/// Mean confidence of the non-null canonical fields, capped when the MRZ
/// block is absent and always clamped to `[0, 1]`.
pub fn overall_confidence(record: &CanonicalRecord) -> f64 {
    let count = record.fields.len();
    let mean = if count == 0 {
        0.0
    } else {
        record.fields.values().map(|f| f.confidence).sum::<f64>() / count as f64
    };
    let capped = if record.mrz.is_none() {
        mean.min(NO_MRZ_CONFIDENCE_CEILING)
    } else {
        mean
    };
    capped.clamp(0.0, 1.0)
}

/// Render the human-readable digest of a verification run.
pub fn build_summary(
    record: &CanonicalRecord,
    applicant: &Applicant,
    eligibility: &EligibilityResult,
    checks: &[CheckResult],
    overall_confidence: f64,
) -> Summary {
    let name_match = record
        .value(CanonicalField::FullName)
        .is_some_and(|full_name| {
            let normalized = normalize_name(full_name);
            !normalized.is_empty() && normalized == normalize_name(&applicant.name)
        });

    // Failed checks, blocking before advisory, original order within each.
    let mut top_concerns: Vec<String> = checks
        .iter()
        .filter(|c| !c.passed && c.severity == Severity::Blocking)
        .chain(
            checks
                .iter()
                .filter(|c| !c.passed && c.severity == Severity::Advisory),
        )
        .map(|c| c.description.clone())
        .collect();
    top_concerns.truncate(MAX_TOP_CONCERNS);

    let checks_passed = checks.iter().filter(|c| c.passed).count();
    let checks_failed = checks.len() - checks_passed;

    let verdict = if eligibility.eligible {
        "Eligible under the supplied policy".to_owned()
    } else {
        format!(
            "Not eligible under the supplied policy ({} blocking failure(s))",
            eligibility.reasons.len()
        )
    };

    Summary {
        name_match,
        top_concerns,
        verdict,
        checks_passed,
        checks_failed,
        confidence_tier: confidence_tier(overall_confidence).to_owned(),
    }
}

fn confidence_tier(confidence: f64) -> &'static str {
    if confidence < TIER_LOW_BELOW {
        "low"
    } else if confidence < TIER_MEDIUM_BELOW {
        "medium"
    } else {
        "high"
    }
}

/// Uppercase, non-alphanumerics collapsed to spaces, tokens sorted.
/// Token order is ignored because MRZ names are surname-first while
/// applicants usually declare given names first.
fn normalize_name(name: &str) -> String {
    let upper: String = name
        .to_uppercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    let mut tokens: Vec<&str> = upper.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

#[cfg(test)]
mod tests {
    use veridoc_core::types::{FusedField, MrzBlock};

    use super::*;

    fn record(fields: &[(CanonicalField, &str, f64)], with_mrz: bool) -> CanonicalRecord {
        let mut record = CanonicalRecord::default();
        for (name, value, confidence) in fields {
            record.fields.insert(
                *name,
                FusedField {
                    value: (*value).to_owned(),
                    confidence: *confidence,
                    source_index: 0,
                },
            );
        }
        if with_mrz {
            record.mrz = Some(MrzBlock {
                raw: "RAW".into(),
                checks: Vec::new(),
            });
        }
        record
    }

    fn applicant(name: &str) -> Applicant {
        Applicant {
            name: name.to_owned(),
            dob: "1974-08-12".into(),
            passport_number: None,
            nationality: None,
            intended_visa_type: None,
        }
    }

    fn check(id: &str, passed: bool, severity: Severity) -> CheckResult {
        CheckResult {
            id: id.to_owned(),
            description: format!("description of {id}"),
            passed,
            severity,
            details: None,
        }
    }

    #[test]
    fn confidence_is_the_mean_of_non_null_fields() {
        let record = record(
            &[
                (CanonicalField::Surname, "ERIKSSON", 0.8),
                (CanonicalField::DocumentNumber, "L898902C3", 0.6),
            ],
            true,
        );
        assert!((overall_confidence(&record) - 0.7).abs() < 1e-9);
    }

    #[test]
    fn empty_record_scores_zero() {
        assert_eq!(overall_confidence(&CanonicalRecord::default()), 0.0);
    }

    #[test]
    fn missing_mrz_caps_confidence_at_the_low_ceiling() {
        let record = record(
            &[
                (CanonicalField::Surname, "ERIKSSON", 0.99),
                (CanonicalField::DocumentNumber, "L898902C3", 0.97),
            ],
            false,
        );
        assert_eq!(overall_confidence(&record), NO_MRZ_CONFIDENCE_CEILING);
    }

    #[test]
    fn confidence_stays_within_unit_interval() {
        // A backend reporting out-of-range confidence must not leak past
        // the clamp.
        let record = record(&[(CanonicalField::Surname, "ERIKSSON", 1.7)], true);
        assert_eq!(overall_confidence(&record), 1.0);
    }

    #[test]
    fn name_match_is_normalized() {
        let record = record(
            &[(CanonicalField::FullName, "ERIKSSON ANNA MARIA", 0.9)],
            true,
        );
        let eligibility = EligibilityResult {
            eligible: true,
            reasons: vec![],
            next_actions: vec![],
        };
        let summary = build_summary(
            &record,
            &applicant("eriksson, anna-maria"),
            &eligibility,
            &[],
            0.9,
        );
        assert!(summary.name_match);
    }

    #[test]
    fn name_match_ignores_token_order() {
        // MRZ full names are surname-first; declared names usually are not.
        let record = record(
            &[(CanonicalField::FullName, "ERIKSSON ANNA MARIA", 0.9)],
            true,
        );
        let eligibility = EligibilityResult {
            eligible: true,
            reasons: vec![],
            next_actions: vec![],
        };
        let summary = build_summary(
            &record,
            &applicant("Anna Maria Eriksson"),
            &eligibility,
            &[],
            0.9,
        );
        assert!(summary.name_match);

        let summary = build_summary(
            &record,
            &applicant("Anna Eriksson"),
            &eligibility,
            &[],
            0.9,
        );
        assert!(!summary.name_match, "missing token is still a mismatch");
    }

    #[test]
    fn no_full_name_means_no_match() {
        let eligibility = EligibilityResult {
            eligible: true,
            reasons: vec![],
            next_actions: vec![],
        };
        let summary = build_summary(
            &CanonicalRecord::default(),
            &applicant("Anna"),
            &eligibility,
            &[],
            0.1,
        );
        assert!(!summary.name_match);
    }

    #[test]
    fn blocking_concerns_come_before_advisory_and_cap_at_five() {
        let checks = vec![
            check("a1", false, Severity::Advisory),
            check("b1", false, Severity::Blocking),
            check("a2", false, Severity::Advisory),
            check("b2", false, Severity::Blocking),
            check("a3", false, Severity::Advisory),
            check("a4", false, Severity::Advisory),
            check("ok", true, Severity::Blocking),
        ];
        let eligibility = EligibilityResult {
            eligible: false,
            reasons: vec!["r".into(), "r".into()],
            next_actions: vec![],
        };
        let summary = build_summary(
            &CanonicalRecord::default(),
            &applicant("Anna"),
            &eligibility,
            &checks,
            0.5,
        );
        assert_eq!(summary.top_concerns.len(), 5);
        assert_eq!(summary.top_concerns[0], "description of b1");
        assert_eq!(summary.top_concerns[1], "description of b2");
        assert_eq!(summary.checks_passed, 1);
        assert_eq!(summary.checks_failed, 6);
    }

    #[test]
    fn tiers_follow_fixed_thresholds() {
        assert_eq!(confidence_tier(0.0), "low");
        assert_eq!(confidence_tier(0.39), "low");
        assert_eq!(confidence_tier(0.4), "medium");
        assert_eq!(confidence_tier(0.74), "medium");
        assert_eq!(confidence_tier(0.75), "high");
        assert_eq!(confidence_tier(1.0), "high");
    }

    #[test]
    fn identical_inputs_yield_identical_summaries() {
        let record = record(&[(CanonicalField::FullName, "ANNA", 0.9)], true);
        let eligibility = EligibilityResult {
            eligible: true,
            reasons: vec![],
            next_actions: vec![],
        };
        let checks = vec![check("x", true, Severity::Blocking)];
        let a = build_summary(&record, &applicant("Anna"), &eligibility, &checks, 0.9);
        let b = build_summary(&record, &applicant("Anna"), &eligibility, &checks, 0.9);
        assert_eq!(serde_json::to_string(&a).unwrap(), serde_json::to_string(&b).unwrap());
    }
}
