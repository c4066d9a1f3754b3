// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// MRZ check-digit arithmetic.
//
// Digits map to themselves, letters A–Z map to 10–35, the filler `<` maps
// to 0. The check digit is the weighted sum of the character values under
// the repeating weight cycle 7, 3, 1, taken modulo 10.

use veridoc_core::types::{CheckResult, Severity};

/// Repeating weight cycle applied to MRZ character values.
const WEIGHTS: [u32; 3] = [7, 3, 1];

/// Numeric value of one MRZ character, or `None` for a character outside
/// the MRZ alphabet.
pub fn char_value(c: char) -> Option<u32> {
    match c {
        '0'..='9' => Some(c as u32 - '0' as u32),
        'A'..='Z' => Some(c as u32 - 'A' as u32 + 10),
        '<' => Some(0),
        _ => None,
    }
}

/// Compute the check digit for `data`.
///
/// Characters outside the MRZ alphabet contribute 0; detection has already
/// restricted candidate lines to the alphabet before this is called.
pub fn compute_check_digit(data: &str) -> u8 {
    let sum: u32 = data
        .chars()
        .enumerate()
        .map(|(i, c)| char_value(c).unwrap_or(0) * WEIGHTS[i % 3])
        .sum();
    (sum % 10) as u8
}

/// Validate one check-digit subfield, producing an independent
/// [`CheckResult`].
///
/// The declared digit must itself be a decimal digit; a filler or letter in
/// the check position fails the check outright.
pub fn validate(id: &str, description: &str, data: &str, declared: char) -> CheckResult {
    let computed = compute_check_digit(data);
    let passed = declared
        .to_digit(10)
        .is_some_and(|d| d == u32::from(computed));
    let details = if passed {
        None
    } else {
        Some(format!("computed {computed}, declared {declared}"))
    };
    CheckResult {
        id: id.to_owned(),
        description: description.to_owned(),
        passed,
        severity: Severity::Advisory,
        details,
    }
}
