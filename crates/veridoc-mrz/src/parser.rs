// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// MRZ detection and fixed-offset parsing.
//
// Detection scans the OCR lines for contiguous runs drawn entirely from the
// MRZ alphabet {A–Z, 0–9, <} whose lengths match a supported layout: two
// 44-character lines (TD3) or three 30-character lines (TD1). The first
// grouping found is the one parsed; a grouping that matches but fails
// structural parsing (bad date, for instance) produces no result — never a
// partially populated one.
//
// Every parsed field inherits the OCR confidence of the line it was sliced
// from. Check digits are validated independently of each other and of
// confidence.

use chrono::{Datelike, NaiveDate};
use tracing::debug;

use veridoc_core::types::{
    CanonicalField, CheckResult, MrzField, MrzFormat, MrzResult, OcrLine,
};

use crate::checksum;

const TD3_LINE_LEN: usize = 44;
const TD1_LINE_LEN: usize = 30;

/// Parse the first MRZ grouping found in `lines`.
///
/// `today` anchors two-digit year expansion (birth years above today's
/// two-digit year fall in the 1900s) and exists so the parser stays a pure
/// function — callers pass the current date, tests pass a fixed one.
pub fn parse_mrz(lines: &[OcrLine], today: NaiveDate) -> Option<MrzResult> {
    let cleaned: Vec<Option<(&str, f64)>> = lines
        .iter()
        .map(|line| {
            let trimmed = line.text.trim();
            (!trimmed.is_empty() && trimmed.chars().all(is_mrz_char))
                .then_some((trimmed, line.confidence))
        })
        .collect();

    for start in 0..cleaned.len() {
        if let Some(window) = td3_window(&cleaned, start) {
            debug!(line = start, "TD3 MRZ grouping detected");
            return parse_td3(window, today);
        }
        if let Some(window) = td1_window(&cleaned, start) {
            debug!(line = start, "TD1 MRZ grouping detected");
            return parse_td1(window, today);
        }
    }
    None
}

fn is_mrz_char(c: char) -> bool {
    c.is_ascii_uppercase() || c.is_ascii_digit() || c == '<'
}

fn line_of_len<'a>(
    cleaned: &[Option<(&'a str, f64)>],
    index: usize,
    len: usize,
) -> Option<(&'a str, f64)> {
    match cleaned.get(index) {
        Some(Some((text, confidence))) if text.len() == len => Some((text, *confidence)),
        _ => None,
    }
}

fn td3_window<'a>(
    cleaned: &[Option<(&'a str, f64)>],
    start: usize,
) -> Option<[(&'a str, f64); 2]> {
    Some([
        line_of_len(cleaned, start, TD3_LINE_LEN)?,
        line_of_len(cleaned, start + 1, TD3_LINE_LEN)?,
    ])
}

fn td1_window<'a>(
    cleaned: &[Option<(&'a str, f64)>],
    start: usize,
) -> Option<[(&'a str, f64); 3]> {
    Some([
        line_of_len(cleaned, start, TD1_LINE_LEN)?,
        line_of_len(cleaned, start + 1, TD1_LINE_LEN)?,
        line_of_len(cleaned, start + 2, TD1_LINE_LEN)?,
    ])
}

/// Passport-booklet layout: two 44-character lines.
fn parse_td3(window: [(&str, f64); 2], today: NaiveDate) -> Option<MrzResult> {
    let [(l1, conf1), (l2, conf2)] = window;

    let birth = parse_date(&l2[13..19], DateKind::Birth, today)?;
    let expiry = parse_date(&l2[21..27], DateKind::Expiry, today)?;

    let mut fields = Vec::new();
    let mut push = |name, value: String, confidence| {
        if !value.is_empty() {
            fields.push(MrzField {
                name,
                value,
                confidence,
            });
        }
    };

    push(CanonicalField::DocumentType, strip_filler(&l1[0..2]), conf1);
    push(CanonicalField::IssuingCountry, strip_filler(&l1[2..5]), conf1);
    let (surname, given_names) = split_name_block(&l1[5..44]);
    push(CanonicalField::Surname, surname, conf1);
    push(CanonicalField::GivenNames, given_names, conf1);

    push(CanonicalField::DocumentNumber, strip_filler(&l2[0..9]), conf2);
    push(CanonicalField::Nationality, strip_filler(&l2[10..13]), conf2);
    push(CanonicalField::DateOfBirth, iso(birth), conf2);
    push(CanonicalField::Sex, sex_value(l2.as_bytes()[20]), conf2);
    push(CanonicalField::DateOfExpiry, iso(expiry), conf2);

    let mut checks = vec![
        checksum::validate(
            "documentNumberCheck",
            "MRZ document number check digit",
            &l2[0..9],
            char_at(l2, 9),
        ),
        checksum::validate(
            "dateOfBirthCheck",
            "MRZ date of birth check digit",
            &l2[13..19],
            char_at(l2, 19),
        ),
        checksum::validate(
            "dateOfExpiryCheck",
            "MRZ date of expiry check digit",
            &l2[21..27],
            char_at(l2, 27),
        ),
    ];
    // Personal-number check only applies when the optional field is used.
    if !strip_filler(&l2[28..42]).is_empty() {
        checks.push(checksum::validate(
            "personalNumberCheck",
            "MRZ personal number check digit",
            &l2[28..42],
            char_at(l2, 42),
        ));
    }
    let composite_data = format!("{}{}{}", &l2[0..10], &l2[13..20], &l2[21..43]);
    checks.push(checksum::validate(
        "compositeCheck",
        "MRZ composite check digit",
        &composite_data,
        char_at(l2, 43),
    ));

    Some(MrzResult {
        raw: format!("{l1}\n{l2}"),
        format: MrzFormat::Td3,
        fields,
        checks,
    })
}

/// Identity-card layout: three 30-character lines.
fn parse_td1(window: [(&str, f64); 3], today: NaiveDate) -> Option<MrzResult> {
    let [(l1, conf1), (l2, conf2), (l3, conf3)] = window;

    let birth = parse_date(&l2[0..6], DateKind::Birth, today)?;
    let expiry = parse_date(&l2[8..14], DateKind::Expiry, today)?;

    let mut fields = Vec::new();
    let mut push = |name, value: String, confidence| {
        if !value.is_empty() {
            fields.push(MrzField {
                name,
                value,
                confidence,
            });
        }
    };

    push(CanonicalField::DocumentType, strip_filler(&l1[0..2]), conf1);
    push(CanonicalField::IssuingCountry, strip_filler(&l1[2..5]), conf1);
    push(CanonicalField::DocumentNumber, strip_filler(&l1[5..14]), conf1);

    push(CanonicalField::DateOfBirth, iso(birth), conf2);
    push(CanonicalField::Sex, sex_value(l2.as_bytes()[7]), conf2);
    push(CanonicalField::DateOfExpiry, iso(expiry), conf2);
    push(CanonicalField::Nationality, strip_filler(&l2[15..18]), conf2);

    let (surname, given_names) = split_name_block(l3);
    push(CanonicalField::Surname, surname, conf3);
    push(CanonicalField::GivenNames, given_names, conf3);

    let composite_data = format!(
        "{}{}{}{}",
        &l1[5..30],
        &l2[0..7],
        &l2[8..15],
        &l2[18..29]
    );
    let checks = vec![
        checksum::validate(
            "documentNumberCheck",
            "MRZ document number check digit",
            &l1[5..14],
            char_at(l1, 14),
        ),
        checksum::validate(
            "dateOfBirthCheck",
            "MRZ date of birth check digit",
            &l2[0..6],
            char_at(l2, 6),
        ),
        checksum::validate(
            "dateOfExpiryCheck",
            "MRZ date of expiry check digit",
            &l2[8..14],
            char_at(l2, 14),
        ),
        checksum::validate(
            "compositeCheck",
            "MRZ composite check digit",
            &composite_data,
            char_at(l2, 29),
        ),
    ];

    Some(MrzResult {
        raw: format!("{l1}\n{l2}\n{l3}"),
        format: MrzFormat::Td1,
        fields,
        checks,
    })
}

enum DateKind {
    Birth,
    Expiry,
}

/// Expand a six-digit `YYMMDD` field to a calendar date.
///
/// Birth years above today's two-digit year belong to the 1900s; expiry
/// dates are always read in the 2000s (a 19xx expiry could not still be in
/// circulation). Returns `None` for non-digit or impossible dates.
fn parse_date(yymmdd: &str, kind: DateKind, today: NaiveDate) -> Option<NaiveDate> {
    if yymmdd.len() != 6 || !yymmdd.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let yy: i32 = yymmdd[0..2].parse().ok()?;
    let month: u32 = yymmdd[2..4].parse().ok()?;
    let day: u32 = yymmdd[4..6].parse().ok()?;
    let year = match kind {
        DateKind::Birth if yy > today.year() % 100 => 1900 + yy,
        _ => 2000 + yy,
    };
    NaiveDate::from_ymd_opt(year, month, day)
}

fn iso(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Strip filler characters from both ends of a subfield.
fn strip_filler(s: &str) -> String {
    s.trim_matches('<').to_owned()
}

/// Split a name block on the first `<<` into (surname, given names), with
/// filler runs inside each part collapsed to single spaces.
fn split_name_block(block: &str) -> (String, String) {
    let (surname, given) = block.split_once("<<").unwrap_or((block, ""));
    (collapse_filler(surname), collapse_filler(given))
}

fn collapse_filler(part: &str) -> String {
    part.split('<')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn sex_value(byte: u8) -> String {
    match byte {
        b'M' => "M".to_owned(),
        b'F' => "F".to_owned(),
        // Filler (or anything else) contributes no field.
        _ => String::new(),
    }
}

fn char_at(line: &str, index: usize) -> char {
    line.as_bytes()[index] as char
}
