// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Veridoc verification engine.
//
// Wire shapes serialize with camelCase names so the JSON API matches the
// documented request/response contract (`overallConfidence`,
// `recommendedNextActions`, ...).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One line of text produced by an OCR backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrLine {
    pub text: String,
    /// Backend confidence in `[0, 1]`.
    pub confidence: f64,
}

/// Full OCR output for one image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OcrOutput {
    /// Recognised lines in reading order.
    pub lines: Vec<OcrLine>,
    /// The lines joined with newlines, kept verbatim for audit.
    pub raw_text: String,
}

/// The closed set of canonical identity-field names.
///
/// Fusion accumulates candidates per variant of this enum rather than per
/// string key, so a misspelt field name is a compile error instead of
/// silently dropped data.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum CanonicalField {
    DocumentType,
    IssuingCountry,
    Surname,
    GivenNames,
    FullName,
    DocumentNumber,
    Nationality,
    DateOfBirth,
    Sex,
    DateOfExpiry,
}

impl CanonicalField {
    /// Every canonical field, in wire order.
    pub const ALL: [CanonicalField; 10] = [
        Self::DocumentType,
        Self::IssuingCountry,
        Self::Surname,
        Self::GivenNames,
        Self::FullName,
        Self::DocumentNumber,
        Self::Nationality,
        Self::DateOfBirth,
        Self::Sex,
        Self::DateOfExpiry,
    ];

    /// The camelCase wire name of this field.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DocumentType => "documentType",
            Self::IssuingCountry => "issuingCountry",
            Self::Surname => "surname",
            Self::GivenNames => "givenNames",
            Self::FullName => "fullName",
            Self::DocumentNumber => "documentNumber",
            Self::Nationality => "nationality",
            Self::DateOfBirth => "dateOfBirth",
            Self::Sex => "sex",
            Self::DateOfExpiry => "dateOfExpiry",
        }
    }
}

impl std::fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a failed check blocks eligibility or is merely reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Blocking,
    Advisory,
}

/// Outcome of one validation check (MRZ check digit or policy rule).
///
/// Ids are unique within a single verification run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckResult {
    pub id: String,
    pub description: String,
    pub passed: bool,
    pub severity: Severity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Supported MRZ layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MrzFormat {
    /// Two 44-character lines (passport booklets).
    #[serde(rename = "TD3")]
    Td3,
    /// Three 30-character lines (identity cards).
    #[serde(rename = "TD1")]
    Td1,
}

/// One field parsed out of an MRZ block.
///
/// Confidence is inherited from the OCR line the subfield was sliced from.
/// Checksum validity and confidence are orthogonal — a clean scan of a
/// fraudulent document has high confidence and a failing check digit at the
/// same time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MrzField {
    pub name: CanonicalField,
    pub value: String,
    pub confidence: f64,
}

/// A fully parsed MRZ block: raw text, structured fields, and one
/// `CheckResult` per check-digit subfield.
///
/// Only produced when a valid-length line grouping parsed completely;
/// a grouping that matched but failed structural parsing yields no result
/// at all (all-or-nothing per image).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MrzResult {
    pub raw: String,
    pub format: MrzFormat,
    pub fields: Vec<MrzField>,
    pub checks: Vec<CheckResult>,
}

/// Everything extracted from one submitted image. Immutable once produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawExtraction {
    pub ocr: OcrOutput,
    pub mrz: Option<MrzResult>,
    pub barcodes: Vec<String>,
}

/// A fused field value with the provenance fusion selected it by.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FusedField {
    pub value: String,
    pub confidence: f64,
    /// Index (submission order) of the extraction that contributed the value.
    pub source_index: usize,
}

/// The canonical MRZ block retained on the fused record: the raw text and
/// checks of the last image (submission order) that yielded a parseable MRZ.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MrzBlock {
    pub raw: String,
    pub checks: Vec<CheckResult>,
}

/// The single fused identity record for a verification run.
///
/// Field values are drawn only from sources that actually reported them; a
/// field absent from every source is simply absent here, never defaulted.
/// Barcode payloads and OCR lines are concatenated across images in
/// submission order without deduplication — audit evidence, not decision
/// input.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalRecord {
    pub fields: BTreeMap<CanonicalField, FusedField>,
    pub mrz: Option<MrzBlock>,
    pub barcodes: Vec<String>,
    pub text_lines: Vec<OcrLine>,
}

impl CanonicalRecord {
    /// The fused value for `field`, if any source reported it.
    pub fn value(&self, field: CanonicalField) -> Option<&str> {
        self.fields.get(&field).map(|f| f.value.as_str())
    }

    /// Response-shaped view of the record (`extracted` in the payload).
    pub fn view(&self) -> ExtractedView {
        let get = |f: CanonicalField| self.value(f).map(str::to_owned);
        ExtractedView {
            document_type: get(CanonicalField::DocumentType),
            issuing_country: get(CanonicalField::IssuingCountry),
            surname: get(CanonicalField::Surname),
            given_names: get(CanonicalField::GivenNames),
            full_name: get(CanonicalField::FullName),
            document_number: get(CanonicalField::DocumentNumber),
            nationality: get(CanonicalField::Nationality),
            date_of_birth: get(CanonicalField::DateOfBirth),
            sex: get(CanonicalField::Sex),
            date_of_expiry: get(CanonicalField::DateOfExpiry),
            mrz: self.mrz.as_ref().map(|m| m.raw.clone()),
            barcodes: self.barcodes.clone(),
            text: self.text_lines.clone(),
        }
    }
}

/// The `extracted` section of a success payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedView {
    pub document_type: Option<String>,
    pub issuing_country: Option<String>,
    pub surname: Option<String>,
    pub given_names: Option<String>,
    pub full_name: Option<String>,
    pub document_number: Option<String>,
    pub nationality: Option<String>,
    pub date_of_birth: Option<String>,
    pub sex: Option<String>,
    pub date_of_expiry: Option<String>,
    /// Raw MRZ block of the canonical record, or null when none parsed.
    pub mrz: Option<String>,
    pub barcodes: Vec<String>,
    pub text: Vec<OcrLine>,
}

/// Applicant-declared data submitted alongside the images.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Applicant {
    pub name: String,
    /// Declared date of birth, ISO `YYYY-MM-DD`.
    pub dob: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passport_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nationality: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intended_visa_type: Option<String>,
}

/// Reference to one submitted image. Exactly one of the variants must be
/// set; shape validation rejects empty or ambiguous entries.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageSource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base64: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// A complete verification request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyRequest {
    pub images: Vec<ImageSource>,
    pub applicant: Applicant,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy: Option<crate::Policy>,
}

/// Verdict of the eligibility rule evaluator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EligibilityResult {
    pub eligible: bool,
    /// Descriptions of failed blocking checks, in rule-table order.
    pub reasons: Vec<String>,
    /// One fixed remediation string per failed blocking rule.
    #[serde(rename = "recommendedNextActions")]
    pub next_actions: Vec<String>,
}

/// Human-oriented digest of a verification run. Pure function of its inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    /// Whether the applicant-declared name matches the canonical full name
    /// after normalization.
    pub name_match: bool,
    /// Failed checks, blocking before advisory, at most five.
    pub top_concerns: Vec<String>,
    pub verdict: String,
    pub checks_passed: usize,
    pub checks_failed: usize,
    /// "low" below 0.4, "medium" below 0.75, otherwise "high".
    pub confidence_tier: String,
}

/// Success payload of the `verify` operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationResult {
    pub ok: bool,
    pub overall_confidence: f64,
    pub extracted: ExtractedView,
    pub validations: Vec<CheckResult>,
    pub eligibility: EligibilityResult,
    pub summary: Summary,
}

/// One input-shape problem, pointing at the offending field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldIssue {
    /// Dotted path into the request, e.g. `applicant.name` or `images[2]`.
    pub field: String,
    pub message: String,
}

/// Failure payload. Input-shape rejections carry the per-field issue list;
/// extraction failures carry the message alone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub ok: bool,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issues: Option<Vec<FieldIssue>>,
}

impl From<&crate::VeridocError> for ErrorResponse {
    fn from(err: &crate::VeridocError) -> Self {
        match err {
            crate::VeridocError::InvalidInput(issues) => Self {
                ok: false,
                error: "Invalid request".into(),
                issues: Some(issues.clone()),
            },
            other => Self {
                ok: false,
                error: other.to_string(),
                issues: None,
            },
        }
    }
}
