// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Veridoc.
//
// The taxonomy separates errors by where they stop the pipeline:
// input-shape errors are rejected before any extraction work, extraction
// errors abort the whole run, and barcode failures are caught at the seam
// and downgraded by the engine. Policy violations are never errors — they
// surface as `CheckResult` entries in the response.

use thiserror::Error;

use crate::types::FieldIssue;

/// Top-level error type for all Veridoc operations.
#[derive(Debug, Error)]
pub enum VeridocError {
    /// The request failed shape validation. Carries one issue per offending
    /// field; no extraction work was performed.
    #[error("invalid request")]
    InvalidInput(Vec<FieldIssue>),

    // -- Extraction-fatal errors --
    #[error("image load failed: {0}")]
    ImageLoad(String),

    #[error("OCR failed: {0}")]
    Ocr(String),

    /// Barcode decoding failed. Fatal at the decoder seam only — the
    /// verification engine catches this and degrades to zero payloads.
    #[error("barcode decode failed: {0}")]
    Barcode(String),

    /// The verification run exceeded its wall-clock bound.
    #[error("verification run timed out after {0}s")]
    Timeout(u64),

    // -- Plumbing --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, VeridocError>;
