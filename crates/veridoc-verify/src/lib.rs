// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// veridoc-verify — The fusion-and-decision engine.
//
// Consumes per-image extraction results (OCR lines, MRZ result, barcode
// payloads), fuses them into one canonical identity record, evaluates the
// eligibility policy against it, and synthesizes the confidence score and
// human-readable summary of the final response.

pub mod eligibility;
pub mod engine;
pub mod fusion;
pub mod summary;

pub use engine::{EngineConfig, VerificationEngine};
pub use fusion::fuse;
