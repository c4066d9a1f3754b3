// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Veridoc — Core types and error definitions shared across all crates.

pub mod error;
pub mod policy;
pub mod remediation;
pub mod types;

pub use error::VeridocError;
pub use policy::Policy;
pub use remediation::BlockingRule;
pub use types::*;
