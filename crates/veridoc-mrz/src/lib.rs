// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// veridoc-mrz — Machine-Readable Zone parsing for the Veridoc engine.
//
// Detects MRZ line groupings in OCR output, parses the fixed-offset
// subfields of the TD3 (2×44, passports) and TD1 (3×30, identity cards)
// layouts, and validates every check-digit subfield with the weighted
// modulo-10 scheme. A document whose MRZ cannot be located or structurally
// parsed yields no result at all — that is a legitimate negative outcome
// for the fusion stage, not an error.

pub mod checksum;
pub mod parser;

pub use checksum::compute_check_digit;
pub use parser::parse_mrz;
