// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// veridoc-extract — Image loading and the OCR/barcode collaborator seams.
//
// OCR engines and barcode decoders are external collaborators to the
// verification engine: pluggable backends behind the `OcrBackend` and
// `BarcodeDecoder` traits. An `ocrs`-based OCR backend ships behind the
// `ocr` feature gate.

pub mod barcode;
pub mod ocr;
pub mod source;

pub use barcode::{BarcodeDecoder, NullBarcodeDecoder};
pub use ocr::OcrBackend;
pub use source::{ImageData, load_image};

#[cfg(feature = "ocr")]
pub use ocr::ocrs_backend::{OcrsBackend, OcrsConfig};
