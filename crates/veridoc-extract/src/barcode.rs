// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Barcode decoder seam.
//
// Barcode evidence is supplementary: the verification engine catches a
// decoder failure and degrades it to zero payloads for that image instead
// of aborting the run.

use veridoc_core::error::Result;

use crate::source::ImageData;

/// Decodes zero or more barcode payload strings from an image.
///
/// Implementations run inside `spawn_blocking`; they may do CPU-bound work
/// but must not assume a tokio context.
pub trait BarcodeDecoder: Send + Sync {
    fn decode(&self, image: &ImageData) -> Result<Vec<String>>;
}

/// The default decoder: always reports zero barcodes.
///
/// Deployments with a real decoder substitute their own implementation;
/// the engine's degradation policy makes the two indistinguishable when no
/// barcode is present.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullBarcodeDecoder;

impl BarcodeDecoder for NullBarcodeDecoder {
    fn decode(&self, _image: &ImageData) -> Result<Vec<String>> {
        Ok(Vec::new())
    }
}
