// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image-source loading.
//
// A request references images as inline base64, a local path, or an
// http(s) URL. Loading happens before extraction and a failure here is
// extraction-fatal: without the bytes there is nothing for OCR to work on.
// Loaded bytes are fingerprinted with SHA-256 for the audit log.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use sha2::{Digest, Sha256};
use tracing::debug;

use veridoc_core::error::{Result, VeridocError};
use veridoc_core::types::ImageSource;

/// Raw bytes of one loaded image plus their SHA-256 fingerprint.
#[derive(Debug, Clone)]
pub struct ImageData {
    pub bytes: Vec<u8>,
    /// Hex-encoded SHA-256 of `bytes`.
    pub sha256: String,
}

impl ImageData {
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        let sha256 = hex::encode(Sha256::digest(&bytes));
        Self { bytes, sha256 }
    }
}

/// Load one image reference into memory.
///
/// Exactly one of `base64`, `path`, `url` must be set; shape validation has
/// already rejected entries with none, but the check is repeated here so
/// the loader is safe to call directly.
pub async fn load_image(source: &ImageSource) -> Result<ImageData> {
    let data = if let Some(b64) = &source.base64 {
        decode_base64(b64)?
    } else if let Some(path) = &source.path {
        ImageData::from_bytes(tokio::fs::read(path).await.map_err(|err| {
            VeridocError::ImageLoad(format!("reading {path}: {err}"))
        })?)
    } else if let Some(url) = &source.url {
        fetch_url(url).await?
    } else {
        return Err(VeridocError::ImageLoad(
            "image reference has no url, base64, or path".into(),
        ));
    };

    debug!(
        bytes = data.bytes.len(),
        sha256 = %data.sha256,
        "image loaded"
    );
    Ok(data)
}

/// Decode an inline base64 payload, tolerating a `data:` URL prefix.
fn decode_base64(payload: &str) -> Result<ImageData> {
    let encoded = match payload.split_once(";base64,") {
        Some((_, rest)) => rest,
        None => payload,
    };
    let bytes = BASE64
        .decode(encoded.trim())
        .map_err(|err| VeridocError::ImageLoad(format!("invalid base64 payload: {err}")))?;
    Ok(ImageData::from_bytes(bytes))
}

async fn fetch_url(url: &str) -> Result<ImageData> {
    let response = reqwest::get(url)
        .await
        .map_err(|err| VeridocError::ImageLoad(format!("fetching {url}: {err}")))?;
    if !response.status().is_success() {
        return Err(VeridocError::ImageLoad(format!(
            "fetching {url}: HTTP {}",
            response.status()
        )));
    }
    let bytes = response
        .bytes()
        .await
        .map_err(|err| VeridocError::ImageLoad(format!("reading body of {url}: {err}")))?;
    Ok(ImageData::from_bytes(bytes.to_vec()))
}
