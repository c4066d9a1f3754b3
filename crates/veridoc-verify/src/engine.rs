// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The verification pipeline.
//
// Shape validation runs before any extraction work. Per image, OCR and
// barcode decoding run as two blocking tasks joined together; across
// images processing is strictly sequential, which bounds concurrent load
// on the OCR backend at the cost of per-request latency. An OCR failure
// aborts the run (its output is load-bearing for every downstream field);
// a barcode failure degrades to zero payloads for that image. The whole
// run sits under one wall-clock bound — exceeding it returns no partial
// result.

use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, Utc};
use tracing::{Instrument, info, info_span, warn};
use uuid::Uuid;

use veridoc_core::error::{Result, VeridocError};
use veridoc_core::policy::Policy;
use veridoc_core::types::{
    FieldIssue, RawExtraction, VerificationResult, VerifyRequest,
};
use veridoc_extract::{BarcodeDecoder, ImageData, OcrBackend, load_image};

use crate::{eligibility, fusion, summary};

/// Engine tuning.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Upper wall-clock bound for one verification run.
    pub max_run_seconds: u64,
    /// Date the validity window, age, and MRZ year expansion are anchored
    /// to. `None` means today; tests and audit replays pin a fixed date.
    pub reference_date: Option<NaiveDate>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_run_seconds: 60,
            reference_date: None,
        }
    }
}

/// The verification engine: OCR backend + barcode decoder + config.
///
/// Backends are shared behind `Arc` so the per-image blocking tasks can
/// borrow them without any shared mutable state.
pub struct VerificationEngine<O, B> {
    ocr: Arc<O>,
    barcode: Arc<B>,
    config: EngineConfig,
}

impl<O, B> VerificationEngine<O, B>
where
    O: OcrBackend + 'static,
    B: BarcodeDecoder + 'static,
{
    pub fn new(ocr: O, barcode: B) -> Self {
        Self::with_config(ocr, barcode, EngineConfig::default())
    }

    pub fn with_config(ocr: O, barcode: B, config: EngineConfig) -> Self {
        Self {
            ocr: Arc::new(ocr),
            barcode: Arc::new(barcode),
            config,
        }
    }

    /// Run one verification: validate, extract per image, fuse, evaluate,
    /// summarize.
    ///
    /// # Errors
    ///
    /// [`VeridocError::InvalidInput`] before any extraction work,
    /// [`VeridocError::ImageLoad`]/[`VeridocError::Ocr`] when extraction
    /// aborts the run, [`VeridocError::Timeout`] when the wall-clock bound
    /// is exceeded.
    pub async fn verify(&self, request: &VerifyRequest) -> Result<VerificationResult> {
        validate_request(request)?;

        let run_id = Uuid::new_v4();
        let span = info_span!("verify", %run_id, images = request.images.len());
        let bound = Duration::from_secs(self.max_run_seconds());

        match tokio::time::timeout(bound, self.run(request).instrument(span)).await {
            Ok(result) => result,
            Err(_) => Err(VeridocError::Timeout(self.max_run_seconds())),
        }
    }

    fn max_run_seconds(&self) -> u64 {
        self.config.max_run_seconds
    }

    fn today(&self) -> NaiveDate {
        self.config
            .reference_date
            .unwrap_or_else(|| Utc::now().date_naive())
    }

    async fn run(&self, request: &VerifyRequest) -> Result<VerificationResult> {
        let today = self.today();

        let mut extractions: Vec<RawExtraction> = Vec::with_capacity(request.images.len());
        for (index, source) in request.images.iter().enumerate() {
            let image = Arc::new(load_image(source).await?);
            let extraction = self.extract_one(index, image, today).await?;
            extractions.push(extraction);
        }

        let record = fusion::fuse(&extractions);
        let policy = request.policy.clone().unwrap_or_else(Policy::default);

        let mut validations = record
            .mrz
            .as_ref()
            .map(|block| block.checks.clone())
            .unwrap_or_default();
        let outcome = eligibility::evaluate(&record, &request.applicant, &policy, today);
        validations.extend(outcome.checks);

        let overall_confidence = summary::overall_confidence(&record);
        let summary = summary::build_summary(
            &record,
            &request.applicant,
            &outcome.result,
            &validations,
            overall_confidence,
        );

        info!(
            eligible = outcome.result.eligible,
            overall_confidence,
            checks = validations.len(),
            "verification complete"
        );

        Ok(VerificationResult {
            ok: true,
            overall_confidence,
            extracted: record.view(),
            validations,
            eligibility: outcome.result,
            summary,
        })
    }

    /// OCR and barcode decoding for one image, joined as two blocking
    /// tasks over the same bytes.
    async fn extract_one(
        &self,
        index: usize,
        image: Arc<ImageData>,
        today: NaiveDate,
    ) -> Result<RawExtraction> {
        let ocr_backend = Arc::clone(&self.ocr);
        let ocr_image = Arc::clone(&image);
        let ocr_task = tokio::task::spawn_blocking(move || ocr_backend.ocr(&ocr_image));

        let decoder = Arc::clone(&self.barcode);
        let barcode_image = Arc::clone(&image);
        let barcode_task =
            tokio::task::spawn_blocking(move || decoder.decode(&barcode_image));

        let (ocr_joined, barcode_joined) = tokio::join!(ocr_task, barcode_task);

        // OCR output is load-bearing: task panics and backend failures
        // both abort the run.
        let ocr = ocr_joined
            .map_err(|err| VeridocError::Ocr(format!("OCR task failed: {err}")))??;

        // Barcode evidence is supplementary: degrade to zero payloads.
        let barcodes = match barcode_joined {
            Ok(Ok(payloads)) => payloads,
            Ok(Err(err)) => {
                warn!(image = index, error = %err, "barcode decode failed, continuing with zero payloads");
                Vec::new()
            }
            Err(err) => {
                warn!(image = index, error = %err, "barcode task failed, continuing with zero payloads");
                Vec::new()
            }
        };

        let mrz = veridoc_mrz::parse_mrz(&ocr.lines, today);
        Ok(RawExtraction { ocr, mrz, barcodes })
    }
}

/// Validate the request shape, collecting every issue before rejecting.
fn validate_request(request: &VerifyRequest) -> Result<()> {
    let mut issues = Vec::new();
    let mut issue = |field: &str, message: &str| {
        issues.push(FieldIssue {
            field: field.to_owned(),
            message: message.to_owned(),
        });
    };

    if request.images.is_empty() {
        issue("images", "at least one image is required");
    }
    for (index, image) in request.images.iter().enumerate() {
        let set = [&image.url, &image.base64, &image.path];
        if set.iter().all(|v| v.is_none()) {
            issue(
                &format!("images[{index}]"),
                "must provide url, base64, or path",
            );
        } else if set.iter().copied().flatten().any(|v| v.trim().is_empty()) {
            issue(&format!("images[{index}]"), "image reference must not be empty");
        } else if image.url.as_deref().is_some_and(|url| {
            let url = url.trim();
            !(url.starts_with("http://") || url.starts_with("https://"))
        }) {
            issue(&format!("images[{index}]"), "url must be an http(s) URL");
        }
    }

    if request.applicant.name.trim().is_empty() {
        issue("applicant.name", "must not be empty");
    }
    if request.applicant.dob.trim().len() < 4 {
        issue("applicant.dob", "must be at least 4 characters");
    }
    let too_short = |value: &Option<String>, min: usize| {
        value.as_deref().is_some_and(|v| v.trim().len() < min)
    };
    if too_short(&request.applicant.passport_number, 3) {
        issue("applicant.passportNumber", "must be at least 3 characters");
    }
    if too_short(&request.applicant.nationality, 2) {
        issue("applicant.nationality", "must be at least 2 characters");
    }
    if too_short(&request.applicant.intended_visa_type, 2) {
        issue("applicant.intendedVisaType", "must be at least 2 characters");
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(VeridocError::InvalidInput(issues))
    }
}
