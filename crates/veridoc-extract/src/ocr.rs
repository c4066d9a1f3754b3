// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// OCR backend seam, plus the optional `ocrs`-based implementation.
//
// OCR output is load-bearing for every downstream field, so a backend
// failure is extraction-fatal and aborts the whole verification run.

use veridoc_core::error::Result;
use veridoc_core::types::OcrOutput;

use crate::source::ImageData;

/// Maps image bytes to OCR lines (text + confidence) and a raw text blob.
///
/// Implementations run inside `spawn_blocking`; inference is CPU-bound.
pub trait OcrBackend: Send + Sync {
    fn ocr(&self, image: &ImageData) -> Result<OcrOutput>;
}

#[cfg(feature = "ocr")]
pub mod ocrs_backend {
    //! OCR via the `ocrs` crate — a pure-Rust engine backed by neural
    //! network models executed through `rten`.
    //!
    //! Requires two model files, `text-detection.rten` and
    //! `text-recognition.rten`, cached under `$XDG_CACHE_HOME/ocrs` (or
    //! `~/.cache/ocrs`). Running `ocrs-cli` once downloads them.
    //!
    //! Build the `ocrs`/`rten` crates in release mode; debug builds are
    //! orders of magnitude slower.

    use std::path::{Path, PathBuf};

    use ocrs::{ImageSource as OcrsImageSource, OcrEngine, OcrEngineParams};
    use rten::Model;
    use tracing::{debug, info};

    use veridoc_core::error::{Result, VeridocError};
    use veridoc_core::types::{OcrLine, OcrOutput};

    use super::OcrBackend;
    use crate::source::ImageData;

    const DETECTION_MODEL_FILENAME: &str = "text-detection.rten";
    const RECOGNITION_MODEL_FILENAME: &str = "text-recognition.rten";

    /// `ocrs` exposes no per-line probability through its public API, so
    /// every recognised line carries this nominal confidence. Fusion still
    /// behaves correctly: equal confidences fall back to source order.
    const NOMINAL_LINE_CONFIDENCE: f64 = 0.9;

    fn default_model_dir() -> PathBuf {
        if let Ok(xdg) = std::env::var("XDG_CACHE_HOME") {
            PathBuf::from(xdg).join("ocrs")
        } else if let Ok(home) = std::env::var("HOME") {
            PathBuf::from(home).join(".cache").join("ocrs")
        } else {
            PathBuf::from("ocrs-models")
        }
    }

    /// Model locations for constructing an [`OcrsBackend`].
    #[derive(Debug, Clone)]
    pub struct OcrsConfig {
        pub detection_model_path: PathBuf,
        pub recognition_model_path: PathBuf,
    }

    impl Default for OcrsConfig {
        fn default() -> Self {
            Self::from_dir(default_model_dir())
        }
    }

    impl OcrsConfig {
        /// Expects `dir` to contain `text-detection.rten` and
        /// `text-recognition.rten`.
        pub fn from_dir(dir: impl AsRef<Path>) -> Self {
            let dir = dir.as_ref();
            Self {
                detection_model_path: dir.join(DETECTION_MODEL_FILENAME),
                recognition_model_path: dir.join(RECOGNITION_MODEL_FILENAME),
            }
        }

        /// Verify both model files exist before paying the load cost.
        pub fn validate(&self) -> Result<()> {
            for path in [&self.detection_model_path, &self.recognition_model_path] {
                if !path.exists() {
                    return Err(VeridocError::Ocr(format!(
                        "OCR model not found at {}; run `ocrs-cli` once to download models",
                        path.display()
                    )));
                }
            }
            Ok(())
        }
    }

    /// OCR backend built on the `ocrs` engine.
    ///
    /// Model loading is the expensive step — construct once, reuse for
    /// every image.
    pub struct OcrsBackend {
        engine: OcrEngine,
    }

    impl OcrsBackend {
        pub fn new(config: OcrsConfig) -> Result<Self> {
            config.validate()?;

            info!("loading OCR models");
            let detection_model = Model::load_file(&config.detection_model_path)
                .map_err(|err| {
                    VeridocError::Ocr(format!(
                        "loading detection model {}: {err}",
                        config.detection_model_path.display()
                    ))
                })?;
            let recognition_model = Model::load_file(&config.recognition_model_path)
                .map_err(|err| {
                    VeridocError::Ocr(format!(
                        "loading recognition model {}: {err}",
                        config.recognition_model_path.display()
                    ))
                })?;

            let engine = OcrEngine::new(OcrEngineParams {
                detection_model: Some(detection_model),
                recognition_model: Some(recognition_model),
                ..Default::default()
            })
            .map_err(|err| VeridocError::Ocr(format!("initialising OCR engine: {err}")))?;

            info!("OCR engine ready");
            Ok(Self { engine })
        }

        /// Construct from the default model cache directory.
        pub fn with_defaults() -> Result<Self> {
            Self::new(OcrsConfig::default())
        }
    }

    impl OcrBackend for OcrsBackend {
        fn ocr(&self, image: &ImageData) -> Result<OcrOutput> {
            let decoded = image::load_from_memory(&image.bytes)
                .map_err(|err| VeridocError::Ocr(format!("decoding image: {err}")))?;
            let rgb = decoded.to_rgb8();
            let (width, height) = rgb.dimensions();

            let source = OcrsImageSource::from_bytes(rgb.as_raw(), (width, height))
                .map_err(|err| {
                    VeridocError::Ocr(format!(
                        "preparing {width}x{height} image source: {err}"
                    ))
                })?;
            let input = self
                .engine
                .prepare_input(source)
                .map_err(|err| VeridocError::Ocr(format!("OCR preprocessing: {err}")))?;

            let word_rects = self
                .engine
                .detect_words(&input)
                .map_err(|err| VeridocError::Ocr(format!("word detection: {err}")))?;
            let line_rects = self.engine.find_text_lines(&input, &word_rects);
            let line_texts = self
                .engine
                .recognize_text(&input, &line_rects)
                .map_err(|err| VeridocError::Ocr(format!("line recognition: {err}")))?;

            let mut lines = Vec::new();
            for line in line_texts.iter().flatten() {
                let text = line.to_string();
                if text.trim().is_empty() {
                    continue;
                }
                lines.push(OcrLine {
                    text,
                    confidence: NOMINAL_LINE_CONFIDENCE,
                });
            }

            let raw_text = lines
                .iter()
                .map(|l| l.text.as_str())
                .collect::<Vec<_>>()
                .join("\n");
            debug!(lines = lines.len(), chars = raw_text.len(), "OCR complete");

            Ok(OcrOutput { lines, raw_text })
        }
    }

}
