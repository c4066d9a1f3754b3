// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Veridoc — identity-document verification engine
//
// Entry point. Reads a verification request from a JSON file (or stdin),
// runs the pipeline, and prints the result as JSON. Exit code 0 means a
// completed verification (eligible or not); 1 means the run failed.

use std::path::PathBuf;
use std::process::ExitCode;

use chrono::NaiveDate;
use clap::Parser;

use veridoc_core::types::{ErrorResponse, VerifyRequest};
use veridoc_verify::{EngineConfig, VerificationEngine};

#[derive(Debug, Parser)]
#[command(name = "veridoc", version, about = "Verify identity documents against an applicant and policy")]
struct Cli {
    /// Path to the JSON verification request, or `-` for stdin.
    request: PathBuf,

    /// Upper wall-clock bound for the run, in seconds.
    #[arg(long, default_value_t = 60)]
    timeout: u64,

    /// Pin the evaluation date (YYYY-MM-DD) instead of using today.
    /// Affects the validity window, age checks, and MRZ year expansion.
    #[arg(long)]
    reference_date: Option<NaiveDate>,

    /// Directory holding the OCR model files.
    #[cfg(feature = "ocr")]
    #[arg(long, env = "VERIDOC_MODELS_DIR")]
    models_dir: Option<PathBuf>,

    /// Pretty-print the output JSON.
    #[arg(long)]
    pretty: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        // stdout carries the JSON response; logs go to stderr.
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("Veridoc starting");

    run(Cli::parse()).await
}

#[cfg(feature = "ocr")]
async fn run(cli: Cli) -> ExitCode {
    use veridoc_extract::{NullBarcodeDecoder, OcrsBackend, OcrsConfig};

    let backend = match &cli.models_dir {
        Some(dir) => OcrsBackend::new(OcrsConfig::from_dir(dir)),
        None => OcrsBackend::with_defaults(),
    };
    let backend = match backend {
        Ok(backend) => backend,
        Err(err) => {
            eprintln!("veridoc: {err}");
            return ExitCode::FAILURE;
        }
    };

    let engine = VerificationEngine::with_config(backend, NullBarcodeDecoder, config(&cli));
    execute(&cli, &engine).await
}

#[cfg(not(feature = "ocr"))]
async fn run(_cli: Cli) -> ExitCode {
    eprintln!("veridoc: built without OCR support; rebuild with `--features ocr`");
    ExitCode::FAILURE
}

#[cfg_attr(not(feature = "ocr"), allow(dead_code))]
fn config(cli: &Cli) -> EngineConfig {
    EngineConfig {
        max_run_seconds: cli.timeout,
        reference_date: cli.reference_date,
    }
}

#[cfg_attr(not(feature = "ocr"), allow(dead_code))]
async fn execute<O, B>(cli: &Cli, engine: &VerificationEngine<O, B>) -> ExitCode
where
    O: veridoc_extract::OcrBackend + 'static,
    B: veridoc_extract::BarcodeDecoder + 'static,
{
    let request = match read_request(&cli.request).await {
        Ok(request) => request,
        Err(err) => {
            eprintln!("veridoc: {err}");
            return ExitCode::FAILURE;
        }
    };

    match engine.verify(&request).await {
        Ok(result) => {
            print_json(&result, cli.pretty);
            ExitCode::SUCCESS
        }
        Err(err) => {
            print_json(&ErrorResponse::from(&err), cli.pretty);
            ExitCode::FAILURE
        }
    }
}

#[cfg_attr(not(feature = "ocr"), allow(dead_code))]
async fn read_request(path: &PathBuf) -> Result<VerifyRequest, String> {
    let text = if path.as_os_str() == "-" {
        use tokio::io::AsyncReadExt;
        let mut buf = String::new();
        tokio::io::stdin()
            .read_to_string(&mut buf)
            .await
            .map_err(|err| format!("reading stdin: {err}"))?;
        buf
    } else {
        tokio::fs::read_to_string(path)
            .await
            .map_err(|err| format!("reading {}: {err}", path.display()))?
    };

    serde_json::from_str(&text).map_err(|err| format!("parsing request: {err}"))
}

#[cfg_attr(not(feature = "ocr"), allow(dead_code))]
fn print_json<T: serde::Serialize>(value: &T, pretty: bool) {
    let rendered = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    match rendered {
        Ok(text) => println!("{text}"),
        Err(err) => eprintln!("veridoc: serializing output: {err}"),
    }
}
