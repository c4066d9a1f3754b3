// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for the veridoc-mrz crate. Benchmarks MRZ grouping
// detection plus full TD3 parsing on a realistic OCR line list (a few
// visual-zone lines around the machine-readable block).

use chrono::NaiveDate;
use criterion::{Criterion, black_box, criterion_group, criterion_main};

use veridoc_core::types::OcrLine;
use veridoc_mrz::parse_mrz;

/// Benchmark detection + parsing of the ICAO TD3 specimen embedded in a
/// small page of surrounding OCR noise — the realistic hot path, since most
/// OCR lines are visual-zone text the detector has to skip over.
fn bench_td3_parse(c: &mut Criterion) {
    let lines: Vec<OcrLine> = [
        ("REPUBLIC OF UTOPIA", 0.72),
        ("PASSPORT / PASSEPORT", 0.81),
        ("ERIKSSON, ANNA MARIA", 0.77),
        ("P<UTOERIKSSON<<ANNA<MARIA<<<<<<<<<<<<<<<<<<<", 0.93),
        ("L898902C36UTO7408122F1204159ZE184226B<<<<<10", 0.91),
    ]
    .into_iter()
    .map(|(text, confidence)| OcrLine {
        text: text.to_owned(),
        confidence,
    })
    .collect();
    let today = NaiveDate::from_ymd_opt(2026, 8, 28).unwrap();

    c.bench_function("parse_mrz (TD3, 5 OCR lines)", |b| {
        b.iter(|| {
            let result = parse_mrz(black_box(&lines), black_box(today));
            black_box(result);
        });
    });
}

criterion_group!(benches, bench_td3_parse);
criterion_main!(benches);
