// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Field fusion: merges the ordered per-image extractions into one canonical
// record.
//
// Per-field selection is confidence-based and deterministic: the candidate
// with the strictly greatest confidence wins, and an exact tie goes to the
// earlier source. The canonical MRZ block deliberately follows a different
// rule — the last image (submission order) with a parseable MRZ supplies
// the raw block and its checks wholesale, even though the earlier images'
// individual field values still competed above. Barcode payloads and OCR
// lines are concatenated across images without deduplication; they are
// audit evidence, not decision input.

use veridoc_core::types::{
    CanonicalField, CanonicalRecord, FusedField, MrzBlock, RawExtraction,
};

/// Fuse the ordered extraction list into a canonical record.
///
/// Pure and deterministic: the same ordered input always produces an
/// identical record.
pub fn fuse(extractions: &[RawExtraction]) -> CanonicalRecord {
    let mut record = CanonicalRecord::default();

    for (source_index, extraction) in extractions.iter().enumerate() {
        record.text_lines.extend(extraction.ocr.lines.iter().cloned());
        record.barcodes.extend(extraction.barcodes.iter().cloned());

        let Some(mrz) = &extraction.mrz else {
            continue;
        };
        // Last parseable MRZ wins at block granularity.
        record.mrz = Some(MrzBlock {
            raw: mrz.raw.clone(),
            checks: mrz.checks.clone(),
        });
        for field in &mrz.fields {
            let replace = match record.fields.get(&field.name) {
                // Strictly greater only: an equal-confidence later source
                // must not displace the earlier winner.
                Some(current) => field.confidence > current.confidence,
                None => true,
            };
            if replace {
                record.fields.insert(
                    field.name,
                    FusedField {
                        value: field.value.clone(),
                        confidence: field.confidence,
                        source_index,
                    },
                );
            }
        }
    }

    synthesize_full_name(&mut record);
    record
}

/// Build `fullName` from `surname` + `givenNames` when no source supplied
/// it directly. The synthesized field takes the minimum of the contributing
/// confidences and the earlier contributor's source index.
fn synthesize_full_name(record: &mut CanonicalRecord) {
    if record.fields.contains_key(&CanonicalField::FullName) {
        return;
    }
    let surname = record.fields.get(&CanonicalField::Surname);
    let given = record.fields.get(&CanonicalField::GivenNames);

    let value = [surname, given]
        .iter()
        .flatten()
        .map(|f| f.value.as_str())
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_owned();
    if value.is_empty() {
        return;
    }

    let contributors: Vec<&FusedField> = [surname, given].into_iter().flatten().collect();
    let confidence = contributors
        .iter()
        .map(|f| f.confidence)
        .fold(f64::INFINITY, f64::min);
    let source_index = contributors
        .iter()
        .map(|f| f.source_index)
        .min()
        .unwrap_or(0);

    record.fields.insert(
        CanonicalField::FullName,
        FusedField {
            value,
            confidence,
            source_index,
        },
    );
}
