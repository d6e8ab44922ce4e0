use anyhow::{Context, Result};
use serde_json::Value;

use crate::decode::decode_item_line;
use crate::model::{CERTIFICATION_TABLE, Entry, INVENTORY_TABLE, KeyedStore, TableSpec};
use crate::normalize::CellNormalizer;
use crate::report::UnitBlock;

// Positions of the certification figures within a unit's summary pairs.
// Fixed by the report's analysis section; a format drift breaks these first.
const FOUND_COUNT_PAIR: usize = 0;
const TOTAL_COUNT_PAIR: usize = 1;
const UNFOUND_DEPR_PAIR: usize = 9;
const TOTAL_DEPR_PAIR: usize = 10;

/// Decodes every item line against its own unit's ruler and appends the
/// unit code as the trailing column. Decoded cells are normalized; the
/// appended code is emitted verbatim.
pub fn inventory_rows(blocks: &[UnitBlock], normalizer: &CellNormalizer) -> Vec<Vec<String>> {
    let strip = INVENTORY_TABLE.strip_item_marker;
    let mut rows = Vec::new();

    for block in blocks {
        for line in &block.item_lines {
            let mut row: Vec<String> = decode_item_line(line, &block.spacing_ruler)
                .iter()
                .map(|cell| normalizer.normalize(cell, strip))
                .collect();
            row.push(block.code.clone());
            rows.push(row);
        }
    }

    rows
}

/// One row per unit: code plus the found/total counts and the two
/// depreciation figures picked out of the summary pairs.
pub fn certification_rows(
    blocks: &[UnitBlock],
    normalizer: &CellNormalizer,
) -> Result<Vec<Vec<String>>> {
    let strip = CERTIFICATION_TABLE.strip_item_marker;

    blocks
        .iter()
        .map(|block| {
            let pick = |index: usize| -> Result<String> {
                let (_, value) = block.summary_pairs.get(index).with_context(|| {
                    format!(
                        "unit {} has {} summary pairs, needs at least {}",
                        block.code,
                        block.summary_pairs.len(),
                        index + 1
                    )
                })?;
                Ok(normalizer.normalize(value, strip))
            };

            Ok(vec![
                block.code.clone(),
                pick(FOUND_COUNT_PAIR)?,
                pick(TOTAL_COUNT_PAIR)?,
                pick(UNFOUND_DEPR_PAIR)?,
                pick(TOTAL_DEPR_PAIR)?,
            ])
        })
        .collect()
}

/// Groups rows by their key column into a fresh store. Every build
/// re-derives the whole map, so the ascending key order is total, never
/// an incremental insert.
pub fn build_keyed_table(rows: Vec<Vec<String>>, spec: &TableSpec) -> Result<KeyedStore> {
    let mut store = KeyedStore::new();

    for row in rows {
        let key = row
            .get(spec.key_column)
            .cloned()
            .with_context(|| format!("row is missing key column {}", spec.key_column))?;
        let entry: Entry = spec
            .header
            .iter()
            .zip(row)
            .map(|(name, cell)| ((*name).to_string(), Value::String(cell)))
            .collect();
        store.entry(key).or_default().push(entry);
    }

    Ok(store)
}

/// Presentation view: rows in ascending key order, then per-key encounter
/// order, cells in header order.
pub fn flatten_rows(store: &KeyedStore) -> Vec<Vec<String>> {
    store
        .values()
        .flatten()
        .map(|entry| {
            entry
                .values()
                .map(|value| value.as_str().unwrap_or_default().to_string())
                .collect()
        })
        .collect()
}
