use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use anyhow::{Result, bail};
use tracing::{info, warn};

use crate::merge::{build_keyed_table, certification_rows, inventory_rows};
use crate::model::{CERTIFICATION_TABLE, INVENTORY_TABLE, SNAPSHOT_VERSION, Snapshot};
use crate::normalize::CellNormalizer;
use crate::report::{ReportLayout, segment_report};
use crate::util::{now_utc_millis, write_json_atomic};

#[derive(Debug, Clone, Copy)]
pub struct UpdateStats {
    pub unit_count: usize,
    pub item_count: usize,
}

/// Reads the persisted snapshot. A missing or unreadable document falls
/// back to a fresh empty snapshot; the run then proceeds as a first run.
pub fn load_snapshot(path: &Path) -> Snapshot {
    let raw = match fs::read(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            info!(path = %path.display(), "no snapshot file yet, starting fresh");
            return Snapshot::default();
        }
        Err(err) => {
            warn!(path = %path.display(), error = %err, "snapshot unreadable, starting fresh");
            return Snapshot::default();
        }
    };

    match serde_json::from_slice(&raw) {
        Ok(snapshot) => snapshot,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "snapshot corrupt, starting fresh");
            Snapshot::default()
        }
    }
}

/// Freshness gate: a source is stale when it was modified after the last
/// recorded update, or when its identity differs from the one the
/// snapshot was built from. A never-updated snapshot fails the identity
/// check and is always stale.
pub fn is_stale(snapshot: &Snapshot, source_id: &str, modified_ms: i64) -> bool {
    let newer = snapshot
        .last_updated_timestamp
        .is_some_and(|last| last < modified_ms);
    let different = snapshot.updated_from_source_id.as_deref() != Some(source_id);
    newer || different
}

/// Parses the report and replaces both stores wholesale. Neither store is
/// touched until both tables have been built, so a structural parse error
/// leaves the snapshot as it was.
pub fn apply_report(
    snapshot: &mut Snapshot,
    raw: &str,
    layout: &ReportLayout,
) -> Result<UpdateStats> {
    let blocks = segment_report(raw, layout)?;
    if blocks.is_empty() {
        bail!("report contained no unit blocks");
    }

    let normalizer = CellNormalizer::new()?;
    let inventory = build_keyed_table(inventory_rows(&blocks, &normalizer), &INVENTORY_TABLE)?;
    let certification = build_keyed_table(
        certification_rows(&blocks, &normalizer)?,
        &CERTIFICATION_TABLE,
    )?;

    let item_count = inventory.values().map(Vec::len).sum();
    snapshot.inventory_store = inventory;
    snapshot.certification_store = certification;

    Ok(UpdateStats {
        unit_count: blocks.len(),
        item_count,
    })
}

/// Stamps the update time and source identity, then atomically replaces
/// the document on disk.
pub fn save_snapshot(path: &Path, snapshot: &mut Snapshot, source_id: &str) -> Result<()> {
    snapshot.snapshot_version = SNAPSHOT_VERSION;
    snapshot.last_updated_timestamp = Some(now_utc_millis());
    snapshot.updated_from_source_id = Some(source_id.to_string());
    write_json_atomic(path, snapshot)
}
