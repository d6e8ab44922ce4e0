use anyhow::Result;
use chrono::DateTime;
use tracing::{info, warn};

use crate::cli::StatusArgs;
use crate::store;

pub fn run(args: StatusArgs) -> Result<()> {
    let snapshot_path = args.snapshot_path();

    if !snapshot_path.exists() {
        warn!(path = %snapshot_path.display(), "snapshot file missing");
        return Ok(());
    }

    let snapshot = store::load_snapshot(&snapshot_path);

    let last_updated = snapshot
        .last_updated_timestamp
        .and_then(DateTime::from_timestamp_millis)
        .map(|instant| instant.to_rfc3339())
        .unwrap_or_else(|| "never".to_string());
    let inventory_rows: usize = snapshot.inventory_store.values().map(Vec::len).sum();
    let certification_rows: usize = snapshot.certification_store.values().map(Vec::len).sum();

    info!(
        path = %snapshot_path.display(),
        version = snapshot.snapshot_version,
        last_updated = %last_updated,
        updated_from = %snapshot.updated_from_source_id.unwrap_or_default(),
        inventory_items = snapshot.inventory_store.len(),
        inventory_rows,
        certification_units = snapshot.certification_store.len(),
        certification_rows,
        "snapshot status"
    );

    Ok(())
}
