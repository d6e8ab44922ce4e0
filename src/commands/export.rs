use std::path::Path;

use anyhow::Result;
use tracing::info;

use crate::cli::ExportArgs;
use crate::merge::flatten_rows;
use crate::model::{CERTIFICATION_TABLE, INVENTORY_TABLE, KeyedStore, Snapshot, TableExport, TableSpec};
use crate::store;
use crate::util::{now_utc_string, write_json_atomic};

pub fn run(args: ExportArgs) -> Result<()> {
    let snapshot_path = args.snapshot_path();
    let snapshot = store::load_snapshot(&snapshot_path);
    let out_dir = args
        .out_dir
        .clone()
        .unwrap_or_else(|| args.data_root.join("exports"));

    write_table(
        &out_dir.join("inventory_table.json"),
        &snapshot,
        &INVENTORY_TABLE,
        &snapshot.inventory_store,
    )?;
    write_table(
        &out_dir.join("certification_table.json"),
        &snapshot,
        &CERTIFICATION_TABLE,
        &snapshot.certification_store,
    )?;

    Ok(())
}

fn write_table(
    path: &Path,
    snapshot: &Snapshot,
    spec: &TableSpec,
    store: &KeyedStore,
) -> Result<()> {
    let export = TableExport {
        generated_at: now_utc_string(),
        last_updated_timestamp: snapshot.last_updated_timestamp,
        updated_from_source_id: snapshot.updated_from_source_id.clone(),
        header_row: spec.header.iter().map(|name| (*name).to_string()).collect(),
        rows: flatten_rows(store),
    };

    write_json_atomic(path, &export)?;
    info!(path = %path.display(), rows = export.rows.len(), "wrote table export");

    Ok(())
}
