use std::fs;

use anyhow::{Context, Result};
use tracing::info;

use crate::cli::UpdateArgs;
use crate::locate::{ReportSource, find_latest_report};
use crate::report::ReportLayout;
use crate::store;

pub fn run(args: UpdateArgs) -> Result<()> {
    let snapshot_path = args.snapshot_path();

    let source = match &args.report_path {
        Some(path) => Some(ReportSource::from_path(path)?),
        None => find_latest_report(&args.data_root)?,
    };
    let Some(source) = source else {
        info!(
            data_root = %args.data_root.display(),
            "update could not run, no report file was found"
        );
        return Ok(());
    };

    let mut snapshot = store::load_snapshot(&snapshot_path);
    if !args.force && !store::is_stale(&snapshot, &source.id, source.modified_ms) {
        info!(
            file = %source.file_name,
            id = %source.id,
            "snapshot is currently up to date"
        );
        return Ok(());
    }

    let raw = fs::read_to_string(&source.path)
        .with_context(|| format!("failed to read report: {}", source.path.display()))?;

    let stats = store::apply_report(&mut snapshot, &raw, &ReportLayout::default())?;
    store::save_snapshot(&snapshot_path, &mut snapshot, &source.id)?;

    info!(
        file = %source.file_name,
        id = %source.id,
        units = stats.unit_count,
        items = stats.item_count,
        path = %snapshot_path.display(),
        "snapshot updated from newer report"
    );

    Ok(())
}
