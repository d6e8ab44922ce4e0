use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};

use crate::util::sha256_file;

/// A candidate report plus the two freshness tokens the update gate
/// compares: a content hash standing in for identity, and the
/// modification instant in epoch milliseconds.
#[derive(Debug, Clone)]
pub struct ReportSource {
    pub path: PathBuf,
    pub file_name: String,
    pub id: String,
    pub modified_ms: i64,
}

impl ReportSource {
    pub fn from_path(path: &Path) -> Result<Self> {
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .map(ToOwned::to_owned)
            .with_context(|| format!("invalid report file name: {}", path.display()))?;

        let metadata = fs::metadata(path)
            .with_context(|| format!("failed to inspect report: {}", path.display()))?;
        let modified = metadata
            .modified()
            .with_context(|| format!("no modification time for: {}", path.display()))?;
        let modified_ms = epoch_millis(modified);

        let id = sha256_file(path)?;

        Ok(Self {
            path: path.to_path_buf(),
            file_name,
            id,
            modified_ms,
        })
    }
}

/// Scans `dir` for plain-text report files and returns the most recently
/// modified one, or `None` when the directory holds no candidates.
pub fn find_latest_report(dir: &Path) -> Result<Option<ReportSource>> {
    let entries =
        fs::read_dir(dir).with_context(|| format!("failed to read {}", dir.display()))?;

    let mut latest: Option<(SystemTime, PathBuf)> = None;
    for entry in entries {
        let entry = entry.with_context(|| format!("failed to read entry in {}", dir.display()))?;
        let path = entry.path();

        if !entry
            .file_type()
            .with_context(|| format!("failed to inspect file type: {}", path.display()))?
            .is_file()
        {
            continue;
        }

        let is_report = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("txt"))
            .unwrap_or(false);
        if !is_report {
            continue;
        }

        let modified = entry
            .metadata()
            .with_context(|| format!("failed to inspect {}", path.display()))?
            .modified()
            .with_context(|| format!("no modification time for: {}", path.display()))?;

        let newer = latest
            .as_ref()
            .map(|(best, _)| modified > *best)
            .unwrap_or(true);
        if newer {
            latest = Some((modified, path));
        }
    }

    match latest {
        Some((_, path)) => Ok(Some(ReportSource::from_path(&path)?)),
        None => Ok(None),
    }
}

fn epoch_millis(instant: SystemTime) -> i64 {
    instant
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or(0)
}
