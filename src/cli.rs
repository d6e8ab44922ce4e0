use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "nvp1",
    version,
    about = "NVP1 inventory audit extraction and reporting store"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Update(UpdateArgs),
    Status(StatusArgs),
    Export(ExportArgs),
}

#[derive(Args, Debug, Clone)]
pub struct UpdateArgs {
    #[arg(long, default_value = ".")]
    pub data_root: PathBuf,

    #[arg(long)]
    pub report_path: Option<PathBuf>,

    #[arg(long)]
    pub snapshot_path: Option<PathBuf>,

    #[arg(long, default_value_t = false)]
    pub force: bool,
}

#[derive(Args, Debug, Clone)]
pub struct StatusArgs {
    #[arg(long, default_value = ".")]
    pub data_root: PathBuf,

    #[arg(long)]
    pub snapshot_path: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct ExportArgs {
    #[arg(long, default_value = ".")]
    pub data_root: PathBuf,

    #[arg(long)]
    pub snapshot_path: Option<PathBuf>,

    #[arg(long)]
    pub out_dir: Option<PathBuf>,
}

impl UpdateArgs {
    pub fn snapshot_path(&self) -> PathBuf {
        resolve_snapshot_path(&self.data_root, self.snapshot_path.as_ref())
    }
}

impl StatusArgs {
    pub fn snapshot_path(&self) -> PathBuf {
        resolve_snapshot_path(&self.data_root, self.snapshot_path.as_ref())
    }
}

impl ExportArgs {
    pub fn snapshot_path(&self) -> PathBuf {
        resolve_snapshot_path(&self.data_root, self.snapshot_path.as_ref())
    }
}

fn resolve_snapshot_path(data_root: &Path, explicit: Option<&PathBuf>) -> PathBuf {
    explicit
        .cloned()
        .unwrap_or_else(|| data_root.join("database_inventory.json"))
}
