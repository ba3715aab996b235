use std::path::PathBuf;

use anyhow::Result;

use crate::cache::sweep;
use crate::config::{hours, LocalConfig};

#[derive(Debug, Clone, Default)]
pub struct SweepConfig {
    pub dir: Option<PathBuf>,
    pub retention_hours: Option<u64>,
    pub json: bool,
}

pub fn run(cfg: SweepConfig) -> Result<()> {
    let local = LocalConfig::from_env()?;
    let dir = cfg.dir.unwrap_or(local.cache_dir);
    let max_age = cfg.retention_hours.map(hours).unwrap_or(local.retention);
    let report = sweep(&dir, max_age);
    let message = format!(
        "swept {}: removed {}, kept {}, failed {}",
        dir.display(),
        report.removed.len(),
        report.retained,
        report.failed
    );
    super::emit(cfg.json, &report, &message)
}
