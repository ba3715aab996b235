use std::path::PathBuf;

use anyhow::Result;
use tracing::info;

use crate::cache::TimestampFormat;
use crate::config::{self, hours, SyncConfig};
use crate::orchestrator::SyncOrchestrator;
use crate::transfer::FtpTransfer;
use crate::util::env as env_util;

#[derive(Debug, Clone, Default)]
pub struct SyncCommandConfig {
    /// Override for SYNC_LOCAL_DIR.
    pub local_dir: Option<PathBuf>,
    /// Override for SYNC_RETENTION_HOURS.
    pub retention_hours: Option<u64>,
    /// Override for SYNC_TIME_FORMAT.
    pub time_format: Option<String>,
    pub json: bool,
}

fn load(cfg: &SyncCommandConfig) -> Result<SyncConfig> {
    env_util::preflight_check(
        "inventory_sync",
        &[config::ENV_FTP_HOST, config::ENV_FTP_USER],
        &config::ALL_KEYS,
    )?;
    let mut sync_cfg = SyncConfig::from_env()?;
    if let Some(dir) = &cfg.local_dir {
        sync_cfg.local.cache_dir = dir.clone();
    }
    if let Some(h) = cfg.retention_hours {
        sync_cfg.local.retention = hours(h);
    }
    if let Some(fmt) = &cfg.time_format {
        sync_cfg.local.time_format = TimestampFormat::parse(fmt)?;
    }
    Ok(sync_cfg)
}

/// Full run: fetch when the remote file is newer than the cache, then price it.
pub fn run(cfg: SyncCommandConfig) -> Result<()> {
    let sync_cfg = load(&cfg)?;
    info!(remote = ?sync_cfg.remote, local = ?sync_cfg.local, "starting sync");
    let client = FtpTransfer::new(&sync_cfg.remote);
    let mut orchestrator = SyncOrchestrator::new(client, sync_cfg);
    let outcome = orchestrator.run()?;
    super::emit(cfg.json, &outcome, &outcome.message())
}

/// Report the freshness decision without sweeping or downloading.
pub fn status(cfg: SyncCommandConfig) -> Result<()> {
    let sync_cfg = load(&cfg)?;
    let client = FtpTransfer::new(&sync_cfg.remote);
    let mut orchestrator = SyncOrchestrator::new(client, sync_cfg);
    let report = orchestrator.status()?;
    let message = if report.decision.should_fetch {
        format!(
            "{} modified {}: not cached yet, next sync will fetch {}",
            report.remote_file,
            report.remote_modified,
            report.decision.local_path.display()
        )
    } else {
        format!(
            "{} modified {}: up to date ({})",
            report.remote_file,
            report.remote_modified,
            report.decision.local_path.display()
        )
    };
    super::emit(cfg.json, &report, &message)
}
