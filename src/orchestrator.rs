//! One sync run: connect, read the remote mtime, sweep, gate, fetch, price.
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use crate::cache::{sweep, FreshnessDecision, FreshnessGate, SweepReport};
use crate::config::SyncConfig;
use crate::error::{SyncError, SyncResult};
use crate::normalization::pricing::{price_rows, PricingPolicy};
use crate::tabular::{read_inventory, write_catalog};
use crate::transfer::RemoteFileTransfer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncState {
    Idle,
    Connected,
    DirectoryChanged,
    TimestampKnown,
    UpToDate,
    Fetching,
    Transformed,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FetchSummary {
    pub remote_modified: String,
    pub artifact: PathBuf,
    pub output: PathBuf,
    pub bytes: u64,
    pub rows: usize,
    pub sha256: String,
    pub sweep: SweepReport,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RunOutcome {
    UpToDate {
        remote_modified: String,
        artifact: PathBuf,
        sweep: SweepReport,
    },
    Fetched(FetchSummary),
}

impl RunOutcome {
    pub fn message(&self) -> String {
        match self {
            RunOutcome::UpToDate { artifact, .. } => format!(
                "All up to date and fresh. No need to update ({}).",
                artifact.display()
            ),
            RunOutcome::Fetched(s) => format!(
                "Fetched and transformed successfully: {} rows written to {}",
                s.rows,
                s.output.display()
            ),
        }
    }
}

/// What `status` found without touching the cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    pub remote_file: String,
    pub remote_modified: String,
    pub decision: FreshnessDecision,
}

/// Parse `input`, price every row in order, and write the catalog to `output`.
/// Returns the number of rows written.
pub fn transform_file(policy: &PricingPolicy, input: &Path, output: &Path) -> SyncResult<usize> {
    let rows = read_inventory(input)?;
    let priced = price_rows(policy, &rows).map_err(|(idx, source)| SyncError::Compute {
        row: idx + 1,
        sku: rows[idx].sku.clone(),
        source,
    })?;
    write_catalog(output, &priced)?;
    info!(
        input = %input.display(),
        output = %output.display(),
        rows = priced.len(),
        "catalog transformed"
    );
    Ok(priced.len())
}

pub struct SyncOrchestrator<C: RemoteFileTransfer> {
    client: C,
    config: SyncConfig,
    gate: FreshnessGate,
    policy: PricingPolicy,
    state: SyncState,
}

impl<C: RemoteFileTransfer> SyncOrchestrator<C> {
    pub fn new(client: C, config: SyncConfig) -> Self {
        let gate = FreshnessGate::new(
            config.local.cache_dir.clone(),
            config.local.time_format.clone(),
        );
        Self {
            client,
            config,
            gate,
            policy: PricingPolicy::default(),
            state: SyncState::Idle,
        }
    }

    pub fn with_policy(mut self, policy: PricingPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn state(&self) -> SyncState {
        self.state
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Run the full pipeline once. The connection is closed before returning,
    /// whatever the result.
    pub fn run(&mut self) -> SyncResult<RunOutcome> {
        let result = self.run_pipeline();
        self.client.disconnect();
        match &result {
            Ok(outcome) => info!(state = ?self.state, "{}", outcome.message()),
            Err(e) => {
                self.transition(SyncState::Failed);
                warn!(error = %e, "sync run failed");
            }
        }
        result
    }

    /// Connect and evaluate the gate only: no sweep, no download.
    pub fn status(&mut self) -> SyncResult<StatusReport> {
        let result = self.remote_timestamp().and_then(|remote_modified| {
            let decision = self.gate.decide(&remote_modified)?;
            Ok(StatusReport {
                remote_file: self.config.remote.file.clone(),
                remote_modified: remote_modified.to_string(),
                decision,
            })
        });
        self.client.disconnect();
        if result.is_err() {
            self.transition(SyncState::Failed);
        }
        result
    }

    fn transition(&mut self, next: SyncState) {
        debug!(from = ?self.state, to = ?next, "sync state");
        self.state = next;
    }

    fn remote_timestamp(&mut self) -> SyncResult<chrono::NaiveDateTime> {
        self.client.connect().map_err(SyncError::Connection)?;
        self.transition(SyncState::Connected);

        let dir = self.config.remote.directory.clone();
        if !dir.is_empty() {
            self.client
                .change_dir(&dir)
                .map_err(|source| SyncError::Directory { dir, source })?;
        }
        self.transition(SyncState::DirectoryChanged);

        let file = self.config.remote.file.clone();
        let modified = self
            .client
            .modified_time(&file)
            .map_err(|source| SyncError::TimestampQuery { file, source })?;
        self.transition(SyncState::TimestampKnown);
        Ok(modified)
    }

    fn run_pipeline(&mut self) -> SyncResult<RunOutcome> {
        let remote_modified = self.remote_timestamp()?;
        info!(
            file = %self.config.remote.file,
            remote_modified = %remote_modified,
            "remote modification time"
        );

        let sweep_report = sweep(&self.config.local.cache_dir, self.config.local.retention);
        let decision = self.gate.decide(&remote_modified)?;

        if !decision.should_fetch {
            self.transition(SyncState::UpToDate);
            return Ok(RunOutcome::UpToDate {
                remote_modified: remote_modified.to_string(),
                artifact: decision.local_path,
                sweep: sweep_report,
            });
        }

        self.transition(SyncState::Fetching);
        let bytes = self.fetch(&decision.local_path)?;
        let sha256 = file_sha256(&decision.local_path)?;
        info!(
            artifact = %decision.local_path.display(),
            bytes,
            sha256 = %sha256,
            "remote file downloaded"
        );

        let output = self.config.local.output_path();
        let rows = transform_file(&self.policy, &decision.local_path, &output)?;
        self.transition(SyncState::Transformed);

        Ok(RunOutcome::Fetched(FetchSummary {
            remote_modified: remote_modified.to_string(),
            artifact: decision.local_path,
            output,
            bytes,
            rows,
            sha256,
            sweep: sweep_report,
        }))
    }

    /// Download into a `.part` file and rename into place, so an interrupted
    /// transfer never leaves a file the gate would treat as fresh.
    fn fetch(&mut self, artifact: &Path) -> SyncResult<u64> {
        let dir = &self.config.local.cache_dir;
        fs::create_dir_all(dir).map_err(|e| SyncError::io(dir, e))?;

        let mut part_name = artifact
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        part_name.push(".part");
        let part = artifact.with_file_name(part_name);

        let file = self.config.remote.file.clone();
        let bytes = match self.client.download(&file, &part) {
            Ok(bytes) => bytes,
            Err(source) => {
                let _ = fs::remove_file(&part);
                return Err(SyncError::Download { file, source });
            }
        };
        fs::rename(&part, artifact).map_err(|e| {
            let _ = fs::remove_file(&part);
            SyncError::io(artifact, e)
        })?;
        Ok(bytes)
    }
}

fn file_sha256(path: &Path) -> SyncResult<String> {
    let mut file = fs::File::open(path).map_err(|e| SyncError::io(path, e))?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 64 * 1024];
    loop {
        let n = file.read(&mut buf).map_err(|e| SyncError::io(path, e))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(format!("{:x}", hasher.finalize()))
}
