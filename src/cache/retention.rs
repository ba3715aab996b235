use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use serde::Serialize;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    pub removed: Vec<PathBuf>,
    pub retained: usize,
    pub failed: usize,
}

/// Delete regular files directly under `dir` older than `max_age`.
pub fn sweep(dir: &Path, max_age: Duration) -> SweepReport {
    sweep_at(dir, max_age, SystemTime::now())
}

/// Same as [`sweep`] with an explicit clock.
///
/// Age is the absolute distance between `now` and the file's mtime, so files
/// stamped in the future age too. Subdirectories and dot-files are skipped.
/// Per-entry failures are logged and counted, never returned.
pub fn sweep_at(dir: &Path, max_age: Duration, now: SystemTime) -> SweepReport {
    let mut report = SweepReport::default();
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(dir = %dir.display(), "cache directory missing; nothing to sweep");
            return report;
        }
        Err(e) => {
            warn!(dir = %dir.display(), error = %e, "cannot list cache directory; sweep skipped");
            report.failed += 1;
            return report;
        }
    };

    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "unreadable directory entry");
                report.failed += 1;
                continue;
            }
        };
        if entry.file_name().to_string_lossy().starts_with('.') {
            continue;
        }
        let path = entry.path();
        let meta = match entry.metadata() {
            Ok(meta) => meta,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "cannot stat cache entry");
                report.failed += 1;
                continue;
            }
        };
        if !meta.is_file() {
            continue;
        }
        let modified = match meta.modified() {
            Ok(t) => t,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "no mtime for cache entry");
                report.failed += 1;
                continue;
            }
        };
        let age = now
            .duration_since(modified)
            .unwrap_or_else(|e| e.duration());
        if age <= max_age {
            report.retained += 1;
            continue;
        }
        match std::fs::remove_file(&path) {
            Ok(()) => {
                debug!(path = %path.display(), age_secs = age.as_secs(), "removed stale artifact");
                report.removed.push(path);
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to remove stale artifact");
                report.failed += 1;
            }
        }
    }

    info!(
        dir = %dir.display(),
        removed = report.removed.len(),
        retained = report.retained,
        failed = report.failed,
        "retention sweep done"
    );
    report
}
