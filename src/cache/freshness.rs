use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use serde::Serialize;
use tracing::debug;

use super::timestamp::TimestampFormat;
use crate::error::SyncResult;

pub const ARTIFACT_EXTENSION: &str = "csv";

/// Result of checking the cache for a remote version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FreshnessDecision {
    pub should_fetch: bool,
    pub local_path: PathBuf,
    pub token: String,
}

/// Decides whether a remote version still has to be downloaded.
///
/// The local artifact for a remote instant is `<dir>/<token>.csv`. A regular
/// file at that path means the version was already fetched; its contents
/// are never inspected.
#[derive(Debug, Clone)]
pub struct FreshnessGate {
    dir: PathBuf,
    format: TimestampFormat,
}

impl FreshnessGate {
    pub fn new(dir: impl Into<PathBuf>, format: TimestampFormat) -> Self {
        Self {
            dir: dir.into(),
            format,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn artifact_path(&self, remote_modified: &NaiveDateTime) -> SyncResult<(String, PathBuf)> {
        let token = self.format.token(remote_modified)?;
        let path = self.dir.join(format!("{token}.{ARTIFACT_EXTENSION}"));
        Ok((token, path))
    }

    pub fn decide(&self, remote_modified: &NaiveDateTime) -> SyncResult<FreshnessDecision> {
        let (token, local_path) = self.artifact_path(remote_modified)?;
        let should_fetch = !local_path.is_file();
        debug!(
            token = %token,
            path = %local_path.display(),
            should_fetch,
            "freshness decision"
        );
        Ok(FreshnessDecision {
            should_fetch,
            local_path,
            token,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn instant(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2017, 2, 8)
            .and_then(|d| d.and_hms_opt(h, m, s))
            .expect("valid date")
    }

    fn gate(dir: &Path) -> FreshnessGate {
        FreshnessGate::new(dir, TimestampFormat::parse("Y-m-d_H-i-s").unwrap())
    }

    #[test]
    fn second_decision_is_fresh_once_artifact_exists() {
        let tmp = tempfile::tempdir().unwrap();
        let gate = gate(tmp.path());
        let at = instant(13, 56, 0);

        let first = gate.decide(&at).unwrap();
        assert!(first.should_fetch);
        assert_eq!(first.local_path, tmp.path().join("2017-02-08_13-56-00.csv"));

        std::fs::write(&first.local_path, b"sku,price\n").unwrap();
        let second = gate.decide(&at).unwrap();
        assert!(!second.should_fetch);
        assert_eq!(second.local_path, first.local_path);
    }

    #[test]
    fn same_instant_same_path() {
        let a = gate(Path::new("updated"));
        let b = gate(Path::new("updated"));
        let at = instant(13, 56, 0);
        assert_eq!(
            a.decide(&at).unwrap().local_path,
            b.decide(&at).unwrap().local_path
        );
        assert_ne!(
            a.decide(&at).unwrap().local_path,
            a.decide(&instant(13, 56, 1)).unwrap().local_path
        );
    }

    #[test]
    fn directory_with_artifact_name_is_not_fresh() {
        let tmp = tempfile::tempdir().unwrap();
        let gate = gate(tmp.path());
        std::fs::create_dir(tmp.path().join("2017-02-08_13-56-00.csv")).unwrap();
        assert!(gate.decide(&instant(13, 56, 0)).unwrap().should_fetch);
    }

    #[test]
    fn older_artifacts_do_not_count() {
        let tmp = tempfile::tempdir().unwrap();
        let gate = gate(tmp.path());
        std::fs::write(tmp.path().join("2017-02-07_09-00-00.csv"), b"").unwrap();
        assert!(gate.decide(&instant(13, 56, 0)).unwrap().should_fetch);
    }
}
