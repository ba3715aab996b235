//! Run settings, read from the environment (`.env` honoured) with CLI overrides
//! applied by the caller.
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::cache::timestamp::{TimestampFormat, DEFAULT_TIME_FORMAT};
use crate::error::{SyncError, SyncResult};
use crate::util::env as env_util;

pub const ENV_FTP_HOST: &str = "FTP_HOST";
pub const ENV_FTP_PORT: &str = "FTP_PORT";
pub const ENV_FTP_USER: &str = "FTP_USER";
pub const ENV_FTP_PASSWORD: &str = "FTP_PASSWORD";
pub const ENV_FTP_TIMEOUT_SECS: &str = "FTP_TIMEOUT_SECS";
pub const ENV_FTP_SSL: &str = "FTP_SSL";
pub const ENV_FTP_PASSIVE: &str = "FTP_PASSIVE";
pub const ENV_REMOTE_DIR: &str = "SYNC_REMOTE_DIR";
pub const ENV_REMOTE_FILE: &str = "SYNC_REMOTE_FILE";
pub const ENV_TIME_FORMAT: &str = "SYNC_TIME_FORMAT";
pub const ENV_RETENTION_HOURS: &str = "SYNC_RETENTION_HOURS";
pub const ENV_LOCAL_DIR: &str = "SYNC_LOCAL_DIR";
pub const ENV_OUTPUT_FILE: &str = "SYNC_OUTPUT_FILE";

/// Every key worth echoing in the preflight snapshot.
pub const ALL_KEYS: [&str; 13] = [
    ENV_FTP_HOST,
    ENV_FTP_PORT,
    ENV_FTP_USER,
    ENV_FTP_PASSWORD,
    ENV_FTP_TIMEOUT_SECS,
    ENV_FTP_SSL,
    ENV_FTP_PASSIVE,
    ENV_REMOTE_DIR,
    ENV_REMOTE_FILE,
    ENV_TIME_FORMAT,
    ENV_RETENTION_HOURS,
    ENV_LOCAL_DIR,
    ENV_OUTPUT_FILE,
];

pub const DEFAULT_FTP_PORT: u16 = 21;
pub const DEFAULT_FTP_TIMEOUT_SECS: u64 = 90;
pub const DEFAULT_REMOTE_DIR: &str = "out";
pub const DEFAULT_REMOTE_FILE: &str = "inventory.csv";
pub const DEFAULT_RETENTION_HOURS: u64 = 24;
pub const DEFAULT_LOCAL_DIR: &str = "updated";
pub const DEFAULT_OUTPUT_FILE: &str = "SellerActive.csv";

/// Where and how to reach the vendor file.
#[derive(Clone)]
pub struct RemoteConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    /// Connect and control-read timeout; `None` leaves it to the OS.
    pub timeout: Option<Duration>,
    /// Explicit FTPS (`AUTH TLS`) before login.
    pub ssl: bool,
    /// Passive data connections; active mode otherwise.
    pub passive: bool,
    /// Directory to change into; empty stays in the login directory.
    pub directory: String,
    pub file: String,
}

impl fmt::Debug for RemoteConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"***")
            .field("timeout", &self.timeout)
            .field("ssl", &self.ssl)
            .field("passive", &self.passive)
            .field("directory", &self.directory)
            .field("file", &self.file)
            .finish()
    }
}

impl RemoteConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let timeout_secs: u64 =
            env_util::env_parse(ENV_FTP_TIMEOUT_SECS, DEFAULT_FTP_TIMEOUT_SECS);
        Ok(Self {
            host: env_util::env_req(ENV_FTP_HOST)?,
            port: env_util::env_parse(ENV_FTP_PORT, DEFAULT_FTP_PORT),
            user: env_util::env_req(ENV_FTP_USER)?,
            password: env_util::env_opt(ENV_FTP_PASSWORD).unwrap_or_default(),
            timeout: (timeout_secs > 0).then(|| Duration::from_secs(timeout_secs)),
            ssl: env_util::env_flag(ENV_FTP_SSL, false),
            passive: env_util::env_flag(ENV_FTP_PASSIVE, false),
            directory: env_util::env_opt(ENV_REMOTE_DIR)
                .unwrap_or_else(|| DEFAULT_REMOTE_DIR.to_string()),
            file: env_util::env_opt(ENV_REMOTE_FILE)
                .unwrap_or_else(|| DEFAULT_REMOTE_FILE.to_string()),
        })
    }
}

/// Local cache layout and retention.
#[derive(Debug, Clone)]
pub struct LocalConfig {
    pub cache_dir: PathBuf,
    pub output_file: String,
    pub time_format: TimestampFormat,
    pub retention: Duration,
}

impl Default for LocalConfig {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from(DEFAULT_LOCAL_DIR),
            output_file: DEFAULT_OUTPUT_FILE.to_string(),
            time_format: TimestampFormat::default(),
            retention: hours(DEFAULT_RETENTION_HOURS),
        }
    }
}

impl LocalConfig {
    pub fn from_env() -> SyncResult<Self> {
        let format_raw = env_util::env_opt(ENV_TIME_FORMAT)
            .unwrap_or_else(|| DEFAULT_TIME_FORMAT.to_string());
        let cfg = Self {
            cache_dir: env_util::env_opt(ENV_LOCAL_DIR)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_LOCAL_DIR)),
            output_file: env_util::env_opt(ENV_OUTPUT_FILE)
                .unwrap_or_else(|| DEFAULT_OUTPUT_FILE.to_string()),
            time_format: TimestampFormat::parse(&format_raw)?,
            retention: hours(env_util::env_parse(
                ENV_RETENTION_HOURS,
                DEFAULT_RETENTION_HOURS,
            )),
        };
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> SyncResult<()> {
        let name = self.output_file.trim();
        if name.is_empty() || name.contains(['/', '\\']) {
            return Err(SyncError::Config(format!(
                "output file must be a plain file name, got `{}`",
                self.output_file
            )));
        }
        Ok(())
    }

    pub fn output_path(&self) -> PathBuf {
        self.cache_dir.join(&self.output_file)
    }
}

#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub remote: RemoteConfig,
    pub local: LocalConfig,
}

impl SyncConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            remote: RemoteConfig::from_env()?,
            local: LocalConfig::from_env()?,
        })
    }
}

pub fn hours(h: u64) -> Duration {
    Duration::from_secs(h.saturating_mul(3600))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_into_updated_dir() {
        let local = LocalConfig::default();
        assert_eq!(local.output_path(), PathBuf::from("updated/SellerActive.csv"));
        assert_eq!(local.retention, Duration::from_secs(24 * 3600));
        assert_eq!(local.time_format.pattern(), DEFAULT_TIME_FORMAT);
    }

    #[test]
    fn output_file_must_be_plain_name() {
        let local = LocalConfig {
            output_file: "../SellerActive.csv".into(),
            ..LocalConfig::default()
        };
        assert!(matches!(local.validate(), Err(SyncError::Config(_))));
    }

    #[test]
    fn remote_defaults_are_active_plain_ftp_with_timeout() {
        std::env::set_var(ENV_FTP_HOST, "ftp.example.com");
        std::env::set_var(ENV_FTP_USER, "vendor");
        for key in [ENV_FTP_TIMEOUT_SECS, ENV_FTP_SSL, ENV_FTP_PASSIVE, ENV_FTP_PORT] {
            std::env::remove_var(key);
        }
        let remote = RemoteConfig::from_env().unwrap();
        assert_eq!(remote.port, 21);
        assert_eq!(remote.timeout, Some(Duration::from_secs(90)));
        assert!(!remote.ssl);
        assert!(!remote.passive);
    }

    #[test]
    fn debug_hides_password() {
        let remote = RemoteConfig {
            host: "ftp.example.com".into(),
            port: 21,
            user: "vendor".into(),
            password: "hunter2".into(),
            timeout: None,
            ssl: false,
            passive: false,
            directory: "out".into(),
            file: "inventory.csv".into(),
        };
        let shown = format!("{remote:?}");
        assert!(!shown.contains("hunter2"));
        assert!(shown.contains("ftp.example.com"));
    }
}
