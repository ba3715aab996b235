//! Environment helpers: centralized dotenv loading and ergonomic getters.
//! Call `init_env()` once early in each binary (or rely on lazy Once).
use std::str::FromStr;
use std::sync::Once;
use tracing::{info, warn};

static INIT: Once = Once::new();

/// Load .env exactly once. Safe to call many times.
pub fn init_env() {
    INIT.call_once(|| {
        if dotenv::dotenv().is_ok() {
            return;
        }
        // Fallback to Cargo project root
        let candidate = format!("{}/.env", env!("CARGO_MANIFEST_DIR"));
        let _ = dotenv::from_filename(candidate);
    });
}

/// Get required env var; error if missing or empty.
pub fn env_req(key: &str) -> anyhow::Result<String> {
    env_opt(key).ok_or_else(|| anyhow::anyhow!("missing env var {key}"))
}

/// Get optional env var (None if unset or empty).
pub fn env_opt(key: &str) -> Option<String> {
    init_env();
    match std::env::var(key) {
        Ok(v) if !v.trim().is_empty() => Some(v),
        _ => None,
    }
}

/// Get parsed value with default fallback. Unparseable values are logged and
/// replaced by the default.
pub fn env_parse<T>(key: &str, default: T) -> T
where
    T: FromStr + Clone,
{
    init_env();
    match std::env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => match raw.trim().parse::<T>() {
            Ok(v) => v,
            Err(_) => {
                warn!(target = "env", key, value = %raw, "unparseable value; using default");
                default
            }
        },
        _ => default,
    }
}

/// Boolean flag; 1/true/on/yes (any case) are true, anything else set is
/// false. Unset or blank keeps `default`.
pub fn env_flag(key: &str, default: bool) -> bool {
    init_env();
    match std::env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => {
            let v = raw.trim().to_ascii_lowercase();
            matches!(v.as_str(), "1" | "true" | "on" | "yes")
        }
        _ => default,
    }
}

pub(crate) fn redact_value(key: &str, val: &str) -> String {
    let k = key.to_ascii_uppercase();
    if k.contains("PASSWORD")
        || k.contains("SECRET")
        || k.contains("KEY")
        || k.contains("TOKEN")
    {
        return if val.is_empty() {
            String::new()
        } else {
            "***".to_string()
        };
    }
    val.trim().to_string()
}

/// Validate required keys and log a consolidated, redacted snapshot of configuration.
/// Returns error if any required key is missing.
pub fn preflight_check(title: &str, required: &[&str], also_log: &[&str]) -> anyhow::Result<()> {
    init_env();
    let missing: Vec<&str> = required
        .iter()
        .copied()
        .filter(|k| env_opt(k).is_none())
        .collect();
    let snapshot: Vec<(String, String)> = also_log
        .iter()
        .map(|&k| {
            let v = env_opt(k).unwrap_or_default();
            (k.to_string(), redact_value(k, &v))
        })
        .collect();
    info!(target = "preflight", title, snapshot = ?snapshot, "configuration snapshot");
    if !missing.is_empty() {
        return Err(anyhow::anyhow!("missing required env: {:?}", missing));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redacts_secrets_only() {
        assert_eq!(redact_value("FTP_PASSWORD", "hunter2"), "***");
        assert_eq!(redact_value("FTP_PASSWORD", ""), "");
        assert_eq!(redact_value("FTP_HOST", " ftp.example.com "), "ftp.example.com");
    }

    #[test]
    fn parse_falls_back_to_default() {
        std::env::set_var("INVENTORY_SYNC_TEST_PARSE", "not-a-number");
        assert_eq!(env_parse("INVENTORY_SYNC_TEST_PARSE", 24u64), 24);
        std::env::set_var("INVENTORY_SYNC_TEST_PARSE", " 48 ");
        assert_eq!(env_parse("INVENTORY_SYNC_TEST_PARSE", 24u64), 48);
        assert_eq!(env_parse("INVENTORY_SYNC_TEST_UNSET", 7u16), 7);
    }

    #[test]
    fn flags_accept_common_spellings() {
        std::env::set_var("INVENTORY_SYNC_TEST_FLAG", " Yes ");
        assert!(env_flag("INVENTORY_SYNC_TEST_FLAG", false));
        std::env::set_var("INVENTORY_SYNC_TEST_FLAG", "off");
        assert!(!env_flag("INVENTORY_SYNC_TEST_FLAG", true));
        std::env::set_var("INVENTORY_SYNC_TEST_FLAG", "  ");
        assert!(env_flag("INVENTORY_SYNC_TEST_FLAG", true));
        assert!(!env_flag("INVENTORY_SYNC_TEST_FLAG_UNSET", false));
    }
}
