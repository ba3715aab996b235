use std::path::PathBuf;

use anyhow::{anyhow, Result};
use serde_json::json;

use crate::config::LocalConfig;
use crate::normalization::PricingPolicy;
use crate::orchestrator::transform_file;

#[derive(Debug, Clone)]
pub struct TransformConfig {
    pub input: PathBuf,
    /// Defaults to `<SYNC_LOCAL_DIR>/<SYNC_OUTPUT_FILE>`.
    pub output: Option<PathBuf>,
    pub json: bool,
}

/// Price a local inventory file without contacting the server.
pub fn run(cfg: TransformConfig) -> Result<()> {
    let output = match cfg.output {
        Some(path) => path,
        None => LocalConfig::from_env()?.output_path(),
    };
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .map_err(|e| anyhow!("cannot create {}: {e}", parent.display()))?;
    }
    let rows = transform_file(&PricingPolicy::default(), &cfg.input, &output)?;
    let message = format!("{rows} rows written to {}", output.display());
    let value = json!({
        "input": cfg.input,
        "output": output,
        "rows": rows,
    });
    super::emit(cfg.json, &value, &message)
}
