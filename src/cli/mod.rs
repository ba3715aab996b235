pub mod sweep;
pub mod sync;
pub mod transform;

use serde::Serialize;

/// Print a run result either as one human-readable line or as pretty JSON.
pub(crate) fn emit<T: Serialize>(json: bool, value: &T, message: &str) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        println!("{message}");
    }
    Ok(())
}
