//! Local artifact cache: timestamp-named raw downloads plus the retention
//! sweep that keeps the directory bounded.
pub mod freshness;
pub mod retention;
pub mod timestamp;

pub use freshness::{FreshnessDecision, FreshnessGate};
pub use retention::{sweep, sweep_at, SweepReport};
pub use timestamp::TimestampFormat;
