pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod normalization;
pub mod orchestrator;
pub mod tabular;
pub mod transfer;

pub mod util {
    pub mod env;
}

pub use error::{SyncError, SyncResult};
pub use orchestrator::{RunOutcome, SyncOrchestrator, SyncState};
