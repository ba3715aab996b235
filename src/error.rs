use std::path::PathBuf;

use thiserror::Error;

use crate::normalization::pricing::PricingError;
use crate::transfer::TransferError;

/// Every way a sync run can stop. All variants are fatal to the current run.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("connection failed: {0}")]
    Connection(#[source] TransferError),

    #[error("cannot change to remote directory `{dir}`: {source}")]
    Directory {
        dir: String,
        #[source]
        source: TransferError,
    },

    #[error("cannot read modification time of `{file}`: {source}")]
    TimestampQuery {
        file: String,
        #[source]
        source: TransferError,
    },

    #[error("download of `{file}` failed: {source}")]
    Download {
        file: String,
        #[source]
        source: TransferError,
    },

    #[error("cannot parse `{}`: {reason}", path.display())]
    Parse { path: PathBuf, reason: String },

    #[error("row {row} (sku `{sku}`): {source}")]
    Compute {
        row: usize,
        sku: String,
        #[source]
        source: PricingError,
    },

    #[error("I/O error on `{}`: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl SyncError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SyncError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn parse(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        SyncError::Parse {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

pub type SyncResult<T> = Result<T, SyncError>;
