//! Remote file transfer seam.
//!
//! The pipeline only needs five operations from a file server. Every call
//! returns its own error so nothing has to inspect client state after a
//! failure.
use std::path::Path;

use chrono::NaiveDateTime;
use thiserror::Error;

pub mod ftp;

pub use ftp::FtpTransfer;

/// Error text reported by the transfer layer, surfaced verbatim.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct TransferError {
    message: String,
}

impl TransferError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<std::io::Error> for TransferError {
    fn from(e: std::io::Error) -> Self {
        Self::new(e.to_string())
    }
}

pub trait RemoteFileTransfer {
    /// Open the connection and authenticate.
    fn connect(&mut self) -> Result<(), TransferError>;

    fn change_dir(&mut self, path: &str) -> Result<(), TransferError>;

    /// Last-modified instant of `file` in the current remote directory (UTC).
    fn modified_time(&mut self, file: &str) -> Result<NaiveDateTime, TransferError>;

    /// Copy `file` to `local_path`, returning the number of bytes written.
    fn download(&mut self, file: &str, local_path: &Path) -> Result<u64, TransferError>;

    /// Close the connection. Must be safe to call when not connected.
    fn disconnect(&mut self);
}
