use std::fs::File;
use std::io;
use std::net::ToSocketAddrs;
use std::path::Path;
use std::time::Duration;

use chrono::NaiveDateTime;
use suppaftp::native_tls::TlsConnector;
use suppaftp::types::FileType;
use suppaftp::{FtpError, Mode, NativeTlsConnector, NativeTlsFtpStream};
use tracing::{debug, info};

use super::{RemoteFileTransfer, TransferError};
use crate::config::RemoteConfig;

/// Blocking FTP client, plain or explicit FTPS, active mode unless passive
/// is asked for. The control connection is closed on `disconnect` and again
/// (best effort) when the value is dropped.
pub struct FtpTransfer {
    host: String,
    port: u16,
    user: String,
    password: String,
    timeout: Option<Duration>,
    ssl: bool,
    passive: bool,
    stream: Option<NativeTlsFtpStream>,
}

impl FtpTransfer {
    pub fn new(cfg: &RemoteConfig) -> Self {
        Self {
            host: cfg.host.clone(),
            port: cfg.port,
            user: cfg.user.clone(),
            password: cfg.password.clone(),
            timeout: cfg.timeout,
            ssl: cfg.ssl,
            passive: cfg.passive,
            stream: None,
        }
    }

    fn mode(&self) -> Mode {
        if self.passive {
            Mode::Passive
        } else {
            Mode::Active
        }
    }

    fn open(&self) -> Result<NativeTlsFtpStream, TransferError> {
        let stream = match self.timeout {
            Some(timeout) => {
                let addr = (self.host.as_str(), self.port)
                    .to_socket_addrs()?
                    .next()
                    .ok_or_else(|| {
                        TransferError::new(format!("cannot resolve {}:{}", self.host, self.port))
                    })?;
                let stream = NativeTlsFtpStream::connect_timeout(addr, timeout).map_err(ftp_err)?;
                stream.get_ref().set_read_timeout(Some(timeout))?;
                stream
            }
            None => NativeTlsFtpStream::connect((self.host.as_str(), self.port)).map_err(ftp_err)?,
        };
        if !self.ssl {
            return Ok(stream);
        }
        let connector = TlsConnector::new()
            .map_err(|e| TransferError::new(format!("tls setup failed: {e}")))?;
        stream
            .into_secure(NativeTlsConnector::from(connector), &self.host)
            .map_err(ftp_err)
    }

    fn stream(&mut self) -> Result<&mut NativeTlsFtpStream, TransferError> {
        self.stream
            .as_mut()
            .ok_or_else(|| TransferError::new("not connected"))
    }
}

fn ftp_err(e: FtpError) -> TransferError {
    TransferError::new(e.to_string())
}

impl RemoteFileTransfer for FtpTransfer {
    fn connect(&mut self) -> Result<(), TransferError> {
        let mut stream = self.open()?;
        stream
            .login(self.user.as_str(), self.password.as_str())
            .map_err(ftp_err)?;
        stream.set_mode(self.mode());
        stream.transfer_type(FileType::Binary).map_err(ftp_err)?;
        info!(
            host = %self.host,
            port = self.port,
            user = %self.user,
            ssl = self.ssl,
            passive = self.passive,
            "ftp connected"
        );
        self.stream = Some(stream);
        Ok(())
    }

    fn change_dir(&mut self, path: &str) -> Result<(), TransferError> {
        self.stream()?.cwd(path).map_err(ftp_err)
    }

    fn modified_time(&mut self, file: &str) -> Result<NaiveDateTime, TransferError> {
        self.stream()?.mdtm(file).map_err(ftp_err)
    }

    fn download(&mut self, file: &str, local_path: &Path) -> Result<u64, TransferError> {
        let stream = self.stream()?;
        let mut out = File::create(local_path)?;
        let bytes = stream
            .retr(file, |reader| {
                io::copy(reader, &mut out).map_err(FtpError::ConnectionError)
            })
            .map_err(ftp_err)?;
        out.sync_all()?;
        debug!(file, bytes, local = %local_path.display(), "ftp retr complete");
        Ok(bytes)
    }

    fn disconnect(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            if let Err(e) = stream.quit() {
                debug!(error = %e, "ftp quit failed; dropping connection");
            }
        }
    }
}

impl Drop for FtpTransfer {
    fn drop(&mut self) {
        self.disconnect();
    }
}
