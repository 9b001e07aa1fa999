use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::net::ToSocketAddrs;
use std::path::Path;
use std::time::Instant;

use suppaftp::types::FileType;
use suppaftp::{FtpError, FtpStream, Status};

use crate::config::FetchConfig;
use crate::error::FetchError;

const COPY_BUFFER_LEN: usize = 64 * 1024;

/// An open connection to the read archive. One session serves a whole batch;
/// `close` consumes it so a closed session cannot be reused.
pub trait ArchiveSession {
    /// Copies `remote_path` into `destination`, truncating any existing file,
    /// and returns the number of bytes written.
    fn retrieve(&mut self, remote_path: &str, destination: &Path) -> Result<u64, FetchError>;

    fn close(self) -> Result<(), FetchError>
    where
        Self: Sized;
}

pub struct FtpSession {
    stream: FtpStream,
    host: String,
}

impl FtpSession {
    pub fn connect(config: &FetchConfig) -> Result<Self, FetchError> {
        let host = config.host.clone();
        let connect_err = |message: String| FetchError::Connect {
            host: host.clone(),
            message,
        };

        let addr = (config.host.as_str(), config.port)
            .to_socket_addrs()
            .map_err(|err| connect_err(err.to_string()))?
            .next()
            .ok_or_else(|| connect_err("host did not resolve to any address".to_string()))?;

        tracing::debug!(%addr, "opening FTP session");
        let mut stream = FtpStream::connect_timeout(addr, config.connect_timeout())
            .map_err(|err| connect_err(err.to_string()))?;
        stream
            .get_ref()
            .set_read_timeout(Some(config.read_timeout()))
            .map_err(|err| connect_err(err.to_string()))?;

        stream
            .login(config.user.as_str(), config.password.as_str())
            .map_err(|err| FetchError::Login {
                host: host.clone(),
                message: err.to_string(),
            })?;
        stream
            .transfer_type(FileType::Binary)
            .map_err(|err| connect_err(err.to_string()))?;

        tracing::info!(host = %host, user = %config.user, "FTP session established");
        Ok(Self { stream, host })
    }
}

impl ArchiveSession for FtpSession {
    fn retrieve(&mut self, remote_path: &str, destination: &Path) -> Result<u64, FetchError> {
        let file = File::create(destination).map_err(|err| local_write(destination, err))?;
        let mut writer = BufWriter::new(file);

        let start = Instant::now();
        let mut data = self
            .stream
            .retr_as_stream(remote_path)
            .map_err(|err| transfer_error(remote_path, err))?;
        let copied = copy_to_local(&mut data, &mut writer, remote_path, destination);
        // The closing reply has to be consumed even when the copy failed,
        // otherwise it answers the next command on the control channel.
        let finalized = self
            .stream
            .finalize_retr_stream(data)
            .map_err(|err| transfer_error(remote_path, err));
        let bytes = copied?;
        finalized?;

        tracing::debug!(
            remote = remote_path,
            bytes,
            latency_ms = start.elapsed().as_millis() as u64,
            "transfer finished"
        );
        Ok(bytes)
    }

    fn close(mut self) -> Result<(), FetchError> {
        tracing::debug!(host = %self.host, "closing FTP session");
        self.stream
            .quit()
            .map_err(|err| FetchError::SessionClose(err.to_string()))
    }
}

/// Read faults belong to the data connection, write faults to the local file.
fn copy_to_local<R: Read, W: Write>(
    reader: &mut R,
    writer: &mut W,
    remote_path: &str,
    destination: &Path,
) -> Result<u64, FetchError> {
    let mut buf = vec![0u8; COPY_BUFFER_LEN];
    let mut total = 0u64;
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => {
                return Err(FetchError::Transfer {
                    path: remote_path.to_string(),
                    message: err.to_string(),
                });
            }
        };
        writer
            .write_all(&buf[..n])
            .map_err(|err| local_write(destination, err))?;
        total += n as u64;
    }
    writer.flush().map_err(|err| local_write(destination, err))?;
    Ok(total)
}

fn local_write(destination: &Path, err: io::Error) -> FetchError {
    FetchError::LocalWrite {
        path: destination.to_path_buf(),
        message: err.to_string(),
    }
}

fn transfer_error(remote_path: &str, err: FtpError) -> FetchError {
    match err {
        FtpError::UnexpectedResponse(ref response)
            if matches!(response.status, Status::FileUnavailable) =>
        {
            FetchError::RemoteFileMissing(remote_path.to_string())
        }
        other => FetchError::Transfer {
            path: remote_path.to_string(),
            message: other.to_string(),
        },
    }
}
