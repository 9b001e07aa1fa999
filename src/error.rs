use std::path::PathBuf;

use miette::Diagnostic;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum FetchError {
    #[error("invalid accession: {0:?}")]
    InvalidAccession(String),

    #[error("accession list file {0} does not exist")]
    MissingAccessionList(PathBuf),

    #[error("failed to read accession list {path}: {message}")]
    AccessionListRead { path: PathBuf, message: String },

    #[error("failed to create output directory {path}: {message}")]
    OutputDir { path: PathBuf, message: String },

    #[error("path is not valid UTF-8: {0}")]
    NonUtf8Path(PathBuf),

    #[error("config file not found at {0}")]
    MissingConfig(PathBuf),

    #[error("failed to read config file at {0}")]
    ConfigRead(PathBuf),

    #[error("failed to parse JSON config: {0}")]
    ConfigParse(String),

    #[error("could not connect to {host}: {message}")]
    Connect { host: String, message: String },

    #[error("login to {host} rejected: {message}")]
    Login { host: String, message: String },

    #[error("failed to close session: {0}")]
    SessionClose(String),

    #[error("remote file not found: {0}")]
    RemoteFileMissing(String),

    #[error("transfer of {path} failed: {message}")]
    Transfer { path: String, message: String },

    #[error("failed to write {path}: {message}")]
    LocalWrite { path: PathBuf, message: String },
}

/// Coarse classification used for exit handling and reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    Configuration,
    Connection,
    Transfer,
}

impl FetchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FetchError::InvalidAccession(_)
            | FetchError::MissingAccessionList(_)
            | FetchError::AccessionListRead { .. }
            | FetchError::OutputDir { .. }
            | FetchError::NonUtf8Path(_)
            | FetchError::MissingConfig(_)
            | FetchError::ConfigRead(_)
            | FetchError::ConfigParse(_) => ErrorKind::Configuration,
            FetchError::Connect { .. } | FetchError::Login { .. } | FetchError::SessionClose(_) => {
                ErrorKind::Connection
            }
            FetchError::RemoteFileMissing(_)
            | FetchError::Transfer { .. }
            | FetchError::LocalWrite { .. } => ErrorKind::Transfer,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_error_kinds() {
        let missing = FetchError::MissingAccessionList(PathBuf::from("list.txt"));
        assert_eq!(missing.kind(), ErrorKind::Configuration);

        let login = FetchError::Login {
            host: "ftp.sra.ebi.ac.uk".to_string(),
            message: "530 Login incorrect".to_string(),
        };
        assert_eq!(login.kind(), ErrorKind::Connection);

        let absent = FetchError::RemoteFileMissing("/vol1/fastq/x".to_string());
        assert_eq!(absent.kind(), ErrorKind::Transfer);
    }
}
