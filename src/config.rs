use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::BaseDirs;
use serde::{Deserialize, Serialize};

use crate::error::FetchError;

pub const CONFIG_FILE_NAME: &str = "kira-ena-fetch.json";

pub const DEFAULT_HOST: &str = "ftp.sra.ebi.ac.uk";
pub const DEFAULT_BASE_PATH: &str = "/vol1/fastq";

/// Connection settings for the archive. Every field may be omitted from the
/// JSON file; missing fields fall back to the public ENA host with an
/// anonymous login.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct FetchConfig {
    pub host: String,
    pub port: u16,
    pub base_path: String,
    pub user: String,
    pub password: String,
    pub connect_timeout_secs: u64,
    pub read_timeout_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: 21,
            base_path: DEFAULT_BASE_PATH.to_string(),
            user: "anonymous".to_string(),
            password: "anonymous@".to_string(),
            connect_timeout_secs: 30,
            read_timeout_secs: 300,
        }
    }
}

impl FetchConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }

    fn validate(self) -> Result<Self, FetchError> {
        if self.host.trim().is_empty() {
            return Err(FetchError::ConfigParse("host must not be empty".to_string()));
        }
        if self.port == 0 {
            return Err(FetchError::ConfigParse("port must be non-zero".to_string()));
        }
        if self.connect_timeout_secs == 0 || self.read_timeout_secs == 0 {
            return Err(FetchError::ConfigParse(
                "timeouts must be at least one second".to_string(),
            ));
        }
        Ok(self)
    }
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// An explicit path must exist. Without one, the working directory and
    /// then the user config directory are searched; if neither holds a
    /// config file the built-in defaults apply.
    pub fn resolve(path: Option<&Path>) -> Result<FetchConfig, FetchError> {
        if let Some(path) = path {
            if !path.exists() {
                return Err(FetchError::MissingConfig(path.to_path_buf()));
            }
            return Self::load(path);
        }

        match Self::default_locations().into_iter().find(|p| p.is_file()) {
            Some(found) => Self::load(&found),
            None => Ok(FetchConfig::default()),
        }
    }

    pub fn load(path: &Path) -> Result<FetchConfig, FetchError> {
        let content =
            fs::read_to_string(path).map_err(|_| FetchError::ConfigRead(path.to_path_buf()))?;
        let config = Self::parse(&content)?;
        tracing::debug!(path = %path.display(), host = %config.host, "loaded config");
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<FetchConfig, FetchError> {
        let config: FetchConfig =
            serde_json::from_str(content).map_err(|err| FetchError::ConfigParse(err.to_string()))?;
        config.validate()
    }

    fn default_locations() -> Vec<PathBuf> {
        let mut candidates = vec![PathBuf::from(CONFIG_FILE_NAME)];
        if let Some(dirs) = BaseDirs::new() {
            candidates.push(dirs.config_dir().join("kira-ena-fetch").join("config.json"));
        }
        candidates
    }
}
