use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file {path} not found (HOME unset or file missing)")]
    Missing { path: PathBuf },

    #[error("failed to read config file {path}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse TOML in {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid lookup setting: {0}")]
    InvalidLookup(String),
}

impl ConfigError {
    pub fn read_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ReadFile {
            path: path.into(),
            source,
        }
    }

    pub fn parse(path: impl Into<PathBuf>, source: toml::de::Error) -> Self {
        Self::Parse {
            path: path.into(),
            source,
        }
    }
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read log {name}")]
    Read {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to fetch remote log {url}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("remote log source requires a configured server")]
    NoServer,
}

#[derive(Debug, Error)]
pub enum LkupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("failed to build http client")]
    Client(#[source] reqwest::Error),

    /// Fatal batch failure. No partial host table is trusted after one.
    #[error("enrichment pipeline failed: {0}")]
    Pipeline(String),
}

pub type Result<T> = std::result::Result<T, LkupError>;
