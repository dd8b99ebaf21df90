use crate::error::ConfigError;
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Geolocation endpoint that speaks the freegeoip-compatible JSON layout.
pub const DEFAULT_GEO_BASE_URL: &str = "http://api.ipstack.com/";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LookupConfig {
    /// Address is appended directly, so keep the trailing slash.
    pub geo_base_url: String,

    /// Paid-API access key. Without one the request carries only `output=json`.
    pub access_key: Option<String>,

    pub hostname_timeout_ms: u64,

    pub geo_timeout_ms: u64,

    /// Chain reverse DNS in front of geolocation. When false, pipelines run
    /// geolocation only.
    pub reverse_dns: bool,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            geo_base_url: DEFAULT_GEO_BASE_URL.to_string(),
            access_key: None,
            hostname_timeout_ms: 1_000,
            geo_timeout_ms: 3_000,
            reverse_dns: true,
        }
    }
}

impl LookupConfig {
    pub fn hostname_timeout(&self) -> Duration {
        Duration::from_millis(self.hostname_timeout_ms)
    }

    pub fn geo_timeout(&self) -> Duration {
        Duration::from_millis(self.geo_timeout_ms)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.hostname_timeout_ms == 0 {
            return Err(ConfigError::InvalidLookup(
                "hostname_timeout_ms must be greater than zero".into(),
            ));
        }
        if self.geo_timeout_ms == 0 {
            return Err(ConfigError::InvalidLookup(
                "geo_timeout_ms must be greater than zero".into(),
            ));
        }
        if self.geo_base_url.trim().is_empty() {
            return Err(ConfigError::InvalidLookup("geo_base_url must not be empty".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LkupConfig {
    /// Base URL for remote log retrieval, e.g. "http://logs.example.com/logs"
    #[serde(default)]
    pub server: String,

    /// Space-separated addresses to leave out of every report.
    #[serde(default)]
    pub omit: String,

    #[serde(default = "default_remote_timeout_secs")]
    pub remote_timeout_secs: u64,

    #[serde(default)]
    pub lookup: LookupConfig,
}

fn default_remote_timeout_secs() -> u64 {
    30
}

impl Default for LkupConfig {
    fn default() -> Self {
        Self {
            server: String::new(),
            omit: String::new(),
            remote_timeout_secs: default_remote_timeout_secs(),
            lookup: LookupConfig::default(),
        }
    }
}

impl LkupConfig {
    /// `$HOME/.lkup/lkup.config`
    pub fn default_path() -> Option<PathBuf> {
        std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".lkup").join("lkup.config"))
    }

    /// Load from `path`, or from [`LkupConfig::default_path`] when none is given.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::default_path().ok_or_else(|| ConfigError::Missing {
                path: PathBuf::from("~/.lkup/lkup.config"),
            })?,
        };

        if !path.exists() {
            return Err(ConfigError::Missing { path });
        }

        Self::from_file(&path)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        let cfg: Self = toml::from_str(&contents).map_err(|e| ConfigError::parse(path, e))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.lookup.validate()
    }

    pub fn remote_timeout(&self) -> Duration {
        Duration::from_secs(self.remote_timeout_secs)
    }

    /// Addresses from `omit`.
    pub fn exclude(&self) -> HashSet<String> {
        self.omit.split_whitespace().map(str::to_string).collect()
    }
}

impl FromStr for LkupConfig {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, ConfigError> {
        let cfg: Self = toml::from_str(s).map_err(|e| ConfigError::parse("<string>", e))?;
        cfg.validate()?;
        Ok(cfg)
    }
}
