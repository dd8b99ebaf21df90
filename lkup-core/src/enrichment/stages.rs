use crate::config::LookupConfig;
use crate::enrichment::geoip::{GeoLookup, HttpGeoLookup};
use crate::enrichment::hostname::{ReverseResolver, SystemResolver};
use crate::error::LkupError;
use crate::progress::LookupProgress;
use std::sync::Arc;
use std::time::Duration;

/// Shape of each per-address pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topology {
    /// hostname -> geolocation
    Chained,
    /// geolocation only; `EnrichedHost::hostname` stays empty
    GeoOnly,
}

/// Everything a pipeline stage needs to do its lookup. Cheap to clone.
#[derive(Clone)]
pub struct LookupStages {
    pub resolver: Arc<dyn ReverseResolver>,
    pub geo: Arc<dyn GeoLookup>,
    pub hostname_timeout: Duration,
    pub geo_timeout: Duration,
    pub topology: Topology,
    pub progress: Option<Arc<LookupProgress>>,
}

impl LookupStages {
    pub fn new(resolver: Arc<dyn ReverseResolver>, geo: Arc<dyn GeoLookup>) -> Self {
        let defaults = LookupConfig::default();
        Self {
            resolver,
            geo,
            hostname_timeout: defaults.hostname_timeout(),
            geo_timeout: defaults.geo_timeout(),
            topology: Topology::Chained,
            progress: None,
        }
    }

    /// System resolver plus the configured HTTP geolocation service.
    pub fn from_config(cfg: &LookupConfig) -> Result<Self, LkupError> {
        let geo = HttpGeoLookup::new(
            cfg.geo_base_url.clone(),
            cfg.access_key.clone(),
            cfg.geo_timeout(),
        )
        .map_err(LkupError::Client)?;

        Ok(Self::new(Arc::new(SystemResolver), Arc::new(geo))
            .with_timeouts(cfg.hostname_timeout(), cfg.geo_timeout())
            .with_topology(if cfg.reverse_dns {
                Topology::Chained
            } else {
                Topology::GeoOnly
            }))
    }

    pub fn with_timeouts(mut self, hostname: Duration, geo: Duration) -> Self {
        self.hostname_timeout = hostname;
        self.geo_timeout = geo;
        self
    }

    pub fn with_topology(mut self, topology: Topology) -> Self {
        self.topology = topology;
        self
    }

    pub fn with_progress(mut self, progress: Arc<LookupProgress>) -> Self {
        self.progress = Some(progress);
        self
    }
}
