use crate::enrichment::geoip::{GeoError, GeoLookup};
use crate::enrichment::hostname::ReverseResolver;
use crate::enrichment::{Geodata, LookupStages};
use async_trait::async_trait;
use reqwest::StatusCode;
use std::collections::HashMap;
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Resolves names from a fixed map after `delay`; unknown addresses fail.
#[derive(Default)]
pub struct StubResolver {
    pub names: HashMap<String, String>,
    pub delay: Duration,
    pub calls: AtomicUsize,
}

impl StubResolver {
    pub fn with_names(names: &[(&str, &str)]) -> Self {
        Self {
            names: names
                .iter()
                .map(|(a, n)| (a.to_string(), n.to_string()))
                .collect(),
            ..Self::default()
        }
    }

    pub fn slow(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::default()
        }
    }
}

#[async_trait]
impl ReverseResolver for StubResolver {
    async fn reverse(&self, address: &str) -> io::Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        self.names
            .get(address)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no PTR record"))
    }
}

#[derive(Clone, Copy)]
pub enum GeoBehavior {
    Answer,
    BadStatus,
    Hang,
}

pub struct StubGeo {
    pub behavior: GeoBehavior,
    pub calls: AtomicUsize,
}

impl StubGeo {
    pub fn new(behavior: GeoBehavior) -> Self {
        Self {
            behavior,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl GeoLookup for StubGeo {
    async fn locate(&self, address: &str) -> Result<Geodata, GeoError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.behavior {
            GeoBehavior::Answer => Ok(Geodata {
                ip: address.to_string(),
                country_code: "US".into(),
                city: "Springfield".into(),
                ..Geodata::default()
            }),
            GeoBehavior::BadStatus => Err(GeoError::Status(StatusCode::SERVICE_UNAVAILABLE)),
            GeoBehavior::Hang => std::future::pending().await,
        }
    }
}

pub fn stages(resolver: StubResolver, geo: StubGeo) -> (LookupStages, Arc<StubResolver>, Arc<StubGeo>) {
    let resolver = Arc::new(resolver);
    let geo = Arc::new(geo);
    let stages = LookupStages::new(resolver.clone(), geo.clone())
        .with_timeouts(Duration::from_millis(200), Duration::from_millis(200));
    (stages, resolver, geo)
}
