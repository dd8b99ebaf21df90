use crate::coordination::{CancelSignal, CompletionBarrier};
use crate::enrichment::channel::{HostReceiver, recv_or_cancel, send_or_cancel, stage_channel};
use crate::enrichment::stages::LookupStages;
use crate::enrichment::types::{GEO_FAILED, GEO_TIMED_OUT, Geodata};
use async_trait::async_trait;
use reqwest::StatusCode;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GeoError {
    #[error("geolocation request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("geolocation lookup timed out")]
    TimedOut,

    #[error("geolocation service returned {0}")]
    Status(StatusCode),

    #[error("malformed geolocation response: {0}")]
    Decode(String),
}

impl GeoError {
    /// Marker stored in the zero record that replaces a failed lookup.
    pub fn marker(&self) -> &'static str {
        match self {
            GeoError::Transport(_) | GeoError::TimedOut => GEO_TIMED_OUT,
            GeoError::Status(_) | GeoError::Decode(_) => GEO_FAILED,
        }
    }
}

/// Remote geolocation by address.
#[async_trait]
pub trait GeoLookup: Send + Sync {
    async fn locate(&self, address: &str) -> Result<Geodata, GeoError>;
}

/// freegeoip-compatible HTTP service (`GET {base_url}{address}?...`).
#[derive(Debug, Clone)]
pub struct HttpGeoLookup {
    client: reqwest::Client,
    base_url: String,
    access_key: Option<String>,
}

impl HttpGeoLookup {
    pub fn new(
        base_url: impl Into<String>,
        access_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, base_url, access_key))
    }

    pub fn with_client(
        client: reqwest::Client,
        base_url: impl Into<String>,
        access_key: Option<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            access_key,
        }
    }

    /// Paid endpoint needs the key plus `legacy=1` to keep the freegeoip layout.
    pub fn url(&self, address: &str) -> String {
        match &self.access_key {
            Some(key) => format!(
                "{}{}?access_key={}&output=json&legacy=1",
                self.base_url, address, key
            ),
            None => format!("{}{}?output=json", self.base_url, address),
        }
    }
}

#[async_trait]
impl GeoLookup for HttpGeoLookup {
    async fn locate(&self, address: &str) -> Result<Geodata, GeoError> {
        let transport = |e: reqwest::Error| {
            if e.is_timeout() {
                GeoError::TimedOut
            } else {
                GeoError::Transport(e)
            }
        };

        let resp = self
            .client
            .get(self.url(address))
            .send()
            .await
            .map_err(transport)?;

        let status = resp.status();
        if !status.is_success() {
            return Err(GeoError::Status(status));
        }

        let body = resp.bytes().await.map_err(transport)?;
        serde_json::from_slice(&body).map_err(|e| GeoError::Decode(e.to_string()))
    }
}

/// Locate `address` within `limit`. Failures yield a zero record whose
/// `hostname` carries the failure marker; this never returns an error.
pub async fn locate_or_default(geo: &dyn GeoLookup, address: &str, limit: Duration) -> Geodata {
    let outcome = match tokio::time::timeout(limit, geo.locate(address)).await {
        Ok(result) => result,
        Err(_) => Err(GeoError::TimedOut),
    };

    match outcome {
        Ok(data) => data,
        Err(e) => {
            tracing::debug!(address, error = %e, "geolocation failed");
            Geodata::failed(e.marker())
        }
    }
}

/// Spawn the geolocation stage of one pipeline.
pub(crate) fn geo_stage(
    cancel: &CancelSignal,
    barrier: &CompletionBarrier,
    stages: &LookupStages,
    mut input: HostReceiver,
) -> HostReceiver {
    let (tx, rx) = stage_channel();
    let cancel = cancel.clone();
    let geo = stages.geo.clone();
    let limit = stages.geo_timeout;
    let progress = stages.progress.clone();

    barrier.spawn(async move {
        while let Some(mut host) = recv_or_cancel(&cancel, &mut input).await {
            let data = tokio::select! {
                biased;
                _ = cancel.cancelled() => return,
                data = locate_or_default(geo.as_ref(), &host.address, limit) => data,
            };
            host.geo = Some(data);

            if let Some(progress) = &progress {
                progress.increment();
            }

            if !send_or_cancel(&cancel, &tx, host).await {
                return;
            }
        }
    });

    rx
}
