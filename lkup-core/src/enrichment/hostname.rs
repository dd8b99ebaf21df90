use crate::coordination::{CancelSignal, CompletionBarrier};
use crate::enrichment::channel::{HostReceiver, recv_or_cancel, send_or_cancel, stage_channel};
use crate::enrichment::stages::LookupStages;
use crate::enrichment::types::{HOSTNAME_TIMED_OUT, HOSTNAME_UNKNOWN};
use async_trait::async_trait;
use std::io;
use std::net::IpAddr;
use std::time::Duration;

/// Reverse name resolution.
#[async_trait]
pub trait ReverseResolver: Send + Sync {
    async fn reverse(&self, address: &str) -> io::Result<String>;
}

/// The operating system resolver (`getnameinfo`).
///
/// The call cannot be interrupted, so it runs on the blocking pool. If the
/// caller stops waiting, the lookup finishes in the background and its result
/// is discarded.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemResolver;

#[async_trait]
impl ReverseResolver for SystemResolver {
    async fn reverse(&self, address: &str) -> io::Result<String> {
        let ip: IpAddr = address
            .parse()
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

        tokio::task::spawn_blocking(move || dns_lookup::lookup_addr(&ip))
            .await
            .map_err(io::Error::other)?
    }
}

/// Resolve `address`, racing the resolver against `limit`.
///
/// Never fails: errors become [`HOSTNAME_UNKNOWN`] and timeouts
/// [`HOSTNAME_TIMED_OUT`].
pub async fn lookup_hostname(
    resolver: &dyn ReverseResolver,
    address: &str,
    limit: Duration,
) -> String {
    match tokio::time::timeout(limit, resolver.reverse(address)).await {
        Ok(Ok(name)) => name,
        Ok(Err(e)) => {
            tracing::debug!(address, error = %e, "reverse lookup failed");
            HOSTNAME_UNKNOWN.to_string()
        }
        Err(_) => {
            tracing::debug!(address, limit_ms = limit.as_millis() as u64, "reverse lookup timed out");
            HOSTNAME_TIMED_OUT.to_string()
        }
    }
}

/// Spawn the hostname stage of one pipeline. The returned receiver closes when
/// `input` is exhausted or the batch is cancelled.
pub(crate) fn hostname_stage(
    cancel: &CancelSignal,
    barrier: &CompletionBarrier,
    stages: &LookupStages,
    mut input: HostReceiver,
) -> HostReceiver {
    let (tx, rx) = stage_channel();
    let cancel = cancel.clone();
    let resolver = stages.resolver.clone();
    let limit = stages.hostname_timeout;

    barrier.spawn(async move {
        while let Some(mut host) = recv_or_cancel(&cancel, &mut input).await {
            host.hostname = tokio::select! {
                biased;
                _ = cancel.cancelled() => return,
                name = lookup_hostname(resolver.as_ref(), &host.address, limit) => name,
            };

            if !send_or_cancel(&cancel, &tx, host).await {
                return;
            }
        }
    });

    rx
}
