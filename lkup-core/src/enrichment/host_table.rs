use crate::coordination::{CancelSignal, CompletionBarrier};
use crate::enrichment::channel::{HostReceiver, recv_or_cancel};
use crate::enrichment::types::EnrichedHost;
use std::collections::HashMap;
use tokio::task::JoinHandle;

/// Address -> enrichment result.
#[derive(Debug, Default, Clone)]
pub struct HostTable {
    hosts: HashMap<String, EnrichedHost>,
}

impl HostTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `host` under its address, replacing any earlier record.
    pub fn publish(&mut self, host: EnrichedHost) {
        self.hosts.insert(host.address.clone(), host);
    }

    pub fn get(&self, address: &str) -> Option<&EnrichedHost> {
        self.hosts.get(address)
    }

    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &EnrichedHost)> {
        self.hosts.iter().map(|(a, h)| (a.as_str(), h))
    }
}

/// Spawn the single writer of the host table.
///
/// Drains `merged` until it closes or the batch is cancelled, then yields the
/// table. After a cancellation the table may be missing in-flight records.
pub fn spawn_updater(
    cancel: &CancelSignal,
    barrier: &CompletionBarrier,
    mut merged: HostReceiver,
) -> JoinHandle<HostTable> {
    let cancel = cancel.clone();

    barrier.spawn(async move {
        let mut table = HostTable::new();
        while let Some(host) = recv_or_cancel(&cancel, &mut merged).await {
            tracing::trace!(address = %host.address, "host published");
            table.publish(host);
        }
        table
    })
}
