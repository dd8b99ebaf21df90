use crate::coordination::{CancelSignal, CompletionBarrier};
use crate::enrichment::channel::send_or_cancel;
use crate::enrichment::host_table::{HostTable, spawn_updater};
use crate::enrichment::multiplexer::merge;
use crate::enrichment::pipeline::make_pipelines;
use crate::enrichment::stages::LookupStages;
use crate::enrichment::types::EnrichedHost;
use crate::error::{LkupError, Result};
use crate::logs::LogEntry;
use crate::perps::PerpsTable;
use crate::sorting::presentation_order;

/// Outcome of one enrichment run.
#[derive(Debug)]
pub struct Batch {
    pub perps: PerpsTable,
    pub hosts: HostTable,
    /// Every distinct address has a host record. Only false when the batch
    /// was cancelled.
    pub complete: bool,
}

impl Batch {
    /// Addresses from least to most recently active.
    pub fn presentation_order(&self) -> Vec<String> {
        presentation_order(&self.perps)
    }
}

/// Group `entries` by address and enrich every distinct address.
///
/// One pipeline per new address, all running concurrently, merged into a
/// single host table writer. Returns once every spawned task has exited.
/// Cancelling `cancel` stops the batch early with `complete == false`.
pub async fn process<I>(entries: I, stages: &LookupStages, cancel: &CancelSignal) -> Result<Batch>
where
    I: IntoIterator<Item = LogEntry>,
{
    let mut perps = PerpsTable::new();
    let mut new_addresses = Vec::new();

    for entry in entries {
        let address = entry.address.clone();
        if perps.add_entry(entry) {
            new_addresses.push(address);
        }
    }

    let count = new_addresses.len();
    tracing::info!(
        entries = perps.entry_count(),
        addresses = count,
        topology = ?stages.topology,
        "starting enrichment"
    );

    if let Some(progress) = &stages.progress {
        progress.start(count as u64);
    }

    let barrier = CompletionBarrier::new();
    let (inputs, outputs) = make_pipelines(cancel, &barrier, stages, count);
    let merged = merge(cancel, &barrier, outputs);
    let updater = spawn_updater(cancel, &barrier, merged);

    // Each input is dropped right after its single send, closing that pipeline.
    // Breaking out early drops the rest, so every input is closed before the
    // barrier wait below.
    for (input, address) in inputs.into_iter().zip(new_addresses) {
        if cancel.is_cancelled() {
            break;
        }
        if !send_or_cancel(cancel, &input, EnrichedHost::new(address.clone())).await
            && !cancel.is_cancelled()
        {
            tracing::warn!(%address, "pipeline closed before accepting its address");
        }
    }

    barrier.wait().await;

    let hosts = updater
        .await
        .map_err(|e| LkupError::Pipeline(format!("host table updater failed: {e}")))?;

    let complete = hosts.len() == count;
    if !complete && !cancel.is_cancelled() {
        return Err(LkupError::Pipeline(format!(
            "only {} of {} addresses were enriched",
            hosts.len(),
            count
        )));
    }

    tracing::info!(hosts = hosts.len(), complete, "enrichment finished");

    Ok(Batch {
        perps,
        hosts,
        complete,
    })
}
