use crate::coordination::CancelSignal;
use crate::enrichment::types::EnrichedHost;
use tokio::sync::mpsc;

pub type HostSender = mpsc::Sender<EnrichedHost>;
pub type HostReceiver = mpsc::Receiver<EnrichedHost>;

/// Hand-off between stages. One slot, so a sender waits until the next stage
/// has taken the previous record.
pub(crate) const STAGE_BUFFER: usize = 1;

pub(crate) fn stage_channel() -> (HostSender, HostReceiver) {
    mpsc::channel(STAGE_BUFFER)
}

/// Next record, or `None` once the input is closed or the batch is cancelled.
pub(crate) async fn recv_or_cancel(
    cancel: &CancelSignal,
    input: &mut HostReceiver,
) -> Option<EnrichedHost> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => None,
        next = input.recv() => next,
    }
}

/// Move `host` downstream. Returns `false` if the batch was cancelled or the
/// receiver is gone; the record is dropped in either case.
pub(crate) async fn send_or_cancel(
    cancel: &CancelSignal,
    output: &HostSender,
    host: EnrichedHost,
) -> bool {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => false,
        sent = output.send(host) => sent.is_ok(),
    }
}
