use crate::coordination::{CancelSignal, CompletionBarrier};
use crate::enrichment::channel::{HostReceiver, recv_or_cancel, send_or_cancel};
use tokio::sync::mpsc;

/// Fan the pipeline outputs into one stream.
///
/// One forwarding task per input. The merged stream closes only after every
/// forwarder has finished, which an inner barrier tracks. Order is preserved
/// per input; across inputs it is whatever the scheduler produces.
pub fn merge(
    cancel: &CancelSignal,
    barrier: &CompletionBarrier,
    inputs: Vec<HostReceiver>,
) -> HostReceiver {
    let (tx, rx) = mpsc::channel(inputs.len().max(1));
    let forwarders = CompletionBarrier::new();

    for mut input in inputs {
        let tx = tx.clone();
        let cancel = cancel.clone();
        let slot = forwarders.enter();

        barrier.spawn(async move {
            while let Some(host) = recv_or_cancel(&cancel, &mut input).await {
                if !send_or_cancel(&cancel, &tx, host).await {
                    break;
                }
            }
            drop(tx);
            drop(slot);
        });
    }

    barrier.spawn(async move {
        forwarders.wait().await;
        tracing::trace!("all forwarders finished, closing merged stream");
        drop(tx);
    });

    rx
}
