use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Notify;
use tokio::task::JoinHandle;

#[derive(Debug, Default)]
struct BarrierState {
    active: AtomicUsize,
    idle: Notify,
}

/// Counter of outstanding workers.
///
/// Incremented when a worker is launched, decremented when its [`WorkerGuard`]
/// drops. `wait` resolves once the count reaches zero.
#[derive(Clone, Debug, Default)]
pub struct CompletionBarrier {
    state: Arc<BarrierState>,
}

impl CompletionBarrier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one worker. The slot is released when the guard drops.
    pub fn enter(&self) -> WorkerGuard {
        self.state.active.fetch_add(1, Ordering::AcqRel);
        WorkerGuard {
            state: Arc::clone(&self.state),
        }
    }

    /// Spawn a worker that is accounted for until its future completes,
    /// panics, or is aborted.
    pub fn spawn<F>(&self, fut: F) -> JoinHandle<F::Output>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        // Counted before the task exists so `wait` can never miss it.
        let guard = self.enter();
        tokio::spawn(async move {
            let _guard = guard;
            fut.await
        })
    }

    pub fn active(&self) -> usize {
        self.state.active.load(Ordering::Acquire)
    }

    pub async fn wait(&self) {
        loop {
            let notified = self.state.idle.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if self.active() == 0 {
                return;
            }

            notified.await;
        }
    }
}

/// RAII registration of a single live worker.
///
/// Invariants:
/// - Created only through [`CompletionBarrier::enter`]
/// - Releases its slot exactly once on Drop
#[derive(Debug)]
pub struct WorkerGuard {
    state: Arc<BarrierState>,
}

impl Drop for WorkerGuard {
    fn drop(&mut self) {
        if self.state.active.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.state.idle.notify_waiters();
        }
    }
}
