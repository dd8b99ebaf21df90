//! Batch-wide coordination primitives.
//!
//! Every worker spawned for a batch receives a [`CancelSignal`] and is tracked by a
//! [`CompletionBarrier`]. Cancellation is broadcast and sticky. The barrier counts
//! live workers and resolves once the last one has exited.

mod barrier;
mod cancel;

pub use barrier::{CompletionBarrier, WorkerGuard};
pub use cancel::CancelSignal;
