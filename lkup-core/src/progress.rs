//! Lookup progress reporting.

use crate::coordination::CancelSignal;
use std::io::{self, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;

/// Completed geolocation lookups out of the batch total.
#[derive(Debug, Default)]
pub struct LookupProgress {
    total: AtomicU64,
    completed: AtomicU64,
}

impl LookupProgress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset for a batch of `total` lookups.
    pub fn start(&self, total: u64) {
        self.total.store(total, Ordering::Relaxed);
        self.completed.store(0, Ordering::Relaxed);
    }

    pub fn increment(&self) {
        self.completed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn completed(&self) -> u64 {
        self.completed.load(Ordering::Relaxed)
    }

    pub fn total(&self) -> u64 {
        self.total.load(Ordering::Relaxed)
    }

    pub fn line(&self) -> String {
        format!("looked up {}/{}", self.completed(), self.total())
    }
}

/// Writes the progress line to stderr on an interval until stopped.
pub struct ProgressReporter {
    interval: Duration,
    stop: CancelSignal,
    handle: Option<JoinHandle<()>>,
    start_time: Instant,
}

impl ProgressReporter {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            stop: CancelSignal::new(),
            handle: None,
            start_time: Instant::now(),
        }
    }

    pub fn start(&mut self, progress: Arc<LookupProgress>) {
        let stop = self.stop.clone();
        let interval = self.interval;

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await; // Skip first immediate tick

            loop {
                tokio::select! {
                    _ = stop.cancelled() => break,
                    _ = ticker.tick() => {
                        let _ = write!(io::stderr(), "\r{}", progress.line());
                        let _ = io::stderr().flush();
                    }
                }
            }
        });

        self.handle = Some(handle);
    }

    /// Stop the reporter and print the final line.
    pub async fn finish(mut self, progress: &LookupProgress) {
        self.stop.cancel();
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }

        let _ = writeln!(
            io::stderr(),
            "\r{} ({:.1}s)",
            progress.line(),
            self.start_time.elapsed().as_secs_f64()
        );
    }
}
