//! Concurrent address enrichment
//!
//! Each distinct address gets its own pipeline of lookup stages. Stages pass an
//! [`EnrichedHost`] along bounded channels, so ownership of a record moves with it.
//! All pipeline outputs are merged into one stream that a single task drains into
//! the [`HostTable`].
//!
//! The overall flow for a batch is:
//!
//! PerpsTable::add_entry (new addresses)
//! make_pipelines
//! hostname_stage -> geo_stage   (one pair per address)
//! merge
//! spawn_updater
//! HostTable
//!
//! Every task is registered with the batch's CompletionBarrier and watches its
//! CancelSignal at each await.

mod channel;
pub mod geoip;
mod host_table;
pub mod hostname;
mod multiplexer;
mod pipeline;
mod process;
mod stages;
mod types;

#[cfg(test)]
mod tests;

pub use channel::{HostReceiver, HostSender};
pub use host_table::{HostTable, spawn_updater};
pub use multiplexer::merge;
pub use pipeline::{make_pipeline, make_pipelines};
pub use process::{Batch, process};
pub use stages::{LookupStages, Topology};
pub use types::*;
