use crate::coordination::{CancelSignal, CompletionBarrier};
use crate::enrichment::channel::{HostReceiver, HostSender, stage_channel};
use crate::enrichment::geoip::geo_stage;
use crate::enrichment::hostname::hostname_stage;
use crate::enrichment::stages::{LookupStages, Topology};

/// Build one lookup pipeline and return its `(input, output)` endpoints.
///
/// Each stage runs as its own task registered with `barrier`. Dropping the
/// input closes the pipeline once in-flight work has drained.
pub fn make_pipeline(
    cancel: &CancelSignal,
    barrier: &CompletionBarrier,
    stages: &LookupStages,
) -> (HostSender, HostReceiver) {
    let (input, head) = stage_channel();

    let output = match stages.topology {
        Topology::Chained => {
            let named = hostname_stage(cancel, barrier, stages, head);
            geo_stage(cancel, barrier, stages, named)
        }
        Topology::GeoOnly => geo_stage(cancel, barrier, stages, head),
    };

    (input, output)
}

/// Build `count` independent pipelines. `inputs[i]` feeds `outputs[i]`.
pub fn make_pipelines(
    cancel: &CancelSignal,
    barrier: &CompletionBarrier,
    stages: &LookupStages,
    count: usize,
) -> (Vec<HostSender>, Vec<HostReceiver>) {
    (0..count)
        .map(|_| make_pipeline(cancel, barrier, stages))
        .unzip()
}
