use super::stubs::{GeoBehavior, StubGeo, StubResolver, stages};
use crate::coordination::{CancelSignal, CompletionBarrier};
use crate::enrichment::hostname::lookup_hostname;
use crate::enrichment::{
    EnrichedHost, GEO_FAILED, HOSTNAME_TIMED_OUT, HOSTNAME_UNKNOWN, HostTable, Topology,
    make_pipeline, make_pipelines, merge, spawn_updater,
};
use pretty_assertions::assert_eq;
use std::time::Duration;
use tokio::sync::mpsc;

const BOUND: Duration = Duration::from_secs(2);

#[tokio::test]
async fn hostname_timeout_yields_sentinel() {
    let resolver = StubResolver::slow(Duration::from_secs(30));

    let name = tokio::time::timeout(
        BOUND,
        lookup_hostname(&resolver, "1.2.3.4", Duration::from_millis(20)),
    )
    .await
    .expect("lookup must respect its own timeout");

    assert_eq!(name, HOSTNAME_TIMED_OUT);
}

#[tokio::test]
async fn hostname_error_yields_unknown() {
    let resolver = StubResolver::with_names(&[("5.6.7.8", "five.example")]);

    let missing = lookup_hostname(&resolver, "1.2.3.4", Duration::from_secs(1)).await;
    let found = lookup_hostname(&resolver, "5.6.7.8", Duration::from_secs(1)).await;

    assert_eq!(missing, HOSTNAME_UNKNOWN);
    assert_eq!(found, "five.example");
}

#[tokio::test]
async fn chained_pipeline_fills_hostname_then_geo() {
    let (stages, _, _) = stages(
        StubResolver::with_names(&[("1.2.3.4", "one.example")]),
        StubGeo::new(GeoBehavior::Answer),
    );
    let cancel = CancelSignal::new();
    let barrier = CompletionBarrier::new();

    let (input, mut output) = make_pipeline(&cancel, &barrier, &stages);
    input.send(EnrichedHost::new("1.2.3.4")).await.unwrap();
    drop(input);

    let host = output.recv().await.unwrap();
    assert_eq!(host.hostname, "one.example");
    assert_eq!(host.geo.as_ref().unwrap().ip, "1.2.3.4");

    assert!(output.recv().await.is_none(), "output closes after input");
    tokio::time::timeout(BOUND, barrier.wait()).await.unwrap();
}

#[tokio::test]
async fn geo_only_pipeline_skips_reverse_dns() {
    let (stages, resolver, geo) = stages(StubResolver::default(), StubGeo::new(GeoBehavior::Answer));
    let stages = stages.with_topology(Topology::GeoOnly);
    let cancel = CancelSignal::new();
    let barrier = CompletionBarrier::new();

    let (input, mut output) = make_pipeline(&cancel, &barrier, &stages);
    input.send(EnrichedHost::new("9.9.9.9")).await.unwrap();
    drop(input);

    let host = output.recv().await.unwrap();
    assert_eq!(host.hostname, "");
    assert!(host.geo.is_some());
    assert_eq!(resolver.calls.load(std::sync::atomic::Ordering::SeqCst), 0);
    assert_eq!(geo.calls.load(std::sync::atomic::Ordering::SeqCst), 1);
}

#[tokio::test]
async fn failing_geo_leaves_marked_default_record() {
    let (stages, _, _) = stages(StubResolver::default(), StubGeo::new(GeoBehavior::BadStatus));
    let cancel = CancelSignal::new();
    let barrier = CompletionBarrier::new();

    let (input, mut output) = make_pipeline(&cancel, &barrier, &stages);
    input.send(EnrichedHost::new("1.2.3.4")).await.unwrap();

    let host = output.recv().await.unwrap();
    let geo = host.geo.unwrap();
    assert_eq!(geo.hostname, GEO_FAILED);
    assert_eq!(geo.country_code, "");
    assert_eq!(geo.latitude, 0.0);
}

#[tokio::test]
async fn make_pipelines_builds_independent_pairs() {
    let (stages, _, _) = stages(StubResolver::default(), StubGeo::new(GeoBehavior::Answer));
    let cancel = CancelSignal::new();
    let barrier = CompletionBarrier::new();

    let (inputs, outputs) = make_pipelines(&cancel, &barrier, &stages, 3);
    assert_eq!(inputs.len(), 3);
    assert_eq!(outputs.len(), 3);

    for (i, input) in inputs.into_iter().enumerate() {
        input.send(EnrichedHost::new(format!("10.0.0.{i}"))).await.unwrap();
    }

    for (i, mut output) in outputs.into_iter().enumerate() {
        let host = output.recv().await.unwrap();
        assert_eq!(host.address, format!("10.0.0.{i}"));
        assert!(output.recv().await.is_none());
    }
}

#[tokio::test]
async fn merge_preserves_order_within_each_input() {
    let cancel = CancelSignal::new();
    let barrier = CompletionBarrier::new();

    let mut senders = Vec::new();
    let mut receivers = Vec::new();
    for _ in 0..3 {
        let (tx, rx) = mpsc::channel(8);
        senders.push(tx);
        receivers.push(rx);
    }

    let mut merged = merge(&cancel, &barrier, receivers);

    for (source, tx) in senders.into_iter().enumerate() {
        tokio::spawn(async move {
            for seq in 0..5 {
                tx.send(EnrichedHost::new(format!("{source}:{seq}"))).await.unwrap();
            }
        });
    }

    let mut seen = Vec::new();
    while let Some(host) = tokio::time::timeout(BOUND, merged.recv()).await.unwrap() {
        seen.push(host.address);
    }
    assert_eq!(seen.len(), 15);

    for source in 0..3 {
        let order: Vec<_> = seen
            .iter()
            .filter(|a| a.starts_with(&format!("{source}:")))
            .cloned()
            .collect();
        let expected: Vec<_> = (0..5).map(|seq| format!("{source}:{seq}")).collect();
        assert_eq!(order, expected);
    }

    tokio::time::timeout(BOUND, barrier.wait()).await.unwrap();
}

#[tokio::test]
async fn merge_of_nothing_closes_immediately() {
    let cancel = CancelSignal::new();
    let barrier = CompletionBarrier::new();

    let mut merged = merge(&cancel, &barrier, Vec::new());

    assert!(tokio::time::timeout(BOUND, merged.recv()).await.unwrap().is_none());
    tokio::time::timeout(BOUND, barrier.wait()).await.unwrap();
}

#[tokio::test]
async fn updater_replaces_rather_than_merges() {
    let cancel = CancelSignal::new();
    let barrier = CompletionBarrier::new();
    let (tx, rx) = mpsc::channel(4);

    let updater = spawn_updater(&cancel, &barrier, rx);

    let mut first = EnrichedHost::new("1.2.3.4");
    first.hostname = "old.example".into();
    let second = EnrichedHost::new("1.2.3.4");
    tx.send(first).await.unwrap();
    tx.send(second).await.unwrap();
    drop(tx);

    let table: HostTable = updater.await.unwrap();
    assert_eq!(table.len(), 1);
    assert_eq!(table.get("1.2.3.4").unwrap().hostname, "");
}

#[tokio::test]
async fn cancel_unblocks_stage_stuck_on_lookup() {
    let (stages, _, _) = stages(StubResolver::default(), StubGeo::new(GeoBehavior::Hang));
    let stages = stages.with_timeouts(Duration::from_millis(10), Duration::from_secs(60));
    let cancel = CancelSignal::new();
    let barrier = CompletionBarrier::new();

    let (input, mut output) = make_pipeline(&cancel, &barrier, &stages);
    input.send(EnrichedHost::new("1.2.3.4")).await.unwrap();

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(barrier.active() > 0);

    cancel.cancel();
    tokio::time::timeout(BOUND, barrier.wait())
        .await
        .expect("cancelled stages must exit");
    assert!(output.recv().await.is_none());
    drop(input);
}

#[tokio::test]
async fn cancel_unblocks_updater_and_forwarders() {
    let cancel = CancelSignal::new();
    let barrier = CompletionBarrier::new();

    // Inputs that never close on their own.
    let (_held_tx, rx) = mpsc::channel::<EnrichedHost>(1);
    let merged = merge(&cancel, &barrier, vec![rx]);
    let updater = spawn_updater(&cancel, &barrier, merged);

    tokio::time::sleep(Duration::from_millis(20)).await;
    cancel.cancel();

    tokio::time::timeout(BOUND, barrier.wait()).await.unwrap();
    assert!(updater.await.unwrap().is_empty());
}
