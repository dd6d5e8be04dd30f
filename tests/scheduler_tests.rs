use std::sync::Arc;
use std::time::Duration;

use bridgewatch::adapter::store::MemoryEventStore;
use bridgewatch::application::{
    DetectionPipeline, MatchContext, MatchSettings, SchedulerSettings, SchedulerState,
    TradeAggregator, WindowScheduler,
};
use bridgewatch::port::TradeSource;
use bridgewatch::testkit::domain::{at, buy, corridor_registry, sell, transfer};
use bridgewatch::testkit::notifier::RecordingNotifier;
use bridgewatch::testkit::ports::{FixedRate, ScriptedLedger, StaticTradeSource};

struct Harness {
    scheduler: WindowScheduler,
    ledger: Arc<ScriptedLedger>,
    notifier: RecordingNotifier,
}

fn harness(trades: Vec<Arc<dyn TradeSource>>) -> Harness {
    let ledger = Arc::new(ScriptedLedger::new(vec![]));
    let notifier = RecordingNotifier::new();
    let pipeline = DetectionPipeline::new(
        MatchContext::new(corridor_registry(), "XRP"),
        MatchSettings::default(),
        TradeAggregator::new(trades),
        ledger.clone(),
        Arc::new(FixedRate::new(0.5)),
        Arc::new(MemoryEventStore::new()),
        Arc::new(notifier.clone()),
    );
    Harness {
        scheduler: WindowScheduler::new(pipeline, SchedulerSettings::default()),
        ledger,
        notifier,
    }
}

#[tokio::test]
async fn windows_are_contiguous_across_cycles() {
    let mut h = harness(vec![]);

    for now in [10_000, 10_030, 10_060, 10_095] {
        h.scheduler.run_cycle_at(at(now)).await.unwrap();
    }

    let requests = h.ledger.requests();
    assert_eq!(requests.len(), 4);
    // First window looks back 20 minutes; everything is shifted back 5.
    assert_eq!(requests[0], (at(10_000 - 1200 - 300), at(10_000 - 300)));
    for pair in requests.windows(2) {
        assert_eq!(pair[0].1, pair[1].0);
    }
}

#[tokio::test]
async fn failed_cycle_is_retried_over_the_same_range() {
    let mut h = harness(vec![]);
    h.scheduler.run_cycle_at(at(10_000)).await.unwrap();

    h.ledger.fail_next(2);
    assert!(h.scheduler.run_cycle_at(at(10_030)).await.is_err());
    assert!(matches!(h.scheduler.state(), SchedulerState::Backoff { .. }));
    assert!(h.scheduler.run_cycle_at(at(10_060)).await.is_err());

    let report = h.scheduler.run_cycle_at(at(10_090)).await.unwrap();
    assert_eq!(report.window.start, at(10_000));
    assert_eq!(report.window.end, at(10_090));
    assert_eq!(h.scheduler.state(), SchedulerState::Running);
}

#[tokio::test]
async fn backoff_is_added_on_top_of_the_interval() {
    let mut h = harness(vec![]);
    h.scheduler.run_cycle_at(at(10_000)).await.unwrap();
    let after_success = h.scheduler.next_delay(at(10_000));

    h.ledger.fail_next(1);
    assert!(h.scheduler.run_cycle_at(at(10_030)).await.is_err());
    let after_failure = h.scheduler.next_delay(at(10_030));

    assert_eq!(after_success, Duration::from_secs(30));
    assert_eq!(after_failure, Duration::from_secs(60));
}

#[tokio::test]
async fn transfer_seen_in_two_cycles_is_published_once() {
    let x: Arc<dyn TradeSource> =
        Arc::new(StaticTradeSource::new("x", vec![buy("x", "b1", 9_660)]));
    let y: Arc<dyn TradeSource> =
        Arc::new(StaticTradeSource::new("y", vec![sell("y", "s1", 9_720)]));
    let mut h = harness(vec![x, y]);
    h.ledger
        .set_transfers(vec![transfer("T1", "rX", "rY", 1000.0, 9_690)]);

    let first = h.scheduler.run_cycle_at(at(10_000)).await.unwrap();
    assert_eq!(first.persisted, 1);
    let second = h.scheduler.run_cycle_at(at(10_030)).await.unwrap();
    assert_eq!(second.persisted, 0);

    let published = h.notifier.corridor_events();
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].usd_value, 500.0);
    assert_eq!(h.notifier.stats().len(), 2);
}
