//! One detection cycle: fetch, match concurrently, persist, publish.

use std::sync::Arc;

use chrono::Duration;
use tokio::task::JoinSet;
use tracing::{debug, error, info};

use super::aggregator::TradeAggregator;
use super::matcher::{CorridorMatcher, MatchContext};
use crate::domain::{CorridorEvent, ExchangeRegistry, LedgerTransfer, Trade, Window};
use crate::error::Result;
use crate::port::{EventStore, LedgerSource, Notifier, RateSource};

/// Time parameters of the matching stage.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchSettings {
    /// How far back from the window end trades are fetched.
    pub trade_lookback: Duration,
    /// How far the ledger window trails the scheduler window.
    pub ledger_offset: Duration,
    pub end_to_end_deltas: Vec<Duration>,
    pub inbound_window: Duration,
    pub outbound_window: Duration,
}

impl Default for MatchSettings {
    fn default() -> Self {
        Self {
            trade_lookback: Duration::minutes(12),
            ledger_offset: Duration::minutes(5),
            end_to_end_deltas: [30, 60, 120, 300]
                .into_iter()
                .map(Duration::seconds)
                .collect(),
            inbound_window: Duration::seconds(120),
            outbound_window: Duration::seconds(120),
        }
    }
}

/// Every matcher a cycle runs for `registry`.
///
/// - one end-to-end matcher per (fiat with a trade feed, destination with a
///   trade feed in another fiat, delta)
/// - one inbound matcher per destination with a trade feed
/// - one outbound matcher per destination without one
pub fn plan_matchers(
    registry: &ExchangeRegistry,
    settings: &MatchSettings,
) -> Vec<CorridorMatcher> {
    let mut matchers = Vec::new();

    for fiat in registry.fiats_with_api() {
        for destination in registry.with_api().filter(|e| e.fiat() != fiat) {
            for delta in &settings.end_to_end_deltas {
                matchers.push(CorridorMatcher::end_to_end(
                    fiat,
                    destination.id().clone(),
                    *delta,
                ));
            }
        }
    }

    for destination in registry.with_api() {
        matchers.push(CorridorMatcher::inbound(
            destination.id().clone(),
            settings.inbound_window,
        ));
    }

    for destination in registry.without_api() {
        matchers.push(CorridorMatcher::outbound(
            destination.id().clone(),
            settings.outbound_window,
        ));
    }

    matchers
}

/// Summary of a completed cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleReport {
    pub window: Window,
    pub transfers: usize,
    pub trades: usize,
    pub matchers: usize,
    /// Events found across all matchers, duplicates included.
    pub matched: usize,
    /// Events stored for the first time.
    pub persisted: usize,
    /// Matcher tasks that panicked.
    pub panicked: usize,
}

/// Read-only inputs shared by every matcher task of a cycle.
struct Snapshot {
    transfers: Vec<LedgerTransfer>,
    trades: Vec<Trade>,
    rate: f64,
}

#[derive(Default)]
struct TaskOutcome {
    matched: usize,
    persisted: usize,
}

/// The detection pipeline a scheduler drives once per window.
pub struct DetectionPipeline {
    ctx: MatchContext,
    settings: MatchSettings,
    matchers: Vec<CorridorMatcher>,
    aggregator: TradeAggregator,
    ledger: Arc<dyn LedgerSource>,
    rate: Arc<dyn RateSource>,
    store: Arc<dyn EventStore>,
    notifier: Arc<dyn Notifier>,
}

impl DetectionPipeline {
    pub fn new(
        ctx: MatchContext,
        settings: MatchSettings,
        aggregator: TradeAggregator,
        ledger: Arc<dyn LedgerSource>,
        rate: Arc<dyn RateSource>,
        store: Arc<dyn EventStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let matchers = plan_matchers(&ctx.registry, &settings);
        Self {
            ctx,
            settings,
            matchers,
            aggregator,
            ledger,
            rate,
            store,
            notifier,
        }
    }

    pub fn matchers(&self) -> &[CorridorMatcher] {
        &self.matchers
    }

    pub fn aggregator(&self) -> &TradeAggregator {
        &self.aggregator
    }

    /// Run one cycle over `window`.
    ///
    /// # Errors
    /// Fails on ledger, rate or store errors. Trade source failures and
    /// matcher panics do not fail the cycle.
    pub async fn run(&self, window: Window) -> Result<CycleReport> {
        let trades = self
            .aggregator
            .collect(window.end - self.settings.trade_lookback)
            .await;

        let ledger_window = window.shifted_back(self.settings.ledger_offset);
        let transfers = self
            .ledger
            .fetch_transfers(ledger_window.start, ledger_window.end)
            .await?;

        let rate = self.rate.reference_rate().await?;

        debug!(
            ledger_start = %ledger_window.start,
            ledger_end = %ledger_window.end,
            transfers = transfers.len(),
            trades = trades.len(),
            rate,
            "Cycle inputs ready"
        );

        let mut report = CycleReport {
            window,
            transfers: transfers.len(),
            trades: trades.len(),
            matchers: self.matchers.len(),
            matched: 0,
            persisted: 0,
            panicked: 0,
        };

        let snapshot = Arc::new(Snapshot {
            transfers,
            trades,
            rate,
        });

        let mut tasks = JoinSet::new();
        for matcher in &self.matchers {
            let matcher = matcher.clone();
            let snapshot = Arc::clone(&snapshot);
            let ctx = self.ctx.clone();
            let store = Arc::clone(&self.store);
            let notifier = Arc::clone(&self.notifier);

            tasks.spawn(async move {
                let events =
                    matcher.search(&snapshot.transfers, &snapshot.trades, snapshot.rate, &ctx);
                persist(&matcher, events, store.as_ref(), notifier.as_ref()).await
            });
        }

        let mut failure = None;
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Ok(outcome)) => {
                    report.matched += outcome.matched;
                    report.persisted += outcome.persisted;
                }
                Ok(Err(e)) => {
                    error!(error = %e, "Matcher task failed");
                    failure.get_or_insert(e);
                }
                Err(e) if e.is_panic() => {
                    error!(error = %e, "Matcher task panicked");
                    report.panicked += 1;
                }
                Err(e) => {
                    failure.get_or_insert(e.into());
                }
            }
        }
        if let Some(e) = failure {
            return Err(e);
        }

        if let Some(stats) = self.store.calculate_stats().await? {
            self.notifier.notify(stats.into());
        }

        Ok(report)
    }
}

impl std::fmt::Debug for DetectionPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DetectionPipeline")
            .field("settings", &self.settings)
            .field("matchers", &self.matchers.len())
            .field("aggregator", &self.aggregator)
            .finish_non_exhaustive()
    }
}

/// Save each event and publish the ones stored for the first time.
async fn persist(
    matcher: &CorridorMatcher,
    events: Vec<CorridorEvent>,
    store: &dyn EventStore,
    notifier: &dyn Notifier,
) -> Result<TaskOutcome> {
    let mut outcome = TaskOutcome {
        matched: events.len(),
        ..TaskOutcome::default()
    };

    for event in events {
        if !store.save(&event).await? {
            debug!(matcher = %matcher.strategy(), tx_hash = %event.tx_hash, "Already recorded");
            continue;
        }

        info!(
            matcher = %matcher.strategy(),
            tx_hash = %event.tx_hash,
            corridor = %event.corridor(),
            source = %event.source,
            destination = %event.destination,
            amount = event.amount,
            usd_value = event.usd_value,
            spotted_at = %event.spotted_at,
            "Corridor event detected"
        );
        outcome.persisted += 1;
        notifier.notify(event.into());
    }

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::store::MemoryEventStore;
    use crate::application::matcher::Strategy;
    use crate::domain::{Fiat, SpottedAt};
    use crate::port::Event;
    use crate::testkit::domain::{at, buy, corridor_registry, sell, transfer};
    use crate::testkit::notifier::RecordingNotifier;
    use crate::testkit::ports::{FixedRate, ScriptedLedger, StaticTradeSource};

    fn window() -> Window {
        Window {
            start: at(1270),
            end: at(1300),
        }
    }

    fn pipeline(
        ledger: Arc<ScriptedLedger>,
        rate: FixedRate,
        notifier: RecordingNotifier,
    ) -> DetectionPipeline {
        let registry = corridor_registry();
        let aggregator = TradeAggregator::new(vec![
            Arc::new(StaticTradeSource::new("x", vec![buy("x", "b1", 970)])),
            Arc::new(StaticTradeSource::new("y", vec![sell("y", "s1", 1030)])),
        ]);
        DetectionPipeline::new(
            MatchContext::new(registry, "XRP"),
            MatchSettings::default(),
            aggregator,
            ledger,
            Arc::new(rate),
            Arc::new(MemoryEventStore::new()),
            Arc::new(notifier),
        )
    }

    #[test]
    fn plan_covers_every_corridor_shape() {
        let registry = corridor_registry();
        let matchers = plan_matchers(&registry, &MatchSettings::default());

        // EUR -> y and USD -> x, four deltas each; two inbound; one outbound.
        assert_eq!(matchers.len(), 2 * 4 + 2 + 1);
        assert!(matchers
            .iter()
            .all(|m| m.strategy().name() != "end_to_end"
                || m.strategy().spotted_at() == SpottedAt::SourceAndDestination));
        let outbound: Vec<_> = matchers
            .iter()
            .filter(|m| m.strategy().name() == "outbound")
            .map(|m| m.strategy().destination().as_str())
            .collect();
        assert_eq!(outbound, vec!["z"]);
    }

    #[test]
    fn plan_skips_same_fiat_end_to_end() {
        let registry = corridor_registry();
        let matchers = plan_matchers(&registry, &MatchSettings::default());
        assert!(!matchers.iter().any(|m| matches!(
            m.strategy(),
            Strategy::EndToEnd { source_fiat: Fiat::Eur, destination, .. }
                if destination.as_str() == "x"
        )));
    }

    #[tokio::test]
    async fn ledger_window_trails_scheduler_window() {
        let ledger = Arc::new(ScriptedLedger::new(vec![]));
        let pipeline = pipeline(ledger.clone(), FixedRate::new(0.5), RecordingNotifier::new());

        pipeline.run(window()).await.unwrap();

        assert_eq!(ledger.requests(), vec![(at(970), at(1000))]);
    }

    #[tokio::test]
    async fn matched_event_is_persisted_once_and_published() {
        let ledger = Arc::new(ScriptedLedger::new(vec![transfer("H", "rX", "rY", 1000.0, 1000)]));
        let notifier = RecordingNotifier::new();
        let pipeline = pipeline(ledger, FixedRate::new(0.5), notifier.clone());

        let report = pipeline.run(window()).await.unwrap();

        // Deltas 60, 120 and 300 all match the same transfer.
        assert_eq!(report.matched, 3);
        assert_eq!(report.persisted, 1);

        let published = notifier.corridor_events();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].usd_value, 500.0);
        assert_eq!(published[0].source_fiat, Fiat::Eur);

        let stats = notifier.stats();
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].event_count, 1);
        assert!(matches!(notifier.events().last(), Some(Event::Stats(_))));
    }

    #[tokio::test]
    async fn replayed_window_publishes_nothing_new() {
        let ledger = Arc::new(ScriptedLedger::new(vec![transfer("H", "rX", "rY", 1000.0, 1000)]));
        let notifier = RecordingNotifier::new();
        let pipeline = pipeline(ledger, FixedRate::new(0.5), notifier.clone());

        pipeline.run(window()).await.unwrap();
        let second = pipeline.run(window()).await.unwrap();

        assert_eq!(second.persisted, 0);
        assert_eq!(notifier.corridor_events().len(), 1);
        assert_eq!(notifier.stats().len(), 2);
    }

    #[tokio::test]
    async fn rate_failure_fails_cycle() {
        let ledger = Arc::new(ScriptedLedger::new(vec![transfer("H", "rX", "rY", 1000.0, 1000)]));
        let notifier = RecordingNotifier::new();
        let pipeline = pipeline(ledger, FixedRate::failing(), notifier.clone());

        assert!(pipeline.run(window()).await.is_err());
        assert!(notifier.is_empty());
    }

    #[tokio::test]
    async fn empty_store_publishes_no_stats() {
        let ledger = Arc::new(ScriptedLedger::new(vec![]));
        let notifier = RecordingNotifier::new();
        let pipeline = pipeline(ledger, FixedRate::new(0.5), notifier.clone());

        let report = pipeline.run(window()).await.unwrap();
        assert_eq!(report.persisted, 0);
        assert!(notifier.is_empty());
    }
}
