//! App orchestration module.
//!
//! Wires configuration into ports, the detection pipeline and the window
//! scheduler, then drives the scheduler until the process is stopped.

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{info, warn};

use crate::adapter::factory;
use crate::adapter::notifier::{BroadcastNotifier, NotifierRegistry, Published};
use crate::application::{DetectionPipeline, MatchContext, TradeAggregator, WindowScheduler};
use crate::config::Config;
use crate::error::Result;

/// Main application struct.
pub struct App {
    scheduler: WindowScheduler,
    live: Option<BroadcastNotifier>,
}

impl App {
    /// Build the application with notifiers taken from `[notifier]`.
    ///
    /// # Errors
    /// See [`App::build`].
    pub fn from_config(config: &Config) -> Result<Self> {
        let (notifiers, live) = factory::notifiers(config);
        let scheduler = Self::build(config, notifiers)?;
        Ok(Self { scheduler, live })
    }

    /// Receive published events live, if `notifier.broadcast_capacity` is set.
    pub fn subscribe(&self) -> Option<broadcast::Receiver<Published>> {
        self.live.as_ref().map(BroadcastNotifier::subscribe)
    }

    pub fn scheduler(&self) -> &WindowScheduler {
        &self.scheduler
    }

    /// Build a scheduler from configuration, publishing to `notifiers`.
    ///
    /// # Errors
    /// Returns an error if the registry is invalid, an HTTP client cannot
    /// be built, or the database cannot be opened.
    pub fn build(config: &Config, notifiers: NotifierRegistry) -> Result<WindowScheduler> {
        let registry = Arc::new(config.build_registry()?);
        info!(
            exchanges = registry.len(),
            with_trade_feed = registry.with_api().count(),
            "Exchange registry loaded"
        );

        let mut aggregator = TradeAggregator::new(factory::trade_sources(config)?);
        if config.matching.confirmed_sources_only {
            aggregator = aggregator.confirmed_only(&registry);
        }
        if aggregator.is_empty() {
            warn!("No trade sources configured, no corridor can be corroborated");
        }

        let notifier_count = notifiers.len();
        let pipeline = DetectionPipeline::new(
            MatchContext::new(registry, config.matching.bridge_asset.as_str()),
            config.match_settings(),
            aggregator,
            factory::ledger_source(config)?,
            factory::rate_source(config)?,
            factory::event_store(config)?,
            Arc::new(notifiers),
        );
        info!(
            matchers = pipeline.matchers().len(),
            notifiers = notifier_count,
            "Detection pipeline ready"
        );

        Ok(WindowScheduler::new(pipeline, config.scheduler_settings()))
    }

    /// Run the scheduler forever.
    ///
    /// # Errors
    /// Returns an error only if startup fails; cycle failures are retried.
    pub async fn run(config: Config) -> Result<()> {
        Self::from_config(&config)?.run_forever().await;
        Ok(())
    }

    /// Drive the scheduler until the task is dropped.
    pub async fn run_forever(mut self) {
        self.scheduler.run().await;
    }
}
