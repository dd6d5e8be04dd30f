//! Application services (use cases).
//!
//! These services orchestrate domain logic and coordinate adapters
//! through the ports to implement the detection cycle.

pub mod aggregator;
pub mod candidate;
pub mod matcher;
pub mod pipeline;
pub mod scheduler;

pub use aggregator::TradeAggregator;
pub use matcher::{CorridorMatcher, MatchContext, Strategy};
pub use pipeline::{plan_matchers, CycleReport, DetectionPipeline, MatchSettings};
pub use scheduler::{SchedulerSettings, SchedulerState, WindowScheduler};
