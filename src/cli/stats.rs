//! Handler for the `stats` command.

use serde::Serialize;

use crate::adapter::store::SqliteEventStore;
use crate::cli::StatsArgs;
use crate::domain::{CorridorEvent, Stats};
use crate::error::{ConfigError, Result};
use crate::port::EventStore;

#[derive(Serialize)]
struct Report<'a> {
    stats: Option<&'a Stats>,
    recent: &'a [CorridorEvent],
}

/// Execute the stats command.
pub async fn execute(args: &StatsArgs) -> Result<()> {
    let config = args.config.load()?;
    let path = config.database.path.as_deref().ok_or(ConfigError::MissingField {
        field: "database.path",
    })?;

    let store = SqliteEventStore::open(path)?;
    let stats = store.calculate_stats().await?;
    let recent = if args.recent > 0 {
        store.recent(args.recent).await?
    } else {
        Vec::new()
    };

    if args.json {
        let report = Report {
            stats: stats.as_ref(),
            recent: &recent,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", render(stats.as_ref(), &recent));
    }
    Ok(())
}

fn render(stats: Option<&Stats>, recent: &[CorridorEvent]) -> String {
    let Some(stats) = stats else {
        return "No corridor events recorded yet.\n".to_string();
    };

    let mut out = String::new();
    out.push('\n');
    out.push_str("═══════════════════════════════════════════════════════════\n");
    out.push_str("  Corridor Statistics\n");
    out.push_str("═══════════════════════════════════════════════════════════\n\n");
    out.push_str(&format!("  Events:            {}\n", stats.event_count));
    if let Some(rate) = stats.confirmed_rate() {
        out.push_str(&format!(
            "  Confirmed:         {} ({rate:.1}%)\n",
            stats.confirmed_count
        ));
    }
    out.push_str(&format!("  Bridge volume:     {:.2}\n", stats.bridge_volume));
    out.push_str(&format!("  USD volume:        ${:.2}\n", stats.usd_volume));
    out.push_str(&format!("  USD volume (24h):  ${:.2}\n", stats.usd_volume_24h));
    if let Some(at) = stats.last_event_at {
        out.push_str(&format!("  Last event:        {}\n", at.to_rfc3339()));
    }

    out.push_str("\n  Corridors\n");
    out.push_str("  ─────────────────────────────────────────────────────────\n");
    for corridor in &stats.corridors {
        out.push_str(&format!(
            "  {:<16} -> {:<16} {:>6}  ${:.2}\n",
            corridor.source.as_str(),
            corridor.destination.as_str(),
            corridor.count,
            corridor.usd_value
        ));
    }

    if !recent.is_empty() {
        out.push_str("\n  Recent events\n");
        out.push_str("  ─────────────────────────────────────────────────────────\n");
        for event in recent {
            out.push_str(&format!(
                "  {}  {:<12} {:>12.2} XRP  ${:.2}  {}\n",
                event.timestamp.format("%Y-%m-%d %H:%M:%S"),
                event.corridor(),
                event.amount,
                event.usd_value,
                event.spotted_at
            ));
        }
    }
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::domain::{at, event};

    #[test]
    fn empty_stats_render_placeholder() {
        assert_eq!(render(None, &[]), "No corridor events recorded yet.\n");
    }

    #[test]
    fn render_includes_corridors_and_recent() {
        let events = vec![event("A", 1000, 10.0), event("B", 2000, 20.0)];
        let stats = Stats::from_events(&events, at(3000)).unwrap();
        let text = render(Some(&stats), &events[..1]);
        assert!(text.contains("Events:            2"));
        assert!(text.contains("USD volume:        $30.00"));
        assert!(text.contains("EUR -> USD"));
    }
}
