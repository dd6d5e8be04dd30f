//! Handler for the `exchanges` command.

use crate::cli::ExchangesArgs;
use crate::domain::ExchangeRegistry;
use crate::error::Result;

/// Execute the exchanges command.
pub fn execute(args: &ExchangesArgs) -> Result<()> {
    let config = args.config.load()?;
    let registry = config.build_registry()?;

    if args.json {
        let exchanges: Vec<_> = registry.iter().collect();
        println!("{}", serde_json::to_string_pretty(&exchanges)?);
    } else {
        print!("{}", render(&registry));
    }
    Ok(())
}

fn render(registry: &ExchangeRegistry) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:<16} {:<14} {:<5} {:<6} {:<10} {}\n",
        "ID", "NAME", "FIAT", "FEED", "CONFIRMED", "ADDRESSES"
    ));
    for exchange in registry.iter() {
        let addresses: Vec<&str> = exchange.addresses().iter().map(|a| a.as_str()).collect();
        out.push_str(&format!(
            "{:<16} {:<14} {:<5} {:<6} {:<10} {}\n",
            exchange.id().as_str(),
            exchange.name(),
            exchange.fiat().code(),
            if exchange.has_api() { "yes" } else { "no" },
            if exchange.is_confirmed() { "yes" } else { "no" },
            addresses.join(", ")
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn render_lists_every_exchange() {
        let registry = Config::default().build_registry().unwrap();
        let table = render(&registry);
        assert_eq!(table.lines().count(), registry.len() + 1);
        assert!(table.contains("coins-ph"));
        assert!(table.contains("rG6FZ31hDHN1K5Dkbma3PSB5uVCuVVRzfn"));
    }
}
