//! Exchange catalog and address resolution.
//!
//! The registry is an arena of immutable [`Exchange`] records built once at
//! startup, with indexes by ledger address and by (address, fiat). Lookups
//! return `Option`: an unmapped address is an unknown counterparty, not an
//! error.

use std::collections::{BTreeSet, HashMap};

use serde::Serialize;

use super::error::DomainError;
use super::fiat::Fiat;
use super::id::{Address, ExchangeId};

/// A known exchange and the ledger addresses it operates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Exchange {
    id: ExchangeId,
    name: String,
    addresses: Vec<Address>,
    fiat: Fiat,
    confirmed: bool,
    has_api: bool,
}

impl Exchange {
    /// Create a new exchange record.
    pub fn new(
        id: impl Into<ExchangeId>,
        name: impl Into<String>,
        fiat: Fiat,
        addresses: Vec<Address>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            addresses,
            fiat,
            confirmed: false,
            has_api: false,
        }
    }

    /// Mark the exchange as a verified bridge participant.
    #[must_use]
    pub fn confirmed(mut self, confirmed: bool) -> Self {
        self.confirmed = confirmed;
        self
    }

    /// Mark the exchange as exposing trade data.
    #[must_use]
    pub fn with_api(mut self, has_api: bool) -> Self {
        self.has_api = has_api;
        self
    }

    #[must_use]
    pub fn id(&self) -> &ExchangeId {
        &self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn addresses(&self) -> &[Address] {
        &self.addresses
    }

    /// Local fiat currency the exchange settles in.
    #[must_use]
    pub fn fiat(&self) -> Fiat {
        self.fiat
    }

    /// Whether the exchange is a verified bridge participant.
    #[must_use]
    pub fn is_confirmed(&self) -> bool {
        self.confirmed
    }

    /// Whether trades can be fetched for this exchange.
    #[must_use]
    pub fn has_api(&self) -> bool {
        self.has_api
    }
}

/// Immutable catalog of exchanges indexed by address.
#[derive(Debug, Clone, Default)]
pub struct ExchangeRegistry {
    exchanges: Vec<Exchange>,
    by_id: HashMap<ExchangeId, usize>,
    by_address: HashMap<Address, Vec<usize>>,
    by_address_and_fiat: HashMap<(Address, Fiat), usize>,
}

impl ExchangeRegistry {
    /// Build a registry, validating ids and addresses.
    ///
    /// # Errors
    /// Returns an error if an id repeats or an exchange has no address.
    pub fn new(exchanges: Vec<Exchange>) -> Result<Self, DomainError> {
        let mut registry = Self::default();

        for (index, exchange) in exchanges.iter().enumerate() {
            if exchange.addresses.is_empty() {
                return Err(DomainError::NoAddresses {
                    exchange: exchange.id.clone(),
                });
            }
            if registry.by_id.insert(exchange.id.clone(), index).is_some() {
                return Err(DomainError::DuplicateExchange {
                    exchange: exchange.id.clone(),
                });
            }
            for address in &exchange.addresses {
                registry
                    .by_address
                    .entry(address.clone())
                    .or_default()
                    .push(index);
                registry
                    .by_address_and_fiat
                    .entry((address.clone(), exchange.fiat))
                    .or_insert(index);
            }
        }

        registry.exchanges = exchanges;
        Ok(registry)
    }

    /// Look up an exchange by id.
    #[must_use]
    pub fn get(&self, id: &ExchangeId) -> Option<&Exchange> {
        self.by_id.get(id).map(|&i| &self.exchanges[i])
    }

    /// Resolve an address to the first exchange registered for it.
    #[must_use]
    pub fn by_address(&self, address: &Address) -> Option<&Exchange> {
        self.by_address
            .get(address)
            .and_then(|indexes| indexes.first())
            .map(|&i| &self.exchanges[i])
    }

    /// Every exchange book registered at `address`, in registration order.
    pub fn books_at<'a>(&'a self, address: &Address) -> impl Iterator<Item = &'a Exchange> + 'a {
        self.by_address
            .get(address)
            .into_iter()
            .flatten()
            .map(move |&i| &self.exchanges[i])
    }

    /// Resolve an address to the exchange book settling in `fiat`.
    #[must_use]
    pub fn by_address_and_fiat(&self, address: &Address, fiat: Fiat) -> Option<&Exchange> {
        self.by_address_and_fiat
            .get(&(address.clone(), fiat))
            .map(|&i| &self.exchanges[i])
    }

    /// All exchanges in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Exchange> {
        self.exchanges.iter()
    }

    /// Exchanges whose trades can be fetched.
    pub fn with_api(&self) -> impl Iterator<Item = &Exchange> {
        self.exchanges.iter().filter(|e| e.has_api)
    }

    /// Exchanges without a trade feed.
    pub fn without_api(&self) -> impl Iterator<Item = &Exchange> {
        self.exchanges.iter().filter(|e| !e.has_api)
    }

    /// Distinct local fiats of exchanges with a trade feed.
    #[must_use]
    pub fn fiats_with_api(&self) -> BTreeSet<Fiat> {
        self.with_api().map(Exchange::fiat).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.exchanges.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.exchanges.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> ExchangeRegistry {
        ExchangeRegistry::new(vec![
            Exchange::new("bitstamp-usd", "Bitstamp", Fiat::Usd, vec![Address::from("rStamp")])
                .confirmed(true)
                .with_api(true),
            Exchange::new("bitstamp-eur", "Bitstamp", Fiat::Eur, vec![Address::from("rStamp")])
                .confirmed(true)
                .with_api(true),
            Exchange::new("coins", "Coins.ph", Fiat::Php, vec![Address::from("rCoins")]),
        ])
        .unwrap()
    }

    #[test]
    fn unknown_address_resolves_to_none() {
        let registry = registry();
        assert!(registry.by_address(&Address::from("rNobody")).is_none());
    }

    #[test]
    fn shared_address_resolves_to_first_entry() {
        let registry = registry();
        let exchange = registry.by_address(&Address::from("rStamp")).unwrap();
        assert_eq!(exchange.id().as_str(), "bitstamp-usd");
    }

    #[test]
    fn fiat_disambiguates_shared_address() {
        let registry = registry();
        let exchange = registry
            .by_address_and_fiat(&Address::from("rStamp"), Fiat::Eur)
            .unwrap();
        assert_eq!(exchange.id().as_str(), "bitstamp-eur");
        assert!(registry
            .by_address_and_fiat(&Address::from("rStamp"), Fiat::Php)
            .is_none());
    }

    #[test]
    fn books_at_lists_every_entry_for_an_address() {
        let registry = registry();
        let ids: Vec<_> = registry
            .books_at(&Address::from("rStamp"))
            .map(|e| e.id().as_str())
            .collect();
        assert_eq!(ids, vec!["bitstamp-usd", "bitstamp-eur"]);
        assert_eq!(registry.books_at(&Address::from("rNobody")).count(), 0);
    }

    #[test]
    fn api_partitions() {
        let registry = registry();
        assert_eq!(registry.with_api().count(), 2);
        assert_eq!(registry.without_api().count(), 1);
        assert_eq!(
            registry.fiats_with_api().into_iter().collect::<Vec<_>>(),
            vec![Fiat::Usd, Fiat::Eur]
        );
    }

    #[test]
    fn rejects_duplicate_ids() {
        let result = ExchangeRegistry::new(vec![
            Exchange::new("a", "A", Fiat::Usd, vec![Address::from("r1")]),
            Exchange::new("a", "A", Fiat::Eur, vec![Address::from("r2")]),
        ]);
        assert!(matches!(result, Err(DomainError::DuplicateExchange { .. })));
    }

    #[test]
    fn rejects_exchange_without_addresses() {
        let result = ExchangeRegistry::new(vec![Exchange::new("a", "A", Fiat::Usd, vec![])]);
        assert!(matches!(result, Err(DomainError::NoAddresses { .. })));
    }
}
