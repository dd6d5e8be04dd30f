//! Candidate filtering and transfer-to-event mapping.
//!
//! A transfer is a candidate when both endpoints are known exchanges, the
//! exchanges differ, and the bridge asset moved. Confirmation comes from
//! the registry only; trade evidence never affects it.

use crate::domain::{
    CorridorEvent, DomainError, ExchangeRegistry, Fiat, LedgerTransfer, SpottedAt,
};

/// Check whether `transfer` could be corridor usage at all.
///
/// # Errors
/// Returns the reason the transfer is not a candidate.
pub fn check_candidate(
    transfer: &LedgerTransfer,
    registry: &ExchangeRegistry,
    bridge_asset: &str,
) -> Result<(), DomainError> {
    if !transfer.is_asset(bridge_asset) {
        return Err(DomainError::WrongAsset {
            asset: transfer.asset.clone(),
        });
    }

    let source = registry
        .by_address(&transfer.source)
        .ok_or_else(|| DomainError::UnknownAddress {
            address: transfer.source.clone(),
        })?;
    let destination = registry
        .by_address(&transfer.destination)
        .ok_or_else(|| DomainError::UnknownAddress {
            address: transfer.destination.clone(),
        })?;

    if source.id() == destination.id() || transfer.source == transfer.destination {
        return Err(DomainError::SameExchange {
            exchange: source.id().clone(),
        });
    }

    Ok(())
}

/// Whether `transfer` passes [`check_candidate`].
#[must_use]
pub fn is_candidate(
    transfer: &LedgerTransfer,
    registry: &ExchangeRegistry,
    bridge_asset: &str,
) -> bool {
    check_candidate(transfer, registry, bridge_asset).is_ok()
}

/// Map a candidate transfer to a corridor event.
///
/// When `source_fiat` is given the source is resolved by (address, fiat),
/// which picks the right book on exchanges that share one address across
/// several currencies.
///
/// # Errors
/// Returns an error if the timestamp or amount cannot be parsed, or an
/// endpoint does not resolve.
pub fn map_transfer(
    transfer: &LedgerTransfer,
    registry: &ExchangeRegistry,
    source_fiat: Option<Fiat>,
    rate: f64,
    spotted_at: SpottedAt,
) -> Result<CorridorEvent, DomainError> {
    let timestamp = transfer.executed_at()?;
    let amount = transfer.amount()?;

    let source = match source_fiat {
        Some(fiat) => registry.by_address_and_fiat(&transfer.source, fiat),
        None => registry.by_address(&transfer.source),
    }
    .ok_or_else(|| DomainError::UnknownAddress {
        address: transfer.source.clone(),
    })?;
    let destination =
        registry
            .by_address(&transfer.destination)
            .ok_or_else(|| DomainError::UnknownAddress {
                address: transfer.destination.clone(),
            })?;

    if source.id() == destination.id() {
        return Err(DomainError::SameExchange {
            exchange: source.id().clone(),
        });
    }

    Ok(CorridorEvent {
        amount,
        source: source.id().clone(),
        destination: destination.id().clone(),
        source_fiat: source.fiat(),
        destination_fiat: destination.fiat(),
        source_address: transfer.source.clone(),
        destination_address: transfer.destination.clone(),
        tx_hash: transfer.tx_hash.clone(),
        tag: transfer.destination_tag,
        timestamp,
        usd_value: amount * rate,
        confirmed: source.is_confirmed() && destination.is_confirmed(),
        spotted_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Address, Exchange, TxHash};

    fn registry() -> ExchangeRegistry {
        ExchangeRegistry::new(vec![
            Exchange::new("stamp-usd", "Bitstamp", Fiat::Usd, vec![Address::from("rStamp")])
                .confirmed(true),
            Exchange::new("stamp-eur", "Bitstamp", Fiat::Eur, vec![Address::from("rStamp")])
                .confirmed(true),
            Exchange::new("bitso", "Bitso", Fiat::Mxn, vec![Address::from("rBitso")])
                .confirmed(true),
            Exchange::new("other", "Other", Fiat::Php, vec![Address::from("rOther")]),
        ])
        .unwrap()
    }

    fn transfer(source: &str, destination: &str) -> LedgerTransfer {
        LedgerTransfer {
            source: Address::from(source),
            destination: Address::from(destination),
            delivered_amount: "1000".into(),
            asset: "XRP".into(),
            tx_hash: TxHash::from("HASH"),
            destination_tag: Some(42),
            executed_time: "2019-03-01T12:00:00Z".into(),
        }
    }

    #[test]
    fn unknown_endpoints_are_not_candidates() {
        let registry = registry();
        assert!(!is_candidate(&transfer("rNobody", "rBitso"), &registry, "XRP"));
        assert!(!is_candidate(&transfer("rStamp", "rNobody"), &registry, "XRP"));
    }

    #[test]
    fn same_exchange_is_not_a_candidate() {
        let registry = registry();
        let result = check_candidate(&transfer("rStamp", "rStamp"), &registry, "XRP");
        assert!(matches!(result, Err(DomainError::SameExchange { .. })));
    }

    #[test]
    fn other_assets_are_not_candidates() {
        let registry = registry();
        let mut t = transfer("rStamp", "rBitso");
        t.asset = "USD".into();
        assert!(matches!(
            check_candidate(&t, &registry, "XRP"),
            Err(DomainError::WrongAsset { .. })
        ));
    }

    #[test]
    fn maps_fields_and_applies_rate() {
        let registry = registry();
        let event = map_transfer(
            &transfer("rStamp", "rBitso"),
            &registry,
            Some(Fiat::Eur),
            0.3125,
            SpottedAt::SourceAndDestination,
        )
        .unwrap();

        assert_eq!(event.source.as_str(), "stamp-eur");
        assert_eq!(event.source_fiat, Fiat::Eur);
        assert_eq!(event.destination_fiat, Fiat::Mxn);
        assert_eq!(event.tag, Some(42));
        assert_eq!(event.usd_value, 1000.0 * 0.3125);
        assert!(event.confirmed);
    }

    #[test]
    fn confirmation_needs_both_endpoints_confirmed() {
        let registry = registry();
        let event = map_transfer(
            &transfer("rOther", "rBitso"),
            &registry,
            None,
            1.0,
            SpottedAt::Destination,
        )
        .unwrap();
        assert!(!event.confirmed);
    }

    #[test]
    fn bad_timestamp_is_a_mapping_error() {
        let registry = registry();
        let mut t = transfer("rStamp", "rBitso");
        t.executed_time = "not-a-time".into();
        let result = map_transfer(&t, &registry, None, 1.0, SpottedAt::Source);
        assert!(matches!(result, Err(DomainError::InvalidTimestamp { .. })));
    }

    #[test]
    fn missing_fiat_book_is_a_mapping_error() {
        let registry = registry();
        let result = map_transfer(
            &transfer("rBitso", "rOther"),
            &registry,
            Some(Fiat::Usd),
            1.0,
            SpottedAt::SourceAndDestination,
        );
        assert!(matches!(result, Err(DomainError::UnknownAddress { .. })));
    }
}
