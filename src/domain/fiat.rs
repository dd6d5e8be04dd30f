//! Local fiat currencies of registered exchanges.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::DomainError;

/// Fiat currency an exchange settles in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Fiat {
    Usd,
    Eur,
    Gbp,
    Mxn,
    Php,
    Aud,
    Thb,
    Jpy,
    Krw,
    Brl,
    Try,
    Inr,
}

impl Fiat {
    /// All supported currencies, in declaration order.
    pub const ALL: [Fiat; 12] = [
        Fiat::Usd,
        Fiat::Eur,
        Fiat::Gbp,
        Fiat::Mxn,
        Fiat::Php,
        Fiat::Aud,
        Fiat::Thb,
        Fiat::Jpy,
        Fiat::Krw,
        Fiat::Brl,
        Fiat::Try,
        Fiat::Inr,
    ];

    /// ISO 4217 code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Fiat::Usd => "USD",
            Fiat::Eur => "EUR",
            Fiat::Gbp => "GBP",
            Fiat::Mxn => "MXN",
            Fiat::Php => "PHP",
            Fiat::Aud => "AUD",
            Fiat::Thb => "THB",
            Fiat::Jpy => "JPY",
            Fiat::Krw => "KRW",
            Fiat::Brl => "BRL",
            Fiat::Try => "TRY",
            Fiat::Inr => "INR",
        }
    }
}

impl fmt::Display for Fiat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Fiat {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Fiat::ALL
            .into_iter()
            .find(|fiat| fiat.code().eq_ignore_ascii_case(s))
            .ok_or_else(|| DomainError::UnknownCurrency {
                code: s.to_string(),
            })
    }
}
