use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Currencies the dashboard knows how to aggregate and display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CurrencyCode {
    Aed,
    Usd,
    Eur,
    Gbp,
}

impl CurrencyCode {
    /// Reporting currency every aggregate is summed in.
    pub const BASE: CurrencyCode = CurrencyCode::Aed;

    pub const ALL: [CurrencyCode; 4] = [
        CurrencyCode::Aed,
        CurrencyCode::Usd,
        CurrencyCode::Eur,
        CurrencyCode::Gbp,
    ];

    pub fn iso(&self) -> &'static str {
        match self {
            CurrencyCode::Aed => "AED",
            CurrencyCode::Usd => "USD",
            CurrencyCode::Eur => "EUR",
            CurrencyCode::Gbp => "GBP",
        }
    }

    /// Label the account store writes into the `currency` column.
    pub fn store_label(&self) -> &'static str {
        match self {
            CurrencyCode::Aed => "درهم اماراتي",
            CurrencyCode::Usd => "دولار أمريكي",
            CurrencyCode::Eur => "يورو",
            CurrencyCode::Gbp => "جنيه استرليني",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            CurrencyCode::Aed => "UAE Dirham",
            CurrencyCode::Usd => "US Dollar",
            CurrencyCode::Eur => "Euro",
            CurrencyCode::Gbp => "British Pound",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            CurrencyCode::Aed => "د.إ",
            CurrencyCode::Usd => "$",
            CurrencyCode::Eur => "€",
            CurrencyCode::Gbp => "£",
        }
    }

    pub fn flag(&self) -> &'static str {
        match self {
            CurrencyCode::Aed => "🇦🇪",
            CurrencyCode::Usd => "🇺🇸",
            CurrencyCode::Eur => "🇪🇺",
            CurrencyCode::Gbp => "🇬🇧",
        }
    }

    pub fn is_base(&self) -> bool {
        *self == Self::BASE
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.iso())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown currency code: {0:?}")]
pub struct UnknownCurrency(pub String);

impl FromStr for CurrencyCode {
    type Err = UnknownCurrency;

    /// Accepts ISO codes in any case as well as the store labels.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        CurrencyCode::ALL
            .into_iter()
            .find(|code| {
                code.iso().eq_ignore_ascii_case(trimmed) || code.store_label() == trimmed
            })
            .ok_or_else(|| UnknownCurrency(value.to_string()))
    }
}
