use super::currency::CurrencyCode;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

/// A quoted rate: `rate` units of `to` buy one unit of `from`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeRate {
    pub from: CurrencyCode,
    pub to: CurrencyCode,
    pub rate: Decimal,
    pub daily_change: Decimal,
}

impl ExchangeRate {
    pub const fn new(from: CurrencyCode, to: CurrencyCode, rate: Decimal, daily_change: Decimal) -> Self {
        Self {
            from,
            to,
            rate,
            daily_change,
        }
    }

    pub fn is_rising(&self) -> bool {
        self.daily_change > Decimal::ZERO
    }
}

/// Static reference table. Every entry is quoted in one direction only; inverse
/// lookups are never derived from it.
#[derive(Debug, Clone, PartialEq)]
pub struct RateTable {
    entries: Vec<ExchangeRate>,
}

impl RateTable {
    pub fn new(entries: Vec<ExchangeRate>) -> Self {
        Self { entries }
    }

    /// The published dashboard rates.
    pub fn standard() -> Self {
        use CurrencyCode::*;
        Self::new(vec![
            ExchangeRate::new(Aed, Usd, dec!(0.2723), dec!(-0.0002)),
            ExchangeRate::new(Aed, Eur, dec!(0.2488), dec!(0.0001)),
            ExchangeRate::new(Aed, Gbp, dec!(0.2151), dec!(0.0000)),
            ExchangeRate::new(Usd, Eur, dec!(0.91), dec!(0.002)),
            ExchangeRate::new(Usd, Gbp, dec!(0.78), dec!(-0.001)),
        ])
    }

    pub fn entries(&self) -> &[ExchangeRate] {
        &self.entries
    }

    pub fn direct(&self, from: CurrencyCode, to: CurrencyCode) -> Option<&ExchangeRate> {
        self.entries
            .iter()
            .find(|entry| entry.from == from && entry.to == to)
    }

    /// Units of `target` per one unit of BASE. BASE itself is the identity.
    pub fn base_rate(&self, target: CurrencyCode) -> Option<Decimal> {
        if target.is_base() {
            return Some(Decimal::ONE);
        }
        self.direct(CurrencyCode::BASE, target).map(|entry| entry.rate)
    }
}

#[cfg(test)]
impl RateTable {
    /// Returns a copy with the BASE→`target` quote replaced (or added).
    pub fn with_base_rate(mut self, target: CurrencyCode, rate: Decimal) -> Self {
        match self
            .entries
            .iter_mut()
            .find(|entry| entry.from == CurrencyCode::BASE && entry.to == target)
        {
            Some(entry) => entry.rate = rate,
            None => self
                .entries
                .push(ExchangeRate::new(CurrencyCode::BASE, target, rate, Decimal::ZERO)),
        }
        self
    }
}

impl Default for RateTable {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_rate_is_identity_for_base() {
        let table = RateTable::standard();
        assert_eq!(table.base_rate(CurrencyCode::Aed), Some(Decimal::ONE));
    }

    #[test]
    fn every_display_currency_has_a_base_quote() {
        let table = RateTable::standard();
        for code in CurrencyCode::ALL {
            assert!(table.base_rate(code).is_some(), "missing quote for {code}");
        }
    }

    #[test]
    fn inverse_direction_is_not_derived() {
        let table = RateTable::standard();
        assert!(table.direct(CurrencyCode::Usd, CurrencyCode::Aed).is_none());
        assert!(table.direct(CurrencyCode::Usd, CurrencyCode::Eur).is_some());
    }

    #[test]
    fn overriding_a_base_rate_keeps_other_entries() {
        let table = RateTable::standard().with_base_rate(CurrencyCode::Usd, dec!(0.3));
        assert_eq!(table.base_rate(CurrencyCode::Usd), Some(dec!(0.3)));
        assert_eq!(table.base_rate(CurrencyCode::Eur), Some(dec!(0.2488)));
        assert_eq!(table.entries().len(), RateTable::standard().entries().len());
    }
}
