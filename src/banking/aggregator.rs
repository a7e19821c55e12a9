use super::currency::CurrencyCode;
use super::customer::Account;
use super::rates::RateTable;
use rust_decimal::Decimal;
use std::fmt;

/// Why an account did not count toward the aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    UnknownCurrency,
    MissingRate,
    ZeroRate,
    /// Counting the account would overflow the running total or the
    /// conversion itself.
    Overflow,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::UnknownCurrency => write!(f, "unknown currency"),
            SkipReason::MissingRate => write!(f, "no rate from base"),
            SkipReason::ZeroRate => write!(f, "zero rate"),
            SkipReason::Overflow => write!(f, "amount out of range"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Contribution {
    Counted {
        currency: CurrencyCode,
        amount_in_base: Decimal,
    },
    Skipped {
        currency: String,
        reason: SkipReason,
    },
}

impl Contribution {
    pub fn amount_in_base(&self) -> Decimal {
        match self {
            Contribution::Counted { amount_in_base, .. } => *amount_in_base,
            Contribution::Skipped { .. } => Decimal::ZERO,
        }
    }
}

/// Total in BASE plus how each account got there.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Aggregate {
    total: Decimal,
    contributions: Vec<Contribution>,
}

impl Aggregate {
    pub fn total(&self) -> Decimal {
        self.total
    }

    pub fn contributions(&self) -> &[Contribution] {
        &self.contributions
    }

    pub fn skipped(&self) -> impl Iterator<Item = (&str, SkipReason)> {
        self.contributions.iter().filter_map(|contribution| match contribution {
            Contribution::Skipped { currency, reason } => Some((currency.as_str(), *reason)),
            Contribution::Counted { .. } => None,
        })
    }
}

/// Converts balances into the BASE currency and back out to display
/// currencies. Rates are quoted as units of X per one BASE, so a balance in X
/// contributes `balance / rate` and a BASE amount displays as `amount * rate`.
#[derive(Debug, Clone)]
pub struct CurrencyAggregator {
    rates: RateTable,
}

impl Default for CurrencyAggregator {
    fn default() -> Self {
        Self::new(RateTable::standard())
    }
}

impl CurrencyAggregator {
    pub fn new(rates: RateTable) -> Self {
        Self { rates }
    }

    pub fn rates(&self) -> &RateTable {
        &self.rates
    }

    pub fn contribution(&self, account: &Account) -> Contribution {
        let label = account.currency.as_deref().unwrap_or_default();
        let currency = match label.parse::<CurrencyCode>() {
            Ok(code) => code,
            Err(_) => {
                return Contribution::Skipped {
                    currency: label.to_string(),
                    reason: SkipReason::UnknownCurrency,
                }
            }
        };

        if currency.is_base() {
            return Contribution::Counted {
                currency,
                amount_in_base: account.balance,
            };
        }

        match self.to_base(account.balance, currency) {
            Ok(amount_in_base) => Contribution::Counted {
                currency,
                amount_in_base,
            },
            Err(reason) => Contribution::Skipped {
                currency: label.to_string(),
                reason,
            },
        }
    }

    /// Sums every account into BASE. An account whose contribution would push
    /// the total out of range is skipped with [`SkipReason::Overflow`] instead.
    pub fn aggregate(&self, accounts: &[Account]) -> Aggregate {
        let mut total = Decimal::ZERO;
        let mut contributions = Vec::with_capacity(accounts.len());
        for account in accounts {
            let contribution = match self.contribution(account) {
                Contribution::Counted {
                    currency,
                    amount_in_base,
                } => match total.checked_add(amount_in_base) {
                    Some(sum) => {
                        total = sum;
                        Contribution::Counted {
                            currency,
                            amount_in_base,
                        }
                    }
                    None => Contribution::Skipped {
                        currency: currency.iso().to_string(),
                        reason: SkipReason::Overflow,
                    },
                },
                skipped => skipped,
            };
            contributions.push(contribution);
        }
        Aggregate {
            total,
            contributions,
        }
    }

    pub fn to_base(&self, amount: Decimal, currency: CurrencyCode) -> Result<Decimal, SkipReason> {
        let rate = self.rates.base_rate(currency).ok_or(SkipReason::MissingRate)?;
        if rate.is_zero() {
            return Err(SkipReason::ZeroRate);
        }
        amount.checked_div(rate).ok_or(SkipReason::Overflow)
    }

    /// Converts a BASE amount for display in `target`.
    pub fn convert(&self, base_amount: Decimal, target: CurrencyCode) -> Result<Decimal, SkipReason> {
        let rate = self.rates.base_rate(target).ok_or(SkipReason::MissingRate)?;
        if rate.is_zero() {
            return Err(SkipReason::ZeroRate);
        }
        base_amount.checked_mul(rate).ok_or(SkipReason::Overflow)
    }

    /// Display divisor for `target`: units of BASE per one unit of `target`.
    pub fn display_divisor(&self, target: CurrencyCode) -> Option<Decimal> {
        self.rates
            .base_rate(target)
            .and_then(|rate| Decimal::ONE.checked_div(rate))
    }
}
