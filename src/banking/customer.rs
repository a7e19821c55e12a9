use super::aggregator::{Aggregate, CurrencyAggregator};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One row of the `accounts` table. The currency stays a raw string so that
/// codes the dashboard does not know about survive until aggregation; a
/// null or absent currency is kept as `None` and never counted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    #[serde(default)]
    pub currency: Option<String>,
    pub balance: Decimal,
    #[serde(default)]
    pub account_number: Option<String>,
}

impl Account {
    pub fn new(currency: impl Into<String>, balance: Decimal) -> Self {
        Self {
            currency: Some(currency.into()),
            balance,
            account_number: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerIdentity {
    pub id: i64,
    pub name: String,
}

impl CustomerIdentity {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// A customer with their accounts. The aggregate balance is derived from the
/// accounts at construction and cannot be set directly.
#[derive(Debug, Clone, PartialEq)]
pub struct Customer {
    identity: CustomerIdentity,
    accounts: Vec<Account>,
    aggregate: Aggregate,
}

impl Customer {
    pub fn new(
        identity: CustomerIdentity,
        accounts: Vec<Account>,
        aggregator: &CurrencyAggregator,
    ) -> Self {
        let aggregate = aggregator.aggregate(&accounts);
        Self {
            identity,
            accounts,
            aggregate,
        }
    }

    /// Guest/demo customer shown when no session record exists.
    pub fn guest(identity: CustomerIdentity) -> Self {
        Self {
            identity,
            accounts: Vec::new(),
            aggregate: Aggregate::default(),
        }
    }

    pub fn id(&self) -> i64 {
        self.identity.id
    }

    pub fn name(&self) -> &str {
        &self.identity.name
    }

    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    pub fn aggregate(&self) -> &Aggregate {
        &self.aggregate
    }

    pub fn aggregate_balance(&self) -> Decimal {
        self.aggregate.total()
    }
}
