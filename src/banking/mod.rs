pub mod aggregator;
pub mod currency;
pub mod customer;
pub mod format;
pub mod rates;

pub use aggregator::{Contribution, CurrencyAggregator};
pub use currency::CurrencyCode;
pub use customer::{Account, Customer, CustomerIdentity};
pub use format::NumberFormat;
