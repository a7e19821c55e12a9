use crate::banking::CurrencyCode;
use clap::{Parser, Subcommand, ValueEnum};
use rust_decimal::Decimal;
use std::path::PathBuf;

/// Command line interface for BankLens.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "BankLens",
    author,
    version,
    about = "Multi-currency banking dashboard"
)]
pub struct Cli {
    /// Optional path to a configuration file (TOML, YAML, JSON).
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Named profile to load (e.g. dev, staging, prod).
    #[arg(short, long)]
    pub profile: Option<String>,

    /// Launch without opening the UI (useful for scripting and diagnostics).
    #[arg(long)]
    pub headless: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Fetch the signed-in customer's accounts and print the aggregate balance.
    Balance,
    /// Print the exchange-rate table.
    Rates,
    /// Convert an amount in the base currency into another currency.
    Convert {
        amount: Decimal,
        #[arg(value_enum)]
        currency: CurrencyArg,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum CurrencyArg {
    Aed,
    Usd,
    Eur,
    Gbp,
}

impl From<CurrencyArg> for CurrencyCode {
    fn from(value: CurrencyArg) -> Self {
        match value {
            CurrencyArg::Aed => CurrencyCode::Aed,
            CurrencyArg::Usd => CurrencyCode::Usd,
            CurrencyArg::Eur => CurrencyCode::Eur,
            CurrencyArg::Gbp => CurrencyCode::Gbp,
        }
    }
}
