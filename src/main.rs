mod app;
mod banking;
mod cli;
mod config;
mod services;
mod ui;

use crate::app::ServiceContext;
use crate::banking::{Contribution, CurrencyAggregator, CurrencyCode};
use crate::cli::Command;
use crate::config::AppConfig;
use anyhow::{anyhow, Context, Result};
use clap::Parser;
use std::panic;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<()> {
    panic::set_hook(Box::new(|info| {
        eprintln!("BankLens panic: {info}");
        if let Some(location) = info.location() {
            eprintln!(
                "  at {}:{}",
                location.file(),
                location.line()
            );
        }
    }));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".to_string().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = cli::Cli::parse();
    let settings = AppConfig::load(&cli)?;

    if let Some(command) = cli.command.clone() {
        return handle_command(command, &settings);
    }

    if cli.headless {
        println!("Nothing to do in headless mode without a command. Try `banklens balance`.");
        return Ok(());
    }

    app::run(settings)
}

fn handle_command(command: Command, settings: &AppConfig) -> Result<()> {
    let format = settings.number_format();
    match command {
        Command::Balance => {
            let services = ServiceContext::new(settings)?;
            let runtime = tokio::runtime::Runtime::new().context("Starting tokio runtime")?;
            let loaded = runtime.block_on(services.load_customer())?;
            let customer = &loaded.customer;
            let total = customer.aggregate_balance();

            match loaded.guest {
                Some(reason) => println!("{} (#{}, guest: {reason:?})", customer.name(), customer.id()),
                None => println!("{} (#{})", customer.name(), customer.id()),
            }
            println!(
                "Total balance: {} {}",
                format.format(total),
                CurrencyCode::BASE.iso()
            );
            for code in CurrencyCode::ALL.into_iter().filter(|code| !code.is_base()) {
                match services.aggregator().convert(total, code) {
                    Ok(amount) => println!("  {} {}", code.symbol(), format.format(amount)),
                    Err(reason) => println!("  {} unavailable ({reason})", code.iso()),
                }
            }
            for contribution in customer.aggregate().contributions() {
                match contribution {
                    Contribution::Counted {
                        currency,
                        amount_in_base,
                    } => println!(
                        "  {currency} account: {} {}",
                        format.format(*amount_in_base),
                        CurrencyCode::BASE
                    ),
                    Contribution::Skipped { currency, reason } => {
                        println!("  skipped account in {currency:?}: {reason}")
                    }
                }
            }
        }
        Command::Rates => {
            let aggregator = CurrencyAggregator::default();
            for rate in aggregator.rates().entries() {
                println!(
                    "1 {} = {} {}  ({})",
                    rate.from,
                    format.format_rate(rate.rate),
                    rate.to,
                    format.format_change(rate.daily_change)
                );
            }
            for code in CurrencyCode::ALL.into_iter().filter(|code| !code.is_base()) {
                if let Some(divisor) = aggregator.display_divisor(code) {
                    println!("1 {code} = {} {}", format.format_rate(divisor), CurrencyCode::BASE);
                }
            }
        }
        Command::Convert { amount, currency } => {
            let code = CurrencyCode::from(currency);
            let converted = CurrencyAggregator::default()
                .convert(amount, code)
                .map_err(|reason| anyhow!("cannot convert to {code}: {reason}"))?;
            println!(
                "{} {} = {} {}",
                format.format(amount),
                CurrencyCode::BASE,
                format.format(converted),
                code
            );
        }
    }
    Ok(())
}
