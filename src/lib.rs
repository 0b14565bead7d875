pub mod cli;
pub mod core;
pub mod providers;

use crate::cli::ui;
use crate::core::cache::Cache;
use crate::core::config::{AppConfig, RateSource};
use crate::core::{ConversionRequest, Converter, RateTable, UnitCategory};
use anyhow::{Result, bail};
use std::sync::Arc;
use tracing::{debug, info};

pub enum AppCommand {
    Convert {
        request: ConversionRequest,
        json: bool,
    },
    Units {
        category: Option<UnitCategory>,
    },
    Rates,
    Interactive,
}

impl AppCommand {
    fn needs_rates(&self) -> bool {
        !matches!(self, AppCommand::Units { .. })
    }
}

/// Builds the rate table a run converts with.
///
/// `live` forces a Yahoo snapshot regardless of the configured source.
pub async fn load_rates(config: &AppConfig, live: bool) -> Result<RateTable> {
    let source = if live {
        RateSource::Yahoo
    } else {
        config.rates.source
    };

    match source {
        RateSource::Builtin => Ok(config.static_rates()),
        RateSource::Yahoo => {
            let base_url = config.yahoo_base_url();
            info!("Fetching live exchange rates from {}", base_url);

            let currencies = &config.rates.currencies;
            let cache = Arc::new(Cache::new());
            let provider = providers::YahooCurrencyProvider::new(base_url, cache)?;

            let pairs = currencies.len() * currencies.len().saturating_sub(1);
            let pb = ui::new_progress_bar(pairs as u64, true);
            pb.set_message("Fetching rates");
            let table = RateTable::fetch(&provider, currencies, &|| pb.inc(1)).await;
            pb.finish_and_clear();

            if table.is_empty() {
                bail!("Could not fetch any exchange rates from {}", base_url);
            }
            Ok(table.with_overrides(&config.rates.table))
        }
    }
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>, live: bool) -> Result<()> {
    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let rates = if command.needs_rates() {
        load_rates(&config, live).await?
    } else {
        RateTable::default()
    };

    match command {
        AppCommand::Convert { request, json } => {
            cli::convert::run(&Converter::new(rates), &request, json)
        }
        AppCommand::Units { category } => {
            cli::units::run(category);
            Ok(())
        }
        AppCommand::Rates => {
            cli::rates::run(&rates);
            Ok(())
        }
        AppCommand::Interactive => cli::interactive::run(&Converter::new(rates)),
    }
}
