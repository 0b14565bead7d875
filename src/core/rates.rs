//! Currency exchange-rate tables
//!
//! Conversions look rates up through [`RateProvider`], so the hand-authored
//! table can be replaced by configured overrides or a fetched snapshot
//! without touching the converter.

use crate::core::currency::CurrencyRateProvider;
use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, instrument, warn};

/// Source of multiplicative exchange rates.
pub trait RateProvider: Send + Sync {
    /// Rate to multiply an amount in `from` by to express it in `to`.
    fn rate(&self, from: &str, to: &str) -> Option<f64>;

    /// Currency codes this provider can convert from.
    fn currencies(&self) -> Vec<String>;
}

pub type RateMap = BTreeMap<String, BTreeMap<String, f64>>;

/// Approximate rates shipped with the binary.
const BUILTIN_RATES: &[(&str, &[(&str, f64)])] = &[
    (
        "USD",
        &[("PKR", 278.0), ("EUR", 0.91), ("GBP", 0.78), ("INR", 83.5)],
    ),
    (
        "PKR",
        &[("USD", 0.0036), ("EUR", 0.0033), ("GBP", 0.0028), ("INR", 0.30)],
    ),
    (
        "EUR",
        &[("USD", 1.10), ("PKR", 303.0), ("GBP", 0.86), ("INR", 91.5)],
    ),
    (
        "GBP",
        &[("USD", 1.28), ("PKR", 352.0), ("EUR", 1.16), ("INR", 106.7)],
    ),
    (
        "INR",
        &[("USD", 0.012), ("PKR", 3.35), ("EUR", 0.011), ("GBP", 0.0094)],
    ),
];

/// Read-only table of rates keyed by source then target currency.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RateTable {
    rates: RateMap,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    fetched_at: Option<DateTime<Utc>>,
}

impl RateTable {
    pub fn new(rates: RateMap) -> Self {
        RateTable {
            rates,
            fetched_at: None,
        }
    }

    pub fn builtin() -> Self {
        let rates = BUILTIN_RATES
            .iter()
            .map(|(from, targets)| {
                let targets = targets
                    .iter()
                    .map(|(to, rate)| (to.to_string(), *rate))
                    .collect();
                (from.to_string(), targets)
            })
            .collect();
        RateTable::new(rates)
    }

    /// Returns a copy of this table with `overrides` merged over it.
    pub fn with_overrides(mut self, overrides: &RateMap) -> Self {
        for (from, targets) in overrides {
            let entry = self.rates.entry(from.clone()).or_default();
            for (to, rate) in targets {
                entry.insert(to.clone(), *rate);
            }
        }
        self
    }

    pub fn rates(&self) -> &RateMap {
        &self.rates
    }

    pub fn fetched_at(&self) -> Option<DateTime<Utc>> {
        self.fetched_at
    }

    pub fn is_empty(&self) -> bool {
        self.rates.values().all(BTreeMap::is_empty)
    }

    /// Builds a snapshot for every ordered pair of `currencies` from `source`.
    ///
    /// Pairs the source cannot price are left out; `on_pair` is called once
    /// per finished request so callers can drive a progress bar.
    #[instrument(name = "RateSnapshot", skip(source, on_pair))]
    pub async fn fetch(
        source: &(dyn CurrencyRateProvider + Send + Sync),
        currencies: &[String],
        on_pair: &(dyn Fn() + Send + Sync),
    ) -> Self {
        let pairs: Vec<(&String, &String)> = currencies
            .iter()
            .flat_map(|from| currencies.iter().map(move |to| (from, to)))
            .filter(|(from, to)| from != to)
            .collect();

        let futures = pairs.into_iter().map(|(from, to)| async move {
            let result = source.get_rate(from, to).await;
            on_pair();
            (from, to, result)
        });

        let mut rates = RateMap::new();
        for (from, to, result) in join_all(futures).await {
            match result {
                Ok(rate) => {
                    debug!(%from, %to, rate, "Fetched rate");
                    rates.entry(from.clone()).or_default().insert(to.clone(), rate);
                }
                Err(e) => warn!(%from, %to, error = %e, "Skipping currency pair"),
            }
        }

        RateTable {
            rates,
            fetched_at: Some(Utc::now()),
        }
    }
}

impl RateProvider for RateTable {
    fn rate(&self, from: &str, to: &str) -> Option<f64> {
        self.rates.get(from)?.get(to).copied()
    }

    fn currencies(&self) -> Vec<String> {
        self.rates.keys().cloned().collect()
    }
}
