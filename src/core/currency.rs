//! Live exchange-rate sources

use anyhow::Result;
use async_trait::async_trait;

/// A remote source that can price one currency pair at a time.
///
/// Sources are only used to build a [`crate::core::rates::RateTable`]
/// snapshot; conversions themselves never wait on the network.
#[async_trait]
pub trait CurrencyRateProvider: Send + Sync {
    async fn get_rate(&self, from: &str, to: &str) -> Result<f64>;
}
