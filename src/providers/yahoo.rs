use anyhow::{Result, anyhow};
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::core::cache::Cache;
use crate::core::currency::CurrencyRateProvider;
use crate::providers::util::with_retry;

const RETRIES: usize = 2;
const RETRY_DELAY_MS: u64 = 250;

/// Prices currency pairs from the Yahoo Finance chart API.
pub struct YahooCurrencyProvider {
    base_url: String,
    client: reqwest::Client,
    cache: Arc<Cache<String, f64>>,
}

impl YahooCurrencyProvider {
    pub fn new(base_url: &str, cache: Arc<Cache<String, f64>>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("uconv/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(YahooCurrencyProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            cache,
        })
    }
}

#[derive(Debug, Deserialize)]
struct YahooCurrencyResponse {
    chart: CurrencyChartResult,
}

#[derive(Debug, Deserialize)]
struct CurrencyChartResult {
    result: Vec<CurrencyChartItem>,
}

#[derive(Debug, Deserialize)]
struct CurrencyChartItem {
    meta: CurrencyChartMeta,
}

#[derive(Debug, Deserialize)]
struct CurrencyChartMeta {
    #[serde(alias = "regularMarketPrice")]
    regular_market_price: f64,
}

#[async_trait]
impl CurrencyRateProvider for YahooCurrencyProvider {
    #[instrument(name = "YahooRateFetch", skip(self))]
    async fn get_rate(&self, from: &str, to: &str) -> Result<f64> {
        let symbol = format!("{from}{to}=X");
        if let Some(cached) = self.cache.get(&symbol).await {
            return Ok(cached);
        }

        let url = format!("{}/v8/finance/chart/{}", self.base_url, symbol);
        debug!("Requesting currency rate from {}", url);

        let response = with_retry(|| self.client.get(&url).send(), RETRIES, RETRY_DELAY_MS)
            .await
            .map_err(|e| anyhow!("Request error: {} for currency pair: {}", e, symbol))?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "HTTP error: {} for currency pair: {}",
                response.status(),
                symbol
            ));
        }

        let text = response.text().await?;
        let data: YahooCurrencyResponse = serde_json::from_str(&text)
            .map_err(|e| anyhow!("Failed to parse JSON response for {}: {}", symbol, e))?;

        let item = data
            .chart
            .result
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("No rate data found for currency pair: {}", symbol))?;

        let rate = item.meta.regular_market_price;
        if !rate.is_finite() || rate <= 0.0 {
            return Err(anyhow!("Invalid rate {} for currency pair: {}", rate, symbol));
        }

        self.cache.put(symbol, rate).await;
        Ok(rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const RATE_RESPONSE: &str = r#"{
        "chart": {
            "result": [
                {
                    "meta": {
                        "regularMarketPrice": 1.2345
                    }
                }
            ]
        }
    }"#;

    async fn mount(server: &MockServer, endpoint: &str, response: ResponseTemplate) {
        Mock::given(method("GET"))
            .and(path(endpoint))
            .respond_with(response)
            .mount(server)
            .await;
    }

    fn provider(server: &MockServer) -> YahooCurrencyProvider {
        YahooCurrencyProvider::new(&server.uri(), Arc::new(Cache::new()))
            .expect("Failed to build provider")
    }

    #[tokio::test]
    async fn test_successful_rate_fetch() {
        let mock_server = MockServer::start().await;
        mount(
            &mock_server,
            "/v8/finance/chart/USDEUR=X",
            ResponseTemplate::new(200).set_body_string(RATE_RESPONSE),
        )
        .await;

        let rate = provider(&mock_server)
            .get_rate("USD", "EUR")
            .await
            .expect("Failed to get rate");
        assert_eq!(rate, 1.2345);
    }

    #[tokio::test]
    async fn test_rate_is_cached() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v8/finance/chart/GBPINR=X"))
            .respond_with(ResponseTemplate::new(200).set_body_string(RATE_RESPONSE))
            .expect(1)
            .mount(&mock_server)
            .await;

        let provider = provider(&mock_server);
        assert_eq!(provider.get_rate("GBP", "INR").await.unwrap(), 1.2345);
        assert_eq!(provider.get_rate("GBP", "INR").await.unwrap(), 1.2345);
    }

    #[tokio::test]
    async fn test_no_currency_rate_found() {
        let mock_server = MockServer::start().await;
        mount(
            &mock_server,
            "/v8/finance/chart/USDEUR=X",
            ResponseTemplate::new(200).set_body_string(r#"{"chart": {"result": []}}"#),
        )
        .await;

        let result = provider(&mock_server).get_rate("USD", "EUR").await;
        assert_eq!(
            result.unwrap_err().to_string(),
            "No rate data found for currency pair: USDEUR=X"
        );
    }

    #[tokio::test]
    async fn test_yahoo_currency_api_error_response() {
        let mock_server = MockServer::start().await;
        mount(
            &mock_server,
            "/v8/finance/chart/USDEUR=X",
            ResponseTemplate::new(500),
        )
        .await;

        let result = provider(&mock_server).get_rate("USD", "EUR").await;
        assert_eq!(
            result.unwrap_err().to_string(),
            "HTTP error: 500 Internal Server Error for currency pair: USDEUR=X"
        );
    }

    #[tokio::test]
    async fn test_yahoo_currency_api_malformed_response() {
        let mock_server = MockServer::start().await;
        mount(
            &mock_server,
            "/v8/finance/chart/USDEUR=X",
            ResponseTemplate::new(200).set_body_string(r#"{"chart": {"results": []}}"#),
        )
        .await;

        let result = provider(&mock_server).get_rate("USD", "EUR").await;
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Failed to parse JSON response for USDEUR=X")
        );
    }

    #[tokio::test]
    async fn test_non_positive_rate_is_rejected() {
        let mock_server = MockServer::start().await;
        mount(
            &mock_server,
            "/v8/finance/chart/USDPKR=X",
            ResponseTemplate::new(200).set_body_string(
                r#"{"chart": {"result": [{"meta": {"regularMarketPrice": 0.0}}]}}"#,
            ),
        )
        .await;

        let result = provider(&mock_server).get_rate("USD", "PKR").await;
        assert!(result.unwrap_err().to_string().starts_with("Invalid rate"));
    }
}
