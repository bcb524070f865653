//! CoinGecko `simple/price` client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tipjar_core::config::PriceFeedConfig;
use tipjar_core::price::PriceFeed;
use tipjar_core::{Result, TipjarError};

use crate::network_error;

/// Reads one exchange rate per call from `{endpoint}/simple/price`.
#[derive(Clone)]
pub struct CoinGeckoPriceFeed {
    client: Client,
    endpoint: String,
    asset_id: String,
    vs_currency: String,
    timeout: Duration,
}

impl CoinGeckoPriceFeed {
    pub fn new(config: &PriceFeedConfig) -> Self {
        Self {
            client: Client::new(),
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            asset_id: config.asset_id.clone(),
            vs_currency: config.vs_currency.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    fn url(&self) -> String {
        format!("{}/simple/price", self.endpoint)
    }
}

#[async_trait]
impl PriceFeed for CoinGeckoPriceFeed {
    async fn fetch_rate(&self) -> Result<f64> {
        let response = self
            .client
            .get(self.url())
            .query(&[
                ("ids", self.asset_id.as_str()),
                ("vs_currencies", self.vs_currency.as_str()),
            ])
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| network_error("price request failed", e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(TipjarError::http_status(
                status.as_u16(),
                format!("price feed returned {}: {}", status, body),
            ));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| network_error("invalid price response", e))?;
        let rate = parse_rate(&body, &self.asset_id, &self.vs_currency)?;
        tracing::debug!("{}/{} rate: {}", self.asset_id, self.vs_currency, rate);
        Ok(rate)
    }
}

/// Extracts `body[asset][currency]` as a positive finite number.
pub fn parse_rate(body: &Value, asset_id: &str, vs_currency: &str) -> Result<f64> {
    body.get(asset_id)
        .and_then(|prices| prices.get(vs_currency))
        .and_then(Value::as_f64)
        .filter(|rate| rate.is_finite() && *rate > 0.0)
        .ok_or_else(|| {
            TipjarError::network(format!(
                "price response lacks {asset_id}.{vs_currency}: {body}"
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_rate() {
        let body = json!({"ethereum": {"usd": 2456.78}});
        assert_eq!(parse_rate(&body, "ethereum", "usd").unwrap(), 2456.78);

        let integer = json!({"ethereum": {"usd": 3000}});
        assert_eq!(parse_rate(&integer, "ethereum", "usd").unwrap(), 3000.0);
    }

    #[test]
    fn test_parse_rate_rejects_missing_or_invalid() {
        let body = json!({"ethereum": {"eur": 2000.0}});
        assert!(parse_rate(&body, "ethereum", "usd").unwrap_err().is_network());
        assert!(parse_rate(&json!({}), "ethereum", "usd").is_err());
        assert!(parse_rate(&json!({"ethereum": {"usd": 0}}), "ethereum", "usd").is_err());
        assert!(parse_rate(&json!({"ethereum": {"usd": "1"}}), "ethereum", "usd").is_err());
    }

    #[test]
    fn test_url_from_config() {
        let mut config = PriceFeedConfig::default();
        config.endpoint = "https://example.test/api/v3/".into();
        assert_eq!(
            CoinGeckoPriceFeed::new(&config).url(),
            "https://example.test/api/v3/simple/price"
        );
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_network_error() {
        let mut config = PriceFeedConfig::default();
        config.endpoint = "http://127.0.0.1:9".into();
        config.timeout_secs = 2;
        let err = CoinGeckoPriceFeed::new(&config).fetch_rate().await.unwrap_err();
        assert!(err.is_network());
    }
}
