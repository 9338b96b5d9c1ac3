//! Read-only clients for the public price index and blockchain explorer.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::config::HTTP_TIMEOUT_SECONDS;
use crate::errors::{AppError, AppResult};

/// Current Bitcoin price in a fiat currency
#[cfg_attr(test, automock)]
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// `currency` is a lowercase ISO code such as `eur`
    async fn btc_price(&self, currency: &str) -> AppResult<f64>;
}

/// Confirmed on-chain balance of an address
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ExplorerClient: Send + Sync {
    /// Balance in satoshi
    async fn address_balance(&self, address: &str) -> AppResult<u64>;
}

fn http_client() -> AppResult<Client> {
    Client::builder()
        .timeout(Duration::from_secs(HTTP_TIMEOUT_SECONDS))
        .user_agent(concat!("bitbeheer/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| AppError::internal(format!("Failed to build HTTP client: {}", e)))
}

// =============================================================================
// Price index (CoinGecko `simple/price`)
// =============================================================================

/// `{"bitcoin": {"eur": 61234.5}}`
type SimplePriceResponse = HashMap<String, HashMap<String, f64>>;

pub struct HttpPriceSource {
    client: Client,
    base_url: String,
}

impl HttpPriceSource {
    pub fn new(base_url: impl Into<String>) -> AppResult<Self> {
        Ok(Self {
            client: http_client()?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

fn price_from_response(response: &SimplePriceResponse, currency: &str) -> AppResult<f64> {
    response
        .get("bitcoin")
        .and_then(|prices| prices.get(currency))
        .copied()
        .ok_or_else(|| AppError::upstream(format!("No bitcoin price for currency '{}'", currency)))
}

#[async_trait]
impl PriceSource for HttpPriceSource {
    async fn btc_price(&self, currency: &str) -> AppResult<f64> {
        let url = format!("{}/simple/price", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[("ids", "bitcoin"), ("vs_currencies", currency)])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::upstream(format!(
                "Price API returned {} - {}",
                status, error_text
            )));
        }

        let body: SimplePriceResponse = response
            .json()
            .await
            .map_err(|e| AppError::upstream(format!("Failed to parse price response: {}", e)))?;

        let price = price_from_response(&body, currency)?;
        tracing::debug!(currency, price, "Fetched bitcoin price");
        Ok(price)
    }
}

// =============================================================================
// Explorer (Esplora `address` endpoint)
// =============================================================================

#[derive(Debug, Deserialize)]
struct ChainStats {
    funded_txo_sum: u64,
    spent_txo_sum: u64,
}

#[derive(Debug, Deserialize)]
struct AddressResponse {
    chain_stats: ChainStats,
}

impl AddressResponse {
    fn balance(&self) -> u64 {
        self.chain_stats
            .funded_txo_sum
            .saturating_sub(self.chain_stats.spent_txo_sum)
    }
}

pub struct HttpExplorerClient {
    client: Client,
    base_url: String,
}

impl HttpExplorerClient {
    pub fn new(base_url: impl Into<String>) -> AppResult<Self> {
        Ok(Self {
            client: http_client()?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl ExplorerClient for HttpExplorerClient {
    async fn address_balance(&self, address: &str) -> AppResult<u64> {
        let url = format!("{}/address/{}", self.base_url, address);

        let response = self.client.get(&url).send().await?;

        match response.status() {
            status if status.is_success() => {}
            StatusCode::BAD_REQUEST | StatusCode::NOT_FOUND => {
                return Err(AppError::bad_request(format!(
                    "Unknown or invalid address: {}",
                    address
                )));
            }
            status => {
                let error_text = response.text().await.unwrap_or_default();
                return Err(AppError::upstream(format!(
                    "Explorer returned {} - {}",
                    status, error_text
                )));
            }
        }

        let body: AddressResponse = response.json().await.map_err(|e| {
            AppError::upstream(format!("Failed to parse explorer response: {}", e))
        })?;

        Ok(body.balance())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_from_simple_price_shape() {
        let body: SimplePriceResponse =
            serde_json::from_str(r#"{"bitcoin":{"eur":61234.5,"usd":66000}}"#).unwrap();
        assert_eq!(price_from_response(&body, "eur").unwrap(), 61234.5);
        assert_eq!(price_from_response(&body, "usd").unwrap(), 66000.0);
    }

    #[test]
    fn test_missing_currency_is_upstream_error() {
        let body: SimplePriceResponse = serde_json::from_str(r#"{"bitcoin":{}}"#).unwrap();
        assert!(matches!(
            price_from_response(&body, "eur"),
            Err(AppError::Upstream(_))
        ));
    }

    #[test]
    fn test_balance_is_funded_minus_spent() {
        let body: AddressResponse = serde_json::from_str(
            r#"{
                "address": "bc1qexample",
                "chain_stats": {"funded_txo_count": 3, "funded_txo_sum": 150000,
                                "spent_txo_count": 1, "spent_txo_sum": 50000, "tx_count": 4},
                "mempool_stats": {"funded_txo_count": 0, "funded_txo_sum": 0,
                                  "spent_txo_count": 0, "spent_txo_sum": 0, "tx_count": 0}
            }"#,
        )
        .unwrap();
        assert_eq!(body.balance(), 100000);
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let source = HttpPriceSource::new("https://api.example.com/v3/").unwrap();
        assert_eq!(source.base_url, "https://api.example.com/v3");
    }
}
