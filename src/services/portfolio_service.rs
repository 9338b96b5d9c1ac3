//! Portfolio service - values Bitcoin addresses at the current price.

use std::sync::Arc;

use async_trait::async_trait;
use futures::FutureExt;
use once_cell::sync::Lazy;
use regex::Regex;

use super::parallel;
use crate::config::{DEFAULT_CURRENCY, EXPLORER_CONCURRENCY, MAX_PORTFOLIO_ADDRESSES};
use crate::domain::Portfolio;
use crate::errors::{AppError, AppResult};
use crate::infra::{ExplorerClient, PriceSource};

static ADDRESS_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9]{14,90}$").expect("valid address pattern"));

static CURRENCY_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z]{3,5}$").expect("valid currency pattern"));

#[async_trait]
pub trait PortfolioService: Send + Sync {
    /// Value `addresses` in `currency` (defaults to euro).
    async fn value(&self, addresses: Vec<String>, currency: Option<String>) -> AppResult<Portfolio>;
}

pub struct PortfolioValuer {
    prices: Arc<dyn PriceSource>,
    explorer: Arc<dyn ExplorerClient>,
}

impl PortfolioValuer {
    pub fn new(prices: Arc<dyn PriceSource>, explorer: Arc<dyn ExplorerClient>) -> Self {
        Self { prices, explorer }
    }
}

/// Trimmed, de-duplicated addresses in their original order.
fn clean_addresses(addresses: Vec<String>) -> AppResult<Vec<String>> {
    let mut cleaned: Vec<String> = Vec::new();
    for address in addresses {
        let address = address.trim();
        if address.is_empty() || cleaned.iter().any(|a| a == address) {
            continue;
        }
        if !ADDRESS_PATTERN.is_match(address) {
            return Err(AppError::bad_request(format!("Invalid address: {}", address)));
        }
        cleaned.push(address.to_string());
    }

    if cleaned.is_empty() {
        return Err(AppError::bad_request("At least one address is required"));
    }
    if cleaned.len() > MAX_PORTFOLIO_ADDRESSES {
        return Err(AppError::bad_request(format!(
            "At most {} addresses per request",
            MAX_PORTFOLIO_ADDRESSES
        )));
    }
    Ok(cleaned)
}

fn clean_currency(currency: Option<String>) -> AppResult<String> {
    let currency = currency
        .map(|c| c.trim().to_lowercase())
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| DEFAULT_CURRENCY.to_string());

    if CURRENCY_PATTERN.is_match(&currency) {
        Ok(currency)
    } else {
        Err(AppError::bad_request(format!("Invalid currency: {}", currency)))
    }
}

#[async_trait]
impl PortfolioService for PortfolioValuer {
    async fn value(&self, addresses: Vec<String>, currency: Option<String>) -> AppResult<Portfolio> {
        let addresses = clean_addresses(addresses)?;
        let currency = clean_currency(currency)?;

        let balances = addresses.iter().map(|address| {
            let explorer = self.explorer.clone();
            let address = address.clone();
            async move {
                let satoshi = explorer.address_balance(&address).await?;
                Ok::<_, AppError>((address, satoshi))
            }
        });

        let (price, balances) = parallel::join2(
            self.prices.btc_price(&currency),
            parallel::join_all_limited(balances, EXPLORER_CONCURRENCY).boxed(),
        )
        .await?;

        tracing::debug!(wallets = balances.len(), %currency, "Portfolio valued");
        Ok(Portfolio::new(currency, price, balances))
    }
}
