//! Wallet valuation results.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::config::SATOSHI_PER_BTC;

/// Value of one address
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct WalletValue {
    #[schema(example = "bc1qar0srrr7xfkvy5l643lydnw9re59gtzzwf5mdq")]
    pub address: String,
    pub satoshi: u64,
    pub btc: f64,
    /// Fiat value, rounded to cents
    pub value: f64,
}

/// Value of a set of addresses at one price
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Portfolio {
    #[schema(example = "eur")]
    pub currency: String,
    /// Price of one bitcoin
    pub price: f64,
    pub wallets: Vec<WalletValue>,
    pub total_satoshi: u64,
    pub total_btc: f64,
    pub total_value: f64,
}

impl Portfolio {
    pub fn new(currency: impl Into<String>, price: f64, balances: Vec<(String, u64)>) -> Self {
        let wallets: Vec<WalletValue> = balances
            .into_iter()
            .map(|(address, satoshi)| WalletValue {
                address,
                satoshi,
                btc: to_btc(satoshi),
                value: round_cents(to_btc(satoshi) * price),
            })
            .collect();

        let total_satoshi = wallets.iter().map(|w| w.satoshi).sum();

        Self {
            currency: currency.into(),
            price,
            wallets,
            total_satoshi,
            total_btc: to_btc(total_satoshi),
            total_value: round_cents(to_btc(total_satoshi) * price),
        }
    }
}

fn to_btc(satoshi: u64) -> f64 {
    satoshi as f64 / SATOSHI_PER_BTC
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
