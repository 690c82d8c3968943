use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::SystemTime;

use crate::assistant::Assistant;
use crate::sources::MarketSource;

// Re-export shared types for convenience
pub use shared::{Coin, CurrencyOption};

/// CoinCap `/v2/assets` response
#[derive(Debug, Clone, Deserialize)]
pub struct LiveAssetsResponse {
    pub data: Vec<LiveAsset>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LiveAsset {
    pub id: String,
    #[serde(rename = "priceUsd")]
    pub price_usd: Option<NumberOrString>,
}

/// CoinCap sends prices as decimal strings; accept plain numbers too.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum NumberOrString {
    Number(f64),
    Text(String),
}

impl NumberOrString {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            NumberOrString::Number(n) => Some(*n),
            NumberOrString::Text(s) => s.trim().parse().ok(),
        }
    }
}

/// open.er-api `/v6/latest/USD` response
#[derive(Debug, Clone, Deserialize)]
pub struct RatesResponse {
    #[serde(default)]
    pub rates: HashMap<String, f64>,
}

/// The latest reconciled data. Replaced as a whole on every refresh.
#[derive(Debug, Clone)]
pub struct MarketSnapshot {
    pub coins: Vec<Coin>,
    pub currencies: Vec<CurrencyOption>,
    pub fetched_at: SystemTime,
}

pub struct AppState {
    pub snapshot: Arc<Mutex<Option<MarketSnapshot>>>,
    pub source: Arc<dyn MarketSource>,
    pub assistant: Assistant,
    pub update_interval_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoinsResponse {
    pub data: Vec<Coin>,
    pub currencies_count: usize,
    pub last_updated: String,
    /// True once the snapshot is older than two refresh intervals.
    pub stale: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionResponse {
    pub coin: String,
    pub currency: String,
    pub currency_symbol: String,
    pub amount: f64,
    pub result: f64,
    /// Price of one coin in the selected currency
    pub unit_rate: f64,
}

#[derive(Deserialize)]
pub struct ConvertQuery {
    #[serde(default)]
    pub coin: String,
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub amount: String,
}

#[derive(Deserialize)]
pub struct SelectionQuery {
    #[serde(default)]
    pub coin: String,
    #[serde(default)]
    pub currency: String,
}

#[derive(Deserialize)]
pub struct InsightQuery {
    #[serde(default)]
    pub currency: String,
}

#[derive(Debug, Deserialize)]
pub struct AskRequest {
    pub question: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AskResponse {
    pub answer: String,
}
