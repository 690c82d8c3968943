use serde::{Deserialize, Deserializer, Serialize};

// Shared data structures used by the server and any rendering client

/// One coin as served to clients. Field names follow the CoinGecko
/// `coins/markets` payload so upstream records deserialize directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coin {
    pub id: String,
    pub symbol: String,
    pub name: String,
    #[serde(default)]
    pub image: String,
    #[serde(default, deserialize_with = "nullable_f64")]
    pub current_price: f64,
    #[serde(default, deserialize_with = "nullable_f64")]
    pub market_cap: f64,
    #[serde(default, deserialize_with = "nullable_u32")]
    pub market_cap_rank: u32,
    #[serde(default, deserialize_with = "nullable_f64")]
    pub total_volume: f64,
    #[serde(default, deserialize_with = "nullable_f64")]
    pub high_24h: f64,
    #[serde(default, deserialize_with = "nullable_f64")]
    pub low_24h: f64,
    #[serde(default, deserialize_with = "nullable_f64")]
    pub price_change_percentage_24h: f64,
    #[serde(default)]
    pub last_updated: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sparkline_in_7d: Option<Sparkline>,
}

impl Coin {
    /// Hourly history, oldest first. Empty when the record carries none.
    pub fn history(&self) -> &[f64] {
        self.sparkline_in_7d
            .as_ref()
            .map(|s| s.price.as_slice())
            .unwrap_or(&[])
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sparkline {
    #[serde(default)]
    pub price: Vec<f64>,
}

/// A fiat currency the calculator converts into.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrencyOption {
    pub code: String,
    pub name: String,
    pub symbol: String,
    /// Units of this currency per 1 USD.
    #[serde(rename = "rateToUSD")]
    pub rate_to_usd: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
}

impl Trend {
    /// Direction of a reported percentage change. Zero counts as up.
    pub fn from_percent_change(pct: f64) -> Self {
        if pct >= 0.0 {
            Trend::Up
        } else {
            Trend::Down
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartGeometry {
    /// History with the live price appended.
    pub series: Vec<f64>,
    pub points: Vec<PricePoint>,
    pub min: f64,
    pub max: f64,
    /// Bounds after the edge buffer is applied.
    pub chart_min: f64,
    pub chart_max: f64,
    pub trend: Trend,
    pub last_y: f64,
    pub line_path: String,
    pub area_path: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeQuote {
    pub exchange: String,
    pub price: f64,
}

fn nullable_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(0.0))
}

fn nullable_u32<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<u32>::deserialize(deserializer)?.unwrap_or(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_coin() -> Coin {
        Coin {
            id: "bitcoin".to_string(),
            symbol: "btc".to_string(),
            name: "Bitcoin".to_string(),
            image: "https://assets.coingecko.com/coins/images/1/large/bitcoin.png".to_string(),
            current_price: 96500.0,
            market_cap: 1900000000000.0,
            market_cap_rank: 1,
            total_volume: 30000000000.0,
            high_24h: 98000.0,
            low_24h: 95000.0,
            price_change_percentage_24h: -1.2,
            last_updated: "2024-01-01T00:00:00.000Z".to_string(),
            sparkline_in_7d: Some(Sparkline { price: vec![95000.0, 96000.0] }),
        }
    }

    #[test]
    fn test_coin_deserialization_from_markets_payload() {
        let json = r#"{
            "id": "bitcoin",
            "symbol": "btc",
            "name": "Bitcoin",
            "image": "https://example.com/btc.png",
            "current_price": 96500.0,
            "market_cap": 1900000000000,
            "market_cap_rank": 1,
            "fully_diluted_valuation": 2000000000000,
            "total_volume": 30000000000,
            "high_24h": 98000,
            "low_24h": 95000,
            "price_change_percentage_24h": -1.2,
            "last_updated": "2024-01-01T00:00:00.000Z",
            "sparkline_in_7d": { "price": [95000.0, 95500.5, 96000.0] }
        }"#;

        let coin: Coin = serde_json::from_str(json).unwrap();
        assert_eq!(coin.id, "bitcoin");
        assert_eq!(coin.current_price, 96500.0);
        assert_eq!(coin.market_cap_rank, 1);
        assert_eq!(coin.history(), &[95000.0, 95500.5, 96000.0]);
    }

    #[test]
    fn test_coin_null_numbers_decode_as_zero() {
        let json = r#"{
            "id": "tron",
            "symbol": "trx",
            "name": "TRON",
            "current_price": 0.2,
            "high_24h": null,
            "low_24h": null,
            "market_cap_rank": null,
            "price_change_percentage_24h": null
        }"#;

        let coin: Coin = serde_json::from_str(json).unwrap();
        assert_eq!(coin.high_24h, 0.0);
        assert_eq!(coin.low_24h, 0.0);
        assert_eq!(coin.market_cap_rank, 0);
        assert!(coin.image.is_empty());
        assert!(coin.history().is_empty());
    }

    #[test]
    fn test_coin_without_sparkline_skips_field() {
        let mut coin = create_test_coin();
        coin.sparkline_in_7d = None;
        let json = serde_json::to_string(&coin).unwrap();
        assert!(!json.contains("sparkline_in_7d"));
        assert!(json.contains("\"current_price\":96500.0"));
    }

    #[test]
    fn test_currency_option_uses_rate_to_usd_key() {
        let inr = CurrencyOption {
            code: "inr".to_string(),
            name: "Indian Rupee".to_string(),
            symbol: "₹".to_string(),
            rate_to_usd: 84.5,
        };
        let json = serde_json::to_string(&inr).unwrap();
        assert!(json.contains("\"rateToUSD\":84.5"));

        let back: CurrencyOption = serde_json::from_str(&json).unwrap();
        assert_eq!(back, inr);
    }

    #[test]
    fn test_trend_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Trend::Up).unwrap(), "\"up\"");
        assert_eq!(serde_json::to_string(&Trend::Down).unwrap(), "\"down\"");
    }

    #[test]
    fn test_trend_from_percent_change() {
        assert_eq!(Trend::from_percent_change(2.5), Trend::Up);
        assert_eq!(Trend::from_percent_change(0.0), Trend::Up);
        assert_eq!(Trend::from_percent_change(-0.01), Trend::Down);
    }
}
