use async_trait::async_trait;
use log::{debug, info};
use reqwest::Client;
use std::collections::HashMap;

use crate::error::{FetchError, FetchResult};
use crate::registry;
use crate::types::{Coin, LiveAssetsResponse, RatesResponse};

pub const DEFAULT_COINGECKO_API: &str = "https://api.coingecko.com/api/v3";
pub const DEFAULT_COINCAP_API: &str = "https://api.coincap.io/v2/assets";
pub const DEFAULT_RATES_API: &str = "https://open.er-api.com/v6/latest/USD";

/// The three upstream feeds the pipeline reads from.
#[async_trait]
pub trait MarketSource: Send + Sync {
    /// Spot prices in USD keyed by CoinGecko id.
    async fn live_prices(&self, ids: &[&str]) -> FetchResult<HashMap<String, f64>>;

    /// Metadata and 7d sparkline for `ids`, priced in `vs_currency`.
    async fn coin_markets(&self, vs_currency: &str, ids: &[&str]) -> FetchResult<Vec<Coin>>;

    /// Fiat rates per USD keyed by uppercase currency code.
    async fn fiat_rates(&self) -> FetchResult<HashMap<String, f64>>;
}

#[derive(Debug, Clone)]
pub struct Endpoints {
    pub coingecko: String,
    pub coincap: String,
    pub rates: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            coingecko: DEFAULT_COINGECKO_API.to_string(),
            coincap: DEFAULT_COINCAP_API.to_string(),
            rates: DEFAULT_RATES_API.to_string(),
        }
    }
}

pub struct HttpMarketSource {
    client: Client,
    endpoints: Endpoints,
    coingecko_api_key: Option<String>,
}

impl HttpMarketSource {
    pub fn new(client: Client, endpoints: Endpoints, coingecko_api_key: Option<String>) -> Self {
        Self {
            client,
            endpoints,
            coingecko_api_key,
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> FetchResult<T> {
        let response = request
            .header("Accept", "application/json")
            .header("Cache-Control", "no-cache")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status { status: status.as_u16() });
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

/// Keeps prices for known coins that are finite and positive, keyed by
/// CoinGecko id.
pub fn parse_live_prices(response: LiveAssetsResponse) -> HashMap<String, f64> {
    response
        .data
        .into_iter()
        .filter_map(|asset| {
            let internal = registry::from_live_id(&asset.id)?;
            let price = asset.price_usd.as_ref()?.as_f64()?;
            (price.is_finite() && price > 0.0).then(|| (internal.to_string(), price))
        })
        .collect()
}

#[async_trait]
impl MarketSource for HttpMarketSource {
    async fn live_prices(&self, ids: &[&str]) -> FetchResult<HashMap<String, f64>> {
        let live_ids: Vec<&str> = ids.iter().filter_map(|id| registry::to_live_id(id)).collect();
        let limit = live_ids.len().to_string();
        debug!("Requesting live prices for {}", live_ids.join(","));

        let request = self
            .client
            .get(&self.endpoints.coincap)
            .query(&[("ids", live_ids.join(",").as_str()), ("limit", limit.as_str())]);
        let response: LiveAssetsResponse = self.get_json(request).await?;

        let prices = parse_live_prices(response);
        info!("Received {} live prices", prices.len());
        Ok(prices)
    }

    async fn coin_markets(&self, vs_currency: &str, ids: &[&str]) -> FetchResult<Vec<Coin>> {
        let url = format!("{}/coins/markets", self.endpoints.coingecko.trim_end_matches('/'));
        let joined = ids.join(",");
        let mut query = vec![
            ("vs_currency", vs_currency),
            ("ids", joined.as_str()),
            ("order", "market_cap_desc"),
            ("sparkline", "true"),
        ];
        if let Some(key) = self.coingecko_api_key.as_deref() {
            query.push(("x_cg_demo_api_key", key));
        }

        let coins: Vec<Coin> = self.get_json(self.client.get(&url).query(&query)).await?;
        info!("Received metadata for {} coins", coins.len());
        Ok(coins)
    }

    async fn fiat_rates(&self) -> FetchResult<HashMap<String, f64>> {
        let response: RatesResponse = self.get_json(self.client.get(&self.endpoints.rates)).await?;
        if response.rates.is_empty() {
            return Err(FetchError::Decode("rates table missing or empty".to_string()));
        }
        Ok(response.rates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::CANONICAL_ORDER;
    use actix_web::{web, App, HttpRequest, HttpResponse, HttpServer};
    use serde_json::json;
    use std::sync::Mutex;

    type Recorded = web::Data<Mutex<Vec<(String, HashMap<String, String>)>>>;

    /// Stand-in for all three upstreams; remembers every path and decoded query.
    async fn upstream(req: HttpRequest, recorded: Recorded) -> HttpResponse {
        let query = web::Query::<HashMap<String, String>>::from_query(req.query_string())
            .unwrap()
            .into_inner();
        recorded.lock().unwrap().push((req.path().to_string(), query));

        match req.path() {
            "/v2/assets" => HttpResponse::Ok().json(json!({
                "data": [
                    {"id": "binance-coin", "priceUsd": "620.5"},
                    {"id": "bitcoin", "priceUsd": "97000"}
                ]
            })),
            "/api/v3/coins/markets" => HttpResponse::Ok().json(json!([])),
            _ => HttpResponse::TooManyRequests().finish(),
        }
    }

    async fn start_upstream() -> (String, Recorded) {
        let recorded: Recorded = web::Data::new(Mutex::new(Vec::new()));
        let app_recorded = recorded.clone();
        let server = HttpServer::new(move || {
            App::new()
                .app_data(app_recorded.clone())
                .default_service(web::to(upstream))
        })
        .workers(1)
        .bind(("127.0.0.1", 0))
        .unwrap();
        let addr = server.addrs()[0];
        actix_web::rt::spawn(server.run());
        (format!("http://{}", addr), recorded)
    }

    fn source_for(base: &str, coingecko_api_key: Option<&str>) -> HttpMarketSource {
        HttpMarketSource::new(
            Client::new(),
            Endpoints {
                coingecko: format!("{}/api/v3", base),
                coincap: format!("{}/v2/assets", base),
                rates: format!("{}/v6/latest/USD", base),
            },
            coingecko_api_key.map(str::to_string),
        )
    }

    fn last_query(recorded: &Recorded, path: &str) -> HashMap<String, String> {
        recorded
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(p, _)| p == path)
            .map(|(_, q)| q.clone())
            .unwrap()
    }

    #[test]
    fn test_parse_live_prices_maps_ids_back() {
        let response: LiveAssetsResponse = serde_json::from_str(
            r#"{"data": [
                {"id": "bitcoin", "priceUsd": "97000.5"},
                {"id": "binance-coin", "priceUsd": "620.1"}
            ]}"#,
        )
        .unwrap();

        let prices = parse_live_prices(response);
        assert_eq!(prices.get("bitcoin"), Some(&97000.5));
        assert_eq!(prices.get("binancecoin"), Some(&620.1));
        assert!(!prices.contains_key("binance-coin"));
    }

    #[test]
    fn test_parse_live_prices_drops_unusable_entries() {
        let response: LiveAssetsResponse = serde_json::from_str(
            r#"{"data": [
                {"id": "dogecoin", "priceUsd": "0.1"},
                {"id": "tron", "priceUsd": "0"},
                {"id": "ethereum", "priceUsd": "not-a-number"},
                {"id": "tether", "priceUsd": null}
            ]}"#,
        )
        .unwrap();

        assert!(parse_live_prices(response).is_empty());
    }

    #[test]
    fn test_default_endpoints() {
        let endpoints = Endpoints::default();
        assert_eq!(endpoints.coingecko, DEFAULT_COINGECKO_API);
        assert_eq!(endpoints.coincap, DEFAULT_COINCAP_API);
        assert_eq!(endpoints.rates, DEFAULT_RATES_API);
    }

    #[actix_web::test]
    async fn test_unreachable_host_is_transport_error() {
        let source = HttpMarketSource::new(
            Client::new(),
            Endpoints {
                coingecko: "http://127.0.0.1:9".to_string(),
                coincap: "http://127.0.0.1:9/v2/assets".to_string(),
                rates: "http://127.0.0.1:9/v6/latest/USD".to_string(),
            },
            None,
        );

        let err = source.fiat_rates().await.unwrap_err();
        assert!(matches!(err, FetchError::Transport(_)), "got {:?}", err);
    }

    #[actix_web::test]
    async fn test_live_prices_request_uses_coincap_ids() {
        let (base, recorded) = start_upstream().await;
        let source = source_for(&base, None);

        let prices = source.live_prices(&CANONICAL_ORDER).await.unwrap();
        assert_eq!(prices.get("binancecoin"), Some(&620.5));
        assert_eq!(prices.get("bitcoin"), Some(&97000.0));

        let query = last_query(&recorded, "/v2/assets");
        assert_eq!(query["ids"], "tether,bitcoin,tron,ethereum,binance-coin");
        assert_eq!(query["limit"], "5");
    }

    #[actix_web::test]
    async fn test_coin_markets_request_without_key() {
        let (base, recorded) = start_upstream().await;
        let source = source_for(&base, None);

        let coins = source.coin_markets("usd", &CANONICAL_ORDER).await.unwrap();
        assert!(coins.is_empty());

        let query = last_query(&recorded, "/api/v3/coins/markets");
        assert_eq!(query["vs_currency"], "usd");
        assert_eq!(query["ids"], "tether,bitcoin,tron,ethereum,binancecoin");
        assert_eq!(query["order"], "market_cap_desc");
        assert_eq!(query["sparkline"], "true");
        assert!(!query.contains_key("x_cg_demo_api_key"));
    }

    #[actix_web::test]
    async fn test_coin_markets_request_sends_demo_key() {
        let (base, recorded) = start_upstream().await;
        let source = source_for(&base, Some("demo-key"));

        source.coin_markets("usd", &CANONICAL_ORDER).await.unwrap();

        let query = last_query(&recorded, "/api/v3/coins/markets");
        assert_eq!(query.get("x_cg_demo_api_key").map(String::as_str), Some("demo-key"));
    }

    #[actix_web::test]
    async fn test_rate_limited_upstream_is_status_error() {
        let (base, _recorded) = start_upstream().await;
        let source = source_for(&base, None);

        let err = source.fiat_rates().await.unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 429 }), "got {:?}", err);
    }
}
