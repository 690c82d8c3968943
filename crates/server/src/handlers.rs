use actix_web::{get, post, web, HttpResponse, Responder};
use chrono::{DateTime, SecondsFormat, Utc};
use log::{info, warn};
use std::time::{Duration, SystemTime};

use crate::data::refresh_market_data;
use crate::types::{
    AppState, AskRequest, AskResponse, CoinsResponse, ConversionResponse, ConvertQuery, InsightQuery,
    MarketSnapshot, SelectionQuery,
};

fn current_snapshot(data: &AppState) -> Option<MarketSnapshot> {
    match data.snapshot.lock() {
        Ok(guard) => guard.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    }
}

fn not_ready() -> HttpResponse {
    warn!("No market snapshot available yet");
    HttpResponse::ServiceUnavailable().json(serde_json::json!({
        "error": "Market data not loaded yet"
    }))
}

fn format_time(time: SystemTime) -> String {
    DateTime::<Utc>::from(time).to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn coins_response(snapshot: MarketSnapshot, update_interval_seconds: u64) -> CoinsResponse {
    let age = snapshot.fetched_at.elapsed().unwrap_or(Duration::from_secs(0));
    CoinsResponse {
        last_updated: format_time(snapshot.fetched_at),
        stale: age > Duration::from_secs(update_interval_seconds.saturating_mul(2)),
        currencies_count: snapshot.currencies.len(),
        data: snapshot.coins,
    }
}

#[get("/health")]
pub async fn health_check() -> impl Responder {
    web::Json(serde_json::json!({
        "status": "ok",
        "timestamp": SystemTime::now()
    }))
}

#[get("/api/coins")]
pub async fn get_coins(data: web::Data<AppState>) -> HttpResponse {
    match current_snapshot(&data) {
        Some(snapshot) => HttpResponse::Ok().json(coins_response(snapshot, data.update_interval_seconds)),
        None => not_ready(),
    }
}

#[get("/api/currencies")]
pub async fn get_currencies(data: web::Data<AppState>) -> HttpResponse {
    match current_snapshot(&data) {
        Some(snapshot) => HttpResponse::Ok().json(snapshot.currencies),
        None => not_ready(),
    }
}

#[get("/api/convert")]
pub async fn convert(data: web::Data<AppState>, query: web::Query<ConvertQuery>) -> HttpResponse {
    let Some(snapshot) = current_snapshot(&data) else {
        return not_ready();
    };

    let (Some(coin), Some(currency)) = (
        shared::select_coin(&snapshot.coins, &query.coin),
        shared::select_currency(&snapshot.currencies, &query.currency),
    ) else {
        return not_ready();
    };

    HttpResponse::Ok().json(ConversionResponse {
        coin: coin.id.clone(),
        currency: currency.code.clone(),
        currency_symbol: currency.symbol.clone(),
        amount: shared::parse_amount(&query.amount),
        result: shared::convert(coin, currency, &query.amount),
        unit_rate: shared::unit_rate(coin, currency),
    })
}

#[get("/api/chart/{coin}")]
pub async fn get_chart(path: web::Path<String>, data: web::Data<AppState>) -> HttpResponse {
    let Some(snapshot) = current_snapshot(&data) else {
        return not_ready();
    };

    match shared::select_coin(&snapshot.coins, &path.into_inner()) {
        Some(coin) => HttpResponse::Ok().json(shared::chart_geometry(coin.history(), coin.current_price)),
        None => not_ready(),
    }
}

#[get("/api/exchanges")]
pub async fn get_exchanges(data: web::Data<AppState>, query: web::Query<SelectionQuery>) -> HttpResponse {
    let Some(snapshot) = current_snapshot(&data) else {
        return not_ready();
    };

    match (
        shared::select_coin(&snapshot.coins, &query.coin),
        shared::select_currency(&snapshot.currencies, &query.currency),
    ) {
        (Some(coin), Some(currency)) => {
            HttpResponse::Ok().json(shared::exchange_spread(shared::unit_rate(coin, currency)))
        }
        _ => not_ready(),
    }
}

#[post("/api/refresh")]
pub async fn refresh(data: web::Data<AppState>) -> impl Responder {
    info!("Manual refresh requested");
    let snapshot = refresh_market_data(&data).await;
    web::Json(coins_response(snapshot, data.update_interval_seconds))
}

#[get("/api/insight/{coin}")]
pub async fn get_insight(
    path: web::Path<String>,
    query: web::Query<InsightQuery>,
    data: web::Data<AppState>,
) -> HttpResponse {
    let Some(snapshot) = current_snapshot(&data) else {
        return not_ready();
    };

    let (Some(coin), Some(currency)) = (
        shared::select_coin(&snapshot.coins, &path.into_inner()),
        shared::select_currency(&snapshot.currencies, &query.currency),
    ) else {
        return not_ready();
    };

    let price = shared::unit_rate(coin, currency);
    let insight = data
        .assistant
        .crypto_insight(&coin.name, price, &currency.code.to_uppercase())
        .await;
    HttpResponse::Ok().json(insight)
}

#[post("/api/ask")]
pub async fn ask(data: web::Data<AppState>, body: web::Json<AskRequest>) -> HttpResponse {
    let question = body.question.trim();
    if question.is_empty() {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": "question must not be empty"
        }));
    }

    let answer = data.assistant.ask(question).await;
    HttpResponse::Ok().json(AskResponse { answer })
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(health_check)
        .service(get_coins)
        .service(get_currencies)
        .service(convert)
        .service(get_chart)
        .service(get_exchanges)
        .service(refresh)
        .service(get_insight)
        .service(ask);
}
