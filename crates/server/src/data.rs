use actix_web::web;
use chrono::{SecondsFormat, Utc};
use log::{error, info, warn};
use std::collections::{HashMap, HashSet};
use std::time::{Duration, SystemTime};
use tokio::time;

use crate::config::MAX_REFRESH_INTERVAL_SECONDS;
use crate::error::FetchError;
use crate::fallback::{default_currencies, fallback_coins};
use crate::registry::{self, CANONICAL_ORDER};
use crate::sources::MarketSource;
use crate::types::{AppState, Coin, CurrencyOption, MarketSnapshot};

pub fn timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// CoinCap prices and currency rates are USD-based, so metadata prices must be too.
const BASE_CURRENCY: &str = "usd";

fn log_fetch_failure(what: &str, err: &FetchError) {
    match err {
        FetchError::Transport(_) => error!("Failed to fetch {}: {}", what, err),
        _ => warn!("Failed to fetch {}: {}", what, err),
    }
}

/// Fetches the five canonical coins with the freshest price available.
///
/// Live prices and metadata are requested together. Metadata failures fall
/// back to static records; live price failures just skip the overwrite. The
/// result always holds every canonical coin exactly once, in canonical order.
pub async fn get_top_coins(source: &dyn MarketSource) -> Vec<Coin> {
    let ids = CANONICAL_ORDER;
    let (live, markets) = tokio::join!(
        source.live_prices(&ids),
        source.coin_markets(BASE_CURRENCY, &ids)
    );

    let live_prices = match live {
        Ok(prices) => Some(prices),
        Err(e) => {
            log_fetch_failure("live prices", &e);
            None
        }
    };

    let fallback = fallback_coins(&mut rand::thread_rng());
    let base = match markets {
        Ok(coins) => complete_with_fallback(coins, &fallback),
        Err(e) => {
            log_fetch_failure("coin metadata, using fallback records", &e);
            fallback
        }
    };

    let mut coins = match live_prices {
        Some(prices) => apply_live_prices(base, &prices),
        None => base,
    };
    sort_canonical(&mut coins);
    coins
}

/// Drops unknown and duplicate records and fills any missing canonical coin
/// from `fallback`.
pub fn complete_with_fallback(coins: Vec<Coin>, fallback: &[Coin]) -> Vec<Coin> {
    let mut seen = HashSet::new();
    let mut completed: Vec<Coin> = coins
        .into_iter()
        .filter(|c| registry::is_known(&c.id) && seen.insert(c.id.clone()))
        .collect();

    for coin in fallback {
        if !seen.contains(&coin.id) {
            warn!("Metadata missing {}, using fallback record", coin.id);
            completed.push(coin.clone());
        }
    }
    completed
}

/// Overwrites `current_price` (and `last_updated`) wherever a live price exists.
pub fn apply_live_prices(coins: Vec<Coin>, live_prices: &HashMap<String, f64>) -> Vec<Coin> {
    let now = timestamp_now();
    coins
        .into_iter()
        .map(|coin| match live_prices.get(&coin.id) {
            Some(&price) => Coin {
                current_price: price,
                last_updated: now.clone(),
                ..coin
            },
            None => coin,
        })
        .collect()
}

pub fn sort_canonical(coins: &mut [Coin]) {
    coins.sort_by_key(|c| registry::canonical_rank(&c.id));
}

/// Default currency list with rates refreshed from the live table.
/// Currencies missing from the table keep their default rate.
pub async fn get_live_currency_rates(source: &dyn MarketSource) -> Vec<CurrencyOption> {
    let defaults = default_currencies();
    match source.fiat_rates().await {
        Ok(rates) => apply_rates(defaults, &rates),
        Err(e) => {
            log_fetch_failure("currency rates, using defaults", &e);
            defaults
        }
    }
}

pub fn apply_rates(currencies: Vec<CurrencyOption>, rates: &HashMap<String, f64>) -> Vec<CurrencyOption> {
    currencies
        .into_iter()
        .map(|currency| match rates.get(&currency.code.to_uppercase()) {
            Some(&rate) if rate.is_finite() && rate > 0.0 => CurrencyOption {
                rate_to_usd: rate,
                ..currency
            },
            _ => currency,
        })
        .collect()
}

/// Runs one refresh cycle and swaps the snapshot in a single step.
pub async fn refresh_market_data(state: &AppState) -> MarketSnapshot {
    let source = state.source.as_ref();
    let (coins, currencies) = tokio::join!(
        get_top_coins(source),
        get_live_currency_rates(source)
    );

    let snapshot = MarketSnapshot {
        coins,
        currencies,
        fetched_at: SystemTime::now(),
    };

    match state.snapshot.lock() {
        Ok(mut current) => *current = Some(snapshot.clone()),
        Err(poisoned) => *poisoned.into_inner() = Some(snapshot.clone()),
    }

    info!(
        "Market snapshot refreshed: {} coins, {} currencies",
        snapshot.coins.len(),
        snapshot.currencies.len()
    );
    snapshot
}

/// Refresh loop. The startup refresh happens in `main`, so the first tick
/// waits a full period. A slow cycle delays the next tick instead of
/// overlapping it.
fn refresh_period(update_interval_seconds: u64) -> Duration {
    Duration::from_secs(update_interval_seconds.clamp(1, MAX_REFRESH_INTERVAL_SECONDS))
}

pub async fn fetch_data_periodically(state: web::Data<AppState>) {
    let period = refresh_period(state.update_interval_seconds);
    let mut interval = time::interval_at(time::Instant::now() + period, period);
    interval.set_missed_tick_behavior(time::MissedTickBehavior::Delay);

    loop {
        interval.tick().await;
        info!("Refreshing market data");
        refresh_market_data(&state).await;
    }
}
