//! Derived values shown next to the market data: conversions, chart
//! geometry and the simulated exchange spread. Everything here is pure.

use crate::types::{ChartGeometry, Coin, CurrencyOption, ExchangeQuote, PricePoint, Trend};

/// Logical chart width, matching an SVG `viewBox="0 0 100 40"`.
pub const CHART_WIDTH: f64 = 100.0;
pub const CHART_HEIGHT: f64 = 40.0;

/// Cosmetic multipliers applied to the converted price. These are not quotes.
pub const EXCHANGE_SPREAD: [(&str, f64); 3] = [
    ("Binance", 1.0002),
    ("Bybit", 0.9998),
    ("Mudrex", 1.0005),
];

/// Parses a user-typed amount. Anything that is not a finite number is zero.
pub fn parse_amount(amount: &str) -> f64 {
    match amount.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => 0.0,
    }
}

/// Price of one coin in the target currency.
pub fn unit_rate(coin: &Coin, currency: &CurrencyOption) -> f64 {
    coin.current_price * currency.rate_to_usd
}

/// CoinPrice(USD) * CurrencyRate(per USD) * Amount
pub fn convert(coin: &Coin, currency: &CurrencyOption, amount: &str) -> f64 {
    unit_rate(coin, currency) * parse_amount(amount)
}

pub fn exchange_spread(base_price: f64) -> Vec<ExchangeQuote> {
    EXCHANGE_SPREAD
        .iter()
        .map(|(exchange, multiplier)| ExchangeQuote {
            exchange: exchange.to_string(),
            price: base_price * multiplier,
        })
        .collect()
}

/// Builds the chart for a coin's history, always ending at the live price.
///
/// An empty history yields a flat two-point series at `live_price`. The
/// trend compares the first and last points of the drawn series, so it can
/// disagree with the upstream 24h change figure.
pub fn chart_geometry(history: &[f64], live_price: f64) -> ChartGeometry {
    let series: Vec<f64> = if history.is_empty() {
        vec![live_price, live_price]
    } else {
        history.iter().copied().chain(std::iter::once(live_price)).collect()
    };

    let max = series.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let min = series.iter().copied().fold(f64::INFINITY, f64::min);
    let range = max - min;
    let buffer = if range == 0.0 { max * 0.01 } else { range * 0.1 };
    let chart_min = min - buffer;
    let chart_max = max + buffer;
    let chart_range = chart_max - chart_min;

    let last_index = (series.len() - 1) as f64;
    let to_y = |value: f64| {
        if chart_range == 0.0 {
            CHART_HEIGHT / 2.0
        } else {
            CHART_HEIGHT - ((value - chart_min) / chart_range) * CHART_HEIGHT
        }
    };

    let points: Vec<PricePoint> = series
        .iter()
        .enumerate()
        .map(|(index, &value)| PricePoint {
            x: (index as f64 / last_index) * CHART_WIDTH,
            y: to_y(value),
        })
        .collect();

    let first = series[0];
    let last = series[series.len() - 1];
    let trend = if last >= first { Trend::Up } else { Trend::Down };

    let joined = points
        .iter()
        .map(|p| format!("{},{}", p.x, p.y))
        .collect::<Vec<_>>()
        .join(" L ");
    let line_path = format!("M {}", joined);
    let area_path = format!(
        "{} L {},{} L 0,{} Z",
        line_path, CHART_WIDTH, CHART_HEIGHT, CHART_HEIGHT
    );

    ChartGeometry {
        last_y: to_y(last),
        series,
        points,
        min,
        max,
        chart_min,
        chart_max,
        trend,
        line_path,
        area_path,
    }
}

/// The coin with `id`, or the first coin when `id` is not in the list.
pub fn select_coin<'a>(coins: &'a [Coin], id: &str) -> Option<&'a Coin> {
    coins.iter().find(|c| c.id == id).or_else(|| coins.first())
}

/// The currency with `code` (case-insensitive), or the first one listed.
pub fn select_currency<'a>(currencies: &'a [CurrencyOption], code: &str) -> Option<&'a CurrencyOption> {
    currencies
        .iter()
        .find(|c| c.code.eq_ignore_ascii_case(code))
        .or_else(|| currencies.first())
}
