// Shared data structures and derived-value math used by the server and clients

pub mod calc;
pub mod logging;
pub mod types;

pub use calc::{
    chart_geometry, convert, exchange_spread, parse_amount, select_coin, select_currency,
    unit_rate,
};
pub use logging::{init_logging, parse_level_filter};
pub use types::{
    ChartGeometry, Coin, CurrencyOption, ExchangeQuote, PricePoint, Sparkline, Trend,
};
