// The fixed coin set and how its ids map onto each upstream namespace

/// CoinGecko ids in display order. Every coin list served is sorted by this.
pub const CANONICAL_ORDER: [&str; 5] = ["tether", "bitcoin", "tron", "ethereum", "binancecoin"];

/// CoinGecko id -> CoinCap id
const LIVE_ID_MAP: [(&str, &str); 5] = [
    ("tether", "tether"),
    ("bitcoin", "bitcoin"),
    ("tron", "tron"),
    ("ethereum", "ethereum"),
    ("binancecoin", "binance-coin"),
];

pub fn is_known(id: &str) -> bool {
    CANONICAL_ORDER.contains(&id)
}

/// Position in the canonical order; unknown ids sort last.
pub fn canonical_rank(id: &str) -> usize {
    CANONICAL_ORDER
        .iter()
        .position(|known| *known == id)
        .unwrap_or(usize::MAX)
}

pub fn to_live_id(id: &str) -> Option<&'static str> {
    LIVE_ID_MAP
        .iter()
        .find(|(internal, _)| *internal == id)
        .map(|(_, live)| *live)
}

pub fn from_live_id(live_id: &str) -> Option<&'static str> {
    LIVE_ID_MAP
        .iter()
        .find(|(_, live)| *live == live_id)
        .map(|(internal, _)| *internal)
}
