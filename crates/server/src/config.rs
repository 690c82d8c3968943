use log::{info, warn};
use std::path::Path;

use crate::assistant::{DEFAULT_GEMINI_API, DEFAULT_GEMINI_MODEL};
use crate::sources::{Endpoints, DEFAULT_COINCAP_API, DEFAULT_COINGECKO_API, DEFAULT_RATES_API};

const ENV_FILE: &str = "crates/server/.env.server";

/// Upper bound for `REFRESH_INTERVAL_SECONDS` (one day).
pub const MAX_REFRESH_INTERVAL_SECONDS: u64 = 86_400;

pub struct ServerConfig {
    pub log_level: String,
    pub http_port: u16,
    pub update_interval_seconds: u64,
    pub coingecko_api_key: Option<String>,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_api_url: String,
    pub endpoints: Endpoints,
    /// Defaults applied while reading the environment. Config is read before
    /// the logger exists, so these are logged by `setup_logging`.
    pub notices: Vec<String>,
}

fn optional_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn var_or(name: &str, default: &str, notices: &mut Vec<String>) -> String {
    optional_var(name).unwrap_or_else(|| {
        notices.push(format!("{} not set, using default ({})", name, default));
        default.to_string()
    })
}

fn parsed_var_or<T: std::str::FromStr + std::fmt::Display>(
    name: &str,
    default: T,
    notices: &mut Vec<String>,
) -> Result<T, String> {
    match optional_var(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| format!("{} must be a number, got '{}'", name, raw)),
        None => {
            notices.push(format!("{} not set, using default ({})", name, default));
            Ok(default)
        }
    }
}

impl ServerConfig {
    pub fn load() -> Result<Self, String> {
        if Path::new(ENV_FILE).exists() {
            dotenv::from_filename(ENV_FILE)
                .map_err(|e| format!("Failed to load {}: {}", ENV_FILE, e))?;
        }
        Self::from_env()
    }

    pub fn from_env() -> Result<Self, String> {
        let mut notices = Vec::new();

        let coingecko_api_key = optional_var("COINGECKO_API_KEY");
        let gemini_api_key = optional_var("GEMINI_API_KEY");
        if gemini_api_key.is_none() {
            notices.push("GEMINI_API_KEY not set, assistant replies will be unavailable".to_string());
        }

        let update_interval_seconds = parsed_var_or("REFRESH_INTERVAL_SECONDS", 60u64, &mut notices)?;
        if update_interval_seconds == 0 || update_interval_seconds > MAX_REFRESH_INTERVAL_SECONDS {
            return Err(format!(
                "REFRESH_INTERVAL_SECONDS must be between 1 and {}, got {}",
                MAX_REFRESH_INTERVAL_SECONDS, update_interval_seconds
            ));
        }

        let http_port = parsed_var_or("HTTP_PORT", 8080u16, &mut notices)?;
        let gemini_model = var_or("GEMINI_MODEL", DEFAULT_GEMINI_MODEL, &mut notices);

        Ok(ServerConfig {
            log_level: optional_var("LOG_LEVEL").unwrap_or_else(|| "INFO".to_string()),
            http_port,
            update_interval_seconds,
            coingecko_api_key,
            gemini_api_key,
            gemini_model,
            gemini_api_url: optional_var("GEMINI_API_URL").unwrap_or_else(|| DEFAULT_GEMINI_API.to_string()),
            endpoints: Endpoints {
                coingecko: optional_var("COINGECKO_API_URL").unwrap_or_else(|| DEFAULT_COINGECKO_API.to_string()),
                coincap: optional_var("COINCAP_API_URL").unwrap_or_else(|| DEFAULT_COINCAP_API.to_string()),
                rates: optional_var("RATES_API_URL").unwrap_or_else(|| DEFAULT_RATES_API.to_string()),
            },
            notices,
        })
    }

    pub fn setup_logging(&self) {
        // Connection pool chatter from the HTTP client
        shared::init_logging(&self.log_level, &["hyper", "reqwest"]);

        info!("Logging initialized with level: {}", self.log_level);
        for notice in &self.notices {
            warn!("{}", notice);
        }
    }
}
