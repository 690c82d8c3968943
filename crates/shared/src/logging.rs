use log::LevelFilter;

// Logging bootstrap shared across crates

/// Maps a `LOG_LEVEL` value to a filter. Unknown values fall back to INFO.
pub fn parse_level_filter(level: &str) -> LevelFilter {
    match level.trim().to_uppercase().as_str() {
        "OFF" => LevelFilter::Off,
        "ERROR" => LevelFilter::Error,
        "WARN" => LevelFilter::Warn,
        "INFO" => LevelFilter::Info,
        "DEBUG" => LevelFilter::Debug,
        "TRACE" => LevelFilter::Trace,
        _ => LevelFilter::Info,
    }
}

/// Builder seeded from `RUST_LOG` with the base level taken from `log_level`
/// and every module in `quiet_modules` capped at WARN.
pub fn logger_builder(log_level: &str, quiet_modules: &[&str]) -> env_logger::Builder {
    let mut builder = env_logger::Builder::from_default_env();
    builder.filter_level(parse_level_filter(log_level));
    for module in quiet_modules {
        builder.filter_module(module, LevelFilter::Warn);
    }
    builder
}

/// Installs the global logger. Returns false if one was already installed.
pub fn init_logging(log_level: &str, quiet_modules: &[&str]) -> bool {
    logger_builder(log_level, quiet_modules).try_init().is_ok()
}
