//! Tracing subscriber setup

use tracing::Level;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use crate::config::LoggingConfig;
use crate::error::{Result, RolebitError};

/// Initialize structured logging. `RUST_LOG` takes precedence over the configured level.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .or_else(|_| parse_log_level(&config.level).map(|l| EnvFilter::new(l.to_string())))?;

    let registry = tracing_subscriber::registry().with(env_filter);
    let file = match &config.file_path {
        Some(path) => Some(
            std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| RolebitError::Config(format!("log file {path}: {e}")))?,
        ),
        None => None,
    };

    let r = if config.format == "json" {
        let layer = fmt::layer()
            .json()
            .with_span_events(FmtSpan::CLOSE)
            .with_current_span(true)
            .with_target(true)
            .with_line_number(true);
        match file {
            Some(f) => registry.with(layer.with_writer(std::sync::Arc::new(f))).try_init(),
            None => registry.with(layer).try_init(),
        }
    } else {
        let layer = fmt::layer().pretty().with_target(true).with_file(false);
        match file {
            Some(f) => registry.with(layer.with_writer(std::sync::Arc::new(f))).try_init(),
            None => registry.with(layer).try_init(),
        }
    };
    r.map_err(|e| RolebitError::Config(e.to_string()))
}

fn parse_log_level(level: &str) -> Result<Level> {
    match level.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" | "warning" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => Err(RolebitError::Config(format!("Invalid log level: {level}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_levels() {
        assert_eq!(parse_log_level("WARNING").unwrap(), Level::WARN);
        assert_eq!(parse_log_level("trace").unwrap(), Level::TRACE);
        assert!(parse_log_level("loud").is_err());
    }
}
