//! Logging configuration for Twiq

use std::path::Path;

use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::fmt::{
    self,
};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::Layer;
use tracing_subscriber::Registry;

use crate::Result;

const LOG_DIR: &str = "logs";
const LOG_FILE: &str = "twiq.log";

/// Filter directive that keeps third-party crates quiet
fn filter_directive(level: &str) -> String {
    format!("warn,twiq={level},sqlx=error,hyper=warn,tower=warn,tower_http=warn,aws_config=warn")
}

/// Directive for the `[logging].level` of a loaded config
fn config_directive(config: &crate::config::AppConfig) -> String {
    filter_directive(&config.logging.level)
}

/// Initialize logging system with file output
pub fn init_logging() -> Result<()> {
    init_logging_with_config(None)
}

/// Initialize logging with configuration
pub fn init_logging_with_config(config: Option<&crate::config::AppConfig>) -> Result<()> {
    let env_filter = if let Some(config) = config {
        EnvFilter::new(config_directive(config))
    } else {
        // Fallback to environment variable or default to info level to show access logs
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter_directive("info")))
    };

    install(env_filter)?;

    let level = config.map_or("info", |c| c.logging.level.as_str());
    tracing::debug!("Logging initialized with level: {}", level);
    Ok(())
}

/// Initialize logging with custom log level (used by `--verbose`)
pub fn init_logging_with_level(level: &str) -> Result<()> {
    install(EnvFilter::new(filter_directive(level)))?;
    tracing::debug!("Logging initialized with level: {}", level);
    Ok(())
}

/// stdout for info and up, stderr for errors, daily rolling file for everything
fn install(env_filter: EnvFilter) -> Result<()> {
    let logs_dir = Path::new(LOG_DIR);
    if !logs_dir.exists() {
        std::fs::create_dir_all(logs_dir)?;
    }

    let file_appender = tracing_appender::rolling::daily(LOG_DIR, LOG_FILE);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let stdout_layer = fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_file(false)
        .with_line_number(false)
        .with_span_events(FmtSpan::NONE)
        .with_writer(std::io::stdout)
        .with_filter(tracing_subscriber::filter::LevelFilter::INFO);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_file(true)
        .with_line_number(true)
        .with_span_events(FmtSpan::NONE)
        .with_writer(std::io::stderr)
        .with_filter(tracing_subscriber::filter::LevelFilter::ERROR);

    let file_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_file(true)
        .with_line_number(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(non_blocking)
        .with_ansi(false);

    Registry::default()
        .with(env_filter)
        .with(stdout_layer)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| crate::TwiqError::ConfigError(format!("Logging already initialized: {e}")))?;

    tracing::debug!("Log files will be saved to: {}/{}.YYYY-MM-DD", LOG_DIR, LOG_FILE);

    // The writer thread must outlive main
    std::mem::forget(guard);

    Ok(())
}

/// Initialize simple logging for testing
pub fn init_simple_logging() -> Result<()> {
    let _ = tracing_subscriber::fmt()
        .with_target(true)
        .with_max_level(tracing::Level::INFO)
        .with_test_writer()
        .try_init();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_directive_scopes_level_to_crate() {
        let directive = filter_directive("debug");
        assert!(directive.starts_with("warn,twiq=debug"));
        assert!(directive.contains("sqlx=error"));
    }

    #[test]
    fn test_config_level_reaches_filter() {
        let mut config = crate::config::AppConfig::default();
        config.logging.level = "trace".to_string();
        assert!(config_directive(&config).starts_with("warn,twiq=trace"));
    }

    #[test]
    fn test_simple_logging_is_idempotent() {
        assert!(init_simple_logging().is_ok());
        assert!(init_simple_logging().is_ok());
    }
}
