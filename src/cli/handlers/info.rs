//! Information display

use crate::AppConfig;
use crate::Result;
use crate::TwiqError;

/// Effective configuration as TOML, credentials masked
pub fn render_config(config: &AppConfig) -> Result<String> {
    toml::to_string_pretty(&config.redacted())
        .map_err(|e| TwiqError::ConfigError(format!("Failed to render config: {e}")))
}

pub fn handle_config_command(config: &AppConfig) -> Result<()> {
    println!("📋 Twiq Configuration");
    println!("=====================\n");
    println!("{}", render_config(config)?);
    Ok(())
}
