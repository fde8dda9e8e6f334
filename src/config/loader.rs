//! Configuration Loader - File Loading and Validation
//!
//! Handles loading `config.toml`, applying environment overrides for
//! credentials, validating all parameters, and providing clear error
//! messages for misconfiguration.

use std::path::Path;

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use tracing::info;

use super::AppConfig;

/// Environment variable overriding `exchange.user`.
pub const ENV_USER: &str = "BITSTAMP_USER";

/// Environment variable overriding `exchange.password`.
pub const ENV_PASSWORD: &str = "BITSTAMP_PASSWORD";

/// Load and validate configuration from a TOML file.
///
/// # Errors
/// Returns detailed error if:
/// - File doesn't exist or can't be read
/// - TOML parsing fails
/// - Validation rules are violated
pub fn load_config(path: &str) -> Result<AppConfig> {
  let path = Path::new(path);

  let content = std::fs::read_to_string(path)
    .with_context(|| format!("Failed to read config file: {}", path.display()))?;

  let mut config = parse_config(&content)?;
  apply_env_overrides(&mut config, |key| std::env::var(key).ok());
  validate_config(&config)?;

  info!(
    base_url = %config.exchange.base_url,
    authenticated = config.credentials().is_some(),
    retry_interval_s = config.retry.interval_seconds,
    "Configuration loaded successfully"
  );

  Ok(config)
}

/// Parse configuration text without validating it.
pub fn parse_config(content: &str) -> Result<AppConfig> {
  toml::from_str(content).with_context(|| "Failed to parse config.toml")
}

/// Replace credentials with values found through `lookup`.
///
/// Keeps secrets out of `config.toml`: the file may omit them entirely.
pub fn apply_env_overrides<F>(config: &mut AppConfig, lookup: F)
where
  F: Fn(&str) -> Option<String>,
{
  if let Some(user) = lookup(ENV_USER) {
    config.exchange.user = Some(user);
  }
  if let Some(password) = lookup(ENV_PASSWORD) {
    config.exchange.password = Some(password);
  }
}

/// Validate all configuration parameters.
pub fn validate_config(config: &AppConfig) -> Result<()> {
  // Exchange validation
  anyhow::ensure!(
    !config.exchange.base_url.is_empty(),
    "Exchange base_url must not be empty"
  );
  anyhow::ensure!(
    config.exchange.timeout_seconds > 0,
    "Exchange timeout_seconds must be positive"
  );
  anyhow::ensure!(
    config.exchange.user.is_some() == config.exchange.password.is_some(),
    "Exchange user and password must be configured together"
  );

  // Retry validation
  anyhow::ensure!(
    config.retry.interval_seconds > 0,
    "Retry interval_seconds must be positive"
  );
  if let Some(max) = config.retry.max_attempts {
    anyhow::ensure!(max > 0, "Retry max_attempts must be positive, got {max}");
  }

  // Precision validation
  anyhow::ensure!(
    config.precision.fee_reserve > Decimal::ZERO
      && config.precision.fee_reserve <= Decimal::ONE,
    "Precision fee_reserve must be in (0, 1], got {}",
    config.precision.fee_reserve
  );
  anyhow::ensure!(
    config.precision.amount_decimals <= 18,
    "Precision amount_decimals must be <= 18, got {}",
    config.precision.amount_decimals
  );

  // Polling validation
  anyhow::ensure!(
    config.poller.interval_seconds > 0,
    "Poller interval_seconds must be positive"
  );
  anyhow::ensure!(
    config.poller.channel_capacity > 0,
    "Poller channel_capacity must be positive"
  );
  anyhow::ensure!(
    config.orders.check_interval_seconds > 0,
    "Orders check_interval_seconds must be positive"
  );

  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use rust_decimal_macros::dec;

  #[test]
  fn test_load_nonexistent_file() {
    let result = load_config("nonexistent.toml");
    assert!(result.is_err());
  }

  #[test]
  fn test_empty_config_uses_bitstamp_defaults() {
    let config = parse_config("").unwrap();
    validate_config(&config).unwrap();

    assert_eq!(config.retry.interval_seconds, 10);
    assert_eq!(config.retry.max_attempts, None);
    assert!(config.retry.retry_on_empty_window);
    assert_eq!(config.precision.fee_reserve, dec!(0.995));
    assert_eq!(config.precision.amount_decimals, 8);
    assert_eq!(config.trades.default_lookback_secs, 600);
    assert!(config.credentials().is_none());
  }

  #[test]
  fn test_sections_override_defaults() {
    let config = parse_config(
      r#"
        [exchange]
        user = "123456"
        password = "secret"

        [retry]
        interval_seconds = 3
        max_attempts = 5
        retry_on_empty_window = false

        [precision]
        fee_reserve = "0.998"
        amount_decimals = 6
      "#,
    )
    .unwrap();
    validate_config(&config).unwrap();

    let settings = config.trader_settings();
    assert_eq!(settings.retry.max_attempts(), Some(5));
    assert_eq!(settings.retry.interval().as_secs(), 3);
    assert!(!settings.retry_on_empty_window);
    assert_eq!(settings.precision.fee_reserve(), dec!(0.998));
    assert_eq!(settings.precision.amount_decimals(), 6);
    assert_eq!(config.credentials().unwrap().user(), "123456");
  }

  #[test]
  fn test_env_overrides_credentials() {
    let mut config = parse_config("").unwrap();
    apply_env_overrides(&mut config, |key| match key {
      ENV_USER => Some("env-user".to_string()),
      ENV_PASSWORD => Some("env-pass".to_string()),
      _ => None,
    });
    assert_eq!(config.exchange.user.as_deref(), Some("env-user"));
    assert!(config.credentials().is_some());
  }

  #[test]
  fn test_rejects_half_configured_credentials() {
    let config = parse_config("[exchange]\nuser = \"123456\"\n").unwrap();
    assert!(validate_config(&config).is_err());
  }

  #[test]
  fn test_rejects_bad_fee_reserve() {
    let config = parse_config("[precision]\nfee_reserve = \"1.5\"\n").unwrap();
    assert!(validate_config(&config).is_err());
  }

  #[test]
  fn test_rejects_zero_retry_interval() {
    let config = parse_config("[retry]\ninterval_seconds = 0\n").unwrap();
    assert!(validate_config(&config).is_err());
  }
}
