//! Configuration Module - TOML-based Adapter Configuration
//!
//! Loads and validates configuration from `config.toml` with
//! environment variable overrides for account credentials.
//! Exchange precision rules and retry pacing are externalized here;
//! the domain layer only carries the Bitstamp defaults.

pub mod loader;

use std::time::Duration;

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::adapters::api::{BitstampClientConfig, Credentials};
use crate::adapters::bitstamp::TraderSettings;
use crate::domain::precision::{PrecisionPolicy, DEFAULT_AMOUNT_DECIMALS, DEFAULT_FEE_RESERVE};
use crate::domain::retry::RetryPolicy;
use crate::domain::window::DEFAULT_LOOKBACK_SECS;

/// Top-level configuration.
///
/// Every section is optional; an empty file yields a read-only adapter
/// with Bitstamp defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
  /// Process identity and logging.
  #[serde(default)]
  pub app: AppSection,
  /// Exchange endpoint and account.
  #[serde(default)]
  pub exchange: ExchangeConfig,
  /// Retry pacing for transient failures.
  #[serde(default)]
  pub retry: RetryConfig,
  /// Order amount precision rules.
  #[serde(default)]
  pub precision: PrecisionConfig,
  /// Trade-history query defaults.
  #[serde(default)]
  pub trades: TradesConfig,
  /// Trade poller pacing.
  #[serde(default)]
  pub poller: PollerConfig,
  /// Order tracking pacing.
  #[serde(default)]
  pub orders: OrdersConfig,
  /// Metrics and monitoring.
  #[serde(default)]
  pub metrics: MetricsConfig,
}

/// Process identity configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppSection {
  /// Human-readable instance name.
  #[serde(default = "default_name")]
  pub name: String,
  /// Log level (trace, debug, info, warn, error).
  #[serde(default = "default_log_level")]
  pub log_level: String,
}

/// Exchange endpoint and credentials.
#[derive(Debug, Clone, Deserialize)]
pub struct ExchangeConfig {
  /// REST API base URL.
  #[serde(default = "default_base_url")]
  pub base_url: String,
  /// Request timeout in seconds.
  #[serde(default = "default_timeout")]
  pub timeout_seconds: u64,
  /// Account identifier. Overridden by `BITSTAMP_USER`.
  #[serde(default)]
  pub user: Option<String>,
  /// Account secret. Overridden by `BITSTAMP_PASSWORD`.
  #[serde(default)]
  pub password: Option<String>,
}

/// Retry configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RetryConfig {
  /// Constant delay between attempts (seconds).
  #[serde(default = "default_retry_interval")]
  pub interval_seconds: u64,
  /// Total attempts before giving up; absent = retry forever.
  #[serde(default)]
  pub max_attempts: Option<u32>,
  /// Treat an empty trade window as a transient failure.
  #[serde(default = "default_true")]
  pub retry_on_empty_window: bool,
}

/// Precision configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct PrecisionConfig {
  /// Multiplier applied to buy amounts to reserve fees.
  #[serde(default = "default_fee_reserve")]
  pub fee_reserve: Decimal,
  /// Maximum fractional digits of a submitted amount.
  #[serde(default = "default_amount_decimals")]
  pub amount_decimals: u32,
  /// Floor sell amounts to `amount_decimals` as well.
  #[serde(default = "default_true")]
  pub truncate_sells: bool,
}

/// Trade-history configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct TradesConfig {
  /// Lookback used when no lower bound is given (seconds).
  #[serde(default = "default_lookback")]
  pub default_lookback_secs: u64,
}

/// Trade poller configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct PollerConfig {
  /// Interval between two polls (seconds).
  #[serde(default = "default_poll_interval")]
  pub interval_seconds: u64,
  /// Capacity of the trade broadcast channel.
  #[serde(default = "default_channel_capacity")]
  pub channel_capacity: usize,
}

/// Order tracking configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct OrdersConfig {
  /// Interval between two open-order checks (seconds).
  #[serde(default = "default_check_interval")]
  pub check_interval_seconds: u64,
  /// Give up waiting for an order after this long; absent = wait forever.
  #[serde(default)]
  pub max_wait_seconds: Option<u64>,
}

/// Metrics and monitoring configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
  /// Enable Prometheus metrics export.
  #[serde(default = "default_true")]
  pub enabled: bool,
  /// Metrics server bind address.
  #[serde(default = "default_metrics_addr")]
  pub bind_address: String,
  /// Health check endpoint port.
  #[serde(default = "default_health_port")]
  pub health_port: u16,
}

impl AppConfig {
  /// Retry policy described by the `[retry]` section.
  pub fn retry_policy(&self) -> RetryPolicy {
    let interval = Duration::from_secs(self.retry.interval_seconds);
    match self.retry.max_attempts {
      Some(max) => RetryPolicy::bounded(interval, max),
      None => RetryPolicy::unbounded(interval),
    }
  }

  /// Precision policy described by the `[precision]` section.
  pub fn precision_policy(&self) -> PrecisionPolicy {
    PrecisionPolicy::new(
      self.precision.fee_reserve,
      self.precision.amount_decimals,
      self.precision.truncate_sells,
    )
  }

  /// Adapter tunables.
  pub fn trader_settings(&self) -> TraderSettings {
    TraderSettings {
      retry: self.retry_policy(),
      precision: self.precision_policy(),
      default_lookback_secs: self.trades.default_lookback_secs,
      retry_on_empty_window: self.retry.retry_on_empty_window,
    }
  }

  /// Account credentials, if both parts are configured.
  pub fn credentials(&self) -> Option<Credentials> {
    Credentials::from_parts(
      self.exchange.user.as_deref(),
      self.exchange.password.as_deref(),
    )
  }

  /// HTTP client configuration.
  pub fn client_config(&self) -> BitstampClientConfig {
    BitstampClientConfig {
      base_url: self.exchange.base_url.clone(),
      timeout: Duration::from_secs(self.exchange.timeout_seconds),
    }
  }
}

impl Default for AppSection {
  fn default() -> Self {
    Self {
      name: default_name(),
      log_level: default_log_level(),
    }
  }
}

impl Default for ExchangeConfig {
  fn default() -> Self {
    Self {
      base_url: default_base_url(),
      timeout_seconds: default_timeout(),
      user: None,
      password: None,
    }
  }
}

impl Default for RetryConfig {
  fn default() -> Self {
    Self {
      interval_seconds: default_retry_interval(),
      max_attempts: None,
      retry_on_empty_window: true,
    }
  }
}

impl Default for PrecisionConfig {
  fn default() -> Self {
    Self {
      fee_reserve: default_fee_reserve(),
      amount_decimals: default_amount_decimals(),
      truncate_sells: true,
    }
  }
}

impl Default for TradesConfig {
  fn default() -> Self {
    Self {
      default_lookback_secs: default_lookback(),
    }
  }
}

impl Default for PollerConfig {
  fn default() -> Self {
    Self {
      interval_seconds: default_poll_interval(),
      channel_capacity: default_channel_capacity(),
    }
  }
}

impl Default for OrdersConfig {
  fn default() -> Self {
    Self {
      check_interval_seconds: default_check_interval(),
      max_wait_seconds: None,
    }
  }
}

impl Default for MetricsConfig {
  fn default() -> Self {
    Self {
      enabled: true,
      bind_address: default_metrics_addr(),
      health_port: default_health_port(),
    }
  }
}

// Default value functions for serde

fn default_name() -> String {
  "bitstamp-trader".to_string()
}

fn default_log_level() -> String {
  "info".to_string()
}

fn default_true() -> bool {
  true
}

fn default_base_url() -> String {
  "https://www.bitstamp.net".to_string()
}

fn default_timeout() -> u64 {
  30
}

fn default_retry_interval() -> u64 {
  10
}

fn default_fee_reserve() -> Decimal {
  DEFAULT_FEE_RESERVE
}

fn default_amount_decimals() -> u32 {
  DEFAULT_AMOUNT_DECIMALS
}

fn default_lookback() -> u64 {
  DEFAULT_LOOKBACK_SECS
}

fn default_poll_interval() -> u64 {
  30
}

fn default_channel_capacity() -> usize {
  1024
}

fn default_check_interval() -> u64 {
  10
}

fn default_metrics_addr() -> String {
  "0.0.0.0:9090".to_string()
}

fn default_health_port() -> u16 {
  8080
}
