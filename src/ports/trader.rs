//! Trader Port - Uniform Trading Interface
//!
//! The surface a trading engine consumes, independent of the exchange
//! behind it. Every operation resolves exactly once: either a value or a
//! typed `AdapterError`, with the single exception of `cancel_order`,
//! which is fire-and-forget.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::domain::error::AdapterError;
use crate::domain::trade::{OrderId, PortfolioEntry, Ticker, Trade, TradeSide};

/// Trait for single-account exchange adapters.
#[async_trait]
pub trait Trader: Send + Sync + 'static {
  /// Exchange name used in logs and metrics.
  fn name(&self) -> &'static str;

  /// Trades since `since` (default lookback when `None`).
  ///
  /// Oldest-first unless `descending` is set. Transient failures are
  /// retried according to the adapter's retry policy and never surface
  /// while the policy allows another attempt.
  async fn get_trades(
    &self,
    since: Option<DateTime<Utc>>,
    descending: bool,
  ) -> Result<Vec<Trade>, AdapterError>;

  /// Funds available for trading, one entry per asset.
  async fn get_portfolio(&self) -> Result<Vec<PortfolioEntry>, AdapterError>;

  /// Current ticker, unmodified.
  async fn get_ticker(&self) -> Result<Ticker, AdapterError>;

  /// Account trading fee as a ratio (0.0025 = 0.25%).
  async fn get_fee(&self) -> Result<Decimal, AdapterError>;

  /// Place a limit buy order. The submitted amount may be reduced to
  /// satisfy exchange precision and fee rules.
  async fn buy(&self, amount: Decimal, price: Decimal) -> Result<OrderId, AdapterError>;

  /// Place a limit sell order.
  async fn sell(&self, amount: Decimal, price: Decimal) -> Result<OrderId, AdapterError>;

  /// `true` once the order has left the open-orders set (filled or
  /// cancelled; the two are indistinguishable here).
  async fn check_order(&self, order_id: &str) -> Result<bool, AdapterError>;

  /// Request cancellation. Failures are reported to the adapter's event
  /// sink, never to the caller.
  async fn cancel_order(&self, order_id: &str);

  /// Dispatch to `buy` or `sell`.
  async fn place(
    &self,
    side: TradeSide,
    amount: Decimal,
    price: Decimal,
  ) -> Result<OrderId, AdapterError> {
    match side {
      TradeSide::Buy => self.buy(amount, price).await,
      TradeSide::Sell => self.sell(amount, price).await,
    }
  }
}
