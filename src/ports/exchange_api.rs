//! Exchange API Port - Remote Bitstamp Client Interface
//!
//! Defines the capability set the adapter needs from the remote API
//! client. Transport, credentials and request signing live behind this
//! trait; the adapter only sees typed results.
//!
//! Contracts:
//! - `transactions` returns trades newest-first
//! - `balance` returns the raw flat string map (`btc_available`, `fee`, ...)
//! - `buy`/`sell` may succeed at transport level and still carry an error flag

use std::collections::HashMap;

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::domain::error::ExchangeError;
use crate::domain::trade::{OpenOrder, OrderResponse, Ticker, Trade};

/// Trait for remote exchange API clients.
///
/// Implementors talk to one account on one exchange. Timeouts are the
/// implementor's responsibility; the adapter never cancels a call.
#[async_trait]
pub trait ExchangeApi: Send + Sync + 'static {
  /// Trades executed within the last `window_secs` seconds, newest-first.
  async fn transactions(&self, window_secs: u64) -> Result<Vec<Trade>, ExchangeError>;

  /// Raw account balance map.
  async fn balance(&self) -> Result<HashMap<String, String>, ExchangeError>;

  /// Current ticker.
  async fn ticker(&self) -> Result<Ticker, ExchangeError>;

  /// Submit a limit buy order.
  async fn buy(&self, amount: Decimal, price: Decimal) -> Result<OrderResponse, ExchangeError>;

  /// Submit a limit sell order.
  async fn sell(&self, amount: Decimal, price: Decimal) -> Result<OrderResponse, ExchangeError>;

  /// Orders still resting on the book.
  async fn open_orders(&self) -> Result<Vec<OpenOrder>, ExchangeError>;

  /// Cancel an order. `Ok(false)` means the exchange refused.
  async fn cancel_order(&self, order_id: &str) -> Result<bool, ExchangeError>;
}
