//! Order Tracker - Order Lifecycle Helpers
//!
//! Builds on the presence-based `check_order` port operation: an order is
//! considered closed once it disappears from the open-orders set.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use rust_decimal::Decimal;
use tokio::time::Instant;
use tracing::{info, instrument, warn};

use crate::domain::trade::{OrderId, TradeSide};
use crate::ports::trader::Trader;

/// Places orders and waits for them to leave the book.
pub struct OrderTracker<T: Trader> {
  /// Trading port.
  trader: Arc<T>,
  /// Delay between two `check_order` calls.
  check_interval: Duration,
  /// Give up after this long; `None` waits forever.
  max_wait: Option<Duration>,
}

impl<T: Trader> OrderTracker<T> {
  pub fn new(trader: Arc<T>, check_interval: Duration, max_wait: Option<Duration>) -> Self {
    Self {
      trader,
      check_interval,
      max_wait,
    }
  }

  /// Poll until `order_id` is no longer open.
  ///
  /// Returns the number of checks performed. Check failures are logged
  /// and the poll continues; only the deadline ends it early.
  #[instrument(skip(self), fields(exchange = self.trader.name()))]
  pub async fn wait_until_closed(&self, order_id: &str) -> Result<u32> {
    let deadline = self.max_wait.map(|d| Instant::now() + d);
    let mut checks = 0u32;

    loop {
      checks += 1;
      match self.trader.check_order(order_id).await {
        Ok(true) => {
          info!(order_id, checks, "Order closed");
          return Ok(checks);
        }
        Ok(false) => {}
        Err(e) => warn!(order_id, error = %e, "Order check failed"),
      }

      if let Some(deadline) = deadline {
        if Instant::now() + self.check_interval > deadline {
          bail!("Order {order_id} still open after {checks} checks");
        }
      }

      tokio::time::sleep(self.check_interval).await;
    }
  }

  /// Place an order and wait for it to close.
  ///
  /// An order the exchange refused is reported apart from a failed call,
  /// since resubmitting it unchanged cannot succeed.
  pub async fn place_and_track(
    &self,
    side: TradeSide,
    amount: Decimal,
    price: Decimal,
  ) -> Result<OrderId> {
    let order_id = match self.trader.place(side, amount, price).await {
      Ok(order_id) => order_id,
      Err(e) if e.is_order_failure() => {
        warn!(%side, %amount, %price, error = %e, "Order refused by exchange");
        return Err(e).with_context(|| format!("{side} order refused"));
      }
      Err(e) => return Err(e).with_context(|| format!("Failed to place {side} order")),
    };

    self.wait_until_closed(&order_id).await?;
    Ok(order_id)
  }

  /// Request cancellation, then wait for the order to leave the book.
  ///
  /// Cancellation itself never reports failure, so the follow-up wait
  /// is the only confirmation available.
  pub async fn cancel_and_confirm(&self, order_id: &str) -> Result<()> {
    self.trader.cancel_order(order_id).await;
    self
      .wait_until_closed(order_id)
      .await
      .with_context(|| format!("Cancellation of {order_id} not confirmed"))?;
    Ok(())
  }
}
