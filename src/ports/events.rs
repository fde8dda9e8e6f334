//! Adapter Events Port - Injected Observability
//!
//! The adapter reports retries and order failures through this trait
//! instead of a process-wide logger, so the binary can route them to
//! tracing and metrics and tests can assert on them.

use std::time::Duration;

use rust_decimal::Decimal;

use crate::domain::trade::TradeSide;

/// Sink for noteworthy adapter events.
///
/// Methods are synchronous and must not block: they are called from
/// inside the adapter's async operations.
pub trait AdapterEvents: Send + Sync + 'static {
  /// A transient failure occurred; `attempt` (1-based) will be followed by
  /// another one after `delay`.
  fn on_retry(
    &self,
    exchange: &str,
    operation: &'static str,
    attempt: u32,
    delay: Duration,
    reason: &str,
  );

  /// The exchange accepted an order.
  fn on_order_placed(
    &self,
    exchange: &str,
    side: TradeSide,
    order_id: &str,
    amount: Decimal,
    price: Decimal,
  );

  /// An order could not be placed.
  fn on_order_failed(&self, exchange: &str, side: TradeSide, reason: &str);

  /// A cancellation request failed or was refused.
  fn on_cancel_failed(&self, exchange: &str, order_id: &str, reason: &str);
}
