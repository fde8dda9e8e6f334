//! Tracing Event Sink
//!
//! Default `AdapterEvents` implementation: turns adapter events into
//! structured `tracing` records.

use std::time::Duration;

use rust_decimal::Decimal;
use tracing::{debug, error, info, warn};

use crate::domain::trade::TradeSide;
use crate::ports::events::AdapterEvents;

/// Logs adapter events through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingEvents;

impl AdapterEvents for TracingEvents {
    fn on_retry(
        &self,
        exchange: &str,
        operation: &'static str,
        attempt: u32,
        delay: Duration,
        reason: &str,
    ) {
        debug!(
            exchange,
            operation,
            attempt,
            delay_ms = delay.as_millis() as u64,
            reason,
            "Exchange returned an error, retrying"
        );
    }

    fn on_order_placed(
        &self,
        exchange: &str,
        side: TradeSide,
        order_id: &str,
        amount: Decimal,
        price: Decimal,
    ) {
        info!(
            exchange,
            side = %side,
            order_id,
            amount = %amount,
            price = %price,
            "Order placed"
        );
    }

    fn on_order_failed(&self, exchange: &str, side: TradeSide, reason: &str) {
        error!(exchange, side = %side, reason, "Unable to place order");
    }

    fn on_cancel_failed(&self, exchange: &str, order_id: &str, reason: &str) {
        warn!(exchange, order_id, reason, "Unable to cancel order");
    }
}
