//! Prometheus Metrics Registry - Adapter Observability
//!
//! Registers and exposes Prometheus metrics for Grafana dashboards.
//! Covers retries, order outcomes, cancellations and the trade feed.
//! Also acts as an `AdapterEvents` sink: every event is counted and then
//! logged through `TracingEvents`.

use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use prometheus::{
    Encoder, Gauge, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use tokio::sync::broadcast;
use tracing::{info, instrument};

use super::tracing_events::TracingEvents;
use crate::domain::trade::{Trade, TradeSide};
use crate::ports::events::AdapterEvents;

/// Centralized Prometheus metrics for the adapter.
///
/// All metrics follow the naming convention `bitstamp_trader_*`.
pub struct MetricsRegistry {
    /// Prometheus registry.
    registry: Registry,
    /// Transient failures that led to a retry, by operation.
    pub retries: IntCounterVec,
    /// Orders accepted by the exchange, by side.
    pub orders_placed: IntCounterVec,
    /// Orders that could not be placed, by side.
    pub orders_failed: IntCounterVec,
    /// Failed or refused cancellations.
    pub cancel_failures: IntCounter,
    /// Trades delivered by the trade poller.
    pub trades_received: IntCounter,
    /// Price of the most recent trade seen.
    pub last_trade_price: Gauge,
    /// Log sink events are forwarded to after counting.
    log: TracingEvents,
}

impl MetricsRegistry {
    /// Create and register all Prometheus metrics.
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let retries = IntCounterVec::new(
            Opts::new(
                "bitstamp_trader_retries_total",
                "Transient exchange failures followed by a retry",
            ),
            &["operation"],
        )?;

        let orders_placed = IntCounterVec::new(
            Opts::new("bitstamp_trader_orders_placed_total", "Orders accepted by the exchange"),
            &["side"],
        )?;

        let orders_failed = IntCounterVec::new(
            Opts::new("bitstamp_trader_orders_failed_total", "Orders that could not be placed"),
            &["side"],
        )?;

        let cancel_failures = IntCounter::new(
            "bitstamp_trader_cancel_failures_total",
            "Cancellation requests that failed or were refused",
        )?;

        let trades_received = IntCounter::new(
            "bitstamp_trader_trades_received_total",
            "Trades delivered by the trade poller",
        )?;

        let last_trade_price = Gauge::new(
            "bitstamp_trader_last_trade_price",
            "Price of the most recent trade",
        )?;

        registry.register(Box::new(retries.clone()))?;
        registry.register(Box::new(orders_placed.clone()))?;
        registry.register(Box::new(orders_failed.clone()))?;
        registry.register(Box::new(cancel_failures.clone()))?;
        registry.register(Box::new(trades_received.clone()))?;
        registry.register(Box::new(last_trade_price.clone()))?;

        Ok(Self {
            registry,
            retries,
            orders_placed,
            orders_failed,
            cancel_failures,
            trades_received,
            last_trade_price,
            log: TracingEvents,
        })
    }

    /// Record trades delivered to consumers.
    pub fn record_trades(&self, trades: &[Trade]) {
        self.trades_received.inc_by(trades.len() as u64);
        if let Some(price) = trades.last().and_then(|t| t.price.to_f64()) {
            self.last_trade_price.set(price);
        }
    }

    /// Render all metrics in the Prometheus text exposition format.
    pub fn render(&self) -> anyhow::Result<String> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }

    /// Serve Prometheus metrics on the configured bind address.
    #[instrument(skip(self, shutdown_rx))]
    pub async fn serve(
        self: Arc<Self>,
        bind_address: String,
        mut shutdown_rx: broadcast::Receiver<()>,
    ) -> anyhow::Result<()> {
        let metrics_self = Arc::clone(&self);

        let app = Router::new().route(
            "/metrics",
            get(move || {
                let metrics = Arc::clone(&metrics_self);
                async move {
                    match metrics.render() {
                        Ok(body) => (StatusCode::OK, body),
                        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
                    }
                }
            }),
        );

        let listener = tokio::net::TcpListener::bind(&bind_address).await?;
        info!(address = %bind_address, "Prometheus metrics server started");

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.recv().await;
            })
            .await?;

        Ok(())
    }
}

impl AdapterEvents for MetricsRegistry {
    fn on_retry(
        &self,
        exchange: &str,
        operation: &'static str,
        attempt: u32,
        delay: Duration,
        reason: &str,
    ) {
        self.retries.with_label_values(&[operation]).inc();
        self.log.on_retry(exchange, operation, attempt, delay, reason);
    }

    fn on_order_placed(
        &self,
        exchange: &str,
        side: TradeSide,
        order_id: &str,
        amount: Decimal,
        price: Decimal,
    ) {
        self.orders_placed.with_label_values(&[&side.to_string()]).inc();
        self.log.on_order_placed(exchange, side, order_id, amount, price);
    }

    fn on_order_failed(&self, exchange: &str, side: TradeSide, reason: &str) {
        self.orders_failed.with_label_values(&[&side.to_string()]).inc();
        self.log.on_order_failed(exchange, side, reason);
    }

    fn on_cancel_failed(&self, exchange: &str, order_id: &str, reason: &str) {
        self.cancel_failures.inc();
        self.log.on_cancel_failed(exchange, order_id, reason);
    }
}
