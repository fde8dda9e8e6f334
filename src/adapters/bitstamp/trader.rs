//! Bitstamp Trader - Uniform Trading Adapter
//!
//! Implements the `Trader` port on top of any `ExchangeApi` client.
//! Adds what the raw API lacks: retrying trade-history queries, balance
//! normalization, amount precision enforcement, and order-presence checks.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tokio::time::sleep;
use tracing::{debug, instrument};

use crate::domain::error::{AdapterError, ExchangeError};
use crate::domain::portfolio::{fee_ratio, portfolio_from_balance};
use crate::domain::precision::PrecisionPolicy;
use crate::domain::retry::RetryPolicy;
use crate::domain::trade::{
    OrderId, OrderResponse, PortfolioEntry, Ticker, Trade, TradeSide, TradesQuery,
};
use crate::domain::window::{window_seconds, DEFAULT_LOOKBACK_SECS};
use crate::ports::events::AdapterEvents;
use crate::ports::exchange_api::ExchangeApi;
use crate::ports::trader::Trader;

/// Name reported in logs and metrics.
pub const EXCHANGE_NAME: &str = "Bitstamp";

/// Tunables of the adapter.
#[derive(Debug, Clone)]
pub struct TraderSettings {
    /// Retry policy for transient trade-history failures.
    pub retry: RetryPolicy,
    /// Amount precision rules for order submission.
    pub precision: PrecisionPolicy,
    /// Window used when `get_trades` is called without `since`.
    pub default_lookback_secs: u64,
    /// Treat an empty trade window as a transient failure.
    pub retry_on_empty_window: bool,
}

impl Default for TraderSettings {
    fn default() -> Self {
        Self {
            retry: RetryPolicy::default(),
            precision: PrecisionPolicy::bitstamp(),
            default_lookback_secs: DEFAULT_LOOKBACK_SECS,
            retry_on_empty_window: true,
        }
    }
}

/// Why a single attempt of a retrying call did not produce a result.
#[derive(Debug)]
enum TransientFailure {
    Remote(ExchangeError),
    EmptyWindow { window_secs: u64 },
}

impl fmt::Display for TransientFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Remote(e) => write!(f, "{e}"),
            Self::EmptyWindow { window_secs } => {
                write!(f, "no trades in the last {window_secs}s")
            }
        }
    }
}

/// Bitstamp adapter over an injected remote client and event sink.
///
/// Holds no mutable state: every field is read-only after construction,
/// so one instance can serve concurrent callers.
pub struct BitstampTrader<A: ExchangeApi> {
    /// Remote API client.
    api: Arc<A>,
    /// Observability sink for retries and order failures.
    events: Arc<dyn AdapterEvents>,
    /// Adapter tunables.
    settings: TraderSettings,
}

impl<A: ExchangeApi> BitstampTrader<A> {
    /// Create an adapter with default Bitstamp settings.
    pub fn new(api: Arc<A>, events: Arc<dyn AdapterEvents>) -> Self {
        Self::with_settings(api, events, TraderSettings::default())
    }

    /// Create an adapter with explicit settings.
    pub fn with_settings(
        api: Arc<A>,
        events: Arc<dyn AdapterEvents>,
        settings: TraderSettings,
    ) -> Self {
        Self {
            api,
            events,
            settings,
        }
    }

    /// Run `attempt` until it succeeds or the retry policy gives up.
    ///
    /// Attempts never overlap: the next one starts only after the previous
    /// one resolved and the policy delay elapsed.
    async fn with_retry<T, F, Fut>(
        &self,
        operation: &'static str,
        mut attempt: F,
    ) -> Result<T, AdapterError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, TransientFailure>>,
    {
        let mut attempts_made = 0u32;
        loop {
            attempts_made += 1;
            let failure = match attempt().await {
                Ok(value) => return Ok(value),
                Err(failure) => failure,
            };

            let Some(delay) = self.settings.retry.next_delay(attempts_made) else {
                return Err(AdapterError::RetriesExhausted {
                    operation,
                    attempts: attempts_made,
                    last_error: failure.to_string(),
                });
            };

            self.events.on_retry(
                EXCHANGE_NAME,
                operation,
                attempts_made,
                delay,
                &failure.to_string(),
            );
            sleep(delay).await;
        }
    }

    /// One attempt of a trade-history query.
    ///
    /// The window is recomputed on every attempt so that a retried query
    /// still starts at the caller's `since`.
    async fn fetch_trades(&self, query: TradesQuery) -> Result<Vec<Trade>, TransientFailure> {
        let window_secs = window_seconds(
            query.since,
            Utc::now(),
            self.settings.default_lookback_secs,
        );

        let mut trades = self
            .api
            .transactions(window_secs)
            .await
            .map_err(TransientFailure::Remote)?;

        if trades.is_empty() && self.settings.retry_on_empty_window {
            return Err(TransientFailure::EmptyWindow { window_secs });
        }

        // The exchange answers newest-first.
        if !query.descending {
            trades.reverse();
        }

        debug!(window_secs, count = trades.len(), "Fetched trades");
        Ok(trades)
    }

    /// Submit an order after applying the precision policy.
    async fn place_order(
        &self,
        side: TradeSide,
        amount: Decimal,
        price: Decimal,
    ) -> Result<OrderId, AdapterError> {
        let precision = &self.settings.precision;
        let submitted = match side {
            TradeSide::Buy => precision.buy_amount(amount),
            TradeSide::Sell => precision.sell_amount(amount),
        };

        let response = match side {
            TradeSide::Buy => self.api.buy(submitted, price).await,
            TradeSide::Sell => self.api.sell(submitted, price).await,
        };

        let outcome = match response {
            Err(e) => Err(AdapterError::Remote(e)),
            Ok(OrderResponse {
                error: Some(reason),
                ..
            }) => Err(AdapterError::OrderRejected { side, reason }),
            Ok(OrderResponse { id: Some(id), .. }) => Ok(id),
            Ok(_) => Err(AdapterError::MissingOrderId { side }),
        };

        match &outcome {
            Ok(order_id) => self.events.on_order_placed(
                EXCHANGE_NAME,
                side,
                order_id,
                submitted,
                price,
            ),
            Err(e) => self
                .events
                .on_order_failed(EXCHANGE_NAME, side, &e.to_string()),
        }

        outcome
    }
}

#[async_trait]
impl<A: ExchangeApi> Trader for BitstampTrader<A> {
    fn name(&self) -> &'static str {
        EXCHANGE_NAME
    }

    #[instrument(skip(self), fields(exchange = EXCHANGE_NAME))]
    async fn get_trades(
        &self,
        since: Option<DateTime<Utc>>,
        descending: bool,
    ) -> Result<Vec<Trade>, AdapterError> {
        let query = TradesQuery { since, descending };
        self.with_retry("get_trades", || self.fetch_trades(query))
            .await
    }

    #[instrument(skip(self), fields(exchange = EXCHANGE_NAME))]
    async fn get_portfolio(&self) -> Result<Vec<PortfolioEntry>, AdapterError> {
        let balance = self.api.balance().await?;
        portfolio_from_balance(&balance)
    }

    #[instrument(skip(self), fields(exchange = EXCHANGE_NAME))]
    async fn get_ticker(&self) -> Result<Ticker, AdapterError> {
        Ok(self.api.ticker().await?)
    }

    #[instrument(skip(self), fields(exchange = EXCHANGE_NAME))]
    async fn get_fee(&self) -> Result<Decimal, AdapterError> {
        let balance = self.api.balance().await?;
        fee_ratio(&balance)
    }

    #[instrument(skip(self), fields(exchange = EXCHANGE_NAME))]
    async fn buy(&self, amount: Decimal, price: Decimal) -> Result<OrderId, AdapterError> {
        self.place_order(TradeSide::Buy, amount, price).await
    }

    #[instrument(skip(self), fields(exchange = EXCHANGE_NAME))]
    async fn sell(&self, amount: Decimal, price: Decimal) -> Result<OrderId, AdapterError> {
        self.place_order(TradeSide::Sell, amount, price).await
    }

    #[instrument(skip(self), fields(exchange = EXCHANGE_NAME))]
    async fn check_order(&self, order_id: &str) -> Result<bool, AdapterError> {
        let open = self.api.open_orders().await?;
        let still_open = open.iter().any(|o| o.id == order_id);
        Ok(!still_open)
    }

    #[instrument(skip(self), fields(exchange = EXCHANGE_NAME))]
    async fn cancel_order(&self, order_id: &str) {
        match self.api.cancel_order(order_id).await {
            Ok(true) => debug!(order_id, "Order cancelled"),
            Ok(false) => self.events.on_cancel_failed(
                EXCHANGE_NAME,
                order_id,
                "exchange refused cancellation",
            ),
            Err(e) => self
                .events
                .on_cancel_failed(EXCHANGE_NAME, order_id, &e.to_string()),
        }
    }
}
