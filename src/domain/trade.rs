//! Core trading domain types.
//!
//! Defines the entities the adapter exchanges with its callers: executed
//! trades, portfolio entries, ticker snapshots and open orders.
//! These types are the foundation of the hexagonal architecture's inner ring.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ────────────────────────────────────────────
// Type aliases consumed by ports and adapters
// ────────────────────────────────────────────

/// Opaque exchange-assigned order identifier.
pub type OrderId = String;

// ────────────────────────────────────────────
// Enums shared across domain and ports
// ────────────────────────────────────────────

/// Order or aggressor side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TradeSide {
    Buy,
    Sell,
}

impl TradeSide {
    /// Decode the numeric `type` field Bitstamp attaches to transactions.
    pub fn from_bitstamp_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Buy),
            1 => Some(Self::Sell),
            _ => None,
        }
    }
}

impl std::fmt::Display for TradeSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Buy => write!(f, "BUY"),
            Self::Sell => write!(f, "SELL"),
        }
    }
}

// ────────────────────────────────────────────
// Market data
// ────────────────────────────────────────────

/// One executed market transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trade {
    /// Exchange trade id, strictly increasing over time.
    pub tid: u64,
    /// Execution time.
    pub timestamp: DateTime<Utc>,
    /// Execution price in the quote currency.
    pub price: Decimal,
    /// Executed amount in the base currency.
    pub amount: Decimal,
    /// Aggressor side when the exchange reports it.
    pub side: Option<TradeSide>,
}

/// Ticker snapshot, passed through from the exchange unmodified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticker {
    pub last: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub bid: Decimal,
    pub ask: Decimal,
    pub vwap: Decimal,
    pub volume: Decimal,
    pub timestamp: DateTime<Utc>,
}

impl Ticker {
    /// Mid price between best bid and best ask.
    pub fn mid_price(&self) -> Decimal {
        (self.bid + self.ask) / Decimal::TWO
    }
}

/// Parameters of a trade-history query.
///
/// Captured once per logical `get_trades` call and re-issued unchanged on
/// every retry attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TradesQuery {
    /// Lower time bound; `None` means the default lookback window.
    pub since: Option<DateTime<Utc>>,
    /// Newest-first when true, oldest-first otherwise.
    pub descending: bool,
}

impl TradesQuery {
    /// Oldest-first query starting at `since`.
    pub fn ascending_since(since: Option<DateTime<Utc>>) -> Self {
        Self {
            since,
            descending: false,
        }
    }
}

// ────────────────────────────────────────────
// Account
// ────────────────────────────────────────────

/// Funds available for trading in a single asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortfolioEntry {
    /// Three-letter uppercase asset code, e.g. `BTC`.
    pub name: String,
    /// Available amount, never negative.
    pub amount: Decimal,
}

/// An order still resting on the exchange book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenOrder {
    pub id: OrderId,
}

/// Raw acknowledgement of a buy or sell submission.
///
/// The exchange may answer with a 2xx status and still refuse the order,
/// in which case `error` is set and `id` is usually absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderResponse {
    pub id: Option<OrderId>,
    pub error: Option<String>,
}

impl OrderResponse {
    /// Successful acknowledgement carrying an order id.
    pub fn accepted(id: impl Into<OrderId>) -> Self {
        Self {
            id: Some(id.into()),
            error: None,
        }
    }

    /// Acknowledgement carrying an exchange error flag.
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self {
            id: None,
            error: Some(reason.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_trade_side_from_bitstamp_code() {
        assert_eq!(TradeSide::from_bitstamp_code(0), Some(TradeSide::Buy));
        assert_eq!(TradeSide::from_bitstamp_code(1), Some(TradeSide::Sell));
        assert_eq!(TradeSide::from_bitstamp_code(7), None);
    }

    #[test]
    fn test_trade_side_display() {
        assert_eq!(format!("{}", TradeSide::Buy), "BUY");
        assert_eq!(format!("{}", TradeSide::Sell), "SELL");
    }

    #[test]
    fn test_ticker_mid_price() {
        let ticker = Ticker {
            last: dec!(100.5),
            high: dec!(110),
            low: dec!(90),
            bid: dec!(100),
            ask: dec!(101),
            vwap: dec!(100.2),
            volume: dec!(1234.5),
            timestamp: Utc::now(),
        };
        assert_eq!(ticker.mid_price(), dec!(100.5));
    }

    #[test]
    fn test_order_response_constructors() {
        let ok = OrderResponse::accepted("42");
        assert_eq!(ok.id.as_deref(), Some("42"));
        assert!(ok.error.is_none());

        let rejected = OrderResponse::rejected("insufficient funds");
        assert!(rejected.id.is_none());
        assert_eq!(rejected.error.as_deref(), Some("insufficient funds"));
    }
}
