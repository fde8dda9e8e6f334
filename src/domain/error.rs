//! Error taxonomy of the exchange adapter.
//!
//! `ExchangeError` is what the remote client port reports.
//! `AdapterError` is what callers of the uniform trading surface see.

use thiserror::Error;

use super::trade::TradeSide;

/// Failure reported by the remote exchange client.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExchangeError {
    /// Network-level failure: connect, timeout, reset.
    #[error("transport error: {0}")]
    Transport(String),

    /// Non-success HTTP status returned by the exchange.
    #[error("exchange returned HTTP {status}: {body}")]
    Api { status: u16, body: String },

    /// Response body could not be decoded.
    #[error("failed to decode exchange response: {0}")]
    Decode(String),

    /// A private endpoint was called without account credentials.
    #[error("private endpoint requires account credentials")]
    Unauthenticated,
}

/// Failure surfaced by the adapter to its caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdapterError {
    /// The remote call itself failed and is not retried.
    #[error(transparent)]
    Remote(#[from] ExchangeError),

    /// The exchange acknowledged the request but refused the order.
    #[error("{side} order rejected by exchange: {reason}")]
    OrderRejected { side: TradeSide, reason: String },

    /// The exchange acknowledged the order without an id.
    #[error("{side} order acknowledged without an order id")]
    MissingOrderId { side: TradeSide },

    /// A required field is absent from the balance response.
    #[error("balance response has no `{0}` field")]
    MissingField(&'static str),

    /// A balance value is not a non-negative decimal.
    #[error("invalid balance value for `{key}`: {value:?}")]
    InvalidBalance { key: String, value: String },

    /// A bounded retry policy ran out of attempts.
    #[error("{operation} failed after {attempts} attempts: {last_error}")]
    RetriesExhausted {
        operation: &'static str,
        attempts: u32,
        last_error: String,
    },
}

impl AdapterError {
    /// Whether the failure concerns order placement.
    pub fn is_order_failure(&self) -> bool {
        matches!(
            self,
            Self::OrderRejected { .. } | Self::MissingOrderId { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_error_is_transparent() {
        let err = AdapterError::from(ExchangeError::Transport("connection reset".into()));
        assert_eq!(err.to_string(), "transport error: connection reset");
        assert!(!err.is_order_failure());
    }

    #[test]
    fn test_order_rejected_message() {
        let err = AdapterError::OrderRejected {
            side: TradeSide::Buy,
            reason: "insufficient funds".into(),
        };
        assert_eq!(
            err.to_string(),
            "BUY order rejected by exchange: insufficient funds"
        );
        assert!(err.is_order_failure());
    }
}
