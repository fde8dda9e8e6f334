//! Domain layer - Core business logic and models.
//!
//! Pure rules of the Bitstamp adapter: trade-window translation, balance
//! normalization, amount precision and retry decisions.
//! No I/O here (hexagonal architecture inner ring).

pub mod error;
pub mod portfolio;
pub mod precision;
pub mod retry;
pub mod trade;
pub mod window;

// Re-export core types for convenience
pub use error::{AdapterError, ExchangeError};
pub use precision::PrecisionPolicy;
pub use retry::RetryPolicy;
pub use trade::{
    OpenOrder, OrderId, OrderResponse, PortfolioEntry, Ticker, Trade, TradeSide,
    TradesQuery,
};
