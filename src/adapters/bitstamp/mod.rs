//! Bitstamp Exchange Adapter
//!
//! Sub-modules:
//! - `trader`: the `Trader` port implementation (retry, normalization,
//!   precision, order-presence checks)

pub mod trader;

pub use trader::{BitstampTrader, TraderSettings, EXCHANGE_NAME};
