//! Use Cases Layer - Application Workflows
//!
//! Builds long-running workflows on top of the `Trader` port. Each use
//! case is generic over the port, so it runs unchanged against a mock.
//!
//! Use cases:
//! - `TradePoller`: incremental, duplicate-free trade feed
//! - `OrderTracker`: place orders and wait for them to close

pub mod order_tracker;
pub mod trade_poller;

pub use order_tracker::OrderTracker;
pub use trade_poller::{Cursor, TradePoller};
