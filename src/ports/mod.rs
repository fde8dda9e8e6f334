//! Ports Layer - Hexagonal Architecture Boundaries
//!
//! Defines the interfaces (traits) between the adapter core and the
//! outside world. Adapters implement these traits.
//!
//! Port categories:
//! - `ExchangeApi`: Remote Bitstamp API client (driven by the adapter)
//! - `Trader`: Uniform trading surface (consumed by a trading engine)
//! - `AdapterEvents`: Injected observability sink

pub mod events;
pub mod exchange_api;
pub mod trader;
