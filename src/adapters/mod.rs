//! Adapters Layer - Hexagonal Architecture Outer Ring
//!
//! Implements the port traits defined in `crate::ports` with concrete
//! external dependencies (HTTP client, Prometheus, tracing).
//!
//! Adapter categories:
//! - `bitstamp`: the `Trader` implementation (retry, normalization, precision)
//! - `api`: Bitstamp REST client implementing `ExchangeApi`
//! - `metrics`: event sinks, Prometheus export and health checks

pub mod api;
pub mod bitstamp;
pub mod metrics;
