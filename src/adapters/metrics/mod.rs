//! Metrics and Monitoring Adapters
//!
//! Provides the `AdapterEvents` sinks (tracing, Prometheus), the
//! Prometheus `/metrics` endpoint and health check endpoints
//! (/live, /ready) via axum 0.7.

pub mod health;
pub mod prometheus;
pub mod tracing_events;

pub use health::{HealthServer, HealthState, Readiness};
pub use prometheus::MetricsRegistry;
pub use tracing_events::TracingEvents;
