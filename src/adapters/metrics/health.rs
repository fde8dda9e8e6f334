//! Health Endpoints - /live and /ready
//!
//! Readiness reports each component separately so an operator can tell a
//! stalled poller from an unreachable exchange.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{info, instrument};

/// Component flags shared between the binary's tasks and the endpoints.
///
/// Starts not ready: the exchange must answer once and the poller must
/// be running.
#[derive(Debug, Default)]
pub struct HealthState {
    exchange_reachable: AtomicBool,
    poller_running: AtomicBool,
}

/// Body of the readiness endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Readiness {
    pub ready: bool,
    pub exchange_reachable: bool,
    pub poller_running: bool,
}

impl HealthState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_exchange_reachable(&self, reachable: bool) {
        self.exchange_reachable.store(reachable, Ordering::Relaxed);
    }

    pub fn set_poller_running(&self, running: bool) {
        self.poller_running.store(running, Ordering::Relaxed);
    }

    pub fn readiness(&self) -> Readiness {
        let exchange_reachable = self.exchange_reachable.load(Ordering::Relaxed);
        let poller_running = self.poller_running.load(Ordering::Relaxed);
        Readiness {
            ready: exchange_reachable && poller_running,
            exchange_reachable,
            poller_running,
        }
    }
}

/// HTTP server for the health endpoints.
pub struct HealthServer {
    state: Arc<HealthState>,
    port: u16,
}

impl HealthServer {
    pub fn new(state: Arc<HealthState>, port: u16) -> Self {
        Self { state, port }
    }

    fn router(&self) -> Router {
        Router::new()
            .route("/live", get(|| async { StatusCode::OK }))
            .route("/ready", get(ready))
            .with_state(Arc::clone(&self.state))
    }

    /// Serve until the shutdown signal fires.
    #[instrument(skip(self, shutdown_rx), fields(port = self.port))]
    pub async fn run(self, mut shutdown_rx: broadcast::Receiver<()>) -> anyhow::Result<()> {
        let app = self.router();
        let listener = tokio::net::TcpListener::bind(("0.0.0.0", self.port)).await?;
        info!(port = self.port, "Health server listening");

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.recv().await;
            })
            .await?;
        Ok(())
    }
}

async fn ready(State(state): State<Arc<HealthState>>) -> (StatusCode, Json<Readiness>) {
    let readiness = state.readiness();
    let status = if readiness.ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(readiness))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ready_requires_both_components() {
        let state = HealthState::new();
        assert!(!state.readiness().ready);

        state.set_exchange_reachable(true);
        assert_eq!(
            state.readiness(),
            Readiness {
                ready: false,
                exchange_reachable: true,
                poller_running: false,
            }
        );

        state.set_poller_running(true);
        assert!(state.readiness().ready);

        // A failed poll clears reachability again.
        state.set_exchange_reachable(false);
        assert!(!state.readiness().ready);
    }

    #[tokio::test]
    async fn test_ready_handler_status() {
        let state = Arc::new(HealthState::new());
        let (status, Json(body)) = ready(State(Arc::clone(&state))).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(!body.ready);

        state.set_exchange_reachable(true);
        state.set_poller_running(true);
        let (status, _) = ready(State(state)).await;
        assert_eq!(status, StatusCode::OK);
    }
}
