//! Bitstamp Trader - Entry Point
//!
//! Wires the REST client, the adapter and the trade poller, then runs
//! until SIGINT.
//!
//! Wiring sequence:
//! 1. Load config.toml + env credentials, validate
//! 2. Init tracing (JSON structured logging)
//! 3. Create BitstampRestClient (implements ExchangeApi)
//! 4. Create MetricsRegistry (implements AdapterEvents)
//! 5. Create BitstampTrader (implements Trader)
//! 6. Startup snapshot: ticker, fee, portfolio
//! 7. Spawn metrics server, health server and trade poller
//! 8. Wait for SIGINT, then graceful shutdown

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::signal;
use tokio::sync::broadcast;
use tracing::{error, info, warn};

use bitstamp_trader::adapters::api::BitstampRestClient;
use bitstamp_trader::adapters::bitstamp::BitstampTrader;
use bitstamp_trader::adapters::metrics::{HealthServer, HealthState, MetricsRegistry};
use bitstamp_trader::config::{self, AppConfig};
use bitstamp_trader::ports::events::AdapterEvents;
use bitstamp_trader::ports::trader::Trader;
use bitstamp_trader::usecases::TradePoller;

#[tokio::main]
async fn main() -> Result<()> {
    // ── 1. Load configuration from config.toml ──────────────
    let config_path =
        std::env::args().nth(1).unwrap_or_else(|| "config.toml".to_string());
    let config = config::loader::load_config(&config_path)
        .context("Failed to load configuration")?;

    // ── 2. Initialize structured JSON logging ───────────────
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| {
                    tracing_subscriber::EnvFilter::new(&config.app.log_level)
                }),
        )
        .json()
        .init();

    info!(
        name = %config.app.name,
        version = env!("CARGO_PKG_VERSION"),
        base_url = %config.exchange.base_url,
        "Starting Bitstamp trader"
    );

    // ── 3. Shutdown signal channel ──────────────────────────
    let (shutdown_tx, _shutdown_rx) = broadcast::channel::<()>(1);

    // ── 4. REST client (ExchangeApi port) ───────────────────
    let client = Arc::new(
        BitstampRestClient::new(config.credentials(), config.client_config())
            .context("Failed to create Bitstamp client")?,
    );

    // ── 5. Metrics registry doubles as the event sink ───────
    let metrics = Arc::new(
        MetricsRegistry::new().context("Failed to create metrics registry")?,
    );
    let events: Arc<dyn AdapterEvents> = metrics.clone();

    // ── 6. Trader adapter ───────────────────────────────────
    let trader = Arc::new(BitstampTrader::with_settings(
        Arc::clone(&client),
        events,
        config.trader_settings(),
    ));

    let health = Arc::new(HealthState::new());
    log_startup_snapshot(trader.as_ref(), client.is_authenticated(), &health).await;

    // ── 7. Spawn servers and poller ─────────────────────────
    let mut handles = Vec::new();

    if config.metrics.enabled {
        let metrics_shutdown = shutdown_tx.subscribe();
        let metrics_ref = Arc::clone(&metrics);
        let bind_address = config.metrics.bind_address.clone();
        handles.push(tokio::spawn(async move {
            if let Err(e) = metrics_ref.serve(bind_address, metrics_shutdown).await {
                error!(error = %e, "Metrics server failed");
            }
        }));
    }

    let health_shutdown = shutdown_tx.subscribe();
    let health_server = HealthServer::new(Arc::clone(&health), config.metrics.health_port);
    handles.push(tokio::spawn(async move {
        if let Err(e) = health_server.run(health_shutdown).await {
            error!(error = %e, "Health server failed");
        }
    }));

    handles.extend(spawn_trade_poller(
        &config,
        Arc::clone(&trader),
        Arc::clone(&metrics),
        Arc::clone(&health),
        &shutdown_tx,
    ));

    info!("All tasks spawned, trader is running");

    // ── 8. Wait for SIGINT ──────────────────────────────────
    signal::ctrl_c().await.context("Failed to listen for SIGINT")?;
    info!("SIGINT received, initiating graceful shutdown");

    let _ = shutdown_tx.send(());
    health.set_poller_running(false);

    for handle in handles {
        if tokio::time::timeout(Duration::from_secs(5), handle).await.is_err() {
            warn!("Task did not stop within 5s");
        }
    }

    info!("Shutdown complete");
    Ok(())
}

/// Log what the exchange reports at startup.
///
/// Failures are logged but not fatal: the poller keeps retrying and the
/// readiness endpoint reflects reachability.
async fn log_startup_snapshot<T: Trader>(
    trader: &T,
    authenticated: bool,
    health: &HealthState,
) {
    match trader.get_ticker().await {
        Ok(ticker) => {
            health.set_exchange_reachable(true);
            info!(
                last = %ticker.last,
                bid = %ticker.bid,
                ask = %ticker.ask,
                mid = %ticker.mid_price(),
                "Ticker"
            );
        }
        Err(e) => warn!(error = %e, "Ticker unavailable"),
    }

    if !authenticated {
        return;
    }

    match trader.get_fee().await {
        Ok(fee) => info!(fee = %fee, "Account fee"),
        Err(e) => warn!(error = %e, "Fee unavailable"),
    }

    match trader.get_portfolio().await {
        Ok(portfolio) => {
            for entry in &portfolio {
                info!(asset = %entry.name, amount = %entry.amount, "Portfolio");
            }
        }
        Err(e) => warn!(error = %e, "Portfolio unavailable"),
    }
}

/// Spawn the poller and a consumer that feeds trades into metrics.
///
/// The consumer also mirrors the outcome of each poll into the
/// readiness flag for the exchange.
fn spawn_trade_poller<T: Trader>(
    config: &AppConfig,
    trader: Arc<T>,
    metrics: Arc<MetricsRegistry>,
    health: Arc<HealthState>,
    shutdown_tx: &broadcast::Sender<()>,
) -> Vec<tokio::task::JoinHandle<()>> {
    let mut poller = TradePoller::new(
        trader,
        Duration::from_secs(config.poller.interval_seconds),
        config.poller.channel_capacity,
    );
    let mut trades_rx = poller.subscribe();
    let mut poll_health_rx = poller.health();

    let poller_shutdown = shutdown_tx.subscribe();
    let poller_health = Arc::clone(&health);
    let poller_handle = tokio::spawn(async move {
        poller_health.set_poller_running(true);
        if let Err(e) = poller.run(poller_shutdown).await {
            error!(error = %e, "Trade poller failed");
        }
        poller_health.set_poller_running(false);
    });

    let mut consumer_shutdown = shutdown_tx.subscribe();
    let consumer_handle = tokio::spawn(async move {
        loop {
            tokio::select! {
                biased;
                _ = consumer_shutdown.recv() => break,
                changed = poll_health_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let reachable = *poll_health_rx.borrow_and_update();
                    health.set_exchange_reachable(reachable);
                }
                received = trades_rx.recv() => match received {
                    Ok(trade) => {
                        metrics.record_trades(std::slice::from_ref(&trade));
                        info!(
                            tid = trade.tid,
                            price = %trade.price,
                            amount = %trade.amount,
                            "Trade"
                        );
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Trade consumer lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                },
            }
        }
    });

    vec![poller_handle, consumer_handle]
}
