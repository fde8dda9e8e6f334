//! Trade Poller - Incremental Trade Feed
//!
//! Turns the window-based `get_trades` query into a gap-free stream:
//! each poll asks for trades since the newest one already delivered,
//! drops the overlap, and broadcasts the rest oldest-first.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tokio::sync::{broadcast, watch};
use tracing::{debug, info, instrument, warn};

use crate::domain::trade::{Trade, TradesQuery};
use crate::ports::trader::Trader;

/// How far before the cursor each query starts.
///
/// Trade timestamps have whole-second resolution and the exchange window
/// is rounded to the nearest second, so a query starting exactly at the
/// cursor can miss later trades sharing the cursor's second. The overlap
/// is removed again by tid.
const CURSOR_OVERLAP: chrono::Duration = chrono::Duration::seconds(1);

/// Position of the newest trade already delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
  /// Timestamp of the newest delivered trade.
  pub timestamp: DateTime<Utc>,
  /// Its trade id; anything at or below is a duplicate.
  pub last_tid: u64,
}

/// Polls a `Trader` for new trades and broadcasts them.
pub struct TradePoller<T: Trader> {
  /// Trading port.
  trader: Arc<T>,
  /// Delay between two polls.
  interval: Duration,
  /// Newest trade delivered so far.
  cursor: Option<Cursor>,
  /// Fan-out of new trades.
  trades_tx: broadcast::Sender<Trade>,
  /// Outcome of the latest poll: `true` when it succeeded.
  healthy_tx: watch::Sender<bool>,
}

impl<T: Trader> TradePoller<T> {
  /// Create a poller starting from the trader's default lookback.
  pub fn new(trader: Arc<T>, interval: Duration, channel_capacity: usize) -> Self {
    let (trades_tx, _) = broadcast::channel(channel_capacity.max(1));
    let (healthy_tx, _) = watch::channel(false);
    Self {
      trader,
      interval,
      cursor: None,
      trades_tx,
      healthy_tx,
    }
  }

  /// Subscribe to new trades.
  pub fn subscribe(&self) -> broadcast::Receiver<Trade> {
    self.trades_tx.subscribe()
  }

  /// Watch the outcome of the latest poll.
  pub fn health(&self) -> watch::Receiver<bool> {
    self.healthy_tx.subscribe()
  }

  pub fn cursor(&self) -> Option<Cursor> {
    self.cursor
  }

  /// Fetch trades newer than the cursor, oldest-first, and advance it.
  #[instrument(skip(self), fields(exchange = self.trader.name()))]
  pub async fn poll_once(&mut self) -> Result<Vec<Trade>> {
    let query = TradesQuery::ascending_since(query_start(self.cursor));
    let trades = self
      .trader
      .get_trades(query.since, query.descending)
      .await
      .context("Failed to fetch trades")?;

    let fresh = dedupe_after(trades, self.cursor);

    if let Some(newest) = fresh.last() {
      self.cursor = Some(Cursor {
        timestamp: newest.timestamp,
        last_tid: newest.tid,
      });
    }

    debug!(new_trades = fresh.len(), "Poll complete");
    Ok(fresh)
  }

  /// Poll until shutdown, broadcasting every new trade.
  ///
  /// A poll in progress (including its retries) is abandoned when the
  /// shutdown signal arrives.
  #[instrument(skip(self, shutdown_rx))]
  pub async fn run(&mut self, mut shutdown_rx: broadcast::Receiver<()>) -> Result<()> {
    info!(
      exchange = self.trader.name(),
      interval_s = self.interval.as_secs(),
      "Trade poller started"
    );

    loop {
      tokio::select! {
        biased;
        _ = shutdown_rx.recv() => {
          info!("Trade poller shutting down");
          return Ok(());
        }
        polled = self.poll_once() => {
          match polled {
            Ok(trades) => {
              self.healthy_tx.send_replace(true);
              self.publish(trades);
            }
            Err(e) => {
              self.healthy_tx.send_replace(false);
              warn!(error = %e, "Trade poll failed");
            }
          }
        }
      }

      tokio::select! {
        biased;
        _ = shutdown_rx.recv() => {
          info!("Trade poller shutting down");
          return Ok(());
        }
        _ = tokio::time::sleep(self.interval) => {}
      }
    }
  }

  fn publish(&self, trades: Vec<Trade>) {
    for trade in trades {
      if self.trades_tx.send(trade).is_err() {
        debug!("No trade subscribers, trade dropped");
      }
    }
  }
}

/// Lower bound of the next query.
fn query_start(cursor: Option<Cursor>) -> Option<DateTime<Utc>> {
  cursor.map(|c| c.timestamp - CURSOR_OVERLAP)
}

/// Keep only trades strictly newer than `cursor`, preserving order.
fn dedupe_after(trades: Vec<Trade>, cursor: Option<Cursor>) -> Vec<Trade> {
  match cursor {
    Some(c) => trades.into_iter().filter(|t| t.tid > c.last_tid).collect(),
    None => trades,
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use rust_decimal_macros::dec;

  fn trade(tid: u64, secs: i64) -> Trade {
    Trade {
      tid,
      timestamp: DateTime::from_timestamp(secs, 0).unwrap(),
      price: dec!(800),
      amount: dec!(0.1),
      side: None,
    }
  }

  #[test]
  fn test_query_starts_before_cursor_second() {
    assert_eq!(query_start(None), None);

    let cursor = Cursor {
      timestamp: DateTime::from_timestamp(101, 0).unwrap(),
      last_tid: 2,
    };
    assert_eq!(query_start(Some(cursor)), DateTime::from_timestamp(100, 0));
  }

  #[test]
  fn test_window_from_query_start_covers_cursor_second() {
    use crate::domain::window::window_seconds;

    // Worst case for rounding: 0.4 s past the second following the cursor.
    let cursor = Cursor {
      timestamp: DateTime::from_timestamp(100, 0).unwrap(),
      last_tid: 1,
    };
    let now = DateTime::from_timestamp(110, 400_000_000).unwrap();
    let window = window_seconds(query_start(Some(cursor)), now, 600);
    let window_start = now - chrono::Duration::seconds(window as i64);
    assert!(window_start <= cursor.timestamp, "window starts at {window_start}");
  }

  #[test]
  fn test_dedupe_without_cursor_keeps_everything() {
    let trades = vec![trade(1, 100), trade(2, 101)];
    assert_eq!(dedupe_after(trades.clone(), None), trades);
  }

  #[test]
  fn test_dedupe_drops_already_delivered() {
    let cursor = Cursor {
      timestamp: DateTime::from_timestamp(101, 0).unwrap(),
      last_tid: 2,
    };
    let trades = vec![trade(2, 101), trade(3, 101), trade(4, 105)];
    let fresh = dedupe_after(trades, Some(cursor));
    let tids: Vec<u64> = fresh.iter().map(|t| t.tid).collect();
    assert_eq!(tids, vec![3, 4]);
  }
}
