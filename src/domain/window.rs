//! Trade-history window translation.
//!
//! Bitstamp does not accept an absolute start time for its transactions
//! endpoint. It asks for a `timedelta`: the number of seconds to look back
//! from the moment the request is served.

use chrono::{DateTime, Utc};

/// Lookback used when the caller does not bound the query.
pub const DEFAULT_LOOKBACK_SECS: u64 = 600;

/// Whole seconds between `since` and `now`, rounded to the nearest second.
///
/// Returns `default_lookback` when `since` is absent. A `since` in the
/// future yields zero rather than a negative window.
pub fn window_seconds(
    since: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    default_lookback: u64,
) -> u64 {
    let Some(since) = since else {
        return default_lookback;
    };

    let delta_ms = (now - since).num_milliseconds();
    if delta_ms <= 0 {
        return 0;
    }

    // Half-up rounding on millisecond resolution.
    ((delta_ms as u64) + 500) / 1000
}
