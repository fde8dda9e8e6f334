//! Retry policy for transient exchange failures.
//!
//! The policy only decides; the adapter owns the loop and the sleeping.
//! Bitstamp's public endpoints hiccup often enough that the default is to
//! keep trying forever at a constant pace rather than to give up.

use std::time::Duration;

/// Constant delay between two attempts of a failed call.
pub const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_secs(10);

/// Fixed-interval retry policy with an optional attempt bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Delay between attempts. No backoff is applied.
    interval: Duration,
    /// Total attempts allowed, first one included. `None` = unbounded.
    max_attempts: Option<u32>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::unbounded(DEFAULT_RETRY_INTERVAL)
    }
}

impl RetryPolicy {
    /// Retries forever, waiting `interval` between attempts.
    pub fn unbounded(interval: Duration) -> Self {
        Self {
            interval,
            max_attempts: None,
        }
    }

    /// Gives up after `max_attempts` attempts in total.
    pub fn bounded(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            max_attempts: Some(max_attempts.max(1)),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn max_attempts(&self) -> Option<u32> {
        self.max_attempts
    }

    /// Delay before the next attempt once `attempts_made` attempts failed,
    /// or `None` when the budget is spent.
    pub fn next_delay(&self, attempts_made: u32) -> Option<Duration> {
        match self.max_attempts {
            Some(max) if attempts_made >= max => None,
            _ => Some(self.interval),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_unbounded_ten_seconds() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.interval(), Duration::from_secs(10));
        assert_eq!(policy.max_attempts(), None);
        assert_eq!(policy.next_delay(1_000_000), Some(Duration::from_secs(10)));
    }

    #[test]
    fn test_bounded_policy_stops() {
        let policy = RetryPolicy::bounded(Duration::from_secs(1), 3);
        assert_eq!(policy.next_delay(1), Some(Duration::from_secs(1)));
        assert_eq!(policy.next_delay(2), Some(Duration::from_secs(1)));
        assert_eq!(policy.next_delay(3), None);
    }

    #[test]
    fn test_bounded_policy_allows_at_least_one_attempt() {
        let policy = RetryPolicy::bounded(Duration::from_secs(1), 0);
        assert_eq!(policy.max_attempts(), Some(1));
        assert_eq!(policy.next_delay(1), None);
    }
}
