//! Property-Based Tests - Domain Layer Invariants
//!
//! Uses `proptest` to verify window translation, amount precision and
//! balance normalization across random inputs.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use bitstamp_trader::domain::portfolio::portfolio_from_balance;
use bitstamp_trader::domain::precision::PrecisionPolicy;
use bitstamp_trader::domain::window::{window_seconds, DEFAULT_LOOKBACK_SECS};

fn now() -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000, 0).unwrap()
}

// ── Window Properties ───────────────────────────────────────

proptest! {
    /// The window is the elapsed time rounded to the nearest second.
    #[test]
    fn window_rounds_elapsed_time(ms in 0i64..10_000_000_000) {
        let since = now() - Duration::milliseconds(ms);
        let window = window_seconds(Some(since), now(), DEFAULT_LOOKBACK_SECS);
        let expected = ((ms as u64) + 500) / 1000;
        prop_assert_eq!(window, expected);
    }

    /// A reference time in the future never yields a negative window.
    #[test]
    fn window_clamps_future_since(ms in 1i64..10_000_000) {
        let since = now() + Duration::milliseconds(ms);
        prop_assert_eq!(window_seconds(Some(since), now(), 600), 0);
    }
}

// ── Precision Properties ────────────────────────────────────

proptest! {
    /// Buy amounts keep the fee reserve and at most 8 fractional digits.
    #[test]
    fn buy_amount_is_floored_below_reserve(
        mantissa in 0i64..1_000_000_000_000,
        scale in 0u32..12,
    ) {
        let policy = PrecisionPolicy::bitstamp();
        let amount = Decimal::new(mantissa, scale);
        let reserved = amount * dec!(0.995);
        let submitted = policy.buy_amount(amount);

        prop_assert!(submitted.normalize().scale() <= 8);
        prop_assert!(submitted <= reserved, "{submitted} > {reserved}");
        prop_assert!(reserved - submitted < dec!(0.00000001));
        prop_assert!(submitted >= Decimal::ZERO);
    }

    /// Sell amounts are floored without any fee reserve.
    #[test]
    fn sell_amount_is_floored_only(
        mantissa in 0i64..1_000_000_000_000,
        scale in 0u32..12,
    ) {
        let policy = PrecisionPolicy::bitstamp();
        let amount = Decimal::new(mantissa, scale);
        let submitted = policy.sell_amount(amount);

        prop_assert!(submitted.normalize().scale() <= 8);
        prop_assert!(submitted <= amount);
        prop_assert!(amount - submitted < dec!(0.00000001));
    }
}

// ── Portfolio Properties ────────────────────────────────────

proptest! {
    /// Only `*available*` keys survive, one entry each, sorted by asset.
    #[test]
    fn portfolio_keeps_available_keys_only(
        assets in proptest::collection::btree_set("[a-z]{3}", 1..8),
        cents in 0u32..10_000_000,
    ) {
        let mut raw = HashMap::new();
        for asset in &assets {
            raw.insert(format!("{asset}_available"), format!("{}.{:02}", cents / 100, cents % 100));
            raw.insert(format!("{asset}_reserved"), "1.00".to_string());
            raw.insert(format!("{asset}_balance"), "2.00".to_string());
        }
        raw.insert("fee".to_string(), "0.25".to_string());

        let portfolio = portfolio_from_balance(&raw).unwrap();

        prop_assert_eq!(portfolio.len(), assets.len());
        let names: Vec<String> = portfolio.iter().map(|e| e.name.clone()).collect();
        let expected: Vec<String> = assets.iter().map(|a| a.to_uppercase()).collect();
        prop_assert_eq!(names, expected);
        for entry in &portfolio {
            prop_assert_eq!(entry.amount, Decimal::new(cents as i64, 2));
        }
    }
}
