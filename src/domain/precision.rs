//! Order amount precision policy.
//!
//! Bitstamp rejects order amounts carrying more than 8 decimal places
//! ("Ensure that there are no more than 8 digits in total"). Buy orders also
//! keep back a fee reserve so that amount plus fee fits the quote balance.
//!
//! Amounts are floored, never rounded: a submitted amount must not exceed
//! what the caller asked for.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

/// Share of a buy amount submitted after reserving for fees.
pub const DEFAULT_FEE_RESERVE: Decimal = dec!(0.995);

/// Fractional digits accepted by the exchange for order amounts.
pub const DEFAULT_AMOUNT_DECIMALS: u32 = 8;

/// Exchange-specific amount precision rules applied before order submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrecisionPolicy {
    /// Multiplier applied to buy amounts (0.995 keeps 0.5% for fees).
    fee_reserve: Decimal,
    /// Maximum fractional digits of a submitted amount.
    amount_decimals: u32,
    /// Whether sell amounts are floored to `amount_decimals` as well.
    truncate_sells: bool,
}

impl Default for PrecisionPolicy {
    fn default() -> Self {
        Self::bitstamp()
    }
}

impl PrecisionPolicy {
    /// Creates a policy with custom parameters.
    pub fn new(fee_reserve: Decimal, amount_decimals: u32, truncate_sells: bool) -> Self {
        Self {
            fee_reserve,
            amount_decimals,
            truncate_sells,
        }
    }

    /// Bitstamp rules: 0.5% fee reserve on buys, 8 decimal places.
    pub fn bitstamp() -> Self {
        Self {
            fee_reserve: DEFAULT_FEE_RESERVE,
            amount_decimals: DEFAULT_AMOUNT_DECIMALS,
            truncate_sells: true,
        }
    }

    pub fn fee_reserve(&self) -> Decimal {
        self.fee_reserve
    }

    pub fn amount_decimals(&self) -> u32 {
        self.amount_decimals
    }

    /// Floors `amount` to the configured number of fractional digits.
    ///
    /// Equivalent to `floor(amount * 10^d) / 10^d`.
    pub fn truncate(&self, amount: Decimal) -> Decimal {
        amount.round_dp_with_strategy(
            self.amount_decimals,
            RoundingStrategy::ToNegativeInfinity,
        )
    }

    /// Amount actually submitted for a buy of `amount`.
    pub fn buy_amount(&self, amount: Decimal) -> Decimal {
        self.truncate(amount.saturating_mul(self.fee_reserve))
    }

    /// Amount actually submitted for a sell of `amount`.
    ///
    /// No fee reserve: selling base currency does not draw the fee from
    /// the sold amount.
    pub fn sell_amount(&self, amount: Decimal) -> Decimal {
        if self.truncate_sells {
            self.truncate(amount)
        } else {
            amount
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buy_amount_reserves_fee() {
        let policy = PrecisionPolicy::bitstamp();
        assert_eq!(policy.buy_amount(dec!(1.0)), dec!(0.995));
        assert_eq!(policy.buy_amount(dec!(2)), dec!(1.99));
    }

    #[test]
    fn test_buy_amount_floors_to_eight_decimals() {
        let policy = PrecisionPolicy::bitstamp();
        // 0.123456789 * 0.995 = 0.122839505055
        assert_eq!(policy.buy_amount(dec!(0.123456789)), dec!(0.12283950));
    }

    #[test]
    fn test_truncate_never_rounds_up() {
        let policy = PrecisionPolicy::bitstamp();
        assert_eq!(policy.truncate(dec!(0.999999999)), dec!(0.99999999));
        assert_eq!(policy.truncate(dec!(1.5)), dec!(1.5));
    }

    #[test]
    fn test_sell_amount_has_no_fee_reserve() {
        let policy = PrecisionPolicy::bitstamp();
        assert_eq!(policy.sell_amount(dec!(1.0)), dec!(1.0));
        assert_eq!(policy.sell_amount(dec!(0.123456789)), dec!(0.12345678));
    }

    #[test]
    fn test_sell_amount_untouched_when_truncation_disabled() {
        let policy = PrecisionPolicy::new(DEFAULT_FEE_RESERVE, 8, false);
        assert_eq!(policy.sell_amount(dec!(0.123456789)), dec!(0.123456789));
    }

    #[test]
    fn test_custom_decimals() {
        let policy = PrecisionPolicy::new(Decimal::ONE, 2, true);
        assert_eq!(policy.buy_amount(dec!(3.14159)), dec!(3.14));
    }
}
