//! Balance normalization.
//!
//! Bitstamp's balance endpoint returns one flat string map per account:
//! `btc_available`, `btc_reserved`, `btc_balance`, `usd_available`, ...
//! plus the account's trading `fee` as a percentage.

use std::collections::HashMap;
use std::str::FromStr;

use rust_decimal::Decimal;

use super::error::AdapterError;
use super::trade::PortfolioEntry;

/// Marker contained in keys holding funds free for trading.
const AVAILABLE_MARKER: &str = "available";

/// Key holding the account fee percentage.
const FEE_KEY: &str = "fee";

/// Builds the portfolio from a raw balance map.
///
/// Only `*available*` keys are kept; the asset code is the first three
/// characters of the key, uppercased. Entries are sorted by asset code.
pub fn portfolio_from_balance(
    balance: &HashMap<String, String>,
) -> Result<Vec<PortfolioEntry>, AdapterError> {
    let mut portfolio = balance
        .iter()
        .filter(|(key, _)| key.contains(AVAILABLE_MARKER))
        .map(|(key, value)| {
            Ok(PortfolioEntry {
                name: key.chars().take(3).collect::<String>().to_uppercase(),
                amount: parse_amount(key, value)?,
            })
        })
        .collect::<Result<Vec<_>, AdapterError>>()?;

    portfolio.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(portfolio)
}

/// Account fee as a ratio (0..1) from the percentage in the balance map.
pub fn fee_ratio(balance: &HashMap<String, String>) -> Result<Decimal, AdapterError> {
    let raw = balance
        .get(FEE_KEY)
        .ok_or(AdapterError::MissingField(FEE_KEY))?;
    let percent = parse_amount(FEE_KEY, raw)?;
    Ok(percent / Decimal::ONE_HUNDRED)
}

fn parse_amount(key: &str, value: &str) -> Result<Decimal, AdapterError> {
    let invalid = || AdapterError::InvalidBalance {
        key: key.to_string(),
        value: value.to_string(),
    };

    let amount = Decimal::from_str(value.trim()).map_err(|_| invalid())?;
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(invalid());
    }
    Ok(amount.normalize())
}
