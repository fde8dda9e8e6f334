//! Bitstamp API Request/Response Types
//!
//! Wire shapes of the Bitstamp v1 REST API. The API mixes JSON numbers
//! and numeric strings freely (ids are numbers, timestamps are strings,
//! amounts are strings), so ids and timestamps go through `NumOrStr`.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;

use crate::domain::error::ExchangeError;
use crate::domain::trade::{OpenOrder, OrderResponse, Ticker, Trade, TradeSide};

/// Integer the API sends either as a JSON number or a numeric string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum NumOrStr {
  Num(u64),
  Str(String),
}

impl NumOrStr {
  /// Textual form, used for opaque identifiers.
  pub fn into_string(self) -> String {
    match self {
      Self::Num(n) => n.to_string(),
      Self::Str(s) => s,
    }
  }

  /// Numeric form, used for timestamps and trade ids.
  pub fn as_u64(&self) -> Result<u64, ExchangeError> {
    match self {
      Self::Num(n) => Ok(*n),
      Self::Str(s) => s
        .trim()
        .parse()
        .map_err(|_| ExchangeError::Decode(format!("expected integer, got {s:?}"))),
    }
  }

  fn as_timestamp(&self) -> Result<DateTime<Utc>, ExchangeError> {
    let secs = self.as_u64()?;
    i64::try_from(secs)
      .ok()
      .and_then(|secs| DateTime::from_timestamp(secs, 0))
      .ok_or_else(|| ExchangeError::Decode(format!("timestamp out of range: {secs}")))
  }
}

/// One entry of `GET /api/transactions/`.
#[derive(Debug, Clone, Deserialize)]
pub struct RawTransaction {
  /// Unix seconds.
  pub date: NumOrStr,
  /// Transaction id.
  pub tid: NumOrStr,
  /// Price as a decimal string.
  pub price: Decimal,
  /// Amount as a decimal string.
  pub amount: Decimal,
  /// 0 = buy, 1 = sell.
  #[serde(rename = "type")]
  pub kind: Option<u8>,
}

impl TryFrom<RawTransaction> for Trade {
  type Error = ExchangeError;

  fn try_from(raw: RawTransaction) -> Result<Self, Self::Error> {
    Ok(Trade {
      tid: raw.tid.as_u64()?,
      timestamp: raw.date.as_timestamp()?,
      price: raw.price,
      amount: raw.amount,
      side: raw.kind.and_then(TradeSide::from_bitstamp_code),
    })
  }
}

/// Response of `GET /api/ticker/`.
#[derive(Debug, Clone, Deserialize)]
pub struct RawTicker {
  pub last: Decimal,
  pub high: Decimal,
  pub low: Decimal,
  pub bid: Decimal,
  pub ask: Decimal,
  pub vwap: Decimal,
  pub volume: Decimal,
  pub timestamp: NumOrStr,
}

impl TryFrom<RawTicker> for Ticker {
  type Error = ExchangeError;

  fn try_from(raw: RawTicker) -> Result<Self, Self::Error> {
    Ok(Ticker {
      last: raw.last,
      high: raw.high,
      low: raw.low,
      bid: raw.bid,
      ask: raw.ask,
      vwap: raw.vwap,
      volume: raw.volume,
      timestamp: raw.timestamp.as_timestamp()?,
    })
  }
}

/// Response of `POST /api/buy/` and `POST /api/sell/`.
///
/// On refusal the API still answers 200 with an `error` member, either a
/// string or an object of field errors.
#[derive(Debug, Clone, Deserialize)]
pub struct RawOrderAck {
  pub id: Option<NumOrStr>,
  pub error: Option<Value>,
}

impl From<RawOrderAck> for OrderResponse {
  fn from(raw: RawOrderAck) -> Self {
    OrderResponse {
      id: raw.id.map(NumOrStr::into_string),
      error: raw.error.map(|e| match e {
        Value::String(s) => s,
        other => other.to_string(),
      }),
    }
  }
}

/// One entry of `POST /api/open_orders/`.
#[derive(Debug, Clone, Deserialize)]
pub struct RawOpenOrder {
  pub id: NumOrStr,
}

impl From<RawOpenOrder> for OpenOrder {
  fn from(raw: RawOpenOrder) -> Self {
    OpenOrder {
      id: raw.id.into_string(),
    }
  }
}

/// Flatten `POST /api/balance/` into the string map the adapter expects.
pub fn balance_to_strings(raw: HashMap<String, Value>) -> HashMap<String, String> {
  raw
    .into_iter()
    .map(|(key, value)| {
      let text = match value {
        Value::String(s) => s,
        other => other.to_string(),
      };
      (key, text)
    })
    .collect()
}

/// Interpret the body of `POST /api/cancel_order/`.
///
/// `true`/`false` literally; an object carrying `error` counts as refused.
pub fn cancel_accepted(body: &Value) -> bool {
  match body {
    Value::Bool(accepted) => *accepted,
    Value::Object(map) => !map.contains_key("error"),
    Value::Null => false,
    _ => true,
  }
}
