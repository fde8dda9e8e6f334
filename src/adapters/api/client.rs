//! Bitstamp HTTP Client - REST Implementation of the Exchange Port
//!
//! Wraps reqwest for the Bitstamp v1 REST API. Public endpoints are
//! plain GETs; private endpoints are form POSTs carrying the account
//! credentials. Retrying is the adapter's job, not this client's.

use std::collections::HashMap;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use super::credentials::Credentials;
use super::types::{
  balance_to_strings, cancel_accepted, RawOpenOrder, RawOrderAck, RawTicker, RawTransaction,
};
use crate::domain::error::ExchangeError;
use crate::domain::trade::{OpenOrder, OrderResponse, Ticker, Trade};
use crate::ports::exchange_api::ExchangeApi;

/// Configuration for the Bitstamp HTTP client.
#[derive(Debug, Clone)]
pub struct BitstampClientConfig {
  /// Base URL for the REST API.
  pub base_url: String,
  /// Request timeout.
  pub timeout: Duration,
}

impl Default for BitstampClientConfig {
  fn default() -> Self {
    Self {
      base_url: "https://www.bitstamp.net".to_string(),
      timeout: Duration::from_secs(30),
    }
  }
}

/// REST client for one Bitstamp account.
pub struct BitstampRestClient {
  /// Underlying HTTP client.
  http: Client,
  /// Account credentials; `None` restricts the client to public endpoints.
  credentials: Option<Credentials>,
  /// Client configuration.
  config: BitstampClientConfig,
}

impl BitstampRestClient {
  /// Create a new Bitstamp client.
  pub fn new(credentials: Option<Credentials>, config: BitstampClientConfig) -> Result<Self> {
    let http = Client::builder()
      .timeout(config.timeout)
      .pool_max_idle_per_host(5)
      .build()
      .context("Failed to build HTTP client")?;

    if credentials.is_none() {
      warn!("No Bitstamp credentials configured, private endpoints disabled");
    }

    Ok(Self {
      http,
      credentials,
      config,
    })
  }

  /// Whether private endpoints are usable.
  pub fn is_authenticated(&self) -> bool {
    self.credentials.is_some()
  }

  fn url(&self, path: &str) -> String {
    format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
  }

  /// GET a public endpoint.
  async fn get_public<T: DeserializeOwned>(
    &self,
    path: &str,
    query: &[(&str, String)],
  ) -> Result<T, ExchangeError> {
    let request = self.http.get(self.url(path)).query(query);
    self.execute(request, path).await
  }

  /// POST a private endpoint with credentials prepended to `params`.
  async fn post_private<T: DeserializeOwned>(
    &self,
    path: &str,
    params: &[(&str, String)],
  ) -> Result<T, ExchangeError> {
    let creds = self
      .credentials
      .as_ref()
      .ok_or(ExchangeError::Unauthenticated)?;

    let mut form: Vec<(&str, &str)> = creds.form_fields().to_vec();
    form.extend(params.iter().map(|(k, v)| (*k, v.as_str())));

    let request = self.http.post(self.url(path)).form(&form);
    self.execute(request, path).await
  }

  /// Send a request and decode its JSON body.
  async fn execute<T: DeserializeOwned>(
    &self,
    request: RequestBuilder,
    path: &str,
  ) -> Result<T, ExchangeError> {
    let response = request
      .send()
      .await
      .map_err(|e| ExchangeError::Transport(e.to_string()))?;

    let status = response.status();
    let body = response
      .text()
      .await
      .map_err(|e| ExchangeError::Transport(e.to_string()))?;

    if !status.is_success() {
      return Err(ExchangeError::Api {
        status: status.as_u16(),
        body,
      });
    }

    debug!(path, status = %status, bytes = body.len(), "Bitstamp response");
    serde_json::from_str(&body).map_err(|e| ExchangeError::Decode(e.to_string()))
  }

  async fn submit_order(
    &self,
    path: &str,
    amount: Decimal,
    price: Decimal,
  ) -> Result<OrderResponse, ExchangeError> {
    let params = [("amount", amount.to_string()), ("price", price.to_string())];
    let ack: RawOrderAck = self.post_private(path, &params).await?;
    Ok(ack.into())
  }
}

#[async_trait]
impl ExchangeApi for BitstampRestClient {
  async fn transactions(&self, window_secs: u64) -> Result<Vec<Trade>, ExchangeError> {
    let raw: Vec<RawTransaction> = self
      .get_public("/api/transactions/", &[("timedelta", window_secs.to_string())])
      .await?;
    raw.into_iter().map(Trade::try_from).collect()
  }

  async fn balance(&self) -> Result<HashMap<String, String>, ExchangeError> {
    let raw: HashMap<String, Value> = self.post_private("/api/balance/", &[]).await?;
    Ok(balance_to_strings(raw))
  }

  async fn ticker(&self) -> Result<Ticker, ExchangeError> {
    let raw: RawTicker = self.get_public("/api/ticker/", &[]).await?;
    Ticker::try_from(raw)
  }

  async fn buy(&self, amount: Decimal, price: Decimal) -> Result<OrderResponse, ExchangeError> {
    self.submit_order("/api/buy/", amount, price).await
  }

  async fn sell(&self, amount: Decimal, price: Decimal) -> Result<OrderResponse, ExchangeError> {
    self.submit_order("/api/sell/", amount, price).await
  }

  async fn open_orders(&self) -> Result<Vec<OpenOrder>, ExchangeError> {
    let raw: Vec<RawOpenOrder> = self.post_private("/api/open_orders/", &[]).await?;
    Ok(raw.into_iter().map(OpenOrder::from).collect())
  }

  async fn cancel_order(&self, order_id: &str) -> Result<bool, ExchangeError> {
    let body: Value = self
      .post_private("/api/cancel_order/", &[("id", order_id.to_string())])
      .await?;
    Ok(cancel_accepted(&body))
  }
}
