//! Bitstamp REST API Adapter
//!
//! Implements the `ExchangeApi` port over HTTP.
//!
//! Sub-modules:
//! - `client`: reqwest-based client for public and private endpoints
//! - `credentials`: account identifier/secret carried by private calls
//! - `types`: API response type definitions and conversions

pub mod client;
pub mod credentials;
pub mod types;

pub use client::{BitstampClientConfig, BitstampRestClient};
pub use credentials::Credentials;
