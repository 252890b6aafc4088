//! Upstream price feed access
//!
//! Defines the fetch capability the store depends on, plus the HTTP
//! implementation against the real feed endpoint.

use crate::config::FeedConfig;
use crate::snapshot::PriceRecord;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum FeedError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("feed returned status {0}")]
    BadStatus(StatusCode),

    #[error("failed to decode feed response: {0}")]
    DecodeFailed(String),

    #[error("unparseable timestamp {value:?} for {symbol}: {source}")]
    InvalidTimestamp {
        symbol: String,
        value: String,
        source: chrono::ParseError,
    },
}

pub type Result<T> = std::result::Result<T, FeedError>;

/// Fetch capability injected into the price feed store.
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Fetch the current raw records from the upstream feed.
    async fn fetch_records(&self) -> Result<Vec<PriceRecord>>;
}

/// Wire format of one feed entry.
#[derive(Debug, Deserialize)]
struct RawPriceRecord {
    currency: String,
    date: String,
    price: f64,
}

impl RawPriceRecord {
    /// Parse the wire entry; a bad date fails the whole attempt rather
    /// than dropping the record silently.
    fn into_record(self) -> Result<PriceRecord> {
        let observed_at = DateTime::parse_from_rfc3339(&self.date)
            .map_err(|e| FeedError::InvalidTimestamp {
                symbol: self.currency.clone(),
                value: self.date.clone(),
                source: e,
            })?
            .with_timezone(&Utc);

        Ok(PriceRecord {
            symbol: self.currency,
            observed_at,
            price: self.price,
        })
    }
}

/// HTTP client for the upstream price feed
pub struct HttpPriceSource {
    endpoint: String,
    client: Client,
}

impl HttpPriceSource {
    /// Create a source from config (endpoint and request timeout).
    pub fn new(config: &FeedConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            endpoint: config.endpoint.clone(),
            client,
        })
    }
}

#[async_trait]
impl PriceSource for HttpPriceSource {
    async fn fetch_records(&self) -> Result<Vec<PriceRecord>> {
        debug!("Fetching prices from {}", self.endpoint);

        let response = self.client.get(&self.endpoint).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::BadStatus(status));
        }

        let raw: Vec<RawPriceRecord> = response
            .json()
            .await
            .map_err(|e| FeedError::DecodeFailed(e.to_string()))?;

        debug!("Fetched {} raw price records", raw.len());

        raw.into_iter().map(RawPriceRecord::into_record).collect()
    }
}
