//! Built-in exchange price feeds.
//!
//! Every client is a thin REST poller: map the ticker to the venue symbol,
//! issue one GET through a shared [`HttpSource`] (timeout + throttle), pull
//! the price out of the JSON body. Parsing is split into pure functions so it
//! can be tested against captured responses.

mod binance;
mod bitfinex;
mod coingecko;
mod kraken;
mod okx;

pub use binance::BinanceFeed;
pub use bitfinex::BitfinexFeed;
pub use coingecko::CoingeckoFeed;
pub use kraken::KrakenFeed;
pub use okx::OkxFeed;

use std::sync::Arc;
use std::time::Duration;

use fuji_core::{Price, Ticker};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::{FeedError, FeedResult};
use crate::feed::DynPriceFeed;
use crate::throttle::RequestThrottle;

/// Default timeout for exchange requests.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Selectable exchange feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedSource {
    Bitfinex,
    Binance,
    Kraken,
    Okx,
    Coingecko,
}

impl FeedSource {
    pub const ALL: [FeedSource; 5] = [
        FeedSource::Bitfinex,
        FeedSource::Binance,
        FeedSource::Kraken,
        FeedSource::Okx,
        FeedSource::Coingecko,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Bitfinex => "bitfinex",
            Self::Binance => "binance",
            Self::Kraken => "kraken",
            Self::Okx => "okx",
            Self::Coingecko => "coingecko",
        }
    }

    /// Public rate limit the client paces itself to.
    pub fn requests_per_second(&self) -> u32 {
        match self {
            Self::Kraken | Self::Coingecko => 1,
            Self::Bitfinex | Self::Binance | Self::Okx => 5,
        }
    }

    /// Build the client against the venue's public endpoint.
    pub fn build(&self, timeout: Duration) -> FeedResult<DynPriceFeed> {
        let http = HttpSource::new(self.name(), timeout, self.requests_per_second())?;
        let feed: DynPriceFeed = match self {
            Self::Bitfinex => Arc::new(BitfinexFeed::new(http)),
            Self::Binance => Arc::new(BinanceFeed::new(http)),
            Self::Kraken => Arc::new(KrakenFeed::new(http)),
            Self::Okx => Arc::new(OkxFeed::new(http)),
            Self::Coingecko => Arc::new(CoingeckoFeed::new(http)),
        };
        Ok(feed)
    }
}

impl std::fmt::Display for FeedSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// HTTP plumbing shared by the exchange clients.
#[derive(Debug)]
pub struct HttpSource {
    name: &'static str,
    client: Client,
    throttle: RequestThrottle,
}

impl HttpSource {
    pub fn new(name: &'static str, timeout: Duration, requests_per_second: u32) -> FeedResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FeedError::HttpClient(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            name,
            client,
            throttle: RequestThrottle::per_second(requests_per_second),
        })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Throttled GET returning the JSON body.
    pub async fn get_json(&self, url: &str) -> FeedResult<Value> {
        self.throttle.acquire().await;
        debug!(feed = self.name, %url, "Fetching price");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FeedError::HttpClient(format!("({}) HTTP request failed: {e}", self.name)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FeedError::HttpClient(format!(
                "({}) HTTP {status}: {body}",
                self.name
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| FeedError::HttpClient(format!("({}) Failed to read response: {e}", self.name)))?;
        Ok(serde_json::from_str(&body)?)
    }
}

pub(crate) fn invalid_response(url: &str, ticker: Ticker, reason: impl Into<String>) -> FeedError {
    FeedError::InvalidResponse {
        url: url.to_string(),
        ticker,
        reason: reason.into(),
    }
}

/// Read a positive price from a JSON string or number.
pub(crate) fn price_value(value: Option<&Value>, field: &str, url: &str, ticker: Ticker) -> FeedResult<Price> {
    let raw = match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(other) => {
            return Err(invalid_response(url, ticker, format!("{field} is not a price: {other}")))
        }
        None => return Err(invalid_response(url, ticker, format!("missing {field}"))),
    };
    Price::parse_positive(&raw).map_err(|e| invalid_response(url, ticker, format!("{field}: {e}")))
}
