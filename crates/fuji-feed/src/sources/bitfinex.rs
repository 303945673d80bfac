//! Bitfinex public ticker.

use fuji_core::{Price, Ticker};
use serde_json::Value;

use super::{price_value, HttpSource};
use crate::error::FeedResult;
use crate::feed::{BoxFuture, PriceFeed};

const BASE_URL: &str = "https://api.bitfinex.com";

/// `GET /v1/pubticker/{symbol}`, priced at `last_price`.
#[derive(Debug)]
pub struct BitfinexFeed {
    http: HttpSource,
    base_url: String,
}

impl BitfinexFeed {
    pub fn new(http: HttpSource) -> Self {
        Self::with_base_url(http, BASE_URL)
    }

    pub fn with_base_url(http: HttpSource, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    fn symbol(ticker: Ticker) -> &'static str {
        match ticker {
            Ticker::BtcUsd => "btcusd",
            Ticker::EthUsd => "ethusd",
        }
    }

    fn url(&self, ticker: Ticker) -> String {
        format!("{}/v1/pubticker/{}", self.base_url, Self::symbol(ticker))
    }

    pub(crate) fn parse(body: &Value, url: &str, ticker: Ticker) -> FeedResult<Price> {
        price_value(body.get("last_price"), "last_price", url, ticker)
    }
}

impl PriceFeed for BitfinexFeed {
    fn name(&self) -> &str {
        self.http.name()
    }

    fn fetch_price(&self, ticker: Ticker) -> BoxFuture<'_, FeedResult<Price>> {
        Box::pin(async move {
            let url = self.url(ticker);
            let body = self.http.get_json(&url).await?;
            Self::parse(&body, &url, ticker)
        })
    }
}
