//! Binance 24h ticker.

use fuji_core::{Price, Ticker};
use serde_json::Value;

use super::{price_value, HttpSource};
use crate::error::FeedResult;
use crate::feed::{BoxFuture, PriceFeed};

const BASE_URL: &str = "https://data.binance.com";

/// `GET /api/v3/ticker/24hr?symbol=...`, priced at `min(bidPrice, askPrice)`.
#[derive(Debug)]
pub struct BinanceFeed {
    http: HttpSource,
    base_url: String,
}

impl BinanceFeed {
    pub fn new(http: HttpSource) -> Self {
        Self::with_base_url(http, BASE_URL)
    }

    pub fn with_base_url(http: HttpSource, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    // Binance quotes against USDT
    fn symbol(ticker: Ticker) -> &'static str {
        match ticker {
            Ticker::BtcUsd => "BTCUSDT",
            Ticker::EthUsd => "ETHUSDT",
        }
    }

    fn url(&self, ticker: Ticker) -> String {
        format!(
            "{}/api/v3/ticker/24hr?symbol={}",
            self.base_url,
            Self::symbol(ticker)
        )
    }

    pub(crate) fn parse(body: &Value, url: &str, ticker: Ticker) -> FeedResult<Price> {
        let bid = price_value(body.get("bidPrice"), "bidPrice", url, ticker)?;
        let ask = price_value(body.get("askPrice"), "askPrice", url, ticker)?;
        Ok(bid.min(ask))
    }
}

impl PriceFeed for BinanceFeed {
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
