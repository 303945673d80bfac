//! OKX perpetual swap price limits.

use fuji_core::{Price, Ticker};
use serde_json::Value;

use super::{invalid_response, price_value, HttpSource};
use crate::error::FeedResult;
use crate::feed::{BoxFuture, PriceFeed};

const BASE_URL: &str = "https://www.okx.com";

/// `GET /api/v5/public/price-limit?instId=...`, priced at
/// `min(buyLmt, sellLmt)` of `data[0]`.
#[derive(Debug)]
pub struct OkxFeed {
    http: HttpSource,
    base_url: String,
}

impl OkxFeed {
    pub fn new(http: HttpSource) -> Self {
        Self::with_base_url(http, BASE_URL)
    }

    pub fn with_base_url(http: HttpSource, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    fn inst_id(ticker: Ticker) -> &'static str {
        match ticker {
            Ticker::BtcUsd => "BTC-USDT-SWAP",
            Ticker::EthUsd => "ETH-USDT-SWAP",
        }
    }

    fn url(&self, ticker: Ticker) -> String {
        format!(
            "{}/api/v5/public/price-limit?instId={}",
            self.base_url,
            Self::inst_id(ticker)
        )
    }

    pub(crate) fn parse(body: &Value, url: &str, ticker: Ticker) -> FeedResult<Price> {
        let entry = body
            .get("data")
            .and_then(|d| d.get(0))
            .ok_or_else(|| invalid_response(url, ticker, "missing data[0]"))?;

        let buy = price_value(entry.get("buyLmt"), "buyLmt", url, ticker)?;
        let sell = price_value(entry.get("sellLmt"), "sellLmt", url, ticker)?;
        Ok(buy.min(sell))
    }
}

impl PriceFeed for OkxFeed {
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
