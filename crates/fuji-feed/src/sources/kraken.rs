//! Kraken public ticker.
//!
//! Kraken keys its result by an internal pair name (`XXBTZUSD`) that differs
//! from the request pair (`XBTUSD`).

use fuji_core::{Price, Ticker};
use serde_json::Value;

use super::{invalid_response, price_value, HttpSource};
use crate::error::FeedResult;
use crate::feed::{BoxFuture, PriceFeed};

const BASE_URL: &str = "https://api.kraken.com";

/// `GET /0/public/Ticker?pair=...`, priced at `min(a[0], b[0])`.
#[derive(Debug)]
pub struct KrakenFeed {
    http: HttpSource,
    base_url: String,
}

impl KrakenFeed {
    pub fn new(http: HttpSource) -> Self {
        Self::with_base_url(http, BASE_URL)
    }

    pub fn with_base_url(http: HttpSource, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    /// (request pair, result key)
    fn pair(ticker: Ticker) -> (&'static str, &'static str) {
        match ticker {
            Ticker::BtcUsd => ("XBTUSD", "XXBTZUSD"),
            Ticker::EthUsd => ("ETHUSD", "XETHZUSD"),
        }
    }

    fn url(&self, ticker: Ticker) -> String {
        format!("{}/0/public/Ticker?pair={}", self.base_url, Self::pair(ticker).0)
    }

    pub(crate) fn parse(body: &Value, url: &str, ticker: Ticker) -> FeedResult<Price> {
        if let Some(errors) = body.get("error").and_then(Value::as_array) {
            if !errors.is_empty() {
                return Err(invalid_response(url, ticker, format!("kraken error: {errors:?}")));
            }
        }

        let key = Self::pair(ticker).1;
        let entry = body
            .get("result")
            .and_then(|r| r.get(key))
            .ok_or_else(|| invalid_response(url, ticker, format!("missing result.{key}")))?;

        let ask = price_value(entry.get("a").and_then(|a| a.get(0)), "a[0]", url, ticker)?;
        let bid = price_value(entry.get("b").and_then(|b| b.get(0)), "b[0]", url, ticker)?;
        Ok(ask.min(bid))
    }
}

impl PriceFeed for KrakenFeed {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FeedError;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn test_parse_ticker() {
        let body = json!({
            "error": [],
            "result": {
                "XXBTZUSD": {
                    "a": ["20096.10000", "1", "1.000"],
                    "b": ["20095.90000", "2", "2.000"],
                    "c": ["20096.00000", "0.01"]
                }
            }
        });
        let price = KrakenFeed::parse(&body, "u", Ticker::BtcUsd).unwrap();
        assert_eq!(price, Price::new(dec!(20095.9)));
    }

    #[test]
    fn test_parse_eth_uses_own_key() {
        let body = json!({
            "error": [],
            "result": {
                "XETHZUSD": {"a": ["3100.5", "1", "1"], "b": ["3100.4", "1", "1"]}
            }
        });
        let price = KrakenFeed::parse(&body, "u", Ticker::EthUsd).unwrap();
        assert_eq!(price, Price::new(dec!(3100.4)));

        // BTC key absent from an ETH body
        assert!(KrakenFeed::parse(&body, "u", Ticker::BtcUsd).is_err());
    }

    #[test]
    fn test_parse_api_error() {
        let body = json!({"error": ["EQuery:Unknown asset pair"]});
        let err = KrakenFeed::parse(&body, "u", Ticker::BtcUsd).unwrap_err();
        assert!(matches!(err, FeedError::InvalidResponse { .. }));
        assert!(err.to_string().contains("Unknown asset pair"));
    }
}
