//! CoinGecko simple price.

use fuji_core::{Price, Ticker};
use serde_json::Value;

use super::{price_value, HttpSource};
use crate::error::FeedResult;
use crate::feed::{BoxFuture, PriceFeed};

const BASE_URL: &str = "https://api.coingecko.com";

/// `GET /api/v3/simple/price?ids=...&vs_currencies=usd`, priced at `{id}.usd`.
#[derive(Debug)]
pub struct CoingeckoFeed {
    http: HttpSource,
    base_url: String,
}

impl CoingeckoFeed {
    pub fn new(http: HttpSource) -> Self {
        Self::with_base_url(http, BASE_URL)
    }

    pub fn with_base_url(http: HttpSource, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    fn coin_id(ticker: Ticker) -> &'static str {
        match ticker {
            Ticker::BtcUsd => "bitcoin",
            Ticker::EthUsd => "ethereum",
        }
    }

    fn url(&self, ticker: Ticker) -> String {
        format!(
            "{}/api/v3/simple/price?ids={}&vs_currencies={}",
            self.base_url,
            Self::coin_id(ticker),
            ticker.quote_currency().to_lowercase()
        )
    }

    pub(crate) fn parse(body: &Value, url: &str, ticker: Ticker) -> FeedResult<Price> {
        let id = Self::coin_id(ticker);
        let vs = ticker.quote_currency().to_lowercase();
        let field = format!("{id}.{vs}");
        price_value(
            body.get(id).and_then(|coin| coin.get(vs.as_str())),
            &field,
            url,
            ticker,
        )
    }
}

impl PriceFeed for CoingeckoFeed {
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
    use rust_decimal_macros::dec;
    use serde_json::json;
    use std::time::Duration;

    #[test]
    fn test_parse_numeric_price() {
        let body = json!({"bitcoin": {"usd": 20095}});
        let price = CoingeckoFeed::parse(&body, "u", Ticker::BtcUsd).unwrap();
        assert_eq!(price, Price::new(dec!(20095)));

        let body = json!({"ethereum": {"usd": 3100.25}});
        let price = CoingeckoFeed::parse(&body, "u", Ticker::EthUsd).unwrap();
        assert_eq!(price, Price::new(dec!(3100.25)));
    }

    #[test]
    fn test_parse_missing_coin() {
        let body = json!({});
        let err = CoingeckoFeed::parse(&body, "u", Ticker::BtcUsd).unwrap_err();
        assert!(err.to_string().contains("bitcoin.usd"));
    }

    #[test]
    fn test_url() {
        let http = HttpSource::new("coingecko", Duration::from_secs(1), 1).unwrap();
        let feed = CoingeckoFeed::new(http);
        assert_eq!(
            feed.url(Ticker::BtcUsd),
            "https://api.coingecko.com/api/v3/simple/price?ids=bitcoin&vs_currencies=usd"
        );
    }
}
