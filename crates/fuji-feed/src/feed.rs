//! Price feed trait.
//!
//! Provides a trait-based abstraction over a single "fetch current price"
//! capability. This allows for:
//! - One implementation per exchange, selected at construction
//! - Mock feeds for aggregation and facade tests
//! - Per-feed timeouts and throttling at the feed boundary

use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use fuji_core::{Price, Ticker};
use parking_lot::Mutex;
use rust_decimal::Decimal;

use crate::error::{FeedError, FeedResult};

/// Boxed future for dyn-compatible async trait methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn std::future::Future<Output = T> + Send + 'a>>;

/// Source of a single current price per ticker.
pub trait PriceFeed: Send + Sync {
    /// Feed name used in logs and failure reports.
    fn name(&self) -> &str;

    /// Fetch the current price for `ticker`.
    fn fetch_price(&self, ticker: Ticker) -> BoxFuture<'_, FeedResult<Price>>;
}

/// Arc wrapper for PriceFeed trait objects.
pub type DynPriceFeed = Arc<dyn PriceFeed>;

/// Scripted outcome of a [`MockFeed`] call.
#[derive(Debug, Clone)]
pub enum MockResponse {
    Price(Price),
    Fail(String),
    Panic,
}

/// Mock price feed for testing.
#[derive(Debug)]
pub struct MockFeed {
    name: String,
    response: Mutex<MockResponse>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl MockFeed {
    /// Feed that always answers `price`.
    pub fn price(name: impl Into<String>, price: Decimal) -> Self {
        Self::new(name, MockResponse::Price(Price::new(price)))
    }

    /// Feed that always fails.
    pub fn failing(name: impl Into<String>) -> Self {
        Self::new(name, MockResponse::Fail("mock feed error".to_string()))
    }

    pub fn new(name: impl Into<String>, response: MockResponse) -> Self {
        Self {
            name: name.into(),
            response: Mutex::new(response),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Settle only after `delay`.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Change the outcome of subsequent calls.
    pub fn set_response(&self, response: MockResponse) {
        *self.response.lock() = response;
    }

    /// Number of `fetch_price` calls received.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl PriceFeed for MockFeed {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch_price(&self, _ticker: Ticker) -> BoxFuture<'_, FeedResult<Price>> {
        Box::pin(async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            let response = self.response.lock().clone();
            match response {
                MockResponse::Price(price) => Ok(price),
                MockResponse::Fail(reason) => Err(FeedError::HttpClient(reason)),
                MockResponse::Panic => panic!("mock feed {} panicked", self.name),
            }
        })
    }
}
