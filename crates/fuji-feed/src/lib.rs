//! Exchange price feeds and fault-tolerant aggregation.
//!
//! A [`PriceFeed`] returns one price for a ticker or fails. The
//! [`Aggregator`] queries every active feed concurrently, takes the median of
//! the successful answers and quarantines failing feeds for a fixed period.
//!
//! # Key Components
//!
//! - [`PriceFeed`]: single-method price capability, one implementation per venue
//! - [`Aggregator`]: median consensus + failing-source quarantine
//! - [`FeedSource`]: configurable selection of the built-in exchange clients
//! - [`RequestThrottle`]: per-client request pacing

pub mod aggregator;
pub mod error;
pub mod feed;
pub mod sources;
pub mod throttle;

pub use aggregator::{
    median, Aggregator, AggregatorBuilder, ErrorObserver, FeedFailure, DEFAULT_BAN_DURATION,
};
pub use error::{FeedError, FeedResult};
pub use feed::{BoxFuture, DynPriceFeed, MockFeed, MockResponse, PriceFeed};
pub use sources::{
    BinanceFeed, BitfinexFeed, CoingeckoFeed, FeedSource, KrakenFeed, OkxFeed,
    DEFAULT_REQUEST_TIMEOUT,
};
pub use throttle::RequestThrottle;
