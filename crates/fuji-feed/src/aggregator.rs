//! Median aggregation over a pool of price feeds.
//!
//! Every round queries all active feeds concurrently. Successful answers are
//! reduced to their median; feeds that failed are moved to quarantine and
//! stay out of every round until their ban expires.
//!
//! Pool and quarantine live in one struct behind a single mutex. The lock is
//! taken twice per round (snapshot, then apply failures) and never across an
//! `.await`, so concurrent rounds see a consistent pool.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use fuji_core::{Clock, Price, SystemClock, Ticker};
use futures_util::future::join_all;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use tracing::{debug, info, trace};

use crate::error::{FeedError, FeedResult};
use crate::feed::DynPriceFeed;

/// Default time a failing feed stays out of the pool.
pub const DEFAULT_BAN_DURATION: Duration = Duration::from_millis(60_000);

/// Callback invoked once per feed failure that led to a quarantine.
pub type ErrorObserver = Arc<dyn Fn(&FeedFailure) + Send + Sync>;

/// A single feed failure reported to the error observer.
#[derive(Debug)]
pub struct FeedFailure {
    pub feed: String,
    pub ticker: Ticker,
    pub error: FeedError,
}

/// Median of `prices`, sorting the slice in place.
///
/// Odd count: the middle element. Even count: the arithmetic mean of the two
/// middle elements. `None` for an empty slice.
pub fn median(prices: &mut [Price]) -> Option<Price> {
    if prices.is_empty() {
        return None;
    }
    prices.sort_unstable();
    let mid = prices.len() / 2;
    if prices.len() % 2 == 1 {
        Some(prices[mid])
    } else {
        Some(Price::new(midpoint(prices[mid - 1].inner(), prices[mid].inner())))
    }
}

/// Mean of `lo <= hi` without overflowing near `Decimal::MAX`.
fn midpoint(lo: Decimal, hi: Decimal) -> Decimal {
    match lo.checked_add(hi) {
        Some(sum) => sum / Decimal::TWO,
        // Same sign on both sides, so the spread cannot overflow.
        None => lo + (hi - lo) / Decimal::TWO,
    }
}

#[derive(Clone)]
struct FeedEntry {
    id: usize,
    feed: DynPriceFeed,
}

struct QuarantineEntry {
    entry: FeedEntry,
    free_at_ms: u64,
}

#[derive(Default)]
struct PoolState {
    active: Vec<FeedEntry>,
    quarantined: Vec<QuarantineEntry>,
}

impl PoolState {
    /// Move every feed whose ban has expired back to the active pool.
    fn release_expired(&mut self, now_ms: u64) {
        if self.quarantined.is_empty() {
            return;
        }
        let (released, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.quarantined)
            .into_iter()
            .partition(|q| now_ms >= q.free_at_ms);
        self.quarantined = kept;
        for q in released {
            info!(feed = q.entry.feed.name(), "Feed released from quarantine");
            self.active.push(q.entry);
        }
    }
}

/// Fault-tolerant median aggregator.
pub struct Aggregator {
    state: Mutex<PoolState>,
    ban_duration: Duration,
    clock: Arc<dyn Clock>,
    on_feed_error: Option<ErrorObserver>,
}

impl Aggregator {
    /// Aggregator over `feeds` with default ban duration and system clock.
    pub fn new(feeds: impl IntoIterator<Item = DynPriceFeed>) -> Self {
        Self::builder().feeds(feeds).build()
    }

    pub fn builder() -> AggregatorBuilder {
        AggregatorBuilder::default()
    }

    /// Fetch `ticker` from every active feed and return the median.
    ///
    /// # Errors
    /// - [`FeedError::NoSourceAvailable`] if the active pool is empty (no
    ///   feed is called).
    /// - [`FeedError::NoPriceForTicker`] if every queried feed failed.
    pub async fn get_price(&self, ticker: Ticker) -> FeedResult<Price> {
        let round = {
            let now_ms = self.clock.now_ms();
            let mut state = self.state.lock();
            state.release_expired(now_ms);
            state.active.clone()
        };

        if round.is_empty() {
            debug!(%ticker, "No active feeds");
            return Err(FeedError::NoSourceAvailable);
        }

        let handles: Vec<_> = round
            .iter()
            .map(|entry| {
                let feed = Arc::clone(&entry.feed);
                tokio::spawn(async move { feed.fetch_price(ticker).await })
            })
            .collect();
        let results = join_all(handles).await;

        let mut prices = Vec::with_capacity(round.len());
        let mut failures = Vec::new();
        for (entry, result) in round.into_iter().zip(results) {
            let outcome = match result {
                Ok(Ok(price)) if price.is_positive() => Ok(price),
                Ok(Ok(price)) => Err(FeedError::NonPositivePrice {
                    feed: entry.feed.name().to_string(),
                    price,
                }),
                Ok(Err(e)) => Err(e),
                Err(join_err) => Err(FeedError::TaskFailed(join_err.to_string())),
            };
            match outcome {
                Ok(price) => {
                    trace!(feed = entry.feed.name(), %ticker, %price, "Feed price");
                    prices.push(price);
                }
                Err(error) => failures.push((entry, error)),
            }
        }

        if !failures.is_empty() {
            let reported = self.quarantine(ticker, failures);
            if let Some(observer) = &self.on_feed_error {
                for failure in &reported {
                    observer(failure);
                }
            }
        }

        let price = median(&mut prices).ok_or(FeedError::NoPriceForTicker(ticker))?;
        debug!(%ticker, %price, sources = prices.len(), "Aggregated price");
        Ok(price)
    }

    /// Apply a round's failures in one critical section.
    ///
    /// Only feeds still in the active pool are moved; a feed already
    /// quarantined by a concurrent round is skipped and not reported again.
    fn quarantine(&self, ticker: Ticker, failures: Vec<(FeedEntry, FeedError)>) -> Vec<FeedFailure> {
        let free_at_ms = self
            .clock
            .now_ms()
            .saturating_add(u64::try_from(self.ban_duration.as_millis()).unwrap_or(u64::MAX));

        let mut reported = Vec::with_capacity(failures.len());
        let mut state = self.state.lock();
        for (entry, error) in failures {
            let name = entry.feed.name().to_string();
            let Some(pos) = state.active.iter().position(|e| e.id == entry.id) else {
                debug!(feed = %name, %error, "Feed already quarantined by a concurrent round");
                continue;
            };
            let entry = state.active.remove(pos);
            state.quarantined.push(QuarantineEntry { entry, free_at_ms });
            info!(feed = %name, %ticker, free_at_ms, "Feed quarantined");
            reported.push(FeedFailure {
                feed: name,
                ticker,
                error,
            });
        }
        reported
    }

    /// Names of the feeds currently in the active pool.
    pub fn active_feeds(&self) -> Vec<String> {
        self.state
            .lock()
            .active
            .iter()
            .map(|e| e.feed.name().to_string())
            .collect()
    }

    /// Names of the feeds currently quarantined.
    pub fn quarantined_feeds(&self) -> Vec<String> {
        self.state
            .lock()
            .quarantined
            .iter()
            .map(|q| q.entry.feed.name().to_string())
            .collect()
    }

    /// Total number of feeds, active or quarantined.
    pub fn feed_count(&self) -> usize {
        let state = self.state.lock();
        state.active.len() + state.quarantined.len()
    }

    pub fn ban_duration(&self) -> Duration {
        self.ban_duration
    }
}

impl fmt::Debug for Aggregator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Aggregator")
            .field("active", &self.active_feeds())
            .field("quarantined", &self.quarantined_feeds())
            .field("ban_duration", &self.ban_duration)
            .finish()
    }
}

/// Builder for [`Aggregator`].
pub struct AggregatorBuilder {
    feeds: Vec<DynPriceFeed>,
    ban_duration: Duration,
    clock: Arc<dyn Clock>,
    on_feed_error: Option<ErrorObserver>,
}

impl Default for AggregatorBuilder {
    fn default() -> Self {
        Self {
            feeds: Vec::new(),
            ban_duration: DEFAULT_BAN_DURATION,
            clock: Arc::new(SystemClock),
            on_feed_error: None,
        }
    }
}

impl AggregatorBuilder {
    #[must_use]
    pub fn feed(mut self, feed: DynPriceFeed) -> Self {
        self.feeds.push(feed);
        self
    }

    #[must_use]
    pub fn feeds(mut self, feeds: impl IntoIterator<Item = DynPriceFeed>) -> Self {
        self.feeds.extend(feeds);
        self
    }

    #[must_use]
    pub fn ban_duration(mut self, ban_duration: Duration) -> Self {
        self.ban_duration = ban_duration;
        self
    }

    #[must_use]
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Observer called once for every failure that quarantines a feed.
    #[must_use]
    pub fn on_feed_error(mut self, observer: impl Fn(&FeedFailure) + Send + Sync + 'static) -> Self {
        self.on_feed_error = Some(Arc::new(observer));
        self
    }

    pub fn build(self) -> Aggregator {
        let active = self
            .feeds
            .into_iter()
            .enumerate()
            .map(|(id, feed)| FeedEntry { id, feed })
            .collect();
        Aggregator {
            state: Mutex::new(PoolState {
                active,
                quarantined: Vec::new(),
            }),
            ban_duration: self.ban_duration,
            clock: self.clock,
            on_feed_error: self.on_feed_error,
        }
    }
}
