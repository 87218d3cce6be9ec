use crate::feed::{FeedError, FeedSubscription, Granularity, QuoteFeed, SubscriptionKey};
use crate::models::{Candle, Tick};
use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

const MAX_HISTORY: usize = 5_000;
const TICK_INTERVAL_SECS: i64 = 2;

/// Deterministic random-walk quote feed.
///
/// Implements the same contract a live brokerage feed would, but generates
/// ticks from a seeded RNG so tests and demo runs are reproducible. Ticks
/// are produced by `advance` (random walk) or `push_tick` (exact values)
/// and broadcast to any live subscriptions.
#[derive(Clone)]
pub struct SimulatedFeed {
    inner: Arc<Mutex<Inner>>,
}

struct Inner {
    rng: StdRng,
    closed: bool,
    next_key: u64,
    symbols: HashMap<String, SymbolState>,
    stops: Vec<(String, SubscriptionKey)>,
}

struct SymbolState {
    pip_size: u32,
    price: f64,
    epoch: i64,
    history: VecDeque<Tick>,
    subscribers: HashMap<SubscriptionKey, mpsc::UnboundedSender<Tick>>,
}

impl SimulatedFeed {
    /// Create a feed with a seed for reproducibility
    pub fn new(seed: u64) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                rng: StdRng::seed_from_u64(seed),
                closed: false,
                next_key: 0,
                symbols: HashMap::new(),
                stops: Vec::new(),
            })),
        }
    }

    /// Register a symbol with its quote precision and starting price
    pub fn add_symbol(&self, symbol: &str, pip_size: u32, start_price: f64) {
        let mut inner = self.inner.lock().unwrap();
        inner.symbols.insert(
            symbol.to_string(),
            SymbolState {
                pip_size,
                price: start_price,
                epoch: 1_700_000_000,
                history: VecDeque::new(),
                subscribers: HashMap::new(),
            },
        );
    }

    /// Toggle the market-closed sentinel
    pub fn set_closed(&self, closed: bool) {
        self.inner.lock().unwrap().closed = closed;
    }

    /// Emit one tick with an exact quote value
    pub fn push_tick(&self, symbol: &str, quote: f64) {
        let mut inner = self.inner.lock().unwrap();
        if let Some(state) = inner.symbols.get_mut(symbol) {
            state.price = quote;
            state.emit(quote);
        }
    }

    /// Emit `n` random-walk ticks for `symbol`
    pub fn advance(&self, symbol: &str, n: usize) {
        let mut inner = self.inner.lock().unwrap();
        let Inner { rng, symbols, .. } = &mut *inner;
        if let Some(state) = symbols.get_mut(symbol) {
            for _ in 0..n {
                let drift: f64 = rng.gen_range(-0.002..0.002);
                let scale = 10f64.powi(state.pip_size as i32);
                let next = ((state.price * (1.0 + drift)) * scale).round() / scale;
                state.price = next.max(1.0 / scale);
                let quote = state.price;
                state.emit(quote);
            }
        }
    }

    /// Teardown calls observed so far, in order (for tests)
    pub fn stop_calls(&self) -> Vec<(String, SubscriptionKey)> {
        self.inner.lock().unwrap().stops.clone()
    }

    /// Number of live subscriptions for `symbol` (for tests)
    pub fn subscriber_count(&self, symbol: &str) -> usize {
        self.inner
            .lock()
            .unwrap()
            .symbols
            .get(symbol)
            .map(|s| s.subscribers.len())
            .unwrap_or(0)
    }
}

impl SymbolState {
    fn emit(&mut self, quote: f64) {
        self.epoch += TICK_INTERVAL_SECS;
        let tick = Tick {
            quote,
            epoch: self.epoch,
        };

        self.history.push_back(tick);
        while self.history.len() > MAX_HISTORY {
            self.history.pop_front();
        }

        // Drop subscribers whose receiver has gone away
        self.subscribers.retain(|_, tx| tx.send(tick).is_ok());
    }
}

#[async_trait]
impl QuoteFeed for SimulatedFeed {
    async fn monitor(&self, symbol: &str) -> Result<FeedSubscription, FeedError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.closed {
            return Err(FeedError::MarketClosed);
        }

        inner.next_key += 1;
        let key = SubscriptionKey(format!("sub-{}", inner.next_key));

        let state = inner
            .symbols
            .get_mut(symbol)
            .ok_or_else(|| FeedError::UnknownSymbol(symbol.to_string()))?;

        let (tx, rx) = mpsc::unbounded_channel();
        state.subscribers.insert(key.clone(), tx);

        Ok(FeedSubscription { key, ticks: rx })
    }

    async fn stop_monitor(&self, symbol: &str, key: &SubscriptionKey) {
        let mut inner = self.inner.lock().unwrap();
        if let Some(state) = inner.symbols.get_mut(symbol) {
            state.subscribers.remove(key);
        }
        inner.stops.push((symbol.to_string(), key.clone()));
    }

    async fn ticks(&self, symbol: &str, count: usize) -> Result<Vec<Tick>, FeedError> {
        let inner = self.inner.lock().unwrap();
        if inner.closed {
            return Err(FeedError::MarketClosed);
        }

        let state = inner
            .symbols
            .get(symbol)
            .ok_or_else(|| FeedError::UnknownSymbol(symbol.to_string()))?;

        Ok(state
            .history
            .iter()
            .rev()
            .take(count)
            .rev()
            .copied()
            .collect())
    }

    async fn candles(
        &self,
        symbol: &str,
        granularity: Granularity,
        count: usize,
    ) -> Result<Vec<Candle>, FeedError> {
        let inner = self.inner.lock().unwrap();
        if inner.closed {
            return Err(FeedError::MarketClosed);
        }

        let state = inner
            .symbols
            .get(symbol)
            .ok_or_else(|| FeedError::UnknownSymbol(symbol.to_string()))?;

        let mut candles: Vec<Candle> = Vec::new();
        for tick in &state.history {
            let bucket = tick.epoch - tick.epoch.rem_euclid(granularity.max(1) as i64);
            match candles.last_mut() {
                Some(c) if c.epoch == bucket => {
                    c.high = c.high.max(tick.quote);
                    c.low = c.low.min(tick.quote);
                    c.close = tick.quote;
                }
                _ => candles.push(Candle {
                    open: tick.quote,
                    high: tick.quote,
                    low: tick.quote,
                    close: tick.quote,
                    epoch: bucket,
                }),
            }
        }

        let start = candles.len().saturating_sub(count);
        Ok(candles[start..].to_vec())
    }

    fn pip_size(&self, symbol: &str) -> u32 {
        self.inner
            .lock()
            .unwrap()
            .symbols
            .get(symbol)
            .map(|s| s.pip_size)
            .unwrap_or(2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_push_tick_reaches_subscriber() {
        let feed = SimulatedFeed::new(1);
        feed.add_symbol("VOL100", 2, 100.0);

        let mut sub = feed.monitor("VOL100").await.unwrap();
        feed.push_tick("VOL100", 101.25);

        let tick = sub.ticks.recv().await.unwrap();
        assert_eq!(tick.quote, 101.25);
    }

    #[tokio::test]
    async fn test_advance_is_deterministic() {
        let a = SimulatedFeed::new(42);
        a.add_symbol("VOL100", 2, 100.0);
        a.advance("VOL100", 10);

        let b = SimulatedFeed::new(42);
        b.add_symbol("VOL100", 2, 100.0);
        b.advance("VOL100", 10);

        assert_eq!(
            a.ticks("VOL100", 10).await.unwrap(),
            b.ticks("VOL100", 10).await.unwrap()
        );
    }

    #[tokio::test]
    async fn test_market_closed_sentinel() {
        let feed = SimulatedFeed::new(1);
        feed.add_symbol("VOL100", 2, 100.0);
        feed.set_closed(true);

        assert_eq!(
            feed.ticks("VOL100", 5).await,
            Err(FeedError::MarketClosed)
        );
        assert!(matches!(
            feed.monitor("VOL100").await,
            Err(FeedError::MarketClosed)
        ));
    }

    #[tokio::test]
    async fn test_unknown_symbol() {
        let feed = SimulatedFeed::new(1);
        let err = feed.ticks("NOPE", 5).await.unwrap_err();
        assert_eq!(err, FeedError::UnknownSymbol("NOPE".to_string()));
    }

    #[tokio::test]
    async fn test_stop_monitor_removes_subscriber() {
        let feed = SimulatedFeed::new(1);
        feed.add_symbol("VOL100", 2, 100.0);

        let sub = feed.monitor("VOL100").await.unwrap();
        assert_eq!(feed.subscriber_count("VOL100"), 1);

        feed.stop_monitor("VOL100", &sub.key).await;
        assert_eq!(feed.subscriber_count("VOL100"), 0);
        assert_eq!(feed.stop_calls().len(), 1);
    }

    #[tokio::test]
    async fn test_candles_bucket_by_granularity() {
        let feed = SimulatedFeed::new(1);
        feed.add_symbol("VOL100", 2, 100.0);

        // 10 ticks at 2s intervals cover at least two 10s buckets
        for i in 0..10 {
            feed.push_tick("VOL100", 100.0 + i as f64);
        }

        let candles = feed.candles("VOL100", 10, 10).await.unwrap();
        assert!(candles.len() >= 2);
        for candle in &candles {
            assert!(candle.high >= candle.low);
            assert_eq!(candle.epoch % 10, 0);
        }
    }
}
