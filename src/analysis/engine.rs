use crate::analysis::digits::{self, DigitCompare, DigitRank};
use crate::analysis::percent::{self, MatchDiff, OverUnder, Parity, RiseFall};
use crate::feed::{FeedError, FeedSubscription, Granularity, QuoteFeed};
use crate::models::{Candle, Tick};
use std::collections::{HashMap, VecDeque};

/// Answers indicator queries against the most recent ticks and candles of
/// the active symbol.
///
/// The engine owns the tick history outright: switching symbols tears the
/// old subscription down first, then replaces the history wholesale. All
/// indicator queries run over local history and never fail; feed failures
/// (market closed, disconnect) surface only from `watch_symbol` and
/// `refresh_candles`, where the caller can poll past them.
pub struct TickAnalysisEngine<F: QuoteFeed> {
    feed: F,
    symbol: Option<String>,
    subscription: Option<FeedSubscription>,
    history: VecDeque<Tick>,
    candles: HashMap<Granularity, Vec<Candle>>,
    max_history: usize,
}

impl<F: QuoteFeed> TickAnalysisEngine<F> {
    pub fn new(feed: F, max_history: usize) -> Self {
        Self {
            feed,
            symbol: None,
            subscription: None,
            history: VecDeque::new(),
            candles: HashMap::new(),
            max_history,
        }
    }

    /// Switch the engine to `symbol`.
    ///
    /// No-op when already watching it. Otherwise the previous subscription
    /// is stopped before the new one is requested (never concurrent), the
    /// history is replaced from a fresh request, and the candle cache is
    /// dropped. Exactly one subscription is live at any time.
    pub async fn watch_symbol(&mut self, symbol: &str) -> Result<(), FeedError> {
        if self.symbol.as_deref() == Some(symbol) {
            return Ok(());
        }

        if let (Some(old_symbol), Some(sub)) = (self.symbol.take(), self.subscription.take()) {
            // Best-effort teardown; the feed owns cleanup from here
            self.feed.stop_monitor(&old_symbol, &sub.key).await;
        }
        self.history.clear();
        self.candles.clear();

        let seed = self.feed.ticks(symbol, self.max_history).await?;
        self.history = seed.into_iter().collect();
        self.truncate_history();

        let sub = self.feed.monitor(symbol).await?;
        tracing::debug!(symbol, key = %sub.key.0, "watching symbol");

        self.subscription = Some(sub);
        self.symbol = Some(symbol.to_string());
        Ok(())
    }

    /// Drain ticks pushed since the last call into the history
    pub fn sync(&mut self) {
        if let Some(sub) = self.subscription.as_mut() {
            while let Ok(tick) = sub.ticks.try_recv() {
                self.history.push_back(tick);
            }
        }
        self.truncate_history();
    }

    /// Fetch and cache candles for `granularity`
    pub async fn refresh_candles(
        &mut self,
        granularity: Granularity,
        count: usize,
    ) -> Result<(), FeedError> {
        let symbol = self
            .symbol
            .clone()
            .ok_or_else(|| FeedError::UnknownSymbol(String::new()))?;
        let candles = self.feed.candles(&symbol, granularity, count).await?;
        self.candles.insert(granularity, candles);
        Ok(())
    }

    /// Decimal precision of the active symbol
    pub fn pip_size(&self) -> u32 {
        self.symbol
            .as_deref()
            .map(|s| self.feed.pip_size(s))
            .unwrap_or(2)
    }

    pub fn symbol(&self) -> Option<&str> {
        self.symbol.as_deref()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Last digits of the most recent `n` ticks, oldest first. Shorter
    /// histories yield whatever exists.
    pub fn last_digits(&self, n: usize) -> Vec<u8> {
        let pip = self.pip_size();
        self.history
            .iter()
            .rev()
            .take(n)
            .rev()
            .map(|t| digits::last_digit(t.quote, pip))
            .collect()
    }

    fn last_quotes(&self, n: usize) -> Vec<f64> {
        self.history
            .iter()
            .rev()
            .take(n)
            .rev()
            .map(|t| t.quote)
            .collect()
    }

    /// True when ALL of the last `n` ticks' digits satisfy `op` against
    /// `digit`. Vacuously true when history is shorter than `n` or empty.
    pub fn last_digits_condition(&self, n: usize, op: DigitCompare, digit: u8) -> bool {
        digits::all_digits_satisfy(&self.last_digits(n), op, digit)
    }

    /// Most- or least-frequent last digit over the last `n` ticks
    pub fn digit_frequency(&self, rank: DigitRank, n: usize) -> u8 {
        digits::digit_frequency(&self.last_digits(n), rank)
    }

    pub fn even_odd_percent(&self, parity: Parity, n: usize) -> u32 {
        percent::parity_percent(&self.last_digits(n), parity)
    }

    pub fn over_under_percent(&self, dir: OverUnder, digit: u8, n: usize) -> u32 {
        percent::over_under_percent(&self.last_digits(n), dir, digit)
    }

    pub fn match_diff_percent(&self, mode: MatchDiff, digit: u8, n: usize) -> u32 {
        percent::match_diff_percent(&self.last_digits(n), mode, digit)
    }

    /// Rise/fall percentage over consecutive tick pairs
    pub fn rise_fall_percent(&self, dir: RiseFall, n: usize) -> u32 {
        percent::rise_fall_percent(&self.last_quotes(n), dir)
    }

    /// Rise/fall percentage over cached candles for `granularity`; 0 until
    /// `refresh_candles` has populated that cache
    pub fn candle_rise_fall_percent(&self, dir: RiseFall, granularity: Granularity) -> u32 {
        self.candles
            .get(&granularity)
            .map(|c| percent::candle_rise_fall_percent(c, dir))
            .unwrap_or(0)
    }

    fn truncate_history(&mut self) {
        while self.history.len() > self.max_history {
            self.history.pop_front();
        }
    }
}
