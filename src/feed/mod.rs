// Quote feed adapter: the contract the analysis engine consumes, plus a
// deterministic simulator used by tests and the demo binary.
pub mod sim;

pub use sim::SimulatedFeed;

use crate::models::{Candle, Tick};
use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

/// Candle granularity in seconds
pub type Granularity = u32;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FeedError {
    /// Sentinel for "market closed" - callers poll past this instead of
    /// treating it as fatal.
    #[error("market is presently closed")]
    MarketClosed,
    #[error("unknown symbol: {0}")]
    UnknownSymbol(String),
    #[error("feed disconnected")]
    Disconnected,
}

/// Opaque handle identifying one live subscription on the feed side
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubscriptionKey(pub String);

/// A live tick stream: the push-callback primitive rendered as a channel
pub struct FeedSubscription {
    pub key: SubscriptionKey,
    pub ticks: mpsc::UnboundedReceiver<Tick>,
}

#[async_trait]
pub trait QuoteFeed: Send + Sync {
    /// Start streaming ticks for `symbol`
    async fn monitor(&self, symbol: &str) -> Result<FeedSubscription, FeedError>;

    /// Tear down a previous subscription. Best-effort: failures are the
    /// feed's problem, callers never wait on confirmation.
    async fn stop_monitor(&self, symbol: &str, key: &SubscriptionKey);

    /// Recent tick history, oldest first
    async fn ticks(&self, symbol: &str, count: usize) -> Result<Vec<Tick>, FeedError>;

    /// Recent candle history at `granularity` seconds, oldest first
    async fn candles(
        &self,
        symbol: &str,
        granularity: Granularity,
        count: usize,
    ) -> Result<Vec<Candle>, FeedError>;

    /// Decimal precision used to format quotes for `symbol`
    fn pip_size(&self, symbol: &str) -> u32;
}
