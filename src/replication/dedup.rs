use std::collections::VecDeque;
use tokio::time::{Duration, Instant};

/// How long a trade key suppresses repeats
pub const DEDUP_TTL: Duration = Duration::from_secs(15);

/// Bounded size; oldest entries are evicted early under pressure
const MAX_KEYS: usize = 64;

/// Time-bounded set of recently seen trade keys.
///
/// Best-effort only: capped size and TTL make it a guard against the bot
/// re-emitting the same purchase event, not against network-level retries.
pub struct DedupWindow {
    ttl: Duration,
    keys: VecDeque<(String, Instant)>, // oldest first
}

impl DedupWindow {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            keys: VecDeque::new(),
        }
    }

    /// Returns true (and records the key) when the key is fresh; false
    /// when it was already seen within the TTL.
    ///
    /// Insertion happens here, before any submission, so two
    /// near-simultaneous events for the same key cannot both pass.
    pub fn check_and_insert(&mut self, key: &str) -> bool {
        self.purge_expired();

        if self.keys.iter().any(|(k, _)| k == key) {
            return false;
        }

        if self.keys.len() >= MAX_KEYS {
            self.keys.pop_front();
        }
        self.keys.push_back((key.to_string(), Instant::now()));
        true
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    fn purge_expired(&mut self) {
        let ttl = self.ttl;
        while let Some((_, inserted)) = self.keys.front() {
            if inserted.elapsed() >= ttl {
                self.keys.pop_front();
            } else {
                break;
            }
        }
    }
}

impl Default for DedupWindow {
    fn default() -> Self {
        Self::new(DEDUP_TTL)
    }
}
