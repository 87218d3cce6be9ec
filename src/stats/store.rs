use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Running totals for one brokerage account.
///
/// Invariant: `total_wins + total_losses <= total_runs` - a run is counted
/// when the purchase goes out, wins/losses only once it settles.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccountStat {
    pub total_profit: Decimal,
    pub total_wins: u64,
    pub total_losses: u64,
    pub total_stake: Decimal,
    pub total_payout: Decimal,
    pub total_runs: u64,
}

/// Injected statistics store keyed by account id.
///
/// Records are created lazily on first reference and never deleted during
/// a session; `clear` replaces one account's record with a zeroed one.
pub trait StatStore: Send + Sync {
    fn get(&self, account_id: &str) -> AccountStat;
    fn update(&self, account_id: &str, apply: &mut dyn FnMut(&mut AccountStat));
    fn clear(&self, account_id: &str);
}

/// Thread-safe in-memory store
#[derive(Clone, Default)]
pub struct InMemoryStatStore {
    data: Arc<RwLock<HashMap<String, AccountStat>>>,
}

impl InMemoryStatStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Account ids with a record (for display layers)
    pub fn account_ids(&self) -> Vec<String> {
        self.data.read().unwrap().keys().cloned().collect()
    }
}

impl StatStore for InMemoryStatStore {
    fn get(&self, account_id: &str) -> AccountStat {
        self.data
            .read()
            .unwrap()
            .get(account_id)
            .cloned()
            .unwrap_or_default()
    }

    fn update(&self, account_id: &str, apply: &mut dyn FnMut(&mut AccountStat)) {
        let mut data = self.data.write().unwrap();
        let stat = data.entry(account_id.to_string()).or_default();
        apply(stat);
    }

    fn clear(&self, account_id: &str) {
        let mut data = self.data.write().unwrap();
        data.insert(account_id.to_string(), AccountStat::default());
    }
}
