// Session statistics and risk guard
pub mod session;
pub mod store;

pub use session::{RiskError, SessionTracker, TradeLimits};
pub use store::{AccountStat, InMemoryStatStore, StatStore};
