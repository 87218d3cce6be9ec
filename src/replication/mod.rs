// Trade replication fan-out: one purchase event in, at most one
// multi-account buy request out.
pub mod dedup;
pub mod directory;
pub mod fanout;
pub mod trade_log;

pub use dedup::{DedupWindow, DEDUP_TTL};
pub use directory::{AccountClass, AccountDirectory, AccountRecord, InMemoryDirectory};
pub use fanout::{PurchaseEvent, PurchaseIntent, ReplicationReceipt, Replicator};
pub use trade_log::{TradeLog, TradeLogEntry};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Replication configuration snapshot. Providers hand out a fresh copy on
/// every attempt; nothing here is cached by the fan-out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplicationSettings {
    pub enabled: bool,
    pub stake_multiplier: f64,
    pub stake_cap: Option<f64>,
}

impl Default for ReplicationSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            stake_multiplier: 1.0,
            stake_cap: None,
        }
    }
}

/// Read-only configuration source consulted on every replication attempt
pub trait SettingsProvider: Send + Sync {
    fn replication_settings(&self) -> ReplicationSettings;

    /// Copy-trading session flag
    fn copy_trading_active(&self) -> bool;

    /// Demo-to-real mirroring session flag
    fn mirror_mode_active(&self) -> bool;

    /// Configured copier tokens (copy-trading mode targets)
    fn copier_tokens(&self) -> Vec<String>;
}

/// Human-readable outcome classes surfaced to the UI layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplicationStatus {
    Suppressed,
    Disabled,
    NoTargets,
    Copying,
    Success,
    Error,
}

impl ReplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReplicationStatus::Suppressed => "suppressed",
            ReplicationStatus::Disabled => "disabled",
            ReplicationStatus::NoTargets => "no-targets",
            ReplicationStatus::Copying => "copying",
            ReplicationStatus::Success => "success",
            ReplicationStatus::Error => "error",
        }
    }
}

/// One-way notification surface for the UI. The fan-out calls it after
/// every attempt and never blocks on it.
pub trait StatusSink: Send + Sync {
    fn notify(&self, status: ReplicationStatus, message: &str);
}

/// Default sink: route statuses to the log
pub struct TracingStatusSink;

impl StatusSink for TracingStatusSink {
    fn notify(&self, status: ReplicationStatus, message: &str) {
        tracing::info!(status = status.as_str(), "{message}");
    }
}

/// Terminal outcomes of a single purchase event. None of these are
/// retried internally; the next purchase event starts clean.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReplicationError {
    #[error("duplicate purchase suppressed")]
    Suppressed,
    #[error("replication disabled or no active mode")]
    Disabled,
    #[error("no master token available")]
    NoMasterToken,
    #[error("no replication targets")]
    NoTargets,
    #[error("venue rejected replication ({code}): {message}")]
    Venue { code: String, message: String },
    #[error("transport failure: {0}")]
    Transport(String),
}

impl ReplicationError {
    /// Status class shown for this outcome
    pub fn status(&self) -> ReplicationStatus {
        match self {
            ReplicationError::Suppressed => ReplicationStatus::Suppressed,
            ReplicationError::Disabled => ReplicationStatus::Disabled,
            ReplicationError::NoTargets => ReplicationStatus::NoTargets,
            ReplicationError::NoMasterToken
            | ReplicationError::Venue { .. }
            | ReplicationError::Transport(_) => ReplicationStatus::Error,
        }
    }
}
