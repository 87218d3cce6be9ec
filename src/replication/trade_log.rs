use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::collections::VecDeque;
use uuid::Uuid;

const TRADE_LOG_CAPACITY: usize = 50;

/// One replication attempt as submitted (or failed), for diagnostics
#[derive(Debug, Clone, Serialize)]
pub struct TradeLogEntry {
    pub id: Uuid,
    pub account_id: String,
    pub payload: Value,
    pub time: DateTime<Utc>,
    pub error: Option<String>,
}

/// Ring buffer of the last 50 replication attempts.
///
/// Pure diagnostics: nothing reads it to make control decisions.
#[derive(Default)]
pub struct TradeLog {
    entries: VecDeque<TradeLogEntry>,
}

impl TradeLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, account_id: &str, payload: Value, error: Option<String>) {
        self.entries.push_back(TradeLogEntry {
            id: Uuid::new_v4(),
            account_id: account_id.to_string(),
            payload,
            time: Utc::now(),
            error,
        });
        while self.entries.len() > TRADE_LOG_CAPACITY {
            self.entries.pop_front();
        }
    }

    /// Entries newest first
    pub fn entries(&self) -> Vec<TradeLogEntry> {
        self.entries.iter().rev().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
