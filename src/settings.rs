use crate::replication::{ReplicationSettings, SettingsProvider};
use crate::stats::TradeLimits;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::sync::{Arc, RwLock};

fn default_symbol() -> String {
    "VOL100".to_string()
}

fn default_multiplier() -> f64 {
    1.0
}

/// Bot configuration, loaded from `REPLIBOT_*` environment variables
/// (a `.env` file is honored via dotenvy in the binary).
#[derive(Debug, Clone, Deserialize)]
pub struct BotConfig {
    #[serde(default = "default_symbol")]
    pub symbol: String,
    #[serde(default)]
    pub max_trades: Option<u64>,
    #[serde(default)]
    pub max_loss: Option<Decimal>,
    #[serde(default)]
    pub replication_enabled: bool,
    #[serde(default = "default_multiplier")]
    pub stake_multiplier: f64,
    #[serde(default)]
    pub stake_cap: Option<f64>,
    /// Comma-separated copier tokens
    #[serde(default)]
    pub copier_tokens: Option<String>,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            symbol: default_symbol(),
            max_trades: None,
            max_loss: None,
            replication_enabled: false,
            stake_multiplier: default_multiplier(),
            stake_cap: None,
            copier_tokens: None,
        }
    }
}

impl BotConfig {
    pub fn from_env() -> crate::Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::Environment::with_prefix("REPLIBOT"))
            .build()?;
        Ok(cfg.try_deserialize()?)
    }

    pub fn limits(&self) -> TradeLimits {
        TradeLimits {
            max_trades: self.max_trades,
            max_loss: self.max_loss,
        }
    }

    pub fn replication(&self) -> ReplicationSettings {
        ReplicationSettings {
            enabled: self.replication_enabled,
            stake_multiplier: self.stake_multiplier,
            stake_cap: self.stake_cap,
        }
    }

    pub fn copier_token_list(&self) -> Vec<String> {
        self.copier_tokens
            .as_deref()
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }
}

struct SettingsState {
    replication: ReplicationSettings,
    copy_trading: bool,
    mirror: bool,
    copier_tokens: Vec<String>,
}

/// Mutable in-process settings source.
///
/// The UI layer flips these at runtime; the fan-out reads them fresh on
/// every attempt, so changes take effect immediately.
#[derive(Clone)]
pub struct StaticSettings {
    inner: Arc<RwLock<SettingsState>>,
}

impl StaticSettings {
    pub fn new(replication: ReplicationSettings) -> Self {
        Self {
            inner: Arc::new(RwLock::new(SettingsState {
                replication,
                copy_trading: false,
                mirror: false,
                copier_tokens: Vec::new(),
            })),
        }
    }

    pub fn from_config(config: &BotConfig) -> Self {
        let settings = Self::new(config.replication());
        settings.set_copier_tokens(config.copier_token_list());
        settings
    }

    pub fn set_replication(&self, replication: ReplicationSettings) {
        self.inner.write().unwrap().replication = replication;
    }

    pub fn set_copy_trading(&self, active: bool) {
        self.inner.write().unwrap().copy_trading = active;
    }

    pub fn set_mirror_mode(&self, active: bool) {
        self.inner.write().unwrap().mirror = active;
    }

    pub fn set_copier_tokens(&self, tokens: Vec<String>) {
        self.inner.write().unwrap().copier_tokens = tokens;
    }
}

impl SettingsProvider for StaticSettings {
    fn replication_settings(&self) -> ReplicationSettings {
        self.inner.read().unwrap().replication.clone()
    }

    fn copy_trading_active(&self) -> bool {
        self.inner.read().unwrap().copy_trading
    }

    fn mirror_mode_active(&self) -> bool {
        self.inner.read().unwrap().mirror
    }

    fn copier_tokens(&self) -> Vec<String> {
        self.inner.read().unwrap().copier_tokens.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_copier_token_list_splits_and_trims() {
        let config = BotConfig {
            copier_tokens: Some(" tok-a, tok-b ,,tok-c".to_string()),
            ..Default::default()
        };
        assert_eq!(config.copier_token_list(), vec!["tok-a", "tok-b", "tok-c"]);
    }

    #[test]
    fn test_defaults() {
        let config = BotConfig::default();
        assert_eq!(config.symbol, "VOL100");
        assert!(!config.replication_enabled);
        assert_eq!(config.stake_multiplier, 1.0);
        assert_eq!(config.limits(), TradeLimits::default());
    }

    #[test]
    fn test_settings_changes_visible_immediately() {
        let settings = StaticSettings::new(ReplicationSettings::default());
        assert!(!settings.copy_trading_active());

        settings.set_copy_trading(true);
        assert!(settings.copy_trading_active());

        settings.set_replication(ReplicationSettings {
            enabled: true,
            stake_multiplier: 2.0,
            stake_cap: Some(100.0),
        });
        assert!(settings.replication_settings().enabled);
        assert_eq!(settings.replication_settings().stake_cap, Some(100.0));
    }
}
