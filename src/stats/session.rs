use crate::models::SettledContract;
use crate::stats::store::StatStore;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Session stop conditions. Both must be configured for the guard to act;
/// a partial configuration is treated as "no limits".
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TradeLimits {
    pub max_trades: Option<u64>,
    pub max_loss: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RiskError {
    #[error("session limits reached ({runs} runs, {profit} profit)")]
    LimitsReached { runs: u64, profit: Decimal },
}

/// Display precision for an account currency
fn currency_decimals(currency: &str) -> u32 {
    match currency {
        "BTC" | "ETH" | "LTC" => 8,
        _ => 2,
    }
}

/// Turns settled-contract events into running totals and gates further
/// trading.
///
/// Session counters are scoped to the current login; per-account totals
/// live in the injected `StatStore`. The guard never invokes itself - the
/// decision loop must call `check_limits` before each purchase.
pub struct SessionTracker<S: StatStore> {
    store: S,
    session_runs: u64,
    session_profit: Decimal,
}

impl<S: StatStore> SessionTracker<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            session_runs: 0,
            session_profit: Decimal::ZERO,
        }
    }

    /// Fold one settlement into the per-account totals and the session
    /// counters. Returns the realized profit.
    ///
    /// Profit precedence: the contract's own `profit` field, else the
    /// first available of sell price / payout / bid price minus the buy
    /// price (missing values count as zero). Deliberately not
    /// deduplicated: feeding the same contract twice double-counts.
    pub fn record_settled_contract(
        &mut self,
        account_id: &str,
        contract: &SettledContract,
    ) -> Decimal {
        let stake = contract.buy_price.unwrap_or_default();
        let settle_value = contract
            .sell_price
            .or(contract.payout)
            .or(contract.bid_price)
            .unwrap_or_default();

        let profit = contract.profit.unwrap_or(settle_value - stake).round_dp_with_strategy(
            currency_decimals(&contract.currency),
            RoundingStrategy::MidpointAwayFromZero,
        );
        let won = profit > Decimal::ZERO;

        self.store.update(account_id, &mut |stat| {
            stat.total_profit += profit;
            stat.total_stake += stake;
            stat.total_payout += settle_value;
            if won {
                stat.total_wins += 1;
            } else {
                stat.total_losses += 1;
            }
        });
        self.session_profit += profit;

        tracing::debug!(
            account = account_id,
            %profit,
            won,
            session_profit = %self.session_profit,
            "recorded settled contract"
        );
        profit
    }

    /// Veto the next purchase once the session hit its configured limits.
    ///
    /// Boundaries are inclusive: exactly `max_trades` runs trips, exactly
    /// `-max_loss` session profit trips.
    pub fn check_limits(&self, limits: &TradeLimits) -> Result<(), RiskError> {
        match (limits.max_trades, limits.max_loss) {
            (Some(max_trades), Some(max_loss)) => {
                if self.session_runs >= max_trades || self.session_profit <= -max_loss {
                    Err(RiskError::LimitsReached {
                        runs: self.session_runs,
                        profit: self.session_profit,
                    })
                } else {
                    Ok(())
                }
            }
            _ => Ok(()),
        }
    }

    /// Zero the session counters and this account's stored record. Other
    /// accounts' records are untouched.
    pub fn clear_statistics(&mut self, account_id: &str) {
        self.session_runs = 0;
        self.session_profit = Decimal::ZERO;
        self.store.clear(account_id);
        tracing::info!(account = account_id, "statistics cleared");
    }

    /// Bump session and per-account run counters; returns the new
    /// per-account total (display counter, not a gating value).
    pub fn increment_and_get_total_runs(&mut self, account_id: &str) -> u64 {
        self.session_runs += 1;
        let mut total = 0;
        self.store.update(account_id, &mut |stat| {
            stat.total_runs += 1;
            total = stat.total_runs;
        });
        total
    }

    pub fn session_runs(&self) -> u64 {
        self.session_runs
    }

    pub fn session_profit(&self) -> Decimal {
        self.session_profit
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}
