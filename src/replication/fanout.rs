use crate::replication::dedup::DedupWindow;
use crate::replication::directory::{AccountClass, AccountDirectory};
use crate::replication::trade_log::TradeLog;
use crate::replication::{
    ReplicationError, ReplicationSettings, ReplicationStatus, SettingsProvider, StatusSink,
};
use crate::venue::VenueTransport;
use chrono::Utc;
use serde_json::{json, Map, Value};

/// Contract parameter fields forwarded to the multi-account buy endpoint.
/// Anything else on the original contract is dropped on purpose: the
/// endpoint does not accept the full single-account parameter set.
const FORWARDED_PARAM_FIELDS: &[&str] = &[
    "amount",
    "basis",
    "contract_type",
    "currency",
    "duration",
    "duration_unit",
    "multiplier",
    "symbol",
    "barrier",
    "barrier2",
    "selected_tick",
    "prediction",
];

/// A purchase decision, as intercepted from the bot's buy path
#[derive(Debug, Clone, PartialEq)]
pub struct PurchaseEvent {
    /// The broker's purchase correlation reference, when available
    pub correlation_id: Option<String>,
    pub contract_type: String,
    pub intent: PurchaseIntent,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PurchaseIntent {
    /// Re-buy an already priced proposal
    ByProposal { proposal_id: String, price: f64 },
    /// Re-price from the original contract parameters
    ByParameters { price: f64, parameters: Value },
    /// Pass the original buy reference through verbatim
    Raw {
        buy: String,
        price: f64,
        parameters: Value,
    },
}

impl PurchaseEvent {
    /// Dedup key: correlation reference when present, else contract type
    /// plus wall-clock millis. The fallback can collide for two distinct
    /// same-type purchases in the same millisecond; accepted as-is.
    pub fn trade_key(&self) -> String {
        match self.correlation_id.as_deref() {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => format!("{}-buy-{}", self.contract_type, Utc::now().timestamp_millis()),
        }
    }
}

/// What a successful fan-out produced
#[derive(Debug, Clone, PartialEq)]
pub struct ReplicationReceipt {
    /// Outgoing token list, master first
    pub tokens: Vec<String>,
    pub response: Value,
}

/// Fans one purchase event out to every linked account.
///
/// Each `on_purchase` call walks a fixed pipeline: dedup, mode gate,
/// master token resolution, target construction, payload construction,
/// one submission. Every attempt ends in exactly one status notification;
/// failures are terminal for that event and never retried here.
pub struct Replicator<D, S, T, K>
where
    D: AccountDirectory,
    S: SettingsProvider,
    T: VenueTransport,
    K: StatusSink,
{
    directory: D,
    settings: S,
    transport: T,
    status: K,
    dedup: DedupWindow,
    log: TradeLog,
}

impl<D, S, T, K> Replicator<D, S, T, K>
where
    D: AccountDirectory,
    S: SettingsProvider,
    T: VenueTransport,
    K: StatusSink,
{
    pub fn new(directory: D, settings: S, transport: T, status: K) -> Self {
        Self {
            directory,
            settings,
            transport,
            status,
            dedup: DedupWindow::default(),
            log: TradeLog::new(),
        }
    }

    /// Handle one purchase event end to end, emitting a status either way
    pub async fn on_purchase(
        &mut self,
        event: &PurchaseEvent,
    ) -> Result<ReplicationReceipt, ReplicationError> {
        let outcome = self.replicate(event).await;
        match &outcome {
            Ok(receipt) => self.status.notify(
                ReplicationStatus::Success,
                &format!("trade replicated to {} account(s)", receipt.tokens.len()),
            ),
            Err(err) => self.status.notify(err.status(), &err.to_string()),
        }
        outcome
    }

    pub fn trade_log(&self) -> &TradeLog {
        &self.log
    }

    async fn replicate(
        &mut self,
        event: &PurchaseEvent,
    ) -> Result<ReplicationReceipt, ReplicationError> {
        // Dedup before anything else; the insert must land before the
        // submission so near-simultaneous duplicates cannot both pass.
        let key = event.trade_key();
        if !self.dedup.check_and_insert(&key) {
            tracing::debug!(key, "duplicate purchase suppressed");
            return Err(ReplicationError::Suppressed);
        }

        // Settings are read fresh per attempt
        let settings = self.settings.replication_settings();
        if !settings.enabled {
            return Err(ReplicationError::Disabled);
        }
        let copy_mode = self.settings.copy_trading_active();
        let mirror_mode = self.settings.mirror_mode_active();
        if !copy_mode && !mirror_mode {
            return Err(ReplicationError::Disabled);
        }

        let master = self
            .resolve_master_token()
            .ok_or(ReplicationError::NoMasterToken)?;

        let tokens = if copy_mode {
            self.copy_targets(&master)
        } else {
            self.mirror_targets(&master)
        };
        if tokens.is_empty() {
            return Err(ReplicationError::NoTargets);
        }

        let request = build_request(event, &settings, &tokens);
        self.status.notify(
            ReplicationStatus::Copying,
            &format!("replicating trade to {} account(s)", tokens.len()),
        );

        let account_id = self.directory.active_account_id().unwrap_or_default();
        match self.transport.send(request.clone()).await {
            Ok(response) => {
                if let Some(error) = response.get("error") {
                    let code = error
                        .get("code")
                        .and_then(Value::as_str)
                        .unwrap_or("UnknownError")
                        .to_string();
                    let message = error
                        .get("message")
                        .and_then(Value::as_str)
                        .unwrap_or("venue reported an error")
                        .to_string();
                    self.log.push(&account_id, request, Some(message.clone()));
                    return Err(ReplicationError::Venue { code, message });
                }

                self.log.push(&account_id, request, None);
                tracing::info!(targets = tokens.len(), "fan-out submitted");
                Ok(ReplicationReceipt { tokens, response })
            }
            Err(err) => {
                self.log.push(&account_id, request, Some(err.to_string()));
                Err(ReplicationError::Transport(err.to_string()))
            }
        }
    }

    /// Token of the account driving the bot. Financial-class accounts
    /// resolve through their linked demo account, because the venue books
    /// their replicated trades under that identity.
    fn resolve_master_token(&self) -> Option<String> {
        let active_id = self.directory.active_account_id()?;
        let accounts = self.directory.accounts();
        let active = accounts.iter().find(|a| a.account_id == active_id)?;

        let token = match active.class {
            AccountClass::Financial => active
                .linked_account_id
                .as_deref()
                .and_then(|id| accounts.iter().find(|a| a.account_id == id))
                .filter(|a| a.is_virtual)
                .map(|a| a.token.clone()),
            AccountClass::Standard => Some(active.token.clone()),
        };

        token.filter(|t| !t.trim().is_empty())
    }

    /// Copy-trading targets: master token first (the venue identifies the
    /// source account by position), then the configured copier tokens with
    /// blanks and duplicates removed.
    fn copy_targets(&self, master: &str) -> Vec<String> {
        let mut targets = vec![master.to_string()];
        for token in self.settings.copier_tokens() {
            let token = token.trim();
            if token.is_empty() || targets.iter().any(|t| t.as_str() == token) {
                continue;
            }
            targets.push(token.to_string());
        }
        targets
    }

    /// Mirror-mode targets: master plus the linked real account's token.
    /// When the link is missing or resolves back to the master, scan the
    /// directory for any real account other than the active one; failing
    /// that, the master trades alone.
    fn mirror_targets(&self, master: &str) -> Vec<String> {
        let accounts = self.directory.accounts();
        let active_id = self.directory.active_account_id().unwrap_or_default();

        let linked = accounts
            .iter()
            .find(|a| a.account_id == active_id)
            .and_then(|a| a.linked_account_id.as_deref())
            .and_then(|id| self.directory.token_for(id))
            .filter(|t| !t.trim().is_empty() && t.as_str() != master);

        let real = linked.or_else(|| {
            accounts
                .iter()
                .find(|a| {
                    !a.is_virtual
                        && a.account_id != active_id
                        && !a.token.trim().is_empty()
                        && a.token != master
                })
                .map(|a| a.token.clone())
        });

        match real {
            Some(token) => vec![master.to_string(), token],
            None => vec![master.to_string()],
        }
    }
}

/// Stake after the session multiplier and cap
fn scaled_stake(price: f64, settings: &ReplicationSettings) -> f64 {
    let stake = price * settings.stake_multiplier;
    match settings.stake_cap {
        Some(cap) if stake > cap => cap,
        _ => stake,
    }
}

fn build_request(event: &PurchaseEvent, settings: &ReplicationSettings, tokens: &[String]) -> Value {
    match &event.intent {
        PurchaseIntent::ByProposal { proposal_id, price } => json!({
            "buy_contract_for_multiple_accounts": proposal_id,
            "price": scaled_stake(*price, settings),
            "tokens": tokens,
        }),
        PurchaseIntent::ByParameters { price, parameters } => {
            let mut forwarded = Map::new();
            if let Some(original) = parameters.as_object() {
                for field in FORWARDED_PARAM_FIELDS {
                    if let Some(value) = original.get(*field) {
                        forwarded.insert((*field).to_string(), value.clone());
                    }
                }
            }
            let stake = scaled_stake(*price, settings);
            forwarded.insert("amount".to_string(), json!(stake));

            json!({
                "buy_contract_for_multiple_accounts": 1,
                "price": stake,
                "parameters": Value::Object(forwarded),
                "tokens": tokens,
            })
        }
        PurchaseIntent::Raw {
            buy,
            price,
            parameters,
        } => json!({
            "buy_contract_for_multiple_accounts": buy,
            "price": price,
            "parameters": parameters,
            "tokens": tokens,
        }),
    }
}
