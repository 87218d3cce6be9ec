use replibot::analysis::{DigitCompare, DigitRank, Parity, TickAnalysisEngine};
use replibot::feed::SimulatedFeed;
use replibot::models::SettledContract;
use replibot::replication::{
    AccountClass, AccountRecord, InMemoryDirectory, PurchaseEvent, PurchaseIntent,
    ReplicationError, ReplicationSettings, ReplicationStatus, Replicator, StatusSink,
};
use replibot::settings::StaticSettings;
use replibot::stats::{InMemoryStatStore, SessionTracker, StatStore, TradeLimits};
use replibot::venue::SimulatedVenue;
use rust_decimal::Decimal;
use std::sync::{Arc, Mutex};

#[derive(Clone, Default)]
struct RecordingSink {
    statuses: Arc<Mutex<Vec<ReplicationStatus>>>,
}

impl RecordingSink {
    fn seen(&self) -> Vec<ReplicationStatus> {
        self.statuses.lock().unwrap().clone()
    }
}

impl StatusSink for RecordingSink {
    fn notify(&self, status: ReplicationStatus, _message: &str) {
        self.statuses.lock().unwrap().push(status);
    }
}

fn account(id: &str, token: &str, is_virtual: bool) -> AccountRecord {
    AccountRecord {
        account_id: id.to_string(),
        token: token.to_string(),
        is_virtual,
        class: AccountClass::Standard,
        linked_account_id: None,
    }
}

#[tokio::test]
async fn test_end_to_end_decision_to_replication() {
    let _ = tracing_subscriber::fmt().try_init();

    // 1. Feed and analysis engine
    let feed = SimulatedFeed::new(3);
    feed.add_symbol("VOL100", 3, 12.3);

    let mut engine = TickAnalysisEngine::new(feed.clone(), 100);
    engine.watch_symbol("VOL100").await.unwrap();

    for quote in [12.345, 12.346, 12.344] {
        feed.push_tick("VOL100", quote);
    }
    engine.sync();

    // Digits [5, 6, 4]: all under 7, not all over 5
    assert_eq!(engine.pip_size(), 3);
    assert!(engine.last_digits_condition(3, DigitCompare::Less, 7));
    assert!(!engine.last_digits_condition(3, DigitCompare::Greater, 5));
    assert_eq!(engine.digit_frequency(DigitRank::Most, 3), 4);
    let even = engine.even_odd_percent(Parity::Even, 3);
    let odd = engine.even_odd_percent(Parity::Odd, 3);
    assert!((99..=101).contains(&(even + odd)));

    // 2. Risk guard gates the purchase
    let limits = TradeLimits {
        max_trades: Some(2),
        max_loss: Some(Decimal::new(10000, 2)),
    };
    let mut stats = SessionTracker::new(InMemoryStatStore::new());
    assert!(stats.check_limits(&limits).is_ok());

    // 3. Replication fan-out in copy-trading mode
    let settings = StaticSettings::new(ReplicationSettings {
        enabled: true,
        stake_multiplier: 2.0,
        stake_cap: Some(15.0),
    });
    settings.set_copy_trading(true);
    settings.set_copier_tokens(vec!["tok-copier".to_string()]);

    let directory = InMemoryDirectory::new(
        Some("CR100"),
        vec![
            account("CR100", "tok-master", false),
            account("CR200", "tok-copier", false),
        ],
    );
    let venue = SimulatedVenue::new();
    let sink = RecordingSink::default();
    let mut replicator = Replicator::new(directory, settings, venue.clone(), sink.clone());

    let purchase = PurchaseEvent {
        correlation_id: Some("e2e-1".to_string()),
        contract_type: "DIGITUNDER".to_string(),
        intent: PurchaseIntent::ByProposal {
            proposal_id: "prop-7".to_string(),
            price: 10.0,
        },
    };

    stats.increment_and_get_total_runs("CR100");
    let receipt = replicator.on_purchase(&purchase).await.unwrap();
    assert_eq!(receipt.tokens, vec!["tok-master", "tok-copier"]);

    // Stake 10.0 doubled then capped at 15.0
    let requests = venue.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0]["price"], serde_json::json!(15.0));
    assert_eq!(requests[0]["tokens"][0], "tok-master");

    // Duplicate purchase suppressed without another submission
    let dup = replicator.on_purchase(&purchase).await;
    assert_eq!(dup, Err(ReplicationError::Suppressed));
    assert_eq!(venue.requests().len(), 1);
    assert_eq!(
        sink.seen(),
        vec![
            ReplicationStatus::Copying,
            ReplicationStatus::Success,
            ReplicationStatus::Suppressed,
        ]
    );

    // 4. Settlement flows into statistics
    let contract = SettledContract {
        currency: "USD".to_string(),
        buy_price: Some(Decimal::new(1000, 2)),
        sell_price: Some(Decimal::new(1950, 2)),
        ..Default::default()
    };
    let profit = stats.record_settled_contract("CR100", &contract);
    assert_eq!(profit, Decimal::new(950, 2));

    let stat = stats.store().get("CR100");
    assert_eq!(stat.total_wins, 1);
    assert_eq!(stat.total_runs, 1);
    assert!(stat.total_wins + stat.total_losses <= stat.total_runs);

    // 5. Limit boundary: second run reaches max_trades exactly
    stats.increment_and_get_total_runs("CR100");
    assert!(stats.check_limits(&limits).is_err());
}

#[tokio::test]
async fn test_market_closed_degrades_without_crashing() {
    let feed = SimulatedFeed::new(5);
    feed.add_symbol("VOL100", 2, 100.0);

    let mut engine = TickAnalysisEngine::new(feed.clone(), 50);
    engine.watch_symbol("VOL100").await.unwrap();
    feed.advance("VOL100", 10);
    engine.sync();

    // Market closes: switching symbols fails with the sentinel and the
    // indicator surface degrades to neutral values instead of crashing
    feed.add_symbol("VOL50", 2, 50.0);
    feed.set_closed(true);
    assert!(engine.watch_symbol("VOL50").await.is_err());

    assert_eq!(engine.even_odd_percent(Parity::Even, 10), 0);
    assert!(engine.last_digits_condition(5, DigitCompare::Equal, 9));

    // Reopen and retry the same switch
    feed.set_closed(false);
    engine.watch_symbol("VOL50").await.unwrap();
    assert_eq!(engine.symbol(), Some("VOL50"));
}

#[tokio::test]
async fn test_clear_statistics_scopes_to_account() {
    let mut stats = SessionTracker::new(InMemoryStatStore::new());

    for account_id in ["CR100", "CR200"] {
        stats.increment_and_get_total_runs(account_id);
        stats.record_settled_contract(
            account_id,
            &SettledContract {
                currency: "USD".to_string(),
                buy_price: Some(Decimal::new(500, 2)),
                ..Default::default()
            },
        );
    }
    assert_eq!(stats.session_runs(), 2);

    stats.clear_statistics("CR100");

    assert_eq!(stats.session_runs(), 0);
    assert_eq!(stats.session_profit(), Decimal::ZERO);
    assert_eq!(stats.store().get("CR100").total_runs, 0);
    assert_eq!(stats.store().get("CR200").total_runs, 1);
}
