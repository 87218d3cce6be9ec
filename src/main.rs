use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use replibot::analysis::{DigitCompare, DigitRank, Parity, TickAnalysisEngine};
use replibot::feed::SimulatedFeed;
use replibot::models::SettledContract;
use replibot::replication::{
    AccountClass, AccountRecord, InMemoryDirectory, PurchaseEvent, PurchaseIntent, Replicator,
    TracingStatusSink,
};
use replibot::settings::{BotConfig, StaticSettings};
use replibot::stats::{InMemoryStatStore, SessionTracker, StatStore};
use replibot::venue::SimulatedVenue;
use rust_decimal::Decimal;

const POLL_ROUNDS: usize = 30;
const TICKS_PER_ROUND: usize = 5;
const INDICATOR_WINDOW: usize = 25;
const STAKE: f64 = 10.0;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    setup_logging();

    tracing::info!("replibot starting (simulated feed and venue)");

    let config = match BotConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!("config load failed ({e}), using defaults");
            BotConfig::default()
        }
    };
    let limits = config.limits();

    // Simulated collaborators standing in for the live brokerage
    let feed = SimulatedFeed::new(7);
    feed.add_symbol(&config.symbol, 2, 1234.56);

    let venue = SimulatedVenue::new();
    let master_account = "CR90001";
    let directory = InMemoryDirectory::new(
        Some(master_account),
        vec![
            AccountRecord {
                account_id: master_account.to_string(),
                token: "tok-master".to_string(),
                is_virtual: false,
                class: AccountClass::Standard,
                linked_account_id: Some("VRTC90001".to_string()),
            },
            AccountRecord {
                account_id: "VRTC90001".to_string(),
                token: "tok-demo".to_string(),
                is_virtual: true,
                class: AccountClass::Standard,
                linked_account_id: Some(master_account.to_string()),
            },
        ],
    );

    let settings = StaticSettings::from_config(&config);
    settings.set_copy_trading(true);

    let mut engine = TickAnalysisEngine::new(feed.clone(), 500);
    engine.watch_symbol(&config.symbol).await?;

    let mut stats = SessionTracker::new(InMemoryStatStore::new());
    let mut replicator = Replicator::new(directory, settings, venue.clone(), TracingStatusSink);
    let mut outcomes = StdRng::seed_from_u64(11);

    tracing::info!(
        symbol = %config.symbol,
        max_trades = ?limits.max_trades,
        max_loss = ?limits.max_loss,
        replication = config.replication_enabled,
        "configuration"
    );

    for round in 0..POLL_ROUNDS {
        feed.advance(&config.symbol, TICKS_PER_ROUND);
        engine.sync();

        let even = engine.even_odd_percent(Parity::Even, INDICATOR_WINDOW);
        let hot_digit = engine.digit_frequency(DigitRank::Most, INDICATOR_WINDOW);
        tracing::info!(round, even_pct = even, hot_digit, "indicators");

        // Decision block: buy DIGITOVER 4 when the last three digits all
        // exceeded it
        if !engine.last_digits_condition(3, DigitCompare::Greater, 4) {
            continue;
        }

        if let Err(e) = stats.check_limits(&limits) {
            tracing::warn!("halting: {e}");
            break;
        }

        let run = stats.increment_and_get_total_runs(master_account);
        let purchase = PurchaseEvent {
            correlation_id: Some(format!("demo-{round}")),
            contract_type: "DIGITOVER".to_string(),
            intent: PurchaseIntent::ByParameters {
                price: STAKE,
                parameters: serde_json::json!({
                    "amount": STAKE,
                    "basis": "stake",
                    "contract_type": "DIGITOVER",
                    "currency": "USD",
                    "duration": 5,
                    "duration_unit": "t",
                    "symbol": config.symbol,
                    "prediction": 4,
                }),
            },
        };

        match replicator.on_purchase(&purchase).await {
            Ok(receipt) => tracing::info!(run, targets = receipt.tokens.len(), "purchase replicated"),
            Err(e) => tracing::warn!(run, "replication skipped: {e}"),
        }

        // Simulated settlement a few ticks later
        let won = outcomes.gen_bool(0.45);
        let stake = Decimal::try_from(STAKE)?;
        let contract = SettledContract {
            contract_id: Some(round as u64),
            currency: "USD".to_string(),
            buy_price: Some(stake),
            sell_price: Some(if won {
                stake * Decimal::new(195, 2)
            } else {
                Decimal::ZERO
            }),
            ..Default::default()
        };
        let profit = stats.record_settled_contract(master_account, &contract);
        tracing::info!(run, %profit, won, "contract settled");
    }

    let stat = stats.store().get(master_account);
    tracing::info!(
        runs = stat.total_runs,
        wins = stat.total_wins,
        losses = stat.total_losses,
        profit = %stat.total_profit,
        session_profit = %stats.session_profit(),
        submissions = venue.requests().len(),
        "session summary"
    );

    Ok(())
}

fn setup_logging() {
    tracing_subscriber::fmt()
        .with_env_filter("replibot=info")
        .init();
}
