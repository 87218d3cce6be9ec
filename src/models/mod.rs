use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single timestamped price update for a symbol
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Tick {
    pub quote: f64,
    pub epoch: i64, // seconds
}

/// OHLC candle at a fixed granularity
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Candle {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub epoch: i64, // start of the candle bucket, seconds
}

/// Settlement report for a finished contract, as pushed by the venue.
///
/// Most price fields are optional because the venue omits them depending on
/// how the contract ended; profit derivation falls back through them in a
/// strict order (see `SessionTracker::record_settled_contract`).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SettledContract {
    pub contract_id: Option<u64>,
    pub currency: String,
    pub profit: Option<Decimal>,
    pub buy_price: Option<Decimal>,
    pub sell_price: Option<Decimal>,
    pub payout: Option<Decimal>,
    pub bid_price: Option<Decimal>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_roundtrip() {
        let tick = Tick {
            quote: 12.345,
            epoch: 1_700_000_000,
        };

        let json = serde_json::to_string(&tick).unwrap();
        let back: Tick = serde_json::from_str(&json).unwrap();
        assert_eq!(back, tick);
    }

    #[test]
    fn test_settled_contract_partial_payload() {
        // The venue often sends only a subset of the price fields
        let raw = r#"{"currency":"USD","buy_price":"10.00","sell_price":"19.50"}"#;
        let contract: SettledContract = serde_json::from_str(raw).unwrap();

        assert_eq!(contract.currency, "USD");
        assert!(contract.profit.is_none());
        assert_eq!(contract.buy_price, Some(Decimal::new(1000, 2)));
        assert_eq!(contract.sell_price, Some(Decimal::new(1950, 2)));
    }
}
