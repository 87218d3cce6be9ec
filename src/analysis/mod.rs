// Tick analysis: rolling history plus the derived indicators decision
// blocks query (last-digit conditions, frequency ranks, percentages).
pub mod digits;
pub mod engine;
pub mod percent;

pub use digits::{all_digits_satisfy, digit_frequency, last_digit, DigitCompare, DigitRank, UnknownToken};
pub use engine::TickAnalysisEngine;
pub use percent::{
    candle_rise_fall_percent, match_diff_percent, over_under_percent, parity_percent,
    rise_fall_percent, MatchDiff, OverUnder, Parity, RiseFall,
};
