use crate::analysis::digits::UnknownToken;
use crate::models::Candle;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parity {
    Even,
    Odd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverUnder {
    Over,
    Under,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchDiff {
    Match,
    Differ,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiseFall {
    Rise,
    Fall,
}

impl FromStr for Parity {
    type Err = UnknownToken;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "EVEN" => Ok(Parity::Even),
            "ODD" => Ok(Parity::Odd),
            other => Err(UnknownToken(other.to_string())),
        }
    }
}

impl FromStr for OverUnder {
    type Err = UnknownToken;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "OVER" => Ok(OverUnder::Over),
            "UNDER" => Ok(OverUnder::Under),
            other => Err(UnknownToken(other.to_string())),
        }
    }
}

impl FromStr for MatchDiff {
    type Err = UnknownToken;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "MATCH" => Ok(MatchDiff::Match),
            "DIFF" => Ok(MatchDiff::Differ),
            other => Err(UnknownToken(other.to_string())),
        }
    }
}

impl FromStr for RiseFall {
    type Err = UnknownToken;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "RISE" => Ok(RiseFall::Rise),
            "FALL" => Ok(RiseFall::Fall),
            other => Err(UnknownToken(other.to_string())),
        }
    }
}

/// Integer percentage, half-up rounding. Empty windows yield 0, never NaN.
fn percent_of(matching: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (matching as f64 * 100.0 / total as f64).round() as u32
}

/// Percentage of digits that are even (or odd)
pub fn parity_percent(digits: &[u8], parity: Parity) -> u32 {
    let matching = digits
        .iter()
        .filter(|&&d| match parity {
            Parity::Even => d % 2 == 0,
            Parity::Odd => d % 2 == 1,
        })
        .count();
    percent_of(matching, digits.len())
}

/// Percentage of digits strictly over (or under) `digit`
pub fn over_under_percent(digits: &[u8], dir: OverUnder, digit: u8) -> u32 {
    let matching = digits
        .iter()
        .filter(|&&d| match dir {
            OverUnder::Over => d > digit,
            OverUnder::Under => d < digit,
        })
        .count();
    percent_of(matching, digits.len())
}

/// Percentage of digits equal to (or different from) `digit`
pub fn match_diff_percent(digits: &[u8], mode: MatchDiff, digit: u8) -> u32 {
    let matching = digits
        .iter()
        .filter(|&&d| match mode {
            MatchDiff::Match => d == digit,
            MatchDiff::Differ => d != digit,
        })
        .count();
    percent_of(matching, digits.len())
}

/// Percentage of consecutive tick pairs that rose (or fell).
///
/// Equal consecutive quotes count as neither, so rise + fall can sum to
/// less than 100 on a flat window.
pub fn rise_fall_percent(quotes: &[f64], dir: RiseFall) -> u32 {
    if quotes.len() < 2 {
        return 0;
    }
    let matching = quotes
        .windows(2)
        .filter(|pair| match dir {
            RiseFall::Rise => pair[1] > pair[0],
            RiseFall::Fall => pair[1] < pair[0],
        })
        .count();
    percent_of(matching, quotes.len() - 1)
}

/// Percentage of candles that closed above (or below) their open
pub fn candle_rise_fall_percent(candles: &[Candle], dir: RiseFall) -> u32 {
    let matching = candles
        .iter()
        .filter(|c| match dir {
            RiseFall::Rise => c.close > c.open,
            RiseFall::Fall => c.close < c.open,
        })
        .count();
    percent_of(matching, candles.len())
}
