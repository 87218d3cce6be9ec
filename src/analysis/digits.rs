use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
#[error("unknown token: {0}")]
pub struct UnknownToken(pub String);

/// Extract the last decimal digit of a quote formatted at `pip_size`
/// decimal places.
///
/// Digit extraction is precision-dependent: 12.34 at pip size 3 is
/// "12.340", so its last digit is 0, not 4.
pub fn last_digit(quote: f64, pip_size: u32) -> u8 {
    let formatted = format!("{:.*}", pip_size as usize, quote);
    formatted
        .bytes()
        .last()
        .map(|b| b.wrapping_sub(b'0'))
        .unwrap_or(0)
}

/// Closed set of comparison operators fed in as string tokens by the
/// block editor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigitCompare {
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    Equal,
    NotEqual,
}

impl DigitCompare {
    pub fn eval(&self, lhs: u8, rhs: u8) -> bool {
        match self {
            DigitCompare::Less => lhs < rhs,
            DigitCompare::LessEqual => lhs <= rhs,
            DigitCompare::Greater => lhs > rhs,
            DigitCompare::GreaterEqual => lhs >= rhs,
            DigitCompare::Equal => lhs == rhs,
            DigitCompare::NotEqual => lhs != rhs,
        }
    }
}

impl FromStr for DigitCompare {
    type Err = UnknownToken;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LESS" => Ok(DigitCompare::Less),
            "LEQ" | "LESS_EQUAL" => Ok(DigitCompare::LessEqual),
            "GREATER" => Ok(DigitCompare::Greater),
            "GEQ" | "GREATER_EQUAL" => Ok(DigitCompare::GreaterEqual),
            "EQUAL" => Ok(DigitCompare::Equal),
            "NOT_EQUAL" => Ok(DigitCompare::NotEqual),
            other => Err(UnknownToken(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigitRank {
    Most,
    Least,
}

impl FromStr for DigitRank {
    type Err = UnknownToken;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "MOST" => Ok(DigitRank::Most),
            "LEAST" => Ok(DigitRank::Least),
            other => Err(UnknownToken(other.to_string())),
        }
    }
}

/// True when every digit in the window satisfies `op` against `target`.
///
/// An empty window is vacuously true: insufficient history does not veto
/// the condition.
pub fn all_digits_satisfy(digits: &[u8], op: DigitCompare, target: u8) -> bool {
    digits.iter().all(|&d| op.eval(d, target))
}

/// Most- or least-frequent last digit over a window.
///
/// Buckets are seeded 0..=9 in digit order and the sort is stable, so the
/// lowest digit value wins ties for `Most` and the highest loses last for
/// `Least`. This ordering is load-bearing: decision blocks depend on it
/// being deterministic.
pub fn digit_frequency(digits: &[u8], rank: DigitRank) -> u8 {
    let mut buckets: Vec<(u8, usize)> = (0..10u8).map(|d| (d, 0)).collect();
    for &d in digits {
        if (d as usize) < buckets.len() {
            buckets[d as usize].1 += 1;
        }
    }

    buckets.sort_by(|a, b| b.1.cmp(&a.1));

    match rank {
        DigitRank::Most => buckets[0].0,
        DigitRank::Least => buckets[buckets.len() - 1].0,
    }
}
