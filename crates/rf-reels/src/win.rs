//! Payline win evaluation
//!
//! A payline holds one resting symbol per reel. Matching is by symbol id and
//! checked in a fixed priority order:
//!
//! | Priority | Pattern          | Positions  |
//! |----------|------------------|------------|
//! | 1        | three of a kind  | {0, 1, 2}  |
//! | 2        | left pair        | {0, 1}     |
//! | 3        | right pair       | {1, 2}     |
//! | 4        | outer pair       | {0, 2}     |
//!
//! Once three-of-a-kind is ruled out at most one pair can match, so the
//! order of rules 2–4 never changes the result.

use serde::{Deserialize, Serialize};

use crate::error::{ReelError, ReelResult};
use crate::symbols::SymbolId;

/// Symbols per payline, one per reel
pub const PAYLINE_LEN: usize = 3;

/// Resting symbol ids in reel order
pub type Payline = [SymbolId; PAYLINE_LEN];

/// Which positions matched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WinPattern {
    ThreeOfAKind,
    LeftPair,
    RightPair,
    OuterPair,
}

impl WinPattern {
    /// Winning reel indices, ascending
    pub fn positions(self) -> &'static [usize] {
        match self {
            WinPattern::ThreeOfAKind => &[0, 1, 2],
            WinPattern::LeftPair => &[0, 1],
            WinPattern::RightPair => &[1, 2],
            WinPattern::OuterPair => &[0, 2],
        }
    }

    pub fn is_pair(self) -> bool {
        !matches!(self, WinPattern::ThreeOfAKind)
    }
}

/// A win on the payline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinLine {
    pub pattern: WinPattern,
    /// The matched symbol
    pub symbol: SymbolId,
    /// Winning reel indices, ascending
    pub positions: Vec<usize>,
}

impl WinLine {
    fn new(pattern: WinPattern, symbol: SymbolId) -> Self {
        Self {
            pattern,
            symbol,
            positions: pattern.positions().to_vec(),
        }
    }
}

/// Evaluate a payline. `None` means no win.
pub fn evaluate(payline: &Payline) -> Option<WinLine> {
    let [a, b, c] = *payline;

    let pattern = if a == b && b == c {
        WinPattern::ThreeOfAKind
    } else if a == b {
        WinPattern::LeftPair
    } else if b == c {
        WinPattern::RightPair
    } else if a == c {
        WinPattern::OuterPair
    } else {
        return None;
    };

    let symbol = payline[pattern.positions()[0]];
    Some(WinLine::new(pattern, symbol))
}

/// Evaluate a payline of unchecked length
pub fn evaluate_slice(symbols: &[SymbolId]) -> ReelResult<Option<WinLine>> {
    let payline = <&Payline>::try_from(symbols).map_err(|_| ReelError::PaylineLength {
        expected: PAYLINE_LEN,
        got: symbols.len(),
    })?;
    Ok(evaluate(payline))
}

/// Winning positions of a payline; empty when nothing matched
pub fn winning_positions(payline: &Payline) -> Vec<usize> {
    evaluate(payline).map(|w| w.positions).unwrap_or_default()
}
