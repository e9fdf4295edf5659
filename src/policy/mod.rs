//! Move policy: decide what kind of move the engine plays this turn and
//! commit it to the position.

pub mod dice;
pub mod selector;
pub mod synth;

use std::fmt;

use cozy_chess::{Move, Piece, Square};
use serde::{Deserialize, Serialize};

pub use dice::Dice;
pub use selector::play_engine_turn;
pub use synth::{synthesize, Rejection, Synthetic};

/// Which policy branch produced a move.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MoveClass {
    /// Oracle's best move.
    Smart,
    /// Random legal move chosen on purpose.
    Silly,
    /// Random legal move after the oracle was asked and failed.
    Random,
    /// Synthetic move that ignored the rules.
    Illegal,
}

impl MoveClass {
    pub const ALL: [MoveClass; 4] = [MoveClass::Smart, MoveClass::Silly, MoveClass::Random, MoveClass::Illegal];
}

impl fmt::Display for MoveClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MoveClass::Smart => "SMART",
            MoveClass::Silly => "SILLY",
            MoveClass::Random => "RANDOM",
            MoveClass::Illegal => "ILLEGAL",
        };
        f.write_str(s)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveCandidate {
    /// A move the rules engine generated and can play.
    Legal(Move),
    /// Squares for a direct placement the rules engine never saw.
    Synthetic { from: Square, to: Square, promotion: Option<Piece> },
}

/// A committed engine move.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MoveOutcome {
    pub class: MoveClass,
    pub notation: String,
    pub from: Square,
    pub to: Square,
    pub candidate: MoveCandidate,
}

/// Knobs of the move policy. The two probabilities are independent draws,
/// not a partition: the illegal draw happens first and wins outright.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PolicyParams {
    pub p_illegal: f64,
    pub p_strong: f64,
    pub oracle_depth: u32,
    pub illegal_retry_budget: u32,
}

impl Default for PolicyParams {
    fn default() -> Self {
        Self { p_illegal: 0.1, p_strong: 0.8, oracle_depth: 15, illegal_retry_budget: 20 }
    }
}
