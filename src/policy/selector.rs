use cozy_chess::{Color, Move};
use log::{debug, warn};

use crate::board::Position;
use crate::oracle::Oracle;
use crate::policy::{synth, Dice, MoveCandidate, MoveClass, MoveOutcome, PolicyParams};

fn commit_legal(pos: &mut Position, mv: Move, class: MoveClass) -> MoveOutcome {
    let notation = pos.san(mv);
    let (from, to) = pos.standard_squares(mv);
    pos.play(mv);
    MoveOutcome { class, notation, from, to, candidate: MoveCandidate::Legal(mv) }
}

/// Play one engine turn on `pos`.
///
/// Returns `None` when it is not `engine`'s turn or the game is already over.
/// Otherwise exactly one move is committed: an illegal one with probability
/// `p_illegal` (when the synthesizer finds one), else the oracle's move with
/// probability `p_strong` (when the oracle answers), else a uniformly random
/// legal move.
pub fn play_engine_turn<'o>(
    pos: &mut Position,
    engine: Color,
    params: &PolicyParams,
    oracle: Option<&mut (dyn Oracle + 'o)>,
    dice: &mut Dice,
) -> Option<MoveOutcome> {
    if pos.side_to_move() != engine || pos.is_game_over() { return None; }

    if dice.chance(params.p_illegal) {
        if let Some(found) = synth::synthesize(pos, params.illegal_retry_budget, dice) {
            return Some(found.commit(pos));
        }
        debug!("illegal branch found no candidate, falling through");
    }

    let legal = pos.legal_moves();
    let class = if dice.chance(params.p_strong) {
        match oracle {
            Some(oracle) => match oracle.best_move(pos, params.oracle_depth) {
                Ok(mv) if legal.contains(&mv) => return Some(commit_legal(pos, mv, MoveClass::Smart)),
                Ok(mv) => {
                    warn!("oracle suggested {mv}, which is not legal here; playing randomly");
                    MoveClass::Random
                }
                Err(e) => {
                    warn!("oracle failed ({e}); playing randomly");
                    MoveClass::Random
                }
            },
            None => {
                debug!("strong move requested without an oracle");
                MoveClass::Random
            }
        }
    } else {
        MoveClass::Silly
    };

    let mv = *dice.choose(&legal)?;
    Some(commit_legal(pos, mv, class))
}
