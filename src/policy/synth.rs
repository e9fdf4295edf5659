//! Illegal move synthesis: pick a from/to pair that looks like a move, is not
//! one, and still leaves a position the rest of the game can continue from.

use cozy_chess::{Color, Piece, Rank, Square};
use log::debug;

use crate::board::{san, Position};
use crate::policy::{Dice, MoveCandidate, MoveClass, MoveOutcome};

const PROMOTION_PIECES: [Piece; 4] = [Piece::Queen, Piece::Rook, Piece::Bishop, Piece::Knight];

/// Why a drawn pair was thrown away.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rejection {
    SameSquare,
    EmptySource,
    FriendlyCapture,
    KingCapture,
    SelfCheck,
    CheckUnresolved,
    LegalMove,
    Unrepresentable,
}

/// An accepted synthetic move together with the position it produces.
#[derive(Clone, Debug)]
pub struct Synthetic {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<Piece>,
    pub next: Position,
}

impl Synthetic {
    pub fn notation(&self) -> String { san::synthetic(self.from, self.to, self.promotion) }

    /// Replace `pos` with the synthesized successor.
    pub fn commit(self, pos: &mut Position) -> MoveOutcome {
        let notation = self.notation();
        let candidate = MoveCandidate::Synthetic { from: self.from, to: self.to, promotion: self.promotion };
        *pos = self.next;
        MoveOutcome { class: MoveClass::Illegal, notation, from: self.from, to: self.to, candidate }
    }
}

/// Screen a pair against every filter except representability, which needs the
/// final placement. The side to move is the one "cheating".
pub fn screen(pos: &Position, from: Square, to: Square) -> Result<(), Rejection> {
    let us = pos.side_to_move();
    if from == to { return Err(Rejection::SameSquare); }
    match pos.piece_at(from) {
        Some((color, _)) if color == us => {}
        _ => return Err(Rejection::EmptySource),
    }
    match pos.piece_at(to) {
        Some((color, _)) if color == us => return Err(Rejection::FriendlyCapture),
        Some((_, Piece::King)) => return Err(Rejection::KingCapture),
        _ => {}
    }

    let mut layout = pos.layout();
    layout.relocate(from, to);
    if layout.king_attacked(us) {
        return Err(if pos.in_check() { Rejection::CheckUnresolved } else { Rejection::SelfCheck });
    }

    if pos.is_legal_pair(from, to) { return Err(Rejection::LegalMove); }
    Ok(())
}

/// A pawn promotes when it lands on its farthest rank while moving forward.
pub fn promotion_due(color: Color, piece: Piece, from: Square, to: Square) -> bool {
    let last = Rank::Eighth.relative_to(color);
    let progress = |sq: Square| sq.rank().relative_to(color) as usize;
    piece == Piece::Pawn && to.rank() == last && progress(to) > progress(from)
}

/// Search up to `budget` random pairs for an illegal but plausible move.
///
/// `None` means no pair survived; the caller moves on to the next policy branch.
/// A finished game never gets a synthetic move.
pub fn synthesize(pos: &Position, budget: u32, dice: &mut Dice) -> Option<Synthetic> {
    if pos.is_game_over() { return None; }
    let us = pos.side_to_move();
    let sources: Vec<Square> = pos.board().colors(us).into_iter().collect();
    if sources.is_empty() { return None; }

    for attempt in 0..budget {
        let from = *dice.choose(&sources)?;
        let to = dice.square();
        if let Err(why) = screen(pos, from, to) {
            debug!("synth attempt {attempt}: {from}-{to} rejected ({why:?})");
            continue;
        }
        let Some((color, piece)) = pos.piece_at(from) else { continue };
        let promotion = if promotion_due(color, piece, from, to) { dice.choose(&PROMOTION_PIECES).copied() } else { None };
        match pos.relocate(from, to, promotion) {
            Ok(next) => {
                debug!("synth attempt {attempt}: accepted {}", san::synthetic(from, to, promotion));
                return Some(Synthetic { from, to, promotion, next });
            }
            Err(e) => debug!("synth attempt {attempt}: {from}-{to} rejected ({:?}: {e})", Rejection::Unrepresentable),
        }
    }
    debug!("synth: no candidate within {budget} attempts");
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> Square { s.parse().unwrap() }

    #[test]
    fn screen_applies_each_filter() {
        // White: Ke1, Re2, Pa2. Black: Ke8, Rh8.
        let pos = Position::from_fen("4k2r/8/8/8/8/8/P3R3/4K3 w - - 0 1").unwrap();
        assert_eq!(screen(&pos, sq("e2"), sq("e2")), Err(Rejection::SameSquare));
        assert_eq!(screen(&pos, sq("h8"), sq("h1")), Err(Rejection::EmptySource));
        assert_eq!(screen(&pos, sq("e2"), sq("a2")), Err(Rejection::FriendlyCapture));
        assert_eq!(screen(&pos, sq("e2"), sq("e8")), Err(Rejection::KingCapture));
        assert_eq!(screen(&pos, sq("e2"), sq("e5")), Err(Rejection::LegalMove));
        assert_eq!(screen(&pos, sq("e1"), sq("h4")), Err(Rejection::SelfCheck));
        assert_eq!(screen(&pos, sq("e2"), sq("c5")), Ok(()));
        assert_eq!(screen(&pos, sq("a2"), sq("a5")), Ok(()));
    }

    #[test]
    fn screen_requires_check_to_be_resolved() {
        // Black rook on e8 checks the white king; the knight can only help by blocking or capturing.
        let pos = Position::from_fen("k3r3/8/8/8/8/8/8/1N2K3 w - - 0 1").unwrap();
        assert_eq!(screen(&pos, sq("b1"), sq("h5")), Err(Rejection::CheckUnresolved));
        assert_eq!(screen(&pos, sq("b1"), sq("e5")), Ok(()));
        assert_eq!(screen(&pos, sq("b1"), sq("e8")), Ok(()));
    }

    #[test]
    fn promotion_needs_forward_progress() {
        assert!(promotion_due(Color::White, Piece::Pawn, sq("b6"), sq("b8")));
        assert!(promotion_due(Color::Black, Piece::Pawn, sq("c3"), sq("h1")));
        assert!(!promotion_due(Color::White, Piece::Pawn, sq("b6"), sq("b7")));
        assert!(!promotion_due(Color::White, Piece::Rook, sq("b6"), sq("b8")));
        assert!(!promotion_due(Color::Black, Piece::Pawn, sq("c3"), sq("c8")));
    }
}
