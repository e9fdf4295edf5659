use cozy_chess::{
    get_bishop_moves, get_king_moves, get_knight_moves, get_pawn_attacks, get_rook_moves, BitBoard,
    Board, Color, Piece, Square,
};

/// Bare piece placement with no side-to-move, castling or check bookkeeping.
///
/// The rules engine refuses to build boards it considers unreachable, but the
/// illegal-move search has to ask attack questions about exactly such layouts
/// (a piece teleported across the board). `Layout` answers those questions
/// from the attack tables directly.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Layout {
    pieces: [BitBoard; 6],
    colors: [BitBoard; 2],
}

impl Layout {
    pub fn from_board(board: &Board) -> Self {
        let mut layout = Self { pieces: [BitBoard::EMPTY; 6], colors: [BitBoard::EMPTY; 2] };
        for &piece in &Piece::ALL { layout.pieces[piece as usize] = board.pieces(piece); }
        for &color in &Color::ALL { layout.colors[color as usize] = board.colors(color); }
        layout
    }

    pub fn occupied(&self) -> BitBoard { self.colors[0] | self.colors[1] }

    pub fn piece_at(&self, sq: Square) -> Option<(Color, Piece)> {
        let color = Color::ALL.into_iter().find(|&c| self.colors[c as usize].has(sq))?;
        let piece = Piece::ALL.into_iter().find(|&p| self.pieces[p as usize].has(sq))?;
        Some((color, piece))
    }

    pub fn king(&self, color: Color) -> Option<Square> {
        (self.pieces[Piece::King as usize] & self.colors[color as usize]).into_iter().next()
    }

    /// Teleport whatever stands on `from` to `to`, erasing anything on `to`.
    /// Movement rules are ignored entirely.
    pub fn relocate(&mut self, from: Square, to: Square) {
        let Some((color, piece)) = self.piece_at(from) else { return };
        self.clear(from);
        self.clear(to);
        self.pieces[piece as usize] |= to.bitboard();
        self.colors[color as usize] |= to.bitboard();
    }

    fn clear(&mut self, sq: Square) {
        let mask = !sq.bitboard();
        for bb in self.pieces.iter_mut() { *bb &= mask; }
        for bb in self.colors.iter_mut() { *bb &= mask; }
    }

    /// Pieces of `color` attacking `sq` in this layout.
    pub fn attackers(&self, color: Color, sq: Square) -> BitBoard {
        let occ = self.occupied();
        let p = |piece: Piece| self.pieces[piece as usize];
        let diagonal = p(Piece::Bishop) | p(Piece::Queen);
        let orthogonal = p(Piece::Rook) | p(Piece::Queen);
        // Pawns of `color` hit `sq` from the squares a pawn of the other color would attack.
        let attackers = (get_knight_moves(sq) & p(Piece::Knight))
            | (get_king_moves(sq) & p(Piece::King))
            | (get_pawn_attacks(sq, !color) & p(Piece::Pawn))
            | (get_bishop_moves(sq, occ) & diagonal)
            | (get_rook_moves(sq, occ) & orthogonal);
        attackers & self.colors[color as usize]
    }

    pub fn is_attacked_by(&self, color: Color, sq: Square) -> bool {
        !self.attackers(color, sq).is_empty()
    }

    /// True when `color` has a king and the other side attacks it.
    pub fn king_attacked(&self, color: Color) -> bool {
        self.king(color).map_or(false, |k| self.is_attacked_by(!color, k))
    }
}
