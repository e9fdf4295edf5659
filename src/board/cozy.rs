use std::fmt;

use cozy_chess::{Board as CozyBoard, BoardBuilder, CastleRights, Color, File, Move, Piece, Rank, Square};

use crate::board::attacks::Layout;
use crate::board::san;
use crate::error::{NotationError, RulesError};

/// Why a game ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Termination {
    Checkmate { winner: Color },
    Stalemate,
    InsufficientMaterial,
    SeventyFiveMoves,
    FivefoldRepetition,
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Termination::Checkmate { winner: Color::White } => write!(f, "1-0 (White wins by checkmate)"),
            Termination::Checkmate { winner: Color::Black } => write!(f, "0-1 (Black wins by checkmate)"),
            Termination::Stalemate => write!(f, "1/2-1/2 (Stalemate)"),
            Termination::InsufficientMaterial => write!(f, "1/2-1/2 (Insufficient material)"),
            Termination::SeventyFiveMoves => write!(f, "1/2-1/2 (75-move rule)"),
            Termination::FivefoldRepetition => write!(f, "1/2-1/2 (Fivefold repetition)"),
        }
    }
}

/// Authoritative game state: the cozy-chess board plus the bookkeeping the
/// draw rules need (halfmove counter beyond 100 and the repetition window).
#[derive(Clone, Debug)]
pub struct Position {
    board: CozyBoard,
    quiet_plies: u16,
    // Hashes since the last irreversible move, current position last.
    repetitions: Vec<u64>,
}

impl Position {
    pub fn startpos() -> Self {
        Self::from_board(CozyBoard::default())
    }

    pub fn from_fen(fen: &str) -> Result<Self, RulesError> {
        CozyBoard::from_fen(fen, false)
            .map(Self::from_board)
            .map_err(|e| RulesError::Fen(format!("{e:?}")))
    }

    fn from_board(board: CozyBoard) -> Self {
        let quiet_plies = board.halfmove_clock() as u16;
        let repetitions = vec![board.hash()];
        Self { board, quiet_plies, repetitions }
    }

    pub fn board(&self) -> &CozyBoard { &self.board }

    pub fn fen(&self) -> String { format!("{}", self.board) }

    pub fn side_to_move(&self) -> Color { self.board.side_to_move() }

    pub fn layout(&self) -> Layout { Layout::from_board(&self.board) }

    pub fn legal_moves(&self) -> Vec<Move> {
        let mut v = Vec::new();
        self.board.generate_moves(|ml| { v.extend(ml); false });
        v
    }

    pub fn has_legal_moves(&self) -> bool {
        let mut any = false;
        self.board.generate_moves(|ml| { any |= !ml.is_empty(); any });
        any
    }

    /// cozy-chess encodes castling as the king capturing its own rook.
    pub fn is_castling(&self, mv: Move) -> bool {
        self.board.piece_on(mv.from) == Some(Piece::King)
            && self.board.color_on(mv.to) == Some(self.side_to_move())
    }

    /// From/to squares as a player would name them: castling becomes the king's
    /// two-square step (e1g1, e8c8).
    pub fn standard_squares(&self, mv: Move) -> (Square, Square) {
        if !self.is_castling(mv) { return (mv.from, mv.to); }
        let file = if (mv.to.file() as usize) > (mv.from.file() as usize) { File::G } else { File::C };
        (mv.from, Square::new(file, mv.from.rank()))
    }

    pub fn is_legal_pair(&self, from: Square, to: Square) -> bool {
        self.legal_moves().into_iter().any(|m| self.standard_squares(m) == (from, to))
    }

    pub fn piece_at(&self, sq: Square) -> Option<(Color, Piece)> {
        self.board.color_on(sq).zip(self.board.piece_on(sq))
    }

    pub fn king_square(&self, color: Color) -> Option<Square> {
        self.board.colored_pieces(color, Piece::King).into_iter().next()
    }

    pub fn is_square_attacked_by(&self, color: Color, sq: Square) -> bool {
        self.layout().is_attacked_by(color, sq)
    }

    pub fn in_check(&self) -> bool { !self.board.checkers().is_empty() }

    /// Play a legal move. Callers obtain `mv` from `legal_moves` or a parser.
    pub fn play(&mut self, mv: Move) {
        let stm = self.side_to_move();
        let irreversible = self.board.piece_on(mv.from) == Some(Piece::Pawn)
            || self.board.color_on(mv.to) == Some(!stm);
        self.board.play(mv);
        if irreversible {
            self.quiet_plies = 0;
            self.repetitions.clear();
        } else {
            self.quiet_plies = self.quiet_plies.saturating_add(1);
        }
        self.repetitions.push(self.board.hash());
    }

    pub fn san(&self, mv: Move) -> String { san::render(&self.board, mv) }

    pub fn parse_san(&self, text: &str) -> Result<Move, NotationError> { san::parse(self, text) }

    /// Accept SAN first, then coordinate notation (e2e4, e2-e4, e7e8q, e1g1).
    pub fn parse_move(&self, text: &str) -> Result<Move, NotationError> {
        match self.parse_san(text) {
            Ok(mv) => Ok(mv),
            Err(san_err) => self.parse_coordinates(text).ok_or(san_err),
        }
    }

    pub fn parse_coordinates(&self, text: &str) -> Option<Move> {
        let cleaned: String = text.trim().chars().filter(|&c| c != '-').collect::<String>().to_lowercase();
        let parsed: Move = cleaned.parse().ok()?;
        self.legal_moves().into_iter().find(|&m| {
            self.standard_squares(m) == (parsed.from, parsed.to) && m.promotion == parsed.promotion
        })
    }

    /// Coordinate form of a legal move in king-step castling notation, e.g.
    /// `e1g1`, `e7e8q`. Inverse of `parse_coordinates`.
    pub fn coordinates(&self, mv: Move) -> String {
        let (from, to) = self.standard_squares(mv);
        match mv.promotion {
            Some(p) => format!("{from}{to}{}", san::piece_letter(p).to_ascii_lowercase()),
            None => format!("{from}{to}"),
        }
    }

    pub fn play_coordinates(&mut self, text: &str) -> Result<Move, NotationError> {
        let mv = self.parse_coordinates(text).ok_or_else(|| NotationError::Illegal(text.to_string()))?;
        self.play(mv);
        Ok(mv)
    }

    /// Replay a coordinate move list from the initial position.
    pub fn from_start_and_moves<S: AsRef<str>>(moves: &[S]) -> Result<Self, NotationError> {
        let mut pos = Self::startpos();
        for m in moves { pos.play_coordinates(m.as_ref())?; }
        Ok(pos)
    }

    /// Teleport the piece on `from` to `to`, ignoring movement rules, and hand
    /// the move to the other side. Anything on `to` is erased. `promotion`
    /// replaces the moved piece. Castling rights whose king or rook left home
    /// are dropped, en passant is cleared and the move clocks restart.
    ///
    /// Fails when the resulting placement is one the rules engine cannot
    /// represent (pawn on a back rank, side not to move in check, ...).
    pub fn relocate(&self, from: Square, to: Square, promotion: Option<Piece>) -> Result<Position, RulesError> {
        let (color, piece) = self.piece_at(from).ok_or_else(|| RulesError::EmptySquare(from.to_string()))?;
        let stm = self.side_to_move();
        let mut builder = BoardBuilder::from_board(&self.board);
        *builder.square_mut(from) = None;
        *builder.square_mut(to) = Some((promotion.unwrap_or(piece), color));

        for c in Color::ALL {
            let home = Rank::First.relative_to(c);
            let rook_home = |file: Option<File>| {
                file.filter(|&f| builder.square(Square::new(f, home)) == Some((Piece::Rook, c)))
            };
            let rights = builder.castle_rights(c);
            let kept = if piece == Piece::King && color == c {
                CastleRights { short: None, long: None }
            } else {
                CastleRights { short: rook_home(rights.short), long: rook_home(rights.long) }
            };
            *builder.castle_rights_mut(c) = kept;
        }
        builder.en_passant = None;
        builder.side_to_move = !stm;
        builder.halfmove_clock = 0;
        if stm == Color::Black { builder.fullmove_number = builder.fullmove_number.saturating_add(1); }

        let board = builder.build().map_err(|e| RulesError::Unrepresentable(format!("{e:?}")))?;
        Ok(Self::from_board(board))
    }

    pub fn is_checkmate(&self) -> bool { self.in_check() && !self.has_legal_moves() }

    pub fn is_stalemate(&self) -> bool { !self.in_check() && !self.has_legal_moves() }

    pub fn is_insufficient_material(&self) -> bool {
        let b = &self.board;
        let heavy = b.pieces(Piece::Pawn) | b.pieces(Piece::Rook) | b.pieces(Piece::Queen);
        if !heavy.is_empty() { return false; }
        let knights = b.pieces(Piece::Knight);
        let bishops = b.pieces(Piece::Bishop);
        if (knights | bishops).len() <= 1 { return true; }
        if !knights.is_empty() { return false; }
        let shade = |sq: Square| (sq.file() as usize + sq.rank() as usize) % 2;
        let mut shades = bishops.into_iter().map(shade);
        let first = shades.next();
        shades.all(|s| Some(s) == first)
    }

    pub fn is_seventyfive_moves(&self) -> bool { self.quiet_plies >= 150 && !self.is_checkmate() }

    pub fn is_fivefold_repetition(&self) -> bool {
        let Some(&current) = self.repetitions.last() else { return false };
        self.repetitions.iter().filter(|&&h| h == current).count() >= 5
    }

    pub fn termination(&self) -> Option<Termination> {
        if !self.has_legal_moves() {
            return Some(if self.in_check() {
                Termination::Checkmate { winner: !self.side_to_move() }
            } else {
                Termination::Stalemate
            });
        }
        if self.is_insufficient_material() { return Some(Termination::InsufficientMaterial); }
        if self.is_seventyfive_moves() { return Some(Termination::SeventyFiveMoves); }
        if self.is_fivefold_repetition() { return Some(Termination::FivefoldRepetition); }
        None
    }

    pub fn is_game_over(&self) -> bool { self.termination().is_some() }

    pub fn result_text(&self) -> String {
        self.termination().map_or_else(|| "Game in progress".to_string(), |t| t.to_string())
    }
}

impl fmt::Display for Position {
    /// Board diagram, rank 8 first, white pieces uppercase.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in Rank::ALL.into_iter().rev() {
            write!(f, "{} ", rank as usize + 1)?;
            for file in File::ALL {
                let c = match self.piece_at(Square::new(file, rank)) {
                    Some((color, piece)) => san::piece_char(color, piece),
                    None => '.',
                };
                write!(f, " {c}")?;
            }
            writeln!(f)?;
        }
        write!(f, "   a b c d e f g h")
    }
}
