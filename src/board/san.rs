//! Standard algebraic notation on top of cozy-chess, which only speaks UCI.

use cozy_chess::{Board, Color, File, Move, Piece, Rank, Square};

use crate::board::cozy::Position;
use crate::error::NotationError;

pub fn piece_letter(piece: Piece) -> char {
    match piece {
        Piece::Pawn => 'P',
        Piece::Knight => 'N',
        Piece::Bishop => 'B',
        Piece::Rook => 'R',
        Piece::Queen => 'Q',
        Piece::King => 'K',
    }
}

/// Diagram character: uppercase for White, lowercase for Black.
pub fn piece_char(color: Color, piece: Piece) -> char {
    let c = piece_letter(piece);
    if color == Color::White { c } else { c.to_ascii_lowercase() }
}

fn piece_from_letter(c: char) -> Option<Piece> {
    match c {
        'N' => Some(Piece::Knight),
        'B' => Some(Piece::Bishop),
        'R' => Some(Piece::Rook),
        'Q' => Some(Piece::Queen),
        'K' => Some(Piece::King),
        _ => None,
    }
}

fn is_castle(board: &Board, mv: Move) -> bool {
    board.piece_on(mv.from) == Some(Piece::King) && board.color_on(mv.to) == Some(board.side_to_move())
}

fn castles_short(mv: Move) -> bool { (mv.to.file() as usize) > (mv.from.file() as usize) }

/// Render a legal move in SAN, including the check or mate suffix.
pub fn render(board: &Board, mv: Move) -> String {
    let stm = board.side_to_move();
    let moving = board.piece_on(mv.from);
    let mut s = String::new();

    if is_castle(board, mv) {
        s.push_str(if castles_short(mv) { "O-O" } else { "O-O-O" });
    } else {
        let is_pawn = moving == Some(Piece::Pawn);
        // A diagonal pawn step onto an empty square is en passant.
        let capture = board.color_on(mv.to) == Some(!stm) || (is_pawn && mv.from.file() != mv.to.file());
        let from = mv.from.to_string();

        if let Some(piece) = moving.filter(|_| !is_pawn) {
            s.push(piece_letter(piece));
            let mut rivals: Vec<Square> = Vec::new();
            board.generate_moves(|ml| {
                for m in ml {
                    if m.to == mv.to && m.from != mv.from && board.piece_on(m.from) == Some(piece) && !is_castle(board, m) {
                        rivals.push(m.from);
                    }
                }
                false
            });
            rivals.dedup();
            if !rivals.is_empty() {
                let shares_file = rivals.iter().any(|r| r.file() == mv.from.file());
                let shares_rank = rivals.iter().any(|r| r.rank() == mv.from.rank());
                if !shares_file {
                    s.push_str(&from[..1]);
                } else if !shares_rank {
                    s.push_str(&from[1..]);
                } else {
                    s.push_str(&from);
                }
            }
        } else if capture {
            s.push_str(&from[..1]);
        }
        if capture { s.push('x'); }
        s.push_str(&mv.to.to_string());
        if let Some(promo) = mv.promotion {
            s.push('=');
            s.push(piece_letter(promo));
        }
    }

    let mut next = board.clone();
    next.play(mv);
    if !next.checkers().is_empty() {
        let mut escapes = false;
        next.generate_moves(|ml| { escapes |= !ml.is_empty(); escapes });
        s.push(if escapes { '+' } else { '#' });
    }
    s
}

/// Notation for a move that bypassed the rules: `e2-e5`, `b6-b8=N`.
pub fn synthetic(from: Square, to: Square, promotion: Option<Piece>) -> String {
    match promotion {
        Some(p) => format!("{from}-{to}={}", piece_letter(p)),
        None => format!("{from}-{to}"),
    }
}

struct SanParts {
    piece: Piece,
    from_file: Option<File>,
    from_rank: Option<Rank>,
    to: Square,
    promotion: Option<Piece>,
}

fn file_of(c: char) -> Option<File> {
    ('a'..='h').position(|f| f == c).map(File::index)
}

fn rank_of(c: char) -> Option<Rank> {
    ('1'..='8').position(|r| r == c).map(Rank::index)
}

fn split(core: &str) -> Option<SanParts> {
    let mut chars: Vec<char> = core.chars().collect();
    let piece = match chars.first().copied().and_then(piece_from_letter) {
        Some(p) => { chars.remove(0); p }
        None => Piece::Pawn,
    };

    let mut promotion = None;
    if piece == Piece::Pawn && chars.len() >= 3 {
        let last = chars[chars.len() - 1].to_ascii_uppercase();
        if let Some(p) = piece_from_letter(last).filter(|p| *p != Piece::King) {
            // Both e8=Q and e8Q are accepted.
            if chars[chars.len() - 2] == '=' {
                chars.truncate(chars.len() - 2);
            } else if chars[chars.len() - 2].is_ascii_digit() {
                chars.truncate(chars.len() - 1);
            } else {
                return None;
            }
            promotion = Some(p);
        }
    }

    if chars.len() < 2 { return None; }
    let to_rank = rank_of(chars.pop()?)?;
    let to_file = file_of(chars.pop()?)?;
    if chars.last() == Some(&'x') { chars.pop(); }

    let (mut from_file, mut from_rank) = (None, None);
    for c in chars {
        if let (Some(f), None, None) = (file_of(c), from_file, from_rank) {
            from_file = Some(f);
        } else if let (Some(r), None) = (rank_of(c), from_rank) {
            from_rank = Some(r);
        } else {
            return None;
        }
    }
    Some(SanParts { piece, from_file, from_rank, to: Square::new(to_file, to_rank), promotion })
}

/// Parse SAN against the legal moves of `pos`.
///
/// Check/mate/annotation suffixes are ignored, `0-0` is read as `O-O`, and
/// over-disambiguated moves (`Ng1f3`) are accepted.
pub fn parse(pos: &Position, text: &str) -> Result<Move, NotationError> {
    let core = text.trim().trim_end_matches(|c| matches!(c, '+' | '#' | '!' | '?'));
    if core.is_empty() { return Err(NotationError::Malformed(text.to_string())); }
    let board = pos.board();
    let legal = pos.legal_moves();

    let castle = core.replace('0', "O");
    if castle == "O-O" || castle == "O-O-O" {
        let short = castle == "O-O";
        return legal
            .into_iter()
            .find(|&m| is_castle(board, m) && castles_short(m) == short)
            .ok_or_else(|| NotationError::Illegal(text.to_string()));
    }

    let parts = split(core).ok_or_else(|| NotationError::Malformed(text.to_string()))?;
    let matches: Vec<Move> = legal
        .into_iter()
        .filter(|&m| {
            if is_castle(board, m) || board.piece_on(m.from) != Some(parts.piece) || m.to != parts.to {
                return false;
            }
            if m.promotion != parts.promotion { return false; }
            // A pawn named without its file is a push, never a capture.
            let file_ok = match parts.from_file {
                Some(f) => m.from.file() == f,
                None => parts.piece != Piece::Pawn || m.from.file() == m.to.file(),
            };
            file_ok && parts.from_rank.map_or(true, |r| m.from.rank() == r)
        })
        .collect();

    match matches.as_slice() {
        [] => Err(NotationError::Illegal(text.to_string())),
        [mv] => Ok(*mv),
        _ => Err(NotationError::Ambiguous(text.to_string())),
    }
}
