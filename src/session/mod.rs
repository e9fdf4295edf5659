//! One game against the engine: position, history and the engine's private
//! oracle and dice. Sessions know nothing about how they are stored.

pub mod store;

use cozy_chess::Color;
use log::{debug, info};

use crate::board::{Position, Termination};
use crate::error::SessionError;
use crate::oracle::Oracle;
use crate::policy::{play_engine_turn, Dice, MoveClass, MoveOutcome, PolicyParams};

pub use store::{MemoryStore, SessionId, SessionStore};

/// One ply of the game record. `class` is `None` for the player's moves.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlayedMove {
    pub color: Color,
    pub notation: String,
    pub class: Option<MoveClass>,
}

pub struct GameSession {
    position: Position,
    start_fen: Option<String>,
    player_color: Color,
    params: PolicyParams,
    oracle: Option<Box<dyn Oracle>>,
    dice: Dice,
    moves: Vec<PlayedMove>,
}

impl GameSession {
    pub fn new(player_color: Color, params: PolicyParams, oracle: Option<Box<dyn Oracle>>, dice: Dice) -> Self {
        Self::from_position(Position::startpos(), player_color, params, oracle, dice)
    }

    pub fn from_position(
        position: Position,
        player_color: Color,
        params: PolicyParams,
        mut oracle: Option<Box<dyn Oracle>>,
        dice: Dice,
    ) -> Self {
        if let Some(o) = oracle.as_mut() { o.new_game(); }
        let start_fen = Some(position.fen()).filter(|fen| *fen != Position::startpos().fen());
        info!("new game: player={player_color:?} oracle={}", oracle.as_ref().map_or("none", |o| o.name()));
        Self { position, start_fen, player_color, params, oracle, dice, moves: Vec::new() }
    }

    pub fn position(&self) -> &Position { &self.position }

    pub fn player_color(&self) -> Color { self.player_color }

    pub fn engine_color(&self) -> Color { !self.player_color }

    pub fn has_oracle(&self) -> bool { self.oracle.is_some() }

    pub fn moves(&self) -> &[PlayedMove] { &self.moves }

    pub fn termination(&self) -> Option<Termination> { self.position.termination() }

    pub fn is_game_over(&self) -> bool { self.position.is_game_over() }

    pub fn result_text(&self) -> String { self.position.result_text() }

    /// Validate and play the player's move. Nothing changes on error.
    pub fn make_player_move(&mut self, text: &str) -> Result<String, SessionError> {
        if self.is_game_over() { return Err(SessionError::GameOver); }
        if self.position.side_to_move() != self.player_color { return Err(SessionError::NotPlayersTurn); }
        let mv = self.position.parse_move(text).map_err(|e| {
            debug!("rejected player move {text:?}: {e}");
            SessionError::InvalidMove(e)
        })?;
        let notation = self.position.san(mv);
        self.position.play(mv);
        self.moves.push(PlayedMove { color: self.player_color, notation: notation.clone(), class: None });
        Ok(notation)
    }

    /// Let the engine move if it is its turn and the game is not over.
    pub fn make_engine_move(&mut self) -> Option<MoveOutcome> {
        let engine = self.engine_color();
        let outcome = play_engine_turn(&mut self.position, engine, &self.params, self.oracle.as_deref_mut(), &mut self.dice)?;
        info!("engine plays {} ({})", outcome.notation, outcome.class);
        self.moves.push(PlayedMove { color: engine, notation: outcome.notation.clone(), class: Some(outcome.class) });
        Some(outcome)
    }

    /// PGN of the game so far. Engine moves carry their policy class as a comment.
    pub fn pgn(&self) -> String {
        let (white, black) = if self.player_color == Color::White { ("Player", "SillyBot") } else { ("SillyBot", "Player") };
        let result = match self.termination() {
            Some(Termination::Checkmate { winner: Color::White }) => "1-0",
            Some(Termination::Checkmate { winner: Color::Black }) => "0-1",
            Some(_) => "1/2-1/2",
            None => "*",
        };
        let mut out = format!("[Event \"Silly chess\"]\n[Site \"?\"]\n[White \"{white}\"]\n[Black \"{black}\"]\n[Result \"{result}\"]\n");
        let mut number = 1u32;
        if let Some(fen) = &self.start_fen {
            out.push_str(&format!("[SetUp \"1\"]\n[FEN \"{fen}\"]\n"));
            number = fen.split_whitespace().nth(5).and_then(|n| n.parse().ok()).unwrap_or(1);
        }
        out.push('\n');

        let mut tokens: Vec<String> = Vec::new();
        for (i, m) in self.moves.iter().enumerate() {
            if m.color == Color::White {
                tokens.push(format!("{number}."));
            } else if i == 0 {
                tokens.push(format!("{number}..."));
            }
            tokens.push(m.notation.clone());
            if let Some(class) = m.class { tokens.push(format!("{{{class}}}")); }
            if m.color == Color::Black { number += 1; }
        }
        tokens.push(result.to_string());
        out.push_str(&tokens.join(" "));
        out.push('\n');
        out
    }
}
