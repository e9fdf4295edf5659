//! Line-oriented JSON transport: one request object per input line, one
//! response object per output line. Mirrors the two endpoints of the web
//! front end (`new_game`, `make_move`) plus PGN export and explicit expiry.

use std::io::{self, BufRead, Write};

use cozy_chess::Color;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::config::{Config, PlayerColor};
use crate::error::SessionError;
use crate::oracle::Oracle;
use crate::policy::{Dice, MoveClass, MoveOutcome};
use crate::session::{GameSession, SessionStore};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum Request {
    NewGame {
        #[serde(default)]
        color: Option<String>,
    },
    MakeMove {
        game_id: String,
        #[serde(rename = "move")]
        mv: String,
    },
    Pgn {
        game_id: String,
    },
    EndGame {
        game_id: String,
    },
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineMove {
    #[serde(rename = "move")]
    pub notation: String,
    pub from: String,
    pub to: String,
    pub class: MoveClass,
}

impl From<&MoveOutcome> for EngineMove {
    fn from(o: &MoveOutcome) -> Self {
        Self { notation: o.notation.clone(), from: o.from.to_string(), to: o.to.to_string(), class: o.class }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewGameResponse {
    pub game_id: String,
    pub player_color: String,
    pub fen: String,
    pub engine_move: Option<EngineMove>,
    pub game_over: bool,
    pub result: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveResponse {
    pub fen: String,
    pub engine_move: Option<EngineMove>,
    pub game_over: bool,
    pub result: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Response {
    NewGame(NewGameResponse),
    Move(MoveResponse),
    Pgn { pgn: String },
    Ended { ended: bool },
    Error { error: String },
}

impl Response {
    fn error(e: impl ToString) -> Self { Response::Error { error: e.to_string() } }
}

/// Starts the oracle for a new session; `None` means play without one.
pub type OracleLauncher = Box<dyn Fn() -> Option<Box<dyn Oracle>>>;

pub struct Server<S: SessionStore> {
    store: S,
    config: Config,
    launch_oracle: OracleLauncher,
    dice: Dice,
}

fn color_name(c: Color) -> String {
    if c == Color::White { "white".to_string() } else { "black".to_string() }
}

impl<S: SessionStore> Server<S> {
    pub fn new(store: S, config: Config, launch_oracle: OracleLauncher) -> Self {
        let dice = Dice::new(config.seed);
        Self { store, config, launch_oracle, dice }
    }

    pub fn store(&self) -> &S { &self.store }

    pub fn handle(&mut self, req: Request) -> Response {
        match req {
            Request::NewGame { color } => self.new_game(color.as_deref()),
            Request::MakeMove { game_id, mv } => self.make_move(&game_id, &mv),
            Request::Pgn { game_id } => match self.store.get_mut(&game_id) {
                Some(session) => Response::Pgn { pgn: session.pgn() },
                None => Response::error(SessionError::UnknownSession),
            },
            Request::EndGame { game_id } => Response::Ended { ended: self.store.expire(&game_id).is_some() },
            Request::Quit => Response::Ended { ended: true },
        }
    }

    fn new_game(&mut self, color: Option<&str>) -> Response {
        let wanted = match color.map(str::parse::<PlayerColor>) {
            None => self.config.player_color,
            Some(Ok(c)) => c,
            Some(Err(e)) => return Response::error(e),
        };
        let player = wanted.resolve(&mut self.dice);
        let oracle = (self.launch_oracle)();
        let mut session = GameSession::new(player, self.config.policy(), oracle, self.dice.fork());
        let engine_move = session.make_engine_move().as_ref().map(EngineMove::from);
        let resp = NewGameResponse {
            game_id: String::new(),
            player_color: color_name(player),
            fen: session.position().fen(),
            engine_move,
            game_over: session.is_game_over(),
            result: session.is_game_over().then(|| session.result_text()),
        };
        let game_id = self.store.create(session);
        Response::NewGame(NewGameResponse { game_id, ..resp })
    }

    fn make_move(&mut self, game_id: &str, mv: &str) -> Response {
        let Some(session) = self.store.get_mut(game_id) else {
            return Response::error(SessionError::UnknownSession);
        };
        if let Err(e) = session.make_player_move(mv) {
            debug!("game {game_id}: {e}");
            return Response::error(e);
        }
        let engine_move = if session.is_game_over() { None } else { session.make_engine_move() };
        let game_over = session.is_game_over();
        Response::Move(MoveResponse {
            fen: session.position().fen(),
            engine_move: engine_move.as_ref().map(EngineMove::from),
            game_over,
            result: game_over.then(|| session.result_text()),
        })
    }

    /// Handle one input line. `None` once the client asked to quit.
    pub fn handle_line(&mut self, line: &str) -> Option<String> {
        let resp = match serde_json::from_str::<Request>(line) {
            Ok(Request::Quit) => return None,
            Ok(req) => self.handle(req),
            Err(e) => {
                warn!("bad request {line:?}: {e}");
                Response::error(format!("bad request: {e}"))
            }
        };
        Some(serde_json::to_string(&resp).unwrap_or_else(|e| format!("{{\"error\":\"{e}\"}}")))
    }

    pub fn run<R: BufRead, W: Write>(&mut self, input: R, mut output: W) -> io::Result<()> {
        for line in input.lines() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() { continue; }
            match self.handle_line(line) {
                Some(reply) => {
                    writeln!(output, "{reply}")?;
                    output.flush()?;
                }
                None => break,
            }
        }
        Ok(())
    }
}
