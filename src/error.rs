use thiserror::Error;

/// Failures of the rules-engine layer (FEN parsing and direct placement).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RulesError {
    #[error("FEN error: {0}")]
    Fen(String),
    #[error("no piece on {0}")]
    EmptySquare(String),
    #[error("placement cannot be represented: {0}")]
    Unrepresentable(String),
}

/// Rejected player notation. The position is never mutated when one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotationError {
    #[error("malformed move notation: {0:?}")]
    Malformed(String),
    #[error("illegal move: {0}")]
    Illegal(String),
    #[error("ambiguous move: {0}")]
    Ambiguous(String),
}

#[derive(Debug, Error)]
pub enum OracleError {
    #[error("oracle unavailable: {0}")]
    Unavailable(String),
    #[error("oracle did not answer within {0} ms")]
    Timeout(u64),
    #[error("oracle returned no move")]
    NoMove,
    #[error("oracle protocol error: {0}")]
    Protocol(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("No active game")]
    UnknownSession,
    #[error("not the player's turn")]
    NotPlayersTurn,
    #[error("game is over")]
    GameOver,
    #[error("Invalid move")]
    InvalidMove(#[source] NotationError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} must be within [0, 1], got {value}")]
    Probability { name: &'static str, value: f64 },
    #[error("{0} must be positive")]
    NotPositive(&'static str),
    #[error("unknown player color {0:?} (expected white, black or random)")]
    PlayerColor(String),
    #[error("cannot read config file {path}: {source}")]
    Read { path: String, #[source] source: std::io::Error },
    #[error("cannot parse config file {path}: {source}")]
    Parse { path: String, #[source] source: serde_json::Error },
}
