//! Strong-move oracles. The policy only needs "best move for this position
//! within a depth budget, or a failure"; failures are never fatal.

pub mod uci;

use std::path::Path;
use std::time::Duration;

use cozy_chess::Move;
use log::{info, warn};

use crate::board::Position;
use crate::error::OracleError;

pub use uci::UciOracle;

pub trait Oracle {
    fn name(&self) -> &str;

    /// Best move for `pos`, searched to `depth` plies. The returned move must be
    /// one of `pos.legal_moves()`; callers still verify it.
    fn best_move(&mut self, pos: &Position, depth: u32) -> Result<Move, OracleError>;

    fn new_game(&mut self) {}
}

/// Start the configured oracle process, or return `None` (logged) so the
/// game degrades to random play.
pub fn launch(path: Option<&Path>, args: &[String], timeout: Duration) -> Option<Box<dyn Oracle>> {
    let path = path?;
    match UciOracle::launch(path, args, timeout) {
        Ok(oracle) => {
            info!("oracle {} ready", oracle.name());
            Some(Box::new(oracle))
        }
        Err(e) => {
            warn!("oracle at {} unavailable: {e}", path.display());
            None
        }
    }
}
