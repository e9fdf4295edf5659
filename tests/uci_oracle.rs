#![cfg(unix)]

use std::path::{Path, PathBuf};
use std::time::Duration;

use cozy_chess::{Color, Move};
use sillybot::board::Position;
use sillybot::error::OracleError;
use sillybot::oracle::{self, Oracle, UciOracle};
use sillybot::policy::{Dice, MoveClass, PolicyParams};
use sillybot::session::GameSession;

/// Write a shell script that answers the UCI handshake and replies to `go`
/// with `on_go` (empty means it never answers).
fn fake_engine(tag: &str, on_go: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("sillybot-{tag}-{}.sh", std::process::id()));
    let script = format!(
        "while read line; do\n  case \"$line\" in\n    uci) echo 'id name FakeFish 1.0'; echo 'uciok';;\n    isready) echo 'readyok';;\n    go*) {on_go};;\n    quit) exit 0;;\n  esac\ndone\n"
    );
    std::fs::write(&path, script).unwrap();
    path
}

fn start(script: &Path, timeout_ms: u64) -> Result<UciOracle, OracleError> {
    UciOracle::launch(Path::new("/bin/sh"), &[script.display().to_string()], Duration::from_millis(timeout_ms))
}

#[test]
fn handshake_and_bestmove() {
    let script = fake_engine("ok", "echo 'info depth 1 score cp 20'; echo 'bestmove e2e4 ponder e7e5'");
    let mut engine = start(&script, 5_000).unwrap();
    assert_eq!(engine.name(), "FakeFish 1.0");
    let mv = engine.best_move(&Position::startpos(), 3).unwrap();
    assert_eq!(mv, "e2e4".parse::<Move>().unwrap());
    // The process stays usable for the next request.
    assert!(engine.best_move(&Position::startpos(), 3).is_ok());
}

#[test]
fn silent_engine_times_out_and_is_shut_down() {
    let script = fake_engine("silent", ":");
    let mut engine = start(&script, 300).unwrap();
    assert!(matches!(engine.best_move(&Position::startpos(), 3), Err(OracleError::Timeout(300))));
    assert!(matches!(engine.best_move(&Position::startpos(), 3), Err(OracleError::Unavailable(_))));
}

#[test]
fn no_move_and_bad_moves_are_errors() {
    let script = fake_engine("none", "echo 'bestmove (none)'");
    let mut engine = start(&script, 5_000).unwrap();
    assert!(matches!(engine.best_move(&Position::startpos(), 1), Err(OracleError::NoMove)));

    let script = fake_engine("bogus", "echo 'bestmove e2e5'");
    let mut engine = start(&script, 5_000).unwrap();
    assert!(matches!(engine.best_move(&Position::startpos(), 1), Err(OracleError::Protocol(_))));
}

#[test]
fn missing_binary_means_no_oracle() {
    let missing = Path::new("/definitely/not/a/chess/engine");
    assert!(matches!(UciOracle::launch(missing, &[], Duration::from_millis(200)), Err(OracleError::Unavailable(_))));
    assert!(oracle::launch(Some(missing), &[], Duration::from_millis(200)).is_none());
    assert!(oracle::launch(None, &[], Duration::from_millis(200)).is_none());
}

#[test]
fn session_plays_the_engines_suggestion() {
    let script = fake_engine("session", "echo 'bestmove e2e4'");
    let oracle = oracle::launch(Some(Path::new("/bin/sh")), &[script.display().to_string()], Duration::from_secs(5));
    assert!(oracle.is_some());
    let params = PolicyParams { p_illegal: 0.0, p_strong: 1.0, ..PolicyParams::default() };
    let mut game = GameSession::new(Color::Black, params, oracle, Dice::seeded(1));
    let out = game.make_engine_move().unwrap();
    assert_eq!((out.class, out.notation.as_str()), (MoveClass::Smart, "e4"));

    // Same answer is illegal for the next engine turn, so the engine plays randomly.
    game.make_player_move("e5").unwrap();
    let out = game.make_engine_move().unwrap();
    assert_eq!(out.class, MoveClass::Random);
}
