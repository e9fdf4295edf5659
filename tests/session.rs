use cozy_chess::Color;
use pretty_assertions::assert_eq;
use sillybot::board::Position;
use sillybot::error::{NotationError, SessionError};
use sillybot::policy::{Dice, MoveClass, PolicyParams};
use sillybot::session::{GameSession, MemoryStore, SessionStore};

fn silly_only() -> PolicyParams { PolicyParams { p_illegal: 0.0, p_strong: 0.0, ..PolicyParams::default() } }

#[test]
fn pinned_piece_cannot_move_and_nothing_changes() {
    // The e2 knight is pinned against the king by the e7 rook.
    let pos = Position::from_fen("4k3/4r3/8/8/8/8/4N3/4K3 w - - 0 1").unwrap();
    let fen = pos.fen();
    let mut game = GameSession::from_position(pos, Color::White, silly_only(), None, Dice::seeded(1));
    let err = game.make_player_move("Nc3").unwrap_err();
    assert!(matches!(err, SessionError::InvalidMove(NotationError::Illegal(_))), "{err:?}");
    assert_eq!(err.to_string(), "Invalid move");
    for attempt in ["e2c3", "Ng3", "e2-g1"] {
        assert!(matches!(game.make_player_move(attempt), Err(SessionError::InvalidMove(_))), "{attempt}");
    }
    assert_eq!(game.position().fen(), fen);
    assert_eq!(game.position().side_to_move(), Color::White);
    assert!(game.moves().is_empty());
}

#[test]
fn garbage_and_out_of_turn_moves_are_rejected() {
    let mut game = GameSession::new(Color::Black, silly_only(), None, Dice::seeded(2));
    assert_eq!(game.make_player_move("e5"), Err(SessionError::NotPlayersTurn));
    game.make_engine_move().unwrap();
    assert!(matches!(game.make_player_move("zz9"), Err(SessionError::InvalidMove(_))));
    assert_eq!(game.moves().len(), 1);
}

#[test]
fn player_accepts_san_and_coordinates() {
    let mut game = GameSession::new(Color::White, silly_only(), None, Dice::seeded(3));
    assert_eq!(game.make_player_move("e2e4").unwrap(), "e4");
    assert_eq!(game.position().side_to_move(), Color::Black);
    let engine = game.make_engine_move().unwrap();
    assert_eq!(engine.class, MoveClass::Silly);
    assert_eq!(game.make_player_move("Nf3").unwrap(), "Nf3");
    assert_eq!(game.moves().len(), 3);
    assert_eq!(game.moves()[1].class, Some(MoveClass::Silly));
    assert_eq!(game.moves()[0].class, None);
}

#[test]
fn engine_waits_for_the_player() {
    let mut game = GameSession::new(Color::White, silly_only(), None, Dice::seeded(4));
    assert!(game.make_engine_move().is_none());
    assert!(game.moves().is_empty());
}

#[test]
fn finished_game_rejects_further_moves() {
    // Fool's mate, White to move and mated.
    let pos = Position::from_fen("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3").unwrap();
    let mut game = GameSession::from_position(pos, Color::White, silly_only(), None, Dice::seeded(5));
    assert!(game.is_game_over());
    assert_eq!(game.result_text(), "0-1 (Black wins by checkmate)");
    assert_eq!(game.make_player_move("a3"), Err(SessionError::GameOver));
    assert!(game.make_engine_move().is_none());
    assert!(game.pgn().contains("[Result \"0-1\"]"));
}

#[test]
fn pgn_numbers_moves_and_tags_engine_classes() {
    let mut game = GameSession::new(Color::White, silly_only(), None, Dice::seeded(6));
    game.make_player_move("e4").unwrap();
    let reply = game.make_engine_move().unwrap();
    game.make_player_move("d2d4").unwrap();
    let pgn = game.pgn();
    assert!(pgn.starts_with("[Event \"Silly chess\"]\n"));
    assert!(pgn.contains("[White \"Player\"]\n[Black \"SillyBot\"]\n[Result \"*\"]\n"));
    let movetext = pgn.lines().last().unwrap();
    assert_eq!(movetext, format!("1. e4 {} {{SILLY}} 2. d4 *", reply.notation));
}

#[test]
fn pgn_from_a_custom_position_starts_with_black() {
    let pos = Position::from_fen("4k3/8/8/8/8/8/4P3/4K3 b - - 0 12").unwrap();
    let mut game = GameSession::from_position(pos, Color::White, silly_only(), None, Dice::seeded(7));
    let reply = game.make_engine_move().unwrap();
    let pgn = game.pgn();
    assert!(pgn.contains("[SetUp \"1\"]\n[FEN \"4k3/8/8/8/8/8/4P3/4K3 b - - 0 12\"]\n"));
    assert!(pgn.contains(&format!("12... {} {{SILLY}} *", reply.notation)));
}

#[test]
fn illegal_engine_move_is_recorded_and_play_continues() {
    let params = PolicyParams { p_illegal: 1.0, p_strong: 0.0, ..PolicyParams::default() };
    let mut game = GameSession::new(Color::Black, params, None, Dice::seeded(8));
    let out = game.make_engine_move().unwrap();
    assert_eq!(out.class, MoveClass::Illegal);
    assert_eq!(game.position().side_to_move(), Color::Black);
    assert!(game.pgn().contains("{ILLEGAL}"));
    if !game.is_game_over() {
        let reply = game.position().legal_moves()[0];
        let san = game.position().san(reply);
        assert_eq!(game.make_player_move(&san).unwrap(), san);
    }
}

#[test]
fn memory_store_lifecycle() {
    let mut store = MemoryStore::new(Dice::seeded(9));
    assert!(store.is_empty());
    let a = store.create(GameSession::new(Color::White, silly_only(), None, Dice::seeded(10)));
    let b = store.create(GameSession::new(Color::Black, silly_only(), None, Dice::seeded(11)));
    assert_ne!(a, b);
    assert_eq!(a.len(), 32);
    assert_eq!(store.len(), 2);
    store.get_mut(&a).unwrap().make_player_move("e4").unwrap();
    assert_eq!(store.get_mut(&a).unwrap().moves().len(), 1);
    assert!(store.get_mut(&b).unwrap().moves().is_empty());
    assert!(store.expire(&a).is_some());
    assert!(store.expire(&a).is_none());
    assert!(store.get_mut(&a).is_none());
    assert_eq!(store.len(), 1);
}
