use std::io::Cursor;

use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use sillybot::config::Config;
use sillybot::oracle::Oracle;
use sillybot::policy::Dice;
use sillybot::protocol::{Request, Response, Server};
use sillybot::session::{MemoryStore, SessionStore};

fn server() -> Server<MemoryStore> {
    let config = Config { p_illegal: 0.0, p_strong: 0.0, seed: Some(17), ..Config::default() };
    Server::new(MemoryStore::new(Dice::seeded(1)), config, Box::new(|| -> Option<Box<dyn Oracle>> { None }))
}

fn ask(server: &mut Server<MemoryStore>, req: Value) -> Value {
    let reply = server.handle_line(&req.to_string()).expect("server keeps running");
    serde_json::from_str(&reply).unwrap()
}

#[test]
fn requests_parse_from_json() {
    let req: Request = serde_json::from_value(json!({"cmd": "make_move", "game_id": "abc", "move": "e4"})).unwrap();
    assert_eq!(req, Request::MakeMove { game_id: "abc".into(), mv: "e4".into() });
    let req: Request = serde_json::from_value(json!({"cmd": "new_game"})).unwrap();
    assert_eq!(req, Request::NewGame { color: None });
}

#[test]
fn new_game_as_white_waits_for_the_player() {
    let mut s = server();
    let reply = ask(&mut s, json!({"cmd": "new_game", "color": "white"}));
    assert_eq!(reply["player_color"], "white");
    assert_eq!(reply["engine_move"], Value::Null);
    assert_eq!(reply["fen"], "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1");
    assert_eq!(reply["game_over"], false);
    assert_eq!(s.store().len(), 1);
}

#[test]
fn new_game_as_black_gets_the_engines_opening_move() {
    let mut s = server();
    let reply = ask(&mut s, json!({"cmd": "new_game", "color": "black"}));
    assert_eq!(reply["player_color"], "black");
    assert_eq!(reply["engine_move"]["class"], "SILLY");
    assert!(reply["fen"].as_str().unwrap().contains(" b "));
    assert!(reply["engine_move"]["from"].as_str().unwrap().ends_with('1') || reply["engine_move"]["from"].as_str().unwrap().ends_with('2'));
}

#[test]
fn move_round_trip() {
    let mut s = server();
    let game = ask(&mut s, json!({"cmd": "new_game", "color": "white"}));
    let id = game["game_id"].as_str().unwrap().to_string();
    let reply = ask(&mut s, json!({"cmd": "make_move", "game_id": id, "move": "e4"}));
    assert_eq!(reply["game_over"], false);
    assert_eq!(reply["engine_move"]["class"], "SILLY");
    assert!(reply["fen"].as_str().unwrap().contains(" w "));

    let pgn = ask(&mut s, json!({"cmd": "pgn", "game_id": id}));
    assert!(pgn["pgn"].as_str().unwrap().contains("1. e4 "));
}

#[test]
fn errors_are_reported_in_band() {
    let mut s = server();
    let reply = ask(&mut s, json!({"cmd": "make_move", "game_id": "nope", "move": "e4"}));
    assert_eq!(reply, json!({"error": "No active game"}));

    let game = ask(&mut s, json!({"cmd": "new_game"}));
    let id = game["game_id"].as_str().unwrap().to_string();
    let reply = ask(&mut s, json!({"cmd": "make_move", "game_id": id, "move": "e5"}));
    assert_eq!(reply, json!({"error": "Invalid move"}));

    let reply = ask(&mut s, json!({"cmd": "new_game", "color": "purple"}));
    assert!(reply["error"].as_str().unwrap().contains("purple"));

    let reply = s.handle_line("{not json").unwrap();
    assert!(reply.starts_with("{\"error\":\"bad request"));
}

#[test]
fn end_game_forgets_the_session() {
    let mut s = server();
    let game = ask(&mut s, json!({"cmd": "new_game"}));
    let id = game["game_id"].as_str().unwrap().to_string();
    assert_eq!(ask(&mut s, json!({"cmd": "end_game", "game_id": id})), json!({"ended": true}));
    assert_eq!(ask(&mut s, json!({"cmd": "end_game", "game_id": id})), json!({"ended": false}));
    assert_eq!(ask(&mut s, json!({"cmd": "pgn", "game_id": id})), json!({"error": "No active game"}));
    assert!(s.store().is_empty());
}

#[test]
fn handle_maps_requests_to_responses() {
    let mut s = server();
    assert_eq!(s.handle(Request::Pgn { game_id: "x".into() }), Response::Error { error: "No active game".into() });
}

#[test]
fn run_stops_at_quit() {
    let mut s = server();
    let input = "{\"cmd\":\"new_game\"}\n\n{\"cmd\":\"quit\"}\n{\"cmd\":\"new_game\"}\n";
    let mut out = Vec::new();
    s.run(Cursor::new(input), &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert_eq!(text.lines().count(), 1);
    assert_eq!(s.store().len(), 1);
}
