use anyhow::Result;
use clap::{Parser, Subcommand};
use sillybot::config::{Config, ConfigArgs};
use sillybot::oracle;
use sillybot::policy::Dice;
use sillybot::protocol::Server;
use sillybot::session::{GameSession, MemoryStore};
use std::io::{self, BufRead, Write};

#[derive(Parser, Debug)]
#[command(author, version, about = "Play chess against an engine that sometimes cheats", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    config: ConfigArgs,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Interactive game in the terminal
    Play,
    /// JSON-lines server on stdin/stdout
    Serve,
}

fn launcher(cfg: &Config) -> sillybot::protocol::OracleLauncher {
    let path = cfg.oracle_path.clone();
    let args = cfg.oracle_args.clone();
    let timeout = cfg.oracle_timeout();
    Box::new(move || oracle::launch(path.as_deref(), &args, timeout))
}

fn play(cfg: &Config) -> Result<()> {
    let mut dice = Dice::new(cfg.seed);
    let player = cfg.player_color.resolve(&mut dice);
    let oracle = oracle::launch(cfg.oracle_path.as_deref(), &cfg.oracle_args, cfg.oracle_timeout());
    if oracle.is_none() {
        println!("No oracle engine available; strong moves fall back to random play.");
    }
    let mut game = GameSession::new(player, cfg.policy(), oracle, dice.fork());
    println!("You play {}. Enter moves in SAN (Nf3, exd5, O-O) or coordinates (e2e4). 'quit' exits, 'pgn' prints the game.", if player == cozy_chess::Color::White { "White" } else { "Black" });

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        if game.is_game_over() {
            println!("\n{}", game.position());
            println!("Game over: {}", game.result_text());
            break;
        }
        if game.position().side_to_move() == game.engine_color() {
            match game.make_engine_move() {
                Some(out) => println!("\nEngine plays: {} [{}]", out.notation, out.class),
                None => {
                    println!("Engine has no move.");
                    break;
                }
            }
            continue;
        }

        println!("\n{}", game.position());
        print!("Your move: ");
        io::stdout().flush()?;
        let Some(line) = lines.next() else { break };
        let input = line?;
        let input = input.trim();
        match input {
            "" => continue,
            "quit" => {
                println!("Thanks for playing!");
                break;
            }
            "pgn" => {
                println!("{}", game.pgn());
                continue;
            }
            _ => {}
        }
        if let Err(e) = game.make_player_move(input) {
            println!("{e}: {input}");
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let cfg = cli.config.resolve()?;
    match cli.command {
        Command::Play => play(&cfg),
        Command::Serve => {
            let store = MemoryStore::new(Dice::new(cfg.seed.map(|s| s ^ 0x5eed)));
            let mut server = Server::new(store, cfg.clone(), launcher(&cfg));
            let stdin = io::stdin();
            server.run(stdin.lock(), io::stdout().lock())?;
            Ok(())
        }
    }
}
