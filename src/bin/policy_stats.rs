use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde::Serialize;
use sillybot::config::{Config, ConfigArgs};
use sillybot::oracle;
use sillybot::policy::{Dice, MoveClass};
use sillybot::session::GameSession;
use std::collections::BTreeMap;

#[derive(Parser, Debug)]
#[command(name = "policy-stats", about = "Play seeded games against a random mover and tally what the policy chose")]
struct Args {
    /// Number of games to play
    #[arg(long, default_value_t = 100)]
    games: usize,

    /// Max plies before a game is abandoned
    #[arg(long, default_value_t = 200)]
    max_plies: usize,

    /// Optional: write the summary as JSON to this path
    #[arg(long)]
    json_out: Option<String>,

    #[command(flatten)]
    config: ConfigArgs,
}

#[derive(Debug, Default, Serialize)]
struct GameTally {
    classes: BTreeMap<MoveClass, usize>,
    plies: usize,
    ending: String,
}

#[derive(Debug, Default, Serialize)]
struct Summary {
    games: usize,
    engine_moves: usize,
    classes: BTreeMap<MoveClass, usize>,
    illegal_rate: f64,
    endings: BTreeMap<String, usize>,
    avg_plies: f64,
}

fn play_one(cfg: &Config, seed: u64, max_plies: usize) -> GameTally {
    let mut dice = Dice::seeded(seed);
    let player = cfg.player_color.resolve(&mut dice);
    let oracle = oracle::launch(cfg.oracle_path.as_deref(), &cfg.oracle_args, cfg.oracle_timeout());
    let mut game = GameSession::new(player, cfg.policy(), oracle, dice.fork());
    let mut tally = GameTally::default();

    while tally.plies < max_plies && !game.is_game_over() {
        if game.position().side_to_move() == game.engine_color() {
            match game.make_engine_move() {
                Some(out) => *tally.classes.entry(out.class).or_default() += 1,
                None => break,
            }
        } else {
            let legal = game.position().legal_moves();
            let Some(&mv) = dice.choose(&legal) else { break };
            let text = game.position().coordinates(mv);
            if game.make_player_move(&text).is_err() { break; }
        }
        tally.plies += 1;
    }
    tally.ending = game.termination().map_or_else(|| "unfinished".to_string(), |t| t.to_string());
    tally
}

fn summarize(tallies: &[GameTally]) -> Summary {
    let mut s = Summary { games: tallies.len(), ..Summary::default() };
    for t in tallies {
        for (&class, &n) in &t.classes {
            *s.classes.entry(class).or_default() += n;
            s.engine_moves += n;
        }
        *s.endings.entry(t.ending.clone()).or_default() += 1;
        s.avg_plies += t.plies as f64;
    }
    if s.games > 0 { s.avg_plies /= s.games as f64; }
    if s.engine_moves > 0 {
        s.illegal_rate = s.classes.get(&MoveClass::Illegal).copied().unwrap_or(0) as f64 / s.engine_moves as f64;
    }
    s
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();
    let cfg = args.config.resolve()?;
    let base_seed = cfg.seed.unwrap_or(1);
    eprintln!(
        "Playing {} games (p_illegal={}, p_strong={}, oracle={})",
        args.games,
        cfg.p_illegal,
        cfg.p_strong,
        cfg.oracle_path.as_ref().map_or("none".to_string(), |p| p.display().to_string())
    );

    let pb = ProgressBar::new(args.games as u64);
    pb.set_style(ProgressStyle::with_template("{bar:40} {pos}/{len} games {elapsed_precise}")?);
    let tallies: Vec<GameTally> = (0..args.games)
        .into_par_iter()
        .map(|g| {
            let t = play_one(&cfg, base_seed.wrapping_add(g as u64), args.max_plies);
            pb.inc(1);
            t
        })
        .collect();
    pb.finish_and_clear();

    let summary = summarize(&tallies);
    for class in MoveClass::ALL {
        let n = summary.classes.get(&class).copied().unwrap_or(0);
        println!("{:<8} {:>7}", class.to_string(), n);
    }
    println!("illegal rate {:.3} over {} engine moves, avg plies {:.1}", summary.illegal_rate, summary.engine_moves, summary.avg_plies);
    for (ending, n) in &summary.endings {
        println!("{n:>5}  {ending}");
    }
    if let Some(path) = &args.json_out {
        std::fs::write(path, serde_json::to_string_pretty(&summary)?)?;
        eprintln!("Wrote {path}");
    }
    Ok(())
}
