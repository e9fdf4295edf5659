use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use clap::{Args, ValueEnum};
use cozy_chess::Color;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::policy::{Dice, PolicyParams};

/// Which side the human plays.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PlayerColor {
    #[default]
    White,
    Black,
    Random,
}

impl PlayerColor {
    pub fn resolve(self, dice: &mut Dice) -> Color {
        match self {
            PlayerColor::White => Color::White,
            PlayerColor::Black => Color::Black,
            PlayerColor::Random => if dice.chance(0.5) { Color::White } else { Color::Black },
        }
    }
}

impl FromStr for PlayerColor {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "white" | "w" => Ok(PlayerColor::White),
            "black" | "b" => Ok(PlayerColor::Black),
            "random" => Ok(PlayerColor::Random),
            _ => Err(ConfigError::PlayerColor(s.to_string())),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub p_illegal: f64,
    pub p_strong: f64,
    pub oracle_depth: u32,
    pub illegal_retry_budget: u32,
    pub player_color: PlayerColor,
    /// UCI engine executable. Without one every strong-move request falls back to random play.
    pub oracle_path: Option<PathBuf>,
    pub oracle_args: Vec<String>,
    pub oracle_timeout_ms: u64,
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        let policy = PolicyParams::default();
        Self {
            p_illegal: policy.p_illegal,
            p_strong: policy.p_strong,
            oracle_depth: policy.oracle_depth,
            illegal_retry_budget: policy.illegal_retry_budget,
            player_color: PlayerColor::White,
            oracle_path: None,
            oracle_args: Vec::new(),
            oracle_timeout_ms: 10_000,
            seed: None,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let display = path.display().to_string();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read { path: display.clone(), source })?;
        let cfg: Config = serde_json::from_str(&text).map_err(|source| ConfigError::Parse { path: display, source })?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [("p_illegal", self.p_illegal), ("p_strong", self.p_strong)] {
            if !(0.0..=1.0).contains(&value) { return Err(ConfigError::Probability { name, value }); }
        }
        if self.oracle_depth == 0 { return Err(ConfigError::NotPositive("oracle_depth")); }
        if self.illegal_retry_budget == 0 { return Err(ConfigError::NotPositive("illegal_retry_budget")); }
        if self.oracle_timeout_ms == 0 { return Err(ConfigError::NotPositive("oracle_timeout_ms")); }
        Ok(())
    }

    pub fn policy(&self) -> PolicyParams {
        PolicyParams {
            p_illegal: self.p_illegal,
            p_strong: self.p_strong,
            oracle_depth: self.oracle_depth,
            illegal_retry_budget: self.illegal_retry_budget,
        }
    }

    pub fn oracle_timeout(&self) -> Duration { Duration::from_millis(self.oracle_timeout_ms) }
}

/// Command line view of [`Config`]; flags override values from `--config`.
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// JSON config file
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Probability of attempting an illegal move each turn
    #[arg(long)]
    pub p_illegal: Option<f64>,
    /// Probability of asking the oracle for its best move
    #[arg(long)]
    pub p_strong: Option<f64>,
    /// Oracle search depth
    #[arg(long)]
    pub depth: Option<u32>,
    /// Random pairs tried before giving up on an illegal move
    #[arg(long)]
    pub retry_budget: Option<u32>,
    /// Side the human plays
    #[arg(long, value_enum)]
    pub color: Option<PlayerColor>,
    /// Path to a UCI engine used as the oracle
    #[arg(long)]
    pub oracle: Option<PathBuf>,
    /// Extra arguments for the oracle process
    #[arg(long = "oracle-arg")]
    pub oracle_args: Vec<String>,
    /// Per-request oracle time limit in milliseconds
    #[arg(long)]
    pub oracle_timeout_ms: Option<u64>,
    /// Random seed (entropy when omitted)
    #[arg(long)]
    pub seed: Option<u64>,
}

impl ConfigArgs {
    pub fn resolve(&self) -> Result<Config, ConfigError> {
        let mut cfg = match &self.config {
            Some(path) => Config::load(path)?,
            None => Config::default(),
        };
        if let Some(v) = self.p_illegal { cfg.p_illegal = v; }
        if let Some(v) = self.p_strong { cfg.p_strong = v; }
        if let Some(v) = self.depth { cfg.oracle_depth = v; }
        if let Some(v) = self.retry_budget { cfg.illegal_retry_budget = v; }
        if let Some(v) = self.color { cfg.player_color = v; }
        if let Some(v) = &self.oracle { cfg.oracle_path = Some(v.clone()); }
        if !self.oracle_args.is_empty() { cfg.oracle_args = self.oracle_args.clone(); }
        if let Some(v) = self.oracle_timeout_ms { cfg.oracle_timeout_ms = v; }
        if self.seed.is_some() { cfg.seed = self.seed; }
        cfg.validate()?;
        Ok(cfg)
    }
}
