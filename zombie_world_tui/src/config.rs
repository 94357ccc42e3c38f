use std::{fs, path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;
use zombie_world_core::game::Ruleset;

#[derive(Parser, Debug, Default)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Map file to load
    #[arg(short, long, value_name = "MAP_FILE")]
    pub map: Option<PathBuf>,

    /// TOML file with game settings
    #[arg(short, long, value_name = "CONFIG_FILE")]
    pub config: Option<PathBuf>,

    /// Seed for zombie movement
    #[arg(long)]
    pub seed: Option<u64>,

    /// High score file
    #[arg(long, value_name = "SCORES_FILE")]
    pub scores: Option<PathBuf>,

    /// Write logs to this file (logging is off otherwise)
    #[arg(long, value_name = "LOG_FILE")]
    pub log_file: Option<PathBuf>,

    /// Play without tracking zombies and items
    #[arg(long)]
    pub basic: bool,
}

/// Settings for a session. Every field has a default, so a config file only
/// needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub map: PathBuf,
    pub ruleset: Ruleset,
    /// Milliseconds between zombie steps.
    pub tick_ms: u64,
    pub scores_file: PathBuf,
    pub max_high_scores: usize,
    /// How many moves the time machine goes back.
    pub rewind_depth: usize,
    pub seed: Option<u64>,
    pub save_file: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            map: PathBuf::from("maps/advanced.txt"),
            ruleset: Ruleset::Advanced,
            tick_ms: 1000,
            scores_file: PathBuf::from("high_scores.txt"),
            max_high_scores: 3,
            rewind_depth: 5,
            seed: None,
            save_file: PathBuf::from("zombie_world_save.json"),
        }
    }
}

impl Config {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).context("Invalid config file")
    }

    /// Builds the config from an optional file, then applies command line
    /// overrides.
    pub fn resolve(args: &Args) -> Result<Self> {
        let config = match &args.config {
            Some(path) => {
                let text = fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config file {}", path.display()))?;
                Self::from_toml_str(&text)?
            }
            None => Config::default(),
        };
        Ok(config.with_args(args))
    }

    pub fn with_args(mut self, args: &Args) -> Self {
        if let Some(map) = &args.map {
            self.map = map.clone();
        }
        if let Some(scores) = &args.scores {
            self.scores_file = scores.clone();
        }
        if args.seed.is_some() {
            self.seed = args.seed;
        }
        if args.basic {
            self.ruleset = Ruleset::Basic;
        }
        self
    }

    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.tick_ms.max(1))
    }
}
