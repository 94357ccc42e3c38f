use anyhow::{Context, Result};
use log::{debug, info, warn};
use ratatui::crossterm::event::KeyCode;
use zombie_world_core::{
    Direction,
    entity::PickupKind,
    game::{FireOutcome, Game, MoveOutcome},
    loader::load_map_file,
    save,
};

use crate::{
    config::Config,
    history::History,
    scores::{HighScores, ScoreEntry, format_seconds},
};

const MAX_NAME_LEN: usize = 20;

/// A popup drawn over the map that captures input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Overlay {
    None,
    /// Asking the winner for a name.
    NameEntry { name: String },
    HighScores(Vec<ScoreEntry>),
}

pub struct App {
    /// The game being played.
    pub game: Game,
    pub overlay: Overlay,
    /// Last thing worth telling the player.
    pub message: String,
    /// Flag to control the main loop.
    pub should_quit: bool,
    config: Config,
    history: History,
    scores: HighScores,
    seed: u64,
    games_started: u64,
}

impl App {
    pub fn new(config: Config) -> Result<Self> {
        let seed = config.seed.unwrap_or_else(rand::random);
        let game = Self::start_game(&config, seed)?;
        let scores = HighScores::new(&config.scores_file, config.max_high_scores);
        info!("Seed {}, high scores in {}", seed, scores.path().display());
        Ok(App {
            game,
            overlay: Overlay::None,
            message: String::from("Reach the hospital!"),
            should_quit: false,
            history: History::new(config.rewind_depth),
            scores,
            config,
            seed,
            games_started: 0,
        })
    }

    fn start_game(config: &Config, seed: u64) -> Result<Game> {
        let grid = load_map_file(&config.map, config.ruleset)
            .with_context(|| format!("Failed to load map {}", config.map.display()))?;
        Ok(Game::new(grid, config.ruleset, seed))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Reloads the map and starts over.
    pub fn restart(&mut self) -> Result<()> {
        self.games_started += 1;
        self.game = Self::start_game(&self.config, self.seed.wrapping_add(self.games_started))?;
        self.history.clear();
        self.overlay = Overlay::None;
        self.message = String::from("New game");
        info!("Restarted (game {})", self.games_started + 1);
        Ok(())
    }

    /// Handles one step of the simulation.
    pub fn tick(&mut self) {
        let Some(report) = self.game.step() else {
            return;
        };
        if let Some(kind) = report.expired.last() {
            self.message = format!("{} wore off", kind.name());
        }
        if report.player_killed {
            self.lose_message();
        }
    }

    fn lose_message(&mut self) {
        self.message = format!(
            "You lose in {}! Press 'r' to play again.",
            format_seconds(self.game.steps())
        );
    }

    pub fn move_player(&mut self, direction: Direction) {
        let outcome = self.game.move_in(direction);
        if outcome.counts_as_move() && !self.game.has_lost() {
            self.history.record(&self.game);
        }
        match outcome {
            MoveOutcome::PickedUp(kind) => self.message = format!("Picked up {}", kind.name()),
            MoveOutcome::Repelled => {
                self.message = String::from("The garlic keeps the zombie away");
            }
            MoveOutcome::Killed => self.lose_message(),
            MoveOutcome::Won => {
                self.message = format!(
                    "You won in {}! Enter your name:",
                    format_seconds(self.game.steps())
                );
                self.overlay = Overlay::NameEntry {
                    name: String::new(),
                };
            }
            MoveOutcome::Moved | MoveOutcome::OutOfBounds | MoveOutcome::Ignored => {}
        }
    }

    pub fn fire(&mut self, direction: Direction) {
        self.message = match self.game.fire(direction) {
            FireOutcome::Hit(position) => format!("Shot a zombie at {position}"),
            FireOutcome::Missed => String::from("Missed"),
            FireOutcome::NoWeapon => String::from("You are not holding anything to fire!"),
            FireOutcome::Ignored => return,
        };
    }

    /// Toggles an inventory item. Switching on a time machine rewinds the
    /// game, or restarts it if there is not enough history yet.
    pub fn toggle_item(&mut self, index: usize) -> Result<()> {
        let Some(kind) = self.game.toggle_item(index) else {
            return Ok(());
        };
        let time_travel = kind == PickupKind::TimeMachine
            && self
                .game
                .inventory()
                .is_some_and(|inventory| inventory.has_active(PickupKind::TimeMachine));
        if !time_travel {
            return Ok(());
        }
        debug!("Time machine used with {} states recorded", self.history.len());

        match self.history.rewind() {
            Some(game) => {
                self.game = game;
                self.message = format!("Travelled back {} moves", self.config.rewind_depth);
                info!("Rewound to move {}", self.game.moves());
            }
            None => {
                self.restart()?;
                self.message = String::from("Travelled back to the start");
            }
        }
        Ok(())
    }

    /// Records the name being entered against the current score.
    pub fn submit_name(&mut self, play_again: bool) -> Result<()> {
        let Overlay::NameEntry { name } = &self.overlay else {
            return Ok(());
        };
        let seconds = self.game.steps();
        if self.scores.record(name, seconds)? {
            self.message = format!("High score saved: {}", format_seconds(seconds));
        } else {
            self.message = String::from("Not quite a high score");
        }
        self.overlay = Overlay::None;
        if play_again {
            self.restart()?;
        }
        Ok(())
    }

    pub fn show_high_scores(&mut self) -> Result<()> {
        self.overlay = Overlay::HighScores(self.scores.load()?);
        Ok(())
    }

    pub fn save(&mut self) -> Result<()> {
        let path = &self.config.save_file;
        save::save_game(&self.game, path)
            .with_context(|| format!("Failed to save to {}", path.display()))?;
        self.message = format!("Saved to {}", path.display());
        Ok(())
    }

    pub fn load(&mut self) -> Result<()> {
        let path = &self.config.save_file;
        let game = save::load_game(path, self.seed.wrapping_add(self.games_started))
            .with_context(|| format!("Failed to load {}", path.display()))?;
        self.game = game;
        self.history.clear();
        self.overlay = Overlay::None;
        self.message = format!("Loaded {}", path.display());
        Ok(())
    }

    /// Sets the quit flag.
    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    /// Runs `action` and reports a failure on the status line instead of
    /// ending the session.
    fn report(&mut self, action: impl FnOnce(&mut Self) -> Result<()>) {
        if let Err(err) = action(self) {
            warn!("{err:#}");
            self.message = format!("{err:#}");
        }
    }

    /// Applies one key press. Failures end up on the status line.
    pub fn handle_key(&mut self, code: KeyCode) {
        match &mut self.overlay {
            Overlay::NameEntry { name } => match code {
                KeyCode::Char(c) => {
                    if name.chars().count() < MAX_NAME_LEN {
                        name.push(c);
                    }
                }
                KeyCode::Backspace => {
                    name.pop();
                }
                KeyCode::Enter => self.report(|app| app.submit_name(false)),
                KeyCode::Tab => self.report(|app| app.submit_name(true)),
                KeyCode::Esc => self.overlay = Overlay::None,
                _ => {}
            },
            Overlay::HighScores(_) => self.overlay = Overlay::None,
            Overlay::None => match code {
                KeyCode::Char('q') | KeyCode::Esc => self.quit(),
                KeyCode::Char(c @ ('w' | 'a' | 's' | 'd' | 'W' | 'A' | 'S' | 'D')) => {
                    if let Ok(direction) = c.to_string().parse::<Direction>() {
                        self.move_player(direction);
                    }
                }
                KeyCode::Up => self.fire(Direction::Up),
                KeyCode::Down => self.fire(Direction::Down),
                KeyCode::Left => self.fire(Direction::Left),
                KeyCode::Right => self.fire(Direction::Right),
                KeyCode::Char(c @ '1'..='9') => {
                    let index = c as usize - '1' as usize;
                    self.report(|app| app.toggle_item(index));
                }
                KeyCode::Char('r') => self.report(App::restart),
                KeyCode::Char('h') => self.report(App::show_high_scores),
                KeyCode::F(2) => self.report(App::save),
                KeyCode::F(3) => self.report(App::load),
                _ => {}
            },
        }
    }
}
