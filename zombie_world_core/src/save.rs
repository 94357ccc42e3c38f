use std::{fs, io, path::Path};

use serde::{Deserialize, Serialize};

use crate::{
    Position,
    entity::Entity,
    game::{Game, Ruleset},
    map::{Grid, GridError},
};

#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    #[error("Failed to encode or decode saved game")]
    Json(#[from] serde_json::Error),
    #[error("Saved game is corrupt")]
    Grid(#[from] GridError),
    #[error("Saved game must contain at most one player, found {0}")]
    PlayerCount(usize),
    #[error("Saved player has {0} active items, at most one is allowed")]
    ActiveItems(usize),
    #[error("Saved {ruleset:?} game contains '{symbol}' at {position}")]
    Unsupported {
        ruleset: Ruleset,
        symbol: char,
        position: Position,
    },
    #[error("Failed to access save file")]
    Io(#[from] io::Error),
}

/// Serializable form of a game in progress.
///
/// The random state is not saved; [`SavedGame::restore`] reseeds it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedGame {
    pub ruleset: Ruleset,
    pub moves: u32,
    pub steps: u32,
    pub won: bool,
    pub grid: Grid,
}

impl SavedGame {
    pub fn capture(game: &Game) -> Self {
        SavedGame {
            ruleset: game.ruleset(),
            moves: game.moves(),
            steps: game.steps(),
            won: game.has_won(),
            grid: game.grid().clone(),
        }
    }

    /// Rebuilds a game, checking the grid holds nothing a loaded map or a
    /// played game could not.
    pub fn restore(self, seed: u64) -> Result<Game, SaveError> {
        self.grid.validate()?;
        let players = self.grid.positions_where(|entity| entity.is_player()).len();
        if players > 1 {
            return Err(SaveError::PlayerCount(players));
        }
        for (position, entity) in self.grid.entities() {
            let unsupported = !self.ruleset.allows(entity)
                || (self.ruleset == Ruleset::Basic
                    && entity.as_player().is_some_and(|p| !p.inventory().is_empty()));
            if unsupported {
                return Err(SaveError::Unsupported {
                    ruleset: self.ruleset,
                    symbol: entity.display(),
                    position,
                });
            }
            if let Entity::Player(player) = entity {
                let active = player
                    .inventory()
                    .items()
                    .iter()
                    .filter(|item| item.is_active())
                    .count();
                if active > 1 {
                    return Err(SaveError::ActiveItems(active));
                }
            }
        }
        Ok(Game::new(self.grid, self.ruleset, seed).with_counters(self.moves, self.steps, self.won))
    }

    pub fn to_json(&self) -> Result<String, SaveError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, SaveError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Writes `game` to `path` as JSON.
pub fn save_game(game: &Game, path: impl AsRef<Path>) -> Result<(), SaveError> {
    let json = SavedGame::capture(game).to_json()?;
    fs::write(path, json)?;
    Ok(())
}

/// Reads a game written by [`save_game`].
pub fn load_game(path: impl AsRef<Path>, seed: u64) -> Result<Game, SaveError> {
    let json = fs::read_to_string(path)?;
    SavedGame::from_json(&json)?.restore(seed)
}
