use std::{fs, io, path::Path};

use crate::{
    Position,
    entity::{self, Entity, PickupKind},
    game::Ruleset,
    map::{Grid, GridError},
};

/// The map text itself is malformed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MapFormatError {
    #[error("Map is empty")]
    Empty,
    #[error("Inconsistent width at row {row}: expected {expected}, found {found}")]
    InconsistentRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("Map must be square, found {rows} rows of {columns} columns")]
    NotSquare { rows: usize, columns: usize },
    #[error("Unknown map symbol '{symbol}' at ({x}, {y})")]
    UnknownSymbol { symbol: char, x: usize, y: usize },
    #[error("Map symbol '{symbol}' at ({x}, {y}) is not allowed in the basic game")]
    UnsupportedSymbol { symbol: char, x: usize, y: usize },
}

/// The map parses but cannot start a game.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidMapError {
    #[error("No player ('P') found in map")]
    NoPlayer,
    #[error("Map must contain exactly one player ('P'), found {count}")]
    MultiplePlayers { count: usize },
}

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error(transparent)]
    Format(#[from] MapFormatError),
    #[error(transparent)]
    Invalid(#[from] InvalidMapError),
    #[error(transparent)]
    Grid(#[from] GridError),
    #[error("Failed to read map file")]
    Io(#[from] io::Error),
}

/// Maps a map character to the entity it places. `Some(None)` is an empty
/// cell, `None` an unknown symbol.
fn parse_symbol(symbol: char) -> Option<Option<Entity>> {
    let entity = match symbol {
        ' ' | '.' => return Some(None),
        entity::PLAYER => Entity::player(),
        entity::HOSPITAL => Entity::Hospital,
        entity::ZOMBIE => Entity::Zombie,
        entity::TRACKING_ZOMBIE => Entity::TrackingZombie,
        entity::CROSSBOW => Entity::pickup(PickupKind::Crossbow),
        entity::GARLIC => Entity::pickup(PickupKind::Garlic),
        entity::TIME_MACHINE => Entity::pickup(PickupKind::TimeMachine),
        _ => return None,
    };
    Some(Some(entity))
}

/// Parses a map description into a grid.
///
/// One character per cell, one row per line. The map must be square and
/// contain exactly one player. Trailing empty lines are ignored, but a row of
/// spaces is a row of empty cells.
pub fn load_map(map_string: &str, ruleset: Ruleset) -> Result<Grid, LoadError> {
    let lines: Vec<&str> = map_string
        .lines()
        .map(|line| line.trim_end_matches('\r'))
        .collect();
    let end = lines
        .iter()
        .rposition(|line| !line.is_empty())
        .ok_or(MapFormatError::Empty)?;
    let rows = &lines[..=end];

    let width = rows[0].chars().count();
    for (y, row) in rows.iter().enumerate().skip(1) {
        let found = row.chars().count();
        if found != width {
            return Err(MapFormatError::InconsistentRow {
                row: y,
                expected: width,
                found,
            }
            .into());
        }
    }
    if rows.len() != width {
        return Err(MapFormatError::NotSquare {
            rows: rows.len(),
            columns: width,
        }
        .into());
    }

    let mut grid = Grid::new(width);
    let mut players = 0;

    for (y, row) in rows.iter().enumerate() {
        for (x, symbol) in row.chars().enumerate() {
            let entity = parse_symbol(symbol).ok_or(MapFormatError::UnknownSymbol { symbol, x, y })?;
            let Some(entity) = entity else {
                continue;
            };
            if !ruleset.allows(&entity) {
                return Err(MapFormatError::UnsupportedSymbol { symbol, x, y }.into());
            }
            if entity.is_player() {
                players += 1;
            }
            grid.add_entity(Position::new(x as i32, y as i32), entity)?;
        }
    }

    match players {
        0 => Err(InvalidMapError::NoPlayer.into()),
        1 => Ok(grid),
        count => Err(InvalidMapError::MultiplePlayers { count }.into()),
    }
}

/// Reads and parses a map file.
pub fn load_map_file(path: impl AsRef<Path>, ruleset: Ruleset) -> Result<Grid, LoadError> {
    let text = fs::read_to_string(path)?;
    load_map(&text, ruleset)
}
