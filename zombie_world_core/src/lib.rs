use std::{fmt, ops::Add, str::FromStr};

use serde::{Deserialize, Serialize};

pub mod ai;
pub mod entity;
pub mod game;
pub mod inventory;
pub mod loader;
pub mod map;
pub mod save;

/// Represents a 2D grid coordinate (not pixels).
///
/// Also used for direction offsets, which may be negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const ZERO: Position = Position { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Position { x, y }
    }

    /// Component-wise sum, used to apply a direction offset.
    pub fn add(self, offset: Position) -> Position {
        Position {
            x: self.x + offset.x,
            y: self.y + offset.y,
        }
    }
}

impl Add for Position {
    type Output = Position;

    fn add(self, rhs: Position) -> Position {
        Position::add(self, rhs)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// The four cardinal directions a player can move or fire in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Unit offset for this direction. `y` grows downwards.
    pub const fn offset(self) -> Position {
        match self {
            Direction::Up => Position::new(0, -1),
            Direction::Down => Position::new(0, 1),
            Direction::Left => Position::new(-1, 0),
            Direction::Right => Position::new(1, 0),
        }
    }
}

/// Returned when a direction symbol is not one of the four cardinal ones.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid direction '{0}', expected one of W, A, S, D")]
pub struct InvalidDirection(pub String);

impl FromStr for Direction {
    type Err = InvalidDirection;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "w" | "up" => Ok(Direction::Up),
            "s" | "down" => Ok(Direction::Down),
            "a" | "left" => Ok(Direction::Left),
            "d" | "right" => Ok(Direction::Right),
            _ => Err(InvalidDirection(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_applies_offset() {
        let p = Position::new(2, 3);
        assert_eq!(p.add(Direction::Up.offset()), Position::new(2, 2));
        assert_eq!(p + Direction::Left.offset(), Position::new(1, 3));
    }

    #[test]
    fn offsets_match_screen_axes() {
        assert_eq!(Direction::Up.offset(), Position::new(0, -1));
        assert_eq!(Direction::Down.offset(), Position::new(0, 1));
        assert_eq!(Direction::Left.offset(), Position::new(-1, 0));
        assert_eq!(Direction::Right.offset(), Position::new(1, 0));
    }

    #[test]
    fn parses_key_symbols_and_names() {
        assert_eq!("W".parse::<Direction>(), Ok(Direction::Up));
        assert_eq!("a".parse::<Direction>(), Ok(Direction::Left));
        assert_eq!("down".parse::<Direction>(), Ok(Direction::Down));
        assert_eq!("Right".parse::<Direction>(), Ok(Direction::Right));
    }

    #[test]
    fn rejects_unknown_direction() {
        let err = "x".parse::<Direction>().unwrap_err();
        assert_eq!(err, InvalidDirection("x".to_string()));
    }
}
