use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{Position, entity::Entity};

/// Represents errors that can occur within the grid operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    #[error("Position ({x}, {y}) is out of bounds for grid size {size}")]
    OutOfBounds { x: i32, y: i32, size: usize },
    #[error("Grid of size {size} expects {expected} cells, found {found}")]
    CellCount {
        size: usize,
        expected: usize,
        found: usize,
    },
    #[error("Grid size {size} is too large")]
    TooLarge { size: usize },
}

/// A square grid holding at most one entity per cell.
///
/// Cells are stored in a flat vector using row-major order. Positions that
/// hold `None` are empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    size: usize,
    cells: Vec<Option<Entity>>,
}

impl Grid {
    /// Creates an empty `size × size` grid.
    ///
    /// # Panics
    ///
    /// Panics if `size * size` overflows `usize`.
    pub fn new(size: usize) -> Self {
        let cells = size.checked_mul(size).expect("Grid size overflow");
        Grid {
            size,
            cells: vec![None; cells],
        }
    }

    /// Checks that the cell vector matches the side length. Deserialized grids
    /// go through this before use.
    pub fn validate(&self) -> Result<(), GridError> {
        let expected = self
            .size
            .checked_mul(self.size)
            .ok_or(GridError::TooLarge { size: self.size })?;
        if self.cells.len() != expected {
            return Err(GridError::CellCount {
                size: self.size,
                expected,
                found: self.cells.len(),
            });
        }
        Ok(())
    }

    /// Returns the side length of the grid.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Converts a position to a flat vector index.
    ///
    /// Returns `None` if the position is out of bounds.
    #[inline]
    pub fn position_to_index(&self, position: Position) -> Option<usize> {
        if self.in_bounds(position) {
            Some(position.y as usize * self.size + position.x as usize)
        } else {
            None
        }
    }

    /// Converts a flat vector index back to a position.
    #[inline]
    pub fn index_to_position(&self, index: usize) -> Option<Position> {
        if index < self.cells.len() {
            Some(Position::new(
                (index % self.size) as i32,
                (index / self.size) as i32,
            ))
        } else {
            None
        }
    }

    /// True iff `0 <= x < size` and `0 <= y < size`.
    #[inline]
    pub fn in_bounds(&self, position: Position) -> bool {
        position.x >= 0
            && position.y >= 0
            && (position.x as usize) < self.size
            && (position.y as usize) < self.size
    }

    /// Returns the occupant at `position`, or `None` if empty or out of bounds.
    pub fn get_entity(&self, position: Position) -> Option<&Entity> {
        let index = self.position_to_index(position)?;
        self.cells[index].as_ref()
    }

    pub fn get_entity_mut(&mut self, position: Position) -> Option<&mut Entity> {
        let index = self.position_to_index(position)?;
        self.cells[index].as_mut()
    }

    /// Places `entity` at `position`, replacing any previous occupant.
    ///
    /// Returns `Err(GridError::OutOfBounds)` if the position is invalid.
    pub fn add_entity(&mut self, position: Position, entity: Entity) -> Result<(), GridError> {
        let index = self
            .position_to_index(position)
            .ok_or(GridError::OutOfBounds {
                x: position.x,
                y: position.y,
                size: self.size,
            })?;
        self.cells[index] = Some(entity);
        Ok(())
    }

    /// Takes the occupant out of `position`, if any.
    pub fn remove_entity(&mut self, position: Position) -> Option<Entity> {
        let index = self.position_to_index(position)?;
        self.cells[index].take()
    }

    /// Moves whatever occupies `from` into `to`, returning the previous
    /// occupant of `to`. Does nothing if either position is out of bounds or
    /// `from` is empty.
    pub(crate) fn move_entity(&mut self, from: Position, to: Position) -> Option<Entity> {
        let from_index = self.position_to_index(from)?;
        let to_index = self.position_to_index(to)?;
        if from_index == to_index {
            return None;
        }
        let moving = self.cells[from_index].take()?;
        self.cells[to_index].replace(moving)
    }

    /// Returns the position of the player, scanning in row-major order.
    pub fn find_player(&self) -> Option<Position> {
        self.entities()
            .find_map(|(position, entity)| entity.is_player().then_some(position))
    }

    /// Sparse export of every occupied cell's display symbol.
    pub fn serialize(&self) -> HashMap<Position, char> {
        self.entities()
            .map(|(position, entity)| (position, entity.display()))
            .collect()
    }

    /// Walks from `start + offset` in steps of `offset` and returns the first
    /// occupied cell, or `None` once the ray leaves the grid.
    pub fn first_in_direction(
        &self,
        start: Position,
        offset: Position,
    ) -> Option<(Position, &Entity)> {
        if offset == Position::ZERO {
            return None;
        }
        let mut current = start + offset;
        while self.in_bounds(current) {
            if let Some(entity) = self.get_entity(current) {
                return Some((current, entity));
            }
            current = current + offset;
        }
        None
    }

    /// Returns an iterator over occupied cells in row-major order.
    pub fn entities(&self) -> impl Iterator<Item = (Position, &Entity)> {
        self.cells
            .iter()
            .enumerate()
            .filter_map(move |(index, cell)| {
                let entity = cell.as_ref()?;
                Some((self.index_to_position(index)?, entity))
            })
    }

    /// Positions of every entity matching `predicate`, in row-major order.
    pub fn positions_where<F>(&self, mut predicate: F) -> Vec<Position>
    where
        F: FnMut(&Entity) -> bool,
    {
        self.entities()
            .filter(|(_, entity)| predicate(entity))
            .map(|(position, _)| position)
            .collect()
    }

    /// Keeps only the entities for which `keep` returns true.
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&mut Entity) -> bool,
    {
        for cell in self.cells.iter_mut() {
            let drop = match cell {
                Some(entity) => !keep(entity),
                None => false,
            };
            if drop {
                *cell = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Direction, entity::PickupKind};

    fn pos(x: i32, y: i32) -> Position {
        Position::new(x, y)
    }

    #[test]
    fn bounds() {
        let grid = Grid::new(3);
        assert!(grid.in_bounds(pos(0, 0)));
        assert!(grid.in_bounds(pos(2, 2)));
        assert!(!grid.in_bounds(pos(3, 0)));
        assert!(!grid.in_bounds(pos(0, -1)));
        assert!(grid.get_entity(pos(-1, 5)).is_none());
    }

    #[test]
    fn add_overwrites_and_remove_takes() {
        let mut grid = Grid::new(3);
        grid.add_entity(pos(1, 1), Entity::Zombie).unwrap();
        grid.add_entity(pos(1, 1), Entity::Hospital).unwrap();
        assert_eq!(grid.get_entity(pos(1, 1)), Some(&Entity::Hospital));
        assert_eq!(grid.entities().count(), 1);

        assert_eq!(grid.remove_entity(pos(1, 1)), Some(Entity::Hospital));
        assert_eq!(grid.remove_entity(pos(1, 1)), None);
    }

    #[test]
    fn add_out_of_bounds_is_rejected() {
        let mut grid = Grid::new(2);
        let err = grid.add_entity(pos(2, 0), Entity::Zombie).unwrap_err();
        assert_eq!(err, GridError::OutOfBounds { x: 2, y: 0, size: 2 });
        assert!(grid.serialize().is_empty());
    }

    #[test]
    fn find_player_and_serialize() {
        let mut grid = Grid::new(4);
        assert_eq!(grid.find_player(), None);
        grid.add_entity(pos(3, 2), Entity::player()).unwrap();
        grid.add_entity(pos(0, 0), Entity::TrackingZombie).unwrap();
        assert_eq!(grid.find_player(), Some(pos(3, 2)));

        let symbols = grid.serialize();
        assert_eq!(symbols.len(), 2);
        assert_eq!(symbols[&pos(3, 2)], 'P');
        assert_eq!(symbols[&pos(0, 0)], 'T');
    }

    #[test]
    fn first_in_direction_returns_nearest() {
        let mut grid = Grid::new(6);
        grid.add_entity(pos(3, 1), Entity::Zombie).unwrap();
        grid.add_entity(pos(5, 1), Entity::Hospital).unwrap();

        let (hit, entity) = grid
            .first_in_direction(pos(0, 1), Direction::Right.offset())
            .unwrap();
        assert_eq!(hit, pos(3, 1));
        assert_eq!(entity, &Entity::Zombie);
    }

    #[test]
    fn first_in_direction_none_when_ray_exits() {
        let mut grid = Grid::new(4);
        grid.add_entity(pos(3, 3), Entity::Zombie).unwrap();
        assert!(grid.first_in_direction(pos(0, 1), Direction::Right.offset()).is_none());
        assert!(grid.first_in_direction(pos(0, 0), Direction::Up.offset()).is_none());
        assert!(grid.first_in_direction(pos(1, 1), Position::ZERO).is_none());
    }

    #[test]
    fn move_entity_returns_displaced_occupant() {
        let mut grid = Grid::new(3);
        grid.add_entity(pos(0, 0), Entity::TrackingZombie).unwrap();
        grid.add_entity(pos(1, 0), Entity::player()).unwrap();
        let displaced = grid.move_entity(pos(0, 0), pos(1, 0));
        assert!(displaced.is_some_and(|e| e.is_player()));
        assert_eq!(grid.get_entity(pos(1, 0)), Some(&Entity::TrackingZombie));
        assert!(grid.get_entity(pos(0, 0)).is_none());
    }

    #[test]
    fn clone_is_deep() {
        let mut grid = Grid::new(2);
        grid.add_entity(pos(0, 0), Entity::player()).unwrap();
        let mut copy = grid.clone();
        if let Some(player) = copy.get_entity_mut(pos(0, 0)).and_then(Entity::as_player_mut) {
            player
                .inventory_mut()
                .add_item(crate::entity::Pickup::new(PickupKind::Garlic));
        }
        copy.remove_entity(pos(0, 0));
        let original = grid.get_entity(pos(0, 0)).and_then(Entity::as_player).unwrap();
        assert!(original.inventory().is_empty());
    }

    #[test]
    fn validate_rejects_overflowing_size() {
        let grid: Grid = serde_json::from_str(r#"{"size":4294967296,"cells":[]}"#).unwrap();
        assert_eq!(
            grid.validate(),
            Err(GridError::TooLarge { size: 4294967296 })
        );
    }
}
