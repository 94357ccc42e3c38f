use rand::Rng;

use crate::{Direction, Position, entity::Entity, map::Grid};

/// How a zombie chooses where to go each step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behaviour {
    /// Wanders to a random free neighbour.
    Random,
    /// Closes in on the player one cell at a time.
    Tracking,
}

impl Behaviour {
    /// Returns the behaviour driving `entity`, or `None` for non-zombies.
    pub fn of(entity: &Entity) -> Option<Behaviour> {
        match entity {
            Entity::Zombie => Some(Behaviour::Random),
            Entity::TrackingZombie => Some(Behaviour::Tracking),
            _ => None,
        }
    }

    /// Picks the next cell for a zombie at `position`. `None` means stay put.
    pub fn next_position<R: Rng + ?Sized>(
        self,
        grid: &Grid,
        position: Position,
        rng: &mut R,
    ) -> Option<Position> {
        match self {
            Behaviour::Random => random_step(grid, position, rng),
            Behaviour::Tracking => tracking_step(grid, position, grid.find_player()),
        }
    }
}

/// In-bounds, unoccupied cardinal neighbours of `position`, in
/// [`Direction::ALL`] order.
pub fn open_neighbours(grid: &Grid, position: Position) -> Vec<Position> {
    Direction::ALL
        .iter()
        .map(|direction| position + direction.offset())
        .filter(|neighbour| grid.in_bounds(*neighbour) && grid.get_entity(*neighbour).is_none())
        .collect()
}

/// Uniformly random free neighbour, or `None` when boxed in.
pub fn random_step<R: Rng + ?Sized>(
    grid: &Grid,
    position: Position,
    rng: &mut R,
) -> Option<Position> {
    let options = open_neighbours(grid, position);
    if options.is_empty() {
        return None;
    }
    Some(options[rng.random_range(0..options.len())])
}

/// One greedy step from `position` towards `target`.
///
/// The axis with the larger distance goes first (x on ties); the other axis
/// is tried if the first is blocked. A step is only taken into an empty cell
/// or onto the player.
pub fn tracking_step(grid: &Grid, position: Position, target: Option<Position>) -> Option<Position> {
    let target = target?;
    let dx = target.x - position.x;
    let dy = target.y - position.y;

    let along_x = Position::new(dx.signum(), 0);
    let along_y = Position::new(0, dy.signum());
    let candidates = if dx.abs() >= dy.abs() {
        [along_x, along_y]
    } else {
        [along_y, along_x]
    };

    candidates
        .into_iter()
        .filter(|step| *step != Position::ZERO)
        .map(|step| position + step)
        .find(|next| {
            grid.in_bounds(*next)
                && match grid.get_entity(*next) {
                    None => true,
                    Some(entity) => entity.is_player(),
                }
        })
}
