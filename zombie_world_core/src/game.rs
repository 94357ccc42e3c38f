use log::{debug, info};
use rand::{SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};

use crate::{
    Direction, Position,
    ai::Behaviour,
    entity::{Entity, PickupKind, Player},
    inventory::Inventory,
    loader::{LoadError, load_map},
    map::Grid,
};

/// Which entities a game supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Ruleset {
    /// Player, hospital and random zombies only.
    Basic,
    /// Adds tracking zombies and pickups.
    #[default]
    Advanced,
}

impl Ruleset {
    /// Whether `entity` may appear in a game played under this ruleset.
    pub fn allows(self, entity: &Entity) -> bool {
        match self {
            Ruleset::Advanced => true,
            Ruleset::Basic => matches!(
                entity,
                Entity::Player(_) | Entity::Hospital | Entity::Zombie
            ),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    InProgress,
    Won,
    Lost,
}

/// Represents the outcome of a player move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    Moved,
    PickedUp(PickupKind),
    Won,
    /// The player walked into an unprotected zombie.
    Killed,
    /// Active garlic kept the player from walking into a zombie.
    Repelled,
    OutOfBounds,
    /// The game is over or has no player.
    Ignored,
}

impl MoveOutcome {
    /// Whether the move counts towards [`Game::moves`].
    pub fn counts_as_move(self) -> bool {
        matches!(
            self,
            MoveOutcome::Moved | MoveOutcome::PickedUp(_) | MoveOutcome::Won | MoveOutcome::Killed
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FireOutcome {
    /// A zombie at this position was shot and removed.
    Hit(Position),
    Missed,
    /// The player has no active crossbow.
    NoWeapon,
    Ignored,
}

/// What happened during one tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepReport {
    /// Zombie moves as `(from, to)`.
    pub moved: Vec<(Position, Position)>,
    /// Items that ran out this tick.
    pub expired: Vec<PickupKind>,
    pub player_killed: bool,
}

/// The game state machine.
///
/// Owns the grid plus the move and step counters. Win and loss are derived
/// from the grid on every query, except that reaching the hospital is
/// remembered because the player replaces the hospital tile.
#[derive(Debug, Clone)]
pub struct Game {
    grid: Grid,
    moves: u32,
    steps: u32,
    won: bool,
    ruleset: Ruleset,
    rng: StdRng,
}

impl Game {
    pub fn new(grid: Grid, ruleset: Ruleset, seed: u64) -> Self {
        Game {
            grid,
            moves: 0,
            steps: 0,
            won: false,
            ruleset,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Parses `map` and starts a fresh game on it.
    pub fn from_map(map: &str, ruleset: Ruleset, seed: u64) -> Result<Self, LoadError> {
        let grid = load_map(map, ruleset)?;
        info!(
            "Starting {:?} game on a {}x{} map",
            ruleset,
            grid.size(),
            grid.size()
        );
        Ok(Self::new(grid, ruleset, seed))
    }

    pub(crate) fn with_counters(mut self, moves: u32, steps: u32, won: bool) -> Self {
        self.moves = moves;
        self.steps = steps;
        self.won = won;
        self
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }

    pub fn ruleset(&self) -> Ruleset {
        self.ruleset
    }

    /// Number of counted player moves so far.
    pub fn moves(&self) -> u32 {
        self.moves
    }

    /// Number of ticks so far.
    pub fn steps(&self) -> u32 {
        self.steps
    }

    pub fn player(&self) -> Option<&Player> {
        let position = self.grid.find_player()?;
        self.grid.get_entity(position)?.as_player()
    }

    pub fn player_mut(&mut self) -> Option<&mut Player> {
        let position = self.grid.find_player()?;
        self.grid.get_entity_mut(position)?.as_player_mut()
    }

    pub fn inventory(&self) -> Option<&Inventory> {
        self.player().map(Player::inventory)
    }

    pub fn inventory_mut(&mut self) -> Option<&mut Inventory> {
        self.player_mut().map(Player::inventory_mut)
    }

    pub fn direction_to_offset(&self, direction: Direction) -> Position {
        direction.offset()
    }

    pub fn status(&self) -> GameStatus {
        if self.won {
            GameStatus::Won
        } else if self.grid.find_player().is_none() {
            GameStatus::Lost
        } else {
            GameStatus::InProgress
        }
    }

    pub fn has_won(&self) -> bool {
        self.status() == GameStatus::Won
    }

    pub fn has_lost(&self) -> bool {
        self.status() == GameStatus::Lost
    }

    pub fn is_over(&self) -> bool {
        self.status() != GameStatus::InProgress
    }

    /// Moves the player by `offset`.
    pub fn move_player(&mut self, offset: Position) -> MoveOutcome {
        if self.is_over() {
            return MoveOutcome::Ignored;
        }
        let Some(from) = self.grid.find_player() else {
            return MoveOutcome::Ignored;
        };
        let target = from + offset;
        if !self.grid.in_bounds(target) {
            return MoveOutcome::OutOfBounds;
        }

        let outcome = match self.grid.get_entity(target) {
            None => {
                self.grid.move_entity(from, target);
                MoveOutcome::Moved
            }
            Some(Entity::Hospital) => {
                self.grid.move_entity(from, target);
                self.won = true;
                MoveOutcome::Won
            }
            Some(entity) if entity.is_zombie() => {
                if self.zombie_contact(from) {
                    MoveOutcome::Killed
                } else {
                    MoveOutcome::Repelled
                }
            }
            Some(Entity::Pickup(_)) => match self.grid.remove_entity(target) {
                Some(Entity::Pickup(item)) => {
                    let kind = item.kind();
                    self.grid.move_entity(from, target);
                    if let Some(inventory) = self.inventory_mut() {
                        inventory.add_item(item);
                    }
                    debug!("Picked up {} at {}", kind.name(), target);
                    MoveOutcome::PickedUp(kind)
                }
                _ => MoveOutcome::Ignored,
            },
            Some(_) => MoveOutcome::Ignored,
        };

        if outcome.counts_as_move() {
            self.moves += 1;
        }
        match outcome {
            MoveOutcome::Won => info!("Reached the hospital after {} moves", self.moves),
            MoveOutcome::Killed => info!("Walked into a zombie at {}", target),
            _ => {}
        }
        outcome
    }

    /// Moves the player one cell in `direction`.
    pub fn move_in(&mut self, direction: Direction) -> MoveOutcome {
        self.move_player(self.direction_to_offset(direction))
    }

    /// Shoots the active crossbow in `direction`, killing the first zombie in
    /// line. Does not advance time.
    pub fn fire(&mut self, direction: Direction) -> FireOutcome {
        if self.is_over() {
            return FireOutcome::Ignored;
        }
        let Some(start) = self.grid.find_player() else {
            return FireOutcome::Ignored;
        };
        let armed = self
            .inventory()
            .is_some_and(|inventory| inventory.has_active(PickupKind::Crossbow));
        if !armed {
            return FireOutcome::NoWeapon;
        }

        let offset = self.direction_to_offset(direction);
        match self.grid.first_in_direction(start, offset) {
            Some((position, entity)) if entity.is_zombie() => {
                self.grid.remove_entity(position);
                info!("Shot zombie at {}", position);
                FireOutcome::Hit(position)
            }
            _ => FireOutcome::Missed,
        }
    }

    /// Toggles the inventory item at `index`, keeping at most one active.
    pub fn toggle_item(&mut self, index: usize) -> Option<PickupKind> {
        if self.is_over() {
            return None;
        }
        self.inventory_mut()?.toggle_active(index)
    }

    /// Advances the world by one tick: zombies move, then active items age.
    ///
    /// Returns `None` once the game is over.
    pub fn step(&mut self) -> Option<StepReport> {
        if self.is_over() {
            return None;
        }
        self.steps += 1;
        let mut report = StepReport::default();

        let zombies: Vec<(Position, Behaviour)> = self
            .grid
            .entities()
            .filter_map(|(position, entity)| Behaviour::of(entity).map(|b| (position, b)))
            .collect();

        for (position, behaviour) in zombies {
            if self.grid.get_entity(position).and_then(Behaviour::of) != Some(behaviour) {
                continue;
            }
            let Some(next) = behaviour.next_position(&self.grid, position, &mut self.rng) else {
                continue;
            };
            if self.grid.get_entity(next).is_some_and(Entity::is_player) {
                if !self.zombie_contact(next) {
                    continue;
                }
                report.player_killed = true;
                info!("Caught by a zombie at {} on step {}", next, self.steps);
            }
            self.grid.move_entity(position, next);
            report.moved.push((position, next));
            debug!("{:?} zombie moved {} -> {}", behaviour, position, next);
        }

        if let Some(inventory) = self.inventory_mut() {
            report.expired = inventory.step();
        }
        for kind in &report.expired {
            debug!("{} expired on step {}", kind.name(), self.steps);
        }
        Some(report)
    }

    /// Deep copy of the whole game, including the random state.
    pub fn snapshot(&self) -> Game {
        self.clone()
    }

    /// Deep copy with every item of `kind` removed from the grid and from the
    /// player's inventory.
    pub fn snapshot_without(&self, kind: PickupKind) -> Game {
        let mut snapshot = self.clone();
        snapshot.grid.retain(|entity| match entity {
            Entity::Pickup(item) => item.kind() != kind,
            Entity::Player(player) => {
                player.inventory_mut().remove_kind(kind);
                true
            }
            _ => true,
        });
        snapshot
    }

    /// A zombie touches the player standing at `player_position`. Returns
    /// true if the player was infected and removed from the grid.
    fn zombie_contact(&mut self, player_position: Position) -> bool {
        let infected = self
            .grid
            .get_entity_mut(player_position)
            .and_then(Entity::as_player_mut)
            .is_some_and(|player| player.infect());
        if infected {
            self.grid.remove_entity(player_position);
        }
        infected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Pickup;

    fn pos(x: i32, y: i32) -> Position {
        Position::new(x, y)
    }

    fn game(map: &str) -> Game {
        Game::from_map(map, Ruleset::Advanced, 7).unwrap()
    }

    /// A player at `at` holding `items`, with the item at `active` switched on.
    fn armed_game(size: usize, at: Position, items: &[PickupKind], active: Option<usize>) -> Game {
        let mut player = Player::new();
        for kind in items {
            player.inventory_mut().add_item(Pickup::new(*kind));
        }
        if let Some(index) = active {
            player.inventory_mut().toggle_active(index);
        }
        let mut grid = Grid::new(size);
        grid.add_entity(at, Entity::Player(player)).unwrap();
        Game::new(grid, Ruleset::Advanced, 1)
    }

    #[test]
    fn move_into_empty_cell() {
        let mut game = game("P..\n...\n..H");
        assert_eq!(game.move_in(Direction::Right), MoveOutcome::Moved);
        assert_eq!(game.grid().find_player(), Some(pos(1, 0)));
        assert!(game.grid().get_entity(pos(0, 0)).is_none());
        assert_eq!(game.moves(), 1);
        assert_eq!(game.steps(), 0);
    }

    #[test]
    fn move_out_of_bounds_is_noop() {
        let mut game = game("P..\n...\n..H");
        assert_eq!(game.move_in(Direction::Up), MoveOutcome::OutOfBounds);
        assert_eq!(game.move_in(Direction::Left), MoveOutcome::OutOfBounds);
        assert_eq!(game.grid().find_player(), Some(pos(0, 0)));
        assert_eq!(game.moves(), 0);
    }

    #[test]
    fn pickup_moves_from_grid_into_inventory() {
        let mut game = game("PC.\n...\n..H");
        assert_eq!(
            game.move_in(Direction::Right),
            MoveOutcome::PickedUp(PickupKind::Crossbow)
        );
        assert_eq!(game.grid().serialize().get(&pos(1, 0)), Some(&'P'));
        assert_eq!(game.grid().serialize().values().filter(|c| **c == 'C').count(), 0);
        let inventory = game.inventory().unwrap();
        assert_eq!(inventory.len(), 1);
        assert_eq!(inventory.items()[0].kind(), PickupKind::Crossbow);
        assert!(!inventory.items()[0].is_active());
    }

    #[test]
    fn reaching_hospital_wins_and_freezes() {
        let mut game = game("PH.\n...\n..Z");
        assert_eq!(game.move_in(Direction::Right), MoveOutcome::Won);
        assert!(game.has_won());
        assert!(!game.has_lost());
        assert_eq!(game.status(), GameStatus::Won);

        let before = game.grid().clone();
        assert_eq!(game.move_in(Direction::Down), MoveOutcome::Ignored);
        assert!(game.step().is_none());
        assert_eq!(game.fire(Direction::Down), FireOutcome::Ignored);
        assert_eq!(game.grid(), &before);
        assert_eq!(game.moves(), 1);
        assert_eq!(game.steps(), 0);
    }

    #[test]
    fn walking_into_zombie_loses() {
        let mut game = game("PZ.\n...\n..H");
        assert_eq!(game.move_in(Direction::Right), MoveOutcome::Killed);
        assert!(game.has_lost());
        assert!(!game.has_won());
        assert_eq!(game.grid().find_player(), None);
        assert_eq!(game.grid().get_entity(pos(1, 0)), Some(&Entity::Zombie));
        assert_eq!(game.move_in(Direction::Down), MoveOutcome::Ignored);
    }

    #[test]
    fn garlic_repels_zombie_contact() {
        let mut game = armed_game(3, pos(0, 0), &[PickupKind::Garlic], Some(0));
        game.grid_mut().add_entity(pos(1, 0), Entity::Zombie).unwrap();

        assert_eq!(game.move_in(Direction::Right), MoveOutcome::Repelled);
        assert_eq!(game.grid().find_player(), Some(pos(0, 0)));
        assert_eq!(game.grid().get_entity(pos(1, 0)), Some(&Entity::Zombie));
        assert!(!game.has_lost());
        assert_eq!(game.moves(), 0);
        assert!(!game.player().unwrap().is_infected());
    }

    #[test]
    fn inactive_garlic_does_not_protect() {
        let mut game = armed_game(3, pos(0, 0), &[PickupKind::Garlic], None);
        game.grid_mut().add_entity(pos(0, 1), Entity::TrackingZombie).unwrap();
        assert_eq!(game.move_in(Direction::Down), MoveOutcome::Killed);
        assert!(game.has_lost());
    }

    #[test]
    fn tracking_zombie_hunts_player_down() {
        let mut game = game("T.P\n...\n..H");
        let report = game.step().unwrap();
        assert_eq!(report.moved, vec![(pos(0, 0), pos(1, 0))]);
        assert!(!report.player_killed);
        assert!(!game.has_lost());

        let report = game.step().unwrap();
        assert!(report.player_killed);
        assert!(game.has_lost());
        assert_eq!(game.grid().get_entity(pos(2, 0)), Some(&Entity::TrackingZombie));
        assert_eq!(game.steps(), 2);
        assert!(game.step().is_none());
    }

    #[test]
    fn garlic_holds_tracking_zombie_off() {
        let mut game = armed_game(3, pos(0, 0), &[PickupKind::Garlic], Some(0));
        game.grid_mut().add_entity(pos(1, 0), Entity::TrackingZombie).unwrap();

        let report = game.step().unwrap();
        assert!(!report.player_killed);
        assert!(report.moved.is_empty());
        assert_eq!(game.grid().get_entity(pos(1, 0)), Some(&Entity::TrackingZombie));
        assert_eq!(game.inventory().unwrap().items()[0].lifetime(), 9);
    }

    #[test]
    fn random_zombies_only_enter_empty_cells() {
        let mut game = game("Z.Z.Z\n.Z.Z.\nZ.P.Z\n.Z.Z.\nZ.Z.H");
        let count = game.grid().entities().count();
        for _ in 0..40 {
            game.step().unwrap();
            assert_eq!(game.grid().entities().count(), count);
            assert_eq!(game.grid().find_player(), Some(pos(2, 2)));
            assert_eq!(game.grid().get_entity(pos(4, 4)), Some(&Entity::Hospital));
        }
        assert_eq!(game.steps(), 40);
        assert_eq!(game.moves(), 0);
    }

    #[test]
    fn lifetime_decays_per_step_not_per_move() {
        let mut game = armed_game(5, pos(0, 0), &[PickupKind::Crossbow], Some(0));
        game.move_in(Direction::Right);
        game.move_in(Direction::Down);
        assert_eq!(game.inventory().unwrap().items()[0].lifetime(), 5);

        for expected in [4, 3, 2, 1] {
            let report = game.step().unwrap();
            assert!(report.expired.is_empty());
            assert_eq!(game.inventory().unwrap().items()[0].lifetime(), expected);
        }
        let report = game.step().unwrap();
        assert_eq!(report.expired, vec![PickupKind::Crossbow]);
        assert!(game.inventory().unwrap().is_empty());
    }

    #[test]
    fn held_but_inactive_items_keep_lifetime() {
        let mut game = armed_game(3, pos(0, 0), &[PickupKind::Garlic], None);
        game.step();
        game.step();
        assert_eq!(game.inventory().unwrap().items()[0].lifetime(), 10);
    }

    #[test]
    fn fire_needs_active_crossbow() {
        let mut game = armed_game(5, pos(0, 0), &[PickupKind::Crossbow], None);
        game.grid_mut().add_entity(pos(3, 0), Entity::Zombie).unwrap();
        assert_eq!(game.fire(Direction::Right), FireOutcome::NoWeapon);
        assert!(game.grid().get_entity(pos(3, 0)).is_some());
    }

    #[test]
    fn fire_kills_first_zombie_in_line() {
        let mut game = armed_game(5, pos(0, 0), &[PickupKind::Crossbow], Some(0));
        game.grid_mut().add_entity(pos(2, 0), Entity::TrackingZombie).unwrap();
        game.grid_mut().add_entity(pos(4, 0), Entity::Zombie).unwrap();

        assert_eq!(game.fire(Direction::Right), FireOutcome::Hit(pos(2, 0)));
        assert!(game.grid().get_entity(pos(2, 0)).is_none());
        assert_eq!(game.grid().get_entity(pos(4, 0)), Some(&Entity::Zombie));
        assert_eq!(game.grid().find_player(), Some(pos(0, 0)));
        assert_eq!(game.moves(), 0);
        assert_eq!(game.steps(), 0);
        assert_eq!(game.inventory().unwrap().items()[0].lifetime(), 5);
    }

    #[test]
    fn fire_blocked_by_non_zombie() {
        let mut game = armed_game(5, pos(0, 0), &[PickupKind::Crossbow], Some(0));
        game.grid_mut().add_entity(pos(0, 2), Entity::Hospital).unwrap();
        game.grid_mut().add_entity(pos(0, 4), Entity::Zombie).unwrap();
        assert_eq!(game.fire(Direction::Down), FireOutcome::Missed);
        assert_eq!(game.fire(Direction::Left), FireOutcome::Missed);
        assert_eq!(game.grid().entities().count(), 3);
    }

    #[test]
    fn toggle_item_keeps_single_active() {
        let mut game = armed_game(
            3,
            pos(0, 0),
            &[PickupKind::Crossbow, PickupKind::Garlic],
            None,
        );
        assert_eq!(game.toggle_item(0), Some(PickupKind::Crossbow));
        assert_eq!(game.toggle_item(1), Some(PickupKind::Garlic));
        let inventory = game.inventory().unwrap();
        assert!(inventory.has_active(PickupKind::Garlic));
        assert_eq!(inventory.items().iter().filter(|i| i.is_active()).count(), 1);
        assert_eq!(game.toggle_item(9), None);
    }

    #[test]
    fn snapshot_is_independent() {
        let mut game = game("PG.\nC..\nZ.H");
        game.move_in(Direction::Right);
        let original = game.snapshot();

        game.toggle_item(0);
        game.move_in(Direction::Down);
        game.step();
        game.grid_mut().remove_entity(pos(0, 1));

        assert_eq!(original.moves(), 1);
        assert_eq!(original.steps(), 0);
        assert_eq!(original.grid().find_player(), Some(pos(1, 0)));
        assert_eq!(original.grid().get_entity(pos(0, 1)).map(Entity::display), Some('C'));
        let inventory = original.inventory().unwrap();
        assert_eq!(inventory.len(), 1);
        assert!(!inventory.items()[0].is_active());
        assert_eq!(inventory.items()[0].lifetime(), 10);
    }

    #[test]
    fn snapshot_without_strips_kind() {
        let mut game = game("PM.\n.M.\n..H");
        game.move_in(Direction::Right);
        assert_eq!(game.inventory().unwrap().len(), 1);

        let stripped = game.snapshot_without(PickupKind::TimeMachine);
        assert!(stripped.inventory().unwrap().is_empty());
        assert!(!stripped.grid().serialize().values().any(|c| *c == 'M'));
        assert_eq!(game.inventory().unwrap().len(), 1);
    }

    #[test]
    fn same_seed_same_world() {
        let map = "Z...Z\n.....\n..P..\n.....\nZ...H";
        let mut a = Game::from_map(map, Ruleset::Basic, 99).unwrap();
        let mut b = Game::from_map(map, Ruleset::Basic, 99).unwrap();
        for _ in 0..10 {
            assert_eq!(a.step(), b.step());
        }
        assert_eq!(a.grid(), b.grid());
    }
}
