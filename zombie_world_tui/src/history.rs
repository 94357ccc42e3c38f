use std::collections::VecDeque;

use zombie_world_core::{entity::PickupKind, game::Game};

/// Recent game states kept for the time machine.
///
/// A snapshot is recorded after every counted move, with time machines
/// stripped so a rewind cannot be chained. Holds `depth + 1` states, the
/// oldest being the one `depth` moves back.
#[derive(Debug)]
pub struct History {
    depth: usize,
    snapshots: VecDeque<Game>,
}

impl History {
    pub fn new(depth: usize) -> Self {
        History {
            depth,
            snapshots: VecDeque::with_capacity(depth + 1),
        }
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn record(&mut self, game: &Game) {
        self.snapshots
            .push_back(game.snapshot_without(PickupKind::TimeMachine));
        while self.snapshots.len() > self.depth + 1 {
            self.snapshots.pop_front();
        }
    }

    /// Takes the state from `depth` moves ago. `None` means not enough moves
    /// have been made and the caller should restart instead.
    pub fn rewind(&mut self) -> Option<Game> {
        if self.snapshots.len() <= self.depth {
            return None;
        }
        let game = self.snapshots.pop_front()?;
        self.snapshots.clear();
        self.snapshots.push_back(game.clone());
        Some(game)
    }

    pub fn clear(&mut self) {
        self.snapshots.clear();
    }
}
