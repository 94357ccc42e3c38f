use serde::{Deserialize, Serialize};

use crate::inventory::Inventory;

pub const PLAYER: char = 'P';
pub const HOSPITAL: char = 'H';
pub const ZOMBIE: char = 'Z';
pub const TRACKING_ZOMBIE: char = 'T';
pub const CROSSBOW: char = 'C';
pub const GARLIC: char = 'G';
pub const TIME_MACHINE: char = 'M';

/// The kinds of item a player can pick up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PickupKind {
    Crossbow,
    Garlic,
    TimeMachine,
}

impl PickupKind {
    /// Number of active steps an item of this kind lasts.
    pub const fn default_lifetime(self) -> u32 {
        match self {
            PickupKind::Crossbow => 5,
            PickupKind::Garlic => 10,
            PickupKind::TimeMachine => 1,
        }
    }

    pub const fn symbol(self) -> char {
        match self {
            PickupKind::Crossbow => CROSSBOW,
            PickupKind::Garlic => GARLIC,
            PickupKind::TimeMachine => TIME_MACHINE,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            PickupKind::Crossbow => "Crossbow",
            PickupKind::Garlic => "Garlic",
            PickupKind::TimeMachine => "TimeMachine",
        }
    }
}

/// An item with a finite lifetime, either lying on the grid or held.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pickup {
    kind: PickupKind,
    lifetime: u32,
    active: bool,
}

impl Pickup {
    pub fn new(kind: PickupKind) -> Self {
        Self::with_lifetime(kind, kind.default_lifetime())
    }

    pub fn with_lifetime(kind: PickupKind, lifetime: u32) -> Self {
        Pickup {
            kind,
            lifetime,
            active: false,
        }
    }

    pub fn kind(&self) -> PickupKind {
        self.kind
    }

    /// Steps remaining before the item is used up.
    pub fn lifetime(&self) -> u32 {
        self.lifetime
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn display(&self) -> char {
        self.kind.symbol()
    }

    // Activation goes through `Inventory::toggle_active`, which keeps at most
    // one item active.
    pub(crate) fn toggle_active(&mut self) {
        self.active = !self.active;
    }

    pub(crate) fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    /// Uses up one step of lifetime.
    pub(crate) fn hold(&mut self) {
        self.lifetime = self.lifetime.saturating_sub(1);
    }
}

/// The controlled entity. Always carries an inventory, which may be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    infected: bool,
    inventory: Inventory,
}

impl Player {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_infected(&self) -> bool {
        self.infected
    }

    /// Infects the player unless active garlic protects them.
    ///
    /// Returns whether the infection took hold.
    pub fn infect(&mut self) -> bool {
        if self.inventory.has_active(PickupKind::Garlic) {
            return false;
        }
        self.infected = true;
        true
    }

    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    pub fn inventory_mut(&mut self) -> &mut Inventory {
        &mut self.inventory
    }
}

/// Everything that can occupy a grid cell.
///
/// Serialized with an explicit `entity` tag so saved games do not depend on
/// type names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "entity")]
pub enum Entity {
    Zombie,
    TrackingZombie,
    Player(Player),
    Hospital,
    Pickup(Pickup),
}

impl Entity {
    pub fn player() -> Self {
        Entity::Player(Player::new())
    }

    pub fn pickup(kind: PickupKind) -> Self {
        Entity::Pickup(Pickup::new(kind))
    }

    /// Single-character symbol used by renderers.
    pub fn display(&self) -> char {
        match self {
            Entity::Zombie => ZOMBIE,
            Entity::TrackingZombie => TRACKING_ZOMBIE,
            Entity::Player(_) => PLAYER,
            Entity::Hospital => HOSPITAL,
            Entity::Pickup(pickup) => pickup.display(),
        }
    }

    pub fn is_zombie(&self) -> bool {
        matches!(self, Entity::Zombie | Entity::TrackingZombie)
    }

    pub fn is_player(&self) -> bool {
        matches!(self, Entity::Player(_))
    }

    pub fn as_player(&self) -> Option<&Player> {
        match self {
            Entity::Player(player) => Some(player),
            _ => None,
        }
    }

    pub fn as_player_mut(&mut self) -> Option<&mut Player> {
        match self {
            Entity::Player(player) => Some(player),
            _ => None,
        }
    }
}
