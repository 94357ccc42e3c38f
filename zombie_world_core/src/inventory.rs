use serde::{Deserialize, Serialize};

use crate::entity::{Pickup, PickupKind};

/// Items held by the player, in pickup order.
///
/// At most one item is active at any time. Activation only happens through
/// [`Inventory::toggle_active`], which deactivates the previous item first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    items: Vec<Pickup>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[Pickup] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Appends an item. An item picked up while active is added inactive so
    /// the single-active rule still holds.
    pub fn add_item(&mut self, mut item: Pickup) {
        if item.is_active() && self.active_item().is_some() {
            item.set_active(false);
        }
        self.items.push(item);
    }

    /// Flips the item at `index`. Activating an item deactivates whichever
    /// item was active before.
    ///
    /// Returns the kind of the toggled item, or `None` if `index` is out of
    /// range.
    pub fn toggle_active(&mut self, index: usize) -> Option<PickupKind> {
        if index >= self.items.len() {
            return None;
        }
        if !self.items[index].is_active() {
            for item in self.items.iter_mut().filter(|item| item.is_active()) {
                item.set_active(false);
            }
        }
        let item = &mut self.items[index];
        item.toggle_active();
        Some(item.kind())
    }

    pub fn active_item(&self) -> Option<&Pickup> {
        self.items.iter().find(|item| item.is_active())
    }

    pub fn has_active(&self, kind: PickupKind) -> bool {
        self.active_item().is_some_and(|item| item.kind() == kind)
    }

    /// Ages every active item by one step and drops the ones that ran out.
    ///
    /// Returns the kinds of the expired items.
    pub fn step(&mut self) -> Vec<PickupKind> {
        let mut expired = Vec::new();
        for item in self.items.iter_mut().filter(|item| item.is_active()) {
            item.hold();
            if item.lifetime() == 0 {
                item.set_active(false);
                expired.push(item.kind());
            }
        }
        if !expired.is_empty() {
            self.items.retain(|item| item.lifetime() > 0);
        }
        expired
    }

    /// Drops every held item of `kind`.
    pub fn remove_kind(&mut self, kind: PickupKind) {
        self.items.retain(|item| item.kind() != kind);
    }
}
