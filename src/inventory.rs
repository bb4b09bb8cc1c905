use crate::error::StoreError;
use crate::group::DataGroup;
use std::collections::BTreeMap;

pub const INVENTORY_KEY: &str = "inventory";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Inventory {
    items: BTreeMap<i32, i32>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_group(player: &DataGroup) -> Self {
        let stored: BTreeMap<i32, i32> = player.get(INVENTORY_KEY).unwrap_or_default();
        let mut inventory = Self::new();
        for (id, count) in stored {
            inventory.add(id, count);
        }
        inventory
    }

    pub fn add(&mut self, id: i32, count: i32) {
        if count <= 0 {
            return;
        }
        let slot = self.items.entry(id).or_insert(0);
        *slot = slot.saturating_add(count);
    }

    pub fn count(&self, id: i32) -> i32 {
        self.items.get(&id).copied().unwrap_or(0)
    }

    /// Takes `count` of an item. Returns false, changing nothing, when
    /// there are not enough.
    pub fn remove(&mut self, id: i32, count: i32) -> bool {
        if count <= 0 {
            return count == 0;
        }
        let have = self.count(id);
        if have < count {
            return false;
        }
        if have == count {
            self.items.remove(&id);
        } else {
            self.items.insert(id, have - count);
        }
        true
    }

    pub fn items(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.items.iter().map(|(id, count)| (*id, *count))
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn write_to(&self, player: &mut DataGroup) -> Result<(), StoreError> {
        player.set(INVENTORY_KEY, self.items.clone())
    }
}
