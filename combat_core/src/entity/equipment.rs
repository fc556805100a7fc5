//! Worn equipment and the bonus array the equipment system computes

use crate::types::{Bonus, EquipmentSlot};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A stack of one item id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: u16,
    pub amount: u32,
}

impl Item {
    pub fn new(id: u16, amount: u32) -> Self {
        Item { id, amount }
    }

    pub fn single(id: u16) -> Self {
        Item { id, amount: 1 }
    }
}

/// Items worn by a player plus their summed bonuses
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Equipment {
    #[serde(default)]
    items: HashMap<EquipmentSlot, Item>,
    #[serde(default)]
    bonuses: [i32; Bonus::COUNT],
}

impl Equipment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Put an item in a slot, returning whatever was there
    pub fn equip(&mut self, slot: EquipmentSlot, item: Item) -> Option<Item> {
        self.items.insert(slot, item)
    }

    pub fn unequip(&mut self, slot: EquipmentSlot) -> Option<Item> {
        self.items.remove(&slot)
    }

    pub fn item(&self, slot: EquipmentSlot) -> Option<&Item> {
        self.items.get(&slot)
    }

    pub fn item_id(&self, slot: EquipmentSlot) -> Option<u16> {
        self.items.get(&slot).map(|item| item.id)
    }

    /// Whether any slot holds the given item id
    pub fn contains(&self, id: u16) -> bool {
        self.items.values().any(|item| item.id == id)
    }

    /// Whether `slot` holds one of `ids`
    pub fn slot_matches(&self, slot: EquipmentSlot, ids: &[u16]) -> bool {
        self.item_id(slot).is_some_and(|id| ids.contains(&id))
    }

    /// Remove `amount` from the stack in `slot`, clearing the slot when empty.
    ///
    /// Returns the id of the consumed item, or `None` if the slot was empty.
    pub fn consume(&mut self, slot: EquipmentSlot, amount: u32) -> Option<u16> {
        let item = self.items.get_mut(&slot)?;
        if item.amount < amount {
            return None;
        }
        let id = item.id;
        item.amount -= amount;
        if item.amount == 0 {
            self.items.remove(&slot);
        }
        Some(id)
    }

    pub fn bonus(&self, bonus: Bonus) -> i32 {
        self.bonuses[bonus.index()]
    }

    pub fn set_bonus(&mut self, bonus: Bonus, value: i32) {
        self.bonuses[bonus.index()] = value;
    }

    /// Builder-style bonus setter
    pub fn with_bonus(mut self, bonus: Bonus, value: i32) -> Self {
        self.set_bonus(bonus, value);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_consume_clears_empty_slot() {
        let mut equipment = Equipment::new();
        equipment.equip(EquipmentSlot::Arrows, Item::new(882, 2));

        assert_eq!(equipment.consume(EquipmentSlot::Arrows, 1), Some(882));
        assert_eq!(equipment.item(EquipmentSlot::Arrows).map(|i| i.amount), Some(1));
        assert_eq!(equipment.consume(EquipmentSlot::Arrows, 1), Some(882));
        assert!(equipment.item(EquipmentSlot::Arrows).is_none());
        assert_eq!(equipment.consume(EquipmentSlot::Arrows, 1), None);
    }

    #[test]
    fn test_bonuses() {
        let equipment = Equipment::new()
            .with_bonus(Bonus::SlashAttack, 82)
            .with_bonus(Bonus::Strength, 82);
        assert_eq!(equipment.bonus(Bonus::SlashAttack), 82);
        assert_eq!(equipment.bonus(Bonus::CrushAttack), 0);
    }

    #[test]
    fn test_contains_and_slot_matches() {
        let mut equipment = Equipment::new();
        equipment.equip(EquipmentSlot::Weapon, Item::single(4151));
        assert!(equipment.contains(4151));
        assert!(equipment.slot_matches(EquipmentSlot::Weapon, &[4151, 4153]));
        assert!(!equipment.slot_matches(EquipmentSlot::Shield, &[4151]));
    }
}
