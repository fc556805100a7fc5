//! Slot list of every registered entity

use super::Entity;
use crate::types::EntityId;

/// Entities indexed by id. Slots are never reused, so a stale id resolves to
/// `None` instead of a different entity.
#[derive(Debug, Default)]
pub struct EntityList {
    slots: Vec<Option<Entity>>,
}

impl EntityList {
    pub fn new() -> Self {
        Self::default()
    }

    fn index(id: EntityId) -> Option<usize> {
        (id.0 as usize).checked_sub(1)
    }

    /// Register an entity, assigning its id
    pub fn insert(&mut self, mut entity: Entity) -> EntityId {
        let id = EntityId(self.slots.len() as u32 + 1);
        entity.id = id;
        self.slots.push(Some(entity));
        id
    }

    /// Remove an entity from the list, returning it
    pub fn remove(&mut self, id: EntityId) -> Option<Entity> {
        Self::index(id).and_then(|i| self.slots.get_mut(i)).and_then(Option::take)
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        Self::index(id).and_then(|i| self.slots.get(i)).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        Self::index(id).and_then(|i| self.slots.get_mut(i)).and_then(Option::as_mut)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.get(id).is_some()
    }

    /// Borrow two distinct entities mutably at once
    pub fn pair_mut(&mut self, a: EntityId, b: EntityId) -> Option<(&mut Entity, &mut Entity)> {
        let (ia, ib) = (Self::index(a)?, Self::index(b)?);
        if ia == ib || ia >= self.slots.len() || ib >= self.slots.len() {
            return None;
        }
        if ia < ib {
            let (left, right) = self.slots.split_at_mut(ib);
            Some((left[ia].as_mut()?, right[0].as_mut()?))
        } else {
            let (left, right) = self.slots.split_at_mut(ia);
            Some((right[0].as_mut()?, left[ib].as_mut()?))
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.slots.iter().flatten()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.slots.iter_mut().flatten()
    }

    /// Ids of every registered entity, in registration order
    pub fn ids(&self) -> Vec<EntityId> {
        self.iter().map(|e| e.id).collect()
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{PlayerState, Skills};
    use crate::types::Position;

    fn player(name: &str) -> Entity {
        Entity::new_player(PlayerState::new(name), Position::default(), Skills::new())
    }

    #[test]
    fn test_insert_assigns_ids() {
        let mut list = EntityList::new();
        let a = list.insert(player("a"));
        let b = list.insert(player("b"));
        assert_eq!(a, EntityId(1));
        assert_eq!(b, EntityId(2));
        assert_eq!(list.get(b).map(|e| e.name()), Some("b"));
        assert!(list.get(EntityId(0)).is_none());
    }

    #[test]
    fn test_pair_mut_either_order() {
        let mut list = EntityList::new();
        let a = list.insert(player("a"));
        let b = list.insert(player("b"));

        let (first, second) = list.pair_mut(b, a).unwrap();
        assert_eq!(first.name(), "b");
        assert_eq!(second.name(), "a");
        assert!(list.pair_mut(a, a).is_none());
    }

    #[test]
    fn test_removed_slot_not_reused() {
        let mut list = EntityList::new();
        let a = list.insert(player("a"));
        list.remove(a);
        let b = list.insert(player("b"));
        assert_ne!(a, b);
        assert!(list.get(a).is_none());
        assert!(list.pair_mut(a, b).is_none());
        assert_eq!(list.len(), 1);
    }
}
