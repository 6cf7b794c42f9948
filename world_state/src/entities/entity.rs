//! Entity definition.

use serde::{Deserialize, Serialize};

use super::{CastInfo, ClassId, EntityId, EntityKind, Hp, StatusEffect, Tether, Transform};

/// One simulated actor with its full attribute set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    /// Game-object template identifier.
    pub type_id: u32,
    pub name: String,
    pub kind: EntityKind,
    pub class: ClassId,
    pub transform: Transform,
    pub hitbox_radius: f32,
    pub hp: Hp,
    pub targetable: bool,
    pub dead: bool,
    pub in_combat: bool,
    pub owner: Option<EntityId>,

    // Weak references, resolved through the registry
    pub target: Option<EntityId>,
    pub tether: Option<Tether>,

    pub cast: Option<CastInfo>,

    /// Fixed-width slot array; length never changes after construction.
    statuses: Vec<Option<StatusEffect>>,
}

impl Entity {
    /// Create a new entity with empty attributes and `status_slots` status slots.
    pub fn new(id: EntityId, name: impl Into<String>, status_slots: usize) -> Self {
        Self {
            id,
            type_id: 0,
            name: name.into(),
            kind: EntityKind::None,
            class: ClassId::default(),
            transform: Transform::default(),
            hitbox_radius: 0.0,
            hp: Hp::default(),
            targetable: false,
            dead: false,
            in_combat: false,
            owner: None,
            target: None,
            tether: None,
            cast: None,
            statuses: vec![None; status_slots],
        }
    }

    pub fn with_kind(mut self, kind: EntityKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_type_id(mut self, type_id: u32) -> Self {
        self.type_id = type_id;
        self
    }

    pub fn with_class(mut self, class: ClassId) -> Self {
        self.class = class;
        self
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_hitbox_radius(mut self, radius: f32) -> Self {
        self.hitbox_radius = radius;
        self
    }

    pub fn with_hp(mut self, hp: Hp) -> Self {
        self.hp = hp;
        self
    }

    pub fn with_targetable(mut self, targetable: bool) -> Self {
        self.targetable = targetable;
        self
    }

    pub fn with_owner(mut self, owner: EntityId) -> Self {
        self.owner = Some(owner);
        self
    }

    /// Status slots in index order.
    pub fn statuses(&self) -> &[Option<StatusEffect>] {
        &self.statuses
    }

    /// Get the status in one slot.
    ///
    /// # Panics
    ///
    /// Panics if `index` is outside the slot array.
    pub fn status(&self, index: usize) -> Option<&StatusEffect> {
        self.statuses[index].as_ref()
    }

    /// Replace one status slot, returning the previous occupant.
    ///
    /// # Panics
    ///
    /// Panics if `index` is outside the slot array.
    pub fn replace_status(
        &mut self,
        index: usize,
        status: Option<StatusEffect>,
    ) -> Option<StatusEffect> {
        std::mem::replace(&mut self.statuses[index], status)
    }

    /// Check whether any slot holds the given effect.
    pub fn has_status(&self, id: u32) -> bool {
        self.statuses.iter().flatten().any(|s| s.id == id)
    }

    /// Check if the entity is alive.
    pub fn is_alive(&self) -> bool {
        !self.dead
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_entity() {
        let entity = Entity::new(EntityId(7), "Test Hero", 30);
        assert_eq!(entity.name, "Test Hero");
        assert!(entity.is_alive());
        assert!(entity.target.is_none());
        assert_eq!(entity.statuses().len(), 30);
        assert!(entity.statuses().iter().all(Option::is_none));
    }

    #[test]
    fn test_replace_status() {
        let mut entity = Entity::new(EntityId(7), "Buffed", 4);
        let effect = StatusEffect {
            id: 49,
            extra: 0,
            remaining: 15.0,
            source: Some(EntityId(1)),
        };

        assert!(entity.replace_status(2, Some(effect)).is_none());
        assert!(entity.has_status(49));
        assert_eq!(entity.replace_status(2, None), Some(effect));
        assert!(!entity.has_status(49));
        assert_eq!(entity.statuses().len(), 4);
    }

    #[test]
    #[should_panic]
    fn test_status_index_out_of_range() {
        let mut entity = Entity::new(EntityId(7), "Small", 2);
        entity.replace_status(2, None);
    }
}
