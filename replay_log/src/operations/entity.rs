//! Operations on entities: lifecycle and single-field changes.
//!
//! Field changes on an entity that is not live (typically one whose creation
//! fell before the capture window) capture [`Prior::Missed`] and revert to
//! nothing.

use serde::{Deserialize, Serialize};
use tracing::error;
use world_state::{
    CastInfo, ClassId, Entity, EntityId, EntityKind, Hp, StatusEffect, Tether, Transform,
    WorldState,
};

use super::Prior;
use crate::error::ReplayError;

/// Insert an entity with its full attribute set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityCreate {
    pub entity: EntityId,
    pub type_id: u32,
    pub name: String,
    pub kind: EntityKind,
    pub class: ClassId,
    pub transform: Transform,
    pub hitbox_radius: f32,
    pub hp: Hp,
    pub targetable: bool,
    pub owner: Option<EntityId>,
    /// Whether the forward pass inserted anything; duplicates are rejected.
    #[serde(skip)]
    prev: Prior<()>,
}

impl EntityCreate {
    pub fn new(entity: EntityId, name: impl Into<String>) -> Self {
        Self {
            entity,
            type_id: 0,
            name: name.into(),
            kind: EntityKind::None,
            class: ClassId::default(),
            transform: Transform::default(),
            hitbox_radius: 0.0,
            hp: Hp::default(),
            targetable: false,
            owner: None,
            prev: Prior::Unapplied,
        }
    }

    pub fn with_type_id(mut self, type_id: u32) -> Self {
        self.type_id = type_id;
        self
    }

    pub fn with_kind(mut self, kind: EntityKind) -> Self {
        self.kind = kind;
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

    /// Build the entity this operation inserts.
    pub fn build(&self, status_slots: usize) -> Entity {
        let mut entity = Entity::new(self.entity, self.name.clone(), status_slots)
            .with_type_id(self.type_id)
            .with_kind(self.kind)
            .with_class(self.class)
            .with_transform(self.transform)
            .with_hitbox_radius(self.hitbox_radius)
            .with_hp(self.hp)
            .with_targetable(self.targetable);
        entity.owner = self.owner;
        entity
    }

    pub(crate) fn apply(&mut self, ws: &mut WorldState) {
        let entity = self.build(ws.status_slots());
        self.prev = if ws.add_entity(entity) {
            Prior::Captured(())
        } else {
            Prior::Missed
        };
    }

    pub(crate) fn revert(&self, ws: &mut WorldState) -> Result<(), ReplayError> {
        if self.prev.restorable("EntityCreate")?.is_some() {
            ws.remove_entity(self.entity);
        }
        Ok(())
    }
}

/// Remove an entity; its final attributes are captured so the removal can be undone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityDestroy {
    pub entity: EntityId,
    #[serde(skip)]
    prev: Prior<Entity>,
}

impl EntityDestroy {
    pub fn new(entity: EntityId) -> Self {
        Self {
            entity,
            prev: Prior::Unapplied,
        }
    }

    pub(crate) fn apply(&mut self, ws: &mut WorldState) {
        self.prev = Prior::from_replaced(ws.remove_entity(self.entity));
    }

    pub(crate) fn revert(&self, ws: &mut WorldState) -> Result<(), ReplayError> {
        if let Some(entity) = self.prev.restorable("EntityDestroy")? {
            ws.add_entity(entity.clone());
        }
        Ok(())
    }

    /// Attributes of the entity at the moment it was removed.
    pub fn removed(&self) -> Option<&Entity> {
        self.prev.captured()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRename {
    pub entity: EntityId,
    pub name: String,
    #[serde(skip)]
    prev: Prior<String>,
}

impl EntityRename {
    pub fn new(entity: EntityId, name: impl Into<String>) -> Self {
        Self {
            entity,
            name: name.into(),
            prev: Prior::Unapplied,
        }
    }

    pub(crate) fn apply(&mut self, ws: &mut WorldState) {
        self.prev = Prior::from_replaced(ws.rename_entity(self.entity, self.name.clone()));
    }

    pub(crate) fn revert(&self, ws: &mut WorldState) -> Result<(), ReplayError> {
        if let Some(prev) = self.prev.restorable("EntityRename")? {
            ws.rename_entity(self.entity, prev.clone());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityClassChange {
    pub entity: EntityId,
    pub class: ClassId,
    #[serde(skip)]
    prev: Prior<ClassId>,
}

impl EntityClassChange {
    pub fn new(entity: EntityId, class: ClassId) -> Self {
        Self {
            entity,
            class,
            prev: Prior::Unapplied,
        }
    }

    pub(crate) fn apply(&mut self, ws: &mut WorldState) {
        self.prev = Prior::from_replaced(ws.change_class(self.entity, self.class));
    }

    pub(crate) fn revert(&self, ws: &mut WorldState) -> Result<(), ReplayError> {
        if let Some(&prev) = self.prev.restorable("EntityClassChange")? {
            ws.change_class(self.entity, prev);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityMove {
    pub entity: EntityId,
    pub transform: Transform,
    #[serde(skip)]
    prev: Prior<Transform>,
}

impl EntityMove {
    pub fn new(entity: EntityId, transform: Transform) -> Self {
        Self {
            entity,
            transform,
            prev: Prior::Unapplied,
        }
    }

    pub(crate) fn apply(&mut self, ws: &mut WorldState) {
        self.prev = Prior::from_replaced(ws.move_entity(self.entity, self.transform));
    }

    pub(crate) fn revert(&self, ws: &mut WorldState) -> Result<(), ReplayError> {
        if let Some(&prev) = self.prev.restorable("EntityMove")? {
            ws.move_entity(self.entity, prev);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityHp {
    pub entity: EntityId,
    pub hp: Hp,
    #[serde(skip)]
    prev: Prior<Hp>,
}

impl EntityHp {
    pub fn new(entity: EntityId, hp: Hp) -> Self {
        Self {
            entity,
            hp,
            prev: Prior::Unapplied,
        }
    }

    pub(crate) fn apply(&mut self, ws: &mut WorldState) {
        self.prev = Prior::from_replaced(ws.update_hp(self.entity, self.hp));
    }

    pub(crate) fn revert(&self, ws: &mut WorldState) -> Result<(), ReplayError> {
        if let Some(&prev) = self.prev.restorable("EntityHp")? {
            ws.update_hp(self.entity, prev);
        }
        Ok(())
    }
}

/// Which boolean flag an [`EntityFlag`] operation changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityFlagKind {
    Targetable,
    Dead,
    InCombat,
}

/// Set one of the entity's boolean flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityFlag {
    pub entity: EntityId,
    pub flag: EntityFlagKind,
    pub value: bool,
    #[serde(skip)]
    prev: Prior<bool>,
}

impl EntityFlag {
    pub fn new(entity: EntityId, flag: EntityFlagKind, value: bool) -> Self {
        Self {
            entity,
            flag,
            value,
            prev: Prior::Unapplied,
        }
    }

    fn write(&self, ws: &mut WorldState, value: bool) -> Option<bool> {
        match self.flag {
            EntityFlagKind::Targetable => ws.set_targetable(self.entity, value),
            EntityFlagKind::Dead => ws.set_dead(self.entity, value),
            EntityFlagKind::InCombat => ws.set_in_combat(self.entity, value),
        }
    }

    pub(crate) fn apply(&mut self, ws: &mut WorldState) {
        self.prev = Prior::from_replaced(self.write(ws, self.value));
    }

    pub(crate) fn revert(&self, ws: &mut WorldState) -> Result<(), ReplayError> {
        if let Some(&prev) = self.prev.restorable("EntityFlag")? {
            self.write(ws, prev);
        }
        Ok(())
    }
}

/// Point an entity at another one (or at nothing).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityTarget {
    pub entity: EntityId,
    pub target: Option<EntityId>,
    #[serde(skip)]
    prev: Prior<Option<EntityId>>,
}

impl EntityTarget {
    pub fn new(entity: EntityId, target: Option<EntityId>) -> Self {
        Self {
            entity,
            target,
            prev: Prior::Unapplied,
        }
    }

    pub(crate) fn apply(&mut self, ws: &mut WorldState) {
        self.prev = Prior::from_replaced(ws.set_target(self.entity, self.target));
    }

    pub(crate) fn revert(&self, ws: &mut WorldState) -> Result<(), ReplayError> {
        if let Some(&prev) = self.prev.restorable("EntityTarget")? {
            ws.set_target(self.entity, prev);
        }
        Ok(())
    }
}

/// Start (`Some`) or finish (`None`) a cast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityCast {
    pub entity: EntityId,
    pub cast: Option<CastInfo>,
    #[serde(skip)]
    prev: Prior<Option<CastInfo>>,
}

impl EntityCast {
    pub fn new(entity: EntityId, cast: Option<CastInfo>) -> Self {
        Self {
            entity,
            cast,
            prev: Prior::Unapplied,
        }
    }

    pub(crate) fn apply(&mut self, ws: &mut WorldState) {
        self.prev = Prior::from_replaced(ws.update_cast(self.entity, self.cast.clone()));
    }

    pub(crate) fn revert(&self, ws: &mut WorldState) -> Result<(), ReplayError> {
        if let Some(prev) = self.prev.restorable("EntityCast")? {
            ws.update_cast(self.entity, prev.clone());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityTether {
    pub entity: EntityId,
    pub tether: Option<Tether>,
    #[serde(skip)]
    prev: Prior<Option<Tether>>,
}

impl EntityTether {
    pub fn new(entity: EntityId, tether: Option<Tether>) -> Self {
        Self {
            entity,
            tether,
            prev: Prior::Unapplied,
        }
    }

    pub(crate) fn apply(&mut self, ws: &mut WorldState) {
        self.prev = Prior::from_replaced(ws.update_tether(self.entity, self.tether));
    }

    pub(crate) fn revert(&self, ws: &mut WorldState) -> Result<(), ReplayError> {
        if let Some(&prev) = self.prev.restorable("EntityTether")? {
            ws.update_tether(self.entity, prev);
        }
        Ok(())
    }
}

/// Replace one status slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityStatus {
    pub entity: EntityId,
    pub index: usize,
    pub status: Option<StatusEffect>,
    #[serde(skip)]
    prev: Prior<Option<StatusEffect>>,
}

impl EntityStatus {
    pub fn new(entity: EntityId, index: usize, status: Option<StatusEffect>) -> Self {
        Self {
            entity,
            index,
            status,
            prev: Prior::Unapplied,
        }
    }

    pub(crate) fn apply(&mut self, ws: &mut WorldState) {
        let slots = ws.find_entity(self.entity).map(|e| e.statuses().len());
        if let Some(slots) = slots {
            debug_assert!(self.index < slots, "status index out of range");
            if self.index >= slots {
                error!(entity = %self.entity, index = self.index, slots, "status index out of range");
                self.prev = Prior::Missed;
                return;
            }
        }
        self.prev = Prior::from_replaced(ws.update_status(self.entity, self.index, self.status));
    }

    pub(crate) fn revert(&self, ws: &mut WorldState) -> Result<(), ReplayError> {
        if let Some(&prev) = self.prev.restorable("EntityStatus")? {
            ws.update_status(self.entity, self.index, prev);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn create(id: u32) -> EntityCreate {
        EntityCreate::new(EntityId(id), "Boss")
            .with_type_id(0x2E3C)
            .with_kind(EntityKind::Enemy)
            .with_transform(Transform::new(Vec3::new(100.0, 0.0, 100.0), 1.5))
            .with_hitbox_radius(5.0)
            .with_hp(Hp::new(100, 100))
            .with_targetable(true)
    }

    #[test]
    fn test_create_then_revert_removes() {
        let mut ws = WorldState::new();
        let mut op = create(7);
        op.apply(&mut ws);
        assert_eq!(ws.find_entity(EntityId(7)).unwrap().hp, Hp::new(100, 100));

        op.revert(&mut ws).unwrap();
        assert!(ws.find_entity(EntityId(7)).is_none());
    }

    #[test]
    fn test_rejected_duplicate_create_reverts_to_nothing() {
        let mut ws = WorldState::new();
        create(7).apply(&mut ws);

        let mut duplicate = EntityCreate::new(EntityId(7), "Impostor");
        duplicate.apply(&mut ws);
        duplicate.revert(&mut ws).unwrap();

        assert_eq!(ws.find_entity(EntityId(7)).unwrap().name, "Boss");
    }

    #[test]
    fn test_destroy_captures_full_snapshot() {
        let mut ws = WorldState::new();
        create(7).apply(&mut ws);
        ws.set_in_combat(EntityId(7), true);
        let before = ws.find_entity(EntityId(7)).cloned().unwrap();

        let mut op = EntityDestroy::new(EntityId(7));
        op.apply(&mut ws);
        assert!(ws.find_entity(EntityId(7)).is_none());
        assert_eq!(op.removed(), Some(&before));

        op.revert(&mut ws).unwrap();
        assert_eq!(ws.find_entity(EntityId(7)), Some(&before));
    }

    #[test]
    fn test_field_change_on_missing_entity() {
        let mut ws = WorldState::new();
        let mut op = EntityMove::new(EntityId(42), Transform::default());
        op.apply(&mut ws);
        op.revert(&mut ws).unwrap();
        assert!(ws.find_entity(EntityId(42)).is_none());
    }

    #[test]
    fn test_flags_round_trip() {
        let mut ws = WorldState::new();
        create(1).apply(&mut ws);

        let mut ops = vec![
            EntityFlag::new(EntityId(1), EntityFlagKind::Targetable, false),
            EntityFlag::new(EntityId(1), EntityFlagKind::Dead, true),
            EntityFlag::new(EntityId(1), EntityFlagKind::InCombat, true),
        ];
        for op in &mut ops {
            op.apply(&mut ws);
        }
        let entity = ws.find_entity(EntityId(1)).unwrap();
        assert!(!entity.targetable && entity.dead && entity.in_combat);

        for op in ops.iter().rev() {
            op.revert(&mut ws).unwrap();
        }
        let entity = ws.find_entity(EntityId(1)).unwrap();
        assert!(entity.targetable && !entity.dead && !entity.in_combat);
    }

    #[test]
    fn test_status_slot_round_trip() {
        let mut ws = WorldState::new();
        create(1).apply(&mut ws);
        let effect = StatusEffect {
            id: 2941,
            extra: 3,
            remaining: 20.0,
            source: Some(EntityId(2)),
        };

        let mut op = EntityStatus::new(EntityId(1), 4, Some(effect));
        op.apply(&mut ws);
        assert_eq!(ws.find_entity(EntityId(1)).unwrap().status(4), Some(&effect));

        op.revert(&mut ws).unwrap();
        assert_eq!(ws.find_entity(EntityId(1)).unwrap().status(4), None);
    }

    #[test]
    fn test_cast_and_tether() {
        let mut ws = WorldState::new();
        create(1).apply(&mut ws);
        let cast = CastInfo {
            action_id: 0x6D2B,
            target: Some(EntityId(2)),
            location: Vec3::ZERO,
            total_time: 4.7,
            interruptible: false,
        };

        let mut start = EntityCast::new(EntityId(1), Some(cast.clone()));
        let mut tether = EntityTether::new(
            EntityId(1),
            Some(Tether {
                id: 84,
                target: EntityId(2),
            }),
        );
        start.apply(&mut ws);
        tether.apply(&mut ws);
        assert_eq!(ws.find_entity(EntityId(1)).unwrap().cast, Some(cast));

        tether.revert(&mut ws).unwrap();
        start.revert(&mut ws).unwrap();
        let entity = ws.find_entity(EntityId(1)).unwrap();
        assert!(entity.cast.is_none());
        assert!(entity.tether.is_none());
    }

    #[test]
    fn test_serialization_omits_captured_state() {
        let mut ws = WorldState::new();
        create(3).apply(&mut ws);
        let mut op = EntityRename::new(EntityId(3), "Renamed");
        op.apply(&mut ws);

        let json = serde_json::to_string(&op).unwrap();
        assert!(!json.contains("Boss"));

        let restored: EntityRename = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, EntityRename::new(EntityId(3), "Renamed"));
    }
}
