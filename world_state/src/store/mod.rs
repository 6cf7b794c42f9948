//! World state management - the central structure every replayed operation mutates.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

use crate::config::WorldConfig;
use crate::entities::{
    CastInfo, ClassId, Entity, EntityId, EntityRegistry, Hp, StatusEffect, Tether, Transform,
};
use crate::events::{CastEvent, ChangeKey, ChangeKind, WorldEvent};
use crate::markers::{Marker, MarkerSet};
use crate::roster::{JoinRejection, MemberId, Roster, RosterEntry};

/// The complete observed state of the world at one instant.
///
/// Every mutator resolves its target first and degrades to a no-op returning
/// `None` when the target is missing. Successful mutators return the value
/// they replaced and queue a [`WorldEvent`] for listeners.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldState {
    zone: u16,
    markers: MarkerSet,
    entities: EntityRegistry,
    roster: Roster,
    status_slots: usize,

    /// Notifications not yet drained by a listener.
    #[serde(skip)]
    pending: Vec<WorldEvent>,
}

impl WorldState {
    /// Create a new empty world state with default sizes.
    pub fn new() -> Self {
        Self::with_config(&WorldConfig::default())
    }

    /// Create a new empty world state sized by `config`.
    pub fn with_config(config: &WorldConfig) -> Self {
        Self {
            zone: 0,
            markers: MarkerSet::default(),
            entities: EntityRegistry::new(),
            roster: Roster::new(config.roster_capacity),
            status_slots: config.status_slots,
            pending: Vec::new(),
        }
    }

    // Reads

    pub fn current_zone(&self) -> u16 {
        self.zone
    }

    pub fn marker(&self, marker: Marker) -> Option<Vec3> {
        self.markers.get(marker)
    }

    pub fn markers(&self) -> &MarkerSet {
        &self.markers
    }

    /// Get entity by ID.
    pub fn find_entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(id)
    }

    pub fn entities(&self) -> &EntityRegistry {
        &self.entities
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    /// Occupied roster entries in slot order.
    pub fn roster_entries(&self) -> Vec<RosterEntry> {
        self.roster.entries().copied().collect()
    }

    /// Resolve the entity linked to a party slot.
    pub fn party_member(&self, slot: usize) -> Option<&Entity> {
        self.roster
            .get(slot)
            .and_then(|entry| entry.entity)
            .and_then(|id| self.entities.get(id))
    }

    /// Resolve an entity's current target, if it is still live.
    pub fn target_of(&self, id: EntityId) -> Option<&Entity> {
        self.entities
            .get(id)
            .and_then(|e| e.target)
            .and_then(|target| self.entities.get(target))
    }

    /// Status slots allocated for newly created entities.
    pub fn status_slots(&self) -> usize {
        self.status_slots
    }

    /// Serialize the observable state; equal snapshots mean equal states.
    pub fn snapshot_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    // Scalars

    /// Set the current zone, returning the previous one.
    pub fn set_zone(&mut self, zone: u16) -> u16 {
        let prev = std::mem::replace(&mut self.zone, zone);
        self.notify(ChangeKind::Zone, ChangeKey::World);
        prev
    }

    /// Place or clear a marker, returning its previous position.
    pub fn set_marker(&mut self, marker: Marker, position: Option<Vec3>) -> Option<Vec3> {
        let prev = self.markers.replace(marker, position);
        self.notify(ChangeKind::Marker, ChangeKey::Marker(marker));
        prev
    }

    // Entity lifecycle

    /// Insert a new entity.
    ///
    /// A duplicate identity is rejected and logged; the live entity is kept.
    pub fn add_entity(&mut self, entity: Entity) -> bool {
        let id = entity.id;
        if !self.entities.insert(entity) {
            warn!(entity = %id, "rejecting create for identity that is already live");
            return false;
        }
        self.notify(ChangeKind::EntityAdded, ChangeKey::Entity(id));
        true
    }

    /// Remove an entity, returning its final attributes.
    pub fn remove_entity(&mut self, id: EntityId) -> Option<Entity> {
        let Some(entity) = self.entities.remove(id) else {
            trace!(entity = %id, "remove targets missing entity");
            return None;
        };
        self.notify(ChangeKind::EntityRemoved, ChangeKey::Entity(id));
        Some(entity)
    }

    // Entity fields

    pub fn rename_entity(&mut self, id: EntityId, name: String) -> Option<String> {
        self.update_entity(id, ChangeKind::Renamed, |e| std::mem::replace(&mut e.name, name))
    }

    pub fn change_class(&mut self, id: EntityId, class: ClassId) -> Option<ClassId> {
        self.update_entity(id, ChangeKind::ClassChanged, |e| {
            std::mem::replace(&mut e.class, class)
        })
    }

    pub fn move_entity(&mut self, id: EntityId, transform: Transform) -> Option<Transform> {
        self.update_entity(id, ChangeKind::Moved, |e| {
            std::mem::replace(&mut e.transform, transform)
        })
    }

    pub fn update_hp(&mut self, id: EntityId, hp: Hp) -> Option<Hp> {
        self.update_entity(id, ChangeKind::Hp, |e| std::mem::replace(&mut e.hp, hp))
    }

    pub fn set_targetable(&mut self, id: EntityId, targetable: bool) -> Option<bool> {
        self.update_entity(id, ChangeKind::Targetable, |e| {
            std::mem::replace(&mut e.targetable, targetable)
        })
    }

    pub fn set_dead(&mut self, id: EntityId, dead: bool) -> Option<bool> {
        self.update_entity(id, ChangeKind::Dead, |e| std::mem::replace(&mut e.dead, dead))
    }

    pub fn set_in_combat(&mut self, id: EntityId, in_combat: bool) -> Option<bool> {
        self.update_entity(id, ChangeKind::InCombat, |e| {
            std::mem::replace(&mut e.in_combat, in_combat)
        })
    }

    /// Point an entity at a target. The target itself need not be live.
    pub fn set_target(
        &mut self,
        id: EntityId,
        target: Option<EntityId>,
    ) -> Option<Option<EntityId>> {
        self.update_entity(id, ChangeKind::Target, |e| std::mem::replace(&mut e.target, target))
    }

    pub fn update_cast(
        &mut self,
        id: EntityId,
        cast: Option<CastInfo>,
    ) -> Option<Option<CastInfo>> {
        self.update_entity(id, ChangeKind::Cast, |e| std::mem::replace(&mut e.cast, cast))
    }

    pub fn update_tether(
        &mut self,
        id: EntityId,
        tether: Option<Tether>,
    ) -> Option<Option<Tether>> {
        self.update_entity(id, ChangeKind::Tether, |e| std::mem::replace(&mut e.tether, tether))
    }

    /// Replace one status slot.
    ///
    /// # Panics
    ///
    /// Panics if `index` is outside the entity's slot array.
    pub fn update_status(
        &mut self,
        id: EntityId,
        index: usize,
        status: Option<StatusEffect>,
    ) -> Option<Option<StatusEffect>> {
        self.update_entity(id, ChangeKind::Status { index }, |e| {
            e.replace_status(index, status)
        })
    }

    // Party

    /// Add a membership to the roster, returning the assigned slot.
    pub fn join_party(&mut self, member: MemberId, entity: Option<EntityId>) -> Option<usize> {
        match self.roster.join(member, entity) {
            Ok(slot) => {
                self.notify(ChangeKind::PartyJoined, ChangeKey::Slot(slot));
                Some(slot)
            }
            Err(JoinRejection::AlreadyMember(slot)) => {
                warn!(member = %member, slot, "rejecting join for existing member");
                None
            }
            Err(JoinRejection::Full) => {
                warn!(member = %member, capacity = self.roster.capacity(), "rejecting join, roster full");
                None
            }
        }
    }

    /// Put a previously removed entry back into its original slot.
    pub fn restore_party_entry(&mut self, entry: RosterEntry) -> bool {
        if !self.roster.restore(entry) {
            warn!(member = %entry.member, slot = entry.slot, "cannot restore roster entry, slot unavailable");
            return false;
        }
        self.notify(ChangeKind::PartyJoined, ChangeKey::Slot(entry.slot));
        true
    }

    /// Free a roster slot, returning the entry it held.
    pub fn leave_party(&mut self, slot: usize) -> Option<RosterEntry> {
        let Some(entry) = self.roster.remove(slot) else {
            trace!(slot, "leave targets vacant slot");
            return None;
        };
        self.notify(ChangeKind::PartyLeft, ChangeKey::Slot(slot));
        Some(entry)
    }

    /// Rebind the entity linked to a slot, returning the previous link.
    pub fn assign_party(
        &mut self,
        slot: usize,
        entity: Option<EntityId>,
    ) -> Option<Option<EntityId>> {
        let Some(prev) = self.roster.assign(slot, entity) else {
            trace!(slot, "assign targets vacant slot");
            return None;
        };
        self.notify(ChangeKind::PartyAssigned, ChangeKey::Slot(slot));
        Some(prev)
    }

    // Broadcasts

    pub fn dispatch_icon(&mut self, entity: EntityId, icon_id: u32) {
        self.pending.push(WorldEvent::Icon { entity, icon_id });
    }

    pub fn dispatch_cast(&mut self, event: CastEvent) {
        self.pending.push(WorldEvent::Cast(event));
    }

    pub fn dispatch_env_control(&mut self, feature_id: u32, index: u8, state: u32) {
        self.pending.push(WorldEvent::EnvControl {
            feature_id,
            index,
            state,
        });
    }

    // Notifications

    /// Notifications queued since the last drain.
    pub fn pending_events(&self) -> &[WorldEvent] {
        &self.pending
    }

    /// Take all queued notifications in the order they were raised.
    pub fn drain_events(&mut self) -> Vec<WorldEvent> {
        std::mem::take(&mut self.pending)
    }

    fn notify(&mut self, kind: ChangeKind, key: ChangeKey) {
        self.pending.push(WorldEvent::changed(kind, key));
    }

    fn update_entity<T>(
        &mut self,
        id: EntityId,
        kind: ChangeKind,
        mutate: impl FnOnce(&mut Entity) -> T,
    ) -> Option<T> {
        let Some(entity) = self.entities.get_mut(id) else {
            trace!(entity = %id, ?kind, "mutation targets missing entity");
            return None;
        };
        let prev = mutate(entity);
        self.notify(kind, ChangeKey::Entity(id));
        Some(prev)
    }
}

impl Default for WorldState {
    fn default() -> Self {
        Self::new()
    }
}

/// Equality over observable state; queued notifications are ignored.
impl PartialEq for WorldState {
    fn eq(&self, other: &Self) -> bool {
        self.zone == other.zone
            && self.markers == other.markers
            && self.entities == other.entities
            && self.roster == other.roster
            && self.status_slots == other.status_slots
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spawn(state: &mut WorldState, id: u32) -> EntityId {
        let id = EntityId(id);
        let entity = Entity::new(id, "Dummy", state.status_slots()).with_hp(Hp::new(100, 100));
        assert!(state.add_entity(entity));
        id
    }

    #[test]
    fn test_set_zone_returns_previous() {
        let mut state = WorldState::new();
        assert_eq!(state.set_zone(777), 0);
        assert_eq!(state.set_zone(778), 777);
        assert_eq!(state.current_zone(), 778);
    }

    #[test]
    fn test_mutation_is_visible_immediately() {
        let mut state = WorldState::new();
        let id = spawn(&mut state, 7);

        assert_eq!(state.update_hp(id, Hp::new(40, 100)), Some(Hp::new(100, 100)));
        assert_eq!(state.find_entity(id).unwrap().hp, Hp::new(40, 100));
    }

    #[test]
    fn test_missing_entity_is_noop() {
        let mut state = WorldState::new();
        let before = state.clone();

        assert!(state.move_entity(EntityId(42), Transform::default()).is_none());
        assert!(state.set_dead(EntityId(42), true).is_none());
        assert!(state.remove_entity(EntityId(42)).is_none());
        assert!(state.find_entity(EntityId(42)).is_none());
        assert_eq!(state, before);
        assert!(state.pending_events().is_empty());
    }

    #[test]
    fn test_duplicate_create_keeps_live_entity() {
        let mut state = WorldState::new();
        let id = spawn(&mut state, 7);
        state.update_hp(id, Hp::new(1, 100));

        assert!(!state.add_entity(Entity::new(id, "Other", state.status_slots())));
        let entity = state.find_entity(id).unwrap();
        assert_eq!(entity.name, "Dummy");
        assert_eq!(entity.hp.cur, 1);
    }

    #[test]
    fn test_weak_target_resolves_to_none_after_destroy() {
        let mut state = WorldState::new();
        let a = spawn(&mut state, 1);
        let b = spawn(&mut state, 2);
        state.set_target(a, Some(b));
        assert_eq!(state.target_of(a).unwrap().id, b);

        state.remove_entity(b);
        assert_eq!(state.find_entity(a).unwrap().target, Some(b));
        assert!(state.target_of(a).is_none());
    }

    #[test]
    fn test_events_are_queued_in_order() {
        let mut state = WorldState::new();
        state.set_zone(1);
        let id = spawn(&mut state, 5);
        state.dispatch_icon(id, 87);

        let events = state.drain_events();
        assert_eq!(
            events,
            vec![
                WorldEvent::changed(ChangeKind::Zone, ChangeKey::World),
                WorldEvent::changed(ChangeKind::EntityAdded, ChangeKey::Entity(id)),
                WorldEvent::Icon {
                    entity: id,
                    icon_id: 87
                },
            ]
        );
        assert!(state.pending_events().is_empty());
    }

    #[test]
    fn test_party_slots() {
        let mut state = WorldState::new();
        let me = spawn(&mut state, 1);

        assert_eq!(state.join_party(MemberId(10), Some(me)), Some(0));
        assert_eq!(state.join_party(MemberId(20), None), Some(1));
        assert_eq!(state.join_party(MemberId(20), None), None);
        assert_eq!(state.party_member(0).unwrap().id, me);

        assert_eq!(state.assign_party(1, Some(me)), Some(None));
        let left = state.leave_party(1).unwrap();
        assert_eq!(left.entity, Some(me));
        assert!(state.assign_party(1, None).is_none());

        assert!(state.restore_party_entry(left));
        assert_eq!(state.roster_entries().len(), 2);
    }

    #[test]
    fn test_snapshot_ignores_pending_events() {
        let mut a = WorldState::new();
        let b = WorldState::new();
        a.dispatch_env_control(0x800375A0, 1, 0x00020001);

        assert_eq!(a.snapshot_json().unwrap(), b.snapshot_json().unwrap());
        assert_eq!(a, b);
    }

    #[test]
    fn test_with_config_sizes() {
        let config = WorldConfig {
            roster_capacity: 24,
            status_slots: 60,
        };
        let state = WorldState::with_config(&config);
        assert_eq!(state.roster().capacity(), 24);
        assert_eq!(state.status_slots(), 60);
    }
}
