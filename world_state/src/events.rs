//! Notifications raised by the store.
//!
//! Every store mutation queues a [`WorldEvent::Changed`] so listeners can
//! refresh derived caches. Broadcast signals (icons, cast results,
//! environment controls) carry no state and are only ever queued.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::entities::EntityId;
use crate::markers::Marker;

/// Which part of the state changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChangeKind {
    Zone,
    Marker,
    EntityAdded,
    EntityRemoved,
    Renamed,
    ClassChanged,
    Moved,
    Hp,
    Targetable,
    Dead,
    InCombat,
    Target,
    Cast,
    Tether,
    Status { index: usize },
    PartyJoined,
    PartyLeft,
    PartyAssigned,
}

/// Key of the changed item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChangeKey {
    /// Process-wide scalar.
    World,
    Marker(Marker),
    Entity(EntityId),
    Slot(usize),
}

/// One resolved target of a cast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CastTarget {
    pub entity: EntityId,
    /// Raw effect words reported for this target.
    pub effects: Vec<u64>,
}

/// A finished cast as observed in the session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CastEvent {
    pub caster: Option<EntityId>,
    pub main_target: Option<EntityId>,
    pub action_id: u32,
    pub location: Vec3,
    pub sequence: u32,
    pub targets: Vec<CastTarget>,
}

/// A notification emitted by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WorldEvent {
    Changed { kind: ChangeKind, key: ChangeKey },

    // Broadcasts
    Icon { entity: EntityId, icon_id: u32 },
    Cast(CastEvent),
    EnvControl { feature_id: u32, index: u8, state: u32 },
}

impl WorldEvent {
    pub fn changed(kind: ChangeKind, key: ChangeKey) -> Self {
        Self::Changed { kind, key }
    }

    /// Whether this is a one-way broadcast rather than a state change.
    pub fn is_broadcast(&self) -> bool {
        !matches!(self, Self::Changed { .. })
    }
}
