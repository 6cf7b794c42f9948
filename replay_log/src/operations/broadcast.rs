//! One-way broadcast signals. They touch no state and have no inverse.

use serde::{Deserialize, Serialize};
use world_state::{CastEvent, EntityId, WorldState};

/// An icon shown over an entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IconEvent {
    pub entity: EntityId,
    pub icon_id: u32,
}

impl IconEvent {
    pub(crate) fn apply(&self, ws: &mut WorldState) {
        ws.dispatch_icon(self.entity, self.icon_id);
    }
}

/// A resolved cast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CastResult {
    pub event: CastEvent,
}

impl CastResult {
    pub(crate) fn apply(&self, ws: &mut WorldState) {
        ws.dispatch_cast(self.event.clone());
    }
}

/// An environment-control change (arena feature toggles and the like).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvControlEvent {
    pub feature_id: u32,
    pub index: u8,
    pub state: u32,
}

impl EnvControlEvent {
    pub(crate) fn apply(&self, ws: &mut WorldState) {
        ws.dispatch_env_control(self.feature_id, self.index, self.state);
    }
}
