//! Operations - timestamped records of one state transition each.
//!
//! Every variant carries the *new* value(s) it writes. Invertible variants
//! also capture, at apply time, whatever they overwrote; that capture is never
//! serialized and is re-derived on every forward pass. Broadcast variants
//! only raise a signal and are skipped when stepping backward.

mod broadcast;
mod entity;
mod party;
mod prior;
mod scalar;

pub use broadcast::*;
pub use entity::*;
pub use party::*;
pub use prior::*;
pub use scalar::*;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use world_state::WorldState;

use crate::error::ReplayError;

/// The closed set of operation payloads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum OperationKind {
    // Scalars
    ZoneChange(ZoneChange),
    MarkerChange(MarkerChange),

    // Entities
    EntityCreate(EntityCreate),
    EntityDestroy(EntityDestroy),
    EntityRename(EntityRename),
    EntityClassChange(EntityClassChange),
    EntityMove(EntityMove),
    EntityHp(EntityHp),
    EntityFlag(EntityFlag),
    EntityTarget(EntityTarget),
    EntityCast(EntityCast),
    EntityTether(EntityTether),
    EntityStatus(EntityStatus),

    // Party
    PartyJoin(PartyJoin),
    PartyLeave(PartyLeave),
    PartyAssign(PartyAssign),

    // Broadcasts
    Icon(IconEvent),
    Cast(CastResult),
    EnvControl(EnvControlEvent),
}

impl OperationKind {
    /// Short name used in logs and errors.
    pub fn name(&self) -> &'static str {
        match self {
            Self::ZoneChange(_) => "ZoneChange",
            Self::MarkerChange(_) => "MarkerChange",
            Self::EntityCreate(_) => "EntityCreate",
            Self::EntityDestroy(_) => "EntityDestroy",
            Self::EntityRename(_) => "EntityRename",
            Self::EntityClassChange(_) => "EntityClassChange",
            Self::EntityMove(_) => "EntityMove",
            Self::EntityHp(_) => "EntityHp",
            Self::EntityFlag(_) => "EntityFlag",
            Self::EntityTarget(_) => "EntityTarget",
            Self::EntityCast(_) => "EntityCast",
            Self::EntityTether(_) => "EntityTether",
            Self::EntityStatus(_) => "EntityStatus",
            Self::PartyJoin(_) => "PartyJoin",
            Self::PartyLeave(_) => "PartyLeave",
            Self::PartyAssign(_) => "PartyAssign",
            Self::Icon(_) => "Icon",
            Self::Cast(_) => "Cast",
            Self::EnvControl(_) => "EnvControl",
        }
    }

    /// Whether stepping backward over this operation restores anything.
    pub fn is_invertible(&self) -> bool {
        !matches!(self, Self::Icon(_) | Self::Cast(_) | Self::EnvControl(_))
    }
}

/// A single recorded mutation or notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    pub timestamp: DateTime<Utc>,
    pub kind: OperationKind,
}

impl Operation {
    pub fn new(timestamp: DateTime<Utc>, kind: impl Into<OperationKind>) -> Self {
        Self {
            timestamp,
            kind: kind.into(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn is_invertible(&self) -> bool {
        self.kind.is_invertible()
    }

    /// Perform the forward mutation, capturing what it overwrites.
    pub fn apply(&mut self, ws: &mut WorldState) {
        match &mut self.kind {
            OperationKind::ZoneChange(op) => op.apply(ws),
            OperationKind::MarkerChange(op) => op.apply(ws),
            OperationKind::EntityCreate(op) => op.apply(ws),
            OperationKind::EntityDestroy(op) => op.apply(ws),
            OperationKind::EntityRename(op) => op.apply(ws),
            OperationKind::EntityClassChange(op) => op.apply(ws),
            OperationKind::EntityMove(op) => op.apply(ws),
            OperationKind::EntityHp(op) => op.apply(ws),
            OperationKind::EntityFlag(op) => op.apply(ws),
            OperationKind::EntityTarget(op) => op.apply(ws),
            OperationKind::EntityCast(op) => op.apply(ws),
            OperationKind::EntityTether(op) => op.apply(ws),
            OperationKind::EntityStatus(op) => op.apply(ws),
            OperationKind::PartyJoin(op) => op.apply(ws),
            OperationKind::PartyLeave(op) => op.apply(ws),
            OperationKind::PartyAssign(op) => op.apply(ws),
            OperationKind::Icon(op) => op.apply(ws),
            OperationKind::Cast(op) => op.apply(ws),
            OperationKind::EnvControl(op) => op.apply(ws),
        }
    }

    /// Undo the most recent [`apply`](Self::apply). Broadcasts revert to nothing.
    pub fn revert(&self, ws: &mut WorldState) -> Result<(), ReplayError> {
        match &self.kind {
            OperationKind::ZoneChange(op) => op.revert(ws),
            OperationKind::MarkerChange(op) => op.revert(ws),
            OperationKind::EntityCreate(op) => op.revert(ws),
            OperationKind::EntityDestroy(op) => op.revert(ws),
            OperationKind::EntityRename(op) => op.revert(ws),
            OperationKind::EntityClassChange(op) => op.revert(ws),
            OperationKind::EntityMove(op) => op.revert(ws),
            OperationKind::EntityHp(op) => op.revert(ws),
            OperationKind::EntityFlag(op) => op.revert(ws),
            OperationKind::EntityTarget(op) => op.revert(ws),
            OperationKind::EntityCast(op) => op.revert(ws),
            OperationKind::EntityTether(op) => op.revert(ws),
            OperationKind::EntityStatus(op) => op.revert(ws),
            OperationKind::PartyJoin(op) => op.revert(ws),
            OperationKind::PartyLeave(op) => op.revert(ws),
            OperationKind::PartyAssign(op) => op.revert(ws),
            OperationKind::Icon(_) | OperationKind::Cast(_) | OperationKind::EnvControl(_) => {
                Ok(())
            }
        }
    }
}

macro_rules! impl_into_kind {
    ($($variant:ident($payload:ty)),* $(,)?) => {
        $(
            impl From<$payload> for OperationKind {
                fn from(op: $payload) -> Self {
                    OperationKind::$variant(op)
                }
            }
        )*
    };
}

impl_into_kind!(
    ZoneChange(ZoneChange),
    MarkerChange(MarkerChange),
    EntityCreate(EntityCreate),
    EntityDestroy(EntityDestroy),
    EntityRename(EntityRename),
    EntityClassChange(EntityClassChange),
    EntityMove(EntityMove),
    EntityHp(EntityHp),
    EntityFlag(EntityFlag),
    EntityTarget(EntityTarget),
    EntityCast(EntityCast),
    EntityTether(EntityTether),
    EntityStatus(EntityStatus),
    PartyJoin(PartyJoin),
    PartyLeave(PartyLeave),
    PartyAssign(PartyAssign),
    Icon(IconEvent),
    Cast(CastResult),
    EnvControl(EnvControlEvent),
);

#[cfg(test)]
mod tests {
    use super::*;
    use world_state::{EntityId, Hp};

    #[test]
    fn test_broadcasts_are_not_invertible() {
        let now = Utc::now();
        let icon = Operation::new(
            now,
            IconEvent {
                entity: EntityId(1),
                icon_id: 23,
            },
        );
        assert!(!icon.is_invertible());
        assert!(Operation::new(now, ZoneChange::new(1)).is_invertible());
    }

    #[test]
    fn test_broadcast_revert_touches_nothing() {
        let mut ws = WorldState::new();
        let mut op = Operation::new(
            Utc::now(),
            EnvControlEvent {
                feature_id: 0x8003759A,
                index: 0,
                state: 0x00020001,
            },
        );
        op.apply(&mut ws);
        assert_eq!(ws.drain_events().len(), 1);

        let before = ws.clone();
        op.revert(&mut ws).unwrap();
        assert_eq!(ws, before);
        assert!(ws.pending_events().is_empty());
    }

    #[test]
    fn test_revert_before_apply_names_operation() {
        let mut ws = WorldState::new();
        let op = Operation::new(Utc::now(), EntityHp::new(EntityId(7), Hp::new(1, 1)));
        assert_eq!(
            op.revert(&mut ws),
            Err(ReplayError::RevertBeforeApply {
                operation: "EntityHp"
            })
        );
    }
}
