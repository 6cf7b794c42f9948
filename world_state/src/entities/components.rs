//! Component definitions for entities.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::EntityId;

/// Position and facing of an entity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Transform {
    pub position: Vec3,
    /// Facing in radians.
    pub rotation: f32,
}

impl Transform {
    pub fn new(position: Vec3, rotation: f32) -> Self {
        Self { position, rotation }
    }
}

/// Current/maximum resource pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Hp {
    pub cur: u32,
    pub max: u32,
}

impl Hp {
    pub fn new(cur: u32, max: u32) -> Self {
        Self { cur, max }
    }
}

/// A cast currently in progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CastInfo {
    pub action_id: u32,
    pub target: Option<EntityId>,
    pub location: Vec3,
    /// Total cast time in seconds.
    pub total_time: f32,
    pub interruptible: bool,
}

/// A tether binding this entity to another one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tether {
    pub id: u32,
    /// Weak reference; the partner may no longer be live.
    pub target: EntityId,
}

/// A status effect occupying one slot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatusEffect {
    pub id: u32,
    /// Effect-specific extra data (stack count and the like).
    pub extra: u16,
    /// Remaining duration in seconds; zero for effects without a timer.
    pub remaining: f32,
    pub source: Option<EntityId>,
}
