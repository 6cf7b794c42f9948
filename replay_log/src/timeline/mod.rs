//! Timeline - the operation log and its bidirectional replay cursor.
//!
//! The cursor counts operations currently applied, `0..=len`. It moves one
//! operation at a time so every intermediate state is fully materialized:
//!
//! 1. **Append**: push at the end and apply immediately
//! 2. **Step forward**: re-apply the operation at the cursor
//! 3. **Step backward**: revert the operation just before the cursor
//! 4. **Seek**: repeat single steps until the cursor reaches the target

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, debug_span, error, trace, warn};
use uuid::Uuid;
use world_state::{WorldConfig, WorldEvent, WorldState};

use crate::error::ReplayError;
use crate::operations::Operation;

/// Identity of one timeline, recorded on its log spans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimelineId(pub Uuid);

impl TimelineId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TimelineId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TimelineId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Callback receiving every notification raised while applying or reverting.
pub type Listener = Box<dyn FnMut(&WorldEvent)>;

/// An ordered operation log owning the store it replays into.
pub struct Timeline {
    id: TimelineId,
    world: WorldState,
    operations: Vec<Operation>,
    cursor: usize,
    listeners: Vec<Listener>,
}

impl Timeline {
    /// Create an empty timeline over an empty default-sized store.
    pub fn new() -> Self {
        Self::with_world(WorldState::new())
    }

    /// Create an empty timeline over an empty store sized by `config`.
    pub fn with_config(config: &WorldConfig) -> Self {
        Self::with_world(WorldState::with_config(config))
    }

    /// Create an empty timeline over `world`, which becomes its initial state.
    ///
    /// Notifications already queued in `world` predate the timeline and are discarded.
    pub fn with_world(mut world: WorldState) -> Self {
        world.drain_events();
        Self {
            id: TimelineId::new(),
            world,
            operations: Vec::new(),
            cursor: 0,
            listeners: Vec::new(),
        }
    }

    pub fn id(&self) -> TimelineId {
        self.id
    }

    /// The store as of the current cursor.
    pub fn world(&self) -> &WorldState {
        &self.world
    }

    pub fn length(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_at_end(&self) -> bool {
        self.cursor == self.operations.len()
    }

    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Timestamp of the most recently applied operation.
    pub fn current_timestamp(&self) -> Option<DateTime<Utc>> {
        self.cursor
            .checked_sub(1)
            .map(|i| self.operations[i].timestamp)
    }

    /// Register a listener for change and broadcast notifications.
    pub fn subscribe(&mut self, listener: impl FnMut(&WorldEvent) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Append an operation and apply it immediately.
    ///
    /// The timeline never branches: appending is only legal at the end.
    pub fn append(&mut self, mut operation: Operation) -> Result<(), ReplayError> {
        if !self.is_at_end() {
            let err = ReplayError::AppendBehindCursor {
                cursor: self.cursor,
                len: self.operations.len(),
            };
            warn!(timeline = %self.id, %err, "rejecting append");
            return Err(err);
        }
        debug!(timeline = %self.id, op = operation.name(), cursor = self.cursor, "append");
        operation.apply(&mut self.world);
        self.operations.push(operation);
        self.cursor += 1;
        self.flush_events();
        Ok(())
    }

    /// Re-apply the operation at the cursor. Returns `false` at the end.
    pub fn step_forward(&mut self) -> bool {
        debug_assert!(!self.is_at_end(), "step_forward past the end of the timeline");
        let Some(operation) = self.operations.get_mut(self.cursor) else {
            warn!(timeline = %self.id, cursor = self.cursor, "step_forward at end of timeline");
            return false;
        };
        trace!(timeline = %self.id, op = operation.name(), cursor = self.cursor, "step forward");
        operation.apply(&mut self.world);
        self.cursor += 1;
        self.flush_events();
        true
    }

    /// Revert the operation before the cursor. Returns `false` at the start.
    pub fn step_backward(&mut self) -> bool {
        debug_assert!(self.cursor > 0, "step_backward before the start of the timeline");
        let Some(index) = self.cursor.checked_sub(1) else {
            warn!(timeline = %self.id, "step_backward at start of timeline");
            return false;
        };
        let operation = &self.operations[index];
        trace!(timeline = %self.id, op = operation.name(), cursor = self.cursor, "step backward");

        let reverted = operation.revert(&mut self.world);
        debug_assert!(reverted.is_ok(), "timeline reverted an operation it never applied");
        if let Err(err) = reverted {
            error!(timeline = %self.id, %err, cursor = self.cursor, "revert failed");
        }
        self.cursor = index;
        self.flush_events();
        true
    }

    /// Step until the cursor equals `position` (clamped to the length).
    ///
    /// Returns the final cursor.
    pub fn seek(&mut self, position: usize) -> usize {
        let target = position.min(self.operations.len());
        if target != position {
            warn!(timeline = %self.id, position, len = self.operations.len(), "seek clamped to end");
        }
        let _span = debug_span!("seek", timeline = %self.id, from = self.cursor, to = target).entered();
        while self.cursor < target {
            self.step_forward();
        }
        while self.cursor > target {
            self.step_backward();
        }
        self.cursor
    }

    /// Seek to just after the last operation stamped at or before `time`.
    ///
    /// Operations are expected in non-decreasing timestamp order.
    pub fn seek_time(&mut self, time: DateTime<Utc>) -> usize {
        let target = self.operations.partition_point(|op| op.timestamp <= time);
        self.seek(target)
    }

    /// Seek back to the initial state.
    pub fn rewind(&mut self) {
        self.seek(0);
    }

    fn flush_events(&mut self) {
        let events = self.world.drain_events();
        if self.listeners.is_empty() {
            return;
        }
        for event in &events {
            for listener in &mut self.listeners {
                listener(event);
            }
        }
    }
}

impl Default for Timeline {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Timeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Timeline")
            .field("id", &self.id)
            .field("cursor", &self.cursor)
            .field("len", &self.operations.len())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
