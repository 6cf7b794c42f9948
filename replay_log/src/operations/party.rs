//! Operations on the party roster.

use serde::{Deserialize, Serialize};
use tracing::trace;
use world_state::{EntityId, MemberId, RosterEntry, WorldState};

use super::Prior;
use crate::error::ReplayError;

/// Add a membership to the roster.
///
/// The join counts as the observer's own when slot 0 is vacant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartyJoin {
    pub member: MemberId,
    pub entity: Option<EntityId>,
    #[serde(skip)]
    prev: Prior<usize>,
}

impl PartyJoin {
    pub fn new(member: MemberId, entity: Option<EntityId>) -> Self {
        Self {
            member,
            entity,
            prev: Prior::Unapplied,
        }
    }

    pub(crate) fn apply(&mut self, ws: &mut WorldState) {
        self.prev = Prior::from_replaced(ws.join_party(self.member, self.entity));
    }

    pub(crate) fn revert(&self, ws: &mut WorldState) -> Result<(), ReplayError> {
        if let Some(&slot) = self.prev.restorable("PartyJoin")? {
            ws.leave_party(slot);
        }
        Ok(())
    }

    /// Slot assigned by the most recent forward pass.
    pub fn slot(&self) -> Option<usize> {
        self.prev.captured().copied()
    }
}

/// Remove a membership from the roster.
///
/// The vacated entry is captured so a revert puts it back into the same slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartyLeave {
    pub member: MemberId,
    #[serde(skip)]
    prev: Prior<RosterEntry>,
}

impl PartyLeave {
    pub fn new(member: MemberId) -> Self {
        Self {
            member,
            prev: Prior::Unapplied,
        }
    }

    pub(crate) fn apply(&mut self, ws: &mut WorldState) {
        let removed = match ws.roster().slot_of(self.member) {
            Some(slot) => ws.leave_party(slot),
            None => {
                trace!(member = %self.member, "leave for unknown member");
                None
            }
        };
        self.prev = Prior::from_replaced(removed);
    }

    pub(crate) fn revert(&self, ws: &mut WorldState) -> Result<(), ReplayError> {
        if let Some(&entry) = self.prev.restorable("PartyLeave")? {
            ws.restore_party_entry(entry);
        }
        Ok(())
    }
}

/// Rebind the entity linked to a membership without moving its slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartyAssign {
    pub member: MemberId,
    pub entity: Option<EntityId>,
    #[serde(skip)]
    prev: Prior<Option<EntityId>>,
}

impl PartyAssign {
    pub fn new(member: MemberId, entity: Option<EntityId>) -> Self {
        Self {
            member,
            entity,
            prev: Prior::Unapplied,
        }
    }

    fn assign(&self, ws: &mut WorldState, entity: Option<EntityId>) -> Option<Option<EntityId>> {
        let Some(slot) = ws.roster().slot_of(self.member) else {
            trace!(member = %self.member, "assign for unknown member");
            return None;
        };
        ws.assign_party(slot, entity)
    }

    pub(crate) fn apply(&mut self, ws: &mut WorldState) {
        self.prev = Prior::from_replaced(self.assign(ws, self.entity));
    }

    pub(crate) fn revert(&self, ws: &mut WorldState) -> Result<(), ReplayError> {
        if let Some(&prev) = self.prev.restorable("PartyAssign")? {
            self.assign(ws, prev);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_join_is_self() {
        let mut ws = WorldState::new();
        let mut me = PartyJoin::new(MemberId(1), Some(EntityId(10)));
        let mut other = PartyJoin::new(MemberId(2), Some(EntityId(20)));
        me.apply(&mut ws);
        other.apply(&mut ws);

        assert_eq!(me.slot(), Some(0));
        assert_eq!(other.slot(), Some(1));

        other.revert(&mut ws).unwrap();
        me.revert(&mut ws).unwrap();
        assert!(ws.roster().is_empty());
    }

    #[test]
    fn test_leave_restores_exact_slot() {
        let mut ws = WorldState::new();
        for m in 1..=4 {
            PartyJoin::new(MemberId(m), None).apply(&mut ws);
        }
        PartyLeave::new(MemberId(2)).apply(&mut ws);

        let mut leave = PartyLeave::new(MemberId(4));
        leave.apply(&mut ws);
        assert_eq!(ws.roster().slot_of(MemberId(4)), None);

        // slot 1 is free and lower, but the member must return to slot 3
        leave.revert(&mut ws).unwrap();
        assert_eq!(ws.roster().slot_of(MemberId(4)), Some(3));
    }

    #[test]
    fn test_assign_keeps_slot_and_reverts_link() {
        let mut ws = WorldState::new();
        PartyJoin::new(MemberId(1), None).apply(&mut ws);
        let mut join = PartyJoin::new(MemberId(2), Some(EntityId(5)));
        join.apply(&mut ws);
        let slot = join.slot().unwrap();

        let mut assign = PartyAssign::new(MemberId(2), Some(EntityId(6)));
        assign.apply(&mut ws);
        assert_eq!(ws.roster().slot_of(MemberId(2)), Some(slot));
        assert_eq!(ws.roster().get(slot).unwrap().entity, Some(EntityId(6)));

        assign.revert(&mut ws).unwrap();
        assert_eq!(ws.roster().get(slot).unwrap().entity, Some(EntityId(5)));
    }

    #[test]
    fn test_unknown_member_is_noop() {
        let mut ws = WorldState::new();
        let before = ws.clone();

        let mut leave = PartyLeave::new(MemberId(99));
        let mut assign = PartyAssign::new(MemberId(99), Some(EntityId(1)));
        leave.apply(&mut ws);
        assign.apply(&mut ws);
        assign.revert(&mut ws).unwrap();
        leave.revert(&mut ws).unwrap();

        assert_eq!(ws, before);
    }
}
