//! Party roster - a fixed-capacity slot table binding memberships to entities.
//!
//! Slot 0 belongs to the observer. A join lands in slot 0 when that slot is
//! vacant; every other join takes the lowest free slot in `1..capacity`.
//! Freed slots are recycled by the same rule.

use serde::{Deserialize, Serialize};

use crate::entities::EntityId;

/// Durable identity of a party membership, independent of entity lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MemberId(pub u64);

impl std::fmt::Display for MemberId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:016X}", self.0)
    }
}

/// One occupied party slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub slot: usize,
    pub member: MemberId,
    /// Entity currently linked to the membership, if any.
    pub entity: Option<EntityId>,
}

/// Why a join was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinRejection {
    AlreadyMember(usize),
    Full,
}

/// Fixed-capacity ordered table of party slots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Roster {
    slots: Vec<Option<RosterEntry>>,
}

impl Roster {
    /// Create an empty roster with `capacity` slots.
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![None; capacity],
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Whether the next join is treated as the observer's own membership.
    pub fn next_join_is_self(&self) -> bool {
        matches!(self.slots.first(), Some(None))
    }

    /// Add a membership, returning its slot.
    pub fn join(&mut self, member: MemberId, entity: Option<EntityId>) -> Result<usize, JoinRejection> {
        if let Some(existing) = self.slot_of(member) {
            return Err(JoinRejection::AlreadyMember(existing));
        }
        let slot = if self.next_join_is_self() {
            0
        } else {
            self.slots
                .iter()
                .enumerate()
                .skip(1)
                .find(|(_, s)| s.is_none())
                .map(|(i, _)| i)
                .ok_or(JoinRejection::Full)?
        };
        self.slots[slot] = Some(RosterEntry {
            slot,
            member,
            entity,
        });
        Ok(slot)
    }

    /// Put an entry back into exactly the slot it names.
    ///
    /// Returns `false` when the slot is out of range or occupied.
    pub fn restore(&mut self, entry: RosterEntry) -> bool {
        match self.slots.get_mut(entry.slot) {
            Some(slot) if slot.is_none() => {
                *slot = Some(entry);
                true
            }
            _ => false,
        }
    }

    /// Free a slot, returning the entry that occupied it.
    pub fn remove(&mut self, slot: usize) -> Option<RosterEntry> {
        self.slots.get_mut(slot).and_then(Option::take)
    }

    /// Rebind the entity linked to a slot, returning the previous link.
    ///
    /// The outer `None` means the slot is vacant.
    pub fn assign(&mut self, slot: usize, entity: Option<EntityId>) -> Option<Option<EntityId>> {
        let entry = self.slots.get_mut(slot)?.as_mut()?;
        Some(std::mem::replace(&mut entry.entity, entity))
    }

    /// Find the slot held by a membership.
    pub fn slot_of(&self, member: MemberId) -> Option<usize> {
        self.slots
            .iter()
            .position(|s| s.is_some_and(|e| e.member == member))
    }

    pub fn get(&self, slot: usize) -> Option<&RosterEntry> {
        self.slots.get(slot)?.as_ref()
    }

    /// Find the entry linked to an entity.
    pub fn find_by_entity(&self, entity: EntityId) -> Option<&RosterEntry> {
        self.entries().find(|e| e.entity == Some(entity))
    }

    /// Occupied entries in slot order.
    pub fn entries(&self) -> impl Iterator<Item = &RosterEntry> {
        self.slots.iter().flatten()
    }

    pub fn len(&self) -> usize {
        self.entries().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for Roster {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_ROSTER_CAPACITY)
    }
}
