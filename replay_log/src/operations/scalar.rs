//! Operations on process-wide scalar state.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use world_state::{Marker, WorldState};

use super::Prior;
use crate::error::ReplayError;

/// Set the current zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneChange {
    pub zone: u16,
    #[serde(skip)]
    prev: Prior<u16>,
}

impl ZoneChange {
    pub fn new(zone: u16) -> Self {
        Self {
            zone,
            prev: Prior::Unapplied,
        }
    }

    pub(crate) fn apply(&mut self, ws: &mut WorldState) {
        self.prev = Prior::Captured(ws.set_zone(self.zone));
    }

    pub(crate) fn revert(&self, ws: &mut WorldState) -> Result<(), ReplayError> {
        if let Some(&prev) = self.prev.restorable("ZoneChange")? {
            ws.set_zone(prev);
        }
        Ok(())
    }
}

/// Place or clear a map marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerChange {
    pub marker: Marker,
    pub position: Option<Vec3>,
    #[serde(skip)]
    prev: Prior<Option<Vec3>>,
}

impl MarkerChange {
    pub fn new(marker: Marker, position: Option<Vec3>) -> Self {
        Self {
            marker,
            position,
            prev: Prior::Unapplied,
        }
    }

    pub(crate) fn apply(&mut self, ws: &mut WorldState) {
        self.prev = Prior::Captured(ws.set_marker(self.marker, self.position));
    }

    pub(crate) fn revert(&self, ws: &mut WorldState) -> Result<(), ReplayError> {
        if let Some(&prev) = self.prev.restorable("MarkerChange")? {
            ws.set_marker(self.marker, prev);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zone_change_round_trip() {
        let mut ws = WorldState::new();
        ws.set_zone(100);

        let mut op = ZoneChange::new(200);
        op.apply(&mut ws);
        assert_eq!(ws.current_zone(), 200);

        op.revert(&mut ws).unwrap();
        assert_eq!(ws.current_zone(), 100);
    }

    #[test]
    fn test_reapply_overwrites_capture() {
        let mut ws = WorldState::new();
        let mut op = ZoneChange::new(5);
        op.apply(&mut ws);
        ws.set_zone(9);
        op.apply(&mut ws);

        op.revert(&mut ws).unwrap();
        assert_eq!(ws.current_zone(), 9);
    }

    #[test]
    fn test_marker_clear_restores_position() {
        let mut ws = WorldState::new();
        let pos = Vec3::new(1.0, 2.0, 3.0);
        ws.set_marker(Marker::Two, Some(pos));

        let mut op = MarkerChange::new(Marker::Two, None);
        op.apply(&mut ws);
        assert_eq!(ws.marker(Marker::Two), None);

        op.revert(&mut ws).unwrap();
        assert_eq!(ws.marker(Marker::Two), Some(pos));
    }

    #[test]
    fn test_revert_before_apply_is_rejected() {
        let mut ws = WorldState::new();
        let op = MarkerChange::new(Marker::A, None);
        assert_eq!(
            op.revert(&mut ws),
            Err(ReplayError::RevertBeforeApply {
                operation: "MarkerChange"
            })
        );
    }
}
