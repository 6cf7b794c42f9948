//! Map markers: the fixed set of placeable ground markers.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// All placeable map markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Marker {
    // Lettered
    A,
    B,
    C,
    D,

    // Numbered
    One,
    Two,
    Three,
    Four,
}

impl Marker {
    pub const COUNT: usize = 8;

    pub const ALL: [Marker; Marker::COUNT] = [
        Marker::A,
        Marker::B,
        Marker::C,
        Marker::D,
        Marker::One,
        Marker::Two,
        Marker::Three,
        Marker::Four,
    ];

    /// Position of this marker in [`Marker::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Positions of every marker; `None` when a marker is not placed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct MarkerSet {
    positions: [Option<Vec3>; Marker::COUNT],
}

impl MarkerSet {
    pub fn get(&self, marker: Marker) -> Option<Vec3> {
        self.positions[marker.index()]
    }

    /// Set or clear a marker, returning its previous position.
    pub fn replace(&mut self, marker: Marker, position: Option<Vec3>) -> Option<Vec3> {
        std::mem::replace(&mut self.positions[marker.index()], position)
    }

    /// Iterate placed markers.
    pub fn placed(&self) -> impl Iterator<Item = (Marker, Vec3)> + '_ {
        Marker::ALL
            .iter()
            .filter_map(|&m| self.get(m).map(|pos| (m, pos)))
    }
}
