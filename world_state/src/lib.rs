//! # World State
//!
//! The observed state of a captured session - entities, party roster, current zone
//! and map markers. This crate is the single mutation target for replayed
//! operations and does not contain any replay logic itself.

pub mod config;
pub mod entities;
pub mod error;
pub mod events;
pub mod markers;
pub mod roster;
pub mod store;

pub use config::*;
pub use entities::*;
pub use error::*;
pub use events::*;
pub use markers::*;
pub use roster::*;
pub use store::*;

pub use glam::Vec3;
