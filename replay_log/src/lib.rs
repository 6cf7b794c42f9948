//! # Replay Log
//!
//! Steps a [`WorldState`](world_state::WorldState) forward and backward through
//! a captured session. Producers append self-describing operations; a
//! consumer scrubs the cursor and the store always reflects a real historical
//! instant.
//!
//! ## Core Components
//!
//! - **operations**: Closed set of invertible mutations and one-way broadcasts
//! - **timeline**: The ordered operation log and its replay cursor
//!
//! ## Guarantees
//!
//! - **Self-inverting**: Every state mutation captures what it overwrote at apply time
//! - **Order-preserving**: The cursor only ever moves one operation at a time
//! - **Path-independent**: The same cursor position always yields the same state

pub mod error;
pub mod operations;
pub mod timeline;

pub use error::*;
pub use operations::*;
pub use timeline::*;
