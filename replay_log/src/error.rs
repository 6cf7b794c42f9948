//! Error types for replay.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReplayError {
    #[error("cannot revert {operation} before it has been applied")]
    RevertBeforeApply { operation: &'static str },

    #[error("cannot append at cursor {cursor} of {len}: rewind the timeline to its end first")]
    AppendBehindCursor { cursor: usize, len: usize },
}
