//! Lazily captured pre-mutation state.

use crate::error::ReplayError;

/// State an operation overwrote, captured by its most recent forward pass.
#[derive(Debug, Clone, PartialEq)]
pub enum Prior<T> {
    /// Never applied.
    Unapplied,
    /// Applied, but the target was missing so nothing changed.
    Missed,
    Captured(T),
}

impl<T> Default for Prior<T> {
    fn default() -> Self {
        Self::Unapplied
    }
}

impl<T> Prior<T> {
    /// Wrap the value a store mutator replaced; `None` means the target was missing.
    pub(crate) fn from_replaced(replaced: Option<T>) -> Self {
        replaced.map_or(Self::Missed, Self::Captured)
    }

    pub fn captured(&self) -> Option<&T> {
        match self {
            Self::Captured(value) => Some(value),
            _ => None,
        }
    }

    /// The value a revert must restore.
    ///
    /// `Ok(None)` means the forward pass changed nothing and there is nothing to undo.
    pub(crate) fn restorable(&self, operation: &'static str) -> Result<Option<&T>, ReplayError> {
        match self {
            Self::Unapplied => Err(ReplayError::RevertBeforeApply { operation }),
            Self::Missed => Ok(None),
            Self::Captured(value) => Ok(Some(value)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distinguishes_unapplied_from_missed() {
        let unapplied: Prior<u16> = Prior::default();
        assert!(unapplied.restorable("Test").is_err());

        let missed: Prior<u16> = Prior::from_replaced(None);
        assert_eq!(missed.restorable("Test"), Ok(None));

        let captured = Prior::from_replaced(Some(5u16));
        assert_eq!(captured.restorable("Test"), Ok(Some(&5)));
        assert_eq!(captured.captured(), Some(&5));
    }
}
