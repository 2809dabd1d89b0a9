//! Lifecycle state of a router: `Uninitialized -> Loading -> Ready`, or terminal `Failed`.

use std::fmt::{Display, Formatter};
use std::sync::atomic::{AtomicU8, Ordering};

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum RecoveryState {
    Uninitialized,
    Loading,
    Ready,
    Failed,
}

impl RecoveryState {
    fn as_u8(self) -> u8 {
        match self {
            RecoveryState::Uninitialized => 0,
            RecoveryState::Loading => 1,
            RecoveryState::Ready => 2,
            RecoveryState::Failed => 3,
        }
    }

    fn from_u8(value: u8) -> Self {
        match value {
            0 => RecoveryState::Uninitialized,
            1 => RecoveryState::Loading,
            2 => RecoveryState::Ready,
            _ => RecoveryState::Failed,
        }
    }
}

impl Display for RecoveryState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            RecoveryState::Uninitialized => f.write_str("uninitialized"),
            RecoveryState::Loading => f.write_str("loading"),
            RecoveryState::Ready => f.write_str("ready"),
            RecoveryState::Failed => f.write_str("failed"),
        }
    }
}

/// Lock-free holder for the current [`RecoveryState`], read on every publish.
pub(crate) struct RecoveryStateCell {
    state: AtomicU8,
}

impl RecoveryStateCell {
    pub(crate) fn new() -> Self {
        Self {
            state: AtomicU8::new(RecoveryState::Uninitialized.as_u8()),
        }
    }

    pub(crate) fn get(&self) -> RecoveryState {
        RecoveryState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Moves `from -> to`. On failure returns the state actually observed.
    pub(crate) fn transition(
        &self,
        from: RecoveryState,
        to: RecoveryState,
    ) -> Result<(), RecoveryState> {
        self.state
            .compare_exchange(from.as_u8(), to.as_u8(), Ordering::AcqRel, Ordering::Acquire)
            .map(|_| ())
            .map_err(RecoveryState::from_u8)
    }

    /// Unconditional store, used only by the recovery owner once it holds `Loading`.
    pub(crate) fn set(&self, state: RecoveryState) {
        self.state.store(state.as_u8(), Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::{RecoveryState, RecoveryStateCell};

    #[test]
    fn transitions_only_apply_from_the_expected_state() {
        let cell = RecoveryStateCell::new();
        assert_eq!(cell.get(), RecoveryState::Uninitialized);

        assert_eq!(
            cell.transition(RecoveryState::Uninitialized, RecoveryState::Loading),
            Ok(())
        );
        assert_eq!(
            cell.transition(RecoveryState::Uninitialized, RecoveryState::Loading),
            Err(RecoveryState::Loading)
        );
        assert_eq!(
            cell.transition(RecoveryState::Loading, RecoveryState::Ready),
            Ok(())
        );
        assert_eq!(cell.get(), RecoveryState::Ready);
    }
}
