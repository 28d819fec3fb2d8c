//! Bookkeeping for the refresh pass currently in flight.

use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio_util::sync::CancellationToken;

/// One refresh pass: its token and a generation number to tell it apart
/// from passes started later.
#[derive(Debug, Clone)]
pub struct Cycle {
    pub token: CancellationToken,
    generation: u64,
}

#[derive(Debug, Default)]
struct Slot {
    current: Option<CancellationToken>,
    generation: u64,
}

/// Holds the running pass so a newer one can cancel it.
#[derive(Debug, Default)]
pub struct Cycles {
    slot: Mutex<Slot>,
}

impl Cycles {
    /// Starts a pass under `parent`, cancelling the one still running.
    pub fn begin(&self, parent: &CancellationToken) -> Cycle {
        let token = parent.child_token();
        let mut slot = self.lock();
        if let Some(previous) = slot.current.replace(token.clone()) {
            previous.cancel();
        }
        slot.generation += 1;
        Cycle {
            token,
            generation: slot.generation,
        }
    }

    /// Whether no pass has started since `cycle`.
    pub fn is_current(&self, cycle: &Cycle) -> bool {
        self.lock().generation == cycle.generation
    }

    fn lock(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_pass_cancels_previous() {
        let cycles = Cycles::default();
        let parent = CancellationToken::new();

        let first = cycles.begin(&parent);
        assert!(cycles.is_current(&first));

        let second = cycles.begin(&parent);
        assert!(first.token.is_cancelled());
        assert!(!cycles.is_current(&first));
        assert!(cycles.is_current(&second));
        assert!(!second.token.is_cancelled());
    }

    #[test]
    fn test_parent_cancellation_reaches_pass() {
        let cycles = Cycles::default();
        let parent = CancellationToken::new();
        let pass = cycles.begin(&parent);

        parent.cancel();
        assert!(pass.token.is_cancelled());
    }
}
