//! Minimum dwell between actuations.
//!
//! The gate keeps the deadline at which automatic light sampling may resume.
//! Deadlines only ever move forward, so refreshing the gate at both the start
//! and the end of a run measures the dwell from the later of the two.

use core::time::Duration;

use crate::time::DoorInstant;

/// Suppresses automatic sampling until `min_dwell` has passed since the last
/// actuation.
#[derive(Clone, Debug)]
pub struct CooldownGate<I> {
    min_dwell: Duration,
    next_allowed: Option<I>,
}

impl<I> CooldownGate<I>
where
    I: DoorInstant,
{
    /// Creates a gate that is open until the first actuation is recorded.
    pub const fn new(min_dwell: Duration) -> Self {
        Self {
            min_dwell,
            next_allowed: None,
        }
    }

    /// Instant at which sampling may resume, if the gate has ever closed.
    #[must_use]
    pub fn ready_at(&self) -> Option<I> {
        self.next_allowed
    }

    /// Returns `true` when automatic sampling may run at `now`.
    #[must_use]
    pub fn may_evaluate(&self, now: I) -> bool {
        match self.next_allowed {
            Some(deadline) => now >= deadline,
            None => true,
        }
    }

    /// Records an actuation at `at`, pushing the reopening deadline forward.
    pub fn record_actuation(&mut self, at: I) {
        let deadline = at + self.min_dwell;
        match self.next_allowed {
            Some(current) if current >= deadline => {}
            _ => self.next_allowed = Some(deadline),
        }
    }
}
