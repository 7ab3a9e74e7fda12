//! Monotonic time abstraction shared by firmware and host targets.
//!
//! The controller never reads a clock on its own. Every operation receives the
//! current instant from the driver loop, which keeps the decision logic
//! deterministic under test and lets the emulator run on a virtual clock.

use core::{fmt, ops::Add, time::Duration};

/// Trait implemented by monotonic instant types the controller can consume.
pub trait DoorInstant: Copy + Ord + Add<Duration, Output = Self> {
    /// Returns the saturating duration from `earlier` to `self`.
    fn saturating_duration_since(&self, earlier: Self) -> Duration;
}

/// Millisecond-resolution instant used by the emulator and tests.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct MillisInstant(u64);

impl MillisInstant {
    /// Instant at the start of the timeline.
    pub const ZERO: Self = Self(0);

    /// Creates an instant `millis` milliseconds after the start of the timeline.
    #[must_use]
    pub const fn from_millis(millis: u64) -> Self {
        Self(millis)
    }

    /// Returns the number of milliseconds since the start of the timeline.
    #[must_use]
    pub const fn as_millis(self) -> u64 {
        self.0
    }
}

impl Add<Duration> for MillisInstant {
    type Output = Self;

    fn add(self, rhs: Duration) -> Self::Output {
        let millis = u64::try_from(rhs.as_millis()).unwrap_or(u64::MAX);
        Self(self.0.saturating_add(millis))
    }
}

impl DoorInstant for MillisInstant {
    fn saturating_duration_since(&self, earlier: Self) -> Duration {
        Duration::from_millis(self.0.saturating_sub(earlier.0))
    }
}

impl fmt::Display for MillisInstant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}
