//! Hold-to-trigger manual override button.
//!
//! The button is debounced by time rather than by counting samples: a press
//! only counts once it has been held continuously for longer than the hold
//! delay. Releasing the button, or firing a trigger, restarts the hold timer.

use core::time::Duration;

use crate::time::DoorInstant;

/// Electrical level read from the button input.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ButtonLevel {
    High,
    Low,
}

impl ButtonLevel {
    /// The button pulls the line low when pressed.
    #[must_use]
    pub const fn is_pressed(self) -> bool {
        matches!(self, ButtonLevel::Low)
    }

    /// Helper converting a pressed flag into the active-low level.
    #[must_use]
    pub const fn from_pressed(pressed: bool) -> Self {
        if pressed {
            ButtonLevel::Low
        } else {
            ButtonLevel::High
        }
    }
}

/// Result of polling the override button.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum OverrideStatus {
    Released,
    Holding { held: Duration },
    Triggered,
}

impl OverrideStatus {
    #[must_use]
    pub const fn is_triggered(self) -> bool {
        matches!(self, OverrideStatus::Triggered)
    }
}

#[derive(Clone, Debug)]
pub struct ManualOverride<I> {
    hold_delay: Duration,
    start_hold_time: I,
}

impl<I> ManualOverride<I>
where
    I: DoorInstant,
{
    /// Creates an override whose hold timer starts at `now`.
    pub const fn new(hold_delay: Duration, now: I) -> Self {
        Self {
            hold_delay,
            start_hold_time: now,
        }
    }

    /// Samples the button at `now`, restarting the hold timer on release and
    /// after every trigger.
    pub fn poll(&mut self, level: ButtonLevel, now: I) -> OverrideStatus {
        if !level.is_pressed() {
            self.start_hold_time = now;
            return OverrideStatus::Released;
        }

        let held = now.saturating_duration_since(self.start_hold_time);
        if held > self.hold_delay {
            self.start_hold_time = now;
            OverrideStatus::Triggered
        } else {
            OverrideStatus::Holding { held }
        }
    }
}
