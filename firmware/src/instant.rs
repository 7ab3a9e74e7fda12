#![cfg_attr(not(target_os = "none"), allow(dead_code))]

//! Monotonic instant backed by the embassy time driver.

use core::ops::Add;
use core::time::Duration;

use door_core::time::DoorInstant;
use embassy_time::{Duration as EmbassyDuration, Instant as EmbassyInstant};

/// [`DoorInstant`] implementation for the firmware.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd)]
pub struct FirmwareInstant(EmbassyInstant);

impl FirmwareInstant {
    /// Reads the time driver.
    #[cfg(target_os = "none")]
    pub fn now() -> Self {
        Self(EmbassyInstant::now())
    }

    pub fn as_millis(self) -> u64 {
        self.0.as_millis()
    }
}

impl From<EmbassyInstant> for FirmwareInstant {
    fn from(instant: EmbassyInstant) -> Self {
        Self(instant)
    }
}

impl Add<Duration> for FirmwareInstant {
    type Output = Self;

    fn add(self, rhs: Duration) -> Self::Output {
        let micros = u64::try_from(rhs.as_micros()).unwrap_or(u64::MAX);
        Self(
            self.0
                .checked_add(EmbassyDuration::from_micros(micros))
                .unwrap_or(EmbassyInstant::MAX),
        )
    }
}

impl DoorInstant for FirmwareInstant {
    fn saturating_duration_since(&self, earlier: Self) -> Duration {
        Duration::from_micros(self.0.saturating_duration_since(earlier.0).as_micros())
    }
}

/// Converts a core duration into the embassy representation.
pub fn to_embassy(duration: Duration) -> EmbassyDuration {
    EmbassyDuration::from_micros(u64::try_from(duration.as_micros()).unwrap_or(u64::MAX))
}
