//! Build-time configuration for the door controller.
//!
//! Every tunable lives in [`DoorConfig`]. The controller only accepts a
//! [`ValidatedConfig`], so a misconfigured build fails at initialization
//! instead of collapsing the dead band or arming a single-sample trigger.

use core::{fmt, time::Duration};

use crate::sequences::{lock_sequence, unlock_sequence};

/// Interval between automatic light samples.
pub const DEFAULT_SAMPLING_INTERVAL: Duration = Duration::from_secs(15);
/// Time a new light level must persist before the door moves.
pub const DEFAULT_CONFIRMATION_WINDOW: Duration = Duration::from_secs(300);
/// How long the motor stays energized for one open or close.
pub const DEFAULT_RUN_DURATION: Duration = Duration::from_secs(20);
/// Intensities at or below this value classify as dark.
pub const DEFAULT_DARK_THRESHOLD: u16 = 250;
/// Intensities at or above this value classify as light.
pub const DEFAULT_LIGHT_THRESHOLD: u16 = 550;
/// Full-scale reading of the 10-bit light ADC.
pub const DEFAULT_MAX_RAW: u16 = 1023;
/// Minimum dwell between two actuations.
pub const DEFAULT_MIN_DWELL: Duration = Duration::from_secs(600);
/// Continuous press required before the button forces an actuation.
pub const DEFAULT_HOLD_DELAY: Duration = Duration::from_millis(2_000);
/// Settle time between the relay and motor enable lines.
pub const DEFAULT_RELAY_SETTLE: Duration = Duration::from_millis(50);
/// Number of readings averaged to seed the committed state at boot.
pub const DEFAULT_SEED_SAMPLES: u8 = 5;

/// Servo positions and travel time for the door lock.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct LockConfig {
    pub unlocked_position: u8,
    pub locked_position: u8,
    pub travel: Duration,
}

impl LockConfig {
    pub const DEFAULT: Self = Self::new(0, 90, Duration::from_millis(500));

    pub const fn new(unlocked_position: u8, locked_position: u8, travel: Duration) -> Self {
        Self {
            unlocked_position,
            locked_position,
            travel,
        }
    }
}

impl Default for LockConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Audible confirmation cue played before the motor starts.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct ToneConfig {
    pub frequency_hz: u32,
    pub duration: Duration,
}

impl ToneConfig {
    pub const DEFAULT: Self = Self::new(1_000, Duration::from_millis(150));

    pub const fn new(frequency_hz: u32, duration: Duration) -> Self {
        Self {
            frequency_hz,
            duration,
        }
    }
}

impl Default for ToneConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Raw controller configuration, validated by [`DoorConfig::validate`].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct DoorConfig {
    pub sampling_interval: Duration,
    pub confirmation_window: Duration,
    pub run_duration: Duration,
    pub dark_threshold: u16,
    pub light_threshold: u16,
    pub max_raw: u16,
    pub min_dwell: Duration,
    pub hold_delay: Duration,
    /// `None` when the motor is switched without a power relay.
    pub relay_settle: Option<Duration>,
    /// `None` when the door has no lock servo.
    pub lock: Option<LockConfig>,
    pub tone: ToneConfig,
    pub seed_samples: u8,
}

impl DoorConfig {
    /// Reference configuration for the richer variant (relay and lock fitted).
    pub const DEFAULT: Self = Self {
        sampling_interval: DEFAULT_SAMPLING_INTERVAL,
        confirmation_window: DEFAULT_CONFIRMATION_WINDOW,
        run_duration: DEFAULT_RUN_DURATION,
        dark_threshold: DEFAULT_DARK_THRESHOLD,
        light_threshold: DEFAULT_LIGHT_THRESHOLD,
        max_raw: DEFAULT_MAX_RAW,
        min_dwell: DEFAULT_MIN_DWELL,
        hold_delay: DEFAULT_HOLD_DELAY,
        relay_settle: Some(DEFAULT_RELAY_SETTLE),
        lock: Some(LockConfig::DEFAULT),
        tone: ToneConfig::DEFAULT,
        seed_samples: DEFAULT_SEED_SAMPLES,
    };

    #[must_use]
    pub const fn with_sampling(mut self, interval: Duration, confirmation: Duration) -> Self {
        self.sampling_interval = interval;
        self.confirmation_window = confirmation;
        self
    }

    #[must_use]
    pub const fn with_thresholds(mut self, dark: u16, light: u16) -> Self {
        self.dark_threshold = dark;
        self.light_threshold = light;
        self
    }

    #[must_use]
    pub const fn with_run_duration(mut self, run_duration: Duration) -> Self {
        self.run_duration = run_duration;
        self
    }

    #[must_use]
    pub const fn with_min_dwell(mut self, min_dwell: Duration) -> Self {
        self.min_dwell = min_dwell;
        self
    }

    #[must_use]
    pub const fn with_hold_delay(mut self, hold_delay: Duration) -> Self {
        self.hold_delay = hold_delay;
        self
    }

    #[must_use]
    pub const fn with_relay(mut self, relay_settle: Option<Duration>) -> Self {
        self.relay_settle = relay_settle;
        self
    }

    #[must_use]
    pub const fn with_lock(mut self, lock: Option<LockConfig>) -> Self {
        self.lock = lock;
        self
    }

    #[must_use]
    pub const fn with_tone(mut self, tone: ToneConfig) -> Self {
        self.tone = tone;
        self
    }

    /// Blocking time spent in `start` before the motor is energized.
    #[must_use]
    pub fn prelude_duration(&self) -> Duration {
        let unlock = self
            .lock
            .map_or(Duration::ZERO, |lock| unlock_sequence(&lock).total_duration());
        let relay = self.relay_settle.unwrap_or(Duration::ZERO);
        unlock + self.tone.duration + relay
    }

    /// Blocking time spent in `stop` re-locking the door.
    #[must_use]
    pub fn relock_duration(&self) -> Duration {
        self.lock
            .map_or(Duration::ZERO, |lock| lock_sequence(&lock).total_duration())
    }

    /// Number of consecutive disagreeing samples required to commit.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroSamplingInterval`] or
    /// [`ConfigError::ConfirmationShorterThanInterval`] when the window cannot
    /// be divided into samples, and [`ConfigError::ThresholdOverflow`] when the
    /// count does not fit in a `u32`.
    pub fn commit_threshold(&self) -> Result<u32, ConfigError> {
        let interval = self.sampling_interval.as_millis();
        if interval == 0 {
            return Err(ConfigError::ZeroSamplingInterval);
        }

        let window = self.confirmation_window.as_millis();
        if window < interval {
            return Err(ConfigError::ConfirmationShorterThanInterval {
                confirmation: self.confirmation_window,
                interval: self.sampling_interval,
            });
        }

        u32::try_from(window.div_ceil(interval)).map_err(|_| ConfigError::ThresholdOverflow)
    }

    /// Checks every invariant the decision logic relies on.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(self) -> Result<ValidatedConfig, ConfigError> {
        if self.dark_threshold >= self.light_threshold {
            return Err(ConfigError::InvertedThresholds {
                dark: self.dark_threshold,
                light: self.light_threshold,
            });
        }

        if self.light_threshold > self.max_raw {
            return Err(ConfigError::ThresholdOutOfRange {
                threshold: self.light_threshold,
                max_raw: self.max_raw,
            });
        }

        let commit_threshold = self.commit_threshold()?;

        if self.run_duration.is_zero() {
            return Err(ConfigError::ZeroRunDuration);
        }

        let prelude = self.prelude_duration();
        if prelude >= self.run_duration {
            return Err(ConfigError::PreludeExceedsRun {
                prelude,
                run: self.run_duration,
            });
        }

        if self.seed_samples == 0 {
            return Err(ConfigError::NoSeedSamples);
        }

        if let Some(lock) = self.lock {
            if lock.locked_position == lock.unlocked_position {
                return Err(ConfigError::LockPositionsEqual(lock.locked_position));
            }
        }

        Ok(ValidatedConfig {
            config: self,
            commit_threshold,
        })
    }
}

impl Default for DoorConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Configuration that passed [`DoorConfig::validate`].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct ValidatedConfig {
    config: DoorConfig,
    commit_threshold: u32,
}

impl ValidatedConfig {
    /// Returns the underlying configuration.
    #[must_use]
    pub const fn config(&self) -> &DoorConfig {
        &self.config
    }

    /// Returns the derived commit threshold (always at least one).
    #[must_use]
    pub const fn commit_threshold(&self) -> u32 {
        self.commit_threshold
    }
}

/// Reasons a [`DoorConfig`] is refused.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ConfigError {
    InvertedThresholds { dark: u16, light: u16 },
    ThresholdOutOfRange { threshold: u16, max_raw: u16 },
    ZeroSamplingInterval,
    ConfirmationShorterThanInterval {
        confirmation: Duration,
        interval: Duration,
    },
    ThresholdOverflow,
    ZeroRunDuration,
    /// The blocking start-up would stall the tick loop for at least as long
    /// as the motor runs.
    PreludeExceedsRun { prelude: Duration, run: Duration },
    NoSeedSamples,
    LockPositionsEqual(u8),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvertedThresholds { dark, light } => {
                write!(f, "dark threshold {dark} must be below light threshold {light}")
            }
            ConfigError::ThresholdOutOfRange { threshold, max_raw } => {
                write!(f, "threshold {threshold} exceeds sensor range 0..={max_raw}")
            }
            ConfigError::ZeroSamplingInterval => f.write_str("sampling interval must be non-zero"),
            ConfigError::ConfirmationShorterThanInterval {
                confirmation,
                interval,
            } => write!(
                f,
                "confirmation window {}ms shorter than sampling interval {}ms",
                confirmation.as_millis(),
                interval.as_millis()
            ),
            ConfigError::ThresholdOverflow => f.write_str("commit threshold does not fit in u32"),
            ConfigError::ZeroRunDuration => f.write_str("run duration must be non-zero"),
            ConfigError::PreludeExceedsRun { prelude, run } => write!(
                f,
                "blocking prelude {}ms must be shorter than run duration {}ms",
                prelude.as_millis(),
                run.as_millis()
            ),
            ConfigError::NoSeedSamples => f.write_str("at least one boot seed sample is required"),
            ConfigError::LockPositionsEqual(position) => {
                write!(f, "lock and unlock positions are both {position}")
            }
        }
    }
}

impl core::error::Error for ConfigError {}
