//! Ambient light classification.
//!
//! Raw ADC readings from the photoresistor divider fall as the light gets
//! brighter. [`LightSensor::intensity`] flips that so the rest of the crate can
//! treat larger numbers as brighter, and [`LightSensor::classify`] maps the
//! intensity onto the two thresholds with a dead band between them.

use core::fmt;

/// Coarse classification of a light sample or the committed door state.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum LightState {
    Light,
    Dark,
    /// Inside the dead band between the two thresholds.
    Neutral,
}

impl LightState {
    /// Stable label used in log lines and console output.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            LightState::Light => "LIGHT",
            LightState::Dark => "DARK",
            LightState::Neutral => "NEUTRAL",
        }
    }

    /// Returns `true` for `Light` and `Dark`.
    #[must_use]
    pub const fn is_decisive(self) -> bool {
        !matches!(self, LightState::Neutral)
    }
}

impl fmt::Display for LightState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One classified reading.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct LightSample {
    pub raw: u16,
    pub intensity: u16,
    pub state: LightState,
}

/// Threshold classifier for the light channel.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct LightSensor {
    dark_threshold: u16,
    light_threshold: u16,
    max_raw: u16,
}

impl LightSensor {
    pub const fn new(dark_threshold: u16, light_threshold: u16, max_raw: u16) -> Self {
        Self {
            dark_threshold,
            light_threshold,
            max_raw,
        }
    }

    /// Converts a raw reading into an intensity where larger means brighter.
    #[must_use]
    pub fn intensity(&self, raw: u16) -> u16 {
        self.max_raw - raw.min(self.max_raw)
    }

    /// Classifies an intensity against the dark and light thresholds.
    #[must_use]
    pub fn classify(&self, intensity: u16) -> LightState {
        if intensity <= self.dark_threshold {
            LightState::Dark
        } else if intensity >= self.light_threshold {
            LightState::Light
        } else {
            LightState::Neutral
        }
    }

    #[must_use]
    pub fn sample(&self, raw: u16) -> LightSample {
        let intensity = self.intensity(raw);
        LightSample {
            raw,
            intensity,
            state: self.classify(intensity),
        }
    }

    /// Averages boot-time readings and classifies the result.
    ///
    /// The average truncates toward zero. Returns `None` when no readings are
    /// supplied.
    #[must_use]
    pub fn seed<R>(&self, readings: R) -> Option<LightSample>
    where
        R: IntoIterator<Item = u16>,
    {
        let (sum, count) = readings
            .into_iter()
            .fold((0_u32, 0_u32), |(sum, count), raw| {
                (sum + u32::from(raw), count + 1)
            });

        if count == 0 {
            return None;
        }

        let average = u16::try_from(sum / count).unwrap_or(u16::MAX);
        Some(self.sample(average))
    }
}
