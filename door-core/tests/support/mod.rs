#![allow(dead_code)]

use core::time::Duration;

use door_core::config::DoorConfig;
use door_core::controller::{DoorController, SensorInputs, TickReport};
use door_core::manual::ButtonLevel;
use door_core::sequencer::{ActuatorDriver, IndicatorMode, StatusIndicator};
use door_core::time::MillisInstant;

/// Raw reading classified as DARK with the default thresholds (intensity 123).
pub const DARK_RAW: u16 = 900;
/// Raw reading classified as LIGHT with the default thresholds (intensity 923).
pub const LIGHT_RAW: u16 = 100;
/// Raw reading inside the dead band (intensity 423).
pub const NEUTRAL_RAW: u16 = 600;

pub struct ScriptedInputs {
    pub raw: u16,
    pub pressed: bool,
}

impl SensorInputs for ScriptedInputs {
    fn read_light_raw(&mut self) -> u16 {
        self.raw
    }

    fn button_level(&mut self) -> ButtonLevel {
        ButtonLevel::from_pressed(self.pressed)
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Output {
    Motor(bool),
    Relay(bool),
    Attach,
    Move(u8),
    Detach,
    Tone(u32),
    Block(Duration),
}

#[derive(Default)]
pub struct RecordingDriver {
    pub log: Vec<Output>,
    /// Blocking time accumulated since the last [`RecordingDriver::take_stall`].
    pub stalled: Duration,
}

impl RecordingDriver {
    pub fn take_stall(&mut self) -> Duration {
        core::mem::take(&mut self.stalled)
    }

    pub fn motor_starts(&self) -> usize {
        self.log
            .iter()
            .filter(|output| **output == Output::Motor(true))
            .count()
    }
}

impl ActuatorDriver for RecordingDriver {
    fn set_motor(&mut self, energized: bool) {
        self.log.push(Output::Motor(energized));
    }

    fn set_relay(&mut self, energized: bool) {
        self.log.push(Output::Relay(energized));
    }

    fn attach_lock(&mut self) {
        self.log.push(Output::Attach);
    }

    fn move_lock(&mut self, position: u8) {
        self.log.push(Output::Move(position));
    }

    fn detach_lock(&mut self) {
        self.log.push(Output::Detach);
    }

    fn tone(&mut self, frequency_hz: u32, duration: Duration) {
        self.log.push(Output::Tone(frequency_hz));
        self.stalled += duration;
    }

    fn block_for(&mut self, duration: Duration) {
        self.log.push(Output::Block(duration));
        self.stalled += duration;
    }
}

#[derive(Default)]
pub struct RecordingIndicator {
    pub modes: Vec<IndicatorMode>,
}

impl StatusIndicator for RecordingIndicator {
    fn show(&mut self, mode: IndicatorMode) {
        self.modes.push(mode);
    }
}

pub type Controller =
    DoorController<MillisInstant, ScriptedInputs, RecordingDriver, RecordingIndicator>;

pub fn at(millis: u64) -> MillisInstant {
    MillisInstant::from_millis(millis)
}

pub fn boot(config: DoorConfig, raw: u16) -> Controller {
    DoorController::boot(
        config,
        ScriptedInputs {
            raw,
            pressed: false,
        },
        RecordingDriver::default(),
        RecordingIndicator::default(),
        at(0),
    )
    .expect("valid config")
}

/// Ticks from `from` to `to` inclusive in `step` increments, collecting the
/// reports.
pub fn run_ticks(
    controller: &mut Controller,
    from: u64,
    to: u64,
    step: u64,
) -> Vec<TickReport<MillisInstant>> {
    let mut reports = Vec::new();
    let mut now = from;
    while now <= to {
        reports.push(controller.tick(at(now)));
        now += step;
    }
    reports
}
