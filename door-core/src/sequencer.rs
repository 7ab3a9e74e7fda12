//! Non-reentrant actuation sequencer.
//!
//! The sequencer owns the `Idle -> Running -> Idle` lifecycle of the door
//! motor. Starting a run unlocks the door, signals the operator and energizes
//! the motor; stopping de-energizes the motor and locks the door again, so the
//! barrier is only unlocked while the motor is actually running.
//!
//! Hardware is reached through [`ActuatorDriver`] and [`StatusIndicator`].
//! Their blocking calls (`tone`, `block_for`) stall the caller for a bounded,
//! fixed time.

use core::{fmt, time::Duration};

use crate::config::{LockConfig, ToneConfig, ValidatedConfig};
use crate::light::LightState;
use crate::sequences::{LockAction, LockSequence, lock_sequence, unlock_sequence};
use crate::time::DoorInstant;

/// Abstraction over the door's output lines.
pub trait ActuatorDriver {
    /// Drives the motor enable line.
    fn set_motor(&mut self, energized: bool);

    /// Drives the motor power relay, when one is fitted.
    fn set_relay(&mut self, energized: bool);

    /// Starts driving the lock servo signal.
    fn attach_lock(&mut self);

    /// Commands the lock servo to `position` degrees.
    fn move_lock(&mut self, position: u8);

    /// Stops driving the lock servo signal.
    fn detach_lock(&mut self);

    /// Plays a tone, blocking until it finishes.
    fn tone(&mut self, frequency_hz: u32, duration: Duration);

    /// Blocks the caller for `duration`.
    fn block_for(&mut self, duration: Duration);
}

/// Actuator driver that performs no hardware interaction.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoopActuatorDriver;

impl ActuatorDriver for NoopActuatorDriver {
    fn set_motor(&mut self, _: bool) {}

    fn set_relay(&mut self, _: bool) {}

    fn attach_lock(&mut self) {}

    fn move_lock(&mut self, _: u8) {}

    fn detach_lock(&mut self) {}

    fn tone(&mut self, _: u32, _: Duration) {}

    fn block_for(&mut self, _: Duration) {}
}

/// Mutually exclusive modes of the status LEDs.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum IndicatorMode {
    Normal,
    PendingTransition,
    Actuating,
}

impl IndicatorMode {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            IndicatorMode::Normal => "normal",
            IndicatorMode::PendingTransition => "pending",
            IndicatorMode::Actuating => "actuating",
        }
    }
}

/// Status indicator driven by controller state changes.
pub trait StatusIndicator {
    fn show(&mut self, mode: IndicatorMode);
}

#[derive(Copy, Clone, Debug, Default)]
pub struct NoopIndicator;

impl StatusIndicator for NoopIndicator {
    fn show(&mut self, _: IndicatorMode) {}
}

/// Why a run was started.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ActuationReason {
    /// The debouncer committed a new light state.
    Commit(LightState),
    /// The override button was held past the hold delay.
    Manual,
}

impl fmt::Display for ActuationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActuationReason::Commit(state) => write!(f, "commit {state}"),
            ActuationReason::Manual => f.write_str("manual"),
        }
    }
}

/// Record of an in-flight (or just finished) motor run.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct ActuatorRun<I> {
    /// Instant the motor was energized, after the blocking prelude.
    pub started_at: I,
    pub reason: ActuationReason,
}

/// Lifecycle state of the sequencer.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum SequencerState {
    Idle,
    Running,
}

/// Contract violations reported by the sequencer.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum SequencerError {
    AlreadyRunning,
    NotRunning,
}

impl fmt::Display for SequencerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SequencerError::AlreadyRunning => f.write_str("actuator already running"),
            SequencerError::NotRunning => f.write_str("actuator not running"),
        }
    }
}

/// Drives one timed motor run at a time.
pub struct ActuationSequencer<I, D: ActuatorDriver> {
    driver: D,
    run_duration: Duration,
    prelude: Duration,
    relay_settle: Option<Duration>,
    lock: Option<LockConfig>,
    tone: ToneConfig,
    active: Option<ActuatorRun<I>>,
}

impl<I, D> ActuationSequencer<I, D>
where
    I: DoorInstant,
    D: ActuatorDriver,
{
    /// Creates an idle sequencer and forces every output to its rest state.
    pub fn new(config: &ValidatedConfig, mut driver: D) -> Self {
        let config = config.config();
        driver.set_motor(false);
        if config.relay_settle.is_some() {
            driver.set_relay(false);
        }

        Self {
            driver,
            run_duration: config.run_duration,
            prelude: config.prelude_duration(),
            relay_settle: config.relay_settle,
            lock: config.lock,
            tone: config.tone,
            active: None,
        }
    }

    #[must_use]
    pub fn state(&self) -> SequencerState {
        if self.active.is_some() {
            SequencerState::Running
        } else {
            SequencerState::Idle
        }
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    /// Returns the active run, if any.
    #[must_use]
    pub fn active_run(&self) -> Option<&ActuatorRun<I>> {
        self.active.as_ref()
    }

    #[must_use]
    pub fn run_duration(&self) -> Duration {
        self.run_duration
    }

    #[must_use]
    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    /// Begins a motor run.
    ///
    /// Blocks for the unlock sequence, the confirmation tone and the relay
    /// settle time. `now` is the instant the call began; the run is stamped at
    /// `now` plus that blocking time so the motor stays energized for the full
    /// run duration.
    ///
    /// # Errors
    ///
    /// Returns [`SequencerError::AlreadyRunning`] without touching any output
    /// when a run is already active.
    pub fn start<S>(
        &mut self,
        now: I,
        reason: ActuationReason,
        indicator: &mut S,
    ) -> Result<(), SequencerError>
    where
        S: StatusIndicator,
    {
        if self.active.is_some() {
            return Err(SequencerError::AlreadyRunning);
        }

        if let Some(lock) = self.lock {
            self.run_lock_sequence(&unlock_sequence(&lock));
        }

        indicator.show(IndicatorMode::Actuating);
        self.driver
            .tone(self.tone.frequency_hz, self.tone.duration);

        if let Some(settle) = self.relay_settle {
            self.driver.set_relay(true);
            self.driver.block_for(settle);
        }
        self.driver.set_motor(true);

        self.active = Some(ActuatorRun {
            started_at: now + self.prelude,
            reason,
        });

        Ok(())
    }

    /// Returns `true` once the active run has lasted `run_duration`.
    #[must_use]
    pub fn is_done(&self, now: I) -> bool {
        self.active.as_ref().is_some_and(|run| {
            now.saturating_duration_since(run.started_at) >= self.run_duration
        })
    }

    /// Ends the active run and re-locks the door.
    ///
    /// # Errors
    ///
    /// Returns [`SequencerError::NotRunning`] when no run is active.
    pub fn stop<S>(&mut self, indicator: &mut S) -> Result<ActuatorRun<I>, SequencerError>
    where
        S: StatusIndicator,
    {
        let Some(run) = self.active else {
            return Err(SequencerError::NotRunning);
        };

        self.driver.set_motor(false);
        if self.relay_settle.is_some() {
            self.driver.set_relay(false);
        }

        if let Some(lock) = self.lock {
            self.run_lock_sequence(&lock_sequence(&lock));
        }

        self.active = None;
        indicator.show(IndicatorMode::Normal);
        Ok(run)
    }

    fn run_lock_sequence(&mut self, sequence: &LockSequence) {
        for step in sequence.steps() {
            match *step {
                LockAction::Attach => self.driver.attach_lock(),
                LockAction::MoveTo(position) => self.driver.move_lock(position),
                LockAction::Hold(duration) => self.driver.block_for(duration),
                LockAction::Detach => self.driver.detach_lock(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DoorConfig;
    use crate::time::MillisInstant;
    use heapless::Vec;

    #[derive(Copy, Clone, Debug, Eq, PartialEq)]
    enum Call {
        Motor(bool),
        Relay(bool),
        Attach,
        Move(u8),
        Detach,
        Tone,
        Block(u64),
        Indicator(IndicatorMode),
    }

    #[derive(Default)]
    struct Recorder {
        calls: Vec<Call, 32>,
    }

    impl Recorder {
        fn push(&mut self, call: Call) {
            self.calls.push(call).expect("call log overflow");
        }
    }

    impl ActuatorDriver for Recorder {
        fn set_motor(&mut self, energized: bool) {
            self.push(Call::Motor(energized));
        }

        fn set_relay(&mut self, energized: bool) {
            self.push(Call::Relay(energized));
        }

        fn attach_lock(&mut self) {
            self.push(Call::Attach);
        }

        fn move_lock(&mut self, position: u8) {
            self.push(Call::Move(position));
        }

        fn detach_lock(&mut self) {
            self.push(Call::Detach);
        }

        fn tone(&mut self, _: u32, _: Duration) {
            self.push(Call::Tone);
        }

        fn block_for(&mut self, duration: Duration) {
            self.push(Call::Block(
                u64::try_from(duration.as_millis()).unwrap_or(u64::MAX),
            ));
        }
    }

    #[derive(Default)]
    struct IndicatorLog {
        modes: Vec<IndicatorMode, 8>,
    }

    impl StatusIndicator for IndicatorLog {
        fn show(&mut self, mode: IndicatorMode) {
            self.modes.push(mode).expect("indicator log overflow");
        }
    }

    fn at(millis: u64) -> MillisInstant {
        MillisInstant::from_millis(millis)
    }

    fn sequencer(config: DoorConfig) -> ActuationSequencer<MillisInstant, Recorder> {
        let validated = config.validate().expect("valid config");
        let mut sequencer = ActuationSequencer::new(&validated, Recorder::default());
        sequencer.driver_mut().calls.clear();
        sequencer
    }

    #[test]
    fn start_unlocks_before_energizing_motor() {
        let mut sequencer = sequencer(DoorConfig::DEFAULT);
        let mut indicator = NoopIndicator;

        sequencer
            .start(at(0), ActuationReason::Manual, &mut indicator)
            .expect("idle sequencer starts");

        assert_eq!(
            sequencer.driver().calls.as_slice(),
            &[
                Call::Attach,
                Call::Move(0),
                Call::Block(500),
                Call::Detach,
                Call::Tone,
                Call::Relay(true),
                Call::Block(50),
                Call::Motor(true),
            ]
        );
        assert_eq!(sequencer.state(), SequencerState::Running);
    }

    #[test]
    fn stop_de_energizes_then_locks() {
        let mut sequencer = sequencer(DoorConfig::DEFAULT);
        let mut indicator = IndicatorLog::default();
        sequencer
            .start(at(0), ActuationReason::Commit(LightState::Dark), &mut indicator)
            .expect("start");
        sequencer.driver_mut().calls.clear();

        let run = sequencer.stop(&mut indicator).expect("stop");
        assert_eq!(run.reason, ActuationReason::Commit(LightState::Dark));
        assert_eq!(
            sequencer.driver().calls.as_slice(),
            &[
                Call::Motor(false),
                Call::Relay(false),
                Call::Attach,
                Call::Move(90),
                Call::Block(500),
                Call::Detach,
            ]
        );
        assert_eq!(
            indicator.modes.as_slice(),
            &[IndicatorMode::Actuating, IndicatorMode::Normal]
        );
        assert!(!sequencer.is_running());
    }

    #[test]
    fn plain_variant_skips_lock_and_relay() {
        let mut sequencer = sequencer(DoorConfig::DEFAULT.with_lock(None).with_relay(None));
        let mut indicator = NoopIndicator;

        sequencer
            .start(at(0), ActuationReason::Manual, &mut indicator)
            .expect("start");
        sequencer.stop(&mut indicator).expect("stop");

        assert_eq!(
            sequencer.driver().calls.as_slice(),
            &[Call::Tone, Call::Motor(true), Call::Motor(false)]
        );
    }

    #[test]
    fn second_start_is_rejected_without_side_effects() {
        let mut sequencer = sequencer(DoorConfig::DEFAULT);
        let mut indicator = NoopIndicator;
        sequencer
            .start(at(100), ActuationReason::Manual, &mut indicator)
            .expect("start");
        let calls_after_start = sequencer.driver().calls.len();

        let result = sequencer.start(
            at(5_000),
            ActuationReason::Commit(LightState::Light),
            &mut indicator,
        );

        assert_eq!(result, Err(SequencerError::AlreadyRunning));
        assert_eq!(sequencer.driver().calls.len(), calls_after_start);
        let run = sequencer.active_run().expect("still running");
        assert_eq!(run.started_at, at(800));
        assert_eq!(run.reason, ActuationReason::Manual);
    }

    #[test]
    fn stop_while_idle_is_rejected() {
        let mut sequencer = sequencer(DoorConfig::DEFAULT);
        let mut indicator = NoopIndicator;
        assert_eq!(
            sequencer.stop(&mut indicator),
            Err(SequencerError::NotRunning)
        );
        assert!(sequencer.driver().calls.is_empty());
    }

    #[test]
    fn is_done_is_false_when_idle() {
        let sequencer = sequencer(DoorConfig::DEFAULT);
        assert!(!sequencer.is_done(at(1_000_000)));
    }
}
