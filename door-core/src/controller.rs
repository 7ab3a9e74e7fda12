//! Tick-driven door controller.
//!
//! [`DoorController`] owns every piece of decision state and is advanced by an
//! external loop calling [`DoorController::tick`]. Each tick runs, in order:
//!
//! 1. the manual override poll (only while the actuator is idle),
//! 2. the cooldown gate check, light sample and debounce update (skipped when
//!    the override fired this tick or the actuator is busy),
//! 3. the end-of-run check, stopping the actuator once the run has elapsed.
//!
//! Hardware is reached through [`SensorInputs`], [`ActuatorDriver`] and
//! [`StatusIndicator`]; the controller itself never reads a clock.

use core::{fmt, time::Duration};

use crate::config::{ConfigError, DoorConfig, ValidatedConfig};
use crate::cooldown::CooldownGate;
use crate::debounce::Debouncer;
use crate::light::{LightSample, LightSensor, LightState};
use crate::manual::{ButtonLevel, ManualOverride, OverrideStatus};
use crate::sequencer::{
    ActuationReason, ActuationSequencer, ActuatorDriver, ActuatorRun, IndicatorMode,
    StatusIndicator,
};
use crate::telemetry::TelemetryRecorder;
use crate::time::DoorInstant;

/// Input lines sampled by the controller.
pub trait SensorInputs {
    /// Reads the light channel, `0..=max_raw`.
    fn read_light_raw(&mut self) -> u16;

    /// Reads the override button level.
    fn button_level(&mut self) -> ButtonLevel;
}

/// Outcome of one scheduled light sample.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct SampleReport {
    pub sample: LightSample,
    /// Debounce counter after the sample was applied.
    pub count: u32,
    pub threshold: u32,
    /// Newly committed state, if this sample completed a transition.
    pub commit: Option<LightState>,
}

/// Everything that happened during one tick.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct TickReport<I> {
    pub at: I,
    /// Button status, `None` when the override was not polled.
    pub manual: Option<OverrideStatus>,
    pub sample: Option<SampleReport>,
    /// Set when automatic sampling resumed this tick.
    pub cooldown_released: bool,
    pub started: Option<ActuationReason>,
    pub completed: Option<ActuatorRun<I>>,
}

impl<I> TickReport<I> {
    const fn quiet(at: I) -> Self {
        Self {
            at,
            manual: None,
            sample: None,
            cooldown_released: false,
            started: None,
            completed: None,
        }
    }

    /// Returns `true` when the tick changed anything worth reporting.
    #[must_use]
    pub fn is_notable(&self) -> bool {
        self.sample.is_some()
            || self.cooldown_released
            || self.started.is_some()
            || self.completed.is_some()
            || self.manual.is_some_and(OverrideStatus::is_triggered)
    }
}

/// Progress of the active motor run.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct RunStatus {
    pub reason: ActuationReason,
    pub elapsed: Duration,
    pub remaining: Duration,
}

/// Point-in-time snapshot of the controller.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct DoorStatus<I> {
    pub committed: LightState,
    pub count: u32,
    pub threshold: u32,
    pub last_sample: Option<LightSample>,
    pub run: Option<RunStatus>,
    /// Reopening instant while the cooldown gate is closed.
    pub cooldown_until: Option<I>,
    pub indicator: IndicatorMode,
}

impl<I: fmt::Display> fmt::Display for DoorStatus<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "committed={} count={}/{}",
            self.committed, self.count, self.threshold
        )?;
        if let Some(sample) = self.last_sample {
            write!(
                f,
                " last={}(raw={} intensity={})",
                sample.state, sample.raw, sample.intensity
            )?;
        }
        match self.run {
            Some(run) => write!(
                f,
                " door=running({}) elapsed={}ms remaining={}ms",
                run.reason,
                run.elapsed.as_millis(),
                run.remaining.as_millis()
            )?,
            None => f.write_str(" door=idle")?,
        }
        match &self.cooldown_until {
            Some(until) => write!(f, " cooldown-until={until}")?,
            None => f.write_str(" cooldown=open")?,
        }
        write!(f, " indicator={}", self.indicator.label())
    }
}

/// Forwards indicator changes only, remembering the mode last shown.
struct TrackedIndicator<N> {
    inner: N,
    mode: IndicatorMode,
}

impl<N: StatusIndicator> TrackedIndicator<N> {
    fn new(mut inner: N) -> Self {
        inner.show(IndicatorMode::Normal);
        Self {
            inner,
            mode: IndicatorMode::Normal,
        }
    }
}

impl<N: StatusIndicator> StatusIndicator for TrackedIndicator<N> {
    fn show(&mut self, mode: IndicatorMode) {
        if mode != self.mode {
            self.mode = mode;
            self.inner.show(mode);
        }
    }
}

/// Light-driven door controller.
pub struct DoorController<I, S, D, N>
where
    D: ActuatorDriver,
{
    config: ValidatedConfig,
    inputs: S,
    indicator: TrackedIndicator<N>,
    sensor: LightSensor,
    debouncer: Debouncer,
    cooldown: CooldownGate<I>,
    sequencer: ActuationSequencer<I, D>,
    manual: ManualOverride<I>,
    telemetry: TelemetryRecorder<I>,
    last_sample_at: I,
    last_sample: Option<LightSample>,
    cooling_down: bool,
}

impl<I, S, D, N> DoorController<I, S, D, N>
where
    I: DoorInstant,
    S: SensorInputs,
    D: ActuatorDriver,
    N: StatusIndicator,
{
    /// Validates `config`, seeds the committed state from back-to-back boot
    /// readings and returns an idle controller.
    ///
    /// The first scheduled sample happens one sampling interval after `now`.
    ///
    /// # Errors
    ///
    /// Returns the [`ConfigError`] that [`DoorConfig::validate`] reports, or
    /// [`ConfigError::NoSeedSamples`] when no boot reading was taken.
    pub fn boot(
        config: DoorConfig,
        mut inputs: S,
        driver: D,
        indicator: N,
        now: I,
    ) -> Result<Self, ConfigError> {
        let validated = config.validate()?;
        let sensor = LightSensor::new(config.dark_threshold, config.light_threshold, config.max_raw);
        let seed = sensor
            .seed((0..config.seed_samples).map(|_| inputs.read_light_raw()))
            .ok_or(ConfigError::NoSeedSamples)?;

        let mut telemetry = TelemetryRecorder::new();
        telemetry.record_seeded(seed, now);

        Ok(Self {
            config: validated,
            inputs,
            indicator: TrackedIndicator::new(indicator),
            sensor,
            debouncer: Debouncer::new(seed.state, validated.commit_threshold()),
            cooldown: CooldownGate::new(config.min_dwell),
            sequencer: ActuationSequencer::new(&validated, driver),
            manual: ManualOverride::new(config.hold_delay, now),
            telemetry,
            last_sample_at: now,
            last_sample: Some(seed),
            cooling_down: false,
        })
    }

    /// Advances the controller to `now`.
    pub fn tick(&mut self, now: I) -> TickReport<I> {
        let mut report = TickReport::quiet(now);

        if !self.sequencer.is_running() {
            let status = self.manual.poll(self.inputs.button_level(), now);
            report.manual = Some(status);
            if status.is_triggered() {
                self.trigger_manual(now, &mut report);
            } else {
                self.run_light_path(now, &mut report);
            }
        }

        if self.sequencer.is_done(now) {
            self.finish_run(now, &mut report);
        }

        report
    }

    fn trigger_manual(&mut self, now: I, report: &mut TickReport<I>) {
        let sample = self.sensor.sample(self.inputs.read_light_raw());
        self.debouncer.resync(sample.state);
        self.last_sample = Some(sample);
        self.telemetry.record_manual_trigger(sample, now);
        self.begin_run(now, ActuationReason::Manual, report);
    }

    fn run_light_path(&mut self, now: I, report: &mut TickReport<I>) {
        if !self.cooldown.may_evaluate(now) {
            self.debouncer.reset_count();
            return;
        }

        if self.cooling_down {
            self.cooling_down = false;
            self.debouncer.reset_count();
            self.telemetry.record_cooldown_released(now);
            report.cooldown_released = true;
        }

        let interval = self.config.config().sampling_interval;
        if now.saturating_duration_since(self.last_sample_at) < interval {
            return;
        }

        let sample = self.sensor.sample(self.inputs.read_light_raw());
        self.last_sample_at = now;
        self.last_sample = Some(sample);

        let outcome = self.debouncer.evaluate(sample.state);
        report.sample = Some(SampleReport {
            sample,
            count: outcome.count,
            threshold: self.debouncer.threshold(),
            commit: outcome.commit,
        });

        match outcome.commit {
            Some(state) => {
                self.telemetry.record_commit(sample, now);
                self.begin_run(now, ActuationReason::Commit(state), report);
            }
            None => {
                let mode = if self.debouncer.is_pending() {
                    IndicatorMode::PendingTransition
                } else {
                    IndicatorMode::Normal
                };
                self.indicator.show(mode);
            }
        }
    }

    fn begin_run(&mut self, now: I, reason: ActuationReason, report: &mut TickReport<I>) {
        self.debouncer.reset_count();
        self.cooldown.record_actuation(now);
        self.cooling_down = true;

        if self
            .sequencer
            .start(now, reason, &mut self.indicator)
            .is_ok()
        {
            self.telemetry.record_actuation_started(reason, now);
            report.started = Some(reason);
        }
    }

    fn finish_run(&mut self, now: I, report: &mut TickReport<I>) {
        if let Ok(run) = self.sequencer.stop(&mut self.indicator) {
            // The dwell counts from the moment the door is locked again.
            self.cooldown
                .record_actuation(now + self.config.config().relock_duration());
            self.cooling_down = true;
            self.telemetry.record_actuation_completed(&run, now);
            report.completed = Some(run);
        }
    }

    /// Snapshot of the controller at `now`.
    #[must_use]
    pub fn status(&self, now: I) -> DoorStatus<I> {
        let run_duration = self.sequencer.run_duration();
        let run = self.sequencer.active_run().map(|run| {
            let elapsed = now.saturating_duration_since(run.started_at);
            RunStatus {
                reason: run.reason,
                elapsed,
                remaining: run_duration.saturating_sub(elapsed),
            }
        });
        let cooldown_until = self
            .cooldown
            .ready_at()
            .filter(|_| !self.cooldown.may_evaluate(now));

        DoorStatus {
            committed: self.debouncer.committed(),
            count: self.debouncer.count(),
            threshold: self.debouncer.threshold(),
            last_sample: self.last_sample,
            run,
            cooldown_until,
            indicator: self.indicator.mode,
        }
    }

    #[must_use]
    pub fn committed(&self) -> LightState {
        self.debouncer.committed()
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.sequencer.is_running()
    }

    pub fn inputs_mut(&mut self) -> &mut S {
        &mut self.inputs
    }

    #[must_use]
    pub fn driver(&self) -> &D {
        self.sequencer.driver()
    }

    pub fn driver_mut(&mut self) -> &mut D {
        self.sequencer.driver_mut()
    }

    #[must_use]
    pub fn indicator(&self) -> &N {
        &self.indicator.inner
    }

    pub fn indicator_mut(&mut self) -> &mut N {
        &mut self.indicator.inner
    }

    #[must_use]
    pub fn telemetry(&self) -> &TelemetryRecorder<I> {
        &self.telemetry
    }
}
