use std::fmt::Write as _;
use std::time::Duration;

use door_core::config::{ConfigError, DoorConfig};
use door_core::controller::{DoorController, SensorInputs, TickReport};
use door_core::manual::{ButtonLevel, OverrideStatus};
use door_core::repl::catalog;
use door_core::repl::grammar::{self, ConsoleCommand};
use door_core::sequencer::{ActuatorDriver, IndicatorMode, StatusIndicator};
use door_core::time::MillisInstant;

/// Virtual-clock step between controller ticks.
pub const TICK: Duration = Duration::from_millis(50);

pub struct EmulatedInputs {
    raw: u16,
    pressed: bool,
}

impl SensorInputs for EmulatedInputs {
    fn read_light_raw(&mut self) -> u16 {
        self.raw
    }

    fn button_level(&mut self) -> ButtonLevel {
        ButtonLevel::from_pressed(self.pressed)
    }
}

/// Output transition observed on the emulated board.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum HardwareEvent {
    Motor(bool),
    Relay(bool),
    LockAttached,
    LockMoved(u8),
    LockDetached,
    Tone { frequency_hz: u32, duration: Duration },
    Indicator(IndicatorMode),
}

impl HardwareEvent {
    fn describe(self) -> String {
        match self {
            HardwareEvent::Motor(on) => format!("motor {}", on_off(on)),
            HardwareEvent::Relay(on) => format!("relay {}", on_off(on)),
            HardwareEvent::LockAttached => "lock servo attached".to_string(),
            HardwareEvent::LockMoved(position) => format!("lock servo -> {position}deg"),
            HardwareEvent::LockDetached => "lock servo detached".to_string(),
            HardwareEvent::Tone {
                frequency_hz,
                duration,
            } => format!("tone {frequency_hz}Hz for {}ms", duration.as_millis()),
            HardwareEvent::Indicator(mode) => format!("indicator {}", mode.label()),
        }
    }
}

fn on_off(on: bool) -> &'static str {
    if on { "on" } else { "off" }
}

/// Records output transitions and the time spent in blocking calls.
#[derive(Default)]
pub struct EmulatedActuators {
    tick_started: MillisInstant,
    stall: Duration,
    events: Vec<(MillisInstant, HardwareEvent)>,
}

impl EmulatedActuators {
    fn begin_tick(&mut self, now: MillisInstant) {
        self.tick_started = now;
        self.stall = Duration::ZERO;
    }

    fn take_stall(&mut self) -> Duration {
        std::mem::take(&mut self.stall)
    }

    fn push(&mut self, event: HardwareEvent) {
        let at = self.tick_started + self.stall;
        self.events.push((at, event));
    }

    pub fn drain(&mut self) -> Vec<(MillisInstant, HardwareEvent)> {
        std::mem::take(&mut self.events)
    }
}

impl ActuatorDriver for EmulatedActuators {
    fn set_motor(&mut self, energized: bool) {
        self.push(HardwareEvent::Motor(energized));
    }

    fn set_relay(&mut self, energized: bool) {
        self.push(HardwareEvent::Relay(energized));
    }

    fn attach_lock(&mut self) {
        self.push(HardwareEvent::LockAttached);
    }

    fn move_lock(&mut self, position: u8) {
        self.push(HardwareEvent::LockMoved(position));
    }

    fn detach_lock(&mut self) {
        self.push(HardwareEvent::LockDetached);
    }

    fn tone(&mut self, frequency_hz: u32, duration: Duration) {
        self.push(HardwareEvent::Tone {
            frequency_hz,
            duration,
        });
        self.stall += duration;
    }

    fn block_for(&mut self, duration: Duration) {
        self.stall += duration;
    }
}

#[derive(Default)]
pub struct EmulatedIndicator {
    changes: Vec<IndicatorMode>,
}

impl StatusIndicator for EmulatedIndicator {
    fn show(&mut self, mode: IndicatorMode) {
        self.changes.push(mode);
    }
}

type EmulatedController =
    DoorController<MillisInstant, EmulatedInputs, EmulatedActuators, EmulatedIndicator>;

/// Interactive emulator session running the controller on a virtual clock.
pub struct Session {
    controller: EmulatedController,
    clock: MillisInstant,
    motor_starts: usize,
}

impl Session {
    /// Boots the controller at virtual time zero with `initial_raw` on the light channel.
    pub fn new(config: DoorConfig, initial_raw: u16) -> Result<Self, ConfigError> {
        let controller = DoorController::boot(
            config,
            EmulatedInputs {
                raw: initial_raw,
                pressed: false,
            },
            EmulatedActuators::default(),
            EmulatedIndicator::default(),
            MillisInstant::ZERO,
        )?;

        let mut session = Self {
            controller,
            clock: MillisInstant::ZERO,
            motor_starts: 0,
        };
        // Boot-time output resets are not interesting to the operator.
        session.controller.driver_mut().drain();
        session.controller.indicator_mut().changes.clear();
        Ok(session)
    }

    pub fn now(&self) -> MillisInstant {
        self.clock
    }

    /// Number of motor runs started since boot.
    pub fn motor_starts(&self) -> usize {
        self.motor_starts
    }

    pub fn handle_line(&mut self, line: &str) -> Vec<String> {
        match grammar::parse(line) {
            Ok(command) => self.execute(command),
            Err(grammar::ConsoleError::Empty) => Vec::new(),
            Err(error) => vec![format!("ERR {error}; type `help` for commands")],
        }
    }

    pub fn execute(&mut self, command: ConsoleCommand<'_>) -> Vec<String> {
        match command {
            ConsoleCommand::Light(raw) => {
                self.set_light(raw);
                vec![format!("OK light raw={raw}")]
            }
            ConsoleCommand::Press => {
                self.set_button(true);
                vec!["OK button pressed".to_string()]
            }
            ConsoleCommand::Release => {
                self.set_button(false);
                vec!["OK button released".to_string()]
            }
            ConsoleCommand::Advance(duration) => {
                let mut lines = self.advance(duration);
                lines.push(format!("OK now={}", self.clock));
                lines
            }
            ConsoleCommand::Status => vec![self.status_line()],
            ConsoleCommand::Events(count) => self.events(count),
            ConsoleCommand::Help(topic) => help(topic),
        }
    }

    pub fn set_light(&mut self, raw: u16) {
        self.controller.inputs_mut().raw = raw;
    }

    pub fn set_button(&mut self, pressed: bool) {
        self.controller.inputs_mut().pressed = pressed;
    }

    /// Runs the controller for `duration` of virtual time and narrates
    /// everything that happened.
    pub fn advance(&mut self, duration: Duration) -> Vec<String> {
        let target = self.clock + duration;
        let mut lines = Vec::new();
        while self.clock < target {
            self.clock = (self.clock + TICK).min(target);
            self.tick_once(&mut lines);
        }
        lines
    }

    fn tick_once(&mut self, lines: &mut Vec<String>) {
        let now = self.clock;
        self.controller.driver_mut().begin_tick(now);
        let report = self.controller.tick(now);
        if report.started.is_some() {
            self.motor_starts += 1;
        }

        if report.is_notable() {
            narrate(&report, lines);
        }
        for (at, event) in self.controller.driver_mut().drain() {
            lines.push(format!("[{at}] hw: {}", event.describe()));
        }
        for mode in std::mem::take(&mut self.controller.indicator_mut().changes) {
            lines.push(format!(
                "[{now}] hw: {}",
                HardwareEvent::Indicator(mode).describe()
            ));
        }

        let stall = self.controller.driver_mut().take_stall();
        self.clock = self.clock + stall;
    }

    pub fn status_line(&self) -> String {
        format!("[{}] {}", self.clock, self.controller.status(self.clock))
    }

    fn events(&self, count: Option<usize>) -> Vec<String> {
        let records: Vec<String> = self
            .controller
            .telemetry()
            .oldest_first()
            .map(ToString::to_string)
            .collect();
        if records.is_empty() {
            return vec!["no events recorded".to_string()];
        }

        let mut lines = Vec::new();
        let total = usize::try_from(self.controller.telemetry().total_recorded())
            .unwrap_or(usize::MAX);
        if count.is_none() && total > records.len() {
            lines.push(format!(
                "({} older events overwritten)",
                total - records.len()
            ));
        }
        let skip = count.map_or(0, |count| records.len().saturating_sub(count));
        lines.extend(records.into_iter().skip(skip));
        lines
    }
}

fn narrate(report: &TickReport<MillisInstant>, lines: &mut Vec<String>) {
    let at = report.at;
    if let Some(OverrideStatus::Triggered) = report.manual {
        lines.push(format!("[{at}] override: triggered"));
    }
    if report.cooldown_released {
        lines.push(format!("[{at}] light: cooldown over, sampling resumed"));
    }
    if let Some(sampled) = report.sample {
        let mut line = format!(
            "[{at}] light: raw={} intensity={} {} count={}/{}",
            sampled.sample.raw,
            sampled.sample.intensity,
            sampled.sample.state,
            sampled.count,
            sampled.threshold
        );
        if let Some(state) = sampled.commit {
            let _ = write!(line, " -> committed {state}");
        }
        lines.push(line);
    }
    if let Some(reason) = report.started {
        lines.push(format!("[{at}] door: run started ({reason})"));
    }
    if let Some(run) = report.completed {
        lines.push(format!(
            "[{at}] door: run finished ({}) started at {}",
            run.reason, run.started_at
        ));
    }
}

fn help(topic: Option<&str>) -> Vec<String> {
    match topic {
        Some(name) => match catalog::find(name) {
            Some(spec) => vec![format!("{:<20} {}", spec.usage, spec.summary)],
            None => vec![
                format!("No help available for `{name}`."),
                format!("Available topics: {}", topic_list()),
            ],
        },
        None => {
            let mut lines = vec!["Available commands:".to_string()];
            for spec in catalog::commands() {
                lines.push(format!("  {:<20} {}", spec.usage, spec.summary));
            }
            lines.push("Type `help <command>` for a specific command.".to_string());
            lines
        }
    }
}

fn topic_list() -> String {
    catalog::commands()
        .iter()
        .map(|spec| spec.name)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const DARK_RAW: u16 = 900;
    const LIGHT_RAW: u16 = 100;

    fn session() -> Session {
        Session::new(DoorConfig::DEFAULT, DARK_RAW).expect("default config boots")
    }

    #[test]
    fn dawn_commits_and_stalls_clock_for_prelude() {
        let mut session = session();
        session.handle_line("light 100");
        let lines = session.handle_line("advance 5m");

        assert!(
            lines
                .iter()
                .any(|line| line.contains("committed LIGHT"))
        );
        assert!(
            lines
                .iter()
                .any(|line| line.contains("door: run started (commit LIGHT)"))
        );
        // Unlock travel, confirmation tone and relay settle: 500 + 150 + 50 ms.
        assert_eq!(session.now(), MillisInstant::from_millis(300_700));
        assert_eq!(session.motor_starts(), 1);
    }

    #[test]
    fn run_finishes_and_relocks() {
        let mut session = session();
        session.set_light(LIGHT_RAW);
        session.advance(Duration::from_secs(300));
        let lines = session.advance(Duration::from_secs(20));

        let finished = lines
            .iter()
            .position(|line| line.contains("door: run finished"))
            .expect("run finished");
        let relocked = lines
            .iter()
            .position(|line| line.contains("lock servo -> 90deg"))
            .expect("lock re-engaged");
        let motor_off = lines
            .iter()
            .position(|line| line.contains("motor off"))
            .expect("motor stopped");
        assert!(finished < motor_off);
        assert!(motor_off < relocked);
        assert!(session.status_line().contains("door=idle"));
    }

    #[test]
    fn held_button_triggers_manual_run() {
        let mut session = session();
        session.handle_line("press");
        let lines = session.handle_line("advance 3s");

        assert!(lines.iter().any(|line| line.contains("override: triggered")));
        assert!(
            lines
                .iter()
                .any(|line| line.contains("door: run started (manual)"))
        );
    }

    #[test]
    fn events_limits_to_most_recent() {
        let mut session = session();
        session.set_light(LIGHT_RAW);
        session.advance(Duration::from_secs(330));

        let all = session.handle_line("events");
        let last = session.handle_line("events 1");
        assert!(all.len() > 1);
        assert_eq!(last.len(), 1);
        assert_eq!(last.last(), all.last());
    }

    #[test]
    fn events_note_overwritten_history() {
        let mut session = session();
        session.set_button(true);
        // A held button re-triggers a manual run right after each one ends.
        session.advance(Duration::from_secs(600));
        assert!(session.motor_starts() > 21);

        let all = session.handle_line("events");
        assert!(all[0].ends_with("older events overwritten)"));
        assert_eq!(all.len(), door_core::telemetry::TELEMETRY_RING_CAPACITY + 1);
        assert_eq!(session.handle_line("events 3").len(), 3);
    }

    #[test]
    fn syntax_errors_are_reported() {
        let mut session = session();
        let lines = session.handle_line("advance soon");
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("ERR syntax error"));
        assert!(session.handle_line("   ").is_empty());
    }

    #[test]
    fn help_lists_every_command() {
        let lines = help(None);
        assert_eq!(lines.len(), catalog::commands().len() + 2);
        assert!(help(Some("nope"))[0].contains("No help"));
    }
}
