mod support;

use core::time::Duration;

use door_core::config::DoorConfig;
use door_core::light::LightState;
use door_core::manual::{ButtonLevel, ManualOverride, OverrideStatus};
use door_core::sequencer::ActuationReason;
use door_core::telemetry::{TelemetryEventKind, TelemetryPayload};
use door_core::time::MillisInstant;

use support::{DARK_RAW, LIGHT_RAW, NEUTRAL_RAW, at, boot, run_ticks};

#[test]
fn hold_past_delay_triggers_exactly_once() {
    let mut controller = boot(DoorConfig::DEFAULT, DARK_RAW);
    controller.inputs_mut().pressed = true;

    let reports = run_ticks(&mut controller, 0, 2_500, 100);
    let triggers: Vec<u64> = reports
        .iter()
        .filter(|report| report.started == Some(ActuationReason::Manual))
        .map(|report| report.at.as_millis())
        .collect();

    assert_eq!(triggers, [2_100]);
    assert!(
        reports
            .iter()
            .filter(|report| report.at.as_millis() <= 2_000)
            .all(|report| matches!(report.manual, Some(OverrideStatus::Holding { .. })))
    );
}

#[test]
fn short_press_never_triggers() {
    let mut controller = boot(DoorConfig::DEFAULT, DARK_RAW);
    controller.inputs_mut().pressed = true;
    let held = run_ticks(&mut controller, 0, 1_900, 100);
    controller.inputs_mut().pressed = false;
    let released = run_ticks(&mut controller, 2_000, 10_000, 100);

    assert!(
        held.iter()
            .chain(released.iter())
            .all(|report| report.started.is_none())
    );
}

#[test]
fn continuous_hold_retriggers_at_most_once_per_delay() {
    let hold = Duration::from_millis(2_000);
    let mut button = ManualOverride::new(hold, MillisInstant::ZERO);
    let mut triggers = Vec::new();

    for millis in (0..=10_000).step_by(100) {
        if button.poll(ButtonLevel::Low, at(millis)).is_triggered() {
            triggers.push(millis);
        }
    }

    assert_eq!(triggers, [2_100, 4_200, 6_300, 8_400]);
}

#[test]
fn manual_trigger_ignores_cooldown() {
    let config =
        DoorConfig::DEFAULT.with_sampling(Duration::from_secs(1), Duration::from_secs(1));
    let mut controller = boot(config, DARK_RAW);
    controller.inputs_mut().raw = LIGHT_RAW;
    controller.tick(at(1_000));
    run_ticks(&mut controller, 2_000, 22_000, 1_000);
    assert!(!controller.is_running());
    assert!(controller.status(at(30_000)).cooldown_until.is_some());

    controller.inputs_mut().pressed = true;
    let reports = run_ticks(&mut controller, 30_000, 33_000, 100);
    assert_eq!(
        reports
            .iter()
            .filter(|report| report.started == Some(ActuationReason::Manual))
            .count(),
        1
    );
}

#[test]
fn manual_trigger_resyncs_to_instant_reading() {
    let mut controller = boot(DoorConfig::DEFAULT, DARK_RAW);
    controller.inputs_mut().raw = LIGHT_RAW;
    controller.tick(at(15_000));
    controller.tick(at(30_000));
    assert_eq!(controller.status(at(30_000)).count, 2);

    controller.inputs_mut().raw = NEUTRAL_RAW;
    controller.inputs_mut().pressed = true;
    run_ticks(&mut controller, 30_100, 32_100, 100);

    let status = controller.status(at(32_100));
    assert!(status.run.is_some());
    assert_eq!(status.committed, LightState::Neutral);
    assert_eq!(status.count, 0);
    assert_eq!(status.cooldown_until, Some(at(32_100 + 600_000)));

    let manual = controller
        .telemetry()
        .oldest_first()
        .find(|record| record.event == TelemetryEventKind::ManualTriggered)
        .expect("manual trigger recorded");
    assert!(matches!(
        manual.details,
        TelemetryPayload::Sample(sample) if sample.raw == NEUTRAL_RAW
    ));
}
