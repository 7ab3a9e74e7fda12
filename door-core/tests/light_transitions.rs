mod support;

use door_core::config::DoorConfig;
use door_core::light::LightState;
use door_core::sequencer::{ActuationReason, IndicatorMode};
use door_core::telemetry::TelemetryEventKind;

use support::{DARK_RAW, LIGHT_RAW, NEUTRAL_RAW, at, boot, run_ticks};

const INTERVAL_MS: u64 = 15_000;

#[test]
fn nineteen_light_samples_do_not_commit_the_twentieth_does() {
    let mut controller = boot(DoorConfig::DEFAULT, DARK_RAW);
    assert_eq!(controller.committed(), LightState::Dark);
    controller.inputs_mut().raw = LIGHT_RAW;

    for sample in 1..=19_u32 {
        let report = controller.tick(at(u64::from(sample) * INTERVAL_MS));
        let sampled = report.sample.expect("sample due");
        assert_eq!(sampled.sample.state, LightState::Light);
        assert_eq!(sampled.count, sample);
        assert_eq!(sampled.commit, None);
        assert!(report.started.is_none());
    }
    assert_eq!(controller.committed(), LightState::Dark);

    let report = controller.tick(at(20 * INTERVAL_MS));
    let sampled = report.sample.expect("sample due");
    assert_eq!(sampled.commit, Some(LightState::Light));
    assert_eq!(sampled.count, 0);
    assert_eq!(
        report.started,
        Some(ActuationReason::Commit(LightState::Light))
    );
    assert_eq!(controller.committed(), LightState::Light);
}

#[test]
fn neutral_sample_restarts_the_count() {
    let mut controller = boot(DoorConfig::DEFAULT, LIGHT_RAW);
    let readings = [DARK_RAW, DARK_RAW, NEUTRAL_RAW, DARK_RAW];
    let mut counts = Vec::new();

    for (index, raw) in readings.into_iter().enumerate() {
        controller.inputs_mut().raw = raw;
        let tick = (index as u64 + 1) * INTERVAL_MS;
        let report = controller.tick(at(tick));
        counts.push(report.sample.expect("sample due").count);
    }

    assert_eq!(counts, [1, 2, 0, 1]);
    assert_eq!(controller.committed(), LightState::Light);
}

#[test]
fn indicator_tracks_pending_transition() {
    let mut controller = boot(DoorConfig::DEFAULT, LIGHT_RAW);

    controller.inputs_mut().raw = DARK_RAW;
    controller.tick(at(INTERVAL_MS));
    controller.tick(at(2 * INTERVAL_MS));
    controller.inputs_mut().raw = NEUTRAL_RAW;
    controller.tick(at(3 * INTERVAL_MS));

    assert_eq!(
        controller.indicator().modes,
        [
            IndicatorMode::Normal,
            IndicatorMode::PendingTransition,
            IndicatorMode::Normal,
        ]
    );
}

#[test]
fn no_automatic_commit_before_min_dwell_after_completion() {
    let config = DoorConfig::DEFAULT;
    let mut controller = boot(config, DARK_RAW);
    controller.inputs_mut().raw = LIGHT_RAW;

    let reports = run_ticks(&mut controller, 5_000, 300_000, 5_000);
    assert!(reports.last().expect("ticks ran").started.is_some());

    // The motor starts 700 ms after the commit, the run is seen ending on the
    // 325 s tick and the light immediately flips.
    controller.inputs_mut().raw = DARK_RAW;
    let reports = run_ticks(&mut controller, 305_000, 925_000, 5_000);
    let completed: Vec<_> = reports.iter().filter_map(|report| report.completed).collect();
    assert_eq!(completed.len(), 1);
    assert_eq!(completed[0].started_at, at(300_700));
    assert!(reports.iter().all(|report| report.sample.is_none()));
    assert!(reports.iter().all(|report| report.started.is_none()));

    // The dwell counts from the end of the 500 ms relock.
    let status = controller.status(at(925_000));
    assert_eq!(status.cooldown_until, Some(at(925_500)));

    let report = controller.tick(at(925_500));
    assert!(report.cooldown_released);
    assert_eq!(report.sample.expect("sampling resumed").count, 1);

    let released = controller
        .telemetry()
        .oldest_first()
        .filter(|record| record.event == TelemetryEventKind::CooldownReleased)
        .count();
    assert_eq!(released, 1);
}

#[test]
fn dead_band_thresholds_never_commit() {
    // Every reading in the dead band: the committed state never changes.
    let mut controller = boot(DoorConfig::DEFAULT, NEUTRAL_RAW);
    assert_eq!(controller.committed(), LightState::Neutral);

    let reports = run_ticks(&mut controller, INTERVAL_MS, 3_600_000, INTERVAL_MS);
    assert!(reports.iter().all(|report| report.started.is_none()));
    assert_eq!(controller.committed(), LightState::Neutral);
}
