//! Log output for controller tick reports.
//!
//! Each notable [`TickReport`] is flattened into [`LogEvent`]s and emitted
//! through defmt on the MCU or stdout on the host, prefixed by area
//! (`light:`, `door:`, `override:`).

#![cfg_attr(not(target_os = "none"), allow(dead_code))]

use door_core::config::ConfigError;
use door_core::controller::{DoorStatus, TickReport};
use door_core::light::LightState;
use door_core::manual::OverrideStatus;
use door_core::sequencer::ActuationReason;
use door_core::time::DoorInstant;

use crate::instant::FirmwareInstant;

/// One log line derived from a tick report.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LogEvent {
    Sample {
        raw: u16,
        intensity: u16,
        state: &'static str,
        count: u32,
        threshold: u32,
    },
    Committed {
        state: &'static str,
    },
    CooldownReleased,
    OverrideTriggered,
    Started {
        reason: &'static str,
    },
    Completed {
        reason: &'static str,
        ran_ms: u64,
    },
}

const fn reason_label(reason: ActuationReason) -> &'static str {
    match reason {
        ActuationReason::Commit(LightState::Light) => "light",
        ActuationReason::Commit(LightState::Dark) => "dark",
        ActuationReason::Commit(LightState::Neutral) => "neutral",
        ActuationReason::Manual => "manual",
    }
}

/// Flattens a report into log events in the order they happened.
pub fn events_for<I: DoorInstant>(report: &TickReport<I>) -> impl Iterator<Item = LogEvent> {
    let triggered = report
        .manual
        .is_some_and(OverrideStatus::is_triggered)
        .then_some(LogEvent::OverrideTriggered);
    let released = report
        .cooldown_released
        .then_some(LogEvent::CooldownReleased);
    let sample = report.sample.map(|sampled| LogEvent::Sample {
        raw: sampled.sample.raw,
        intensity: sampled.sample.intensity,
        state: sampled.sample.state.label(),
        count: sampled.count,
        threshold: sampled.threshold,
    });
    let committed = report
        .sample
        .and_then(|sampled| sampled.commit)
        .map(|state| LogEvent::Committed {
            state: state.label(),
        });
    let started = report.started.map(|reason| LogEvent::Started {
        reason: reason_label(reason),
    });
    let completed = report.completed.map(|run| LogEvent::Completed {
        reason: reason_label(run.reason),
        ran_ms: u64::try_from(
            report
                .at
                .saturating_duration_since(run.started_at)
                .as_millis(),
        )
        .unwrap_or(u64::MAX),
    });

    [triggered, released, sample, committed, started, completed]
        .into_iter()
        .flatten()
}

/// Logs every notable event in `report`.
pub fn log_tick(report: &TickReport<FirmwareInstant>) {
    if !report.is_notable() {
        return;
    }

    let at_ms = report.at.as_millis();
    for event in events_for(report) {
        emit(at_ms, event);
    }
}

#[cfg(target_os = "none")]
fn emit(at_ms: u64, event: LogEvent) {
    match event {
        LogEvent::Sample {
            raw,
            intensity,
            state,
            count,
            threshold,
        } => defmt::debug!(
            "light: t={}ms raw={} intensity={} {} count={}/{}",
            at_ms,
            raw,
            intensity,
            state,
            count,
            threshold
        ),
        LogEvent::Committed { state } => defmt::info!("light: t={}ms committed {}", at_ms, state),
        LogEvent::CooldownReleased => defmt::info!("light: t={}ms sampling resumed", at_ms),
        LogEvent::OverrideTriggered => defmt::info!("override: t={}ms triggered", at_ms),
        LogEvent::Started { reason } => defmt::info!("door: t={}ms run started ({})", at_ms, reason),
        LogEvent::Completed { reason, ran_ms } => defmt::info!(
            "door: t={}ms run finished ({}) after {}ms",
            at_ms,
            reason,
            ran_ms
        ),
    }
}

#[cfg(not(target_os = "none"))]
fn emit(at_ms: u64, event: LogEvent) {
    match event {
        LogEvent::Sample {
            raw,
            intensity,
            state,
            count,
            threshold,
        } => println!(
            "light: t={at_ms}ms raw={raw} intensity={intensity} {state} count={count}/{threshold}"
        ),
        LogEvent::Committed { state } => println!("light: t={at_ms}ms committed {state}"),
        LogEvent::CooldownReleased => println!("light: t={at_ms}ms sampling resumed"),
        LogEvent::OverrideTriggered => println!("override: t={at_ms}ms triggered"),
        LogEvent::Started { reason } => println!("door: t={at_ms}ms run started ({reason})"),
        LogEvent::Completed { reason, ran_ms } => {
            println!("door: t={at_ms}ms run finished ({reason}) after {ran_ms}ms");
        }
    }
}

/// Logs the state seeded at boot.
pub fn log_boot(status: &DoorStatus<FirmwareInstant>) {
    let state = status.committed.label();
    let threshold = status.threshold;
    emit_boot(state, threshold);
}

#[cfg(target_os = "none")]
fn emit_boot(state: &'static str, threshold: u32) {
    defmt::info!("light: seeded {} (commit after {} samples)", state, threshold);
}

#[cfg(not(target_os = "none"))]
fn emit_boot(state: &'static str, threshold: u32) {
    println!("light: seeded {state} (commit after {threshold} samples)");
}

/// Logs a configuration rejected at boot.
pub fn log_config_error(error: ConfigError) {
    emit_config_error(error);
}

#[cfg(target_os = "none")]
fn emit_config_error(error: ConfigError) {
    defmt::error!("door: invalid configuration: {}", defmt::Display2Format(&error));
}

#[cfg(not(target_os = "none"))]
fn emit_config_error(error: ConfigError) {
    println!("door: invalid configuration: {error}");
}
