//! Telemetry event catalog and the fixed-capacity ring that stores it.
//!
//! The decision logic never reads these records back. They exist so the
//! firmware log and the emulator console can explain why the door moved.

use core::{fmt, time::Duration};

use heapless::HistoryBuf;

use crate::light::{LightSample, LightState};
use crate::sequencer::{ActuationReason, ActuatorRun};
use crate::time::DoorInstant;

/// Monotonic identifier assigned to each telemetry record.
pub type EventId = u32;

/// Total number of telemetry entries retained in memory.
pub const TELEMETRY_RING_CAPACITY: usize = 64;

/// Events recorded by the controller.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum TelemetryEventKind {
    /// Boot readings established the initial committed state.
    Seeded(LightState),
    /// The debouncer committed a new light state.
    Committed(LightState),
    ManualTriggered,
    ActuationStarted,
    ActuationCompleted,
    /// Automatic sampling resumed after the minimum dwell.
    CooldownReleased,
}

impl fmt::Display for TelemetryEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TelemetryEventKind::Seeded(state) => write!(f, "seeded {state}"),
            TelemetryEventKind::Committed(state) => write!(f, "committed {state}"),
            TelemetryEventKind::ManualTriggered => f.write_str("manual-triggered"),
            TelemetryEventKind::ActuationStarted => f.write_str("actuation-started"),
            TelemetryEventKind::ActuationCompleted => f.write_str("actuation-completed"),
            TelemetryEventKind::CooldownReleased => f.write_str("cooldown-released"),
        }
    }
}

/// Payloads carried alongside telemetry events.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TelemetryPayload {
    None,
    /// Reading that produced the event.
    Sample(SampleTelemetry),
    /// Motor run details.
    Actuation(ActuationTelemetry),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SampleTelemetry {
    pub raw: u16,
    pub intensity: u16,
}

impl From<LightSample> for SampleTelemetry {
    fn from(sample: LightSample) -> Self {
        Self {
            raw: sample.raw,
            intensity: sample.intensity,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ActuationTelemetry {
    pub reason: ActuationReason,
    /// Run length, present once the run has completed.
    pub duration: Option<Duration>,
}

/// Telemetry record stored in the ring buffer.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TelemetryRecord<I> {
    pub id: EventId,
    pub timestamp: I,
    pub event: TelemetryEventKind,
    pub details: TelemetryPayload,
}

impl<I: fmt::Display> fmt::Display for TelemetryRecord<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} @{} {}", self.id, self.timestamp, self.event)?;
        match self.details {
            TelemetryPayload::None => Ok(()),
            TelemetryPayload::Sample(sample) => {
                write!(f, " raw={} intensity={}", sample.raw, sample.intensity)
            }
            TelemetryPayload::Actuation(actuation) => {
                write!(f, " reason={}", actuation.reason)?;
                match actuation.duration {
                    Some(duration) => write!(f, " ran={}ms", duration.as_millis()),
                    None => Ok(()),
                }
            }
        }
    }
}

/// Records telemetry events into a fixed-size ring buffer, overwriting the
/// oldest entry once full.
pub struct TelemetryRecorder<I, const CAPACITY: usize = TELEMETRY_RING_CAPACITY> {
    ring: HistoryBuf<TelemetryRecord<I>, CAPACITY>,
    next_event_id: EventId,
}

impl<I, const CAPACITY: usize> TelemetryRecorder<I, CAPACITY>
where
    I: DoorInstant,
{
    #[must_use]
    pub const fn new() -> Self {
        Self {
            ring: HistoryBuf::new(),
            next_event_id: 0,
        }
    }

    /// Iterates the retained records in chronological order.
    pub fn oldest_first(&self) -> impl Iterator<Item = &TelemetryRecord<I>> + '_ {
        self.ring.oldest_ordered()
    }

    /// Returns the most recent telemetry record, if available.
    #[must_use]
    pub fn latest(&self) -> Option<&TelemetryRecord<I>> {
        self.ring.recent()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ring.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    /// Total number of events recorded since boot, including overwritten ones.
    #[must_use]
    pub fn total_recorded(&self) -> EventId {
        self.next_event_id
    }

    pub fn record_seeded(&mut self, sample: LightSample, timestamp: I) -> EventId {
        self.record(
            TelemetryEventKind::Seeded(sample.state),
            TelemetryPayload::Sample(sample.into()),
            timestamp,
        )
    }

    pub fn record_commit(&mut self, sample: LightSample, timestamp: I) -> EventId {
        self.record(
            TelemetryEventKind::Committed(sample.state),
            TelemetryPayload::Sample(sample.into()),
            timestamp,
        )
    }

    /// Records a manual trigger along with the reading used to resync.
    pub fn record_manual_trigger(&mut self, sample: LightSample, timestamp: I) -> EventId {
        self.record(
            TelemetryEventKind::ManualTriggered,
            TelemetryPayload::Sample(sample.into()),
            timestamp,
        )
    }

    pub fn record_actuation_started(&mut self, reason: ActuationReason, timestamp: I) -> EventId {
        self.record(
            TelemetryEventKind::ActuationStarted,
            TelemetryPayload::Actuation(ActuationTelemetry {
                reason,
                duration: None,
            }),
            timestamp,
        )
    }

    pub fn record_actuation_completed(&mut self, run: &ActuatorRun<I>, timestamp: I) -> EventId {
        let duration = timestamp.saturating_duration_since(run.started_at);
        self.record(
            TelemetryEventKind::ActuationCompleted,
            TelemetryPayload::Actuation(ActuationTelemetry {
                reason: run.reason,
                duration: Some(duration),
            }),
            timestamp,
        )
    }

    pub fn record_cooldown_released(&mut self, timestamp: I) -> EventId {
        self.record(
            TelemetryEventKind::CooldownReleased,
            TelemetryPayload::None,
            timestamp,
        )
    }

    /// Records an arbitrary telemetry event with the supplied payload.
    pub fn record(
        &mut self,
        event: TelemetryEventKind,
        details: TelemetryPayload,
        timestamp: I,
    ) -> EventId {
        let id = self.next_event_id;
        self.next_event_id = self.next_event_id.wrapping_add(1);

        self.ring.write(TelemetryRecord {
            id,
            timestamp,
            event,
            details,
        });

        id
    }
}

impl<I, const CAPACITY: usize> Default for TelemetryRecorder<I, CAPACITY>
where
    I: DoorInstant,
{
    fn default() -> Self {
        Self::new()
    }
}
