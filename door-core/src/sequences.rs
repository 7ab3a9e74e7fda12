//! Lock sequence templates shared by firmware and host targets.
//!
//! The sequencer brackets every motor run with an unlock before and a lock
//! after. Each sequence is a short, fixed list of servo steps; the only step
//! that consumes time is the hold while the servo travels. The sequencer runs
//! these steps synchronously, so their total duration stalls the tick loop.

use core::time::Duration;

use crate::config::LockConfig;

/// Number of steps in every lock sequence.
pub const LOCK_SEQUENCE_STEPS: usize = 4;

/// Identifies which way a lock sequence moves the servo.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum LockSequenceKind {
    Unlock,
    Lock,
}

impl LockSequenceKind {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            LockSequenceKind::Unlock => "unlock",
            LockSequenceKind::Lock => "lock",
        }
    }
}

/// Ordered operation applied to the lock servo.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum LockAction {
    /// Start driving the servo signal.
    Attach,
    /// Command the servo to a position in degrees.
    MoveTo(u8),
    /// Block while the servo travels.
    Hold(Duration),
    /// Stop driving the servo signal so it does not buzz against the stop.
    Detach,
}

impl LockAction {
    /// Time this step blocks the caller.
    #[must_use]
    pub const fn duration(self) -> Duration {
        match self {
            LockAction::Hold(duration) => duration,
            LockAction::Attach | LockAction::MoveTo(_) | LockAction::Detach => Duration::ZERO,
        }
    }
}

/// Immutable lock sequence built from a [`LockConfig`].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct LockSequence {
    pub kind: LockSequenceKind,
    steps: [LockAction; LOCK_SEQUENCE_STEPS],
}

impl LockSequence {
    const fn moving_to(kind: LockSequenceKind, position: u8, travel: Duration) -> Self {
        Self {
            kind,
            steps: [
                LockAction::Attach,
                LockAction::MoveTo(position),
                LockAction::Hold(travel),
                LockAction::Detach,
            ],
        }
    }

    /// Returns the ordered steps that make up the sequence.
    #[must_use]
    pub const fn steps(&self) -> &[LockAction] {
        &self.steps
    }

    /// Total blocking time of the sequence.
    #[must_use]
    pub fn total_duration(&self) -> Duration {
        self.steps
            .iter()
            .fold(Duration::ZERO, |acc, step| acc + step.duration())
    }
}

/// Sequence run before the motor is energized.
#[must_use]
pub const fn unlock_sequence(config: &LockConfig) -> LockSequence {
    LockSequence::moving_to(
        LockSequenceKind::Unlock,
        config.unlocked_position,
        config.travel,
    )
}

/// Sequence run after the motor is de-energized.
#[must_use]
pub const fn lock_sequence(config: &LockConfig) -> LockSequence {
    LockSequence::moving_to(LockSequenceKind::Lock, config.locked_position, config.travel)
}
