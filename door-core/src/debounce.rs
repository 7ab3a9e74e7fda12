//! Consecutive-sample debouncer for the committed light state.
//!
//! A transition is committed only after `threshold` consecutive samples that
//! disagree with the committed state. A single neutral or agreeing sample
//! re-arms the counter from zero.

use crate::light::LightState;

/// Result of feeding one sample into the [`Debouncer`].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct DebounceOutcome {
    /// Counter value after the sample was applied.
    pub count: u32,
    /// Newly committed state, when the sample completed a transition.
    pub commit: Option<LightState>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Debouncer {
    committed: LightState,
    count: u32,
    threshold: u32,
}

impl Debouncer {
    /// Creates a debouncer seeded with the boot-time classification.
    ///
    /// `threshold` comes from a validated configuration and is at least one.
    pub const fn new(committed: LightState, threshold: u32) -> Self {
        Self {
            committed,
            count: 0,
            threshold,
        }
    }

    #[must_use]
    pub const fn committed(&self) -> LightState {
        self.committed
    }

    #[must_use]
    pub const fn count(&self) -> u32 {
        self.count
    }

    #[must_use]
    pub const fn threshold(&self) -> u32 {
        self.threshold
    }

    /// Returns `true` while a transition is accumulating.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.count > 0
    }

    pub fn evaluate(&mut self, sample: LightState) -> DebounceOutcome {
        if !sample.is_decisive() || sample == self.committed {
            self.count = 0;
            return DebounceOutcome {
                count: 0,
                commit: None,
            };
        }

        self.count += 1;
        if self.count >= self.threshold {
            self.committed = sample;
            self.count = 0;
            return DebounceOutcome {
                count: 0,
                commit: Some(sample),
            };
        }

        DebounceOutcome {
            count: self.count,
            commit: None,
        }
    }

    /// Forces the committed state, discarding any pending transition.
    pub fn resync(&mut self, state: LightState) {
        self.committed = state;
        self.count = 0;
    }

    pub fn reset_count(&mut self) {
        self.count = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn agreeing_sample_keeps_counter_at_zero() {
        let mut debouncer = Debouncer::new(LightState::Dark, 3);
        let outcome = debouncer.evaluate(LightState::Dark);
        assert_eq!(outcome, DebounceOutcome { count: 0, commit: None });
    }

    #[test]
    fn commits_exactly_at_threshold() {
        let mut debouncer = Debouncer::new(LightState::Dark, 3);
        assert_eq!(debouncer.evaluate(LightState::Light).count, 1);
        assert_eq!(debouncer.evaluate(LightState::Light).count, 2);
        assert!(debouncer.is_pending());

        let outcome = debouncer.evaluate(LightState::Light);
        assert_eq!(outcome.commit, Some(LightState::Light));
        assert_eq!(outcome.count, 0);
        assert_eq!(debouncer.committed(), LightState::Light);
        assert!(!debouncer.is_pending());
    }

    #[test]
    fn agreeing_sample_mid_transition_resets() {
        let mut debouncer = Debouncer::new(LightState::Light, 3);
        debouncer.evaluate(LightState::Dark);
        debouncer.evaluate(LightState::Dark);
        assert_eq!(debouncer.evaluate(LightState::Light).count, 0);
        assert_eq!(debouncer.evaluate(LightState::Dark).count, 1);
    }

    #[test]
    fn threshold_of_one_commits_on_first_disagreement() {
        let mut debouncer = Debouncer::new(LightState::Light, 1);
        let outcome = debouncer.evaluate(LightState::Dark);
        assert_eq!(outcome.commit, Some(LightState::Dark));
    }

    #[test]
    fn neutral_committed_state_accepts_either_direction() {
        let mut debouncer = Debouncer::new(LightState::Neutral, 2);
        debouncer.evaluate(LightState::Dark);
        let outcome = debouncer.evaluate(LightState::Dark);
        assert_eq!(outcome.commit, Some(LightState::Dark));
    }

    #[test]
    fn resync_discards_pending_transition() {
        let mut debouncer = Debouncer::new(LightState::Dark, 5);
        debouncer.evaluate(LightState::Light);
        debouncer.evaluate(LightState::Light);

        debouncer.resync(LightState::Neutral);
        assert_eq!(debouncer.committed(), LightState::Neutral);
        assert_eq!(debouncer.count(), 0);
    }
}
