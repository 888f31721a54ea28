/// Tracks the planned-turn delta already committed to the host so that
/// re-running the RoundPrepare pass only applies the difference.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PrepareAccumulator {
    applied: i64,
    pending: i64,
}

impl PrepareAccumulator {
    /// Forget everything committed so far. Called when a new round is prepared.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn begin(&mut self) {
        self.pending = 0;
    }

    pub fn accumulate(&mut self, delta: i64) {
        self.pending = self.pending.saturating_add(delta);
    }

    /// Difference the host still has to apply for this pass.
    pub fn outstanding(&self) -> i64 {
        self.pending.saturating_sub(self.applied)
    }

    /// Records the pending total as applied and returns the delta that was due.
    pub fn commit(&mut self) -> i64 {
        let delta = self.outstanding();
        self.applied = self.pending;
        delta
    }

    pub fn applied(&self) -> i64 {
        self.applied
    }
}
