use crate::{Choice, Outcome};

/// Facts and accumulators for a single phase invocation. Built fresh by the host,
/// handed to the engine once, then dropped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EvalContext {
    pub player_choice: Option<Choice>,
    pub outcome: Option<Outcome>,
    /// 1-based.
    pub turn_index: u32,
    pub turns_planned: u32,
    pub is_last_turn: bool,
    pub rerolls_used: u32,
    /// Running total before this turn's contribution.
    pub current_total: i64,
    pub player_history: Vec<Choice>,
    pub outcome_history: Vec<Outcome>,
    pub score_delta: i64,
    /// Pending info line; the last write in a pass wins.
    pub info: Option<String>,
}

impl EvalContext {
    pub fn new(turn_index: u32, turns_planned: u32) -> Self {
        Self {
            turn_index,
            turns_planned,
            is_last_turn: turn_index >= 1 && turn_index == turns_planned,
            ..Self::default()
        }
    }

    pub fn with_play(mut self, choice: Choice, outcome: Outcome) -> Self {
        self.player_choice = Some(choice);
        self.outcome = Some(outcome);
        self
    }

    pub fn with_base_score(mut self, score: i64) -> Self {
        self.score_delta = score;
        self
    }

    pub fn with_total(mut self, total: i64) -> Self {
        self.current_total = total;
        self
    }

    pub fn with_rerolls(mut self, rerolls_used: u32) -> Self {
        self.rerolls_used = rerolls_used;
        self
    }

    pub fn with_history(mut self, players: &[Choice], outcomes: &[Outcome]) -> Self {
        self.player_history = players.to_vec();
        self.outcome_history = outcomes.to_vec();
        self
    }

    pub fn last_turn(mut self, is_last: bool) -> Self {
        self.is_last_turn = is_last;
        self
    }

    pub(crate) fn paired_tail(&self, count: usize) -> Option<impl Iterator<Item = (Choice, Outcome)> + '_> {
        let players = &self.player_history;
        let outcomes = &self.outcome_history;
        if players.len() != outcomes.len() || players.len() < count {
            return None;
        }
        let start = players.len() - count;
        Some(
            players[start..]
                .iter()
                .copied()
                .zip(outcomes[start..].iter().copied()),
        )
    }

    pub(crate) fn paired_history(&self) -> impl Iterator<Item = (Choice, Outcome)> + '_ {
        self.player_history
            .iter()
            .copied()
            .zip(self.outcome_history.iter().copied())
    }
}
