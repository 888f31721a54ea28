use crate::{Choice, Side};

/// Operations the rule engine needs from whoever owns the hands and the score.
///
/// Every method has a default that reports the operation as unavailable
/// (`None`). The engine turns that into a diagnostic: conditions that needed
/// the answer fail, effects that needed the call do nothing.
pub trait TableHost {
    fn hand_count(&self, _side: Side, _choice: Choice) -> Option<u32> {
        None
    }

    fn peek_front(&self, _side: Side) -> Option<Choice> {
        None
    }

    /// Card expected on the last planned turn, clamped to the cards left.
    fn peek_final(&self, _side: Side) -> Option<Choice> {
        None
    }

    /// Turns up to `count` opponent cards that are not `choice` into `choice`,
    /// never picking the same card twice. Returns how many changed.
    fn replace_opponent_cards(&mut self, _choice: Choice, _count: u32) -> Option<u32> {
        None
    }

    /// Sets up to `count` randomly picked opponent cards to `choice`.
    /// Returns how many actually changed value.
    fn replace_opponent_cards_randomly(&mut self, _choice: Choice, _count: u32) -> Option<u32> {
        None
    }

    fn add_cards(&mut self, _side: Side, _choice: Choice, _count: u32) -> Option<u32> {
        None
    }

    fn add_random_cards(&mut self, _side: Side, _count: u32) -> Option<u32> {
        None
    }

    /// Shifts the planned turn count relative to its current value and
    /// returns the new plan.
    fn adjust_planned_turns(&mut self, _delta: i64) -> Option<u32> {
        None
    }

    fn show_info(&mut self, _text: &str) {}

    fn current_total_score(&self) -> i64 {
        0
    }

    fn rerolls_used(&self) -> u32 {
        0
    }
}

/// Host with no capabilities. Useful for phases that only touch the score.
#[derive(Debug, Default, Clone, Copy)]
pub struct DetachedHost;

impl TableHost for DetachedHost {}
