/// Decides whether the opponent's next card comes from the front of its hand.
///
/// The round-wide flag is set by RoundStart effects and cleared every round.
/// The one-shot flag is armed by a reveal and consumed by the next draw
/// decision, so a revealed card is always the card actually drawn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrawPolicy {
    round_wide: bool,
    one_shot: bool,
}

impl DrawPolicy {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn set_round_wide(&mut self) {
        self.round_wide = true;
    }

    pub fn arm_one_shot(&mut self) {
        self.one_shot = true;
    }

    pub fn round_wide(&self) -> bool {
        self.round_wide
    }

    pub fn one_shot_armed(&self) -> bool {
        self.one_shot
    }

    /// Round-wide first; otherwise takes the one-shot flag.
    pub fn next_draw_from_front(&mut self) -> bool {
        if self.round_wide {
            return true;
        }
        std::mem::take(&mut self.one_shot)
    }
}

/// Lets RoundStart hand mutation run once more outside the initial pass.
/// Armed after a reroll, consumed at the end of the next RoundStart pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReapplyGate {
    armed: bool,
}

impl ReapplyGate {
    pub fn arm(&mut self) {
        self.armed = true;
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    pub fn close(&mut self) {
        self.armed = false;
    }
}
