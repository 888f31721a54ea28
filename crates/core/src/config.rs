use crate::{Choice, Outcome, Side};
use serde::{Deserialize, Serialize};

/// Starting composition of one side's hand.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct HandConfig {
    pub size: u32,
    #[serde(default)]
    pub guaranteed_rock: u32,
    #[serde(default)]
    pub guaranteed_paper: u32,
    #[serde(default)]
    pub guaranteed_scissors: u32,
}

impl HandConfig {
    pub fn guaranteed(&self, choice: Choice) -> u32 {
        match choice {
            Choice::Rock => self.guaranteed_rock,
            Choice::Paper => self.guaranteed_paper,
            Choice::Scissors => self.guaranteed_scissors,
        }
    }

    pub fn guaranteed_total(&self) -> u32 {
        self.guaranteed_rock
            .saturating_add(self.guaranteed_paper)
            .saturating_add(self.guaranteed_scissors)
    }

    /// Size is at least 1; guarantees that overflow the hand are cut back,
    /// Scissors first, then Paper, then Rock.
    pub fn normalized(mut self) -> Self {
        self.size = self.size.max(1);
        let mut overflow = self.guaranteed_total().saturating_sub(self.size);
        for slot in [
            &mut self.guaranteed_scissors,
            &mut self.guaranteed_paper,
            &mut self.guaranteed_rock,
        ] {
            let cut = (*slot).min(overflow);
            *slot -= cut;
            overflow -= cut;
        }
        self
    }
}

impl Default for HandConfig {
    fn default() -> Self {
        Self {
            size: 6,
            guaranteed_rock: 1,
            guaranteed_paper: 1,
            guaranteed_scissors: 1,
        }
    }
}

/// Base points for a turn before any rule touches them.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScoreRule {
    pub win: i64,
    pub draw: i64,
    pub loss: i64,
}

impl ScoreRule {
    pub fn base(&self, outcome: Outcome) -> i64 {
        match outcome {
            Outcome::Win => self.win,
            Outcome::Draw => self.draw,
            Outcome::Loss => self.loss,
        }
    }
}

impl Default for ScoreRule {
    fn default() -> Self {
        Self {
            win: 5,
            draw: 3,
            loss: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RoundConfig {
    pub turns_to_play: u32,
    pub reroll_max: u32,
    pub player: HandConfig,
    pub opponent: HandConfig,
    pub scores: ScoreRule,
}

impl RoundConfig {
    pub fn normalized(mut self) -> Self {
        self.turns_to_play = self.turns_to_play.max(1);
        self.player = self.player.normalized();
        self.opponent = self.opponent.normalized();
        self
    }

    pub fn hand(&self, side: Side) -> &HandConfig {
        match side {
            Side::Player => &self.player,
            Side::Opponent => &self.opponent,
        }
    }
}

impl Default for RoundConfig {
    fn default() -> Self {
        Self {
            turns_to_play: 5,
            reroll_max: 2,
            player: HandConfig::default(),
            opponent: HandConfig::default(),
            scores: ScoreRule::default(),
        }
    }
}
