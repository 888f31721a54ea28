use crate::{Choice, HandCounts, Outcome, Phase, Side};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Event {
    RuleToggled {
        name: String,
        enabled: bool,
    },
    RulesCleared,
    RoundStarted {
        player: HandCounts,
        opponent: HandCounts,
        turns: u32,
        rerolls: u32,
    },
    HandRerolled {
        player: HandCounts,
        rerolls_left: u32,
    },
    RuleFired {
        phase: Phase,
        name: String,
    },
    TurnsAdjusted {
        delta: i64,
        planned: u32,
        reapply: bool,
    },
    HandMutated {
        rule: String,
        side: Side,
        choice: Option<Choice>,
        count: u32,
        reapply: bool,
    },
    CardRevealed {
        rule: String,
        card: Choice,
    },
    DrawPolicySet {
        rule: String,
    },
    InfoShown {
        text: String,
    },
    TurnResolved {
        turn: u32,
        player: Choice,
        opponent: Choice,
        outcome: Outcome,
        delta: i64,
        total: i64,
    },
    RoundFinished {
        total: i64,
        adjustment: i64,
        turns_played: u32,
        turns_planned: u32,
    },
}

#[derive(Debug, Default)]
pub struct EventBus {
    queue: Vec<Event>,
}

impl EventBus {
    pub fn push(&mut self, event: Event) {
        self.queue.push(event);
    }

    pub fn drain(&mut self) -> impl Iterator<Item = Event> + '_ {
        self.queue.drain(..)
    }
}
