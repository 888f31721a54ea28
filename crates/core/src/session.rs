use crate::{
    judge, Choice, EvalContext, Event, EventBus, Outcome, PhaseReport, RoundConfig,
    Rule, RuleEngine, Side, Table, TableHost, Toggle,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RoundError {
    #[error("round is not active")]
    RoundNotActive,
    #[error("no {0} card left in hand")]
    NoCardOfChoice(Choice),
    #[error("reroll is only possible before the first card")]
    RerollUnavailable,
    #[error("no rerolls left")]
    NoRerollsLeft,
    #[error("opponent has no cards left")]
    OpponentHandEmpty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundState {
    Idle,
    Active,
    Finished,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundSummary {
    pub score: i64,
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
    pub turns_played: u32,
    pub turns_planned: u32,
    pub rerolls_used: u32,
    /// RoundEnd adjustment already included in `score`.
    pub final_adjustment: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnResult {
    pub turn: u32,
    pub player: Choice,
    pub opponent: Choice,
    pub outcome: Outcome,
    pub base: i64,
    /// Added at TurnStart, before the card was played.
    pub start_delta: i64,
    /// Settlement delta, base score included.
    pub delta: i64,
    pub total: i64,
    pub reports: Vec<PhaseReport>,
    pub finished: Option<RoundSummary>,
}

/// One player's run of rounds: the table, the rule engine and the
/// turn history the engine's contexts are built from.
#[derive(Debug)]
pub struct Session {
    table: Table,
    engine: RuleEngine,
    state: RoundState,
    played: Vec<Choice>,
    outcomes: Vec<Outcome>,
    final_adjustment: i64,
    events: EventBus,
}

impl Session {
    pub fn new(config: RoundConfig, seed: u64) -> Self {
        Self {
            table: Table::new(config, seed),
            engine: RuleEngine::new(),
            state: RoundState::Idle,
            played: Vec::new(),
            outcomes: Vec::new(),
            final_adjustment: 0,
            events: EventBus::default(),
        }
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn engine(&self) -> &RuleEngine {
        &self.engine
    }

    pub fn state(&self) -> RoundState {
        self.state
    }

    pub fn enable_rule(&mut self, rule: Rule) -> bool {
        let added = self.engine.enable_rule(rule);
        self.absorb_engine_events();
        added
    }

    /// Toggles a rule and, mid-round, re-runs RoundStart for information
    /// only. Hands are never mutated by this.
    pub fn toggle_rule(&mut self, rule: Rule) -> (Toggle, Option<PhaseReport>) {
        let toggle = self.engine.toggle_rule(rule);
        let report = if self.state == RoundState::Active {
            let mut ctx = self.round_context();
            Some(self.engine.on_rules_toggled(&mut ctx, &mut self.table))
        } else {
            None
        };
        self.absorb_engine_events();
        (toggle, report)
    }

    pub fn clear_rules(&mut self) {
        self.engine.clear_all_rules();
        self.absorb_engine_events();
    }

    /// Deals a new round and runs the RoundPrepare and initial RoundStart passes.
    pub fn start_round(&mut self) -> Vec<PhaseReport> {
        self.table.deal();
        self.played.clear();
        self.outcomes.clear();
        self.final_adjustment = 0;
        self.state = RoundState::Active;

        let mut ctx = self.round_context();
        let prepare = self.engine.on_round_prepare(&mut ctx, false, &mut self.table);
        let mut ctx = self.round_context();
        let start = self.engine.on_round_start(&mut ctx, true, &mut self.table);

        self.absorb_engine_events();
        self.events.push(Event::RoundStarted {
            player: self.table.counts(Side::Player),
            opponent: self.table.counts(Side::Opponent),
            turns: self.table.planned_turns(),
            rerolls: self.table.rerolls_left(),
        });
        vec![prepare, start]
    }

    /// Redeals the player's hand before the first card. Re-evaluates the
    /// RoundPrepare turn delta and lets RoundStart mutate hands once more.
    pub fn reroll(&mut self) -> Result<Vec<PhaseReport>, RoundError> {
        if self.state != RoundState::Active {
            return Err(RoundError::RoundNotActive);
        }
        if !self.played.is_empty() {
            return Err(RoundError::RerollUnavailable);
        }
        if self.table.rerolls_left() == 0 {
            return Err(RoundError::NoRerollsLeft);
        }
        self.table.reroll_player();
        self.events.push(Event::HandRerolled {
            player: self.table.counts(Side::Player),
            rerolls_left: self.table.rerolls_left(),
        });

        let mut ctx = self.round_context();
        let prepare = self.engine.on_round_prepare(&mut ctx, true, &mut self.table);
        self.engine.allow_hand_mutation_reapply_once();
        let mut ctx = self.round_context();
        let start = self.engine.on_rules_toggled(&mut ctx, &mut self.table);
        self.absorb_engine_events();
        Ok(vec![prepare, start])
    }

    pub fn play(&mut self, choice: Choice) -> Result<TurnResult, RoundError> {
        if self.state != RoundState::Active {
            return Err(RoundError::RoundNotActive);
        }
        if self.table.counts(Side::Player).get(choice) == 0 {
            return Err(RoundError::NoCardOfChoice(choice));
        }
        if self.table.hand(Side::Opponent).is_empty() {
            self.finish_round();
            return Err(RoundError::OpponentHandEmpty);
        }

        let turn = self.table.current_turn();
        let mut ctx = self.turn_context(turn);
        let start = self.engine.on_turn_start(&mut ctx, &mut self.table);
        self.table.add_score(start.score_delta);

        self.table.take_player_card(choice);
        let from_front = self.engine.should_draw_opponent_from_front();
        let opponent = self
            .table
            .draw_opponent(from_front)
            .ok_or(RoundError::OpponentHandEmpty)?;
        let outcome = judge(choice, opponent);
        let base = self.table.config().scores.base(outcome);
        self.played.push(choice);
        self.outcomes.push(outcome);

        let mut ctx = self
            .turn_context(turn)
            .with_play(choice, outcome)
            .with_base_score(base);
        let settlement = self.engine.on_turn_settlement(&mut ctx, &mut self.table);
        let delta = settlement.score_delta;
        self.table.add_score(delta);
        self.absorb_engine_events();
        self.events.push(Event::TurnResolved {
            turn,
            player: choice,
            opponent,
            outcome,
            delta,
            total: self.table.total(),
        });

        self.table.advance_turn();
        let mut reports = vec![start, settlement];
        let finished = if self.round_over() {
            let (summary, report) = self.finish_round();
            reports.push(report);
            Some(summary)
        } else {
            None
        };
        Ok(TurnResult {
            turn,
            player: choice,
            opponent,
            outcome,
            base,
            start_delta: reports[0].score_delta,
            delta,
            total: self.table.total(),
            reports,
            finished,
        })
    }

    pub fn summary(&self) -> RoundSummary {
        let count = |wanted: Outcome| self.outcomes.iter().filter(|o| **o == wanted).count() as u32;
        RoundSummary {
            score: self.table.total(),
            wins: count(Outcome::Win),
            draws: count(Outcome::Draw),
            losses: count(Outcome::Loss),
            turns_played: self.played.len() as u32,
            turns_planned: self.table.planned_turns(),
            rerolls_used: self.table.rerolls_used(),
            final_adjustment: self.final_adjustment,
        }
    }

    pub fn history(&self) -> (&[Choice], &[Outcome]) {
        (&self.played, &self.outcomes)
    }

    pub fn drain_events(&mut self) -> impl Iterator<Item = Event> + '_ {
        self.events.drain()
    }

    pub fn take_shown(&mut self) -> Vec<String> {
        self.table.take_shown()
    }

    fn round_over(&self) -> bool {
        self.table.current_turn() > self.table.planned_turns()
            || self.table.hand(Side::Player).is_empty()
            || self.table.hand(Side::Opponent).is_empty()
    }

    fn finish_round(&mut self) -> (RoundSummary, PhaseReport) {
        let turns_played = self.played.len() as u32;
        let mut ctx = EvalContext::new(turns_played, self.table.planned_turns())
            .last_turn(true)
            .with_total(self.table.total())
            .with_rerolls(self.table.rerolls_used())
            .with_history(&self.played, &self.outcomes);
        let report = self.engine.on_round_end(&mut ctx, &mut self.table);
        self.final_adjustment = report.score_delta;
        self.table.add_score(report.score_delta);
        self.state = RoundState::Finished;
        self.absorb_engine_events();
        self.events.push(Event::RoundFinished {
            total: self.table.total(),
            adjustment: report.score_delta,
            turns_played,
            turns_planned: self.table.planned_turns(),
        });
        (self.summary(), report)
    }

    fn round_context(&self) -> EvalContext {
        EvalContext::new(0, self.table.planned_turns())
            .with_rerolls(self.table.rerolls_used())
    }

    /// History holds completed turns only; settlement appends the current one
    /// before this is called.
    fn turn_context(&self, turn: u32) -> EvalContext {
        EvalContext::new(turn, self.table.planned_turns())
            .with_total(self.table.total())
            .with_rerolls(self.table.rerolls_used())
            .with_history(&self.played, &self.outcomes)
    }

    fn absorb_engine_events(&mut self) {
        for event in self.engine.drain_events() {
            self.events.push(event);
        }
    }
}
