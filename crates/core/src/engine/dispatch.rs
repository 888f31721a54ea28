use super::{Pass, RuleEngine};
use crate::{
    ConditionKind, Diagnostic, DrawPolicy, Effect, EffectKind, EvalContext, Event, EventBus,
    Phase, PrepareAccumulator, Rule, TableHost, Tag, TagRole,
};
use serde::{Deserialize, Serialize};

/// What one phase call produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseReport {
    pub phase: Phase,
    pub score_delta: i64,
    /// Names of rules whose timing and conditions matched, in evaluation order.
    pub fired: Vec<String>,
    pub info: Option<String>,
    pub diagnostics: Vec<Diagnostic>,
}

impl PhaseReport {
    pub fn new(phase: Phase) -> Self {
        Self {
            phase,
            score_delta: 0,
            fired: Vec::new(),
            info: None,
            diagnostics: Vec::new(),
        }
    }

    pub fn has_fired(&self, name: &str) -> bool {
        self.fired.iter().any(|fired| fired == name)
    }
}

/// Borrowed view of the engine state one pass is allowed to touch.
pub(super) struct Interpreter<'a> {
    pub(super) pass: Pass,
    pub(super) draw: &'a mut DrawPolicy,
    pub(super) prepare: &'a mut PrepareAccumulator,
    pub(super) events: &'a mut EventBus,
    pub(super) hand_mutation_allowed: bool,
    pub(super) report: PhaseReport,
}

impl RuleEngine {
    pub(super) fn run_pass(
        &mut self,
        pass: Pass,
        hand_mutation_allowed: bool,
        ctx: &mut EvalContext,
        host: &mut dyn TableHost,
    ) -> PhaseReport {
        let Self {
            active,
            draw,
            prepare,
            events,
            ..
        } = &mut *self;
        let mut interpreter = Interpreter {
            pass,
            draw,
            prepare,
            events,
            hand_mutation_allowed,
            report: PhaseReport::new(pass.phase()),
        };
        for rule in active.iter() {
            interpreter.run_rule(rule, ctx, host);
        }
        if let Some(text) = ctx.info.clone() {
            host.show_info(&text);
            interpreter.events.push(Event::InfoShown { text });
        }
        let mut report = interpreter.report;
        report.score_delta = ctx.score_delta;
        report.info = ctx.info.clone();
        report
    }
}

impl Interpreter<'_> {
    fn run_rule(&mut self, rule: &Rule, ctx: &mut EvalContext, host: &mut dyn TableHost) {
        let phase = self.pass.phase();
        if !rule.fires_in(phase) {
            return;
        }
        if !self.conditions_hold(rule, ctx, host) {
            return;
        }
        self.report.fired.push(rule.name.clone());
        self.events.push(Event::RuleFired {
            phase,
            name: rule.name.clone(),
        });
        for tag in &rule.tags {
            match tag {
                Tag::Effect(tagged) => {
                    if !effect_in_pass(self.pass, &tagged.effect) {
                        continue;
                    }
                    if !tagged.filter.matches(ctx.outcome, ctx.player_choice) {
                        continue;
                    }
                    self.apply_effect(rule, &tagged.effect, ctx, host);
                }
                Tag::Invalid(invalid) if invalid.role == Some(TagRole::Effect) => {
                    self.diagnose(Diagnostic::new(
                        &rule.name,
                        invalid.role,
                        invalid.problem.clone(),
                    ));
                }
                _ => {}
            }
        }
    }

    pub(super) fn diagnose(&mut self, diagnostic: Diagnostic) {
        self.report.diagnostics.push(diagnostic);
    }
}

/// Condition kinds a phase can answer. Other well-formed kinds are skipped.
pub(super) fn condition_in_pass(pass: Pass, kind: ConditionKind) -> bool {
    use ConditionKind::*;
    match pass {
        Pass::Prepare { reapply: false } => matches!(
            kind,
            PlayerHandHasMoreOfChoiceThanOpponent | PlayerHandAtLeastCountOfChoice
        ),
        Pass::Prepare { reapply: true } => matches!(kind, PlayerHandAtLeastCountOfChoice),
        Pass::RoundStart { .. } => matches!(
            kind,
            PlayerHandHasMoreOfChoiceThanOpponent
                | PlayerHandAtLeastCountOfChoice
                | RerollCountEquals
        ),
        Pass::TurnStart => matches!(
            kind,
            PlayerHandAtLeastCountOfChoice | TurnIndexEquals | RerollCountEquals | IsLastTurn
        ),
        Pass::Settlement => matches!(
            kind,
            OutcomeEquals
                | PlayerChoiceEquals
                | PlayedAtLeastCount
                | ConsecutiveOutcomeWithChoiceEquals
                | ConsecutiveDrawWithChoiceEquals
                | IsLastTurn
                | TurnIndexEquals
                | RerollCountEquals
                | PlayerHandAtLeastCountOfChoice
        ),
        Pass::RoundEnd => matches!(
            kind,
            PlayedAtLeastCount
                | ChoiceUsedOnTurnIndex
                | WinWithChoiceAtLeastCount
                | WinsOnlyWithChoice
                | RerollCountEquals
        ),
    }
}

/// Effect kinds a phase applies. Other well-formed kinds are skipped.
pub(super) fn effect_in_pass(pass: Pass, effect: &Effect) -> bool {
    use EffectKind::*;
    let kind = effect.kind();
    match pass {
        Pass::Prepare { reapply: false } => matches!(
            kind,
            ModifyPlannedTurnsDelta
                | AddCardsToPlayerHand
                | AddCardsToOpponentHand
                | AddRandomCardsToPlayerHand
                | AddRandomCardsToOpponentHand
                | ShowInfo
        ),
        Pass::Prepare { reapply: true } => matches!(kind, ModifyPlannedTurnsDelta),
        Pass::RoundStart { .. } => matches!(
            kind,
            ForceOpponentDrawFromFront
                | ReplaceOpponentRandomCardsToChoice
                | RevealOpponentFirstAndLast
                | ShowInfo
        ),
        Pass::TurnStart => matches!(
            kind,
            AddScorePerHandCountOfChoice
                | AddScoreDelta
                | RevealNextOpponentCard
                | RevealOpponentFirstAndLast
                | ShowInfo
        ),
        Pass::Settlement => matches!(
            kind,
            AddScoreDelta
                | ShowInfo
                | FinalScoreMultiplier
                | RevealNextOpponentCard
                | ForceOpponentDrawFromFront
        ),
        Pass::RoundEnd => matches!(kind, FinalTotalMultiplier | AddScoreDelta | ShowInfo),
    }
}
