use crate::{
    ActiveRuleSet, Diagnostic, DrawPolicy, Effect, Event, EventBus, Phase, PrepareAccumulator,
    Problem, ReapplyGate, Rule, Tag, TagProblem, TagRole, Toggle,
};

mod conditions;
mod dispatch;
mod effects;
mod phases;

pub use dispatch::PhaseReport;

/// Interprets the active rules at each phase of a round.
///
/// Owns the ordered rule set plus the small amount of state that has to
/// survive between phase calls: the opponent draw policy, the committed
/// RoundPrepare turn delta and the one-time RoundStart reapply gate.
#[derive(Debug, Default)]
pub struct RuleEngine {
    active: ActiveRuleSet,
    draw: DrawPolicy,
    prepare: PrepareAccumulator,
    reapply_gate: ReapplyGate,
    events: EventBus,
}

impl RuleEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_rules(&self) -> &ActiveRuleSet {
        &self.active
    }

    pub fn enable_rule(&mut self, rule: Rule) -> bool {
        let name = rule.name.clone();
        let added = self.active.enable(rule);
        if added {
            self.events.push(Event::RuleToggled {
                name,
                enabled: true,
            });
        }
        added
    }

    pub fn disable_rule(&mut self, name: &str) -> bool {
        let removed = self.active.disable(name);
        if removed {
            self.events.push(Event::RuleToggled {
                name: name.to_string(),
                enabled: false,
            });
        }
        removed
    }

    /// Enables the rule, or disables it when it is already enabled.
    pub fn toggle_rule(&mut self, rule: Rule) -> Toggle {
        let name = rule.name.clone();
        let toggle = self.active.toggle(rule);
        self.events.push(Event::RuleToggled {
            name,
            enabled: toggle == Toggle::Enabled,
        });
        toggle
    }

    /// Replaces the whole set with a single rule, or empties it.
    pub fn set_rule(&mut self, rule: Option<Rule>) {
        self.active.clear();
        match rule {
            Some(rule) => {
                self.enable_rule(rule);
            }
            None => self.events.push(Event::RulesCleared),
        }
    }

    pub fn clear_all_rules(&mut self) {
        self.active.clear();
        self.events.push(Event::RulesCleared);
    }

    pub fn is_enabled(&self, name: &str) -> bool {
        self.active.contains(name)
    }

    pub fn pipeline_description(&self) -> String {
        self.active.pipeline_description()
    }

    pub fn current_rule_name(&self) -> &str {
        self.active
            .latest()
            .map(|rule| rule.name.as_str())
            .unwrap_or("None")
    }

    pub fn draw_policy(&self) -> DrawPolicy {
        self.draw
    }

    /// Draw decision for the opponent's next card. Consumes a pending reveal.
    pub fn should_draw_opponent_from_front(&mut self) -> bool {
        self.draw.next_draw_from_front()
    }

    pub fn prepare_applied(&self) -> i64 {
        self.prepare.applied()
    }

    /// Allows the next RoundStart re-evaluation to mutate hands once more.
    pub fn allow_hand_mutation_reapply_once(&mut self) {
        self.reapply_gate.arm();
    }

    pub fn drain_events(&mut self) -> impl Iterator<Item = Event> + '_ {
        self.events.drain()
    }
}

/// Authoring problems that can be found without running a round.
pub fn validate_rule(rule: &Rule) -> Vec<Diagnostic> {
    let mut found = Vec::new();
    if rule.tags.is_empty() {
        found.push(Diagnostic::new(&rule.name, None, Problem::NoTags));
        return found;
    }
    if !rule.tags.iter().any(|tag| matches!(tag, Tag::Timing(_))) {
        found.push(Diagnostic::new(
            &rule.name,
            Some(TagRole::Timing),
            Problem::NoTiming,
        ));
    }
    for tag in &rule.tags {
        match tag {
            Tag::Invalid(invalid) => {
                found.push(Diagnostic::new(
                    &rule.name,
                    invalid.role,
                    invalid.problem.clone(),
                ));
            }
            Tag::Effect(effect) => {
                if let Effect::FinalScoreMultiplier(factor) = effect.effect {
                    if factor < 1 {
                        found.push(Diagnostic::new(
                            &rule.name,
                            Some(TagRole::Effect),
                            multiplier_problem(factor),
                        ));
                    }
                }
            }
            _ => {}
        }
    }
    found
}

fn multiplier_problem(factor: i64) -> TagProblem {
    TagProblem::InvalidParameter {
        kind: "FinalScoreMultiplier".to_string(),
        parameter: "intValue".to_string(),
        value: factor.to_string(),
    }
}

/// Which evaluation is running. RoundPrepare and RoundStart come in two flavours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Pass {
    Prepare { reapply: bool },
    RoundStart { initial: bool },
    TurnStart,
    Settlement,
    RoundEnd,
}

impl Pass {
    pub(crate) fn phase(self) -> Phase {
        match self {
            Self::Prepare { .. } => Phase::RoundPrepare,
            Self::RoundStart { .. } => Phase::RoundStart,
            Self::TurnStart => Phase::TurnStart,
            Self::Settlement => Phase::TurnSettlement,
            Self::RoundEnd => Phase::RoundEnd,
        }
    }

    pub(crate) fn is_reapply(self) -> bool {
        matches!(
            self,
            Self::Prepare { reapply: true } | Self::RoundStart { initial: false }
        )
    }
}
