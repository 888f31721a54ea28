use super::dispatch::{condition_in_pass, Interpreter};
use crate::{
    Choice, Condition, Diagnostic, EvalContext, Outcome, Rule, Side, TableHost, Tag, TagRole,
};

impl Interpreter<'_> {
    /// All applicable conditions hold. Several TurnIndexEquals tags form one
    /// OR group; every other condition is ANDed with that group.
    pub(super) fn conditions_hold(
        &mut self,
        rule: &Rule,
        ctx: &EvalContext,
        host: &dyn TableHost,
    ) -> bool {
        let mut turn_group: Option<bool> = None;
        for tag in &rule.tags {
            match tag {
                Tag::Condition(condition) => {
                    if !condition_in_pass(self.pass, condition.kind()) {
                        continue;
                    }
                    if let Condition::TurnIndexEquals(turn) = condition {
                        let hit = ctx.turn_index == *turn;
                        turn_group = Some(turn_group.unwrap_or(false) || hit);
                        continue;
                    }
                    if !self.check(rule, condition, ctx, host) {
                        return false;
                    }
                }
                // An unknown category may have been a condition.
                Tag::Invalid(invalid)
                    if !matches!(invalid.role, Some(TagRole::Timing | TagRole::Effect)) =>
                {
                    self.diagnose(Diagnostic::new(
                        &rule.name,
                        invalid.role,
                        invalid.problem.clone(),
                    ));
                    return false;
                }
                _ => {}
            }
        }
        turn_group.unwrap_or(true)
    }

    fn check(
        &mut self,
        rule: &Rule,
        condition: &Condition,
        ctx: &EvalContext,
        host: &dyn TableHost,
    ) -> bool {
        match *condition {
            Condition::OutcomeEquals(outcome) => ctx.outcome == Some(outcome),
            Condition::PlayerChoiceEquals(choice) => ctx.player_choice == Some(choice),
            Condition::PlayedAtLeastCount { choice, count } => {
                times_played(&ctx.player_history, choice) >= count as usize
            }
            Condition::ConsecutiveOutcomeWithChoice {
                outcome,
                choice,
                count,
            } => match ctx.paired_tail(count.max(1) as usize) {
                Some(mut tail) => tail.all(|pair| pair == (choice, outcome)),
                None => false,
            },
            Condition::IsLastTurn(expected) => ctx.is_last_turn == expected,
            Condition::PlayerHandHasMoreThanOpponent(choice) => {
                let counts = (
                    host.hand_count(Side::Player, choice),
                    host.hand_count(Side::Opponent, choice),
                );
                match counts {
                    (Some(player), Some(opponent)) => player > opponent,
                    _ => {
                        self.diagnose(Diagnostic::missing_host(
                            &rule.name,
                            TagRole::Condition,
                            "count cards in hand",
                        ));
                        false
                    }
                }
            }
            Condition::TurnIndexEquals(turn) => ctx.turn_index == turn,
            Condition::RerollCountEquals(rerolls) => ctx.rerolls_used == rerolls,
            Condition::PlayerHandAtLeast { choice, count } => {
                match host.hand_count(Side::Player, choice) {
                    Some(held) => held >= count,
                    None => {
                        self.diagnose(Diagnostic::missing_host(
                            &rule.name,
                            TagRole::Condition,
                            "count cards in hand",
                        ));
                        false
                    }
                }
            }
            Condition::ChoiceUsedOnTurn { choice, turn } => turn
                .checked_sub(1)
                .and_then(|index| ctx.player_history.get(index as usize))
                .is_some_and(|played| *played == choice),
            Condition::WinWithChoiceAtLeast { choice, count } => {
                ctx.paired_history()
                    .filter(|pair| *pair == (choice, Outcome::Win))
                    .count()
                    >= count as usize
            }
            Condition::WinsOnlyWithChoice(choice) => {
                let mut wins = ctx
                    .paired_history()
                    .filter(|(_, outcome)| *outcome == Outcome::Win)
                    .peekable();
                wins.peek().is_some() && wins.all(|(played, _)| played == choice)
            }
        }
    }
}

fn times_played(history: &[Choice], choice: Choice) -> usize {
    history.iter().filter(|played| **played == choice).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Pass;
    use crate::{DetachedHost, DrawPolicy, EventBus, Phase, PhaseReport, PrepareAccumulator};

    fn holds(pass: Pass, rule: &Rule, ctx: &EvalContext) -> (bool, PhaseReport) {
        let mut draw = DrawPolicy::default();
        let mut prepare = PrepareAccumulator::default();
        let mut events = EventBus::default();
        let mut interpreter = Interpreter {
            pass,
            draw: &mut draw,
            prepare: &mut prepare,
            events: &mut events,
            hand_mutation_allowed: false,
            report: PhaseReport::new(pass.phase()),
        };
        let held = interpreter.conditions_hold(rule, ctx, &DetachedHost);
        (held, interpreter.report)
    }

    #[test]
    fn turn_index_tags_are_alternatives() {
        let rule = Rule::new(
            "Twin",
            vec![
                Tag::Timing(Phase::TurnSettlement),
                Tag::Condition(Condition::TurnIndexEquals(1)),
                Tag::Condition(Condition::TurnIndexEquals(3)),
                Tag::Condition(Condition::OutcomeEquals(Outcome::Win)),
            ],
        );
        let third = EvalContext::new(3, 5).with_play(Choice::Rock, Outcome::Win);
        assert!(holds(Pass::Settlement, &rule, &third).0);
        let second = EvalContext::new(2, 5).with_play(Choice::Rock, Outcome::Win);
        assert!(!holds(Pass::Settlement, &rule, &second).0);
        let lost = EvalContext::new(1, 5).with_play(Choice::Rock, Outcome::Loss);
        assert!(!holds(Pass::Settlement, &rule, &lost).0);
    }

    #[test]
    fn consecutive_count_zero_behaves_like_one() {
        let rule = Rule::new(
            "Streak",
            vec![Tag::Condition(Condition::ConsecutiveOutcomeWithChoice {
                outcome: Outcome::Draw,
                choice: Choice::Paper,
                count: 0,
            })],
        );
        let empty = EvalContext::new(1, 5);
        assert!(!holds(Pass::Settlement, &rule, &empty).0);
        let drew = EvalContext::new(1, 5).with_history(&[Choice::Paper], &[Outcome::Draw]);
        assert!(holds(Pass::Settlement, &rule, &drew).0);
    }

    #[test]
    fn missing_host_fails_with_diagnostic() {
        let rule = Rule::new(
            "Counter",
            vec![Tag::Condition(Condition::PlayerHandAtLeast {
                choice: Choice::Rock,
                count: 1,
            })],
        );
        let (held, report) = holds(Pass::TurnStart, &rule, &EvalContext::new(1, 5));
        assert!(!held);
        assert_eq!(report.diagnostics.len(), 1);
    }

    #[test]
    fn wins_only_needs_a_win() {
        let rule = Rule::new(
            "Purist",
            vec![Tag::Condition(Condition::WinsOnlyWithChoice(Choice::Scissors))],
        );
        let none = EvalContext::new(3, 3).with_history(
            &[Choice::Rock, Choice::Paper],
            &[Outcome::Loss, Outcome::Draw],
        );
        assert!(!holds(Pass::RoundEnd, &rule, &none).0);
        let only = EvalContext::new(3, 3).with_history(
            &[Choice::Scissors, Choice::Rock],
            &[Outcome::Win, Outcome::Loss],
        );
        assert!(holds(Pass::RoundEnd, &rule, &only).0);
        let mixed = EvalContext::new(3, 3).with_history(
            &[Choice::Scissors, Choice::Rock],
            &[Outcome::Win, Outcome::Win],
        );
        assert!(!holds(Pass::RoundEnd, &rule, &mixed).0);
    }

    #[test]
    fn choice_used_on_turn_is_one_based() {
        let rule = Rule::new(
            "Opener",
            vec![Tag::Condition(Condition::ChoiceUsedOnTurn {
                choice: Choice::Paper,
                turn: 1,
            })],
        );
        let ctx = EvalContext::new(3, 3).with_history(
            &[Choice::Paper, Choice::Rock],
            &[Outcome::Win, Outcome::Win],
        );
        assert!(holds(Pass::RoundEnd, &rule, &ctx).0);
        let zero = Rule::new(
            "Zero",
            vec![Tag::Condition(Condition::ChoiceUsedOnTurn {
                choice: Choice::Paper,
                turn: 0,
            })],
        );
        assert!(!holds(Pass::RoundEnd, &zero, &ctx).0);
    }

    #[test]
    fn inapplicable_kind_is_ignored() {
        let rule = Rule::new(
            "Late",
            vec![Tag::Condition(Condition::OutcomeEquals(Outcome::Win))],
        );
        let (held, report) = holds(Pass::RoundEnd, &rule, &EvalContext::new(3, 3));
        assert!(held);
        assert!(report.diagnostics.is_empty());
    }

    #[test]
    fn invalid_condition_fails_the_rule() {
        let rule = Rule::new(
            "Broken",
            vec![Tag::invalid(
                TagRole::Condition,
                crate::TagProblem::UnknownKind("Moon".to_string()),
            )],
        );
        let (held, report) = holds(Pass::Settlement, &rule, &EvalContext::new(1, 3));
        assert!(!held);
        assert_eq!(report.diagnostics[0].rule, "Broken");
    }
}
