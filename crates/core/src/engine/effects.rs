use super::dispatch::Interpreter;
use super::{multiplier_problem, Pass};
use crate::{Choice, Diagnostic, Effect, EvalContext, Event, Rule, Side, TableHost, TagRole};

impl Interpreter<'_> {
    pub(super) fn apply_effect(
        &mut self,
        rule: &Rule,
        effect: &Effect,
        ctx: &mut EvalContext,
        host: &mut dyn TableHost,
    ) {
        match effect {
            Effect::AddScore(amount) => {
                ctx.score_delta = ctx.score_delta.saturating_add(*amount);
            }
            Effect::ShowInfo(text) => {
                ctx.info = Some(match text {
                    Some(text) if !text.is_empty() => text.clone(),
                    _ => self.default_info(rule),
                });
            }
            Effect::ForceOpponentDrawFromFront(enabled) => {
                if *enabled && self.pass == (Pass::RoundStart { initial: true }) {
                    self.draw.set_round_wide();
                    self.events.push(Event::DrawPolicySet {
                        rule: rule.name.clone(),
                    });
                }
            }
            Effect::FinalScoreMultiplier(factor) => {
                if *factor > 1 {
                    ctx.score_delta = multiplied_delta(ctx.current_total, ctx.score_delta, *factor);
                } else if *factor < 1 {
                    self.diagnose(Diagnostic::new(
                        &rule.name,
                        Some(TagRole::Effect),
                        multiplier_problem(*factor),
                    ));
                }
            }
            Effect::FinalTotalMultiplier(factor) => {
                ctx.score_delta = multiplied_delta(ctx.current_total, ctx.score_delta, *factor);
            }
            Effect::ReplaceOpponentCards { choice, count } => {
                if !self.hand_mutation_allowed || *count == 0 {
                    return;
                }
                // Rock replacement only ever targets Paper and Scissors cards.
                let changed = if *choice == Choice::Rock {
                    host.replace_opponent_cards(*choice, *count)
                } else {
                    host.replace_opponent_cards_randomly(*choice, *count)
                };
                self.record_mutation(rule, Side::Opponent, Some(*choice), changed, "replace cards");
            }
            Effect::RevealNextOpponentCard => {
                match host.peek_front(Side::Opponent) {
                    Some(card) => {
                        ctx.info = Some(format!("Next opponent card (front): {card}"));
                        self.events.push(Event::CardRevealed {
                            rule: rule.name.clone(),
                            card,
                        });
                    }
                    None => self.diagnose(Diagnostic::missing_host(
                        &rule.name,
                        TagRole::Effect,
                        "peek the opponent hand",
                    )),
                }
                self.draw.arm_one_shot();
            }
            Effect::RevealOpponentFirstAndLast => {
                let first = host.peek_front(Side::Opponent);
                let last = host.peek_final(Side::Opponent);
                match first.zip(last) {
                    Some((first, last)) => {
                        ctx.info = Some(format!("Opponent first: {first}, last: {last}"));
                    }
                    None => self.diagnose(Diagnostic::missing_host(
                        &rule.name,
                        TagRole::Effect,
                        "peek the opponent hand",
                    )),
                }
            }
            Effect::ModifyPlannedTurns(delta) => {
                if *delta != 0 {
                    self.prepare.accumulate(*delta);
                }
            }
            Effect::AddCardsToHand {
                side,
                choice,
                count,
            } => {
                if !self.hand_mutation_allowed || *count == 0 {
                    return;
                }
                let added = host.add_cards(*side, *choice, *count);
                self.record_mutation(rule, *side, Some(*choice), added, "add cards");
            }
            Effect::AddRandomCardsToHand { side, count } => {
                if !self.hand_mutation_allowed || *count == 0 {
                    return;
                }
                let added = host.add_random_cards(*side, *count);
                self.record_mutation(rule, *side, None, added, "add cards");
            }
            Effect::AddScorePerHandCount { choice, per_card } => {
                match host.hand_count(Side::Player, *choice) {
                    Some(held) => {
                        let bonus = per_card.saturating_mul(i64::from(held));
                        ctx.score_delta = ctx.score_delta.saturating_add(bonus);
                    }
                    None => self.diagnose(Diagnostic::missing_host(
                        &rule.name,
                        TagRole::Effect,
                        "count cards in hand",
                    )),
                }
            }
        }
    }

    fn record_mutation(
        &mut self,
        rule: &Rule,
        side: Side,
        choice: Option<Choice>,
        count: Option<u32>,
        operation: &str,
    ) {
        match count {
            Some(count) => self.events.push(Event::HandMutated {
                rule: rule.name.clone(),
                side,
                choice,
                count,
                reapply: self.pass.is_reapply(),
            }),
            None => self.diagnose(Diagnostic::missing_host(
                &rule.name,
                TagRole::Effect,
                operation,
            )),
        }
    }

    fn default_info(&self, rule: &Rule) -> String {
        match self.pass {
            Pass::Prepare { .. } => format!("Rule prepare: {}", rule.name),
            _ => format!("Rule: {}", rule.name),
        }
    }
}

/// Delta that turns `total + delta` into `(total + delta) * factor`.
fn multiplied_delta(total: i64, delta: i64, factor: i64) -> i64 {
    total
        .saturating_add(delta)
        .saturating_mul(factor)
        .saturating_sub(total)
}
