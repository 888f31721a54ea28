use super::{validate_rule, Pass, PhaseReport, RuleEngine};
use crate::{Diagnostic, EvalContext, Event, TableHost, TagRole};

impl RuleEngine {
    /// RoundPrepare pass. A full pass starts a new round's bookkeeping; a
    /// reapply pass (after a reroll) only pushes the planned-turn difference
    /// that is not yet applied, so repeating it never drifts.
    pub fn on_round_prepare(
        &mut self,
        ctx: &mut EvalContext,
        reapply: bool,
        host: &mut dyn TableHost,
    ) -> PhaseReport {
        if !reapply {
            self.prepare.reset();
        }
        self.prepare.begin();
        let mut report = self.run_pass(Pass::Prepare { reapply }, !reapply, ctx, host);

        let delta = self.prepare.outstanding();
        if delta == 0 {
            self.prepare.commit();
            return report;
        }
        match host.adjust_planned_turns(delta) {
            Some(planned) => {
                self.prepare.commit();
                ctx.turns_planned = planned;
                self.events.push(Event::TurnsAdjusted {
                    delta,
                    planned,
                    reapply,
                });
            }
            None => report.diagnostics.push(Diagnostic::missing_host(
                "RoundPrepare",
                TagRole::Effect,
                "adjust planned turns",
            )),
        }
        report
    }

    /// RoundStart pass. The initial pass clears both draw flags and validates
    /// every active rule. Re-evaluations only mutate hands when a reroll armed
    /// the gate, and the gate closes once the pass is done.
    pub fn on_round_start(
        &mut self,
        ctx: &mut EvalContext,
        apply_draw_policy: bool,
        host: &mut dyn TableHost,
    ) -> PhaseReport {
        let mut validation = Vec::new();
        if apply_draw_policy {
            self.draw.reset();
            self.reapply_gate.close();
            for rule in self.active.iter() {
                validation.extend(validate_rule(rule));
            }
        }
        let mutation_allowed = apply_draw_policy || self.reapply_gate.is_armed();
        let mut report = self.run_pass(
            Pass::RoundStart {
                initial: apply_draw_policy,
            },
            mutation_allowed,
            ctx,
            host,
        );
        self.reapply_gate.close();
        validation.append(&mut report.diagnostics);
        report.diagnostics = validation;
        report
    }

    /// Re-runs RoundStart after the active set changed mid-round.
    pub fn on_rules_toggled(
        &mut self,
        ctx: &mut EvalContext,
        host: &mut dyn TableHost,
    ) -> PhaseReport {
        self.on_round_start(ctx, false, host)
    }

    pub fn on_turn_start(&mut self, ctx: &mut EvalContext, host: &mut dyn TableHost) -> PhaseReport {
        self.run_pass(Pass::TurnStart, false, ctx, host)
    }

    pub fn on_turn_settlement(
        &mut self,
        ctx: &mut EvalContext,
        host: &mut dyn TableHost,
    ) -> PhaseReport {
        self.run_pass(Pass::Settlement, false, ctx, host)
    }

    /// The report's score delta is the adjustment to the final total.
    pub fn on_round_end(&mut self, ctx: &mut EvalContext, host: &mut dyn TableHost) -> PhaseReport {
        self.run_pass(Pass::RoundEnd, false, ctx, host)
    }
}
