use rpsjoker_core::{
    Choice, Condition, DetachedHost, Effect, EffectTag, EvalContext, HandCounts, Outcome, Phase,
    Problem, Rule, RuleEngine, Side, TableHost, Tag, TagProblem, TagRole,
};

#[derive(Debug, Default)]
struct ScriptedHost {
    player: HandCounts,
    opponent: HandCounts,
    front: Option<Choice>,
    planned: u32,
    adjustments: Vec<i64>,
    shown: Vec<String>,
    replaced: Vec<(Choice, u32)>,
}

impl TableHost for ScriptedHost {
    fn hand_count(&self, side: Side, choice: Choice) -> Option<u32> {
        Some(match side {
            Side::Player => self.player.get(choice),
            Side::Opponent => self.opponent.get(choice),
        })
    }

    fn peek_front(&self, _side: Side) -> Option<Choice> {
        self.front
    }

    fn peek_final(&self, _side: Side) -> Option<Choice> {
        self.front
    }

    fn replace_opponent_cards(&mut self, choice: Choice, count: u32) -> Option<u32> {
        self.replaced.push((choice, count));
        Some(count)
    }

    fn replace_opponent_cards_randomly(&mut self, choice: Choice, count: u32) -> Option<u32> {
        self.replaced.push((choice, count));
        Some(count)
    }

    fn adjust_planned_turns(&mut self, delta: i64) -> Option<u32> {
        self.adjustments.push(delta);
        self.planned = (i64::from(self.planned) + delta).max(1) as u32;
        Some(self.planned)
    }

    fn show_info(&mut self, text: &str) {
        self.shown.push(text.to_string());
    }
}

fn engine_with(rules: Vec<Rule>) -> RuleEngine {
    let mut engine = RuleEngine::new();
    for rule in rules {
        engine.enable_rule(rule);
    }
    engine
}

fn settle(engine: &mut RuleEngine, ctx: EvalContext) -> i64 {
    let mut ctx = ctx;
    engine
        .on_turn_settlement(&mut ctx, &mut DetachedHost)
        .score_delta
}

#[test]
fn scissors_collector_pays_on_the_last_turn() {
    let rule = Rule::new(
        "Scissors_Collector",
        vec![
            Tag::Timing(Phase::TurnSettlement),
            Tag::Condition(Condition::PlayedAtLeastCount {
                choice: Choice::Scissors,
                count: 2,
            }),
            Tag::Condition(Condition::IsLastTurn(true)),
            Tag::effect(Effect::AddScore(10)),
        ],
    );
    let mut engine = engine_with(vec![rule]);
    let ctx = EvalContext::new(3, 3)
        .with_play(Choice::Scissors, Outcome::Win)
        .with_base_score(5)
        .with_history(
            &[Choice::Rock, Choice::Scissors, Choice::Scissors],
            &[Outcome::Draw, Outcome::Loss, Outcome::Win],
        );
    assert_eq!(settle(&mut engine, ctx.clone()), 15);

    let not_last = EvalContext { is_last_turn: false, ..ctx };
    assert_eq!(settle(&mut engine, not_last), 5);
}

#[test]
fn conditions_combine_with_and() {
    let rule = Rule::new(
        "Paper_Win",
        vec![
            Tag::Timing(Phase::TurnSettlement),
            Tag::Condition(Condition::OutcomeEquals(Outcome::Win)),
            Tag::Condition(Condition::PlayerChoiceEquals(Choice::Paper)),
            Tag::effect(Effect::AddScore(7)),
        ],
    );
    let mut engine = engine_with(vec![rule]);
    let both = EvalContext::new(1, 5).with_play(Choice::Paper, Outcome::Win);
    let wrong_choice = EvalContext::new(1, 5).with_play(Choice::Rock, Outcome::Win);
    let wrong_outcome = EvalContext::new(1, 5).with_play(Choice::Paper, Outcome::Draw);
    assert_eq!(settle(&mut engine, both), 7);
    assert_eq!(settle(&mut engine, wrong_choice), 0);
    assert_eq!(settle(&mut engine, wrong_outcome), 0);
}

#[test]
fn turn_index_tags_combine_with_or() {
    let rule = Rule::new(
        "Final_Royalty",
        vec![
            Tag::Timing(Phase::TurnSettlement),
            Tag::Condition(Condition::TurnIndexEquals(4)),
            Tag::Condition(Condition::TurnIndexEquals(5)),
            Tag::Condition(Condition::OutcomeEquals(Outcome::Win)),
            Tag::effect(Effect::AddScore(4)),
        ],
    );
    let mut engine = engine_with(vec![rule]);
    for (turn, outcome, expected) in [
        (3, Outcome::Win, 0),
        (4, Outcome::Win, 4),
        (5, Outcome::Win, 4),
        (5, Outcome::Loss, 0),
    ] {
        let ctx = EvalContext::new(turn, 5).with_play(Choice::Rock, outcome);
        assert_eq!(settle(&mut engine, ctx), expected, "turn {turn}");
    }
}

#[test]
fn multiplier_applies_to_turn_contribution() {
    let rule = Rule::new(
        "Doubler",
        vec![
            Tag::Timing(Phase::TurnSettlement),
            Tag::effect(Effect::AddScore(5)),
            Tag::effect(Effect::FinalScoreMultiplier(2)),
        ],
    );
    let mut engine = engine_with(vec![rule]);
    let ctx = EvalContext::new(2, 5)
        .with_play(Choice::Rock, Outcome::Loss)
        .with_total(50);
    assert_eq!(settle(&mut engine, ctx), 60);
}

#[test]
fn activation_order_decides_what_a_multiplier_sees() {
    let adder = Rule::new(
        "Adder",
        vec![
            Tag::Timing(Phase::TurnSettlement),
            Tag::effect(Effect::AddScore(5)),
        ],
    );
    let doubler = Rule::new(
        "Doubler",
        vec![
            Tag::Timing(Phase::TurnSettlement),
            Tag::effect(Effect::FinalScoreMultiplier(2)),
        ],
    );
    let ctx = EvalContext::new(1, 5).with_play(Choice::Rock, Outcome::Win);

    let mut add_first = engine_with(vec![adder.clone(), doubler.clone()]);
    assert_eq!(add_first.pipeline_description(), "Adder -> Doubler");
    assert_eq!(settle(&mut add_first, ctx.clone()), 10);

    let mut double_first = engine_with(vec![doubler, adder]);
    assert_eq!(settle(&mut double_first, ctx), 5);
}

#[test]
fn small_multipliers_do_nothing() {
    let rule = Rule::new(
        "Dud",
        vec![
            Tag::Timing(Phase::TurnSettlement),
            Tag::effect(Effect::FinalScoreMultiplier(1)),
            Tag::effect(Effect::FinalScoreMultiplier(0)),
        ],
    );
    let mut engine = engine_with(vec![rule]);
    let mut ctx = EvalContext::new(1, 5)
        .with_play(Choice::Rock, Outcome::Win)
        .with_base_score(5)
        .with_total(20);
    let report = engine.on_turn_settlement(&mut ctx, &mut DetachedHost);
    assert_eq!(report.score_delta, 5);
    assert_eq!(report.diagnostics.len(), 1);
}

#[test]
fn effect_filters_are_independent() {
    let rule = Rule::new(
        "Glass_Scissors",
        vec![
            Tag::Timing(Phase::TurnSettlement),
            Tag::Effect(EffectTag::new(Effect::AddScore(3)).when(Outcome::Win, Choice::Scissors)),
            Tag::Effect(EffectTag::new(Effect::AddScore(1)).when(Outcome::Draw, Choice::Scissors)),
            Tag::effect(Effect::AddScore(100)),
        ],
    );
    let mut engine = engine_with(vec![rule]);
    let win = EvalContext::new(1, 5).with_play(Choice::Scissors, Outcome::Win);
    let draw = EvalContext::new(1, 5).with_play(Choice::Scissors, Outcome::Draw);
    let rock = EvalContext::new(1, 5).with_play(Choice::Rock, Outcome::Win);
    assert_eq!(settle(&mut engine, win), 103);
    assert_eq!(settle(&mut engine, draw), 101);
    assert_eq!(settle(&mut engine, rock), 100);
}

#[test]
fn malformed_condition_blocks_the_rule() {
    let rule = Rule::new(
        "Broken",
        vec![
            Tag::Timing(Phase::TurnSettlement),
            Tag::Condition(Condition::OutcomeEquals(Outcome::Win)),
            Tag::invalid(TagRole::Condition, TagProblem::MissingKind),
            Tag::effect(Effect::AddScore(100)),
        ],
    );
    let mut engine = engine_with(vec![rule]);
    let mut ctx = EvalContext::new(1, 5)
        .with_play(Choice::Rock, Outcome::Win)
        .with_base_score(5);
    let report = engine.on_turn_settlement(&mut ctx, &mut DetachedHost);
    assert_eq!(report.score_delta, 5);
    assert!(report.fired.is_empty());
    assert_eq!(
        report.diagnostics[0].problem,
        Problem::Tag(TagProblem::MissingKind)
    );
}

#[test]
fn malformed_effect_is_skipped_but_others_apply() {
    let rule = Rule::new(
        "Half_Broken",
        vec![
            Tag::Timing(Phase::TurnSettlement),
            Tag::invalid(
                TagRole::Effect,
                TagProblem::UnknownKind("Teleport".to_string()),
            ),
            Tag::effect(Effect::AddScore(2)),
        ],
    );
    let mut engine = engine_with(vec![rule]);
    let mut ctx = EvalContext::new(1, 5).with_play(Choice::Rock, Outcome::Win);
    let report = engine.on_turn_settlement(&mut ctx, &mut DetachedHost);
    assert_eq!(report.score_delta, 2);
    assert_eq!(report.diagnostics.len(), 1);
    assert_eq!(report.diagnostics[0].role, Some(TagRole::Effect));
}

#[test]
fn missing_host_leaves_score_untouched() {
    let rule = Rule::new(
        "Rock_Counter",
        vec![
            Tag::Timing(Phase::TurnStart),
            Tag::effect(Effect::AddScorePerHandCount {
                choice: Choice::Rock,
                per_card: 2,
            }),
        ],
    );
    let mut engine = engine_with(vec![rule]);
    let mut ctx = EvalContext::new(1, 5);
    let report = engine.on_turn_start(&mut ctx, &mut DetachedHost);
    assert_eq!(report.score_delta, 0);
    assert_eq!(
        report.diagnostics[0].problem,
        Problem::MissingCollaborator("count cards in hand".to_string())
    );

    let mut host = ScriptedHost {
        player: HandCounts {
            rock: 3,
            paper: 0,
            scissors: 1,
        },
        ..ScriptedHost::default()
    };
    let mut ctx = EvalContext::new(1, 5);
    assert_eq!(engine.on_turn_start(&mut ctx, &mut host).score_delta, 6);
}

#[test]
fn prepare_reapply_only_applies_the_difference() {
    let rule = Rule::new(
        "Tailors_Pride",
        vec![
            Tag::Timing(Phase::RoundPrepare),
            Tag::Condition(Condition::PlayerHandAtLeast {
                choice: Choice::Rock,
                count: 2,
            }),
            Tag::effect(Effect::ModifyPlannedTurns(1)),
        ],
    );
    let mut engine = engine_with(vec![rule]);
    let mut host = ScriptedHost {
        planned: 5,
        player: HandCounts {
            rock: 3,
            paper: 2,
            scissors: 1,
        },
        ..ScriptedHost::default()
    };

    let mut ctx = EvalContext::new(0, 5);
    engine.on_round_prepare(&mut ctx, false, &mut host);
    assert_eq!(host.adjustments, vec![1]);
    assert_eq!(engine.prepare_applied(), 1);
    assert_eq!(ctx.turns_planned, 6);

    let mut ctx = EvalContext::new(0, 6);
    engine.on_round_prepare(&mut ctx, true, &mut host);
    assert_eq!(host.adjustments, vec![1]);

    host.player.rock = 0;
    let mut ctx = EvalContext::new(0, 6);
    engine.on_round_prepare(&mut ctx, true, &mut host);
    assert_eq!(host.adjustments, vec![1, -1]);
    assert_eq!(host.planned, 5);
    assert_eq!(engine.prepare_applied(), 0);
}

#[test]
fn reapply_prepare_skips_non_reevaluable_kinds() {
    let rule = Rule::new(
        "Rock_Majority",
        vec![
            Tag::Timing(Phase::RoundPrepare),
            Tag::Condition(Condition::PlayerHandHasMoreThanOpponent(Choice::Rock)),
            Tag::effect(Effect::ModifyPlannedTurns(-1)),
            Tag::effect(Effect::ShowInfo(Some("rock majority".to_string()))),
        ],
    );
    let mut engine = engine_with(vec![rule]);
    let mut host = ScriptedHost {
        planned: 5,
        ..ScriptedHost::default()
    };

    // 0 > 0 fails on the full pass
    let mut ctx = EvalContext::new(0, 5);
    let report = engine.on_round_prepare(&mut ctx, false, &mut host);
    assert!(report.fired.is_empty());

    // the hand comparison is not re-evaluated, so the rule now fires without it
    let mut ctx = EvalContext::new(0, 5);
    let report = engine.on_round_prepare(&mut ctx, true, &mut host);
    assert!(report.has_fired("Rock_Majority"));
    assert_eq!(host.adjustments, vec![-1]);
    assert!(host.shown.is_empty());
}

#[test]
fn reveal_arms_exactly_one_front_draw() {
    let rule = Rule::new(
        "Peek",
        vec![
            Tag::Timing(Phase::TurnStart),
            Tag::effect(Effect::RevealNextOpponentCard),
        ],
    );
    let mut engine = engine_with(vec![rule]);
    let mut host = ScriptedHost {
        front: Some(Choice::Paper),
        ..ScriptedHost::default()
    };
    let mut ctx = EvalContext::new(1, 5);
    let report = engine.on_turn_start(&mut ctx, &mut host);
    assert_eq!(
        report.info.as_deref(),
        Some("Next opponent card (front): Paper")
    );
    assert_eq!(host.shown.len(), 1);
    assert!(engine.should_draw_opponent_from_front());
    assert!(!engine.should_draw_opponent_from_front());
}

#[test]
fn draw_policy_is_set_only_by_initial_round_start() {
    let rule = Rule::new(
        "Front_Loader",
        vec![
            Tag::Timing(Phase::RoundStart),
            Tag::effect(Effect::ForceOpponentDrawFromFront(true)),
        ],
    );
    let mut engine = engine_with(vec![rule]);
    let mut host = ScriptedHost::default();

    let mut ctx = EvalContext::new(0, 5);
    engine.on_rules_toggled(&mut ctx, &mut host);
    assert!(!engine.draw_policy().round_wide());

    let mut ctx = EvalContext::new(0, 5);
    engine.on_round_start(&mut ctx, true, &mut host);
    assert!(engine.should_draw_opponent_from_front());
    assert!(engine.should_draw_opponent_from_front());

    engine.clear_all_rules();
    let mut ctx = EvalContext::new(0, 5);
    engine.on_round_start(&mut ctx, true, &mut host);
    assert!(!engine.should_draw_opponent_from_front());
}

#[test]
fn round_start_mutation_needs_initial_pass_or_rearm() {
    let rule = Rule::new(
        "Paper_Dominance",
        vec![
            Tag::Timing(Phase::RoundStart),
            Tag::effect(Effect::ReplaceOpponentCards {
                choice: Choice::Rock,
                count: 2,
            }),
        ],
    );
    let mut engine = engine_with(vec![rule]);
    let mut host = ScriptedHost::default();

    let mut ctx = EvalContext::new(0, 5);
    engine.on_round_start(&mut ctx, true, &mut host);
    assert_eq!(host.replaced.len(), 1);

    let mut ctx = EvalContext::new(0, 5);
    engine.on_rules_toggled(&mut ctx, &mut host);
    assert_eq!(host.replaced.len(), 1);

    engine.allow_hand_mutation_reapply_once();
    let mut ctx = EvalContext::new(0, 5);
    engine.on_rules_toggled(&mut ctx, &mut host);
    assert_eq!(host.replaced.len(), 2);

    let mut ctx = EvalContext::new(0, 5);
    engine.on_rules_toggled(&mut ctx, &mut host);
    assert_eq!(host.replaced.len(), 2);
}

#[test]
fn info_slot_keeps_the_last_write() {
    let first = Rule::new(
        "First",
        vec![
            Tag::Timing(Phase::TurnSettlement),
            Tag::effect(Effect::ShowInfo(Some("one".to_string()))),
        ],
    );
    let second = Rule::new(
        "Second",
        vec![
            Tag::Timing(Phase::TurnSettlement),
            Tag::effect(Effect::ShowInfo(None)),
        ],
    );
    let mut engine = engine_with(vec![first, second]);
    let mut host = ScriptedHost::default();
    let mut ctx = EvalContext::new(1, 5).with_play(Choice::Rock, Outcome::Win);
    let report = engine.on_turn_settlement(&mut ctx, &mut host);
    assert_eq!(report.info.as_deref(), Some("Rule: Second"));
    assert_eq!(host.shown, vec!["Rule: Second".to_string()]);
}

#[test]
fn round_end_multiplier_can_go_negative() {
    let rule = Rule::new(
        "Rock_Reversal",
        vec![
            Tag::Timing(Phase::RoundEnd),
            Tag::Condition(Condition::WinWithChoiceAtLeast {
                choice: Choice::Rock,
                count: 2,
            }),
            Tag::effect(Effect::FinalTotalMultiplier(-1)),
        ],
    );
    let mut engine = engine_with(vec![rule]);
    let mut ctx = EvalContext::new(3, 3)
        .with_total(30)
        .with_history(
            &[Choice::Rock, Choice::Rock, Choice::Paper],
            &[Outcome::Win, Outcome::Win, Outcome::Loss],
        );
    let report = engine.on_round_end(&mut ctx, &mut DetachedHost);
    assert_eq!(report.score_delta, -60);
}

#[test]
fn settlement_is_repeatable() {
    let rule = Rule::new(
        "Paper_Streak",
        vec![
            Tag::Timing(Phase::TurnSettlement),
            Tag::Condition(Condition::ConsecutiveOutcomeWithChoice {
                outcome: Outcome::Win,
                choice: Choice::Paper,
                count: 2,
            }),
            Tag::effect(Effect::AddScore(4)),
            Tag::effect(Effect::FinalScoreMultiplier(3)),
        ],
    );
    let mut engine = engine_with(vec![rule]);
    let ctx = EvalContext::new(2, 5)
        .with_play(Choice::Paper, Outcome::Win)
        .with_base_score(5)
        .with_total(12)
        .with_history(&[Choice::Paper, Choice::Paper], &[Outcome::Win, Outcome::Win]);
    let first = settle(&mut engine, ctx.clone());
    for _ in 0..5 {
        assert_eq!(settle(&mut engine, ctx.clone()), first);
    }
    assert_eq!(first, (12 + 9) * 3 - 12);
}

#[test]
fn oversized_turn_deltas_do_not_overflow() {
    let stretch = |name: &str| {
        Rule::new(
            name,
            vec![
                Tag::Timing(Phase::RoundPrepare),
                Tag::effect(Effect::ModifyPlannedTurns(i64::MAX)),
            ],
        )
    };
    let mut engine = engine_with(vec![stretch("Long"), stretch("Longer")]);
    let mut ctx = EvalContext::new(0, 5);
    let report = engine.on_round_prepare(&mut ctx, false, &mut DetachedHost);
    assert_eq!(report.fired, vec!["Long".to_string(), "Longer".to_string()]);
    assert_eq!(report.diagnostics.len(), 1);
    assert_eq!(engine.prepare_applied(), 0);
}
