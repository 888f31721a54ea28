use crate::schema::{RawRule, RawTag};
use rpsjoker_core::{
    Archetype, Choice, Condition, ConditionKind, Effect, EffectFilter, EffectKind, EffectTag,
    InvalidTag, Outcome, Phase, Rule, Side, Tag, TagProblem, TagRole,
};

const OUTCOME_PARAM: &str = "outcomeParam";
const CHOICE_PARAM: &str = "choiceParam";
const INT_VALUE: &str = "intValue";

/// Converts one authored tag. Never fails: anything that cannot be typed
/// becomes `Tag::Invalid` carrying the reason.
pub fn convert_tag(raw: &RawTag) -> Tag {
    let role = match resolve_role(raw) {
        Ok(role) => role,
        Err(problem) => return Tag::Invalid(InvalidTag { role: None, problem }),
    };
    let converted = match role {
        TagRole::Timing => timing(raw),
        TagRole::Condition => condition(raw),
        TagRole::Effect => effect(raw),
    };
    converted.unwrap_or_else(|problem| Tag::invalid(role, problem))
}

/// Converts an authored rule. Returned warnings cover metadata only; tag
/// problems stay inside the rule as invalid tags.
pub fn convert_rule(raw: &RawRule) -> (Rule, Vec<String>) {
    let mut warnings = Vec::new();
    let mut archetypes = Vec::new();
    for name in &raw.archetypes {
        match Archetype::from_keyword(name) {
            Some(archetype) if !archetypes.contains(&archetype) => archetypes.push(archetype),
            Some(_) => {}
            None => warnings.push(format!("{}: unknown archetype `{name}`", raw.name)),
        }
    }
    let mut rule = Rule::new(raw.name.trim(), raw.tags.iter().map(convert_tag).collect());
    rule.description = raw.description.clone();
    rule.archetypes = archetypes;
    if let Some(weight) = raw.weight {
        rule.weight = weight;
    }
    (rule, warnings)
}

fn resolve_role(raw: &RawTag) -> Result<TagRole, TagProblem> {
    if let Some(category) = raw.category.as_deref().filter(|value| !is_none(value)) {
        return TagRole::from_keyword(category)
            .ok_or_else(|| TagProblem::UnknownCategory(category.to_string()));
    }
    // older files leave the category out and only set one kind field
    if present(&raw.timing_type) {
        Ok(TagRole::Timing)
    } else if present(&raw.condition_type) {
        Ok(TagRole::Condition)
    } else if present(&raw.effect_type) {
        Ok(TagRole::Effect)
    } else {
        Err(TagProblem::MissingKind)
    }
}

fn timing(raw: &RawTag) -> Result<Tag, TagProblem> {
    let kind = kind_name(&raw.timing_type)?;
    Phase::from_keyword(kind)
        .map(Tag::Timing)
        .ok_or_else(|| TagProblem::UnknownKind(kind.to_string()))
}

fn condition(raw: &RawTag) -> Result<Tag, TagProblem> {
    let name = kind_name(&raw.condition_type)?;
    let kind = ConditionKind::from_keyword(name)
        .ok_or_else(|| TagProblem::UnknownKind(name.to_string()))?;
    let params = Params::new(raw, format!("{kind:?}"));
    let condition = match kind {
        ConditionKind::OutcomeEquals => Condition::OutcomeEquals(params.outcome()?),
        ConditionKind::PlayerChoiceEquals => Condition::PlayerChoiceEquals(params.choice()?),
        ConditionKind::PlayedAtLeastCount => Condition::PlayedAtLeastCount {
            choice: params.choice()?,
            count: params.count()?,
        },
        ConditionKind::ConsecutiveOutcomeWithChoiceEquals => {
            Condition::ConsecutiveOutcomeWithChoice {
                outcome: params.outcome()?,
                choice: params.choice()?,
                count: params.streak(),
            }
        }
        ConditionKind::ConsecutiveDrawWithChoiceEquals => Condition::ConsecutiveOutcomeWithChoice {
            outcome: Outcome::Draw,
            choice: params.choice()?,
            count: params.streak(),
        },
        ConditionKind::IsLastTurn => Condition::IsLastTurn(params.flag()),
        ConditionKind::PlayerHandHasMoreOfChoiceThanOpponent => {
            Condition::PlayerHandHasMoreThanOpponent(params.choice()?)
        }
        ConditionKind::TurnIndexEquals => Condition::TurnIndexEquals(params.count()?),
        ConditionKind::RerollCountEquals => Condition::RerollCountEquals(params.count()?),
        ConditionKind::PlayerHandAtLeastCountOfChoice => Condition::PlayerHandAtLeast {
            choice: params.choice()?,
            count: params.count()?,
        },
        ConditionKind::ChoiceUsedOnTurnIndex => Condition::ChoiceUsedOnTurn {
            choice: params.choice()?,
            turn: params.turn()?,
        },
        ConditionKind::WinWithChoiceAtLeastCount => Condition::WinWithChoiceAtLeast {
            choice: params.choice()?,
            count: params.count()?,
        },
        ConditionKind::WinsOnlyWithChoice => Condition::WinsOnlyWithChoice(params.choice()?),
    };
    Ok(Tag::Condition(condition))
}

fn effect(raw: &RawTag) -> Result<Tag, TagProblem> {
    let name = kind_name(&raw.effect_type)?;
    let kind =
        EffectKind::from_keyword(name).ok_or_else(|| TagProblem::UnknownKind(name.to_string()))?;
    let params = Params::new(raw, format!("{kind:?}"));
    let effect = match kind {
        EffectKind::AddScoreDelta => Effect::AddScore(params.int()?),
        EffectKind::ShowInfo => Effect::ShowInfo(
            raw.string_value
                .as_deref()
                .map(str::trim)
                .filter(|text| !text.is_empty())
                .map(str::to_string),
        ),
        EffectKind::ForceOpponentDrawFromFront => Effect::ForceOpponentDrawFromFront(params.flag()),
        EffectKind::FinalScoreMultiplier => Effect::FinalScoreMultiplier(params.int()?),
        EffectKind::FinalTotalMultiplier => Effect::FinalTotalMultiplier(params.int()?),
        EffectKind::ReplaceOpponentRandomCardsToChoice => Effect::ReplaceOpponentCards {
            choice: params.choice()?,
            count: params.count()?,
        },
        EffectKind::RevealNextOpponentCard => Effect::RevealNextOpponentCard,
        EffectKind::RevealOpponentFirstAndLast => Effect::RevealOpponentFirstAndLast,
        EffectKind::ModifyPlannedTurnsDelta => Effect::ModifyPlannedTurns(params.int()?),
        EffectKind::AddCardsToPlayerHand => Effect::AddCardsToHand {
            side: Side::Player,
            choice: params.choice()?,
            count: params.count()?,
        },
        EffectKind::AddCardsToOpponentHand => Effect::AddCardsToHand {
            side: Side::Opponent,
            choice: params.choice()?,
            count: params.count()?,
        },
        EffectKind::AddRandomCardsToPlayerHand => Effect::AddRandomCardsToHand {
            side: Side::Player,
            count: params.count()?,
        },
        EffectKind::AddRandomCardsToOpponentHand => Effect::AddRandomCardsToHand {
            side: Side::Opponent,
            count: params.count()?,
        },
        EffectKind::AddScorePerHandCountOfChoice => Effect::AddScorePerHandCount {
            choice: params.choice()?,
            per_card: params.int()?,
        },
    };
    let mut filter = EffectFilter::default();
    if raw.filter_by_outcome {
        filter.outcome = Some(params.outcome()?);
    }
    if raw.filter_by_choice {
        filter.choice = Some(params.choice()?);
    }
    Ok(Tag::Effect(EffectTag { effect, filter }))
}

fn kind_name(value: &Option<String>) -> Result<&str, TagProblem> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !is_none(value))
        .ok_or(TagProblem::MissingKind)
}

fn present(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|value| !is_none(value))
}

/// Authoring tools write `"None"` for an unset enum value.
fn is_none(value: &str) -> bool {
    let value = value.trim();
    value.is_empty() || value.eq_ignore_ascii_case("none")
}

struct Params<'a> {
    raw: &'a RawTag,
    kind: String,
}

impl<'a> Params<'a> {
    fn new(raw: &'a RawTag, kind: String) -> Self {
        Self { raw, kind }
    }

    fn missing(&self, parameter: &str) -> TagProblem {
        TagProblem::MissingParameter {
            kind: self.kind.clone(),
            parameter: parameter.to_string(),
        }
    }

    fn invalid(&self, parameter: &str, value: impl ToString) -> TagProblem {
        TagProblem::InvalidParameter {
            kind: self.kind.clone(),
            parameter: parameter.to_string(),
            value: value.to_string(),
        }
    }

    fn choice(&self) -> Result<Choice, TagProblem> {
        let value = self
            .raw
            .choice_param
            .as_deref()
            .filter(|value| !is_none(value))
            .ok_or_else(|| self.missing(CHOICE_PARAM))?;
        Choice::from_keyword(value).ok_or_else(|| self.invalid(CHOICE_PARAM, value))
    }

    fn outcome(&self) -> Result<Outcome, TagProblem> {
        let value = self
            .raw
            .outcome_param
            .as_deref()
            .filter(|value| !is_none(value))
            .ok_or_else(|| self.missing(OUTCOME_PARAM))?;
        Outcome::from_keyword(value).ok_or_else(|| self.invalid(OUTCOME_PARAM, value))
    }

    fn int(&self) -> Result<i64, TagProblem> {
        self.raw.int_value.ok_or_else(|| self.missing(INT_VALUE))
    }

    fn count(&self) -> Result<u32, TagProblem> {
        let value = self.int()?;
        u32::try_from(value).map_err(|_| self.invalid(INT_VALUE, value))
    }

    fn turn(&self) -> Result<u32, TagProblem> {
        let value = self.int()?;
        match u32::try_from(value) {
            Ok(turn) if turn >= 1 => Ok(turn),
            _ => Err(self.invalid(INT_VALUE, value)),
        }
    }

    /// Streak lengths default to 1 and never go below it.
    fn streak(&self) -> u32 {
        self.raw
            .int_value
            .map_or(1, |value| value.clamp(1, i64::from(u32::MAX)) as u32)
    }

    /// Boolean parameters are authored as integers; absent means set.
    fn flag(&self) -> bool {
        self.raw.int_value.map_or(true, |value| value != 0)
    }
}
