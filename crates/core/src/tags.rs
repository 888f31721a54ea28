use crate::{Choice, Outcome, Side};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Moment of a round at which a rule may fire. Doubles as the Timing tag kind.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Phase {
    RoundPrepare,
    RoundStart,
    TurnStart,
    TurnSettlement,
    RoundEnd,
}

impl Phase {
    pub const ALL: [Self; 5] = [
        Self::RoundPrepare,
        Self::RoundStart,
        Self::TurnStart,
        Self::TurnSettlement,
        Self::RoundEnd,
    ];

    pub fn from_keyword(value: &str) -> Option<Self> {
        match keyword(value).as_str() {
            "roundprepare" | "prepare" => Some(Self::RoundPrepare),
            "roundstart" => Some(Self::RoundStart),
            "turnstart" => Some(Self::TurnStart),
            "turnsettlement" | "settlement" => Some(Self::TurnSettlement),
            "roundend" => Some(Self::RoundEnd),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::RoundPrepare => "RoundPrepare",
            Self::RoundStart => "RoundStart",
            Self::TurnStart => "TurnStart",
            Self::TurnSettlement => "TurnSettlement",
            Self::RoundEnd => "RoundEnd",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TagRole {
    Timing,
    Condition,
    Effect,
}

impl TagRole {
    pub fn from_keyword(value: &str) -> Option<Self> {
        match keyword(value).as_str() {
            "timing" => Some(Self::Timing),
            "condition" => Some(Self::Condition),
            "effect" => Some(Self::Effect),
            _ => None,
        }
    }
}

impl fmt::Display for TagRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timing => f.write_str("Timing"),
            Self::Condition => f.write_str("Condition"),
            Self::Effect => f.write_str("Effect"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ConditionKind {
    OutcomeEquals,
    PlayerChoiceEquals,
    PlayedAtLeastCount,
    ConsecutiveOutcomeWithChoiceEquals,
    ConsecutiveDrawWithChoiceEquals,
    IsLastTurn,
    PlayerHandHasMoreOfChoiceThanOpponent,
    TurnIndexEquals,
    RerollCountEquals,
    PlayerHandAtLeastCountOfChoice,
    ChoiceUsedOnTurnIndex,
    WinWithChoiceAtLeastCount,
    WinsOnlyWithChoice,
}

impl ConditionKind {
    /// Accepts current names and the legacy authoring names.
    pub fn from_keyword(value: &str) -> Option<Self> {
        match keyword(value).as_str() {
            "outcomeequals" | "outcomeis" => Some(Self::OutcomeEquals),
            "playerchoiceequals" | "playerchoiceis" => Some(Self::PlayerChoiceEquals),
            "playedatleastcount" => Some(Self::PlayedAtLeastCount),
            "consecutiveoutcomewithchoiceequals" | "consecutiveoutcomewithchoiceis" => {
                Some(Self::ConsecutiveOutcomeWithChoiceEquals)
            }
            "consecutivedrawwithchoiceequals" | "consecutivedrawwithchoiceis" => {
                Some(Self::ConsecutiveDrawWithChoiceEquals)
            }
            "islastturn" => Some(Self::IsLastTurn),
            "playerhandhasmoreofchoicethanopponent"
            | "playerhasmoreofchoicethanopponent"
            | "playerhasmoreofchoicethanai" => Some(Self::PlayerHandHasMoreOfChoiceThanOpponent),
            "turnindexequals" | "turnindexis" => Some(Self::TurnIndexEquals),
            "rerollcountequals" | "rerollusedequals" => Some(Self::RerollCountEquals),
            "playerhandatleastcountofchoice" | "playerhasatleastcountinhand" => {
                Some(Self::PlayerHandAtLeastCountOfChoice)
            }
            "choiceusedonturnindex" => Some(Self::ChoiceUsedOnTurnIndex),
            "winwithchoiceatleastcount" => Some(Self::WinWithChoiceAtLeastCount),
            "winsonlywithchoice" => Some(Self::WinsOnlyWithChoice),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum EffectKind {
    AddScoreDelta,
    ShowInfo,
    ForceOpponentDrawFromFront,
    FinalScoreMultiplier,
    FinalTotalMultiplier,
    ReplaceOpponentRandomCardsToChoice,
    RevealNextOpponentCard,
    RevealOpponentFirstAndLast,
    ModifyPlannedTurnsDelta,
    AddCardsToPlayerHand,
    AddCardsToOpponentHand,
    AddRandomCardsToPlayerHand,
    AddRandomCardsToOpponentHand,
    AddScorePerHandCountOfChoice,
}

impl EffectKind {
    /// Accepts current names and the legacy authoring names.
    pub fn from_keyword(value: &str) -> Option<Self> {
        match keyword(value).as_str() {
            "addscoredelta" => Some(Self::AddScoreDelta),
            "showinfo" => Some(Self::ShowInfo),
            "forceopponentdrawfromfront" | "forceaidrawfromfront" => {
                Some(Self::ForceOpponentDrawFromFront)
            }
            "finalscoremultiplier" => Some(Self::FinalScoreMultiplier),
            "finaltotalmultiplier" => Some(Self::FinalTotalMultiplier),
            "replaceopponentrandomcardstochoice" | "replaceairandomcardstochoice" => {
                Some(Self::ReplaceOpponentRandomCardsToChoice)
            }
            "revealnextopponentcard" | "revealnextaicard" => Some(Self::RevealNextOpponentCard),
            "revealopponentfirstandlast" | "scout" => Some(Self::RevealOpponentFirstAndLast),
            "modifyplannedturnsdelta" | "modifyturnstoplaydelta" => {
                Some(Self::ModifyPlannedTurnsDelta)
            }
            "addcardstoplayerhand" => Some(Self::AddCardsToPlayerHand),
            "addcardstoopponenthand" | "addcardstoaihand" => Some(Self::AddCardsToOpponentHand),
            "addrandomcardstoplayerhand" => Some(Self::AddRandomCardsToPlayerHand),
            "addrandomcardstoopponenthand" | "addrandomcardstoaihand" => {
                Some(Self::AddRandomCardsToOpponentHand)
            }
            "addscoreperhandcountofchoice" | "addscoreperplayerhandcount" => {
                Some(Self::AddScorePerHandCountOfChoice)
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum Condition {
    OutcomeEquals(Outcome),
    PlayerChoiceEquals(Choice),
    PlayedAtLeastCount { choice: Choice, count: u32 },
    /// The last `count` turns of the paired history all equal `(choice, outcome)`.
    ConsecutiveOutcomeWithChoice { outcome: Outcome, choice: Choice, count: u32 },
    IsLastTurn(bool),
    PlayerHandHasMoreThanOpponent(Choice),
    TurnIndexEquals(u32),
    RerollCountEquals(u32),
    PlayerHandAtLeast { choice: Choice, count: u32 },
    /// `turn` is 1-based.
    ChoiceUsedOnTurn { choice: Choice, turn: u32 },
    WinWithChoiceAtLeast { choice: Choice, count: u32 },
    WinsOnlyWithChoice(Choice),
}

impl Condition {
    pub fn kind(&self) -> ConditionKind {
        match self {
            Self::OutcomeEquals(_) => ConditionKind::OutcomeEquals,
            Self::PlayerChoiceEquals(_) => ConditionKind::PlayerChoiceEquals,
            Self::PlayedAtLeastCount { .. } => ConditionKind::PlayedAtLeastCount,
            Self::ConsecutiveOutcomeWithChoice { .. } => {
                ConditionKind::ConsecutiveOutcomeWithChoiceEquals
            }
            Self::IsLastTurn(_) => ConditionKind::IsLastTurn,
            Self::PlayerHandHasMoreThanOpponent(_) => {
                ConditionKind::PlayerHandHasMoreOfChoiceThanOpponent
            }
            Self::TurnIndexEquals(_) => ConditionKind::TurnIndexEquals,
            Self::RerollCountEquals(_) => ConditionKind::RerollCountEquals,
            Self::PlayerHandAtLeast { .. } => ConditionKind::PlayerHandAtLeastCountOfChoice,
            Self::ChoiceUsedOnTurn { .. } => ConditionKind::ChoiceUsedOnTurnIndex,
            Self::WinWithChoiceAtLeast { .. } => ConditionKind::WinWithChoiceAtLeastCount,
            Self::WinsOnlyWithChoice(_) => ConditionKind::WinsOnlyWithChoice,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum Effect {
    AddScore(i64),
    /// `None` shows a default line naming the rule.
    ShowInfo(Option<String>),
    ForceOpponentDrawFromFront(bool),
    FinalScoreMultiplier(i64),
    FinalTotalMultiplier(i64),
    ReplaceOpponentCards { choice: Choice, count: u32 },
    RevealNextOpponentCard,
    RevealOpponentFirstAndLast,
    ModifyPlannedTurns(i64),
    AddCardsToHand { side: Side, choice: Choice, count: u32 },
    AddRandomCardsToHand { side: Side, count: u32 },
    AddScorePerHandCount { choice: Choice, per_card: i64 },
}

impl Effect {
    pub fn kind(&self) -> EffectKind {
        match self {
            Self::AddScore(_) => EffectKind::AddScoreDelta,
            Self::ShowInfo(_) => EffectKind::ShowInfo,
            Self::ForceOpponentDrawFromFront(_) => EffectKind::ForceOpponentDrawFromFront,
            Self::FinalScoreMultiplier(_) => EffectKind::FinalScoreMultiplier,
            Self::FinalTotalMultiplier(_) => EffectKind::FinalTotalMultiplier,
            Self::ReplaceOpponentCards { .. } => EffectKind::ReplaceOpponentRandomCardsToChoice,
            Self::RevealNextOpponentCard => EffectKind::RevealNextOpponentCard,
            Self::RevealOpponentFirstAndLast => EffectKind::RevealOpponentFirstAndLast,
            Self::ModifyPlannedTurns(_) => EffectKind::ModifyPlannedTurnsDelta,
            Self::AddCardsToHand {
                side: Side::Player, ..
            } => EffectKind::AddCardsToPlayerHand,
            Self::AddCardsToHand {
                side: Side::Opponent,
                ..
            } => EffectKind::AddCardsToOpponentHand,
            Self::AddRandomCardsToHand {
                side: Side::Player, ..
            } => EffectKind::AddRandomCardsToPlayerHand,
            Self::AddRandomCardsToHand {
                side: Side::Opponent,
                ..
            } => EffectKind::AddRandomCardsToOpponentHand,
            Self::AddScorePerHandCount { .. } => EffectKind::AddScorePerHandCountOfChoice,
        }
    }
}

/// Optional restriction of an effect to the current turn's outcome and/or choice.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct EffectFilter {
    #[serde(default)]
    pub outcome: Option<Outcome>,
    #[serde(default)]
    pub choice: Option<Choice>,
}

impl EffectFilter {
    pub fn matches(&self, outcome: Option<Outcome>, choice: Option<Choice>) -> bool {
        if let Some(wanted) = self.outcome {
            if outcome != Some(wanted) {
                return false;
            }
        }
        if let Some(wanted) = self.choice {
            if choice != Some(wanted) {
                return false;
            }
        }
        true
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EffectTag {
    pub effect: Effect,
    #[serde(default)]
    pub filter: EffectFilter,
}

impl EffectTag {
    pub fn new(effect: Effect) -> Self {
        Self {
            effect,
            filter: EffectFilter::default(),
        }
    }

    pub fn when(mut self, outcome: Outcome, choice: Choice) -> Self {
        self.filter = EffectFilter {
            outcome: Some(outcome),
            choice: Some(choice),
        };
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
pub enum TagProblem {
    #[error("kind is None")]
    MissingKind,
    #[error("unknown kind `{0}`")]
    UnknownKind(String),
    #[error("unknown category `{0}`")]
    UnknownCategory(String),
    #[error("{kind} requires {parameter}")]
    MissingParameter { kind: String, parameter: String },
    #[error("{kind} has invalid {parameter} `{value}`")]
    InvalidParameter {
        kind: String,
        parameter: String,
        value: String,
    },
}

/// A tag that could not be turned into a typed Timing/Condition/Effect.
/// Kept in place so the rule keeps its shape; the interpreter treats it as a no-op
/// effect or a failing condition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvalidTag {
    pub role: Option<TagRole>,
    pub problem: TagProblem,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tag {
    Timing(Phase),
    Condition(Condition),
    Effect(EffectTag),
    Invalid(InvalidTag),
}

impl Tag {
    pub fn effect(effect: Effect) -> Self {
        Self::Effect(EffectTag::new(effect))
    }

    pub fn invalid(role: TagRole, problem: TagProblem) -> Self {
        Self::Invalid(InvalidTag {
            role: Some(role),
            problem,
        })
    }

    pub fn role(&self) -> Option<TagRole> {
        match self {
            Self::Timing(_) => Some(TagRole::Timing),
            Self::Condition(_) => Some(TagRole::Condition),
            Self::Effect(_) => Some(TagRole::Effect),
            Self::Invalid(tag) => tag.role,
        }
    }
}

pub(crate) fn keyword(value: &str) -> String {
    value
        .trim()
        .chars()
        .filter(|ch| !matches!(ch, '_' | '-' | ' '))
        .flat_map(char::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_keywords_resolve_to_current_kinds() {
        assert_eq!(
            ConditionKind::from_keyword("TurnIndexIs"),
            Some(ConditionKind::TurnIndexEquals)
        );
        assert_eq!(
            ConditionKind::from_keyword("PlayerHasMoreOfChoiceThanAI"),
            Some(ConditionKind::PlayerHandHasMoreOfChoiceThanOpponent)
        );
        assert_eq!(
            EffectKind::from_keyword("ForceAIDrawFromFront"),
            Some(EffectKind::ForceOpponentDrawFromFront)
        );
        assert_eq!(
            EffectKind::from_keyword("modify_turns_to_play_delta"),
            Some(EffectKind::ModifyPlannedTurnsDelta)
        );
        assert_eq!(Phase::from_keyword("Turn_Settlement"), Some(Phase::TurnSettlement));
        assert_eq!(EffectKind::from_keyword("Teleport"), None);
    }

    #[test]
    fn effect_kind_tracks_hand_side() {
        let effect = Effect::AddRandomCardsToHand {
            side: Side::Opponent,
            count: 1,
        };
        assert_eq!(effect.kind(), EffectKind::AddRandomCardsToOpponentHand);
    }

    #[test]
    fn filter_requires_every_named_value() {
        let filter = EffectFilter {
            outcome: Some(Outcome::Win),
            choice: Some(Choice::Scissors),
        };
        assert!(filter.matches(Some(Outcome::Win), Some(Choice::Scissors)));
        assert!(!filter.matches(Some(Outcome::Win), Some(Choice::Rock)));
        assert!(!filter.matches(None, Some(Choice::Scissors)));
        assert!(EffectFilter::default().matches(None, None));
    }
}
