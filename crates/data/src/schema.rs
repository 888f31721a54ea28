use serde::{Deserialize, Serialize};

pub use rpsjoker_core::{RoundConfig, Rule, RuleLibrary};

/// One tag in the flat authoring shape: every kind and parameter is optional
/// and kinds are plain strings so unknown names survive deserialization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawTag {
    pub category: Option<String>,
    pub timing_type: Option<String>,
    pub condition_type: Option<String>,
    pub effect_type: Option<String>,
    pub outcome_param: Option<String>,
    pub choice_param: Option<String>,
    pub int_value: Option<i64>,
    pub string_value: Option<String>,
    pub filter_by_outcome: bool,
    pub filter_by_choice: bool,
}

impl RawTag {
    pub fn timing(kind: &str) -> Self {
        Self {
            category: Some("Timing".to_string()),
            timing_type: Some(kind.to_string()),
            ..Self::default()
        }
    }

    pub fn condition(kind: &str) -> Self {
        Self {
            category: Some("Condition".to_string()),
            condition_type: Some(kind.to_string()),
            ..Self::default()
        }
    }

    pub fn effect(kind: &str) -> Self {
        Self {
            category: Some("Effect".to_string()),
            effect_type: Some(kind.to_string()),
            ..Self::default()
        }
    }

    pub fn with_choice(mut self, choice: &str) -> Self {
        self.choice_param = Some(choice.to_string());
        self
    }

    pub fn with_outcome(mut self, outcome: &str) -> Self {
        self.outcome_param = Some(outcome.to_string());
        self
    }

    pub fn with_int(mut self, value: i64) -> Self {
        self.int_value = Some(value);
        self
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawRule {
    #[serde(alias = "jokerName")]
    pub name: String,
    pub description: String,
    pub archetypes: Vec<String>,
    pub weight: Option<u32>,
    pub tags: Vec<RawTag>,
}

/// A rule file holds either one rule or a list of rules.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RuleFile {
    Many(Vec<RawRule>),
    One(RawRule),
}

impl RuleFile {
    pub fn into_rules(self) -> Vec<RawRule> {
        match self {
            Self::Many(rules) => rules,
            Self::One(rule) => vec![rule],
        }
    }
}
