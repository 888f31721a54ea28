use crate::{Phase, Tag};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Archetype {
    Anchor,
    Payoff,
    Catalyst,
    Utility,
}

impl Archetype {
    pub fn from_keyword(value: &str) -> Option<Self> {
        match crate::tags::keyword(value).as_str() {
            "anchor" => Some(Self::Anchor),
            "payoff" => Some(Self::Payoff),
            "catalyst" => Some(Self::Catalyst),
            "utility" => Some(Self::Utility),
            _ => None,
        }
    }
}

/// A named, ordered list of tags (a joker). Immutable once loaded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Rule {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub archetypes: Vec<Archetype>,
    #[serde(default = "default_weight")]
    pub weight: u32,
    pub tags: Vec<Tag>,
}

fn default_weight() -> u32 {
    1
}

impl Rule {
    pub fn new(name: impl Into<String>, tags: Vec<Tag>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            archetypes: Vec::new(),
            weight: default_weight(),
            tags,
        }
    }

    pub fn fires_in(&self, phase: Phase) -> bool {
        self.tags
            .iter()
            .any(|tag| matches!(tag, Tag::Timing(timing) if *timing == phase))
    }
}

/// Content registry that owns every loaded rule.
#[derive(Debug, Clone, Default)]
pub struct RuleLibrary {
    pub rules: Vec<Rule>,
}

impl RuleLibrary {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// Exact name first, then a case and underscore insensitive match.
    pub fn by_name(&self, name: &str) -> Option<&Rule> {
        if let Some(rule) = self.rules.iter().find(|rule| rule.name == name) {
            return Some(rule);
        }
        let wanted = crate::tags::keyword(name);
        self.rules
            .iter()
            .find(|rule| crate::tags::keyword(&rule.name) == wanted)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.rules.iter().map(|rule| rule.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Toggle {
    Enabled,
    Disabled,
}

/// Enabled rules in activation order. Order is evaluation priority.
#[derive(Debug, Clone, Default)]
pub struct ActiveRuleSet {
    order: Vec<Rule>,
}

impl ActiveRuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends the rule unless a rule with the same name is already enabled.
    pub fn enable(&mut self, rule: Rule) -> bool {
        if self.contains(&rule.name) {
            return false;
        }
        self.order.push(rule);
        true
    }

    pub fn disable(&mut self, name: &str) -> bool {
        let before = self.order.len();
        self.order.retain(|rule| rule.name != name);
        self.order.len() != before
    }

    pub fn toggle(&mut self, rule: Rule) -> Toggle {
        if self.disable(&rule.name) {
            Toggle::Disabled
        } else {
            self.order.push(rule);
            Toggle::Enabled
        }
    }

    pub fn clear(&mut self) {
        self.order.clear();
    }

    pub fn contains(&self, name: &str) -> bool {
        self.order.iter().any(|rule| rule.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rule> + '_ {
        self.order.iter()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Most recently enabled rule.
    pub fn latest(&self) -> Option<&Rule> {
        self.order.last()
    }

    /// `"A -> B -> C"`, or `"None"` when empty.
    pub fn pipeline_description(&self) -> String {
        if self.order.is_empty() {
            return "None".to_string();
        }
        self.order
            .iter()
            .map(|rule| rule.name.as_str())
            .collect::<Vec<_>>()
            .join(" -> ")
    }
}
