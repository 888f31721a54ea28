use crate::{TagProblem, TagRole};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
pub enum Problem {
    #[error("{0}")]
    Tag(#[from] TagProblem),
    #[error("host cannot {0}")]
    MissingCollaborator(String),
    #[error("no tags defined")]
    NoTags,
    #[error("no timing tag")]
    NoTiming,
}

/// Non-fatal finding recorded while validating or evaluating a rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub rule: String,
    pub role: Option<TagRole>,
    pub problem: Problem,
}

impl Diagnostic {
    pub fn new(rule: &str, role: Option<TagRole>, problem: impl Into<Problem>) -> Self {
        Self {
            rule: rule.to_string(),
            role,
            problem: problem.into(),
        }
    }

    pub fn missing_host(rule: &str, role: TagRole, operation: &str) -> Self {
        Self::new(
            rule,
            Some(role),
            Problem::MissingCollaborator(operation.to_string()),
        )
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.role {
            Some(role) => write!(f, "{}: {} {}", self.rule, role, self.problem),
            None => write!(f, "{}: {}", self.rule, self.problem),
        }
    }
}
