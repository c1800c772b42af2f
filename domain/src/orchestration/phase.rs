//! Phases of a superposition run.

use serde::{Deserialize, Serialize};

/// Phase of a superposition run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Hypotheses are dispatched and resolved concurrently
    Exploration,
    /// Resolved hypotheses are reduced to one answer
    Consensus,
}

impl Phase {
    pub fn as_str(&self) -> &str {
        match self {
            Phase::Exploration => "exploration",
            Phase::Consensus => "consensus",
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            Phase::Exploration => "Exploration",
            Phase::Consensus => "Consensus",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}
