//! Capability entities: named reasoning strategies used by the explorer.

use serde::{Deserialize, Serialize};

/// Unique identifier of a capability (e.g. `"analyst"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CapabilityId(String);

impl CapabilityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CapabilityId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for CapabilityId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl std::fmt::Display for CapabilityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Placeholder substituted with the query text in custom instructions.
pub const QUERY_PLACEHOLDER: &str = "{query}";

/// The reasoning strategy behind a capability.
///
/// A closed set: built-in strategies plus a `Custom` variant whose prompts are
/// plain strings. Templates are data, never code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CapabilityTemplate {
    /// Balanced expert answer
    Analyst,
    /// Explicit step-by-step derivation before answering
    StepByStep,
    /// Looks for flaws in the obvious answer first
    Skeptic,
    /// Rebuilds the answer from basic principles
    FirstPrinciples,
    /// User-defined role
    Custom { system: String, instruction: String },
}

impl CapabilityTemplate {
    /// System prompt establishing the role.
    pub fn system_prompt(&self) -> &str {
        match self {
            CapabilityTemplate::Analyst => {
                "You are a careful analyst. Answer accurately and concisely, \
                 stating the key reasoning behind your conclusion."
            }
            CapabilityTemplate::StepByStep => {
                "You solve problems methodically. Work through the problem step by step, \
                 then state the final answer on its own line."
            }
            CapabilityTemplate::Skeptic => {
                "You are a skeptical reviewer. Question the obvious answer, look for \
                 hidden assumptions, and only then commit to the answer you can defend."
            }
            CapabilityTemplate::FirstPrinciples => {
                "You reason from first principles. Reduce the problem to fundamentals \
                 and rebuild the answer from them."
            }
            CapabilityTemplate::Custom { system, .. } => system,
        }
    }

    /// Render the task instruction for a query.
    pub fn render(&self, query: &str) -> String {
        match self {
            CapabilityTemplate::Analyst => format!("Answer the following question:\n\n{}", query),
            CapabilityTemplate::StepByStep => {
                format!("Solve the following step by step:\n\n{}", query)
            }
            CapabilityTemplate::Skeptic => format!(
                "Consider what a naive answer would get wrong, then answer:\n\n{}",
                query
            ),
            CapabilityTemplate::FirstPrinciples => format!(
                "Break the following down to first principles and answer it:\n\n{}",
                query
            ),
            CapabilityTemplate::Custom { instruction, .. } => {
                if instruction.contains(QUERY_PLACEHOLDER) {
                    instruction.replace(QUERY_PLACEHOLDER, query)
                } else {
                    format!("{}\n\n{}", instruction, query)
                }
            }
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            CapabilityTemplate::Analyst => "analyst",
            CapabilityTemplate::StepByStep => "step_by_step",
            CapabilityTemplate::Skeptic => "skeptic",
            CapabilityTemplate::FirstPrinciples => "first_principles",
            CapabilityTemplate::Custom { .. } => "custom",
        }
    }
}

/// A registered reasoning strategy (Entity)
///
/// `created_at_ms` and `registration_seq` are assigned by the registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Capability {
    pub id: CapabilityId,
    pub template: CapabilityTemplate,
    pub enabled: bool,
    /// Higher priority capabilities are selected first
    pub priority: u32,
    pub created_at_ms: u64,
    pub registration_seq: u64,
}

impl Capability {
    pub fn new(id: impl Into<CapabilityId>, template: CapabilityTemplate) -> Self {
        Self {
            id: id.into(),
            template,
            enabled: true,
            priority: 100,
            created_at_ms: 0,
            registration_seq: 0,
        }
    }

    pub fn with_priority(mut self, priority: u32) -> Self {
        self.priority = priority;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}

/// The default catalog registered when no configuration overrides it.
pub fn builtin_capabilities() -> Vec<Capability> {
    vec![
        Capability::new("analyst", CapabilityTemplate::Analyst).with_priority(100),
        Capability::new("step_by_step", CapabilityTemplate::StepByStep).with_priority(90),
        Capability::new("skeptic", CapabilityTemplate::Skeptic).with_priority(80),
        Capability::new("first_principles", CapabilityTemplate::FirstPrinciples).with_priority(70),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_custom_template_placeholder() {
        let template = CapabilityTemplate::Custom {
            system: "You are a historian.".to_string(),
            instruction: "From a historical view: {query}".to_string(),
        };
        assert_eq!(
            template.render("Why did Rome fall?"),
            "From a historical view: Why did Rome fall?"
        );
        assert_eq!(template.system_prompt(), "You are a historian.");
    }

    #[test]
    fn test_custom_template_without_placeholder_appends() {
        let template = CapabilityTemplate::Custom {
            system: String::new(),
            instruction: "Be brief.".to_string(),
        };
        assert_eq!(template.render("2+2?"), "Be brief.\n\n2+2?");
    }

    #[test]
    fn test_builtin_render_contains_query() {
        for capability in builtin_capabilities() {
            assert!(capability.template.render("QUESTION").contains("QUESTION"));
            assert!(!capability.template.system_prompt().is_empty());
        }
    }

    #[test]
    fn test_template_serde_tagged() {
        let json = serde_json::to_string(&CapabilityTemplate::Skeptic).unwrap();
        assert_eq!(json, r#"{"kind":"skeptic"}"#);
    }
}
