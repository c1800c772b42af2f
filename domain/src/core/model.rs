//! Model value object representing an LLM model identifier

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// LLM model identifier (Value Object)
///
/// Known models get a variant so provider routing can reason about them;
/// anything else is carried verbatim as [`Model::Custom`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Model {
    // OpenAI models
    Gpt4o,
    Gpt4oMini,
    Gpt41,
    Gpt41Mini,
    // Anthropic models
    ClaudeSonnet45,
    ClaudeHaiku45,
    ClaudeOpus45,
    // Custom
    Custom(String),
}

impl Model {
    /// Get the string identifier for this model
    pub fn as_str(&self) -> &str {
        match self {
            Model::Gpt4o => "gpt-4o",
            Model::Gpt4oMini => "gpt-4o-mini",
            Model::Gpt41 => "gpt-4.1",
            Model::Gpt41Mini => "gpt-4.1-mini",
            Model::ClaudeSonnet45 => "claude-sonnet-4-5",
            Model::ClaudeHaiku45 => "claude-haiku-4-5",
            Model::ClaudeOpus45 => "claude-opus-4-5",
            Model::Custom(s) => s,
        }
    }

    /// Check if this is a Claude model
    pub fn is_claude(&self) -> bool {
        match self {
            Model::ClaudeSonnet45 | Model::ClaudeHaiku45 | Model::ClaudeOpus45 => true,
            Model::Custom(s) => s.starts_with("claude"),
            _ => false,
        }
    }

    /// Check if this is a GPT model
    pub fn is_gpt(&self) -> bool {
        match self {
            Model::Gpt4o | Model::Gpt4oMini | Model::Gpt41 | Model::Gpt41Mini => true,
            Model::Custom(s) => s.starts_with("gpt"),
            _ => false,
        }
    }
}

impl Default for Model {
    /// Returns the default model (gpt-4o-mini)
    fn default() -> Self {
        Model::Gpt4oMini
    }
}

impl std::fmt::Display for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<&str> for Model {
    fn from(s: &str) -> Self {
        match s {
            "gpt-4o" => Model::Gpt4o,
            "gpt-4o-mini" => Model::Gpt4oMini,
            "gpt-4.1" => Model::Gpt41,
            "gpt-4.1-mini" => Model::Gpt41Mini,
            "claude-sonnet-4-5" => Model::ClaudeSonnet45,
            "claude-haiku-4-5" => Model::ClaudeHaiku45,
            "claude-opus-4-5" => Model::ClaudeOpus45,
            other => Model::Custom(other.to_string()),
        }
    }
}

impl std::str::FromStr for Model {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Model::from(s))
    }
}

impl Serialize for Model {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Model {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Model::from(s.as_str()))
    }
}
