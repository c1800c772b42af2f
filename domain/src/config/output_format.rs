//! Output format value object

use serde::{Deserialize, Serialize};

/// How a superposition result is rendered
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Answer, clusters, conflicts and the hypothesis trace
    Full,
    /// Only the consensus answer (default)
    #[default]
    Answer,
    /// JSON output
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "full" => Ok(OutputFormat::Full),
            "answer" => Ok(OutputFormat::Answer),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown output format: {}. Valid: full, answer, json", s)),
        }
    }
}
