//! Output formatter trait

use superposition_application::SuperpositionOutput;
use superposition_domain::{OutputFormat, Query};

/// Trait for formatting superposition results
pub trait OutputFormatter {
    /// Format the complete result: answer, hypotheses, clusters and conflicts
    fn format(&self, query: &Query, output: &SuperpositionOutput) -> String;

    /// Format as JSON
    fn format_json(&self, query: &Query, output: &SuperpositionOutput) -> String;

    /// Format the consensus answer only
    fn format_answer_only(&self, output: &SuperpositionOutput) -> String;

    /// Dispatch on the requested format
    fn render(&self, format: OutputFormat, query: &Query, output: &SuperpositionOutput) -> String {
        match format {
            OutputFormat::Full => self.format(query, output),
            OutputFormat::Answer => self.format_answer_only(output),
            OutputFormat::Json => self.format_json(query, output),
        }
    }
}
