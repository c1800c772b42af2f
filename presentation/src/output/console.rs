//! Console output formatter for superposition results

use crate::output::formatter::OutputFormatter;
use colored::Colorize;
use serde::Serialize;
use superposition_application::{RunError, SuperpositionOutput};
use superposition_domain::{
    Capability, ConsensusResult, Hypothesis, HypothesisStatus, Query, Resolution,
};

/// Formats superposition results for console display
pub struct ConsoleFormatter;

/// Shape of `--output json`
#[derive(Serialize)]
struct JsonReport<'a> {
    query_id: String,
    query: &'a str,
    answer: &'a str,
    consensus: &'a ConsensusResult,
    hypotheses: &'a [Hypothesis],
    consensus_entry: u64,
    elapsed_ms: u64,
}

impl ConsoleFormatter {
    /// Format the complete result
    pub fn format(query: &Query, output: &SuperpositionOutput) -> String {
        let result = &output.result;
        let mut out = String::new();

        out.push_str(&Self::header("Superposition Results"));
        out.push('\n');
        out.push_str(&format!("{} {}\n", "Query:".cyan().bold(), query.text()));

        // Answer
        out.push_str(&Self::section_header("Consensus"));
        out.push_str(&format!("\n{}\n\n", result.content));
        out.push_str(&Self::summary_line(result));
        out.push('\n');

        // Hypotheses
        out.push_str(&Self::section_header("Hypotheses"));
        for hypothesis in &output.trace {
            out.push_str(&Self::hypothesis_block(hypothesis, result));
        }

        // Clusters
        out.push_str(&Self::section_header("Clusters"));
        for cluster in &result.clusters {
            let members = cluster
                .members
                .iter()
                .map(|h| h.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            let line = format!(
                "  {}: {} (mean confidence {:.2})",
                cluster.id, members, cluster.mean_confidence
            );
            if cluster.id == result.winning_cluster {
                out.push_str(&format!("{} {}\n", line.green(), "<- winner".green().bold()));
            } else {
                out.push_str(&format!("{}\n", line));
            }
        }

        // Conflicts (if any)
        if !result.conflicts.is_empty() {
            out.push_str(&Self::section_header("Conflicts"));
            for conflict in &result.conflicts {
                let resolution = match conflict.resolution {
                    Resolution::Kept { winner, by } => format!("kept {} ({})", winner, by),
                    Resolution::BothDiscarded => "both discarded".to_string(),
                };
                out.push_str(&format!(
                    "  {} ({}) vs {} ({}): {}\n",
                    conflict.left,
                    conflict.left_cluster,
                    conflict.right,
                    conflict.right_cluster,
                    resolution.yellow()
                ));
            }
        }

        out.push_str(&format!(
            "\n{} {}ms\n",
            "Elapsed:".dimmed(),
            output.elapsed.as_millis()
        ));
        out.push_str(&Self::footer());
        out
    }

    /// Format as JSON
    pub fn format_json(query: &Query, output: &SuperpositionOutput) -> String {
        let report = JsonReport {
            query_id: output.query_id.to_string(),
            query: query.text(),
            answer: &output.result.content,
            consensus: &output.result,
            hypotheses: &output.trace,
            consensus_entry: output.consensus_entry.seq(),
            elapsed_ms: output.elapsed.as_millis() as u64,
        };
        serde_json::to_string_pretty(&report).unwrap_or_else(|_| "{}".to_string())
    }

    /// Format the answer only (concise output)
    pub fn format_answer_only(output: &SuperpositionOutput) -> String {
        let mut out = output.result.content.clone();
        out.push('\n');
        if !output.result.quorum_reached {
            out.push_str(&format!(
                "{}\n",
                format!(
                    "(no quorum: {} of {} hypotheses agree)",
                    output.result.contributing.len(),
                    output.result.succeeded_count()
                )
                .yellow()
            ));
        }
        out
    }

    /// Format a failed run, including the per-hypothesis trace when present
    pub fn format_failure(err: &RunError) -> String {
        let mut out = format!("{} {}\n", "Error:".red().bold(), err);
        for hypothesis in err.trace() {
            out.push_str(&format!(
                "  {} {} [{}]: {}\n",
                "x".red(),
                hypothesis.id,
                hypothesis.capability_id,
                hypothesis.error.as_deref().unwrap_or(hypothesis.status.as_str())
            ));
        }
        out
    }

    /// Format the capability catalog for `--list-capabilities`
    pub fn format_capabilities(capabilities: &[Capability]) -> String {
        let mut out = Self::section_header("Capabilities");
        for capability in capabilities {
            let state = if capability.enabled {
                "enabled".green()
            } else {
                "disabled".dimmed()
            };
            out.push_str(&format!(
                "  {:<20} {:<16} priority {:<5} {}\n",
                capability.id.as_str().bold(),
                capability.template.kind(),
                capability.priority,
                state
            ));
        }
        out
    }

    fn summary_line(result: &ConsensusResult) -> String {
        let quorum = if result.quorum_reached {
            format!("quorum reached ({})", result.rule).green()
        } else {
            format!("no quorum ({})", result.rule).yellow()
        };
        format!(
            "{} {}/{} ({:.0}%)  {} {:.2}  {} {}  {}\n",
            "Agreement:".cyan().bold(),
            result.contributing.len(),
            result.succeeded_count(),
            result.agreement * 100.0,
            "Confidence:".cyan().bold(),
            result.confidence,
            "Decided by:".cyan().bold(),
            result.decided_by,
            quorum
        )
    }

    fn hypothesis_block(hypothesis: &Hypothesis, result: &ConsensusResult) -> String {
        let title = format!(
            "── {} {} ({}, t={:.2}) ──",
            hypothesis.id,
            hypothesis.capability_id,
            hypothesis.framing.as_str(),
            hypothesis.temperature
        );
        let cluster = result
            .clusters
            .iter()
            .find(|c| c.members.contains(&hypothesis.id))
            .map(|c| format!(", {}", c.id))
            .unwrap_or_default();
        let status = format!("[{}{}]", hypothesis.status, cluster);

        match hypothesis.status {
            HypothesisStatus::Succeeded => {
                let title = if result.contributing.contains(&hypothesis.id) {
                    title.green().bold()
                } else {
                    title.yellow().bold()
                };
                let confidence = hypothesis
                    .confidence
                    .map(|c| format!(" confidence {:.2}", c))
                    .unwrap_or_default();
                format!(
                    "\n{} {}{}\n{}\n",
                    title,
                    status.dimmed(),
                    confidence.dimmed(),
                    hypothesis.answer().unwrap_or_default()
                )
            }
            _ => format!(
                "\n{} {}\nError: {}\n",
                title.red().bold(),
                status.dimmed(),
                hypothesis.error.as_deref().unwrap_or("Unknown")
            ),
        }
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("{}\n", "=".repeat(60).cyan())
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format(&self, query: &Query, output: &SuperpositionOutput) -> String {
        Self::format(query, output)
    }

    fn format_json(&self, query: &Query, output: &SuperpositionOutput) -> String {
        Self::format_json(query, output)
    }

    fn format_answer_only(&self, output: &SuperpositionOutput) -> String {
        Self::format_answer_only(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use superposition_domain::{
        CapabilityId, ConsensusAggregator, EntryId, Framing, HypothesisId, Model, ModelOutput,
        OutputFormat,
    };

    fn hypothesis(query: &Query, index: u32, text: Option<&str>) -> Hypothesis {
        let mut h = Hypothesis::dispatch(
            HypothesisId::new(index),
            query.id(),
            CapabilityId::new("analyst"),
            Framing::Direct,
            Model::default(),
            0.5,
            "prompt",
        );
        match text {
            Some(text) => h.succeed(ModelOutput::new(text)).unwrap(),
            None => h.fail("connection reset").unwrap(),
        }
        h
    }

    fn sample() -> (Query, SuperpositionOutput) {
        colored::control::set_override(false);
        let query = Query::new("What is the capital of France?").unwrap();
        let trace = vec![
            hypothesis(&query, 0, Some("Paris is the capital of France\nConfidence: 0.9")),
            hypothesis(&query, 1, Some("Lyon, not Paris, is where the French government sits")),
            hypothesis(&query, 2, Some("The capital of France is Paris")),
            hypothesis(&query, 3, None),
        ];
        let result = ConsensusAggregator::default().reduce(&trace).unwrap();
        let output = SuperpositionOutput {
            query_id: query.id(),
            result,
            trace,
            consensus_entry: EntryId::new(5),
            elapsed: Duration::from_millis(1234),
        };
        (query, output)
    }

    #[test]
    fn test_full_format_sections() {
        let (query, output) = sample();
        let text = ConsoleFormatter::format(&query, &output);

        assert!(text.contains("Query: What is the capital of France?"));
        assert!(text.contains("Paris is the capital of France"));
        assert!(text.contains("Agreement: 2/3"));
        assert!(text.contains("c0: h0, h2"));
        assert!(text.contains("<- winner"));
        assert!(text.contains("h0 (c0) vs h1 (c1): kept h0 (majority)"));
        assert!(text.contains("Error: connection reset"));
        assert!(text.contains("1234ms"));
    }

    #[test]
    fn test_answer_only() {
        let (_, output) = sample();
        let text = ConsoleFormatter::format_answer_only(&output);
        assert_eq!(text, "Paris is the capital of France\n");
    }

    #[test]
    fn test_json_report() {
        let (query, output) = sample();
        let value: serde_json::Value =
            serde_json::from_str(&ConsoleFormatter.render(OutputFormat::Json, &query, &output))
                .unwrap();

        assert_eq!(value["answer"], "Paris is the capital of France");
        assert_eq!(value["consensus_entry"], 5);
        assert_eq!(value["hypotheses"].as_array().unwrap().len(), 4);
        assert_eq!(value["consensus"]["contributing"], serde_json::json!([0, 2]));
        assert_eq!(value["consensus"]["conflicts"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_capability_listing() {
        colored::control::set_override(false);
        let text = ConsoleFormatter::format_capabilities(&superposition_domain::builtin_capabilities());
        assert!(text.contains("analyst"));
        assert!(text.contains("step_by_step"));
        assert!(text.contains("enabled"));
    }
}
