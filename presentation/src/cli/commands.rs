//! CLI command definitions

use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use superposition_domain::{
    CapabilityId, DomainError, Model, OutputFormat, Query, TemperatureRange,
};

/// CLI arguments for superposition
#[derive(Parser, Debug)]
#[command(name = "superposition")]
#[command(author, version, about = "Answer a query with parallel hypotheses and reach consensus")]
#[command(long_about = r#"
Superposition answers a query by exploring several hypotheses at once and
keeping the answer most of them agree on.

The process has two phases:
1. Exploration: N hypotheses, each with its own capability (reasoning
   strategy) and temperature, are sent to the model concurrently
2. Consensus: successful answers are clustered by similarity; the largest
   cluster wins and every disagreement is reported

Configuration files are loaded from (in priority order):
1. SUPERPOSITION_* environment variables (e.g. SUPERPOSITION_GATEWAY__MAX_ATTEMPTS=5)
2. --config <path>             Explicit config file
3. ./superposition.toml        Project-level config
4. ~/.config/superposition/config.toml   Global config

Example:
  superposition "What is the capital of Australia?"
  superposition -n 5 --temperature 0.2..1.0 -o full "Is 2^61 - 1 prime?"
  superposition -c skeptic -c step_by_step "How many r's are in strawberry?"
"#)]
pub struct Cli {
    /// The query to answer
    pub query: Option<String>,

    /// Number of hypotheses to explore
    #[arg(short = 'n', long = "hypotheses", value_name = "N")]
    pub hypotheses: Option<usize>,

    /// Overall deadline for the query in milliseconds
    #[arg(long, value_name = "MS")]
    pub timeout_ms: Option<u64>,

    /// Model to query
    #[arg(short, long, value_name = "MODEL")]
    pub model: Option<String>,

    /// Temperature range spread across hypotheses ("0.2..0.9" or "0.7")
    #[arg(long, value_name = "MIN..MAX")]
    pub temperature: Option<TemperatureRange>,

    /// Restrict to these capabilities (can be specified multiple times)
    #[arg(short, long, value_name = "ID")]
    pub capability: Vec<String>,

    /// Show each hypothesis the answers already committed by the others
    #[arg(long)]
    pub share_context: bool,

    /// Output format: full, answer or json
    #[arg(short, long, default_value = "answer")]
    pub output: OutputFormat,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Append orchestration events as JSON lines to this file
    #[arg(long, value_name = "PATH")]
    pub events_file: Option<PathBuf>,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,

    /// List registered capabilities and exit
    #[arg(long)]
    pub list_capabilities: bool,
}

impl Cli {
    /// Build the query from the positional text and the per-query flags.
    ///
    /// Returns `Ok(None)` when no query text was given.
    pub fn to_query(&self) -> Result<Option<Query>, DomainError> {
        let Some(text) = &self.query else {
            return Ok(None);
        };

        let mut query = Query::new(text.as_str())?;
        if let Some(n) = self.hypotheses {
            query = query.with_hypothesis_count(n);
        }
        if let Some(ms) = self.timeout_ms {
            query = query.with_timeout(Duration::from_millis(ms));
        }
        if let Some(model) = &self.model {
            query = query.with_model(Model::from(model.as_str()));
        }
        if let Some(range) = self.temperature {
            query = query.with_temperature(range);
        }
        if !self.capability.is_empty() {
            query = query.with_capabilities(
                self.capability
                    .iter()
                    .map(|id| CapabilityId::new(id.trim()))
                    .collect(),
            );
        }
        Ok(Some(query))
    }
}
