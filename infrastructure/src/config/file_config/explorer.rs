//! Explorer configuration from TOML (`[explorer]` section)
//!
//! ```toml
//! [explorer]
//! hypothesis_count = 3
//! query_timeout_secs = 90
//! model = "gpt-4o-mini"
//! temperature_min = 0.3
//! temperature_max = 0.9
//! max_tokens = 1024
//! share_context = false
//! ```

use serde::{Deserialize, Serialize};
use std::time::Duration;
use superposition_application::ExplorerParams;
use superposition_domain::core::sampling::MAX_TEMPERATURE;
use superposition_domain::{ConfigIssue, ConfigIssueCode, Model, TemperatureRange};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileExplorerConfig {
    pub hypothesis_count: usize,
    pub query_timeout_secs: u64,
    pub model: String,
    pub temperature_min: f32,
    pub temperature_max: f32,
    pub max_tokens: u32,
    /// Show each hypothesis the answers committed by the others
    pub share_context: bool,
}

impl Default for FileExplorerConfig {
    fn default() -> Self {
        let params = ExplorerParams::default();
        Self {
            hypothesis_count: params.hypothesis_count,
            query_timeout_secs: params.query_timeout.as_secs(),
            model: params.model.to_string(),
            temperature_min: params.temperature.min,
            temperature_max: params.temperature.max,
            max_tokens: params.max_tokens,
            share_context: params.share_context,
        }
    }
}

impl FileExplorerConfig {
    /// Convert to [`ExplorerParams`], replacing invalid values by defaults.
    pub fn to_params(&self) -> (ExplorerParams, Vec<ConfigIssue>) {
        let mut issues = Vec::new();
        let mut params = ExplorerParams::default().with_share_context(self.share_context);

        if self.hypothesis_count == 0 {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::OutOfRange,
                "explorer.hypothesis_count: must be at least 1",
            ));
        } else {
            params = params.with_hypothesis_count(self.hypothesis_count);
        }

        if self.query_timeout_secs == 0 {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::OutOfRange,
                "explorer.query_timeout_secs: must be at least 1",
            ));
        } else {
            params = params.with_query_timeout(Duration::from_secs(self.query_timeout_secs));
        }

        if self.model.trim().is_empty() {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::EmptyId,
                "explorer.model: model name must not be empty",
            ));
        } else {
            params = params.with_model(Model::from(self.model.trim()));
        }

        if self.max_tokens == 0 {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::OutOfRange,
                "explorer.max_tokens: must be at least 1",
            ));
        } else {
            params = params.with_max_tokens(self.max_tokens);
        }

        let in_bounds = |t: f32| (0.0..=MAX_TEMPERATURE).contains(&t);
        if !in_bounds(self.temperature_min) || !in_bounds(self.temperature_max) {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::OutOfRange,
                format!(
                    "explorer.temperature_min/max: must lie within 0..={}",
                    MAX_TEMPERATURE
                ),
            ));
        } else if self.temperature_min > self.temperature_max {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::InvertedRange,
                format!(
                    "explorer.temperature_min ({}) exceeds temperature_max ({})",
                    self.temperature_min, self.temperature_max
                ),
            ));
        } else {
            params = params.with_temperature(TemperatureRange {
                min: self.temperature_min,
                max: self.temperature_max,
            });
        }

        (params, issues)
    }
}
