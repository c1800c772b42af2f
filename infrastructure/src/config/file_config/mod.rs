//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and converted into application and domain
//! types, reporting every problem found as a [`ConfigIssue`].

mod capabilities;
mod consensus;
mod explorer;
mod gateway;
mod logging;
mod providers;

pub use capabilities::{FileCapabilityConfig, build_registry};
pub use consensus::FileConsensusConfig;
pub use explorer::FileExplorerConfig;
pub use gateway::FileGatewayConfig;
pub use logging::FileLoggingConfig;
pub use providers::FileProviderConfig;

use crate::providers::ProviderSettings;
use serde::{Deserialize, Serialize};
use superposition_application::{ExplorerParams, GatewayPolicy};
use superposition_domain::{
    CapabilityRegistry, ConfigIssue, ConfigIssueCode, ConsensusAggregator,
};
use thiserror::Error;

/// Configuration rejected because of error-level issues
#[derive(Debug, Error)]
#[error("{} configuration error(s):\n{}", errors.len(), format_issues(errors))]
pub struct ConfigValidationError {
    pub errors: Vec<ConfigIssue>,
}

fn format_issues(issues: &[ConfigIssue]) -> String {
    issues
        .iter()
        .map(|i| format!("  - {}", i.message))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Timeouts, retries and the concurrency ceiling
    pub gateway: FileGatewayConfig,
    /// Hypothesis fan-out defaults
    pub explorer: FileExplorerConfig,
    /// Similarity policy and agreement rule
    pub consensus: FileConsensusConfig,
    /// LLM provider connection
    pub provider: FileProviderConfig,
    /// Built-in adjustments and custom capabilities
    pub capabilities: Vec<FileCapabilityConfig>,
    /// Capability ids registered disabled
    pub disabled_capabilities: Vec<String>,
    /// Event and log file outputs
    pub logging: FileLoggingConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        issues.extend(self.gateway.to_policy().1);
        issues.extend(self.explorer.to_params().1);
        issues.extend(self.consensus.to_aggregator().1);
        issues.extend(self.provider.to_settings().1);
        issues.extend(build_registry(&self.capabilities, &self.disabled_capabilities).1);

        // A query deadline shorter than one attempt cuts every call short
        if self.explorer.query_timeout_secs > 0
            && self.explorer.query_timeout_secs < self.gateway.timeout_secs
        {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::OutOfRange,
                format!(
                    "explorer.query_timeout_secs ({}) is shorter than gateway.timeout_secs ({})",
                    self.explorer.query_timeout_secs, self.gateway.timeout_secs
                ),
            ));
        }

        issues
    }

    /// Fail on error-level issues; return the remaining warnings.
    pub fn check(&self) -> Result<Vec<ConfigIssue>, ConfigValidationError> {
        let (errors, warnings): (Vec<_>, Vec<_>) =
            self.validate().into_iter().partition(ConfigIssue::is_error);
        if errors.is_empty() {
            Ok(warnings)
        } else {
            Err(ConfigValidationError { errors })
        }
    }

    // ==================== Conversions ====================

    pub fn gateway_policy(&self) -> GatewayPolicy {
        self.gateway.to_policy().0
    }

    pub fn explorer_params(&self) -> ExplorerParams {
        self.explorer.to_params().0
    }

    pub fn aggregator(&self) -> ConsensusAggregator {
        self.consensus.to_aggregator().0
    }

    pub fn provider_settings(&self) -> ProviderSettings {
        self.provider.to_settings().0
    }

    pub fn registry(&self) -> CapabilityRegistry {
        build_registry(&self.capabilities, &self.disabled_capabilities).0
    }
}
