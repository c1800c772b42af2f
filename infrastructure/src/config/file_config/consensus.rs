//! Consensus configuration from TOML (`[consensus]` section)
//!
//! ```toml
//! [consensus]
//! similarity = "jaccard"   # or "exact"
//! threshold = 0.6          # jaccard only
//! rule = "majority"        # or "unanimous", "atleast:2", "75%"
//! ```

use serde::{Deserialize, Serialize};
use superposition_domain::consensus::DEFAULT_JACCARD_THRESHOLD;
use superposition_domain::{
    AgreementRule, ConfigIssue, ConfigIssueCode, ConsensusAggregator, SimilarityKind,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConsensusConfig {
    /// Similarity policy: "jaccard" or "exact"
    pub similarity: String,
    /// Minimum similarity for two answers to agree
    pub threshold: f64,
    /// Agreement rule: "majority", "unanimous", "atleast:N", "N%"
    pub rule: String,
}

impl Default for FileConsensusConfig {
    fn default() -> Self {
        Self {
            similarity: SimilarityKind::default().as_str().to_string(),
            threshold: DEFAULT_JACCARD_THRESHOLD,
            rule: "majority".to_string(),
        }
    }
}

impl FileConsensusConfig {
    pub fn parse_similarity(&self) -> (SimilarityKind, Vec<ConfigIssue>) {
        match self.similarity.parse() {
            Ok(kind) => (kind, vec![]),
            Err(_) => (
                SimilarityKind::default(),
                vec![ConfigIssue::error(
                    ConfigIssueCode::UnknownValue,
                    format!(
                        "consensus.similarity: unknown value '{}' (valid: jaccard, exact)",
                        self.similarity
                    ),
                )],
            ),
        }
    }

    pub fn parse_rule(&self) -> (AgreementRule, Vec<ConfigIssue>) {
        match self.rule.parse() {
            Ok(rule) => (rule, vec![]),
            Err(e) => (
                AgreementRule::default(),
                vec![ConfigIssue::error(
                    ConfigIssueCode::UnknownValue,
                    format!("consensus.rule: '{}': {}", self.rule, e),
                )],
            ),
        }
    }

    /// Build the aggregator, replacing invalid values by defaults.
    pub fn to_aggregator(&self) -> (ConsensusAggregator, Vec<ConfigIssue>) {
        let (kind, mut issues) = self.parse_similarity();
        let (rule, rule_issues) = self.parse_rule();
        issues.extend(rule_issues);

        let threshold = if self.threshold > 0.0 && self.threshold <= 1.0 {
            self.threshold
        } else {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::OutOfRange,
                format!(
                    "consensus.threshold: {} must lie in (0, 1]",
                    self.threshold
                ),
            ));
            DEFAULT_JACCARD_THRESHOLD
        };

        (
            ConsensusAggregator::new(kind.into_policy(threshold), rule),
            issues,
        )
    }
}
