//! Explorer parameters: defaults applied when a query leaves them unset.

use std::time::Duration;
use superposition_domain::{Model, TemperatureRange};

/// Defaults for hypothesis exploration.
///
/// Per-query values in [`QueryParams`](superposition_domain::QueryParams)
/// override these.
#[derive(Debug, Clone, PartialEq)]
pub struct ExplorerParams {
    /// Number of hypotheses when the query does not say.
    pub hypothesis_count: usize,
    /// Overall deadline for a query's exploration.
    pub query_timeout: Duration,
    pub model: Model,
    pub temperature: TemperatureRange,
    pub max_tokens: u32,
    /// Include context entries committed by other agents in prompts.
    pub share_context: bool,
}

impl Default for ExplorerParams {
    fn default() -> Self {
        Self {
            hypothesis_count: 3,
            query_timeout: Duration::from_secs(90),
            model: Model::default(),
            temperature: TemperatureRange::default(),
            max_tokens: 1024,
            share_context: false,
        }
    }
}

impl ExplorerParams {
    // ==================== Builder Methods ====================

    pub fn with_hypothesis_count(mut self, count: usize) -> Self {
        self.hypothesis_count = count;
        self
    }

    pub fn with_query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = timeout;
        self
    }

    pub fn with_model(mut self, model: Model) -> Self {
        self.model = model;
        self
    }

    pub fn with_temperature(mut self, range: TemperatureRange) -> Self {
        self.temperature = range;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_share_context(mut self, share: bool) -> Self {
        self.share_context = share;
        self
    }
}
