//! Query value object

use super::error::DomainError;
use super::model::Model;
use super::sampling::TemperatureRange;
use crate::capability::CapabilityId;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Unique identifier for a submitted query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QueryId(uuid::Uuid);

impl QueryId {
    /// Generates a fresh random id.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &uuid::Uuid {
        &self.0
    }
}

impl std::fmt::Display for QueryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Optional caller-supplied parameters of a [`Query`].
///
/// Every field falls back to the explorer's configured default when `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryParams {
    /// Number of parallel hypotheses to dispatch
    pub hypothesis_count: Option<usize>,
    /// Overall deadline for the whole query
    pub timeout: Option<Duration>,
    /// Model to invoke
    pub model: Option<Model>,
    /// Sampling temperature range spread across hypotheses
    pub temperature: Option<TemperatureRange>,
    /// Restrict exploration to these capabilities
    pub capabilities: Option<Vec<CapabilityId>>,
}

/// A task submitted to the explorer (Value Object)
///
/// Immutable once constructed: builder methods consume and return `self`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Query {
    id: QueryId,
    text: String,
    params: QueryParams,
}

impl Query {
    /// Create a new query, rejecting empty text.
    pub fn new(text: impl Into<String>) -> Result<Self, DomainError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(DomainError::InvalidQuery(
                "query text cannot be empty".to_string(),
            ));
        }
        Ok(Self {
            id: QueryId::generate(),
            text,
            params: QueryParams::default(),
        })
    }

    pub fn with_hypothesis_count(mut self, count: usize) -> Self {
        self.params.hypothesis_count = Some(count);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.params.timeout = Some(timeout);
        self
    }

    pub fn with_model(mut self, model: Model) -> Self {
        self.params.model = Some(model);
        self
    }

    pub fn with_temperature(mut self, range: TemperatureRange) -> Self {
        self.params.temperature = Some(range);
        self
    }

    pub fn with_capabilities(mut self, ids: Vec<CapabilityId>) -> Self {
        self.params.capabilities = Some(ids);
        self
    }

    pub fn id(&self) -> QueryId {
        self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn params(&self) -> &QueryParams {
        &self.params
    }

    /// Resolve the hypothesis count against a default.
    ///
    /// Fails with `InvalidQuery` when the resolved count is zero.
    pub fn resolve_hypothesis_count(&self, default: usize) -> Result<usize, DomainError> {
        let count = self.params.hypothesis_count.unwrap_or(default);
        if count == 0 {
            return Err(DomainError::InvalidQuery(
                "hypothesis count must be at least 1".to_string(),
            ));
        }
        Ok(count)
    }

    /// Check the whole parameter set, returning the first problem found.
    pub fn validate(&self, default_count: usize) -> Result<(), DomainError> {
        self.resolve_hypothesis_count(default_count)?;
        if let Some(timeout) = self.params.timeout
            && timeout.is_zero()
        {
            return Err(DomainError::InvalidQuery(
                "timeout must be greater than zero".to_string(),
            ));
        }
        if let Some(range) = &self.params.temperature {
            range.validate()?;
        }
        if let Some(ids) = &self.params.capabilities
            && ids.is_empty()
        {
            return Err(DomainError::InvalidQuery(
                "capability allowlist cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

impl std::fmt::Display for Query {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.text)
    }
}
