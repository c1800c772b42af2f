//! Model gateway: the policy layer in front of an [`LlmProvider`].

use crate::config::GatewayPolicy;
use crate::ports::event_sink::{EventSink, NoEventSink, OrchestrationEvent};
use crate::ports::llm_provider::{GatewayError, LlmProvider};
use std::sync::Arc;
use superposition_domain::{HypothesisId, ModelOutput, ModelRequest, QueryId};
use tokio::sync::Semaphore;
use tokio::time::{Instant, sleep, timeout};
use tracing::{debug, info_span, warn, Instrument};

/// Identifies which query and hypothesis a gateway call belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallTag {
    pub query_id: QueryId,
    pub hypothesis: Option<HypothesisId>,
}

impl CallTag {
    pub fn new(query_id: QueryId) -> Self {
        Self {
            query_id,
            hypothesis: None,
        }
    }

    pub fn for_hypothesis(query_id: QueryId, hypothesis: HypothesisId) -> Self {
        Self {
            query_id,
            hypothesis: Some(hypothesis),
        }
    }
}

/// Wraps a provider with timeout, retry and a process-wide concurrency
/// ceiling.
///
/// Admission uses a fair semaphore, so waiting calls are served in arrival
/// order. A permit is held only while an attempt is in flight, never during
/// backoff.
pub struct ModelGateway {
    provider: Arc<dyn LlmProvider>,
    policy: GatewayPolicy,
    permits: Arc<Semaphore>,
    events: Arc<dyn EventSink>,
}

impl ModelGateway {
    pub fn new(provider: Arc<dyn LlmProvider>, policy: GatewayPolicy) -> Self {
        let permits = Arc::new(Semaphore::new(policy.max_concurrency));
        Self {
            provider,
            policy,
            permits,
            events: Arc::new(NoEventSink),
        }
    }

    pub fn with_event_sink(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = events;
        self
    }

    /// Share an admission gate with other gateways.
    pub fn with_shared_permits(mut self, permits: Arc<Semaphore>) -> Self {
        self.permits = permits;
        self
    }

    pub fn policy(&self) -> &GatewayPolicy {
        &self.policy
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Permits currently free.
    pub fn available_permits(&self) -> usize {
        self.permits.available_permits()
    }

    /// Fail fast when the provider has no credentials.
    pub fn check_credentials(&self) -> Result<(), GatewayError> {
        self.provider.check_credentials()
    }

    /// Invoke the model, retrying transient failures within the policy budget.
    pub async fn invoke(
        &self,
        request: &ModelRequest,
        tag: CallTag,
    ) -> Result<ModelOutput, GatewayError> {
        self.provider.check_credentials()?;

        let span = info_span!(
            "gateway_invoke",
            query_id = %tag.query_id,
            hypothesis = ?tag.hypothesis.map(|h| h.to_string()),
            model = %request.model,
        );
        self.invoke_with_retry(request, tag).instrument(span).await
    }

    async fn invoke_with_retry(
        &self,
        request: &ModelRequest,
        tag: CallTag,
    ) -> Result<ModelOutput, GatewayError> {
        let mut attempt = 0u32;

        loop {
            attempt += 1;
            let (result, latency_ms) = self.attempt(request).await?;

            let outcome = match &result {
                Ok(_) => "ok",
                Err(e) => e.kind(),
            };
            self.events.emit(OrchestrationEvent::gateway_attempt(
                tag.query_id,
                tag.hypothesis,
                attempt,
                latency_ms,
                outcome,
            ));

            match result {
                Ok(mut output) => {
                    debug!(attempt, latency_ms, "Model call succeeded");
                    if output.latency_ms == 0 {
                        output.latency_ms = latency_ms;
                    }
                    return Ok(output);
                }
                Err(e) if e.is_transient() && attempt < self.policy.max_attempts => {
                    let delay = self
                        .policy
                        .backoff_delay(attempt, e.retry_after(), jitter_factor());
                    warn!(
                        attempt,
                        error = %e,
                        delay_ms = delay.as_millis() as u64,
                        "Transient model error, retrying"
                    );
                    sleep(delay).await;
                }
                Err(e) => {
                    warn!(attempt, error = %e, "Model call failed");
                    return Err(e);
                }
            }
        }
    }

    /// One attempt under a permit. The outer error means admission failed.
    async fn attempt(
        &self,
        request: &ModelRequest,
    ) -> Result<(Result<ModelOutput, GatewayError>, u64), GatewayError> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| GatewayError::Transport("gateway admission closed".to_string()))?;

        let started = Instant::now();
        let result = match timeout(self.policy.call_timeout, self.provider.complete(request)).await
        {
            Ok(result) => result,
            Err(_) => Err(GatewayError::Timeout),
        };
        Ok((result, started.elapsed().as_millis() as u64))
    }
}

fn jitter_factor() -> f64 {
    0.5 + fastrand::f64() * 0.5
}
