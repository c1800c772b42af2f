//! Run Superposition use case
//!
//! The caller-facing entry point: explore a query, then reduce the surviving
//! hypotheses to a consensus.

use crate::ports::event_sink::{EventSink, NoEventSink, OrchestrationEvent};
use crate::ports::progress::{NoProgress, ProgressNotifier};
use crate::use_cases::explore::{EXPLORER_AGENT, ExploreError, HypothesisExplorer};
use std::time::Duration;
use std::sync::Arc;
use superposition_domain::{
    AgentId, ConsensusAggregator, ConsensusResult, ContextDraft, DomainError, EntryId,
    Hypothesis, Phase, Query, QueryId,
};
use thiserror::Error;
use tokio::time::Instant;
use tracing::{info, warn};

/// Errors that can occur during a superposition run
#[derive(Error, Debug)]
pub enum RunError {
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("No active capabilities match the query")]
    NoActiveCapabilities,

    #[error("Missing credentials: {0}")]
    MissingCredentials(String),

    #[error("All {} hypotheses failed", trace.len())]
    AllAttemptsFailed {
        query_id: QueryId,
        trace: Vec<Hypothesis>,
    },

    #[error("No succeeded hypotheses to reduce")]
    NoSucceededHypotheses,

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Context error: {0}")]
    Context(DomainError),
}

impl RunError {
    /// Check if this error represents a cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, RunError::Cancelled)
    }

    /// Errors caused by the caller's input rather than by runtime conditions
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            RunError::InvalidQuery(_) | RunError::NoActiveCapabilities
        )
    }

    /// The hypotheses recorded before the failure, when any were dispatched
    pub fn trace(&self) -> &[Hypothesis] {
        match self {
            RunError::AllAttemptsFailed { trace, .. } => trace,
            _ => &[],
        }
    }
}

impl From<ExploreError> for RunError {
    fn from(err: ExploreError) -> Self {
        match err {
            ExploreError::InvalidQuery(msg) => RunError::InvalidQuery(msg),
            ExploreError::NoActiveCapabilities => RunError::NoActiveCapabilities,
            ExploreError::MissingCredentials(msg) => RunError::MissingCredentials(msg),
            ExploreError::AllAttemptsFailed {
                query_id,
                hypotheses,
            } => RunError::AllAttemptsFailed {
                query_id,
                trace: hypotheses,
            },
            ExploreError::Cancelled => RunError::Cancelled,
            ExploreError::Context(e) => RunError::Context(e),
        }
    }
}

impl From<DomainError> for RunError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::InvalidQuery(msg) => RunError::InvalidQuery(msg),
            DomainError::NoSucceededHypotheses => RunError::NoSucceededHypotheses,
            DomainError::Cancelled => RunError::Cancelled,
            other => RunError::Context(other),
        }
    }
}

/// Output of a successful run
#[derive(Debug, Clone)]
pub struct SuperpositionOutput {
    pub query_id: QueryId,
    pub result: ConsensusResult,
    /// Every dispatched hypothesis, in dispatch order
    pub trace: Vec<Hypothesis>,
    /// Context entry recording the decision
    pub consensus_entry: EntryId,
    pub elapsed: Duration,
}

/// Use case for answering a query by superposition
pub struct RunSuperpositionUseCase {
    explorer: HypothesisExplorer,
    aggregator: ConsensusAggregator,
    events: Arc<dyn EventSink>,
}

impl RunSuperpositionUseCase {
    pub fn new(explorer: HypothesisExplorer, aggregator: ConsensusAggregator) -> Self {
        Self {
            explorer,
            aggregator,
            events: Arc::new(NoEventSink),
        }
    }

    pub fn with_event_sink(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = events;
        self
    }

    pub fn explorer(&self) -> &HypothesisExplorer {
        &self.explorer
    }

    /// Execute the use case with default (no-op) progress
    pub async fn execute(&self, query: Query) -> Result<SuperpositionOutput, RunError> {
        self.execute_with_progress(query, &NoProgress).await
    }

    /// Execute the use case with progress callbacks
    pub async fn execute_with_progress(
        &self,
        query: Query,
        progress: &dyn ProgressNotifier,
    ) -> Result<SuperpositionOutput, RunError> {
        let started = Instant::now();
        let exploration = self.explorer.explore(&query, progress).await?;

        progress.on_phase_start(&Phase::Consensus, 1);
        let reduce_started = Instant::now();
        let result = self.aggregator.reduce(&exploration.hypotheses)?;
        let reduce_ms = reduce_started.elapsed().as_millis() as u64;

        if !result.conflicts.is_empty() {
            warn!(
                query_id = %query.id(),
                conflicts = result.conflicts.len(),
                dissenting = ?result.dissenting().iter().map(|h| h.to_string()).collect::<Vec<_>>(),
                "Hypotheses disagree"
            );
        }

        let predecessors: Vec<EntryId> = result
            .contributing
            .iter()
            .filter_map(|h| exploration.entries.get(h).copied())
            .chain(std::iter::once(exploration.root_entry))
            .collect();
        let consensus_entry = self.explorer.bus().append(
            ContextDraft::new(AgentId::new(format!("{}-consensus", EXPLORER_AGENT)), result.content.clone())
                .with_predecessors(predecessors),
        )?;

        self.events.emit(OrchestrationEvent::consensus_decided(
            query.id(),
            reduce_ms,
            &result,
        ));
        progress.on_phase_complete(&Phase::Consensus);

        info!(
            query_id = %query.id(),
            winning_cluster = %result.winning_cluster,
            agreement = result.agreement,
            quorum = result.quorum_reached,
            "Consensus decided"
        );

        Ok(SuperpositionOutput {
            query_id: query.id(),
            result,
            trace: exploration.hypotheses,
            consensus_entry,
            elapsed: started.elapsed(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ExplorerParams, GatewayPolicy};
    use crate::gateway::ModelGateway;
    use crate::ports::llm_provider::GatewayError;
    use crate::testing::{RecordingSink, ScriptedProvider, Step, reply};
    use superposition_domain::{
        CapabilityId, CapabilityRegistry, ContextBus, HypothesisId, HypothesisStatus,
        builtin_capabilities,
    };

    const ANALYST: &str = "Answer the following question";
    const STEPWISE: &str = "Solve the following step by step";
    const SKEPTIC: &str = "Consider what a naive answer would get wrong";

    fn use_case(provider: ScriptedProvider) -> (RunSuperpositionUseCase, Arc<ContextBus>, Arc<RecordingSink>) {
        let sink = Arc::new(RecordingSink::default());
        let gateway = Arc::new(
            ModelGateway::new(Arc::new(provider), GatewayPolicy::default())
                .with_event_sink(sink.clone()),
        );
        let registry = Arc::new(CapabilityRegistry::with_capabilities(builtin_capabilities()).unwrap());
        registry.disable(&CapabilityId::from("first_principles")).unwrap();
        let bus = Arc::new(ContextBus::new());
        let explorer =
            HypothesisExplorer::new(gateway, registry, bus.clone(), ExplorerParams::default())
                .with_event_sink(sink.clone());
        let use_case = RunSuperpositionUseCase::new(explorer, ConsensusAggregator::default())
            .with_event_sink(sink.clone());
        (use_case, bus, sink)
    }

    fn query() -> Query {
        Query::new("What is the capital of France?")
            .unwrap()
            .with_hypothesis_count(3)
    }

    #[tokio::test(start_paused = true)]
    async fn test_similar_answers_reach_consensus() {
        let provider = ScriptedProvider::new(vec![reply("fallback")])
            .route(ANALYST, vec![reply("The capital of France is Paris.\nConfidence: 0.9")])
            .route(STEPWISE, vec![reply("The capital of France is Paris\nConfidence: 0.8")])
            .route(SKEPTIC, vec![reply("I think the capital of France is Paris")]);
        let (use_case, bus, sink) = use_case(provider);

        let output = use_case.execute(query()).await.unwrap();

        assert_eq!(output.result.content, "The capital of France is Paris.");
        assert_eq!(output.result.contributing.len(), 3);
        assert!(output.result.conflicts.is_empty());
        assert!(output.result.quorum_reached);
        assert_eq!(output.trace.len(), 3);

        let decision = bus.get(output.consensus_entry).unwrap();
        assert_eq!(decision.content, "The capital of France is Paris.");
        // Three answers plus the root
        assert_eq!(decision.predecessors.len(), 4);

        let decided = sink.of_type("consensus_decided");
        assert_eq!(decided.len(), 1);
        assert_eq!(decided[0].outcome, "quorum");
    }

    #[tokio::test(start_paused = true)]
    async fn test_dissent_is_reported() {
        let provider = ScriptedProvider::new(vec![reply("fallback")])
            .route(ANALYST, vec![reply("The capital of France is Paris")])
            .route(STEPWISE, vec![reply("Lyon, not Paris, is where the French government sits")])
            .route(SKEPTIC, vec![reply("Paris is the capital of France")]);
        let (use_case, _, _) = use_case(provider);

        let output = use_case.execute(query()).await.unwrap();

        assert_eq!(
            output.result.contributing,
            vec![HypothesisId::new(0), HypothesisId::new(2)]
        );
        assert_eq!(output.result.dissenting(), vec![HypothesisId::new(1)]);
        assert_eq!(output.result.conflicts.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timed_out_hypothesis_excluded_from_consensus() {
        let provider = ScriptedProvider::new(vec![reply("fallback")])
            .route(ANALYST, vec![reply("The capital of France is Paris")])
            .route(STEPWISE, vec![Step::Hang])
            .route(SKEPTIC, vec![reply("Paris is the capital of France")]);
        let (use_case, _, _) = use_case(provider);

        let q = query().with_timeout(Duration::from_secs(2));
        let output = use_case.execute(q).await.unwrap();

        assert_eq!(output.trace[1].status, HypothesisStatus::TimedOut);
        assert_eq!(output.result.succeeded_count(), 2);
        assert!(!output.result.contributing.contains(&HypothesisId::new(1)));
        assert!(output.result.conflicts.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_all_failed_surfaces_trace() {
        let provider = ScriptedProvider::new(vec![Step::Fail(GatewayError::InvalidResponse(
            "empty body".to_string(),
        ))]);
        let (use_case, _, sink) = use_case(provider);

        let err = use_case.execute(query()).await.unwrap_err();

        assert!(matches!(err, RunError::AllAttemptsFailed { .. }));
        assert_eq!(err.trace().len(), 3);
        assert!(sink.of_type("consensus_decided").is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_query_is_caller_error() {
        let (use_case, _, _) = use_case(ScriptedProvider::new(vec![reply("x")]));

        let err = use_case
            .execute(query().with_hypothesis_count(0))
            .await
            .unwrap_err();

        assert!(err.is_caller_error());
        assert!(err.trace().is_empty());
    }

    #[test]
    fn test_domain_error_mapping() {
        assert!(matches!(
            RunError::from(DomainError::NoSucceededHypotheses),
            RunError::NoSucceededHypotheses
        ));
        assert!(RunError::from(DomainError::Cancelled).is_cancelled());
    }
}
