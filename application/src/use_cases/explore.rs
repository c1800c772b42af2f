//! Explore use case
//!
//! Fans a query out into N concurrent hypotheses and drives every one of
//! them to a terminal status before returning.

use crate::config::ExplorerParams;
use crate::gateway::{CallTag, ModelGateway};
use crate::ports::event_sink::{EventSink, NoEventSink, OrchestrationEvent};
use crate::ports::llm_provider::GatewayError;
use crate::ports::progress::ProgressNotifier;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use superposition_domain::{
    AgentId, Capability, CapabilityRegistry, ContextBus, ContextDraft, Cursor, DomainError,
    EntryId, Framing, Hypothesis, HypothesisId, HypothesisStatus, ModelOutput, ModelRequest,
    Phase, PromptTemplate, Query, QueryId, SamplingParams,
};
use thiserror::Error;
use tokio::sync::oneshot;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Author of the root context entry recorded for each query.
pub const EXPLORER_AGENT: &str = "explorer";

/// Errors that can occur during exploration
#[derive(Error, Debug)]
pub enum ExploreError {
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("No active capabilities match the query")]
    NoActiveCapabilities,

    #[error("Missing credentials: {0}")]
    MissingCredentials(String),

    #[error("All {} hypotheses failed", hypotheses.len())]
    AllAttemptsFailed {
        query_id: QueryId,
        hypotheses: Vec<Hypothesis>,
    },

    #[error("Exploration cancelled")]
    Cancelled,

    #[error("Context error: {0}")]
    Context(DomainError),
}

impl ExploreError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ExploreError::Cancelled)
    }
}

impl From<DomainError> for ExploreError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::InvalidQuery(msg) => ExploreError::InvalidQuery(msg),
            DomainError::Cancelled => ExploreError::Cancelled,
            other => ExploreError::Context(other),
        }
    }
}

/// Every hypothesis of one query, each in a terminal status.
#[derive(Debug, Clone)]
pub struct Exploration {
    pub query_id: QueryId,
    /// Hypotheses in dispatch order
    pub hypotheses: Vec<Hypothesis>,
    /// Root context entry recorded for the query
    pub root_entry: EntryId,
    /// Context entries appended by succeeded hypotheses
    pub entries: HashMap<HypothesisId, EntryId>,
    pub elapsed: Duration,
}

impl Exploration {
    pub fn succeeded(&self) -> impl Iterator<Item = &Hypothesis> {
        self.hypotheses.iter().filter(|h| h.is_succeeded())
    }

    pub fn count(&self, status: HypothesisStatus) -> usize {
        self.hypotheses.iter().filter(|h| h.status == status).count()
    }
}

/// Result reported by one hypothesis task.
struct TaskOutcome {
    index: usize,
    result: Result<ModelOutput, GatewayError>,
}

/// Everything one spawned hypothesis needs, owned.
struct HypothesisTask {
    index: usize,
    gateway: Arc<ModelGateway>,
    /// Present when context sharing is enabled
    bus: Option<Arc<ContextBus>>,
    capability: Capability,
    framing: Framing,
    query_text: String,
    shared_since: Cursor,
    tag: CallTag,
    request: ModelRequest,
    /// Receives the prompt as sent, before the gateway is called
    sent_prompt: oneshot::Sender<String>,
}

impl HypothesisTask {
    async fn run(self) -> TaskOutcome {
        let mut request = self.request;
        if let Some(bus) = &self.bus {
            let slice = bus.read_since(self.shared_since);
            let shared: Vec<_> = slice.iter().collect();
            if !shared.is_empty() {
                request.prompt = PromptTemplate::hypothesis_prompt(
                    &self.capability,
                    self.framing,
                    &self.query_text,
                    &shared,
                );
            }
        }

        let _ = self.sent_prompt.send(request.prompt.clone());
        let result = self.gateway.invoke(&request, self.tag).await;
        TaskOutcome {
            index: self.index,
            result,
        }
    }
}

/// Dispatches hypotheses across the active capabilities.
pub struct HypothesisExplorer {
    gateway: Arc<ModelGateway>,
    registry: Arc<CapabilityRegistry>,
    bus: Arc<ContextBus>,
    events: Arc<dyn EventSink>,
    params: ExplorerParams,
    cancellation: Option<CancellationToken>,
}

impl HypothesisExplorer {
    pub fn new(
        gateway: Arc<ModelGateway>,
        registry: Arc<CapabilityRegistry>,
        bus: Arc<ContextBus>,
        params: ExplorerParams,
    ) -> Self {
        Self {
            gateway,
            registry,
            bus,
            events: Arc::new(NoEventSink),
            params,
            cancellation: None,
        }
    }

    pub fn with_event_sink(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = events;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    pub fn params(&self) -> &ExplorerParams {
        &self.params
    }

    pub fn bus(&self) -> &Arc<ContextBus> {
        &self.bus
    }

    /// Explore a query.
    ///
    /// Returns once every hypothesis is terminal: resolved by the gateway,
    /// or marked `TimedOut` when the query deadline elapses first.
    pub async fn explore(
        &self,
        query: &Query,
        progress: &dyn ProgressNotifier,
    ) -> Result<Exploration, ExploreError> {
        query.validate(self.params.hypothesis_count)?;
        let count = query.resolve_hypothesis_count(self.params.hypothesis_count)?;

        let capabilities = self.select_capabilities(query);
        if capabilities.is_empty() {
            return Err(ExploreError::NoActiveCapabilities);
        }

        if let Err(e) = self.gateway.check_credentials() {
            return Err(ExploreError::MissingCredentials(e.to_string()));
        }

        let started = Instant::now();
        let deadline = query.params().timeout.unwrap_or(self.params.query_timeout);
        let root_entry = self.bus.append(ContextDraft::new(
            AgentId::new(EXPLORER_AGENT),
            query.text(),
        ))?;
        let shared_since = Cursor::new(root_entry.seq() + 1);

        info!(
            query_id = %query.id(),
            hypotheses = count,
            capabilities = capabilities.len(),
            deadline_ms = deadline.as_millis() as u64,
            "Starting exploration"
        );
        progress.on_phase_start(&Phase::Exploration, count);

        let mut hypotheses = self.plan(query, count, &capabilities);
        let mut join_set = JoinSet::new();
        let mut task_index = HashMap::new();
        let mut sent_prompts = Vec::with_capacity(count);

        for (index, hypothesis) in hypotheses.iter().enumerate() {
            let capability = capabilities[index % capabilities.len()].clone();
            let (tx, rx) = oneshot::channel();
            sent_prompts.push(rx);
            let task =
                self.task_for(index, hypothesis, capability, query.text(), shared_since, tx);
            let handle = join_set.spawn(task.run());
            task_index.insert(handle.id(), index);
        }

        let mut entries = HashMap::new();
        let token = self.cancellation.clone();
        let cancelled = async move {
            match token {
                Some(token) => token.cancelled().await,
                None => std::future::pending::<()>().await,
            }
        };
        tokio::pin!(cancelled);
        let expiry = tokio::time::sleep(deadline);
        tokio::pin!(expiry);

        loop {
            tokio::select! {
                biased;
                _ = &mut cancelled => {
                    join_set.abort_all();
                    info!(query_id = %query.id(), "Exploration cancelled");
                    return Err(ExploreError::Cancelled);
                }
                _ = &mut expiry => {
                    warn!(
                        query_id = %query.id(),
                        pending = join_set.len(),
                        "Query deadline elapsed"
                    );
                    break;
                }
                joined = join_set.join_next_with_id() => {
                    let Some(joined) = joined else { break };
                    let index = match &joined {
                        Ok((_, outcome)) => Some(outcome.index),
                        Err(e) => task_index.get(&e.id()).copied(),
                    };
                    let Some(index) = index else { continue };
                    let hypothesis = &mut hypotheses[index];
                    if let Ok(prompt) = sent_prompts[index].try_recv() {
                        hypothesis.prompt = prompt;
                    }

                    match joined {
                        Ok((_, outcome)) => {
                            self.resolve(hypothesis, outcome.result, root_entry, &mut entries);
                        }
                        Err(e) => {
                            warn!(hypothesis = %hypothesis.id, error = %e, "Hypothesis task panicked");
                            if let Err(err) = hypothesis.fail(format!("task failed: {}", e)) {
                                warn!(error = %err, "Ignoring resolution of terminal hypothesis");
                            }
                        }
                    }
                    self.events.emit(OrchestrationEvent::hypothesis_resolved(hypothesis));
                    progress.on_hypothesis_complete(&Phase::Exploration, hypothesis);
                }
            }
        }

        // Late results are never read after this point
        join_set.abort_all();
        for (hypothesis, sent) in hypotheses.iter_mut().zip(sent_prompts.iter_mut()) {
            if hypothesis.status.is_terminal() {
                continue;
            }
            if let Ok(prompt) = sent.try_recv() {
                hypothesis.prompt = prompt;
            }
            let detail = format!("query deadline of {}ms elapsed", deadline.as_millis());
            if hypothesis.time_out(detail).is_ok() {
                self.events.emit(OrchestrationEvent::hypothesis_resolved(hypothesis));
                progress.on_hypothesis_complete(&Phase::Exploration, hypothesis);
            }
        }
        progress.on_phase_complete(&Phase::Exploration);

        let elapsed = started.elapsed();
        let exploration = Exploration {
            query_id: query.id(),
            hypotheses,
            root_entry,
            entries,
            elapsed,
        };
        let succeeded = exploration.count(HypothesisStatus::Succeeded);
        let timed_out = exploration.count(HypothesisStatus::TimedOut);

        self.events.emit(OrchestrationEvent::exploration_complete(
            query.id(),
            elapsed.as_millis() as u64,
            count,
            succeeded,
            timed_out,
        ));
        info!(
            query_id = %query.id(),
            succeeded,
            timed_out,
            elapsed_ms = elapsed.as_millis() as u64,
            "Exploration complete"
        );

        if succeeded == 0 {
            return Err(ExploreError::AllAttemptsFailed {
                query_id: exploration.query_id,
                hypotheses: exploration.hypotheses,
            });
        }
        Ok(exploration)
    }

    /// Active capabilities in registry order, narrowed by the query allowlist.
    fn select_capabilities(&self, query: &Query) -> Vec<Capability> {
        let active = self.registry.list_active();
        match &query.params().capabilities {
            Some(allowed) => active
                .into_iter()
                .filter(|c| allowed.contains(&c.id))
                .collect(),
            None => active,
        }
    }

    /// Pending hypotheses: capabilities round-robin, one framing per round.
    fn plan(&self, query: &Query, count: usize, capabilities: &[Capability]) -> Vec<Hypothesis> {
        let model = query
            .params()
            .model
            .clone()
            .unwrap_or_else(|| self.params.model.clone());
        let temperatures = query
            .params()
            .temperature
            .unwrap_or(self.params.temperature)
            .spread(count);

        (0..count)
            .map(|index| {
                let capability = &capabilities[index % capabilities.len()];
                let framing = Framing::for_round(index / capabilities.len());
                Hypothesis::dispatch(
                    HypothesisId::new(index as u32),
                    query.id(),
                    capability.id.clone(),
                    framing,
                    model.clone(),
                    temperatures[index],
                    PromptTemplate::hypothesis_prompt(capability, framing, query.text(), &[]),
                )
            })
            .collect()
    }

    /// Owned task state for one hypothesis.
    fn task_for(
        &self,
        index: usize,
        hypothesis: &Hypothesis,
        capability: Capability,
        query_text: &str,
        shared_since: Cursor,
        sent_prompt: oneshot::Sender<String>,
    ) -> HypothesisTask {
        let request = ModelRequest::new(hypothesis.model.clone(), hypothesis.prompt.clone())
            .with_system_prompt(PromptTemplate::system(&capability))
            .with_sampling(SamplingParams {
                temperature: hypothesis.temperature,
                max_tokens: self.params.max_tokens,
            });

        HypothesisTask {
            index,
            gateway: Arc::clone(&self.gateway),
            bus: self.params.share_context.then(|| Arc::clone(&self.bus)),
            capability,
            framing: hypothesis.framing,
            query_text: query_text.to_string(),
            shared_since,
            tag: CallTag::for_hypothesis(hypothesis.query_id, hypothesis.id),
            request,
            sent_prompt,
        }
    }

    /// Apply a gateway result to a pending hypothesis.
    fn resolve(
        &self,
        hypothesis: &mut Hypothesis,
        result: Result<ModelOutput, GatewayError>,
        root_entry: EntryId,
        entries: &mut HashMap<HypothesisId, EntryId>,
    ) {
        let applied = match result {
            Ok(output) => hypothesis.succeed(output),
            Err(GatewayError::Timeout) => hypothesis.time_out(GatewayError::Timeout.to_string()),
            Err(e) => hypothesis.fail(e.to_string()),
        };
        if let Err(e) = applied {
            warn!(error = %e, "Ignoring resolution of terminal hypothesis");
            return;
        }

        debug!(
            hypothesis = %hypothesis.id,
            status = %hypothesis.status,
            "Hypothesis resolved"
        );

        if let Some(answer) = hypothesis.answer() {
            let draft = ContextDraft::new(AgentId::new(format!("hypothesis-{}", hypothesis.id)), answer)
                .with_predecessors([root_entry]);
            match self.bus.append(draft) {
                Ok(entry) => {
                    entries.insert(hypothesis.id, entry);
                }
                Err(e) => warn!(error = %e, "Failed to record hypothesis in context"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GatewayPolicy;
    use crate::ports::progress::NoProgress;
    use crate::testing::{RecordingSink, ScriptedProvider, Step, rate_limited, reply};
    use superposition_domain::{CapabilityId, builtin_capabilities};

    const ANALYST: &str = "Answer the following question";
    const STEPWISE: &str = "Solve the following step by step";
    const SKEPTIC: &str = "Consider what a naive answer would get wrong";

    struct Harness {
        provider: Arc<ScriptedProvider>,
        sink: Arc<RecordingSink>,
        bus: Arc<ContextBus>,
        explorer: HypothesisExplorer,
    }

    fn harness(provider: ScriptedProvider, policy: GatewayPolicy) -> Harness {
        let provider = Arc::new(provider);
        let sink = Arc::new(RecordingSink::default());
        let gateway = Arc::new(
            ModelGateway::new(provider.clone(), policy).with_event_sink(sink.clone()),
        );
        let registry = Arc::new(CapabilityRegistry::with_capabilities(builtin_capabilities()).unwrap());
        // Three active capabilities: analyst, step_by_step, skeptic
        registry.disable(&CapabilityId::from("first_principles")).unwrap();
        let bus = Arc::new(ContextBus::new());
        let explorer = HypothesisExplorer::new(
            gateway,
            registry,
            bus.clone(),
            ExplorerParams::default(),
        )
        .with_event_sink(sink.clone());

        Harness {
            provider,
            sink,
            bus,
            explorer,
        }
    }

    fn query(n: usize) -> Query {
        Query::new("What is the answer?").unwrap().with_hypothesis_count(n)
    }

    #[tokio::test(start_paused = true)]
    async fn test_dispatches_exactly_n_with_reuse() {
        let h = harness(ScriptedProvider::new(vec![reply("fine")]), GatewayPolicy::default());

        let exploration = h.explorer.explore(&query(5), &NoProgress).await.unwrap();

        assert_eq!(exploration.hypotheses.len(), 5);
        assert!(exploration.hypotheses.iter().all(|h| h.status.is_terminal()));
        assert_eq!(h.provider.calls(), 5);

        // Round-robin in priority order, reused capabilities get a new framing
        let caps: Vec<_> = exploration
            .hypotheses
            .iter()
            .map(|h| h.capability_id.as_str().to_string())
            .collect();
        assert_eq!(caps, vec!["analyst", "step_by_step", "skeptic", "analyst", "step_by_step"]);
        assert_eq!(exploration.hypotheses[0].framing, Framing::Direct);
        assert_eq!(exploration.hypotheses[3].framing, Framing::Alternative);
        assert_ne!(exploration.hypotheses[0].prompt, exploration.hypotheses[3].prompt);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limit_retry_and_exhaustion() {
        let provider = ScriptedProvider::new(vec![reply("fallback")])
            .route(ANALYST, vec![rate_limited(), rate_limited(), reply("The answer is 42")])
            .route(STEPWISE, vec![rate_limited()])
            .route(SKEPTIC, vec![reply("The answer is 42")]);
        let h = harness(provider, GatewayPolicy::default());

        let exploration = h.explorer.explore(&query(3), &NoProgress).await.unwrap();

        assert_eq!(exploration.hypotheses[0].status, HypothesisStatus::Succeeded);
        assert_eq!(exploration.hypotheses[1].status, HypothesisStatus::Failed);
        assert!(
            exploration.hypotheses[1]
                .error
                .as_deref()
                .unwrap()
                .contains("Rate limited")
        );
        assert_eq!(exploration.hypotheses[2].status, HypothesisStatus::Succeeded);
        // 3 + 3 + 1 attempts
        assert_eq!(h.provider.calls(), 7);
        assert_eq!(h.sink.of_type("gateway_attempt").len(), 7);
    }

    #[tokio::test(start_paused = true)]
    async fn test_query_deadline_times_out_pending() {
        let provider = ScriptedProvider::new(vec![reply("fallback")])
            .route(ANALYST, vec![reply("The answer is 42")])
            .route(STEPWISE, vec![Step::Hang])
            .route(SKEPTIC, vec![reply("The answer is 42")]);
        let h = harness(provider, GatewayPolicy::default());

        let q = query(3).with_timeout(Duration::from_secs(5));
        let exploration = h.explorer.explore(&q, &NoProgress).await.unwrap();

        assert_eq!(exploration.count(HypothesisStatus::Succeeded), 2);
        assert_eq!(exploration.hypotheses[1].status, HypothesisStatus::TimedOut);
        assert!(exploration.hypotheses[1].output.is_none());
        assert!(!exploration.entries.contains_key(&HypothesisId::new(1)));

        let resolved = h.sink.of_type("hypothesis_resolved");
        assert_eq!(resolved.len(), 3);
        let complete = h.sink.of_type("exploration_complete");
        assert_eq!(complete[0].payload["timed_out"], 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_late_result_after_deadline_is_discarded() {
        let provider = ScriptedProvider::new(vec![reply("fallback")])
            .route(ANALYST, vec![reply("The answer is 42")])
            .route(STEPWISE, vec![Step::Delay(Duration::from_secs(10), "late answer".to_string())])
            .route(SKEPTIC, vec![reply("The answer is 42")]);
        let h = harness(provider, GatewayPolicy::default());

        let q = query(3).with_timeout(Duration::from_secs(5));
        let exploration = h.explorer.explore(&q, &NoProgress).await.unwrap();

        // Let the delayed reply come due
        tokio::time::sleep(Duration::from_secs(20)).await;

        let late = &exploration.hypotheses[1];
        assert_eq!(late.status, HypothesisStatus::TimedOut);
        assert!(late.output.is_none());
        assert!(!exploration.entries.contains_key(&HypothesisId::new(1)));
        // root plus the two on-time answers
        assert_eq!(h.bus.len(), 3);
        assert!(h.bus.read_since(Cursor::new(0)).iter().all(|e| e.content != "late answer"));

        let result = superposition_domain::ConsensusAggregator::default()
            .reduce(&exploration.hypotheses)
            .unwrap();
        assert_eq!(result.succeeded_count(), 2);
        assert!(!result.contributing.contains(&HypothesisId::new(1)));
        assert!(result.conflicts.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_all_failed() {
        let provider = ScriptedProvider::new(vec![Step::Fail(GatewayError::AuthFailed(
            "401".to_string(),
        ))]);
        let h = harness(provider, GatewayPolicy::default());

        let err = h.explorer.explore(&query(3), &NoProgress).await.unwrap_err();

        match err {
            ExploreError::AllAttemptsFailed { hypotheses, .. } => {
                assert_eq!(hypotheses.len(), 3);
                assert!(hypotheses.iter().all(|h| h.status == HypothesisStatus::Failed));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_credentials_before_dispatch() {
        let h = harness(
            ScriptedProvider::new(vec![reply("x")]).without_credentials(),
            GatewayPolicy::default(),
        );

        let err = h.explorer.explore(&query(3), &NoProgress).await.unwrap_err();

        assert!(matches!(err, ExploreError::MissingCredentials(_)));
        assert_eq!(h.provider.calls(), 0);
        assert!(h.bus.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_query_rejected() {
        let h = harness(ScriptedProvider::new(vec![reply("x")]), GatewayPolicy::default());

        let err = h.explorer.explore(&query(0), &NoProgress).await.unwrap_err();

        assert!(matches!(err, ExploreError::InvalidQuery(_)));
        assert_eq!(h.provider.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_allowlist_without_active_match() {
        let h = harness(ScriptedProvider::new(vec![reply("x")]), GatewayPolicy::default());

        let q = query(2).with_capabilities(vec![CapabilityId::from("first_principles")]);
        let err = h.explorer.explore(&q, &NoProgress).await.unwrap_err();

        assert!(matches!(err, ExploreError::NoActiveCapabilities));
    }

    #[tokio::test(start_paused = true)]
    async fn test_allowlist_narrows_capabilities() {
        let h = harness(ScriptedProvider::new(vec![reply("x")]), GatewayPolicy::default());

        let q = query(2).with_capabilities(vec![CapabilityId::from("skeptic")]);
        let exploration = h.explorer.explore(&q, &NoProgress).await.unwrap();

        assert!(
            exploration
                .hypotheses
                .iter()
                .all(|h| h.capability_id.as_str() == "skeptic")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_answers_recorded_with_root_predecessor() {
        let h = harness(ScriptedProvider::new(vec![reply("The answer is 42")]), GatewayPolicy::default());

        let exploration = h.explorer.explore(&query(2), &NoProgress).await.unwrap();

        let root = h.bus.get(exploration.root_entry).unwrap();
        assert_eq!(root.author.as_str(), EXPLORER_AGENT);
        assert_eq!(root.content, "What is the answer?");

        assert_eq!(exploration.entries.len(), 2);
        for entry_id in exploration.entries.values() {
            let entry = h.bus.get(*entry_id).unwrap();
            assert_eq!(entry.predecessors, vec![exploration.root_entry]);
            assert_eq!(entry.content, "The answer is 42");
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation() {
        let provider = ScriptedProvider::new(vec![Step::Hang]);
        let token = CancellationToken::new();
        let mut h = harness(provider, GatewayPolicy::default());
        h.explorer = h.explorer.with_cancellation(token.clone());

        let canceller = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            token.cancel();
        });

        let err = h.explorer.explore(&query(3), &NoProgress).await.unwrap_err();
        canceller.await.unwrap();

        assert!(err.is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn test_shared_context_reaches_later_hypotheses() {
        let provider = ScriptedProvider::new(vec![reply("fallback")])
            .route(ANALYST, vec![reply("Shared insight from the analyst")])
            .route(STEPWISE, vec![reply("step answer")]);
        let provider = Arc::new(provider);
        let gateway = Arc::new(ModelGateway::new(
            provider.clone(),
            GatewayPolicy::default().with_max_concurrency(1),
        ));
        let registry = Arc::new(CapabilityRegistry::with_capabilities(builtin_capabilities()).unwrap());
        let bus = Arc::new(ContextBus::new());
        let explorer = HypothesisExplorer::new(
            gateway,
            registry,
            bus.clone(),
            ExplorerParams::default().with_share_context(true),
        );

        // Another agent on the same bus contributes once the query has started
        let other = AgentId::new("other-agent");
        let q = query(2);
        let exploration = {
            let bus = bus.clone();
            let note = tokio::spawn(async move {
                bus.append(ContextDraft::new(other, "A note for everyone")).unwrap();
            });
            let result = explorer.explore(&q, &NoProgress).await.unwrap();
            note.await.unwrap();
            result
        };

        assert_eq!(exploration.count(HypothesisStatus::Succeeded), 2);
        for hypothesis in &exploration.hypotheses {
            assert!(hypothesis.prompt.contains("--- other-agent ---"));
            assert!(hypothesis.prompt.contains("A note for everyone"));
        }
        // root, note, two answers
        assert_eq!(bus.len(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timed_out_hypothesis_keeps_sent_prompt() {
        let provider = ScriptedProvider::new(vec![reply("fallback")])
            .route(ANALYST, vec![reply("The answer is 42")])
            .route(STEPWISE, vec![Step::Hang]);
        let gateway = Arc::new(ModelGateway::new(Arc::new(provider), GatewayPolicy::default()));
        let registry = Arc::new(CapabilityRegistry::with_capabilities(builtin_capabilities()).unwrap());
        let bus = Arc::new(ContextBus::new());
        let explorer = HypothesisExplorer::new(
            gateway,
            registry,
            bus.clone(),
            ExplorerParams::default().with_share_context(true),
        );

        let q = query(2).with_timeout(Duration::from_secs(5));
        let exploration = {
            let bus = bus.clone();
            let note = tokio::spawn(async move {
                bus.append(ContextDraft::new(AgentId::new("other-agent"), "A note for everyone"))
                    .unwrap();
            });
            let result = explorer.explore(&q, &NoProgress).await.unwrap();
            note.await.unwrap();
            result
        };

        let stalled = &exploration.hypotheses[1];
        assert_eq!(stalled.status, HypothesisStatus::TimedOut);
        assert!(stalled.prompt.contains("A note for everyone"));
    }
}
