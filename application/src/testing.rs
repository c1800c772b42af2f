//! Scripted providers and recording sinks shared by unit tests.

use crate::ports::event_sink::{EventSink, OrchestrationEvent};
use crate::ports::llm_provider::{GatewayError, LlmProvider};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use superposition_domain::{ModelOutput, ModelRequest};

/// One scripted provider response
#[derive(Debug, Clone)]
pub(crate) enum Step {
    Reply(String),
    Fail(GatewayError),
    /// Reply after a delay
    Delay(Duration, String),
    /// Never respond
    Hang,
}

pub(crate) fn reply(text: &str) -> Step {
    Step::Reply(text.to_string())
}

pub(crate) fn rate_limited() -> Step {
    Step::Fail(GatewayError::RateLimited { retry_after: None })
}

/// Provider that answers from per-route scripts.
///
/// A request is routed to the first script whose key occurs in the prompt,
/// else to the fallback script. The last step of a script repeats forever.
pub(crate) struct ScriptedProvider {
    routes: Vec<(String, Mutex<VecDeque<Step>>)>,
    fallback: Mutex<VecDeque<Step>>,
    missing_credentials: bool,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedProvider {
    pub(crate) fn new(fallback: Vec<Step>) -> Self {
        Self {
            routes: Vec::new(),
            fallback: Mutex::new(fallback.into()),
            missing_credentials: false,
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    pub(crate) fn route(mut self, key: &str, steps: Vec<Step>) -> Self {
        self.routes.push((key.to_string(), Mutex::new(steps.into())));
        self
    }

    pub(crate) fn without_credentials(mut self) -> Self {
        self.missing_credentials = true;
        self
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn next_step(&self, prompt: &str) -> Step {
        let queue = self
            .routes
            .iter()
            .find(|(key, _)| prompt.contains(key.as_str()))
            .map(|(_, queue)| queue)
            .unwrap_or(&self.fallback);

        let mut queue = queue.lock().unwrap();
        if queue.len() > 1 {
            queue.pop_front().unwrap()
        } else {
            queue
                .front()
                .cloned()
                .unwrap_or_else(|| reply("(no script)"))
        }
    }
}

struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    fn check_credentials(&self) -> Result<(), GatewayError> {
        if self.missing_credentials {
            return Err(GatewayError::MissingCredentials("TEST_API_KEY".to_string()));
        }
        Ok(())
    }

    async fn complete(&self, request: &ModelRequest) -> Result<ModelOutput, GatewayError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let _guard = InFlight(&self.in_flight);

        match self.next_step(&request.prompt) {
            Step::Reply(text) => Ok(ModelOutput::new(text)),
            Step::Fail(err) => Err(err),
            Step::Delay(delay, text) => {
                tokio::time::sleep(delay).await;
                Ok(ModelOutput::new(text))
            }
            Step::Hang => {
                std::future::pending::<()>().await;
                unreachable!()
            }
        }
    }
}

/// Event sink that keeps every event in memory
#[derive(Default)]
pub(crate) struct RecordingSink {
    events: Mutex<Vec<OrchestrationEvent>>,
}

impl RecordingSink {
    pub(crate) fn of_type(&self, event_type: &str) -> Vec<OrchestrationEvent> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.event_type == event_type)
            .cloned()
            .collect()
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, event: OrchestrationEvent) {
        self.events.lock().unwrap().push(event);
    }
}
