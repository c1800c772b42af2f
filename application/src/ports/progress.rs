//! Progress notification port
//!
//! Defines the interface for reporting progress during a superposition run.

use superposition_domain::{Hypothesis, Phase};

/// Callback for progress updates during a superposition run
///
/// Implementations live in the presentation layer and can display
/// progress in various ways (console bars, logs, etc.)
pub trait ProgressNotifier: Send + Sync {
    /// Called when a phase starts
    fn on_phase_start(&self, phase: &Phase, total_tasks: usize);

    /// Called when a hypothesis reaches a terminal status
    fn on_hypothesis_complete(&self, phase: &Phase, hypothesis: &Hypothesis);

    /// Called when a phase completes
    fn on_phase_complete(&self, phase: &Phase);
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl ProgressNotifier for NoProgress {
    fn on_phase_start(&self, _phase: &Phase, _total_tasks: usize) {}
    fn on_hypothesis_complete(&self, _phase: &Phase, _hypothesis: &Hypothesis) {}
    fn on_phase_complete(&self, _phase: &Phase) {}
}
