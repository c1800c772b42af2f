//! Progress reporting for superposition execution

use colored::Colorize;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::sync::{Mutex, PoisonError};
use superposition_application::ProgressNotifier;
use superposition_domain::{Hypothesis, HypothesisStatus, Phase};

/// Reports progress during execution with progress bars
pub struct ProgressReporter {
    multi: MultiProgress,
    phase_bar: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            phase_bar: Mutex::new(None),
        }
    }

    fn phase_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-")
    }

    fn phase_display_name(phase: &Phase) -> &'static str {
        match phase {
            Phase::Exploration => "Phase 1: Exploration",
            Phase::Consensus => "Phase 2: Consensus",
        }
    }

    fn phase_short_name(phase: &Phase) -> &'static str {
        match phase {
            Phase::Exploration => "Phase 1",
            Phase::Consensus => "Phase 2",
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

/// One-line status for a resolved hypothesis, e.g. `v h0 analyst`
fn hypothesis_status(hypothesis: &Hypothesis) -> String {
    let label = format!("{} {}", hypothesis.id, hypothesis.capability_id);
    match hypothesis.status {
        HypothesisStatus::Succeeded => format!("{} {}", "v".green(), label),
        HypothesisStatus::TimedOut => format!("{} {} (timed out)", "x".red(), label),
        _ => format!("{} {} (failed)", "x".red(), label),
    }
}

impl ProgressNotifier for ProgressReporter {
    fn on_phase_start(&self, phase: &Phase, total_tasks: usize) {
        let pb = self.multi.add(ProgressBar::new(total_tasks as u64));
        pb.set_style(Self::phase_style());
        pb.set_prefix(Self::phase_display_name(phase).to_string());
        pb.set_message("Starting...");

        *self.phase_bar.lock().unwrap_or_else(PoisonError::into_inner) = Some(pb);
    }

    fn on_hypothesis_complete(&self, _phase: &Phase, hypothesis: &Hypothesis) {
        if let Some(pb) = self
            .phase_bar
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
        {
            pb.set_message(hypothesis_status(hypothesis));
            pb.inc(1);
        }
    }

    fn on_phase_complete(&self, phase: &Phase) {
        if let Some(pb) = self
            .phase_bar
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            let phase_name = Self::phase_short_name(phase);
            pb.finish_with_message(format!("{} complete!", phase_name.green()));
        }
    }
}

/// Simple text-based progress (no progress bars), written to stderr
pub struct SimpleProgress;

impl ProgressNotifier for SimpleProgress {
    fn on_phase_start(&self, phase: &Phase, total_tasks: usize) {
        eprintln!(
            "{} {} ({} tasks)",
            "->".cyan(),
            ProgressReporter::phase_display_name(phase).bold(),
            total_tasks
        );
    }

    fn on_hypothesis_complete(&self, _phase: &Phase, hypothesis: &Hypothesis) {
        eprintln!("  {}", hypothesis_status(hypothesis));
    }

    fn on_phase_complete(&self, _phase: &Phase) {
        eprintln!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use superposition_domain::{CapabilityId, Framing, HypothesisId, Model, ModelOutput, QueryId};

    fn resolved(status: HypothesisStatus) -> Hypothesis {
        let mut h = Hypothesis::dispatch(
            HypothesisId::new(2),
            QueryId::generate(),
            CapabilityId::new("skeptic"),
            Framing::Direct,
            Model::default(),
            0.7,
            "prompt",
        );
        match status {
            HypothesisStatus::Succeeded => h.succeed(ModelOutput::new("42")).unwrap(),
            HypothesisStatus::TimedOut => h.time_out("deadline").unwrap(),
            _ => h.fail("boom").unwrap(),
        }
        h
    }

    #[test]
    fn test_hypothesis_status_lines() {
        colored::control::set_override(false);
        assert_eq!(hypothesis_status(&resolved(HypothesisStatus::Succeeded)), "v h2 skeptic");
        assert_eq!(
            hypothesis_status(&resolved(HypothesisStatus::TimedOut)),
            "x h2 skeptic (timed out)"
        );
        assert_eq!(
            hypothesis_status(&resolved(HypothesisStatus::Failed)),
            "x h2 skeptic (failed)"
        );
    }

    #[test]
    fn test_reporter_tracks_phase_bar() {
        let reporter = ProgressReporter::new();
        reporter.on_phase_start(&Phase::Exploration, 2);
        reporter.on_hypothesis_complete(&Phase::Exploration, &resolved(HypothesisStatus::Succeeded));
        assert_eq!(
            reporter.phase_bar.lock().unwrap().as_ref().map(|pb| pb.position()),
            Some(1)
        );
        reporter.on_phase_complete(&Phase::Exploration);
        assert!(reporter.phase_bar.lock().unwrap().is_none());
    }
}
