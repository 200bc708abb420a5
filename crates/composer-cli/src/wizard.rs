//! End-to-end wizard run
//!
//! Drives a [`WorkflowCoordinator`] through every step in order the way the
//! interactive front-end would: keywords, research, link review, source
//! analysis, draft, scoring with an optional refinement pass, then export.

use std::time::Duration;

use anyhow::{anyhow, bail};
use tracing::{debug, info, warn};

use composer_core::domain::{
    DraftRequest, KeywordsRequest, LinkReport, QualityMetrics, DEFAULT_PASS_THRESHOLD,
};
use composer_core::{ExportArtifact, ExportFormat, Operation, StepOutcome, WorkflowCoordinator};
use composer_links::LinkValidator;

/// Where step results come from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Every step calls the backend
    Live,
    /// Every step is simulated locally
    Simulate,
    /// Backend first; a failed call is replaced by its simulation
    Fallback,
}

#[derive(Debug, Clone)]
pub struct WizardOptions {
    pub query: String,
    pub mode: RunMode,
    pub deep_research: bool,
    pub format: ExportFormat,
    /// Every quality score must reach this before export without a refinement
    pub threshold: f64,
    /// How long to wait for a completion event after each live step
    pub progress_wait: Duration,
}

impl WizardOptions {
    pub fn new(query: impl Into<String>, mode: RunMode) -> Self {
        Self {
            query: query.into(),
            mode,
            deep_research: false,
            format: ExportFormat::Markdown,
            threshold: DEFAULT_PASS_THRESHOLD,
            progress_wait: Duration::ZERO,
        }
    }
}

/// What a finished run produced
#[derive(Debug, Clone)]
pub struct WizardSummary {
    pub artifact: ExportArtifact,
    pub link_report: Option<LinkReport>,
    pub quality: Option<QualityMetrics>,
    pub refined: bool,
    /// Steps that were simulated after the backend failed them
    pub simulated_fallbacks: Vec<Operation>,
}

enum Action {
    Keywords(KeywordsRequest),
    Research,
    DeepResearch,
    SourceAnalysis,
    Draft(DraftRequest),
    Quality,
    Refine(String),
    Export(ExportFormat),
}

impl Action {
    fn operation(&self) -> Operation {
        match self {
            Action::Keywords(_) => Operation::Keywords,
            Action::Research => Operation::Research,
            Action::DeepResearch => Operation::DeepResearch,
            Action::SourceAnalysis => Operation::SourceAnalysis,
            Action::Draft(_) => Operation::Draft,
            Action::Quality => Operation::QualityAnalysis,
            Action::Refine(_) => Operation::Refine,
            Action::Export(_) => Operation::Export,
        }
    }
}

pub struct Wizard {
    coordinator: WorkflowCoordinator,
    validator: Option<LinkValidator>,
    options: WizardOptions,
    fallbacks: Vec<Operation>,
}

impl Wizard {
    pub fn new(coordinator: WorkflowCoordinator, options: WizardOptions) -> Self {
        Self {
            coordinator,
            validator: None,
            options,
            fallbacks: Vec::new(),
        }
    }

    /// Check source links before analysis and drop the ones that fail
    pub fn with_link_validator(mut self, validator: LinkValidator) -> Self {
        self.validator = Some(validator);
        self
    }

    pub fn coordinator(&self) -> &WorkflowCoordinator {
        &self.coordinator
    }

    pub async fn run(&mut self) -> anyhow::Result<WizardSummary> {
        info!(query = %self.options.query, mode = ?self.options.mode, "Starting wizard");

        let request = KeywordsRequest::new(self.options.query.clone());
        self.perform(Action::Keywords(request)).await?;

        if self.options.deep_research {
            self.perform(Action::DeepResearch).await?;
        } else {
            self.perform(Action::Research).await?;
        }

        let link_report = match &self.validator {
            Some(validator) => {
                let urls: Vec<String> = self
                    .coordinator
                    .state()
                    .sources
                    .iter()
                    .map(|s| s.source.url.clone())
                    .filter(|url| !url.is_empty())
                    .collect();
                let report = validator
                    .validate_with_progress(urls.as_slice(), |percent, url| {
                        debug!(percent, %url, "Checking link");
                    })
                    .await;
                let flagged = self.coordinator.apply_link_report(&report);
                info!(flagged, checked = report.len(), "Link review applied");
                Some(report)
            }
            None => None,
        };

        self.perform(Action::SourceAnalysis).await?;

        let draft_request = self.coordinator.draft_request();
        if draft_request.sources.is_empty() {
            bail!("No usable sources left after link review");
        }
        self.perform(Action::Draft(draft_request)).await?;

        self.perform(Action::Quality).await?;
        let mut refined = false;
        if let Some(metrics) = self.coordinator.state().quality.clone() {
            if !metrics.passes(self.options.threshold) {
                let feedback = refinement_feedback(&metrics, self.options.threshold);
                info!(average = metrics.average(), "Quality below threshold, refining");
                self.perform(Action::Refine(feedback)).await?;
                refined = true;
            }
        }

        self.coordinator.advance();
        self.perform(Action::Export(self.options.format)).await?;

        let terminal = self.coordinator.config().sequence.terminal();
        if self.coordinator.step() != terminal {
            bail!("Export finished on {} instead of {}", self.coordinator.step(), terminal);
        }

        let state = self.coordinator.state();
        let artifact = state
            .export
            .clone()
            .ok_or_else(|| anyhow!("Export finished without an artifact"))?;

        Ok(WizardSummary {
            artifact,
            link_report,
            quality: state.quality.clone(),
            refined,
            simulated_fallbacks: self.fallbacks.clone(),
        })
    }

    async fn perform(&mut self, action: Action) -> anyhow::Result<()> {
        let op = action.operation();
        let simulate = self.options.mode == RunMode::Simulate;
        let outcome = match self.dispatch(&action, simulate).await {
            StepOutcome::Failed(e) if self.options.mode == RunMode::Fallback => {
                warn!(operation = %op, "Backend step failed, using simulation: {}", e);
                self.fallbacks.push(op);
                self.dispatch(&action, true).await
            }
            outcome => outcome,
        };

        match outcome {
            StepOutcome::Advanced(step) => {
                info!(operation = %op, %step, next_action = step.call_to_action(), "Step done")
            }
            StepOutcome::Completed => info!(operation = %op, "Step done"),
            StepOutcome::Failed(e) | StepOutcome::Rejected(e) => {
                return Err(anyhow::Error::new(e).context(format!("{} did not complete", op.name())));
            }
        }

        self.settle_progress().await;
        Ok(())
    }

    async fn dispatch(&mut self, action: &Action, simulate: bool) -> StepOutcome {
        let c = &mut self.coordinator;
        match (action, simulate) {
            (Action::Keywords(request), false) => c.run_keywords(request.clone()).await,
            (Action::Keywords(request), true) => c.simulate_keywords(request.clone()).await,
            (Action::Research, false) => c.run_research().await,
            (Action::Research, true) => c.simulate_research().await,
            (Action::DeepResearch, false) => c.run_deep_research().await,
            (Action::DeepResearch, true) => c.simulate_deep_research().await,
            (Action::SourceAnalysis, false) => c.run_source_analysis().await,
            (Action::SourceAnalysis, true) => c.simulate_source_analysis().await,
            (Action::Draft(request), false) => c.run_draft(request.clone()).await,
            (Action::Draft(request), true) => c.simulate_draft(request.clone()).await,
            (Action::Quality, false) => c.run_quality_analysis().await,
            (Action::Quality, true) => c.simulate_quality_analysis().await,
            (Action::Refine(feedback), false) => c.run_refine(feedback.clone()).await,
            (Action::Refine(feedback), true) => c.simulate_refine(feedback.clone()).await,
            (Action::Export(format), false) => c.run_export(*format).await,
            (Action::Export(format), true) => c.simulate_export(*format).await,
        }
    }

    async fn settle_progress(&mut self) {
        let applied = self.coordinator.pump_progress();
        if applied > 0 {
            debug!(applied, progress = self.coordinator.state().progress, "Progress events applied");
        }
        if self.options.progress_wait.is_zero() || self.coordinator.state().execution_id.is_none() {
            return;
        }
        if !self.coordinator.await_execution(self.options.progress_wait).await {
            debug!("Execution still running after the progress wait");
        }
    }
}

/// Feedback naming the scores below the threshold, plus the reviewer's notes
fn refinement_feedback(metrics: &QualityMetrics, threshold: f64) -> String {
    let weak: Vec<&str> = metrics
        .scores()
        .into_iter()
        .filter(|(_, score)| *score < threshold)
        .map(|(name, _)| name)
        .collect();
    let mut feedback = format!("Improve {}.", weak.join(", "));
    if let Some(notes) = metrics.feedback.as_deref().filter(|n| !n.trim().is_empty()) {
        feedback.push(' ');
        feedback.push_str(notes);
    }
    feedback
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(conciseness: f64, coherence: f64, feedback: Option<&str>) -> QualityMetrics {
        QualityMetrics {
            conciseness,
            coherence,
            readability: Some(4.0),
            tone: None,
            feedback: feedback.map(str::to_string),
        }
    }

    #[test]
    fn feedback_names_weak_scores() {
        let feedback = refinement_feedback(&metrics(2.0, 1.5, None), 3.0);
        assert_eq!(feedback, "Improve conciseness, coherence.");
    }

    #[test]
    fn feedback_appends_reviewer_notes() {
        let feedback = refinement_feedback(&metrics(4.0, 2.0, Some("Tighten the intro.")), 3.0);
        assert_eq!(feedback, "Improve coherence. Tighten the intro.");
    }
}
