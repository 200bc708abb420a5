use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, instrument, warn};

use crate::backend::{AutomationBackend, ExecutionStatus};
use crate::domain::{
    ArticleContent, DeepResearchRequest, DraftRequest, KeywordsRequest, LinkReport, LinkStatus,
    ResearchRequest, Source,
};
use crate::error::{ComposerError, ComposerResult};
use crate::export::{export_locally, ExportArtifact, ExportFormat};
use crate::normalize::normalize_deep_research;
use crate::progress::{ProgressChannel, ProgressStatus, ProgressUpdate};

use super::simulation::{self, SimulationConfig};
use super::state::{StepPayload, WorkflowState};
use super::step::{Operation, Step, StepSequence};

/// Prefix of execution ids fabricated in simulation mode
pub const SIMULATED_EXECUTION_PREFIX: &str = "sim-";

/// Coordinator settings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoordinatorConfig {
    /// Step order, including whether scoring is folded into Draft
    #[serde(default)]
    pub sequence: StepSequence,
    /// Pacing of simulated steps
    #[serde(default)]
    pub simulation: SimulationConfig,
}

/// What a step call did to the workflow
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    /// Succeeded and moved to the given step
    Advanced(Step),
    /// Succeeded and stayed on the current step
    Completed,
    /// The backend call failed; the error is recorded in the state
    Failed(ComposerError),
    /// Refused before any call was made; the error is recorded in the state
    Rejected(ComposerError),
}

impl StepOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, StepOutcome::Advanced(_) | StepOutcome::Completed)
    }

    pub fn error(&self) -> Option<&ComposerError> {
        match self {
            StepOutcome::Failed(e) | StepOutcome::Rejected(e) => Some(e),
            _ => None,
        }
    }
}

struct StepResult {
    payload: StepPayload,
    execution_id: Option<String>,
}

/// Drives the article wizard through its steps.
///
/// Each step operation calls the automation backend (or a simulated stand-in),
/// folds the answer into [`WorkflowState`] and advances when the step's rules
/// say so. Failures never escape: they are recorded in the state and returned
/// as a [`StepOutcome`].
///
/// The HTTP answer is authoritative for step results. Progress events only
/// refine the progress value, surface failures and end the wait on an
/// execution; they never move the step or touch the loading flag.
pub struct WorkflowCoordinator {
    /// Backend for live calls; `None` runs offline
    backend: Option<Arc<dyn AutomationBackend>>,

    /// Progress channel shared with the socket task
    progress: Option<ProgressChannel>,

    /// Queue the progress listeners feed
    events_tx: UnboundedSender<ProgressUpdate>,
    events_rx: UnboundedReceiver<ProgressUpdate>,

    /// Execution status answers by execution id
    status_cache: HashMap<String, ExecutionStatus>,

    config: CoordinatorConfig,
    state: WorkflowState,
}

impl std::fmt::Debug for WorkflowCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkflowCoordinator")
            .field("online", &self.backend.is_some())
            .field("config", &self.config)
            .field("state", &self.state)
            .finish()
    }
}

impl WorkflowCoordinator {
    /// Create a coordinator that talks to the given backend
    pub fn new(backend: Arc<dyn AutomationBackend>, config: CoordinatorConfig) -> Self {
        Self::build(Some(backend), config)
    }

    /// Create a coordinator with no backend. Only simulated steps and local
    /// export succeed.
    pub fn offline(config: CoordinatorConfig) -> Self {
        Self::build(None, config)
    }

    fn build(backend: Option<Arc<dyn AutomationBackend>>, config: CoordinatorConfig) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            backend,
            progress: None,
            events_tx,
            events_rx,
            status_cache: HashMap::new(),
            config,
            state: WorkflowState::default(),
        }
    }

    /// Route progress for awaited executions through this channel
    pub fn with_progress(mut self, channel: ProgressChannel) -> Self {
        self.progress = Some(channel);
        self
    }

    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    pub fn step(&self) -> Step {
        self.state.step
    }

    /// Position of the current step within the configured sequence
    pub fn step_index(&self) -> usize {
        self.config.sequence.index_of(self.state.step).unwrap_or(0)
    }

    pub fn is_online(&self) -> bool {
        self.backend.is_some()
    }

    /// Move to the next step. No-op at the terminal step or while a call is
    /// in flight.
    pub fn advance(&mut self) -> Step {
        if self.state.loading {
            debug!(step = %self.state.step, "Not advancing while a call is in flight");
            return self.state.step;
        }
        if let Some(next) = self.config.sequence.next(self.state.step) {
            info!(from = %self.state.step, to = %next, "Advancing workflow");
            self.state.step = next;
        }
        self.state.step
    }

    /// Drop every payload, cached status and subscription and return to the
    /// first step
    pub fn reset(&mut self) {
        self.release_execution();
        self.state = WorkflowState::default();
        self.status_cache.clear();
        while self.events_rx.try_recv().is_ok() {}
        info!("Workflow reset");
    }

    pub fn clear_error(&mut self) {
        self.state.error = None;
    }

    // Source review

    /// Flip the selection of a source. Returns false for an unknown id.
    pub fn toggle_source_selection(&mut self, id: &str) -> bool {
        match self.state.source_mut(id) {
            Some(source) => {
                source.selected = !source.selected;
                true
            }
            None => false,
        }
    }

    /// Flag a source as a broken link and deselect it
    pub fn mark_source_invalid(&mut self, id: &str) -> bool {
        match self.state.source_mut(id) {
            Some(source) => {
                source.validation = Some(LinkStatus::Invalid);
                source.selected = false;
                true
            }
            None => false,
        }
    }

    /// Annotate sources with a link sweep and deselect flagged ones.
    /// Returns the number of flagged sources.
    pub fn apply_link_report(&mut self, report: &LinkReport) -> usize {
        let flagged = self.state.apply_link_report(report);
        info!(flagged, checked = report.len(), "Applied link report");
        flagged
    }

    pub fn selected_sources(&self) -> Vec<Source> {
        self.state.selected_sources()
    }

    /// Draft request over the selected sources with the academic template
    pub fn draft_request(&self) -> DraftRequest {
        DraftRequest::academic(self.state.selected_sources())
    }

    /// Replace the draft body with the user's edits
    pub fn update_draft_content(&mut self, content: impl Into<String>) -> bool {
        match self.state.draft.as_mut() {
            Some(draft) => {
                draft.content = content.into();
                true
            }
            None => false,
        }
    }

    // Live operations

    #[instrument(skip(self, request), fields(query = %request.query))]
    pub async fn run_keywords(&mut self, request: KeywordsRequest) -> StepOutcome {
        let op = Operation::Keywords;
        if let Err(rejected) = self.admit_with(op, |_| validate_query(&request)) {
            return rejected;
        }
        let backend = self.backend.clone();
        self.execute(op, async move {
            let backend = require_backend(backend)?;
            let accepted = backend
                .process_keywords(&request)
                .await?
                .into_result(&op.failure_message())?;
            Ok::<_, ComposerError>(StepResult {
                payload: StepPayload::Keywords {
                    request,
                    analysis: accepted.data,
                },
                execution_id: accepted.execution_id,
            })
        })
        .await
    }

    #[instrument(skip(self))]
    pub async fn run_research(&mut self) -> StepOutcome {
        let op = Operation::Research;
        let keywords = match self.admit_with(op, Self::require_keywords) {
            Ok(keywords) => keywords,
            Err(rejected) => return rejected,
        };
        let backend = self.backend.clone();
        self.execute(op, async move {
            let backend = require_backend(backend)?;
            let request = ResearchRequest::for_keywords(keywords);
            let accepted = backend
                .conduct_research(&request)
                .await?
                .into_result(&op.failure_message())?;
            Ok::<_, ComposerError>(StepResult {
                payload: StepPayload::Research {
                    sources: accepted.data.sources,
                },
                execution_id: accepted.execution_id,
            })
        })
        .await
    }

    #[instrument(skip(self))]
    pub async fn run_deep_research(&mut self) -> StepOutcome {
        let op = Operation::DeepResearch;
        let keywords = match self.admit_with(op, Self::require_keywords) {
            Ok(keywords) => keywords,
            Err(rejected) => return rejected,
        };
        let backend = self.backend.clone();
        self.execute(op, async move {
            let backend = require_backend(backend)?;
            let request = DeepResearchRequest::from(&keywords);
            let mut response = backend.deep_research(&request).await?;
            // A run that found nothing may omit `data` entirely
            response.data.get_or_insert(Value::Null);
            let accepted = response.into_result(&op.failure_message())?;
            let (facts, sources) = normalize_deep_research(accepted.data)?;
            info!(facts = facts.len(), "Deep research normalised");
            Ok::<_, ComposerError>(StepResult {
                payload: StepPayload::DeepResearch { facts, sources },
                execution_id: accepted.execution_id,
            })
        })
        .await
    }

    #[instrument(skip(self))]
    pub async fn run_source_analysis(&mut self) -> StepOutcome {
        let op = Operation::SourceAnalysis;
        let sources = match self.admit_with(op, Self::require_sources) {
            Ok(sources) => sources,
            Err(rejected) => return rejected,
        };
        let backend = self.backend.clone();
        self.execute(op, async move {
            let backend = require_backend(backend)?;
            let accepted = backend
                .analyze_sources(&sources)
                .await?
                .into_result(&op.failure_message())?;
            Ok::<_, ComposerError>(StepResult {
                payload: StepPayload::SourceAnalysis(accepted.data),
                execution_id: accepted.execution_id,
            })
        })
        .await
    }

    #[instrument(skip(self, request), fields(sources = request.sources.len()))]
    pub async fn run_draft(&mut self, request: DraftRequest) -> StepOutcome {
        let op = Operation::Draft;
        if let Err(rejected) = self.admit_with(op, |_| validate_draft_request(&request)) {
            return rejected;
        }
        let backend = self.backend.clone();
        self.execute(op, async move {
            let backend = require_backend(backend)?;
            let accepted = backend
                .generate_draft(&request)
                .await?
                .into_result(&op.failure_message())?;
            Ok::<_, ComposerError>(StepResult {
                payload: StepPayload::Draft(accepted.data),
                execution_id: accepted.execution_id,
            })
        })
        .await
    }

    #[instrument(skip(self))]
    pub async fn run_quality_analysis(&mut self) -> StepOutcome {
        let op = Operation::QualityAnalysis;
        let draft = match self.admit_with(op, Self::require_draft) {
            Ok(draft) => draft,
            Err(rejected) => return rejected,
        };
        let backend = self.backend.clone();
        self.execute(op, async move {
            let backend = require_backend(backend)?;
            let accepted = backend
                .analyze_quality(&draft)
                .await?
                .into_result(&op.failure_message())?;
            Ok::<_, ComposerError>(StepResult {
                payload: StepPayload::Quality(accepted.data),
                execution_id: accepted.execution_id,
            })
        })
        .await
    }

    #[instrument(skip(self, feedback))]
    pub async fn run_refine(&mut self, feedback: impl Into<String>) -> StepOutcome {
        let op = Operation::Refine;
        let feedback = feedback.into();
        let draft = match self.admit_with(op, Self::require_draft) {
            Ok(draft) => draft,
            Err(rejected) => return rejected,
        };
        let backend = self.backend.clone();
        self.execute(op, async move {
            let backend = require_backend(backend)?;
            let accepted = backend
                .refine_draft(&draft, &feedback)
                .await?
                .into_result(&op.failure_message())?;
            Ok::<_, ComposerError>(StepResult {
                payload: StepPayload::Refined {
                    result: accepted.data,
                    feedback,
                },
                execution_id: accepted.execution_id,
            })
        })
        .await
    }

    /// Export the draft. Backend failures degrade to a local rendering, so
    /// this only fails when there is nothing to export.
    #[instrument(skip(self))]
    pub async fn run_export(&mut self, format: ExportFormat) -> StepOutcome {
        let op = Operation::Export;
        let draft = match self.admit_with(op, Self::require_draft) {
            Ok(draft) => draft,
            Err(rejected) => return rejected,
        };
        let backend = self.backend.clone();
        self.execute(op, async move {
            let remote = async {
                let backend = require_backend(backend)?;
                backend
                    .export_article(&draft, format)
                    .await?
                    .into_result(&op.failure_message())
            };
            match remote.await {
                Ok(accepted) => Ok::<_, ComposerError>(StepResult {
                    payload: StepPayload::Export(ExportArtifact::from_remote(
                        &draft,
                        format,
                        accepted.data,
                    )),
                    execution_id: accepted.execution_id,
                }),
                Err(e) => {
                    warn!(%format, "Backend export failed, rendering locally: {}", e);
                    let mut artifact = export_locally(&draft, format);
                    artifact.fallback = Some(match artifact.fallback.take() {
                        Some(local) => format!("{}; {}", e, local),
                        None => e.to_string(),
                    });
                    Ok::<_, ComposerError>(StepResult {
                        payload: StepPayload::Export(artifact),
                        execution_id: None,
                    })
                }
            }
        })
        .await
    }

    // Simulated operations

    pub async fn simulate_keywords(&mut self, request: KeywordsRequest) -> StepOutcome {
        let op = Operation::Keywords;
        if let Err(rejected) = self.admit_with(op, |_| validate_query(&request)) {
            return rejected;
        }
        let analysis = simulation::keyword_analysis(&request);
        self.simulate(op, StepPayload::Keywords { request, analysis })
            .await
    }

    pub async fn simulate_research(&mut self) -> StepOutcome {
        let op = Operation::Research;
        if let Err(rejected) = self.admit_with(op, Self::require_keywords) {
            return rejected;
        }
        self.simulate(op, StepPayload::Research {
            sources: simulation::sources(),
        })
        .await
    }

    pub async fn simulate_deep_research(&mut self) -> StepOutcome {
        let op = Operation::DeepResearch;
        if let Err(rejected) = self.admit_with(op, Self::require_keywords) {
            return rejected;
        }
        let (facts, sources) = match normalize_deep_research(simulation::deep_research_records()) {
            Ok(normalized) => normalized,
            Err(e) => return self.reject(op, e),
        };
        self.simulate(op, StepPayload::DeepResearch { facts, sources })
            .await
    }

    pub async fn simulate_source_analysis(&mut self) -> StepOutcome {
        let op = Operation::SourceAnalysis;
        let sources = match self.admit_with(op, Self::require_sources) {
            Ok(sources) => sources,
            Err(rejected) => return rejected,
        };
        let analysis = simulation::source_analysis(&sources);
        self.simulate(op, StepPayload::SourceAnalysis(analysis)).await
    }

    pub async fn simulate_draft(&mut self, request: DraftRequest) -> StepOutcome {
        let op = Operation::Draft;
        if let Err(rejected) = self.admit_with(op, |_| validate_draft_request(&request)) {
            return rejected;
        }
        let query = self.state.keywords.as_ref().map(|k| k.query.as_str());
        let article = simulation::draft(&request, query);
        self.simulate(op, StepPayload::Draft(article)).await
    }

    pub async fn simulate_quality_analysis(&mut self) -> StepOutcome {
        let op = Operation::QualityAnalysis;
        let draft = match self.admit_with(op, Self::require_draft) {
            Ok(draft) => draft,
            Err(rejected) => return rejected,
        };
        self.simulate(op, StepPayload::Quality(simulation::quality(&draft)))
            .await
    }

    pub async fn simulate_refine(&mut self, feedback: impl Into<String>) -> StepOutcome {
        let op = Operation::Refine;
        let feedback = feedback.into();
        let draft = match self.admit_with(op, Self::require_draft) {
            Ok(draft) => draft,
            Err(rejected) => return rejected,
        };
        let result = simulation::refine(&draft, &feedback);
        self.simulate(op, StepPayload::Refined { result, feedback })
            .await
    }

    /// Export through the local renderer only
    pub async fn simulate_export(&mut self, format: ExportFormat) -> StepOutcome {
        let op = Operation::Export;
        let draft = match self.admit_with(op, Self::require_draft) {
            Ok(draft) => draft,
            Err(rejected) => return rejected,
        };
        self.simulate(op, StepPayload::Export(export_locally(&draft, format)))
            .await
    }

    // Backend utilities

    /// Ask the backend to abort an execution.
    ///
    /// The id is forwarded even when no step is awaiting it, so a call whose
    /// future was dropped can still be stopped. Simulated ids and offline
    /// coordinators only settle local state. On success loading and error
    /// are cleared and the id's subscription is released. Returns whether
    /// the backend confirmed the cancellation.
    #[instrument(skip(self))]
    pub async fn cancel(&mut self, execution_id: &str) -> ComposerResult<bool> {
        let backend = match self.backend.clone() {
            Some(backend) if !execution_id.starts_with(SIMULATED_EXECUTION_PREFIX) => backend,
            _ => {
                self.settle_cancelled(execution_id);
                return Ok(false);
            }
        };

        let result = backend
            .cancel_execution(execution_id)
            .await
            .and_then(|response| response.into_result("Execution cancellation failed"));
        match result {
            Ok(accepted) => {
                info!(%execution_id, cancelled = accepted.data.cancelled, "Execution cancelled");
                self.settle_cancelled(execution_id);
                Ok(accepted.data.cancelled)
            }
            Err(e) => {
                warn!(%execution_id, "Cancel failed: {}", e);
                self.state.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    fn settle_cancelled(&mut self, execution_id: &str) {
        if self.state.execution_id.as_deref() == Some(execution_id) {
            self.release_execution();
        } else if let Some(channel) = &self.progress {
            channel.unsubscribe(execution_id);
        }
        self.state.loading = false;
        self.state.error = None;
    }

    /// Status of an execution, served from cache after the first answer
    #[instrument(skip(self))]
    pub async fn execution_status(&mut self, execution_id: &str) -> ComposerResult<ExecutionStatus> {
        if let Some(status) = self.status_cache.get(execution_id) {
            debug!(%execution_id, "Execution status served from cache");
            return Ok(status.clone());
        }
        let backend = require_backend(self.backend.clone())?;
        let accepted = backend
            .execution_status(execution_id)
            .await?
            .into_result("Failed to fetch execution status")?;
        self.status_cache
            .insert(execution_id.to_string(), accepted.data.clone());
        Ok(accepted.data)
    }

    pub fn invalidate_status(&mut self, execution_id: &str) {
        self.status_cache.remove(execution_id);
    }

    // Progress

    /// Apply one progress event. Returns false when it was ignored.
    pub fn apply_progress(&mut self, update: ProgressUpdate) -> bool {
        if self.state.execution_id.as_deref() != Some(update.execution_id.as_str()) {
            debug!(execution_id = %update.execution_id, "Ignoring progress for an execution not awaited");
            return false;
        }

        match update.status {
            ProgressStatus::Running => {
                self.state.progress = self.state.progress.max(update.progress.min(100));
            }
            ProgressStatus::Completed => {
                debug!(execution_id = %update.execution_id, step = %update.step, "Execution completed");
                self.status_cache.remove(&update.execution_id);
                self.state.progress = 100;
                self.release_execution();
            }
            ProgressStatus::Failed => {
                let message = update
                    .message
                    .unwrap_or_else(|| "Workflow failed".to_string());
                warn!(execution_id = %update.execution_id, "Execution failed: {}", message);
                self.state.error = Some(message);
                self.release_execution();
            }
        }
        true
    }

    /// Apply every queued progress event. Returns how many were applied.
    pub fn pump_progress(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(update) = self.events_rx.try_recv() {
            if self.apply_progress(update) {
                applied += 1;
            }
        }
        applied
    }

    /// Apply progress events until the awaited execution settles or the
    /// timeout passes. Returns true when nothing is awaited any more.
    pub async fn await_execution(&mut self, timeout: Duration) -> bool {
        let deadline = tokio::time::Instant::now() + timeout;
        while self.state.execution_id.is_some() {
            match tokio::time::timeout_at(deadline, self.events_rx.recv()).await {
                Ok(Some(update)) => {
                    self.apply_progress(update);
                }
                Ok(None) | Err(_) => break,
            }
        }
        self.state.execution_id.is_none()
    }

    // Step template

    fn admit(&mut self, op: Operation) -> Result<(), StepOutcome> {
        if self.state.loading {
            return Err(self.reject(op, ComposerError::Busy));
        }
        let home = op.home_step(&self.config.sequence);
        if self.state.step != home {
            let error = ComposerError::WrongStep {
                operation: op.name().to_string(),
                step: self.state.step.label().to_string(),
            };
            return Err(self.reject(op, error));
        }
        Ok(())
    }

    fn admit_with<T>(
        &mut self,
        op: Operation,
        input: impl FnOnce(&Self) -> ComposerResult<T>,
    ) -> Result<T, StepOutcome> {
        self.admit(op)?;
        input(self).map_err(|e| self.reject(op, e))
    }

    fn reject(&mut self, op: Operation, error: ComposerError) -> StepOutcome {
        warn!(operation = %op, "Rejected: {}", error);
        self.state.error = Some(error.to_string());
        StepOutcome::Rejected(error)
    }

    fn begin(&mut self, op: Operation) {
        debug!(operation = %op, "Starting step call");
        self.release_execution();
        self.state.error = None;
        self.state.loading = true;
        self.state.progress = 0;
    }

    async fn execute<F>(&mut self, op: Operation, call: F) -> StepOutcome
    where
        F: Future<Output = ComposerResult<StepResult>>,
    {
        self.begin(op);
        let result = call.await;
        self.finish(op, result)
    }

    async fn simulate(&mut self, op: Operation, payload: StepPayload) -> StepOutcome {
        self.begin(op);
        let execution_id = format!(
            "{}{}-{}",
            SIMULATED_EXECUTION_PREFIX,
            op.slug(),
            Utc::now().timestamp_millis()
        );
        self.state.execution_id = Some(execution_id.clone());

        let interval = self.config.simulation.tick_interval();
        for percent in self.config.simulation.tick_percentages() {
            if !interval.is_zero() {
                tokio::time::sleep(interval).await;
            }
            self.apply_progress(ProgressUpdate::running(&execution_id, op.slug(), percent));
        }

        let outcome = self.finish(
            op,
            Ok(StepResult {
                payload,
                execution_id: None,
            }),
        );
        self.apply_progress(ProgressUpdate::completed(&execution_id, op.slug()));
        outcome
    }

    fn finish(&mut self, op: Operation, result: ComposerResult<StepResult>) -> StepOutcome {
        self.state.loading = false;
        match result {
            Ok(StepResult {
                payload,
                execution_id,
            }) => {
                self.state.apply(payload);
                self.state.progress = 100;
                if let Some(execution_id) = execution_id {
                    self.track_execution(execution_id);
                }
                info!(operation = %op, step = %self.state.step, "Step call succeeded");

                if op.auto_advances(&self.config.sequence) {
                    StepOutcome::Advanced(self.advance())
                } else {
                    StepOutcome::Completed
                }
            }
            Err(e) => {
                warn!(operation = %op, "Step call failed: {}", e);
                self.state.error = Some(e.to_string());
                StepOutcome::Failed(e)
            }
        }
    }

    fn track_execution(&mut self, execution_id: String) {
        if let Some(channel) = &self.progress {
            let tx = self.events_tx.clone();
            channel.subscribe(
                execution_id.clone(),
                Arc::new(move |update| {
                    let _ = tx.send(update);
                }),
            );
        }
        self.state.execution_id = Some(execution_id);
    }

    fn release_execution(&mut self) {
        if let Some(execution_id) = self.state.execution_id.take() {
            if let Some(channel) = &self.progress {
                channel.unsubscribe(&execution_id);
            }
        }
    }

    // Inputs

    fn require_keywords(&self) -> ComposerResult<KeywordsRequest> {
        self.state
            .keywords
            .clone()
            .ok_or_else(|| ComposerError::Validation("Keywords are required before research".to_string()))
    }

    fn require_sources(&self) -> ComposerResult<Vec<Source>> {
        if self.state.sources.is_empty() {
            return Err(ComposerError::Validation("No sources to analyze".to_string()));
        }
        Ok(self.state.sources.iter().map(|s| s.source.clone()).collect())
    }

    fn require_draft(&self) -> ComposerResult<ArticleContent> {
        self.state
            .draft
            .clone()
            .ok_or_else(|| ComposerError::Validation("No draft available".to_string()))
    }
}

fn require_backend(
    backend: Option<Arc<dyn AutomationBackend>>,
) -> ComposerResult<Arc<dyn AutomationBackend>> {
    backend.ok_or_else(|| {
        ComposerError::Configuration(
            "No automation backend configured; use simulation mode".to_string(),
        )
    })
}

fn validate_query(request: &KeywordsRequest) -> ComposerResult<()> {
    if request.query.trim().is_empty() {
        return Err(ComposerError::Validation("Enter a topic to research".to_string()));
    }
    Ok(())
}

fn validate_draft_request(request: &DraftRequest) -> ComposerResult<()> {
    if request.sources.is_empty() {
        return Err(ComposerError::Validation(
            "Select at least one source before drafting".to_string(),
        ));
    }
    Ok(())
}
