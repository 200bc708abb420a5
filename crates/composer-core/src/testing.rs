//! In-memory backend for tests and demos
//!
//! [`ScriptedBackend`] answers every endpoint with the simulation fixtures and
//! a sequential execution id. Individual operations can be scripted to fail
//! or to answer late.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;

use crate::backend::{AutomationBackend, CancelAck, ExecutionStatus, WorkflowResponse};
use crate::domain::{
    ArticleContent, DeepResearchRequest, DraftRequest, KeywordAnalysis, KeywordsRequest,
    QualityMetrics, RefineResult, ResearchRequest, ResearchResults, Source, SourceAnalysis,
};
use crate::error::{ComposerError, ComposerResult};
use crate::export::{ExportFormat, RemoteExport};
use crate::progress::ProgressStatus;
use crate::workflow::{simulation, Operation};

/// Backend that answers from fixtures
#[derive(Debug, Default)]
pub struct ScriptedBackend {
    failures: Mutex<HashMap<Operation, ComposerError>>,
    delays: Mutex<HashMap<Operation, Duration>>,
    calls: Mutex<Vec<Operation>>,
    cancelled: Mutex<Vec<String>>,
    next_id: AtomicUsize,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call to `operation` fail with `error`
    pub fn fail(&self, operation: Operation, error: ComposerError) {
        self.failures.lock().insert(operation, error);
    }

    /// Restore normal answers for `operation`
    pub fn recover(&self, operation: Operation) {
        self.failures.lock().remove(&operation);
    }

    /// Hold every answer for `operation` back by `delay`; zero removes it
    pub fn delay(&self, operation: Operation, delay: Duration) {
        let mut delays = self.delays.lock();
        if delay.is_zero() {
            delays.remove(&operation);
        } else {
            delays.insert(operation, delay);
        }
    }

    /// Operations called so far, in order
    pub fn calls(&self) -> Vec<Operation> {
        self.calls.lock().clone()
    }

    /// Execution ids passed to `cancel_execution`, in order
    pub fn cancelled(&self) -> Vec<String> {
        self.cancelled.lock().clone()
    }

    async fn answer<T>(&self, operation: Operation, data: T) -> ComposerResult<WorkflowResponse<T>> {
        self.calls.lock().push(operation);
        let delay = self.delays.lock().get(&operation).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(error) = self.failures.lock().get(&operation).cloned() {
            return Err(error);
        }
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(WorkflowResponse::ok(
            data,
            format!("exec-{}-{}", operation.slug(), id),
        ))
    }
}

#[async_trait]
impl AutomationBackend for ScriptedBackend {
    async fn process_keywords(
        &self,
        request: &KeywordsRequest,
    ) -> ComposerResult<WorkflowResponse<KeywordAnalysis>> {
        self.answer(Operation::Keywords, simulation::keyword_analysis(request)).await
    }

    async fn conduct_research(
        &self,
        _request: &ResearchRequest,
    ) -> ComposerResult<WorkflowResponse<ResearchResults>> {
        let sources = simulation::sources();
        let results = ResearchResults {
            total_found: sources.len() as u32,
            sources,
            search_queries: Vec::new(),
        };
        self.answer(Operation::Research, results).await
    }

    async fn deep_research(
        &self,
        _request: &DeepResearchRequest,
    ) -> ComposerResult<WorkflowResponse<Value>> {
        self.answer(Operation::DeepResearch, simulation::deep_research_records()).await
    }

    async fn analyze_sources(
        &self,
        sources: &[Source],
    ) -> ComposerResult<WorkflowResponse<SourceAnalysis>> {
        self.answer(Operation::SourceAnalysis, simulation::source_analysis(sources)).await
    }

    async fn generate_draft(
        &self,
        request: &DraftRequest,
    ) -> ComposerResult<WorkflowResponse<ArticleContent>> {
        self.answer(Operation::Draft, simulation::draft(request, None)).await
    }

    async fn analyze_quality(
        &self,
        article: &ArticleContent,
    ) -> ComposerResult<WorkflowResponse<QualityMetrics>> {
        self.answer(Operation::QualityAnalysis, simulation::quality(article)).await
    }

    async fn refine_draft(
        &self,
        article: &ArticleContent,
        feedback: &str,
    ) -> ComposerResult<WorkflowResponse<RefineResult>> {
        self.answer(Operation::Refine, simulation::refine(article, feedback)).await
    }

    async fn export_article(
        &self,
        article: &ArticleContent,
        format: ExportFormat,
    ) -> ComposerResult<WorkflowResponse<RemoteExport>> {
        let remote = RemoteExport {
            download_url: format!(
                "https://downloads.invalid/{}",
                crate::export::file_name(&article.title, format)
            ),
            preview_content: crate::export::render_markdown(article),
        };
        self.answer(Operation::Export, remote).await
    }

    async fn execution_status(
        &self,
        _execution_id: &str,
    ) -> ComposerResult<WorkflowResponse<ExecutionStatus>> {
        Ok(WorkflowResponse {
            success: true,
            data: Some(ExecutionStatus {
                status: ProgressStatus::Completed,
                progress: 100,
                current_step: "done".to_string(),
                start_time: "2024-01-01T00:00:00Z".to_string(),
                end_time: Some("2024-01-01T00:00:05Z".to_string()),
            }),
            execution_id: None,
            error: None,
        })
    }

    async fn cancel_execution(
        &self,
        execution_id: &str,
    ) -> ComposerResult<WorkflowResponse<CancelAck>> {
        self.cancelled.lock().push(execution_id.to_string());
        Ok(WorkflowResponse {
            success: true,
            data: Some(CancelAck { cancelled: true }),
            execution_id: None,
            error: None,
        })
    }
}
