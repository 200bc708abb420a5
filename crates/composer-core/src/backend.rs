//! Contract between the workflow coordinator and the automation backend
//!
//! The coordinator only sees this trait. `composer-client` provides the HTTP
//! implementation; tests use mocks or the scripted backend in [`crate::testing`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{
    ArticleContent, DeepResearchRequest, DraftRequest, KeywordAnalysis, KeywordsRequest,
    QualityMetrics, RefineResult, ResearchRequest, ResearchResults, Source, SourceAnalysis,
};
use crate::error::{ComposerError, ComposerResult};
use crate::export::{ExportFormat, RemoteExport};
use crate::progress::ProgressStatus;

/// Response envelope shared by every backend endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub execution_id: Option<String>,
    pub error: Option<String>,
}

/// Payload of a successful envelope
#[derive(Debug, Clone, PartialEq)]
pub struct Accepted<T> {
    pub data: T,
    pub execution_id: Option<String>,
}

impl<T> WorkflowResponse<T> {
    /// Successful envelope
    pub fn ok(data: T, execution_id: impl Into<String>) -> Self {
        Self {
            success: true,
            data: Some(data),
            execution_id: Some(execution_id.into()),
            error: None,
        }
    }

    /// Failed envelope carrying the backend's message
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            execution_id: None,
            error: Some(error.into()),
        }
    }

    /// Turn the envelope into its payload.
    ///
    /// `success: false` becomes a backend error with the reported message, or
    /// `fallback` when the backend sent none.
    pub fn into_result(self, fallback: &str) -> ComposerResult<Accepted<T>> {
        if !self.success {
            return Err(ComposerError::Backend(
                self.error.unwrap_or_else(|| fallback.to_string()),
            ));
        }

        let data = self
            .data
            .ok_or_else(|| ComposerError::Parse("response is missing data".to_string()))?;

        Ok(Accepted {
            data,
            execution_id: self.execution_id,
        })
    }
}

/// Status of a remote execution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionStatus {
    pub status: ProgressStatus,
    pub progress: u8,
    #[serde(default)]
    pub current_step: String,
    #[serde(default)]
    pub start_time: String,
    #[serde(default)]
    pub end_time: Option<String>,
}

/// Acknowledgement of a cancel request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelAck {
    pub cancelled: bool,
}

/// Remote automation backend, one method per workflow endpoint
#[async_trait]
pub trait AutomationBackend: Send + Sync {
    /// Step 1: keyword analysis
    async fn process_keywords(
        &self,
        request: &KeywordsRequest,
    ) -> ComposerResult<WorkflowResponse<KeywordAnalysis>>;

    /// Step 2: research and source discovery
    async fn conduct_research(
        &self,
        request: &ResearchRequest,
    ) -> ComposerResult<WorkflowResponse<ResearchResults>>;

    /// Step 2 (variant): deep research. The data is returned untyped and
    /// normalised by the coordinator.
    async fn deep_research(
        &self,
        request: &DeepResearchRequest,
    ) -> ComposerResult<WorkflowResponse<Value>>;

    /// Step 3: source analysis and scoring
    async fn analyze_sources(
        &self,
        sources: &[Source],
    ) -> ComposerResult<WorkflowResponse<SourceAnalysis>>;

    /// Step 4: draft generation
    async fn generate_draft(
        &self,
        request: &DraftRequest,
    ) -> ComposerResult<WorkflowResponse<ArticleContent>>;

    /// Step 5: quality scoring
    async fn analyze_quality(
        &self,
        article: &ArticleContent,
    ) -> ComposerResult<WorkflowResponse<QualityMetrics>>;

    /// Step 5: refine the draft with reviewer feedback
    async fn refine_draft(
        &self,
        article: &ArticleContent,
        feedback: &str,
    ) -> ComposerResult<WorkflowResponse<RefineResult>>;

    /// Step 6: export and formatting
    async fn export_article(
        &self,
        article: &ArticleContent,
        format: ExportFormat,
    ) -> ComposerResult<WorkflowResponse<RemoteExport>>;

    /// Status of a running execution
    async fn execution_status(
        &self,
        execution_id: &str,
    ) -> ComposerResult<WorkflowResponse<ExecutionStatus>>;

    /// Ask the backend to abort an execution
    async fn cancel_execution(
        &self,
        execution_id: &str,
    ) -> ComposerResult<WorkflowResponse<CancelAck>>;
}
