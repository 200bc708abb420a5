//! Shared fixtures for composer-core integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use mockall::mock;
use serde_json::Value;
use tracing_subscriber::{fmt, EnvFilter};

use composer_core::backend::{
    AutomationBackend, CancelAck, ExecutionStatus, WorkflowResponse,
};
use composer_core::domain::{
    ArticleContent, DeepResearchRequest, DraftRequest, KeywordAnalysis, KeywordsRequest,
    QualityMetrics, RefineResult, ResearchRequest, ResearchResults, Source, SourceAnalysis,
};
use composer_core::{ComposerResult, CoordinatorConfig, ExportFormat, RemoteExport, SimulationConfig, StepSequence};

/// Initialize test tracing
pub fn init_test_tracing() {
    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("composer_core=debug".parse().unwrap()),
        )
        .with_test_writer()
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}

mock! {
    pub Backend {}

    #[async_trait]
    impl AutomationBackend for Backend {
        async fn process_keywords(&self, request: &KeywordsRequest) -> ComposerResult<WorkflowResponse<KeywordAnalysis>>;
        async fn conduct_research(&self, request: &ResearchRequest) -> ComposerResult<WorkflowResponse<ResearchResults>>;
        async fn deep_research(&self, request: &DeepResearchRequest) -> ComposerResult<WorkflowResponse<Value>>;
        async fn analyze_sources(&self, sources: &[Source]) -> ComposerResult<WorkflowResponse<SourceAnalysis>>;
        async fn generate_draft(&self, request: &DraftRequest) -> ComposerResult<WorkflowResponse<ArticleContent>>;
        async fn analyze_quality(&self, article: &ArticleContent) -> ComposerResult<WorkflowResponse<QualityMetrics>>;
        async fn refine_draft(&self, article: &ArticleContent, feedback: &str) -> ComposerResult<WorkflowResponse<RefineResult>>;
        async fn export_article(&self, article: &ArticleContent, format: ExportFormat) -> ComposerResult<WorkflowResponse<RemoteExport>>;
        async fn execution_status(&self, execution_id: &str) -> ComposerResult<WorkflowResponse<ExecutionStatus>>;
        async fn cancel_execution(&self, execution_id: &str) -> ComposerResult<WorkflowResponse<CancelAck>>;
    }
}

/// Standard sequence with no simulated delay
pub fn instant_config() -> CoordinatorConfig {
    CoordinatorConfig {
        sequence: StepSequence::standard(),
        simulation: SimulationConfig::instant(),
    }
}

pub fn folded_config() -> CoordinatorConfig {
    CoordinatorConfig {
        sequence: StepSequence::folded(),
        simulation: SimulationConfig::instant(),
    }
}

pub fn analysis() -> KeywordAnalysis {
    KeywordAnalysis {
        processed_keywords: vec!["artificial".to_string(), "intelligence".to_string()],
        search_strategy: "academic-first".to_string(),
        estimated_sources: 12,
    }
}

pub fn keywords() -> KeywordsRequest {
    KeywordsRequest::new("Impact of artificial intelligence on healthcare")
}
