use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, instrument, warn};

use composer_core::backend::{AutomationBackend, CancelAck, ExecutionStatus, WorkflowResponse};
use composer_core::domain::{
    ArticleContent, DeepResearchRequest, DraftRequest, KeywordAnalysis, KeywordsRequest,
    QualityMetrics, RefineResult, ResearchRequest, ResearchResults, Source, SourceAnalysis,
};
use composer_core::normalize::unwrap_envelope;
use composer_core::{ComposerError, ComposerResult, ExportFormat, RemoteExport};

use crate::config::ClientConfig;
use crate::endpoint::Endpoint;

/// HTTP client for the automation backend's webhooks
#[derive(Debug, Clone)]
pub struct BackendClient {
    config: ClientConfig,
    http: Client,
}

impl BackendClient {
    pub fn new(config: ClientConfig) -> ComposerResult<Self> {
        config.validate()?;
        let http = Client::builder()
            .build()
            .map_err(|e| ComposerError::Configuration(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { config, http })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn url(&self, endpoint: Endpoint) -> String {
        format!("{}{}", self.config.base(), endpoint.path())
    }

    /// POST `payload` to an endpoint and return the raw JSON body.
    ///
    /// The timeout is `timeout_override`, else the endpoint's own, else the
    /// client default.
    #[instrument(skip(self, payload), fields(endpoint = %endpoint))]
    pub async fn call_raw<P>(
        &self,
        endpoint: Endpoint,
        payload: &P,
        timeout_override: Option<Duration>,
    ) -> ComposerResult<Value>
    where
        P: Serialize + ?Sized,
    {
        let timeout = timeout_override
            .or_else(|| endpoint.timeout())
            .unwrap_or_else(|| self.config.timeout());
        debug!(timeout_ms = timeout.as_millis() as u64, "Sending backend request");

        let mut request = self.http.post(self.url(endpoint)).timeout(timeout).json(payload);
        if let Some(api_key) = &self.config.api_key {
            request = request.bearer_auth(api_key);
        }

        let response = request.send().await.map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let reason = status.canonical_reason().unwrap_or("Unknown Status").to_string();
            warn!(status = status.as_u16(), "Backend request failed: {}", reason);
            return Err(ComposerError::Status {
                status: status.as_u16(),
                reason,
            });
        }

        let body = response.text().await.map_err(map_transport_error)?;
        serde_json::from_str(&body).map_err(|e| {
            ComposerError::Parse(format!("{} returned malformed JSON: {}", endpoint, e))
        })
    }

    /// POST `payload` and decode the response envelope
    pub async fn call<T, P>(
        &self,
        endpoint: Endpoint,
        payload: &P,
        timeout_override: Option<Duration>,
    ) -> ComposerResult<WorkflowResponse<T>>
    where
        T: DeserializeOwned,
        P: Serialize + ?Sized,
    {
        let body = self.call_raw(endpoint, payload, timeout_override).await?;
        serde_json::from_value(body).map_err(|e| {
            ComposerError::Parse(format!("{} returned an unexpected envelope: {}", endpoint, e))
        })
    }
}

fn map_transport_error(error: reqwest::Error) -> ComposerError {
    if error.is_timeout() {
        ComposerError::Network(format!("Request timeout: {}", error))
    } else if error.is_connect() {
        ComposerError::Network(format!("Connection error: {}", error))
    } else if error.is_decode() {
        ComposerError::Parse(format!("Failed to read response body: {}", error))
    } else {
        ComposerError::Network(format!("HTTP error: {}", error))
    }
}

#[async_trait]
impl AutomationBackend for BackendClient {
    async fn process_keywords(
        &self,
        request: &KeywordsRequest,
    ) -> ComposerResult<WorkflowResponse<KeywordAnalysis>> {
        self.call(Endpoint::Keywords, request, None).await
    }

    async fn conduct_research(
        &self,
        request: &ResearchRequest,
    ) -> ComposerResult<WorkflowResponse<ResearchResults>> {
        self.call(Endpoint::Research, request, None).await
    }

    async fn deep_research(
        &self,
        request: &DeepResearchRequest,
    ) -> ComposerResult<WorkflowResponse<Value>> {
        let body = self.call_raw(Endpoint::DeepResearch, request, None).await?;
        unwrap_envelope(body)
    }

    async fn analyze_sources(
        &self,
        sources: &[Source],
    ) -> ComposerResult<WorkflowResponse<SourceAnalysis>> {
        self.call(Endpoint::SourceAnalysis, &json!({ "sources": sources }), None)
            .await
    }

    async fn generate_draft(
        &self,
        request: &DraftRequest,
    ) -> ComposerResult<WorkflowResponse<ArticleContent>> {
        self.call(Endpoint::Draft, request, None).await
    }

    async fn analyze_quality(
        &self,
        article: &ArticleContent,
    ) -> ComposerResult<WorkflowResponse<QualityMetrics>> {
        self.call(Endpoint::Quality, &json!({ "article": article.content }), None)
            .await
    }

    async fn refine_draft(
        &self,
        article: &ArticleContent,
        feedback: &str,
    ) -> ComposerResult<WorkflowResponse<RefineResult>> {
        let payload = json!({ "article": article.content, "feedback": feedback });
        self.call(Endpoint::Refine, &payload, None).await
    }

    async fn export_article(
        &self,
        article: &ArticleContent,
        format: ExportFormat,
    ) -> ComposerResult<WorkflowResponse<RemoteExport>> {
        let payload = json!({ "content": article, "format": format });
        self.call(Endpoint::Export, &payload, None).await
    }

    async fn execution_status(
        &self,
        execution_id: &str,
    ) -> ComposerResult<WorkflowResponse<ExecutionStatus>> {
        self.call(
            Endpoint::ExecutionStatus,
            &json!({ "executionId": execution_id }),
            None,
        )
        .await
    }

    async fn cancel_execution(
        &self,
        execution_id: &str,
    ) -> ComposerResult<WorkflowResponse<CancelAck>> {
        self.call(
            Endpoint::CancelExecution,
            &json!({ "executionId": execution_id }),
            None,
        )
        .await
    }
}
