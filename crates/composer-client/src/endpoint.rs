use std::fmt;
use std::time::Duration;

/// Backend webhooks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Keywords,
    Research,
    DeepResearch,
    SourceAnalysis,
    Draft,
    Quality,
    Refine,
    Export,
    ExecutionStatus,
    CancelExecution,
}

impl Endpoint {
    pub fn path(self) -> &'static str {
        match self {
            Endpoint::Keywords => "/webhook/keywords-analysis",
            Endpoint::Research => "/webhook/research",
            Endpoint::DeepResearch => "/webhook/deep-research",
            Endpoint::SourceAnalysis => "/webhook/source-analysis",
            Endpoint::Draft => "/webhook/generate-draft",
            Endpoint::Quality => "/webhook/score-article",
            Endpoint::Refine => "/webhook/refine-draft",
            Endpoint::Export => "/webhook/export",
            Endpoint::ExecutionStatus => "/webhook/execution-status",
            Endpoint::CancelExecution => "/webhook/cancel-execution",
        }
    }

    /// Endpoint-specific timeout; `None` uses the client default
    pub fn timeout(self) -> Option<Duration> {
        match self {
            Endpoint::Research => Some(Duration::from_secs(60)),
            Endpoint::Draft => Some(Duration::from_secs(120)),
            _ => None,
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}
