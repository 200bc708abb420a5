//! Domain model for the article wizard
//!
//! Payload shapes exchanged with the automation backend and accumulated in
//! the workflow state. Field names follow the backend's camelCase JSON.

pub mod article;
pub mod keywords;
pub mod links;
pub mod source;

pub use article::{
    ArticleContent, Citation, DraftRequest, OutlineItem, QualityMetrics, RefineResult,
    DEFAULT_PASS_THRESHOLD,
};
pub use keywords::{
    derive_tags, DeepResearchRequest, KeywordAnalysis, KeywordsRequest, ResearchRequest,
    ResearchResults,
};
pub use links::{LinkReport, LinkStatus};
pub use source::{DeepResearchFact, ReviewedSource, Source, SourceAnalysis, SourceCategory};
