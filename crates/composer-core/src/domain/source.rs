use serde::{Deserialize, Serialize};

use super::links::LinkStatus;

/// Category tag attached to every source
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceCategory {
    Academic,
    #[default]
    Web,
    News,
    Report,
}

/// A research source as produced by the research workflows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Source {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub excerpt: String,
    #[serde(default)]
    pub domain: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub favicon: String,
    /// Relevance score, 0-100
    #[serde(default)]
    pub score: u32,
    #[serde(rename = "type", default)]
    pub category: SourceCategory,
}

/// A source under review: the immutable record plus review annotations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewedSource {
    #[serde(flatten)]
    pub source: Source,
    pub selected: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<LinkStatus>,
}

impl ReviewedSource {
    /// Whether the link sweep flagged this source
    pub fn is_flagged(&self) -> bool {
        matches!(self.validation, Some(LinkStatus::Invalid) | Some(LinkStatus::Competitor))
    }
}

impl From<Source> for ReviewedSource {
    fn from(source: Source) -> Self {
        Self {
            source,
            selected: true,
            validation: None,
        }
    }
}

/// A raw fact returned by the deep-research workflow
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeepResearchFact {
    pub heading: String,
    #[serde(default)]
    pub evidence: Option<String>,
    pub source: String,
}

/// Backend answer to source analysis
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SourceAnalysis {
    pub analyzed_sources: Vec<Source>,
    pub recommendations: Vec<String>,
}
