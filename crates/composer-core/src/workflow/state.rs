use serde::Serialize;

use crate::domain::{
    ArticleContent, DeepResearchFact, KeywordAnalysis, KeywordsRequest, LinkReport, LinkStatus,
    QualityMetrics, RefineResult, ReviewedSource, Source, SourceAnalysis,
};
use crate::export::ExportArtifact;

use super::step::Step;

/// Everything the wizard has accumulated so far.
///
/// Only the coordinator mutates this; callers get a shared reference.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkflowState {
    pub step: Step,
    /// Execution the coordinator is awaiting progress for
    pub execution_id: Option<String>,
    pub keywords: Option<KeywordsRequest>,
    pub keyword_analysis: Option<KeywordAnalysis>,
    pub sources: Vec<ReviewedSource>,
    pub facts: Vec<DeepResearchFact>,
    pub recommendations: Vec<String>,
    pub draft: Option<ArticleContent>,
    pub quality: Option<QualityMetrics>,
    /// Feedback last sent with a refinement request
    pub feedback: Option<String>,
    pub export: Option<ExportArtifact>,
    pub loading: bool,
    pub error: Option<String>,
    pub progress: u8,
}

impl Default for WorkflowState {
    fn default() -> Self {
        Self {
            step: Step::Keywords,
            execution_id: None,
            keywords: None,
            keyword_analysis: None,
            sources: Vec::new(),
            facts: Vec::new(),
            recommendations: Vec::new(),
            draft: None,
            quality: None,
            feedback: None,
            export: None,
            loading: false,
            error: None,
            progress: 0,
        }
    }
}

/// Result of a successful step call, ready to be folded into the state
#[derive(Debug, Clone, PartialEq)]
pub enum StepPayload {
    Keywords {
        request: KeywordsRequest,
        analysis: KeywordAnalysis,
    },
    Research {
        sources: Vec<Source>,
    },
    DeepResearch {
        facts: Vec<DeepResearchFact>,
        sources: Vec<Source>,
    },
    SourceAnalysis(SourceAnalysis),
    Draft(ArticleContent),
    Quality(QualityMetrics),
    Refined {
        result: RefineResult,
        feedback: String,
    },
    Export(ExportArtifact),
}

impl WorkflowState {
    pub(crate) fn apply(&mut self, payload: StepPayload) {
        match payload {
            StepPayload::Keywords { request, analysis } => {
                self.keywords = Some(request);
                self.keyword_analysis = Some(analysis);
            }
            StepPayload::Research { sources } => {
                self.sources = sources.into_iter().map(ReviewedSource::from).collect();
                self.facts.clear();
            }
            StepPayload::DeepResearch { facts, sources } => {
                self.sources = sources.into_iter().map(ReviewedSource::from).collect();
                self.facts = facts;
            }
            StepPayload::SourceAnalysis(analysis) => {
                self.merge_analyzed(analysis.analyzed_sources);
                self.recommendations = analysis.recommendations;
            }
            StepPayload::Draft(article) => {
                self.draft = Some(article);
                self.quality = None;
                self.export = None;
            }
            StepPayload::Quality(metrics) => {
                if let Some(draft) = self.draft.as_mut() {
                    draft.metrics = Some(metrics.clone());
                }
                self.quality = Some(metrics);
            }
            StepPayload::Refined { result, feedback } => {
                if let Some(draft) = self.draft.as_mut() {
                    draft.content = result.refined_article;
                    draft.metrics = Some(result.evaluation_result.clone());
                }
                self.quality = Some(result.evaluation_result);
                self.feedback = Some(feedback);
                self.export = None;
            }
            StepPayload::Export(artifact) => {
                self.export = Some(artifact);
            }
        }
    }

    /// Analysis output replaces the source list but keeps review flags.
    /// An empty analysis leaves the list untouched.
    fn merge_analyzed(&mut self, analyzed: Vec<Source>) {
        if analyzed.is_empty() {
            return;
        }
        let previous = std::mem::take(&mut self.sources);
        self.sources = analyzed
            .into_iter()
            .map(|source| match previous.iter().find(|p| p.source.id == source.id) {
                Some(prior) => ReviewedSource {
                    source,
                    selected: prior.selected,
                    validation: prior.validation,
                },
                None => ReviewedSource::from(source),
            })
            .collect();
    }

    pub fn selected_sources(&self) -> Vec<Source> {
        self.sources
            .iter()
            .filter(|s| s.selected)
            .map(|s| s.source.clone())
            .collect()
    }

    pub fn selected_count(&self) -> usize {
        self.sources.iter().filter(|s| s.selected).count()
    }

    pub(crate) fn source_mut(&mut self, id: &str) -> Option<&mut ReviewedSource> {
        self.sources.iter_mut().find(|s| s.source.id == id)
    }

    /// Attach validation results and deselect flagged links.
    ///
    /// Returns how many sources ended up flagged.
    pub(crate) fn apply_link_report(&mut self, report: &LinkReport) -> usize {
        let mut flagged = 0;
        for reviewed in &mut self.sources {
            if let Some(status) = report.status_of(&reviewed.source.url) {
                reviewed.validation = Some(status);
                if status != LinkStatus::Valid {
                    reviewed.selected = false;
                    flagged += 1;
                }
            }
        }
        flagged
    }
}
