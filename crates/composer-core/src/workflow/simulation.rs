//! Deterministic stand-ins for the automation backend
//!
//! Simulation mode runs the wizard end to end without a backend. Payloads
//! here are fixed so demos and tests see the same content every time.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::domain::{
    ArticleContent, Citation, DraftRequest, KeywordAnalysis, KeywordsRequest, OutlineItem,
    QualityMetrics, RefineResult, Source, SourceAnalysis, SourceCategory,
};

/// Pacing of simulated steps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Total time a simulated step takes
    #[serde(with = "millis")]
    pub duration: Duration,
    /// Number of progress ticks emitted before completion
    pub ticks: u8,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            duration: Duration::from_millis(1500),
            ticks: 5,
        }
    }
}

impl SimulationConfig {
    /// No delay at all, for tests and scripted runs
    pub fn instant() -> Self {
        Self {
            duration: Duration::ZERO,
            ticks: 5,
        }
    }

    pub(crate) fn tick_interval(&self) -> Duration {
        if self.ticks == 0 {
            self.duration
        } else {
            self.duration / u32::from(self.ticks)
        }
    }

    /// Progress percentages emitted in order, ending at 100
    pub(crate) fn tick_percentages(&self) -> Vec<u8> {
        let ticks = u32::from(self.ticks.max(1));
        (1..=ticks).map(|i| (i * 100 / ticks) as u8).collect()
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(deserializer)?))
    }
}

fn source(
    id: &str,
    title: &str,
    excerpt: &str,
    url: &str,
    domain: &str,
    score: u32,
    category: SourceCategory,
) -> Source {
    Source {
        id: id.to_string(),
        title: title.to_string(),
        excerpt: excerpt.to_string(),
        domain: domain.to_string(),
        url: url.to_string(),
        favicon: domain.split('.').next().unwrap_or(domain).to_string(),
        score,
        category,
    }
}

/// Research results used in simulation mode.
///
/// Includes one competitor link and one dead link so the review step has
/// something to flag.
pub fn sources() -> Vec<Source> {
    vec![
        source(
            "1",
            "The Future of Artificial Intelligence in Healthcare: A Comprehensive Review",
            "This study examines the transformative potential of AI technologies in medical diagnosis, treatment planning, and patient care optimization across various medical specialties.",
            "https://www.nature.com/articles/s41591-023-02455-0",
            "nature.com",
            95,
            SourceCategory::Academic,
        ),
        source(
            "2",
            "Machine Learning Applications in Clinical Decision Support Systems",
            "Recent advances in machine learning have enabled the development of sophisticated clinical decision support tools that assist healthcare professionals in making evidence-based decisions.",
            "https://pubmed.ncbi.nlm.nih.gov/articles/PMC8547821/",
            "pubmed.ncbi.nlm.nih.gov",
            92,
            SourceCategory::Academic,
        ),
        source(
            "3",
            "AI-Powered Diagnostic Tools: Current State and Future Prospects",
            "The integration of artificial intelligence in diagnostic imaging and laboratory medicine has shown remarkable promise in improving accuracy, efficiency, and patient outcomes.",
            "https://www.nejm.org/doi/full/10.1056/NEJMra2204892",
            "nejm.org",
            98,
            SourceCategory::Academic,
        ),
        source(
            "4",
            "Ethical Considerations in AI-Driven Healthcare Systems",
            "As artificial intelligence becomes more prevalent in healthcare, addressing ethical concerns around privacy, bias, and accountability becomes crucial for successful implementation.",
            "https://www.bioethics.org/ethical-ai-healthcare",
            "bioethics.org",
            88,
            SourceCategory::Web,
        ),
        source(
            "5",
            "Indeed Healthcare AI Jobs - Latest Opportunities",
            "Explore the latest artificial intelligence positions in healthcare technology companies.",
            "https://www.indeed.com/jobs?q=healthcare+ai",
            "indeed.com",
            45,
            SourceCategory::Web,
        ),
        source(
            "6",
            "Broken Link Example - 404 Not Found",
            "This is an example of a broken link that will fail validation during the source review process.",
            "https://nonexistent-domain-12345.com/broken-page",
            "nonexistent-domain-12345.com",
            20,
            SourceCategory::Web,
        ),
    ]
}

pub fn keyword_analysis(request: &KeywordsRequest) -> KeywordAnalysis {
    let processed_keywords = if request.tags.is_empty() {
        vec![request.query.trim().to_lowercase()]
    } else {
        request.tags.clone()
    };
    KeywordAnalysis {
        processed_keywords,
        search_strategy: "academic-first".to_string(),
        estimated_sources: sources().len() as u32,
    }
}

/// Raw deep-research records in the shape the backend returns them
pub fn deep_research_records() -> Value {
    json!([
        {
            "heading": "AI diagnostics match specialist accuracy in imaging",
            "evidence": "See [Nature review](https://www.nature.com/articles/s41591-023-02455-0)",
            "source": "nature.com"
        },
        {
            "heading": "Clinical decision support reduces diagnostic errors",
            "evidence": "Reported in [PubMed](https://pubmed.ncbi.nlm.nih.gov/articles/PMC8547821/)",
            "source": "pubmed.ncbi.nlm.nih.gov"
        },
        {
            "heading": "Bias and accountability remain open concerns",
            "evidence": null,
            "source": "https://www.bioethics.org/ethical-ai-healthcare"
        },
        { "heading": "", "source": "incomplete record" }
    ])
}

/// Ranks sources by score and recommends dropping weak ones
pub fn source_analysis(sources: &[Source]) -> SourceAnalysis {
    let mut analyzed = sources.to_vec();
    analyzed.sort_by(|a, b| b.score.cmp(&a.score));
    let recommendations = analyzed
        .iter()
        .filter(|s| s.score < 50)
        .map(|s| format!("Consider removing low-relevance source: {}", s.title))
        .collect();
    SourceAnalysis {
        analyzed_sources: analyzed,
        recommendations,
    }
}

pub fn outline() -> Vec<OutlineItem> {
    [
        "Introduction to AI in Healthcare",
        "Current Applications and Technologies",
        "Benefits and Efficiency Gains",
        "Challenges and Limitations",
        "Future Prospects and Developments",
        "Conclusion and Recommendations",
    ]
    .iter()
    .zip(1u32..)
    .map(|(title, order)| OutlineItem {
        id: order.to_string(),
        title: title.to_string(),
        order,
    })
    .collect()
}

/// Draft built from the request's sources and outline
pub fn draft(request: &DraftRequest, query: Option<&str>) -> ArticleContent {
    let outline = if request.outline.is_empty() {
        outline()
    } else {
        request.outline.clone()
    };
    let citations: Vec<Citation> = request
        .sources
        .iter()
        .zip(1u32..)
        .map(|(source, number)| Citation {
            id: source.id.clone(),
            number,
            title: source.title.clone(),
            source: source.domain.clone(),
            url: source.url.clone(),
        })
        .collect();

    let topic = query
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .unwrap_or("Artificial Intelligence in Healthcare");
    let title = format!("The Transformative Impact of {}", topic);

    let mut content = format!("# {}\n", title);
    for (index, item) in outline.iter().enumerate() {
        content.push_str(&format!("\n## {}\n\n", item.title));
        content.push_str(&format!(
            "This section covers {} in a {} tone.",
            item.title.to_lowercase(),
            request.tone
        ));
        if !citations.is_empty() {
            let cited = &citations[index % citations.len()];
            content.push_str(&format!(" [{}]", cited.number));
        }
        content.push('\n');
    }

    ArticleContent {
        title,
        content,
        citations,
        outline,
        metrics: None,
    }
}

pub fn quality(_article: &ArticleContent) -> QualityMetrics {
    QualityMetrics {
        conciseness: 4.0,
        coherence: 3.0,
        readability: Some(5.0),
        tone: Some(2.0),
        feedback: Some(
            "Transitions between sections are abrupt and the tone drifts from academic to casual."
                .to_string(),
        ),
    }
}

/// Applies feedback: appends a revision note and lifts coherence and tone
pub fn refine(article: &ArticleContent, feedback: &str) -> RefineResult {
    let mut metrics = article.metrics.clone().unwrap_or_else(|| quality(article));
    metrics.coherence = (metrics.coherence + 1.0).min(5.0);
    metrics.tone = Some((metrics.tone.unwrap_or(3.0) + 2.0).min(5.0));
    metrics.feedback = None;

    let mut refined = article.content.trim_end().to_string();
    if !feedback.trim().is_empty() {
        refined.push_str(&format!("\n\n## Revision Notes\n\n{}\n", feedback.trim()));
    }

    RefineResult {
        evaluation_result: metrics,
        refined_article: refined,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize_deep_research;

    #[test]
    fn tick_percentages_end_at_one_hundred() {
        let config = SimulationConfig::default();
        assert_eq!(config.tick_percentages(), vec![20, 40, 60, 80, 100]);
        assert_eq!(config.tick_interval(), Duration::from_millis(300));

        let single = SimulationConfig {
            duration: Duration::ZERO,
            ticks: 0,
        };
        assert_eq!(single.tick_percentages(), vec![100]);
    }

    #[test]
    fn deep_research_records_normalize() {
        let (facts, sources) = normalize_deep_research(deep_research_records()).unwrap();
        assert_eq!(facts.len(), 3);
        assert_eq!(sources[0].url, "https://www.nature.com/articles/s41591-023-02455-0");
        assert_eq!(sources[2].url, "https://www.bioethics.org/ethical-ai-healthcare");
    }

    #[test]
    fn draft_cites_every_source() {
        let request = DraftRequest::academic(sources()[..3].to_vec());
        let article = draft(&request, Some("AI in radiology"));
        assert_eq!(article.title, "The Transformative Impact of AI in radiology");
        assert_eq!(article.citations.len(), 3);
        assert_eq!(article.outline.len(), 6);
        assert!(article.content.contains("[3]"));
        assert!(article.word_count() > 50);
    }

    #[test]
    fn refine_improves_weak_metrics() {
        let mut article = draft(&DraftRequest::academic(sources()), None);
        article.metrics = Some(quality(&article));
        let result = refine(&article, "Smooth the transitions");
        assert_eq!(result.evaluation_result.coherence, 4.0);
        assert_eq!(result.evaluation_result.tone, Some(4.0));
        assert!(result.refined_article.ends_with("Smooth the transitions\n"));
    }

    #[test]
    fn analysis_flags_low_scores() {
        let analysis = source_analysis(&sources());
        assert_eq!(analysis.analyzed_sources[0].score, 98);
        assert_eq!(analysis.recommendations.len(), 2);
    }
}
