use serde::{Deserialize, Serialize};

use super::source::Source;

/// Scores at or above this value (on a 0-5 scale) pass review
pub const DEFAULT_PASS_THRESHOLD: f64 = 3.0;

/// A section heading in the article outline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlineItem {
    pub id: String,
    pub title: String,
    pub order: u32,
}

/// A numbered reference to a source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    pub id: String,
    pub number: u32,
    pub title: String,
    pub source: String,
    #[serde(default)]
    pub url: String,
}

/// Quality scores for a draft
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityMetrics {
    pub conciseness: f64,
    pub coherence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub readability: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tone: Option<f64>,
    /// Free-text reviewer feedback
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
}

impl QualityMetrics {
    /// Named scores that are present, in display order
    pub fn scores(&self) -> Vec<(&'static str, f64)> {
        let mut scores = vec![("conciseness", self.conciseness), ("coherence", self.coherence)];
        if let Some(readability) = self.readability {
            scores.push(("readability", readability));
        }
        if let Some(tone) = self.tone {
            scores.push(("tone", tone));
        }
        scores
    }

    /// Mean of the present scores
    pub fn average(&self) -> f64 {
        let scores = self.scores();
        scores.iter().map(|(_, s)| s).sum::<f64>() / scores.len() as f64
    }

    /// True when every present score reaches the threshold
    pub fn passes(&self, threshold: f64) -> bool {
        self.scores().iter().all(|(_, s)| *s >= threshold)
    }
}

/// The article being written
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleContent {
    pub title: String,
    /// Markdown body
    pub content: String,
    #[serde(default)]
    pub citations: Vec<Citation>,
    #[serde(default)]
    pub outline: Vec<OutlineItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<QualityMetrics>,
}

impl ArticleContent {
    pub fn word_count(&self) -> usize {
        self.content.split_whitespace().count()
    }

    pub fn sentence_count(&self) -> usize {
        self.content
            .split(['.', '!', '?'])
            .filter(|s| !s.trim().is_empty())
            .count()
    }

    /// Append a `[n]` marker for the given citation number
    pub fn insert_citation(&mut self, number: u32) {
        self.content.push_str(&format!("[{}]", number));
    }

    /// Append a new section to the outline and return its id
    pub fn add_outline_item(&mut self, title: impl Into<String>) -> String {
        let order = self.outline.len() as u32 + 1;
        let id = format!("section-{}", order);
        self.outline.push(OutlineItem {
            id: id.clone(),
            title: title.into(),
            order,
        });
        id
    }
}

/// Draft step input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftRequest {
    pub sources: Vec<Source>,
    pub outline: Vec<OutlineItem>,
    pub template: String,
    pub tone: String,
    pub target_length: u32,
}

impl DraftRequest {
    /// Academic-template request over the given sources
    pub fn academic(sources: Vec<Source>) -> Self {
        Self {
            sources,
            outline: Vec::new(),
            template: "academic".to_string(),
            tone: "formal".to_string(),
            target_length: 1500,
        }
    }
}

/// Backend answer to a refine request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefineResult {
    pub evaluation_result: QualityMetrics,
    pub refined_article: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(conciseness: f64, coherence: f64, readability: Option<f64>, tone: Option<f64>) -> QualityMetrics {
        QualityMetrics {
            conciseness,
            coherence,
            readability,
            tone,
            feedback: None,
        }
    }

    #[test]
    fn average_uses_only_present_scores() {
        assert_eq!(metrics(4.0, 2.0, None, None).average(), 3.0);
        assert_eq!(metrics(4.0, 3.0, Some(5.0), Some(2.0)).average(), 3.5);
    }

    #[test]
    fn passes_requires_every_score() {
        assert!(metrics(4.0, 3.0, Some(5.0), None).passes(DEFAULT_PASS_THRESHOLD));
        assert!(!metrics(4.0, 3.0, Some(5.0), Some(2.0)).passes(DEFAULT_PASS_THRESHOLD));
    }

    #[test]
    fn counts_words_and_sentences() {
        let article = ArticleContent {
            title: "t".to_string(),
            content: "AI helps. Does it scale? Yes!".to_string(),
            citations: vec![],
            outline: vec![],
            metrics: None,
        };
        assert_eq!(article.word_count(), 6);
        assert_eq!(article.sentence_count(), 3);
    }

    #[test]
    fn outline_items_are_numbered_in_order() {
        let mut article = ArticleContent {
            title: "t".to_string(),
            content: String::new(),
            citations: vec![],
            outline: vec![],
            metrics: None,
        };
        article.add_outline_item("Introduction");
        let id = article.add_outline_item("Conclusion");
        assert_eq!(id, "section-2");
        assert_eq!(article.outline[1].order, 2);

        article.insert_citation(4);
        assert_eq!(article.content, "[4]");
    }
}
