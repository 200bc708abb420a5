use serde::{Deserialize, Serialize};

use super::source::SourceCategory;

const STOP_WORDS: &[&str] = &[
    "the", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by",
];

/// Keyword step input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeywordsRequest {
    /// Research question or keywords as typed by the user
    pub query: String,
    /// Tags derived from the query, editable by the user
    pub tags: Vec<String>,
    /// Output language
    pub language: String,
    /// Research depth, 1 (shallow) to 5 (exhaustive)
    pub depth: u8,
    /// Whether the backend should explode each keyword into sub-queries
    pub exploded_results: bool,
}

impl KeywordsRequest {
    /// Create a request with tags derived from the query and default options
    pub fn new(query: impl Into<String>) -> Self {
        let query = query.into();
        let tags = derive_tags(&query);
        Self {
            query,
            tags,
            language: "english".to_string(),
            depth: 3,
            exploded_results: false,
        }
    }

    /// Remove a tag the user dismissed
    pub fn remove_tag(&mut self, tag: &str) {
        self.tags.retain(|t| t != tag);
    }
}

/// Derive up to five tags from a query.
///
/// Queries of ten characters or fewer produce no tags. Otherwise the query is
/// lowercased and split on spaces; words of four or more characters that are
/// not stop words are kept in order.
pub fn derive_tags(query: &str) -> Vec<String> {
    if query.chars().count() <= 10 {
        return Vec::new();
    }

    query
        .to_lowercase()
        .split(' ')
        .filter(|word| word.chars().count() > 3 && !STOP_WORDS.contains(word))
        .take(5)
        .map(str::to_string)
        .collect()
}

/// Backend answer to keyword analysis
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct KeywordAnalysis {
    pub processed_keywords: Vec<String>,
    pub search_strategy: String,
    pub estimated_sources: u32,
}

/// Research step input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResearchRequest {
    pub keywords: KeywordsRequest,
    pub max_sources: u32,
    pub source_types: Vec<SourceCategory>,
}

impl ResearchRequest {
    /// Research request covering every source category
    pub fn for_keywords(keywords: KeywordsRequest) -> Self {
        Self {
            keywords,
            max_sources: 20,
            source_types: vec![
                SourceCategory::Academic,
                SourceCategory::Web,
                SourceCategory::News,
                SourceCategory::Report,
            ],
        }
    }
}

/// Backend answer to the research call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResearchResults {
    pub sources: Vec<super::Source>,
    pub total_found: u32,
    pub search_queries: Vec<String>,
}

/// Deep-research step input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeepResearchRequest {
    pub query: String,
    pub tags: Vec<String>,
    pub depth: u8,
}

impl From<&KeywordsRequest> for DeepResearchRequest {
    fn from(keywords: &KeywordsRequest) -> Self {
        Self {
            query: keywords.query.clone(),
            tags: keywords.tags.clone(),
            depth: keywords.depth,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_query_has_no_tags() {
        assert!(derive_tags("AI health").is_empty());
    }

    #[test]
    fn tags_skip_short_and_stop_words() {
        let tags = derive_tags("Impact of artificial intelligence on healthcare");
        assert_eq!(tags, vec!["impact", "artificial", "intelligence", "healthcare"]);
    }

    #[test]
    fn tags_are_capped_at_five() {
        let tags = derive_tags("alpha bravo charlie delta echoes foxtrot golfing");
        assert_eq!(tags.len(), 5);
        assert_eq!(tags[4], "echoes");
    }

    #[test]
    fn remove_tag_drops_only_that_tag() {
        let mut request = KeywordsRequest::new("Renewable energy adoption trends");
        request.remove_tag("energy");
        assert_eq!(request.tags, vec!["renewable", "adoption", "trends"]);
    }
}
