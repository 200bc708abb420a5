//! Normalisation boundary for loosely shaped backend payloads
//!
//! The deep-research workflow sometimes wraps its envelope in a one-element
//! array, sometimes returns a single fact instead of a list, and sometimes
//! returns the fact list JSON-encoded inside a string. Everything is unwrapped
//! here; records that cannot be used are dropped rather than failing the batch.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::backend::WorkflowResponse;
use crate::domain::{DeepResearchFact, Source, SourceCategory};
use crate::error::{ComposerError, ComposerResult};

fn markdown_link() -> &'static Regex {
    static MARKDOWN_LINK: OnceLock<Regex> = OnceLock::new();
    MARKDOWN_LINK.get_or_init(|| {
        Regex::new(r"\[.*?\]\((https?://[^\s)]+)\)").expect("markdown link pattern is valid")
    })
}

/// Decode an envelope that may be wrapped in an array of one
pub fn unwrap_envelope(raw: Value) -> ComposerResult<WorkflowResponse<Value>> {
    let raw = match raw {
        Value::Array(mut items) => {
            if items.is_empty() {
                return Err(ComposerError::Parse("empty response array".to_string()));
            }
            items.swap_remove(0)
        }
        other => other,
    };
    Ok(serde_json::from_value(raw)?)
}

/// Flatten the `data` of a deep-research response into a list of candidate
/// fact records.
pub fn fact_records(data: Value) -> ComposerResult<Vec<Value>> {
    let records = match data {
        Value::Array(items) => items,
        Value::Null => Vec::new(),
        other => vec![other],
    };

    // Doubly-encoded: the whole list arrives as a JSON string in slot 0
    if let Some(Value::String(encoded)) = records.first() {
        let decoded: Value = serde_json::from_str(encoded).map_err(|e| {
            warn!("Failed to parse JSON string from research workflow: {}", e);
            ComposerError::Parse("Invalid JSON response from research workflow".to_string())
        })?;
        return Ok(match decoded {
            Value::Array(items) => items,
            other => vec![other],
        });
    }

    Ok(records)
}

/// Keep records that carry a non-empty heading and source
pub fn parse_facts(records: Vec<Value>) -> Vec<DeepResearchFact> {
    let total = records.len();
    let facts: Vec<DeepResearchFact> = records
        .into_iter()
        .filter_map(|record| {
            let object = record.as_object()?;
            let heading = non_empty_str(object.get("heading"))?;
            let source = non_empty_str(object.get("source"))?;
            let evidence = object
                .get("evidence")
                .and_then(Value::as_str)
                .map(str::to_string);
            Some(DeepResearchFact {
                heading: heading.to_string(),
                evidence,
                source: source.to_string(),
            })
        })
        .collect();

    if facts.len() < total {
        debug!(dropped = total - facts.len(), kept = facts.len(), "Dropped malformed research facts");
    }
    facts
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str).filter(|s| !s.is_empty())
}

/// First `[text](http...)` target in a piece of text
pub fn extract_markdown_url(text: &str) -> Option<String> {
    markdown_link()
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Host of a URL, or an empty string when it does not parse
pub fn domain_of(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_default()
}

/// Convert a fact into the uniform source shape
pub fn fact_to_source(fact: &DeepResearchFact) -> Source {
    let url = fact
        .evidence
        .as_deref()
        .and_then(extract_markdown_url)
        .or_else(|| fact.source.starts_with("http").then(|| fact.source.clone()))
        .unwrap_or_default();

    let domain = if url.is_empty() {
        String::new()
    } else {
        domain_of(&url)
    };

    Source {
        id: if url.is_empty() { fact.source.clone() } else { url.clone() },
        title: fact.heading.clone(),
        excerpt: fact.evidence.clone().unwrap_or_default(),
        domain,
        url,
        favicon: String::new(),
        score: 0,
        category: SourceCategory::Web,
    }
}

/// Full pipeline from response data to facts and sources
pub fn normalize_deep_research(data: Value) -> ComposerResult<(Vec<DeepResearchFact>, Vec<Source>)> {
    let facts = parse_facts(fact_records(data)?);
    let sources = facts.iter().map(fact_to_source).collect();
    Ok((facts, sources))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn markdown_link_in_evidence_supplies_url_and_domain() {
        let (_, sources) = normalize_deep_research(json!([{
            "heading": "Diagnostic accuracy",
            "evidence": "AI reaches 94% accuracy ([example.com](https://example.com/x))",
            "source": "Example Journal"
        }]))
        .unwrap();

        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].url, "https://example.com/x");
        assert_eq!(sources[0].domain, "example.com");
        assert_eq!(sources[0].id, "https://example.com/x");
        assert_eq!(sources[0].category, SourceCategory::Web);
    }

    #[test]
    fn source_field_is_used_when_it_looks_like_a_url() {
        let fact = DeepResearchFact {
            heading: "Costs".to_string(),
            evidence: Some("No link here".to_string()),
            source: "https://www.healtheconomics.com/ai-costs".to_string(),
        };
        let source = fact_to_source(&fact);
        assert_eq!(source.url, "https://www.healtheconomics.com/ai-costs");
        assert_eq!(source.domain, "www.healtheconomics.com");
    }

    #[test]
    fn plain_source_text_becomes_the_id() {
        let fact = DeepResearchFact {
            heading: "Ethics".to_string(),
            evidence: None,
            source: "Journal of Bioethics".to_string(),
        };
        let source = fact_to_source(&fact);
        assert_eq!(source.id, "Journal of Bioethics");
        assert_eq!(source.url, "");
        assert_eq!(source.domain, "");
        assert_eq!(source.excerpt, "");
    }

    #[test]
    fn unparseable_url_leaves_domain_empty() {
        let fact = DeepResearchFact {
            heading: "Broken".to_string(),
            evidence: None,
            source: "http//missing-colon".to_string(),
        };
        let source = fact_to_source(&fact);
        assert_eq!(source.url, "http//missing-colon");
        assert_eq!(source.domain, "");
    }

    #[test]
    fn facts_missing_heading_or_source_are_dropped() {
        let (facts, sources) = normalize_deep_research(json!([
            { "heading": "Kept", "source": "https://nature.com/a" },
            { "heading": "No source" },
            { "source": "https://nature.com/b" },
            { "heading": "", "source": "https://nature.com/c" },
            "stray string",
            42,
            null
        ]))
        .unwrap();

        // Only a string in the first slot is treated as an encoded list
        assert_eq!(facts.len(), 1);
        assert_eq!(sources[0].title, "Kept");
    }

    #[test]
    fn non_string_heading_or_source_is_dropped() {
        let (facts, _) = normalize_deep_research(json!([
            { "heading": 7, "source": "https://nature.com/a" },
            { "heading": "Flagged", "source": true },
            { "heading": { "text": "Nested" }, "source": "https://nature.com/b" },
            { "heading": "Kept", "source": "https://nature.com/c" }
        ]))
        .unwrap();

        assert_eq!(facts.len(), 1);
        assert_eq!(facts[0].heading, "Kept");
    }

    #[test]
    fn single_object_is_wrapped() {
        let (facts, _) = normalize_deep_research(json!({
            "heading": "Only fact",
            "source": "https://nejm.org/doi/full/1"
        }))
        .unwrap();
        assert_eq!(facts.len(), 1);
    }

    #[test]
    fn double_encoded_list_is_decoded() {
        let encoded = json!([
            { "heading": "A", "source": "https://a.org" },
            { "heading": "B", "source": "https://b.org" }
        ])
        .to_string();

        let (facts, sources) = normalize_deep_research(json!([encoded])).unwrap();
        assert_eq!(facts.len(), 2);
        assert_eq!(sources[1].domain, "b.org");
    }

    #[test]
    fn invalid_double_encoding_fails_the_batch() {
        let err = normalize_deep_research(json!(["{not json"])).unwrap_err();
        assert_eq!(
            err,
            ComposerError::Parse("Invalid JSON response from research workflow".to_string())
        );
    }

    #[test]
    fn envelope_in_array_is_unwrapped() {
        let response = unwrap_envelope(json!([{
            "success": true,
            "executionId": "exec-deep",
            "data": []
        }]))
        .unwrap();
        assert!(response.success);
        assert_eq!(response.execution_id.as_deref(), Some("exec-deep"));

        assert!(unwrap_envelope(json!([])).is_err());
    }
}
