use serde::{Deserialize, Serialize};

/// Outcome of checking a single link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkStatus {
    Valid,
    Invalid,
    Competitor,
}

/// Result of a link sweep, every input URL in exactly one bucket
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkReport {
    pub valid_links: Vec<String>,
    pub invalid_links: Vec<String>,
    pub competitor_links: Vec<String>,
}

impl LinkReport {
    /// Put a URL into the bucket matching its status
    pub fn push(&mut self, url: impl Into<String>, status: LinkStatus) {
        let url = url.into();
        match status {
            LinkStatus::Valid => self.valid_links.push(url),
            LinkStatus::Invalid => self.invalid_links.push(url),
            LinkStatus::Competitor => self.competitor_links.push(url),
        }
    }

    /// Status recorded for a URL, if it was part of the sweep
    pub fn status_of(&self, url: &str) -> Option<LinkStatus> {
        if self.competitor_links.iter().any(|u| u == url) {
            Some(LinkStatus::Competitor)
        } else if self.invalid_links.iter().any(|u| u == url) {
            Some(LinkStatus::Invalid)
        } else if self.valid_links.iter().any(|u| u == url) {
            Some(LinkStatus::Valid)
        } else {
            None
        }
    }

    /// Number of URLs classified
    pub fn len(&self) -> usize {
        self.valid_links.len() + self.invalid_links.len() + self.competitor_links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
