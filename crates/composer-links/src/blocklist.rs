use url::Url;

/// Job boards and networking sites never accepted as sources
pub const DEFAULT_COMPETITORS: [&str; 4] =
    ["indeed.com", "jobstreet.com", "glassdoor.com", "linkedin.com"];

/// Competitor domains, stored lowercase without a `www.` prefix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompetitorBlocklist {
    domains: Vec<String>,
}

impl Default for CompetitorBlocklist {
    fn default() -> Self {
        Self::new(DEFAULT_COMPETITORS)
    }
}

fn normalize(domain: &str) -> String {
    let domain = domain.trim().to_lowercase();
    domain
        .strip_prefix("www.")
        .map(str::to_string)
        .unwrap_or(domain)
}

impl CompetitorBlocklist {
    pub fn new<I, S>(domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut blocklist = Self { domains: Vec::new() };
        for domain in domains {
            blocklist.add_domain(domain.as_ref());
        }
        blocklist
    }

    pub fn empty() -> Self {
        Self { domains: Vec::new() }
    }

    /// Returns false when the domain was already listed or is blank
    pub fn add_domain(&mut self, domain: &str) -> bool {
        let domain = normalize(domain);
        if domain.is_empty() || self.domains.contains(&domain) {
            return false;
        }
        self.domains.push(domain);
        true
    }

    pub fn remove_domain(&mut self, domain: &str) -> bool {
        let domain = normalize(domain);
        let before = self.domains.len();
        self.domains.retain(|d| *d != domain);
        self.domains.len() != before
    }

    pub fn domains(&self) -> &[String] {
        &self.domains
    }

    /// Exact, subdomain (`jobs.indeed.com`) or country-variant
    /// (`indeed.com.sg`) match
    pub fn matches_host(&self, host: &str) -> bool {
        let host = normalize(host);
        self.domains.iter().any(|c| {
            host == *c
                || host.ends_with(&format!(".{}", c))
                || host.starts_with(&format!("{}.", c))
        })
    }

    /// Whether a URL points at a competitor. Unparseable URLs never match.
    pub fn is_competitor(&self, url: &str) -> bool {
        Url::parse(url)
            .ok()
            .and_then(|u| u.host_str().map(|h| self.matches_host(h)))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_exact_subdomain_and_country_variants() {
        let blocklist = CompetitorBlocklist::default();
        assert!(blocklist.is_competitor("https://indeed.com/jobs"));
        assert!(blocklist.is_competitor("https://www.indeed.com/jobs?q=ai"));
        assert!(blocklist.is_competitor("https://sg.linkedin.com/in/someone"));
        assert!(blocklist.is_competitor("https://www.jobstreet.com.sg/"));
        assert!(blocklist.is_competitor("HTTPS://WWW.GLASSDOOR.COM/Reviews"));
    }

    #[test]
    fn does_not_match_lookalikes() {
        let blocklist = CompetitorBlocklist::default();
        assert!(!blocklist.is_competitor("https://notindeed.com/"));
        assert!(!blocklist.is_competitor("https://www.nature.com/articles/1"));
        assert!(!blocklist.is_competitor("not a url"));
    }

    #[test]
    fn add_and_remove_normalise_domains() {
        let mut blocklist = CompetitorBlocklist::empty();
        assert!(blocklist.add_domain("WWW.Monster.com"));
        assert!(!blocklist.add_domain("monster.com"));
        assert_eq!(blocklist.domains(), &["monster.com".to_string()]);
        assert!(blocklist.is_competitor("https://jobs.monster.com/"));
        assert!(blocklist.remove_domain("www.monster.com"));
        assert!(!blocklist.remove_domain("monster.com"));
        assert!(blocklist.domains().is_empty());
    }
}
