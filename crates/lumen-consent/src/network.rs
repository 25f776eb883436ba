//! Network-level blocking of consent-platform hosts.

use crate::patterns::PatternTables;
use lumen_browser::{extract_host, RequestFilter};

/// Aborts requests to listed hosts and their subdomains.
#[derive(Debug, Clone)]
pub struct BlockList {
    domains: Vec<String>,
}

impl BlockList {
    pub fn new<I, S>(domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            domains: domains
                .into_iter()
                .map(|d| d.as_ref().trim().trim_start_matches('.').to_lowercase())
                .filter(|d| !d.is_empty())
                .collect(),
        }
    }

    pub fn from_tables(tables: &PatternTables) -> Self {
        Self::new(tables.block_domains.iter().copied())
    }

    /// Whether `host` is a listed domain or one of its subdomains.
    pub fn matches_host(&self, host: &str) -> bool {
        let host = host.trim_end_matches('.').to_lowercase();
        self.domains.iter().any(|domain| {
            host == *domain
                || host
                    .strip_suffix(domain.as_str())
                    .is_some_and(|prefix| prefix.ends_with('.'))
        })
    }

    pub fn len(&self) -> usize {
        self.domains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }
}

impl RequestFilter for BlockList {
    fn should_block(&self, url: &str) -> bool {
        // data:, blob: and malformed URLs have no host to match
        extract_host(url).is_ok_and(|host| self.matches_host(&host))
    }
}
