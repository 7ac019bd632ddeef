use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

/// Configuration for filtering links discovered during a crawl.
///
/// Same-origin scoping happens earlier, in the anchor collector; this filter
/// only decides which same-origin links are worth queueing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkFilterConfig {
    /// Regex patterns for URLs to include (if empty, all URLs are included
    /// unless excluded)
    #[serde(default)]
    pub include_patterns: Vec<String>,

    /// Regex patterns for URLs to exclude (these take precedence over
    /// include patterns)
    #[serde(default = "default_exclude_patterns")]
    pub exclude_patterns: Vec<String>,
}

/// Static assets are never worth a page load
fn default_exclude_patterns() -> Vec<String> {
    vec![r"\.(jpg|jpeg|png|gif|css|js|ico|woff|woff2|ttf|eot|svg|pdf)$".to_string()]
}

impl Default for LinkFilterConfig {
    fn default() -> Self {
        Self {
            include_patterns: Vec::new(),
            exclude_patterns: default_exclude_patterns(),
        }
    }
}

/// Link filter that uses regex patterns to decide which discovered URLs
/// enter a frontier
#[derive(Debug)]
pub struct LinkFilter {
    include_regexes: Vec<Regex>,
    exclude_regexes: Vec<Regex>,
}

impl Default for LinkFilter {
    fn default() -> Self {
        Self::new(&LinkFilterConfig::default()).expect("Default patterns should be valid")
    }
}

impl LinkFilter {
    /// Create a new link filter from configuration
    pub fn new(config: &LinkFilterConfig) -> Result<Self, regex::Error> {
        let mut include_regexes = Vec::with_capacity(config.include_patterns.len());
        for pattern in &config.include_patterns {
            include_regexes.push(Regex::new(pattern)?);
        }

        let mut exclude_regexes = Vec::with_capacity(config.exclude_patterns.len());
        for pattern in &config.exclude_patterns {
            exclude_regexes.push(Regex::new(pattern)?);
        }

        Ok(Self {
            include_regexes,
            exclude_regexes,
        })
    }

    /// Determine if a discovered link should be queued
    pub fn should_queue(&self, url: &Url) -> bool {
        let url_str = url.as_str();

        // Exclusions take precedence
        for regex in &self.exclude_regexes {
            if regex.is_match(url_str) {
                return false;
            }
        }

        // If include patterns are specified, at least one must match
        if !self.include_regexes.is_empty() {
            return self.include_regexes.iter().any(|r| r.is_match(url_str));
        }

        true
    }

    /// Create a normalized version of the URL for frontier deduplication.
    /// Fragments never change the fetched document.
    pub fn normalize(&self, url: &Url) -> Url {
        let mut normalized = url.clone();
        normalized.set_fragment(None);
        normalized
    }
}
