pub mod candidates;
pub mod filters;
pub mod products;

#[cfg(test)]
mod tests;

pub use candidates::{CandidateContainer, find_candidates};
pub use filters::{FilterOutcome, identify_container};
pub use products::extract_products;

use crate::config::HeuristicsConfig;
use regex::Regex;
use scraper::Selector;
use thiserror::Error;

/// First numeric substring: optional sign, digits, optional decimal fraction
const PRICE_PATTERN: &str = r"[+-]?\d+(\.\d+)?";

/// A heuristics vocabulary failed to compile; fatal at startup, never during
/// a crawl
#[derive(Debug, Error)]
pub enum HeuristicsError {
    #[error("invalid selector {selector:?}: {message}")]
    Selector { selector: String, message: String },

    #[error("invalid currency pattern: {0}")]
    CurrencyPattern(#[from] regex::Error),
}

/// Compiled extraction vocabularies. Built once from configuration and
/// shared read-only across every page of a run.
pub struct Heuristics {
    /// Selector list matching potential listing containers
    pub(crate) candidate_selector: Selector,

    /// Image descendants, for the content filter and image extraction
    pub(crate) image_selector: Selector,

    /// Anchor descendants, for product URL extraction
    pub(crate) anchor_selector: Selector,

    /// Title selectors, tried in order
    pub(crate) title_selectors: Vec<Selector>,

    /// Price-text element selector
    pub(crate) price_selector: Selector,

    /// Currency glyph class
    pub(crate) currency_re: Regex,

    /// Numeric price shape
    pub(crate) price_re: Regex,

    /// Tags a container's children may uniformly share
    pub(crate) item_tags: Vec<String>,

    /// Item class/id substrings, pre-lowercased for case-insensitive match
    pub(crate) item_names: Vec<String>,
}

impl Heuristics {
    /// Compile vocabularies from configuration
    pub fn new(config: &HeuristicsConfig) -> Result<Self, HeuristicsError> {
        let candidate_selector = parse_selector(&candidate_selector_list(config))?;
        let image_selector = parse_selector("img")?;
        let anchor_selector = parse_selector("a")?;

        let mut title_selectors = Vec::with_capacity(config.title_selectors.len());
        for selector in &config.title_selectors {
            title_selectors.push(parse_selector(selector)?);
        }

        let price_selector = parse_selector(&config.price_selector)?;
        let currency_re = Regex::new(&config.currency_pattern)?;
        let price_re = Regex::new(PRICE_PATTERN).expect("static pattern");

        Ok(Self {
            candidate_selector,
            image_selector,
            anchor_selector,
            title_selectors,
            price_selector,
            currency_re,
            price_re,
            item_tags: config.item_tags.clone(),
            item_names: config
                .item_names
                .iter()
                .map(|n| n.to_lowercase())
                .collect(),
        })
    }

    /// Compile the built-in default vocabularies
    pub fn with_defaults() -> Self {
        Self::new(&HeuristicsConfig::default()).expect("default heuristics are valid")
    }
}

/// Cross product of container tags and names over class and id attributes,
/// as one comma-joined selector list. Substring matching is the CSS
/// `[attr*=]` operator, which is case-sensitive.
fn candidate_selector_list(config: &HeuristicsConfig) -> String {
    let mut parts = Vec::with_capacity(config.container_tags.len() * config.container_names.len() * 2);
    for tag in &config.container_tags {
        for name in &config.container_names {
            parts.push(format!("{tag}[class*=\"{name}\"]"));
            parts.push(format!("{tag}[id*=\"{name}\"]"));
        }
    }
    parts.join(", ")
}

fn parse_selector(selector: &str) -> Result<Selector, HeuristicsError> {
    Selector::parse(selector).map_err(|e| HeuristicsError::Selector {
        selector: selector.to_string(),
        message: e.to_string(),
    })
}
