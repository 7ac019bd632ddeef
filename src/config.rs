use crate::filter::LinkFilterConfig;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Vocabularies and selectors driving container identification and field
/// extraction. The defaults are hand-tuned against real storefronts; they
/// can be overridden per deployment from a config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeuristicsConfig {
    /// Tags a listing container may have
    #[serde(default = "default_container_tags")]
    pub container_tags: Vec<String>,

    /// Substrings of a container's class or id (case-sensitive match)
    #[serde(default = "default_container_names")]
    pub container_names: Vec<String>,

    /// Tags the container's direct children may share
    #[serde(default = "default_item_tags")]
    pub item_tags: Vec<String>,

    /// Substrings of an item's class or id (matched case-insensitively)
    #[serde(default = "default_item_names")]
    pub item_names: Vec<String>,

    /// Selectors tried in order for a product title; first non-empty wins
    #[serde(default = "default_title_selectors")]
    pub title_selectors: Vec<String>,

    /// Selector for the element holding the price text
    #[serde(default = "default_price_selector")]
    pub price_selector: String,

    /// Character class matching a currency glyph
    #[serde(default = "default_currency_pattern")]
    pub currency_pattern: String,
}

impl Default for HeuristicsConfig {
    fn default() -> Self {
        Self {
            container_tags: default_container_tags(),
            container_names: default_container_names(),
            item_tags: default_item_tags(),
            item_names: default_item_names(),
            title_selectors: default_title_selectors(),
            price_selector: default_price_selector(),
            currency_pattern: default_currency_pattern(),
        }
    }
}

fn default_container_tags() -> Vec<String> {
    vec!["ul".into(), "div".into(), "ol".into()]
}

fn default_container_names() -> Vec<String> {
    [
        "list",
        "products",
        "items",
        "product-grid",
        "product-list",
        "product-grid-list",
        "products-grid",
        "search-result-items",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_item_tags() -> Vec<String> {
    vec!["li".into(), "div".into()]
}

fn default_item_names() -> Vec<String> {
    ["item", "product_card", "product", "product_box"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_title_selectors() -> Vec<String> {
    vec![r#"[class*="title"]"#.into(), r#"[class*="name"]"#.into()]
}

fn default_price_selector() -> String {
    r#"[class*="price"]"#.into()
}

/// Currency glyphs across Unicode, `$` plus the currency-symbol blocks
fn default_currency_pattern() -> String {
    "[$\u{A2}-\u{A5}\u{58F}\u{60B}\u{9F2}\u{9F3}\u{9FB}\u{AF1}\u{BF9}\u{E3F}\
     \u{17DB}\u{20A0}-\u{20BD}\u{A838}\u{FDFC}\u{FE69}\u{FF04}\u{FFE0}\u{FFE1}\
     \u{FFE5}\u{FFE6}]"
        .into()
}

/// Configuration for the flat-frontier product spider (Policy A)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpiderConfig {
    /// Seed URLs, one frontier per site, processed in order
    pub sites: Vec<String>,

    /// URL for the WebDriver instance
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,

    /// Upper bound on a single page load, in seconds
    #[serde(default = "default_nav_timeout_secs")]
    pub nav_timeout_secs: u64,

    /// Fetch attempts per frontier entry before it is marked failed
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Pause between retries of a failed fetch, in milliseconds
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// Extraction vocabularies
    #[serde(default)]
    pub heuristics: HeuristicsConfig,

    /// Filtering of discovered links before they enter the frontier
    #[serde(default)]
    pub links: LinkFilterConfig,
}

impl SpiderConfig {
    /// Create a configuration with default values for the given seeds
    pub fn new(sites: Vec<String>) -> Self {
        Self {
            sites,
            webdriver_url: default_webdriver_url(),
            nav_timeout_secs: default_nav_timeout_secs(),
            max_attempts: default_max_attempts(),
            retry_delay_ms: default_retry_delay_ms(),
            heuristics: HeuristicsConfig::default(),
            links: LinkFilterConfig::default(),
        }
    }
}

/// Configuration for the depth-bounded site mapper (Policy B)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapConfig {
    /// URL to start mapping from
    pub root_url: String,

    /// Subpage depth to crawl, in edges from the root
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// URL for the WebDriver instance
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,

    /// Upper bound on a single page load, in seconds
    #[serde(default = "default_nav_timeout_secs")]
    pub nav_timeout_secs: u64,

    /// Directory the crawl snapshot is written under
    #[serde(default = "default_out_dir")]
    pub out_dir: String,

    /// Filtering of discovered links before they become child nodes
    #[serde(default)]
    pub links: LinkFilterConfig,
}

impl MapConfig {
    /// Create a configuration with default values for the given root
    pub fn new(root_url: &str) -> Self {
        Self {
            root_url: root_url.to_string(),
            max_depth: default_max_depth(),
            webdriver_url: default_webdriver_url(),
            nav_timeout_secs: default_nav_timeout_secs(),
            out_dir: default_out_dir(),
            links: LinkFilterConfig::default(),
        }
    }
}

/// Enum containing both task configuration types
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TaskConfig {
    /// Product spider configuration
    Spider(SpiderConfig),

    /// Site mapper configuration
    Map(MapConfig),
}

impl TaskConfig {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn Error>> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        let config: Self = serde_json::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self, Box<dyn Error>> {
        Ok(serde_json::from_str(json)?)
    }
}

fn default_webdriver_url() -> String {
    "http://localhost:4444".to_string()
}

fn default_nav_timeout_secs() -> u64 {
    45
}

fn default_max_attempts() -> u32 {
    2
}

fn default_retry_delay_ms() -> u64 {
    500
}

fn default_max_depth() -> usize {
    2
}

fn default_out_dir() -> String {
    "output".to_string()
}
