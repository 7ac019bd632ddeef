use serde::{Deserialize, Serialize};

/// A normalized product scraped from one card in a listing container.
///
/// A record is only ever constructed with every field resolved non-empty;
/// partially extracted cards are dropped by the extractor instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    /// Ordinal position among the container's direct children (0-indexed)
    pub index: usize,

    /// Product title
    pub title: String,

    /// Numeric price, first number found in the price text
    pub price: f64,

    /// Currency glyph found alongside the price (e.g. "€", "£", "$")
    pub currency: String,

    /// Absolute image URL
    pub image_url: String,

    /// Absolute product page URL
    pub product_url: String,
}

/// One node of the site map produced by a depth-bounded crawl.
///
/// Serializes as `{url, title, img, children}`; `depth` is bookkeeping for
/// the traversal and stays out of the output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlNode {
    /// Absolute URL of the page
    pub url: String,

    /// Page title, empty until the URL has been visited
    #[serde(default)]
    pub title: String,

    /// Optional representative image for the page
    #[serde(default)]
    pub img: Option<String>,

    /// Pages linked from this one, in discovery order
    #[serde(default)]
    pub children: Vec<CrawlNode>,

    /// Edges from the crawl root (root is 0)
    #[serde(skip)]
    pub depth: usize,
}

impl CrawlNode {
    /// Create an unvisited stub for a URL
    pub fn stub(url: impl Into<String>, depth: usize) -> Self {
        Self {
            url: url.into(),
            title: String::new(),
            img: None,
            children: Vec::new(),
            depth,
        }
    }

    /// Total number of nodes in this subtree, stubs included
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(CrawlNode::node_count).sum::<usize>()
    }
}

/// Outcome tallies for one seed site processed by the spider
#[derive(Debug, Clone, Default, Serialize)]
pub struct SiteSummary {
    /// Seed URL the frontier was grown from
    pub site: String,

    /// Pages actually navigated to
    pub pages_fetched: usize,

    /// Product records emitted
    pub products: usize,

    /// Frontier entries that exhausted their fetch attempts
    pub failures: usize,
}
