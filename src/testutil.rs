use crate::dom::{FetchError, PageFetcher, PageView};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use url::Url;

/// In-memory [`PageFetcher`] over fixture HTML keyed by URL, counting every
/// fetch so tests can assert the no-revisit invariants
pub(crate) struct FixtureFetcher {
    pages: HashMap<String, String>,
    failing: HashSet<String>,
    fetch_counts: Mutex<HashMap<String, usize>>,
}

impl FixtureFetcher {
    pub fn new() -> Self {
        Self {
            pages: HashMap::new(),
            failing: HashSet::new(),
            fetch_counts: Mutex::new(HashMap::new()),
        }
    }

    /// Register a page fixture
    pub fn page(mut self, url: &str, html: &str) -> Self {
        self.pages.insert(url.to_string(), html.to_string());
        self
    }

    /// Register a URL whose fetch always times out
    pub fn failing(mut self, url: &str) -> Self {
        self.failing.insert(url.to_string());
        self
    }

    /// How many times a URL has been fetched, attempts on failing URLs
    /// included
    pub fn fetch_count(&self, url: &str) -> usize {
        self.fetch_counts
            .lock()
            .unwrap()
            .get(url)
            .copied()
            .unwrap_or(0)
    }
}

#[async_trait]
impl PageFetcher for FixtureFetcher {
    async fn fetch(&self, url: &str) -> Result<PageView, FetchError> {
        *self
            .fetch_counts
            .lock()
            .unwrap()
            .entry(url.to_string())
            .or_insert(0) += 1;

        if self.failing.contains(url) {
            return Err(FetchError::Timeout(url.to_string()));
        }

        let parsed = Url::parse(url).map_err(|source| FetchError::InvalidUrl {
            url: url.to_string(),
            source,
        })?;

        let html = self.pages.get(url).ok_or_else(|| FetchError::Navigation {
            url: url.to_string(),
            message: "no fixture registered".to_string(),
        })?;

        Ok(PageView::from_html(parsed, html))
    }
}
