pub mod page;
pub mod webdriver;

pub use page::PageView;
pub use webdriver::WebDriverFetcher;

use async_trait::async_trait;
use thiserror::Error;

/// Ways a page fetch can fail. All of these are recoverable at the
/// granularity of one frontier entry; traversal loops log them and move on.
#[derive(Debug, Error)]
pub enum FetchError {
    /// No WebDriver server accepted a connection
    #[error("could not connect to a WebDriver server")]
    Connect,

    /// Navigation or page-source retrieval failed
    #[error("failed to load {url}: {message}")]
    Navigation { url: String, message: String },

    /// The page did not finish loading within the configured bound
    #[error("timed out loading {0}")]
    Timeout(String),

    /// The WebDriver session disappeared and could not be re-established
    #[error("WebDriver session lost while loading {0}")]
    SessionLost(String),

    /// The requested URL does not parse
    #[error("invalid URL {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

/// Capability to load a page and hand back a queryable view of it.
///
/// This is the only async surface the traversal engines depend on; every
/// DOM query afterwards is synchronous over the returned [`PageView`], so
/// extraction logic is testable against fixture HTML with no browser.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Navigate to `url` and capture the rendered page.
    ///
    /// Implementations impose their own load timeout; a fetch either
    /// completes or fails, it never blocks indefinitely.
    async fn fetch(&self, url: &str) -> Result<PageView, FetchError>;
}
