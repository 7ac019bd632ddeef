use crate::dom::{FetchError, PageFetcher, PageView};
use async_trait::async_trait;
use fantoccini::{Client, ClientBuilder};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::timeout;
use url::Url;

/// Script run in the page to collect anchor hrefs, descending into shadow
/// roots, restricted to the page's own origin. Kept in the browser because
/// shadow-tree traversal only exists there.
const ANCHOR_COLLECTOR_JS: &str = r#"
const urls = new Set();
const walk = (nodes) => {
  for (const el of nodes) {
    if (el.shadowRoot) {
      walk(el.shadowRoot.querySelectorAll('*'));
    }
    if (el.localName === 'a' && el.href) {
      urls.add(el.href);
    }
  }
};
walk(document.querySelectorAll('*'));
const out = [];
for (const href of urls) {
  try {
    if (new URL(href).origin === location.origin && href !== location.href) {
      out.push(href);
    }
  } catch (e) {}
}
return out;
"#;

/// [`PageFetcher`] backed by a WebDriver session (fantoccini).
///
/// One browser session is shared across fetches, which is why the traversal
/// engines keep fetches sequential.
pub struct WebDriverFetcher {
    client: Mutex<Client>,
    webdriver_url: String,
    nav_timeout: Duration,
}

impl WebDriverFetcher {
    /// Connect to a WebDriver server, trying common fallback addresses if
    /// the configured one does not answer
    pub async fn connect(webdriver_url: &str, nav_timeout: Duration) -> Result<Self, FetchError> {
        let client = connect_with_fallbacks(webdriver_url)
            .await
            .ok_or(FetchError::Connect)?;

        Ok(Self {
            client: Mutex::new(client),
            webdriver_url: webdriver_url.to_string(),
            nav_timeout,
        })
    }

    /// Close the underlying browser session
    pub async fn close(self) {
        let client = self.client.into_inner();
        if let Err(e) = client.close().await {
            ::log::warn!("Failed to close WebDriver session: {}", e);
        }
    }

    /// Navigate and capture one page within the configured timeout
    async fn load(&self, client: &Client, url: &str) -> Result<PageView, FetchError> {
        let capture = async {
            client.goto(url).await.map_err(|e| classify(url, e))?;

            // Origin and base path are recomputed from the page's own URL,
            // which may differ from the requested one after redirects
            let current = client
                .current_url()
                .await
                .map_err(|e| classify(url, e))?;

            let anchors = self.collect_anchors(client, url).await?;

            let html = client.source().await.map_err(|e| classify(url, e))?;

            Ok(PageView::with_live_anchors(current, &html, anchors))
        };

        match timeout(self.nav_timeout, capture).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout(url.to_string())),
        }
    }

    /// Run the in-page anchor collector and pull the URL list out of the
    /// script's JSON result
    async fn collect_anchors(&self, client: &Client, url: &str) -> Result<Vec<String>, FetchError> {
        let value = client
            .execute(ANCHOR_COLLECTOR_JS, vec![])
            .await
            .map_err(|e| classify(url, e))?;

        let anchors = value
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .filter_map(|v| v.as_str())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Ok(anchors)
    }

    /// Replace a dead session with a fresh one
    async fn reconnect(&self, client: &mut Client) -> bool {
        ::log::warn!("Attempting to reconnect WebDriver session");
        match ClientBuilder::native().connect(&self.webdriver_url).await {
            Ok(new_client) => {
                *client = new_client;
                ::log::info!("Successfully reconnected to WebDriver");
                true
            }
            Err(e) => {
                ::log::error!("Failed to reconnect to WebDriver: {}", e);
                false
            }
        }
    }
}

#[async_trait]
impl PageFetcher for WebDriverFetcher {
    async fn fetch(&self, url: &str) -> Result<PageView, FetchError> {
        // Validate early so frontier code sees malformed seeds as such
        Url::parse(url).map_err(|source| FetchError::InvalidUrl {
            url: url.to_string(),
            source,
        })?;

        let mut client = self.client.lock().await;

        // First attempt; its parsed page must not live across the
        // reconnect await below
        match self.load(&client, url).await {
            Err(FetchError::SessionLost(_)) => {}
            other => return other,
        }

        // One reconnect, one retry; a second loss is terminal for this fetch
        if self.reconnect(&mut client).await {
            self.load(&client, url).await
        } else {
            Err(FetchError::SessionLost(url.to_string()))
        }
    }
}

/// Map a WebDriver command failure onto the fetch error taxonomy
fn classify(url: &str, error: fantoccini::error::CmdError) -> FetchError {
    let message = error.to_string();
    if message.contains("Unable to find session") {
        FetchError::SessionLost(url.to_string())
    } else {
        FetchError::Navigation {
            url: url.to_string(),
            message,
        }
    }
}

/// Try the configured WebDriver URL, then common alternatives
async fn connect_with_fallbacks(webdriver_url: &str) -> Option<Client> {
    match ClientBuilder::native().connect(webdriver_url).await {
        Ok(client) => {
            ::log::debug!("Connected to WebDriver at {}", webdriver_url);
            return Some(client);
        }
        Err(e) => {
            ::log::error!("Failed to connect to WebDriver at {}: {}", webdriver_url, e);
        }
    }

    let fallback_urls = [
        "http://localhost:9515", // ChromeDriver default
        "http://localhost:4444", // Selenium / geckodriver convention
        "http://127.0.0.1:4444", // Same, with IP instead of localhost
    ];

    for url in fallback_urls.iter() {
        if *url == webdriver_url {
            continue;
        }

        ::log::info!("Trying fallback WebDriver URL: {}", url);
        if let Ok(client) = ClientBuilder::native().connect(url).await {
            ::log::debug!("Connected to fallback WebDriver at {}", url);
            return Some(client);
        }
    }

    ::log::error!("Failed to connect to any WebDriver server");
    ::log::error!("Make sure one is running, or set the webdriver_url config/flag");
    None
}
