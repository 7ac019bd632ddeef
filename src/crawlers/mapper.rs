use super::CancelToken;
use crate::config::MapConfig;
use crate::dom::PageFetcher;
use crate::filter::LinkFilter;
use crate::results::CrawlNode;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use url::Url;

/// What one visit learned about a page, kept so revisits can be answered
/// without another fetch
#[derive(Debug, Clone)]
struct CachedPage {
    title: String,
    img: Option<String>,
    child_urls: Vec<String>,
}

/// Policy-B traversal: depth-bounded recursive visitor with a URL-keyed
/// memo, producing a rooted [`CrawlNode`] tree.
///
/// The memo is owned by the mapper instance, so independent runs in one
/// process never share state. Each distinct URL is fetched at most once per
/// run; revisits — including link cycles — are answered from the cache.
pub struct SiteMapper<F> {
    fetcher: F,
    root_url: String,
    max_depth: usize,
    links: LinkFilter,
    cancel: CancelToken,
    cache: HashMap<String, CachedPage>,
    fetches: usize,
}

impl<F: PageFetcher> SiteMapper<F> {
    pub fn new(config: &MapConfig, fetcher: F) -> Result<Self, regex::Error> {
        Ok(Self {
            fetcher,
            root_url: config.root_url.clone(),
            max_depth: config.max_depth,
            links: LinkFilter::new(&config.links)?,
            cancel: CancelToken::new(),
            cache: HashMap::new(),
            fetches: 0,
        })
    }

    /// Handle for interrupting the run from outside
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Give the fetcher back, e.g. so the caller can close the browser
    /// session once the run is over
    pub fn into_fetcher(self) -> F {
        self.fetcher
    }

    /// Pages actually fetched so far in this run
    pub fn fetches(&self) -> usize {
        self.fetches
    }

    /// Crawl the site from the configured root and return the finished tree
    pub async fn map_site(&mut self) -> CrawlNode {
        let root_url = self.root_url.clone();
        let mut root = CrawlNode::stub(root_url, 0);
        self.visit(&mut root, 0).await;

        ::log::info!(
            "Mapped {} with {} fetches, {} nodes",
            self.root_url,
            self.fetches,
            root.node_count()
        );
        root
    }

    /// Visit a URL at the given depth, recursing into its children.
    ///
    /// Depth is edges from the root; nodes beyond `max_depth` stay stubs
    /// and are neither fetched nor cached. A memoized URL repopulates the
    /// node (and any already-known child titles) from the cache without
    /// refetching and without recursing — that is the cycle breaker.
    fn visit<'a>(
        &'a mut self,
        node: &'a mut CrawlNode,
        depth: usize,
    ) -> Pin<Box<dyn Future<Output = ()> + Send + 'a>> {
        Box::pin(async move {
            if depth > self.max_depth {
                return;
            }
            if self.cancel.is_cancelled() {
                ::log::info!("Crawl cancelled before visiting {}", node.url);
                return;
            }

            if let Some(cached) = self.cache.get(&node.url) {
                ::log::info!("Reusing route: {}", node.url);
                node.title = cached.title.clone();
                node.img = cached.img.clone();
                node.children = cached
                    .child_urls
                    .iter()
                    .map(|url| CrawlNode::stub(url.clone(), depth + 1))
                    .collect();

                // Fill in whatever the cache already knows about the
                // children; titles of never-visited pages stay blank
                for child in &mut node.children {
                    if let Some(known) = self.cache.get(&child.url) {
                        child.title = known.title.clone();
                        child.img = known.img.clone();
                    }
                }
                return;
            }

            ::log::info!("Loading: {}", node.url);
            let page = match self.fetcher.fetch(&node.url).await {
                Ok(view) => {
                    self.fetches += 1;
                    let title = view.title().to_string();
                    let anchors = view.anchors().to_vec();
                    Some((title, anchors))
                }
                Err(e) => {
                    ::log::error!("Failed to load {}: {}", node.url, e);
                    None
                }
            };

            // A failed fetch is memoized as an empty page so the URL is
            // never attempted again within this run
            let (title, anchors) = page.unwrap_or_default();
            let child_urls = self.child_urls(&node.url, anchors);

            node.title = title;
            node.children = child_urls
                .iter()
                .map(|url| CrawlNode::stub(url.clone(), depth + 1))
                .collect();

            self.cache.insert(
                node.url.clone(),
                CachedPage {
                    title: node.title.clone(),
                    img: node.img.clone(),
                    child_urls,
                },
            );

            // Crawl subpages, one at a time — the browser session is shared
            for child in &mut node.children {
                self.visit(child, depth + 1).await;
            }
        })
    }

    /// Discovered anchors that are worth a node: link-filtered, normalized,
    /// deduplicated, excluding the page itself and the crawl root
    fn child_urls(&self, page_url: &str, anchors: Vec<String>) -> Vec<String> {
        let mut urls = Vec::new();

        for anchor in anchors {
            let Ok(parsed) = Url::parse(&anchor) else {
                continue;
            };
            if !self.links.should_queue(&parsed) {
                continue;
            }
            let normalized = self.links.normalize(&parsed).to_string();
            if normalized == page_url || normalized == self.root_url {
                continue;
            }
            if !urls.contains(&normalized) {
                urls.push(normalized);
            }
        }

        urls
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::FixtureFetcher;

    fn page(title: &str, links: &[&str]) -> String {
        let anchors: String = links
            .iter()
            .map(|href| format!("<a href=\"{href}\">{href}</a>"))
            .collect();
        format!("<html><head><title>{title}</title></head><body>{anchors}</body></html>")
    }

    fn config(root: &str, max_depth: usize) -> MapConfig {
        let mut config = MapConfig::new(root);
        config.max_depth = max_depth;
        config
    }

    #[tokio::test]
    async fn depth_bound_prunes_grandchildren() {
        let fetcher = FixtureFetcher::new()
            .page("https://site.example/", &page("Root", &["/c1", "/c2"]))
            .page("https://site.example/c1", &page("C1", &["/c3"]))
            .page("https://site.example/c2", &page("C2", &[]));

        let mut mapper = SiteMapper::new(&config("https://site.example/", 1), fetcher).unwrap();
        let tree = mapper.map_site().await;

        assert_eq!(tree.title, "Root");
        assert_eq!(tree.children.len(), 2);

        // C1 was fetched at the depth bound; its child stays a bare stub
        let c1 = &tree.children[0];
        assert_eq!(c1.title, "C1");
        assert_eq!(c1.children.len(), 1);
        assert_eq!(c1.children[0].url, "https://site.example/c3");
        assert_eq!(c1.children[0].title, "");
        assert!(c1.children[0].children.is_empty());

        // C3 itself was never fetched
        assert_eq!(mapper.fetcher.fetch_count("https://site.example/c3"), 0);
        assert_eq!(mapper.fetches(), 3);
    }

    #[tokio::test]
    async fn mutual_links_terminate_and_fetch_each_page_once() {
        let fetcher = FixtureFetcher::new()
            .page("https://site.example/a", &page("A", &["/b"]))
            .page("https://site.example/b", &page("B", &["/a"]))
            .page("https://site.example/", &page("Root", &["/a"]));

        let mut mapper = SiteMapper::new(&config("https://site.example/", 3), fetcher).unwrap();
        let tree = mapper.map_site().await;

        assert_eq!(mapper.fetcher.fetch_count("https://site.example/a"), 1);
        assert_eq!(mapper.fetcher.fetch_count("https://site.example/b"), 1);

        // a -> b -> a(cached): the revisited node is filled from the cache,
        // including its child list and the known child title
        let a = &tree.children[0];
        let b = &a.children[0];
        assert_eq!(b.title, "B");
        let a_again = &b.children[0];
        assert_eq!(a_again.title, "A");
        assert_eq!(a_again.children.len(), 1);
        assert_eq!(a_again.children[0].url, "https://site.example/b");
        assert_eq!(a_again.children[0].title, "B");
    }

    #[tokio::test]
    async fn failed_fetch_is_memoized_and_not_retried() {
        let fetcher = FixtureFetcher::new()
            .page("https://site.example/", &page("Root", &["/a", "/b"]))
            .page("https://site.example/a", &page("A", &["/x"]))
            .page("https://site.example/b", &page("B", &["/x"]))
            .failing("https://site.example/x");

        let mut mapper = SiteMapper::new(&config("https://site.example/", 2), fetcher).unwrap();
        let tree = mapper.map_site().await;

        // Both /a and /b link to the failing /x; it is attempted once
        assert_eq!(mapper.fetcher.fetch_count("https://site.example/x"), 1);

        let x = &tree.children[0].children[0];
        assert_eq!(x.url, "https://site.example/x");
        assert_eq!(x.title, "");
        assert!(x.children.is_empty());
    }

    #[tokio::test]
    async fn links_back_to_the_root_are_not_expanded_as_children() {
        let fetcher = FixtureFetcher::new()
            .page("https://site.example/", &page("Root", &["/a"]))
            .page("https://site.example/a", &page("A", &["/", "/b"]))
            .page("https://site.example/b", &page("B", &[]));

        let mut mapper = SiteMapper::new(&config("https://site.example/", 2), fetcher).unwrap();
        let tree = mapper.map_site().await;

        let a = &tree.children[0];
        assert_eq!(a.children.len(), 1);
        assert_eq!(a.children[0].url, "https://site.example/b");
    }

    #[tokio::test]
    async fn cancellation_stops_the_descent() {
        let fetcher = FixtureFetcher::new()
            .page("https://site.example/", &page("Root", &["/a"]))
            .page("https://site.example/a", &page("A", &[]));

        let mut mapper = SiteMapper::new(&config("https://site.example/", 2), fetcher).unwrap();
        mapper.cancel_token().cancel();
        let tree = mapper.map_site().await;

        assert_eq!(tree.title, "");
        assert_eq!(mapper.fetches(), 0);
    }

    #[tokio::test]
    async fn serialized_tree_has_the_published_shape() {
        let fetcher = FixtureFetcher::new()
            .page("https://site.example/", &page("Root", &["/a"]))
            .page("https://site.example/a", &page("A", &[]));

        let mut mapper = SiteMapper::new(&config("https://site.example/", 1), fetcher).unwrap();
        let tree = mapper.map_site().await;

        let json = serde_json::to_value(&tree).unwrap();
        assert_eq!(json["url"], "https://site.example/");
        assert_eq!(json["title"], "Root");
        assert_eq!(json["children"][0]["title"], "A");
    }
}
