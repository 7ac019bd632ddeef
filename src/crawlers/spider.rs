use super::frontier::Frontier;
use super::CancelToken;
use crate::config::SpiderConfig;
use crate::dom::{FetchError, PageFetcher, PageView};
use crate::extract::{self, FilterOutcome, Heuristics, HeuristicsError};
use crate::filter::LinkFilter;
use crate::results::{ProductRecord, SiteSummary};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use url::Url;

/// Why extraction was skipped for a page. Both cases are recoverable; the
/// page's links are still discovered and traversal continues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerMiss {
    /// No candidate survived the filter pipeline
    NotFound,

    /// Several candidates survived; the spider never guesses among them
    Ambiguous(usize),
}

/// What happened to one frontier entry
#[derive(Debug)]
pub enum PageOutcome {
    /// Container identified, records extracted
    Extracted { products: usize, discovered: usize },

    /// Page fetched but no single container could be identified
    NoContainer {
        miss: ContainerMiss,
        discovered: usize,
    },

    /// Navigation failed; the entry may be retried
    FetchFailed(FetchError),
}

/// Configuration failed to compile into a runnable spider
#[derive(Debug, Error)]
pub enum SpiderSetupError {
    #[error(transparent)]
    Heuristics(#[from] HeuristicsError),

    #[error("invalid link filter pattern: {0}")]
    LinkFilter(#[from] regex::Error),
}

/// Policy-A traversal: a flat per-site frontier with a scraped flag per URL.
///
/// Exactly one URL is in flight at a time — the browser session is shared,
/// so simplicity wins over throughput here. Extracted product URLs enter
/// the frontier pre-marked scraped (their data is already in hand); newly
/// discovered same-origin links enter pending. A site pass ends when no
/// entry is pending.
pub struct Spider<F> {
    fetcher: F,
    config: SpiderConfig,
    heuristics: Heuristics,
    links: LinkFilter,
    cancel: CancelToken,
}

impl<F: PageFetcher> Spider<F> {
    pub fn new(config: SpiderConfig, fetcher: F) -> Result<Self, SpiderSetupError> {
        let heuristics = Heuristics::new(&config.heuristics)?;
        let links = LinkFilter::new(&config.links)?;

        Ok(Self {
            fetcher,
            config,
            heuristics,
            links,
            cancel: CancelToken::new(),
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

    /// Process every configured site in order, streaming records through
    /// `tx`, and report per-site tallies
    pub async fn run(&self, tx: &mpsc::Sender<ProductRecord>) -> Vec<SiteSummary> {
        let mut summaries = Vec::with_capacity(self.config.sites.len());

        for site in &self.config.sites {
            if self.cancel.is_cancelled() {
                ::log::info!("Crawl cancelled before site {}", site);
                break;
            }
            summaries.push(self.run_site(site, tx).await);
        }

        summaries
    }

    /// Grow and drain one site's frontier
    pub async fn run_site(&self, seed: &str, tx: &mpsc::Sender<ProductRecord>) -> SiteSummary {
        let mut frontier = Frontier::seeded(seed);
        self.drain_frontier(seed, &mut frontier, tx).await
    }

    /// The Policy-A loop over an existing frontier: repeatedly pick the
    /// next pending entry, process it, and settle it, until nothing is
    /// pending or the run is cancelled
    pub async fn drain_frontier(
        &self,
        seed: &str,
        frontier: &mut Frontier,
        tx: &mpsc::Sender<ProductRecord>,
    ) -> SiteSummary {
        ::log::info!("Scraping site: {}", seed);

        let mut summary = SiteSummary {
            site: seed.to_string(),
            ..SiteSummary::default()
        };

        while let Some(url) = frontier.next_pending() {
            if self.cancel.is_cancelled() {
                ::log::info!(
                    "Crawl cancelled with {} entries still pending",
                    frontier.pending_count()
                );
                break;
            }

            ::log::info!("Scraping: {}", url);
            let (outcome, records) = self.step(&url, frontier).await;

            match outcome {
                PageOutcome::Extracted {
                    products,
                    discovered,
                } => {
                    summary.pages_fetched += 1;
                    summary.products += products;
                    ::log::debug!(
                        "{}: {} products, {} new links",
                        url,
                        products,
                        discovered
                    );
                }
                PageOutcome::NoContainer { miss, discovered } => {
                    summary.pages_fetched += 1;
                    match miss {
                        ContainerMiss::NotFound => {
                            ::log::info!("No product container on {}", url)
                        }
                        ContainerMiss::Ambiguous(n) => {
                            ::log::info!("{} ambiguous containers on {}, not guessing", n, url)
                        }
                    }
                    ::log::debug!("{}: {} new links", url, discovered);
                }
                PageOutcome::FetchFailed(e) => {
                    let attempts = frontier.attempts(&url);
                    if attempts >= self.config.max_attempts {
                        ::log::error!("Giving up on {} after {} attempts: {}", url, attempts, e);
                        frontier.mark_failed(&url);
                        summary.failures += 1;
                    } else {
                        ::log::warn!("Fetch failed for {} (attempt {}): {}", url, attempts, e);
                        tokio::time::sleep(Duration::from_millis(self.config.retry_delay_ms)).await;
                    }
                }
            }

            for record in records {
                if tx.send(record).await.is_err() {
                    ::log::warn!("Record receiver dropped; stopping site {}", seed);
                    return summary;
                }
            }
        }

        ::log::info!(
            "Site {} done: {} pages, {} products, {} failures, {} URLs seen",
            seed,
            summary.pages_fetched,
            summary.products,
            summary.failures,
            frontier.len()
        );
        summary
    }

    /// Process a single frontier entry: fetch it, and on success fold the
    /// page's products and links into the frontier and settle the entry
    async fn step(&self, url: &str, frontier: &mut Frontier) -> (PageOutcome, Vec<ProductRecord>) {
        frontier.note_attempt(url);

        match self.fetcher.fetch(url).await {
            Ok(view) => {
                let (outcome, records) = self.digest(view, frontier);
                frontier.mark_scraped(url);
                (outcome, records)
            }
            Err(e) => (PageOutcome::FetchFailed(e), Vec::new()),
        }
    }

    /// Synchronous part of a step: identify the container, extract records,
    /// seed the frontier with product URLs (pre-scraped) and discovered
    /// links (pending). Consumes the view; nothing DOM-related survives it.
    fn digest(&self, view: PageView, frontier: &mut Frontier) -> (PageOutcome, Vec<ProductRecord>) {
        let (miss, records) = match extract::identify_container(&view, &self.heuristics) {
            FilterOutcome::Resolved(container) => (
                None,
                extract::extract_products(container, &self.heuristics, view.url()),
            ),
            FilterOutcome::Ambiguous(n) => (Some(ContainerMiss::Ambiguous(n)), Vec::new()),
            FilterOutcome::NotFound => (Some(ContainerMiss::NotFound), Vec::new()),
        };

        // Product URLs already carry full data; never worth a second visit
        for record in &records {
            frontier.insert_scraped(&record.product_url);
        }

        let discovered = self.discover_links(&view, frontier);

        let outcome = match miss {
            None => PageOutcome::Extracted {
                products: records.len(),
                discovered,
            },
            Some(miss) => PageOutcome::NoContainer { miss, discovered },
        };
        (outcome, records)
    }

    /// Queue same-origin links that pass the link filter and are not
    /// already frontier keys. Returns how many were new.
    fn discover_links(&self, view: &PageView, frontier: &mut Frontier) -> usize {
        let mut discovered = 0;

        for anchor in view.anchors() {
            let Ok(parsed) = Url::parse(anchor) else {
                continue;
            };
            if !self.links.should_queue(&parsed) {
                ::log::trace!("Link filter rejected: {}", parsed);
                continue;
            }
            let normalized = self.links.normalize(&parsed).to_string();
            if frontier.insert_pending(&normalized) {
                discovered += 1;
            }
        }

        discovered
    }
}

/// Start a spider in the background and hand back the record stream,
/// mirroring how callers consume pages from a crawl
pub async fn start<F>(
    config: SpiderConfig,
    fetcher: F,
) -> Result<mpsc::Receiver<ProductRecord>, SpiderSetupError>
where
    F: PageFetcher + 'static,
{
    let spider = Spider::new(config, fetcher)?;
    let (tx, rx) = mpsc::channel(1024);

    tokio::spawn(async move {
        let summaries = spider.run(&tx).await;
        let products: usize = summaries.iter().map(|s| s.products).sum();
        ::log::info!(
            "Spider finished: {} sites, {} products",
            summaries.len(),
            products
        );
    });

    Ok(rx)
}
