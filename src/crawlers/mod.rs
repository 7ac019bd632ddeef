pub mod frontier;
pub mod mapper;
pub mod spider;

pub use frontier::{EntryState, Frontier, FrontierEntry};
pub use mapper::SiteMapper;
pub use spider::{PageOutcome, Spider};

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Cloneable stop flag shared between a crawl run and whoever may want to
/// interrupt it.
///
/// Cancellation stops the scheduling of new frontier/recursion work; a fetch
/// already in flight is allowed to finish and its results are discarded by
/// the loop that observes the flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request that the crawl stop scheduling new work
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}
