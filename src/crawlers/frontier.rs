use std::collections::HashMap;

/// Lifecycle of a frontier entry. `Pending` may move to `Scraped` or
/// `Failed` exactly once; settled entries never revert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryState {
    /// Known but not yet processed
    Pending,

    /// Processed, or inserted with its data already in hand
    Scraped,

    /// Exhausted its fetch attempts; callers can see this outcome and
    /// decide what to do with the site
    Failed,
}

#[derive(Debug, Clone)]
pub struct FrontierEntry {
    pub url: String,
    pub state: EntryState,
    pub attempts: u32,
}

/// The set of URLs known for one site pass, keyed by URL, in insertion
/// order.
///
/// The URL is the dedup key: inserting a known URL never creates a second
/// entry and never downgrades a settled one. The scheduler hands out the
/// first pending entry, which makes runs deterministic; the contract only
/// requires some fair pick.
#[derive(Debug, Default)]
pub struct Frontier {
    entries: Vec<FrontierEntry>,
    index: HashMap<String, usize>,
}

impl Frontier {
    /// A frontier holding one pending entry for the seed URL
    pub fn seeded(seed: &str) -> Self {
        let mut frontier = Self::default();
        frontier.insert_pending(seed);
        frontier
    }

    /// Insert a URL as pending. Returns true if the URL was new; known URLs
    /// are left untouched whatever their state.
    pub fn insert_pending(&mut self, url: &str) -> bool {
        if self.index.contains_key(url) {
            return false;
        }
        self.push(url, EntryState::Pending);
        true
    }

    /// Insert a URL whose data is already in hand, so it never needs a
    /// fetch. A pending entry for the same URL is upgraded to scraped —
    /// that is its single pending-to-settled transition.
    pub fn insert_scraped(&mut self, url: &str) {
        match self.index.get(url) {
            None => self.push(url, EntryState::Scraped),
            Some(&i) => {
                if self.entries[i].state == EntryState::Pending {
                    self.entries[i].state = EntryState::Scraped;
                }
            }
        }
    }

    /// First pending URL in insertion order, if any
    pub fn next_pending(&self) -> Option<String> {
        self.entries
            .iter()
            .find(|e| e.state == EntryState::Pending)
            .map(|e| e.url.clone())
    }

    /// Settle a processed entry. Only pending entries transition.
    pub fn mark_scraped(&mut self, url: &str) {
        self.settle(url, EntryState::Scraped);
    }

    /// Settle an entry that exhausted its fetch attempts
    pub fn mark_failed(&mut self, url: &str) {
        self.settle(url, EntryState::Failed);
    }

    fn settle(&mut self, url: &str, state: EntryState) {
        match self.index.get(url) {
            Some(&i) if self.entries[i].state == EntryState::Pending => {
                self.entries[i].state = state;
            }
            Some(_) => {
                ::log::debug!("Ignoring settle of already settled entry: {}", url);
            }
            None => {
                ::log::warn!("Attempted to settle unknown frontier entry: {}", url);
            }
        }
    }

    /// Count one fetch attempt against the entry, returning the new total
    pub fn note_attempt(&mut self, url: &str) -> u32 {
        match self.index.get(url) {
            Some(&i) => {
                self.entries[i].attempts += 1;
                self.entries[i].attempts
            }
            None => 0,
        }
    }

    pub fn attempts(&self, url: &str) -> u32 {
        self.index
            .get(url)
            .map(|&i| self.entries[i].attempts)
            .unwrap_or(0)
    }

    pub fn state(&self, url: &str) -> Option<EntryState> {
        self.index.get(url).map(|&i| self.entries[i].state)
    }

    pub fn contains(&self, url: &str) -> bool {
        self.index.contains_key(url)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn pending_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.state == EntryState::Pending)
            .count()
    }

    /// True once no entry is pending
    pub fn is_exhausted(&self) -> bool {
        self.pending_count() == 0
    }

    pub fn entries(&self) -> &[FrontierEntry] {
        &self.entries
    }

    fn push(&mut self, url: &str, state: EntryState) {
        self.index.insert(url.to_string(), self.entries.len());
        self.entries.push(FrontierEntry {
            url: url.to_string(),
            state,
            attempts: 0,
        });
    }
}
