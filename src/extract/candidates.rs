use super::Heuristics;
use crate::dom::PageView;
use scraper::ElementRef;

/// A DOM node that might be the product-list container, alive only for one
/// page's extraction pass. Filter stages compute whatever facts they need
/// directly from the wrapped node; nothing is precomputed for candidates
/// that earlier stages already eliminated.
#[derive(Debug, Clone, Copy)]
pub struct CandidateContainer<'a> {
    pub el: ElementRef<'a>,
}

/// Produce the initial candidate set: every element whose tag is in the
/// container-tag vocabulary and whose class or id contains a container-name
/// substring.
///
/// This is a pure filter, not a scorer — no ranking happens here. The
/// selector engine yields each matching node once, so the set is already
/// deduplicated by node identity. An empty result means no container and
/// short-circuits the pipeline.
pub fn find_candidates<'a>(page: &'a PageView, heuristics: &Heuristics) -> Vec<CandidateContainer<'a>> {
    let candidates: Vec<_> = page
        .select(&heuristics.candidate_selector)
        .into_iter()
        .map(|el| CandidateContainer { el })
        .collect();

    ::log::debug!(
        "Found {} container candidates on {}",
        candidates.len(),
        page.url()
    );

    candidates
}
