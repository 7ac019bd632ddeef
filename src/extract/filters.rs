use super::candidates::{CandidateContainer, find_candidates};
use super::Heuristics;
use crate::dom::page::{attribute, child_elements, element_text, first_match};
use crate::dom::PageView;
use regex::Regex;
use scraper::{ElementRef, Selector};

/// Result of a pipeline run. `Ambiguous` carries the survivor count; callers
/// treat it exactly like `NotFound` — the system never guesses among
/// several plausible containers, because a wrong container silently corrupts
/// every record extracted from it.
#[derive(Debug)]
pub enum FilterOutcome<T> {
    /// Exactly one candidate survived
    Resolved(T),

    /// More than one candidate survived the final stage
    Ambiguous(usize),

    /// Some stage eliminated every candidate
    NotFound,
}

impl<T> FilterOutcome<T> {
    /// The resolved container, if any
    pub fn into_resolved(self) -> Option<T> {
        match self {
            FilterOutcome::Resolved(container) => Some(container),
            _ => None,
        }
    }
}

/// One narrowing stage: a name for the logs and a pure keep-predicate
pub struct Stage<'h, T> {
    pub name: &'static str,
    pub keep: Box<dyn Fn(&T) -> bool + 'h>,
}

/// Run candidates through the ordered stages, applying the termination rule
/// after every stage: 0 left is `NotFound`, 1 left is `Resolved`, more than
/// 1 after the last stage is `Ambiguous`.
///
/// Narrowing is monotonic by construction — each stage retains a subset of
/// its input — and stages after the terminating one are never evaluated.
/// Zero survivors terminates identically at every stage.
pub fn run_stages<T>(initial: Vec<T>, initial_stage: &str, stages: Vec<Stage<'_, T>>) -> FilterOutcome<T> {
    let mut remaining = initial;

    if let Some(outcome) = settle(&mut remaining, initial_stage) {
        return outcome;
    }

    for stage in stages {
        remaining.retain(|candidate| (stage.keep)(candidate));

        if let Some(outcome) = settle(&mut remaining, stage.name) {
            return outcome;
        }
    }

    ::log::info!(
        "{} containers still ambiguous after all filters",
        remaining.len()
    );
    FilterOutcome::Ambiguous(remaining.len())
}

/// Apply the termination rule to the current survivor set; `None` means the
/// pipeline continues
fn settle<T>(remaining: &mut Vec<T>, stage: &str) -> Option<FilterOutcome<T>> {
    match remaining.len() {
        0 => {
            ::log::info!("Container not identified (after {})", stage);
            Some(FilterOutcome::NotFound)
        }
        1 => {
            ::log::info!("Container identified (after {})", stage);
            remaining.pop().map(FilterOutcome::Resolved)
        }
        n => {
            ::log::debug!("{} containers after {}", n, stage);
            None
        }
    }
}

/// Identify the product-list container on a page, or report that none can
/// be singled out
pub fn identify_container<'a>(
    page: &'a PageView,
    heuristics: &Heuristics,
) -> FilterOutcome<ElementRef<'a>> {
    let candidates = find_candidates(page, heuristics);

    let stages: Vec<Stage<'_, CandidateContainer<'a>>> = vec![
        Stage {
            name: "image/price filter",
            keep: Box::new(|c| {
                has_image_and_price(c.el, &heuristics.image_selector, &heuristics.currency_re)
            }),
        },
        Stage {
            name: "child tag filter",
            keep: Box::new(|c| children_share_tag(c.el, &heuristics.item_tags)),
        },
        Stage {
            name: "child name filter",
            keep: Box::new(|c| children_share_name(c.el, &heuristics.item_names)),
        },
    ];

    match run_stages(candidates, "name match", stages) {
        FilterOutcome::Resolved(candidate) => FilterOutcome::Resolved(candidate.el),
        FilterOutcome::Ambiguous(n) => FilterOutcome::Ambiguous(n),
        FilterOutcome::NotFound => FilterOutcome::NotFound,
    }
}

/// Content filter: the descendant set must contain an image node and text
/// carrying a currency glyph. Both are required — a grid of images without
/// prices is a gallery, priced text without images is a table of fees.
pub fn has_image_and_price(el: ElementRef, image_selector: &Selector, currency_re: &Regex) -> bool {
    let has_image = first_match(el, image_selector).is_some();
    if !has_image {
        return false;
    }
    currency_re.is_match(&element_text(el))
}

/// Homogeneous child tag: there is one tag in the item-tag vocabulary that
/// every direct child has. An empty child list passes vacuously; it simply
/// yields no records downstream.
pub fn children_share_tag(el: ElementRef, item_tags: &[String]) -> bool {
    let children = child_elements(el);
    item_tags
        .iter()
        .any(|tag| children.iter().all(|child| child.value().name() == tag))
}

/// Homogeneous child name: there is one item-name substring that every
/// direct child's class or id contains, case-insensitively
pub fn children_share_name(el: ElementRef, item_names: &[String]) -> bool {
    let children = child_elements(el);

    item_names.iter().any(|name| {
        children.iter().all(|child| {
            let class = attribute(*child, "class").unwrap_or_default().to_lowercase();
            let id = attribute(*child, "id").unwrap_or_default().to_lowercase();
            class.contains(name) || id.contains(name)
        })
    })
}
