use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use url::Url;

/// One fetched page: its final URL, title, same-origin anchors and a parsed
/// document answering the DOM query operations.
///
/// All queries are read-only and node-local; a view never outlives the
/// processing of its page.
pub struct PageView {
    url: Url,
    title: String,
    anchors: Vec<String>,
    doc: Html,
}

impl PageView {
    /// Build a view from raw HTML, deriving anchors from the static markup.
    ///
    /// This is the path used by fixtures and any source that is not a live
    /// browser; it cannot see into shadow roots.
    pub fn from_html(url: Url, html: &str) -> Self {
        let doc = Html::parse_document(html);
        let title = document_title(&doc);
        let anchors = static_same_origin_anchors(&doc, &url);
        Self {
            url,
            title,
            anchors,
            doc,
        }
    }

    /// Build a view with anchors collected in the live browser context
    /// (shadow-root inclusive). The anchor set is still normalized here so
    /// the same-origin contract holds regardless of what the page scripted.
    pub fn with_live_anchors(url: Url, html: &str, anchors: Vec<String>) -> Self {
        let doc = Html::parse_document(html);
        let title = document_title(&doc);
        let anchors = sift_same_origin(anchors.into_iter(), &url);
        Self {
            url,
            title,
            anchors,
            doc,
        }
    }

    /// The page's own URL after navigation
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Document title, empty if the page has none
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Absolute, deduplicated same-origin anchor URLs, excluding the page
    /// itself, in document order
    pub fn anchors(&self) -> &[String] {
        &self.anchors
    }

    /// All elements in the document matching the selector, document order
    pub fn select(&self, selector: &Selector) -> Vec<ElementRef<'_>> {
        self.doc.select(selector).collect()
    }
}

/// Extract and trim the document title
fn document_title(doc: &Html) -> String {
    let selector = Selector::parse("title").expect("static selector");
    doc.select(&selector)
        .next()
        .map(|el| element_text(el))
        .unwrap_or_default()
}

/// Collect same-origin anchors from static markup, resolving relative hrefs
/// against the page URL
fn static_same_origin_anchors(doc: &Html, page_url: &Url) -> Vec<String> {
    let selector = Selector::parse("a[href]").expect("static selector");
    let hrefs = doc
        .select(&selector)
        .filter_map(|el| el.value().attr("href"))
        .filter_map(|href| page_url.join(href).ok())
        .map(|u| u.to_string());
    sift_same_origin(hrefs, page_url)
}

/// Keep absolute same-origin URLs that are not the page itself, deduplicated
/// in first-seen order
fn sift_same_origin<I>(candidates: I, page_url: &Url) -> Vec<String>
where
    I: Iterator<Item = String>,
{
    let origin = page_url.origin();
    let mut seen = HashSet::new();
    let mut anchors = Vec::new();

    for candidate in candidates {
        let Ok(resolved) = Url::parse(&candidate) else {
            ::log::debug!("Dropping malformed anchor: {}", candidate);
            continue;
        };
        if resolved.origin() != origin || resolved == *page_url {
            continue;
        }
        let resolved = resolved.to_string();
        if seen.insert(resolved.clone()) {
            anchors.push(resolved);
        }
    }

    anchors
}

/// Concatenated text of an element's descendants, whitespace-normalized
pub fn element_text(el: ElementRef) -> String {
    el.text()
        .flat_map(|chunk| chunk.split_whitespace())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Value of an attribute, if present
pub fn attribute(el: ElementRef, name: &str) -> Option<String> {
    el.value().attr(name).map(|v| v.trim().to_string())
}

/// Value of the `href` attribute, if present and non-empty
pub fn href(el: ElementRef) -> Option<String> {
    attribute(el, "href").filter(|v| !v.is_empty())
}

/// Value of the `src` attribute, if present
pub fn src(el: ElementRef) -> Option<String> {
    attribute(el, "src")
}

/// Direct element children, in document order
pub fn child_elements(el: ElementRef) -> Vec<ElementRef> {
    el.children().filter_map(ElementRef::wrap).collect()
}

/// First descendant matching the selector
pub fn first_match<'a>(scope: ElementRef<'a>, selector: &Selector) -> Option<ElementRef<'a>> {
    scope.select(selector).next()
}
