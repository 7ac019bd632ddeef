use super::Heuristics;
use crate::dom::page::{attribute, child_elements, element_text, first_match, href, src};
use crate::results::ProductRecord;
use crate::utils::site_base;
use regex::Regex;
use scraper::{ElementRef, Selector};
use url::Url;

/// Walk the resolved container's direct children in document order and emit
/// a validated record per product card.
///
/// A record is emitted only when title, price, currency, image URL and
/// product URL all resolve non-empty; incomplete cards are dropped silently
/// at item granularity and only the aggregate count is reported.
pub fn extract_products(
    container: ElementRef,
    heuristics: &Heuristics,
    page_url: &Url,
) -> Vec<ProductRecord> {
    let Some(base) = site_base(page_url) else {
        ::log::warn!("Page URL {} has no host; skipping extraction", page_url);
        return Vec::new();
    };

    let mut records = Vec::new();

    for (index, card) in child_elements(container).into_iter().enumerate() {
        match extract_record(card, index, heuristics, &base) {
            Some(record) => records.push(record),
            None => ::log::debug!("Dropping incomplete product card at index {}", index),
        }
    }

    ::log::info!("Extracted data from {} products", records.len());
    records
}

/// Resolve all fields for one card; `None` if any field is missing
fn extract_record(
    card: ElementRef,
    index: usize,
    heuristics: &Heuristics,
    base: &Url,
) -> Option<ProductRecord> {
    let title = first_text(card, &heuristics.title_selectors)?;

    let price_el = first_match(card, &heuristics.price_selector)?;
    let price_text = element_text(price_el);
    let price = first_price(&price_text, &heuristics.price_re)?;
    let currency = first_currency(&price_text, &heuristics.currency_re)?;

    let image_url = image_url(card, &heuristics.image_selector)?;
    let product_url = product_url(card, &heuristics.anchor_selector, base)?;

    Some(ProductRecord {
        index,
        title,
        price,
        currency,
        image_url,
        product_url,
    })
}

/// First non-empty text among the ordered selectors; the order encodes
/// preference, so the first hit wins
fn first_text(scope: ElementRef, selectors: &[Selector]) -> Option<String> {
    for selector in selectors {
        if let Some(el) = first_match(scope, selector) {
            let text = element_text(el);
            if !text.is_empty() {
                return Some(text);
            }
        }
    }
    None
}

/// First floating-point-shaped substring in the price text
fn first_price(text: &str, price_re: &Regex) -> Option<f64> {
    price_re.find(text)?.as_str().parse().ok()
}

/// First currency glyph in the price text
fn first_currency(text: &str, currency_re: &Regex) -> Option<String> {
    currency_re.find(text).map(|m| m.as_str().to_string())
}

/// Image URL with the fallback chain: `src`, unless absent or a data-URI
/// placeholder; then the last (highest-resolution) `srcset` entry; then the
/// last `data-srcset` entry. Schemeless results get an `https:` prefix.
fn image_url(card: ElementRef, image_selector: &Selector) -> Option<String> {
    let img = first_match(card, image_selector)?;

    let src_value = src(img).unwrap_or_default();
    let raw = if !src_value.is_empty() && !src_value.contains("data:image") {
        src_value
    } else {
        last_srcset_entry(attribute(img, "srcset"))
            .or_else(|| last_srcset_entry(attribute(img, "data-srcset")))?
    };

    Some(ensure_scheme(raw))
}

/// URL part of the last comma-separated srcset entry, descriptor stripped
fn last_srcset_entry(srcset: Option<String>) -> Option<String> {
    let srcset = srcset?;
    let last = srcset.split(',').next_back()?.trim();
    let url = last.split_whitespace().next()?;
    (!url.is_empty()).then(|| url.to_string())
}

fn ensure_scheme(url: String) -> String {
    if url.starts_with("http") {
        url
    } else {
        format!("https:{url}")
    }
}

/// First anchor descendant's href, resolved against the site base (scheme +
/// host of the page's own URL). Unresolvable hrefs invalidate the record.
fn product_url(card: ElementRef, anchor_selector: &Selector, base: &Url) -> Option<String> {
    let anchor = first_match(card, anchor_selector)?;
    let href_value = href(anchor)?;
    base.join(&href_value).ok().map(|u| u.to_string())
}
