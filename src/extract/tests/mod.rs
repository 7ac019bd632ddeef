mod pipeline_tests;
mod product_tests;

use crate::dom::PageView;
use url::Url;

/// Parse fixture HTML as a page of the test storefront
pub(crate) fn fixture_page(html: &str) -> PageView {
    let url = Url::parse("https://shop.example/womens/new-in").unwrap();
    PageView::from_html(url, html)
}
