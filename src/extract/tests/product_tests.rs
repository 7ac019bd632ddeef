use super::fixture_page;
use crate::extract::{Heuristics, extract_products, identify_container};
use scraper::ElementRef;

fn heuristics() -> Heuristics {
    Heuristics::with_defaults()
}

fn grid_page(cards: &str) -> String {
    format!(
        "<html><body><ul class=\"product-grid\">{}</ul></body></html>",
        cards
    )
}

fn resolve<'a>(page: &'a crate::dom::PageView, heur: &Heuristics) -> ElementRef<'a> {
    identify_container(page, heur)
        .into_resolved()
        .expect("fixture should resolve to one container")
}

#[test]
fn complete_cards_become_records_in_document_order() {
    let page = fixture_page(&grid_page(
        r#"<li class="product_card">
            <a href="/products/linen-shirt"><img src="https://cdn.example/linen.jpg"></a>
            <h3 class="product-title">Linen Shirt</h3>
            <span class="price">£15.40 was £25.00</span>
        </li>
        <li class="product_card">
            <a href="products/wool-coat"><img src="https://cdn.example/wool.jpg"></a>
            <h3 class="product-title">Wool Coat</h3>
            <span class="price">£89.00</span>
        </li>"#,
    ));
    let heur = heuristics();
    let container = resolve(&page, &heur);

    let records = extract_products(container, &heur, page.url());
    assert_eq!(records.len(), 2);

    assert_eq!(records[0].index, 0);
    assert_eq!(records[0].title, "Linen Shirt");
    assert_eq!(records[0].price, 15.40);
    assert_eq!(records[0].currency, "£");
    assert_eq!(records[0].image_url, "https://cdn.example/linen.jpg");
    // Relative hrefs resolve against the site base, not the page path
    assert_eq!(records[0].product_url, "https://shop.example/products/linen-shirt");

    assert_eq!(records[1].index, 1);
    assert_eq!(records[1].product_url, "https://shop.example/products/wool-coat");
}

#[test]
fn card_without_price_is_dropped_not_padded() {
    let page = fixture_page(&grid_page(
        r#"<li class="product_card">
            <a href="/products/a"><img src="https://cdn.example/a.jpg"></a>
            <h3 class="product-title">Priced Item</h3>
            <span class="price">€10,00</span>
        </li>
        <li class="product_card">
            <a href="/products/b"><img src="https://cdn.example/b.jpg"></a>
            <h3 class="product-title">Unpriced Item</h3>
        </li>"#,
    ));
    let heur = heuristics();
    let container = resolve(&page, &heur);

    let records = extract_products(container, &heur, page.url());
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].title, "Priced Item");

    // Every field of every emitted record is non-empty
    for record in &records {
        assert!(!record.title.is_empty());
        assert!(!record.currency.is_empty());
        assert!(!record.image_url.is_empty());
        assert!(!record.product_url.is_empty());
    }
}

#[test]
fn price_text_without_numeric_part_invalidates_the_card() {
    let page = fixture_page(&grid_page(
        r#"<li class="product_card">
            <a href="/products/a"><img src="https://cdn.example/a.jpg"></a>
            <h3 class="product-title">Coming Soon</h3>
            <span class="price">£TBD</span>
        </li>"#,
    ));
    let heur = heuristics();
    let container = resolve(&page, &heur);

    assert!(extract_products(container, &heur, page.url()).is_empty());
}

#[test]
fn data_uri_placeholder_falls_back_to_last_srcset_entry() {
    let page = fixture_page(&grid_page(
        r#"<li class="product_card">
            <a href="/products/a">
                <img src="data:image/gif;base64,R0lGOD" srcset="a.jpg 1x, b.jpg 2x">
            </a>
            <h3 class="product-title">Lazy Loaded</h3>
            <span class="price">$12.00</span>
        </li>"#,
    ));
    let heur = heuristics();
    let container = resolve(&page, &heur);

    let records = extract_products(container, &heur, page.url());
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].image_url, "https:b.jpg");
}

#[test]
fn missing_src_falls_through_to_data_srcset() {
    let page = fixture_page(&grid_page(
        r#"<li class="product_card">
            <a href="/products/a">
                <img data-srcset="//cdn.example/s.jpg 1x, //cdn.example/l.jpg 2x">
            </a>
            <h3 class="product-title">Deferred</h3>
            <span class="price">$9.50</span>
        </li>"#,
    ));
    let heur = heuristics();
    let container = resolve(&page, &heur);

    let records = extract_products(container, &heur, page.url());
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].image_url, "https://cdn.example/l.jpg");
}

#[test]
fn image_exhausting_all_fallbacks_invalidates_the_card() {
    let page = fixture_page(&grid_page(
        r#"<li class="product_card">
            <a href="/products/a"><img></a>
            <h3 class="product-title">Ghost</h3>
            <span class="price">$1.00</span>
        </li>"#,
    ));
    let heur = heuristics();
    let container = resolve(&page, &heur);

    assert!(extract_products(container, &heur, page.url()).is_empty());
}

#[test]
fn title_selector_order_prefers_title_over_name() {
    let page = fixture_page(&grid_page(
        r#"<li class="product_card">
            <a href="/products/a"><img src="https://cdn.example/a.jpg"></a>
            <span class="brand-name">Acme</span>
            <h3 class="product-title">Linen Shirt</h3>
            <span class="price">£15.40</span>
        </li>"#,
    ));
    let heur = heuristics();
    let container = resolve(&page, &heur);

    let records = extract_products(container, &heur, page.url());
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].title, "Linen Shirt");
}

#[test]
fn absolute_product_href_is_kept_as_is() {
    let page = fixture_page(&grid_page(
        r#"<li class="product_card">
            <a href="https://shop.example/p/123?variant=9"><img src="https://cdn.example/a.jpg"></a>
            <h3 class="product-title">Variant</h3>
            <span class="price">$5.00</span>
        </li>"#,
    ));
    let heur = heuristics();
    let container = resolve(&page, &heur);

    let records = extract_products(container, &heur, page.url());
    assert_eq!(records[0].product_url, "https://shop.example/p/123?variant=9");
}
