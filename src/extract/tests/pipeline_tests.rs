use super::fixture_page;
use crate::extract::{FilterOutcome, Heuristics, find_candidates, identify_container};

fn heuristics() -> Heuristics {
    Heuristics::with_defaults()
}

/// A complete, valid product card for composing fixtures
fn card(title: &str, price: &str) -> String {
    format!(
        r#"<li class="product_card">
            <a href="/products/{slug}"><img src="https://cdn.example/{slug}.jpg"></a>
            <h3 class="product-title">{title}</h3>
            <span class="price">{price}</span>
        </li>"#,
        slug = title.to_lowercase().replace(' ', "-"),
    )
}

#[test]
fn lone_name_match_resolves_without_further_stages() {
    let page = fixture_page(&format!(
        "<html><body><ul class=\"product-grid\">{}{}</ul></body></html>",
        card("Linen Shirt", "£15.40"),
        card("Wool Coat", "£89.00"),
    ));

    let outcome = identify_container(&page, &heuristics());
    assert!(matches!(outcome, FilterOutcome::Resolved(_)));
}

#[test]
fn no_vocabulary_match_is_not_found() {
    let page = fixture_page(
        "<html><body><section class=\"hero\"><p>Welcome</p></section></body></html>",
    );

    let outcome = identify_container(&page, &heuristics());
    assert!(matches!(outcome, FilterOutcome::NotFound));
}

#[test]
fn finder_matching_is_case_sensitive() {
    // "Products" does not contain the lowercase vocabulary entry "products"
    let page = fixture_page(&format!(
        "<html><body><ul class=\"Products-Grid\">{}</ul></body></html>",
        card("Linen Shirt", "£15.40"),
    ));

    assert!(find_candidates(&page, &heuristics()).is_empty());
}

#[test]
fn content_filter_requires_both_image_and_price() {
    // Three name-matched containers: a text-only nav list, an image-only
    // gallery, and the real grid. Only the grid has both signals.
    let page = fixture_page(&format!(
        r#"<html><body>
            <ul class="nav-list"><li>Home</li><li>Sale</li></ul>
            <ul class="gallery-items"><li><img src="https://cdn.example/look.jpg"></li></ul>
            <ul class="product-grid">{}</ul>
        </body></html>"#,
        card("Linen Shirt", "£15.40"),
    ));

    let outcome = identify_container(&page, &heuristics());
    assert!(matches!(outcome, FilterOutcome::Resolved(_)));
}

#[test]
fn child_tag_filter_rejects_mixed_children() {
    // Both containers carry image+price content; the first mixes li and div
    // children, the second is uniformly li.
    let page = fixture_page(&format!(
        r#"<html><body>
            <ul class="product-list">
                {card}
                <div class="product_card"><img src="https://cdn.example/x.jpg"><span class="price">£9.00</span></div>
            </ul>
            <ul class="product-grid">{card}</ul>
        </body></html>"#,
        card = card("Linen Shirt", "£15.40"),
    ));

    let outcome = identify_container(&page, &heuristics());
    match outcome {
        FilterOutcome::Resolved(el) => {
            assert_eq!(el.value().attr("class"), Some("product-grid"));
        }
        other => panic!("expected resolution, got {:?}", other),
    }
}

#[test]
fn child_name_filter_disambiguates_remaining_containers() {
    // Both survive content and tag homogeneity; only one has children named
    // from the item vocabulary.
    let page = fixture_page(&format!(
        r#"<html><body>
            <ul class="promo-list">
                <li class="promo-slot"><img src="https://cdn.example/p.jpg"><span>only £5 today</span></li>
            </ul>
            <ul class="product-grid">{}</ul>
        </body></html>"#,
        card("Linen Shirt", "£15.40"),
    ));

    let outcome = identify_container(&page, &heuristics());
    match outcome {
        FilterOutcome::Resolved(el) => {
            assert_eq!(el.value().attr("class"), Some("product-grid"));
        }
        other => panic!("expected resolution, got {:?}", other),
    }
}

#[test]
fn identical_survivors_end_ambiguous() {
    let page = fixture_page(&format!(
        r#"<html><body>
            <ul class="product-grid">{card}</ul>
            <ul class="product-grid">{card}</ul>
        </body></html>"#,
        card = card("Linen Shirt", "£15.40"),
    ));

    let outcome = identify_container(&page, &heuristics());
    match outcome {
        FilterOutcome::Ambiguous(n) => assert_eq!(n, 2),
        other => panic!("expected ambiguity, got {:?}", other),
    }

    // From the caller's point of view this is the same as no container
    assert!(identify_container(&page, &heuristics()).into_resolved().is_none());
}

#[test]
fn euro_and_dollar_glyphs_count_as_prices() {
    for price in ["€10,00", "$12.99"] {
        let page = fixture_page(&format!(
            r#"<html><body>
                <ul class="nav-list"><li>Home</li></ul>
                <ul class="product-grid">{}</ul>
            </body></html>"#,
            card("Linen Shirt", price),
        ));
        let outcome = identify_container(&page, &heuristics());
        assert!(
            matches!(outcome, FilterOutcome::Resolved(_)),
            "price text {:?} should satisfy the content filter",
            price
        );
    }
}
