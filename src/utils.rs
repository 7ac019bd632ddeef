use url::Url;

/// Convert a URL to a directory-name-safe slug, e.g. for output paths
pub fn slugify_url(url: &str) -> String {
    let mut name = url.replace("http://", "").replace("https://", "");
    name = name.replace(['/', ':', '?', '&', '=', '#', '%'], "_");

    // Limit slug length
    if name.len() > 100 {
        name[..100].to_string()
    } else {
        name
    }
}

/// Base of the site a page belongs to: scheme + host, path reset to root.
/// Relative product hrefs resolve against this, not against the page path.
pub fn site_base(page_url: &Url) -> Option<Url> {
    if !page_url.has_host() {
        return None;
    }
    let mut base = page_url.clone();
    base.set_path("/");
    base.set_query(None);
    base.set_fragment(None);
    Some(base)
}
