/// Links handled in-page: everything whose `href` starts with `#`.
pub const ANCHOR_SELECTOR: &str = "a[href^=\"#\"]";

/// Selector for the element an in-page link points at. The bare `#` (a
/// link to the top of nothing) has no target.
pub fn fragment_selector(href: &str) -> Option<&str> {
    let href = href.trim();
    match href.strip_prefix('#') {
        Some(id) if !id.is_empty() => Some(href),
        _ => None,
    }
}
