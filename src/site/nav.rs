//! Active navigation links and the mobile menu

use super::document::{Document, Edits};

pub const ACTIVE_CLASS: &str = "active";
const NAV_CLASSES: [&str; 2] = ["nav", "sidebar-nav"];

/// Whether a link with `href` is active on `current_path`.
///
/// Matching is by substring, so `/guide` is active on `/guide-advanced/`
/// too. Several links may be active at once.
pub fn is_active(href: &str, current_path: &str) -> bool {
    if href == "/" {
        return current_path == "/";
    }
    !href.is_empty() && current_path.contains(href)
}

/// Links inside `.nav` or `.sidebar-nav`, in document order
pub fn nav_links(doc: &Document) -> Vec<usize> {
    doc.by_tag("a")
        .filter(|&i| {
            NAV_CLASSES
                .iter()
                .any(|class| doc.is_inside_class(i, class))
        })
        .collect()
}

/// Add `active` to every matching navigation link; returns the links marked
pub fn mark_active_links(doc: &Document, edits: &mut Edits, current_path: &str) -> Vec<usize> {
    let active: Vec<usize> = nav_links(doc)
        .into_iter()
        .filter(|&i| {
            doc.element(i)
                .attr("href")
                .is_some_and(|href| is_active(href, current_path))
        })
        .collect();
    for &i in &active {
        edits.add_class(doc, i, ACTIVE_CLASS);
    }
    active
}

/// Whether the `.nav` element is expanded
pub fn is_menu_open(doc: &Document) -> bool {
    doc.by_class("nav")
        .next()
        .is_some_and(|nav| doc.element(nav).has_class(ACTIVE_CLASS))
}

/// Toggle `active` on the `.nav` element. `None` when the page has no nav.
pub fn toggle_mobile_menu(doc: &Document, edits: &mut Edits) -> Option<bool> {
    let nav = doc.by_class("nav").next()?;
    Some(edits.toggle_class(doc, nav, ACTIVE_CLASS))
}
