//! Same-page anchor links

use super::document::Document;

/// Links whose href starts with `#`
pub fn same_page_anchors(doc: &Document) -> Vec<usize> {
    doc.by_tag("a")
        .filter(|&i| {
            doc.element(i)
                .attr("href")
                .is_some_and(|h| h.starts_with('#'))
        })
        .collect()
}

/// Element an anchor href points to, if any
pub fn resolve_anchor(doc: &Document, href: &str) -> Option<usize> {
    let fragment = href.strip_prefix('#')?;
    if fragment.is_empty() {
        return None;
    }
    doc.element_by_id(fragment)
}

/// Hrefs of same-page anchors with no target, in document order, deduplicated
pub fn unresolved_anchors(doc: &Document) -> Vec<String> {
    let mut missing: Vec<String> = Vec::new();
    for i in same_page_anchors(doc) {
        let Some(href) = doc.element(i).attr("href") else {
            continue;
        };
        // A bare "#" conventionally means the top of the page
        if href == "#" {
            continue;
        }
        if resolve_anchor(doc, href).is_none() && !missing.iter().any(|m| m == href) {
            missing.push(href.to_string());
        }
    }
    missing
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r##"<body>
<a href="#usage">Usage</a>
<a href="#">Top</a>
<a href="#missing">Broken</a>
<a href="#missing">Broken again</a>
<a href="/other#usage">Elsewhere</a>
<h2 id="usage">Usage</h2>
</body>"##;

    #[test]
    fn test_same_page_anchors() {
        let doc = Document::parse(PAGE).unwrap();
        assert_eq!(same_page_anchors(&doc).len(), 4);
    }

    #[test]
    fn test_resolve_anchor() {
        let doc = Document::parse(PAGE).unwrap();
        let target = resolve_anchor(&doc, "#usage").unwrap();
        assert_eq!(doc.element(target).tag, "h2");
        assert_eq!(resolve_anchor(&doc, "#missing"), None);
        assert_eq!(resolve_anchor(&doc, "#"), None);
        assert_eq!(resolve_anchor(&doc, "usage"), None);
    }

    #[test]
    fn test_unresolved_anchors() {
        let doc = Document::parse(PAGE).unwrap();
        assert_eq!(unresolved_anchors(&doc), vec!["#missing".to_string()]);
    }
}
