//! Table of contents built from the page's h2/h3 headings

use super::document::{Document, Edits};
use super::CONTENT_CLASS;
use crate::dashboard::Target;
use crate::html_escape;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocEntry {
    /// Heading element
    pub element: usize,
    /// 2 or 3
    pub depth: u8,
    pub id: String,
    /// True when the heading had no id and `id` was generated
    pub generated_id: bool,
    pub text: String,
}

/// h2/h3 headings inside the content region, in reading order
pub fn collect_headings(doc: &Document) -> Vec<TocEntry> {
    doc.elements()
        .iter()
        .enumerate()
        .filter(|(i, e)| matches!(e.tag.as_str(), "h2" | "h3") && doc.is_inside_class(*i, CONTENT_CLASS))
        .enumerate()
        .map(|(index, (i, e))| {
            let (id, generated_id) = match e.id() {
                Some(id) => (id.to_string(), false),
                None => (format!("heading-{}", index), true),
            };
            TocEntry {
                element: i,
                depth: if e.tag == "h3" { 3 } else { 2 },
                id,
                generated_id,
                text: doc.text(i),
            }
        })
        .collect()
}

pub fn render_toc(entries: &[TocEntry]) -> String {
    let mut html = String::from("<ul>");
    for entry in entries {
        let style = if entry.depth == 3 {
            r#" style="margin-left: 1rem""#
        } else {
            ""
        };
        html.push_str(&format!(
            "<li{}><a href=\"#{}\">{}</a></li>",
            style,
            html_escape(&entry.id),
            html_escape(&entry.text)
        ));
    }
    html.push_str("</ul>");
    html
}

/// Fill the `#toc` container and give id-less headings their generated ids.
///
/// The container's previous contents are replaced, so running this twice
/// gives the same page. Returns the number of entries written; 0 when the
/// page has no container or no headings.
pub fn generate_toc(doc: &Document, edits: &mut Edits) -> usize {
    let Some(container) = doc.element_by_id(Target::Toc.id()) else {
        return 0;
    };
    let entries = collect_headings(doc);
    if entries.is_empty() {
        return 0;
    }
    for entry in entries.iter().filter(|e| e.generated_id) {
        edits.set_attr(doc, entry.element, "id", &entry.id);
    }
    edits.set_inner_html(doc, container, &render_toc(&entries));
    entries.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<html><body>
<aside><h2>Sidebar</h2><div id="toc"></div></aside>
<main class="main-content">
<h1>Title</h1>
<h2 id="install">Install</h2>
<h3>From source</h3>
<h2>Usage &amp; tips</h2>
</main>
</body></html>"#;

    #[test]
    fn test_collect_headings() {
        let doc = Document::parse(PAGE).unwrap();
        let entries = collect_headings(&doc);
        let ids: Vec<&str> = entries.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["install", "heading-1", "heading-2"]);
        assert_eq!(entries[1].depth, 3);
        assert_eq!(entries[2].text, "Usage & tips");
    }

    #[test]
    fn test_generate_toc() {
        let doc = Document::parse(PAGE).unwrap();
        let mut edits = Edits::new();
        assert_eq!(generate_toc(&doc, &mut edits), 3);
        let out = edits.apply(PAGE);
        assert!(out.contains(r#"<h3 id="heading-1">From source</h3>"#));
        assert!(out.contains(r##"<li style="margin-left: 1rem"><a href="#heading-1">From source</a></li>"##));
        assert!(out.contains(r##"<li><a href="#heading-2">Usage &amp; tips</a></li>"##));
        assert!(out.contains(r#"<h2 id="install">Install</h2>"#));
    }

    #[test]
    fn test_generate_toc_is_repeatable() {
        let doc = Document::parse(PAGE).unwrap();
        let mut edits = Edits::new();
        generate_toc(&doc, &mut edits);
        let once = edits.apply(PAGE);

        let doc = Document::parse(&once).unwrap();
        let mut edits = Edits::new();
        generate_toc(&doc, &mut edits);
        assert_eq!(edits.apply(&once), once);
    }

    #[test]
    fn test_no_container_leaves_headings_alone() {
        let src = r#"<main class="main-content"><h2>A</h2></main>"#;
        let doc = Document::parse(src).unwrap();
        let mut edits = Edits::new();
        assert_eq!(generate_toc(&doc, &mut edits), 0);
        assert!(edits.is_empty());
    }

    #[test]
    fn test_no_headings() {
        let src = r#"<div id="toc"></div><main class="main-content"><p>x</p></main>"#;
        let doc = Document::parse(src).unwrap();
        let mut edits = Edits::new();
        assert_eq!(generate_toc(&doc, &mut edits), 0);
        assert_eq!(edits.apply(src), src);
    }
}
