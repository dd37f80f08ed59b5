//! Copy buttons on code blocks

use super::document::{Document, Edits};
use std::time::{Duration, Instant};

pub const COPY_LABEL: &str = "Copy";
pub const COPIED_LABEL: &str = "Copied!";
pub const FEEDBACK_DURATION: Duration = Duration::from_secs(2);
pub const BUTTON_CLASS: &str = "copy-button";

/// `pre` elements that contain a `code` element
pub fn code_blocks(doc: &Document) -> Vec<usize> {
    doc.by_tag("pre")
        .filter(|&pre| doc.descendants(pre).any(|d| doc.element(d).tag == "code"))
        .collect()
}

/// Text a copy button puts on the clipboard: the block's code, whitespace intact
pub fn copy_text(doc: &Document, pre: usize) -> String {
    match doc.descendants(pre).find(|&d| doc.element(d).tag == "code") {
        Some(code) => doc.raw_text(code),
        None => doc.raw_text(pre),
    }
}

/// Append one copy button to each code block that lacks one; returns how many were added
pub fn add_copy_buttons(doc: &Document, edits: &mut Edits) -> usize {
    let button = format!(r#"<button class="{}">{}</button>"#, BUTTON_CLASS, COPY_LABEL);
    let mut added = 0;
    for pre in code_blocks(doc) {
        let has_button = doc
            .descendants(pre)
            .any(|d| doc.element(d).tag == "button" && doc.element(d).has_class(BUTTON_CLASS));
        if has_button {
            continue;
        }
        edits.append_child(doc, pre, &button);
        added += 1;
    }
    added
}

/// Label state of one copy button
#[derive(Debug, Clone, Copy, Default)]
pub struct CopyFeedback {
    clicked_at: Option<Instant>,
}

impl CopyFeedback {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn click(&mut self, now: Instant) {
        self.clicked_at = Some(now);
    }

    pub fn label(&self, now: Instant) -> &'static str {
        match self.clicked_at {
            Some(at) if now.saturating_duration_since(at) < FEEDBACK_DURATION => COPIED_LABEL,
            _ => COPY_LABEL,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = "<body><pre><code>let x = 1;\n  x &lt; 2</code></pre><pre>plain</pre><p><code>inline</code></p></body>";

    #[test]
    fn test_code_blocks() {
        let doc = Document::parse(PAGE).unwrap();
        assert_eq!(code_blocks(&doc).len(), 1);
    }

    #[test]
    fn test_add_copy_buttons_once() {
        let doc = Document::parse(PAGE).unwrap();
        let mut edits = Edits::new();
        assert_eq!(add_copy_buttons(&doc, &mut edits), 1);
        let out = edits.apply(PAGE);
        assert!(out.contains(r#"</code><button class="copy-button">Copy</button></pre>"#));
        assert_eq!(out.matches("copy-button").count(), 1);

        let doc = Document::parse(&out).unwrap();
        let mut edits = Edits::new();
        assert_eq!(add_copy_buttons(&doc, &mut edits), 0);
    }

    #[test]
    fn test_copy_text() {
        let doc = Document::parse(PAGE).unwrap();
        let pre = code_blocks(&doc)[0];
        assert_eq!(copy_text(&doc, pre), "let x = 1;\n  x < 2");
    }

    #[test]
    fn test_feedback_reverts_after_two_seconds() {
        let start = Instant::now();
        let mut feedback = CopyFeedback::new();
        assert_eq!(feedback.label(start), "Copy");
        feedback.click(start);
        assert_eq!(feedback.label(start + Duration::from_millis(1999)), "Copied!");
        assert_eq!(feedback.label(start + Duration::from_secs(2)), "Copy");
    }
}
