//! HTML documents parsed with tree-sitter, with byte-range edits

use super::SiteError;
use regex::{Captures, Regex};
use std::ops::Range;
use std::sync::OnceLock;
use tree_sitter::{Language, Node, Parser, Tree};

/// Parser for HTML pages using tree-sitter
pub struct HtmlParser {
    parser: Parser,
}

impl HtmlParser {
    pub fn new() -> Result<Self, SiteError> {
        let mut parser = Parser::new();
        parser
            .set_language(&Self::language())
            .map_err(|e| SiteError::Language(e.to_string()))?;
        Ok(Self { parser })
    }

    /// Parse source into a syntax tree
    pub fn parse(&mut self, source: &str) -> Result<Tree, SiteError> {
        self.parser.parse(source, None).ok_or(SiteError::Parse)
    }

    pub fn language() -> Language {
        tree_sitter_html::LANGUAGE.into()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    /// Decoded value; `None` for a bare attribute like `disabled`
    pub value: Option<String>,
    pub span: Range<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Lower-cased tag name
    pub tag: String,
    pub attrs: Vec<Attribute>,
    /// The start tag (or self-closing tag)
    pub start_tag: Range<usize>,
    /// Between the start tag and the end tag
    pub content: Range<usize>,
    /// Whole element including its end tag
    pub span: Range<usize>,
    pub parent: Option<usize>,
}

impl Element {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_deref().unwrap_or(""))
    }

    pub fn id(&self) -> Option<&str> {
        self.attr("id").filter(|id| !id.is_empty())
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attr("class").unwrap_or("").split_whitespace()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|c| c == class)
    }
}

/// A parsed page. Elements are stored in document order.
#[derive(Debug, Clone)]
pub struct Document {
    source: String,
    elements: Vec<Element>,
    /// Text and entity runs outside script/style, in document order
    text_runs: Vec<Range<usize>>,
}

impl Document {
    pub fn parse(source: &str) -> Result<Self, SiteError> {
        let mut parser = HtmlParser::new()?;
        Self::parse_with(&mut parser, source)
    }

    pub fn parse_with(parser: &mut HtmlParser, source: &str) -> Result<Self, SiteError> {
        let tree = parser.parse(source)?;
        let mut doc = Self {
            source: source.to_string(),
            elements: Vec::new(),
            text_runs: Vec::new(),
        };
        doc.walk(tree.root_node(), None);
        Ok(doc)
    }

    fn walk(&mut self, node: Node, parent: Option<usize>) {
        match node.kind() {
            "element" | "script_element" | "style_element" => self.visit_element(node, parent),
            "text" | "entity" => self.text_runs.push(node.byte_range()),
            _ => {
                let mut cursor = node.walk();
                for child in node.named_children(&mut cursor) {
                    self.walk(child, parent);
                }
            }
        }
    }

    fn visit_element(&mut self, node: Node, parent: Option<usize>) {
        let mut cursor = node.walk();
        let children: Vec<Node> = node.named_children(&mut cursor).collect();
        let start = children
            .iter()
            .find(|c| matches!(c.kind(), "start_tag" | "self_closing_tag"));
        let Some(start) = start else {
            for child in children {
                self.walk(child, parent);
            }
            return;
        };
        let end = children.iter().find(|c| c.kind() == "end_tag");

        let mut tag = String::new();
        let mut attrs = Vec::new();
        let mut tag_cursor = start.walk();
        for part in start.named_children(&mut tag_cursor) {
            match part.kind() {
                "tag_name" => tag = self.slice(part.byte_range()).to_ascii_lowercase(),
                "attribute" => attrs.push(self.read_attribute(part)),
                _ => {}
            }
        }

        let content_end = end.map(|e| e.start_byte()).unwrap_or(node.end_byte());
        let idx = self.elements.len();
        self.elements.push(Element {
            tag,
            attrs,
            start_tag: start.byte_range(),
            content: start.end_byte()..content_end.max(start.end_byte()),
            span: node.byte_range(),
            parent,
        });

        let raw = node.kind() != "element";
        for child in children {
            if matches!(child.kind(), "start_tag" | "self_closing_tag" | "end_tag") {
                continue;
            }
            if raw {
                continue;
            }
            self.walk(child, Some(idx));
        }
    }

    fn read_attribute(&self, node: Node) -> Attribute {
        let mut name = String::new();
        let mut value = None;
        let mut cursor = node.walk();
        for part in node.named_children(&mut cursor) {
            match part.kind() {
                "attribute_name" => name = self.slice(part.byte_range()).to_ascii_lowercase(),
                "attribute_value" => value = Some(decode_entities(self.slice(part.byte_range()))),
                "quoted_attribute_value" => {
                    let mut inner = part.walk();
                    let text = part
                        .named_children(&mut inner)
                        .find(|n| n.kind() == "attribute_value")
                        .map(|n| decode_entities(self.slice(n.byte_range())))
                        .unwrap_or_default();
                    value = Some(text);
                }
                _ => {}
            }
        }
        Attribute {
            name,
            value,
            span: node.byte_range(),
        }
    }

    fn slice(&self, range: Range<usize>) -> &str {
        self.source.get(range).unwrap_or("")
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn element(&self, idx: usize) -> &Element {
        &self.elements[idx]
    }

    pub fn element_by_id(&self, id: &str) -> Option<usize> {
        self.elements.iter().position(|e| e.id() == Some(id))
    }

    pub fn by_tag<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = usize> + 'a {
        self.elements
            .iter()
            .enumerate()
            .filter(move |(_, e)| e.tag == tag)
            .map(|(i, _)| i)
    }

    pub fn by_class<'a>(&'a self, class: &'a str) -> impl Iterator<Item = usize> + 'a {
        self.elements
            .iter()
            .enumerate()
            .filter(move |(_, e)| e.has_class(class))
            .map(|(i, _)| i)
    }

    /// Whether some proper ancestor of `idx` satisfies `pred`
    pub fn has_ancestor(&self, idx: usize, pred: impl Fn(&Element) -> bool) -> bool {
        let mut current = self.elements[idx].parent;
        while let Some(p) = current {
            if pred(&self.elements[p]) {
                return true;
            }
            current = self.elements[p].parent;
        }
        false
    }

    /// Whether `idx` sits inside an element carrying `class`
    pub fn is_inside_class(&self, idx: usize, class: &str) -> bool {
        self.has_ancestor(idx, |e| e.has_class(class))
    }

    /// Elements nested anywhere inside `idx`, in document order
    pub fn descendants(&self, idx: usize) -> impl Iterator<Item = usize> + '_ {
        let span = self.elements[idx].span.clone();
        (idx + 1..self.elements.len()).take_while(move |&i| self.elements[i].span.start < span.end)
    }

    /// Text content with entities decoded and whitespace collapsed
    pub fn text(&self, idx: usize) -> String {
        let span = &self.elements[idx].span;
        let first = self.text_runs.partition_point(|r| r.start < span.start);
        let bytes = self.source.as_bytes();

        let mut raw = String::new();
        let mut prev_end: Option<usize> = None;
        for run in self.text_runs[first..]
            .iter()
            .take_while(|r| r.end <= span.end)
        {
            if let Some(end) = prev_end {
                if end < run.start && gap_has_space(&bytes[end..run.start]) {
                    raw.push(' ');
                }
            }
            raw.push_str(&decode_entities(self.slice(run.clone())));
            prev_end = Some(run.end);
        }
        raw.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}

impl Document {
    /// Text of `idx` as written, tags stripped and entities decoded, whitespace kept
    pub fn raw_text(&self, idx: usize) -> String {
        static TAG: OnceLock<Regex> = OnceLock::new();
        let tag = TAG.get_or_init(|| Regex::new(r"<[^>]*>").unwrap());
        let content = self.slice(self.elements[idx].content.clone());
        decode_entities(&tag.replace_all(content, ""))
    }
}

/// Whitespace outside of markup between two text runs
fn gap_has_space(gap: &[u8]) -> bool {
    let mut in_tag = false;
    for &b in gap {
        match b {
            b'<' => in_tag = true,
            b'>' => in_tag = false,
            _ if !in_tag && b.is_ascii_whitespace() => return true,
            _ => {}
        }
    }
    false
}

/// Decode the common named entities and numeric character references
pub fn decode_entities(text: &str) -> String {
    static ENTITY: OnceLock<Regex> = OnceLock::new();
    if !text.contains('&') {
        return text.to_string();
    }
    let re = ENTITY.get_or_init(|| {
        Regex::new(r"&(#[xX][0-9a-fA-F]{1,6}|#[0-9]{1,7}|[A-Za-z]{2,8});").unwrap()
    });
    re.replace_all(text, |caps: &Captures| {
        let body = &caps[1];
        let decoded = if let Some(hex) = body.strip_prefix("#x").or_else(|| body.strip_prefix("#X")) {
            u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
        } else if let Some(dec) = body.strip_prefix('#') {
            dec.parse::<u32>().ok().and_then(char::from_u32)
        } else {
            match body {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "nbsp" => Some('\u{a0}'),
                "copy" => Some('©'),
                "mdash" => Some('—'),
                "ndash" => Some('–'),
                "hellip" => Some('…'),
                _ => None,
            }
        };
        decoded.map_or_else(|| caps[0].to_string(), |c| c.to_string())
    })
    .into_owned()
}

#[derive(Debug, Clone)]
struct Splice {
    range: Range<usize>,
    text: String,
    seq: usize,
}

/// Pending edits against a document's source.
///
/// Splices are applied by start offset; inserts at the same offset keep the
/// order they were recorded in. A replacement overlapping an earlier one is
/// dropped.
#[derive(Debug, Clone, Default)]
pub struct Edits {
    splices: Vec<Splice>,
}

impl Edits {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.splices.is_empty()
    }

    pub fn len(&self) -> usize {
        self.splices.len()
    }

    pub fn insert(&mut self, at: usize, text: impl Into<String>) {
        self.replace(at..at, text);
    }

    pub fn replace(&mut self, range: Range<usize>, text: impl Into<String>) {
        let seq = self.splices.len();
        self.splices.push(Splice {
            range,
            text: text.into(),
            seq,
        });
    }

    pub fn apply(mut self, source: &str) -> String {
        self.splices
            .sort_by(|a, b| a.range.start.cmp(&b.range.start).then(a.seq.cmp(&b.seq)));
        let mut out = String::with_capacity(source.len() + 256);
        let mut cursor = 0;
        for splice in self.splices {
            if splice.range.start < cursor
                || splice.range.end > source.len()
                || !source.is_char_boundary(splice.range.start)
                || !source.is_char_boundary(splice.range.end)
            {
                continue;
            }
            out.push_str(&source[cursor..splice.range.start]);
            out.push_str(&splice.text);
            cursor = splice.range.end;
        }
        out.push_str(&source[cursor..]);
        out
    }

    /// Set an attribute, replacing an existing one of the same name
    pub fn set_attr(&mut self, doc: &Document, idx: usize, name: &str, value: &str) {
        let el = doc.element(idx);
        let rendered = format!("{}=\"{}\"", name, crate::html_escape(value));
        match el.attrs.iter().find(|a| a.name == name) {
            Some(attr) => self.replace(attr.span.clone(), rendered),
            None => {
                let tag = &doc.source()[el.start_tag.clone()];
                // error recovery can leave a start tag without its closing `>`
                let close = if tag.ends_with("/>") {
                    2
                } else if tag.ends_with('>') {
                    1
                } else {
                    0
                };
                self.insert(el.start_tag.end - close, format!(" {}", rendered));
            }
        }
    }

    pub fn add_class(&mut self, doc: &Document, idx: usize, class: &str) {
        let el = doc.element(idx);
        if el.has_class(class) {
            return;
        }
        let mut classes: Vec<&str> = el.classes().collect();
        classes.push(class);
        self.set_attr(doc, idx, "class", &classes.join(" "));
    }

    pub fn remove_class(&mut self, doc: &Document, idx: usize, class: &str) {
        let el = doc.element(idx);
        if !el.has_class(class) {
            return;
        }
        let classes: Vec<&str> = el.classes().filter(|c| *c != class).collect();
        self.set_attr(doc, idx, "class", &classes.join(" "));
    }

    /// Returns whether the class is present afterwards
    pub fn toggle_class(&mut self, doc: &Document, idx: usize, class: &str) -> bool {
        if doc.element(idx).has_class(class) {
            self.remove_class(doc, idx, class);
            false
        } else {
            self.add_class(doc, idx, class);
            true
        }
    }

    /// Insert markup as the last child of `idx`
    pub fn append_child(&mut self, doc: &Document, idx: usize, html: &str) {
        self.insert(doc.element(idx).content.end, html.to_string());
    }

    /// Replace everything between the start and end tag of `idx`
    pub fn set_inner_html(&mut self, doc: &Document, idx: usize, html: &str) {
        self.replace(doc.element(idx).content.clone(), html.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<body>
  <nav class="nav"><a href="/">Home</a> <a href="/guide/">Guide</a></nav>
  <main class="main-content">
    <h1 id="top">Intro &amp; setup</h1>
    <p>Some <em>emphasised</em> text
       over lines.</p>
    <img src="x.png" />
    <script>var x = "<p>not text</p>";</script>
  </main>
</body>
</html>
"#;

    #[test]
    fn test_parser_builds() {
        let mut parser = HtmlParser::new().unwrap();
        let tree = parser.parse("<p>hi</p>").unwrap();
        assert!(!tree.root_node().has_error());
    }

    #[test]
    fn test_elements_in_document_order() {
        let doc = Document::parse(PAGE).unwrap();
        let tags: Vec<&str> = doc.elements().iter().map(|e| e.tag.as_str()).collect();
        assert_eq!(
            tags,
            vec!["html", "body", "nav", "a", "a", "main", "h1", "p", "em", "img", "script"]
        );
    }

    #[test]
    fn test_attributes_and_lookup() {
        let doc = Document::parse(PAGE).unwrap();
        let h1 = doc.element_by_id("top").unwrap();
        assert_eq!(doc.element(h1).tag, "h1");
        assert!(doc.is_inside_class(h1, "main-content"));
        let links: Vec<usize> = doc.by_tag("a").collect();
        assert_eq!(doc.element(links[1]).attr("href"), Some("/guide/"));
        assert!(doc.is_inside_class(links[0], "nav"));
        assert!(!doc.is_inside_class(links[0], "main-content"));
    }

    #[test]
    fn test_text_content() {
        let doc = Document::parse(PAGE).unwrap();
        let h1 = doc.element_by_id("top").unwrap();
        assert_eq!(doc.text(h1), "Intro & setup");
        let p = doc.by_tag("p").next().unwrap();
        assert_eq!(doc.text(p), "Some emphasised text over lines.");
        let nav = doc.by_class("nav").next().unwrap();
        assert_eq!(doc.text(nav), "Home Guide");
        let main = doc.by_class("main-content").next().unwrap();
        assert!(!doc.text(main).contains("not text"));
    }

    #[test]
    fn test_text_without_gap_is_joined() {
        let doc = Document::parse("<p>re<b>use</b>d</p>").unwrap();
        assert_eq!(doc.text(0), "reused");
    }

    #[test]
    fn test_raw_text_keeps_whitespace() {
        let doc = Document::parse("<pre><code>fn main() {\n    x &lt; 1\n}</code></pre>").unwrap();
        assert_eq!(doc.raw_text(0), "fn main() {\n    x < 1\n}");
    }

    #[test]
    fn test_descendants() {
        let doc = Document::parse(PAGE).unwrap();
        let nav = doc.by_class("nav").next().unwrap();
        assert_eq!(doc.descendants(nav).count(), 2);
    }

    #[test]
    fn test_decode_entities() {
        assert_eq!(decode_entities("a &lt;b&gt; &#65;&#x42; &unknown;"), "a <b> AB &unknown;");
        assert_eq!(decode_entities("plain"), "plain");
    }

    #[test]
    fn test_edits_set_attr_and_classes() {
        let src = r#"<div class="a"><span>x</span><img src="i.png"/></div>"#;
        let doc = Document::parse(src).unwrap();
        let mut edits = Edits::new();
        edits.add_class(&doc, 0, "active");
        edits.set_attr(&doc, 1, "id", "s");
        edits.set_attr(&doc, 2, "alt", "pic");
        edits.append_child(&doc, 0, "<b>end</b>");
        let out = edits.apply(src);
        assert_eq!(
            out,
            r#"<div class="a active"><span id="s">x</span><img src="i.png" alt="pic"/><b>end</b></div>"#
        );
    }

    #[test]
    fn test_toggle_and_inner_html() {
        let src = r#"<nav class="nav active"><a>x</a></nav>"#;
        let doc = Document::parse(src).unwrap();
        let mut edits = Edits::new();
        assert!(!edits.toggle_class(&doc, 0, "active"));
        edits.set_inner_html(&doc, 0, "<ul></ul>");
        assert_eq!(edits.apply(src), r#"<nav class="nav"><ul></ul></nav>"#);
    }

    #[test]
    fn test_set_attr_on_truncated_tag() {
        let src = "<html é";
        let doc = Document::parse(src).unwrap();
        let mut edits = Edits::new();
        if let Some(html) = doc.by_tag("html").next() {
            edits.set_attr(&doc, html, "data-theme", "dark");
        }
        let out = edits.apply(src);
        assert!(out.starts_with("<html"));
        assert!(out.contains('é'));
    }

    #[test]
    fn test_apply_skips_splice_inside_char() {
        let mut edits = Edits::new();
        edits.insert(1, "x");
        edits.insert(2, "?");
        edits.insert(3, "!");
        assert_eq!(edits.apply("aé"), "axé!");
    }

    #[test]
    fn test_inserts_at_same_offset_keep_order() {
        let mut edits = Edits::new();
        edits.insert(1, "b");
        edits.insert(1, "c");
        edits.replace(0..1, "A");
        assert_eq!(edits.apply("ad"), "Abcd");
    }
}
