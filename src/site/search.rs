//! In-page search over headings and paragraphs
//!
//! The index is built once per page from the content region. Queries are
//! matched case-insensitively as substrings; hits carry a highlighted
//! snippet ready to drop into the results panel.

use super::document::Document;
use super::{SiteError, CONTENT_CLASS};
use crate::config::SearchConfig;
use crate::html_escape;
use regex::RegexBuilder;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const NO_RESULTS: &str = "No results found";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    H1,
    H2,
    H3,
    P,
}

impl EntryKind {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "h1" => Some(EntryKind::H1),
            "h2" => Some(EntryKind::H2),
            "h3" => Some(EntryKind::H3),
            "p" => Some(EntryKind::P),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EntryKind::H1 => "h1",
            EntryKind::H2 => "h2",
            EntryKind::H3 => "h3",
            EntryKind::P => "p",
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchIndexEntry {
    pub text: String,
    pub kind: EntryKind,
    /// Id of the indexed element, when it has one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchor: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SearchIndex {
    entries: Vec<SearchIndexEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub kind: EntryKind,
    pub anchor: Option<String>,
    /// Escaped snippet with `<mark>` around each occurrence of the query
    pub snippet: String,
}

impl SearchHit {
    pub fn to_html(&self) -> String {
        let body = format!("<strong>{}</strong>: {}", self.kind, self.snippet);
        match &self.anchor {
            Some(id) => format!(
                "<div class=\"search-result-item\"><a href=\"#{}\">{}</a></div>",
                html_escape(id),
                body
            ),
            None => format!("<div class=\"search-result-item\">{}</div>", body),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// Query too short: the panel is emptied and hidden
    Hidden,
    /// Panel shown with a single "No results found" item
    NoResults,
    Hits(Vec<SearchHit>),
}

impl SearchOutcome {
    pub fn is_visible(&self) -> bool {
        !matches!(self, SearchOutcome::Hidden)
    }

    /// Markup for the results panel
    pub fn to_html(&self) -> String {
        match self {
            SearchOutcome::Hidden => String::new(),
            SearchOutcome::NoResults => {
                format!("<div class=\"search-result-item\">{}</div>", NO_RESULTS)
            }
            SearchOutcome::Hits(hits) => hits.iter().map(SearchHit::to_html).collect(),
        }
    }
}

impl SearchIndex {
    /// Index h1/h2/h3/p elements inside the content region, in document order
    pub fn build(doc: &Document) -> Self {
        let entries = doc
            .elements()
            .iter()
            .enumerate()
            .filter(|(i, _)| doc.is_inside_class(*i, CONTENT_CLASS))
            .filter_map(|(i, e)| {
                let kind = EntryKind::from_tag(&e.tag)?;
                Some(SearchIndexEntry {
                    text: doc.text(i),
                    kind,
                    anchor: e.id().map(str::to_string),
                })
            })
            .collect();
        Self { entries }
    }

    pub fn from_entries(entries: Vec<SearchIndexEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[SearchIndexEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_json(&self) -> Result<String, SiteError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, SiteError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn query(&self, query: &str, config: SearchConfig) -> SearchOutcome {
        let query = query.trim().to_lowercase();
        if query.chars().count() < config.min_query_length {
            return SearchOutcome::Hidden;
        }

        let hits: Vec<SearchHit> = self
            .entries
            .iter()
            .filter(|e| e.text.to_lowercase().contains(&query))
            .take(config.max_results)
            .map(|e| SearchHit {
                kind: e.kind,
                anchor: e.anchor.clone(),
                snippet: highlight(&e.text, &query, config.snippet_length),
            })
            .collect();

        if hits.is_empty() {
            SearchOutcome::NoResults
        } else {
            SearchOutcome::Hits(hits)
        }
    }
}

/// First `limit` characters of `text`, escaped, with every case-insensitive
/// occurrence of `query` wrapped in `<mark>`, followed by "...".
pub fn highlight(text: &str, query: &str, limit: usize) -> String {
    let snippet: String = text.chars().take(limit).collect();
    let pattern = RegexBuilder::new(&regex::escape(query))
        .case_insensitive(true)
        .build();

    let mut out = String::with_capacity(snippet.len() + 16);
    match pattern {
        Ok(re) if !query.is_empty() => {
            let mut last = 0;
            for m in re.find_iter(&snippet) {
                out.push_str(&html_escape(&snippet[last..m.start()]));
                out.push_str("<mark>");
                out.push_str(&html_escape(m.as_str()));
                out.push_str("</mark>");
                last = m.end();
            }
            out.push_str(&html_escape(&snippet[last..]));
        }
        _ => out.push_str(&html_escape(&snippet)),
    }
    out.push_str("...");
    out
}

/// What a click landed on, relative to the search widgets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickTarget {
    Input,
    Results,
    Outside,
}

/// The results panel: its contents and whether it is shown
#[derive(Debug, Clone, Default)]
pub struct SearchPanel {
    visible: bool,
    html: String,
}

impl SearchPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-run the search for the current input value
    pub fn input(&mut self, index: &SearchIndex, query: &str, config: SearchConfig) -> SearchOutcome {
        let outcome = index.query(query, config);
        self.visible = outcome.is_visible();
        self.html = outcome.to_html();
        outcome
    }

    /// A click outside both the input and the panel hides the panel; its contents stay
    pub fn click(&mut self, target: ClickTarget) {
        if target == ClickTarget::Outside {
            self.visible = false;
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn html(&self) -> &str {
        &self.html
    }
}
