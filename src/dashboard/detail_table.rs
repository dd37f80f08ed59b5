//! File-level analysis table and its filter

use crate::{html_escape, DetailRow, Level};

/// Narrows the detail table; an empty filter keeps every row
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetailFilter {
    /// Case-insensitive substring of the repository or file name
    pub text: Option<String>,
    /// Keep only files with at least one element at this level
    pub level: Option<Level>,
}

impl DetailFilter {
    pub fn new(text: Option<String>, level: Option<Level>) -> Self {
        let text = text
            .map(|t| t.trim().to_lowercase())
            .filter(|t| !t.is_empty());
        Self { text, level }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_none() && self.level.is_none()
    }

    pub fn matches(&self, row: &DetailRow) -> bool {
        let text_ok = self.text.as_deref().map_or(true, |needle| {
            row.repository.to_lowercase().contains(needle)
                || row.file.to_lowercase().contains(needle)
        });
        let level_ok = self.level.map_or(true, |level| row.count(level) > 0);
        text_ok && level_ok
    }

    pub fn apply(&self, rows: Vec<DetailRow>) -> Vec<DetailRow> {
        if self.is_empty() {
            return rows;
        }
        rows.into_iter().filter(|r| self.matches(r)).collect()
    }
}

/// Table markup, or `None` when there are no rows
pub fn render_detail_table(rows: &[DetailRow]) -> Option<String> {
    if rows.is_empty() {
        return None;
    }

    let mut html = String::from(
        "<h3>File-Level Analysis</h3>\n<div class=\"table-container\">\n<table>\n<thead>\n<tr><th>Repository</th><th>File</th>",
    );
    for level in Level::ALL {
        html.push_str(&format!("<th>Level {}</th>", level));
    }
    html.push_str("</tr>\n</thead>\n<tbody>\n");

    for row in rows {
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td>",
            html_escape(&row.repository),
            html_escape(&row.file)
        ));
        for level in Level::ALL {
            html.push_str(&format!("<td>{}</td>", row.count(level)));
        }
        html.push_str("</tr>\n");
    }
    html.push_str("</tbody>\n</table>\n</div>\n");
    Some(html)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(repo: &str, file: &str, counts: [u64; 6]) -> DetailRow {
        DetailRow {
            repository: repo.to_string(),
            file: file.to_string(),
            counts,
        }
    }

    #[test]
    fn test_empty_rows_render_nothing() {
        assert!(render_detail_table(&[]).is_none());
    }

    #[test]
    fn test_render_columns() {
        let html = render_detail_table(&[row("repo", "a.py", [1, 0, 2, 0, 0, 3])]).unwrap();
        assert!(html.contains("<th>Level A1</th>"));
        assert!(html.contains("<th>Level C2</th>"));
        assert!(html.contains("<td>repo</td><td>a.py</td><td>1</td><td>0</td><td>2</td><td>0</td><td>0</td><td>3</td>"));
    }

    #[test]
    fn test_filter_by_text() {
        let rows = vec![
            row("Flask", "app.py", [1; 6]),
            row("django", "models.py", [1; 6]),
        ];
        let filtered = DetailFilter::new(Some(" FLASK ".into()), None).apply(rows.clone());
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].repository, "Flask");

        let by_file = DetailFilter::new(Some("models".into()), None).apply(rows);
        assert_eq!(by_file[0].file, "models.py");
    }

    #[test]
    fn test_filter_by_level() {
        let rows = vec![
            row("r", "basic.py", [4, 1, 0, 0, 0, 0]),
            row("r", "advanced.py", [1, 1, 1, 1, 2, 1]),
        ];
        let filtered = DetailFilter::new(None, Some(Level::C1)).apply(rows);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].file, "advanced.py");
    }

    #[test]
    fn test_blank_filter_is_empty() {
        let filter = DetailFilter::new(Some("   ".into()), None);
        assert!(filter.is_empty());
        let rows = vec![row("r", "f.py", [0; 6])];
        assert_eq!(filter.apply(rows.clone()), rows);
    }
}
