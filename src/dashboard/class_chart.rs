//! Horizontal bar list of the most frequent code-element classes

use crate::{html_escape, CountTable};

pub const TOP_CLASSES: usize = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct ClassBar {
    pub name: String,
    pub count: u64,
    /// Fill width relative to the largest bar, 0-100
    pub fill_percent: f64,
}

/// Highest counts first; equal counts keep their input order
pub fn top_classes(classes: &CountTable, limit: usize) -> Vec<ClassBar> {
    let mut entries: Vec<(&str, u64)> = classes.iter().collect();
    // sort_by is stable
    entries.sort_by(|a, b| b.1.cmp(&a.1));
    entries.truncate(limit);

    let max = entries.first().map(|(_, c)| *c).unwrap_or(0);
    entries
        .into_iter()
        .map(|(name, count)| ClassBar {
            name: name.to_string(),
            count,
            fill_percent: if max == 0 {
                0.0
            } else {
                count as f64 * 100.0 / max as f64
            },
        })
        .collect()
}

/// Chart markup, or `None` when there is nothing to draw
pub fn render_class_chart(bars: &[ClassBar]) -> Option<String> {
    if bars.is_empty() {
        return None;
    }
    let mut html = String::from(
        "<h3>Top 10 Code Elements</h3>\n<div class=\"horizontal-bar-chart\">\n",
    );
    for bar in bars {
        html.push_str(&format!(
            r#"  <div class="bar-item"><div class="bar-label">{name}</div><div class="bar-container"><div class="bar-fill" style="width: {pct}%"></div><div class="bar-count">{count}</div></div></div>"#,
            name = html_escape(&bar.name),
            pct = format_percent(bar.fill_percent),
            count = bar.count,
        ));
        html.push('\n');
    }
    html.push_str("</div>\n");
    Some(html)
}

/// Shortest form: "100", "50", "33.333"
fn format_percent(value: f64) -> String {
    let s = format!("{:.3}", value);
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}
