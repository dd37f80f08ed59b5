//! Per-level stat cards

use crate::{html_escape, CountTable, Level};

#[derive(Debug, Clone, PartialEq)]
pub struct StatCard {
    pub level: Level,
    pub count: u64,
    /// Share of the sum over every `Levels` entry, 0-100
    pub percentage: f64,
}

impl StatCard {
    /// Percentage with one decimal, e.g. "43.5"
    pub fn percentage_label(&self) -> String {
        format!("{:.1}", self.percentage)
    }
}

/// Cards for the canonical levels present in `levels`, in canonical order.
///
/// Non-canonical keys are not shown but still count towards the total.
pub fn stat_cards(levels: &CountTable) -> Vec<StatCard> {
    let total = levels.total();
    Level::ALL
        .into_iter()
        .filter_map(|level| {
            let count = levels.level(level)?;
            let percentage = if total == 0 {
                0.0
            } else {
                count as f64 * 100.0 / total as f64
            };
            Some(StatCard {
                level,
                count,
                percentage,
            })
        })
        .collect()
}

pub fn render_stat_cards(cards: &[StatCard]) -> String {
    let mut html = String::new();
    for card in cards {
        html.push_str(&format!(
            r#"<div class="stat-card"><div class="stat-value level-{code_lower}">{count}</div><div class="stat-label">Level {code} ({pct}%)</div></div>"#,
            code_lower = card.level.as_str().to_ascii_lowercase(),
            count = card.count,
            code = html_escape(card.level.as_str()),
            pct = card.percentage_label(),
        ));
        html.push('\n');
    }
    html
}
