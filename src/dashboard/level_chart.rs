//! Level distribution bar chart, laid out in Rust and drawn as SVG

use crate::config::ChartConfig;
use crate::{html_escape, CountTable, Level};
use std::fmt::Write as _;

/// Space left of the y axis and below the x axis
pub const PADDING: f64 = 40.0;
/// Horizontal gap on each side of a bar inside its slot
const BAR_INSET: f64 = 5.0;

const COLORS: [&str; 6] = [
    "#3b82f6", "#10b981", "#f59e0b", "#ef4444", "#8b5cf6", "#ec4899",
];

#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub level: Level,
    pub value: u64,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub color: &'static str,
}

impl Bar {
    fn center(&self) -> f64 {
        self.x - BAR_INSET + (self.width + 2.0 * BAR_INSET) / 2.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LevelChart {
    pub width: f64,
    pub height: f64,
    pub bars: Vec<Bar>,
}

impl LevelChart {
    /// Lay out one bar per canonical level; missing levels are drawn as 0.
    ///
    /// When every value is 0 all bars have zero height.
    pub fn layout(levels: &CountTable, config: ChartConfig) -> Self {
        let width = config.width as f64;
        let height = config.height as f64;
        let chart_width = (width - 2.0 * PADDING).max(0.0);
        let chart_height = (height - 2.0 * PADDING).max(0.0);
        let slot = chart_width / Level::ALL.len() as f64;

        let values: Vec<u64> = Level::ALL
            .iter()
            .map(|l| levels.level(*l).unwrap_or(0))
            .collect();
        let max = values.iter().copied().max().unwrap_or(0);

        let bars = Level::ALL
            .into_iter()
            .zip(values)
            .map(|(level, value)| {
                let bar_height = if max == 0 {
                    0.0
                } else {
                    value as f64 / max as f64 * chart_height
                };
                let slot_x = PADDING + level.index() as f64 * slot;
                Bar {
                    level,
                    value,
                    x: slot_x + BAR_INSET,
                    y: height - PADDING - bar_height,
                    width: (slot - 2.0 * BAR_INSET).max(0.0),
                    height: bar_height,
                    color: COLORS[level.index()],
                }
            })
            .collect();

        Self {
            width,
            height,
            bars,
        }
    }

    pub fn to_svg(&self, id: &str) -> String {
        let mut svg = String::new();
        let _ = writeln!(
            svg,
            r#"<svg id="{id}" xmlns="http://www.w3.org/2000/svg" width="{w:.0}" height="{h:.0}" viewBox="0 0 {w:.0} {h:.0}" role="img" aria-label="Level distribution">"#,
            id = html_escape(id),
            w = self.width,
            h = self.height,
        );
        for bar in &self.bars {
            let cx = bar.center();
            let _ = writeln!(
                svg,
                r#"  <rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" fill="{}"/>"#,
                bar.x, bar.y, bar.width, bar.height, bar.color
            );
            let _ = writeln!(
                svg,
                r##"  <text x="{:.1}" y="{:.1}" fill="#666" font-family="Arial" font-size="12" text-anchor="middle">{}</text>"##,
                cx,
                bar.y - 5.0,
                bar.value
            );
            let _ = writeln!(
                svg,
                r##"  <text x="{:.1}" y="{:.1}" fill="#666" font-family="Arial" font-size="12" text-anchor="middle">{}</text>"##,
                cx,
                self.height - PADDING + 20.0,
                bar.level
            );
        }
        let _ = writeln!(
            svg,
            r##"  <path d="M {p:.0} {p:.0} L {p:.0} {bottom:.0} L {right:.0} {bottom:.0}" fill="none" stroke="#ddd"/>"##,
            p = PADDING,
            bottom = self.height - PADDING,
            right = self.width - PADDING,
        );
        svg.push_str("</svg>\n");
        svg
    }
}
