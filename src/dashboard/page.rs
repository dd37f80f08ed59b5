//! Self-contained dashboard page
//!
//! Only bound targets get a container; a bound target whose section did not
//! render stays empty.

use super::{Capabilities, DetailFilter, RenderedDashboard, Target};
use crate::notify::Notification;
use crate::site::theme::Theme;
use crate::{html_escape, Level};
use chrono::{DateTime, Local};

/// Everything around the rendered sections
#[derive(Debug, Clone)]
pub struct PageContext {
    pub title: String,
    pub theme: Theme,
    pub capabilities: Capabilities,
    pub filter: DetailFilter,
    /// Link target of the export button, when a CSV was written
    pub export_href: Option<String>,
    /// Toasts raised while producing the page
    pub notifications: Vec<Notification>,
    pub generated_at: DateTime<Local>,
}

impl PageContext {
    pub fn new(capabilities: Capabilities, theme: Theme) -> Self {
        Self {
            title: "PyCEFRL Dashboard".to_string(),
            theme,
            capabilities,
            filter: DetailFilter::default(),
            export_href: None,
            notifications: Vec::new(),
            generated_at: Local::now(),
        }
    }
}

pub fn render_page(rendered: &RenderedDashboard, ctx: &PageContext) -> String {
    let caps = &ctx.capabilities;
    let mut html = String::with_capacity(16_384);

    html.push_str(&format!(
        "<!DOCTYPE html>\n<html lang=\"en\" data-theme=\"{}\">\n<head>\n<meta charset=\"UTF-8\">\n<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n<title>{}</title>\n",
        ctx.theme.as_str(),
        html_escape(&ctx.title)
    ));
    html.push_str(STYLE);
    html.push_str("</head>\n<body>\n<header class=\"header\">\n");
    html.push_str(&format!("<h1>{}</h1>\n", html_escape(&ctx.title)));
    if caps.has(Target::ThemeToggle) {
        html.push_str(&format!(
            "<button id=\"theme-toggle\" class=\"theme-toggle\" aria-label=\"{}\">{}</button>\n",
            ctx.theme.toggle_label(),
            ctx.theme.toggle_icon()
        ));
    }
    html.push_str("</header>\n<main class=\"main-content\">\n");

    let controls = render_controls(ctx);
    if !controls.is_empty() {
        html.push_str("<section class=\"controls\">\n");
        html.push_str(&controls);
        html.push_str("</section>\n");
    }

    if caps.has(Target::StatsGrid) {
        push_container(&mut html, "div", Target::StatsGrid, "stats-grid", rendered.stats.as_deref());
    }
    if caps.has(Target::LevelChart) {
        html.push_str("<section class=\"chart-container\">\n<h3>Level Distribution</h3>\n");
        if let Some(svg) = &rendered.level_chart {
            html.push_str(svg);
        }
        html.push_str("</section>\n");
    }
    if caps.has(Target::ClassChart) {
        let body = match (&rendered.class_chart, &rendered.categories) {
            (None, None) => None,
            (chart, cats) => Some(format!(
                "{}{}",
                chart.as_deref().unwrap_or(""),
                cats.as_deref().unwrap_or("")
            )),
        };
        push_container(&mut html, "section", Target::ClassChart, "chart-container", body.as_deref());
    }
    if caps.has(Target::DetailedAnalysis) {
        push_container(
            &mut html,
            "section",
            Target::DetailedAnalysis,
            "detail-container",
            rendered.detail.as_deref(),
        );
    }
    html.push_str("</main>\n");

    if !ctx.notifications.is_empty() {
        html.push_str("<div class=\"notifications\">\n");
        for n in &ctx.notifications {
            html.push_str(&n.to_html());
            html.push('\n');
        }
        html.push_str("</div>\n");
    }

    html.push_str(&format!(
        "<footer class=\"footer\">Generated {}</footer>\n</body>\n</html>\n",
        ctx.generated_at.format("%Y-%m-%d %H:%M")
    ));
    html
}

fn push_container(html: &mut String, tag: &str, target: Target, class: &str, body: Option<&str>) {
    html.push_str(&format!("<{} id=\"{}\" class=\"{}\">\n", tag, target.id(), class));
    if let Some(body) = body {
        html.push_str(body);
    }
    html.push_str(&format!("</{}>\n", tag));
}

fn render_controls(ctx: &PageContext) -> String {
    let caps = &ctx.capabilities;
    let mut html = String::new();

    if caps.has(Target::FileUpload) {
        html.push_str(
            "<label class=\"upload\">Load JSON <input type=\"file\" id=\"file-upload\" accept=\".json,application/json\"></label>\n",
        );
    }
    if caps.has(Target::FilterInput) {
        html.push_str(&format!(
            "<input type=\"search\" id=\"filter-input\" placeholder=\"Filter files...\" value=\"{}\">\n",
            html_escape(ctx.filter.text.as_deref().unwrap_or(""))
        ));
    }
    if caps.has(Target::LevelFilter) {
        html.push_str("<select id=\"level-filter\">\n<option value=\"\">All levels</option>\n");
        for level in Level::ALL {
            let selected = if ctx.filter.level == Some(level) {
                " selected"
            } else {
                ""
            };
            html.push_str(&format!(
                "<option value=\"{code}\"{selected}>Level {code}</option>\n",
                code = level
            ));
        }
        html.push_str("</select>\n");
    }
    if caps.has(Target::ExportCsv) {
        match &ctx.export_href {
            Some(href) => html.push_str(&format!(
                "<a id=\"export-csv\" class=\"button\" href=\"{}\" download>Export CSV</a>\n",
                html_escape(href)
            )),
            None => html.push_str(
                "<a id=\"export-csv\" class=\"button disabled\" aria-disabled=\"true\">Export CSV</a>\n",
            ),
        }
    }
    html
}

const STYLE: &str = r##"<style>
:root{--bg:#ffffff;--surface:#f8fafc;--border:#e2e8f0;--text:#1e293b;--muted:#64748b;--accent:#3b82f6;--radius:8px}
[data-theme="dark"]{--bg:#0f172a;--surface:#1e293b;--border:#334155;--text:#e2e8f0;--muted:#94a3b8}
*{box-sizing:border-box;margin:0;padding:0}
body{font-family:-apple-system,BlinkMacSystemFont,'Segoe UI',Roboto,sans-serif;background:var(--bg);color:var(--text);line-height:1.5}
.header{display:flex;align-items:center;justify-content:space-between;padding:1rem 1.5rem;border-bottom:1px solid var(--border)}
.header h1{font-size:1.25rem}
.theme-toggle{background:none;border:1px solid var(--border);border-radius:var(--radius);padding:.25rem .5rem;cursor:pointer;font-size:1rem}
.main-content{max-width:1100px;margin:0 auto;padding:1.5rem;display:flex;flex-direction:column;gap:1.5rem}
.controls{display:flex;gap:.75rem;flex-wrap:wrap;align-items:center}
.controls input,.controls select{background:var(--surface);border:1px solid var(--border);border-radius:var(--radius);padding:.4rem .6rem;color:var(--text)}
.button{display:inline-block;padding:.4rem .8rem;border-radius:var(--radius);background:var(--accent);color:#fff;text-decoration:none}
.button.disabled{opacity:.5;pointer-events:none}

/* ── Stat cards ── */
.stats-grid{display:grid;grid-template-columns:repeat(auto-fit,minmax(140px,1fr));gap:1rem}
.stat-card{background:var(--surface);border:1px solid var(--border);border-radius:var(--radius);padding:1rem;text-align:center}
.stat-value{font-size:1.75rem;font-weight:700}
.stat-label{font-size:.8rem;color:var(--muted)}
.level-a1{color:#3b82f6}.level-a2{color:#10b981}.level-b1{color:#f59e0b}.level-b2{color:#ef4444}.level-c1{color:#8b5cf6}.level-c2{color:#ec4899}

/* ── Charts ── */
.chart-container{background:var(--surface);border:1px solid var(--border);border-radius:var(--radius);padding:1rem}
.chart-container h3,.detail-container h3{font-size:.9rem;margin-bottom:.75rem}
.horizontal-bar-chart{display:flex;flex-direction:column;gap:.4rem}
.bar-item{display:grid;grid-template-columns:200px 1fr;gap:.5rem;align-items:center;font-size:.8rem}
.bar-label{overflow:hidden;text-overflow:ellipsis;white-space:nowrap}
.bar-container{position:relative;height:20px;background:var(--border);border-radius:4px}
.bar-fill{height:100%;background:var(--accent);border-radius:4px}
.bar-count{position:absolute;right:.4rem;top:0;font-size:.75rem;line-height:20px}
.category-table{margin-top:1rem;font-size:.8rem;border-collapse:collapse}
.category-table td{padding:.2rem .75rem .2rem 0}

/* ── Detail table ── */
.table-container{overflow-x:auto}
table{width:100%;border-collapse:collapse;font-size:.8rem}
th,td{text-align:left;padding:.4rem .6rem;border-bottom:1px solid var(--border)}
th{color:var(--muted);font-weight:600}

/* ── Notifications ── */
.notifications{position:fixed;top:1rem;right:1rem;display:flex;flex-direction:column;gap:.5rem}
.notification{color:#fff;padding:.75rem 1rem;border-radius:var(--radius);box-shadow:0 4px 12px rgba(0,0,0,.15)}
@keyframes slideIn{from{transform:translateX(120%)}to{transform:translateX(0)}}
@keyframes slideOut{from{transform:translateX(0);opacity:1}to{transform:translateX(120%);opacity:0}}
.footer{text-align:center;color:var(--muted);font-size:.75rem;padding:1.5rem}
</style>
"##;
