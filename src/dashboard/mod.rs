//! Dashboard rendering: stat cards, level chart, class list, detail table
//!
//! Every section is a pure function of a [`DashboardState`] snapshot. A
//! section whose input is missing, or whose target element is not bound,
//! renders as `None` and is left out of the page.

pub mod categories;
pub mod class_chart;
pub mod detail_table;
pub mod level_chart;
pub mod page;
pub mod stats;

pub use class_chart::{top_classes, ClassBar, TOP_CLASSES};
pub use detail_table::DetailFilter;
pub use level_chart::LevelChart;
pub use page::{render_page, PageContext};
pub use stats::{stat_cards, StatCard};

use crate::config::{ChartConfig, Config};
use crate::loader::apply_upload;
use crate::notify::Notifier;
use crate::state::DashboardState;
use std::collections::HashSet;
use std::fmt;

/// Page elements the dashboard and site helpers write into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    StatsGrid,
    LevelChart,
    ClassChart,
    DetailedAnalysis,
    FileUpload,
    FilterInput,
    LevelFilter,
    ExportCsv,
    ThemeToggle,
    MenuToggle,
    SearchInput,
    SearchResults,
    Toc,
}

impl Target {
    pub const ALL: [Target; 13] = [
        Target::StatsGrid,
        Target::LevelChart,
        Target::ClassChart,
        Target::DetailedAnalysis,
        Target::FileUpload,
        Target::FilterInput,
        Target::LevelFilter,
        Target::ExportCsv,
        Target::ThemeToggle,
        Target::MenuToggle,
        Target::SearchInput,
        Target::SearchResults,
        Target::Toc,
    ];

    /// Element id on the page
    pub fn id(self) -> &'static str {
        match self {
            Target::StatsGrid => "stats-grid",
            Target::LevelChart => "level-chart",
            Target::ClassChart => "class-chart",
            Target::DetailedAnalysis => "detailed-analysis",
            Target::FileUpload => "file-upload",
            Target::FilterInput => "filter-input",
            Target::LevelFilter => "level-filter",
            Target::ExportCsv => "export-csv",
            Target::ThemeToggle => "theme-toggle",
            Target::MenuToggle => "menu-toggle",
            Target::SearchInput => "search-input",
            Target::SearchResults => "search-results",
            Target::Toc => "toc",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.id() == id)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// The set of targets present on a page, resolved once up front
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capabilities {
    bound: HashSet<Target>,
}

impl Capabilities {
    /// Every target bound
    pub fn all() -> Self {
        Self {
            bound: Target::ALL.into_iter().collect(),
        }
    }

    /// Bind the targets whose ids occur in `ids`; unknown ids are ignored
    pub fn from_ids<'a>(ids: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            bound: ids.into_iter().filter_map(Target::from_id).collect(),
        }
    }

    /// All targets except the ones listed in `disabledTargets`
    pub fn from_config(config: &Config) -> Self {
        let mut caps = Self::all();
        for id in &config.disabled_targets {
            if let Some(target) = Target::from_id(id) {
                caps.bound.remove(&target);
            }
        }
        caps
    }

    pub fn has(&self, target: Target) -> bool {
        self.bound.contains(&target)
    }

    pub fn without(mut self, target: Target) -> Self {
        self.bound.remove(&target);
        self
    }
}

/// Rendered markup per dashboard section
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderedDashboard {
    pub stats: Option<String>,
    pub level_chart: Option<String>,
    pub class_chart: Option<String>,
    pub categories: Option<String>,
    pub detail: Option<String>,
}

impl RenderedDashboard {
    pub fn is_empty(&self) -> bool {
        self.stats.is_none()
            && self.level_chart.is_none()
            && self.class_chart.is_none()
            && self.categories.is_none()
            && self.detail.is_none()
    }
}

/// Current snapshot plus the view settings applied when rendering it
#[derive(Debug, Clone)]
pub struct Dashboard {
    state: DashboardState,
    capabilities: Capabilities,
    chart: ChartConfig,
    filter: DetailFilter,
}

impl Dashboard {
    pub fn new(state: DashboardState, capabilities: Capabilities, chart: ChartConfig) -> Self {
        Self {
            state,
            capabilities,
            chart,
            filter: DetailFilter::default(),
        }
    }

    pub fn with_filter(mut self, filter: DetailFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    pub fn filter(&self) -> &DetailFilter {
        &self.filter
    }

    /// Apply an uploaded document. Returns whether the snapshot was replaced;
    /// a malformed upload leaves the current snapshot in place.
    pub fn upload(&mut self, text: &str, notifier: &dyn Notifier) -> bool {
        if !self.capabilities.has(Target::FileUpload) {
            return false;
        }
        match apply_upload(&self.state, text, notifier) {
            Some(next) => {
                self.state = next;
                true
            }
            None => false,
        }
    }

    pub fn render(&self) -> RenderedDashboard {
        RenderedDashboard {
            stats: self.render_stats(),
            level_chart: self.render_level_chart(),
            class_chart: self.render_class_chart(),
            categories: self.render_categories(),
            detail: self.render_detail(),
        }
    }

    fn render_stats(&self) -> Option<String> {
        if !self.capabilities.has(Target::StatsGrid) {
            return None;
        }
        let levels = self.state.summary.as_ref()?.levels.as_ref()?;
        Some(stats::render_stat_cards(&stat_cards(levels)))
    }

    fn render_level_chart(&self) -> Option<String> {
        if !self.capabilities.has(Target::LevelChart) {
            return None;
        }
        let levels = self.state.summary.as_ref()?.levels.as_ref()?;
        Some(LevelChart::layout(levels, self.chart).to_svg(Target::LevelChart.id()))
    }

    fn render_class_chart(&self) -> Option<String> {
        if !self.capabilities.has(Target::ClassChart) {
            return None;
        }
        let classes = self.state.summary.as_ref()?.classes.as_ref()?;
        class_chart::render_class_chart(&top_classes(classes, TOP_CLASSES))
    }

    fn render_categories(&self) -> Option<String> {
        if !self.capabilities.has(Target::ClassChart) {
            return None;
        }
        let classes = self.state.summary.as_ref()?.classes.as_ref()?;
        categories::render_rollup(&categories::rollup(classes))
    }

    fn render_detail(&self) -> Option<String> {
        if !self.capabilities.has(Target::DetailedAnalysis) {
            return None;
        }
        let rows = self.filter.apply(self.state.total.as_ref()?.rows());
        detail_table::render_detail_table(&rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::{NotificationKind, RecordingNotifier};
    use crate::{CountTable, Level, SummaryData, TotalData};
    use serde_json::json;

    fn dashboard(state: DashboardState) -> Dashboard {
        Dashboard::new(state, Capabilities::all(), ChartConfig::default())
    }

    #[test]
    fn test_target_ids_round_trip() {
        for target in Target::ALL {
            assert_eq!(Target::from_id(target.id()), Some(target));
        }
        assert_eq!(Target::from_id("nope"), None);
    }

    #[test]
    fn test_capabilities_from_config() {
        let config = Config {
            disabled_targets: vec!["level-chart".into(), "unknown".into()],
            ..Config::default()
        };
        let caps = Capabilities::from_config(&config);
        assert!(!caps.has(Target::LevelChart));
        assert!(caps.has(Target::StatsGrid));
    }

    #[test]
    fn test_demo_renders_summary_sections_only() {
        let rendered = dashboard(DashboardState::demo()).render();
        assert!(rendered.stats.unwrap().contains("Level A1"));
        assert!(rendered.level_chart.unwrap().contains("<svg"));
        assert!(rendered.class_chart.unwrap().contains("Simple Assignment"));
        assert!(rendered.categories.is_some());
        assert!(rendered.detail.is_none());
    }

    #[test]
    fn test_empty_state_renders_nothing() {
        assert!(dashboard(DashboardState::default()).render().is_empty());
    }

    #[test]
    fn test_summary_without_classes() {
        let state = DashboardState {
            summary: Some(SummaryData {
                levels: Some([("A1", 1)].into_iter().collect()),
                classes: None,
            }),
            ..DashboardState::default()
        };
        let rendered = dashboard(state).render();
        assert!(rendered.stats.is_some());
        assert!(rendered.class_chart.is_none());
    }

    #[test]
    fn test_unbound_targets_are_skipped() {
        let caps = Capabilities::all()
            .without(Target::StatsGrid)
            .without(Target::ClassChart);
        let rendered = Dashboard::new(DashboardState::demo(), caps, ChartConfig::default()).render();
        assert!(rendered.stats.is_none());
        assert!(rendered.class_chart.is_none());
        assert!(rendered.categories.is_none());
        assert!(rendered.level_chart.is_some());
    }

    #[test]
    fn test_detail_filter_applies() {
        let total = TotalData::from_value(&json!({
            "flask": {"app.py": {"Levels": {"A1": 2}}},
            "django": {"models.py": {"Levels": {"C1": 1}}}
        }));
        let state = DashboardState {
            total: Some(total),
            ..DashboardState::default()
        };
        let detail = dashboard(state)
            .with_filter(DetailFilter::new(None, Some(Level::C1)))
            .render()
            .detail
            .unwrap();
        assert!(detail.contains("models.py"));
        assert!(!detail.contains("app.py"));
    }

    #[test]
    fn test_filter_matching_nothing_hides_table() {
        let total = TotalData::from_value(&json!({"r": {"a.py": {"Levels": {"A1": 1}}}}));
        let state = DashboardState {
            total: Some(total),
            ..DashboardState::default()
        };
        let rendered = dashboard(state)
            .with_filter(DetailFilter::new(Some("zzz".into()), None))
            .render();
        assert!(rendered.detail.is_none());
    }

    #[test]
    fn test_upload_then_render() {
        let notifier = RecordingNotifier::new();
        let mut dash = dashboard(DashboardState::demo());
        assert!(dash.upload(r#"{"Levels": {"B2": 9}}"#, &notifier));
        let levels: &CountTable = dash.state().summary.as_ref().unwrap().levels.as_ref().unwrap();
        assert_eq!(levels.level(Level::B2), Some(9));
        assert!(dash.render().stats.unwrap().contains("Level B2 (100.0%)"));

        assert!(!dash.upload("not json", &notifier));
        assert_eq!(dash.state().summary.as_ref().unwrap().levels.as_ref().unwrap().len(), 1);
        let kinds: Vec<NotificationKind> = notifier.notifications().iter().map(|n| n.kind).collect();
        assert_eq!(kinds, vec![NotificationKind::Success, NotificationKind::Error]);
    }

    #[test]
    fn test_upload_without_input_is_noop() {
        let notifier = RecordingNotifier::new();
        let caps = Capabilities::all().without(Target::FileUpload);
        let mut dash = Dashboard::new(DashboardState::demo(), caps, ChartConfig::default());
        assert!(!dash.upload(r#"{"Levels": {"B2": 9}}"#, &notifier));
        assert!(notifier.notifications().is_empty());
    }
}
