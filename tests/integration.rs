//! Integration tests: load -> render -> export, and page enhance -> search, against test-data/

use cefrl_site::config::Config;
use cefrl_site::dashboard::{render_page, Capabilities, Dashboard, DetailFilter, PageContext, Target};
use cefrl_site::export::export_csv;
use cefrl_site::loader::{self, DataSources, LoadOrigin};
use cefrl_site::notify::{NotificationKind, RecordingNotifier};
use cefrl_site::site::search::{SearchOutcome, SearchPanel};
use cefrl_site::site::{enhance_page, EnhanceOptions, SearchIndex, Theme};
use cefrl_site::Level;
use std::path::{Path, PathBuf};

fn fixture(rel: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("test-data").join(rel)
}

fn project_sources() -> DataSources {
    let config = Config::default().merge_with_cli(Some(fixture("project")), None);
    DataSources::from_config(&config)
}

fn project_dashboard() -> Dashboard {
    let outcome = loader::load(&project_sources());
    Dashboard::new(outcome.state, Capabilities::all(), Config::default().chart)
}

// --- Dashboard pipeline ---

#[test]
fn all_sources_load() {
    let outcome = loader::load(&project_sources());
    assert_eq!(
        outcome.origin,
        LoadOrigin::Sources {
            analysis: true,
            summary: true,
            total: true
        }
    );
    assert!(outcome.failures.is_empty());

    let summary = outcome.state.summary.unwrap();
    assert_eq!(summary.levels.unwrap().level(Level::A1), Some(12));
    // cli-tools/main.py has no Levels record
    assert_eq!(outcome.state.total.unwrap().rows().len(), 2);
}

#[test]
fn render_fills_every_bound_section() {
    let rendered = project_dashboard().render();
    assert!(rendered.stats.unwrap().contains("Level A1 (48.0%)"));
    assert!(rendered.level_chart.unwrap().contains("<svg"));

    let classes = rendered.class_chart.unwrap();
    // largest class first
    let assignment = classes.find("Simple Assignment").unwrap();
    let list = classes.find("Simple List").unwrap();
    assert!(assignment < list);

    assert!(rendered.categories.unwrap().contains("Data Structures"));
    assert!(rendered.detail.unwrap().contains("<td>app.py</td>"));
}

#[test]
fn unbound_sections_are_skipped() {
    let outcome = loader::load(&project_sources());
    let caps = Capabilities::all()
        .without(Target::LevelChart)
        .without(Target::DetailedAnalysis);
    let rendered = Dashboard::new(outcome.state, caps, Config::default().chart).render();
    assert!(rendered.level_chart.is_none());
    assert!(rendered.detail.is_none());
    assert!(rendered.stats.is_some());
}

#[test]
fn filter_by_level_and_text() {
    let dashboard = project_dashboard().with_filter(DetailFilter::new(Some("flask".into()), Some(Level::B2)));
    let detail = dashboard.render().detail.unwrap();
    assert!(detail.contains("<td>models.py</td>"));
    assert!(!detail.contains("<td>app.py</td>"));

    let none = project_dashboard().with_filter(DetailFilter::new(Some("django".into()), None));
    assert!(none.render().detail.is_none());
}

#[test]
fn upload_then_export() {
    let mut dashboard = project_dashboard();
    let notifier = RecordingNotifier::new();
    let upload = std::fs::read_to_string(fixture("uploads/summary.json")).unwrap();

    assert!(dashboard.upload(&upload, &notifier));
    assert_eq!(notifier.notifications()[0].kind, NotificationKind::Success);
    assert_eq!(
        export_csv(dashboard.state()).unwrap(),
        "Type,Name,Count\nLevel,A1,1\nLevel,B2,3\nClass,Simple Class,4\n"
    );
    // total data survives a summary upload
    assert!(dashboard.state().total.is_some());
}

#[test]
fn broken_upload_keeps_state() {
    let mut dashboard = project_dashboard();
    let before = dashboard.state().clone();
    let notifier = RecordingNotifier::new();
    let upload = std::fs::read_to_string(fixture("uploads/broken.json")).unwrap();

    assert!(!dashboard.upload(&upload, &notifier));
    assert!(notifier.has_errors());
    assert_eq!(dashboard.state(), &before);
}

#[test]
fn full_page_renders_controls() {
    let dashboard = project_dashboard();
    let mut ctx = PageContext::new(Capabilities::all(), Theme::Dark);
    ctx.export_href = Some("pycefrl-analysis.csv".into());
    let html = render_page(&dashboard.render(), &ctx);

    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains(r#"data-theme="dark""#));
    assert!(html.contains(r#"id="file-upload""#));
    assert!(html.contains(r#"href="pycefrl-analysis.csv" download"#));
}

// --- Page helpers ---

#[test]
fn enhanced_page_is_searchable() {
    let source = std::fs::read_to_string(fixture("docs/index.html")).unwrap();
    let report = enhance_page(&source, &EnhanceOptions::default()).unwrap();

    assert_eq!(report.active_links, 1);
    assert_eq!(report.toc_entries, 2);
    assert_eq!(report.copy_buttons, 1);
    assert!(report.unresolved_anchors.is_empty());

    let index = report.index.unwrap();
    let reloaded = SearchIndex::from_json(&index.to_json().unwrap()).unwrap();
    assert_eq!(reloaded, index);

    let config = Config::default().search;
    match reloaded.query("levels", config) {
        SearchOutcome::Hits(hits) => {
            assert_eq!(hits.len(), 3);
            // the generated TOC id makes the second heading linkable
            assert!(hits.iter().any(|h| h.anchor.as_deref() == Some("heading-1")));
        }
        other => panic!("expected hits, got {:?}", other),
    }
}

#[test]
fn search_panel_follows_input() {
    let source = std::fs::read_to_string(fixture("docs/index.html")).unwrap();
    let index = enhance_page(&source, &EnhanceOptions::default()).unwrap().index.unwrap();
    let config = Config::default().search;
    let mut panel = SearchPanel::new();

    assert!(panel.input(&index, "requirements", config).is_visible());
    assert!(panel.is_visible());
    assert_eq!(panel.input(&index, " p ", config), SearchOutcome::Hidden);
    assert!(!panel.is_visible());
    assert_eq!(panel.input(&index, "qwerty", config), SearchOutcome::NoResults);
    assert!(panel.html().contains("No results found"));
}

#[test]
fn guide_page_reports_missing_anchor() {
    let source = std::fs::read_to_string(fixture("docs/guide/index.html")).unwrap();
    let options = EnhanceOptions {
        current_path: "/guide/".into(),
        theme: Theme::Light,
        menu_open: false,
    };
    let report = enhance_page(&source, &options).unwrap();
    assert_eq!(report.unresolved_anchors, vec!["#missing".to_string()]);
    assert!(report.index.is_none());
    assert!(report.html.contains(r#"<a href="/guide/" class="active">"#));
}
