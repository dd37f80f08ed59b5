//! Data loading: the three JSON sources, uploads, and the demo fallback

mod decode;
mod source;

pub use decode::{classify, decode_payload, DecodeError, Payload};
pub use source::{is_remote_available, SourceError, SourceLocation};

use crate::config::Config;
use crate::notify::{Notification, Notifier};
use crate::state::DashboardState;
use crate::{AnalysisData, SummaryData, TotalData};

pub const UPLOAD_SUCCESS: &str = "Data loaded successfully!";
pub const UPLOAD_FAILURE: &str = "Error loading file. Please ensure it's valid JSON.";
pub const UPLOAD_SHAPE_FAILURE: &str =
    "Error loading file. The JSON is valid but its Levels or Class counts are not whole numbers.";

/// The three optional resources feeding the dashboard
#[derive(Debug, Clone)]
pub struct DataSources {
    pub analysis: SourceLocation,
    pub summary: SourceLocation,
    pub total: SourceLocation,
}

impl DataSources {
    pub fn from_config(config: &Config) -> Self {
        let base = config.data_dir();
        Self {
            analysis: SourceLocation::resolve(&base, &config.sources.analysis),
            summary: SourceLocation::resolve(&base, &config.sources.summary),
            total: SourceLocation::resolve(&base, &config.sources.total),
        }
    }

    /// Local paths of file sources, for watching
    pub fn paths(&self) -> Vec<std::path::PathBuf> {
        [&self.analysis, &self.summary, &self.total]
            .into_iter()
            .filter_map(|s| s.path().map(|p| p.to_path_buf()))
            .collect()
    }
}

/// How the loaded state came about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOrigin {
    /// At least one source resolved; flags tell which
    Sources {
        analysis: bool,
        summary: bool,
        total: bool,
    },
    /// Nothing resolved, built-in demo data was used
    Demo,
}

#[derive(Debug)]
pub struct LoadOutcome {
    pub state: DashboardState,
    pub origin: LoadOrigin,
    /// Per-source failures; never fatal, only worth a verbose diagnostic
    pub failures: Vec<SourceError>,
}

/// Read all three sources concurrently. A failing source never affects the others.
pub fn load(sources: &DataSources) -> LoadOutcome {
    let (analysis, (summary, total)) = rayon::join(
        || sources.analysis.fetch_json().map(AnalysisData),
        || {
            rayon::join(
                || fetch_summary(&sources.summary),
                || sources.total.fetch_json().map(|v| TotalData::from_value(&v)),
            )
        },
    );

    let mut failures = Vec::new();
    let analysis = keep(analysis, &mut failures);
    let summary = keep(summary, &mut failures);
    let total = keep(total, &mut failures);

    let state = DashboardState {
        summary,
        analysis,
        total,
    };

    if state.is_empty() {
        return LoadOutcome {
            state: DashboardState::demo(),
            origin: LoadOrigin::Demo,
            failures,
        };
    }

    let origin = LoadOrigin::Sources {
        analysis: state.analysis.is_some(),
        summary: state.summary.is_some(),
        total: state.total.is_some(),
    };
    LoadOutcome {
        state,
        origin,
        failures,
    }
}

fn fetch_summary(location: &SourceLocation) -> Result<SummaryData, SourceError> {
    let value = location.fetch_json()?;
    serde_json::from_value(value).map_err(|e| SourceError::Json {
        location: location.to_string(),
        source: e,
    })
}

fn keep<T>(result: Result<T, SourceError>, failures: &mut Vec<SourceError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            failures.push(e);
            None
        }
    }
}

/// Apply an uploaded document to `state`.
///
/// On success returns the new snapshot and emits a success notification. On
/// failure emits an error notification and returns `None`; the caller keeps
/// its previous snapshot.
pub fn apply_upload(
    state: &DashboardState,
    text: &str,
    notifier: &dyn Notifier,
) -> Option<DashboardState> {
    match decode_payload(text) {
        Ok(payload) => {
            let next = state.with_payload(payload);
            notifier.notify(Notification::success(UPLOAD_SUCCESS));
            Some(next)
        }
        Err(DecodeError::Syntax(_)) => {
            notifier.notify(Notification::error(UPLOAD_FAILURE));
            None
        }
        Err(DecodeError::Shape(_)) => {
            notifier.notify(Notification::error(UPLOAD_SHAPE_FAILURE));
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::{NotificationKind, RecordingNotifier};
    use crate::Level;
    use std::fs;
    use tempfile::TempDir;

    fn sources_in(dir: &std::path::Path) -> DataSources {
        let config = Config::default().merge_with_cli(Some(dir.to_path_buf()), None);
        DataSources::from_config(&config)
    }

    #[test]
    fn test_no_sources_falls_back_to_demo() {
        let dir = TempDir::new().unwrap();
        let outcome = load(&sources_in(dir.path()));
        assert_eq!(outcome.origin, LoadOrigin::Demo);
        assert_eq!(outcome.state, DashboardState::demo());
        assert_eq!(outcome.failures.len(), 3);
    }

    #[test]
    fn test_partial_sources_are_kept() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("DATA_JSON")).unwrap();
        fs::write(
            dir.path().join("DATA_JSON/total_data.json"),
            r#"{"repo":{"a.py":{"Levels":{"A2":4}}}}"#,
        )
        .unwrap();
        // A broken summary must not affect the total
        fs::write(dir.path().join("DATA_JSON/summary_data.json"), "{").unwrap();

        let outcome = load(&sources_in(dir.path()));
        assert_eq!(
            outcome.origin,
            LoadOrigin::Sources {
                analysis: false,
                summary: false,
                total: true
            }
        );
        assert!(outcome.state.summary.is_none());
        let rows = outcome.state.total.unwrap().rows();
        assert_eq!(rows[0].count(Level::A2), 4);
        assert_eq!(outcome.failures.len(), 2);
    }

    #[test]
    fn test_upload_success_replaces_slot() {
        let notifier = RecordingNotifier::new();
        let state = DashboardState::demo();
        let next = apply_upload(&state, r#"{"Levels":{"C1":9}}"#, &notifier).unwrap();
        assert_eq!(
            next.summary.unwrap().levels.unwrap().level(Level::C1),
            Some(9)
        );
        let notes = notifier.notifications();
        assert_eq!(notes[0].kind, NotificationKind::Success);
        assert_eq!(notes[0].message, UPLOAD_SUCCESS);
    }

    #[test]
    fn test_upload_failure_keeps_state() {
        let notifier = RecordingNotifier::new();
        let state = DashboardState::demo();
        assert!(apply_upload(&state, "not json", &notifier).is_none());
        assert!(notifier.has_errors());
        assert_eq!(notifier.notifications()[0].message, UPLOAD_FAILURE);
    }

    #[test]
    fn test_upload_with_bad_counts_reports_shape() {
        let state = DashboardState::demo();
        for text in [r#"{"Levels": 0}"#, r#"{"Levels":{"A1":1.5}}"#] {
            let notifier = RecordingNotifier::new();
            assert!(apply_upload(&state, text, &notifier).is_none(), "{}", text);
            let notes = notifier.notifications();
            assert_eq!(notes.len(), 1);
            assert_eq!(notes[0].kind, NotificationKind::Error);
            assert_eq!(notes[0].message, UPLOAD_SHAPE_FAILURE);
        }
    }
}
