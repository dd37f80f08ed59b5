//! Dashboard state snapshots

use crate::loader::Payload;
use crate::{AnalysisData, SummaryData, TotalData};

/// Everything the dashboard renders from.
///
/// A snapshot is never mutated in place; loading or uploading produces a new one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardState {
    pub summary: Option<SummaryData>,
    pub analysis: Option<AnalysisData>,
    pub total: Option<TotalData>,
}

impl DashboardState {
    /// State holding only the built-in demo summary
    pub fn demo() -> Self {
        Self {
            summary: Some(SummaryData::demo()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.summary.is_none() && self.analysis.is_none() && self.total.is_none()
    }

    /// New snapshot with the slot matching `payload` replaced wholesale
    pub fn with_payload(&self, payload: Payload) -> Self {
        let mut next = self.clone();
        match payload {
            Payload::Summary(summary) => next.summary = Some(summary),
            Payload::Analysis(analysis) => next.analysis = Some(analysis),
            Payload::Total(total) => next.total = Some(total),
        }
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CountTable, Level};
    use serde_json::json;

    #[test]
    fn test_with_payload_replaces_only_one_slot() {
        let base = DashboardState::demo();
        let levels: CountTable = [("A1", 1)].into_iter().collect();
        let next = base.with_payload(Payload::Summary(SummaryData {
            levels: Some(levels),
            classes: None,
        }));

        // The original snapshot is untouched
        assert_eq!(base, DashboardState::demo());
        let summary = next.summary.unwrap();
        assert_eq!(summary.levels.unwrap().level(Level::A1), Some(1));
        // No merge with the previous summary
        assert!(summary.classes.is_none());
    }

    #[test]
    fn test_with_payload_keeps_other_slots() {
        let base = DashboardState::demo();
        let next = base.with_payload(Payload::Analysis(AnalysisData(json!([1, 2, 3]))));
        assert!(next.summary.is_some());
        assert!(next.analysis.is_some());
        assert!(next.total.is_none());
        assert!(!next.is_empty());
        assert!(DashboardState::default().is_empty());
    }
}
