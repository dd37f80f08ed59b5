//! Shape classification of uploaded JSON documents

use crate::{AnalysisData, SummaryData, TotalData};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("invalid JSON: {0}")]
    Syntax(#[source] serde_json::Error),

    #[error("summary data has an invalid shape: {0}")]
    Shape(#[source] serde_json::Error),
}

/// A decoded upload, tagged by which dashboard slot it fills
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Summary(SummaryData),
    Analysis(AnalysisData),
    Total(TotalData),
}

impl Payload {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Payload::Summary(_) => "summary",
            Payload::Analysis(_) => "analysis",
            Payload::Total(_) => "total",
        }
    }
}

/// Parse and classify uploaded text
pub fn decode_payload(text: &str) -> Result<Payload, DecodeError> {
    let value: Value = serde_json::from_str(text).map_err(DecodeError::Syntax)?;
    classify(value)
}

/// Discriminate in a fixed order: a non-null `Levels` field means summary,
/// an array means analysis records, anything else is per-repository totals.
pub fn classify(value: Value) -> Result<Payload, DecodeError> {
    let has_levels = value.get("Levels").is_some_and(|levels| !levels.is_null());
    if has_levels {
        let summary: SummaryData = serde_json::from_value(value).map_err(DecodeError::Shape)?;
        return Ok(Payload::Summary(summary));
    }
    if value.is_array() {
        return Ok(Payload::Analysis(AnalysisData(value)));
    }
    Ok(Payload::Total(TotalData::from_value(&value)))
}
