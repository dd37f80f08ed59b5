//! Config schema and deserialization

use serde::Deserialize;
use std::path::PathBuf;

/// Locations of the three data resources, relative to the data directory
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SourcesConfig {
    /// Per-sample analysis records
    pub analysis: String,
    /// Level and class summary
    pub summary: String,
    /// Per-repository, per-file totals
    pub total: String,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            analysis: "data.json".to_string(),
            summary: "DATA_JSON/summary_data.json".to_string(),
            total: "DATA_JSON/total_data.json".to_string(),
        }
    }
}

/// Level chart canvas size in pixels
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChartConfig {
    pub width: u32,
    pub height: u32,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: 600,
            height: 300,
        }
    }
}

/// Page search tuning
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchConfig {
    /// Queries shorter than this (after trimming) hide the results panel
    pub min_query_length: usize,
    /// Maximum number of hits shown
    pub max_results: usize,
    /// Characters of source text kept in each snippet
    pub snippet_length: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            min_query_length: 2,
            max_results: 10,
            snippet_length: 150,
        }
    }
}

/// Root config structure for .cefrlrc.json
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Directory the data sources are resolved against (default: current dir)
    #[serde(default)]
    pub data_dir: Option<PathBuf>,

    #[serde(default)]
    pub sources: SourcesConfig,

    /// Where exports and rendered pages are written (default: current dir)
    #[serde(default)]
    pub out_dir: Option<PathBuf>,

    /// File name of the CSV export (default: pycefrl-analysis.csv)
    #[serde(default)]
    pub export_filename: Option<String>,

    /// Preference store holding the theme (default: .cefrl-prefs.json)
    #[serde(default)]
    pub preferences_file: Option<PathBuf>,

    #[serde(default)]
    pub chart: ChartConfig,

    #[serde(default)]
    pub search: SearchConfig,

    /// Glob patterns for pages to skip when enhancing a directory
    #[serde(default)]
    pub ignore: Vec<String>,

    /// Dashboard element ids to treat as absent from the page
    #[serde(default)]
    pub disabled_targets: Vec<String>,
}

impl Config {
    /// CLI flags take precedence over the config file
    pub fn merge_with_cli(mut self, data_dir: Option<PathBuf>, out_dir: Option<PathBuf>) -> Self {
        if data_dir.is_some() {
            self.data_dir = data_dir;
        }
        if out_dir.is_some() {
            self.out_dir = out_dir;
        }
        self
    }

    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn out_dir(&self) -> PathBuf {
        self.out_dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn export_filename(&self) -> &str {
        self.export_filename
            .as_deref()
            .unwrap_or(crate::export::EXPORT_FILENAME)
    }

    pub fn preferences_file(&self) -> PathBuf {
        self.preferences_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(crate::site::theme::PREFERENCES_FILENAME))
    }
}
