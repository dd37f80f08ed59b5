//! CSV export of the loaded summary
//!
//! Names are written verbatim: a class name containing a comma or a quote
//! produces a malformed row. Consumers of this file rely on the plain format.

use crate::notify::{Notification, Notifier};
use crate::state::DashboardState;
use crate::SummaryData;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const EXPORT_FILENAME: &str = "pycefrl-analysis.csv";
pub const EXPORT_SUCCESS: &str = "Data exported successfully!";
pub const EXPORT_NO_DATA: &str = "No data to export";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("No data to export")]
    NoData,

    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// `Type,Name,Count` rows: levels then classes, each in input order
pub fn summary_csv(summary: &SummaryData) -> String {
    let mut csv = String::from("Type,Name,Count\n");
    if let Some(ref levels) = summary.levels {
        for (level, count) in levels.iter() {
            let _ = writeln!(csv, "Level,{},{}", level, count);
        }
    }
    if let Some(ref classes) = summary.classes {
        for (name, count) in classes.iter() {
            let _ = writeln!(csv, "Class,{},{}", name, count);
        }
    }
    csv
}

pub fn export_csv(state: &DashboardState) -> Result<String, ExportError> {
    state
        .summary
        .as_ref()
        .map(summary_csv)
        .ok_or(ExportError::NoData)
}

/// Write the export into `out_dir` and notify the user of the outcome
pub fn download_csv(
    state: &DashboardState,
    out_dir: &Path,
    filename: &str,
    notifier: &dyn Notifier,
) -> Result<PathBuf, ExportError> {
    let csv = match export_csv(state) {
        Ok(csv) => csv,
        Err(e) => {
            notifier.notify(Notification::error(EXPORT_NO_DATA));
            return Err(e);
        }
    };

    let path = out_dir.join(filename);
    let written = fs::create_dir_all(out_dir).and_then(|_| fs::write(&path, csv));
    if let Err(source) = written {
        let err = ExportError::Write { path, source };
        notifier.notify(Notification::error(err.to_string()));
        return Err(err);
    }

    notifier.notify(Notification::success(EXPORT_SUCCESS));
    Ok(path)
}
