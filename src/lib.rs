//! cefrl-site: dashboard and static page helpers for PyCEFRL analysis data
//!
//! This library turns the JSON files produced by a PyCEFRL run into a
//! self-contained HTML dashboard and a CSV export, and post-processes the
//! documentation pages (theme, navigation, table of contents, search index,
//! copy buttons).

pub mod config;
pub mod dashboard;
pub mod export;
pub mod loader;
pub mod notify;
pub mod site;
pub mod state;
pub mod watcher;

use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// CEFR proficiency level, lowest to highest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Level {
    A1,
    A2,
    B1,
    B2,
    C1,
    C2,
}

impl Level {
    /// Canonical display order
    pub const ALL: [Level; 6] = [
        Level::A1,
        Level::A2,
        Level::B1,
        Level::B2,
        Level::C1,
        Level::C2,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Level::A1 => "A1",
            Level::A2 => "A2",
            Level::B1 => "B1",
            Level::B2 => "B2",
            Level::C1 => "C1",
            Level::C2 => "C2",
        }
    }

    /// Exact match on the level code as it appears in the data files
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|l| l.as_str() == code)
    }

    /// Position in the canonical order
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Level::from_code(&s.trim().to_ascii_uppercase())
            .ok_or_else(|| format!("unknown level '{}' (expected A1, A2, B1, B2, C1 or C2)", s))
    }
}

/// Name -> count mapping that keeps the order the entries appeared in the JSON document.
///
/// A repeated key keeps its first position and takes the last value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CountTable {
    entries: Vec<(String, u64)>,
}

impl CountTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a count, keeping the original position of existing keys
    pub fn insert(&mut self, name: impl Into<String>, count: u64) {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = count,
            None => self.entries.push((name, count)),
        }
    }

    pub fn get(&self, name: &str) -> Option<u64> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, c)| *c)
    }

    /// Count for a canonical level, if present
    pub fn level(&self, level: Level) -> Option<u64> {
        self.get(level.as_str())
    }

    /// Entries in document order
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> + '_ {
        self.entries.iter().map(|(n, c)| (n.as_str(), *c))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum over every entry, canonical or not
    pub fn total(&self) -> u64 {
        self.entries
            .iter()
            .fold(0u64, |acc, (_, c)| acc.saturating_add(*c))
    }
}

impl<S: Into<String>> FromIterator<(S, u64)> for CountTable {
    fn from_iter<I: IntoIterator<Item = (S, u64)>>(iter: I) -> Self {
        let mut table = CountTable::new();
        for (name, count) in iter {
            table.insert(name, count);
        }
        table
    }
}

impl Serialize for CountTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, count) in &self.entries {
            map.serialize_entry(name, count)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for CountTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct CountTableVisitor;

        impl<'de> Visitor<'de> for CountTableVisitor {
            type Value = CountTable;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of names to non-negative integer counts")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<CountTable, A::Error> {
                let mut table = CountTable::new();
                while let Some((name, count)) = access.next_entry::<String, u64>()? {
                    table.insert(name, count);
                }
                Ok(table)
            }
        }

        deserializer.deserialize_map(CountTableVisitor)
    }
}

/// Aggregate counts per level and per code-element class (`summary_data.json`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryData {
    #[serde(rename = "Levels", default, skip_serializing_if = "Option::is_none")]
    pub levels: Option<CountTable>,
    #[serde(rename = "Class", default, skip_serializing_if = "Option::is_none")]
    pub classes: Option<CountTable>,
}

impl SummaryData {
    /// Fixed dataset shown when no real source is reachable
    pub fn demo() -> Self {
        Self {
            levels: Some(
                [
                    ("A1", 450),
                    ("A2", 380),
                    ("B1", 120),
                    ("B2", 45),
                    ("C1", 28),
                    ("C2", 12),
                ]
                .into_iter()
                .collect(),
            ),
            classes: Some(
                [
                    ("Simple List", 81),
                    ("Simple Assignment", 150),
                    ("Simple If statements", 95),
                    ("Function", 42),
                    ("Simple Class", 15),
                ]
                .into_iter()
                .collect(),
            ),
        }
    }
}

/// Per-sample analysis records (`data.json`); only its presence matters here
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisData(pub Value);

/// Level breakdown of one analyzed file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileStats {
    pub levels: Option<CountTable>,
}

/// Files of one repository, in document order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RepositoryFiles {
    pub name: String,
    pub files: Vec<(String, FileStats)>,
}

/// Per-repository, per-file level counts (`total_data.json`)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TotalData {
    pub repositories: Vec<RepositoryFiles>,
}

impl TotalData {
    /// Lenient decode: non-object repositories and files are skipped, and a
    /// `Levels` value that is not a count map counts as missing.
    pub fn from_value(value: &Value) -> Self {
        let Some(repos) = value.as_object() else {
            return Self::default();
        };
        let repositories = repos
            .iter()
            .filter_map(|(repo, files)| {
                let files = files.as_object()?;
                let files = files
                    .iter()
                    .filter_map(|(file, stats)| {
                        let stats = stats.as_object()?;
                        let levels = stats
                            .get("Levels")
                            .and_then(|l| CountTable::deserialize(l).ok());
                        Some((file.clone(), FileStats { levels }))
                    })
                    .collect();
                Some(RepositoryFiles {
                    name: repo.clone(),
                    files,
                })
            })
            .collect();
        Self { repositories }
    }

    /// Flatten into table rows; files without a `Levels` record are skipped
    pub fn rows(&self) -> Vec<DetailRow> {
        self.repositories
            .iter()
            .flat_map(|repo| {
                repo.files.iter().filter_map(move |(file, stats)| {
                    let levels = stats.levels.as_ref()?;
                    let mut counts = [0u64; 6];
                    for level in Level::ALL {
                        counts[level.index()] = levels.level(level).unwrap_or(0);
                    }
                    Some(DetailRow {
                        repository: repo.name.clone(),
                        file: file.clone(),
                        counts,
                    })
                })
            })
            .collect()
    }
}

/// One row of the file-level table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetailRow {
    pub repository: String,
    pub file: String,
    /// Counts in canonical level order, 0 when absent
    pub counts: [u64; 6],
}

impl DetailRow {
    pub fn count(&self, level: Level) -> u64 {
        self.counts[level.index()]
    }
}

/// Escape HTML special characters
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
