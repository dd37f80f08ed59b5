//! Light/dark theme persisted in a small JSON preference store

use super::document::{Document, Edits};
use crate::dashboard::Target;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const PREFERENCES_FILENAME: &str = ".cefrl-prefs.json";
pub const THEME_KEY: &str = "theme";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    /// Icon on the toggle button; it shows the theme you would switch to
    pub fn toggle_icon(self) -> &'static str {
        match self {
            Theme::Light => "🌙",
            Theme::Dark => "☀️",
        }
    }

    pub fn toggle_label(self) -> &'static str {
        match self {
            Theme::Light => "Switch to dark mode",
            Theme::Dark => "Switch to light mode",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(format!("unknown theme '{}' (expected light or dark)", other)),
        }
    }
}

/// Key/value preferences kept in a JSON object on disk
#[derive(Debug, Clone)]
pub struct PreferenceStore {
    path: PathBuf,
    values: Map<String, Value>,
}

impl PreferenceStore {
    /// Load the store; a missing or unreadable file yields an empty store
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = fs::read_to_string(&path)
            .ok()
            .and_then(|content| serde_json::from_str::<Map<String, Value>>(&content).ok())
            .unwrap_or_default();
        Self { path, values }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(Value::as_str)
    }

    pub fn set(&mut self, key: &str, value: &str) {
        self.values
            .insert(key.to_string(), Value::String(value.to_string()));
    }

    pub fn save(&self) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let content =
            serde_json::to_string_pretty(&self.values).unwrap_or_else(|_| "{}".to_string());
        fs::write(&self.path, content)
    }
}

/// Stored theme, light when unset or unrecognised
pub fn init_theme(store: &PreferenceStore) -> Theme {
    store
        .get(THEME_KEY)
        .and_then(|t| t.parse().ok())
        .unwrap_or_default()
}

/// Persist `theme` as the stored preference
pub fn set_theme(store: &mut PreferenceStore, theme: Theme) -> std::io::Result<()> {
    store.set(THEME_KEY, theme.as_str());
    store.save()
}

/// Flip the stored theme and persist it
pub fn toggle_theme(store: &mut PreferenceStore) -> std::io::Result<Theme> {
    let next = init_theme(store).toggled();
    set_theme(store, next)?;
    Ok(next)
}

/// Set `data-theme` on `<html>` and refresh the toggle button, when present
pub fn apply_theme(doc: &Document, edits: &mut Edits, theme: Theme) {
    if let Some(root) = doc.by_tag("html").next() {
        edits.set_attr(doc, root, "data-theme", theme.as_str());
    }
    if let Some(button) = doc.element_by_id(Target::ThemeToggle.id()) {
        edits.set_attr(doc, button, "aria-label", theme.toggle_label());
        edits.set_inner_html(doc, button, theme.toggle_icon());
    }
}
