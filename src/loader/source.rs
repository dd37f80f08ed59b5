//! Data source locations and fetching
//!
//! Remote (`http://`, `https://`) sources require the `remote` feature:
//! ```toml
//! cefrl-site = { version = "0.3", features = ["remote"] }
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Why a single source could not be used
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("{0}: not found")]
    NotFound(String),

    #[error("failed to read {location}: {source}")]
    Io {
        location: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{location}: HTTP {status}")]
    Status { location: String, status: u16 },

    #[error("request to {location} failed: {message}")]
    Request { location: String, message: String },

    #[error("{0}: remote sources need the `remote` feature")]
    RemoteDisabled(String),

    #[error("invalid JSON in {location}: {source}")]
    Json {
        location: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Where one of the dashboard's JSON resources lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceLocation {
    File(PathBuf),
    Url(String),
}

impl SourceLocation {
    /// URLs are kept as-is; anything else is a path relative to `base`
    pub fn resolve(base: &Path, source: &str) -> Self {
        if source.starts_with("http://") || source.starts_with("https://") {
            SourceLocation::Url(source.to_string())
        } else {
            let path = Path::new(source);
            if path.is_absolute() {
                SourceLocation::File(path.to_path_buf())
            } else {
                SourceLocation::File(base.join(path))
            }
        }
    }

    /// Fetch the raw text of the resource
    pub fn fetch(&self) -> Result<String, SourceError> {
        match self {
            SourceLocation::File(path) => std::fs::read_to_string(path).map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    SourceError::NotFound(path.display().to_string())
                } else {
                    SourceError::Io {
                        location: path.display().to_string(),
                        source: e,
                    }
                }
            }),
            SourceLocation::Url(url) => fetch_url(url),
        }
    }

    /// Fetch and parse as JSON
    pub fn fetch_json(&self) -> Result<serde_json::Value, SourceError> {
        let text = self.fetch()?;
        serde_json::from_str(&text).map_err(|e| SourceError::Json {
            location: self.to_string(),
            source: e,
        })
    }

    /// Local path, if this is a file source
    pub fn path(&self) -> Option<&Path> {
        match self {
            SourceLocation::File(p) => Some(p),
            SourceLocation::Url(_) => None,
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceLocation::File(p) => write!(f, "{}", p.display()),
            SourceLocation::Url(u) => f.write_str(u),
        }
    }
}

#[cfg(feature = "remote")]
fn fetch_url(url: &str) -> Result<String, SourceError> {
    let response = reqwest::blocking::get(url).map_err(|e| SourceError::Request {
        location: url.to_string(),
        message: e.to_string(),
    })?;

    let status = response.status();
    if !status.is_success() {
        return Err(SourceError::Status {
            location: url.to_string(),
            status: status.as_u16(),
        });
    }

    response.text().map_err(|e| SourceError::Request {
        location: url.to_string(),
        message: e.to_string(),
    })
}

#[cfg(not(feature = "remote"))]
fn fetch_url(url: &str) -> Result<String, SourceError> {
    Err(SourceError::RemoteDisabled(url.to_string()))
}

/// Check if remote sources can be fetched in this build
pub fn is_remote_available() -> bool {
    cfg!(feature = "remote")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_resolve() {
        let base = Path::new("/srv/site");
        assert_eq!(
            SourceLocation::resolve(base, "data.json"),
            SourceLocation::File(PathBuf::from("/srv/site/data.json"))
        );
        assert_eq!(
            SourceLocation::resolve(base, "https://example.org/data.json"),
            SourceLocation::Url("https://example.org/data.json".to_string())
        );
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let dir = TempDir::new().unwrap();
        let source = SourceLocation::resolve(dir.path(), "nope.json");
        assert!(matches!(source.fetch(), Err(SourceError::NotFound(_))));
    }

    #[test]
    fn test_invalid_json() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("bad.json"), "{ nope").unwrap();
        let source = SourceLocation::resolve(dir.path(), "bad.json");
        let err = source.fetch_json().unwrap_err();
        assert!(matches!(err, SourceError::Json { .. }));
        assert!(err.to_string().contains("bad.json"));
    }

    #[cfg(not(feature = "remote"))]
    #[test]
    fn test_url_without_remote_feature() {
        let source = SourceLocation::Url("https://example.org/x.json".to_string());
        assert!(matches!(source.fetch(), Err(SourceError::RemoteDisabled(_))));
        assert!(!is_remote_available());
    }
}
