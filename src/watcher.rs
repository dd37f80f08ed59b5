//! File system watcher for `dashboard --watch`

use notify::{Config, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver};
use std::time::Duration;

const DEBOUNCE_MS: u64 = 300;

/// Watches the data source files and reports which of them changed
pub struct DataWatcher {
    _watcher: RecommendedWatcher,
    receiver: Receiver<notify::Result<notify::Event>>,
    tracked: HashSet<PathBuf>,
    watched_dirs: Vec<PathBuf>,
}

fn is_create_or_modify(kind: &EventKind) -> bool {
    matches!(kind, EventKind::Create(_) | EventKind::Modify(_))
}

/// Absolute form of `path` with its directory canonicalized; the file itself may not exist yet
fn normalize(path: &Path) -> PathBuf {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let parent = parent.canonicalize().unwrap_or(parent);
    match path.file_name() {
        Some(name) => parent.join(name),
        None => parent,
    }
}

impl DataWatcher {
    /// Watch the directories holding `files`. Directories that do not exist are skipped.
    pub fn watch(files: &[PathBuf]) -> notify::Result<Self> {
        let (tx, rx) = channel();
        let mut watcher = RecommendedWatcher::new(
            move |res| {
                let _ = tx.send(res);
            },
            Config::default().with_poll_interval(Duration::from_millis(DEBOUNCE_MS)),
        )?;

        let tracked: HashSet<PathBuf> = files.iter().map(|f| normalize(f)).collect();
        let mut watched_dirs: Vec<PathBuf> = Vec::new();
        for file in &tracked {
            let Some(dir) = file.parent() else {
                continue;
            };
            if !dir.is_dir() || watched_dirs.iter().any(|d| d == dir) {
                continue;
            }
            watcher.watch(dir, RecursiveMode::NonRecursive)?;
            watched_dirs.push(dir.to_path_buf());
        }
        watched_dirs.sort();

        Ok(Self {
            _watcher: watcher,
            receiver: rx,
            tracked,
            watched_dirs,
        })
    }

    /// Directories actually being watched
    pub fn watched_dirs(&self) -> &[PathBuf] {
        &self.watched_dirs
    }

    pub fn is_tracked(&self, path: &Path) -> bool {
        self.tracked.contains(path) || self.tracked.contains(&normalize(path))
    }

    /// Collect tracked paths from an event
    fn paths_from_event(&self, event: &notify::Event) -> Vec<PathBuf> {
        if !is_create_or_modify(&event.kind) {
            return vec![];
        }
        event
            .paths
            .iter()
            .filter(|p| self.is_tracked(p))
            .cloned()
            .collect()
    }

    /// Wait for the next batch of changes (debounced). Blocks until at least one change, then drains for DEBOUNCE_MS.
    pub fn next_changes(&self) -> Vec<PathBuf> {
        let mut all = HashSet::new();

        match self.receiver.recv_timeout(Duration::from_secs(3600)) {
            Ok(Ok(event)) => all.extend(self.paths_from_event(&event)),
            Ok(Err(_)) | Err(_) => return vec![],
        }

        std::thread::sleep(Duration::from_millis(DEBOUNCE_MS));
        while let Ok(ev) = self.receiver.try_recv() {
            if let Ok(event) = ev {
                all.extend(self.paths_from_event(&event));
            }
        }

        let mut changed: Vec<PathBuf> = all.into_iter().collect();
        changed.sort();
        changed
    }
}
