//! Directory watcher feeding the hot-reload poll.
//!
//! The notify backend delivers debounced events into a channel; nothing
//! else happens off-thread. [`FileWatcher::drain`] is the non-blocking poll
//! the host drives once per frame.

use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;

use notify::{RecursiveMode, Watcher as _};
use notify_debouncer_mini::{new_debouncer, DebouncedEvent, DebouncedEventKind, Debouncer};

/// Debounce window for file changes (batches rapid saves).
const DEBOUNCE_DURATION: Duration = Duration::from_millis(100);

/// What happened to a watched path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStatus {
    Modified,
    Deleted,
}

/// Watches directories and queues change events until the next poll.
pub struct FileWatcher {
    rx: mpsc::Receiver<Result<Vec<DebouncedEvent>, notify::Error>>,
    debouncer: Debouncer<notify::RecommendedWatcher>,
}

impl FileWatcher {
    pub fn new() -> Result<Self, notify::Error> {
        let (tx, rx) = mpsc::channel();
        let debouncer = new_debouncer(DEBOUNCE_DURATION, tx)?;
        Ok(Self { rx, debouncer })
    }

    /// Watch `dir` and everything under it.
    pub fn watch_dir(&mut self, dir: &Path) -> Result<(), notify::Error> {
        self.debouncer.watcher().watch(dir, RecursiveMode::Recursive)
    }

    pub fn unwatch_dir(&mut self, dir: &Path) {
        let _ = self.debouncer.watcher().unwatch(dir);
    }

    /// Non-blocking poll: every change since the last call, in arrival
    /// order. A path that no longer exists reports as deleted.
    pub fn drain(&mut self) -> Vec<(FileStatus, PathBuf)> {
        let mut changes = Vec::new();

        while let Ok(result) = self.rx.try_recv() {
            let events = match result {
                Ok(events) => events,
                Err(err) => {
                    tracing::warn!("file watcher error: {err}");
                    continue;
                }
            };

            for event in events {
                if !matches!(event.kind, DebouncedEventKind::Any) {
                    continue;
                }

                let status = if event.path.exists() {
                    FileStatus::Modified
                } else {
                    FileStatus::Deleted
                };
                changes.push((status, event.path));
            }
        }

        changes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::Instant;
    use tempfile::TempDir;

    fn wait_for_change(watcher: &mut FileWatcher, timeout: Duration) -> Vec<(FileStatus, PathBuf)> {
        let deadline = Instant::now() + timeout;
        loop {
            let changes = watcher.drain();
            if !changes.is_empty() || Instant::now() >= deadline {
                return changes;
            }
            std::thread::sleep(Duration::from_millis(20));
        }
    }

    #[test]
    fn reports_modified_files() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("asset.nbrtexture");
        fs::write(&file, b"first").unwrap();

        let mut watcher = FileWatcher::new().unwrap();
        watcher.watch_dir(dir.path()).unwrap();

        fs::write(&file, b"second").unwrap();

        let changes = wait_for_change(&mut watcher, Duration::from_secs(5));
        assert!(changes
            .iter()
            .any(|(status, path)| *status == FileStatus::Modified
                && path.file_name() == file.file_name()));
    }

    #[test]
    fn drain_is_empty_without_changes() {
        let dir = TempDir::new().unwrap();
        let mut watcher = FileWatcher::new().unwrap();
        watcher.watch_dir(dir.path()).unwrap();
        assert!(watcher.drain().is_empty());
    }
}
