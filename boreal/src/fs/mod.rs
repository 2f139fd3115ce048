//! File system services consumed by the resource manager.

mod watcher;

pub use watcher::{FileStatus, FileWatcher};
