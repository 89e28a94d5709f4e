//! Removing half-finished outputs when a run fails.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};

/// Tracks files written during a run. Unless [`OutputGuard::commit`] is
/// called, every registered file is deleted when the guard is dropped, so a
/// failed run never leaves partial results behind.
#[derive(Debug, Default)]
pub struct OutputGuard {
    paths: Vec<PathBuf>,
    committed: bool,
}

impl OutputGuard {
    /// Create a guard with nothing registered.
    pub fn new() -> OutputGuard {
        OutputGuard::default()
    }

    /// Delete `path` on drop unless we commit. Register a file only once we
    /// have created it, so that we never delete somebody else's file.
    pub fn register<P: Into<PathBuf>>(&mut self, path: P) {
        self.paths.push(path.into());
    }

    /// The files registered so far.
    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.paths.iter().map(|p| p.as_path())
    }

    /// Keep everything we registered.
    pub fn commit(mut self) {
        self.committed = true;
    }
}

impl Drop for OutputGuard {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        for path in &self.paths {
            debug!("removing incomplete output {}", path.display());
            if let Err(err) = fs::remove_file(path) {
                if path.exists() {
                    warn!("could not remove {}: {}", path.display(), err);
                }
            }
        }
    }
}
