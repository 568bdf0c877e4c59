//! The process-wide output directory setting.
//!
//! Reads are cheap snapshots. Updates are serialized and last write wins.
//! A plan keeps the directory it captured when it was built: an encode that
//! is already running continues writing to the previous directory after an
//! update.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use vc_core::{Error, Storage};

pub struct OutputDirectory {
    current: RwLock<PathBuf>,
    storage: Arc<dyn Storage>,
}

impl OutputDirectory {
    pub fn new(initial: impl Into<PathBuf>, storage: Arc<dyn Storage>) -> Self {
        Self {
            current: RwLock::new(initial.into()),
            storage,
        }
    }

    /// Snapshot of the current directory.
    pub fn get(&self) -> PathBuf {
        self.current.read().clone()
    }

    /// Create `path` and make it the output directory.
    ///
    /// Returns the previous directory.
    ///
    /// # Errors
    ///
    /// `InvalidPath` for an empty path, `Storage` if it cannot be created.
    /// The setting is unchanged on error.
    pub fn set(&self, path: &Path) -> vc_core::Result<PathBuf> {
        if path.as_os_str().is_empty() || path.to_string_lossy().trim().is_empty() {
            return Err(Error::InvalidPath("output directory must not be empty".into()));
        }

        let mut current = self.current.write();
        self.storage.create_dir_all(path)?;
        let previous = std::mem::replace(&mut *current, path.to_path_buf());
        drop(current);

        tracing::info!(
            "Output directory changed: {} -> {}",
            previous.display(),
            path.display()
        );
        Ok(previous)
    }
}

impl std::fmt::Debug for OutputDirectory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("OutputDirectory").field(&*self.current.read()).finish()
    }
}
