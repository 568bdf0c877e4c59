//! Scoped staging of uploads.
//!
//! A [`StagedUpload`] owns a uniquely named copy of the client's bytes in the
//! upload directory. The copy is removed exactly once: by [`release`] on the
//! normal path, or by `Drop` when processing bails out early.
//!
//! [`release`]: StagedUpload::release

use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use uuid::Uuid;
use vc_core::Storage;

use crate::naming::UploadName;

pub struct StagedUpload {
    path: PathBuf,
    size_bytes: u64,
    storage: Arc<dyn Storage>,
    released: bool,
}

impl StagedUpload {
    /// Copy `reader` to `<upload_dir>/<uuid>[.<ext>]`.
    ///
    /// A partially written copy is removed if the copy itself fails.
    pub fn stage(
        storage: Arc<dyn Storage>,
        upload_dir: &Path,
        name: &UploadName,
        reader: &mut dyn Read,
    ) -> vc_core::Result<Self> {
        storage.create_dir_all(upload_dir)?;

        let id = Uuid::new_v4();
        let file_name = match name.extension() {
            Some(ext) => format!("{id}.{ext}"),
            None => id.to_string(),
        };

        let mut staged = Self {
            path: upload_dir.join(file_name),
            size_bytes: 0,
            storage,
            released: false,
        };
        staged.size_bytes = staged.storage.copy_to(reader, &staged.path)?;

        tracing::debug!(
            "Staged {} ({} bytes) at {}",
            name.file_name(),
            staged.size_bytes,
            staged.path.display()
        );
        Ok(staged)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    /// Remove the staged copy now.
    pub fn release(mut self) -> vc_core::Result<()> {
        self.released = true;
        self.storage.remove_file_if_exists(&self.path).map(|_| ())
    }
}

impl Drop for StagedUpload {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        if let Err(e) = self.storage.remove_file_if_exists(&self.path) {
            tracing::warn!("Failed to remove staged upload {}: {e}", self.path.display());
        }
    }
}

impl std::fmt::Debug for StagedUpload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StagedUpload")
            .field("path", &self.path)
            .field("size_bytes", &self.size_bytes)
            .field("released", &self.released)
            .finish()
    }
}
