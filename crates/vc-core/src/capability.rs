//! Capabilities the engine consumes but does not implement.
//!
//! [`Prober`] and [`Encoder`] wrap long-running external work and are async.
//! [`Storage`] is a thin, synchronous filesystem facade; it must be callable
//! from `Drop` so scoped resources can release themselves on every path.

use std::io::Read;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::Result;
use crate::job::{EncodeRequest, ProbedStream};

/// Extracts dimensions and duration from a source file.
#[async_trait]
pub trait Prober: Send + Sync {
    /// Human-readable name identifying this prober implementation.
    fn name(&self) -> &'static str;

    /// Probe the file at `path`.
    ///
    /// Fails with [`Error::Probe`](crate::Error::Probe) when the file is
    /// unreadable, has no video stream, or its header is corrupt.
    async fn probe(&self, path: &Path) -> Result<ProbedStream>;
}

/// Runs one encode described by an [`EncodeRequest`].
#[async_trait]
pub trait Encoder: Send + Sync {
    /// Human-readable name identifying this encoder implementation.
    fn name(&self) -> &'static str;

    /// Block until the encode finishes.
    ///
    /// When `cancel` fires the in-flight encode must be terminated and the
    /// call must fail with `EncodeCause::Cancelled`.
    async fn encode(&self, request: &EncodeRequest, cancel: CancellationToken) -> Result<()>;
}

/// A file found while listing a directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub path: PathBuf,
    pub size_bytes: u64,
}

/// Filesystem operations used by staging, orchestration and configuration.
pub trait Storage: Send + Sync {
    /// Create `path` and all parents. Idempotent.
    fn create_dir_all(&self, path: &Path) -> Result<()>;

    /// Copy everything from `reader` into a new file at `path`, returning the
    /// number of bytes written.
    fn copy_to(&self, reader: &mut dyn Read, path: &Path) -> Result<u64>;

    /// Delete a file; `Ok(false)` when it did not exist.
    fn remove_file_if_exists(&self, path: &Path) -> Result<bool>;

    /// Delete a directory tree; `Ok(false)` when it did not exist.
    fn remove_dir_if_exists(&self, path: &Path) -> Result<bool>;

    /// Every regular file below `dir` (recursive) with its size.
    fn list_files(&self, dir: &Path) -> Result<Vec<FileEntry>>;

    /// Size of a single file in bytes.
    fn file_size(&self, path: &Path) -> Result<u64>;
}
