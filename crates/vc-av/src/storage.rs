//! Local-filesystem [`vc_core::Storage`] implementation.

use std::fs;
use std::io::{ErrorKind, Read};
use std::path::Path;

use vc_core::{Error, FileEntry, Storage};
use walkdir::WalkDir;

/// Storage backed directly by `std::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStorage;

impl LocalStorage {
    pub fn new() -> Self {
        Self
    }
}

impl Storage for LocalStorage {
    fn create_dir_all(&self, path: &Path) -> vc_core::Result<()> {
        fs::create_dir_all(path).map_err(|e| Error::storage(path, e))
    }

    fn copy_to(&self, reader: &mut dyn Read, path: &Path) -> vc_core::Result<u64> {
        let mut file = fs::File::create(path).map_err(|e| Error::storage(path, e))?;
        std::io::copy(reader, &mut file).map_err(|e| Error::storage(path, e))
    }

    fn remove_file_if_exists(&self, path: &Path) -> vc_core::Result<bool> {
        match fs::remove_file(path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(Error::storage(path, e)),
        }
    }

    fn remove_dir_if_exists(&self, path: &Path) -> vc_core::Result<bool> {
        match fs::remove_dir_all(path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(Error::storage(path, e)),
        }
    }

    fn list_files(&self, dir: &Path) -> vc_core::Result<Vec<FileEntry>> {
        let mut entries = Vec::new();
        for entry in WalkDir::new(dir).follow_links(false) {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(dir).to_path_buf();
                let io = e
                    .into_io_error()
                    .unwrap_or_else(|| std::io::Error::new(ErrorKind::Other, "filesystem loop"));
                Error::storage(&path, io)
            })?;

            if !entry.file_type().is_file() {
                continue;
            }

            let size_bytes = entry
                .metadata()
                .map_err(|e| {
                    let io = e
                        .into_io_error()
                        .unwrap_or_else(|| std::io::Error::new(ErrorKind::Other, "metadata"));
                    Error::storage(entry.path(), io)
                })?
                .len();

            entries.push(FileEntry {
                path: entry.into_path(),
                size_bytes,
            });
        }
        Ok(entries)
    }

    fn file_size(&self, path: &Path) -> vc_core::Result<u64> {
        fs::metadata(path)
            .map(|m| m.len())
            .map_err(|e| Error::storage(path, e))
    }
}
