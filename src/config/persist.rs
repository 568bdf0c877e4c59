//! Configuration persistence using toml_edit to preserve formatting and comments.

use anyhow::{Context, Result};
use std::path::Path;
use toml_edit::DocumentMut;

/// Update just `storage.output_dir`, keeping the rest of the file as is.
///
/// The file (and its parent directory) is created if it does not exist.
pub fn update_output_dir(path: &Path, output_dir: &Path) -> Result<()> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to read config file: {:?}", path))
        }
    };

    let mut doc: DocumentMut = content
        .parse()
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    if !doc.contains_key("storage") {
        doc["storage"] = toml_edit::table();
    }
    let storage = doc["storage"]
        .as_table_mut()
        .with_context(|| format!("[storage] in {:?} is not a table", path))?;
    storage["output_dir"] = toml_edit::value(output_dir.to_string_lossy().as_ref());

    write_document(path, &doc.to_string())
}

fn write_document(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
    }
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write config file: {:?}", path))
}
