//! Client-supplied upload names.

use vc_core::Error;

/// The usable parts of a client file name.
///
/// Only the final path component is kept, whichever separator the client
/// used, so an upload can never name a location outside the output
/// directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadName {
    file_name: String,
    stem: String,
    extension: Option<String>,
}

impl UploadName {
    pub fn parse(raw: &str) -> vc_core::Result<Self> {
        let file_name = raw.rsplit(['/', '\\']).next().unwrap_or_default().trim();

        if file_name.is_empty() || file_name == "." || file_name == ".." {
            return Err(Error::Validation(format!("invalid upload file name '{raw}'")));
        }

        let (stem, extension) = match file_name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => {
                (stem.to_string(), Some(ext.to_string()))
            }
            _ => (file_name.to_string(), None),
        };

        Ok(Self {
            file_name: file_name.to_string(),
            stem,
            extension,
        })
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Name without the last extension; the base of every output name.
    pub fn stem(&self) -> &str {
        &self.stem
    }

    pub fn extension(&self) -> Option<&str> {
        self.extension.as_deref()
    }
}
