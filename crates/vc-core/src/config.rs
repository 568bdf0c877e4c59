//! Per-request compression configuration.
//!
//! [`CompressionConfig`] is the recognised option set of a compression
//! request. Every field has a documented default so an empty `{}` is valid.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::media::{OutputFormat, PresetName};

/// Selector used when a request names no resolutions.
pub const DEFAULT_RESOLUTION: &str = "ORIGINAL";

/// Highest accepted output frame rate.
pub const MAX_FRAME_RATE: u32 = 240;

/// Options for one compression request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CompressionConfig {
    /// Quality preset (default `MEDIUM`).
    pub preset: PresetName,
    /// Resolution selectors, processed in order (default `["ORIGINAL"]`).
    pub resolutions: Vec<String>,
    /// Output frame rate (default 30).
    pub frame_rate: u32,
    /// Reserved. Accepted and echoed but never changes encode parameters.
    pub maintain_original_size: bool,
    /// 192 kbps audio when set, 128 kbps otherwise (default true).
    pub preserve_audio_quality: bool,
    /// Output container or segmented output (default mp4).
    pub output_format: OutputFormat,
    /// Suffix for ORIGINAL-resolution outputs (default `_compressed`).
    pub output_suffix: String,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self {
            preset: PresetName::default(),
            resolutions: vec![DEFAULT_RESOLUTION.to_string()],
            frame_rate: 30,
            maintain_original_size: false,
            preserve_audio_quality: true,
            output_format: OutputFormat::default(),
            output_suffix: "_compressed".to_string(),
        }
    }
}

impl CompressionConfig {
    /// Deserialize a config from a JSON string.
    pub fn from_json(json_str: &str) -> Result<Self> {
        serde_json::from_str(json_str)
            .map_err(|e| Error::Validation(format!("compression config parse error: {e}")))
    }

    /// Selectors to plan for; `["ORIGINAL"]` when none were given.
    pub fn effective_resolutions(&self) -> Vec<&str> {
        if self.resolutions.is_empty() {
            vec![DEFAULT_RESOLUTION]
        } else {
            self.resolutions.iter().map(String::as_str).collect()
        }
    }

    /// Reject values the encode path cannot honour.
    pub fn validate(&self) -> Result<()> {
        if self.frame_rate == 0 || self.frame_rate > MAX_FRAME_RATE {
            return Err(Error::Validation(format!(
                "frameRate must be between 1 and {MAX_FRAME_RATE}, got {}",
                self.frame_rate
            )));
        }

        if self.output_suffix.contains(['/', '\\']) {
            return Err(Error::Validation(format!(
                "outputSuffix '{}' must not contain path separators",
                self.output_suffix
            )));
        }

        if self.maintain_original_size {
            tracing::debug!("maintainOriginalSize is reserved and has no effect");
        }

        Ok(())
    }
}
