//! Data model of a compression job: probe, plan, encode request, outcome and
//! result.

use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::media::{resolution_label, OutputFormat, Preset};

/// Name of the manifest written inside a segment directory.
pub const SEGMENT_MANIFEST_NAME: &str = "stream.m3u8";

/// Segment file naming pattern (encoder-side numbering).
pub const SEGMENT_FILE_PATTERN: &str = "segment%d.ts";

/// Extension identifying segment files when measuring a segment directory.
pub const SEGMENT_FILE_EXTENSION: &str = "ts";

/// Suffix appended to the planned output stem to name the segment directory.
pub const SEGMENT_DIR_SUFFIX: &str = "_hls";

/// Fixed segment duration in seconds.
pub const SEGMENT_DURATION_SECS: u32 = 10;

// ---------------------------------------------------------------------------
// Probe
// ---------------------------------------------------------------------------

/// What a [`Prober`](crate::Prober) reports about a source file.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProbedStream {
    pub width: u32,
    pub height: u32,
    pub duration_seconds: f64,
}

/// Metadata of one uploaded source, used for planning and metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SourceProbe {
    pub width: u32,
    pub height: u32,
    pub duration_seconds: u64,
    pub size_bytes: u64,
}

impl SourceProbe {
    /// Combine a probed stream with the byte size of the upload. Duration is
    /// rounded to whole seconds.
    pub fn new(stream: ProbedStream, size_bytes: u64) -> Self {
        let duration_seconds = if stream.duration_seconds.is_finite() && stream.duration_seconds > 0.0
        {
            stream.duration_seconds.round() as u64
        } else {
            0
        };
        Self {
            width: stream.width,
            height: stream.height,
            duration_seconds,
            size_bytes,
        }
    }

    pub fn resolution_label(&self) -> String {
        resolution_label(self.width, self.height)
    }
}

// ---------------------------------------------------------------------------
// Plan
// ---------------------------------------------------------------------------

/// One fully-resolved encode job: a single input and a single output target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompressionPlan {
    pub input_path: PathBuf,
    pub output_format: OutputFormat,
    pub target_width: u32,
    pub target_height: u32,
    pub maintain_aspect_ratio: bool,
    pub frame_rate: u32,
    pub preset: Preset,
    pub preserve_audio_quality: bool,
    /// Directory the output lands in, captured when the plan was built.
    pub output_dir: PathBuf,
    /// Stem of the client's original file name.
    pub output_base_name: String,
    pub output_suffix: String,
}

impl CompressionPlan {
    /// `<base><suffix>.<ext>`
    pub fn output_file_name(&self) -> String {
        format!(
            "{}{}.{}",
            self.output_base_name,
            self.output_suffix,
            self.output_format.extension()
        )
    }

    /// Planned output path inside the output directory.
    pub fn output_path(&self) -> PathBuf {
        self.output_dir.join(self.output_file_name())
    }

    /// Segment directory: sibling of the planned output, same stem plus `_hls`.
    pub fn segment_dir(&self) -> PathBuf {
        self.output_dir.join(format!(
            "{}{}{}",
            self.output_base_name, self.output_suffix, SEGMENT_DIR_SUFFIX
        ))
    }

    /// Manifest path for segmented output.
    pub fn manifest_path(&self) -> PathBuf {
        self.segment_dir().join(SEGMENT_MANIFEST_NAME)
    }

    pub fn target_label(&self) -> String {
        resolution_label(self.target_width, self.target_height)
    }
}

// ---------------------------------------------------------------------------
// Encode request
// ---------------------------------------------------------------------------

/// Video encoder parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VideoParams {
    pub codec: String,
    pub bitrate_bps: u32,
    pub effort: String,
    pub quality_factor: u8,
    pub frame_rate: u32,
}

/// Audio encoder parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AudioParams {
    pub codec: String,
    pub channels: u8,
    pub bitrate_bps: u32,
}

/// Where and how the encoder writes its output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OutputSpec {
    /// A single container file.
    File { path: PathBuf, format: OutputFormat },
    /// A manifest plus fixed-duration segment files, all segments retained.
    Segmented {
        manifest_path: PathBuf,
        segment_dir: PathBuf,
        segment_duration_secs: u32,
        segment_pattern: String,
    },
}

/// The contract handed to an [`Encoder`](crate::Encoder).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EncodeRequest {
    pub input_path: PathBuf,
    /// Declarative scaling filter expression.
    pub filter_graph: String,
    pub video: VideoParams,
    pub audio: AudioParams,
    pub output: OutputSpec,
}

// ---------------------------------------------------------------------------
// Outcome and result
// ---------------------------------------------------------------------------

/// Raw result of running one plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EncodeOutcome {
    SingleFile {
        path: PathBuf,
        size_bytes: u64,
    },
    Segmented {
        manifest_path: PathBuf,
        segment_dir: PathBuf,
        total_size_bytes: u64,
    },
}

impl EncodeOutcome {
    /// Bytes produced: the file size, or the sum over all segments.
    pub fn compressed_size(&self) -> u64 {
        match self {
            Self::SingleFile { size_bytes, .. } => *size_bytes,
            Self::Segmented {
                total_size_bytes, ..
            } => *total_size_bytes,
        }
    }

    /// Path a consumer opens: the file, or the manifest for segmented output.
    pub fn output_path(&self) -> &Path {
        match self {
            Self::SingleFile { path, .. } => path,
            Self::Segmented { manifest_path, .. } => manifest_path,
        }
    }
}

/// Before/after metrics of one produced variant.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompressionResult {
    pub file_name: String,
    pub resolution_label: String,
    pub original_size_bytes: u64,
    pub compressed_size_bytes: u64,
    pub compression_ratio: f64,
    pub original_resolution_label: String,
    pub bitrate_bps: u32,
    pub duration_seconds: u64,
    pub output_path: PathBuf,
}
