//! Running one plan through the encoder.

use std::path::Path;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use vc_core::{
    AudioParams, CompressionPlan, EncodeCause, EncodeOutcome, EncodeRequest, Encoder, Error,
    OutputFormat, OutputSpec, Storage, VideoParams, SEGMENT_DURATION_SECS, SEGMENT_FILE_EXTENSION,
    SEGMENT_FILE_PATTERN,
};

/// Audio bitrate when `preserve_audio_quality` is set.
pub const AUDIO_BITRATE_PRESERVED_BPS: u32 = 192_000;

/// Audio bitrate otherwise.
pub const AUDIO_BITRATE_STANDARD_BPS: u32 = 128_000;

pub const AUDIO_CHANNELS: u8 = 2;

/// Video and audio codec for a container.
fn codecs(format: OutputFormat) -> (&'static str, &'static str) {
    match format {
        OutputFormat::Webm => ("libvpx-vp9", "libopus"),
        OutputFormat::Mp4 | OutputFormat::Mkv | OutputFormat::Segmented => ("libx264", "aac"),
    }
}

/// Scaling filter for a plan's target box.
///
/// With aspect preservation the source is fitted inside the box and padded
/// (centered) to fill it exactly; otherwise it is stretched to the box.
pub fn scale_filter(plan: &CompressionPlan) -> vc_core::Result<String> {
    let (w, h) = (plan.target_width, plan.target_height);
    if w == 0 || h == 0 {
        return Err(Error::encode(EncodeCause::InvalidFilter(format!(
            "target {w}x{h} has a zero dimension"
        ))));
    }

    if plan.maintain_aspect_ratio {
        Ok(format!(
            "scale=w={w}:h={h}:force_original_aspect_ratio=decrease,pad={w}:{h}:(ow-iw)/2:(oh-ih)/2"
        ))
    } else {
        Ok(format!("scale=w={w}:h={h}"))
    }
}

/// Translate a plan into the encoder contract.
pub fn encode_request(plan: &CompressionPlan) -> vc_core::Result<EncodeRequest> {
    let (video_codec, audio_codec) = codecs(plan.output_format);

    let output = if plan.output_format.is_segmented() {
        OutputSpec::Segmented {
            manifest_path: plan.manifest_path(),
            segment_dir: plan.segment_dir(),
            segment_duration_secs: SEGMENT_DURATION_SECS,
            segment_pattern: SEGMENT_FILE_PATTERN.to_string(),
        }
    } else {
        OutputSpec::File {
            path: plan.output_path(),
            format: plan.output_format,
        }
    };

    Ok(EncodeRequest {
        input_path: plan.input_path.clone(),
        filter_graph: scale_filter(plan)?,
        video: VideoParams {
            codec: video_codec.to_string(),
            bitrate_bps: plan.preset.target_bitrate_bps,
            effort: plan.preset.encoder_effort.to_string(),
            quality_factor: plan.preset.quality_factor,
            frame_rate: plan.frame_rate,
        },
        audio: AudioParams {
            codec: audio_codec.to_string(),
            channels: AUDIO_CHANNELS,
            bitrate_bps: if plan.preserve_audio_quality {
                AUDIO_BITRATE_PRESERVED_BPS
            } else {
                AUDIO_BITRATE_STANDARD_BPS
            },
        },
        output,
    })
}

/// Executes plans against an [`Encoder`] and measures what was produced.
#[derive(Clone)]
pub struct EncodeOrchestrator {
    encoder: Arc<dyn Encoder>,
    storage: Arc<dyn Storage>,
}

impl EncodeOrchestrator {
    pub fn new(encoder: Arc<dyn Encoder>, storage: Arc<dyn Storage>) -> Self {
        Self { encoder, storage }
    }

    /// Run one plan to completion.
    ///
    /// # Errors
    ///
    /// `Encode` when the filter is unsatisfiable, the encoder fails, or
    /// `cancel` fires; any partial output is removed first. `Storage` when the
    /// output location cannot be prepared or measured.
    pub async fn run(
        &self,
        plan: &CompressionPlan,
        cancel: CancellationToken,
    ) -> vc_core::Result<EncodeOutcome> {
        let request = encode_request(plan)?;

        if cancel.is_cancelled() {
            return Err(Error::encode(EncodeCause::Cancelled));
        }

        match &request.output {
            OutputSpec::File { .. } => self.storage.create_dir_all(&plan.output_dir)?,
            OutputSpec::Segmented { segment_dir, .. } => self.storage.create_dir_all(segment_dir)?,
        }

        tracing::info!(
            "Encoding {} -> {} with {}",
            plan.target_label(),
            plan.output_file_name(),
            self.encoder.name()
        );

        if let Err(e) = self.encoder.encode(&request, cancel).await {
            tracing::error!("Encode of {} failed: {e}", plan.output_file_name());
            self.discard_partial(&request.output);
            return Err(e);
        }

        match request.output {
            OutputSpec::File { path, .. } => {
                let size_bytes = self.storage.file_size(&path)?;
                Ok(EncodeOutcome::SingleFile { path, size_bytes })
            }
            OutputSpec::Segmented {
                manifest_path,
                segment_dir,
                ..
            } => {
                let total_size_bytes = self.segment_total(&segment_dir);
                Ok(EncodeOutcome::Segmented {
                    manifest_path,
                    segment_dir,
                    total_size_bytes,
                })
            }
        }
    }

    /// Sum of every segment file below `dir`. A failed walk counts as zero.
    fn segment_total(&self, dir: &Path) -> u64 {
        match self.storage.list_files(dir) {
            Ok(files) => files
                .iter()
                .filter(|f| {
                    f.path
                        .extension()
                        .is_some_and(|ext| ext == SEGMENT_FILE_EXTENSION)
                })
                .map(|f| f.size_bytes)
                .sum(),
            Err(e) => {
                tracing::warn!("Could not measure segments in {}: {e}", dir.display());
                0
            }
        }
    }

    fn discard_partial(&self, output: &OutputSpec) {
        let removed = match output {
            OutputSpec::File { path, .. } => self.storage.remove_file_if_exists(path),
            OutputSpec::Segmented { segment_dir, .. } => {
                self.storage.remove_dir_if_exists(segment_dir)
            }
        };
        match removed {
            Ok(true) => tracing::debug!("Removed partial output"),
            Ok(false) => {}
            Err(e) => tracing::warn!("Failed to remove partial output: {e}"),
        }
    }
}
