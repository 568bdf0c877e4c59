//! FFmpeg-based [`vc_core::Encoder`] implementation.
//!
//! Translates an [`EncodeRequest`] into an ffmpeg argument vector. Single-file
//! requests mux straight into the target container; segmented requests use
//! the HLS muxer with every segment kept in the playlist.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use vc_core::{EncodeCause, EncodeRequest, Encoder, Error, OutputSpec};

use crate::command::ToolCommand;
use crate::tools::ToolRegistry;

/// Video codec names that take VP9-style effort options.
const VPX_CODECS: &[&str] = &["libvpx-vp9", "libvpx"];

/// An encoder backed by the `ffmpeg` CLI.
#[derive(Debug, Clone)]
pub struct FfmpegEncoder {
    ffmpeg_path: PathBuf,
    timeout: Duration,
}

impl FfmpegEncoder {
    pub fn new(ffmpeg_path: PathBuf, timeout: Duration) -> Self {
        Self {
            ffmpeg_path,
            timeout,
        }
    }

    /// Create an encoder from a discovered registry.
    pub fn from_registry(tools: &ToolRegistry, timeout: Duration) -> vc_core::Result<Self> {
        let ffmpeg = tools.require("ffmpeg")?;
        Ok(Self::new(ffmpeg.path.clone(), timeout))
    }
}

#[async_trait]
impl Encoder for FfmpegEncoder {
    fn name(&self) -> &'static str {
        "ffmpeg"
    }

    async fn encode(&self, request: &EncodeRequest, cancel: CancellationToken) -> vc_core::Result<()> {
        let args = build_args(request);

        tracing::info!(
            "ffmpeg encode: {:?} -> {} (codec={}, bitrate={}, crf={}, effort={})",
            request.input_path,
            output_display(&request.output),
            request.video.codec,
            request.video.bitrate_bps,
            request.video.quality_factor,
            request.video.effort,
        );
        tracing::debug!("ffmpeg args: {:?}", args);

        let mut cmd = ToolCommand::new(self.ffmpeg_path.clone());
        cmd.timeout(self.timeout);
        cmd.cancel_on(cancel);
        cmd.args(args);

        cmd.execute().await.map_err(|e| match e {
            Error::Tool { message, .. } => Error::encode(EncodeCause::Tool(message)),
            Error::TimedOut { after, .. } => Error::encode(EncodeCause::TimedOut(after)),
            Error::Cancelled { .. } => Error::encode(EncodeCause::Cancelled),
            other => other,
        })?;

        Ok(())
    }
}

fn output_display(output: &OutputSpec) -> String {
    match output {
        OutputSpec::File { path, .. } => path.display().to_string(),
        OutputSpec::Segmented { manifest_path, .. } => manifest_path.display().to_string(),
    }
}

/// Build the full ffmpeg argument vector for a request.
pub fn build_args(request: &EncodeRequest) -> Vec<String> {
    let video = &request.video;
    let audio = &request.audio;

    let mut args: Vec<String> = vec!["-y".into(), "-i".into()];
    args.push(request.input_path.to_string_lossy().to_string());

    args.extend(["-vf".into(), request.filter_graph.clone()]);
    args.extend(["-r".into(), video.frame_rate.to_string()]);
    args.extend(["-c:v".into(), video.codec.clone()]);
    args.extend(["-b:v".into(), video.bitrate_bps.to_string()]);

    if VPX_CODECS.contains(&video.codec.as_str()) {
        args.extend([
            "-deadline".into(),
            "good".into(),
            "-cpu-used".into(),
            vpx_cpu_used(&video.effort).to_string(),
        ]);
    } else {
        args.extend(["-preset".into(), video.effort.clone()]);
    }
    args.extend(["-crf".into(), video.quality_factor.to_string()]);

    args.extend(["-c:a".into(), audio.codec.clone()]);
    args.extend(["-ac".into(), audio.channels.to_string()]);
    args.extend(["-b:a".into(), audio.bitrate_bps.to_string()]);
    args.extend(["-strict".into(), "experimental".into()]);

    match &request.output {
        OutputSpec::File { path, format } => {
            args.extend(["-f".into(), format.muxer().into()]);
            args.push(path.to_string_lossy().to_string());
        }
        OutputSpec::Segmented {
            manifest_path,
            segment_dir,
            segment_duration_secs,
            segment_pattern,
        } => {
            args.extend(["-f".into(), "hls".into()]);
            args.extend(["-hls_time".into(), segment_duration_secs.to_string()]);
            // 0 keeps every segment in the playlist.
            args.extend(["-hls_list_size".into(), "0".into()]);
            args.extend([
                "-hls_segment_filename".into(),
                segment_dir.join(segment_pattern).to_string_lossy().to_string(),
            ]);
            args.push(manifest_path.to_string_lossy().to_string());
        }
    }

    args
}

/// Map an x264-style effort token onto libvpx `-cpu-used`.
fn vpx_cpu_used(effort: &str) -> u8 {
    match effort {
        "placebo" | "veryslow" => 0,
        "slower" | "slow" => 1,
        "medium" => 2,
        "fast" => 3,
        "faster" => 4,
        "veryfast" | "superfast" | "ultrafast" => 5,
        _ => 2,
    }
}
