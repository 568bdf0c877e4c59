//! FFprobe-based [`vc_core::Prober`] implementation.
//!
//! Shells out to `ffprobe -v quiet -print_format json -show_format -show_streams`
//! and maps the first video stream plus the container duration into a
//! [`ProbedStream`].

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use vc_core::{Error, ProbedStream, Prober};

use crate::command::ToolCommand;
use crate::tools::ToolRegistry;

/// A prober backed by the `ffprobe` CLI.
#[derive(Debug, Clone)]
pub struct FfprobeProber {
    ffprobe_path: PathBuf,
    timeout: Duration,
}

impl FfprobeProber {
    /// Create a new prober using the given ffprobe path.
    pub fn new(ffprobe_path: PathBuf, timeout: Duration) -> Self {
        Self {
            ffprobe_path,
            timeout,
        }
    }

    /// Create a prober from a discovered registry.
    pub fn from_registry(tools: &ToolRegistry, timeout: Duration) -> vc_core::Result<Self> {
        let ffprobe = tools.require("ffprobe")?;
        Ok(Self::new(ffprobe.path.clone(), timeout))
    }
}

#[async_trait]
impl Prober for FfprobeProber {
    fn name(&self) -> &'static str {
        "ffprobe"
    }

    async fn probe(&self, path: &Path) -> vc_core::Result<ProbedStream> {
        let mut cmd = ToolCommand::new(self.ffprobe_path.clone());
        cmd.timeout(self.timeout);
        cmd.args([
            "-v",
            "quiet",
            "-print_format",
            "json",
            "-show_format",
            "-show_streams",
        ]);
        cmd.arg(path.to_string_lossy().as_ref());

        // Anything that keeps ffprobe from answering means the source cannot
        // be probed.
        let output = cmd.execute().await.map_err(|e| match e {
            Error::Tool { message, .. } => Error::Probe(format!(
                "{}: ffprobe failed: {message}",
                path.display()
            )),
            Error::TimedOut { after, .. } => Error::Probe(format!(
                "{}: ffprobe timed out after {after:?}",
                path.display()
            )),
            other => other,
        })?;

        let ff: FfprobeOutput = serde_json::from_str(&output.stdout)
            .map_err(|e| Error::Probe(format!("ffprobe JSON parse error: {e}")))?;

        parse_ffprobe_output(path, ff)
    }
}

// ---------------------------------------------------------------------------
// JSON structures
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    #[serde(default)]
    format: Option<FfprobeFormat>,
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    codec_type: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    duration: Option<String>,
}

fn parse_ffprobe_output(path: &Path, output: FfprobeOutput) -> vc_core::Result<ProbedStream> {
    if output.streams.is_empty() {
        return Err(Error::Probe(format!("{}: no streams found", path.display())));
    }

    let video = output
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| Error::Probe(format!("{}: no video stream", path.display())))?;

    let (width, height) = match (video.width, video.height) {
        (Some(w), Some(h)) if w > 0 && h > 0 => (w, h),
        _ => {
            return Err(Error::Probe(format!(
                "{}: video stream has no dimensions",
                path.display()
            )))
        }
    };

    let duration_seconds = output
        .format
        .as_ref()
        .and_then(|f| f.duration.as_deref())
        .or(video.duration.as_deref())
        .and_then(|d| d.trim().parse::<f64>().ok())
        .unwrap_or(0.0);

    Ok(ProbedStream {
        width,
        height,
        duration_seconds,
    })
}
