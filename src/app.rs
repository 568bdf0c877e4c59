//! Wiring of concrete capabilities into the engine.

use std::sync::Arc;

use anyhow::{Context, Result};
use vc_av::{FfmpegEncoder, FfprobeProber, LocalStorage, ToolRegistry};
use vc_pipeline::{PipelineSettings, ProcessingPipeline};

use crate::config::Config;

/// Build a pipeline backed by ffprobe, ffmpeg and the local filesystem.
///
/// Fails when either tool cannot be found.
pub fn build_pipeline(config: &Config) -> Result<ProcessingPipeline> {
    let tools = ToolRegistry::discover(&config.tools);

    let prober = FfprobeProber::from_registry(&tools, config.tools.probe_timeout())
        .context("ffprobe is required")?;
    let encoder = FfmpegEncoder::from_registry(&tools, config.tools.encode_timeout())
        .context("ffmpeg is required")?;

    Ok(ProcessingPipeline::new(
        Arc::new(prober),
        Arc::new(encoder),
        Arc::new(LocalStorage),
        PipelineSettings {
            output_dir: config.storage.output_dir.clone(),
            upload_dir: config.storage.upload_dir.clone(),
            max_parallel_plans: config.pipeline.max_parallel_plans,
        },
    ))
}
