//! Plan building: one [`CompressionPlan`] per selector of a request.

use std::path::{Path, PathBuf};

use vc_core::{CompressionConfig, CompressionPlan, SourceProbe};

use crate::naming::UploadName;
use crate::selector::ResolutionSelector;

/// Turns a probe plus request options into concrete encode jobs.
///
/// The output directory is fixed when the builder is created; plans built
/// from it keep that directory even if the shared setting changes later.
#[derive(Debug, Clone)]
pub struct PlanBuilder {
    output_dir: PathBuf,
}

impl PlanBuilder {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Parse and validate the request, then build its plans.
    ///
    /// # Errors
    ///
    /// `InvalidResolutionSelector` for the first bad selector, or
    /// `Validation` when the config itself is rejected. No plan is built in
    /// either case.
    pub fn build_plans(
        &self,
        input_path: &Path,
        name: &UploadName,
        probe: &SourceProbe,
        config: &CompressionConfig,
    ) -> vc_core::Result<Vec<CompressionPlan>> {
        config.validate()?;
        let selectors = ResolutionSelector::parse_all(config.effective_resolutions())?;
        Ok(self.plans_for(input_path, name, probe, config, &selectors))
    }

    /// Build plans for already-parsed selectors, in selector order.
    pub fn plans_for(
        &self,
        input_path: &Path,
        name: &UploadName,
        probe: &SourceProbe,
        config: &CompressionConfig,
        selectors: &[ResolutionSelector],
    ) -> Vec<CompressionPlan> {
        selectors
            .iter()
            .map(|selector| {
                let (target_width, target_height, output_suffix) = match selector {
                    ResolutionSelector::Original => {
                        (probe.width, probe.height, config.output_suffix.clone())
                    }
                    ResolutionSelector::Named(tier) => {
                        (tier.width, tier.height, format!("_{}", tier.label))
                    }
                    ResolutionSelector::Custom { width, height, .. } => {
                        (*width, *height, format!("_{width}x{height}"))
                    }
                };

                CompressionPlan {
                    input_path: input_path.to_path_buf(),
                    output_format: config.output_format,
                    target_width,
                    target_height,
                    maintain_aspect_ratio: selector.maintain_aspect_ratio(),
                    frame_rate: config.frame_rate,
                    preset: *config.preset.preset(),
                    preserve_audio_quality: config.preserve_audio_quality,
                    output_dir: self.output_dir.clone(),
                    output_base_name: name.stem().to_string(),
                    output_suffix,
                }
            })
            .collect()
    }
}
