//! vc-pipeline: compression planning and encode orchestration.
//!
//! The engine is written against the capability traits in [`vc_core`]:
//!
//! - [`selector`] parses resolution selectors (`FHD`, `CUSTOM_640x360_ASPECT`).
//! - [`advisor`] lists the tiers that make sense for a source.
//! - [`planner`] turns a probe and a request into [`vc_core::CompressionPlan`]s.
//! - [`orchestrator`] runs a plan through an [`vc_core::Encoder`].
//! - [`metrics`] maps an outcome to a [`vc_core::CompressionResult`].
//! - [`pipeline`] ties it together behind [`ProcessingPipeline`].

pub mod advisor;
pub mod metrics;
pub mod naming;
pub mod orchestrator;
pub mod output_dir;
pub mod pipeline;
pub mod planner;
pub mod selector;
pub mod staging;

pub use advisor::available_resolutions;
pub use naming::UploadName;
pub use orchestrator::EncodeOrchestrator;
pub use output_dir::OutputDirectory;
pub use pipeline::{
    PipelineSettings, PlanFailure, ProcessReport, ProcessingPipeline, Upload, UploadBody,
    UploadFailure,
};
pub use planner::PlanBuilder;
pub use selector::ResolutionSelector;
pub use staging::StagedUpload;
