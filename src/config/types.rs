use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub use vc_av::ToolsConfig;
pub use vc_core::CompressionConfig;

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub tools: ToolsConfig,

    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Request options used when the command line does not override them.
    #[serde(default)]
    pub defaults: CompressionConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Where compressed outputs are written.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Where uploads are staged while they are processed.
    #[serde(default = "default_upload_dir")]
    pub upload_dir: PathBuf,
}

fn default_output_dir() -> PathBuf {
    expand_path("~/VCP/processed")
}

fn default_upload_dir() -> PathBuf {
    expand_path("~/VCP/uploads")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            upload_dir: default_upload_dir(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PipelineConfig {
    /// Plans of one upload encoded at the same time; 1 is sequential.
    #[serde(default = "default_max_parallel_plans")]
    pub max_parallel_plans: usize,
}

fn default_max_parallel_plans() -> usize {
    1
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_parallel_plans: default_max_parallel_plans(),
        }
    }
}

/// Expand a leading `~` to the home directory.
pub fn expand_path(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).as_ref())
}
