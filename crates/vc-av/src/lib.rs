//! # vc-av
//!
//! Concrete capabilities for the vcompress engine, backed by external tools
//! and the local filesystem.
//!
//! This crate provides:
//!
//! - **Tool discovery** ([`ToolRegistry`]) -- find and cache paths to ffmpeg
//!   and ffprobe.
//! - **Command execution** ([`ToolCommand`]) -- async builder with timeout and
//!   cancellation support; the child process is killed when either fires.
//! - **Probing** ([`FfprobeProber`]) -- implements [`vc_core::Prober`].
//! - **Encoding** ([`FfmpegEncoder`]) -- implements [`vc_core::Encoder`] for
//!   single-file and segmented output.
//! - **Storage** ([`LocalStorage`]) -- implements [`vc_core::Storage`].

pub mod command;
pub mod encoder;
pub mod probe;
pub mod storage;
pub mod tools;

// ---- Re-exports for convenience ----

pub use command::{ToolCommand, ToolOutput};
pub use encoder::FfmpegEncoder;
pub use probe::FfprobeProber;
pub use storage::LocalStorage;
pub use tools::{ToolConfig, ToolInfo, ToolRegistry, ToolsConfig};
