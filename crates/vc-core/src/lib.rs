//! vc-core: shared types, catalogs, errors, request configuration and the
//! capability traits of the compression engine.
//!
//! This crate is the foundational dependency for the other vc-* crates. It
//! holds no behaviour beyond pure data lookups and validation.

pub mod capability;
pub mod config;
pub mod error;
pub mod job;
pub mod media;

// Re-export the most commonly used items at the crate root.
pub use capability::{Encoder, FileEntry, Prober, Storage};
pub use config::CompressionConfig;
pub use error::{EncodeCause, Error, Result};
pub use job::*;
pub use media::{OutputFormat, Preset, PresetName, ResolutionTier};
