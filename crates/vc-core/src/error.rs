//! Unified error type for the vcompress engine.
//!
//! Every crate funnels its failures into [`Error`]. The variants follow the
//! failure taxonomy of a compression request: caller mistakes (selectors,
//! validation, paths), source problems (probe), per-plan encoder failures and
//! storage/IO failures.

use std::path::{Path, PathBuf};
use std::time::Duration;

/// Why an encode did not produce output.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncodeCause {
    /// The encoder exited non-zero or could not be started.
    #[error("{0}")]
    Tool(String),

    /// The caller cancelled the encode.
    #[error("cancelled")]
    Cancelled,

    /// The encode exceeded its time budget.
    #[error("timed out after {0:?}")]
    TimedOut(Duration),

    /// The scaling filter cannot be satisfied (e.g. a zero target dimension).
    #[error("invalid filter: {0}")]
    InvalidFilter(String),
}

/// Unified error type covering all failure modes in vcompress.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A resolution selector string was malformed or named an unknown tier.
    #[error("Invalid resolution selector '{selector}': {reason}")]
    InvalidResolutionSelector {
        /// The selector exactly as supplied by the caller.
        selector: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The source could not be probed (unreadable, no video stream, corrupt).
    #[error("Probe error: {0}")]
    Probe(String),

    /// A single plan's encode failed.
    #[error("Encode failed: {cause}")]
    Encode {
        /// What went wrong.
        cause: EncodeCause,
    },

    /// A filesystem operation on a specific path failed.
    #[error("Storage error at {}: {source}", path.display())]
    Storage {
        /// The path being operated on.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A caller-supplied path was rejected.
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// Request data failed validation.
    #[error("Validation error: {0}")]
    Validation(String),

    /// An external tool returned an error.
    #[error("Tool error [{tool}]: {message}")]
    Tool {
        /// Name of the tool that failed.
        tool: String,
        /// Human-readable error description.
        message: String,
    },

    /// An external tool was killed after exceeding its timeout.
    #[error("Tool error [{tool}]: timed out after {after:?}")]
    TimedOut {
        /// Name of the tool that timed out.
        tool: String,
        /// The timeout that fired.
        after: Duration,
    },

    /// An external tool was killed because its cancellation token fired.
    #[error("Tool error [{tool}]: cancelled")]
    Cancelled {
        /// Name of the tool that was cancelled.
        tool: String,
    },

    /// An I/O operation failed.
    #[error("IO error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Catch-all for unexpected internal errors.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Stable snake_case label for logs and machine-readable output.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::InvalidResolutionSelector { .. } => "invalid_resolution_selector",
            Error::Probe(_) => "probe_failure",
            Error::Encode { .. } => "encode_failure",
            Error::Storage { .. } => "storage_failure",
            Error::InvalidPath(_) => "invalid_path",
            Error::Validation(_) => "validation",
            Error::Tool { .. } => "tool",
            Error::TimedOut { .. } => "timed_out",
            Error::Cancelled { .. } => "cancelled",
            Error::Io { .. } => "io",
            Error::Internal(_) => "internal",
        }
    }

    /// Whether this error is a caller mistake rather than a runtime failure.
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            Error::InvalidResolutionSelector { .. } | Error::InvalidPath(_) | Error::Validation(_)
        )
    }

    /// Convenience constructor for [`Error::InvalidResolutionSelector`].
    pub fn invalid_selector(selector: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::InvalidResolutionSelector {
            selector: selector.into(),
            reason: reason.into(),
        }
    }

    /// Convenience constructor for [`Error::Encode`].
    pub fn encode(cause: EncodeCause) -> Self {
        Error::Encode { cause }
    }

    /// Convenience constructor for [`Error::Storage`].
    pub fn storage(path: &Path, source: std::io::Error) -> Self {
        Error::Storage {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Convenience constructor for [`Error::Tool`].
    pub fn tool(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Tool {
            tool: tool.into(),
            message: message.into(),
        }
    }
}

/// Result alias using the crate-level [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
