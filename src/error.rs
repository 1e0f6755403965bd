//! Error types for the doc2pages library.
//!
//! There is a single error type, [`Doc2PagesError`], but two ways it reaches
//! the caller:
//!
//! * **Fatal**: the operation produced nothing usable (tool missing, source
//!   format rejected, PDF unreadable). Returned as `Err(Doc2PagesError)`.
//!
//! * **Partial**: page generation stopped part-way through a range. The pages
//!   produced so far are still returned inside a [`crate::output::PageBatch`],
//!   with the error that stopped generation stored next to them.

use std::path::PathBuf;
use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Doc2PagesError>;

/// All errors returned by the doc2pages library.
#[derive(Debug, Error)]
pub enum Doc2PagesError {
    // ── External tool errors ──────────────────────────────────────────────
    /// The tool binary could not be resolved on `PATH` (or at the configured path).
    #[error("'{tool}' was not found (looked for {path:?})\nInstall it or point the matching tool path option at the binary.")]
    ToolNotFound { tool: String, path: PathBuf },

    /// The tool exists but the process could not be started.
    #[error("Failed to start '{tool}': {source}")]
    ToolSpawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    /// The tool ran and exited unsuccessfully.
    #[error("'{tool}' failed ({exit}): {output}", exit = exit_label(.status))]
    ToolFailed {
        tool: String,
        status: Option<i32>,
        output: String,
    },

    /// The tool did not finish within the configured timeout and was killed.
    #[error("'{tool}' timed out after {secs}s")]
    ToolTimeout { tool: String, secs: u64 },

    /// The tool reported success but did not write the expected file.
    #[error("Expected output '{path}' was not produced")]
    MissingOutput { path: PathBuf },

    // ── Input errors ──────────────────────────────────────────────────────
    /// Source extension is not handled and the unknown-format policy is `Reject`.
    #[error("Unsupported source format '{extension}' for '{path}'")]
    UnsupportedFormat { path: PathBuf, extension: String },

    /// Page range is empty or not 1-based.
    #[error("Invalid page range {from}-{to}: pages are 1-based and 'from' must not exceed 'to'")]
    InvalidPageRange { from: usize, to: usize },

    // ── PDF inspection errors ─────────────────────────────────────────────
    /// Byte-level page counting could not find the structure it relies on.
    #[error("{path}: {step}")]
    PdfStructure { path: PathBuf, step: String },

    /// The PDF library could not be bound or could not open the document.
    #[error("PDF library error for '{path}': {detail}")]
    PdfLibrary { path: PathBuf, detail: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Reading, writing, copying or removing a file failed.
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Doc2PagesError {
    /// Wrap an `io::Error` together with the path it happened on.
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Doc2PagesError::Io {
            path: path.into(),
            source,
        }
    }

    /// True for errors raised by running an external tool.
    pub fn is_tool_error(&self) -> bool {
        matches!(
            self,
            Doc2PagesError::ToolNotFound { .. }
                | Doc2PagesError::ToolSpawn { .. }
                | Doc2PagesError::ToolFailed { .. }
                | Doc2PagesError::ToolTimeout { .. }
        )
    }
}

fn exit_label(status: &Option<i32>) -> String {
    match status {
        Some(code) => format!("exit code {code}"),
        None => "terminated by signal".to_string(),
    }
}
