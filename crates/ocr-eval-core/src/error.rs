//! Error types for evaluation runs.
//!
//! Only conditions that abort a run (or a single document) are errors. Gaps
//! that degrade a score gracefully, such as an unmatched line or an unpaired
//! page, are reported as [`Diagnostic`](crate::diagnostics::Diagnostic) values instead.

use thiserror::Error;

/// Error types that can occur while configuring or running an evaluation.
///
/// # Examples
///
/// ```rust
/// use ocr_eval_core::{EvalError, EvalOptions};
///
/// let options = EvalOptions {
///     iou_threshold: 1.5,
///     ..EvalOptions::default()
/// };
///
/// match options.validate() {
///     Err(EvalError::ConfigError(msg)) => assert!(msg.contains("iou_threshold")),
///     other => panic!("unexpected: {other:?}"),
/// }
/// ```
#[derive(Error, Debug)]
pub enum EvalError {
    /// Invalid options or input paths.
    ///
    /// Raised before any document is evaluated; the run cannot start.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// A single document could not be located on disk.
    ///
    /// Batch discovery skips the document and keeps going.
    #[error("Discovery error for {pid}: {reason}")]
    DiscoveryError {
        /// Document identifier
        pid: String,
        /// Why the document was skipped
        reason: String,
    },

    /// Malformed dataset XML.
    #[error("XML error: {0}")]
    XmlError(String),

    /// File I/O error (reading inputs, writing reports).
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization error while writing a report.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl From<roxmltree::Error> for EvalError {
    #[inline]
    fn from(err: roxmltree::Error) -> Self {
        Self::XmlError(err.to_string())
    }
}

/// Type alias for [`Result<T, EvalError>`].
pub type Result<T> = std::result::Result<T, EvalError>;
