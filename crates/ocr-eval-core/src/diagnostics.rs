//! Non-fatal findings raised while matching and aggregating.
//!
//! Each diagnostic is logged when raised and also kept on the result that
//! produced it, so degraded scores are visible in reports.

use serde::Serialize;
use std::fmt;

/// A non-fatal evaluation finding.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// No predicted line reached the `IoU` threshold for a ground-truth line.
    UnmatchedGroundTruthLine {
        pid: String,
        image_name: String,
        text: String,
    },
    /// A text-scored ground-truth line has an empty string; its distance is unnormalized.
    EmptyGroundTruthText { image_name: String },
    /// The page has no order-indexed ground-truth lines; the order distance is unnormalized.
    NoOrderedLines { image_name: String },
    /// The page has no text-scored lines; the text average is the (zero) sum.
    NoScoredLines { image_name: String },
    /// The page produced no line pairs; both scores are zero.
    EmptyPage { image_name: String },
    /// A prediction page has no ground-truth page with the same image name.
    UnpairedPredictionPage { image_name: String },
    /// A ground-truth page has no prediction page with the same image name.
    UnpairedGroundTruthPage { image_name: String },
    /// An input XML could not be read or parsed; it contributes no pages.
    UnreadableXml { path: String, reason: String },
    /// A LINE element lacked readable geometry and was dropped.
    MalformedLine { image_name: String, reason: String },
    /// No page of the document could be paired; it is left out of corpus aggregates.
    NoPairedPages { pid: String },
    /// A document was skipped during discovery.
    SkippedDocument { pid: String, reason: String },
    /// The corpus has no scored documents.
    EmptyCorpus,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnmatchedGroundTruthLine {
                pid,
                image_name,
                text,
            } => write!(
                f,
                "Predicted line block for gt line \"{text}\" not found in {pid}/{image_name}"
            ),
            Self::EmptyGroundTruthText { image_name } => {
                write!(f, "gt string length is 0 in {image_name}")
            }
            Self::NoOrderedLines { image_name } => {
                write!(f, "no order-indexed gt line in {image_name}")
            }
            Self::NoScoredLines { image_name } => {
                write!(f, "no text-scored line in {image_name}")
            }
            Self::EmptyPage { image_name } => write!(f, "No Line Block in this image:{image_name}"),
            Self::UnpairedPredictionPage { image_name } => {
                write!(f, "Page {image_name} has no corresponding ground truth")
            }
            Self::UnpairedGroundTruthPage { image_name } => {
                write!(f, "Page {image_name} has no corresponding prediction")
            }
            Self::UnreadableXml { path, reason } => write!(f, "cannot read {path}: {reason}"),
            Self::MalformedLine { image_name, reason } => {
                write!(f, "malformed LINE in {image_name}: {reason}")
            }
            Self::NoPairedPages { pid } => write!(f, "no paired page in pid={pid}"),
            Self::SkippedDocument { pid, reason } => write!(f, "skipped pid={pid}: {reason}"),
            Self::EmptyCorpus => write!(f, "no document was evaluated"),
        }
    }
}

impl Diagnostic {
    /// Log at `warn` and hand the diagnostic back for recording.
    #[inline]
    #[must_use = "the diagnostic should be recorded on its result"]
    pub fn emit(self) -> Self {
        log::warn!("{self}");
        self
    }
}
