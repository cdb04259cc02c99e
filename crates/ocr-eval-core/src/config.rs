//! Evaluation options, line-type rule table and input selection.

use crate::error::{EvalError, Result};
use crate::types::{InlineKind, LineType};
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::path::PathBuf;

/// Default minimum `IoU` for a predicted line to count as a match.
pub const DEFAULT_IOU_THRESHOLD: f64 = 0.5;

/// Glyph the dataset uses for content that cannot be transcribed.
pub const DEFAULT_PLACEHOLDER: &str = "〓";

/// When a line type takes part in reading-order scoring.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderPolicy {
    /// Always ordered
    Always,
    /// Ordered only when `eval_annotation_line_order` is set
    Annotation,
    /// Never ordered
    #[default]
    Never,
}

/// Scoring eligibility of one line type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeRule {
    pub line_type: LineType,
    /// Text accuracy is scored for lines of this type
    pub text: bool,
    pub order: OrderPolicy,
}

impl TypeRule {
    #[inline]
    #[must_use]
    pub const fn new(line_type: LineType, text: bool, order: OrderPolicy) -> Self {
        Self {
            line_type,
            text,
            order,
        }
    }
}

/// Lookup table from line type to scoring eligibility.
///
/// Types without an entry are exempt from both text and order scoring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineTypeRules(pub Vec<TypeRule>);

impl LineTypeRules {
    /// Rule for `line_type`, if the table has one.
    #[must_use]
    pub fn get(&self, line_type: &LineType) -> Option<&TypeRule> {
        self.0.iter().find(|rule| &rule.line_type == line_type)
    }

    #[must_use]
    pub fn text_scored(&self, line_type: &LineType) -> bool {
        self.get(line_type).is_some_and(|rule| rule.text)
    }

    #[must_use]
    pub fn order_policy(&self, line_type: &LineType) -> OrderPolicy {
        self.get(line_type).map_or(OrderPolicy::Never, |rule| rule.order)
    }
}

impl Default for LineTypeRules {
    /// Body and advertisement text are text-scored; notes are ordered only on request.
    fn default() -> Self {
        Self(vec![
            TypeRule::new(LineType::Body, true, OrderPolicy::Always),
            TypeRule::new(LineType::HeadNote, false, OrderPolicy::Annotation),
            TypeRule::new(LineType::InsetNote, false, OrderPolicy::Annotation),
            TypeRule::new(LineType::Advertisement, true, OrderPolicy::Never),
        ])
    }
}

/// Options controlling line matching and scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvalOptions {
    /// Minimum `IoU` for a predicted line to be matched to a ground-truth line
    pub iou_threshold: f64,

    /// Log every scored line, including exact matches
    pub log_exact_matches: bool,

    /// Only consider body-text lines on both sides
    pub eval_main_text_only: bool,

    /// Include head-note and inset-note lines in reading-order scoring
    pub eval_annotation_line_order: bool,

    /// Exempt placeholder lines with any inline annotation, whatever its kind
    pub ignore_inline_type_to_skip: bool,

    /// Keep order-eligible predicted lines in the order sequence even when
    /// the matched ground-truth line is order-exempt
    pub eval_all_valid_pred_line: bool,

    /// Placeholder glyph standing in for non-OCR-able content
    pub placeholder: String,

    /// Inline kinds that make a placeholder line exempt from text scoring
    pub non_recognizable_inline_kinds: Vec<InlineKind>,

    /// Per-type scoring eligibility
    pub rules: LineTypeRules,
}

impl Default for EvalOptions {
    fn default() -> Self {
        Self {
            iou_threshold: DEFAULT_IOU_THRESHOLD,
            log_exact_matches: false,
            eval_main_text_only: false,
            eval_annotation_line_order: false,
            ignore_inline_type_to_skip: false,
            eval_all_valid_pred_line: false,
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
            non_recognizable_inline_kinds: vec![
                InlineKind::Handwriting,
                InlineKind::Formula,
                InlineKind::ChemicalFormula,
                InlineKind::MixedOrientation,
            ],
            rules: LineTypeRules::default(),
        }
    }
}

impl EvalOptions {
    /// Create options from environment variables, falling back to defaults.
    ///
    /// Environment variables:
    /// - `OCR_EVAL_IOU_THRESHOLD`: `IoU` threshold (default: 0.5)
    /// - `OCR_EVAL_MAIN_TEXT_ONLY`: only evaluate body text (default: false)
    /// - `OCR_EVAL_ANNOTATION_LINE_ORDER`: order annotation lines (default: false)
    #[must_use = "creates options from environment variables"]
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let iou_threshold = env::var("OCR_EVAL_IOU_THRESHOLD")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.iou_threshold);

        let eval_main_text_only = env::var("OCR_EVAL_MAIN_TEXT_ONLY")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.eval_main_text_only);

        let eval_annotation_line_order = env::var("OCR_EVAL_ANNOTATION_LINE_ORDER")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.eval_annotation_line_order);

        Self {
            iou_threshold,
            eval_main_text_only,
            eval_annotation_line_order,
            ..defaults
        }
    }

    /// Reject option values that would make matching meaningless.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.iou_threshold) {
            return Err(EvalError::ConfigError(format!(
                "iou_threshold must be within [0, 1], got {}",
                self.iou_threshold
            )));
        }
        if self.placeholder.is_empty() {
            return Err(EvalError::ConfigError(
                "placeholder glyph must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// How prediction and ground-truth inputs are laid out on disk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputStructure {
    /// One prediction XML file and one ground-truth XML file
    Single,
    /// Roots holding one `<pid>/xml/` directory per document
    #[default]
    Directory,
}

impl fmt::Display for InputStructure {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single => write!(f, "single"),
            Self::Directory => write!(f, "directory"),
        }
    }
}

impl std::str::FromStr for InputStructure {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "s" | "single" => Ok(Self::Single),
            "d" | "dir" | "directory" => Ok(Self::Directory),
            _ => Err(format!(
                "unknown input structure: '{s}' (expected: single, directory)"
            )),
        }
    }
}

/// Prediction/ground-truth input selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputSpec {
    pub structure: InputStructure,
    /// Prediction XML file (single) or prediction root directory
    pub pred: PathBuf,
    /// Ground-truth XML file (single) or ground-truth root directory
    pub gt: PathBuf,
}

impl InputSpec {
    #[must_use]
    pub fn single(pred: impl Into<PathBuf>, gt: impl Into<PathBuf>) -> Self {
        Self {
            structure: InputStructure::Single,
            pred: pred.into(),
            gt: gt.into(),
        }
    }

    #[must_use]
    pub fn directory(pred_root: impl Into<PathBuf>, gt_root: impl Into<PathBuf>) -> Self {
        Self {
            structure: InputStructure::Directory,
            pred: pred_root.into(),
            gt: gt_root.into(),
        }
    }

    /// Check that the selected inputs exist with the expected kind.
    pub fn validate(&self) -> Result<()> {
        for (side, path) in [("Prediction", &self.pred), ("Ground truth", &self.gt)] {
            match self.structure {
                InputStructure::Single if !path.is_file() => {
                    return Err(EvalError::ConfigError(format!(
                        "{side} data xml file not found : {}",
                        path.display()
                    )));
                }
                InputStructure::Directory if !path.is_dir() => {
                    return Err(EvalError::ConfigError(format!(
                        "{side} data root directory not found : {}",
                        path.display()
                    )));
                }
                _ => {}
            }
        }
        Ok(())
    }
}
