//! Line matching and per-line text scoring.

use crate::classify::{pred_order_exempt, LineClassification};
use crate::config::EvalOptions;
use crate::types::Line;

/// A predicted line offered to the matcher.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate<'a> {
    pub line: &'a Line,
    /// Position among the page's order-eligible predicted lines, `None` if
    /// the line's type is order-exempt
    pub order_slot: Option<usize>,
}

/// A ground-truth line ready for matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Target<'a> {
    pub line: &'a Line,
    pub classification: LineClassification,
    /// Reading-order index, `None` when order-exempt
    pub order_index: Option<usize>,
}

/// One side of a matched pair.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineSide {
    pub text: String,
    pub order_index: Option<usize>,
}

/// A ground-truth line and its best-overlapping predicted line.
///
/// When nothing reaches the threshold the predicted side is an empty string
/// without an order index.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchedLinePair {
    pub gt: LineSide,
    pub pred: LineSide,
    /// `IoU` of the chosen prediction, `None` when unmatched
    pub iou: Option<f64>,
    /// Excluded from text scoring
    pub skip_ocr_evaluation: bool,
}

impl MatchedLinePair {
    #[inline]
    #[must_use]
    pub const fn is_matched(&self) -> bool {
        self.iou.is_some()
    }
}

/// Index and `IoU` of the best candidate at or above `iou_threshold`.
///
/// Ties go to the last candidate with the maximal `IoU`.
#[must_use]
pub fn best_match(candidates: &[Candidate<'_>], target: &Line, iou_threshold: f64) -> Option<(usize, f64)> {
    let mut best: Option<(usize, f64)> = None;
    for (idx, candidate) in candidates.iter().enumerate() {
        let iou = candidate.line.bbox.intersection_over_union(&target.bbox);
        if iou < iou_threshold {
            continue;
        }
        if best.map_or(true, |(_, best_iou)| iou >= best_iou) {
            best = Some((idx, iou));
        }
    }
    best
}

/// Pair a ground-truth line with its best predicted line.
#[must_use]
pub fn match_line(
    candidates: &[Candidate<'_>],
    target: &Target<'_>,
    options: &EvalOptions,
) -> MatchedLinePair {
    let gt = LineSide {
        text: target.line.text.clone(),
        order_index: target.order_index,
    };

    let (pred, iou) = match best_match(candidates, target.line, options.iou_threshold) {
        Some((idx, iou)) => {
            let candidate = &candidates[idx];
            let exempt =
                pred_order_exempt(candidate.line, target.classification.order_exempt, options);
            let side = LineSide {
                text: candidate.line.text.clone(),
                order_index: if exempt { None } else { candidate.order_slot },
            };
            (side, Some(iou))
        }
        None => (LineSide::default(), None),
    };

    MatchedLinePair {
        gt,
        pred,
        iou,
        skip_ocr_evaluation: target.classification.text_exempt,
    }
}

/// Text score of one pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LineScore {
    /// Excluded from text scoring
    Exempt,
    Scored {
        /// Levenshtein distance in characters
        distance: usize,
        /// Distance divided by the ground-truth length, or the raw distance
        /// when the ground truth is empty
        normalized: f64,
    },
}

impl LineScore {
    #[inline]
    #[must_use]
    pub const fn normalized(&self) -> Option<f64> {
        match self {
            Self::Exempt => None,
            Self::Scored { normalized, .. } => Some(*normalized),
        }
    }
}

/// Normalized character edit distance between prediction and ground truth.
#[must_use]
#[allow(clippy::cast_precision_loss)] // line lengths are tiny
pub fn normalized_edit_distance(pred: &str, gt: &str) -> (usize, f64) {
    let distance = strsim::levenshtein(pred, gt);
    let gt_len = gt.chars().count();
    if gt_len == 0 {
        (distance, distance as f64)
    } else {
        (distance, distance as f64 / gt_len as f64)
    }
}

/// Score a matched pair's text.
#[must_use]
pub fn score_line(pair: &MatchedLinePair, log_exact_matches: bool) -> LineScore {
    if pair.skip_ocr_evaluation {
        log::debug!(
            "Line evaluation skipped\npred line: {}\n  gt line: {}",
            pair.pred.text,
            pair.gt.text
        );
        return LineScore::Exempt;
    }

    let (distance, normalized) = normalized_edit_distance(&pair.pred.text, &pair.gt.text);
    if distance != 0 || log_exact_matches {
        log::info!(
            "### EDIT DIS : {distance}\npred line: {}\n  gt line: {}",
            pair.pred.text,
            pair.gt.text
        );
    }

    LineScore::Scored {
        distance,
        normalized,
    }
}
