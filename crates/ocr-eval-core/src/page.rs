//! Page-level line pairing and scoring.
//!
//! Reading order is compared by encoding each side's order indices as a
//! character sequence (index `i` becomes `char(40 + i)`) in pair order and
//! taking the edit distance between the two sequences.

use crate::classify::{classify_gt_line, is_evaluated, type_order_exempt};
use crate::config::EvalOptions;
use crate::diagnostics::Diagnostic;
use crate::line::{match_line, score_line, Candidate, LineScore, MatchedLinePair, Target};
use crate::types::Page;
use serde::Serialize;

/// Code point of the character that encodes order index 0.
pub const ORDER_BASE_CHAR: u32 = 40;

/// Matched pairs of one page, in ground-truth source order.
#[derive(Debug, Clone, PartialEq)]
pub struct LinePairs {
    pub image_name: String,
    pub pairs: Vec<MatchedLinePair>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Scores of one page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageScore {
    pub image_name: String,
    /// Raw edit distance between the order sequences
    pub line_order_edit_distance: usize,
    /// Order distance divided by the number of order-indexed ground-truth lines
    pub normalized_line_order_edit_distance: f64,
    /// Mean normalized text distance over text-scored lines
    pub line_ocr_edit_distance_average: f64,
    pub gt_line_order: String,
    pub pred_line_order: String,
    pub scored_lines: usize,
    pub exempt_lines: usize,
    pub unmatched_lines: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<Diagnostic>,
}

/// Encode order indices as a string for display.
#[must_use]
pub fn encode_order(indices: &[usize]) -> String {
    indices
        .iter()
        .map(|&idx| {
            u32::try_from(idx)
                .ok()
                .and_then(|i| i.checked_add(ORDER_BASE_CHAR))
                .and_then(char::from_u32)
                .unwrap_or(char::REPLACEMENT_CHARACTER)
        })
        .collect()
}

/// Match every ground-truth line on the page to its best predicted line.
///
/// Ground-truth order indices count order-eligible ground-truth lines;
/// predicted order slots count every order-eligible predicted line on the
/// page, matched or not.
#[must_use]
pub fn build_line_pairs(pid: &str, pred: &Page, gt: &Page, options: &EvalOptions) -> LinePairs {
    let mut next_slot = 0;
    let candidates: Vec<Candidate<'_>> = pred
        .lines
        .iter()
        .filter(|line| is_evaluated(line, options))
        .map(|line| {
            let order_slot = if type_order_exempt(&line.line_type, options) {
                None
            } else {
                next_slot += 1;
                Some(next_slot - 1)
            };
            Candidate { line, order_slot }
        })
        .collect();

    let mut pairs = Vec::new();
    let mut diagnostics = Vec::new();
    let mut next_index = 0;

    for line in gt.lines.iter().filter(|line| is_evaluated(line, options)) {
        let classification = classify_gt_line(line, options);
        let order_index = if classification.order_exempt {
            None
        } else {
            next_index += 1;
            Some(next_index - 1)
        };

        let target = Target {
            line,
            classification,
            order_index,
        };
        let pair = match_line(&candidates, &target, options);
        if !pair.is_matched() {
            diagnostics.push(
                Diagnostic::UnmatchedGroundTruthLine {
                    pid: pid.to_string(),
                    image_name: gt.image_name.clone(),
                    text: line.text.clone(),
                }
                .emit(),
            );
        }
        pairs.push(pair);
    }

    LinePairs {
        image_name: gt.image_name.clone(),
        pairs,
        diagnostics,
    }
}

/// Compute the order and text scores of a page.
#[must_use]
#[allow(clippy::cast_precision_loss)] // line counts are tiny
pub fn score_page(line_pairs: LinePairs, options: &EvalOptions) -> PageScore {
    let LinePairs {
        image_name,
        pairs,
        mut diagnostics,
    } = line_pairs;

    let gt_indices: Vec<usize> = pairs.iter().filter_map(|p| p.gt.order_index).collect();
    let pred_indices: Vec<usize> = pairs.iter().filter_map(|p| p.pred.order_index).collect();
    let gt_line_order = encode_order(&gt_indices);
    let pred_line_order = encode_order(&pred_indices);
    log::debug!("pred line order :{pred_line_order}");
    log::debug!("  gt line order :{gt_line_order}");

    let unmatched_lines = pairs.iter().filter(|p| !p.is_matched()).count();

    if pairs.is_empty() {
        diagnostics.push(
            Diagnostic::EmptyPage {
                image_name: image_name.clone(),
            }
            .emit(),
        );
        return PageScore {
            image_name,
            line_order_edit_distance: 0,
            normalized_line_order_edit_distance: 0.0,
            line_ocr_edit_distance_average: 0.0,
            gt_line_order,
            pred_line_order,
            scored_lines: 0,
            exempt_lines: 0,
            unmatched_lines,
            diagnostics,
        };
    }

    let line_order_edit_distance = strsim::generic_levenshtein(&pred_indices, &gt_indices);
    let normalized_line_order_edit_distance = if gt_indices.is_empty() {
        diagnostics.push(
            Diagnostic::NoOrderedLines {
                image_name: image_name.clone(),
            }
            .emit(),
        );
        line_order_edit_distance as f64
    } else {
        line_order_edit_distance as f64 / gt_indices.len() as f64
    };

    let mut distance_sum = 0.0;
    let mut scored_lines: usize = 0;
    let mut exempt_lines: usize = 0;
    for pair in &pairs {
        match score_line(pair, options.log_exact_matches) {
            LineScore::Exempt => exempt_lines += 1,
            LineScore::Scored { normalized, .. } => {
                if pair.gt.text.is_empty() {
                    diagnostics.push(
                        Diagnostic::EmptyGroundTruthText {
                            image_name: image_name.clone(),
                        }
                        .emit(),
                    );
                }
                distance_sum += normalized;
                scored_lines += 1;
            }
        }
    }

    let line_ocr_edit_distance_average = if scored_lines == 0 {
        diagnostics.push(
            Diagnostic::NoScoredLines {
                image_name: image_name.clone(),
            }
            .emit(),
        );
        distance_sum
    } else {
        distance_sum / scored_lines as f64
    };

    PageScore {
        image_name,
        line_order_edit_distance,
        normalized_line_order_edit_distance,
        line_ocr_edit_distance_average,
        gt_line_order,
        pred_line_order,
        scored_lines,
        exempt_lines,
        unmatched_lines,
        diagnostics,
    }
}

/// Pair and score one page.
#[must_use]
pub fn evaluate_page(pid: &str, pred: &Page, gt: &Page, options: &EvalOptions) -> PageScore {
    log::debug!("#### Start Page Evaluation : {pid} {} ####", gt.image_name);
    score_page(build_line_pairs(pid, pred, gt, options), options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Line, LineBox, LineType};

    fn line(x: i64, line_type: LineType, text: &str) -> Line {
        Line::new(LineBox::new(x, 0, 10, 100), line_type, text)
    }

    fn page(lines: Vec<Line>) -> Page {
        Page::new("R0000001_L.jpg", lines)
    }

    #[test]
    fn test_encode_order() {
        assert_eq!(encode_order(&[0, 1, 2]), "()*");
        assert_eq!(encode_order(&[]), "");
    }

    #[test]
    fn test_identical_single_line_page() {
        let gt = Page::new(
            "p.jpg",
            vec![Line::new(LineBox::new(0, 0, 10, 10), LineType::Body, "AB")],
        );
        let score = evaluate_page("R0000001", &gt.clone(), &gt, &EvalOptions::default());
        assert_eq!(score.line_order_edit_distance, 0);
        assert_eq!(score.normalized_line_order_edit_distance, 0.0);
        assert_eq!(score.line_ocr_edit_distance_average, 0.0);
        assert!(score.diagnostics.is_empty());
    }

    #[test]
    fn test_unmatched_line_scores_full_distance() {
        let gt = Page::new(
            "p.jpg",
            vec![Line::new(LineBox::new(0, 0, 10, 10), LineType::Body, "AB")],
        );
        let pred = Page::new(
            "p.jpg",
            vec![Line::new(LineBox::new(100, 100, 10, 10), LineType::Body, "AB")],
        );

        let pairs = build_line_pairs("R0000001", &pred, &gt, &EvalOptions::default());
        assert_eq!(pairs.pairs.len(), 1);
        assert_eq!(pairs.pairs[0].pred.text, "");
        assert_eq!(pairs.pairs[0].pred.order_index, None);
        assert!(matches!(
            pairs.diagnostics.as_slice(),
            [Diagnostic::UnmatchedGroundTruthLine { text, .. }] if text == "AB"
        ));

        let score = score_page(pairs, &EvalOptions::default());
        assert_eq!(score.line_ocr_edit_distance_average, 1.0);
        assert_eq!(score.unmatched_lines, 1);
        // gt "(" vs pred "" -> one deletion
        assert_eq!(score.line_order_edit_distance, 1);
        assert_eq!(score.normalized_line_order_edit_distance, 1.0);
    }

    #[test]
    fn test_correct_reading_order_has_zero_distance() {
        let lines = vec![
            line(200, LineType::Body, "一"),
            line(100, LineType::Body, "二"),
            line(0, LineType::Body, "三"),
        ];
        let score = evaluate_page("R0000001", &page(lines.clone()), &page(lines), &EvalOptions::default());
        assert_eq!(score.gt_line_order, "()*");
        assert_eq!(score.pred_line_order, "()*");
        assert_eq!(score.line_order_edit_distance, 0);
    }

    #[test]
    fn test_swapped_reading_order() {
        let gt = page(vec![
            line(200, LineType::Body, "一"),
            line(100, LineType::Body, "二"),
            line(0, LineType::Body, "三"),
        ]);
        // prediction lists the last two lines in the wrong order
        let pred = page(vec![
            line(200, LineType::Body, "一"),
            line(0, LineType::Body, "三"),
            line(100, LineType::Body, "二"),
        ]);

        let score = evaluate_page("R0000001", &pred, &gt, &EvalOptions::default());
        assert_eq!(score.gt_line_order, "()*");
        assert_eq!(score.pred_line_order, "(*)");
        assert_eq!(score.line_order_edit_distance, 2);
        assert!((score.normalized_line_order_edit_distance - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(score.line_ocr_edit_distance_average, 0.0);
    }

    #[test]
    fn test_head_note_is_exempt_from_both_scores() {
        let gt = page(vec![
            line(0, LineType::Body, "本文"),
            line(100, LineType::HeadNote, "X"),
        ]);
        let pred = page(vec![
            line(0, LineType::Body, "本文"),
            line(100, LineType::HeadNote, "Y"),
        ]);

        let pairs = build_line_pairs("R0000001", &pred, &gt, &EvalOptions::default());
        assert_eq!(pairs.pairs[1].gt.order_index, None);
        assert_eq!(pairs.pairs[1].pred.order_index, None);
        assert!(pairs.pairs[1].skip_ocr_evaluation);

        let score = score_page(pairs, &EvalOptions::default());
        assert_eq!(score.scored_lines, 1);
        assert_eq!(score.exempt_lines, 1);
        assert_eq!(score.line_ocr_edit_distance_average, 0.0);
        assert_eq!(score.gt_line_order, "(");
    }

    #[test]
    fn test_annotation_line_order_option() {
        let options = EvalOptions {
            eval_annotation_line_order: true,
            ..EvalOptions::default()
        };
        let lines = vec![
            line(0, LineType::Body, "本文"),
            line(100, LineType::HeadNote, "X"),
        ];
        let pairs = build_line_pairs("R0000001", &page(lines.clone()), &page(lines), &options);
        assert_eq!(pairs.pairs[1].gt.order_index, Some(1));
        assert_eq!(pairs.pairs[1].pred.order_index, Some(1));
    }

    #[test]
    fn test_unmatched_predicted_lines_consume_order_slots() {
        let gt = page(vec![line(100, LineType::Body, "二")]);
        let pred = page(vec![
            line(500, LineType::Body, "余分"),
            line(100, LineType::Body, "二"),
        ]);

        let score = evaluate_page("R0000001", &pred, &gt, &EvalOptions::default());
        assert_eq!(score.gt_line_order, "(");
        assert_eq!(score.pred_line_order, ")");
        assert_eq!(score.line_order_edit_distance, 1);
    }

    #[test]
    fn test_main_text_only_filters_both_sides() {
        let options = EvalOptions {
            eval_main_text_only: true,
            ..EvalOptions::default()
        };
        let gt = page(vec![
            line(0, LineType::Caption, "図"),
            line(100, LineType::Body, "本文"),
        ]);
        let pred = page(vec![
            line(0, LineType::Caption, "図"),
            line(100, LineType::Body, "本文"),
        ]);
        let pairs = build_line_pairs("R0000001", &pred, &gt, &options);
        assert_eq!(pairs.pairs.len(), 1);
        assert_eq!(pairs.pairs[0].gt.text, "本文");
        assert_eq!(pairs.pairs[0].pred.order_index, Some(0));
    }

    #[test]
    fn test_empty_page_scores_zero() {
        let score = evaluate_page("R0000001", &page(vec![]), &page(vec![]), &EvalOptions::default());
        assert_eq!(score.normalized_line_order_edit_distance, 0.0);
        assert_eq!(score.line_ocr_edit_distance_average, 0.0);
        assert!(matches!(
            score.diagnostics.as_slice(),
            [Diagnostic::EmptyPage { .. }]
        ));
    }

    #[test]
    fn test_page_without_ordered_or_scored_lines() {
        let lines = vec![line(0, LineType::Caption, "図1")];
        let score = evaluate_page("R0000001", &page(lines.clone()), &page(lines), &EvalOptions::default());
        assert_eq!(score.line_order_edit_distance, 0);
        assert_eq!(score.normalized_line_order_edit_distance, 0.0);
        assert_eq!(score.line_ocr_edit_distance_average, 0.0);
        assert!(score
            .diagnostics
            .iter()
            .any(|d| matches!(d, Diagnostic::NoOrderedLines { .. })));
        assert!(score
            .diagnostics
            .iter()
            .any(|d| matches!(d, Diagnostic::NoScoredLines { .. })));
    }

    #[test]
    fn test_empty_gt_text_is_reported_unnormalized() {
        let gt = page(vec![line(0, LineType::Body, "")]);
        let pred = page(vec![line(0, LineType::Body, "abc")]);
        let score = evaluate_page("R0000001", &pred, &gt, &EvalOptions::default());
        assert_eq!(score.line_ocr_edit_distance_average, 3.0);
        assert!(score
            .diagnostics
            .iter()
            .any(|d| matches!(d, Diagnostic::EmptyGroundTruthText { .. })));
    }
}
