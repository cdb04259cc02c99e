//! Scoring exemptions derived from line attributes and options.
//!
//! Classification happens once per line before matching; the matcher and
//! scorers only read the result.

use crate::config::{EvalOptions, OrderPolicy};
use crate::types::{Line, LineType};

/// Which scores a ground-truth line takes part in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct LineClassification {
    /// No text distance is recorded for the line
    pub text_exempt: bool,
    /// The line gets no reading-order index
    pub order_exempt: bool,
}

/// Whether a line survives the `eval_main_text_only` filter.
#[inline]
#[must_use]
pub fn is_evaluated(line: &Line, options: &EvalOptions) -> bool {
    !options.eval_main_text_only || line.line_type == LineType::Body
}

/// Order exemption from the line type alone.
#[must_use]
pub fn type_order_exempt(line_type: &LineType, options: &EvalOptions) -> bool {
    match options.rules.order_policy(line_type) {
        OrderPolicy::Always => false,
        OrderPolicy::Annotation => !options.eval_annotation_line_order,
        OrderPolicy::Never => true,
    }
}

/// Placeholder line standing in for handwriting, formulas and similar content.
fn is_non_recognizable(line: &Line, options: &EvalOptions) -> bool {
    if line.text != options.placeholder {
        return false;
    }
    line.inline.as_ref().is_some_and(|kind| {
        options.ignore_inline_type_to_skip || options.non_recognizable_inline_kinds.contains(kind)
    })
}

/// Classify a ground-truth line.
#[must_use]
pub fn classify_gt_line(line: &Line, options: &EvalOptions) -> LineClassification {
    LineClassification {
        text_exempt: !options.rules.text_scored(&line.line_type)
            || is_non_recognizable(line, options),
        order_exempt: type_order_exempt(&line.line_type, options),
    }
}

/// Order exemption of a predicted line matched against a ground-truth line.
///
/// A predicted line inherits the exemption of an order-exempt ground-truth
/// line unless `eval_all_valid_pred_line` is set.
#[must_use]
pub fn pred_order_exempt(line: &Line, gt_order_exempt: bool, options: &EvalOptions) -> bool {
    type_order_exempt(&line.line_type, options)
        || (gt_order_exempt && !options.eval_all_valid_pred_line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{InlineKind, LineBox};

    fn line(line_type: LineType, text: &str) -> Line {
        Line::new(LineBox::new(0, 0, 10, 10), line_type, text)
    }

    #[test]
    fn test_body_line_is_fully_scored() {
        let c = classify_gt_line(&line(LineType::Body, "AB"), &EvalOptions::default());
        assert_eq!(c, LineClassification::default());
    }

    #[test]
    fn test_head_note_is_exempt_by_default() {
        let c = classify_gt_line(&line(LineType::HeadNote, "X"), &EvalOptions::default());
        assert!(c.text_exempt);
        assert!(c.order_exempt);
    }

    #[test]
    fn test_annotation_order_option() {
        let options = EvalOptions {
            eval_annotation_line_order: true,
            ..EvalOptions::default()
        };
        for line_type in [LineType::HeadNote, LineType::InsetNote] {
            let c = classify_gt_line(&line(line_type, "X"), &options);
            assert!(c.text_exempt, "annotations are never text-scored");
            assert!(!c.order_exempt);
        }
    }

    #[test]
    fn test_advertisement_is_text_scored_but_never_ordered() {
        let options = EvalOptions {
            eval_annotation_line_order: true,
            ..EvalOptions::default()
        };
        let c = classify_gt_line(&line(LineType::Advertisement, "広告"), &options);
        assert!(!c.text_exempt);
        assert!(c.order_exempt);
    }

    #[test]
    fn test_unknown_type_is_fully_exempt() {
        let c = classify_gt_line(&line(LineType::Caption, "図1"), &EvalOptions::default());
        assert!(c.text_exempt);
        assert!(c.order_exempt);
    }

    #[test]
    fn test_placeholder_with_non_recognizable_inline() {
        let options = EvalOptions::default();
        let handwriting = line(LineType::Body, "〓").with_inline(InlineKind::Handwriting);
        let c = classify_gt_line(&handwriting, &options);
        assert!(c.text_exempt);
        assert!(!c.order_exempt, "placeholder lines keep their order index");

        let ruby = line(LineType::Body, "〓").with_inline(InlineKind::Other("ルビ".into()));
        assert!(!classify_gt_line(&ruby, &options).text_exempt);

        let bare = line(LineType::Body, "〓");
        assert!(!classify_gt_line(&bare, &options).text_exempt);

        let text_with_inline = line(LineType::Body, "a〓").with_inline(InlineKind::Formula);
        assert!(!classify_gt_line(&text_with_inline, &options).text_exempt);
    }

    #[test]
    fn test_ignore_inline_type_exempts_any_inline_kind() {
        let options = EvalOptions {
            ignore_inline_type_to_skip: true,
            ..EvalOptions::default()
        };
        let ruby = line(LineType::Body, "〓").with_inline(InlineKind::Other("ルビ".into()));
        assert!(classify_gt_line(&ruby, &options).text_exempt);
    }

    #[test]
    fn test_pred_inherits_gt_order_exemption() {
        let options = EvalOptions::default();
        let pred = line(LineType::Body, "AB");
        assert!(!pred_order_exempt(&pred, false, &options));
        assert!(pred_order_exempt(&pred, true, &options));

        let options = EvalOptions {
            eval_all_valid_pred_line: true,
            ..EvalOptions::default()
        };
        assert!(!pred_order_exempt(&pred, true, &options));

        let ad = line(LineType::Advertisement, "広告");
        assert!(pred_order_exempt(&ad, false, &options));
    }

    #[test]
    fn test_main_text_filter() {
        let options = EvalOptions {
            eval_main_text_only: true,
            ..EvalOptions::default()
        };
        assert!(is_evaluated(&line(LineType::Body, "a"), &options));
        assert!(!is_evaluated(&line(LineType::HeadNote, "a"), &options));
        assert!(is_evaluated(
            &line(LineType::HeadNote, "a"),
            &EvalOptions::default()
        ));
    }
}
