//! Document-level page pairing and aggregation.

use crate::config::EvalOptions;
use crate::diagnostics::Diagnostic;
use crate::page::{evaluate_page, PageScore};
use crate::stats::mean;
use crate::types::{Document, Page};
use crate::xml::load_document;
use serde::Serialize;
use std::path::PathBuf;

/// Prediction and ground-truth XML files of one document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct DocumentSource {
    pub pid: String,
    pub pred_xml: PathBuf,
    pub gt_xml: PathBuf,
}

/// Result of pairing pages by image name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PagePairing<'a> {
    /// `(prediction, ground truth)` in prediction page order
    pub pairs: Vec<(&'a Page, &'a Page)>,
    pub unpaired_pred: Vec<&'a Page>,
    pub unpaired_gt: Vec<&'a Page>,
}

/// Pair prediction and ground-truth pages by image name.
///
/// Each page is used at most once; duplicates pair in source order.
#[must_use]
pub fn pair_pages<'a>(pred: &'a Document, gt: &'a Document) -> PagePairing<'a> {
    let mut gt_used = vec![false; gt.pages.len()];
    let mut pairing = PagePairing::default();

    for pred_page in &pred.pages {
        let found = gt
            .pages
            .iter()
            .enumerate()
            .find(|(idx, gt_page)| !gt_used[*idx] && gt_page.image_name == pred_page.image_name);

        match found {
            Some((idx, gt_page)) => {
                gt_used[idx] = true;
                pairing.pairs.push((pred_page, gt_page));
            }
            None => pairing.unpaired_pred.push(pred_page),
        }
    }

    pairing.unpaired_gt = gt
        .pages
        .iter()
        .zip(&gt_used)
        .filter(|(_, used)| !**used)
        .map(|(page, _)| page)
        .collect();

    pairing
}

/// Per-page and aggregated scores of one document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentScore {
    pub pid: String,
    pub pages: Vec<PageScore>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<Diagnostic>,
}

impl DocumentScore {
    /// Per-page text averages, in page order.
    #[must_use]
    pub fn text_scores(&self) -> Vec<f64> {
        self.pages
            .iter()
            .map(|p| p.line_ocr_edit_distance_average)
            .collect()
    }

    /// Per-page normalized order distances, in page order.
    #[must_use]
    pub fn order_scores(&self) -> Vec<f64> {
        self.pages
            .iter()
            .map(|p| p.normalized_line_order_edit_distance)
            .collect()
    }

    /// Mean of page text averages, each page weighted equally.
    #[must_use]
    pub fn text_average(&self) -> Option<f64> {
        mean(&self.text_scores())
    }

    /// Mean of page order distances, each page weighted equally.
    #[must_use]
    pub fn order_average(&self) -> Option<f64> {
        mean(&self.order_scores())
    }

    /// Diagnostics of the document and all of its pages.
    pub fn all_diagnostics(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .chain(self.pages.iter().flat_map(|p| p.diagnostics.iter()))
    }
}

/// Evaluate an in-memory prediction/ground-truth document pair.
#[must_use]
pub fn evaluate_document(
    pid: &str,
    pred: &Document,
    gt: &Document,
    options: &EvalOptions,
) -> DocumentScore {
    log::info!("#### Start PID Data Evaluation : pid={pid} ####");
    let pairing = pair_pages(pred, gt);

    let mut diagnostics = Vec::new();
    for page in &pairing.unpaired_pred {
        diagnostics.push(
            Diagnostic::UnpairedPredictionPage {
                image_name: page.image_name.clone(),
            }
            .emit(),
        );
    }
    for page in &pairing.unpaired_gt {
        diagnostics.push(
            Diagnostic::UnpairedGroundTruthPage {
                image_name: page.image_name.clone(),
            }
            .emit(),
        );
    }

    let pages: Vec<PageScore> = pairing
        .pairs
        .iter()
        .map(|(pred_page, gt_page)| evaluate_page(pid, pred_page, gt_page, options))
        .collect();

    if pages.is_empty() {
        diagnostics.push(
            Diagnostic::NoPairedPages {
                pid: pid.to_string(),
            }
            .emit(),
        );
    }

    DocumentScore {
        pid: pid.to_string(),
        pages,
        diagnostics,
    }
}

/// Load both XML files of `source` and evaluate them.
///
/// Unreadable files contribute no pages; their diagnostics are kept on the score.
#[must_use]
pub fn evaluate_source(source: &DocumentSource, options: &EvalOptions) -> DocumentScore {
    let pred = load_document(&source.pred_xml);
    let gt = load_document(&source.gt_xml);

    let mut score = evaluate_document(&source.pid, &pred.document, &gt.document, options);
    let mut load_diagnostics = pred.diagnostics;
    load_diagnostics.extend(gt.diagnostics);
    load_diagnostics.append(&mut score.diagnostics);
    score.diagnostics = load_diagnostics;
    score
}
