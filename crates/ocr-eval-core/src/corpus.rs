//! Corpus discovery, evaluation and aggregation.
//!
//! Corpus averages are means of per-document averages. Corpus medians pool
//! the per-page scores of every document and name the document(s) holding
//! the central value(s).

use crate::config::{EvalOptions, InputSpec, InputStructure};
use crate::diagnostics::Diagnostic;
use crate::document::{evaluate_source, DocumentScore, DocumentSource};
use crate::error::{EvalError, Result};
use crate::report::write_document_report;
use crate::stats::{mean, Median};
use rayon::prelude::*;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Average reported when no document could be scored.
pub const INVALID_AVERAGE: f64 = -1.0;

/// Name of the per-document XML directory in batch mode.
pub const XML_DIR_NAME: &str = "xml";

/// Prediction XML file pattern in batch mode.
pub const PRED_XML_PATTERN: &str = "*.sorted.xml";

/// Ground-truth XML file pattern in batch mode.
pub const GT_XML_PATTERN: &str = "*.xml";

/// Documents found on disk, plus the ones that had to be skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Discovery {
    pub sources: Vec<DocumentSource>,
    pub skipped: Vec<Diagnostic>,
}

/// Find the prediction/ground-truth XML pairs selected by `input`.
///
/// In directory mode a document with a missing directory or an ambiguous XML
/// is skipped; only an unreadable prediction root is an error.
pub fn discover_sources(input: &InputSpec) -> Result<Discovery> {
    match input.structure {
        InputStructure::Single => {
            let pid = input
                .gt
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .ok_or_else(|| {
                    EvalError::ConfigError(format!(
                        "cannot derive a document id from {}",
                        input.gt.display()
                    ))
                })?;
            Ok(Discovery {
                sources: vec![DocumentSource {
                    pid,
                    pred_xml: input.pred.clone(),
                    gt_xml: input.gt.clone(),
                }],
                skipped: Vec::new(),
            })
        }
        InputStructure::Directory => discover_directory(&input.pred, &input.gt),
    }
}

fn discover_directory(pred_root: &Path, gt_root: &Path) -> Result<Discovery> {
    let mut pred_dirs: Vec<PathBuf> = fs::read_dir(pred_root)?
        .filter_map(std::result::Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect();
    pred_dirs.sort();

    let mut discovery = Discovery::default();
    for pred_dir in pred_dirs {
        let Some(pid) = pred_dir.file_name().map(|n| n.to_string_lossy().into_owned()) else {
            continue;
        };
        let gt_dir = gt_root.join(&pid);

        let found = single_xml(&pid, &pred_dir, PRED_XML_PATTERN)
            .and_then(|pred_xml| Ok((pred_xml, single_xml(&pid, &gt_dir, GT_XML_PATTERN)?)));

        match found {
            Ok((pred_xml, gt_xml)) => discovery.sources.push(DocumentSource {
                pid,
                pred_xml,
                gt_xml,
            }),
            Err(EvalError::DiscoveryError { pid, reason }) => discovery
                .skipped
                .push(Diagnostic::SkippedDocument { pid, reason }.emit()),
            Err(e) => return Err(e),
        }
    }

    log::info!(
        "Discovered {} documents ({} skipped) under {}",
        discovery.sources.len(),
        discovery.skipped.len(),
        pred_root.display()
    );
    Ok(discovery)
}

/// The one XML file matching `pattern` in `<pid_dir>/xml/`.
fn single_xml(pid: &str, pid_dir: &Path, pattern: &str) -> Result<PathBuf> {
    let skip = |reason: String| EvalError::DiscoveryError {
        pid: pid.to_string(),
        reason,
    };

    if !pid_dir.is_dir() {
        return Err(skip(format!("pid directory {} not found.", pid_dir.display())));
    }
    let xml_dir = pid_dir.join(XML_DIR_NAME);
    if !xml_dir.is_dir() {
        return Err(skip(format!(
            "xml directory not found in {}.",
            pid_dir.display()
        )));
    }

    let full_pattern = format!(
        "{}/{pattern}",
        glob::Pattern::escape(&xml_dir.to_string_lossy())
    );
    // Hidden files (editor swap files, `._*` resource forks) never count.
    let options = glob::MatchOptions {
        require_literal_leading_dot: true,
        ..glob::MatchOptions::new()
    };
    let matches: Vec<PathBuf> = glob::glob_with(&full_pattern, options)
        .map_err(|e| skip(format!("invalid pattern {full_pattern}: {e}")))?
        .filter_map(std::result::Result::ok)
        .collect();

    match matches.as_slice() {
        [only] => Ok(only.clone()),
        _ => Err(skip(format!(
            "xml file must be only one in each xml directory. : {matches:?}"
        ))),
    }
}

/// Median of pooled page scores, with the documents it came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourcedMedian {
    pub value: f64,
    pub low: f64,
    pub high: f64,
    /// Document holding the low value, then the one holding the high value
    /// when it differs
    pub pids: Vec<String>,
}

/// Corpus-level results.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorpusSummary {
    /// Documents that contributed to the averages
    pub documents: usize,
    /// [`INVALID_AVERAGE`] when no document was scored
    pub line_ocr_edit_distance_average: f64,
    pub line_order_edit_distance_average: f64,
    pub line_ocr_edit_distance_median: Option<SourcedMedian>,
    pub line_order_edit_distance_median: Option<SourcedMedian>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<Diagnostic>,
}

/// Pool every document's page scores and attribute the median.
#[must_use]
pub fn sourced_median<F>(documents: &[DocumentScore], page_scores: F) -> Option<SourcedMedian>
where
    F: Fn(&DocumentScore) -> Vec<f64>,
{
    let per_document: Vec<(&str, Vec<f64>)> = documents
        .iter()
        .map(|doc| (doc.pid.as_str(), page_scores(doc)))
        .collect();
    let pooled: Vec<f64> = per_document
        .iter()
        .flat_map(|(_, scores)| scores.iter().copied())
        .collect();
    let median = Median::of(&pooled)?;

    let holder = |value: f64| {
        per_document
            .iter()
            .find(|(_, scores)| scores.contains(&value))
            .map(|(pid, _)| (*pid).to_string())
    };

    let mut pids: Vec<String> = holder(median.low).into_iter().collect();
    if let Some(high_pid) = holder(median.high) {
        if !pids.contains(&high_pid) {
            pids.push(high_pid);
        }
    }

    Some(SourcedMedian {
        value: median.value,
        low: median.low,
        high: median.high,
        pids,
    })
}

/// Aggregate document scores into corpus averages and medians.
#[must_use]
pub fn aggregate(documents: &[DocumentScore]) -> CorpusSummary {
    let mut diagnostics = Vec::new();

    let text_averages: Vec<f64> = documents.iter().filter_map(DocumentScore::text_average).collect();
    let order_averages: Vec<f64> = documents
        .iter()
        .filter_map(DocumentScore::order_average)
        .collect();

    if text_averages.is_empty() {
        diagnostics.push(Diagnostic::EmptyCorpus.emit());
    }

    CorpusSummary {
        documents: text_averages.len(),
        line_ocr_edit_distance_average: mean(&text_averages).unwrap_or(INVALID_AVERAGE),
        line_order_edit_distance_average: mean(&order_averages).unwrap_or(INVALID_AVERAGE),
        line_ocr_edit_distance_median: sourced_median(documents, DocumentScore::text_scores),
        line_order_edit_distance_median: sourced_median(documents, DocumentScore::order_scores),
        diagnostics,
    }
}

/// Evaluated documents of one corpus run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorpusReport {
    /// Document scores in discovery order
    pub documents: Vec<DocumentScore>,
    /// Documents skipped during discovery
    pub skipped: Vec<Diagnostic>,
}

impl CorpusReport {
    #[must_use]
    pub fn summary(&self) -> CorpusSummary {
        let mut summary = aggregate(&self.documents);
        summary.diagnostics.splice(0..0, self.skipped.iter().cloned());
        summary
    }
}

/// Runs document evaluations over a corpus.
///
/// # Examples
///
/// ```rust,no_run
/// use ocr_eval_core::{discover_sources, CorpusEvaluator, EvalOptions, InputSpec};
///
/// let input = InputSpec::directory("pred_root", "gt_root");
/// let discovery = discover_sources(&input)?;
/// let report = CorpusEvaluator::new(EvalOptions::default())
///     .with_output_root("eval_output")
///     .evaluate(discovery)?;
///
/// let summary = report.summary();
/// println!("text: {}", summary.line_ocr_edit_distance_average);
/// # Ok::<(), ocr_eval_core::EvalError>(())
/// ```
#[derive(Debug, Clone)]
pub struct CorpusEvaluator {
    options: EvalOptions,
    output_root: Option<PathBuf>,
    parallel: bool,
}

impl CorpusEvaluator {
    #[must_use]
    pub const fn new(options: EvalOptions) -> Self {
        Self {
            options,
            output_root: None,
            parallel: false,
        }
    }

    /// Write one report per document under `output_root`.
    #[must_use]
    pub fn with_output_root(mut self, output_root: impl Into<PathBuf>) -> Self {
        self.output_root = Some(output_root.into());
        self
    }

    /// Evaluate documents on the rayon thread pool.
    #[must_use]
    pub const fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    #[inline]
    #[must_use]
    pub const fn options(&self) -> &EvalOptions {
        &self.options
    }

    fn evaluate_one(&self, source: &DocumentSource) -> Result<DocumentScore> {
        let score = evaluate_source(source, &self.options);
        if let Some(root) = &self.output_root {
            write_document_report(root, &score)?;
        }
        Ok(score)
    }

    /// Evaluate every discovered document.
    ///
    /// Fails only when a report cannot be written.
    pub fn evaluate(&self, discovery: Discovery) -> Result<CorpusReport> {
        let documents = if self.parallel {
            discovery
                .sources
                .par_iter()
                .map(|source| self.evaluate_one(source))
                .collect::<Result<Vec<_>>>()?
        } else {
            discovery
                .sources
                .iter()
                .map(|source| self.evaluate_one(source))
                .collect::<Result<Vec<_>>>()?
        };

        Ok(CorpusReport {
            documents,
            skipped: discovery.skipped,
        })
    }
}
