//! Evaluation reports written to disk.

use crate::corpus::CorpusSummary;
use crate::diagnostics::Diagnostic;
use crate::document::DocumentScore;
use crate::error::Result;
use serde::Serialize;
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// File name of the per-document report.
pub const REPORT_FILE_NAME: &str = "ocr_evaluation.json";

/// File name of the corpus summary.
pub const SUMMARY_FILE_NAME: &str = "summary.json";

/// Timestamp suffix appended to an output root that already exists.
pub const ROOT_DIR_SUFFIX_FORMAT: &str = "_%Y%m%d%H%M%S";

/// Timestamp suffix appended to a per-document report directory that already exists.
pub const DOCUMENT_DIR_SUFFIX_FORMAT: &str = "_%y%m%d%H%M%S";

/// JSON report of one document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentReport {
    pub pid: String,
    /// `None` when no page could be paired
    pub line_ocr_edit_distance_average_for_pid: Option<f64>,
    pub normalized_line_order_edit_distance_for_pid: Option<f64>,
    pub line_ocr_edit_distance_average_for_page: BTreeMap<usize, f64>,
    pub normalized_line_order_edit_distance_for_page: BTreeMap<usize, f64>,
    pub page_image_names: BTreeMap<usize, String>,
    pub diagnostics: Vec<Diagnostic>,
}

impl From<&DocumentScore> for DocumentReport {
    fn from(score: &DocumentScore) -> Self {
        Self {
            pid: score.pid.clone(),
            line_ocr_edit_distance_average_for_pid: score.text_average(),
            normalized_line_order_edit_distance_for_pid: score.order_average(),
            line_ocr_edit_distance_average_for_page: score
                .text_scores()
                .into_iter()
                .enumerate()
                .collect(),
            normalized_line_order_edit_distance_for_page: score
                .order_scores()
                .into_iter()
                .enumerate()
                .collect(),
            page_image_names: score
                .pages
                .iter()
                .map(|p| p.image_name.clone())
                .enumerate()
                .collect(),
            diagnostics: score.all_diagnostics().cloned().collect(),
        }
    }
}

/// Create `base`, or `base` plus a [`ROOT_DIR_SUFFIX_FORMAT`] suffix if it already exists.
pub fn create_unique_dir(base: &Path) -> Result<PathBuf> {
    create_unique_dir_with(base, ROOT_DIR_SUFFIX_FORMAT)
}

/// Create `base`, or `base` plus a `suffix_format` timestamp if it already exists.
///
/// The suffix is appended again until an unused name is found. Returns the
/// directory that was created.
pub fn create_unique_dir_with(base: &Path, suffix_format: &str) -> Result<PathBuf> {
    if let Some(parent) = base.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut candidate = base.to_path_buf();
    loop {
        match fs::create_dir(&candidate) {
            Ok(()) => {
                if candidate != base {
                    log::warn!(
                        "Directory {} already exists, using {}",
                        base.display(),
                        candidate.display()
                    );
                }
                return Ok(candidate);
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                let suffix = chrono::Local::now().format(suffix_format).to_string();
                let mut name = OsString::from(candidate.as_os_str());
                name.push(suffix);
                candidate = PathBuf::from(name);
            }
            Err(e) => return Err(e.into()),
        }
    }
}

/// Write `score`'s report to `<output_root>/<pid>[_<timestamp>]/ocr_evaluation.json`.
pub fn write_document_report(output_root: &Path, score: &DocumentScore) -> Result<PathBuf> {
    let dir = create_unique_dir_with(&output_root.join(&score.pid), DOCUMENT_DIR_SUFFIX_FORMAT)?;
    let path = dir.join(REPORT_FILE_NAME);
    let json = serde_json::to_string_pretty(&DocumentReport::from(score))?;
    fs::write(&path, json)?;
    log::info!("Wrote {}", path.display());
    Ok(path)
}

/// Write the corpus summary to `<output_root>/summary.json`.
pub fn write_summary(output_root: &Path, summary: &CorpusSummary) -> Result<PathBuf> {
    fs::create_dir_all(output_root)?;
    let path = output_root.join(SUMMARY_FILE_NAME);
    fs::write(&path, serde_json::to_string_pretty(summary)?)?;
    Ok(path)
}
