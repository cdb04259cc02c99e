//! # OCR Eval Core - Line-Level OCR Evaluation
//!
//! Scores OCR output against ground truth for document images transcribed
//! as page XML. Every ground-truth line is matched to the predicted line
//! with the highest bounding-box `IoU`. Two metrics are computed per page:
//!
//! - **Text distance**: per-line Levenshtein distance between the matched
//!   strings, normalized by the ground-truth length and averaged over the page
//! - **Order distance**: Levenshtein distance between the ground-truth and
//!   predicted reading-order sequences, normalized by the ordered line count
//!
//! Page scores are averaged per document, and document averages are averaged
//! over the corpus. Corpus medians pool all page scores.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ocr_eval_core::{discover_sources, CorpusEvaluator, EvalOptions, InputSpec, Result};
//!
//! fn main() -> Result<()> {
//!     let input = InputSpec::directory("pred_root", "gt_root");
//!     input.validate()?;
//!
//!     let report = CorpusEvaluator::new(EvalOptions::default())
//!         .with_output_root(".output_dir")
//!         .with_parallel(true)
//!         .evaluate(discover_sources(&input)?)?;
//!
//!     let summary = report.summary();
//!     println!("text:  {}", summary.line_ocr_edit_distance_average);
//!     println!("order: {}", summary.line_order_edit_distance_average);
//!     Ok(())
//! }
//! ```
//!
//! ## In-Memory Evaluation
//!
//! ```rust
//! use ocr_eval_core::{evaluate_page, EvalOptions, Line, LineBox, LineType, Page};
//!
//! let line = |x, text: &str| Line::new(LineBox::new(x, 0, 20, 200), LineType::Body, text);
//! let gt = Page::new("0001.jpg", vec![line(100, "ABCD"), line(50, "EFGH")]);
//! let pred = Page::new("0001.jpg", vec![line(100, "ABCD"), line(50, "EFGX")]);
//!
//! let score = evaluate_page("R0000001", &pred, &gt, &EvalOptions::default());
//! assert_eq!(score.line_ocr_edit_distance_average, 0.125);
//! assert_eq!(score.normalized_line_order_edit_distance, 0.0);
//! ```

pub mod classify;
pub mod config;
pub mod corpus;
pub mod diagnostics;
pub mod document;
pub mod error;
pub mod line;
pub mod page;
pub mod report;
pub mod stats;
pub mod types;
pub mod xml;

pub use config::{EvalOptions, InputSpec, InputStructure, LineTypeRules, OrderPolicy, TypeRule};
pub use corpus::{
    aggregate, discover_sources, CorpusEvaluator, CorpusReport, CorpusSummary, Discovery,
    SourcedMedian, INVALID_AVERAGE,
};
pub use diagnostics::Diagnostic;
pub use document::{evaluate_document, evaluate_source, DocumentScore, DocumentSource};
pub use error::{EvalError, Result};
pub use page::{evaluate_page, PageScore};
pub use report::{
    create_unique_dir, create_unique_dir_with, write_document_report, write_summary,
    DocumentReport,
};
pub use types::{Document, InlineKind, Line, LineBox, LineType, Page};
pub use xml::{load_document, parse_document};
