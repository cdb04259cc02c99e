#![allow(
    clippy::fn_params_excessive_bools, // CLI has many boolean flags
    clippy::struct_excessive_bools,    // clap Args mirror the flags
    clippy::needless_pass_by_value,    // clap requires owned values
    clippy::must_use_candidate,        // CLI functions don't need must_use
)]

//! OCR Eval CLI - Line-level OCR evaluation tool
//!
//! Compares prediction XML against ground-truth XML, writes one report per
//! document and prints corpus averages and medians.

use anyhow::{bail, Context, Result};
use clap::Parser;
use colored::Colorize;
use ocr_eval_core::{
    create_unique_dir, discover_sources, write_summary, CorpusEvaluator, CorpusSummary,
    EvalOptions, InputSpec, InputStructure, SourcedMedian, INVALID_AVERAGE,
};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Project config file looked up in the working directory.
const PROJECT_CONFIG_FILE: &str = ".ocr-eval.toml";

/// Output root used when neither the CLI nor the config file sets one.
const DEFAULT_OUTPUT_ROOT: &str = ".output_dir";

/// Verbosity level for output control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Verbosity {
    /// Warnings and errors only
    Quiet,
    /// Per-document progress (default)
    Normal,
    /// Per-line and per-page details
    Verbose,
}

impl Verbosity {
    const fn from_flags(quiet: bool, verbose: bool) -> Self {
        if quiet {
            Self::Quiet
        } else if verbose {
            Self::Verbose
        } else {
            Self::Normal
        }
    }

    /// Default log filter, overridden by `RUST_LOG`.
    const fn log_filter(self) -> &'static str {
        match self {
            Self::Quiet => "warn",
            Self::Normal => "info",
            Self::Verbose => "debug",
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "ocr-eval")]
#[command(author, version, about = "Evaluate OCR line text and reading order against ground truth")]
#[command(long_about = "Evaluate OCR line text and reading order against ground truth.\n\
                  \n\
                  Inputs are either one prediction XML and one ground-truth XML, or two\n\
                  root directories holding <pid>/xml/*.sorted.xml (prediction) and\n\
                  <pid>/xml/*.xml (ground truth).\n\
                  \n\
                  Defaults can be set via a .ocr-eval.toml configuration file.")]
struct Args {
    /// Prediction XML file
    #[arg(long, value_name = "FILE", conflicts_with = "pred_data_root_dir")]
    pred_single_xml: Option<PathBuf>,

    /// Root directory of prediction documents
    #[arg(long, value_name = "DIR")]
    pred_data_root_dir: Option<PathBuf>,

    /// Ground-truth XML file
    #[arg(long, value_name = "FILE", conflicts_with = "gt_data_root_dir")]
    gt_single_xml: Option<PathBuf>,

    /// Root directory of ground-truth documents
    #[arg(long, value_name = "DIR")]
    gt_data_root_dir: Option<PathBuf>,

    /// Where reports are written (default: .output_dir, or from config)
    #[arg(long, value_name = "DIR")]
    output_root_dir: Option<PathBuf>,

    /// Minimum IoU for a predicted line to match a ground-truth line
    #[arg(long, value_name = "THRESHOLD")]
    iou_thresh: Option<f64>,

    /// Log exactly matching lines too
    #[arg(long)]
    correct_line_ocr_log: bool,

    /// Only evaluate body-text lines
    #[arg(long)]
    eval_main_text_only: bool,

    /// Include head-note and inset-note lines in reading-order scoring
    #[arg(long)]
    eval_annotation_line_order: bool,

    /// Exempt placeholder lines with any inline annotation
    #[arg(long)]
    ignore_inline_type_to_skip: bool,

    /// Keep predicted lines in the order sequence even when their ground truth is order-exempt
    #[arg(long)]
    eval_all_valid_pred_line: bool,

    /// Evaluate documents in parallel
    #[arg(long)]
    parallel: bool,

    /// Print the corpus summary as JSON
    #[arg(long)]
    json: bool,

    /// Configuration file (default: ./.ocr-eval.toml if present)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Only print warnings and errors
    #[arg(short, long)]
    quiet: bool,

    /// Show per-line and per-page details
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct Config {
    input: InputConfig,
    output: OutputConfig,
    /// Environment defaults apply when absent
    options: Option<EvalOptions>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct InputConfig {
    structure: Option<InputStructure>,
    pred: Option<PathBuf>,
    gt: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct OutputConfig {
    root_dir: Option<PathBuf>,
}

impl Config {
    /// Load configuration from file
    fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content).map_err(|e| {
            eprintln!(
                "{} Failed to parse config file: {}",
                "Error:".red().bold(),
                path.display()
            );
            eprintln!("{} {}", "Parse error:".yellow().bold(), e);
            eprintln!();
            eprintln!("{} Configuration file syntax:", "Help:".cyan().bold());
            eprintln!("  [input]");
            eprintln!("  structure = \"directory\"  # single or directory");
            eprintln!("  pred = \"pred_root\"");
            eprintln!("  gt = \"gt_root\"");
            eprintln!("  [options]");
            eprintln!("  iou_threshold = 0.5");
            anyhow::anyhow!("Failed to parse config file: {e}")
        })
    }

    /// Explicit `--config`, else the project config, else defaults.
    fn discover(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load_from_file(path),
            None => {
                let project = PathBuf::from(PROJECT_CONFIG_FILE);
                if project.exists() {
                    Self::load_from_file(&project)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }
}

/// One input side: CLI flags first, then the config file.
fn resolve_side(
    side: &str,
    single: Option<&PathBuf>,
    root: Option<&PathBuf>,
    config: &InputConfig,
    configured: Option<&PathBuf>,
) -> Result<(InputStructure, PathBuf)> {
    if let Some(path) = single {
        return Ok((InputStructure::Single, path.clone()));
    }
    if let Some(path) = root {
        return Ok((InputStructure::Directory, path.clone()));
    }
    match configured {
        Some(path) => Ok((config.structure.unwrap_or_default(), path.clone())),
        None => bail!(
            "no {side} input: pass --{side}-single-xml or --{side}-data-root-dir, or set [input] {side} in the config file"
        ),
    }
}

fn resolve_input(args: &Args, config: &InputConfig) -> Result<InputSpec> {
    let (pred_structure, pred) = resolve_side(
        "pred",
        args.pred_single_xml.as_ref(),
        args.pred_data_root_dir.as_ref(),
        config,
        config.pred.as_ref(),
    )?;
    let (gt_structure, gt) = resolve_side(
        "gt",
        args.gt_single_xml.as_ref(),
        args.gt_data_root_dir.as_ref(),
        config,
        config.gt.as_ref(),
    )?;

    if pred_structure != gt_structure {
        bail!(
            "prediction input is {pred_structure} but ground-truth input is {gt_structure}; both must be single files or both directories"
        );
    }

    let input = InputSpec {
        structure: pred_structure,
        pred,
        gt,
    };
    input.validate()?;
    Ok(input)
}

/// CLI flags layered over the config file's `[options]`.
fn resolve_options(args: &Args, mut options: EvalOptions) -> Result<EvalOptions> {
    if let Some(threshold) = args.iou_thresh {
        options.iou_threshold = threshold;
    }
    options.log_exact_matches |= args.correct_line_ocr_log;
    options.eval_main_text_only |= args.eval_main_text_only;
    options.eval_annotation_line_order |= args.eval_annotation_line_order;
    options.ignore_inline_type_to_skip |= args.ignore_inline_type_to_skip;
    options.eval_all_valid_pred_line |= args.eval_all_valid_pred_line;
    options.validate()?;
    Ok(options)
}

fn format_average(value: f64) -> String {
    if (value - INVALID_AVERAGE).abs() < f64::EPSILON {
        value.to_string().yellow().to_string()
    } else {
        value.to_string()
    }
}

fn format_median(median: Option<&SourcedMedian>) -> String {
    match median {
        Some(m) => format!("{} (pid={})", m.value, m.pids.join(", ")),
        None => format_average(INVALID_AVERAGE),
    }
}

fn print_summary(summary: &CorpusSummary) {
    println!(
        "### AVERAGE OF LINE OCR LEVEN DISTANCE : {}",
        format_average(summary.line_ocr_edit_distance_average)
    );
    println!(
        "### AVERAGE OF LINE ORDER LEVEN DISTANCE : {}",
        format_average(summary.line_order_edit_distance_average)
    );
    println!(
        "### MEDIAN OF LINE OCR LEVEN DISTANCE : {}",
        format_median(summary.line_ocr_edit_distance_median.as_ref())
    );
    println!(
        "### MEDIAN OF LINE ORDER LEVEN DISTANCE : {}",
        format_median(summary.line_order_edit_distance_median.as_ref())
    );
}

fn run(args: Args) -> Result<()> {
    let config = Config::discover(args.config.as_deref())?;
    let input = resolve_input(&args, &config.input)?;
    let options = resolve_options(&args, config.options.unwrap_or_else(EvalOptions::from_env))?;

    let output_root = args
        .output_root_dir
        .clone()
        .or(config.output.root_dir)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_ROOT));
    let output_root = create_unique_dir(&output_root).with_context(|| {
        format!("Failed to create output directory: {}", output_root.display())
    })?;
    log::info!("Output directory: {}", output_root.display());

    let discovery = discover_sources(&input)
        .with_context(|| format!("Failed to list documents under {}", input.pred.display()))?;
    let skipped = discovery.skipped.len();

    let report = CorpusEvaluator::new(options)
        .with_output_root(&output_root)
        .with_parallel(args.parallel)
        .evaluate(discovery)?;
    let summary = report.summary();
    let summary_path = write_summary(&output_root, &summary)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary);
    }

    if skipped > 0 {
        eprintln!(
            "{} {} document(s) skipped during discovery",
            "Warning:".yellow().bold(),
            skipped
        );
    }
    if !args.quiet {
        eprintln!(
            "{} Evaluated {} document(s), summary written to {}",
            "✓".green().bold(),
            report.documents.len(),
            summary_path.display()
        );
    }
    Ok(())
}

fn main() {
    let args = Args::parse();

    let verbosity = Verbosity::from_flags(args.quiet, args.verbose);
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(verbosity.log_filter()))
        .target(env_logger::Target::Stderr)
        .init();

    if let Err(e) = run(args) {
        eprintln!("{} {e:#}", "Error:".red().bold());
        std::process::exit(1);
    }
}
