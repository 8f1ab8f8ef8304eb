// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

use std::path::Path;
use std::process;

use crate::aggregate::combine_tables;
use crate::config::PipelineConfig;
use crate::detector::PoseDetector;
use crate::download::ensure_model;
use crate::processor::{Diagnostic, Preprocessor};
use crate::split::split_dataset;
use crate::{Result, error, info, section, success, verbose};

use crate::cli::args::{ProcessArgs, RunArgs, SplitArgs};

/// Diagnostics listed in full before the remainder is summarized as a count.
const MAX_REPORTED_DIAGNOSTICS: usize = 10;

/// Run the full pipeline: split, then extract and aggregate both splits.
pub fn run_pipeline(args: &RunArgs) {
    crate::cli::logging::set_verbose(args.verbose);

    let config = PipelineConfig::new()
        .with_train_ratio(args.train_ratio)
        .with_seed(args.seed)
        .with_detection_threshold(args.threshold)
        .with_inference_count(args.inference_count);
    if let Err(e) = config.validate() {
        error!("{e}");
        process::exit(1);
    }

    let mut detector = load_detector(&args.model_dir, config.inference_count);

    section!("Splitting dataset into train/test...");
    let summaries =
        match split_dataset(&args.source, &args.output, config.train_ratio, config.seed) {
            Ok(s) => s,
            Err(e) => {
                error!("{e}");
                process::exit(1);
            }
        };
    for summary in &summaries {
        verbose!(
            "  {}: {} train, {} test",
            summary.class_name,
            summary.train,
            summary.test
        );
    }

    let output_root = Path::new(&args.output);
    for split in ["train", "test"] {
        section!("Processing {split} data...");
        let images_dir = output_root.join(split);
        let csv_dir = output_root.join("csv_per_pose").join(split);
        let combined_out = output_root.join(format!("{split}_data.csv"));

        if let Err(e) = process_split(
            &mut detector,
            &images_dir,
            &csv_dir,
            &combined_out,
            config.detection_threshold,
        ) {
            error!("{e}");
            process::exit(1);
        }
    }

    success!("Preprocessing completed");
}

/// Run the splitter only.
pub fn run_split(args: &SplitArgs) {
    let config = PipelineConfig::new()
        .with_train_ratio(args.train_ratio)
        .with_seed(args.seed);
    if let Err(e) = config.validate() {
        error!("{e}");
        process::exit(1);
    }

    let summaries =
        match split_dataset(&args.source, &args.output, config.train_ratio, config.seed) {
            Ok(s) => s,
            Err(e) => {
                error!("{e}");
                process::exit(1);
            }
        };

    for summary in &summaries {
        info!(
            "  {}: {} train, {} test",
            summary.class_name,
            summary.train,
            summary.test
        );
    }
    success!("Split {} classes into {}", summaries.len(), args.output);
}

/// Extract landmarks and aggregate one existing images tree.
pub fn run_process(args: &ProcessArgs) {
    crate::cli::logging::set_verbose(args.verbose);

    let config = PipelineConfig::new()
        .with_detection_threshold(args.threshold)
        .with_inference_count(args.inference_count);
    if let Err(e) = config.validate() {
        error!("{e}");
        process::exit(1);
    }

    let mut detector = load_detector(&args.model_dir, config.inference_count);

    if let Err(e) = process_split(
        &mut detector,
        Path::new(&args.images),
        Path::new(&args.csv_dir),
        Path::new(&args.out),
        config.detection_threshold,
    ) {
        error!("{e}");
        process::exit(1);
    }

    success!("Preprocessing completed");
}

/// Fetch the model if needed and load the detector, or exit.
fn load_detector(model_dir: &str, inference_count: usize) -> PoseDetector {
    let model_path = match ensure_model(model_dir) {
        Ok(p) => p,
        Err(e) => {
            error!("{e}");
            process::exit(1);
        }
    };

    match PoseDetector::load(&model_path) {
        Ok(d) => d.with_inference_count(inference_count),
        Err(e) => {
            error!("{e}");
            process::exit(1);
        }
    }
}

/// Extract landmarks for one images tree and merge its per-class tables.
fn process_split(
    detector: &mut PoseDetector,
    images_dir: &Path,
    csv_dir: &Path,
    combined_out: &Path,
    detection_threshold: f32,
) -> Result<()> {
    let preprocessor = Preprocessor::new(images_dir, csv_dir)?;
    info!("Found {} pose classes", preprocessor.class_names().len());

    let outcome = preprocessor.process(detector, detection_threshold)?;
    for report in &outcome.reports {
        info!(
            "  {}: valid images {}/{}",
            report.class_name, report.valid, report.total
        );
    }
    report_diagnostics(&outcome.diagnostics);

    let rows = combine_tables(csv_dir, preprocessor.class_names(), combined_out)?;
    info!("Combined CSV saved to: {}", combined_out.display());
    info!("Total samples: {rows}");
    Ok(())
}

/// Print the first few skip reasons and summarize the rest.
fn report_diagnostics(diagnostics: &[Diagnostic]) {
    if diagnostics.is_empty() {
        return;
    }

    info!("\nWarnings/Errors ({}):", diagnostics.len());
    for diag in diagnostics.iter().take(MAX_REPORTED_DIAGNOSTICS) {
        info!("  Skipped {}: {}", diag.path.display(), diag.reason);
    }
    if diagnostics.len() > MAX_REPORTED_DIAGNOSTICS {
        info!("  ... and {} more", diagnostics.len() - MAX_REPORTED_DIAGNOSTICS);
    }
}
