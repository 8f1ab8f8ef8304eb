// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

#![allow(clippy::multiple_crate_versions)]

//! # Pose Dataset Preprocessing Library
//!
//! Batch preprocessing for human-pose image datasets: splits raw
//! class-labeled image folders into train/test trees, runs a MoveNet
//! Thunder landmark detector over every image via ONNX Runtime, filters
//! low-confidence detections, and emits per-class and combined CSV tables
//! of landmark coordinates for a downstream classifier.
//!
//! ## Quick Start (Library)
//!
//! ```no_run
//! use pose_preprocess::{PoseDetector, Preprocessor, combine_tables, ensure_model};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let model_path = ensure_model(".")?;
//!     let mut detector = PoseDetector::load(&model_path)?.with_inference_count(3);
//!
//!     let preprocessor = Preprocessor::new("pose_dataset/train", "csv_per_pose/train")?;
//!     let outcome = preprocessor.process(&mut detector, 0.1)?;
//!     for report in &outcome.reports {
//!         println!("{}: {}/{} valid", report.class_name, report.valid, report.total);
//!     }
//!
//!     let rows = combine_tables(
//!         "csv_per_pose/train",
//!         preprocessor.class_names(),
//!         "train_data.csv",
//!     )?;
//!     println!("Combined {rows} samples");
//!     Ok(())
//! }
//! ```
//!
//! ## Quick Start (CLI)
//!
//! ```bash
//! pose-preprocess run --source ~/datasets/yoga_poses --output pose_dataset
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`split`] | Seeded train/test dataset splitting |
//! | [`detector`] | [`PoseDetector`] multi-pass crop-refined inference |
//! | [`processor`] | [`Preprocessor`] per-class landmark extraction |
//! | [`aggregate`] | Combined-table merging with canonical headers |
//! | [`bodypart`] | Landmark schema ([`BodyPart`], [`Keypoint`], [`Pose`]) |
//! | [`preprocessing`] | Decode, channel check, pad-resize, tensor conversion |
//! | [`download`] | One-time pose model fetch |
//! | [`config`] | [`PipelineConfig`] for customizing pipeline settings |
//! | [`error`] | Error types ([`PreprocessError`], [`Result`]) |

// Modules
pub mod aggregate;
pub mod bodypart;
pub mod cli;
pub mod config;
pub mod detector;
pub mod download;
pub mod error;
pub mod preprocessing;
pub mod processor;
pub mod split;

// Re-export main types for convenience
pub use aggregate::{combine_tables, combined_header};
pub use bodypart::{BodyPart, Keypoint, Pose};
pub use config::PipelineConfig;
pub use detector::{CropRegion, LandmarkDetector, PoseDetector};
pub use download::ensure_model;
pub use error::{PreprocessError, Result};
pub use processor::{ClassReport, Diagnostic, Preprocessor, ProcessOutcome};
pub use split::{ClassSplit, split_dataset};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(VERSION.contains('.'));
    }

    #[test]
    fn test_name() {
        assert_eq!(NAME, "pose-preprocess");
    }
}
