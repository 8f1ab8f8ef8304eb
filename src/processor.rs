// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Per-class landmark extraction.
//!
//! This module provides the [`Preprocessor`] struct, which walks one
//! split's class folders, runs the detector over every image, filters
//! low-confidence detections, and writes one CSV table per class.
//!
//! Per-image failures never escape this boundary: each becomes a
//! [`Diagnostic`] in the returned [`ProcessOutcome`] and processing
//! continues with the next image.

use std::fs;
use std::path::{Path, PathBuf};

use indicatif::{ProgressBar, ProgressStyle};

use crate::detector::LandmarkDetector;
use crate::error::{PreprocessError, Result};
use crate::preprocessing::{channel_count, decode_image, resize_with_pad};
use crate::split::{collect_image_names, list_pose_classes};

/// One skipped image and the reason it was skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Path of the skipped image.
    pub path: PathBuf,
    /// Human-readable skip reason.
    pub reason: String,
}

/// Valid/total counts for one processed class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassReport {
    /// Class name.
    pub class_name: String,
    /// Images that produced a landmark row.
    pub valid: usize,
    /// Images examined.
    pub total: usize,
}

/// Everything a processing run produced besides the CSV files themselves.
#[derive(Debug, Clone, Default)]
pub struct ProcessOutcome {
    /// Per-class valid/total counts, in class order.
    pub reports: Vec<ClassReport>,
    /// All per-image skip reasons, in processing order.
    pub diagnostics: Vec<Diagnostic>,
}

/// Landmark extractor for one images tree (one split).
pub struct Preprocessor {
    /// Root containing one subdirectory per class.
    images_in_dir: PathBuf,
    /// Directory receiving one `<class>.csv` per class.
    csvs_out_dir: PathBuf,
    /// Sorted class names, fixed at construction.
    class_names: Vec<String>,
}

impl Preprocessor {
    /// Create a preprocessor over an images tree.
    ///
    /// Classes are enumerated once, in sorted order, and stay fixed for
    /// the lifetime of the preprocessor.
    ///
    /// # Errors
    ///
    /// Returns an error if the images root is missing or the output
    /// directory can't be created.
    pub fn new<P: AsRef<Path>, Q: AsRef<Path>>(images_in_dir: P, csvs_out_dir: Q) -> Result<Self> {
        let images_in_dir = images_in_dir.as_ref().to_path_buf();
        let csvs_out_dir = csvs_out_dir.as_ref().to_path_buf();

        let class_names = list_pose_classes(&images_in_dir)?;
        fs::create_dir_all(&csvs_out_dir)?;

        Ok(Self {
            images_in_dir,
            csvs_out_dir,
            class_names,
        })
    }

    /// Sorted class names discovered at construction.
    #[must_use]
    pub fn class_names(&self) -> &[String] {
        &self.class_names
    }

    /// Directory holding the per-class CSV tables.
    #[must_use]
    pub fn csvs_out_dir(&self) -> &Path {
        &self.csvs_out_dir
    }

    /// Run landmark extraction for every class.
    ///
    /// Writes `<csvs_out_dir>/<class>.csv` for each class (headerless, one
    /// row per kept image) and returns per-class counts plus diagnostics
    /// for every skipped image.
    ///
    /// # Errors
    ///
    /// Returns an error only for failures outside the per-image path:
    /// unreadable class directories or CSV write failures.
    pub fn process<D: LandmarkDetector>(
        &self,
        detector: &mut D,
        detection_threshold: f32,
    ) -> Result<ProcessOutcome> {
        let mut outcome = ProcessOutcome::default();

        for class_name in &self.class_names {
            let class_dir = self.images_in_dir.join(class_name);
            let csv_out_path = self.csvs_out_dir.join(format!("{class_name}.csv"));

            let image_names = collect_image_names(&class_dir)?;
            let mut writer = csv::Writer::from_path(&csv_out_path)?;

            let pb = create_progress_bar(image_names.len() as u64, class_name);
            let mut valid = 0usize;

            for image_name in &image_names {
                let image_path = class_dir.join(image_name);

                match extract_row(&image_path, detector, detection_threshold) {
                    Ok(values) => {
                        let mut record = Vec::with_capacity(values.len() + 1);
                        record.push(image_name.clone());
                        record.extend(values.iter().map(ToString::to_string));
                        writer.write_record(&record)?;
                        valid += 1;
                    }
                    Err(reason) => {
                        outcome.diagnostics.push(Diagnostic {
                            path: image_path,
                            reason,
                        });
                    }
                }
                pb.inc(1);
            }

            writer.flush().map_err(|e| {
                PreprocessError::CsvError(format!(
                    "Failed to flush {}: {e}",
                    csv_out_path.display()
                ))
            })?;
            pb.finish_and_clear();

            outcome.reports.push(ClassReport {
                class_name: class_name.clone(),
                valid,
                total: image_names.len(),
            });
        }

        Ok(outcome)
    }
}

/// Run the per-image pipeline, returning flattened landmark values or a
/// skip reason.
///
/// Every failure mode maps to a reason string; nothing here is allowed to
/// abort the surrounding class loop.
fn extract_row<D: LandmarkDetector>(
    image_path: &Path,
    detector: &mut D,
    detection_threshold: f32,
) -> std::result::Result<Vec<f32>, String> {
    let bytes = fs::read(image_path).map_err(|e| format!("Invalid image - {e}"))?;
    let image = decode_image(&bytes).map_err(|e| format!("Invalid image - {e}"))?;

    if channel_count(&image) != 3 {
        return Err("Image is not RGB".to_string());
    }

    let frame = resize_with_pad(&image);
    let pose = detector
        .detect(&frame)
        .map_err(|e| format!("Detection failed - {e}"))?;

    let min_landmark_score = pose.min_score();
    if min_landmark_score < detection_threshold {
        return Err(format!(
            "Keypoints score below threshold ({min_landmark_score:.3})"
        ));
    }

    Ok(pose.flatten())
}

/// Per-class progress bar layout. The class name is shown via `{prefix}`
/// so it is never parsed as template syntax.
const PROGRESS_TEMPLATE: &str = "  {spinner:.green} [{prefix}] [{bar:40.cyan/blue}] {pos}/{len}";

/// Create a per-class progress bar.
fn create_progress_bar(len: u64, label: &str) -> ProgressBar {
    let pb = ProgressBar::new(len);
    if let Ok(style) = ProgressStyle::default_bar().template(PROGRESS_TEMPLATE) {
        pb.set_style(style.progress_chars("#>-"));
    }
    pb.set_prefix(label.to_string());
    pb
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use image::RgbImage;

    use super::*;
    use crate::bodypart::{BodyPart, Keypoint, Pose};

    /// Replays a queue of per-image minimum scores; every keypoint of a
    /// detection carries the same score. Falls back to 0.9 once the queue
    /// is drained.
    struct ScriptedDetector {
        scores: VecDeque<f32>,
    }

    impl ScriptedDetector {
        fn new(scores: &[f32]) -> Self {
            Self {
                scores: scores.iter().copied().collect(),
            }
        }
    }

    impl LandmarkDetector for ScriptedDetector {
        fn detect(&mut self, _image: &RgbImage) -> Result<Pose> {
            let score = self.scores.pop_front().unwrap_or(0.9);
            let mut keypoints = [Keypoint::default(); BodyPart::COUNT];
            for (i, kp) in keypoints.iter_mut().enumerate() {
                *kp = Keypoint::new(i as f32, 256.0 - i as f32, score);
            }
            Ok(Pose::new(keypoints))
        }
    }

    fn write_rgb_png(path: &Path) {
        image::RgbImage::from_pixel(16, 16, image::Rgb([40, 80, 120]))
            .save(path)
            .unwrap();
    }

    fn write_gray_png(path: &Path) {
        image::GrayImage::from_pixel(16, 16, image::Luma([128]))
            .save(path)
            .unwrap();
    }

    #[test]
    fn test_new_requires_images_dir() {
        let out = tempfile::tempdir().unwrap();
        let result = Preprocessor::new("missing/images", out.path());
        assert!(result.is_err());
    }

    #[test]
    fn test_new_enumerates_sorted_classes() {
        let images = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        for class in ["warrior", "chair"] {
            fs::create_dir(images.path().join(class)).unwrap();
        }

        let preprocessor = Preprocessor::new(images.path(), out.path().join("csv")).unwrap();
        assert_eq!(preprocessor.class_names(), ["chair", "warrior"]);
        assert!(out.path().join("csv").is_dir());
    }

    #[test]
    fn test_invalid_bytes_rejected_before_detection() {
        // A mislabeled file never reaches the detector: the format sniff
        // rejects it first.
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.jpg");
        fs::write(&path, b"not a jpeg").unwrap();

        let bytes = fs::read(&path).unwrap();
        let reason = decode_image(&bytes)
            .map_err(|e| format!("Invalid image - {e}"))
            .unwrap_err();
        assert!(reason.contains("Invalid image"));
    }

    #[test]
    fn test_process_writes_rows_and_skips_non_rgb() {
        let images = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let class_dir = images.path().join("tree");
        fs::create_dir(&class_dir).unwrap();
        for i in 0..8 {
            let path = class_dir.join(format!("img{i}.png"));
            if i == 3 {
                write_gray_png(&path);
            } else {
                write_rgb_png(&path);
            }
        }

        let preprocessor = Preprocessor::new(images.path(), out.path()).unwrap();
        let mut detector = ScriptedDetector::new(&[]);
        let outcome = preprocessor.process(&mut detector, 0.1).unwrap();

        assert_eq!(outcome.reports.len(), 1);
        assert_eq!(outcome.reports[0].class_name, "tree");
        assert_eq!(outcome.reports[0].valid, 7);
        assert_eq!(outcome.reports[0].total, 8);

        assert_eq!(outcome.diagnostics.len(), 1);
        assert!(outcome.diagnostics[0].path.ends_with("tree/img3.png"));
        assert_eq!(outcome.diagnostics[0].reason, "Image is not RGB");

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .from_path(out.path().join("tree.csv"))
            .unwrap();
        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 7);
        for row in &rows {
            assert_eq!(row.len(), 1 + BodyPart::COUNT * 3);
            assert!(row[0].starts_with("img"));
        }
        assert!(rows.iter().all(|row| &row[0] != "img3.png"));
    }

    #[test]
    fn test_process_skips_low_score_detections() {
        let images = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let class_dir = images.path().join("chair");
        fs::create_dir(&class_dir).unwrap();
        write_rgb_png(&class_dir.join("a.png"));
        write_rgb_png(&class_dir.join("b.png"));

        let preprocessor = Preprocessor::new(images.path(), out.path()).unwrap();
        let mut detector = ScriptedDetector::new(&[0.05, 0.9]);
        let outcome = preprocessor.process(&mut detector, 0.1).unwrap();

        assert_eq!(outcome.reports[0].valid, 1);
        assert_eq!(outcome.reports[0].total, 2);
        assert_eq!(outcome.diagnostics.len(), 1);
        assert!(outcome.diagnostics[0].path.ends_with("chair/a.png"));
        // The score is rendered with three decimals in the reason.
        assert_eq!(
            outcome.diagnostics[0].reason,
            "Keypoints score below threshold (0.050)"
        );
    }

    #[test]
    fn test_progress_template_parses() {
        assert!(ProgressStyle::default_bar().template(PROGRESS_TEMPLATE).is_ok());
        // Braces in a class name must not break the bar layout.
        let pb = create_progress_bar(3, "tree{pose}");
        assert_eq!(pb.length(), Some(3));
    }
}
