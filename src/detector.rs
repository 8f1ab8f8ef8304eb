// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Pose landmark detection via ONNX Runtime.
//!
//! This module provides the [`PoseDetector`] struct wrapping a MoveNet
//! Thunder session. Detection is multi-pass: the first pass searches the
//! full frame, and each following pass re-runs the model on a crop around
//! the previous detection. The crop refinement is the wrapped model's
//! documented accuracy technique for off-center subjects; the detector
//! only sequences the passes and keeps the final result.

use std::path::Path;

use image::{RgbImage, imageops};
use ndarray::ArrayViewD;
use ort::session::Session;
use ort::session::builder::GraphOptimizationLevel;
use ort::value::Tensor;

use crate::bodypart::{BodyPart, Keypoint, Pose};
use crate::error::{PreprocessError, Result};
use crate::preprocessing::{INPUT_SIZE, image_to_tensor};

/// Model input tensor name.
const INPUT_NAME: &str = "serving_default_input_0";

/// Model output tensor name.
const OUTPUT_NAME: &str = "StatefulPartitionedCall_0";

/// Minimum keypoint score for a landmark to anchor the next crop region.
const MIN_CROP_KEYPOINT_SCORE: f32 = 0.2;

/// Expansion factor applied to the keypoint bounding box when cropping.
const CROP_EXPANSION: f32 = 1.25;

/// Crop region in coordinates normalized to the input frame (0.0 to 1.0).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropRegion {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl CropRegion {
    /// Full-frame region.
    #[must_use]
    pub const fn full() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: 1.0,
            height: 1.0,
        }
    }

    /// Whether this region covers the whole frame.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.width >= 1.0 && self.height >= 1.0
    }
}

/// Compute the next crop region from a detected pose.
///
/// Takes the bounding box of keypoints scoring at least
/// `MIN_CROP_KEYPOINT_SCORE` (two are required, otherwise the full frame
/// is returned), expands it about its center, squares it, and clips it to
/// the frame.
#[must_use]
pub fn refine_crop_region(pose: &Pose) -> CropRegion {
    let frame = INPUT_SIZE as f32;

    let mut min_x = f32::MAX;
    let mut min_y = f32::MAX;
    let mut max_x = f32::MIN;
    let mut max_y = f32::MIN;
    let mut count = 0u32;

    for kp in &pose.keypoints {
        if kp.score >= MIN_CROP_KEYPOINT_SCORE {
            min_x = min_x.min(kp.x);
            min_y = min_y.min(kp.y);
            max_x = max_x.max(kp.x);
            max_y = max_y.max(kp.y);
            count += 1;
        }
    }

    if count < 2 {
        return CropRegion::full();
    }

    let cx = (min_x + max_x) / 2.0;
    let cy = (min_y + max_y) / 2.0;
    let side = ((max_x - min_x).max(max_y - min_y) * CROP_EXPANSION).max(1.0);

    let mut x = cx - side / 2.0;
    let mut y = cy - side / 2.0;
    x = x.max(0.0);
    y = y.max(0.0);
    let width = side.min(frame - x);
    let height = side.min(frame - y);

    CropRegion {
        x: x / frame,
        y: y / frame,
        width: width / frame,
        height: height / frame,
    }
}

/// Remap keypoints normalized to a crop region into frame pixel coordinates.
#[must_use]
pub fn remap_keypoints(raw: &[(f32, f32, f32); BodyPart::COUNT], region: &CropRegion) -> Pose {
    let frame = INPUT_SIZE as f32;
    let mut keypoints = [Keypoint::default(); BodyPart::COUNT];

    for (i, &(y, x, score)) in raw.iter().enumerate() {
        keypoints[i] = Keypoint::new(
            (region.x + x * region.width) * frame,
            (region.y + y * region.height) * frame,
            score,
        );
    }

    Pose::new(keypoints)
}

/// Anything that turns a 256x256 RGB frame into a [`Pose`].
///
/// [`PoseDetector`] is the production implementation; the trait is the
/// seam the per-class processor runs against, so extraction logic can be
/// exercised without a model session.
pub trait LandmarkDetector {
    /// Detect a pose in a 256x256 RGB frame.
    ///
    /// # Errors
    ///
    /// Returns an error if the frame has the wrong dimensions or
    /// inference fails.
    fn detect(&mut self, image: &RgbImage) -> Result<Pose>;
}

/// MoveNet pose detector.
///
/// Holds the ONNX Runtime session and the crop region carried between
/// passes. The detector is stateful across passes of a single
/// [`detect`](LandmarkDetector::detect) call only; every call starts from
/// a full-frame search.
#[derive(Debug)]
pub struct PoseDetector {
    /// ONNX Runtime session.
    session: Session,
    /// Crop region refined by the previous pass.
    crop_region: Option<CropRegion>,
    /// Total passes per image.
    inference_count: usize,
}

impl PoseDetector {
    /// Load the pose model from an ONNX file.
    ///
    /// # Errors
    ///
    /// Returns an error if the model file doesn't exist or can't be loaded.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(PreprocessError::ModelLoadError(format!(
                "Model file not found: {}",
                path.display()
            )));
        }

        let session = Session::builder()
            .map_err(|e| {
                PreprocessError::ModelLoadError(format!("Failed to create session builder: {e}"))
            })?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| {
                PreprocessError::ModelLoadError(format!("Failed to set optimization level: {e}"))
            })?
            .commit_from_file(path)
            .map_err(|e| {
                PreprocessError::ModelLoadError(format!(
                    "Failed to load {}: {e}",
                    path.display()
                ))
            })?;

        Ok(Self {
            session,
            crop_region: None,
            inference_count: 3,
        })
    }

    /// Set the total number of inference passes per image.
    #[must_use]
    pub fn with_inference_count(mut self, count: usize) -> Self {
        self.inference_count = count.max(1);
        self
    }

    /// Run a single inference pass.
    ///
    /// With `reset_crop_region` the model searches the full frame;
    /// otherwise it runs on the region refined by the previous pass.
    fn detect_pass(&mut self, image: &RgbImage, reset_crop_region: bool) -> Result<Pose> {
        let region = if reset_crop_region {
            CropRegion::full()
        } else {
            self.crop_region.unwrap_or_else(CropRegion::full)
        };

        let tensor = if region.is_full() {
            image_to_tensor(image)?
        } else {
            let frame = INPUT_SIZE as f32;
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let (cx, cy) = ((region.x * frame) as u32, (region.y * frame) as u32);
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let cw = ((region.width * frame) as u32).max(1);
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let ch = ((region.height * frame) as u32).max(1);

            let cropped = imageops::crop_imm(image, cx, cy, cw, ch).to_image();
            let resized = imageops::resize(
                &cropped,
                INPUT_SIZE,
                INPUT_SIZE,
                imageops::FilterType::Triangle,
            );
            image_to_tensor(&resized)?
        };

        let input_tensor = Tensor::from_array(tensor)?;
        let outputs = self.session.run(ort::inputs![INPUT_NAME => input_tensor])?;

        let output: ArrayViewD<f32> = outputs[OUTPUT_NAME].try_extract_array()?;
        let raw = extract_keypoints(&output)?;

        let pose = remap_keypoints(&raw, &region);
        self.crop_region = Some(refine_crop_region(&pose));
        Ok(pose)
    }
}

impl LandmarkDetector for PoseDetector {
    /// Runs one full-frame pass followed by `inference_count - 1`
    /// crop-refined passes; intermediate results are discarded.
    fn detect(&mut self, image: &RgbImage) -> Result<Pose> {
        if image.dimensions() != (INPUT_SIZE, INPUT_SIZE) {
            return Err(PreprocessError::ImageError(format!(
                "Detector expects {INPUT_SIZE}x{INPUT_SIZE} input, got {}x{}",
                image.width(),
                image.height()
            )));
        }

        let mut pose = self.detect_pass(image, true)?;
        for _ in 1..self.inference_count {
            pose = self.detect_pass(image, false)?;
        }
        Ok(pose)
    }
}

/// Pull `(y, x, score)` triples out of the raw model output.
///
/// The output layout must be exactly `[1, 1, 17, 3]`, normalized to the
/// crop; anything else is an inference error, never a panic.
fn extract_keypoints(output: &ArrayViewD<f32>) -> Result<[(f32, f32, f32); BodyPart::COUNT]> {
    if output.shape() != [1, 1, BodyPart::COUNT, 3] {
        return Err(PreprocessError::InferenceError(format!(
            "Unexpected output shape {:?}",
            output.shape()
        )));
    }

    let mut raw = [(0.0f32, 0.0f32, 0.0f32); BodyPart::COUNT];
    for (i, slot) in raw.iter_mut().enumerate() {
        *slot = (output[[0, 0, i, 0]], output[[0, 0, i, 1]], output[[0, 0, i, 2]]);
    }
    Ok(raw)
}
