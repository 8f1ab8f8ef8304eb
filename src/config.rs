// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Pipeline configuration.
//!
//! This module defines the [`PipelineConfig`] struct, which controls the
//! dataset split, the detection filter, and the multi-pass inference count.

/// Configuration for the preprocessing pipeline.
///
/// Uses a builder pattern for convenient construction.
///
/// # Example
///
/// ```rust
/// use pose_preprocess::PipelineConfig;
///
/// let config = PipelineConfig::new()
///     .with_train_ratio(0.8)
///     .with_seed(42)
///     .with_detection_threshold(0.1)
///     .with_inference_count(3);
/// ```
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Fraction of each class's images assigned to the train split, in (0, 1].
    pub train_ratio: f32,
    /// Seed for the split shuffle. Same seed, same split.
    pub seed: u64,
    /// Minimum acceptable confidence for the worst-scoring keypoint (0.0 to 1.0).
    /// Images whose pose falls below this are skipped.
    pub detection_threshold: f32,
    /// Total number of inference passes per image. The first pass searches
    /// the full frame; later passes refine around the previous detection.
    pub inference_count: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            train_ratio: 0.8,
            seed: 42,
            detection_threshold: 0.1,
            inference_count: 3,
        }
    }
}

impl PipelineConfig {
    /// Create a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the train split ratio.
    #[must_use]
    pub const fn with_train_ratio(mut self, ratio: f32) -> Self {
        self.train_ratio = ratio;
        self
    }

    /// Set the shuffle seed.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the detection threshold.
    #[must_use]
    pub const fn with_detection_threshold(mut self, threshold: f32) -> Self {
        self.detection_threshold = threshold;
        self
    }

    /// Set the number of inference passes per image.
    #[must_use]
    pub const fn with_inference_count(mut self, count: usize) -> Self {
        self.inference_count = count;
        self
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the train ratio is outside (0, 1], the threshold
    /// is outside [0, 1], or the inference count is zero.
    pub fn validate(&self) -> crate::Result<()> {
        if !(self.train_ratio > 0.0 && self.train_ratio <= 1.0) {
            return Err(crate::PreprocessError::ConfigError(format!(
                "train_ratio must be in (0, 1], got {}",
                self.train_ratio
            )));
        }
        if !(0.0..=1.0).contains(&self.detection_threshold) {
            return Err(crate::PreprocessError::ConfigError(format!(
                "detection_threshold must be in [0, 1], got {}",
                self.detection_threshold
            )));
        }
        if self.inference_count == 0 {
            return Err(crate::PreprocessError::ConfigError(
                "inference_count must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert!((config.train_ratio - 0.8).abs() < f32::EPSILON);
        assert_eq!(config.seed, 42);
        assert!((config.detection_threshold - 0.1).abs() < f32::EPSILON);
        assert_eq!(config.inference_count, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = PipelineConfig::new()
            .with_train_ratio(0.7)
            .with_seed(7)
            .with_detection_threshold(0.25)
            .with_inference_count(1);
        assert!((config.train_ratio - 0.7).abs() < f32::EPSILON);
        assert_eq!(config.seed, 7);
        assert!((config.detection_threshold - 0.25).abs() < f32::EPSILON);
        assert_eq!(config.inference_count, 1);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(PipelineConfig::new().with_train_ratio(0.0).validate().is_err());
        assert!(PipelineConfig::new().with_train_ratio(1.5).validate().is_err());
        assert!(
            PipelineConfig::new()
                .with_detection_threshold(1.5)
                .validate()
                .is_err()
        );
        assert!(PipelineConfig::new().with_inference_count(0).validate().is_err());
    }
}
