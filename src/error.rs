// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Error types for the preprocessing pipeline.

use std::fmt;

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, PreprocessError>;

/// Main error type for the preprocessing pipeline.
#[derive(Debug)]
pub enum PreprocessError {
    /// Error downloading or loading the ONNX model.
    ModelLoadError(String),
    /// Error during model inference.
    InferenceError(String),
    /// Error decoding or transforming images.
    ImageError(String),
    /// Invalid configuration provided.
    ConfigError(String),
    /// Error splitting the source dataset.
    SplitError(String),
    /// Column-count inconsistency while merging per-class tables.
    AggregationError(String),
    /// Error reading or writing CSV tables.
    CsvError(String),
    /// IO error (file not found, permission denied, etc.).
    IoError(String),
    /// Wrapped `std::io::Error`
    Io(std::io::Error),
}

impl fmt::Display for PreprocessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ModelLoadError(msg) => write!(f, "Model load error: {msg}"),
            Self::InferenceError(msg) => write!(f, "Inference error: {msg}"),
            Self::ImageError(msg) => write!(f, "Image error: {msg}"),
            Self::ConfigError(msg) => write!(f, "Config error: {msg}"),
            Self::SplitError(msg) => write!(f, "Split error: {msg}"),
            Self::AggregationError(msg) => write!(f, "Aggregation error: {msg}"),
            Self::CsvError(msg) => write!(f, "CSV error: {msg}"),
            Self::IoError(msg) => write!(f, "IO error: {msg}"),
            Self::Io(err) => write!(f, "IO error: {err}"),
        }
    }
}

impl std::error::Error for PreprocessError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for PreprocessError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<image::ImageError> for PreprocessError {
    fn from(err: image::ImageError) -> Self {
        Self::ImageError(err.to_string())
    }
}

impl From<csv::Error> for PreprocessError {
    fn from(err: csv::Error) -> Self {
        Self::CsvError(err.to_string())
    }
}

impl From<ort::Error> for PreprocessError {
    fn from(err: ort::Error) -> Self {
        Self::InferenceError(err.to_string())
    }
}
