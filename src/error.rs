// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Error types for the sign recognition library.

use std::fmt;

/// Result type alias for recognition operations.
pub type Result<T> = std::result::Result<T, GestureError>;

/// Main error type for the sign recognition library.
#[derive(Debug)]
pub enum GestureError {
    /// Landmark input is malformed (wrong point count or non-finite coordinate).
    InvalidInput(String),
    /// The landmark detector found no hand in the image.
    NoDetection,
    /// Every gesture in the catalog fell below its floor.
    NoMatch,
    /// The statistical classifier artifact is not loaded.
    ClassifierUnavailable(String),
    /// Gesture catalog could not be parsed or failed validation.
    CatalogError(String),
    /// Error loading an ONNX model.
    ModelLoadError(String),
    /// Error while running the landmark detector or classifier.
    DetectionError(String),
    /// Error decoding or processing images.
    ImageError(String),
    /// Invalid configuration provided.
    ConfigError(String),
    /// Wrapped `std::io::Error`
    Io(std::io::Error),
}

impl GestureError {
    /// Short machine-friendly name of the error kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "invalid_input",
            Self::NoDetection => "no_detection",
            Self::NoMatch => "no_match",
            Self::ClassifierUnavailable(_) => "classifier_unavailable",
            Self::CatalogError(_) => "catalog",
            Self::ModelLoadError(_) => "model_load",
            Self::DetectionError(_) => "detection",
            Self::ImageError(_) => "image",
            Self::ConfigError(_) => "config",
            Self::Io(_) => "io",
        }
    }
}

impl fmt::Display for GestureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidInput(msg) => write!(f, "Invalid input: {msg}"),
            Self::NoDetection => write!(f, "No hand detected"),
            Self::NoMatch => write!(f, "No gesture matched"),
            Self::ClassifierUnavailable(msg) => write!(f, "Classifier unavailable: {msg}"),
            Self::CatalogError(msg) => write!(f, "Catalog error: {msg}"),
            Self::ModelLoadError(msg) => write!(f, "Model load error: {msg}"),
            Self::DetectionError(msg) => write!(f, "Detection error: {msg}"),
            Self::ImageError(msg) => write!(f, "Image error: {msg}"),
            Self::ConfigError(msg) => write!(f, "Config error: {msg}"),
            Self::Io(err) => write!(f, "IO error: {err}"),
        }
    }
}

impl std::error::Error for GestureError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for GestureError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<image::ImageError> for GestureError {
    fn from(err: image::ImageError) -> Self {
        Self::ImageError(err.to_string())
    }
}

impl From<serde_json::Error> for GestureError {
    fn from(err: serde_json::Error) -> Self {
        Self::CatalogError(err.to_string())
    }
}
