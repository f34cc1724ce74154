// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Recognizer configuration.
//!
//! [`RecognizerConfig`] collects everything a deployment decides once at
//! startup: which catalog to load, which model artifacts to open, how the
//! landmark model is fed, and how signs are named in responses.

use std::path::PathBuf;

use crate::strategy::Strategy;

/// Default prefix prepended to gesture ids in responses.
pub const DEFAULT_NAMESPACE: &str = "ASL";

/// Default square input size of the hand-landmark model.
pub const DEFAULT_LANDMARKER_SIZE: u32 = 224;

/// Default minimum hand-presence score.
pub const DEFAULT_PRESENCE_THRESHOLD: f32 = 0.5;

/// Configuration for a [`crate::Recognizer`].
///
/// # Example
///
/// ```rust
/// use signspeak::RecognizerConfig;
///
/// let config = RecognizerConfig::new()
///     .with_namespace("ASL")
///     .with_presence_threshold(0.6)
///     .with_threads(2);
/// ```
#[derive(Debug, Clone)]
pub struct RecognizerConfig {
    /// Prefix joined to gesture ids with `_` in responses. Empty for none.
    pub namespace: String,
    /// Forced strategy. `None` selects automatically.
    pub strategy: Option<Strategy>,
    /// Gesture catalog file. `None` uses the built-in ASL catalog.
    pub catalog_path: Option<PathBuf>,
    /// ONNX hand-landmark model.
    pub landmarker_path: Option<PathBuf>,
    /// Square input size of the landmark model.
    pub landmarker_size: u32,
    /// Whether the landmark model takes NHWC input (NCHW otherwise).
    pub channels_last: bool,
    /// Minimum hand-presence score below which no hand is reported.
    pub presence_threshold: f32,
    /// ONNX sign classifier model.
    pub classifier_path: Option<PathBuf>,
    /// JSON labels file for the classifier, when its metadata carries none.
    pub labels_path: Option<PathBuf>,
    /// Number of intra-op threads for ONNX Runtime. `0` lets it decide.
    pub num_threads: usize,
}

impl Default for RecognizerConfig {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            strategy: None,
            catalog_path: None,
            landmarker_path: None,
            landmarker_size: DEFAULT_LANDMARKER_SIZE,
            channels_last: true,
            presence_threshold: DEFAULT_PRESENCE_THRESHOLD,
            classifier_path: None,
            labels_path: None,
            num_threads: 0,
        }
    }
}

impl RecognizerConfig {
    /// Create a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the sign namespace.
    ///
    /// # Arguments
    ///
    /// * `namespace` - Prefix such as `"ASL"`; an empty string disables prefixing.
    #[must_use]
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Force a recognition strategy.
    #[must_use]
    pub const fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = Some(strategy);
        self
    }

    /// Load the gesture catalog from a JSON file.
    #[must_use]
    pub fn with_catalog(mut self, path: impl Into<PathBuf>) -> Self {
        self.catalog_path = Some(path.into());
        self
    }

    /// Use an ONNX hand-landmark model for image input.
    #[must_use]
    pub fn with_landmarker(mut self, path: impl Into<PathBuf>) -> Self {
        self.landmarker_path = Some(path.into());
        self
    }

    /// Set the landmark model input size and tensor layout.
    ///
    /// # Arguments
    ///
    /// * `size` - Square input edge in pixels.
    /// * `channels_last` - `true` for NHWC, `false` for NCHW.
    #[must_use]
    pub const fn with_landmarker_input(mut self, size: u32, channels_last: bool) -> Self {
        self.landmarker_size = size;
        self.channels_last = channels_last;
        self
    }

    /// Set the minimum hand-presence score.
    #[must_use]
    pub const fn with_presence_threshold(mut self, threshold: f32) -> Self {
        self.presence_threshold = threshold;
        self
    }

    /// Use an ONNX sign classifier.
    #[must_use]
    pub fn with_classifier(mut self, path: impl Into<PathBuf>) -> Self {
        self.classifier_path = Some(path.into());
        self
    }

    /// Read classifier labels from a JSON file.
    #[must_use]
    pub fn with_labels(mut self, path: impl Into<PathBuf>) -> Self {
        self.labels_path = Some(path.into());
        self
    }

    /// Set the number of ONNX Runtime intra-op threads.
    #[must_use]
    pub const fn with_threads(mut self, threads: usize) -> Self {
        self.num_threads = threads;
        self
    }

    /// Render a gesture id as a response sign, e.g. `A` → `ASL_A`.
    #[must_use]
    pub fn sign_name(&self, id: &str) -> String {
        namespaced(&self.namespace, id)
    }
}

/// Join a namespace and a gesture id with `_`. An empty namespace leaves the id as is.
#[must_use]
pub fn namespaced(namespace: &str, id: &str) -> String {
    if namespace.is_empty() {
        id.to_string()
    } else {
        format!("{namespace}_{id}")
    }
}
