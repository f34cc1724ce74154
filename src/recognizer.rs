// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Recognizer facade.
//!
//! [`Recognizer`] owns everything a deployment needs to answer a request: the
//! gesture matcher, an optional statistical classifier, an optional landmark
//! detector, and the strategy chosen once at startup. Every request path ends
//! in a [`SignResponse`]; failures become `success: false` responses instead
//! of errors.
//!
//! [`RuleRecognizer`] is the lock-free slice of it: the rule engine plus sign
//! naming, cheap to clone and safe to share between request handlers.

use std::sync::Arc;
use std::time::Instant;

use image::DynamicImage;
use serde::Serialize;

use crate::catalog::GestureCatalog;
use crate::classifier::SignClassifier;
use crate::config::{RecognizerConfig, namespaced};
use crate::detector::{HandLandmarker, OnnxHandLandmarker};
use crate::error::{GestureError, Result};
use crate::landmarks::{Landmark, LandmarkSet};
use crate::matcher::GestureMatcher;
use crate::response::{SignResponse, Speed};
use crate::strategy::Strategy;

/// Full outcome of recognizing one image.
#[derive(Debug, Clone)]
pub struct Recognition {
    /// Wire response.
    pub response: SignResponse,
    /// Landmarks of the detected hand, if any.
    pub landmarks: Option<LandmarkSet>,
    /// Timing breakdown.
    pub speed: Speed,
}

/// Health report for the service and the `status` command.
#[derive(Debug, Clone, Serialize)]
pub struct Status {
    /// Always `"ok"` once the recognizer is constructed.
    pub status: &'static str,
    /// Strategy answering requests.
    pub strategy: Strategy,
    /// Name of the loaded gesture catalog.
    pub catalog: String,
    /// Number of gestures in the catalog.
    pub num_gestures: usize,
    /// Whether the statistical classifier is loaded.
    pub model_loaded: bool,
    /// Number of classifier classes.
    pub num_classes: usize,
    /// Classifier labels in index order.
    pub classes: Vec<String>,
    /// Whether an image landmark detector is configured.
    pub landmarker_loaded: bool,
}

/// Rule-engine recognizer without any model state.
#[derive(Debug, Clone)]
pub struct RuleRecognizer {
    matcher: GestureMatcher,
    namespace: String,
}

impl RuleRecognizer {
    /// Wrap a matcher; `namespace` prefixes gesture ids in responses.
    #[must_use]
    pub fn new(matcher: GestureMatcher, namespace: impl Into<String>) -> Self {
        Self {
            matcher,
            namespace: namespace.into(),
        }
    }

    /// Best gesture id and its score.
    ///
    /// # Errors
    ///
    /// Returns [`GestureError::NoMatch`] when no gesture clears its floor.
    pub fn identify(&self, landmarks: &LandmarkSet) -> Result<(String, f32)> {
        let result = self.matcher.match_set(landmarks);
        match result.gesture_id {
            Some(id) => Ok((id, result.confidence)),
            None => Err(GestureError::NoMatch),
        }
    }

    /// Recognize a validated landmark set.
    #[must_use]
    pub fn recognize_landmarks(&self, landmarks: &LandmarkSet) -> SignResponse {
        match self.identify(landmarks) {
            Ok((id, confidence)) => {
                SignResponse::matched(namespaced(&self.namespace, &id), confidence).with_landmarks(landmarks)
            }
            Err(e) => SignResponse::from(e),
        }
    }

    /// Validate raw points and recognize them.
    #[must_use]
    pub fn recognize_points(&self, points: &[Landmark]) -> SignResponse {
        match LandmarkSet::new(points) {
            Ok(set) => self.recognize_landmarks(&set),
            Err(e) => SignResponse::from(e),
        }
    }

    /// Gesture matcher in use.
    #[must_use]
    pub const fn matcher(&self) -> &GestureMatcher {
        &self.matcher
    }
}

/// Single-hand sign recognizer.
pub struct Recognizer {
    config: RecognizerConfig,
    rules: RuleRecognizer,
    classifier: Option<SignClassifier>,
    classifier_error: Option<String>,
    landmarker: Option<Box<dyn HandLandmarker>>,
    strategy: Strategy,
}

impl Recognizer {
    /// Build a recognizer from configuration.
    ///
    /// The catalog and landmark model must load. A classifier that fails to
    /// load is reported and left out; if the classifier strategy was forced,
    /// requests then answer `UNKNOWN` with the load error.
    ///
    /// # Errors
    ///
    /// Returns [`GestureError::CatalogError`] or [`GestureError::Io`] for a bad
    /// catalog file, and [`GestureError::ModelLoadError`] if the landmark
    /// model cannot be opened.
    pub fn new(config: RecognizerConfig) -> Result<Self> {
        let catalog = match &config.catalog_path {
            Some(path) => GestureCatalog::from_path(path)?,
            None => GestureCatalog::builtin_asl(),
        };
        crate::verbose!(
            "Gesture catalog '{}' loaded: {} gestures",
            catalog.name(),
            catalog.len()
        );

        let (classifier, classifier_error) = match &config.classifier_path {
            Some(path) => match SignClassifier::load(path, config.labels_path.as_deref(), config.num_threads) {
                Ok(classifier) => {
                    crate::verbose!(
                        "Classifier loaded: {} classes {:?}",
                        classifier.metadata().num_classes(),
                        classifier.labels()
                    );
                    (Some(classifier), None)
                }
                Err(e) => {
                    crate::warn!("Classifier not loaded: {e}");
                    (None, Some(e.to_string()))
                }
            },
            None => (None, None),
        };

        let landmarker = match &config.landmarker_path {
            Some(path) => Some(Box::new(OnnxHandLandmarker::load(path, &config)?) as Box<dyn HandLandmarker>),
            None => None,
        };

        let strategy = Strategy::select(config.strategy, classifier.is_some());
        let rules = RuleRecognizer::new(GestureMatcher::new(Arc::new(catalog)), config.namespace.clone());

        Ok(Self {
            config,
            rules,
            classifier,
            classifier_error,
            landmarker,
            strategy,
        })
    }

    /// Rule-based recognizer over an existing catalog, with no models.
    #[must_use]
    pub fn with_catalog(config: RecognizerConfig, catalog: Arc<GestureCatalog>) -> Self {
        let strategy = Strategy::select(config.strategy, false);
        let rules = RuleRecognizer::new(GestureMatcher::new(catalog), config.namespace.clone());
        Self {
            config,
            rules,
            classifier: None,
            classifier_error: None,
            landmarker: None,
            strategy,
        }
    }

    /// Replace the landmark detector.
    #[must_use]
    pub fn with_landmarker(mut self, landmarker: Box<dyn HandLandmarker>) -> Self {
        self.landmarker = Some(landmarker);
        self
    }

    /// Identify a hand without building a response.
    ///
    /// # Returns
    ///
    /// The un-namespaced gesture id or class label, and its confidence.
    ///
    /// # Errors
    ///
    /// Returns [`GestureError::NoMatch`] when no gesture clears its floor,
    /// [`GestureError::ClassifierUnavailable`] when the classifier strategy is
    /// active without a loaded model, or [`GestureError::DetectionError`] if the
    /// classifier fails.
    pub fn identify(&mut self, landmarks: &LandmarkSet) -> Result<(String, f32)> {
        match self.strategy {
            Strategy::Rules => self.rules.identify(landmarks),
            Strategy::Classifier => {
                let classifier = self.classifier.as_mut().ok_or_else(|| {
                    GestureError::ClassifierUnavailable(
                        self.classifier_error
                            .clone()
                            .unwrap_or_else(|| "no classifier model configured".to_string()),
                    )
                })?;
                let c = classifier.classify(landmarks)?;
                Ok((c.label, c.confidence))
            }
        }
    }

    /// Recognize a validated landmark set.
    pub fn recognize_landmarks(&mut self, landmarks: &LandmarkSet) -> SignResponse {
        if self.strategy == Strategy::Rules {
            return self.rules.recognize_landmarks(landmarks);
        }
        match self.identify(landmarks) {
            Ok((id, confidence)) => {
                SignResponse::matched(self.config.sign_name(&id), confidence).with_landmarks(landmarks)
            }
            Err(e) => SignResponse::from(e),
        }
    }

    /// Validate raw points and recognize them.
    ///
    /// Malformed input is reported in the response and never scored.
    pub fn recognize_points(&mut self, points: &[Landmark]) -> SignResponse {
        match LandmarkSet::new(points) {
            Ok(set) => self.recognize_landmarks(&set),
            Err(e) => SignResponse::from(e),
        }
    }

    /// Detect a hand in an image and recognize it.
    ///
    /// When no hand is found the recognition step is skipped entirely.
    pub fn recognize_image(&mut self, image: &DynamicImage) -> Recognition {
        let Some(landmarker) = self.landmarker.as_mut() else {
            return Recognition {
                response: SignResponse::failed("No hand landmark model configured"),
                landmarks: None,
                speed: Speed::default(),
            };
        };

        let start_detect = Instant::now();
        let detected = landmarker.detect(image);
        let detect_time = start_detect.elapsed().as_secs_f64() * 1000.0;

        let landmarks = match detected {
            Ok(Some(set)) => set,
            Ok(None) => {
                return Recognition {
                    response: SignResponse::from(GestureError::NoDetection),
                    landmarks: None,
                    speed: Speed { detect: Some(detect_time), ..Speed::default() },
                };
            }
            Err(e) => {
                return Recognition {
                    response: SignResponse::from(e),
                    landmarks: None,
                    speed: Speed { detect: Some(detect_time), ..Speed::default() },
                };
            }
        };

        let start_recognize = Instant::now();
        let response = self.recognize_landmarks(&landmarks);
        let recognize_time = start_recognize.elapsed().as_secs_f64() * 1000.0;

        Recognition {
            response,
            landmarks: Some(landmarks),
            speed: Speed::new(0.0, detect_time, recognize_time),
        }
    }

    /// Decode an uploaded image and recognize it.
    pub fn recognize_bytes(&mut self, bytes: &[u8]) -> Recognition {
        let failed = |msg: String| Recognition {
            response: SignResponse::failed(msg),
            landmarks: None,
            speed: Speed::default(),
        };

        if bytes.is_empty() {
            return failed("Empty file received".to_string());
        }

        let start = Instant::now();
        let image = match image::load_from_memory(bytes) {
            Ok(image) => image,
            Err(e) => return failed(format!("Failed to decode image: {e}")),
        };
        let decode_time = start.elapsed().as_secs_f64() * 1000.0;

        let mut recognition = self.recognize_image(&image);
        recognition.speed.preprocess = Some(decode_time);
        recognition
    }

    /// Health report.
    #[must_use]
    pub fn status(&self) -> Status {
        let catalog = self.rules.matcher().catalog();
        let classes = self
            .classifier
            .as_ref()
            .map(SignClassifier::labels)
            .unwrap_or_default();

        Status {
            status: "ok",
            strategy: self.strategy,
            catalog: catalog.name().to_string(),
            num_gestures: catalog.len(),
            model_loaded: self.classifier.is_some(),
            num_classes: classes.len(),
            classes,
            landmarker_loaded: self.landmarker.is_some(),
        }
    }

    /// Strategy answering requests.
    #[must_use]
    pub const fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Gesture matcher in use.
    #[must_use]
    pub const fn matcher(&self) -> &GestureMatcher {
        self.rules.matcher()
    }

    /// Lock-free handle for the rule engine, when rules answer requests.
    #[must_use]
    pub fn rule_recognizer(&self) -> Option<RuleRecognizer> {
        (self.strategy == Strategy::Rules).then(|| self.rules.clone())
    }

    /// Configuration the recognizer was built with.
    #[must_use]
    pub const fn config(&self) -> &RecognizerConfig {
        &self.config
    }
}

impl std::fmt::Debug for Recognizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Recognizer")
            .field("strategy", &self.strategy)
            .field("catalog", &self.rules.matcher().catalog().name())
            .field("classifier", &self.classifier)
            .field("landmarker", &self.landmarker.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::UNKNOWN_SIGN;

    struct NoHand;

    impl HandLandmarker for NoHand {
        fn detect(&mut self, _image: &DynamicImage) -> Result<Option<LandmarkSet>> {
            Ok(None)
        }
    }

    fn rules() -> Recognizer {
        Recognizer::new(RecognizerConfig::default()).unwrap()
    }

    #[test]
    fn test_default_is_rules() {
        let recognizer = rules();
        assert_eq!(recognizer.strategy(), Strategy::Rules);
        let status = recognizer.status();
        assert_eq!(status.catalog, "asl");
        assert_eq!(status.num_gestures, 24);
        assert!(!status.model_loaded);
        assert!(!status.landmarker_loaded);
    }

    #[test]
    fn test_invalid_points() {
        let response = rules().recognize_points(&[Landmark::default(); 22]);
        assert!(!response.success);
        assert_eq!(response.sign, "");
        assert!(response.error.unwrap().contains("expected 21 landmarks"));
    }

    #[test]
    fn test_no_match_is_unknown() {
        // Every point on the wrist: nothing clears its floor.
        let response = rules().recognize_points(&[Landmark::new(0.5, 0.5, 0.0); 21]);
        assert!(!response.success);
        assert_eq!(response.sign, UNKNOWN_SIGN);
        assert!(response.confidence.abs() < f32::EPSILON);
    }

    #[test]
    fn test_forced_classifier_without_model() {
        let config = RecognizerConfig::new().with_strategy(Strategy::Classifier);
        let mut recognizer = Recognizer::new(config).unwrap();
        let response = recognizer.recognize_points(&[Landmark::new(0.5, 0.5, 0.0); 21]);
        assert_eq!(response.sign, UNKNOWN_SIGN);
        assert!(response.error.unwrap().starts_with("Classifier unavailable"));
    }

    #[test]
    fn test_missing_classifier_falls_back_to_rules() {
        let config = RecognizerConfig::new().with_classifier("nonexistent_classifier.onnx");
        let recognizer = Recognizer::new(config).unwrap();
        assert_eq!(recognizer.strategy(), Strategy::Rules);
    }

    #[test]
    fn test_no_hand_skips_recognition() {
        let mut recognizer = rules().with_landmarker(Box::new(NoHand));
        let image = DynamicImage::ImageRgb8(image::RgbImage::new(8, 8));
        let recognition = recognizer.recognize_image(&image);
        assert!(recognition.landmarks.is_none());
        assert_eq!(recognition.response.sign, "");
        assert_eq!(recognition.response.error.as_deref(), Some("No hand detected"));
    }

    #[test]
    fn test_rule_recognizer_matches_facade() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<RuleRecognizer>();

        let mut recognizer = rules();
        let handle = recognizer.rule_recognizer().unwrap();
        for points in [vec![Landmark::new(0.5, 0.5, 0.0); 21], vec![Landmark::default(); 3]] {
            assert_eq!(handle.recognize_points(&points), recognizer.recognize_points(&points));
        }

        let forced = Recognizer::new(RecognizerConfig::new().with_strategy(Strategy::Classifier)).unwrap();
        assert!(forced.rule_recognizer().is_none());
    }

    #[test]
    fn test_bytes_errors() {
        let mut recognizer = rules().with_landmarker(Box::new(NoHand));
        let empty = recognizer.recognize_bytes(&[]);
        assert_eq!(empty.response.error.as_deref(), Some("Empty file received"));

        let garbage = recognizer.recognize_bytes(b"not an image");
        assert!(garbage.response.error.unwrap().starts_with("Failed to decode image"));
    }
}
