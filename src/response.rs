// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Recognition responses and timing.

use serde::{Deserialize, Serialize};

use crate::error::GestureError;
use crate::landmarks::{FingerId, LandmarkSet};

/// Sign reported when recognition ran but produced no label.
pub const UNKNOWN_SIGN: &str = "UNKNOWN";

/// Timing information for one recognition, in milliseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Speed {
    /// Time spent decoding and letterboxing the image.
    pub preprocess: Option<f64>,
    /// Time spent in the landmark model.
    pub detect: Option<f64>,
    /// Time spent matching or classifying.
    pub recognize: Option<f64>,
}

impl Speed {
    /// Create a new `Speed` with all timings.
    ///
    /// # Arguments
    ///
    /// * `preprocess` - Time in milliseconds.
    /// * `detect` - Time in milliseconds.
    /// * `recognize` - Time in milliseconds.
    #[must_use]
    pub const fn new(preprocess: f64, detect: f64, recognize: f64) -> Self {
        Self {
            preprocess: Some(preprocess),
            detect: Some(detect),
            recognize: Some(recognize),
        }
    }

    /// Sum of all recorded timings in milliseconds.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.preprocess.unwrap_or(0.0) + self.detect.unwrap_or(0.0) + self.recognize.unwrap_or(0.0)
    }
}

/// Wire response for one recognition request.
///
/// `sign` is the namespaced label on success, [`UNKNOWN_SIGN`] when
/// recognition ran without a result, and empty when the input never reached
/// recognition (undecodable image, no hand, malformed landmarks).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignResponse {
    /// Whether a sign was recognized.
    pub success: bool,
    /// Recognized sign, e.g. `"ASL_A"`.
    pub sign: String,
    /// Confidence rounded to two decimals; 0.0 on failure.
    pub confidence: f32,
    /// Human-readable failure reason.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Fingertip summary of the detected hand, e.g. `"Thumb: (0.45, 0.66); ..."`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub landmarks: Option<String>,
}

impl SignResponse {
    /// A successful recognition.
    #[must_use]
    pub fn matched(sign: impl Into<String>, confidence: f32) -> Self {
        Self {
            success: true,
            sign: sign.into(),
            confidence: round2(confidence),
            error: None,
            landmarks: None,
        }
    }

    /// Recognition ran but produced no label.
    #[must_use]
    pub fn unknown(error: impl Into<String>) -> Self {
        Self {
            success: false,
            sign: UNKNOWN_SIGN.to_string(),
            confidence: 0.0,
            error: Some(error.into()),
            landmarks: None,
        }
    }

    /// The input never reached recognition.
    #[must_use]
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            sign: String::new(),
            confidence: 0.0,
            error: Some(error.into()),
            landmarks: None,
        }
    }

    /// Attach a fingertip summary.
    #[must_use]
    pub fn with_landmarks(mut self, landmarks: &LandmarkSet) -> Self {
        self.landmarks = Some(describe_tips(landmarks));
        self
    }
}

impl From<&GestureError> for SignResponse {
    fn from(err: &GestureError) -> Self {
        match err {
            GestureError::NoMatch | GestureError::ClassifierUnavailable(_) => {
                Self::unknown(err.to_string())
            }
            _ => Self::failed(err.to_string()),
        }
    }
}

impl From<GestureError> for SignResponse {
    fn from(err: GestureError) -> Self {
        Self::from(&err)
    }
}

/// Round to two decimals.
#[must_use]
pub fn round2(value: f32) -> f32 {
    (value * 100.0).round() / 100.0
}

/// Format fingertip positions as `"Thumb: (x, y); Index: (x, y); ..."`.
#[must_use]
pub fn describe_tips(landmarks: &LandmarkSet) -> String {
    FingerId::ALL
        .iter()
        .map(|&finger| {
            let tip = landmarks.tip(finger);
            let name = finger.as_str();
            let mut chars = name.chars();
            let title: String = chars
                .next()
                .map(|c| c.to_ascii_uppercase())
                .into_iter()
                .chain(chars)
                .collect();
            format!("{title}: ({:.2}, {:.2})", tip.x, tip.y)
        })
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::Landmark;

    #[test]
    fn test_speed_total() {
        let speed = Speed::new(1.0, 2.5, 0.5);
        assert!((speed.total() - 4.0).abs() < f64::EPSILON);
        assert!(Speed::default().total().abs() < f64::EPSILON);
    }

    #[test]
    fn test_matched_rounds() {
        let r = SignResponse::matched("ASL_S", 0.876);
        assert!(r.success);
        assert!((r.confidence - 0.88).abs() < 1e-6);
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["sign"], "ASL_S");
        assert!(json.get("error").is_none());
    }

    #[test]
    fn test_error_mapping() {
        let no_hand = SignResponse::from(GestureError::NoDetection);
        assert_eq!(no_hand.sign, "");
        assert_eq!(no_hand.error.as_deref(), Some("No hand detected"));
        assert!(no_hand.confidence.abs() < f32::EPSILON);

        let no_match = SignResponse::from(GestureError::NoMatch);
        assert_eq!(no_match.sign, UNKNOWN_SIGN);
        assert!(!no_match.success);

        let unavailable = SignResponse::from(GestureError::ClassifierUnavailable("not loaded".into()));
        assert_eq!(unavailable.sign, UNKNOWN_SIGN);

        let invalid = SignResponse::from(GestureError::InvalidInput("20 points".into()));
        assert_eq!(invalid.sign, "");
    }

    #[test]
    fn test_describe_tips() {
        let pts: Vec<Landmark> = (0..21).map(|i| Landmark::new(i as f32 / 40.0, 0.5, 0.0)).collect();
        let set = LandmarkSet::new(&pts).unwrap();
        let text = describe_tips(&set);
        assert!(text.starts_with("Thumb: (0.10, 0.50); Index: (0.20, 0.50)"));
        assert!(text.ends_with("Pinky: (0.50, 0.50)"));
    }
}
