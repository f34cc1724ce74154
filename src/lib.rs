// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

#![allow(clippy::multiple_crate_versions)]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! # SignSpeak
//!
//! Static hand-sign recognition from 21-point hand landmarks, written in Rust.
//!
//! A hand is described by the 21 landmarks of the MediaPipe hand topology.
//! SignSpeak scores each hand against a declarative catalog of gestures, where
//! every gesture is a weighted list of finger-state checks (extended, curled,
//! thumb tucked across the fingers, fingers together, ...), and reports the
//! best gesture that clears its own minimum score. The built-in catalog covers
//! 24 static letters of the American Sign Language alphabet.
//!
//! ## Features
//!
//! - **Geometric Recognition** - Pure, deterministic rule scoring with no model required
//! - **Data-Driven Catalogs** - Gestures are JSON data; load your own sign vocabulary
//! - **Statistical Classifier** - Optional ONNX classifier over normalized landmark features
//! - **Image Input** - Optional ONNX hand-landmark model with letterbox preprocessing
//! - **CLI and HTTP Service** - `signspeak predict` and an axum server with a JSON contract
//!
//! ## Quick Start (Library)
//!
//! ```no_run
//! use signspeak::{Landmark, Recognizer, RecognizerConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut recognizer = Recognizer::new(RecognizerConfig::default())?;
//!
//!     let points: Vec<Landmark> = serde_json::from_str(&std::fs::read_to_string("hand.json")?)?;
//!     let response = recognizer.recognize_points(&points);
//!
//!     if response.success {
//!         println!("{} {:.2}", response.sign, response.confidence);
//!     } else {
//!         println!("{}: {:?}", response.sign, response.error);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Gesture Catalogs
//!
//! ```json
//! {
//!   "name": "thumbs",
//!   "gestures": [
//!     {
//!       "id": "THUMBS_UP",
//!       "name": "Thumbs Up",
//!       "min_score": 0.85,
//!       "checks": [
//!         { "type": "extended_up", "finger": "thumb", "weight": 3.0 },
//!         { "type": "curled", "finger": "index", "weight": 1.0 }
//!       ]
//!     }
//!   ]
//! }
//! ```
//!
//! Catalog order matters: when two gestures reach the same score, the one
//! listed first wins.
//!
//! ## CLI Usage
//!
//! ```bash
//! # Recognize a landmark file with the built-in ASL catalog
//! signspeak predict --source hand.json
//!
//! # Detect hands in images and save annotated results
//! signspeak predict --landmarker hand_landmark.onnx --source images/ --save
//!
//! # Use a statistical classifier instead of the rules
//! signspeak predict -m hand_landmark.onnx -s photo.jpg --classifier signs.onnx --labels labels.json
//!
//! # Inspect a catalog
//! signspeak catalog --catalog demos/thumbs.json
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`landmarks`] | Validated 21-point landmark sets and finger topology |
//! | [`geometry`] | Distances and angles |
//! | [`predicates`] | Finger-state checks and their calibration |
//! | [`catalog`] | Gesture specifications and the built-in ASL catalog |
//! | [`matcher`] | Weighted scoring and best-match selection |
//! | [`recognizer`] | Strategy selection and the response facade |
//! | [`classifier`] | ONNX sign classifier |
//! | [`detector`] | ONNX hand-landmark detector |
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `annotate` | Draw hand skeletons and signs on saved images (default) |
//! | `cuda` | NVIDIA CUDA execution provider |
//! | `tensorrt` | NVIDIA `TensorRT` execution provider |
//! | `coreml` | Apple `CoreML` execution provider |
//!
//! ## License
//!
//! AGPL-3.0. See [LICENSE](https://ultralytics.com/license).

// Modules
#[cfg(feature = "annotate")]
pub mod annotate;
pub mod catalog;
pub mod classifier;
pub mod cli;
pub mod config;
pub mod detector;
pub mod error;
pub mod features;
pub mod geometry;
pub mod landmarks;
pub mod matcher;
pub mod metadata;
pub mod onnx;
pub mod predicates;
pub mod preprocessing;
pub mod recognizer;
pub mod response;
pub mod source;
pub mod strategy;
pub mod visualizer;

// Re-export main types for convenience
pub use catalog::{Check, GestureCatalog, GestureSpec};
pub use config::RecognizerConfig;
pub use error::{GestureError, Result};
pub use landmarks::{FingerId, Landmark, LandmarkSet};
pub use matcher::{GestureMatcher, MatchResult};
pub use predicates::CheckKind;
pub use recognizer::{Recognition, Recognizer, RuleRecognizer, Status};
pub use response::{SignResponse, Speed};
pub use source::{Source, SourceIterator, SourceMeta};
pub use strategy::Strategy;

// Re-export model adapters for advanced use
pub use classifier::SignClassifier;
pub use detector::{HandLandmarker, OnnxHandLandmarker};

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
        assert_eq!(NAME, "signspeak");
    }
}
