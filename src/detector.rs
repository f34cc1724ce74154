// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Hand-landmark detection.
//!
//! The [`HandLandmarker`] trait is the seam between images and the gesture
//! engine: it either yields one validated [`LandmarkSet`] or reports that no
//! hand is present. [`OnnxHandLandmarker`] implements it over an ONNX export
//! of a MediaPipe-style hand-landmark model.

use std::path::Path;

use image::DynamicImage;
use ort::session::Session;
use ort::value::TensorRef;

use crate::config::RecognizerConfig;
use crate::error::{GestureError, Result};
use crate::landmarks::{Landmark, LandmarkSet, NUM_LANDMARKS};
use crate::onnx;
use crate::preprocessing::{Letterbox, letterbox};

/// Anything that can locate a single hand's 21 landmarks in an image.
pub trait HandLandmarker: Send {
    /// Detect one hand.
    ///
    /// # Returns
    ///
    /// `Ok(None)` when no hand is present.
    ///
    /// # Errors
    ///
    /// Returns an error if the image cannot be processed or the model fails.
    fn detect(&mut self, image: &DynamicImage) -> Result<Option<LandmarkSet>>;
}

/// ONNX hand-landmark model.
///
/// The model takes one square RGB image and produces, among its outputs, a
/// 63-value tensor of `(x, y, z)` landmarks in input pixels and a one-value
/// hand-presence score. The first output of each size is used.
pub struct OnnxHandLandmarker {
    session: Session,
    input_name: String,
    output_names: Vec<String>,
    input_size: u32,
    channels_last: bool,
    presence_threshold: f32,
}

impl OnnxHandLandmarker {
    /// Load a landmark model using the detector settings in `config`.
    ///
    /// # Errors
    ///
    /// Returns [`GestureError::ModelLoadError`] if the model cannot be opened.
    pub fn load(path: &Path, config: &RecognizerConfig) -> Result<Self> {
        let session = onnx::load_session(path, config.num_threads)?;

        let input_name = session
            .inputs
            .first()
            .map(|i| i.name.clone())
            .ok_or_else(|| GestureError::ModelLoadError("Landmark model has no inputs".to_string()))?;
        let output_names: Vec<String> = session.outputs.iter().map(|o| o.name.clone()).collect();

        Ok(Self {
            session,
            input_name,
            output_names,
            input_size: config.landmarker_size,
            channels_last: config.channels_last,
            presence_threshold: config.presence_threshold,
        })
    }

    fn run_inference(&mut self, input: &ndarray::Array4<f32>) -> Result<Vec<Vec<f32>>> {
        let input_contiguous = input.as_standard_layout();
        let input_tensor = TensorRef::from_array_view(&input_contiguous)
            .map_err(|e| GestureError::DetectionError(format!("Failed to create input tensor: {e}")))?;
        let inputs = ort::inputs![self.input_name.as_str() => input_tensor];

        let outputs = self
            .session
            .run(inputs)
            .map_err(|e| GestureError::DetectionError(format!("Landmark model failed: {e}")))?;

        let mut tensors = Vec::with_capacity(self.output_names.len());
        for name in &self.output_names {
            if let Some(output) = outputs.get(name.as_str()) {
                if let Ok((_, data)) = output.try_extract_tensor::<f32>() {
                    tensors.push(data.to_vec());
                }
            }
        }
        Ok(tensors)
    }
}

impl HandLandmarker for OnnxHandLandmarker {
    fn detect(&mut self, image: &DynamicImage) -> Result<Option<LandmarkSet>> {
        let lb = letterbox(image, self.input_size, self.channels_last)?;
        let outputs = self.run_inference(&lb.tensor)?;
        decode_outputs(&outputs, &lb, self.presence_threshold)
    }
}

impl std::fmt::Debug for OnnxHandLandmarker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxHandLandmarker")
            .field("input_size", &self.input_size)
            .field("channels_last", &self.channels_last)
            .field("presence_threshold", &self.presence_threshold)
            .finish()
    }
}

/// Turn raw model outputs into a landmark set.
///
/// Presence scores outside `[0, 1]` are treated as logits.
fn decode_outputs(outputs: &[Vec<f32>], lb: &Letterbox, presence_threshold: f32) -> Result<Option<LandmarkSet>> {
    let coords = outputs
        .iter()
        .find(|t| t.len() == NUM_LANDMARKS * 3)
        .ok_or_else(|| GestureError::DetectionError("Landmark model has no 21x3 output".to_string()))?;

    if let Some(raw) = outputs.iter().find(|t| t.len() == 1).map(|t| t[0]) {
        let presence = if (0.0..=1.0).contains(&raw) {
            raw
        } else {
            1.0 / (1.0 + (-raw).exp())
        };
        if presence < presence_threshold {
            return Ok(None);
        }
    }

    let points: Vec<Landmark> = coords
        .chunks_exact(3)
        .map(|p| lb.to_image_normalized(p[0], p[1], p[2]))
        .collect();

    LandmarkSet::new(&points)
        .map(Some)
        .map_err(|e| GestureError::DetectionError(format!("Landmark model produced {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;

    fn square_letterbox() -> Letterbox {
        let img = DynamicImage::ImageRgb8(RgbImage::new(224, 224));
        letterbox(&img, 224, true).unwrap()
    }

    fn coords() -> Vec<f32> {
        (0..NUM_LANDMARKS)
            .flat_map(|i| [i as f32 * 10.0, 112.0, 2.24])
            .collect()
    }

    #[test]
    fn test_decode_present() {
        let lb = square_letterbox();
        let set = decode_outputs(&[coords(), vec![0.9]], &lb, 0.5).unwrap().unwrap();
        assert!((set[1].x - 10.0 / 224.0).abs() < 1e-6);
        assert!((set[1].y - 0.5).abs() < 1e-6);
        assert!((set[1].z - 0.01).abs() < 1e-6);
    }

    #[test]
    fn test_decode_absent() {
        let lb = square_letterbox();
        assert!(decode_outputs(&[coords(), vec![0.2]], &lb, 0.5).unwrap().is_none());
        // Logit below zero.
        assert!(decode_outputs(&[vec![-3.0], coords()], &lb, 0.5).unwrap().is_none());
    }

    #[test]
    fn test_decode_missing_landmarks() {
        let lb = square_letterbox();
        let result = decode_outputs(&[vec![0.9], vec![0.0; 10]], &lb, 0.5);
        assert!(matches!(result, Err(GestureError::DetectionError(_))));
    }

    #[test]
    fn test_landmarker_not_found() {
        let result = OnnxHandLandmarker::load(Path::new("nonexistent.onnx"), &RecognizerConfig::default());
        assert!(matches!(result, Err(GestureError::ModelLoadError(_))));
    }
}
