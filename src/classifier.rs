// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Statistical sign classifier.
//!
//! An ONNX model (typically a random forest exported from scikit-learn) that
//! maps the 42 min-max normalized landmark coordinates to class probabilities.

use std::path::Path;

use ort::session::Session;
use ort::tensor::TensorElementType;
use ort::value::{TensorRef, ValueType};

use crate::error::{GestureError, Result};
use crate::features::{NUM_FEATURES, feature_batch};
use crate::landmarks::LandmarkSet;
use crate::metadata::ClassifierMetadata;
use crate::onnx;

/// Label and probability of the most likely class.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    /// Class label, e.g. `"A"`.
    pub label: String,
    /// Highest class probability.
    pub confidence: f32,
}

/// ONNX sign classifier over normalized landmark features.
pub struct SignClassifier {
    session: Session,
    metadata: ClassifierMetadata,
    input_name: String,
    prob_output_name: String,
}

impl SignClassifier {
    /// Load a classifier.
    ///
    /// Labels are read from `labels_path` when given, otherwise from the
    /// model's `names` metadata.
    ///
    /// # Arguments
    ///
    /// * `model_path` - ONNX classifier file.
    /// * `labels_path` - Optional JSON labels file.
    /// * `num_threads` - ONNX Runtime intra-op threads.
    ///
    /// # Errors
    ///
    /// Returns [`GestureError::ModelLoadError`] if the model cannot be opened,
    /// has no float output, or no labels can be found.
    pub fn load(model_path: &Path, labels_path: Option<&Path>, num_threads: usize) -> Result<Self> {
        let session = onnx::load_session(model_path, num_threads)?;

        let metadata = match labels_path {
            Some(path) => ClassifierMetadata::from_labels_path(path)?,
            None => {
                let map = onnx::custom_metadata(&session, &["names", "description", "version"])?;
                ClassifierMetadata::from_onnx_metadata(&map)?
            }
        };
        if metadata.num_classes() == 0 {
            return Err(GestureError::ModelLoadError(
                "Classifier has no class labels".to_string(),
            ));
        }

        let input_name = session
            .inputs
            .first()
            .map(|input| input.name.clone())
            .ok_or_else(|| GestureError::ModelLoadError("Classifier has no inputs".to_string()))?;

        let prob_output_name = session
            .outputs
            .iter()
            .find(|output| {
                matches!(
                    output.output_type,
                    ValueType::Tensor {
                        ty: TensorElementType::Float32,
                        ..
                    }
                )
            })
            .map(|output| output.name.clone())
            .ok_or_else(|| {
                GestureError::ModelLoadError("Classifier has no float probability output".to_string())
            })?;

        Ok(Self {
            session,
            metadata,
            input_name,
            prob_output_name,
        })
    }

    /// Classify one hand.
    ///
    /// # Errors
    ///
    /// Returns [`GestureError::DetectionError`] if the session fails or its
    /// output is empty.
    pub fn classify(&mut self, landmarks: &LandmarkSet) -> Result<Classification> {
        let probs = self.probabilities(landmarks)?;
        let (index, confidence) = argmax(&probs).ok_or_else(|| {
            GestureError::DetectionError("Classifier returned no probabilities".to_string())
        })?;

        let label = self
            .metadata
            .class_name(index)
            .map_or_else(|| index.to_string(), str::to_string);

        Ok(Classification { label, confidence })
    }

    /// Class probabilities in class-index order.
    ///
    /// # Errors
    ///
    /// Returns [`GestureError::DetectionError`] if the session fails.
    pub fn probabilities(&mut self, landmarks: &LandmarkSet) -> Result<Vec<f32>> {
        let input = feature_batch(landmarks);
        debug_assert_eq!(input.shape(), &[1, NUM_FEATURES]);

        let input_contiguous = input.as_standard_layout();
        let input_tensor = TensorRef::from_array_view(&input_contiguous)
            .map_err(|e| GestureError::DetectionError(format!("Failed to create input tensor: {e}")))?;
        let inputs = ort::inputs![self.input_name.as_str() => input_tensor];

        let outputs = self
            .session
            .run(inputs)
            .map_err(|e| GestureError::DetectionError(format!("Classifier failed: {e}")))?;

        let output = outputs.get(self.prob_output_name.as_str()).ok_or_else(|| {
            GestureError::DetectionError(format!("Output '{}' not found", self.prob_output_name))
        })?;
        let (_, data) = output
            .try_extract_tensor::<f32>()
            .map_err(|e| GestureError::DetectionError(format!("Failed to extract output: {e}")))?;

        Ok(data.to_vec())
    }

    /// Class labels in index order.
    #[must_use]
    pub fn labels(&self) -> Vec<String> {
        self.metadata.labels()
    }

    /// Label metadata.
    #[must_use]
    pub const fn metadata(&self) -> &ClassifierMetadata {
        &self.metadata
    }
}

impl std::fmt::Debug for SignClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignClassifier")
            .field("num_classes", &self.metadata.num_classes())
            .field("input", &self.input_name)
            .field("output", &self.prob_output_name)
            .finish()
    }
}

/// Index and value of the largest finite probability.
fn argmax(probs: &[f32]) -> Option<(usize, f32)> {
    probs
        .iter()
        .copied()
        .enumerate()
        .filter(|(_, p)| p.is_finite())
        .fold(None, |best, (i, p)| match best {
            Some((_, bp)) if bp >= p => best,
            _ => Some((i, p)),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_argmax() {
        assert_eq!(argmax(&[0.1, 0.7, 0.2]), Some((1, 0.7)));
        assert_eq!(argmax(&[0.5, 0.5]), Some((0, 0.5)));
        assert_eq!(argmax(&[f32::NAN, 0.3]), Some((1, 0.3)));
        assert_eq!(argmax(&[]), None);
    }

    #[test]
    fn test_classifier_not_found() {
        let result = SignClassifier::load(Path::new("nonexistent.onnx"), None, 0);
        assert!(matches!(result, Err(GestureError::ModelLoadError(_))));
    }
}
