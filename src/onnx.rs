// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! ONNX Runtime session helpers shared by the landmark model and the classifier.

use std::collections::HashMap;
use std::path::Path;

#[cfg(feature = "coreml")]
use ort::execution_providers::CoreMLExecutionProvider;
#[cfg(feature = "cuda")]
use ort::execution_providers::CUDAExecutionProvider;
#[cfg(feature = "tensorrt")]
use ort::execution_providers::TensorRTExecutionProvider;
use ort::session::Session;
use ort::session::builder::GraphOptimizationLevel;

use crate::error::{GestureError, Result};

/// Open an ONNX model with the crate's standard session settings.
///
/// # Arguments
///
/// * `path` - Path to the `.onnx` file.
/// * `num_threads` - Intra-op threads, `0` to let ONNX Runtime decide.
///
/// # Errors
///
/// Returns [`GestureError::ModelLoadError`] if the file is missing or the
/// session cannot be created.
pub fn load_session(path: &Path, num_threads: usize) -> Result<Session> {
    if !path.exists() {
        return Err(GestureError::ModelLoadError(format!(
            "Model file not found: {}",
            path.display()
        )));
    }

    #[allow(unused_mut)]
    let mut builder = Session::builder().map_err(|e| {
        GestureError::ModelLoadError(format!("Failed to create session builder: {e}"))
    })?;

    #[cfg(feature = "tensorrt")]
    {
        builder = builder
            .with_execution_providers([TensorRTExecutionProvider::default().build()])
            .map_err(|e| GestureError::ModelLoadError(format!("Failed to register TensorRT EP: {e}")))?;
    }

    #[cfg(feature = "cuda")]
    {
        builder = builder
            .with_execution_providers([CUDAExecutionProvider::default().build()])
            .map_err(|e| GestureError::ModelLoadError(format!("Failed to register CUDA EP: {e}")))?;
    }

    #[cfg(feature = "coreml")]
    {
        builder = builder
            .with_execution_providers([CoreMLExecutionProvider::default().with_subgraphs(true).build()])
            .map_err(|e| GestureError::ModelLoadError(format!("Failed to register CoreML EP: {e}")))?;
    }

    builder
        .with_optimization_level(GraphOptimizationLevel::Level3)
        .map_err(|e| GestureError::ModelLoadError(format!("Failed to set optimization level: {e}")))?
        .with_intra_threads(num_threads)
        .map_err(|e| GestureError::ModelLoadError(format!("Failed to set intra-thread count: {e}")))?
        .commit_from_file(path)
        .map_err(|e| GestureError::ModelLoadError(format!("Failed to load model: {e}")))
}

/// Read selected custom metadata entries from a session.
///
/// Missing keys are skipped.
///
/// # Errors
///
/// Returns [`GestureError::ModelLoadError`] if the metadata block itself
/// cannot be read.
pub fn custom_metadata(session: &Session, keys: &[&str]) -> Result<HashMap<String, String>> {
    let metadata = session
        .metadata()
        .map_err(|e| GestureError::ModelLoadError(format!("Failed to get model metadata: {e}")))?;

    let mut map = HashMap::new();
    for key in keys {
        if let Ok(Some(value)) = metadata.custom(key) {
            map.insert((*key).to_string(), value);
        }
    }
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_model() {
        let result = load_session(Path::new("nonexistent_hand_landmarker.onnx"), 0);
        assert!(matches!(result, Err(GestureError::ModelLoadError(_))));
    }
}
