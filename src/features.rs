// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Feature extraction for the statistical classifier.

use ndarray::{Array1, Array2};

use crate::landmarks::{LandmarkSet, NUM_LANDMARKS};

/// Length of the classifier feature vector (x and y for every landmark).
pub const NUM_FEATURES: usize = NUM_LANDMARKS * 2;

/// Min-max normalize landmark x and y per axis.
///
/// Depth is dropped. An axis with zero extent is divided by 1 instead, which
/// leaves every value on that axis at 0.
///
/// # Returns
///
/// `[x0', y0', x1', y1', ...]` with 42 values in `[0, 1]`.
#[must_use]
pub fn normalize_landmarks(landmarks: &LandmarkSet) -> Array1<f32> {
    let points = landmarks.points();

    let (min_x, max_x) = min_max(points.iter().map(|p| p.x));
    let (min_y, max_y) = min_max(points.iter().map(|p| p.y));
    let range_x = non_zero(max_x - min_x);
    let range_y = non_zero(max_y - min_y);

    points
        .iter()
        .flat_map(|p| [(p.x - min_x) / range_x, (p.y - min_y) / range_y])
        .collect()
}

/// Normalized features shaped as a single-row batch `[1, 42]`.
#[must_use]
pub fn feature_batch(landmarks: &LandmarkSet) -> Array2<f32> {
    normalize_landmarks(landmarks).insert_axis(ndarray::Axis(0))
}

fn min_max(values: impl Iterator<Item = f32>) -> (f32, f32) {
    values.fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    })
}

fn non_zero(range: f32) -> f32 {
    if range == 0.0 { 1.0 } else { range }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::Landmark;

    #[test]
    fn test_normalize_range() {
        let pts: Vec<Landmark> = (0..21)
            .map(|i| Landmark::new(0.2 + i as f32 * 0.01, 0.9 - i as f32 * 0.02, 0.5))
            .collect();
        let features = normalize_landmarks(&LandmarkSet::new(&pts).unwrap());
        assert_eq!(features.len(), NUM_FEATURES);
        assert!(features[0].abs() < 1e-6);
        assert!((features[1] - 1.0).abs() < 1e-6);
        assert!((features[40] - 1.0).abs() < 1e-6);
        assert!(features[41].abs() < 1e-6);
        assert!(features.iter().all(|v| (0.0..=1.0).contains(v)));
    }

    #[test]
    fn test_flat_axis_divides_by_one() {
        let pts: Vec<Landmark> = (0..21)
            .map(|i| Landmark::new(i as f32 * 0.05, 0.4, 0.0))
            .collect();
        let features = normalize_landmarks(&LandmarkSet::new(&pts).unwrap());
        assert!(features.iter().skip(1).step_by(2).all(|v| v.abs() < f32::EPSILON));
        assert!((features[40] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_translation_invariant() {
        let pts: Vec<Landmark> = (0..21)
            .map(|i| Landmark::new((i % 5) as f32 * 0.03, (i / 5) as f32 * 0.04, 0.0))
            .collect();
        let shifted: Vec<Landmark> = pts
            .iter()
            .map(|p| Landmark::new(p.x + 0.3, p.y + 0.1, p.z))
            .collect();
        let a = normalize_landmarks(&LandmarkSet::new(&pts).unwrap());
        let b = normalize_landmarks(&LandmarkSet::new(&shifted).unwrap());
        for (x, y) in a.iter().zip(b.iter()) {
            assert!((x - y).abs() < 1e-4);
        }
        assert_eq!(feature_batch(&LandmarkSet::new(&pts).unwrap()).shape(), &[1, NUM_FEATURES]);
    }
}
