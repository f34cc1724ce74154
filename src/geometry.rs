// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Vector helpers used by the predicate evaluators.

use crate::landmarks::Landmark;

/// Guard added to the norm product so degenerate vectors never divide by zero.
pub const ANGLE_EPSILON: f32 = 1e-6;

/// Euclidean distance between two landmarks.
///
/// # Arguments
///
/// * `p` - First point.
/// * `q` - Second point.
///
/// # Returns
///
/// `|p - q|` over all three coordinates.
#[must_use]
pub fn distance(p: &Landmark, q: &Landmark) -> f32 {
    norm(p.sub(q))
}

/// Angle between two vectors in degrees.
///
/// Computes `acos(clip(dot(u, v) / (|u| |v| + ε), -1, 1))`. A zero-length
/// vector yields 90°, since the dot product is then zero.
///
/// # Returns
///
/// Angle in `[0, 180]`.
#[must_use]
pub fn angle_between(u: [f32; 3], v: [f32; 3]) -> f32 {
    let dot = u[0] * v[0] + u[1] * v[1] + u[2] * v[2];
    let cos = dot / (norm(u) * norm(v) + ANGLE_EPSILON);
    cos.clamp(-1.0, 1.0).acos().to_degrees()
}

/// Euclidean length of a vector.
#[must_use]
pub fn norm(v: [f32; 3]) -> f32 {
    (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt()
}
