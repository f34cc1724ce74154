// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Hand landmark types.
//!
//! A detected hand is described by 21 points at fixed anatomical indices
//! (the MediaPipe hand topology). [`LandmarkSet`] can only be built through
//! validation, so any value of that type is known to hold exactly 21 finite
//! points.

use std::fmt;
use std::ops::Index;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{GestureError, Result};

/// Number of landmarks in one hand skeleton.
pub const NUM_LANDMARKS: usize = 21;

/// Index of the wrist landmark.
pub const WRIST: usize = 0;

/// A single 3-D hand landmark.
///
/// `x` and `y` are normalized to the source image extent. `z` is a relative
/// depth whose scale and sign convention come from the upstream detector and
/// are used as-is.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f32; 3]", into = "[f32; 3]")]
pub struct Landmark {
    /// Horizontal coordinate, normalized to image width.
    pub x: f32,
    /// Vertical coordinate, normalized to image height (grows downwards).
    pub y: f32,
    /// Relative depth.
    pub z: f32,
}

impl Landmark {
    /// Create a new landmark.
    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Whether all three coordinates are finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    /// Component-wise difference `self - other`.
    #[must_use]
    pub fn sub(&self, other: &Self) -> [f32; 3] {
        [self.x - other.x, self.y - other.y, self.z - other.z]
    }

    /// Coordinates as an array.
    #[must_use]
    pub const fn to_array(self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }
}

impl From<[f32; 3]> for Landmark {
    fn from(v: [f32; 3]) -> Self {
        Self::new(v[0], v[1], v[2])
    }
}

impl From<Landmark> for [f32; 3] {
    fn from(lm: Landmark) -> Self {
        lm.to_array()
    }
}

/// The five digits of a hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FingerId {
    /// Thumb.
    Thumb,
    /// Index finger.
    Index,
    /// Middle finger.
    Middle,
    /// Ring finger.
    Ring,
    /// Pinky finger.
    Pinky,
}

/// Landmark indices of one finger's tip, proximal joint and base knuckle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FingerJoints {
    /// Fingertip.
    pub tip: usize,
    /// Proximal joint ("ip" on the thumb, "pip" on the other fingers).
    pub pip: usize,
    /// Base knuckle.
    pub mcp: usize,
}

impl FingerId {
    /// All fingers, thumb first.
    pub const ALL: [Self; 5] = [
        Self::Thumb,
        Self::Index,
        Self::Middle,
        Self::Ring,
        Self::Pinky,
    ];

    /// Lowercase name used in catalogs and logs.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Thumb => "thumb",
            Self::Index => "index",
            Self::Middle => "middle",
            Self::Ring => "ring",
            Self::Pinky => "pinky",
        }
    }

    /// Landmark indices for this finger.
    #[must_use]
    pub const fn joints(&self) -> FingerJoints {
        match self {
            Self::Thumb => FingerJoints { tip: 4, pip: 3, mcp: 2 },
            Self::Index => FingerJoints { tip: 8, pip: 7, mcp: 5 },
            Self::Middle => FingerJoints { tip: 12, pip: 11, mcp: 9 },
            Self::Ring => FingerJoints { tip: 16, pip: 15, mcp: 13 },
            Self::Pinky => FingerJoints { tip: 20, pip: 19, mcp: 17 },
        }
    }

    /// Whether this is the thumb.
    #[must_use]
    pub const fn is_thumb(&self) -> bool {
        matches!(self, Self::Thumb)
    }
}

impl fmt::Display for FingerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for FingerId {
    type Err = GestureError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "thumb" => Ok(Self::Thumb),
            "index" => Ok(Self::Index),
            "middle" => Ok(Self::Middle),
            "ring" => Ok(Self::Ring),
            "pinky" | "little" => Ok(Self::Pinky),
            _ => Err(GestureError::CatalogError(format!(
                "invalid finger '{s}', expected one of: thumb, index, middle, ring, pinky"
            ))),
        }
    }
}

/// The validated 21-point skeleton of one hand at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(transparent)]
pub struct LandmarkSet {
    points: [Landmark; NUM_LANDMARKS],
}

impl LandmarkSet {
    /// Validate raw points into a landmark set.
    ///
    /// # Errors
    ///
    /// Returns [`GestureError::InvalidInput`] if `points` does not hold exactly
    /// 21 landmarks or any coordinate is NaN or infinite.
    pub fn new(points: &[Landmark]) -> Result<Self> {
        let points: [Landmark; NUM_LANDMARKS] = points.try_into().map_err(|_| {
            GestureError::InvalidInput(format!(
                "expected {NUM_LANDMARKS} landmarks, got {}",
                points.len()
            ))
        })?;

        if let Some(idx) = points.iter().position(|p| !p.is_finite()) {
            return Err(GestureError::InvalidInput(format!(
                "landmark {idx} has a non-finite coordinate"
            )));
        }

        Ok(Self { points })
    }

    /// Parse a JSON array of `[x, y, z]` triples.
    ///
    /// # Errors
    ///
    /// Returns [`GestureError::InvalidInput`] if the JSON is malformed or the
    /// points fail validation.
    pub fn from_json(json: &str) -> Result<Self> {
        let points: Vec<Landmark> = serde_json::from_str(json)
            .map_err(|e| GestureError::InvalidInput(format!("malformed landmark JSON: {e}")))?;
        Self::new(&points)
    }

    /// All points in anatomical order.
    #[must_use]
    pub const fn points(&self) -> &[Landmark; NUM_LANDMARKS] {
        &self.points
    }

    /// The wrist landmark.
    #[must_use]
    pub const fn wrist(&self) -> &Landmark {
        &self.points[WRIST]
    }

    /// Tip of `finger`.
    #[must_use]
    pub const fn tip(&self, finger: FingerId) -> &Landmark {
        &self.points[finger.joints().tip]
    }

    /// Proximal joint of `finger`.
    #[must_use]
    pub const fn pip(&self, finger: FingerId) -> &Landmark {
        &self.points[finger.joints().pip]
    }

    /// Base knuckle of `finger`.
    #[must_use]
    pub const fn mcp(&self, finger: FingerId) -> &Landmark {
        &self.points[finger.joints().mcp]
    }
}

impl Index<usize> for LandmarkSet {
    type Output = Landmark;

    fn index(&self, index: usize) -> &Self::Output {
        &self.points[index]
    }
}

impl<'de> Deserialize<'de> for LandmarkSet {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let points = Vec::<Landmark>::deserialize(deserializer)?;
        Self::new(&points).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn points(n: usize) -> Vec<Landmark> {
        (0..n)
            .map(|i| Landmark::new(i as f32 * 0.01, 0.5, 0.0))
            .collect()
    }

    #[test]
    fn test_landmark_set_valid() {
        let set = LandmarkSet::new(&points(21)).unwrap();
        assert_eq!(set.points().len(), NUM_LANDMARKS);
        assert!((set.tip(FingerId::Index).x - 0.08).abs() < f32::EPSILON);
        assert!((set[20].x - 0.20).abs() < f32::EPSILON);
    }

    #[test]
    fn test_landmark_set_wrong_length() {
        for n in [0, 20, 22] {
            let err = LandmarkSet::new(&points(n)).unwrap_err();
            assert!(matches!(err, GestureError::InvalidInput(_)), "n={n}");
        }
    }

    #[test]
    fn test_landmark_set_non_finite() {
        let mut pts = points(21);
        pts[7].y = f32::NAN;
        let err = LandmarkSet::new(&pts).unwrap_err();
        assert_eq!(err.to_string(), "Invalid input: landmark 7 has a non-finite coordinate");

        let mut pts = points(21);
        pts[0].z = f32::INFINITY;
        assert!(LandmarkSet::new(&pts).is_err());
    }

    #[test]
    fn test_finger_joints() {
        assert_eq!(FingerId::Thumb.joints(), FingerJoints { tip: 4, pip: 3, mcp: 2 });
        assert_eq!(FingerId::Index.joints(), FingerJoints { tip: 8, pip: 7, mcp: 5 });
        assert_eq!(FingerId::Middle.joints(), FingerJoints { tip: 12, pip: 11, mcp: 9 });
        assert_eq!(FingerId::Ring.joints(), FingerJoints { tip: 16, pip: 15, mcp: 13 });
        assert_eq!(FingerId::Pinky.joints(), FingerJoints { tip: 20, pip: 19, mcp: 17 });
    }

    #[test]
    fn test_finger_from_str() {
        assert_eq!("thumb".parse::<FingerId>().unwrap(), FingerId::Thumb);
        assert_eq!("Pinky".parse::<FingerId>().unwrap(), FingerId::Pinky);
        assert_eq!("little".parse::<FingerId>().unwrap(), FingerId::Pinky);
        assert!("toe".parse::<FingerId>().is_err());
        assert_eq!(FingerId::Middle.to_string(), "middle");
    }

    #[test]
    fn test_from_json() {
        let json = serde_json::to_string(&points(21)).unwrap();
        assert!(json.starts_with("[[0.0,0.5,0.0]"));
        let set = LandmarkSet::from_json(&json).unwrap();
        assert_eq!(set.points().to_vec(), points(21));

        assert!(matches!(
            LandmarkSet::from_json("[[0.0, 0.5]]"),
            Err(GestureError::InvalidInput(_))
        ));
        let short = serde_json::to_string(&points(20)).unwrap();
        assert!(LandmarkSet::from_json(&short).is_err());
    }
}
