// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Gesture catalog.
//!
//! A catalog is an ordered list of [`GestureSpec`]s. Order matters: when two
//! gestures reach the same score the one listed first wins, so the built-in
//! ASL catalog and any file-loaded catalog keep exactly the order they were
//! authored in.
//!
//! Catalog files are JSON, either a bare array of specs or an object with a
//! `name` and a `gestures` array:
//!
//! ```json
//! {
//!   "name": "thumbs",
//!   "gestures": [
//!     {
//!       "id": "THUMBS_UP",
//!       "name": "Thumbs Up",
//!       "checks": [{ "type": "extended", "finger": "thumb", "weight": 2.0 }],
//!       "min_score": 0.85
//!     }
//!   ]
//! }
//! ```

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{GestureError, Result};
use crate::landmarks::FingerId;
use crate::predicates::CheckKind;

/// Name of the built-in catalog.
pub const BUILTIN_ASL: &str = "asl";

/// One weighted predicate inside a gesture specification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Check {
    /// Predicate to evaluate.
    #[serde(rename = "type", alias = "kind")]
    pub kind: CheckKind,
    /// Finger the predicate is scoped to.
    pub finger: FingerId,
    /// Relative weight, strictly positive.
    pub weight: f32,
}

impl Check {
    /// Create a new check.
    #[must_use]
    pub const fn new(kind: CheckKind, finger: FingerId, weight: f32) -> Self {
        Self {
            kind,
            finger,
            weight,
        }
    }
}

/// Declarative description of one static gesture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GestureSpec {
    /// Unique identifier, e.g. `"A"`.
    pub id: String,
    /// Human-readable name, e.g. `"ASL Letter A"`.
    #[serde(rename = "name", alias = "display_name")]
    pub display_name: String,
    /// Weighted checks, in authoring order.
    pub checks: Vec<Check>,
    /// Minimum aggregate score for this gesture to be accepted.
    pub min_score: f32,
}

impl GestureSpec {
    /// Sum of all check weights.
    #[must_use]
    pub fn total_weight(&self) -> f32 {
        self.checks.iter().map(|c| c.weight).sum()
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct CatalogFile {
    #[serde(default)]
    name: Option<String>,
    gestures: Vec<GestureSpec>,
}

impl CatalogFile {
    fn parse(json: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        if value.is_array() {
            return Ok(Self {
                name: None,
                gestures: serde_json::from_value(value)?,
            });
        }
        Ok(serde_json::from_value(value)?)
    }
}

/// Immutable, ordered collection of gesture specifications.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GestureCatalog {
    name: String,
    gestures: Vec<GestureSpec>,
}

impl GestureCatalog {
    /// Build a catalog from specs, validating every entry.
    ///
    /// # Errors
    ///
    /// Returns [`GestureError::CatalogError`] if validation fails, see
    /// [`GestureCatalog::validate`].
    pub fn new(name: impl Into<String>, gestures: Vec<GestureSpec>) -> Result<Self> {
        let catalog = Self {
            name: name.into(),
            gestures,
        };
        catalog.validate()?;
        Ok(catalog)
    }

    /// Parse and validate a catalog from JSON text.
    ///
    /// Unknown check kinds and unknown fingers are rejected while parsing.
    ///
    /// # Errors
    ///
    /// Returns [`GestureError::CatalogError`] on malformed JSON or a catalog
    /// that fails validation.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let file = CatalogFile::parse(json)?;
        Self::new(file.name.unwrap_or_else(|| "custom".to_string()), file.gestures)
    }

    /// Load a catalog from a JSON file.
    ///
    /// A file without a `name` field takes its name from the file stem.
    ///
    /// # Errors
    ///
    /// Returns [`GestureError::Io`] if the file cannot be read, or
    /// [`GestureError::CatalogError`] if it cannot be parsed or validated.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let file = CatalogFile::parse(&text)
            .map_err(|e| GestureError::CatalogError(format!("{}: {e}", path.display())))?;

        let name = file.name.unwrap_or_else(|| {
            path.file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("custom")
                .to_string()
        });
        Self::new(name, file.gestures)
    }

    /// Check catalog invariants.
    ///
    /// # Errors
    ///
    /// Returns [`GestureError::CatalogError`] when the catalog is empty, an id
    /// is empty or duplicated, a spec has no checks, a weight is not a finite
    /// positive number, `min_score` lies outside `(0, 1]`, or a thumb-only
    /// check kind is scoped to another finger.
    pub fn validate(&self) -> Result<()> {
        if self.gestures.is_empty() {
            return Err(GestureError::CatalogError(format!(
                "catalog '{}' has no gestures",
                self.name
            )));
        }

        let mut seen = HashSet::with_capacity(self.gestures.len());
        for spec in &self.gestures {
            let id = &spec.id;
            if id.trim().is_empty() {
                return Err(GestureError::CatalogError("gesture id is empty".to_string()));
            }
            if !seen.insert(id.as_str()) {
                return Err(GestureError::CatalogError(format!("duplicate gesture id '{id}'")));
            }
            if spec.checks.is_empty() {
                return Err(GestureError::CatalogError(format!("gesture '{id}' has no checks")));
            }
            if !(spec.min_score > 0.0 && spec.min_score <= 1.0) {
                return Err(GestureError::CatalogError(format!(
                    "gesture '{id}': min_score {} must be in (0, 1]",
                    spec.min_score
                )));
            }
            for check in &spec.checks {
                if !check.weight.is_finite() || check.weight <= 0.0 {
                    return Err(GestureError::CatalogError(format!(
                        "gesture '{id}': {} on {} has non-positive weight {}",
                        check.kind, check.finger, check.weight
                    )));
                }
                if check.kind.is_thumb_only() && !check.finger.is_thumb() {
                    return Err(GestureError::CatalogError(format!(
                        "gesture '{id}': {} only applies to the thumb, not {}",
                        check.kind, check.finger
                    )));
                }
            }
        }
        Ok(())
    }

    /// Catalog name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Iterate specs in catalog order.
    pub fn iter(&self) -> std::slice::Iter<'_, GestureSpec> {
        self.gestures.iter()
    }

    /// Look up a spec by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&GestureSpec> {
        self.gestures.iter().find(|g| g.id == id)
    }

    /// Number of gestures.
    #[must_use]
    pub fn len(&self) -> usize {
        self.gestures.len()
    }

    /// Whether the catalog is empty. Always false for a validated catalog.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.gestures.is_empty()
    }

    /// Gesture ids in catalog order.
    #[must_use]
    pub fn ids(&self) -> Vec<&str> {
        self.gestures.iter().map(|g| g.id.as_str()).collect()
    }

    /// The built-in ASL fingerspelling catalog.
    ///
    /// Covers the static letters A B C D E F G H I K L M N O P Q R S T U V W X Y.
    /// Letters with identical checks (M, N and S; R and U) are resolved by
    /// catalog order, so the earlier letter wins a tie.
    #[must_use]
    pub fn builtin_asl() -> Self {
        use CheckKind::{
            CShape, Curled, Curved, Extended, OShape, Perpendicular, Spread, ThumbAcross,
            ThumbSide, Together,
        };
        use FingerId::{Index, Middle, Pinky, Ring, Thumb};

        let spec = |letter: &str, min_score: f32, checks: &[(CheckKind, FingerId, f32)]| {
            GestureSpec {
                id: letter.to_string(),
                display_name: format!("ASL Letter {letter}"),
                checks: checks
                    .iter()
                    .map(|&(kind, finger, weight)| Check::new(kind, finger, weight))
                    .collect(),
                min_score,
            }
        };

        let gestures = vec![
            spec("A", 0.75, &[
                (Curled, Index, 2.0), (Curled, Middle, 2.0), (Curled, Ring, 2.0),
                (Curled, Pinky, 2.0), (ThumbSide, Thumb, 2.0),
            ]),
            spec("B", 0.75, &[
                (Extended, Index, 2.0), (Extended, Middle, 2.0), (Extended, Ring, 2.0),
                (Extended, Pinky, 2.0), (Together, Index, 1.0), (ThumbAcross, Thumb, 1.5),
            ]),
            spec("C", 0.65, &[
                (Curved, Index, 2.0), (Curved, Middle, 2.0), (Curved, Ring, 2.0),
                (Curved, Pinky, 2.0), (Curved, Thumb, 1.5), (CShape, Thumb, 2.0),
            ]),
            spec("I", 0.75, &[
                (Curled, Index, 2.0), (Curled, Middle, 2.0), (Curled, Ring, 2.0),
                (Extended, Pinky, 3.0), (ThumbAcross, Thumb, 1.5),
            ]),
            spec("L", 0.75, &[
                (Curled, Middle, 2.0), (Curled, Ring, 2.0), (Curled, Pinky, 2.0),
                (Extended, Index, 2.5), (Extended, Thumb, 2.5), (Perpendicular, Thumb, 2.0),
            ]),
            spec("O", 0.75, &[
                (Curved, Index, 2.0), (Curved, Middle, 2.0), (Curved, Ring, 2.0),
                (Curved, Pinky, 2.0), (OShape, Thumb, 2.5),
            ]),
            spec("S", 0.75, &[
                (Curled, Index, 2.0), (Curled, Middle, 2.0), (Curled, Ring, 2.0),
                (Curled, Pinky, 2.0), (ThumbAcross, Thumb, 2.0),
            ]),
            spec("Y", 0.75, &[
                (Curled, Index, 2.0), (Curled, Middle, 2.0), (Curled, Ring, 2.0),
                (Extended, Pinky, 2.0), (Extended, Thumb, 2.0), (Spread, Pinky, 1.5),
            ]),
            spec("D", 0.75, &[
                (Extended, Index, 2.5), (Curled, Middle, 2.0), (Curled, Ring, 2.0),
                (Curled, Pinky, 2.0), (Together, Middle, 1.0), (Extended, Thumb, 1.5),
            ]),
            spec("E", 0.75, &[
                (Curled, Index, 2.0), (Curled, Middle, 2.0), (Curled, Ring, 2.0),
                (Curled, Pinky, 2.0), (Curled, Thumb, 2.0),
            ]),
            spec("F", 0.75, &[
                (Curled, Index, 2.0), (Extended, Middle, 2.0), (Extended, Ring, 2.0),
                (Extended, Pinky, 2.0), (Together, Middle, 1.0), (Extended, Thumb, 1.5),
            ]),
            spec("G", 0.75, &[
                (Extended, Index, 2.5), (Curled, Middle, 2.0), (Curled, Ring, 2.0),
                (Curled, Pinky, 2.0), (Extended, Thumb, 2.5), (Perpendicular, Thumb, 1.5),
            ]),
            spec("H", 0.75, &[
                (Extended, Index, 2.0), (Extended, Middle, 2.0), (Curled, Ring, 2.0),
                (Curled, Pinky, 2.0), (Together, Index, 1.5), (Extended, Thumb, 1.0),
            ]),
            spec("K", 0.75, &[
                (Extended, Index, 2.0), (Extended, Middle, 2.0), (Curled, Ring, 2.0),
                (Curled, Pinky, 2.0), (Spread, Index, 1.5), (Extended, Thumb, 2.0),
            ]),
            spec("M", 0.70, &[
                (Curled, Index, 2.0), (Curled, Middle, 2.0), (Curled, Ring, 2.0),
                (Curled, Pinky, 2.0), (ThumbAcross, Thumb, 2.0),
            ]),
            spec("N", 0.70, &[
                (Curled, Index, 2.0), (Curled, Middle, 2.0), (Curled, Ring, 2.0),
                (Curled, Pinky, 2.0), (ThumbAcross, Thumb, 2.0),
            ]),
            spec("P", 0.75, &[
                (Extended, Index, 2.0), (Extended, Middle, 2.0), (Curled, Ring, 2.0),
                (Curled, Pinky, 2.0), (Extended, Thumb, 2.0),
            ]),
            spec("Q", 0.75, &[
                (Extended, Index, 2.5), (Curled, Middle, 2.0), (Curled, Ring, 2.0),
                (Curled, Pinky, 2.0), (Extended, Thumb, 2.5),
            ]),
            spec("R", 0.75, &[
                (Extended, Index, 2.0), (Extended, Middle, 2.0), (Curled, Ring, 2.0),
                (Curled, Pinky, 2.0), (Together, Index, 2.0),
            ]),
            spec("T", 0.75, &[
                (Curled, Index, 2.0), (Curled, Middle, 2.0), (Curled, Ring, 2.0),
                (Curled, Pinky, 2.0), (ThumbAcross, Thumb, 2.5),
            ]),
            spec("U", 0.75, &[
                (Extended, Index, 2.0), (Extended, Middle, 2.0), (Curled, Ring, 2.0),
                (Curled, Pinky, 2.0), (Together, Index, 2.0),
            ]),
            spec("V", 0.75, &[
                (Extended, Index, 2.0), (Extended, Middle, 2.0), (Curled, Ring, 2.0),
                (Curled, Pinky, 2.0), (Spread, Index, 2.0),
            ]),
            spec("W", 0.75, &[
                (Extended, Index, 2.0), (Extended, Middle, 2.0), (Extended, Ring, 2.0),
                (Curled, Pinky, 2.0), (Spread, Middle, 1.5),
            ]),
            spec("X", 0.75, &[
                (Curved, Index, 2.5), (Curled, Middle, 2.0), (Curled, Ring, 2.0),
                (Curled, Pinky, 2.0), (Curled, Thumb, 1.5),
            ]),
        ];

        Self {
            name: BUILTIN_ASL.to_string(),
            gestures,
        }
    }
}

impl Default for GestureCatalog {
    fn default() -> Self {
        Self::builtin_asl()
    }
}

impl<'a> IntoIterator for &'a GestureCatalog {
    type Item = &'a GestureSpec;
    type IntoIter = std::slice::Iter<'a, GestureSpec>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
