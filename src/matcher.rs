// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Gesture scoring and best-match selection.

use std::sync::Arc;

use serde::Serialize;

use crate::catalog::{GestureCatalog, GestureSpec};
use crate::error::Result;
use crate::landmarks::{Landmark, LandmarkSet};
use crate::predicates::evaluate;

/// Outcome of matching one hand against a catalog.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct MatchResult {
    /// Id of the winning gesture, `None` when nothing cleared its floor.
    pub gesture_id: Option<String>,
    /// Display name of the winning gesture.
    pub display_name: Option<String>,
    /// Score of the winning gesture, 0.0 when nothing matched.
    pub confidence: f32,
}

impl MatchResult {
    /// Result for a hand that matched no gesture.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            gesture_id: None,
            display_name: None,
            confidence: 0.0,
        }
    }

    /// Whether a gesture was matched.
    #[must_use]
    pub const fn is_match(&self) -> bool {
        self.gesture_id.is_some()
    }
}

/// Per-gesture score, reported by [`rank`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GestureScore {
    /// Gesture id.
    pub id: String,
    /// Aggregate score in `[0, 1]`.
    pub score: f32,
    /// Floor the score is compared against.
    pub min_score: f32,
}

impl GestureScore {
    /// Whether the score clears the gesture's floor.
    #[must_use]
    pub fn eligible(&self) -> bool {
        self.score >= self.min_score
    }
}

/// Weighted average of a spec's check scores.
///
/// # Returns
///
/// `Σ(score_i × weight_i) / Σ(weight_i)`, in `[0, 1]` for a validated spec.
#[must_use]
pub fn score_spec(spec: &GestureSpec, landmarks: &LandmarkSet) -> f32 {
    let mut weighted = 0.0;
    let mut total = 0.0;
    for check in &spec.checks {
        weighted += evaluate(check.kind, check.finger, landmarks) * check.weight;
        total += check.weight;
    }

    if total > 0.0 {
        (weighted / total).clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Find the best gesture for a hand.
///
/// Specs are visited in catalog order. A spec is eligible when its score is at
/// least its `min_score`, and it replaces the current best only when strictly
/// greater, so the earliest spec wins ties.
///
/// # Returns
///
/// The winning gesture, or [`MatchResult::none`] if no spec is eligible.
#[must_use]
pub fn match_gesture(catalog: &GestureCatalog, landmarks: &LandmarkSet) -> MatchResult {
    let mut best: Option<&GestureSpec> = None;
    let mut best_score = 0.0;

    for spec in catalog {
        let score = score_spec(spec, landmarks);
        if score >= spec.min_score && score > best_score {
            best = Some(spec);
            best_score = score;
        }
    }

    best.map_or_else(MatchResult::none, |spec| MatchResult {
        gesture_id: Some(spec.id.clone()),
        display_name: Some(spec.display_name.clone()),
        confidence: best_score,
    })
}

/// Score every spec in catalog order.
#[must_use]
pub fn rank(catalog: &GestureCatalog, landmarks: &LandmarkSet) -> Vec<GestureScore> {
    catalog
        .iter()
        .map(|spec| GestureScore {
            id: spec.id.clone(),
            score: score_spec(spec, landmarks),
            min_score: spec.min_score,
        })
        .collect()
}

/// Shared matcher handle over an immutable catalog.
///
/// Cloning only bumps the catalog's reference count.
#[derive(Debug, Clone)]
pub struct GestureMatcher {
    catalog: Arc<GestureCatalog>,
}

impl GestureMatcher {
    /// Create a matcher over `catalog`.
    #[must_use]
    pub const fn new(catalog: Arc<GestureCatalog>) -> Self {
        Self { catalog }
    }

    /// The catalog this matcher uses.
    #[must_use]
    pub fn catalog(&self) -> &GestureCatalog {
        &self.catalog
    }

    /// Match a validated landmark set.
    #[must_use]
    pub fn match_set(&self, landmarks: &LandmarkSet) -> MatchResult {
        match_gesture(&self.catalog, landmarks)
    }

    /// Validate raw points and match them.
    ///
    /// # Errors
    ///
    /// Returns [`crate::GestureError::InvalidInput`] if `points` is not 21
    /// finite landmarks; nothing is scored in that case.
    pub fn match_points(&self, points: &[Landmark]) -> Result<MatchResult> {
        let landmarks = LandmarkSet::new(points)?;
        Ok(self.match_set(&landmarks))
    }

    /// Scores for every gesture, in catalog order.
    #[must_use]
    pub fn rank(&self, landmarks: &LandmarkSet) -> Vec<GestureScore> {
        rank(&self.catalog, landmarks)
    }
}

impl Default for GestureMatcher {
    fn default() -> Self {
        Self::new(Arc::new(GestureCatalog::builtin_asl()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Check;
    use crate::error::GestureError;
    use crate::landmarks::FingerId;
    use crate::predicates::CheckKind;

    /// Closed fist with the thumb pushed back across the knuckles.
    fn fist() -> LandmarkSet {
        let mut pts = vec![Landmark::new(0.5, 0.75, 0.0); 21];
        pts[0] = Landmark::new(0.5, 0.9, 0.0);
        pts[2] = Landmark::new(0.38, 0.78, 0.0);
        pts[3] = Landmark::new(0.36, 0.70, 0.0);
        pts[4] = Landmark::new(0.45, 0.66, 0.06);
        pts[5] = Landmark::new(0.42, 0.62, 0.0);
        pts[7] = Landmark::new(0.42, 0.58, 0.0);
        pts[8] = Landmark::new(0.42, 0.71, 0.0);
        pts[9] = Landmark::new(0.48, 0.60, 0.0);
        pts[11] = Landmark::new(0.48, 0.57, 0.0);
        pts[12] = Landmark::new(0.48, 0.70, 0.0);
        pts[13] = Landmark::new(0.54, 0.61, 0.0);
        pts[15] = Landmark::new(0.54, 0.58, 0.0);
        pts[16] = Landmark::new(0.54, 0.71, 0.0);
        pts[17] = Landmark::new(0.60, 0.64, 0.0);
        pts[19] = Landmark::new(0.60, 0.62, 0.0);
        pts[20] = Landmark::new(0.59, 0.73, 0.0);
        LandmarkSet::new(&pts).unwrap()
    }

    fn spec(id: &str, checks: Vec<Check>, min_score: f32) -> GestureSpec {
        GestureSpec {
            id: id.to_string(),
            display_name: format!("Gesture {id}"),
            checks,
            min_score,
        }
    }

    #[test]
    fn test_score_spec_weighted_average() {
        let lm = fist();
        let s = spec(
            "MIX",
            vec![
                Check::new(CheckKind::Curled, FingerId::Index, 3.0),
                Check::new(CheckKind::ThumbSide, FingerId::Thumb, 1.0),
            ],
            0.5,
        );
        assert!((score_spec(&s, &lm) - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_fist_matches_s() {
        let catalog = GestureCatalog::builtin_asl();
        let result = match_gesture(&catalog, &fist());
        assert_eq!(result.gesture_id.as_deref(), Some("S"));
        assert_eq!(result.display_name.as_deref(), Some("ASL Letter S"));
        assert!((result.confidence - 1.0).abs() < f32::EPSILON);

    }

    #[test]
    fn test_tucked_fist_leaves_a_eligible_but_s_wins() {
        // Thumb-side fails on depth, but the four curls still carry A over its floor.
        let catalog = GestureCatalog::builtin_asl();
        let lm = fist();
        assert!(evaluate(CheckKind::ThumbSide, FingerId::Thumb, &lm).abs() < f32::EPSILON);

        let scores = rank(&catalog, &lm);
        let a = scores.iter().find(|s| s.id == "A").unwrap();
        let s = scores.iter().find(|s| s.id == "S").unwrap();
        assert!((a.score - 0.8).abs() < 1e-6);
        assert!(a.eligible());
        assert!(s.score > a.score);
        assert_eq!(match_gesture(&catalog, &lm).gesture_id.as_deref(), Some("S"));
    }

    #[test]
    fn test_floor_is_hard() {
        // Best numeric score still rejected when under its own floor.
        let catalog = GestureCatalog::new(
            "floor",
            vec![spec(
                "HALF",
                vec![
                    Check::new(CheckKind::Curled, FingerId::Index, 1.0),
                    Check::new(CheckKind::ThumbSide, FingerId::Thumb, 1.0),
                ],
                0.6,
            )],
        )
        .unwrap();
        let result = match_gesture(&catalog, &fist());
        assert_eq!(result, MatchResult::none());
        assert!(!result.is_match());
    }

    #[test]
    fn test_tie_goes_to_earliest() {
        let checks = vec![
            Check::new(CheckKind::Curled, FingerId::Index, 1.0),
            Check::new(CheckKind::ThumbSide, FingerId::Thumb, 1.0),
        ];
        let catalog = GestureCatalog::new(
            "tie",
            vec![spec("FIRST", checks.clone(), 0.1), spec("SECOND", checks, 0.1)],
        )
        .unwrap();
        for _ in 0..3 {
            let result = match_gesture(&catalog, &fist());
            assert_eq!(result.gesture_id.as_deref(), Some("FIRST"));
            assert!((result.confidence - 0.5).abs() < 1e-6);
        }
    }

    #[test]
    fn test_later_strictly_better_wins() {
        let catalog = GestureCatalog::new(
            "better",
            vec![
                spec(
                    "WEAK",
                    vec![
                        Check::new(CheckKind::Curled, FingerId::Index, 1.0),
                        Check::new(CheckKind::ThumbSide, FingerId::Thumb, 1.0),
                    ],
                    0.1,
                ),
                spec("STRONG", vec![Check::new(CheckKind::Curled, FingerId::Ring, 1.0)], 0.9),
            ],
        )
        .unwrap();
        let result = match_gesture(&catalog, &fist());
        assert_eq!(result.gesture_id.as_deref(), Some("STRONG"));
    }

    #[test]
    fn test_matcher_rejects_bad_points() {
        let matcher = GestureMatcher::default();
        let err = matcher.match_points(&[Landmark::default(); 20]).unwrap_err();
        assert!(matches!(err, GestureError::InvalidInput(_)));

        let ok = matcher.match_points(fist().points()).unwrap();
        assert_eq!(ok.gesture_id.as_deref(), Some("S"));
    }

    #[test]
    fn test_matcher_clone_shares_catalog() {
        let matcher = GestureMatcher::default();
        let other = matcher.clone();
        assert!(std::ptr::eq(matcher.catalog(), other.catalog()));
    }
}
