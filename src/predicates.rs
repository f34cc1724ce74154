// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Finger-state predicates.
//!
//! Each [`CheckKind`] maps landmark geometry for one finger to a soft score in
//! `[0, 1]`. Distances labelled "to the wrist" are Euclidean distances from the
//! joint to landmark 0. All thresholds are in normalized image units and are
//! exposed as constants so catalogs can be reasoned about without reading the
//! evaluator bodies.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::GestureError;
use crate::geometry::{angle_between, distance};
use crate::landmarks::{FingerId, LandmarkSet};

/// Extended (non-thumb): tip must be this much farther from the wrist than the pip.
pub const EXTENDED_TIP_OVER_PIP: f32 = 1.1;
/// Extended (non-thumb): pip must be at least this fraction of the mcp distance.
pub const EXTENDED_PIP_OVER_MCP: f32 = 0.9;
/// Extended (non-thumb): ramp denominator as a fraction of the mcp distance.
pub const EXTENDED_RAMP_SPAN: f32 = 0.3;
/// Extended (thumb): tip-to-wrist over ip-to-wrist ratio.
pub const THUMB_EXTENDED_OVER_IP: f32 = 1.2;

/// Extended-down (thumb): tip-to-wrist over ip-to-wrist ratio.
pub const THUMB_DOWN_OVER_IP: f32 = 1.3;
/// Extended-down (thumb): tip must sit at least this far below the thumb mcp.
pub const THUMB_DOWN_MIN_DROP: f32 = 0.05;
/// Extended-down (thumb): minimum distance between thumb tip and index knuckle.
pub const THUMB_DOWN_MIN_CLEARANCE: f32 = 0.10;

/// Extended-up (thumb): tip-to-wrist over ip-to-wrist ratio.
pub const THUMB_UP_OVER_IP: f32 = THUMB_DOWN_OVER_IP;
/// Extended-up (thumb): tip must sit at least this far above the thumb mcp.
pub const THUMB_UP_MIN_RISE: f32 = THUMB_DOWN_MIN_DROP;
/// Extended-up (thumb): minimum distance between thumb tip and index knuckle.
pub const THUMB_UP_MIN_CLEARANCE: f32 = THUMB_DOWN_MIN_CLEARANCE;

/// Curled (non-thumb): tip-to-wrist under this multiple of mcp-to-wrist scores 1.0.
pub const CURLED_TIP_UNDER_MCP: f32 = 1.3;
/// Curled (non-thumb): decay span as a fraction of the mcp distance.
pub const CURLED_RAMP_SPAN: f32 = 0.5;
/// Curled (thumb): tip-to-wrist under this multiple of mcp-to-wrist.
pub const THUMB_CURLED_UNDER_MCP: f32 = 1.4;

/// Curved: exclusive lower bound of the tip/mcp distance ratio.
pub const CURVED_MIN_RATIO: f32 = 1.1;
/// Curved: exclusive upper bound of the tip/mcp distance ratio.
pub const CURVED_MAX_RATIO: f32 = 2.0;

/// Thumb-side: thumb tip must be within this distance of the index or middle knuckle.
pub const THUMB_SIDE_MAX_DIST: f32 = 0.15;
/// Thumb-side: thumb tip depth may exceed the index knuckle depth by less than this.
pub const THUMB_SIDE_DEPTH_MARGIN: f32 = 0.05;

/// Thumb-across: thumb tip must be within this distance of a reference joint.
pub const THUMB_ACROSS_MAX_DIST: f32 = 0.08;
/// Thumb-across: thumb tip depth must exceed the index knuckle depth minus this.
pub const THUMB_ACROSS_DEPTH_MARGIN: f32 = 0.02;

/// Together: neighbouring tips closer than this.
pub const TOGETHER_MAX_DIST: f32 = 0.08;
/// Spread: thumb tip and pinky tip farther apart than this.
pub const SPREAD_MIN_DIST: f32 = 0.15;

/// Perpendicular: inclusive lower bound in degrees.
pub const PERPENDICULAR_MIN_DEG: f32 = 70.0;
/// Perpendicular: inclusive upper bound in degrees.
pub const PERPENDICULAR_MAX_DEG: f32 = 110.0;

/// C-shape: exclusive lower bound on the thumb-tip/index-tip distance.
pub const C_SHAPE_MIN_DIST: f32 = 0.05;
/// C-shape: exclusive upper bound on the thumb-tip/index-tip distance.
pub const C_SHAPE_MAX_DIST: f32 = 0.25;
/// O-shape: thumb-tip/index-tip distance must be under this.
pub const O_SHAPE_MAX_DIST: f32 = 0.06;

/// Kind of finger-state predicate a catalog check applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckKind {
    /// Finger straightened away from the palm.
    Extended,
    /// Thumb straightened and pointing downwards.
    ExtendedDown,
    /// Thumb straightened and pointing upwards.
    ExtendedUp,
    /// Finger folded into the palm.
    Curled,
    /// Finger partially bent, as in a C or O.
    Curved,
    /// Thumb resting along the side of the fist.
    ThumbSide,
    /// Thumb tucked across the front of the fingers.
    ThumbAcross,
    /// Finger tip held against its neighbour.
    Together,
    /// Fingers spread apart.
    Spread,
    /// Thumb at roughly a right angle to the index finger.
    Perpendicular,
    /// Thumb and index forming an open C.
    CShape,
    /// Thumb and index tips touching.
    OShape,
}

impl CheckKind {
    /// All check kinds.
    pub const ALL: [Self; 12] = [
        Self::Extended,
        Self::ExtendedDown,
        Self::ExtendedUp,
        Self::Curled,
        Self::Curved,
        Self::ThumbSide,
        Self::ThumbAcross,
        Self::Together,
        Self::Spread,
        Self::Perpendicular,
        Self::CShape,
        Self::OShape,
    ];

    /// Snake-case name used in catalog files.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Extended => "extended",
            Self::ExtendedDown => "extended_down",
            Self::ExtendedUp => "extended_up",
            Self::Curled => "curled",
            Self::Curved => "curved",
            Self::ThumbSide => "thumb_side",
            Self::ThumbAcross => "thumb_across",
            Self::Together => "together",
            Self::Spread => "spread",
            Self::Perpendicular => "perpendicular",
            Self::CShape => "c_shape",
            Self::OShape => "o_shape",
        }
    }

    /// Whether this kind is only meaningful for the thumb.
    ///
    /// Thumb-only kinds evaluate to 0.0 for every other finger.
    #[must_use]
    pub const fn is_thumb_only(&self) -> bool {
        matches!(
            self,
            Self::ExtendedDown
                | Self::ExtendedUp
                | Self::ThumbSide
                | Self::ThumbAcross
                | Self::Perpendicular
                | Self::CShape
                | Self::OShape
        )
    }
}

impl fmt::Display for CheckKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for CheckKind {
    type Err = GestureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| GestureError::CatalogError(format!("unknown check kind '{s}'")))
    }
}

/// Evaluate one predicate for one finger.
///
/// # Arguments
///
/// * `kind` - Predicate to apply.
/// * `finger` - Finger the predicate is scoped to.
/// * `landmarks` - Validated hand skeleton.
///
/// # Returns
///
/// Soft score in `[0, 1]`. Thumb-only kinds return 0.0 for other fingers;
/// `together` and `spread` return 1.0 for fingers they have no rule for.
#[must_use]
pub fn evaluate(kind: CheckKind, finger: FingerId, landmarks: &LandmarkSet) -> f32 {
    if kind.is_thumb_only() && !finger.is_thumb() {
        return 0.0;
    }

    let score = match kind {
        CheckKind::Extended => extended(finger, landmarks),
        CheckKind::ExtendedDown => extended_down(landmarks),
        CheckKind::ExtendedUp => extended_up(landmarks),
        CheckKind::Curled => curled(finger, landmarks),
        CheckKind::Curved => curved(finger, landmarks),
        CheckKind::ThumbSide => thumb_side(landmarks),
        CheckKind::ThumbAcross => thumb_across(landmarks),
        CheckKind::Together => together(finger, landmarks),
        CheckKind::Spread => spread(finger, landmarks),
        CheckKind::Perpendicular => perpendicular(landmarks),
        CheckKind::CShape => c_shape(landmarks),
        CheckKind::OShape => o_shape(landmarks),
    };

    if score.is_finite() {
        score.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

#[inline]
const fn flag(condition: bool) -> f32 {
    if condition { 1.0 } else { 0.0 }
}

/// Distances from the wrist to a finger's tip, proximal joint and knuckle.
fn wrist_distances(finger: FingerId, lm: &LandmarkSet) -> (f32, f32, f32) {
    let wrist = lm.wrist();
    (
        distance(lm.tip(finger), wrist),
        distance(lm.pip(finger), wrist),
        distance(lm.mcp(finger), wrist),
    )
}

fn extended(finger: FingerId, lm: &LandmarkSet) -> f32 {
    let (tip, pip, mcp) = wrist_distances(finger, lm);

    if finger.is_thumb() {
        return flag(tip > pip * THUMB_EXTENDED_OVER_IP);
    }

    if tip > pip * EXTENDED_TIP_OVER_PIP && pip > mcp * EXTENDED_PIP_OVER_MCP {
        return 1.0;
    }
    if mcp <= 0.0 {
        return 0.0;
    }
    ((tip - pip) / (mcp * EXTENDED_RAMP_SPAN)).clamp(0.0, 1.0)
}

fn extended_down(lm: &LandmarkSet) -> f32 {
    let thumb = FingerId::Thumb;
    let (tip, ip, _) = wrist_distances(thumb, lm);
    let tip_pt = lm.tip(thumb);

    let long_enough = tip > ip * THUMB_DOWN_OVER_IP;
    let pointing_down = tip_pt.y >= lm.mcp(thumb).y + THUMB_DOWN_MIN_DROP;
    let clear_of_fist = distance(tip_pt, lm.mcp(FingerId::Index)) >= THUMB_DOWN_MIN_CLEARANCE;

    flag(long_enough && pointing_down && clear_of_fist)
}

fn extended_up(lm: &LandmarkSet) -> f32 {
    let thumb = FingerId::Thumb;
    let (tip, ip, _) = wrist_distances(thumb, lm);
    let tip_pt = lm.tip(thumb);

    let long_enough = tip > ip * THUMB_UP_OVER_IP;
    let pointing_up = tip_pt.y <= lm.mcp(thumb).y - THUMB_UP_MIN_RISE;
    let clear_of_fist = distance(tip_pt, lm.mcp(FingerId::Index)) >= THUMB_UP_MIN_CLEARANCE;

    flag(long_enough && pointing_up && clear_of_fist)
}

fn curled(finger: FingerId, lm: &LandmarkSet) -> f32 {
    let (tip, _, mcp) = wrist_distances(finger, lm);

    if finger.is_thumb() {
        return flag(tip < mcp * THUMB_CURLED_UNDER_MCP);
    }

    if tip < mcp * CURLED_TIP_UNDER_MCP {
        return 1.0;
    }
    if mcp <= 0.0 {
        return 0.0;
    }
    (1.0 - (tip - mcp * CURLED_TIP_UNDER_MCP) / (mcp * CURLED_RAMP_SPAN)).max(0.0)
}

fn curved(finger: FingerId, lm: &LandmarkSet) -> f32 {
    let (tip, _, mcp) = wrist_distances(finger, lm);
    if mcp <= 0.0 {
        return 0.0;
    }
    let ratio = tip / mcp;
    flag(ratio > CURVED_MIN_RATIO && ratio < CURVED_MAX_RATIO)
}

fn thumb_side(lm: &LandmarkSet) -> f32 {
    let tip = lm.tip(FingerId::Thumb);
    let index_mcp = lm.mcp(FingerId::Index);
    let middle_mcp = lm.mcp(FingerId::Middle);

    let near_side = distance(tip, index_mcp) < THUMB_SIDE_MAX_DIST
        || distance(tip, middle_mcp) < THUMB_SIDE_MAX_DIST;
    let not_tucked = tip.z < index_mcp.z + THUMB_SIDE_DEPTH_MARGIN;

    flag(near_side && not_tucked)
}

fn thumb_across(lm: &LandmarkSet) -> f32 {
    let tip = lm.tip(FingerId::Thumb);
    let index_mcp = lm.mcp(FingerId::Index);

    let close = [index_mcp, lm.mcp(FingerId::Middle), lm.pip(FingerId::Index)]
        .into_iter()
        .any(|joint| distance(tip, joint) < THUMB_ACROSS_MAX_DIST);
    let tucked = tip.z > index_mcp.z - THUMB_ACROSS_DEPTH_MARGIN;

    flag(close && tucked)
}

fn together(finger: FingerId, lm: &LandmarkSet) -> f32 {
    let neighbour = match finger {
        FingerId::Index => FingerId::Middle,
        FingerId::Middle => FingerId::Ring,
        FingerId::Ring => FingerId::Pinky,
        FingerId::Thumb | FingerId::Pinky => return 1.0,
    };
    flag(distance(lm.tip(finger), lm.tip(neighbour)) < TOGETHER_MAX_DIST)
}

fn spread(finger: FingerId, lm: &LandmarkSet) -> f32 {
    if finger != FingerId::Pinky {
        return 1.0;
    }
    flag(distance(lm.tip(FingerId::Thumb), lm.tip(FingerId::Pinky)) > SPREAD_MIN_DIST)
}

fn perpendicular(lm: &LandmarkSet) -> f32 {
    let thumb = lm.tip(FingerId::Thumb).sub(lm.mcp(FingerId::Thumb));
    let index = lm.tip(FingerId::Index).sub(lm.mcp(FingerId::Index));
    let angle = angle_between(thumb, index);
    flag((PERPENDICULAR_MIN_DEG..=PERPENDICULAR_MAX_DEG).contains(&angle))
}

fn thumb_index_gap(lm: &LandmarkSet) -> f32 {
    distance(lm.tip(FingerId::Thumb), lm.tip(FingerId::Index))
}

fn c_shape(lm: &LandmarkSet) -> f32 {
    let gap = thumb_index_gap(lm);
    flag(gap > C_SHAPE_MIN_DIST && gap < C_SHAPE_MAX_DIST)
}

fn o_shape(lm: &LandmarkSet) -> f32 {
    flag(thumb_index_gap(lm) < O_SHAPE_MAX_DIST)
}
