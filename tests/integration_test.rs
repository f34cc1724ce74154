// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Integration tests for the recognition pipeline

use std::sync::Arc;

use image::DynamicImage;
use signspeak::{
    FingerId, GestureCatalog, GestureMatcher, HandLandmarker, Landmark, LandmarkSet, Recognizer,
    RecognizerConfig, Result,
};

/// Closed fist, palm facing the camera, thumb tip resting near the index
/// knuckle at depth `thumb_z`.
fn fist(thumb_z: f32) -> Vec<Landmark> {
    let mut pts = vec![Landmark::default(); 21];
    pts[0] = Landmark::new(0.5, 0.9, 0.0);
    pts[1] = Landmark::new(0.42, 0.84, 0.0);
    pts[2] = Landmark::new(0.38, 0.78, 0.0);
    pts[3] = Landmark::new(0.36, 0.70, 0.0);
    pts[4] = Landmark::new(0.45, 0.66, thumb_z);
    for (finger, mcp, pip, tip) in [
        (FingerId::Index, (0.42, 0.62), (0.42, 0.58), (0.42, 0.71)),
        (FingerId::Middle, (0.48, 0.60), (0.48, 0.57), (0.48, 0.70)),
        (FingerId::Ring, (0.54, 0.61), (0.54, 0.58), (0.54, 0.71)),
        (FingerId::Pinky, (0.60, 0.64), (0.60, 0.62), (0.59, 0.73)),
    ] {
        let j = finger.joints();
        pts[j.mcp] = Landmark::new(mcp.0, mcp.1, 0.0);
        pts[j.mcp + 1] = Landmark::new(pip.0, pip.1 + 0.01, 0.0);
        pts[j.pip] = Landmark::new(pip.0, pip.1, 0.0);
        pts[j.tip] = Landmark::new(tip.0, tip.1, 0.0);
    }
    pts
}

/// Index and middle fingers raised, tips `gap` apart; ring and pinky curled.
fn two_fingers(gap: f32) -> Vec<Landmark> {
    let mut pts = fist(0.0);
    pts[6] = Landmark::new(0.42, 0.52, 0.0);
    pts[7] = Landmark::new(0.42, 0.45, 0.0);
    pts[8] = Landmark::new(0.44, 0.30, 0.0);
    pts[10] = Landmark::new(0.48, 0.50, 0.0);
    pts[11] = Landmark::new(0.48, 0.43, 0.0);
    pts[12] = Landmark::new(0.44 + gap, 0.30, 0.0);
    pts
}

/// Fist with the thumb pointing straight up.
fn thumb_up() -> Vec<Landmark> {
    let mut pts = fist(0.0);
    pts[4] = Landmark::new(0.36, 0.45, 0.0);
    pts
}

/// Fist turned upside down with the thumb pointing at the floor.
fn thumb_down() -> Vec<Landmark> {
    let mut pts: Vec<Landmark> = fist(0.0)
        .into_iter()
        .map(|p| Landmark::new(p.x, 1.2 - p.y, p.z))
        .collect();
    pts[2] = Landmark::new(0.38, 0.42, 0.0);
    pts[3] = Landmark::new(0.36, 0.50, 0.0);
    pts[4] = Landmark::new(0.36, 0.80, 0.0);
    pts
}

fn rules() -> Recognizer {
    Recognizer::new(RecognizerConfig::default()).unwrap()
}

fn thumbs_catalog_path() -> String {
    format!("{}/demos/thumbs.json", env!("CARGO_MANIFEST_DIR"))
}

struct FixedHand(LandmarkSet);

impl HandLandmarker for FixedHand {
    fn detect(&mut self, _image: &DynamicImage) -> Result<Option<LandmarkSet>> {
        Ok(Some(self.0))
    }
}

#[test]
fn test_fist_with_thumb_across_is_s() {
    let response = rules().recognize_points(&fist(0.06));
    assert!(response.success);
    assert_eq!(response.sign, "ASL_S");
    assert!((response.confidence - 1.0).abs() < f32::EPSILON);
    assert!(response.error.is_none());
    assert_eq!(
        response.landmarks.as_deref(),
        Some("Thumb: (0.45, 0.66); Index: (0.42, 0.71); Middle: (0.48, 0.70); Ring: (0.54, 0.71); Pinky: (0.59, 0.73)")
    );
}

#[test]
fn test_fingers_together_is_r() {
    let response = rules().recognize_points(&two_fingers(0.079));
    assert_eq!(response.sign, "ASL_R");
    assert!((response.confidence - 1.0).abs() < f32::EPSILON);
}

#[test]
fn test_fingers_apart_is_v() {
    let response = rules().recognize_points(&two_fingers(0.081));
    assert_eq!(response.sign, "ASL_V");
    assert!((response.confidence - 1.0).abs() < f32::EPSILON);
}

#[test]
fn test_ties_go_to_earlier_gesture() {
    // R, U and V all score 1.0 here; R is listed first.
    let set = LandmarkSet::new(&two_fingers(0.079)).unwrap();
    let matcher = GestureMatcher::default();
    let scores = matcher.rank(&set);
    let perfect: Vec<&str> = scores
        .iter()
        .filter(|s| (s.score - 1.0).abs() < f32::EPSILON)
        .map(|s| s.id.as_str())
        .collect();
    assert_eq!(perfect, ["R", "U", "V"]);
    assert_eq!(matcher.match_set(&set).gesture_id.as_deref(), Some("R"));
}

#[test]
fn test_wrong_point_count_is_invalid_input() {
    let mut recognizer = rules();
    for n in [0, 20, 22] {
        let response = recognizer.recognize_points(&vec![Landmark::new(0.5, 0.5, 0.0); n]);
        assert!(!response.success);
        assert_eq!(response.sign, "");
        assert!(response.confidence.abs() < f32::EPSILON);
        assert!(response.error.unwrap().contains(&format!("got {n}")));
    }
}

#[test]
fn test_non_finite_point_is_invalid_input() {
    let mut pts = fist(0.06);
    pts[8].y = f32::NAN;
    let response = rules().recognize_points(&pts);
    assert!(!response.success);
    assert_eq!(response.sign, "");
    assert!(response.error.unwrap().contains("landmark 8"));
}

#[test]
fn test_matching_is_pure_across_threads() {
    let set = LandmarkSet::new(&fist(0.06)).unwrap();
    let matcher = GestureMatcher::new(Arc::new(GestureCatalog::builtin_asl()));
    let expected = matcher.match_set(&set);

    std::thread::scope(|s| {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let m = matcher.clone();
                s.spawn(move || m.match_set(&set))
            })
            .collect();
        for h in handles {
            assert_eq!(h.join().unwrap(), expected);
        }
    });
}

#[test]
fn test_scores_stay_in_range() {
    // Deterministic LCG over random hands.
    let mut state: u64 = 0x5eed;
    let mut next = || {
        state = state.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1_442_695_040_888_963_407);
        ((state >> 33) as f32) / ((1u64 << 31) as f32)
    };

    let catalog = GestureCatalog::builtin_asl();
    let matcher = GestureMatcher::new(Arc::new(catalog.clone()));
    for _ in 0..200 {
        let pts: Vec<Landmark> = (0..21)
            .map(|_| Landmark::new(next(), next(), next() * 0.2 - 0.1))
            .collect();
        let set = LandmarkSet::new(&pts).unwrap();

        for score in matcher.rank(&set) {
            assert!((0.0..=1.0).contains(&score.score), "{} = {}", score.id, score.score);
        }

        let result = matcher.match_set(&set);
        match result.gesture_id {
            Some(id) => {
                let spec = catalog.get(&id).unwrap();
                assert!(result.confidence >= spec.min_score);
                assert!(result.confidence <= 1.0);
            }
            None => assert!(result.confidence.abs() < f32::EPSILON),
        }
    }
}

#[test]
fn test_thumbs_catalog() {
    let config = RecognizerConfig::new()
        .with_catalog(thumbs_catalog_path())
        .with_namespace("");
    let mut recognizer = Recognizer::new(config).unwrap();
    assert_eq!(recognizer.status().catalog, "thumbs");
    assert_eq!(recognizer.status().num_gestures, 2);

    let up = recognizer.recognize_points(&thumb_up());
    assert_eq!(up.sign, "THUMBS_UP");
    assert!((up.confidence - 1.0).abs() < f32::EPSILON);

    let down = recognizer.recognize_points(&thumb_down());
    assert_eq!(down.sign, "THUMBS_DOWN");
    assert!((down.confidence - 1.0).abs() < f32::EPSILON);

    let fist = recognizer.recognize_points(&fist(0.0));
    assert_eq!(fist.sign, "UNKNOWN");
    assert_eq!(fist.error.as_deref(), Some("No gesture matched"));
}

#[test]
fn test_thumbs_catalog_does_not_depend_on_order() {
    let catalog = GestureCatalog::from_path(thumbs_catalog_path()).unwrap();
    let reversed = GestureCatalog::new("reversed", catalog.iter().rev().cloned().collect()).unwrap();
    assert_eq!(reversed.ids(), ["THUMBS_UP", "THUMBS_DOWN"]);

    for cat in [catalog, reversed] {
        let matcher = GestureMatcher::new(Arc::new(cat));
        for (points, expected) in [(thumb_down(), "THUMBS_DOWN"), (thumb_up(), "THUMBS_UP")] {
            let set = LandmarkSet::new(&points).unwrap();
            let scores = matcher.rank(&set);
            let eligible: Vec<&str> = scores
                .iter()
                .filter(|s| s.eligible())
                .map(|s| s.id.as_str())
                .collect();
            assert_eq!(eligible, [expected]);
            assert_eq!(matcher.match_set(&set).gesture_id.as_deref(), Some(expected));
        }
    }
}

#[test]
fn test_image_pipeline_with_stub_landmarker() {
    let set = LandmarkSet::new(&fist(0.06)).unwrap();
    let mut recognizer = rules().with_landmarker(Box::new(FixedHand(set)));

    let image = DynamicImage::ImageRgb8(image::RgbImage::new(32, 32));
    let recognition = recognizer.recognize_image(&image);
    assert_eq!(recognition.response.sign, "ASL_S");
    assert_eq!(recognition.landmarks, Some(set));
    assert!(recognition.speed.detect.is_some());
}

#[test]
fn test_response_json_contract() {
    let mut recognizer = rules();

    let ok = serde_json::to_value(recognizer.recognize_points(&fist(0.06))).unwrap();
    assert_eq!(ok["success"], true);
    assert_eq!(ok["sign"], "ASL_S");
    assert_eq!(ok["confidence"], 1.0);
    assert!(ok.get("error").is_none());
    assert!(ok["landmarks"].is_string());

    let bad = serde_json::to_value(recognizer.recognize_points(&[])).unwrap();
    assert_eq!(bad["success"], false);
    assert_eq!(bad["sign"], "");
    assert_eq!(bad["confidence"], 0.0);
    assert!(bad["error"].is_string());
    assert!(bad.get("landmarks").is_none());
}
