// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

/// Hand skeleton structure (pairs of landmark indices)
/// Defines which landmarks connect to form the hand skeleton
pub const HAND_SKELETON: [[usize; 2]; 21] = [
    [0, 1],   // wrist to thumb cmc
    [1, 2],   // thumb cmc to mcp
    [2, 3],   // thumb mcp to ip
    [3, 4],   // thumb ip to tip
    [0, 5],   // wrist to index mcp
    [5, 6],   // index mcp to pip
    [6, 7],   // index pip to dip
    [7, 8],   // index dip to tip
    [5, 9],   // index mcp to middle mcp
    [9, 10],  // middle mcp to pip
    [10, 11], // middle pip to dip
    [11, 12], // middle dip to tip
    [9, 13],  // middle mcp to ring mcp
    [13, 14], // ring mcp to pip
    [14, 15], // ring pip to dip
    [15, 16], // ring dip to tip
    [13, 17], // ring mcp to pinky mcp
    [0, 17],  // wrist to pinky mcp
    [17, 18], // pinky mcp to pip
    [18, 19], // pinky pip to dip
    [19, 20], // pinky dip to tip
];

/// Limb color indices mapping to `POSE_COLORS`
/// Mapping: thumb=orange, index=blue, middle=green, ring=magenta, pinky=yellow, palm=white
pub const LIMB_COLOR_INDICES: [usize; 21] = [
    0, 0, 0, 0, 19, 9, 9, 9, 19, 16, 16, 16, 19, 7, 7, 7, 19, 19, 3, 3, 3,
];

/// Keypoint color indices mapping to `POSE_COLORS`
pub const KPT_COLOR_INDICES: [usize; 21] = [
    19, 0, 0, 0, 0, 9, 9, 9, 9, 16, 16, 16, 16, 7, 7, 7, 7, 3, 3, 3, 3,
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::NUM_LANDMARKS;

    #[test]
    fn test_skeleton_covers_every_landmark() {
        let mut seen = [false; NUM_LANDMARKS];
        for [a, b] in HAND_SKELETON {
            assert!(a < NUM_LANDMARKS && b < NUM_LANDMARKS);
            seen[a] = true;
            seen[b] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }
}
