// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Drawing recognized hands onto images.

#![allow(
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_precision_loss
)]

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use ab_glyph::{FontRef, PxScale};
use image::{DynamicImage, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_filled_rect_mut, draw_line_segment_mut, draw_text_mut, text_size};
use imageproc::rect::Rect;

use crate::landmarks::LandmarkSet;
use crate::response::SignResponse;
use crate::visualizer::skeleton::{HAND_SKELETON, KPT_COLOR_INDICES, LIMB_COLOR_INDICES};
use crate::visualizer::Color;

/// Assets URL for downloading fonts
const ASSETS_URL: &str = "https://github.com/ultralytics/assets/releases/download/v0.0.0";

/// Font used for sign labels.
const FONT_NAME: &str = "Arial.ttf";

/// Find the next available run directory (predict, predict2, predict3, etc.)
#[must_use]
pub fn find_next_run_dir(base: &str, prefix: &str) -> PathBuf {
    let base_path = Path::new(base);

    let first = base_path.join(prefix);
    if !first.exists() {
        return first;
    }

    (2..)
        .map(|i| base_path.join(format!("{prefix}{i}")))
        .find(|p| !p.exists())
        .unwrap_or(first)
}

/// Check if font exists locally or download it
#[must_use]
pub fn check_font(font: &str) -> Option<PathBuf> {
    let font_name = Path::new(font).file_name()?.to_string_lossy();
    let config_dir = dirs::config_dir()?.join("signspeak");
    let font_path = config_dir.join(font_name.as_ref());

    if font_path.exists() {
        return Some(font_path);
    }

    if let Err(e) = fs::create_dir_all(&config_dir) {
        crate::warn!("Failed to create config directory: {e}");
        return None;
    }

    let url = format!("{ASSETS_URL}/{font_name}");
    crate::info!("Downloading {url} to {}", font_path.display());

    let response = match ureq::get(&url).call() {
        Ok(response) => response,
        Err(e) => {
            crate::warn!("Failed to download font from {url}: {e}");
            return None;
        }
    };

    let mut file = match File::create(&font_path) {
        Ok(f) => f,
        Err(e) => {
            crate::warn!("Failed to create font file: {e}");
            return None;
        }
    };

    let mut reader = response.into_body().into_reader();
    if let Err(e) = io::copy(&mut reader, &mut file) {
        crate::warn!("Failed to download font: {e}");
        let _ = fs::remove_file(&font_path);
        return None;
    }

    Some(font_path)
}

/// Line thickness and keypoint radius scaled to the image.
fn line_width(width: u32, height: u32) -> i32 {
    ((width + height) as f32 * 0.002).round().max(2.0) as i32
}

/// Draw the hand skeleton and the recognized sign.
///
/// The skeleton is drawn when `landmarks` is present. The label shows the
/// sign and confidence on success, otherwise the error text.
#[must_use]
pub fn annotate_hand(image: &DynamicImage, landmarks: Option<&LandmarkSet>, response: &SignResponse) -> DynamicImage {
    let mut img = image.to_rgb8();
    let (width, height) = img.dimensions();
    let lw = line_width(width, height);

    if let Some(hand) = landmarks {
        draw_skeleton(&mut img, hand, lw);
    }

    let label = if response.success {
        format!("{} {:.2}", response.sign, response.confidence)
    } else {
        response.error.clone().unwrap_or_else(|| response.sign.clone())
    };
    let color = if response.success {
        Color::for_label(&response.sign)
    } else {
        Color::from_index(6)
    };

    let font_data = check_font(FONT_NAME).and_then(|path| fs::read(path).ok());
    if let Some(font) = font_data.as_deref().and_then(|data| FontRef::try_from_slice(data).ok()) {
        draw_label(&mut img, &font, &label, color, lw);
    }

    DynamicImage::ImageRgb8(img)
}

fn draw_skeleton(img: &mut RgbImage, hand: &LandmarkSet, lw: i32) {
    let (width, height) = img.dimensions();
    let to_px = |i: usize| (hand[i].x * width as f32, hand[i].y * height as f32);

    for (limb, [a, b]) in HAND_SKELETON.iter().enumerate() {
        let color = Color::from_pose_index(LIMB_COLOR_INDICES[limb]).to_rgb();
        let (start, end) = (to_px(*a), to_px(*b));
        // Offset parallel segments for thickness.
        for t in 0..lw {
            let o = t as f32 - lw as f32 / 2.0;
            draw_line_segment_mut(img, (start.0 + o, start.1), (end.0 + o, end.1), color);
            draw_line_segment_mut(img, (start.0, start.1 + o), (end.0, end.1 + o), color);
        }
    }

    for (i, color_idx) in KPT_COLOR_INDICES.iter().enumerate() {
        let (x, y) = to_px(i);
        let color = Color::from_pose_index(*color_idx).to_rgb();
        draw_filled_circle_mut(img, (x.round() as i32, y.round() as i32), lw + 1, color);
    }
}

fn draw_label(img: &mut RgbImage, font: &FontRef<'_>, label: &str, color: Color, lw: i32) {
    let (width, height) = img.dimensions();
    let scale = PxScale::from((lw * 8) as f32);
    let (text_w, text_h) = text_size(scale, font, label);
    let pad = lw.unsigned_abs();

    let box_w = (text_w + 2 * pad).min(width);
    let box_h = (text_h + 2 * pad).min(height);
    if box_w == 0 || box_h == 0 {
        return;
    }

    draw_filled_rect_mut(img, Rect::at(0, 0).of_size(box_w, box_h), color.to_rgb());
    draw_text_mut(img, Color::WHITE.to_rgb(), lw, lw, scale, font, label);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::Landmark;

    #[test]
    fn test_find_next_run_dir() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().to_string_lossy().to_string();

        let first = find_next_run_dir(&base, "predict");
        assert!(first.ends_with("predict"));
        fs::create_dir_all(&first).unwrap();

        let second = find_next_run_dir(&base, "predict");
        assert!(second.ends_with("predict2"));
    }

    #[test]
    fn test_skeleton_drawn() {
        let pts: Vec<Landmark> = (0..21)
            .map(|i| Landmark::new(0.2 + i as f32 * 0.03, 0.5, 0.0))
            .collect();
        let hand = LandmarkSet::new(&pts).unwrap();
        let mut img = RgbImage::new(100, 100);
        draw_skeleton(&mut img, &hand, 2);
        assert_ne!(img.get_pixel(50, 50).0, [0, 0, 0]);
        assert_eq!(img.get_pixel(5, 5).0, [0, 0, 0]);
    }
}
