// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Image preprocessing for the hand-landmark model.
//!
//! Images are letterboxed onto a square canvas (aspect ratio kept, centered,
//! padded), normalized to `[0, 1]` and laid out as NHWC or NCHW. The transform
//! is recorded so landmark predictions in model pixels can be mapped back to
//! coordinates normalized to the original image.

#![allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]

use fast_image_resize::images::Image;
use fast_image_resize::{FilterType, PixelType, ResizeAlg, ResizeOptions, Resizer};
use image::{DynamicImage, GenericImageView, RgbImage};
use ndarray::Array4;

use crate::error::{GestureError, Result};
use crate::landmarks::Landmark;

/// Letterbox padding color (black, as the hand-landmark model was trained on).
pub const LETTERBOX_COLOR: [u8; 3] = [0, 0, 0];

/// Reciprocal of 255 for normalization.
const INV_255: f32 = 1.0 / 255.0;

/// Result of letterboxing an image, with the transform needed to undo it.
#[derive(Debug, Clone)]
pub struct Letterbox {
    /// Normalized tensor, `(1, S, S, 3)` when channels-last, else `(1, 3, S, S)`.
    pub tensor: Array4<f32>,
    /// Original image dimensions (height, width).
    pub orig_shape: (u32, u32),
    /// Square model input edge.
    pub input_size: u32,
    /// Scale factors applied (`scale_y`, `scale_x`).
    pub scale: (f32, f32),
    /// Padding applied (`pad_top`, `pad_left`).
    pub padding: (f32, f32),
}

impl Letterbox {
    /// Map a point from model input pixels to image-normalized coordinates.
    ///
    /// `z` is divided by the input size and rescaled by the same factor as
    /// `x`, which keeps depth in the same relative units the landmark model
    /// reports for an unpadded crop.
    #[must_use]
    pub fn to_image_normalized(&self, x: f32, y: f32, z: f32) -> Landmark {
        let (scale_y, scale_x) = self.scale;
        let (pad_top, pad_left) = self.padding;
        let (orig_h, orig_w) = (self.orig_shape.0 as f32, self.orig_shape.1 as f32);

        Landmark::new(
            (x - pad_left) / scale_x / orig_w,
            (y - pad_top) / scale_y / orig_h,
            z / scale_x / orig_w,
        )
    }
}

/// Letterbox an image onto a square model input.
///
/// # Arguments
///
/// * `image` - Input image.
/// * `size` - Square target edge in pixels.
/// * `channels_last` - `true` for NHWC output, `false` for NCHW.
///
/// # Errors
///
/// Returns [`GestureError::ImageError`] for an empty image or a failed resize.
pub fn letterbox(image: &DynamicImage, size: u32, channels_last: bool) -> Result<Letterbox> {
    let (orig_w, orig_h) = image.dimensions();
    if orig_w == 0 || orig_h == 0 || size == 0 {
        return Err(GestureError::ImageError(format!(
            "Cannot letterbox a {orig_w}x{orig_h} image to {size}"
        )));
    }

    let (new_w, new_h, pad_left, pad_top, scale) = calculate_letterbox_params(orig_w, orig_h, size);
    let resized = resize_rgb(image, new_w, new_h)?;

    let mut canvas = RgbImage::from_pixel(size, size, image::Rgb(LETTERBOX_COLOR));
    image::imageops::replace(&mut canvas, &resized, i64::from(pad_left), i64::from(pad_top));

    let tensor = if channels_last {
        image_to_tensor_nhwc(&canvas)
    } else {
        image_to_tensor_nchw(&canvas)
    };

    Ok(Letterbox {
        tensor,
        orig_shape: (orig_h, orig_w),
        input_size: size,
        scale,
        padding: (pad_top as f32, pad_left as f32),
    })
}

/// Calculate letterbox parameters.
///
/// # Returns
///
/// Tuple containing:
/// 1. `new_width`: Scaled width.
/// 2. `new_height`: Scaled height.
/// 3. `pad_left`: Left padding.
/// 4. `pad_top`: Top padding.
/// 5. `(scale_y, scale_x)`: Scale factors.
fn calculate_letterbox_params(orig_width: u32, orig_height: u32, size: u32) -> (u32, u32, u32, u32, (f32, f32)) {
    let target = size as f32;
    let (orig_h, orig_w) = (orig_height as f32, orig_width as f32);

    let scale = (target / orig_h).min(target / orig_w);

    let new_w = ((orig_w * scale).round() as u32).clamp(1, size);
    let new_h = ((orig_h * scale).round() as u32).clamp(1, size);

    let pad_left = (size - new_w) / 2;
    let pad_top = (size - new_h) / 2;

    let scale_x = new_w as f32 / orig_w;
    let scale_y = new_h as f32 / orig_h;

    (new_w, new_h, pad_left, pad_top, (scale_y, scale_x))
}

fn resize_rgb(image: &DynamicImage, new_w: u32, new_h: u32) -> Result<RgbImage> {
    let (src_w, src_h) = image.dimensions();
    let src_rgb = image.to_rgb8();
    if (src_w, src_h) == (new_w, new_h) {
        return Ok(src_rgb);
    }

    let src_image = Image::from_vec_u8(src_w, src_h, src_rgb.into_raw(), PixelType::U8x3)
        .map_err(|e| GestureError::ImageError(format!("Failed to wrap source image: {e}")))?;
    let mut dst_image = Image::new(new_w, new_h, PixelType::U8x3);

    let options = ResizeOptions::new().resize_alg(ResizeAlg::Convolution(FilterType::Bilinear));
    Resizer::new()
        .resize(&src_image, &mut dst_image, Some(&options))
        .map_err(|e| GestureError::ImageError(format!("Failed to resize image: {e}")))?;

    RgbImage::from_raw(new_w, new_h, dst_image.into_vec())
        .ok_or_else(|| GestureError::ImageError("Failed to create resized buffer".to_string()))
}

/// Convert an RGB image to a normalized `(1, H, W, 3)` tensor.
fn image_to_tensor_nhwc(image: &RgbImage) -> Array4<f32> {
    let (width, height) = image.dimensions();
    let data: Vec<f32> = image.as_raw().iter().map(|&v| f32::from(v) * INV_255).collect();
    Array4::from_shape_vec((1, height as usize, width as usize, 3), data)
        .unwrap_or_else(|_| Array4::zeros((1, height as usize, width as usize, 3)))
}

/// Convert an RGB image to a normalized `(1, 3, H, W)` tensor.
fn image_to_tensor_nchw(image: &RgbImage) -> Array4<f32> {
    let (width, height) = image.dimensions();
    let (w, h) = (width as usize, height as usize);
    let mut tensor = Array4::zeros((1, 3, h, w));

    for (i, chunk) in image.as_raw().chunks_exact(3).enumerate() {
        let (y, x) = (i / w, i % w);
        for c in 0..3 {
            tensor[[0, c, y, x]] = f32::from(chunk[c]) * INV_255;
        }
    }
    tensor
}
