// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Image preprocessing for landmark detection.
//!
//! This module handles the per-image path from raw bytes to the network
//! input: format sniffing, decoding, channel validation, aspect-preserving
//! pad-resize to 256x256, and conversion to an HWC f32 tensor.

use image::{DynamicImage, ImageFormat, RgbImage, imageops};
use ndarray::{Array3, Array4, Axis};

use crate::error::{PreprocessError, Result};

/// Network input edge length in pixels.
pub const INPUT_SIZE: u32 = 256;

/// Infer the image format from magic bytes.
///
/// Only the formats the dataset may contain are recognized: JPEG
/// (`FF D8 FF`) and PNG (`89 50 4E 47`).
#[must_use]
pub fn sniff_format(bytes: &[u8]) -> Option<ImageFormat> {
    if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Some(ImageFormat::Jpeg)
    } else if bytes.starts_with(&[0x89, b'P', b'N', b'G']) {
        Some(ImageFormat::Png)
    } else {
        None
    }
}

/// Decode an image from raw bytes.
///
/// The format is sniffed from magic bytes first, then a single decode is
/// attempted with that format.
///
/// # Errors
///
/// Returns an error if the bytes are neither JPEG nor PNG, or if the
/// decode itself fails (truncated or corrupt file).
pub fn decode_image(bytes: &[u8]) -> Result<DynamicImage> {
    let format = sniff_format(bytes).ok_or_else(|| {
        PreprocessError::ImageError("unrecognized image format (expected JPEG or PNG)".to_string())
    })?;
    Ok(image::load_from_memory_with_format(bytes, format)?)
}

/// Number of color channels in a decoded image.
#[must_use]
pub fn channel_count(image: &DynamicImage) -> u8 {
    image.color().channel_count()
}

/// Resize to `INPUT_SIZE` x `INPUT_SIZE` preserving aspect ratio.
///
/// The image is scaled to fit, centered, and padded with black. Output is
/// always an 8-bit RGB buffer of the network input size.
#[must_use]
pub fn resize_with_pad(image: &DynamicImage) -> RgbImage {
    let (width, height) = (image.width(), image.height());

    #[allow(clippy::cast_precision_loss)]
    let scale = (f64::from(INPUT_SIZE) / f64::from(width))
        .min(f64::from(INPUT_SIZE) / f64::from(height));

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let new_width = ((f64::from(width) * scale).round() as u32).max(1);
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let new_height = ((f64::from(height) * scale).round() as u32).max(1);

    let resized = image
        .resize_exact(new_width, new_height, imageops::FilterType::Triangle)
        .to_rgb8();

    let mut canvas = RgbImage::new(INPUT_SIZE, INPUT_SIZE);
    let pad_left = i64::from((INPUT_SIZE - new_width) / 2);
    let pad_top = i64::from((INPUT_SIZE - new_height) / 2);
    imageops::overlay(&mut canvas, &resized, pad_left, pad_top);
    canvas
}

/// Convert an RGB buffer to a `[1, H, W, 3]` f32 tensor in the 0-255 range.
///
/// The model takes un-normalized pixel values, matching its training
/// frontend.
///
/// # Errors
///
/// Returns an error if the buffer's dimensions are inconsistent with its
/// raw length (cannot happen for buffers produced by [`resize_with_pad`]).
pub fn image_to_tensor(image: &RgbImage) -> Result<Array4<f32>> {
    let (width, height) = (image.width() as usize, image.height() as usize);
    let pixels: Vec<f32> = image.as_raw().iter().map(|&v| f32::from(v)).collect();

    let tensor = Array3::from_shape_vec((height, width, 3), pixels)
        .map_err(|e| PreprocessError::ImageError(format!("Bad tensor shape: {e}")))?;

    Ok(tensor.insert_axis(Axis(0)))
}
