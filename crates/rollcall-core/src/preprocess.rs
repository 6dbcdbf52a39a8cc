//! Face crop normalization ahead of hashing.
//!
//! Every capture is reduced to the same padded, 64x64 RGBA crop so hashes
//! from different cameras and distances are comparable.

use crate::error::EncodingError;
use crate::types::FaceBounds;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, RgbaImage};

/// Side length of the normalized face crop.
pub const FACE_CROP_SIZE: u32 = 64;
/// Padding added on every side, as a fraction of the face width.
const CROP_PADDING_RATIO: f64 = 0.2;
/// Lower bound for the padding, in pixels.
const CROP_PADDING_MIN: f64 = 20.0;

/// Pixel rectangle to cut out of the source image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Compute the padded crop for `bounds`, clamped to the image.
pub fn crop_region(
    bounds: &FaceBounds,
    image_width: u32,
    image_height: u32,
) -> Result<CropRegion, EncodingError> {
    if !bounds.is_valid() {
        return Err(EncodingError::DegenerateBounds {
            x: bounds.x,
            y: bounds.y,
            width: bounds.width,
            height: bounds.height,
        });
    }

    let pad = (bounds.width * CROP_PADDING_RATIO).max(CROP_PADDING_MIN);
    let left = (bounds.x - pad).floor().clamp(0.0, image_width as f64);
    let top = (bounds.y - pad).floor().clamp(0.0, image_height as f64);
    let right = (bounds.x + bounds.width + pad).ceil().clamp(0.0, image_width as f64);
    let bottom = (bounds.y + bounds.height + pad).ceil().clamp(0.0, image_height as f64);

    if right <= left || bottom <= top {
        return Err(EncodingError::EmptyCrop { image_width, image_height });
    }

    Ok(CropRegion {
        x: left as u32,
        y: top as u32,
        width: (right - left) as u32,
        height: (bottom - top) as u32,
    })
}

/// Crop the face with padding and resize it to a
/// [`FACE_CROP_SIZE`]x[`FACE_CROP_SIZE`] RGBA image.
pub fn preprocess_face(image: &DynamicImage, bounds: &FaceBounds) -> Result<RgbaImage, EncodingError> {
    let (image_width, image_height) = image.dimensions();
    let region = crop_region(bounds, image_width, image_height)?;

    tracing::debug!(
        image_width,
        image_height,
        crop_x = region.x,
        crop_y = region.y,
        crop_width = region.width,
        crop_height = region.height,
        "cropping face"
    );

    let normalized = image
        .crop_imm(region.x, region.y, region.width, region.height)
        .resize_exact(FACE_CROP_SIZE, FACE_CROP_SIZE, FilterType::Triangle)
        .to_rgba8();

    Ok(normalized)
}
