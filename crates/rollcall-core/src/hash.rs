//! Block-average perceptual hash.
//!
//! Splits an RGBA image into a `size x size` grid and records the mean
//! BT.601 luma of each block, normalized to [0, 1]. Coarse enough to ignore
//! pixel noise, fine enough to keep the overall structure of a face crop.

use crate::types::PerceptualHash;

/// Default grid side length (16 x 16 = 256 values).
pub const DEFAULT_HASH_SIZE: usize = 16;

// ITU-R BT.601 luma weights.
const LUMA_R: f64 = 0.299;
const LUMA_G: f64 = 0.587;
const LUMA_B: f64 = 0.114;

const BYTES_PER_PIXEL: usize = 4;

/// Compute the perceptual hash of an RGBA buffer.
///
/// Block dimensions are `floor(width / size) x floor(height / size)`; pixels
/// in the remainder strip on the right/bottom are not sampled. A block with
/// no sampled pixels (tiny images, short buffers) hashes to 0.
pub fn compute_hash(pixels: &[u8], width: u32, height: u32, size: usize) -> PerceptualHash {
    let width = width as usize;
    let height = height as usize;

    if size == 0 {
        return PerceptualHash { values: Vec::new(), size };
    }

    let block_w = width / size;
    let block_h = height / size;
    let mut values = Vec::with_capacity(size * size);

    for row in 0..size {
        for col in 0..size {
            let y0 = row * block_h;
            let x0 = col * block_w;

            let mut sum = 0.0f64;
            let mut count = 0usize;

            for y in y0..y0 + block_h {
                for x in x0..x0 + block_w {
                    let offset = (y * width + x) * BYTES_PER_PIXEL;
                    let Some(px) = pixels.get(offset..offset + 3) else {
                        continue;
                    };
                    sum += luma(px[0], px[1], px[2]) / 255.0;
                    count += 1;
                }
            }

            values.push(if count > 0 { sum / count as f64 } else { 0.0 });
        }
    }

    tracing::trace!(size, block_w, block_h, "computed perceptual hash");

    PerceptualHash { values, size }
}

fn luma(r: u8, g: u8, b: u8) -> f64 {
    LUMA_R * r as f64 + LUMA_G * g as f64 + LUMA_B * b as f64
}
