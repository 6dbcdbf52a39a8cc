//! End-to-end encoding of one detected face.
//!
//! Runs the fixed pipeline: bounds check, capture-quality gate, padded
//! 64x64 crop, perceptual hash, landmark features, combine.

use crate::encoding::combine;
use crate::error::EncodingError;
use crate::features::extract_features;
use crate::hash::{compute_hash, DEFAULT_HASH_SIZE};
use crate::preprocess::preprocess_face;
use crate::types::{DetectedFace, FaceEncoding, FaceLandmarks};
use image::DynamicImage;

/// Builds face encodings from images and detector output.
///
/// The hash grid is always [`DEFAULT_HASH_SIZE`]: any other size would shift
/// the landmark features within the 512-value layout and make encodings
/// incomparable.
#[derive(Debug, Clone, Default)]
pub struct FaceEncoder {
    min_eye_open_probability: f64,
}

impl FaceEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject captures where the detector reports both eyes below this
    /// open probability. 0 disables the check.
    pub fn with_min_eye_open_probability(mut self, min: f64) -> Self {
        self.min_eye_open_probability = min;
        self
    }

    /// Decode an encoded image (PNG, JPEG, ...) and encode the face in it.
    pub fn encode_bytes(&self, image_bytes: &[u8], face: &DetectedFace) -> Result<FaceEncoding, EncodingError> {
        let image = image::load_from_memory(image_bytes)?;
        self.encode(&image, face)
    }

    /// Encode the face described by `face` within `image`.
    pub fn encode(&self, image: &DynamicImage, face: &DetectedFace) -> Result<FaceEncoding, EncodingError> {
        let features = extract_features(&face.bounds, &face.landmarks)?;
        self.check_capture_quality(&face.landmarks)?;

        let crop = preprocess_face(image, &face.bounds)?;
        let hash = compute_hash(crop.as_raw(), crop.width(), crop.height(), DEFAULT_HASH_SIZE);

        let encoding = combine(&hash, &features);
        tracing::debug!(
            x = face.bounds.x,
            y = face.bounds.y,
            width = face.bounds.width,
            height = face.bounds.height,
            len = encoding.len(),
            "face encoded"
        );

        Ok(encoding)
    }

    /// Eyes-open gate. Only applies when the detector reported both eyes.
    pub fn check_capture_quality(&self, landmarks: &FaceLandmarks) -> Result<(), EncodingError> {
        if self.min_eye_open_probability <= 0.0 {
            return Ok(());
        }
        let (Some(left), Some(right)) = (
            landmarks.left_eye_open_probability,
            landmarks.right_eye_open_probability,
        ) else {
            return Ok(());
        };

        let min = self.min_eye_open_probability;
        if left < min && right < min {
            tracing::warn!(left, right, min, "capture rejected: eyes closed");
            return Err(EncodingError::EyesClosed { left, right, min });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FaceBounds, Point, ENCODING_LEN, HASH_SEGMENT_LEN};
    use image::{Rgba, RgbaImage};

    fn face() -> DetectedFace {
        DetectedFace {
            bounds: FaceBounds::new(40.0, 40.0, 80.0, 80.0),
            landmarks: FaceLandmarks {
                left_eye: Some(Point::new(60.0, 70.0)),
                right_eye: Some(Point::new(100.0, 70.0)),
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_encode_length() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(160, 160, Rgba([128, 128, 128, 255])));
        let encoding = FaceEncoder::new().encode(&img, &face()).unwrap();
        assert_eq!(encoding.len(), ENCODING_LEN);
        // Eye x positions land at indices 256 and 258.
        assert_eq!(encoding.values()[HASH_SEGMENT_LEN], 0.25);
        assert_eq!(encoding.values()[HASH_SEGMENT_LEN + 2], 0.75);
    }

    #[test]
    fn test_encode_bytes_matches_decoded_image() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_fn(160, 160, |x, y| {
            Rgba([(x % 256) as u8, (y % 256) as u8, 90, 255])
        }));
        let mut png = Vec::new();
        img.write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
            .unwrap();

        let encoder = FaceEncoder::new();
        let from_bytes = encoder.encode_bytes(&png, &face()).unwrap();
        let from_image = encoder.encode(&img, &face()).unwrap();
        assert_eq!(from_bytes, from_image);
    }

    #[test]
    fn test_encode_bytes_rejects_undecodable_image() {
        let err = FaceEncoder::new().encode_bytes(b"not an image", &face()).unwrap_err();
        assert!(matches!(err, EncodingError::Image(_)));
    }

    #[test]
    fn test_encode_rejects_degenerate_bounds() {
        let img = DynamicImage::ImageRgba8(RgbaImage::new(32, 32));
        let mut f = face();
        f.bounds.height = 0.0;
        let err = FaceEncoder::new().encode(&img, &f).unwrap_err();
        assert!(matches!(err, EncodingError::DegenerateBounds { .. }));
    }

    #[test]
    fn test_quality_gate_disabled_by_default() {
        let lm = FaceLandmarks {
            left_eye_open_probability: Some(0.0),
            right_eye_open_probability: Some(0.0),
            ..Default::default()
        };
        assert!(FaceEncoder::new().check_capture_quality(&lm).is_ok());
    }

    #[test]
    fn test_quality_gate_eyes_closed() {
        let encoder = FaceEncoder::new().with_min_eye_open_probability(0.4);
        let closed = FaceLandmarks {
            left_eye_open_probability: Some(0.1),
            right_eye_open_probability: Some(0.2),
            ..Default::default()
        };
        assert!(matches!(
            encoder.check_capture_quality(&closed),
            Err(EncodingError::EyesClosed { .. })
        ));

        // One eye open (wink) passes.
        let wink = FaceLandmarks {
            left_eye_open_probability: Some(0.1),
            right_eye_open_probability: Some(0.9),
            ..Default::default()
        };
        assert!(encoder.check_capture_quality(&wink).is_ok());

        // Not reported: nothing to judge.
        assert!(encoder.check_capture_quality(&FaceLandmarks::default()).is_ok());
    }
}
