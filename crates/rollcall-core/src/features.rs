//! Landmark feature extraction.
//!
//! Turns a detector's bounding box and optional landmarks into a fixed
//! 17-value vector normalized against the face box, so captures at different
//! resolutions land in the same feature space.
//!
//! Layout (positional, the comparator relies on it):
//!
//! ```text
//!  0..12  left eye, right eye, nose base, left mouth, right mouth, bottom mouth (x, y)
//!  12     eye distance / width
//!  13     width / height
//!  14     roll / 180
//!  15     yaw / 180
//!  16     smiling probability
//! ```

use crate::error::EncodingError;
use crate::types::{FaceBounds, FaceLandmarks, LandmarkFeatures, Point, LANDMARK_FEATURE_LEN};

const ANGLE_NORMALIZER: f64 = 180.0;

/// Extract the landmark feature vector for one face.
///
/// Missing landmarks contribute zeros. Bounds without a positive, finite
/// width and height are rejected rather than producing NaN features.
pub fn extract_features(
    bounds: &FaceBounds,
    landmarks: &FaceLandmarks,
) -> Result<LandmarkFeatures, EncodingError> {
    if !bounds.is_valid() {
        return Err(EncodingError::DegenerateBounds {
            x: bounds.x,
            y: bounds.y,
            width: bounds.width,
            height: bounds.height,
        });
    }

    let mut features = Vec::with_capacity(LANDMARK_FEATURE_LEN);

    let points = [
        landmarks.left_eye,
        landmarks.right_eye,
        landmarks.nose_base,
        landmarks.left_mouth,
        landmarks.right_mouth,
        landmarks.bottom_mouth,
    ];
    for point in points {
        let (nx, ny) = point.map_or((0.0, 0.0), |p| normalize(&p, bounds));
        features.push(nx);
        features.push(ny);
    }

    let eye_distance = match (landmarks.left_eye, landmarks.right_eye) {
        (Some(l), Some(r)) => l.distance(&r) / bounds.width,
        _ => 0.0,
    };
    features.push(eye_distance);

    features.push(bounds.width / bounds.height);
    features.push(landmarks.roll_angle.unwrap_or(0.0) / ANGLE_NORMALIZER);
    features.push(landmarks.yaw_angle.unwrap_or(0.0) / ANGLE_NORMALIZER);
    features.push(landmarks.smiling_probability.unwrap_or(0.0));

    debug_assert_eq!(features.len(), LANDMARK_FEATURE_LEN);
    tracing::trace!(?features, "extracted landmark features");

    Ok(LandmarkFeatures(features))
}

fn normalize(p: &Point, bounds: &FaceBounds) -> (f64, f64) {
    ((p.x - bounds.x) / bounds.width, (p.y - bounds.y) / bounds.height)
}
