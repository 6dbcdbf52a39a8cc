use serde::{Deserialize, Serialize};

/// Number of perceptual-hash values at the front of every encoding.
pub const HASH_SEGMENT_LEN: usize = 256;
/// Number of landmark features produced by the extractor.
pub const LANDMARK_FEATURE_LEN: usize = 17;
/// Total length of a combined face encoding.
pub const ENCODING_LEN: usize = 512;

/// A 2D point in image pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// Axis-aligned face rectangle reported by an external detector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FaceBounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl FaceBounds {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// True when every field is finite and the box has positive area.
    pub fn is_valid(&self) -> bool {
        [self.x, self.y, self.width, self.height]
            .iter()
            .all(|v| v.is_finite())
            && self.width > 0.0
            && self.height > 0.0
    }
}

/// Landmarks and classifications for one detected face.
///
/// Every field is optional: a detector that fails to locate a point simply
/// leaves it out, and the extractor writes zeros in its slot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FaceLandmarks {
    #[serde(alias = "leftEyePosition")]
    pub left_eye: Option<Point>,
    #[serde(alias = "rightEyePosition")]
    pub right_eye: Option<Point>,
    #[serde(alias = "noseBasePosition")]
    pub nose_base: Option<Point>,
    #[serde(alias = "leftMouthPosition")]
    pub left_mouth: Option<Point>,
    #[serde(alias = "rightMouthPosition")]
    pub right_mouth: Option<Point>,
    #[serde(alias = "bottomMouthPosition")]
    pub bottom_mouth: Option<Point>,
    /// Head roll in degrees.
    #[serde(alias = "rollAngle")]
    pub roll_angle: Option<f64>,
    /// Head yaw in degrees.
    #[serde(alias = "yawAngle")]
    pub yaw_angle: Option<f64>,
    #[serde(alias = "smilingProbability")]
    pub smiling_probability: Option<f64>,
    #[serde(alias = "leftEyeOpenProbability")]
    pub left_eye_open_probability: Option<f64>,
    #[serde(alias = "rightEyeOpenProbability")]
    pub right_eye_open_probability: Option<f64>,
}

/// Detector output for a single face: where it is and what was found on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedFace {
    pub bounds: FaceBounds,
    #[serde(default)]
    pub landmarks: FaceLandmarks,
}

/// Scale-independent landmark feature vector (always [`LANDMARK_FEATURE_LEN`] values).
#[derive(Debug, Clone, PartialEq)]
pub struct LandmarkFeatures(pub(crate) Vec<f64>);

impl LandmarkFeatures {
    pub fn values(&self) -> &[f64] {
        &self.0
    }
}

/// Block-average brightness grid, row-major, each value in [0, 1].
#[derive(Debug, Clone, PartialEq)]
pub struct PerceptualHash {
    pub(crate) values: Vec<f64>,
    pub(crate) size: usize,
}

impl PerceptualHash {
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Grid side length the hash was computed with.
    pub fn size(&self) -> usize {
        self.size
    }
}

/// Combined face encoding: hash segment, landmark features, zero padding.
///
/// Encodings built by [`crate::encoding::combine`] are exactly
/// [`ENCODING_LEN`] long. Encodings read back from storage keep whatever
/// length was stored so the comparator can reject mismatches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FaceEncoding(Vec<f64>);

impl FaceEncoding {
    pub fn from_values(values: Vec<f64>) -> Self {
        Self(values)
    }

    pub fn values(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Outcome of comparing two encodings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimilarityResult {
    #[serde(rename = "match")]
    pub matched: bool,
    /// Weighted similarity, nominally in [0, 1].
    pub similarity: f64,
}

impl SimilarityResult {
    /// The uniform failure value: no match, zero similarity.
    pub const NO_MATCH: SimilarityResult = SimilarityResult {
        matched: false,
        similarity: 0.0,
    };
}
