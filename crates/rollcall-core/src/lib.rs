//! rollcall-core — Perceptual face encoding and matching.
//!
//! Builds fixed-length face encodings from a block-average perceptual hash
//! of the face crop plus normalized landmark features, and compares them by
//! weighted Euclidean similarity. Face detection is supplied by the caller.

pub mod encoding;
pub mod error;
pub mod features;
pub mod hash;
pub mod matcher;
pub mod pipeline;
pub mod preprocess;
pub mod types;

pub use encoding::{combine, decode, decode_envelope, encode, EncodingEnvelope};
pub use error::EncodingError;
pub use features::extract_features;
pub use hash::compute_hash;
pub use matcher::{compare_faces, EncodingMatcher, EnrolledFace, GalleryMatch, MatchParams, Matcher};
pub use pipeline::FaceEncoder;
pub use types::{
    DetectedFace, FaceBounds, FaceEncoding, FaceLandmarks, LandmarkFeatures, PerceptualHash, Point,
    SimilarityResult,
};
