//! Weighted Euclidean comparison of face encodings.
//!
//! Each encoding is split at [`HASH_SEGMENT_LEN`]. Both halves are scored as
//! `1 - distance / DISTANCE_NORMALIZER` and blended 70/30.
//!
//! The landmark half is the whole remainder of the encoding, zero padding
//! included, so identical padding pulls the landmark score toward 1 and the
//! real landmark features weigh in far less than the nominal 30%. Stored
//! enrollments were matched this way; changing it moves match outcomes and
//! needs a threshold recalibration.

use crate::types::{FaceEncoding, SimilarityResult, HASH_SEGMENT_LEN};
use serde::{Deserialize, Serialize};

/// Weight of the perceptual-hash similarity.
pub const HASH_WEIGHT: f64 = 0.7;
/// Weight of the landmark similarity.
pub const LANDMARK_WEIGHT: f64 = 0.3;
/// Minimum weighted similarity for a match (inclusive).
pub const MATCH_THRESHOLD: f64 = 0.75;
/// Distance-to-similarity scale: `sqrt(256)`, the largest distance between
/// two 256-value vectors bounded in [0, 1].
pub const DISTANCE_NORMALIZER: f64 = 16.0;

/// Tunable comparison constants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchParams {
    pub hash_weight: f64,
    pub landmark_weight: f64,
    pub threshold: f64,
}

impl Default for MatchParams {
    fn default() -> Self {
        Self {
            hash_weight: HASH_WEIGHT,
            landmark_weight: LANDMARK_WEIGHT,
            threshold: MATCH_THRESHOLD,
        }
    }
}

impl MatchParams {
    pub fn is_match(&self, similarity: f64) -> bool {
        similarity >= self.threshold
    }
}

/// A stored enrollment in a gallery.
#[derive(Debug, Clone)]
pub struct EnrolledFace {
    /// Subject identifier (e.g. a student id).
    pub subject_id: String,
    pub label: String,
    pub encoding: FaceEncoding,
}

/// Result of matching a capture against a gallery.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GalleryMatch {
    #[serde(rename = "match")]
    pub matched: bool,
    /// Similarity of the best candidate.
    pub similarity: f64,
    pub subject_id: Option<String>,
    pub label: Option<String>,
}

/// Strategy for comparing a capture encoding against enrolled faces.
pub trait Matcher {
    fn compare(&self, a: &FaceEncoding, b: &FaceEncoding) -> SimilarityResult;

    fn best_match(&self, capture: &FaceEncoding, gallery: &[EnrolledFace]) -> GalleryMatch;
}

/// Weighted hash/landmark Euclidean matcher.
#[derive(Debug, Clone, Copy, Default)]
pub struct EncodingMatcher {
    params: MatchParams,
}

impl EncodingMatcher {
    pub fn new(params: MatchParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &MatchParams {
        &self.params
    }

    /// Raw weighted similarity, or `None` when the encodings cannot be compared:
    /// either side empty, or lengths differ.
    pub fn similarity(&self, a: &FaceEncoding, b: &FaceEncoding) -> Option<f64> {
        if a.is_empty() || b.is_empty() || a.len() != b.len() {
            return None;
        }

        let split = HASH_SEGMENT_LEN.min(a.len());
        let (hash_a, landmarks_a) = a.values().split_at(split);
        let (hash_b, landmarks_b) = b.values().split_at(split);

        let hash_similarity = 1.0 - euclidean_distance(hash_a, hash_b) / DISTANCE_NORMALIZER;
        let landmark_similarity = if landmarks_a.is_empty() {
            1.0
        } else {
            1.0 - euclidean_distance(landmarks_a, landmarks_b) / DISTANCE_NORMALIZER
        };

        Some(self.params.hash_weight * hash_similarity + self.params.landmark_weight * landmark_similarity)
    }
}

impl Matcher for EncodingMatcher {
    /// Score `a` against `b`.
    ///
    /// An empty encoding is not a valid encoding: it is treated like a missing
    /// one, so comparing two empty encodings gives [`SimilarityResult::NO_MATCH`]
    /// rather than a perfect score. Mismatched lengths give the same result.
    fn compare(&self, a: &FaceEncoding, b: &FaceEncoding) -> SimilarityResult {
        match self.similarity(a, b) {
            Some(similarity) => SimilarityResult {
                matched: self.params.is_match(similarity),
                similarity,
            },
            None => {
                tracing::debug!(len_a = a.len(), len_b = b.len(), "encodings not comparable");
                SimilarityResult::NO_MATCH
            }
        }
    }

    fn best_match(&self, capture: &FaceEncoding, gallery: &[EnrolledFace]) -> GalleryMatch {
        let mut best_sim = f64::NEG_INFINITY;
        let mut best_idx: Option<usize> = None;

        // Every entry is scored; no early exit on the first match.
        for (i, enrolled) in gallery.iter().enumerate() {
            let Some(sim) = self.similarity(capture, &enrolled.encoding) else {
                tracing::warn!(subject = %enrolled.subject_id, "skipping incompatible enrollment");
                continue;
            };
            if sim > best_sim {
                best_sim = sim;
                best_idx = Some(i);
            }
        }

        match best_idx {
            Some(idx) if self.params.is_match(best_sim) => GalleryMatch {
                matched: true,
                similarity: best_sim,
                subject_id: Some(gallery[idx].subject_id.clone()),
                label: Some(gallery[idx].label.clone()),
            },
            _ => GalleryMatch {
                matched: false,
                similarity: if best_idx.is_some() { best_sim } else { 0.0 },
                subject_id: None,
                label: None,
            },
        }
    }
}

/// Compare two possibly-missing encodings with the default parameters.
///
/// A missing side yields [`SimilarityResult::NO_MATCH`].
pub fn compare_faces(a: Option<&FaceEncoding>, b: Option<&FaceEncoding>) -> SimilarityResult {
    match (a, b) {
        (Some(a), Some(b)) => EncodingMatcher::default().compare(a, b),
        _ => SimilarityResult::NO_MATCH,
    }
}

fn euclidean_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f64>()
        .sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ENCODING_LEN;

    fn encoding_with(f: impl Fn(usize) -> f64) -> FaceEncoding {
        FaceEncoding::from_values((0..ENCODING_LEN).map(f).collect())
    }

    fn enrolled(id: &str, encoding: FaceEncoding) -> EnrolledFace {
        EnrolledFace {
            subject_id: id.into(),
            label: format!("{id}-label"),
            encoding,
        }
    }

    #[test]
    fn test_normalizer_is_sqrt_of_hash_segment() {
        assert_eq!(DISTANCE_NORMALIZER, (HASH_SEGMENT_LEN as f64).sqrt());
    }

    #[test]
    fn test_compare_identical() {
        let e = encoding_with(|i| (i % 7) as f64 / 7.0);
        let result = EncodingMatcher::default().compare(&e, &e.clone());
        assert!((result.similarity - 1.0).abs() < 1e-12);
        assert!(result.matched);
    }

    #[test]
    fn test_compare_symmetric() {
        let a = encoding_with(|i| (i % 13) as f64 / 13.0);
        let b = encoding_with(|i| (i % 5) as f64 / 5.0);
        let m = EncodingMatcher::default();
        assert_eq!(m.compare(&a, &b).similarity, m.compare(&b, &a).similarity);
    }

    #[test]
    fn test_compare_length_mismatch() {
        let a = encoding_with(|_| 0.5);
        let b = FaceEncoding::from_values(vec![0.5; 273]);
        let m = EncodingMatcher::default();
        assert_eq!(m.compare(&a, &b), SimilarityResult::NO_MATCH);
        assert_eq!(m.compare(&b, &a), SimilarityResult::NO_MATCH);
    }

    #[test]
    fn test_compare_empty_is_no_match() {
        let empty = FaceEncoding::from_values(Vec::new());
        assert_eq!(EncodingMatcher::default().compare(&empty, &empty), SimilarityResult::NO_MATCH);
    }

    #[test]
    fn test_compare_faces_missing_side() {
        let e = encoding_with(|_| 0.1);
        assert_eq!(compare_faces(None, Some(&e)), SimilarityResult::NO_MATCH);
        assert_eq!(compare_faces(Some(&e), None), SimilarityResult::NO_MATCH);
        assert_eq!(compare_faces(None, None), SimilarityResult::NO_MATCH);
        assert!(compare_faces(Some(&e), Some(&e)).matched);
    }

    #[test]
    fn test_hash_segment_weighting() {
        // 16 hash values differ by 1.0 -> distance 4 -> hash similarity 0.75.
        let a = encoding_with(|_| 0.0);
        let b = encoding_with(|i| if i < 16 { 1.0 } else { 0.0 });
        let sim = EncodingMatcher::default().similarity(&a, &b).unwrap();
        let expected = HASH_WEIGHT * 0.75 + LANDMARK_WEIGHT * 1.0;
        assert!((sim - expected).abs() < 1e-12);
    }

    #[test]
    fn test_padding_region_counts_as_landmarks() {
        // Differences beyond the 17 real features still lower the landmark score.
        let a = encoding_with(|_| 0.0);
        let b = encoding_with(|i| if i >= ENCODING_LEN - 16 { 1.0 } else { 0.0 });
        let sim = EncodingMatcher::default().similarity(&a, &b).unwrap();
        let expected = HASH_WEIGHT * 1.0 + LANDMARK_WEIGHT * 0.75;
        assert!((sim - expected).abs() < 1e-12);
    }

    #[test]
    fn test_threshold_boundary_inclusive() {
        let params = MatchParams { hash_weight: 1.0, landmark_weight: 0.0, threshold: 0.75 };
        let m = EncodingMatcher::new(params);

        // Hash similarity exactly 0.75.
        let a = encoding_with(|_| 0.0);
        let b = encoding_with(|i| if i < 16 { 1.0 } else { 0.0 });
        let result = m.compare(&a, &b);
        assert_eq!(result.similarity, 0.75);
        assert!(result.matched);

        let defaults = MatchParams::default();
        assert!(defaults.is_match(0.75));
        assert!(!defaults.is_match(0.749999));
    }

    #[test]
    fn test_short_encodings_without_landmark_half() {
        let a = FaceEncoding::from_values(vec![0.5; 100]);
        let result = EncodingMatcher::default().compare(&a, &a.clone());
        // Empty landmark half scores 1.
        assert!((result.similarity - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_dissimilar_faces_do_not_match() {
        let a = encoding_with(|_| 0.0);
        let b = encoding_with(|i| if i < HASH_SEGMENT_LEN { 1.0 } else { 0.0 });
        let result = EncodingMatcher::default().compare(&a, &b);
        // Hash similarity 0, landmark similarity 1.
        assert!((result.similarity - LANDMARK_WEIGHT).abs() < 1e-12);
        assert!(!result.matched);
    }

    #[test]
    fn test_best_match_scans_whole_gallery() {
        let capture = encoding_with(|_| 0.5);
        let gallery = vec![
            enrolled("decoy1", encoding_with(|i| if i < HASH_SEGMENT_LEN { 0.0 } else { 0.5 })),
            enrolled("decoy2", encoding_with(|i| if i < HASH_SEGMENT_LEN { 1.0 } else { 0.5 })),
            enrolled("s-42", encoding_with(|_| 0.5)),
        ];

        let result = EncodingMatcher::default().best_match(&capture, &gallery);
        assert!(result.matched);
        assert_eq!(result.subject_id.as_deref(), Some("s-42"));
        assert_eq!(result.label.as_deref(), Some("s-42-label"));
        assert!((result.similarity - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_best_match_below_threshold() {
        let capture = encoding_with(|_| 0.0);
        let gallery = vec![enrolled("other", encoding_with(|i| if i < HASH_SEGMENT_LEN { 1.0 } else { 0.0 }))];
        let result = EncodingMatcher::default().best_match(&capture, &gallery);
        assert!(!result.matched);
        assert!(result.subject_id.is_none());
        assert!((result.similarity - LANDMARK_WEIGHT).abs() < 1e-12);
    }

    #[test]
    fn test_best_match_empty_gallery() {
        let capture = encoding_with(|_| 0.0);
        let result = EncodingMatcher::default().best_match(&capture, &[]);
        assert!(!result.matched);
        assert_eq!(result.similarity, 0.0);
    }

    #[test]
    fn test_best_match_skips_incompatible() {
        let capture = encoding_with(|_| 0.0);
        let gallery = vec![enrolled("legacy", FaceEncoding::from_values(vec![0.0; 128]))];
        let result = EncodingMatcher::default().best_match(&capture, &gallery);
        assert!(!result.matched);
        assert_eq!(result.similarity, 0.0);
    }
}
