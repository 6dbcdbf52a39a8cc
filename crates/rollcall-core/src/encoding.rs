//! Combining hash and landmark features into a face encoding, and the JSON
//! envelope encodings are stored in.

use crate::error::EncodingError;
use crate::types::{FaceEncoding, LandmarkFeatures, PerceptualHash, ENCODING_LEN};
use serde::{Deserialize, Serialize};

/// Envelope format version written by [`encode`].
pub const ENVELOPE_VERSION: &str = "2.0";

/// Stored form of a face encoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncodingEnvelope {
    pub encoding: FaceEncoding,
    /// Creation time, Unix milliseconds.
    #[serde(default)]
    pub timestamp: i64,
    #[serde(default)]
    pub version: String,
}

impl EncodingEnvelope {
    /// Wrap an encoding, stamped with the current time.
    pub fn new(encoding: FaceEncoding) -> Self {
        Self {
            encoding,
            timestamp: chrono::Utc::now().timestamp_millis(),
            version: ENVELOPE_VERSION.to_string(),
        }
    }
}

/// The only field [`decode`] reads; other envelope fields are ignored.
#[derive(Deserialize)]
struct EncodingField {
    encoding: FaceEncoding,
}

/// Concatenate hash and landmark features, zero-padded (or truncated) to
/// exactly [`ENCODING_LEN`] values.
pub fn combine(hash: &PerceptualHash, landmarks: &LandmarkFeatures) -> FaceEncoding {
    let mut values = Vec::with_capacity(ENCODING_LEN);
    values.extend_from_slice(hash.values());
    values.extend_from_slice(landmarks.values());

    if values.len() > ENCODING_LEN {
        tracing::warn!(len = values.len(), "encoding longer than {ENCODING_LEN}, truncating");
    }
    values.resize(ENCODING_LEN, 0.0);

    FaceEncoding::from_values(values)
}

/// Serialize an encoding into a timestamped envelope string.
pub fn encode(encoding: &FaceEncoding) -> Result<String, EncodingError> {
    let envelope = EncodingEnvelope::new(encoding.clone());
    Ok(serde_json::to_string(&envelope)?)
}

/// Parse a stored envelope, keeping its metadata.
pub fn decode_envelope(data: &str) -> Result<EncodingEnvelope, EncodingError> {
    Ok(serde_json::from_str(data)?)
}

/// Parse a stored envelope and return only its encoding.
///
/// Metadata is not inspected, so envelopes with odd `timestamp`/`version`
/// values still decode. Returns `None` when there is no usable `encoding`
/// array; callers treat that as "no enrollment data".
pub fn decode(data: &str) -> Option<FaceEncoding> {
    match serde_json::from_str::<EncodingField>(data) {
        Ok(field) => Some(field.encoding),
        Err(e) => {
            tracing::debug!(error = %e, "failed to decode face encoding");
            None
        }
    }
}
