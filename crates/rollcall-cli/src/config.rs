use rollcall_core::matcher::{HASH_WEIGHT, LANDMARK_WEIGHT, MATCH_THRESHOLD};
use rollcall_core::MatchParams;
use std::path::PathBuf;

/// CLI configuration, loaded from environment variables.
pub struct Config {
    /// Weighted similarity needed for a match.
    pub match_threshold: f64,
    /// Weight of the perceptual-hash half of the encoding.
    pub hash_weight: f64,
    /// Weight of the landmark half of the encoding.
    pub landmark_weight: f64,
    /// Minimum eye-open probability; 0 disables the check.
    pub min_eye_open: f64,
    /// Directory of enrolled envelopes used by `identify`.
    pub gallery_dir: PathBuf,
}

impl Config {
    /// Load configuration from `ROLLCALL_*` environment variables with defaults.
    pub fn from_env() -> Self {
        let data_dir = std::env::var("XDG_DATA_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
                PathBuf::from(home).join(".local/share")
            })
            .join("rollcall");

        let gallery_dir = std::env::var("ROLLCALL_GALLERY_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| data_dir.join("gallery"));

        Self {
            match_threshold: env_f64("ROLLCALL_MATCH_THRESHOLD", MATCH_THRESHOLD),
            hash_weight: env_f64("ROLLCALL_HASH_WEIGHT", HASH_WEIGHT),
            landmark_weight: env_f64("ROLLCALL_LANDMARK_WEIGHT", LANDMARK_WEIGHT),
            min_eye_open: env_f64("ROLLCALL_MIN_EYE_OPEN", 0.0),
            gallery_dir,
        }
    }

    pub fn match_params(&self) -> MatchParams {
        MatchParams {
            hash_weight: self.hash_weight,
            landmark_weight: self.landmark_weight,
            threshold: self.match_threshold,
        }
    }
}

fn env_f64(key: &str, default: f64) -> f64 {
    std::env::var(key)
        .ok()
        .and_then(|v| parse_finite(&v))
        .unwrap_or(default)
}

/// `"nan"` and `"inf"` parse as f64 but would poison every comparison.
fn parse_finite(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}
