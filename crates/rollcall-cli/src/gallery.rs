//! Directory-backed gallery of enrolled encodings.
//!
//! One envelope per `<subject_id>.json` file.

use anyhow::{Context, Result};
use rollcall_core::{decode_envelope, EnrolledFace};
use std::path::Path;

/// Load every readable envelope in `dir`. Unreadable or corrupt files are
/// skipped with a warning.
pub fn load_gallery(dir: &Path) -> Result<Vec<EnrolledFace>> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("reading gallery directory {}", dir.display()))?;

    let mut gallery = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        let Some(subject_id) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };

        let envelope = match std::fs::read_to_string(&path)
            .map_err(anyhow::Error::from)
            .and_then(|data| decode_envelope(&data).map_err(anyhow::Error::from))
        {
            Ok(envelope) => envelope,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "skipping unreadable enrollment");
                continue;
            }
        };

        gallery.push(EnrolledFace {
            subject_id: subject_id.to_string(),
            label: format!("v{}@{}", envelope.version, envelope.timestamp),
            encoding: envelope.encoding,
        });
    }

    gallery.sort_by(|a, b| a.subject_id.cmp(&b.subject_id));
    tracing::info!(dir = %dir.display(), count = gallery.len(), "gallery loaded");
    Ok(gallery)
}
