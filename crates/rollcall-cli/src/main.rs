use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use rollcall_core::{
    decode, decode_envelope, encode, DetectedFace, EncodingEnvelope, EncodingMatcher, FaceEncoder, FaceEncoding,
    Matcher,
};
use std::path::{Path, PathBuf};

mod config;
mod gallery;

use config::Config;

#[derive(Parser)]
#[command(name = "rollcall", about = "Rollcall face enrollment and verification")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a face encoding and write its envelope
    Enroll {
        /// Image containing the face
        #[arg(short, long)]
        image: PathBuf,
        /// Detector output (bounds + landmarks) as JSON
        #[arg(short, long)]
        face: PathBuf,
        /// Output file (stdout when omitted)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Verify a capture against one enrolled envelope
    Verify {
        #[arg(short, long)]
        image: PathBuf,
        #[arg(short, long)]
        face: PathBuf,
        /// Stored envelope to compare against
        #[arg(short, long)]
        enrolled: PathBuf,
    },
    /// Find the best match for a capture in a gallery directory
    Identify {
        #[arg(short, long)]
        image: PathBuf,
        #[arg(short, long)]
        face: PathBuf,
        /// Gallery directory (defaults to ROLLCALL_GALLERY_DIR)
        #[arg(short, long)]
        gallery: Option<PathBuf>,
    },
    /// Compare two stored envelopes
    Compare { a: PathBuf, b: PathBuf },
    /// Show envelope metadata
    Inspect { path: PathBuf },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::from_env();
    let encoder = FaceEncoder::new().with_min_eye_open_probability(config.min_eye_open);
    let matcher = EncodingMatcher::new(config.match_params());

    match cli.command {
        Commands::Enroll { image, face, out } => {
            let encoding = encode_capture(&encoder, &image, &face)?;
            let envelope = encode(&encoding)?;
            match out {
                Some(path) => {
                    std::fs::write(&path, &envelope)
                        .with_context(|| format!("writing {}", path.display()))?;
                    tracing::info!(path = %path.display(), "enrollment written");
                }
                None => println!("{envelope}"),
            }
        }
        Commands::Verify { image, face, enrolled } => {
            let capture = encode_capture(&encoder, &image, &face)?;
            let stored = load_encoding(&enrolled)?;
            let result = matcher.compare(&capture, &stored);
            tracing::info!(matched = result.matched, similarity = result.similarity, "verify complete");
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Commands::Identify { image, face, gallery: dir } => {
            let capture = encode_capture(&encoder, &image, &face)?;
            let dir = dir.unwrap_or(config.gallery_dir);
            let enrolled = gallery::load_gallery(&dir)?;
            let result = matcher.best_match(&capture, &enrolled);
            tracing::info!(
                matched = result.matched,
                similarity = result.similarity,
                subject = ?result.subject_id,
                "identify complete"
            );
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Commands::Compare { a, b } => {
            let a = load_encoding(&a)?;
            let b = load_encoding(&b)?;
            let result = matcher.compare(&a, &b);
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Commands::Inspect { path } => {
            let data = read_file(&path)?;
            let envelope = decode_envelope(&data)?;
            println!("{}", serde_json::to_string_pretty(&describe_envelope(&envelope))?);
        }
    }

    Ok(())
}

fn encode_capture(encoder: &FaceEncoder, image_path: &Path, face_path: &Path) -> Result<FaceEncoding> {
    let bytes = std::fs::read(image_path).with_context(|| format!("reading image {}", image_path.display()))?;
    let face: DetectedFace = serde_json::from_str(&read_file(face_path)?)
        .with_context(|| format!("parsing detector output {}", face_path.display()))?;
    encoder
        .encode_bytes(&bytes, &face)
        .with_context(|| format!("encoding face in {}", image_path.display()))
}

/// Metadata summary printed by `inspect`.
fn describe_envelope(envelope: &EncodingEnvelope) -> serde_json::Value {
    let created = chrono::DateTime::<chrono::Utc>::from_timestamp_millis(envelope.timestamp)
        .map(|t| t.to_rfc3339())
        .unwrap_or_else(|| "unknown".to_string());
    serde_json::json!({
        "version": envelope.version,
        "timestamp": envelope.timestamp,
        "created": created,
        "length": envelope.encoding.len(),
    })
}

fn load_encoding(path: &Path) -> Result<FaceEncoding> {
    decode(&read_file(path)?)
        .ok_or_else(|| anyhow!("enrollment data unavailable: {} is not a valid face encoding", path.display()))
}

fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}
