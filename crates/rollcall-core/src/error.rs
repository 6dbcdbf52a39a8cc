use thiserror::Error;

#[derive(Error, Debug)]
pub enum EncodingError {
    #[error("degenerate face bounds: {width}x{height} at ({x}, {y}): width and height must be finite and positive")]
    DegenerateBounds { x: f64, y: f64, width: f64, height: f64 },
    #[error("face crop lies outside the image ({image_width}x{image_height})")]
    EmptyCrop { image_width: u32, image_height: u32 },
    #[error("eyes closed (left={left:.2}, right={right:.2}, minimum {min:.2})")]
    EyesClosed { left: f64, right: f64, min: f64 },
    #[error("image: {0}")]
    Image(#[from] image::ImageError),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}
