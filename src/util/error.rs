//! Error types for scalematch.

use thiserror::Error;

/// Result alias for scalematch operations.
pub type ScaleMatchResult<T> = std::result::Result<T, ScaleMatchError>;

/// Errors that can occur when matching templates against a scene.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ScaleMatchError {
    /// Width or height is zero, or the pixel count overflows.
    #[error("invalid dimensions {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },
    /// Row stride is smaller than the row width.
    #[error("stride {stride} is smaller than width {width}")]
    InvalidStride { width: usize, stride: usize },
    /// Backing buffer cannot hold the described image.
    #[error("buffer too small: needed {needed} elements, got {got}")]
    BufferTooSmall { needed: usize, got: usize },
    /// Template cannot be normalized (for example, all pixels equal).
    #[error("degenerate template: {reason}")]
    DegenerateTemplate { reason: &'static str },
    /// Template does not fit inside the scene.
    #[error("template {tpl_width}x{tpl_height} does not fit scene {img_width}x{img_height}")]
    TemplateTooLarge {
        tpl_width: usize,
        tpl_height: usize,
        img_width: usize,
        img_height: usize,
    },
    /// Detection parameters are out of range.
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
    /// Image decoding or encoding failed.
    #[error("image io: {reason}")]
    ImageIo { reason: String },
    /// A scene could not be processed.
    #[error("scene {id} failed: {reason}")]
    SceneFailed { id: String, reason: String },
}
