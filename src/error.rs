use std::path::PathBuf;
use thiserror::Error;

/// Failures raised to the immediate caller.
///
/// Data-availability conditions (no source frame yet, source/mask size
/// mismatch) are not errors; the pipeline reports them as `None`.
#[derive(Debug, Error)]
pub enum OverlayError {
    #[error("label buffer has {actual} values, expected {expected}")]
    InvalidBufferLength { expected: usize, actual: usize },

    #[error("blur radius {0} outside [1.0, 25.0]")]
    InvalidRadius(f32),

    #[error("{} holds raw labels but no label size was given", .0.display())]
    MissingLabelSize(PathBuf),

    #[error("no label maps configured")]
    NoLabelMaps,

    #[error("unknown style: {0}")]
    UnknownStyle(String),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, OverlayError>;
