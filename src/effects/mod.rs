mod blur;
mod color_matrix;

pub use blur::{gaussian_blur, validate_radius, GaussianKernel, MAX_RADIUS, MIN_RADIUS};
pub use color_matrix::{ColorMatrix, LUMA_WEIGHTS};

use crate::error::{OverlayError, Result};
use crate::ColorImage;
use std::fmt;
use std::str::FromStr;

/// Style effect applied to the region left after the mask cut
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum StyleKind {
    #[default]
    Identity,
    Grayscale,
    Sepia,
    /// Gaussian blur, radius in pixels within [1.0, 25.0]
    Blur(f32),
}

impl StyleKind {
    /// Blur with a validated radius
    pub fn blur(radius: f32) -> Result<Self> {
        Ok(Self::Blur(validate_radius(radius)?))
    }
}

/// Apply a style to an image, producing a new image of the same size
///
/// Zero-area images come back unchanged. A blur radius outside
/// [1.0, 25.0] fails with [`OverlayError::InvalidRadius`].
pub fn apply_style(kind: StyleKind, image: &ColorImage) -> Result<ColorImage> {
    let _span = tracing::debug_span!("apply_style", style = %kind).entered();

    if let StyleKind::Blur(radius) = kind {
        validate_radius(radius)?;
    }
    if image.width() == 0 || image.height() == 0 {
        return Ok(image.clone());
    }

    match kind {
        StyleKind::Identity => Ok(image.clone()),
        StyleKind::Grayscale => Ok(ColorMatrix::desaturate().apply(image)),
        StyleKind::Sepia => Ok(ColorMatrix::sepia().apply(image)),
        StyleKind::Blur(radius) => gaussian_blur(image, radius),
    }
}

impl fmt::Display for StyleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Identity => write!(f, "identity"),
            Self::Grayscale => write!(f, "grayscale"),
            Self::Sepia => write!(f, "sepia"),
            Self::Blur(radius) => write!(f, "blur:{radius}"),
        }
    }
}

impl FromStr for StyleKind {
    type Err = OverlayError;

    /// Accepts `identity`, `grayscale`, `sepia`, `blur:<radius>` and the
    /// presets `blur1`, `blur2`, `blur3` (radius 5, 10, 15).
    fn from_str(s: &str) -> Result<Self> {
        let name = s.trim().to_ascii_lowercase();
        match name.as_str() {
            "identity" | "none" => Ok(Self::Identity),
            "grayscale" | "gray" => Ok(Self::Grayscale),
            "sepia" => Ok(Self::Sepia),
            "blur1" => Self::blur(5.0),
            "blur2" => Self::blur(10.0),
            "blur3" => Self::blur(15.0),
            other => {
                let radius = other
                    .strip_prefix("blur:")
                    .and_then(|r| r.parse::<f32>().ok())
                    .ok_or_else(|| OverlayError::UnknownStyle(s.to_string()))?;
                Self::blur(radius)
            }
        }
    }
}
