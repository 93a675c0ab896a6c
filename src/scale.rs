use crate::ColorImage;
use image::imageops::{self, FilterType};

/// Size of the destination presentation surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// How a rendered image is fitted to the viewport
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FitPolicy {
    /// Fit entirely inside; the presentation layer letterboxes.
    Contain,
    /// Cover the whole viewport; the presentation layer crops.
    Cover,
}

impl FitPolicy {
    /// Uniform factor applied to both axes of a `width` x `height` image
    pub fn factor(self, width: u32, height: u32, viewport: Viewport) -> f64 {
        let fx = viewport.width as f64 / width as f64;
        let fy = viewport.height as f64 / height as f64;
        match self {
            Self::Contain => fx.min(fy),
            Self::Cover => fx.max(fy),
        }
    }

    /// Scaled dimensions, rounded, never below 1x1
    pub fn target_size(self, width: u32, height: u32, viewport: Viewport) -> (u32, u32) {
        let factor = self.factor(width, height, viewport);
        let scaled = |v: u32| ((v as f64 * factor).round() as u32).max(1);
        (scaled(width), scaled(height))
    }
}

/// Resize `image` for the viewport with nearest-neighbour sampling
///
/// Zero-area images come back unchanged.
pub fn scale(image: &ColorImage, viewport: Viewport, policy: FitPolicy) -> ColorImage {
    let _span = tracing::debug_span!("scale").entered();

    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return image.clone();
    }

    let (target_width, target_height) = policy.target_size(width, height, viewport);
    if (target_width, target_height) == (width, height) {
        return image.clone();
    }

    tracing::debug!(
        "Scaling {}x{} -> {}x{} ({:?})",
        width,
        height,
        target_width,
        target_height,
        policy
    );

    imageops::resize(image, target_width, target_height, FilterType::Nearest)
}
