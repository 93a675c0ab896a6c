use crate::effects::{apply_style, StyleKind};
use crate::error::Result;
use crate::segmentation::AlphaMask;
use crate::ColorImage;
use image::Rgba;

const CLEARED: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Cut the mask out of `source` (destination-out) and style what remains.
///
/// Returns `Ok(None)` when `source` and `mask` differ in size or have no
/// area; this is a skip, not a failure. Style errors propagate.
pub fn composite(
    source: &ColorImage,
    mask: &AlphaMask,
    style: StyleKind,
) -> Result<Option<ColorImage>> {
    let _span = tracing::debug_span!("composite").entered();

    let (width, height) = source.dimensions();
    if width == 0 || height == 0 {
        tracing::debug!("Empty source image, nothing to composite");
        return Ok(None);
    }
    if mask.dimensions() != (width, height) {
        tracing::warn!(
            "Source {}x{} does not match mask {}x{}, skipping",
            width,
            height,
            mask.dimensions().0,
            mask.dimensions().1
        );
        return Ok(None);
    }

    let cut = ColorImage::from_fn(width, height, |x, y| {
        if mask.is_opaque(x, y) {
            CLEARED
        } else {
            *source.get_pixel(x, y)
        }
    });

    apply_style(style, &cut).map(Some)
}
