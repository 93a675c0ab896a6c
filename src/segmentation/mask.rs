use super::types::LabelBuffer;
use crate::error::Result;
use crate::ColorImage;
use image::Rgba;

/// Number of entries in the label colour palette; labels are reduced
/// modulo this before use.
pub const PALETTE_SIZE: u8 = 20;

/// Alpha used for the colourised label overlay.
pub const OVERLAY_ALPHA: u8 = 128;

const OPAQUE_BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);
const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Binary mask: every pixel is either opaque black (primary segment) or
/// fully transparent.
#[derive(Debug, Clone, PartialEq)]
pub struct AlphaMask(ColorImage);

impl AlphaMask {
    pub fn dimensions(&self) -> (u32, u32) {
        self.0.dimensions()
    }

    pub fn is_opaque(&self, x: u32, y: u32) -> bool {
        self.0.get_pixel(x, y)[3] == 255
    }

    pub fn as_image(&self) -> &ColorImage {
        &self.0
    }
}

/// Converts label buffers into masks
pub struct MaskBuilder;

impl MaskBuilder {
    /// Build the binary alpha mask for a label buffer
    ///
    /// A label whose palette index (`label % 20`) is 0 belongs to the
    /// primary segment and becomes opaque black; everything else is
    /// transparent.
    pub fn build(labels: &[u8], width: u32, height: u32) -> Result<AlphaMask> {
        let buffer = LabelBuffer::new(labels, width, height)?;
        Ok(Self::build_from(buffer))
    }

    pub fn build_from(labels: LabelBuffer<'_>) -> AlphaMask {
        let _span = tracing::debug_span!("build_mask").entered();

        let (width, height) = labels.dimensions();
        let data = labels.data();
        let mask = ColorImage::from_fn(width, height, |x, y| {
            let idx = pixel_index(x, y, width);
            if palette_index(data[idx]) == 0 {
                OPAQUE_BLACK
            } else {
                TRANSPARENT
            }
        });

        AlphaMask(mask)
    }

    /// Render labels through the palette at half opacity, for inspecting
    /// what the segmentation produced
    pub fn colorize(labels: &[u8], width: u32, height: u32) -> Result<ColorImage> {
        let buffer = LabelBuffer::new(labels, width, height)?;
        let data = buffer.data();

        Ok(ColorImage::from_fn(width, height, |x, y| {
            let idx = pixel_index(x, y, width);
            let [r, g, b] = label_color(palette_index(data[idx]));
            Rgba([r, g, b, OVERLAY_ALPHA])
        }))
    }
}

/// Row-major offset, computed in `usize` so maps past 2^32 pixels index correctly
fn pixel_index(x: u32, y: u32, width: u32) -> usize {
    y as usize * width as usize + x as usize
}

fn palette_index(label: u8) -> u8 {
    label % PALETTE_SIZE
}

/// PASCAL VOC colour map: the bits of the index are spread across the
/// high bits of the three channels.
pub fn label_color(index: u8) -> [u8; 3] {
    let mut rgb = [0u8; 3];
    let mut c = index;
    for shift in (0..8).rev() {
        rgb[0] |= (c & 1) << shift;
        rgb[1] |= ((c >> 1) & 1) << shift;
        rgb[2] |= ((c >> 2) & 1) << shift;
        c >>= 3;
    }
    rgb
}
