use crate::ColorImage;
use image::Rgba;

/// 4x5 affine colour transform, row-major.
///
/// Rows produce R, G, B, A; columns weight the input R, G, B, A and the
/// last column is a constant offset in 0..=255 channel units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorMatrix(pub [f32; 20]);

/// Luma weights, in R, G, B order.
pub const LUMA_WEIGHTS: [f32; 3] = [0.299, 0.587, 0.114];

impl ColorMatrix {
    pub const IDENTITY: Self = Self([
        1.0, 0.0, 0.0, 0.0, 0.0, //
        0.0, 1.0, 0.0, 0.0, 0.0, //
        0.0, 0.0, 1.0, 0.0, 0.0, //
        0.0, 0.0, 0.0, 1.0, 0.0, //
    ]);

    /// Every colour channel becomes `0.299R + 0.587G + 0.114B`; alpha passes through.
    pub fn desaturate() -> Self {
        let [r, g, b] = LUMA_WEIGHTS;
        Self([
            r, g, b, 0.0, 0.0, //
            r, g, b, 0.0, 0.0, //
            r, g, b, 0.0, 0.0, //
            0.0, 0.0, 0.0, 1.0, 0.0, //
        ])
    }

    pub fn scale(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self([
            r, 0.0, 0.0, 0.0, 0.0, //
            0.0, g, 0.0, 0.0, 0.0, //
            0.0, 0.0, b, 0.0, 0.0, //
            0.0, 0.0, 0.0, a, 0.0, //
        ])
    }

    /// Desaturate, then warm the result by scaling green and blue down.
    pub fn sepia() -> Self {
        Self::scale(1.0, 0.90, 0.77, 1.0).concat(&Self::desaturate())
    }

    /// `self · first`: the returned matrix applies `first`, then `self`.
    pub fn concat(&self, first: &ColorMatrix) -> ColorMatrix {
        let a = &self.0;
        let b = &first.0;
        let mut out = [0.0f32; 20];

        for row in 0..4 {
            for col in 0..5 {
                let mut acc = 0.0f32;
                for k in 0..4 {
                    acc += a[row * 5 + k] * b[k * 5 + col];
                }
                if col == 4 {
                    acc += a[row * 5 + 4];
                }
                out[row * 5 + col] = acc;
            }
        }

        ColorMatrix(out)
    }

    pub fn transform(&self, pixel: Rgba<u8>) -> Rgba<u8> {
        let m = &self.0;
        let input = pixel.0.map(f32::from);
        let mut out = [0u8; 4];

        for (row, channel) in out.iter_mut().enumerate() {
            let r = &m[row * 5..row * 5 + 5];
            let v = r[0] * input[0] + r[1] * input[1] + r[2] * input[2] + r[3] * input[3] + r[4];
            *channel = v.round().clamp(0.0, 255.0) as u8;
        }

        Rgba(out)
    }

    /// Single pass over the image
    pub fn apply(&self, image: &ColorImage) -> ColorImage {
        let (width, height) = image.dimensions();
        ColorImage::from_fn(width, height, |x, y| self.transform(*image.get_pixel(x, y)))
    }
}
