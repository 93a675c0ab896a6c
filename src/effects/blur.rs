//! Separable Gaussian blur on RGBA images.
//!
//! Conventions:
//! - `sigma = 0.4 * radius + 0.6`, kernel half-width `ceil(radius)`.
//! - Kernel weights are normalized so `sum(w) ~= 1`.
//! - Out-of-range taps clamp to the nearest edge pixel.
//! - Channels are convolved premultiplied by alpha, so fully transparent
//!   pixels contribute no colour to their neighbours.

use crate::error::{OverlayError, Result};
use crate::ColorImage;
use image::Rgba;

pub const MIN_RADIUS: f32 = 1.0;
pub const MAX_RADIUS: f32 = 25.0;

pub fn validate_radius(radius: f32) -> Result<f32> {
    if (MIN_RADIUS..=MAX_RADIUS).contains(&radius) {
        Ok(radius)
    } else {
        Err(OverlayError::InvalidRadius(radius))
    }
}

#[derive(Debug, Clone)]
pub struct GaussianKernel {
    pub sigma: f32,
    pub half_width: usize,
    pub weights: Vec<f32>,
}

impl GaussianKernel {
    pub fn new(radius: f32) -> Result<Self> {
        let radius = validate_radius(radius)?;

        let sigma = 0.4 * radius + 0.6;
        let half_width = radius.ceil() as usize;
        let len = 2 * half_width + 1;

        let two_sigma2 = 2.0 * sigma * sigma;
        let mut weights: Vec<f32> = (0..len)
            .map(|i| {
                let x = i as f32 - half_width as f32;
                (-(x * x) / two_sigma2).exp()
            })
            .collect();

        let sum: f32 = weights.iter().sum();
        for w in &mut weights {
            *w /= sum;
        }

        Ok(Self {
            sigma,
            half_width,
            weights,
        })
    }
}

pub fn gaussian_blur(image: &ColorImage, radius: f32) -> Result<ColorImage> {
    let kernel = GaussianKernel::new(radius)?;

    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Ok(image.clone());
    }

    let w = width as usize;
    let h = height as usize;

    let premultiplied: Vec<[f32; 4]> = image.pixels().map(|p| premultiply(*p)).collect();

    let mut horizontal = vec![[0.0f32; 4]; w * h];
    for y in 0..h {
        let row = &premultiplied[y * w..(y + 1) * w];
        convolve_clamp(row, 1, &kernel, &mut horizontal[y * w..(y + 1) * w], 1);
    }

    let mut vertical = vec![[0.0f32; 4]; w * h];
    for x in 0..w {
        convolve_clamp(&horizontal[x..], w, &kernel, &mut vertical[x..], w);
    }

    Ok(ColorImage::from_fn(width, height, |x, y| {
        unpremultiply(vertical[y as usize * w + x as usize])
    }))
}

/// Convolve one row or column. `stride` steps between consecutive samples
/// in both `src` and `out`; the line length is inferred from `src`.
fn convolve_clamp(
    src: &[[f32; 4]],
    stride: usize,
    kernel: &GaussianKernel,
    out: &mut [[f32; 4]],
    out_stride: usize,
) {
    let n = (src.len() + stride - 1) / stride;
    let r = kernel.half_width as isize;

    for i in 0..n {
        let mut acc = [0.0f32; 4];
        for (k, &kv) in kernel.weights.iter().enumerate() {
            let idx = clamp_index(i as isize + k as isize - r, n);
            let s = &src[idx * stride];
            for c in 0..4 {
                acc[c] += s[c] * kv;
            }
        }
        out[i * out_stride] = acc;
    }
}

#[inline]
fn clamp_index(i: isize, len: usize) -> usize {
    if i < 0 {
        0
    } else {
        (i as usize).min(len - 1)
    }
}

fn premultiply(p: Rgba<u8>) -> [f32; 4] {
    let a = p[3] as f32 / 255.0;
    [p[0] as f32 * a, p[1] as f32 * a, p[2] as f32 * a, p[3] as f32]
}

fn unpremultiply(p: [f32; 4]) -> Rgba<u8> {
    let alpha = p[3].round().clamp(0.0, 255.0);
    if alpha <= 0.0 {
        return Rgba([0, 0, 0, 0]);
    }

    let a = p[3] / 255.0;
    let channel = |v: f32| (v / a).round().clamp(0.0, 255.0) as u8;
    Rgba([channel(p[0]), channel(p[1]), channel(p[2]), alpha as u8])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kernel_is_normalized_and_symmetric() {
        let k = GaussianKernel::new(10.0).unwrap();
        assert_eq!(k.half_width, 10);
        assert_eq!(k.weights.len(), 21);
        assert!((k.sigma - 4.6).abs() < 1e-6);

        let sum: f32 = k.weights.iter().sum();
        assert!((sum - 1.0).abs() < 1e-5);

        for i in 1..=k.half_width {
            let d = k.weights[k.half_width + i] - k.weights[k.half_width - i];
            assert!(d.abs() < 1e-7);
        }
    }

    #[test]
    fn fractional_radius_rounds_half_width_up() {
        let k = GaussianKernel::new(2.5).unwrap();
        assert_eq!(k.half_width, 3);
    }

    #[test]
    fn radius_bounds() {
        let image = ColorImage::new(3, 3);
        for radius in [0.0f32, 0.99, 25.01, 100.0, -1.0, f32::NAN] {
            assert!(matches!(
                gaussian_blur(&image, radius),
                Err(OverlayError::InvalidRadius(_))
            ));
        }
        assert!(gaussian_blur(&image, 1.0).is_ok());
        assert!(gaussian_blur(&image, 25.0).is_ok());
    }

    #[test]
    fn solid_image_is_unchanged() {
        let image = ColorImage::from_pixel(7, 5, Rgba([40, 120, 200, 255]));
        let blurred = gaussian_blur(&image, 25.0).unwrap();
        assert_eq!(blurred, image);
    }

    #[test]
    fn impulse_spreads_symmetrically() {
        let mut image = ColorImage::from_pixel(9, 9, Rgba([0, 0, 0, 255]));
        image.put_pixel(4, 4, Rgba([255, 255, 255, 255]));

        let blurred = gaussian_blur(&image, 2.0).unwrap();
        let center = blurred.get_pixel(4, 4)[0];
        assert!(center < 255);
        assert!(center > blurred.get_pixel(5, 4)[0]);
        assert_eq!(blurred.get_pixel(3, 4), blurred.get_pixel(5, 4));
        assert_eq!(blurred.get_pixel(4, 3), blurred.get_pixel(4, 5));
        assert_eq!(blurred.get_pixel(3, 3), blurred.get_pixel(5, 5));
    }

    #[test]
    fn transparent_neighbours_do_not_darken() {
        let mut image = ColorImage::from_pixel(6, 1, Rgba([0, 0, 0, 0]));
        for x in 3..6 {
            image.put_pixel(x, 0, Rgba([200, 50, 10, 255]));
        }

        let blurred = gaussian_blur(&image, 1.0).unwrap();
        let edge = blurred.get_pixel(3, 0);
        assert!(edge[3] < 255);
        assert_eq!([edge[0], edge[1], edge[2]], [200, 50, 10]);
    }

    #[test]
    fn deterministic() {
        let image = ColorImage::from_fn(16, 9, |x, y| {
            Rgba([(x * 13) as u8, (y * 29) as u8, ((x + y) * 7) as u8, 255])
        });
        let a = gaussian_blur(&image, 7.5).unwrap();
        let b = gaussian_blur(&image, 7.5).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn zero_area_is_a_no_op() {
        let image = ColorImage::new(0, 4);
        assert_eq!(gaussian_blur(&image, 5.0).unwrap(), image);
    }
}
