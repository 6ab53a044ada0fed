//! Structural similarity (SSIM) scoring.
//!
//! Both pages are reduced to luminance and compared with Gaussian-weighted
//! local windows (sigma 1.5, 11 taps). The result carries the global mean
//! similarity and the per-pixel similarity map used later to locate
//! differences.

use image::{imageops, ImageBuffer, Luma, RgbImage};
use imageproc::filter::separable_filter_equal;

/// Single-channel float image.
pub type FloatImage = ImageBuffer<Luma<f32>, Vec<f32>>;

/// Dynamic range of 8-bit input.
const DATA_RANGE: f32 = 255.0;
const K1: f32 = 0.01;
const K2: f32 = 0.03;

/// Outcome of scoring one page pair.
#[derive(Debug, Clone)]
pub struct Similarity {
    /// Mean structural similarity, 1.0 for identical pages.
    pub ssim: f64,
    /// Dissimilarity `1 - ssim`, clamped to `[0, 1]`.
    pub score: f64,
    /// Local similarity per pixel; same size as the inputs.
    pub map: FloatImage,
}

/// Computes windowed structural similarity between two pages.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimilarityEngine {
    sigma: f32,
    truncate: f32,
}

impl Default for SimilarityEngine {
    fn default() -> Self {
        Self {
            sigma: 1.5,
            truncate: 3.5,
        }
    }
}

impl SimilarityEngine {
    /// Engine with the standard Gaussian window.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Score `reference` against `candidate`.
    ///
    /// # Panics
    ///
    /// Panics if the two images differ in size. Callers check dimensions
    /// first and report [`crate::CompareError::DimensionMismatch`].
    #[must_use]
    pub fn score(&self, reference: &RgbImage, candidate: &RgbImage) -> Similarity {
        assert_eq!(
            reference.dimensions(),
            candidate.dimensions(),
            "similarity requires equally sized images"
        );

        let (x, y) = rayon::join(|| luminance(reference), || luminance(candidate));
        let map = self.ssim_map(&x, &y);
        let ssim = self.mean_similarity(&map);

        Similarity {
            ssim,
            score: (1.0 - ssim).clamp(0.0, 1.0),
            map,
        }
    }

    /// Half-width of the Gaussian window.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn radius(&self) -> u32 {
        (self.truncate * self.sigma + 0.5) as u32
    }

    #[allow(clippy::cast_precision_loss, clippy::cast_possible_wrap)]
    fn kernel(&self) -> Vec<f32> {
        let radius = self.radius() as i32;
        let denom = 2.0 * self.sigma * self.sigma;
        let weights: Vec<f32> = (-radius..=radius)
            .map(|i| (-((i * i) as f32) / denom).exp())
            .collect();
        let sum: f32 = weights.iter().sum();
        weights.into_iter().map(|w| w / sum).collect()
    }

    #[allow(clippy::cast_precision_loss)]
    fn ssim_map(&self, x: &FloatImage, y: &FloatImage) -> FloatImage {
        let kernel = self.kernel();
        let window = kernel.len() as f32;
        // Sample covariance over the window, as with scikit-image defaults.
        let cov_norm = window * window / (window * window - 1.0);

        let xx = product(x, x);
        let yy = product(y, y);
        let xy = product(x, y);

        let blur = |img: &FloatImage| separable_filter_equal(img, &kernel);
        let ((mu_x, mu_y), (e_xx, (e_yy, e_xy))) = rayon::join(
            || rayon::join(|| blur(x), || blur(y)),
            || rayon::join(|| blur(&xx), || rayon::join(|| blur(&yy), || blur(&xy))),
        );

        let c1 = (K1 * DATA_RANGE).powi(2);
        let c2 = (K2 * DATA_RANGE).powi(2);

        let (width, height) = x.dimensions();
        ImageBuffer::from_fn(width, height, |px, py| {
            let ux = mu_x.get_pixel(px, py)[0];
            let uy = mu_y.get_pixel(px, py)[0];
            let vx = cov_norm * (e_xx.get_pixel(px, py)[0] - ux * ux);
            let vy = cov_norm * (e_yy.get_pixel(px, py)[0] - uy * uy);
            let vxy = cov_norm * (e_xy.get_pixel(px, py)[0] - ux * uy);

            let a1 = 2.0 * ux * uy + c1;
            let a2 = 2.0 * vxy + c2;
            let b1 = ux * ux + uy * uy + c1;
            let b2 = vx + vy + c2;
            Luma([(a1 * a2) / (b1 * b2)])
        })
    }

    /// Mean of the map, ignoring a border of one window radius where the
    /// image is large enough to have an interior.
    fn mean_similarity(&self, map: &FloatImage) -> f64 {
        let (width, height) = map.dimensions();
        if width == 0 || height == 0 {
            return 1.0;
        }
        let pad = self.radius();
        let (xs, ys) = if width > 2 * pad && height > 2 * pad {
            (pad..width - pad, pad..height - pad)
        } else {
            (0..width, 0..height)
        };

        let count = f64::from(xs.end - xs.start) * f64::from(ys.end - ys.start);
        let sum: f64 = ys
            .flat_map(|py| xs.clone().map(move |px| (px, py)))
            .map(|(px, py)| f64::from(map.get_pixel(px, py)[0]))
            .sum();
        sum / count
    }
}

fn luminance(image: &RgbImage) -> FloatImage {
    let gray = imageops::grayscale(image);
    ImageBuffer::from_fn(gray.width(), gray.height(), |x, y| {
        Luma([f32::from(gray.get_pixel(x, y)[0])])
    })
}

fn product(a: &FloatImage, b: &FloatImage) -> FloatImage {
    ImageBuffer::from_fn(a.width(), a.height(), |x, y| {
        Luma([a.get_pixel(x, y)[0] * b.get_pixel(x, y)[0]])
    })
}
