//! Locating and highlighting the differences between two pages.
//!
//! The similarity map is turned into an 8-bit image, thresholded with Otsu's
//! method (inverted, so dissimilar pixels become foreground), closed with
//! `iterations` rounds of dilation and erosion, and finally split into
//! external contours whose bounding boxes are the difference regions.

use crate::similarity::FloatImage;
use image::{GrayImage, Luma, Rgb, RgbImage};
use imageproc::contours::{find_contours, BorderType};
use imageproc::contrast::{otsu_level, threshold, ThresholdType};
use imageproc::distance_transform::Norm;
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::morphology::{dilate, erode};
use imageproc::rect::Rect;
use serde::{Deserialize, Serialize};

/// Default number of dilate/erode rounds.
pub const DEFAULT_MORPH_ITERATIONS: u8 = 2;
/// Width of the outline drawn around each region.
pub const HIGHLIGHT_STROKE: u32 = 4;
/// Outline colour.
pub const HIGHLIGHT_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
/// Background colour ignored by the blended overlay.
pub const IGNORE_COLOR: Rgb<u8> = Rgb([255, 255, 255]);

/// Bounding box of one contiguous cluster of differing pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DifferenceRegion {
    /// Left edge.
    pub x: u32,
    /// Top edge.
    pub y: u32,
    /// Width.
    pub width: u32,
    /// Height.
    pub height: u32,
}

impl DifferenceRegion {
    fn to_rect(self, inflate: i32) -> Option<Rect> {
        let x = i32::try_from(self.x).ok()? - inflate;
        let y = i32::try_from(self.y).ok()? - inflate;
        let width = i64::from(self.width) + 2 * i64::from(inflate);
        let height = i64::from(self.height) + 2 * i64::from(inflate);
        if width < 1 || height < 1 {
            return None;
        }
        Some(Rect::at(x, y).of_size(u32::try_from(width).ok()?, u32::try_from(height).ok()?))
    }
}

impl std::fmt::Display for DifferenceRegion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}+{}+{}", self.width, self.height, self.x, self.y)
    }
}

/// Binary difference mask and the regions found in it.
#[derive(Debug, Clone)]
pub struct DifferenceMask {
    /// Similarity map scaled to 8 bits (white = identical).
    pub diff: GrayImage,
    /// Otsu-thresholded map before closing (white = different).
    pub threshold: GrayImage,
    /// Thresholded and closed mask (white = different).
    pub mask: GrayImage,
    /// One bounding box per external contour, in contour discovery order.
    pub regions: Vec<DifferenceRegion>,
    /// Bounding box of every foreground pixel, if there is any.
    pub bounds: Option<DifferenceRegion>,
}

/// Everything produced for a page that was flagged as different.
#[derive(Debug, Clone)]
pub struct DifferenceReport {
    /// Difference mask and regions.
    pub mask: DifferenceMask,
    /// Copy of the reference page with every region outlined.
    pub annotated_reference: RgbImage,
    /// Copy of the candidate page with every region outlined.
    pub annotated_candidate: RgbImage,
    /// Annotated candidate blended onto the annotated reference.
    pub blended: RgbImage,
}

impl DifferenceReport {
    /// Difference regions of the page.
    #[inline]
    #[must_use]
    pub fn regions(&self) -> &[DifferenceRegion] {
        &self.mask.regions
    }
}

/// Extracts difference regions from a similarity map and draws them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DifferenceExtractor {
    iterations: u8,
    stroke: u32,
    highlight: Rgb<u8>,
    ignore: Rgb<u8>,
}

impl Default for DifferenceExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_MORPH_ITERATIONS)
    }
}

impl DifferenceExtractor {
    /// Extractor closing the mask with `iterations` rounds of dilate/erode.
    #[must_use]
    pub const fn new(iterations: u8) -> Self {
        Self {
            iterations,
            stroke: HIGHLIGHT_STROKE,
            highlight: HIGHLIGHT_COLOR,
            ignore: IGNORE_COLOR,
        }
    }

    /// Number of dilate/erode rounds.
    #[inline]
    #[must_use]
    pub const fn iterations(&self) -> u8 {
        self.iterations
    }

    /// Find the difference regions of a similarity map.
    #[must_use]
    pub fn find_regions(&self, map: &FloatImage) -> DifferenceMask {
        let diff = normalize(map);
        let threshold = binarize(&diff);
        let mask = self.close(&threshold);
        let regions = external_regions(&mask);
        let bounds = foreground_bounds(&mask);
        log::debug!(
            "Found {} difference region(s): {}",
            regions.len(),
            regions
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        );
        DifferenceMask {
            diff,
            threshold,
            mask,
            regions,
            bounds,
        }
    }

    /// Find the regions and draw them onto copies of both pages.
    ///
    /// `reference` and `candidate` must have the same size as `map`.
    #[must_use]
    pub fn extract(
        &self,
        map: &FloatImage,
        reference: &RgbImage,
        candidate: &RgbImage,
    ) -> DifferenceReport {
        let mask = self.find_regions(map);
        let annotated_reference = self.highlight(reference, &mask.regions);
        let annotated_candidate = self.highlight(candidate, &mask.regions);
        let blended = overlay(&annotated_reference, &annotated_candidate, self.ignore);
        DifferenceReport {
            mask,
            annotated_reference,
            annotated_candidate,
            blended,
        }
    }

    /// Copy of `page` with an outline around every region.
    #[must_use]
    pub fn highlight(&self, page: &RgbImage, regions: &[DifferenceRegion]) -> RgbImage {
        let mut annotated = page.clone();
        let half = i32::try_from(self.stroke / 2).unwrap_or(0);
        let stroke = i32::try_from(self.stroke).unwrap_or(0);
        for region in regions {
            // Nested one-pixel outlines centred on the region edge.
            for inflate in (half - stroke + 1..=half).rev() {
                if let Some(rect) = region.to_rect(inflate) {
                    draw_hollow_rect_mut(&mut annotated, rect, self.highlight);
                }
            }
        }
        annotated
    }

    /// Dilate then erode, merging nearby fragments into single blobs.
    fn close(&self, mask: &GrayImage) -> GrayImage {
        if self.iterations == 0 {
            return mask.clone();
        }
        // The distance transform saturates on images without foreground (or
        // background), which would flip the whole mask.
        let dilated = if mask.pixels().any(|p| p[0] != 0) {
            dilate(mask, Norm::LInf, self.iterations)
        } else {
            mask.clone()
        };
        if dilated.pixels().any(|p| p[0] == 0) {
            erode(&dilated, Norm::LInf, self.iterations)
        } else {
            dilated
        }
    }
}

/// Scale a similarity map to 8 bits, clamping to `[0, 1]` first.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
#[must_use]
pub fn normalize(map: &FloatImage) -> GrayImage {
    GrayImage::from_fn(map.width(), map.height(), |x, y| {
        let s = map.get_pixel(x, y)[0];
        let s = if s.is_nan() { 0.0 } else { s.clamp(0.0, 1.0) };
        Luma([(s * 255.0) as u8])
    })
}

/// Inverted Otsu threshold: low-similarity pixels become foreground.
#[must_use]
pub fn binarize(diff: &GrayImage) -> GrayImage {
    threshold(diff, otsu_level(diff), ThresholdType::BinaryInverted)
}

fn external_regions(mask: &GrayImage) -> Vec<DifferenceRegion> {
    find_contours::<u32>(mask)
        .into_iter()
        .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
        .filter_map(|contour| {
            let (mut min_x, mut min_y) = (u32::MAX, u32::MAX);
            let (mut max_x, mut max_y) = (0, 0);
            for p in &contour.points {
                min_x = min_x.min(p.x);
                min_y = min_y.min(p.y);
                max_x = max_x.max(p.x);
                max_y = max_y.max(p.y);
            }
            (!contour.points.is_empty()).then(|| DifferenceRegion {
                x: min_x,
                y: min_y,
                width: max_x - min_x + 1,
                height: max_y - min_y + 1,
            })
        })
        .collect()
}

fn foreground_bounds(mask: &GrayImage) -> Option<DifferenceRegion> {
    let mut bounds: Option<(u32, u32, u32, u32)> = None;
    for (x, y, p) in mask.enumerate_pixels() {
        if p[0] == 0 {
            continue;
        }
        bounds = Some(match bounds {
            None => (x, y, x, y),
            Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
        });
    }
    bounds.map(|(x0, y0, x1, y1)| DifferenceRegion {
        x: x0,
        y: y0,
        width: x1 - x0 + 1,
        height: y1 - y0 + 1,
    })
}

/// Blend `candidate` 50/50 onto `reference` wherever either pixel differs
/// from `ignore`; elsewhere the reference pixel is kept.
///
/// Both images must have the same size.
#[allow(clippy::cast_possible_truncation)]
#[must_use]
pub fn overlay(reference: &RgbImage, candidate: &RgbImage, ignore: Rgb<u8>) -> RgbImage {
    let mut blended = reference.clone();
    for (out, cand) in blended.pixels_mut().zip(candidate.pixels()) {
        if *out == ignore && *cand == ignore {
            continue;
        }
        for (o, c) in out.0.iter_mut().zip(cand.0) {
            *o = ((u16::from(*o) + u16::from(c) + 1) / 2) as u8;
        }
    }
    blended
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::similarity::SimilarityEngine;
    use imageproc::drawing::draw_filled_rect_mut;

    fn white(w: u32, h: u32) -> RgbImage {
        RgbImage::from_pixel(w, h, IGNORE_COLOR)
    }

    fn with_square(mut image: RgbImage, x: i32, y: i32, size: u32, color: Rgb<u8>) -> RgbImage {
        draw_filled_rect_mut(&mut image, Rect::at(x, y).of_size(size, size), color);
        image
    }

    fn uniform_map(w: u32, h: u32, value: f32) -> FloatImage {
        FloatImage::from_pixel(w, h, Luma([value]))
    }

    #[test]
    fn test_normalize_clamps() {
        let mut map = uniform_map(3, 1, 0.5);
        map.put_pixel(1, 0, Luma([-0.4]));
        map.put_pixel(2, 0, Luma([1.7]));
        let gray = normalize(&map);
        assert_eq!(gray.get_pixel(0, 0)[0], 127);
        assert_eq!(gray.get_pixel(1, 0)[0], 0);
        assert_eq!(gray.get_pixel(2, 0)[0], 255);
    }

    #[test]
    fn test_identical_map_has_no_regions() {
        let found = DifferenceExtractor::default().find_regions(&uniform_map(50, 40, 1.0));
        assert!(found.regions.is_empty());
        assert!(found.bounds.is_none());
        assert!(found.mask.pixels().all(|p| p[0] == 0));
    }

    #[test]
    fn test_single_blob_gives_single_region() {
        let mut map = uniform_map(60, 60, 1.0);
        for y in 20..30 {
            for x in 15..35 {
                map.put_pixel(x, y, Luma([0.0]));
            }
        }
        let found = DifferenceExtractor::default().find_regions(&map);
        assert_eq!(
            found.regions,
            vec![DifferenceRegion {
                x: 15,
                y: 20,
                width: 20,
                height: 10
            }]
        );
        assert_eq!(found.bounds, Some(found.regions[0]));
    }

    #[test]
    fn test_nearby_fragments_are_merged() {
        let mut map = uniform_map(60, 60, 1.0);
        for y in 10..20 {
            for x in 10..20 {
                map.put_pixel(x, y, Luma([0.0]));
            }
            // Second fragment separated by a 2 px gap.
            for x in 22..30 {
                map.put_pixel(x, y, Luma([0.0]));
            }
        }

        let merged = DifferenceExtractor::new(2).find_regions(&map);
        assert_eq!(merged.regions.len(), 1);
        assert_eq!(merged.regions[0].x, 10);
        assert_eq!(merged.regions[0].width, 20);

        // The gap is closed in the mask but still open in the raw threshold.
        assert_eq!(merged.mask.get_pixel(21, 15)[0], 255);
        assert_eq!(merged.threshold.get_pixel(21, 15)[0], 0);
        assert_eq!(merged.threshold.get_pixel(15, 15)[0], 255);

        let separate = DifferenceExtractor::new(0).find_regions(&map);
        assert_eq!(separate.regions.len(), 2);
        let bounds = separate.bounds.unwrap();
        assert_eq!((bounds.x, bounds.width), (10, 20));
    }

    #[test]
    fn test_distant_blobs_stay_separate() {
        let mut map = uniform_map(80, 40, 1.0);
        for y in 5..15 {
            for x in 5..15 {
                map.put_pixel(x, y, Luma([0.0]));
            }
            for x in 60..70 {
                map.put_pixel(x, y, Luma([0.0]));
            }
        }
        let found = DifferenceExtractor::default().find_regions(&map);
        assert_eq!(found.regions.len(), 2);
    }

    #[test]
    fn test_black_square_scenario() {
        let reference = white(100, 100);
        let candidate = with_square(white(100, 100), 10, 10, 20, Rgb([0, 0, 0]));
        let similarity = SimilarityEngine::new().score(&reference, &candidate);
        let report = DifferenceExtractor::default().extract(&similarity.map, &reference, &candidate);

        assert_eq!(report.regions().len(), 1);
        let region = report.regions()[0];
        assert!(region.x.abs_diff(10) <= 6, "{region}");
        assert!(region.y.abs_diff(10) <= 6, "{region}");
        assert!(region.width.abs_diff(20) <= 12, "{region}");
        assert!(region.height.abs_diff(20) <= 12, "{region}");
    }

    #[test]
    fn test_blended_image_keeps_highlight_outlines() {
        let reference = white(100, 100);
        let candidate = with_square(white(100, 100), 40, 40, 20, Rgb([0, 0, 0]));
        let similarity = SimilarityEngine::new().score(&reference, &candidate);
        let report = DifferenceExtractor::default().extract(&similarity.map, &reference, &candidate);

        let region = report.regions()[0];
        let edge = (region.x, region.y + region.height / 2);
        assert_eq!(*report.annotated_reference.get_pixel(edge.0, edge.1), HIGHLIGHT_COLOR);
        assert_eq!(*report.blended.get_pixel(edge.0, edge.1), HIGHLIGHT_COLOR);
    }

    #[test]
    fn test_highlight_draws_on_copy() {
        let page = white(40, 40);
        let region = DifferenceRegion {
            x: 10,
            y: 10,
            width: 10,
            height: 10,
        };
        let annotated = DifferenceExtractor::default().highlight(&page, &[region]);

        assert!(page.pixels().all(|p| *p == IGNORE_COLOR));
        // Stroke spans two pixels outside to one pixel inside the box edge.
        assert_eq!(*annotated.get_pixel(8, 15), HIGHLIGHT_COLOR);
        assert_eq!(*annotated.get_pixel(11, 15), HIGHLIGHT_COLOR);
        assert_eq!(*annotated.get_pixel(7, 15), IGNORE_COLOR);
        assert_eq!(*annotated.get_pixel(15, 15), IGNORE_COLOR);
    }

    #[test]
    fn test_overlay_blends_where_either_differs() {
        let reference = with_square(white(20, 20), 0, 0, 5, Rgb([0, 0, 0]));
        let candidate = with_square(white(20, 20), 10, 10, 5, Rgb([100, 0, 200]));
        let blended = overlay(&reference, &candidate, IGNORE_COLOR);

        assert_eq!(*blended.get_pixel(2, 2), Rgb([128, 128, 128]));
        assert_eq!(*blended.get_pixel(12, 12), Rgb([178, 128, 228]));
        assert_eq!(*blended.get_pixel(18, 2), IGNORE_COLOR);
    }
}
