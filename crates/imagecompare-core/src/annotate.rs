//! Diagnostic labels and side-by-side composition for report images.

use ab_glyph::{FontRef, PxScale};
use image::{imageops, GrayImage, Rgb, RgbImage};
use imageproc::drawing::draw_text_mut;
use once_cell::sync::Lazy;

/// Label drawn on reference pages.
pub const REFERENCE_LABEL: &str = "Expected Result (Reference)";
/// Label drawn on candidate pages.
pub const CANDIDATE_LABEL: &str = "Actual Result (Candidate)";
/// Label colour.
pub const LABEL_COLOR: Rgb<u8> = Rgb([0, 0, 255]);
/// Label glyph height in pixels.
pub const LABEL_SCALE: f32 = 24.0;

const LABEL_X: i32 = 20;
const LABEL_Y: i32 = 40;
const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);

static FONT_DATA: &[u8] = include_bytes!("../assets/DejaVuSansMono.ttf");

static LABEL_FONT: Lazy<Option<FontRef<'static>>> =
    Lazy::new(|| match FontRef::try_from_slice(FONT_DATA) {
        Ok(font) => Some(font),
        Err(e) => {
            log::warn!("Label font could not be loaded, labels are skipped: {e}");
            None
        }
    });

/// Copy of `page` with `text` drawn near its top-left corner.
#[must_use]
pub fn label(page: &RgbImage, text: &str) -> RgbImage {
    let mut labeled = page.clone();
    if let Some(font) = LABEL_FONT.as_ref() {
        draw_text_mut(
            &mut labeled,
            LABEL_COLOR,
            LABEL_X,
            LABEL_Y,
            PxScale::from(LABEL_SCALE),
            font,
            text,
        );
    }
    labeled
}

/// Copy of `page` labelled as the reference.
#[inline]
#[must_use]
pub fn label_reference(page: &RgbImage) -> RgbImage {
    label(page, REFERENCE_LABEL)
}

/// Copy of `page` labelled as the candidate.
#[inline]
#[must_use]
pub fn label_candidate(page: &RgbImage) -> RgbImage {
    label(page, CANDIDATE_LABEL)
}

/// Place `left` and `right` next to each other. A shorter image is padded
/// with white below.
#[must_use]
pub fn concat_horizontal(left: &RgbImage, right: &RgbImage) -> RgbImage {
    let width = left.width() + right.width();
    let height = left.height().max(right.height());
    let mut canvas = RgbImage::from_pixel(width, height, BACKGROUND);
    imageops::replace(&mut canvas, left, 0, 0);
    imageops::replace(&mut canvas, right, i64::from(left.width()), 0);
    canvas
}

/// Expand a grayscale image to RGB.
#[must_use]
pub fn gray_to_rgb(gray: &GrayImage) -> RgbImage {
    RgbImage::from_fn(gray.width(), gray.height(), |x, y| {
        let v = gray.get_pixel(x, y)[0];
        Rgb([v, v, v])
    })
}
