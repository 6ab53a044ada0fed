//! Stamping resolved regions onto page copies.

use crate::page::PageSet;
use crate::regions::{PageSelector, ResolvedRegion};
use image::{Rgb, RgbImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;

/// Margin added around every region on each side, in pixels.
pub const MASK_PADDING: u32 = 5;

/// Fill colour of masked areas.
pub const MASK_COLOR: Rgb<u8> = Rgb([0, 0, 255]);

/// Why a region was left off a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The region targets a page the document does not have.
    MissingPage {
        /// Number of pages in the set the region was applied to.
        page_count: usize,
    },
    /// The padded rectangle does not overlap the page at all.
    OutsidePage {
        /// 1-based page the region missed.
        page: usize,
        /// Page width in pixels.
        width: u32,
        /// Page height in pixels.
        height: u32,
    },
}

/// A region that could not be applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaskWarning {
    /// The skipped region.
    pub region: ResolvedRegion,
    /// What kept it off the page.
    pub reason: SkipReason,
}

impl std::fmt::Display for MaskWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.reason {
            SkipReason::MissingPage { page_count } => write!(
                f,
                "mask {} skipped: document has {page_count} page(s)",
                self.region
            ),
            SkipReason::OutsidePage {
                page,
                width,
                height,
            } => write!(
                f,
                "mask {} skipped: lies outside page {page} ({width}x{height})",
                self.region
            ),
        }
    }
}

/// Masked pages plus the regions that were skipped.
#[derive(Debug, Clone, Default)]
pub struct MaskOutcome {
    /// Copies of the input pages with every applicable region filled.
    pub pages: PageSet,
    /// One entry per skipped region and page.
    pub warnings: Vec<MaskWarning>,
}

/// Fills padded rectangles with an opaque colour on copies of a page set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaskApplier {
    padding: u32,
    color: Rgb<u8>,
}

impl Default for MaskApplier {
    fn default() -> Self {
        Self {
            padding: MASK_PADDING,
            color: MASK_COLOR,
        }
    }
}

impl MaskApplier {
    /// Applier with the standard padding and colour.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply `regions` to copies of `pages`. The input is left untouched.
    ///
    /// Regions targeting a page the set does not have, or lying entirely off
    /// the page, are skipped with a [`MaskWarning`]; the remaining regions
    /// are still applied.
    #[must_use]
    pub fn apply(&self, pages: &PageSet, regions: &[ResolvedRegion]) -> MaskOutcome {
        let mut masked = pages.clone();
        let mut warnings = Vec::new();
        let mut skip = |region: &ResolvedRegion, reason: SkipReason| {
            let warning = MaskWarning {
                region: region.clone(),
                reason,
            };
            log::warn!("{warning}");
            warnings.push(warning);
        };

        for region in regions {
            match region.page {
                PageSelector::All => {
                    for (index, page) in masked.iter_mut().enumerate() {
                        if let Err(reason) = self.stamp(page, region, index + 1) {
                            skip(region, reason);
                        }
                    }
                }
                PageSelector::Page(number) => {
                    let page = number.checked_sub(1).and_then(|index| masked.get_mut(index));
                    let result = match page {
                        Some(page) => self.stamp(page, region, number),
                        None => Err(SkipReason::MissingPage {
                            page_count: pages.len(),
                        }),
                    };
                    if let Err(reason) = result {
                        skip(region, reason);
                    }
                }
            }
        }

        MaskOutcome {
            pages: masked,
            warnings,
        }
    }

    fn stamp(
        &self,
        page: &mut RgbImage,
        region: &ResolvedRegion,
        number: usize,
    ) -> std::result::Result<(), SkipReason> {
        let rect = self
            .clipped_rect(region, page.width(), page.height())
            .ok_or(SkipReason::OutsidePage {
                page: number,
                width: page.width(),
                height: page.height(),
            })?;
        draw_filled_rect_mut(page, rect, self.color);
        Ok(())
    }

    /// Padded rectangle of `region` clipped to a `width` x `height` page.
    fn clipped_rect(&self, region: &ResolvedRegion, width: u32, height: u32) -> Option<Rect> {
        let pad = i64::from(self.padding);
        let left = (i64::from(region.x) - pad).max(0);
        let top = (i64::from(region.y) - pad).max(0);
        let right = (i64::from(region.x) + i64::from(region.width) + pad).min(i64::from(width));
        let bottom = (i64::from(region.y) + i64::from(region.height) + pad).min(i64::from(height));
        if right <= left || bottom <= top {
            return None;
        }

        let at = Rect::at(i32::try_from(left).ok()?, i32::try_from(top).ok()?);
        Some(at.of_size(
            u32::try_from(right - left).ok()?,
            u32::try_from(bottom - top).ok()?,
        ))
    }
}
