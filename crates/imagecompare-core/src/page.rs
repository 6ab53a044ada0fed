//! Ordered page sequences.
//!
//! A [`PageSet`] holds one RGB image per page (or frame) of a document.
//! Indices are 0-based here; region specs and reports use 1-based page numbers.

use image::RgbImage;

/// Ordered sequence of decoded pages.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct PageSet {
    pages: Vec<RgbImage>,
}

impl PageSet {
    /// Create a page set from decoded pages.
    #[inline]
    #[must_use]
    pub const fn new(pages: Vec<RgbImage>) -> Self {
        Self { pages }
    }

    /// Create a single-page set.
    #[inline]
    #[must_use]
    pub fn single(page: RgbImage) -> Self {
        Self { pages: vec![page] }
    }

    /// Number of pages.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    /// Whether the set has no pages.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Page at a 0-based index.
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&RgbImage> {
        self.pages.get(index)
    }

    /// Mutable page at a 0-based index.
    #[inline]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut RgbImage> {
        self.pages.get_mut(index)
    }

    /// `(width, height)` of the page at a 0-based index.
    #[inline]
    #[must_use]
    pub fn dimensions(&self, index: usize) -> Option<(u32, u32)> {
        self.pages.get(index).map(RgbImage::dimensions)
    }

    /// All pages in order.
    #[inline]
    #[must_use]
    pub fn pages(&self) -> &[RgbImage] {
        &self.pages
    }

    /// Iterate over the pages in order.
    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, RgbImage> {
        self.pages.iter()
    }

    /// Iterate mutably over the pages in order.
    #[inline]
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, RgbImage> {
        self.pages.iter_mut()
    }

    /// Consume the set, returning the pages.
    #[inline]
    #[must_use]
    pub fn into_pages(self) -> Vec<RgbImage> {
        self.pages
    }
}

impl std::fmt::Debug for PageSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sizes: Vec<(u32, u32)> = self.pages.iter().map(RgbImage::dimensions).collect();
        f.debug_struct("PageSet").field("pages", &sizes).finish()
    }
}

impl From<RgbImage> for PageSet {
    #[inline]
    fn from(page: RgbImage) -> Self {
        Self::single(page)
    }
}

impl From<Vec<RgbImage>> for PageSet {
    #[inline]
    fn from(pages: Vec<RgbImage>) -> Self {
        Self::new(pages)
    }
}

impl FromIterator<RgbImage> for PageSet {
    fn from_iter<I: IntoIterator<Item = RgbImage>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl IntoIterator for PageSet {
    type Item = RgbImage;
    type IntoIter = std::vec::IntoIter<RgbImage>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.pages.into_iter()
    }
}

impl<'a> IntoIterator for &'a PageSet {
    type Item = &'a RgbImage;
    type IntoIter = std::slice::Iter<'a, RgbImage>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.pages.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_page_set_dimensions() {
        let pages = PageSet::new(vec![
            RgbImage::from_pixel(10, 20, Rgb([255, 255, 255])),
            RgbImage::from_pixel(30, 40, Rgb([0, 0, 0])),
        ]);
        assert_eq!(pages.len(), 2);
        assert_eq!(pages.dimensions(0), Some((10, 20)));
        assert_eq!(pages.dimensions(1), Some((30, 40)));
        assert_eq!(pages.dimensions(2), None);
    }

    #[test]
    fn test_debug_lists_sizes_not_pixels() {
        let pages = PageSet::single(RgbImage::new(3, 4));
        assert_eq!(format!("{pages:?}"), "PageSet { pages: [(3, 4)] }");
    }
}
