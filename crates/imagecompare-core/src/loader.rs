//! Loading documents into page sets.

use crate::error::{CompareError, Result};
use crate::page::PageSet;
use std::path::Path;

/// Turns a file path into decoded pages.
///
/// Implementations must report a missing path as
/// [`CompareError::FileNotFound`] and an undecodable one as
/// [`CompareError::CorruptImage`].
pub trait PageLoader: Send + Sync {
    /// Load every page of the document at `path`.
    ///
    /// # Errors
    ///
    /// See the trait documentation.
    fn load(&self, path: &Path) -> Result<PageSet>;
}

/// Loads single-page raster images (PNG, JPEG, BMP, ...) with the `image` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageFileLoader;

impl PageLoader for ImageFileLoader {
    fn load(&self, path: &Path) -> Result<PageSet> {
        if !path.is_file() {
            return Err(CompareError::FileNotFound {
                path: path.to_path_buf(),
            });
        }

        let decoded = image::open(path).map_err(|e| CompareError::CorruptImage {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        log::debug!(
            "Loaded {} ({}x{})",
            path.display(),
            decoded.width(),
            decoded.height()
        );
        Ok(PageSet::single(decoded.to_rgb8()))
    }
}

impl<F> PageLoader for F
where
    F: Fn(&Path) -> Result<PageSet> + Send + Sync,
{
    fn load(&self, path: &Path) -> Result<PageSet> {
        self(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    #[test]
    fn test_missing_file() {
        let err = ImageFileLoader
            .load(Path::new("/no/such/reference.png"))
            .unwrap_err();
        assert!(matches!(err, CompareError::FileNotFound { .. }));
    }

    #[test]
    fn test_directory_is_not_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = ImageFileLoader.load(dir.path()).unwrap_err();
        assert!(matches!(err, CompareError::FileNotFound { .. }));
    }

    #[test]
    fn test_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"definitely not a png").unwrap();

        match ImageFileLoader.load(&path).unwrap_err() {
            CompareError::CorruptImage { path: reported, .. } => assert_eq!(reported, path),
            other => panic!("Expected CorruptImage, got {other:?}"),
        }
    }

    #[test]
    fn test_loads_png_as_single_page() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.png");
        RgbImage::from_pixel(8, 6, Rgb([1, 2, 3])).save(&path).unwrap();

        let pages = ImageFileLoader.load(&path).unwrap();
        assert_eq!(pages.len(), 1);
        assert_eq!(pages.dimensions(0), Some((8, 6)));
        assert_eq!(*pages.get(0).unwrap().get_pixel(0, 0), Rgb([1, 2, 3]));
    }

    #[test]
    fn test_closure_loader() {
        let loader = |_: &Path| -> Result<PageSet> { Ok(PageSet::single(RgbImage::new(2, 2))) };
        assert_eq!(loader.load(Path::new("anything")).unwrap().len(), 1);
    }
}
