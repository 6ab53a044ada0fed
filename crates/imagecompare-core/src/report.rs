//! Report sinks: where annotated images go.
//!
//! The comparator hands every diagnostic image to a [`ReportSink`] together
//! with a suffix describing it (for example `_page_1_rectangles_concat`).
//! The sink persists it and returns a reference a report can link to.

use crate::config::{ScreenshotFormat, JPEG_QUALITY};
use crate::error::{CompareError, Result};
use image::codecs::jpeg::JpegEncoder;
use image::RgbImage;
use std::fs;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Name of the screenshot folder inside the output directory.
pub const SCREENSHOT_DIRECTORY: &str = "screenshots";

/// Receives annotated images produced during a comparison.
pub trait ReportSink: Send + Sync {
    /// Persist `image` and return a reference to it.
    ///
    /// # Errors
    ///
    /// Implementation specific; the comparator logs failures and carries on.
    fn record(&self, image: &RgbImage, suffix: &str) -> Result<String>;
}

/// Sink that drops everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl ReportSink for NullSink {
    fn record(&self, _image: &RgbImage, suffix: &str) -> Result<String> {
        Ok(suffix.to_string())
    }
}

/// Writes screenshots to `<output_dir>/screenshots/` under unique names.
#[derive(Debug, Clone)]
pub struct ScreenshotDirectory {
    output_dir: PathBuf,
    format: ScreenshotFormat,
    queue_index: Option<String>,
}

impl ScreenshotDirectory {
    /// Sink writing below `output_dir`, in JPEG.
    #[must_use]
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            format: ScreenshotFormat::default(),
            queue_index: None,
        }
    }

    /// Use a different encoding.
    #[must_use]
    pub const fn with_format(mut self, format: ScreenshotFormat) -> Self {
        self.format = format;
        self
    }

    /// Prefix file names with the index of a parallel run so concurrent
    /// runs sharing an output directory stay distinguishable.
    #[must_use]
    pub fn with_queue_index(mut self, index: impl Into<String>) -> Self {
        self.queue_index = Some(index.into());
        self
    }

    /// Directory the screenshots land in.
    #[must_use]
    pub fn screenshot_dir(&self) -> PathBuf {
        self.output_dir.join(SCREENSHOT_DIRECTORY)
    }

    fn file_name(&self, suffix: &str) -> String {
        let name = format!(
            "{}{suffix}.{}",
            uuid::Uuid::new_v4(),
            self.format.extension()
        );
        match &self.queue_index {
            Some(index) => format!("{index}-{name}"),
            None => name,
        }
    }

    fn write(&self, image: &RgbImage, path: &Path) -> Result<()> {
        let encode_error =
            |e: image::ImageError| CompareError::Io(std::io::Error::other(e.to_string()));
        match self.format {
            ScreenshotFormat::Jpg => {
                let file = BufWriter::new(fs::File::create(path)?);
                JpegEncoder::new_with_quality(file, JPEG_QUALITY)
                    .encode_image(image)
                    .map_err(encode_error)
            }
            ScreenshotFormat::Png => image
                .save_with_format(path, image::ImageFormat::Png)
                .map_err(encode_error),
        }
    }
}

impl ReportSink for ScreenshotDirectory {
    fn record(&self, image: &RgbImage, suffix: &str) -> Result<String> {
        let dir = self.screenshot_dir();
        fs::create_dir_all(&dir)?;

        let name = self.file_name(suffix);
        self.write(image, &dir.join(&name))?;

        let relative = format!("{SCREENSHOT_DIRECTORY}/{name}");
        log::info!("Saved screenshot {relative}");
        Ok(relative)
    }
}

/// One image recorded by a [`CollectingSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Suffix the image was recorded with.
    pub suffix: String,
    /// The image.
    pub image: RgbImage,
}

/// Keeps recorded images in memory.
#[derive(Debug, Default)]
pub struct CollectingSink {
    artifacts: Mutex<Vec<Artifact>>,
}

impl CollectingSink {
    /// Empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far, in recording order.
    #[must_use]
    pub fn artifacts(&self) -> Vec<Artifact> {
        self.artifacts
            .lock()
            .map(|a| a.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    /// Suffixes recorded so far, in recording order.
    #[must_use]
    pub fn suffixes(&self) -> Vec<String> {
        self.artifacts().into_iter().map(|a| a.suffix).collect()
    }
}

impl ReportSink for CollectingSink {
    fn record(&self, image: &RgbImage, suffix: &str) -> Result<String> {
        let mut artifacts = self
            .artifacts
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        artifacts.push(Artifact {
            suffix: suffix.to_string(),
            image: image.clone(),
        });
        Ok(format!("memory:{}{suffix}", artifacts.len() - 1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn sample() -> RgbImage {
        RgbImage::from_pixel(16, 8, Rgb([10, 200, 30]))
    }

    #[test]
    fn test_screenshot_directory_writes_jpg() {
        let dir = tempfile::tempdir().unwrap();
        let sink = ScreenshotDirectory::new(dir.path());

        let relative = sink.record(&sample(), "_page_1_compare_concat").unwrap();
        assert!(relative.starts_with("screenshots/"));
        assert!(relative.ends_with("_page_1_compare_concat.jpg"));

        let written = image::open(dir.path().join(&relative)).unwrap();
        assert_eq!((written.width(), written.height()), (16, 8));
    }

    #[test]
    fn test_screenshot_directory_writes_png_with_queue_index() {
        let dir = tempfile::tempdir().unwrap();
        let sink = ScreenshotDirectory::new(dir.path())
            .with_format(ScreenshotFormat::Png)
            .with_queue_index("3");

        let relative = sink.record(&sample(), "_page_2_blended").unwrap();
        let name = relative.strip_prefix("screenshots/").unwrap();
        assert!(name.starts_with("3-"));
        assert!(name.ends_with("_page_2_blended.png"));

        let written = image::open(dir.path().join(&relative)).unwrap().to_rgb8();
        assert_eq!(written, sample());
    }

    #[test]
    fn test_screenshot_names_are_unique() {
        let dir = tempfile::tempdir().unwrap();
        let sink = ScreenshotDirectory::new(dir.path());
        let a = sink.record(&sample(), "_x").unwrap();
        let b = sink.record(&sample(), "_x").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_collecting_sink_keeps_order() {
        let sink = CollectingSink::new();
        sink.record(&sample(), "_first").unwrap();
        let reference = sink.record(&sample(), "_second").unwrap();
        assert_eq!(reference, "memory:1_second");
        assert_eq!(sink.suffixes(), vec!["_first", "_second"]);
        assert_eq!(sink.artifacts()[0].image, sample());
    }
}
