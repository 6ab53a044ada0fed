//! The comparison pipeline.
//!
//! [`ImageComparator::compare`] runs the whole sequence for two files:
//!
//! 1. load reference and candidate concurrently,
//! 2. resolve the region spec against the reference and mask both documents
//!    with the same regions,
//! 3. check page counts and page sizes,
//! 4. score every page pair in parallel and extract difference regions of
//!    the pages over the threshold,
//! 5. fold the per-page results into a verdict.
//!
//! [`ImageComparator::compare_pages`] runs steps 2-4 on page sets that are
//! already in memory and returns the report without turning it into a verdict.

use crate::annotate::{concat_horizontal, gray_to_rgb, label_candidate, label_reference};
use crate::config::{validate_dpi, validate_threshold, CompareConfig};
use crate::differences::{DifferenceExtractor, DifferenceRegion};
use crate::error::{CompareError, Result};
use crate::loader::{ImageFileLoader, PageLoader};
use crate::mask::{MaskApplier, MaskWarning};
use crate::page::PageSet;
use crate::regions::{PlaceholderResolver, RegionSource, RegionSpec, ResolvedRegion};
use crate::report::{NullSink, ReportSink};
use crate::similarity::SimilarityEngine;
use image::RgbImage;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// One comparison call: two documents plus optional masks and overrides.
#[derive(Debug, Clone, PartialEq)]
pub struct CompareRequest {
    /// Reference (expected) document.
    pub reference: PathBuf,
    /// Candidate (actual) document.
    pub candidate: PathBuf,
    /// Region spec resolved against the reference.
    pub masks: Option<RegionSource>,
    /// Threshold override for this call.
    pub threshold: Option<f64>,
    /// DPI override for this call.
    pub dpi: Option<u32>,
}

impl CompareRequest {
    /// Request comparing `candidate` against `reference`.
    #[must_use]
    pub fn new(reference: impl Into<PathBuf>, candidate: impl Into<PathBuf>) -> Self {
        Self {
            reference: reference.into(),
            candidate: candidate.into(),
            masks: None,
            threshold: None,
            dpi: None,
        }
    }

    /// Mask with the region spec in a JSON file.
    #[must_use]
    pub fn with_mask_file(self, path: impl Into<PathBuf>) -> Self {
        self.with_masks(RegionSource::File(path.into()))
    }

    /// Mask with an inline JSON region spec.
    #[must_use]
    pub fn with_mask_json(self, json: impl Into<String>) -> Self {
        self.with_masks(RegionSource::Inline(json.into()))
    }

    /// Mask with regions from any source.
    #[must_use]
    pub fn with_masks(mut self, masks: RegionSource) -> Self {
        self.masks = Some(masks);
        self
    }

    /// Override the configured threshold.
    #[must_use]
    pub const fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = Some(threshold);
        self
    }

    /// Override the configured DPI.
    #[must_use]
    pub const fn with_dpi(mut self, dpi: u32) -> Self {
        self.dpi = Some(dpi);
        self
    }
}

/// Per-call values used by [`ImageComparator::compare_pages`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompareOptions {
    /// Dissimilarity above which a page is different.
    pub threshold: f64,
    /// Resolution for mm/cm regions.
    pub dpi: u32,
}

impl CompareOptions {
    /// Options taken from a configuration.
    #[must_use]
    pub const fn from_config(config: &CompareConfig) -> Self {
        Self {
            threshold: config.threshold,
            dpi: config.dpi,
        }
    }

    /// Check both values are in range.
    ///
    /// # Errors
    ///
    /// Returns [`CompareError::InvalidConfig`].
    pub fn validate(&self) -> Result<()> {
        validate_threshold(self.threshold)?;
        validate_dpi(self.dpi)
    }
}

/// Result for one page pair.
#[derive(Clone)]
pub struct PageComparison {
    /// 1-based page number.
    pub page: usize,
    /// Dissimilarity in `[0, 1]`.
    pub score: f64,
    /// Whether `score` exceeded the threshold.
    pub is_different: bool,
    /// Difference regions; empty for equal pages.
    pub regions: Vec<DifferenceRegion>,
    /// Bounding box of all differing pixels, for different pages.
    pub bounds: Option<DifferenceRegion>,
    /// Masked reference page with the regions outlined, for different pages.
    pub annotated_reference: Option<RgbImage>,
    /// Masked candidate page with the regions outlined, for different pages.
    pub annotated_candidate: Option<RgbImage>,
    /// References returned by the report sink for this page.
    pub screenshots: Vec<String>,
}

impl std::fmt::Debug for PageComparison {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageComparison")
            .field("page", &self.page)
            .field("score", &self.score)
            .field("is_different", &self.is_different)
            .field("regions", &self.regions)
            .field("bounds", &self.bounds)
            .field("screenshots", &self.screenshots)
            .finish_non_exhaustive()
    }
}

/// Per-page results of one comparison, in page order.
#[derive(Debug, Clone, Default)]
pub struct ComparisonReport {
    /// One entry per page, ordered by page number.
    pub pages: Vec<PageComparison>,
    /// Regions that were masked on both documents.
    pub masks: Vec<ResolvedRegion>,
    /// Regions skipped because their page does not exist.
    pub mask_warnings: Vec<MaskWarning>,
    /// Wall time spent scoring pages.
    pub elapsed: Duration,
}

impl ComparisonReport {
    /// Whether any page is different.
    #[must_use]
    pub fn is_different(&self) -> bool {
        self.pages.iter().any(|p| p.is_different)
    }

    /// 1-based numbers of the different pages.
    #[must_use]
    pub fn different_pages(&self) -> Vec<usize> {
        self.pages
            .iter()
            .filter(|p| p.is_different)
            .map(|p| p.page)
            .collect()
    }

    /// Highest page score, 0 for an empty report.
    #[must_use]
    pub fn max_score(&self) -> f64 {
        self.pages.iter().map(|p| p.score).fold(0.0, f64::max)
    }
}

/// Successful outcome of [`ImageComparator::compare`].
#[derive(Debug, Clone)]
pub enum Verdict {
    /// Every page is within the threshold.
    Equal(ComparisonReport),
    /// Reference-capture mode copied the candidate to this missing reference.
    ReferenceCreated(PathBuf),
}

/// Compares rendered documents page by page.
pub struct ImageComparator {
    config: CompareConfig,
    loader: Arc<dyn PageLoader>,
    sink: Arc<dyn ReportSink>,
    pool: Option<rayon::ThreadPool>,
    engine: SimilarityEngine,
    extractor: DifferenceExtractor,
    applier: MaskApplier,
}

impl std::fmt::Debug for ImageComparator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageComparator")
            .field("config", &self.config)
            .field("dedicated_pool", &self.pool.is_some())
            .finish_non_exhaustive()
    }
}

impl ImageComparator {
    /// Build a comparator reading image files and discarding report images.
    ///
    /// # Errors
    ///
    /// Returns [`CompareError::InvalidConfig`] if the configuration does not
    /// validate or the worker pool cannot be created.
    pub fn new(config: CompareConfig) -> Result<Self> {
        config.validate()?;
        let pool = config
            .workers
            .map(|workers| {
                rayon::ThreadPoolBuilder::new()
                    .num_threads(workers)
                    .thread_name(|i| format!("imagecompare-{i}"))
                    .build()
                    .map_err(|e| {
                        CompareError::InvalidConfig(format!("failed to start worker pool: {e}"))
                    })
            })
            .transpose()?;

        Ok(Self {
            extractor: DifferenceExtractor::new(config.morph_iterations),
            config,
            loader: Arc::new(ImageFileLoader),
            sink: Arc::new(NullSink),
            pool,
            engine: SimilarityEngine::new(),
            applier: MaskApplier::new(),
        })
    }

    /// Replace the page loader.
    #[must_use]
    pub fn with_loader(mut self, loader: Arc<dyn PageLoader>) -> Self {
        self.loader = loader;
        self
    }

    /// Replace the report sink.
    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn ReportSink>) -> Self {
        self.sink = sink;
        self
    }

    /// The validated configuration.
    #[inline]
    #[must_use]
    pub const fn config(&self) -> &CompareConfig {
        &self.config
    }

    /// Compare two documents on disk.
    ///
    /// # Errors
    ///
    /// - [`CompareError::ImagesDiffer`] when at least one page is different.
    /// - [`CompareError::FileNotFound`] / [`CompareError::CorruptImage`] from
    ///   the loader or the mask file.
    /// - [`CompareError::MalformedSpec`] / [`CompareError::InvalidUnit`] for
    ///   a bad region spec.
    /// - [`CompareError::PageCountMismatch`] / [`CompareError::DimensionMismatch`]
    ///   for structurally different documents.
    /// - [`CompareError::InvalidConfig`] for out-of-range overrides.
    /// - [`CompareError::Io`] if capturing a reference fails.
    pub fn compare(&self, request: &CompareRequest) -> Result<Verdict> {
        let options = CompareOptions {
            threshold: request.threshold.unwrap_or(self.config.threshold),
            dpi: request.dpi.unwrap_or(self.config.dpi),
        };
        options.validate()?;

        if self.config.reference_run && !request.reference.exists() {
            return self.capture_reference(&request.reference, &request.candidate);
        }

        let (reference, candidate) = self.install(|| {
            rayon::join(
                || self.loader.load(&request.reference),
                || self.loader.load(&request.candidate),
            )
        });
        let (reference, candidate) = (reference?, candidate?);

        let masks = request
            .masks
            .as_ref()
            .map(RegionSource::load)
            .transpose()?
            .unwrap_or_default();

        let report = self.compare_pages(&reference, &candidate, &masks, &options)?;

        if report.is_different() {
            let pages = report.different_pages();
            log::info!(
                "The compared images are different: pages {pages:?} ({} vs {})",
                request.reference.display(),
                request.candidate.display()
            );
            return Err(CompareError::ImagesDiffer {
                pages,
                max_score: report.max_score(),
            });
        }

        log::info!(
            "The compared images are equal ({} pages, max dissimilarity {:.6})",
            report.pages.len(),
            report.max_score()
        );
        Ok(Verdict::Equal(report))
    }

    /// Compare page sets already in memory.
    ///
    /// `masks` are resolved against `reference` and applied identically to
    /// both sets. Differences do not make this fail; inspect the report.
    ///
    /// # Errors
    ///
    /// Every error of [`ImageComparator::compare`] except loading failures
    /// and [`CompareError::ImagesDiffer`].
    pub fn compare_pages(
        &self,
        reference: &PageSet,
        candidate: &PageSet,
        masks: &[RegionSpec],
        options: &CompareOptions,
    ) -> Result<ComparisonReport> {
        options.validate()?;

        let regions = if masks.is_empty() {
            Vec::new()
        } else {
            PlaceholderResolver::new(options.dpi).resolve(masks, reference)?
        };

        let (masked_reference, masked_candidate, mask_warnings) = if regions.is_empty() {
            (reference.clone(), candidate.clone(), Vec::new())
        } else {
            let reference_outcome = self.applier.apply(reference, &regions);
            let candidate_outcome = self.applier.apply(candidate, &regions);
            let mut warnings = reference_outcome.warnings;
            for warning in candidate_outcome.warnings {
                if !warnings.contains(&warning) {
                    warnings.push(warning);
                }
            }
            (reference_outcome.pages, candidate_outcome.pages, warnings)
        };

        if reference.len() != candidate.len() {
            self.record_page_sets(reference, candidate);
            return Err(CompareError::PageCountMismatch {
                reference: reference.len(),
                candidate: candidate.len(),
            });
        }

        for (index, (r, c)) in reference.iter().zip(candidate.iter()).enumerate() {
            if r.dimensions() != c.dimensions() {
                let page = index + 1;
                self.record(&label_reference(r), &format!("_reference_page_{page}"));
                self.record(&label_candidate(c), &format!("_candidate_page_{page}"));
                return Err(CompareError::DimensionMismatch {
                    page,
                    reference: r.dimensions(),
                    candidate: c.dimensions(),
                });
            }
        }

        let start = Instant::now();
        let pages = self.install(|| {
            masked_reference
                .pages()
                .par_iter()
                .zip(masked_candidate.pages().par_iter())
                .enumerate()
                .map(|(index, (r, c))| self.compare_page(index + 1, r, c, options))
                .collect::<Vec<_>>()
        });
        let elapsed = start.elapsed();
        log::info!(
            "Compared {} page(s) in {:.3}s",
            pages.len(),
            elapsed.as_secs_f64()
        );

        Ok(ComparisonReport {
            pages,
            masks: regions,
            mask_warnings,
            elapsed,
        })
    }

    fn compare_page(
        &self,
        page: usize,
        reference: &RgbImage,
        candidate: &RgbImage,
        options: &CompareOptions,
    ) -> PageComparison {
        let similarity = self.engine.score(reference, candidate);
        let is_different = similarity.score > options.threshold;
        log::debug!(
            "Page {page}: dissimilarity {:.6} (threshold {:.6})",
            similarity.score,
            options.threshold
        );

        let mut screenshots = Vec::new();
        if self.config.take_screenshots {
            let side_by_side =
                concat_horizontal(&label_reference(reference), &label_candidate(candidate));
            screenshots.extend(self.record(&side_by_side, &format!("_page_{page}_compare_concat")));
        }

        if !is_different {
            return PageComparison {
                page,
                score: similarity.score,
                is_different,
                regions: Vec::new(),
                bounds: None,
                annotated_reference: None,
                annotated_candidate: None,
                screenshots,
            };
        }

        let report = self.extractor.extract(&similarity.map, reference, candidate);
        let rectangles = concat_horizontal(
            &label_reference(&report.annotated_reference),
            &label_candidate(&report.annotated_candidate),
        );
        screenshots.extend(self.record(&rectangles, &format!("_page_{page}_rectangles_concat")));
        screenshots.extend(self.record(&report.blended, &format!("_page_{page}_blended")));

        if self.config.show_diff {
            let diff = concat_horizontal(
                &gray_to_rgb(&report.mask.diff),
                &gray_to_rgb(&report.mask.threshold),
            );
            screenshots.extend(self.record(&diff, &format!("_page_{page}_diff")));
        }

        PageComparison {
            page,
            score: similarity.score,
            is_different,
            regions: report.mask.regions,
            bounds: report.mask.bounds,
            annotated_reference: Some(report.annotated_reference),
            annotated_candidate: Some(report.annotated_candidate),
            screenshots,
        }
    }

    fn capture_reference(&self, reference: &Path, candidate: &Path) -> Result<Verdict> {
        if !candidate.is_file() {
            return Err(CompareError::FileNotFound {
                path: candidate.to_path_buf(),
            });
        }
        if let Some(parent) = reference.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::copy(candidate, reference)?;
        log::info!(
            "Reference run: copied {} to {}",
            candidate.display(),
            reference.display()
        );
        Ok(Verdict::ReferenceCreated(reference.to_path_buf()))
    }

    fn record_page_sets(&self, reference: &PageSet, candidate: &PageSet) {
        for (index, page) in reference.iter().enumerate() {
            self.record(&label_reference(page), &format!("_reference_page_{}", index + 1));
        }
        for (index, page) in candidate.iter().enumerate() {
            self.record(&label_candidate(page), &format!("_candidate_page_{}", index + 1));
        }
    }

    /// Hand an image to the sink; failures are logged and otherwise ignored.
    fn record(&self, image: &RgbImage, suffix: &str) -> Option<String> {
        match self.sink.record(image, suffix) {
            Ok(reference) => Some(reference),
            Err(e) => {
                log::warn!("Could not record screenshot {suffix}: {e}");
                None
            }
        }
    }

    fn install<R, F>(&self, f: F) -> R
    where
        R: Send,
        F: FnOnce() -> R + Send,
    {
        match &self.pool {
            Some(pool) => pool.install(f),
            None => f(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regions::parse_region_document;
    use crate::report::CollectingSink;
    use image::Rgb;
    use imageproc::drawing::draw_filled_rect_mut;
    use imageproc::rect::Rect;

    const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

    fn white(w: u32, h: u32) -> RgbImage {
        RgbImage::from_pixel(w, h, WHITE)
    }

    fn with_black_square(mut image: RgbImage, x: i32, y: i32, size: u32) -> RgbImage {
        draw_filled_rect_mut(&mut image, Rect::at(x, y).of_size(size, size), Rgb([0, 0, 0]));
        image
    }

    fn options() -> CompareOptions {
        CompareOptions::from_config(&CompareConfig::default())
    }

    #[test]
    fn test_identical_pages_pass() {
        let comparator = ImageComparator::new(CompareConfig::default()).unwrap();
        let pages = PageSet::single(white(100, 100));
        let report = comparator.compare_pages(&pages, &pages, &[], &options()).unwrap();

        assert!(!report.is_different());
        assert_eq!(report.pages.len(), 1);
        assert_eq!(report.pages[0].page, 1);
        assert!(report.pages[0].score.abs() < f64::EPSILON);
        assert!(report.pages[0].regions.is_empty());
    }

    #[test]
    fn test_black_square_is_flagged_and_recorded() {
        let sink = Arc::new(CollectingSink::new());
        let comparator = ImageComparator::new(CompareConfig::default())
            .unwrap()
            .with_sink(sink.clone());
        let reference = PageSet::single(white(100, 100));
        let candidate = PageSet::single(with_black_square(white(100, 100), 10, 10, 20));

        let report = comparator
            .compare_pages(&reference, &candidate, &[], &options())
            .unwrap();

        assert_eq!(report.different_pages(), vec![1]);
        assert_eq!(report.pages[0].regions.len(), 1);
        assert!(report.pages[0].annotated_candidate.is_some());
        assert_eq!(
            sink.suffixes(),
            vec!["_page_1_rectangles_concat", "_page_1_blended"]
        );
    }

    #[test]
    fn test_threshold_tolerates_small_differences() {
        let comparator = ImageComparator::new(CompareConfig::default()).unwrap();
        let reference = PageSet::single(white(100, 100));
        let candidate = PageSet::single(with_black_square(white(100, 100), 50, 50, 1));
        let lenient = CompareOptions {
            threshold: 0.5,
            dpi: 200,
        };
        let report = comparator
            .compare_pages(&reference, &candidate, &[], &lenient)
            .unwrap();
        assert!(report.pages[0].score > 0.0);
        assert!(!report.is_different());
    }

    #[test]
    fn test_mask_covers_difference() {
        let comparator = ImageComparator::new(CompareConfig::default()).unwrap();
        let reference = PageSet::single(white(100, 200));
        let candidate = PageSet::single(with_black_square(white(100, 200), 10, 5, 10));
        let masks =
            parse_region_document(r#"{"type":"area","location":"top","percent":10}"#).unwrap();

        let report = comparator
            .compare_pages(&reference, &candidate, &masks, &options())
            .unwrap();
        assert_eq!(report.masks.len(), 1);
        assert_eq!((report.masks[0].height, report.masks[0].width), (20, 100));
        assert!(!report.is_different());
    }

    #[test]
    fn test_page_count_mismatch_records_every_page() {
        let sink = Arc::new(CollectingSink::new());
        let comparator = ImageComparator::new(CompareConfig::default())
            .unwrap()
            .with_sink(sink.clone());
        let reference = PageSet::new(vec![white(20, 20), white(20, 20)]);
        let candidate = PageSet::single(white(20, 20));

        let err = comparator
            .compare_pages(&reference, &candidate, &[], &options())
            .unwrap_err();
        assert!(matches!(
            err,
            CompareError::PageCountMismatch {
                reference: 2,
                candidate: 1
            }
        ));
        assert_eq!(
            sink.suffixes(),
            vec!["_reference_page_1", "_reference_page_2", "_candidate_page_1"]
        );
    }

    #[test]
    fn test_dimension_mismatch_names_page() {
        let comparator = ImageComparator::new(CompareConfig::default()).unwrap();
        let reference = PageSet::new(vec![white(20, 20), white(20, 30)]);
        let candidate = PageSet::new(vec![white(20, 20), white(20, 25)]);

        match comparator
            .compare_pages(&reference, &candidate, &[], &options())
            .unwrap_err()
        {
            CompareError::DimensionMismatch {
                page,
                reference,
                candidate,
            } => {
                assert_eq!(page, 2);
                assert_eq!(reference, (20, 30));
                assert_eq!(candidate, (20, 25));
            }
            other => panic!("Expected DimensionMismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_results_are_in_page_order() {
        let comparator = ImageComparator::new(CompareConfig {
            workers: Some(3),
            ..CompareConfig::default()
        })
        .unwrap();
        let reference: PageSet = (0..6).map(|_| white(30, 30)).collect();
        let candidate: PageSet = (0..6)
            .map(|i| {
                if i % 2 == 1 {
                    with_black_square(white(30, 30), 8, 8, 10)
                } else {
                    white(30, 30)
                }
            })
            .collect();

        let report = comparator
            .compare_pages(&reference, &candidate, &[], &options())
            .unwrap();
        let numbers: Vec<usize> = report.pages.iter().map(|p| p.page).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(report.different_pages(), vec![2, 4, 6]);
    }

    #[test]
    fn test_screenshots_and_diff_artifacts() {
        let sink = Arc::new(CollectingSink::new());
        let comparator = ImageComparator::new(CompareConfig {
            take_screenshots: true,
            show_diff: true,
            ..CompareConfig::default()
        })
        .unwrap()
        .with_sink(sink.clone());
        let reference = PageSet::single(white(40, 40));
        let candidate = PageSet::single(with_black_square(white(40, 40), 10, 10, 10));

        let report = comparator
            .compare_pages(&reference, &candidate, &[], &options())
            .unwrap();
        assert_eq!(report.pages[0].screenshots.len(), 4);

        let artifacts = sink.artifacts();
        let suffixes: Vec<&str> = artifacts.iter().map(|a| a.suffix.as_str()).collect();
        assert_eq!(
            suffixes,
            vec![
                "_page_1_compare_concat",
                "_page_1_rectangles_concat",
                "_page_1_blended",
                "_page_1_diff"
            ]
        );
        assert_eq!(artifacts[0].image.dimensions(), (80, 40));
        assert_eq!(artifacts[2].image.dimensions(), (40, 40));

        // Right half of the diff artifact is the threshold before closing.
        let map = crate::similarity::SimilarityEngine::new()
            .score(reference.get(0).unwrap(), candidate.get(0).unwrap())
            .map;
        let raw = crate::differences::binarize(&crate::differences::normalize(&map));
        let diff = &artifacts[3].image;
        assert_eq!(diff.dimensions(), (80, 40));
        for (x, y, pixel) in raw.enumerate_pixels() {
            assert_eq!(diff.get_pixel(40 + x, y)[0], pixel[0], "({x}, {y})");
        }
    }

    #[test]
    fn test_failing_sink_does_not_change_verdict() {
        struct BrokenSink;
        impl ReportSink for BrokenSink {
            fn record(&self, _image: &RgbImage, _suffix: &str) -> Result<String> {
                Err(CompareError::Io(std::io::Error::other("disk full")))
            }
        }

        let comparator = ImageComparator::new(CompareConfig::default())
            .unwrap()
            .with_sink(Arc::new(BrokenSink));
        let reference = PageSet::single(white(40, 40));
        let candidate = PageSet::single(with_black_square(white(40, 40), 10, 10, 10));

        let report = comparator
            .compare_pages(&reference, &candidate, &[], &options())
            .unwrap();
        assert!(report.is_different());
        assert!(report.pages[0].screenshots.is_empty());
    }

    #[test]
    fn test_invalid_override_is_rejected() {
        let comparator = ImageComparator::new(CompareConfig::default()).unwrap();
        let request = CompareRequest::new("a.png", "b.png").with_threshold(2.0);
        assert!(matches!(
            comparator.compare(&request),
            Err(CompareError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let err = ImageComparator::new(CompareConfig {
            dpi: 0,
            ..CompareConfig::default()
        })
        .unwrap_err();
        assert!(matches!(err, CompareError::InvalidConfig(_)));
    }
}
