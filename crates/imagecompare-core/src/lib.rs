//! Visual regression comparison for rendered images.
//!
//! Compares a reference document against a candidate page by page using
//! structural similarity, after masking regions that are expected to change
//! (timestamps, dynamic content, borders). Pages over the threshold get their
//! differences located, outlined and handed to a report sink.
//!
//! ```rust,ignore
//! use imagecompare_core::{CompareConfig, CompareRequest, ImageComparator, Verdict};
//!
//! let comparator = ImageComparator::new(CompareConfig::default())?;
//! let request = CompareRequest::new("expected.png", "actual.png")
//!     .with_mask_json(r#"{"type": "area", "location": "top", "percent": 10}"#);
//! match comparator.compare(&request)? {
//!     Verdict::Equal(report) => println!("{} page(s) equal", report.pages.len()),
//!     Verdict::ReferenceCreated(path) => println!("created {}", path.display()),
//! }
//! # Ok::<(), imagecompare_core::CompareError>(())
//! ```

pub mod annotate;
pub mod compare;
pub mod config;
pub mod differences;
pub mod error;
pub mod loader;
pub mod mask;
pub mod page;
pub mod regions;
pub mod report;
pub mod similarity;
pub mod units;

pub use compare::{
    CompareOptions, CompareRequest, ComparisonReport, ImageComparator, PageComparison, Verdict,
};
pub use config::{CompareConfig, ScreenshotFormat};
pub use differences::{DifferenceExtractor, DifferenceRegion, DifferenceReport};
pub use error::{CompareError, Result};
pub use loader::{ImageFileLoader, PageLoader};
pub use mask::{MaskApplier, MaskOutcome, MaskWarning, SkipReason};
pub use page::PageSet;
pub use regions::{
    parse_region_document, Location, PageSelector, PlaceholderResolver, RegionSource, RegionSpec,
    ResolvedRegion,
};
pub use report::{CollectingSink, NullSink, ReportSink, ScreenshotDirectory};
pub use similarity::{Similarity, SimilarityEngine};
pub use units::{Unit, UnitConverter};
