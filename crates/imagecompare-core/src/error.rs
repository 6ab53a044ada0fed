//! Error types for image comparison.
//!
//! Structural and input problems abort a comparison and surface here with
//! enough context (file, page, dimensions) to diagnose them. A detected
//! visual difference is also reported through [`CompareError`], as
//! [`CompareError::ImagesDiffer`], so callers can treat it as a failed
//! assertion rather than a crash (see [`CompareError::is_verdict_failure`]).

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading, masking or comparing images.
///
/// # Examples
///
/// ```rust,ignore
/// use imagecompare_core::{CompareError, CompareRequest, ImageComparator};
///
/// let comparator = ImageComparator::new(Default::default())?;
/// match comparator.compare(&CompareRequest::new("reference.png", "candidate.png")) {
///     Ok(_) => println!("images are equal"),
///     Err(CompareError::ImagesDiffer { pages, .. }) => eprintln!("pages {pages:?} differ"),
///     Err(e) => eprintln!("comparison could not run: {e}"),
/// }
/// # Ok::<(), CompareError>(())
/// ```
#[derive(Error, Debug)]
pub enum CompareError {
    /// An input image or mask file does not exist.
    #[error("The file does not exist: {}", path.display())]
    FileNotFound {
        /// Path that was looked up.
        path: PathBuf,
    },

    /// An input file exists but could not be decoded as an image.
    #[error("No image could be created for file {}. Maybe the file is corrupt? ({reason})", path.display())]
    CorruptImage {
        /// Path of the undecodable file.
        path: PathBuf,
        /// Decoder message.
        reason: String,
    },

    /// The region-spec document is not valid JSON or a descriptor is malformed.
    #[error("Malformed region spec: {0}")]
    MalformedSpec(String),

    /// A coordinate region names a unit other than `px`, `mm` or `cm`.
    #[error("Invalid unit '{0}' (expected: px, mm, cm)")]
    InvalidUnit(String),

    /// Two pages at the same position have different pixel dimensions.
    #[error(
        "The compared images have different dimensions on page {page}: \
         reference {}x{}, candidate {}x{}",
        reference.0, reference.1, candidate.0, candidate.1
    )]
    DimensionMismatch {
        /// 1-based page number.
        page: usize,
        /// Reference page (width, height).
        reference: (u32, u32),
        /// Candidate page (width, height).
        candidate: (u32, u32),
    },

    /// Reference and candidate documents have a different number of pages.
    #[error(
        "Reference file and candidate file have different number of pages: \
         reference {reference}, candidate {candidate}"
    )]
    PageCountMismatch {
        /// Pages in the reference document.
        reference: usize,
        /// Pages in the candidate document.
        candidate: usize,
    },

    /// The comparison ran and found visual differences.
    #[error("The compared images are different (pages {pages:?}, max dissimilarity {max_score:.6})")]
    ImagesDiffer {
        /// 1-based numbers of the pages flagged as different.
        pages: Vec<usize>,
        /// Highest dissimilarity score among those pages.
        max_score: f64,
    },

    /// A configuration value is out of range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// File I/O error (reading mask files, capturing references).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CompareError {
    /// Whether this error is the "images differ" verdict rather than a failure
    /// to run the comparison at all.
    #[inline]
    #[must_use]
    pub const fn is_verdict_failure(&self) -> bool {
        matches!(self, Self::ImagesDiffer { .. })
    }
}

/// Result type alias for comparison operations.
pub type Result<T> = std::result::Result<T, CompareError>;
