//! Comparator configuration.
//!
//! A [`CompareConfig`] is built once (from defaults, a TOML file, or code),
//! validated when the comparator is constructed, and never mutated after.
//!
//! ```toml
//! threshold = 0.0
//! dpi = 200
//! take_screenshots = true
//! screenshot_format = "png"
//! morph_iterations = 2
//! ```

use crate::differences::DEFAULT_MORPH_ITERATIONS;
use crate::error::{CompareError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default dissimilarity threshold; any detectable difference fails.
pub const DEFAULT_THRESHOLD: f64 = 0.0;
/// Default resolution for mm/cm conversion.
pub const DEFAULT_DPI: u32 = 200;
/// JPEG quality of recorded screenshots.
pub const JPEG_QUALITY: u8 = 70;
/// Environment variable overriding `morph_iterations`.
pub const MORPH_ITERATIONS_ENV: &str = "EXTENSION";

/// Encoding of recorded screenshots.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScreenshotFormat {
    /// JPEG at quality 70.
    #[default]
    Jpg,
    /// Lossless PNG.
    Png,
}

impl ScreenshotFormat {
    /// File extension without the dot.
    #[inline]
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Jpg => "jpg",
            Self::Png => "png",
        }
    }
}

impl std::fmt::Display for ScreenshotFormat {
    #[inline]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.extension())
    }
}

impl std::str::FromStr for ScreenshotFormat {
    type Err = CompareError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Ok(Self::Jpg),
            "png" => Ok(Self::Png),
            other => Err(CompareError::InvalidConfig(format!(
                "unknown screenshot format '{other}' (expected: jpg, png)"
            ))),
        }
    }
}

/// Settings of an [`crate::ImageComparator`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompareConfig {
    /// Dissimilarity above which a page counts as different, in `[0, 1]`.
    pub threshold: f64,
    /// Resolution used to convert mm/cm region coordinates.
    pub dpi: u32,
    /// Copy the candidate to a missing reference instead of comparing.
    pub reference_run: bool,
    /// Record a side-by-side image of every compared page.
    pub take_screenshots: bool,
    /// Also record the difference map and binary mask of differing pages.
    pub show_diff: bool,
    /// Encoding of recorded screenshots.
    pub screenshot_format: ScreenshotFormat,
    /// Dilate/erode rounds used to merge nearby differences.
    pub morph_iterations: u8,
    /// Size of a dedicated page worker pool. `None` uses the global pool.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workers: Option<usize>,
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            dpi: DEFAULT_DPI,
            reference_run: false,
            take_screenshots: false,
            show_diff: false,
            screenshot_format: ScreenshotFormat::default(),
            morph_iterations: DEFAULT_MORPH_ITERATIONS,
            workers: None,
        }
    }
}

impl CompareConfig {
    /// Check every value is in range.
    ///
    /// # Errors
    ///
    /// Returns [`CompareError::InvalidConfig`] naming the offending field.
    pub fn validate(&self) -> Result<()> {
        validate_threshold(self.threshold)?;
        validate_dpi(self.dpi)?;
        if self.workers == Some(0) {
            return Err(CompareError::InvalidConfig(
                "workers must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Parse and validate a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`CompareError::InvalidConfig`] for syntax errors, unknown
    /// keys, or out-of-range values.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| CompareError::InvalidConfig(format!("failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`CompareError::FileNotFound`] if the file is missing,
    /// otherwise see [`CompareConfig::from_toml_str`].
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(CompareError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content).map_err(|e| match e {
            CompareError::InvalidConfig(msg) => {
                CompareError::InvalidConfig(format!("{}: {msg}", path.display()))
            }
            other => other,
        })
    }

    /// Apply overrides from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`CompareError::InvalidConfig`] if `EXTENSION` is set but is
    /// not an integer in `0..=255`.
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// See [`CompareConfig::with_env_overrides`].
    pub fn with_overrides_from<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(MORPH_ITERATIONS_ENV) {
            self.morph_iterations = value.trim().parse().map_err(|_| {
                CompareError::InvalidConfig(format!(
                    "{MORPH_ITERATIONS_ENV}={value} is not a valid iteration count (0-255)"
                ))
            })?;
            log::debug!(
                "morph_iterations set to {} from {MORPH_ITERATIONS_ENV}",
                self.morph_iterations
            );
        }
        Ok(self)
    }
}

pub(crate) fn validate_threshold(threshold: f64) -> Result<()> {
    if threshold.is_finite() && (0.0..=1.0).contains(&threshold) {
        Ok(())
    } else {
        Err(CompareError::InvalidConfig(format!(
            "threshold must be between 0 and 1, got {threshold}"
        )))
    }
}

pub(crate) fn validate_dpi(dpi: u32) -> Result<()> {
    if dpi == 0 {
        Err(CompareError::InvalidConfig("dpi must be positive".to_string()))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = CompareConfig::default();
        assert!(config.threshold.abs() < f64::EPSILON);
        assert_eq!(config.dpi, 200);
        assert!(!config.reference_run);
        assert_eq!(config.screenshot_format, ScreenshotFormat::Jpg);
        assert_eq!(config.morph_iterations, 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_toml_partial() {
        let config = CompareConfig::from_toml_str(
            r#"
            threshold = 0.05
            screenshot_format = "png"
            "#,
        )
        .unwrap();
        assert!((config.threshold - 0.05).abs() < f64::EPSILON);
        assert_eq!(config.screenshot_format, ScreenshotFormat::Png);
        assert_eq!(config.dpi, DEFAULT_DPI);
    }

    #[test]
    fn test_from_toml_rejects_unknown_key() {
        let err = CompareConfig::from_toml_str("treshold = 0.1").unwrap_err();
        assert!(matches!(err, CompareError::InvalidConfig(_)));
    }

    #[test]
    fn test_out_of_range_values() {
        for toml in ["threshold = 1.5", "threshold = -0.1", "dpi = 0", "workers = 0"] {
            let err = CompareConfig::from_toml_str(toml).unwrap_err();
            assert!(matches!(err, CompareError::InvalidConfig(_)), "{toml}");
        }
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "dpi = 300\nshow_diff = true").unwrap();
        let config = CompareConfig::load(file.path()).unwrap();
        assert_eq!(config.dpi, 300);
        assert!(config.show_diff);
    }

    #[test]
    fn test_load_missing_file() {
        let err = CompareConfig::load(Path::new("/no/such/imagecompare.toml")).unwrap_err();
        assert!(matches!(err, CompareError::FileNotFound { .. }));
    }

    #[test]
    fn test_env_override() {
        let config = CompareConfig::default()
            .with_overrides_from(|key| (key == "EXTENSION").then(|| "5".to_string()))
            .unwrap();
        assert_eq!(config.morph_iterations, 5);

        let err = CompareConfig::default()
            .with_overrides_from(|_| Some("lots".to_string()))
            .unwrap_err();
        assert!(matches!(err, CompareError::InvalidConfig(_)));

        let untouched = CompareConfig::default().with_overrides_from(|_| None).unwrap();
        assert_eq!(untouched, CompareConfig::default());
    }

    #[test]
    fn test_screenshot_format_parsing() {
        assert_eq!("JPEG".parse::<ScreenshotFormat>().unwrap(), ScreenshotFormat::Jpg);
        assert_eq!("png".parse::<ScreenshotFormat>().unwrap(), ScreenshotFormat::Png);
        assert!("gif".parse::<ScreenshotFormat>().is_err());
    }
}
