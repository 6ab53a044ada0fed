//! Region-spec documents and their resolution into pixel rectangles.
//!
//! A region-spec document is JSON: either one descriptor object or an array
//! of them. Each descriptor has a `type` tag selecting one of two kinds:
//!
//! ```json
//! [
//!     { "page": 1, "name": "Top Border", "type": "area", "location": "top", "percent": 5 },
//!     { "page": "all", "type": "coordinates", "x": 0, "y": 0, "height": 10, "width": 210, "unit": "mm" }
//! ]
//! ```
//!
//! [`PlaceholderResolver`] turns descriptors into [`ResolvedRegion`]s, whose
//! fields are always whole pixels.

use crate::error::{CompareError, Result};
use crate::page::PageSet;
use crate::units::{Unit, UnitConverter};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default `percent` of an area region.
pub const DEFAULT_AREA_PERCENT: f64 = 10.0;

/// Page targeted by a region.
///
/// Deserializes from an integer >= 1, a decimal string such as `"2"`, or the
/// literal `"all"`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawPage", into = "RawPage")]
pub enum PageSelector {
    /// Every page of the document.
    #[default]
    All,
    /// A single page, 1-based.
    Page(usize),
}

impl PageSelector {
    /// 0-based page index, or `None` for [`PageSelector::All`] and the
    /// invalid `Page(0)`.
    #[inline]
    #[must_use]
    pub const fn index(self) -> Option<usize> {
        match self {
            Self::All => None,
            Self::Page(number) => number.checked_sub(1),
        }
    }
}

impl std::fmt::Display for PageSelector {
    #[inline]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::All => write!(f, "all"),
            Self::Page(number) => write!(f, "{number}"),
        }
    }
}

/// Wire form of a page selector.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RawPage {
    Number(i64),
    Text(String),
}

impl TryFrom<RawPage> for PageSelector {
    type Error = String;

    fn try_from(raw: RawPage) -> std::result::Result<Self, Self::Error> {
        let number = match raw {
            RawPage::Number(n) => n,
            RawPage::Text(text) => {
                let text = text.trim();
                if text.eq_ignore_ascii_case("all") {
                    return Ok(Self::All);
                }
                text.parse::<i64>()
                    .map_err(|_| format!("invalid page '{text}' (expected a page number or \"all\")"))?
            }
        };
        usize::try_from(number)
            .ok()
            .filter(|&n| n >= 1)
            .map(Self::Page)
            .ok_or_else(|| format!("invalid page {number} (page numbers start at 1)"))
    }
}

impl From<PageSelector> for RawPage {
    fn from(page: PageSelector) -> Self {
        match page {
            PageSelector::All => Self::Text("all".to_string()),
            PageSelector::Page(n) => Self::Number(i64::try_from(n).unwrap_or(i64::MAX)),
        }
    }
}

/// Edge of the page an area region hugs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Location {
    /// Full-width band along the top edge.
    Top,
    /// Full-width band along the bottom edge.
    Bottom,
    /// Full-height band along the left edge.
    Left,
    /// Full-height band along the right edge.
    Right,
}

/// Explicit rectangle in a physical unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CoordinateRegion {
    /// Target page.
    #[serde(default)]
    pub page: PageSelector,
    /// Optional label used in diagnostics.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Height.
    pub height: f64,
    /// Width.
    pub width: f64,
    /// Unit name; checked when the region is resolved.
    #[serde(default = "default_unit")]
    pub unit: String,
}

/// Band along one edge of the page, sized as a percentage of the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AreaRegion {
    /// Target page.
    #[serde(default)]
    pub page: PageSelector,
    /// Optional label used in diagnostics.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Edge the band is attached to.
    pub location: Location,
    /// Band size in percent of the page height (top/bottom) or width (left/right).
    #[serde(default = "default_percent")]
    pub percent: f64,
}

fn default_unit() -> String {
    Unit::Px.to_string()
}

const fn default_percent() -> f64 {
    DEFAULT_AREA_PERCENT
}

/// One descriptor of a region-spec document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RegionSpec {
    /// `"type": "coordinates"`
    Coordinates(CoordinateRegion),
    /// `"type": "area"`
    Area(AreaRegion),
}

impl RegionSpec {
    /// Target page of the descriptor.
    #[inline]
    #[must_use]
    pub const fn page(&self) -> PageSelector {
        match self {
            Self::Coordinates(region) => region.page,
            Self::Area(region) => region.page,
        }
    }

    /// Optional descriptor name.
    #[inline]
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Coordinates(region) => region.name.as_deref(),
            Self::Area(region) => region.name.as_deref(),
        }
    }
}

/// Parse a region-spec document (one object or an array of objects).
///
/// # Errors
///
/// Returns [`CompareError::MalformedSpec`] if the text is not JSON, a
/// descriptor has an unknown `type`, or a required field is missing.
pub fn parse_region_document(json: &str) -> Result<Vec<RegionSpec>> {
    let document: serde_json::Value = serde_json::from_str(json)
        .map_err(|e| CompareError::MalformedSpec(format!("document is not valid JSON: {e}")))?;

    match document {
        serde_json::Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(i, item)| {
                parse_descriptor(item)
                    .map_err(|e| CompareError::MalformedSpec(format!("region {}: {e}", i + 1)))
            })
            .collect(),
        single => parse_descriptor(single)
            .map(|spec| vec![spec])
            .map_err(CompareError::MalformedSpec),
    }
}

fn parse_descriptor(value: serde_json::Value) -> std::result::Result<RegionSpec, String> {
    if !value.is_object() {
        return Err(format!("expected a region object, found {value}"));
    }
    serde_json::from_value(value).map_err(|e| e.to_string())
}

/// Where a region-spec document comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum RegionSource {
    /// JSON file on disk.
    File(PathBuf),
    /// Inline JSON text.
    Inline(String),
    /// Already-parsed descriptors.
    Specs(Vec<RegionSpec>),
}

impl RegionSource {
    /// Read and parse the document.
    ///
    /// # Errors
    ///
    /// Returns [`CompareError::FileNotFound`] for a missing file,
    /// [`CompareError::Io`] if it cannot be read, and
    /// [`CompareError::MalformedSpec`] if it does not parse.
    pub fn load(&self) -> Result<Vec<RegionSpec>> {
        match self {
            Self::File(path) => {
                if !path.is_file() {
                    return Err(CompareError::FileNotFound { path: path.clone() });
                }
                let text = std::fs::read_to_string(path)?;
                parse_region_document(&text).map_err(|e| match e {
                    CompareError::MalformedSpec(msg) => {
                        CompareError::MalformedSpec(format!("{}: {msg}", path.display()))
                    }
                    other => other,
                })
            }
            Self::Inline(text) => parse_region_document(text),
            Self::Specs(specs) => Ok(specs.clone()),
        }
    }
}

/// A region in pixel units, ready to be stamped onto pages.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResolvedRegion {
    /// Target page.
    pub page: PageSelector,
    /// Left edge in pixels.
    pub x: i32,
    /// Top edge in pixels.
    pub y: i32,
    /// Height in pixels.
    pub height: u32,
    /// Width in pixels.
    pub width: u32,
    /// Name carried over from the descriptor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl std::fmt::Display for ResolvedRegion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(name) = &self.name {
            write!(f, "'{name}' ")?;
        }
        write!(
            f,
            "(page {}, x {}, y {}, {}x{})",
            self.page, self.x, self.y, self.width, self.height
        )
    }
}

/// Resolves region descriptors into pixel rectangles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaceholderResolver {
    converter: UnitConverter,
}

impl PlaceholderResolver {
    /// Create a resolver converting physical units at `dpi`.
    #[inline]
    #[must_use]
    pub const fn new(dpi: u32) -> Self {
        Self {
            converter: UnitConverter::new(dpi),
        }
    }

    /// Resolve every descriptor, preserving input order.
    ///
    /// Overlapping regions are kept as they are; nothing is deduplicated.
    ///
    /// # Errors
    ///
    /// Fails on the first descriptor that cannot be resolved, see
    /// [`PlaceholderResolver::resolve_one`].
    pub fn resolve(&self, specs: &[RegionSpec], pages: &PageSet) -> Result<Vec<ResolvedRegion>> {
        let regions = specs
            .iter()
            .map(|spec| self.resolve_one(spec, pages))
            .collect::<Result<Vec<_>>>()?;
        log::debug!(
            "Identified masks: {}",
            regions
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        );
        Ok(regions)
    }

    /// Resolve a single descriptor.
    ///
    /// Area regions are sized from the page they target; for `page: "all"`
    /// the first page is the basis for every page.
    ///
    /// # Errors
    ///
    /// - [`CompareError::InvalidUnit`] for an unknown coordinate unit.
    /// - [`CompareError::MalformedSpec`] for negative sizes, a percentage
    ///   outside 0..=100, or an area region on a page the document lacks.
    pub fn resolve_one(&self, spec: &RegionSpec, pages: &PageSet) -> Result<ResolvedRegion> {
        match spec {
            RegionSpec::Coordinates(region) => self.resolve_coordinates(region),
            RegionSpec::Area(region) => Self::resolve_area(region, pages),
        }
    }

    fn resolve_coordinates(&self, region: &CoordinateRegion) -> Result<ResolvedRegion> {
        let unit: Unit = region.unit.parse()?;
        let x = self.converter.resolve(region.x, unit);
        let y = self.converter.resolve(region.y, unit);
        let height = self.converter.resolve(region.height, unit);
        let width = self.converter.resolve(region.width, unit);

        let (Ok(height), Ok(width)) = (u32::try_from(height), u32::try_from(width)) else {
            return Err(CompareError::MalformedSpec(format!(
                "coordinates region{} has a negative size ({} x {} {unit})",
                describe_name(region.name.as_deref()),
                region.width,
                region.height
            )));
        };

        Ok(ResolvedRegion {
            page: region.page,
            x,
            y,
            height,
            width,
            name: region.name.clone(),
        })
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn resolve_area(region: &AreaRegion, pages: &PageSet) -> Result<ResolvedRegion> {
        if !(0.0..=100.0).contains(&region.percent) {
            return Err(CompareError::MalformedSpec(format!(
                "area region{} has percent {} (expected 0-100)",
                describe_name(region.name.as_deref()),
                region.percent
            )));
        }

        let basis = match region.page {
            PageSelector::All => Some(0),
            PageSelector::Page(_) => region.page.index(),
        };
        let (image_width, image_height) = basis
            .and_then(|index| pages.dimensions(index))
            .ok_or_else(|| {
                CompareError::MalformedSpec(format!(
                    "area region{} targets page {} but the document has {} page(s)",
                    describe_name(region.name.as_deref()),
                    region.page,
                    pages.len()
                ))
            })?;

        let band = |extent: u32| (f64::from(extent) * region.percent / 100.0).trunc() as u32;

        let (x, y, width, height) = match region.location {
            Location::Top => (0, 0, image_width, band(image_height)),
            Location::Bottom => {
                let height = band(image_height);
                (0, image_height - height, image_width, height)
            }
            Location::Left => (0, 0, band(image_width), image_height),
            Location::Right => {
                let width = band(image_width);
                (image_width - width, 0, width, image_height)
            }
        };

        Ok(ResolvedRegion {
            page: region.page,
            x: i32::try_from(x).unwrap_or(i32::MAX),
            y: i32::try_from(y).unwrap_or(i32::MAX),
            height,
            width,
            name: region.name.clone(),
        })
    }
}

fn describe_name(name: Option<&str>) -> String {
    name.map(|n| format!(" '{n}'")).unwrap_or_default()
}
