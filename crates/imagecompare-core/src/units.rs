//! Physical unit conversion for region coordinates.

use crate::error::{CompareError, Result};
use serde::{Deserialize, Serialize};

/// Millimetres per inch.
const MM_PER_INCH: f64 = 25.4;
/// Centimetres per inch.
const CM_PER_INCH: f64 = 2.54;

/// Unit of a coordinate region.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    /// Device pixels.
    #[default]
    Px,
    /// Millimetres.
    Mm,
    /// Centimetres.
    Cm,
}

impl std::fmt::Display for Unit {
    #[inline]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Px => "px",
            Self::Mm => "mm",
            Self::Cm => "cm",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for Unit {
    type Err = CompareError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "px" => Ok(Self::Px),
            "mm" => Ok(Self::Mm),
            "cm" => Ok(Self::Cm),
            other => Err(CompareError::InvalidUnit(other.to_string())),
        }
    }
}

/// Converts region measurements into pixels at a fixed resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitConverter {
    dpi: u32,
}

impl UnitConverter {
    /// Create a converter for the given resolution in dots per inch.
    #[inline]
    #[must_use]
    pub const fn new(dpi: u32) -> Self {
        Self { dpi }
    }

    /// Resolution used by this converter.
    #[inline]
    #[must_use]
    pub const fn dpi(&self) -> u32 {
        self.dpi
    }

    /// Convert `value` in `unit` to whole pixels, truncating toward zero.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn resolve(&self, value: f64, unit: Unit) -> i32 {
        let dpi = f64::from(self.dpi);
        let pixels = match unit {
            Unit::Px => value,
            Unit::Mm => value * dpi / MM_PER_INCH,
            Unit::Cm => value * dpi / CM_PER_INCH,
        };
        pixels.trunc() as i32
    }

    /// Convert `value` given a textual unit name.
    ///
    /// # Errors
    ///
    /// Returns [`CompareError::InvalidUnit`] if `unit` is not `px`, `mm` or `cm`.
    pub fn resolve_str(&self, value: f64, unit: &str) -> Result<i32> {
        Ok(self.resolve(value, unit.parse()?))
    }
}
