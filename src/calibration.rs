//! Calibration objects of known physical size.
//!
//! The registry maps each supported object kind to the length of the edge
//! (or diameter) the detector reports as two extreme points.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{MeasurementError, Result};

/// ISO/IEC 7810 ID-1 long edge, shared by bank cards and ID cards.
pub const ID1_CARD_LENGTH_MM: f64 = 85.60;

/// US quarter dollar diameter.
pub const COIN_DIAMETER_MM: f64 = 24.26;

/// Marked ruler segment between the two detected graduations.
pub const RULER_SEGMENT_MM: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CalibrationKind {
    CreditCard,
    IdCard,
    Coin,
    Ruler,
}

impl CalibrationKind {
    pub const ALL: [CalibrationKind; 4] = [
        CalibrationKind::CreditCard,
        CalibrationKind::IdCard,
        CalibrationKind::Coin,
        CalibrationKind::Ruler,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CalibrationKind::CreditCard => "credit-card",
            CalibrationKind::IdCard => "id-card",
            CalibrationKind::Coin => "coin",
            CalibrationKind::Ruler => "ruler",
        }
    }
}

impl fmt::Display for CalibrationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CalibrationKind {
    type Err = MeasurementError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        CalibrationKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| MeasurementError::UnknownCalibrationKind(s.to_string()))
    }
}

/// Real-world size of the measured edge for a calibration object kind.
pub fn real_size_mm_for(kind: CalibrationKind) -> f64 {
    match kind {
        CalibrationKind::CreditCard | CalibrationKind::IdCard => ID1_CARD_LENGTH_MM,
        CalibrationKind::Coin => COIN_DIAMETER_MM,
        CalibrationKind::Ruler => RULER_SEGMENT_MM,
    }
}

/// Registry lookup by name, for kinds arriving as untyped text.
pub fn real_size_mm_for_name(name: &str) -> Result<f64> {
    name.parse().map(real_size_mm_for)
}

/// A reference object of known size visible in the photograph.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CalibrationObject {
    kind: CalibrationKind,
    real_size_mm: f64,
}

impl CalibrationObject {
    /// Object with the registry's standard size.
    pub fn standard(kind: CalibrationKind) -> Self {
        Self {
            kind,
            real_size_mm: real_size_mm_for(kind),
        }
    }

    /// Object whose measured edge differs from the registry default,
    /// e.g. a coin of another denomination.
    pub fn with_size(kind: CalibrationKind, real_size_mm: f64) -> Result<Self> {
        if !real_size_mm.is_finite() || real_size_mm <= 0.0 {
            return Err(MeasurementError::InvalidCalibrationSize(real_size_mm));
        }
        Ok(Self { kind, real_size_mm })
    }

    pub fn kind(&self) -> CalibrationKind {
        self.kind
    }

    pub fn real_size_mm(&self) -> f64 {
        self.real_size_mm
    }
}
