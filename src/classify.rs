//! Air-quality classification.
//!
//! Two independent axes, each a total, monotonic threshold function.
//! Tie values fall into the class whose range is written inclusively:
//! gas ties go to the lower (better) class, dust ties to the higher one.

use core::fmt;

use serde::Serialize;

use crate::config::Thresholds;

/// Gas (CO2-equivalent) quality.  Ordered from best to worst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum GasQuality {
    #[serde(rename = "GOOD")]
    Good,
    #[serde(rename = "MODERATE")]
    Moderate,
    #[serde(rename = "BAD")]
    Bad,
}

impl GasQuality {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Good => "GOOD",
            Self::Moderate => "MODERATE",
            Self::Bad => "BAD",
        }
    }
}

impl fmt::Display for GasQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Particulate quality.  Ordered from best to worst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum ParticulateQuality {
    #[serde(rename = "CLEAN")]
    Clean,
    #[serde(rename = "DUSTY/MODERATE")]
    DustyModerate,
    #[serde(rename = "SMOKE/CRITICAL")]
    SmokeCritical,
}

impl ParticulateQuality {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Clean => "CLEAN",
            Self::DustyModerate => "DUSTY/MODERATE",
            Self::SmokeCritical => "SMOKE/CRITICAL",
        }
    }
}

impl fmt::Display for ParticulateQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Thresholds {
    pub fn classify_gas(&self, ppm: f64) -> GasQuality {
        if ppm <= self.gas_moderate_ppm {
            GasQuality::Good
        } else if ppm <= self.gas_bad_ppm {
            GasQuality::Moderate
        } else {
            GasQuality::Bad
        }
    }

    pub fn classify_dust(&self, density: f64) -> ParticulateQuality {
        if density >= self.smoke_mg_m3 {
            ParticulateQuality::SmokeCritical
        } else if density >= self.dusty_mg_m3 {
            ParticulateQuality::DustyModerate
        } else {
            ParticulateQuality::Clean
        }
    }
}

/// Classify a gas reading against the factory thresholds (800 / 1500 ppm).
pub fn classify_gas(ppm: f64) -> GasQuality {
    Thresholds::DEFAULT.classify_gas(ppm)
}

/// Classify a particulate reading against the factory thresholds (0.15 / 0.50 mg/m³).
pub fn classify_dust(density: f64) -> ParticulateQuality {
    Thresholds::DEFAULT.classify_dust(density)
}

/// Either axis in its worst class.
pub fn is_bad_air(gas: GasQuality, dust: ParticulateQuality) -> bool {
    gas == GasQuality::Bad || dust == ParticulateQuality::SmokeCritical
}
