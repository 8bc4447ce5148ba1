//! MQ-135 gas sensor — divider resistance and CO2-equivalent estimate.
//!
//! The sensor element sits above a load resistor; the ADC reads the
//! voltage across the load.  From the divider,
//!
//! ```text
//! Rs = Rload * (Vref / Vout - 1)
//! ppm = A * (Rs / R0) ^ B
//! ```
//!
//! `A`, `B` come from the datasheet sensitivity curve and `R0` is the
//! resistance measured once in clean air.  With a negative `B` the
//! estimate falls as `Rs/R0` rises.  The curve is applied exactly as
//! calibrated; check it against the unit's datasheet curve when
//! re-calibrating.

use crate::config::{AdcScale, GasCalibration};

/// One gas measurement with its intermediate values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GasReading {
    pub raw: u16,
    pub voltage: f64,
    /// Sensor resistance in the same unit as `r_load` (kΩ).
    pub rs: f64,
    /// CO2-equivalent concentration, never negative.
    pub ppm: f64,
}

/// Converts raw gas-sensor codes into resistance and ppm.
#[derive(Debug, Clone, Copy)]
pub struct GasEstimator {
    scale: AdcScale,
    cal: GasCalibration,
}

impl GasEstimator {
    pub fn new(scale: AdcScale, cal: GasCalibration) -> Self {
        Self { scale, cal }
    }

    /// False until R0 has been measured (or when it is non-positive).
    pub fn is_enabled(&self) -> bool {
        self.cal.calibration_complete && self.cal.r0_clean_air > 0.0
    }

    /// Sensor resistance for a raw code.  A zero (floating) input yields 0.
    pub fn resistance_from_raw(&self, raw: u16) -> f64 {
        let voltage = self.scale.volts(raw);
        if voltage <= 0.0 {
            return 0.0;
        }
        self.cal.r_load * (self.scale.v_ref / voltage - 1.0)
    }

    /// Power-law ppm estimate.  0 when the estimator is disabled or the
    /// resistance is outside the curve's domain.
    pub fn ppm_from_resistance(&self, rs: f64) -> f64 {
        if !self.is_enabled() || !(rs > 0.0) {
            return 0.0;
        }
        let ratio = rs / self.cal.r0_clean_air;
        let ppm = self.cal.curve_a * ratio.powf(self.cal.curve_b);
        if ppm.is_finite() && ppm > 0.0 { ppm } else { 0.0 }
    }

    pub fn estimate(&self, raw: u16) -> GasReading {
        let rs = self.resistance_from_raw(raw);
        GasReading {
            raw,
            voltage: self.scale.volts(raw),
            rs,
            ppm: self.ppm_from_resistance(rs),
        }
    }
}
