//! Outbound report formatting.
//!
//! A [`StructuredReport`] is the transport-facing snapshot of one tick:
//! values are rounded to their reporting precision when the report is
//! built, so every consumer sees the same numbers.  The form payload
//! wraps the structured fields together with a human-readable message.

use core::fmt::Write as _;

use serde::Serialize;

use crate::classify::{GasQuality, ParticulateQuality};
use crate::notify::ReportKind;
use crate::sensors::climate::{ClimateReading, Measurement};

/// Transport-facing report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StructuredReport {
    pub kind: ReportKind,
    /// °C, one decimal.  `None` when the climate sensor has never answered.
    pub temperature_c: Option<f32>,
    /// %RH, one decimal.
    pub humidity_pct: Option<f32>,
    /// Whether the climate values come from an earlier tick.
    pub climate_stale: bool,
    /// CO2-equivalent ppm, truncated to an integer.  Near ADC full scale
    /// the power law runs to ~1e11, so the field is 64-bit.
    pub gas_ppm: u64,
    pub gas_quality: GasQuality,
    /// mg/m³, three decimals.
    pub dust_density: f64,
    pub dust_quality: ParticulateQuality,
    pub device_id: heapless::String<16>,
    pub device_name: heapless::String<32>,
    /// Seconds since boot (or since the epoch once wall time is synced).
    pub timestamp: u64,
}

/// Everything needed to build a report, borrowed from the tick.
pub struct ReportInput<'a> {
    pub kind: ReportKind,
    pub climate: Measurement<ClimateReading>,
    pub gas_ppm: f64,
    pub gas_quality: GasQuality,
    pub dust_density: f64,
    pub dust_quality: ParticulateQuality,
    pub device_id: &'a str,
    pub device_name: &'a str,
    pub timestamp: u64,
}

fn round_to(value: f64, places: i32) -> f64 {
    let scale = 10f64.powi(places);
    (value * scale).round() / scale
}

/// Copy `s`, truncated at a char boundary to fit `N` bytes.
pub fn bounded<const N: usize>(s: &str) -> heapless::String<N> {
    let mut out = heapless::String::new();
    for c in s.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}

impl StructuredReport {
    pub fn new(input: &ReportInput<'_>) -> Self {
        let climate = input.climate.value();
        Self {
            kind: input.kind,
            temperature_c: climate.map(|c| round_to(f64::from(c.temperature_c), 1) as f32),
            humidity_pct: climate.map(|c| round_to(f64::from(c.humidity_pct), 1) as f32),
            climate_stale: matches!(input.climate, Measurement::Stale(..)),
            gas_ppm: input.gas_ppm.max(0.0) as u64,
            gas_quality: input.gas_quality,
            dust_density: round_to(input.dust_density.max(0.0), 3),
            dust_quality: input.dust_quality,
            device_id: bounded(input.device_id),
            device_name: bounded(input.device_name),
            timestamp: input.timestamp,
        }
    }

    pub fn subject(&self) -> String {
        match self.kind {
            ReportKind::Initial => format!("Air Monitor {} online", self.device_id),
            ReportKind::Alert => format!(
                "Air quality alert: {} / {}",
                self.gas_quality, self.dust_quality
            ),
        }
    }

    /// Plain-text report body.
    pub fn message(&self) -> String {
        fn opt(v: Option<f32>) -> String {
            v.map_or_else(|| "--".to_string(), |v| format!("{v:.1}"))
        }

        let mut m = String::new();
        let _ = writeln!(m, "Air Quality Report");
        let _ = writeln!(m);
        let _ = writeln!(m, "--- Environmental Data ---");
        let _ = writeln!(m, "Temperature: {} C", opt(self.temperature_c));
        let _ = writeln!(m, "Humidity: {} %", opt(self.humidity_pct));
        if self.climate_stale {
            let _ = writeln!(m, "(climate sensor fault, last known values)");
        }
        let _ = writeln!(m);
        let _ = writeln!(m, "--- Gas Pollution (MQ-135) ---");
        let _ = writeln!(m, "CO2 Equivalent: {} PPM", self.gas_ppm);
        let _ = writeln!(m, "Gas Quality Status: {}", self.gas_quality);
        let _ = writeln!(m);
        let _ = writeln!(m, "--- Particulate Pollution (GP2Y1010AU0F) ---");
        let _ = writeln!(m, "Particulate Density: {:.3} mg/m^3", self.dust_density);
        let _ = writeln!(m, "Dust/Smoke Status: {}", self.dust_quality);
        let _ = writeln!(m);
        let _ = writeln!(m, "Device: {} ({})", self.device_name, self.device_id);
        let _ = writeln!(m, "Time: {}", self.timestamp);
        m
    }

    /// Form-endpoint JSON body.
    pub fn to_form_json(&self, sender_email: &str) -> Result<String, serde_json::Error> {
        #[derive(Serialize)]
        struct FormPayload<'a> {
            email: &'a str,
            subject: String,
            message: String,
            report: &'a StructuredReport,
        }

        serde_json::to_string(&FormPayload {
            email: sender_email,
            subject: self.subject(),
            message: self.message(),
            report: self,
        })
    }
}
