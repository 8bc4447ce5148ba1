//! System configuration parameters
//!
//! All tunable parameters for the AirMonitor.  The calibration block is
//! fixed at startup and shared read-only by every tick; the rest covers
//! loop timing and the notification endpoint.

use serde::{Deserialize, Serialize};

use crate::app::ports::ConfigError;

/// Gas concentration above which air is no longer GOOD (ppm, inclusive upper bound of GOOD).
pub const GAS_MODERATE_PPM: f64 = 800.0;
/// Gas concentration above which air is BAD (ppm, inclusive upper bound of MODERATE).
pub const GAS_BAD_PPM: f64 = 1500.0;
/// Particulate density at which air becomes DUSTY/MODERATE (mg/m³).
pub const DUSTY_THRESHOLD: f64 = 0.15;
/// Particulate density at which air becomes SMOKE/CRITICAL (mg/m³).
pub const SMOKE_THRESHOLD: f64 = 0.50;

/// Longest accepted tick period or fault back-off (one hour).
pub const MAX_TICK_INTERVAL_MS: u32 = 3_600_000;
/// Longest accepted post-send pause.
pub const MAX_POST_SEND_PAUSE_MS: u32 = 600_000;
/// Longest accepted particulate pulse cycle.
pub const MAX_PARTICULATE_CYCLE_US: u32 = 20_000;

// ---------------------------------------------------------------------------
// Calibration
// ---------------------------------------------------------------------------

/// ADC full-scale mapping shared by both analog sensors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdcScale {
    /// Reference voltage at full scale (V).
    pub v_ref: f64,
    /// Largest raw code the converter produces.
    pub adc_max: u16,
}

impl AdcScale {
    /// Convert a raw code to volts.
    pub fn volts(&self, raw: u16) -> f64 {
        f64::from(raw) * (self.v_ref / f64::from(self.adc_max))
    }
}

impl Default for AdcScale {
    fn default() -> Self {
        Self {
            v_ref: 3.3,
            adc_max: 4095,
        }
    }
}

/// MQ-135 divider and power-law curve constants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GasCalibration {
    /// Rs in clean air (kΩ).
    pub r0_clean_air: f64,
    /// Load resistor (kΩ).
    pub r_load: f64,
    /// Curve coefficient A in `ppm = A * (Rs/R0)^B`.
    pub curve_a: f64,
    /// Curve exponent B.
    pub curve_b: f64,
    /// Set once `r0_clean_air` has been measured for this unit.
    pub calibration_complete: bool,
}

impl Default for GasCalibration {
    fn default() -> Self {
        Self {
            r0_clean_air: 10.0,
            r_load: 10.0,
            curve_a: 110.0,
            curve_b: -2.65,
            calibration_complete: true,
        }
    }
}

/// GP2Y1010AU0F pulse protocol timings (µs).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticulateTiming {
    /// Emitter-on settle time before the photodiode output is valid.
    pub sampling_us: u32,
    /// Datasheet LED pulse width; sampling + conversion fit inside it.
    pub pulse_width_us: u32,
    /// Rest time that completes the 10 ms cycle.
    pub sleep_us: u32,
}

impl ParticulateTiming {
    /// One full LED period: pulse plus rest.
    pub fn cycle_us(&self) -> u32 {
        self.pulse_width_us.saturating_add(self.sleep_us)
    }
}

impl Default for ParticulateTiming {
    fn default() -> Self {
        Self {
            sampling_us: 280,
            pulse_width_us: 320,
            sleep_us: 9680,
        }
    }
}

/// Classification boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    pub gas_moderate_ppm: f64,
    pub gas_bad_ppm: f64,
    pub dusty_mg_m3: f64,
    pub smoke_mg_m3: f64,
}

impl Thresholds {
    pub const DEFAULT: Self = Self {
        gas_moderate_ppm: GAS_MODERATE_PPM,
        gas_bad_ppm: GAS_BAD_PPM,
        dusty_mg_m3: DUSTY_THRESHOLD,
        smoke_mg_m3: SMOKE_THRESHOLD,
    };
}

impl Default for Thresholds {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Immutable, process-wide calibration constants.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CalibrationConfig {
    pub adc: AdcScale,
    pub gas: GasCalibration,
    pub particulate: ParticulateTiming,
    pub thresholds: Thresholds,
}

// ---------------------------------------------------------------------------
// System configuration
// ---------------------------------------------------------------------------

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    // --- Timing ---
    /// Control loop period (milliseconds)
    pub tick_interval_ms: u32,
    /// Delay before the next tick after a tick-level fault (milliseconds)
    pub fault_backoff_ms: u32,
    /// Pause after every report attempt (milliseconds)
    pub post_send_pause_ms: u32,
    /// Startup WiFi association timeout (seconds)
    pub wifi_connect_timeout_secs: u32,

    // --- Notification ---
    /// Form endpoint receiving the report POST
    pub notify_url: heapless::String<128>,
    /// Reply-to address placed in the form payload
    pub sender_email: heapless::String<64>,
    /// Transport timeout; expiry counts as a delivery failure (milliseconds)
    pub notify_timeout_ms: u32,
    /// Human-readable device label printed in reports
    pub device_name: heapless::String<32>,

    // --- Calibration ---
    pub calibration: CalibrationConfig,
}

impl Default for SystemConfig {
    fn default() -> Self {
        let mut notify_url = heapless::String::new();
        let _ = notify_url.push_str("https://formspree.io/f/airmonitor");
        let mut device_name = heapless::String::new();
        let _ = device_name.push_str("ESP32 Air Monitor");
        Self {
            // Timing
            tick_interval_ms: 5000,
            fault_backoff_ms: 5000,
            post_send_pause_ms: 2000,
            wifi_connect_timeout_secs: 20,

            // Notification
            notify_url,
            sender_email: heapless::String::new(),
            notify_timeout_ms: 10_000,
            device_name,

            calibration: CalibrationConfig::default(),
        }
    }
}

impl SystemConfig {
    /// Parse a JSON override blob.  Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json).map_err(|_| ConfigError::Corrupted)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would make the loop or the estimators misbehave.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_interval_ms == 0 || self.tick_interval_ms > MAX_TICK_INTERVAL_MS {
            return Err(ConfigError::ValidationFailed("tick_interval_ms out of range"));
        }
        if self.fault_backoff_ms == 0 || self.fault_backoff_ms > MAX_TICK_INTERVAL_MS {
            return Err(ConfigError::ValidationFailed("fault_backoff_ms out of range"));
        }
        if self.post_send_pause_ms > MAX_POST_SEND_PAUSE_MS {
            return Err(ConfigError::ValidationFailed("post_send_pause_ms out of range"));
        }
        if self.notify_timeout_ms == 0 {
            return Err(ConfigError::ValidationFailed("notify_timeout_ms must be > 0"));
        }

        let cal = &self.calibration;
        if !(cal.adc.v_ref > 0.0) || cal.adc.adc_max == 0 {
            return Err(ConfigError::ValidationFailed("ADC scale must be positive"));
        }
        if !(cal.gas.r_load > 0.0) {
            return Err(ConfigError::ValidationFailed("r_load must be > 0"));
        }
        if !cal.gas.curve_a.is_finite() || !cal.gas.curve_b.is_finite() {
            return Err(ConfigError::ValidationFailed("gas curve constants must be finite"));
        }
        let timing = &cal.particulate;
        if timing.sampling_us == 0 || timing.sampling_us > timing.pulse_width_us {
            return Err(ConfigError::ValidationFailed(
                "sampling_us must be within the LED pulse width",
            ));
        }
        if timing.cycle_us() > MAX_PARTICULATE_CYCLE_US {
            return Err(ConfigError::ValidationFailed("particulate cycle too long"));
        }
        let t = &cal.thresholds;
        if !(0.0 <= t.gas_moderate_ppm && t.gas_moderate_ppm < t.gas_bad_ppm) {
            return Err(ConfigError::ValidationFailed("gas thresholds must be ascending"));
        }
        if !(0.0 <= t.dusty_mg_m3 && t.dusty_mg_m3 < t.smoke_mg_m3) {
            return Err(ConfigError::ValidationFailed("dust thresholds must be ascending"));
        }
        Ok(())
    }
}
