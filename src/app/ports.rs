//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AppService (domain)
//! ```
//!
//! Driven adapters (sensors, network, transport, display, event sinks)
//! implement these traits.  The [`AppService`](super::service::AppService)
//! consumes them via generics, so the domain core never touches hardware
//! directly.

use crate::error::{CommsError, SensorError};
use crate::report::StructuredReport;
use crate::sensors::climate::ClimateReading;
use crate::sensors::particulate::ParticulateSample;

use super::events::{DisplayView, StatusScreen};

// ───────────────────────────────────────────────────────────────
// Low-level hardware seams (used by the sensor drivers)
// ───────────────────────────────────────────────────────────────

/// One single-channel analog input.
pub trait AdcChannel {
    /// Take one conversion.  Codes are in `0..=AdcScale::adc_max`.
    fn read_raw(&mut self) -> Result<u16, SensorError>;
}

/// Monotonic microsecond clock.
pub trait MonotonicClock {
    /// Microseconds since an arbitrary fixed origin.
    fn now_us(&self) -> u64;

    /// Spin until `us` microseconds have elapsed.  Never yields: the
    /// particulate pulse protocol is invalid if another task runs here.
    fn busy_wait_us(&self, us: u32) {
        let start = self.now_us();
        while self.now_us().wrapping_sub(start) < u64::from(us) {
            core::hint::spin_loop();
        }
    }
}

/// Temperature / humidity sensor.  Faults are expected and transient.
pub trait ClimateSensor {
    fn measure(&mut self) -> Result<ClimateReading, SensorError>;
}

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: the domain calls this once per tick for each sensor.
pub trait SensorPort {
    /// Temperature and humidity.  An `Err` is tolerated by the tick.
    fn read_climate(&mut self) -> Result<ClimateReading, SensorError>;

    /// One raw conversion from the gas sensor divider.
    fn read_gas_raw(&mut self) -> Result<u16, SensorError>;

    /// Run the full 10 ms particulate pulse cycle and convert the result.
    fn sample_particulate(&mut self) -> Result<ParticulateSample, SensorError>;
}

// ───────────────────────────────────────────────────────────────
// Network ports (driven adapters: domain → network)
// ───────────────────────────────────────────────────────────────

/// Network reachability, polled once per tick.
pub trait ConnectivityPort {
    fn is_connected(&self) -> bool;
}

/// Short label for the display ("ON" / "OFF").
pub const fn connectivity_label(connected: bool) -> &'static str {
    if connected { "ON" } else { "OFF" }
}

/// Delivers a report to the remote endpoint.
///
/// Implementations bound the call with their own timeout and report
/// expiry as [`CommsError::Timeout`].  The domain only looks at
/// `Ok` / `Err`; every error is treated as "not delivered".
pub trait NotifyPort {
    fn send(&mut self, report: &StructuredReport) -> Result<(), CommsError>;
}

// ───────────────────────────────────────────────────────────────
// Display port (driven adapter: domain → screen)
// ───────────────────────────────────────────────────────────────

/// Fire-and-forget display sink.
pub trait DisplayPort {
    /// Normal operational screen.
    fn render(&mut self, view: &DisplayView<'_>);

    /// Full-screen status message (connecting, sending).
    fn show_status(&mut self, status: StatusScreen<'_>);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from configuration loading and validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Stored config failed to deserialize.
    Corrupted,
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
        }
    }
}

impl From<ConfigError> for crate::error::Error {
    fn from(e: ConfigError) -> Self {
        match e {
            ConfigError::Corrupted => Self::Config("corrupted"),
            ConfigError::ValidationFailed(msg) => Self::Config(msg),
        }
    }
}
