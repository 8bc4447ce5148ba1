//! Outbound application events and display views.
//!
//! The [`AppService`](super::service::AppService) emits [`AppEvent`]s
//! through the [`EventSink`](super::ports::EventSink) port and hands a
//! [`DisplayView`] to the [`DisplayPort`](super::ports::DisplayPort) every
//! tick.  Adapters on the other side decide what to do with them.

use crate::classify::{GasQuality, ParticulateQuality};
use crate::error::{CommsError, Error};
use crate::notify::ReportKind;
use crate::sensors::climate::{ClimateReading, Measurement};
use crate::sensors::gas::GasReading;
use crate::sensors::particulate::ParticulateSample;

/// One tick's physical reading.  Superseded, never merged, by the next.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicalReading {
    pub climate: Measurement<ClimateReading>,
    pub gas: GasReading,
    pub dust: ParticulateSample,
}

impl PhysicalReading {
    pub fn gas_ppm(&self) -> f64 {
        self.gas.ppm
    }

    pub fn dust_density(&self) -> f64 {
        self.dust.density
    }
}

/// Everything the operational screen shows.
#[derive(Debug, Clone, Copy)]
pub struct DisplayView<'a> {
    pub reading: &'a PhysicalReading,
    pub gas_quality: GasQuality,
    pub dust_quality: ParticulateQuality,
    pub connectivity: &'static str,
}

/// Full-screen status messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusScreen<'a> {
    ConnectingWifi { ssid: &'a str },
    SendingReport,
}

/// Structured events emitted by the application core.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// The service has started.
    Started { device_id: heapless::String<16> },

    /// Per-tick telemetry snapshot.
    Telemetry(TelemetryData),

    /// A report was confirmed delivered.
    ReportDelivered(ReportKind),

    /// A report attempt failed; it will be retried on a later tick.
    ReportFailed { kind: ReportKind, error: CommsError },

    /// Air recovered and the alert was re-armed.
    AlertCleared,

    /// A tick aborted; the loop backs off and continues.
    TickFault(Error),
}

/// A point-in-time telemetry snapshot suitable for logging.
#[derive(Debug, Clone, Copy)]
pub struct TelemetryData {
    pub tick: u64,
    pub reading: PhysicalReading,
    pub gas_quality: GasQuality,
    pub dust_quality: ParticulateQuality,
    pub connected: bool,
}
