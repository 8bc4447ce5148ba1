//! Temperature / humidity readings and fault-tolerant measurement values.
//!
//! The climate sensor is allowed to fail on any tick.  Rather than a
//! sentinel zero, each tick carries a [`Measurement`]: a fresh value, the
//! last good value marked stale, or nothing with the reason.

use serde::Serialize;

use crate::error::SensorError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClimateReading {
    pub temperature_c: f32,
    pub humidity_pct: f32,
}

/// Outcome of reading one sensor on one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Measurement<T> {
    /// Read successfully this tick.
    Present(T),
    /// This tick's read failed; carries the last good value.
    Stale(T, SensorError),
    /// No good value has ever been read.
    Absent(SensorError),
}

impl<T: Copy> Measurement<T> {
    /// Best available value, fresh or stale.
    pub fn value(&self) -> Option<T> {
        match *self {
            Self::Present(v) | Self::Stale(v, _) => Some(v),
            Self::Absent(_) => None,
        }
    }

    pub fn is_present(&self) -> bool {
        matches!(self, Self::Present(_))
    }

    /// The fault behind a stale or absent value.
    pub fn fault(&self) -> Option<SensorError> {
        match *self {
            Self::Present(_) => None,
            Self::Stale(_, e) | Self::Absent(e) => Some(e),
        }
    }
}

/// Keeps the last good climate reading across ticks.
#[derive(Debug, Default)]
pub struct ClimateTracker {
    last: Option<ClimateReading>,
}

impl ClimateTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(
        &mut self,
        result: Result<ClimateReading, SensorError>,
    ) -> Measurement<ClimateReading> {
        match result {
            Ok(reading) => {
                self.last = Some(reading);
                Measurement::Present(reading)
            }
            Err(e) => match self.last {
                Some(last) => Measurement::Stale(last, e),
                None => Measurement::Absent(e),
            },
        }
    }
}

/// Decode a 5-byte DHT11 frame: RH int, RH dec, T int, T dec, checksum.
///
/// Bit 7 of the temperature decimal byte marks a negative temperature.
pub fn decode_dht11(frame: &[u8; 5]) -> Result<ClimateReading, SensorError> {
    let sum = frame[..4].iter().fold(0u8, |acc, b| acc.wrapping_add(*b));
    if sum != frame[4] {
        return Err(SensorError::Checksum);
    }

    let humidity_pct = f32::from(frame[0]) + f32::from(frame[1]) / 10.0;
    let mut temperature_c = f32::from(frame[2]) + f32::from(frame[3] & 0x7F) / 10.0;
    if frame[3] & 0x80 != 0 {
        temperature_c = -temperature_c;
    }

    if humidity_pct > 100.0 || !(-40.0..=80.0).contains(&temperature_c) {
        return Err(SensorError::OutOfRange);
    }

    Ok(ClimateReading {
        temperature_c,
        humidity_pct,
    })
}
