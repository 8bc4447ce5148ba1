//! Sensor subsystem — individual drivers and the aggregating [`SensorHub`].
//!
//! The hub owns the climate sensor, the gas ADC channel and the
//! particulate sampler, and exposes them to the domain through
//! [`SensorPort`].  Conversions to physical units happen in the domain
//! (gas) or inside the sampler (particulate), never in the adapters.

pub mod climate;
pub mod gas;
pub mod particulate;

use embedded_hal::digital::OutputPin;

use crate::app::ports::{AdcChannel, ClimateSensor, MonotonicClock, SensorPort};
use crate::error::SensorError;
use climate::ClimateReading;
use particulate::{ParticulateSample, ParticulateSampler};

/// Aggregates all sensor drivers behind [`SensorPort`].
pub struct SensorHub<T, G, P, A, C> {
    climate: T,
    gas_adc: G,
    particulate: ParticulateSampler<P, A, C>,
}

impl<T, G, P, A, C> SensorHub<T, G, P, A, C> {
    /// Construct a new hub from pre-built drivers (built in main where
    /// peripheral ownership is established).
    pub fn new(climate: T, gas_adc: G, particulate: ParticulateSampler<P, A, C>) -> Self {
        Self {
            climate,
            gas_adc,
            particulate,
        }
    }
}

impl<T, G, P, A, C> SensorPort for SensorHub<T, G, P, A, C>
where
    T: ClimateSensor,
    G: AdcChannel,
    P: OutputPin,
    A: AdcChannel,
    C: MonotonicClock,
{
    fn read_climate(&mut self) -> Result<ClimateReading, SensorError> {
        self.climate.measure()
    }

    fn read_gas_raw(&mut self) -> Result<u16, SensorError> {
        self.gas_adc.read_raw()
    }

    fn sample_particulate(&mut self) -> Result<ParticulateSample, SensorError> {
        self.particulate.sample()
    }
}
