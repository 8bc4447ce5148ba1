//! Hardware adapter — bridges real peripherals to the sensor seams.
//!
//! Wraps the raw ADC1 oneshot and GPIO accessors from
//! [`hw_init`](crate::drivers::hw_init) in the small traits the sensor
//! drivers are generic over, and assembles the production
//! [`SensorHub`].  On non-espidf targets the accessors read the
//! injectable simulation state, so the same wiring runs on the host.

use embedded_hal::digital::{self, ErrorKind, ErrorType, InputPin, OutputPin};

use crate::adapters::time::Esp32TimeAdapter;
use crate::app::ports::AdcChannel;
use crate::config::SystemConfig;
use crate::drivers::dht11::Dht11;
use crate::drivers::hw_init;
use crate::error::SensorError;
use crate::pins;
use crate::sensors::SensorHub;
use crate::sensors::particulate::{Emitter, ParticulateSampler};

// ── ADC ───────────────────────────────────────────────────────

/// One ADC1 channel, configured by `hw_init`.
#[derive(Debug, Clone, Copy)]
pub struct AdcInput {
    channel: u32,
}

impl AdcInput {
    pub const fn new(channel: u32) -> Self {
        Self { channel }
    }
}

impl AdcChannel for AdcInput {
    fn read_raw(&mut self) -> Result<u16, SensorError> {
        hw_init::adc1_read(self.channel).ok_or(SensorError::AdcReadFailed)
    }
}

// ── GPIO ──────────────────────────────────────────────────────

/// ESP-IDF error code from a GPIO call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GpioError(pub i32);

impl digital::Error for GpioError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

/// A GPIO configured by `hw_init` (push-pull or open-drain).
#[derive(Debug, Clone, Copy)]
pub struct GpioPin {
    gpio: i32,
}

impl GpioPin {
    pub const fn new(gpio: i32) -> Self {
        Self { gpio }
    }
}

impl ErrorType for GpioPin {
    type Error = GpioError;
}

impl OutputPin for GpioPin {
    fn set_low(&mut self) -> Result<(), GpioError> {
        hw_init::gpio_write(self.gpio, false).map_err(GpioError)
    }

    fn set_high(&mut self) -> Result<(), GpioError> {
        hw_init::gpio_write(self.gpio, true).map_err(GpioError)
    }
}

impl InputPin for GpioPin {
    fn is_high(&mut self) -> Result<bool, GpioError> {
        Ok(hw_init::gpio_read(self.gpio))
    }

    fn is_low(&mut self) -> Result<bool, GpioError> {
        Ok(!hw_init::gpio_read(self.gpio))
    }
}

// ── Assembly ──────────────────────────────────────────────────

/// The production sensor set.
pub type HardwareSensors =
    SensorHub<Dht11<GpioPin, Esp32TimeAdapter>, AdcInput, GpioPin, AdcInput, Esp32TimeAdapter>;

/// Build the hub on the board's pin map.  Call after `init_peripherals`.
pub fn sensor_hub(
    config: &SystemConfig,
    clock: Esp32TimeAdapter,
) -> Result<HardwareSensors, SensorError> {
    let cal = &config.calibration;
    let dht = Dht11::new(GpioPin::new(pins::DHT_GPIO), clock)?;
    let emitter = Emitter::new(GpioPin::new(pins::DUST_LED_GPIO), pins::DUST_LED_ACTIVE_LOW)?;
    let particulate = ParticulateSampler::new(
        emitter,
        AdcInput::new(pins::DUST_ADC_CHANNEL),
        clock,
        cal.particulate,
        cal.adc,
    );
    Ok(SensorHub::new(dht, AdcInput::new(pins::GAS_ADC_CHANNEL), particulate))
}
