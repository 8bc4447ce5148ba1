//! DHT11 single-wire temperature / humidity driver.
//!
//! Bit-banged on an open-drain line with a pull-up.  The host pulls the
//! line low for 20 ms, releases it, and the sensor answers with an
//! 80 µs low / 80 µs high preamble followed by 40 bits.  Each bit is a
//! 50 µs low gap and a high pulse whose width encodes the value
//! (~27 µs = 0, ~70 µs = 1).
//!
//! Timing runs on a [`MonotonicClock`] so the driver is testable against a
//! scripted waveform on the host.

use embedded_hal::digital::{InputPin, OutputPin};

use crate::app::ports::{ClimateSensor, MonotonicClock};
use crate::error::SensorError;
use crate::sensors::climate::{ClimateReading, decode_dht11};

const START_LOW_US: u32 = 20_000;
const RESPONSE_TIMEOUT_US: u32 = 200;
const BIT_HIGH_TIMEOUT_US: u32 = 80;
const BIT_LOW_TIMEOUT_US: u32 = 120;
/// High pulses longer than this are a `1`.
const ONE_THRESHOLD_US: u64 = 50;

pub struct Dht11<P, C> {
    pin: P,
    clock: C,
}

impl<P, C> Dht11<P, C>
where
    P: InputPin + OutputPin,
    C: MonotonicClock,
{
    /// Take the data line and release it to idle-high.
    pub fn new(mut pin: P, clock: C) -> Result<Self, SensorError> {
        pin.set_high().map_err(|_| SensorError::GpioWriteFailed)?;
        Ok(Self { pin, clock })
    }

    /// Run one transaction and return the raw 5-byte frame.
    pub fn read_frame(&mut self) -> Result<[u8; 5], SensorError> {
        self.pin.set_low().map_err(|_| SensorError::GpioWriteFailed)?;
        self.clock.busy_wait_us(START_LOW_US);
        self.pin.set_high().map_err(|_| SensorError::GpioWriteFailed)?;

        self.wait_for_level(false, RESPONSE_TIMEOUT_US, "response low")?;
        self.wait_for_level(true, RESPONSE_TIMEOUT_US, "response high")?;
        self.wait_for_level(false, RESPONSE_TIMEOUT_US, "data preamble")?;

        let mut frame = [0u8; 5];
        for byte in frame.iter_mut() {
            for _ in 0..8 {
                self.wait_for_level(true, BIT_HIGH_TIMEOUT_US, "bit high")?;
                let rise = self.clock.now_us();
                self.wait_for_level(false, BIT_LOW_TIMEOUT_US, "bit low")?;
                let width = self.clock.now_us().wrapping_sub(rise);
                *byte = (*byte << 1) | u8::from(width > ONE_THRESHOLD_US);
            }
        }
        Ok(frame)
    }

    fn wait_for_level(
        &mut self,
        high: bool,
        timeout_us: u32,
        stage: &'static str,
    ) -> Result<(), SensorError> {
        let start = self.clock.now_us();
        while self.clock.now_us().wrapping_sub(start) <= u64::from(timeout_us) {
            let level = self.pin.is_high().map_err(|_| SensorError::Timeout(stage))?;
            if level == high {
                return Ok(());
            }
        }
        Err(SensorError::Timeout(stage))
    }
}

impl<P, C> ClimateSensor for Dht11<P, C>
where
    P: InputPin + OutputPin,
    C: MonotonicClock,
{
    fn measure(&mut self) -> Result<ClimateReading, SensorError> {
        decode_dht11(&self.read_frame()?)
    }
}
