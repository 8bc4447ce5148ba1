//! GP2Y1010AU0F optical dust / smoke sensor.
//!
//! The sensor only produces a valid output while its IR LED is pulsed:
//! LED on, wait 280 µs, convert, LED off, rest 9680 µs.  The waits are
//! spin-waits on a monotonic clock so the 10 ms cycle is not stretched
//! by the scheduler.
//!
//! Density uses the datasheet's linear fit, `0.172 * Vo - 0.0999`
//! (mg/m³), with negative results clamped to zero (clean air).

use embedded_hal::digital::OutputPin;

use crate::app::ports::{AdcChannel, MonotonicClock};
use crate::config::{AdcScale, ParticulateTiming};
use crate::error::SensorError;

const DENSITY_SLOPE: f64 = 0.172;
const DENSITY_OFFSET: f64 = 0.0999;

/// One converted particulate sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticulateSample {
    pub raw: u16,
    pub voltage: f64,
    /// mg/m³, never negative.
    pub density: f64,
}

impl ParticulateSample {
    pub fn from_raw(raw: u16, scale: &AdcScale) -> Self {
        let voltage = scale.volts(raw);
        Self {
            raw,
            voltage,
            density: density_from_voltage(voltage),
        }
    }
}

/// Linear sensor model with the negative region clamped to 0.
pub fn density_from_voltage(voltage: f64) -> f64 {
    let density = DENSITY_SLOPE * voltage - DENSITY_OFFSET;
    if density > 0.0 { density } else { 0.0 }
}

/// IR emitter control line with configurable polarity.
pub struct Emitter<P> {
    pin: P,
    active_low: bool,
}

impl<P: OutputPin> Emitter<P> {
    /// Wrap the pin and drive it to the "off" level.
    pub fn new(pin: P, active_low: bool) -> Result<Self, SensorError> {
        let mut emitter = Self { pin, active_low };
        emitter.off()?;
        Ok(emitter)
    }

    pub fn on(&mut self) -> Result<(), SensorError> {
        self.drive(true)
    }

    pub fn off(&mut self) -> Result<(), SensorError> {
        self.drive(false)
    }

    fn drive(&mut self, lit: bool) -> Result<(), SensorError> {
        let result = if lit != self.active_low {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
        result.map_err(|_| SensorError::GpioWriteFailed)
    }
}

/// Runs the pulse protocol against an emitter line, an ADC channel and
/// a microsecond clock.
pub struct ParticulateSampler<P, A, C> {
    emitter: Emitter<P>,
    adc: A,
    clock: C,
    timing: ParticulateTiming,
    scale: AdcScale,
}

impl<P, A, C> ParticulateSampler<P, A, C>
where
    P: OutputPin,
    A: AdcChannel,
    C: MonotonicClock,
{
    pub fn new(
        emitter: Emitter<P>,
        adc: A,
        clock: C,
        timing: ParticulateTiming,
        scale: AdcScale,
    ) -> Self {
        Self {
            emitter,
            adc,
            clock,
            timing,
            scale,
        }
    }

    /// One full 10 ms measurement cycle.  Blocks the caller.
    ///
    /// The emitter is always switched off and the rest period always
    /// observed, even when the conversion fails, so the next cycle starts
    /// from a known LED state.
    pub fn sample(&mut self) -> Result<ParticulateSample, SensorError> {
        self.emitter.on()?;
        self.clock.busy_wait_us(self.timing.sampling_us);

        let conversion = self.adc.read_raw();

        let off = self.emitter.off();
        self.clock.busy_wait_us(self.timing.sleep_us);

        let raw = conversion?;
        off?;
        Ok(ParticulateSample::from_raw(raw, &self.scale))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::{Cell, RefCell};
    use core::convert::Infallible;
    use embedded_hal::digital::ErrorType;
    use std::rc::Rc;

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Step {
        Pin { high: bool, at: u64 },
        Adc { at: u64 },
    }

    #[derive(Clone, Default)]
    struct Bench {
        now: Rc<Cell<u64>>,
        log: Rc<RefCell<Vec<Step>>>,
    }

    struct Pin(Bench);
    impl ErrorType for Pin {
        type Error = Infallible;
    }
    impl OutputPin for Pin {
        fn set_low(&mut self) -> Result<(), Infallible> {
            self.0.log.borrow_mut().push(Step::Pin { high: false, at: self.0.now.get() });
            Ok(())
        }
        fn set_high(&mut self) -> Result<(), Infallible> {
            self.0.log.borrow_mut().push(Step::Pin { high: true, at: self.0.now.get() });
            Ok(())
        }
    }

    struct Adc(Bench, Option<u16>);
    impl AdcChannel for Adc {
        fn read_raw(&mut self) -> Result<u16, SensorError> {
            self.0.log.borrow_mut().push(Step::Adc { at: self.0.now.get() });
            self.1.ok_or(SensorError::AdcReadFailed)
        }
    }

    struct Clock(Bench);
    impl MonotonicClock for Clock {
        fn now_us(&self) -> u64 {
            let t = self.0.now.get();
            self.0.now.set(t + 1);
            t
        }
    }

    fn sampler(bench: &Bench, raw: Option<u16>) -> ParticulateSampler<Pin, Adc, Clock> {
        let emitter = Emitter::new(Pin(bench.clone()), true).unwrap();
        bench.log.borrow_mut().clear();
        ParticulateSampler::new(
            emitter,
            Adc(bench.clone(), raw),
            Clock(bench.clone()),
            ParticulateTiming::default(),
            AdcScale::default(),
        )
    }

    #[test]
    fn pulse_sequence_and_timing() {
        let bench = Bench::default();
        let mut s = sampler(&bench, Some(2048));
        s.sample().unwrap();

        let log = bench.log.borrow();
        assert_eq!(log.len(), 3);
        let Step::Pin { high: false, at: t_on } = log[0] else {
            panic!("first step must drive the active-low emitter LOW: {:?}", log[0]);
        };
        let Step::Adc { at: t_adc } = log[1] else {
            panic!("second step must be the conversion");
        };
        let Step::Pin { high: true, at: t_off } = log[2] else {
            panic!("third step must switch the emitter off");
        };
        assert!(t_adc - t_on >= 280, "settle time too short: {}", t_adc - t_on);
        assert!(t_adc - t_on < 290);
        assert!(t_off >= t_adc);
        assert!(bench.now.get() - t_off >= 9680, "rest period too short");
        assert!(bench.now.get() - t_on < 10_020);
    }

    #[test]
    fn emitter_starts_off() {
        let bench = Bench::default();
        let _ = Emitter::new(Pin(bench.clone()), true).unwrap();
        assert_eq!(bench.log.borrow()[0], Step::Pin { high: true, at: 0 });
    }

    #[test]
    fn failed_conversion_still_turns_emitter_off() {
        let bench = Bench::default();
        let mut s = sampler(&bench, None);
        assert_eq!(s.sample(), Err(SensorError::AdcReadFailed));
        let log = bench.log.borrow();
        assert!(matches!(log.last(), Some(Step::Pin { high: true, .. })));
        assert!(bench.now.get() >= 280 + 9680);
    }

    #[test]
    fn converts_raw_to_density() {
        let bench = Bench::default();
        let mut s = sampler(&bench, Some(4095));
        let sample = s.sample().unwrap();
        assert_eq!(sample.raw, 4095);
        assert!((sample.voltage - 3.3).abs() < 1e-9);
        assert!((sample.density - (0.172 * 3.3 - 0.0999)).abs() < 1e-9);
    }

    #[test]
    fn low_voltage_clamps_to_zero() {
        assert_eq!(density_from_voltage(0.0), 0.0);
        assert_eq!(density_from_voltage(0.5), 0.0);
        // 0.0999 / 0.172 ≈ 0.5808 V is the zero crossing.
        assert_eq!(density_from_voltage(0.58), 0.0);
        assert!(density_from_voltage(0.59) > 0.0);
    }
}
