//! Application service — the hexagonal core and the per-tick control loop.
//!
//! [`AppService`] owns the gas estimator, the notification state and the
//! last-known climate reading.  All I/O flows through port traits
//! injected at call sites, making the whole tick testable with mock
//! adapters.
//!
//! ```text
//!  SensorPort ──────▶ ┌──────────────────────────┐ ──▶ DisplayPort
//!  ConnectivityPort ─▶│        AppService         │ ──▶ NotifyPort
//!                     │ estimate · classify · policy│ ──▶ EventSink
//!                     └──────────────────────────┘
//! ```

use log::{error, info, warn};

use crate::classify::{GasQuality, ParticulateQuality};
use crate::config::SystemConfig;
use crate::error::Result;
use crate::notify::{
    NotificationPolicy, NotificationState, PolicyAction, PolicyInput, PolicyOutcome,
};
use crate::report::{ReportInput, StructuredReport, bounded};
use crate::sensors::climate::ClimateTracker;
use crate::sensors::gas::GasEstimator;

use super::events::{AppEvent, DisplayView, PhysicalReading, StatusScreen, TelemetryData};
use super::ports::{
    ConnectivityPort, DisplayPort, EventSink, NotifyPort, SensorPort, connectivity_label,
};

// ───────────────────────────────────────────────────────────────
// Tick outcome
// ───────────────────────────────────────────────────────────────

/// What one successful tick observed and decided.
#[derive(Debug, Clone, Copy)]
pub struct TickOutcome {
    pub reading: PhysicalReading,
    pub gas_quality: GasQuality,
    pub dust_quality: ParticulateQuality,
    pub connected: bool,
    pub policy: PolicyOutcome,
}

impl TickOutcome {
    /// True when the tick tried to deliver a report (successfully or not).
    pub fn report_attempted(&self) -> bool {
        matches!(self.policy.action, PolicyAction::Send(_))
    }
}

// ───────────────────────────────────────────────────────────────
// AppService
// ───────────────────────────────────────────────────────────────

/// The application service orchestrates all domain logic.
pub struct AppService {
    config: SystemConfig,
    gas: GasEstimator,
    policy: NotificationPolicy,
    notifications: NotificationState,
    climate: ClimateTracker,
    device_id: heapless::String<16>,
    tick_count: u64,
    fault_count: u64,
}

impl AppService {
    /// Construct the service from configuration and the device identity.
    pub fn new(config: SystemConfig, device_id: &str) -> Self {
        let cal = config.calibration;
        Self {
            gas: GasEstimator::new(cal.adc, cal.gas),
            policy: NotificationPolicy,
            notifications: NotificationState::new(),
            climate: ClimateTracker::new(),
            device_id: bounded(device_id),
            tick_count: 0,
            fault_count: 0,
            config,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    pub fn start(&mut self, sink: &mut impl EventSink) {
        if !self.gas.is_enabled() {
            warn!("Gas estimator disabled (R0 not calibrated); PPM will read 0");
        }
        sink.emit(&AppEvent::Started {
            device_id: self.device_id.clone(),
        });
        info!("AppService started as {}", self.device_id);
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one full cycle: sensors → estimate → classify → display → policy.
    ///
    /// A climate-sensor fault is tolerated; any other sensor fault aborts
    /// the tick with `Err` and leaves the notification state untouched.
    pub fn tick(
        &mut self,
        hw: &mut impl SensorPort,
        link: &impl ConnectivityPort,
        notifier: &mut impl NotifyPort,
        display: &mut impl DisplayPort,
        sink: &mut impl EventSink,
        timestamp: u64,
    ) -> Result<TickOutcome> {
        self.tick_count += 1;

        // 1. Climate (transient faults tolerated)
        let climate = self.climate.update(hw.read_climate());
        if let Some(fault) = climate.fault() {
            warn!("Climate sensor fault ({}), skipping measurement", fault);
        }

        // 2. Particulate pulse cycle (~10 ms, blocking)
        let dust = hw.sample_particulate()?;

        // 3. Gas estimate
        let gas = self.gas.estimate(hw.read_gas_raw()?);

        // 4. Classify
        let thresholds = &self.config.calibration.thresholds;
        let gas_quality = thresholds.classify_gas(gas.ppm);
        let dust_quality = thresholds.classify_dust(dust.density);
        // Sampled once so the display and the policy agree.
        let connected = link.is_connected();

        let reading = PhysicalReading { climate, gas, dust };

        // 5. Display + telemetry
        display.render(&DisplayView {
            reading: &reading,
            gas_quality,
            dust_quality,
            connectivity: connectivity_label(connected),
        });
        sink.emit(&AppEvent::Telemetry(TelemetryData {
            tick: self.tick_count,
            reading,
            gas_quality,
            dust_quality,
            connected,
        }));

        // 6. Notification policy
        let input = PolicyInput {
            connected,
            gas: gas_quality,
            dust: dust_quality,
        };
        let policy = self.policy.evaluate(&mut self.notifications, input, |kind| {
            display.show_status(StatusScreen::SendingReport);
            info!("Sending {}...", kind);
            let report = StructuredReport::new(&ReportInput {
                kind,
                climate,
                gas_ppm: gas.ppm,
                gas_quality,
                dust_density: dust.density,
                dust_quality,
                device_id: &self.device_id,
                device_name: &self.config.device_name,
                timestamp,
            });
            match notifier.send(&report) {
                Ok(()) => {
                    info!("{} delivered", kind);
                    sink.emit(&AppEvent::ReportDelivered(kind));
                    true
                }
                Err(e) => {
                    warn!("{} failed: {}", kind, e);
                    sink.emit(&AppEvent::ReportFailed { kind, error: e });
                    false
                }
            }
        });

        if policy.action == PolicyAction::ClearAlert {
            info!("Air quality improved, alert re-armed");
            sink.emit(&AppEvent::AlertCleared);
        }

        Ok(TickOutcome {
            reading,
            gas_quality,
            dust_quality,
            connected,
            policy,
        })
    }

    /// Run one tick and return how long to wait before the next (ms).
    ///
    /// This is the loop boundary: a failed tick is logged and reported as
    /// [`AppEvent::TickFault`], then the loop backs off.  It never stops
    /// the caller's loop.
    pub fn step(
        &mut self,
        hw: &mut impl SensorPort,
        link: &impl ConnectivityPort,
        notifier: &mut impl NotifyPort,
        display: &mut impl DisplayPort,
        sink: &mut impl EventSink,
        timestamp: u64,
    ) -> u32 {
        match self.tick(hw, link, notifier, display, sink, timestamp) {
            Ok(outcome) if outcome.report_attempted() => {
                self.config.tick_interval_ms.saturating_add(self.config.post_send_pause_ms)
            }
            Ok(_) => self.config.tick_interval_ms,
            Err(e) => {
                self.fault_count += 1;
                error!(
                    "Tick {} failed: {} (backing off {} ms)",
                    self.tick_count, e, self.config.fault_backoff_ms
                );
                sink.emit(&AppEvent::TickFault(e));
                self.config.fault_backoff_ms
            }
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn notification_state(&self) -> NotificationState {
        self.notifications
    }

    /// Total ticks started since startup (including failed ones).
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Ticks that ended in a fault.
    pub fn fault_count(&self) -> u64 {
        self.fault_count
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    pub fn config(&self) -> &SystemConfig {
        &self.config
    }
}
