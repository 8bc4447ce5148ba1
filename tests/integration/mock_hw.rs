//! Mock port adapters for integration tests.
//!
//! Sensors return whatever raw codes the test sets; the notifier records
//! every report and can be told to fail; the display and the event sink
//! record what they were asked to show.

use airmonitor::app::events::{AppEvent, DisplayView, StatusScreen};
use airmonitor::app::ports::{ConnectivityPort, DisplayPort, EventSink, NotifyPort, SensorPort};
use airmonitor::app::service::{AppService, TickOutcome};
use airmonitor::config::{AdcScale, SystemConfig};
use airmonitor::error::{CommsError, Result, SensorError};
use airmonitor::report::StructuredReport;
use airmonitor::sensors::climate::ClimateReading;
use airmonitor::sensors::particulate::ParticulateSample;

/// Raw code that classifies as GOOD gas (≈97 ppm).
pub const GAS_RAW_GOOD: u16 = 2000;
/// Raw code far above the BAD threshold.
pub const GAS_RAW_BAD: u16 = 3500;
/// Raw code that classifies as DUSTY/MODERATE (≈0.25 mg/m³).
pub const DUST_RAW_DUSTY: u16 = 2500;

// ── Sensors ───────────────────────────────────────────────────

pub struct MockSensors {
    pub climate: core::result::Result<ClimateReading, SensorError>,
    pub gas_raw: core::result::Result<u16, SensorError>,
    pub dust_raw: core::result::Result<u16, SensorError>,
    pub particulate_cycles: usize,
}

impl MockSensors {
    pub fn new() -> Self {
        Self {
            climate: Ok(ClimateReading { temperature_c: 22.5, humidity_pct: 45.0 }),
            gas_raw: Ok(GAS_RAW_GOOD),
            dust_raw: Ok(0),
            particulate_cycles: 0,
        }
    }
}

impl SensorPort for MockSensors {
    fn read_climate(&mut self) -> core::result::Result<ClimateReading, SensorError> {
        self.climate
    }

    fn read_gas_raw(&mut self) -> core::result::Result<u16, SensorError> {
        self.gas_raw
    }

    fn sample_particulate(&mut self) -> core::result::Result<ParticulateSample, SensorError> {
        self.particulate_cycles += 1;
        self.dust_raw.map(|raw| ParticulateSample::from_raw(raw, &AdcScale::default()))
    }
}

// ── Network ───────────────────────────────────────────────────

pub struct MockLink(pub bool);

impl ConnectivityPort for MockLink {
    fn is_connected(&self) -> bool {
        self.0
    }
}

#[derive(Default)]
pub struct MockNotifier {
    pub sent: Vec<StructuredReport>,
    pub attempts: usize,
    pub fail_with: Option<CommsError>,
}

impl NotifyPort for MockNotifier {
    fn send(&mut self, report: &StructuredReport) -> core::result::Result<(), CommsError> {
        self.attempts += 1;
        if let Some(e) = self.fail_with {
            return Err(e);
        }
        self.sent.push(report.clone());
        Ok(())
    }
}

// ── Display / events ──────────────────────────────────────────

#[derive(Default)]
pub struct MockDisplay {
    pub renders: Vec<(String, String, &'static str)>,
    pub sending_screens: usize,
}

impl DisplayPort for MockDisplay {
    fn render(&mut self, view: &DisplayView<'_>) {
        self.renders.push((
            view.gas_quality.to_string(),
            view.dust_quality.to_string(),
            view.connectivity,
        ));
    }

    fn show_status(&mut self, status: StatusScreen<'_>) {
        if status == StatusScreen::SendingReport {
            self.sending_screens += 1;
        }
    }
}

#[derive(Default)]
pub struct LogSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl LogSink {
    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(*e)).count()
    }
}

impl EventSink for LogSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── Rig ───────────────────────────────────────────────────────

/// An [`AppService`] wired to one of every mock.
pub struct Rig {
    pub app: AppService,
    pub sensors: MockSensors,
    pub link: MockLink,
    pub notifier: MockNotifier,
    pub display: MockDisplay,
    pub sink: LogSink,
    pub now: u64,
}

#[allow(dead_code)]
impl Rig {
    pub fn new() -> Self {
        Self::with_config(SystemConfig::default())
    }

    pub fn with_config(config: SystemConfig) -> Self {
        let mut sink = LogSink::default();
        let mut app = AppService::new(config, "AM-EFCAFE");
        app.start(&mut sink);
        Self {
            app,
            sensors: MockSensors::new(),
            link: MockLink(true),
            notifier: MockNotifier::default(),
            display: MockDisplay::default(),
            sink,
            now: 0,
        }
    }

    pub fn tick(&mut self) -> Result<TickOutcome> {
        self.now += 5;
        self.app.tick(
            &mut self.sensors,
            &self.link,
            &mut self.notifier,
            &mut self.display,
            &mut self.sink,
            self.now,
        )
    }

    pub fn step(&mut self) -> u32 {
        self.now += 5;
        self.app.step(
            &mut self.sensors,
            &self.link,
            &mut self.notifier,
            &mut self.display,
            &mut self.sink,
            self.now,
        )
    }

    pub fn sent_kinds(&self) -> Vec<airmonitor::notify::ReportKind> {
        self.notifier.sent.iter().map(|r| r.kind).collect()
    }
}
