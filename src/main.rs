//! AirMonitor Firmware — Main Entry Point
//!
//! Hexagonal architecture with a fixed-period blocking control loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareSensors   LogEventSink   OledDisplay   Esp32Time      │
//! │  (SensorPort)      (EventSink)    (DisplayPort) (Clock)        │
//! │  WifiAdapter       HttpNotifier                                │
//! │  (Connectivity)    (NotifyPort)                                │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              AppService (pure logic)                   │    │
//! │  │  Gas estimate · Classify · Notification policy         │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use std::time::Duration;

use anyhow::Result;
use log::{info, warn};

use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::hal::i2c::{I2cConfig, I2cDriver};
use esp_idf_svc::hal::peripherals::Peripherals;
use esp_idf_svc::hal::prelude::*;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use esp_idf_svc::wifi::EspWifi;

use airmonitor::adapters::device_id;
use airmonitor::adapters::display::{ConsoleDisplay, OledDisplay, ssd1306_panel};
use airmonitor::adapters::hardware;
use airmonitor::adapters::http_notify::HttpNotifier;
use airmonitor::adapters::log_sink::LogEventSink;
use airmonitor::adapters::time::Esp32TimeAdapter;
use airmonitor::adapters::wifi::WifiAdapter;
use airmonitor::app::events::{DisplayView, StatusScreen};
use airmonitor::app::ports::DisplayPort;
use airmonitor::app::service::AppService;
use airmonitor::config::SystemConfig;
use airmonitor::drivers::{hw_init, watchdog};

/// Build-time WiFi credentials and optional JSON config override.
const WIFI_SSID: &str = match option_env!("AIRMONITOR_WIFI_SSID") {
    Some(s) => s,
    None => "",
};
const WIFI_PASS: &str = match option_env!("AIRMONITOR_WIFI_PASS") {
    Some(s) => s,
    None => "",
};
const CONFIG_JSON: Option<&str> = option_env!("AIRMONITOR_CONFIG_JSON");

// ── Display selection ─────────────────────────────────────────

type Panel = ssd1306_panel::Panel<I2cDriver<'static>>;

/// OLED when it answered at boot, serial log otherwise.
enum Screen {
    Oled(OledDisplay<Panel>),
    Console(ConsoleDisplay),
}

impl DisplayPort for Screen {
    fn render(&mut self, view: &DisplayView<'_>) {
        match self {
            Self::Oled(d) => d.render(view),
            Self::Console(d) => d.render(view),
        }
    }

    fn show_status(&mut self, status: StatusScreen<'_>) {
        match self {
            Self::Oled(d) => d.show_status(status),
            Self::Console(d) => d.show_status(status),
        }
    }
}

fn load_config() -> SystemConfig {
    match CONFIG_JSON.map(SystemConfig::from_json) {
        Some(Ok(cfg)) => {
            info!("Config: build-time override applied");
            cfg
        }
        Some(Err(e)) => {
            warn!("Config override rejected ({}), using defaults", e);
            SystemConfig::default()
        }
        None => SystemConfig::default(),
    }
}

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    let mac = device_id::read_mac();
    let id = device_id::device_id(&mac);

    info!("╔══════════════════════════════════════╗");
    info!("║  AirMonitor v{:<24}║", env!("CARGO_PKG_VERSION"));
    info!("║  {:<36}║", id);
    info!("╚══════════════════════════════════════╝");

    // ── 2. Configuration ──────────────────────────────────────
    let config = load_config();

    // ── 3. Peripherals ────────────────────────────────────────
    hw_init::init_peripherals()?;
    let peripherals = Peripherals::take()?;
    let sysloop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take()?;
    let clock = Esp32TimeAdapter::new();

    // SDA/SCL must match pins::I2C_SDA_GPIO / I2C_SCL_GPIO.
    let i2c = I2cDriver::new(
        peripherals.i2c0,
        peripherals.pins.gpio21,
        peripherals.pins.gpio22,
        &I2cConfig::new().baudrate(400.kHz().into()),
    )?;
    let mut screen = match ssd1306_panel::open(i2c) {
        Some(panel) => Screen::Oled(OledDisplay::new(panel)),
        None => {
            warn!("OLED not responding, falling back to serial display");
            Screen::Console(ConsoleDisplay::new())
        }
    };

    let mut sensors = hardware::sensor_hub(&config, clock)
        .map_err(|e| anyhow::anyhow!("sensor init failed: {e}"))?;

    // ── 4. Network ────────────────────────────────────────────
    let mut esp_wifi = EspWifi::new(peripherals.modem, sysloop, Some(nvs))?;
    let hostname = device_id::hostname(&mac);
    if let Err(e) = esp_wifi.sta_netif_mut().set_hostname(&hostname) {
        warn!("WiFi: hostname not set ({})", e);
    }
    let mut wifi = WifiAdapter::new(esp_wifi, config.wifi_connect_timeout_secs);
    match wifi.set_credentials(WIFI_SSID, WIFI_PASS) {
        Ok(()) => {
            screen.show_status(StatusScreen::ConnectingWifi { ssid: wifi.ssid() });
            if let Err(e) = wifi.connect(clock.uptime_secs()) {
                warn!("WiFi: starting offline ({}), will keep retrying", e);
            }
        }
        Err(e) => warn!("WiFi: credentials rejected ({}), running offline", e),
    }

    let mut notifier = HttpNotifier::new(&config);
    let mut log_sink = LogEventSink::new();
    let watchdog = watchdog::Watchdog::new(watchdog::timeout_for(&config));

    // ── 5. Application service ────────────────────────────────
    let mut app = AppService::new(config, &id);
    app.start(&mut log_sink);
    info!("System ready. Entering control loop.");

    // ── 6. Control loop ───────────────────────────────────────
    loop {
        let wait_ms = app.step(
            &mut sensors,
            &wifi,
            &mut notifier,
            &mut screen,
            &mut log_sink,
            clock.report_timestamp(),
        );
        watchdog.feed();
        wifi.poll(clock.uptime_secs());
        std::thread::sleep(Duration::from_millis(u64::from(wait_ms)));
    }
}
