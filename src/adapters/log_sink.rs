//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (which goes to UART / USB-CDC in production).
//! Each telemetry tick is split into ENV / GAS / DUST lines matching the
//! sensor blocks on the OLED.

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Telemetry(t) => {
                let r = &t.reading;
                match r.climate.value() {
                    Some(c) => info!(
                        "ENV  | #{} | T={:.1}\u{00b0}C RH={:.1}%{} | wifi={}",
                        t.tick,
                        c.temperature_c,
                        c.humidity_pct,
                        if r.climate.is_present() { "" } else { " (stale)" },
                        if t.connected { "ON" } else { "OFF" },
                    ),
                    None => info!(
                        "ENV  | #{} | T=-- RH=-- | wifi={}",
                        t.tick,
                        if t.connected { "ON" } else { "OFF" },
                    ),
                }
                info!(
                    "GAS  | raw={} V={:.3} Rs={:.2}k | {:.0}ppm {}",
                    r.gas.raw, r.gas.voltage, r.gas.rs, r.gas.ppm, t.gas_quality,
                );
                info!(
                    "DUST | raw={} V={:.3} | {:.3}mg/m3 {}",
                    r.dust.raw, r.dust.voltage, r.dust.density, t.dust_quality,
                );
            }
            AppEvent::ReportDelivered(kind) => {
                info!("NOTIFY | {} delivered", kind);
            }
            AppEvent::ReportFailed { kind, error } => {
                warn!("NOTIFY | {} failed: {} (retry next tick)", kind, error);
            }
            AppEvent::AlertCleared => {
                info!("NOTIFY | air recovered, alert re-armed");
            }
            AppEvent::TickFault(e) => {
                warn!("FAULT | tick aborted: {}", e);
            }
            AppEvent::Started { device_id } => {
                info!("START | device={}", device_id);
            }
        }
    }
}
