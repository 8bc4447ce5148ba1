//! Integration tests for the per-tick pipeline: sensors → estimate →
//! classify → display → policy → notifier.

use airmonitor::app::events::AppEvent;
use airmonitor::classify::{GasQuality, ParticulateQuality};
use airmonitor::config::SystemConfig;
use airmonitor::error::{Error, SensorError};
use airmonitor::notify::{PolicyAction, ReportKind};
use airmonitor::sensors::climate::ClimateReading;

use super::mock_hw::{DUST_RAW_DUSTY, GAS_RAW_BAD, Rig};

#[test]
fn nominal_tick_reads_classifies_and_displays() {
    let mut rig = Rig::new();
    let out = rig.tick().unwrap();

    assert!((out.reading.gas.voltage - 1.6117).abs() < 1e-3);
    assert!((out.reading.gas.rs - 10.475).abs() < 1e-2);
    assert!((out.reading.gas.ppm - 97.27).abs() < 0.1);
    assert_eq!(out.gas_quality, GasQuality::Good);
    assert_eq!(out.reading.dust.density, 0.0);
    assert_eq!(out.dust_quality, ParticulateQuality::Clean);

    assert_eq!(rig.sensors.particulate_cycles, 1);
    assert_eq!(rig.display.renders, vec![("GOOD".to_string(), "CLEAN".to_string(), "ON")]);
}

#[test]
fn first_connected_tick_sends_startup_report() {
    let mut rig = Rig::new();
    let out = rig.tick().unwrap();
    assert_eq!(out.policy.action, PolicyAction::Send(ReportKind::Initial));
    assert_eq!(out.policy.delivered, Some(true));

    let report = &rig.notifier.sent[0];
    assert_eq!(report.gas_ppm, 97);
    assert_eq!(report.gas_quality, GasQuality::Good);
    assert_eq!(report.temperature_c, Some(22.5));
    assert_eq!(report.device_id.as_str(), "AM-EFCAFE");
    assert_eq!(report.timestamp, 5);
    assert_eq!(rig.display.sending_screens, 1);
}

#[test]
fn dusty_air_is_shown_but_not_alerted() {
    let mut rig = Rig::new();
    rig.tick().unwrap();
    rig.sensors.dust_raw = Ok(DUST_RAW_DUSTY);
    let out = rig.tick().unwrap();
    assert_eq!(out.dust_quality, ParticulateQuality::DustyModerate);
    assert_eq!(out.policy.action, PolicyAction::Hold);
    assert_eq!(rig.sent_kinds(), vec![ReportKind::Initial]);
    assert_eq!(rig.display.renders[1].1, "DUSTY/MODERATE");
}

#[test]
fn climate_fault_is_tolerated_then_stale() {
    let mut rig = Rig::new();
    rig.sensors.climate = Err(SensorError::Checksum);
    let out = rig.tick().unwrap();
    assert_eq!(out.reading.climate.value(), None);
    assert_eq!(rig.notifier.sent[0].temperature_c, None);

    rig.sensors.climate = Ok(ClimateReading { temperature_c: 19.0, humidity_pct: 60.0 });
    rig.tick().unwrap();
    rig.sensors.climate = Err(SensorError::Timeout("response low"));
    rig.sensors.gas_raw = Ok(GAS_RAW_BAD);
    let out = rig.tick().unwrap();
    assert!(!out.reading.climate.is_present());
    let alert = rig.notifier.sent.last().unwrap();
    assert_eq!(alert.kind, ReportKind::Alert);
    assert!(alert.climate_stale);
    assert_eq!(alert.temperature_c, Some(19.0));
}

#[test]
fn adc_fault_aborts_tick_without_touching_policy() {
    let mut rig = Rig::new();
    rig.sensors.gas_raw = Err(SensorError::AdcReadFailed);

    let err = rig.tick().unwrap_err();
    assert_eq!(err, Error::Sensor(SensorError::AdcReadFailed));
    assert!(!rig.app.notification_state().initial_sent());
    assert_eq!(rig.notifier.attempts, 0);
    assert!(rig.display.renders.is_empty());
}

#[test]
fn loop_backs_off_after_fault_and_recovers() {
    let mut rig = Rig::new();
    let backoff = rig.app.config().fault_backoff_ms;
    rig.sensors.dust_raw = Err(SensorError::AdcReadFailed);

    assert_eq!(rig.step(), backoff);
    assert_eq!(rig.sink.count(|e| matches!(e, AppEvent::TickFault(_))), 1);
    assert_eq!(rig.app.fault_count(), 1);

    rig.sensors.dust_raw = Ok(0);
    let cfg = rig.app.config().clone();
    assert_eq!(rig.step(), cfg.tick_interval_ms + cfg.post_send_pause_ms);
    assert_eq!(rig.step(), cfg.tick_interval_ms);
    assert_eq!(rig.app.tick_count(), 3);
    assert!(rig.app.notification_state().initial_sent());
}

#[test]
fn telemetry_emitted_every_tick() {
    let mut rig = Rig::new();
    for _ in 0..4 {
        rig.tick().unwrap();
    }
    assert_eq!(rig.sink.count(|e| matches!(e, AppEvent::Telemetry(_))), 4);
    assert_eq!(rig.sink.count(|e| matches!(e, AppEvent::Started { .. })), 1);
}

#[test]
fn configured_thresholds_drive_classification() {
    let mut config = SystemConfig::default();
    config.calibration.thresholds.gas_moderate_ppm = 50.0;
    config.calibration.thresholds.gas_bad_ppm = 90.0;
    let mut rig = Rig::with_config(config);
    let out = rig.tick().unwrap();
    assert_eq!(out.gas_quality, GasQuality::Bad);
}

#[test]
fn uncalibrated_gas_sensor_reads_zero() {
    let mut config = SystemConfig::default();
    config.calibration.gas.calibration_complete = false;
    let mut rig = Rig::with_config(config);
    rig.sensors.gas_raw = Ok(GAS_RAW_BAD);
    let out = rig.tick().unwrap();
    assert_eq!(out.reading.gas.ppm, 0.0);
    assert_eq!(out.gas_quality, GasQuality::Good);
}
