//! Notification behaviour across many ticks: startup report, one alert
//! per bad-air episode, silent clear, and retry on failed delivery.

use airmonitor::app::events::AppEvent;
use airmonitor::error::CommsError;
use airmonitor::notify::{PolicyAction, ReportKind};

use super::mock_hw::{GAS_RAW_BAD, GAS_RAW_GOOD, Rig};

#[test]
fn startup_report_sent_once_in_steady_good_air() {
    let mut rig = Rig::new();
    for _ in 0..25 {
        rig.tick().unwrap();
    }
    assert_eq!(rig.sent_kinds(), vec![ReportKind::Initial]);
    assert_eq!(rig.display.sending_screens, 1);
}

#[test]
fn one_alert_per_episode_with_silent_clear() {
    let mut rig = Rig::new();
    let script = [
        GAS_RAW_GOOD,
        GAS_RAW_BAD,
        GAS_RAW_BAD,
        GAS_RAW_BAD,
        GAS_RAW_GOOD,
        GAS_RAW_GOOD,
        GAS_RAW_BAD,
    ];
    for raw in script {
        rig.sensors.gas_raw = Ok(raw);
        rig.tick().unwrap();
    }
    assert_eq!(rig.sent_kinds(), vec![ReportKind::Initial, ReportKind::Alert, ReportKind::Alert]);
    assert_eq!(rig.sink.count(|e| matches!(e, AppEvent::AlertCleared)), 1);
    assert!(rig.app.notification_state().alert_active());
}

#[test]
fn bad_air_at_boot_sends_startup_then_alert() {
    let mut rig = Rig::new();
    rig.sensors.gas_raw = Ok(GAS_RAW_BAD);
    let first = rig.tick().unwrap();
    let second = rig.tick().unwrap();
    let third = rig.tick().unwrap();
    assert_eq!(first.policy.action, PolicyAction::Send(ReportKind::Initial));
    assert_eq!(second.policy.action, PolicyAction::Send(ReportKind::Alert));
    assert_eq!(third.policy.action, PolicyAction::Hold);
}

#[test]
fn offline_ticks_hold_until_link_returns() {
    let mut rig = Rig::new();
    rig.link.0 = false;
    rig.sensors.gas_raw = Ok(GAS_RAW_BAD);
    for _ in 0..3 {
        let out = rig.tick().unwrap();
        assert_eq!(out.policy.action, PolicyAction::Hold);
        assert!(!out.connected);
    }
    assert_eq!(rig.notifier.attempts, 0);
    assert_eq!(rig.display.renders.last().unwrap().2, "OFF");

    rig.link.0 = true;
    rig.tick().unwrap();
    rig.tick().unwrap();
    assert_eq!(rig.sent_kinds(), vec![ReportKind::Initial, ReportKind::Alert]);
}

#[test]
fn recovery_while_offline_still_rearms() {
    let mut rig = Rig::new();
    rig.tick().unwrap();
    rig.sensors.gas_raw = Ok(GAS_RAW_BAD);
    rig.tick().unwrap();
    assert!(rig.app.notification_state().alert_active());

    rig.link.0 = false;
    rig.sensors.gas_raw = Ok(GAS_RAW_GOOD);
    let out = rig.tick().unwrap();
    assert_eq!(out.policy.action, PolicyAction::ClearAlert);
    assert!(!rig.app.notification_state().alert_active());
}

#[test]
fn failed_delivery_retried_every_tick_until_success() {
    let mut rig = Rig::new();
    rig.notifier.fail_with = Some(CommsError::Timeout);
    for _ in 0..3 {
        let out = rig.tick().unwrap();
        assert_eq!(out.policy.delivered, Some(false));
    }
    assert_eq!(rig.notifier.attempts, 3);
    assert!(!rig.app.notification_state().initial_sent());
    let failed_initial =
        rig.sink.count(|e| matches!(e, AppEvent::ReportFailed { kind: ReportKind::Initial, .. }));
    assert_eq!(failed_initial, 3);

    rig.notifier.fail_with = None;
    rig.tick().unwrap();
    rig.tick().unwrap();
    assert_eq!(rig.notifier.attempts, 4);
    assert_eq!(rig.sent_kinds(), vec![ReportKind::Initial]);
    assert_eq!(rig.sink.count(|e| matches!(e, AppEvent::ReportDelivered(ReportKind::Initial))), 1);
}

#[test]
fn failed_alert_is_retried_within_the_same_episode() {
    let mut rig = Rig::new();
    rig.tick().unwrap();
    rig.sensors.gas_raw = Ok(GAS_RAW_BAD);
    rig.notifier.fail_with = Some(CommsError::HttpStatus(500));
    rig.tick().unwrap();
    rig.tick().unwrap();
    assert!(!rig.app.notification_state().alert_active());

    rig.notifier.fail_with = None;
    rig.tick().unwrap();
    rig.tick().unwrap();
    assert_eq!(rig.sent_kinds(), vec![ReportKind::Initial, ReportKind::Alert]);
    assert_eq!(rig.notifier.attempts, 4);
}
