//! Notification policy — when to send the startup report and bad-air alerts.
//!
//! Evaluated once per tick, in priority order:
//!
//! 1. Startup report not yet delivered and the network is up → send it.
//! 2. Otherwise, bad air with no alert outstanding and the network up →
//!    send an alert.
//! 3. Otherwise, air recovered while an alert is outstanding → clear the
//!    alert silently.
//!
//! Flags only change on confirmed delivery, so a failed send is retried
//! on the next tick.  At most one report is attempted per tick.
//!
//! The state is owned by the caller and passed in by reference, which
//! keeps the policy stateless and testable with synthetic state.

use core::fmt;

use serde::Serialize;

use crate::classify::{GasQuality, ParticulateQuality, is_bad_air};

/// The only state carried across ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NotificationState {
    initial_sent: bool,
    alert_active: bool,
}

impl NotificationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// True once the startup report has been delivered.  Never resets.
    pub fn initial_sent(&self) -> bool {
        self.initial_sent
    }

    /// True while an alert for the current bad-air episode has been delivered.
    pub fn alert_active(&self) -> bool {
        self.alert_active
    }

    fn record_delivery(&mut self, kind: ReportKind) {
        match kind {
            ReportKind::Initial => self.initial_sent = true,
            ReportKind::Alert => self.alert_active = true,
        }
    }
}

/// Which outbound report a tick asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ReportKind {
    #[serde(rename = "initial")]
    Initial,
    #[serde(rename = "alert")]
    Alert,
}

impl ReportKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Initial => "startup report",
            Self::Alert => "bad air alert",
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Per-tick policy inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolicyInput {
    pub connected: bool,
    pub gas: GasQuality,
    pub dust: ParticulateQuality,
}

impl PolicyInput {
    pub fn is_bad_air(&self) -> bool {
        is_bad_air(self.gas, self.dust)
    }
}

/// What the policy wants done this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyAction {
    /// Nothing to do.
    Hold,
    /// Attempt delivery of a report.
    Send(ReportKind),
    /// Air recovered; re-arm the alert without sending anything.
    ClearAlert,
}

/// Result of one evaluated tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolicyOutcome {
    pub action: PolicyAction,
    /// `Some(true)` when a send was attempted and confirmed.
    pub delivered: Option<bool>,
}

/// Stateless decision logic over a caller-owned [`NotificationState`].
#[derive(Debug, Clone, Copy, Default)]
pub struct NotificationPolicy;

impl NotificationPolicy {
    /// Pure decision for this tick.
    pub fn decide(&self, state: &NotificationState, input: PolicyInput) -> PolicyAction {
        let bad_air = input.is_bad_air();
        if !state.initial_sent && input.connected {
            PolicyAction::Send(ReportKind::Initial)
        } else if bad_air && !state.alert_active && input.connected {
            PolicyAction::Send(ReportKind::Alert)
        } else if !bad_air && state.alert_active {
            PolicyAction::ClearAlert
        } else {
            PolicyAction::Hold
        }
    }

    /// Decide, run `deliver` if a report is due, and update `state`.
    ///
    /// `deliver` returns `true` only on confirmed delivery.
    pub fn evaluate<F>(
        &self,
        state: &mut NotificationState,
        input: PolicyInput,
        deliver: F,
    ) -> PolicyOutcome
    where
        F: FnOnce(ReportKind) -> bool,
    {
        let action = self.decide(state, input);
        let delivered = match action {
            PolicyAction::Send(kind) => {
                let ok = deliver(kind);
                if ok {
                    state.record_delivery(kind);
                }
                Some(ok)
            }
            PolicyAction::ClearAlert => {
                state.alert_active = false;
                None
            }
            PolicyAction::Hold => None,
        };
        PolicyOutcome { action, delivered }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GOOD: PolicyInput = PolicyInput {
        connected: true,
        gas: GasQuality::Good,
        dust: ParticulateQuality::Clean,
    };

    const BAD: PolicyInput = PolicyInput {
        connected: true,
        gas: GasQuality::Bad,
        dust: ParticulateQuality::Clean,
    };

    fn run(inputs: &[PolicyInput], ok: bool) -> (NotificationState, Vec<ReportKind>) {
        let policy = NotificationPolicy;
        let mut state = NotificationState::new();
        let mut sent = Vec::new();
        for input in inputs {
            policy.evaluate(&mut state, *input, |kind| {
                sent.push(kind);
                ok
            });
        }
        (state, sent)
    }

    #[test]
    fn initial_report_sent_exactly_once() {
        let (state, sent) = run(&[GOOD; 20], true);
        assert_eq!(sent, vec![ReportKind::Initial]);
        assert!(state.initial_sent());
        assert!(!state.alert_active());
    }

    #[test]
    fn one_alert_per_bad_air_episode() {
        let (_, sent) = run(&[GOOD, BAD, BAD, GOOD, BAD], true);
        assert_eq!(sent, vec![ReportKind::Initial, ReportKind::Alert, ReportKind::Alert]);
    }

    #[test]
    fn failing_transport_retries_initial_every_tick() {
        let (state, sent) = run(&[GOOD, BAD, GOOD, BAD], false);
        assert_eq!(sent, vec![ReportKind::Initial; 4]);
        assert!(!state.initial_sent());
        assert!(!state.alert_active());
    }

    #[test]
    fn startup_report_waits_for_connectivity() {
        let offline = PolicyInput { connected: false, ..BAD };
        let (state, sent) = run(&[offline, offline, GOOD], true);
        assert_eq!(sent, vec![ReportKind::Initial]);
        assert!(state.initial_sent());
    }

    #[test]
    fn startup_report_takes_priority_over_alert() {
        let (state, sent) = run(&[BAD, BAD], true);
        assert_eq!(sent, vec![ReportKind::Initial, ReportKind::Alert]);
        assert!(state.alert_active());
    }

    #[test]
    fn alert_not_sent_while_offline_but_recovery_still_clears() {
        let policy = NotificationPolicy;
        let mut state = NotificationState { initial_sent: true, alert_active: true };
        let offline_good = PolicyInput { connected: false, ..GOOD };
        let out = policy.evaluate(&mut state, offline_good, |_| panic!("nothing to send"));
        assert_eq!(out.action, PolicyAction::ClearAlert);
        assert!(!state.alert_active());

        let offline_bad = PolicyInput { connected: false, ..BAD };
        assert_eq!(policy.decide(&state, offline_bad), PolicyAction::Hold);
    }

    #[test]
    fn failed_alert_is_retried() {
        let policy = NotificationPolicy;
        let mut state = NotificationState { initial_sent: true, alert_active: false };
        let out = policy.evaluate(&mut state, BAD, |_| false);
        assert_eq!(out.delivered, Some(false));
        assert!(!state.alert_active());
        let out = policy.evaluate(&mut state, BAD, |_| true);
        let sent = PolicyOutcome {
            action: PolicyAction::Send(ReportKind::Alert),
            delivered: Some(true),
        };
        assert_eq!(out, sent);
        assert!(state.alert_active());
    }

    #[test]
    fn smoke_alone_is_bad_air() {
        let smoke = PolicyInput {
            dust: ParticulateQuality::SmokeCritical,
            ..GOOD
        };
        let state = NotificationState { initial_sent: true, alert_active: false };
        assert_eq!(NotificationPolicy.decide(&state, smoke), PolicyAction::Send(ReportKind::Alert));
    }
}
