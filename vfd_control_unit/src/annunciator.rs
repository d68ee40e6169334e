//! Operator-facing notifications.
//!
//! The control unit never talks to a UI directly. Alarm indicators, alerts
//! and connection status go through an injected [`Annunciator`], so every
//! component runs in tests without any display or logging backend.

use crate::state::DriveState;
use std::collections::HashSet;
use tracing::{debug, error, info, warn};
use vfd_common::drive::types::DriveStatus;

/// Alarm indicator shown to the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlarmKind {
    /// Communication with the drive lost.
    Communication,
    HighCurrent,
    HighTemperature,
    /// DC bus voltage outside the low/high window.
    DcBus,
}

impl AlarmKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Communication => "comms",
            Self::HighCurrent => "high_current",
            Self::HighTemperature => "high_temp",
            Self::DcBus => "dc_bus",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum AlertSeverity {
    Info,
    Warning,
    Critical,
}

/// Observer for operator notifications.
pub trait Annunciator {
    /// Set an alarm indicator. Called every cycle for threshold alarms, so
    /// implementations should treat repeated values as no-ops.
    fn set_alarm(&mut self, alarm: AlarmKind, active: bool);

    /// Push a one-off alert to the operator.
    fn send_alert(&mut self, severity: AlertSeverity, message: &str);

    /// Connection indicator, refreshed every poll cycle.
    fn update_connection(&mut self, _connected: bool, _error_count: u64) {}

    /// Status display, refreshed every poll cycle. `status` is `None` when
    /// the cycle produced no snapshot.
    fn update_status(&mut self, _state: DriveState, _status: Option<&DriveStatus>) {}
}

/// Annunciator that writes everything to the log.
#[derive(Debug, Default)]
pub struct LogAnnunciator {
    active: HashSet<AlarmKind>,
    last_connected: Option<bool>,
}

impl LogAnnunciator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self, alarm: AlarmKind) -> bool {
        self.active.contains(&alarm)
    }
}

impl Annunciator for LogAnnunciator {
    fn set_alarm(&mut self, alarm: AlarmKind, active: bool) {
        let changed = if active {
            self.active.insert(alarm)
        } else {
            self.active.remove(&alarm)
        };
        if changed {
            if active {
                warn!("Alarm {} active", alarm.as_str());
            } else {
                info!("Alarm {} cleared", alarm.as_str());
            }
        }
    }

    fn send_alert(&mut self, severity: AlertSeverity, message: &str) {
        match severity {
            AlertSeverity::Info => info!("ALERT: {}", message),
            AlertSeverity::Warning => warn!("ALERT: {}", message),
            AlertSeverity::Critical => error!("CRITICAL ALERT: {}", message),
        }
    }

    fn update_connection(&mut self, connected: bool, error_count: u64) {
        if self.last_connected != Some(connected) {
            info!(
                "Drive link {} (errors: {})",
                if connected { "up" } else { "down" },
                error_count
            );
            self.last_connected = Some(connected);
        }
    }

    fn update_status(&mut self, state: DriveState, status: Option<&DriveStatus>) {
        match status {
            Some(s) => debug!(
                "[{}] {} | {:.2} Hz {:.1} A {:.1} kW {:.0} V dc {:.1} C",
                state,
                s.state_description(),
                s.output_frequency_hz,
                s.output_current_a,
                s.output_power_kw,
                s.dc_bus_voltage_v,
                s.drive_temperature_c
            ),
            None => debug!("[{}] no status", state),
        }
    }
}

/// Annunciator that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullAnnunciator;

impl Annunciator for NullAnnunciator {
    fn set_alarm(&mut self, _alarm: AlarmKind, _active: bool) {}
    fn send_alert(&mut self, _severity: AlertSeverity, _message: &str) {}
}
