//! Edge-triggered threshold alarms.
//!
//! Each alarm alerts once on its inactive → active edge and stays silent
//! while the condition persists. Indicators are refreshed every cycle.

use crate::annunciator::{AlarmKind, AlertSeverity, Annunciator};
use tracing::warn;
use vfd_common::config::AlarmThresholds;
use vfd_common::drive::types::DriveStatus;

/// Active/inactive flag per threshold alarm.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AlarmLatches {
    pub high_current: bool,
    pub high_temperature: bool,
    pub dc_bus_low: bool,
    pub dc_bus_high: bool,
}

impl AlarmLatches {
    pub fn any(&self) -> bool {
        self.high_current || self.high_temperature || self.dc_bus_low || self.dc_bus_high
    }
}

pub struct AlarmMonitor {
    thresholds: AlarmThresholds,
    rated_current_a: f64,
    latches: AlarmLatches,
}

impl AlarmMonitor {
    pub fn new(thresholds: AlarmThresholds, rated_current_a: f64) -> Self {
        Self {
            thresholds,
            rated_current_a,
            latches: AlarmLatches::default(),
        }
    }

    pub fn latches(&self) -> AlarmLatches {
        self.latches
    }

    /// Output current as percent of rated current. Zero if rated current is
    /// not positive.
    pub fn current_percent(&self, output_current_a: f64) -> f64 {
        if self.rated_current_a > 0.0 {
            output_current_a / self.rated_current_a * 100.0
        } else {
            0.0
        }
    }

    /// Evaluate all thresholds against a snapshot.
    pub fn check(&mut self, status: &DriveStatus, annunciator: &mut dyn Annunciator) -> AlarmLatches {
        let t = &self.thresholds;
        let current_pct = self.current_percent(status.output_current_a);

        let next = AlarmLatches {
            high_current: current_pct > t.high_current_pct,
            high_temperature: status.drive_temperature_c > t.high_temperature_c,
            dc_bus_low: status.dc_bus_voltage_v < t.low_dc_bus_v,
            dc_bus_high: status.dc_bus_voltage_v > t.high_dc_bus_v,
        };
        let prev = self.latches;

        let rising = [
            (
                !prev.high_current && next.high_current,
                format!(
                    "High current: {:.1}A ({:.0}%)",
                    status.output_current_a, current_pct
                ),
            ),
            (
                !prev.high_temperature && next.high_temperature,
                format!(
                    "High drive temperature: {:.1}C",
                    status.drive_temperature_c
                ),
            ),
            (
                !prev.dc_bus_low && next.dc_bus_low,
                format!("Low DC bus voltage: {:.0}V", status.dc_bus_voltage_v),
            ),
            (
                !prev.dc_bus_high && next.dc_bus_high,
                format!("High DC bus voltage: {:.0}V", status.dc_bus_voltage_v),
            ),
        ];
        for (edge, message) in rising {
            if edge {
                warn!("Alarm triggered: {}", message);
                annunciator.send_alert(AlertSeverity::Warning, &message);
            }
        }

        annunciator.set_alarm(AlarmKind::HighCurrent, next.high_current);
        annunciator.set_alarm(AlarmKind::HighTemperature, next.high_temperature);
        annunciator.set_alarm(AlarmKind::DcBus, next.dc_bus_low || next.dc_bus_high);

        self.latches = next;
        next
    }
}
