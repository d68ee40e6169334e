//! Shared fakes and builders.

use std::collections::HashMap;
use vfd_common::clock::ManualClock;
use vfd_common::config::{
    AlarmThresholds, ConnectionConfig, DriveAppConfig, LoadConfig, LogLevel, MonitoringConfig,
    OperatingLimits, SharedConfig,
};
use vfd_control_unit::annunciator::{AlarmKind, AlertSeverity, Annunciator};
use vfd_control_unit::publish::RecordSink;
use vfd_control_unit::{DriveApplication, DriveState};
use vfd_common::drive::types::DriveStatus;
use vfd_hal::SimulatedDrive;

/// Annunciator that records everything it is told.
#[derive(Default)]
pub struct RecordingAnnunciator {
    pub alarms: HashMap<AlarmKind, bool>,
    pub alerts: Vec<(AlertSeverity, String)>,
    pub connection: Option<(bool, u64)>,
    pub displayed: Option<DriveState>,
}

impl RecordingAnnunciator {
    pub fn alarm(&self, alarm: AlarmKind) -> bool {
        self.alarms.get(&alarm).copied().unwrap_or(false)
    }

    pub fn alerts_containing(&self, needle: &str) -> usize {
        self.alerts.iter().filter(|(_, m)| m.contains(needle)).count()
    }
}

impl Annunciator for RecordingAnnunciator {
    fn set_alarm(&mut self, alarm: AlarmKind, active: bool) {
        self.alarms.insert(alarm, active);
    }

    fn send_alert(&mut self, severity: AlertSeverity, message: &str) {
        self.alerts.push((severity, message.to_string()));
    }

    fn update_connection(&mut self, connected: bool, error_count: u64) {
        self.connection = Some((connected, error_count));
    }

    fn update_status(&mut self, state: DriveState, _status: Option<&DriveStatus>) {
        self.displayed = Some(state);
    }
}

/// Sink that keeps every payload.
#[derive(Default)]
pub struct MemorySink {
    pub records: Vec<String>,
}

impl RecordSink for MemorySink {
    fn publish(&mut self, _channel: &str, payload: &str) {
        self.records.push(payload.to_string());
    }
}

pub type TestApp = DriveApplication<SimulatedDrive, RecordingAnnunciator, MemorySink, ManualClock>;

pub fn config() -> DriveAppConfig {
    DriveAppConfig {
        display_name: "Test Drive".to_string(),
        control_enabled: true,
        shared: SharedConfig {
            log_level: LogLevel::Debug,
            service_name: "vfd-test".to_string(),
        },
        connection: ConnectionConfig::default(),
        load: LoadConfig::default(),
        operating: OperatingLimits::default(),
        monitoring: MonitoringConfig::default(),
        alarms: AlarmThresholds::default(),
    }
}

pub fn app_with(config: DriveAppConfig, drive: SimulatedDrive) -> (TestApp, ManualClock) {
    let clock = ManualClock::new();
    let app = DriveApplication::with_clock(
        config,
        drive,
        RecordingAnnunciator::default(),
        MemorySink::default(),
        clock.clone(),
    );
    (app, clock)
}

/// App over a drive that ramps to any reference within one read.
pub fn app() -> (TestApp, ManualClock) {
    app_with(config(), SimulatedDrive::new().with_ramp_step(100.0))
}

/// App that has completed its first cycle and sits in `Ready`.
pub async fn ready_app() -> (TestApp, ManualClock) {
    let (mut app, clock) = app();
    let report = app.run_cycle().await.unwrap();
    assert_eq!(report.state, DriveState::Ready);
    (app, clock)
}

/// App running at 30 Hz.
pub async fn running_app() -> (TestApp, ManualClock) {
    let (mut app, clock) = ready_app().await;
    app.set_speed_setpoint(30.0).await.unwrap();
    assert_eq!(app.start(), Ok(true));
    assert_eq!(app.run_cycle().await.unwrap().state, DriveState::Starting);
    assert_eq!(app.run_cycle().await.unwrap().state, DriveState::Running);
    (app, clock)
}
