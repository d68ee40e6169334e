//! Threshold alarms, data records and shipped configuration.

use super::support::*;
use std::path::Path;
use std::time::Duration;
use vfd_common::config::DriveAppConfig;
use vfd_control_unit::annunciator::AlarmKind;
use vfd_hal::SimulatedDrive;

#[tokio::test]
async fn threshold_alarm_alerts_once_per_edge() {
    let mut config = config();
    // The simulated DC bus sits at 560 V.
    config.alarms.low_dc_bus_v = 600.0;
    let (mut app, _clock) = app_with(config, SimulatedDrive::new());

    for _ in 0..4 {
        let report = app.run_cycle().await.unwrap();
        assert!(report.alarms.dc_bus_low);
        assert!(!report.alarms.dc_bus_high);
    }
    assert!(app.annunciator().alarm(AlarmKind::DcBus));
    assert_eq!(app.annunciator().alerts_containing("Low DC bus voltage"), 1);
}

#[tokio::test]
async fn high_temperature_while_running() {
    let mut config = config();
    config.alarms.high_temperature_c = 40.0;
    let (mut app, _clock) = app_with(config, SimulatedDrive::new().with_ramp_step(100.0));

    let report = app.run_cycle().await.unwrap();
    assert!(!report.alarms.high_temperature);

    app.set_speed_setpoint(50.0).await.unwrap();
    app.start().unwrap();
    app.run_cycle().await.unwrap();
    let report = app.run_cycle().await.unwrap();
    assert!(report.alarms.high_temperature);
    assert!(app.annunciator().alarm(AlarmKind::HighTemperature));
    assert_eq!(app.annunciator().alerts_containing("High drive temperature"), 1);
}

#[tokio::test]
async fn no_alarm_evaluation_without_snapshot() {
    let (mut app, _clock) = app();
    app.client_mut().transport_mut().set_online(false);
    let report = app.run_cycle().await.unwrap();
    assert!(!report.alarms.any());
    assert!(app.annunciator().alarms.get(&AlarmKind::DcBus).is_none());
}

#[tokio::test]
async fn records_throttled_across_cycles() {
    let (mut app, clock) = app();

    assert!(app.run_cycle().await.unwrap().published);
    assert!(!app.run_cycle().await.unwrap().published);
    clock.advance(Duration::from_millis(999));
    assert!(!app.run_cycle().await.unwrap().published);
    clock.advance(Duration::from_millis(1));
    assert!(app.run_cycle().await.unwrap().published);

    let records = &app.sink().records;
    assert_eq!(records.len(), 2);
    let json: serde_json::Value = serde_json::from_str(&records[0]).unwrap();
    assert_eq!(json["state"], "READY");
    assert_eq!(json["ready"], true);
    assert_eq!(json["dc_bus_voltage_v"], 560.0);
}

#[tokio::test]
async fn log_data_disabled_publishes_nothing() {
    let mut config = config();
    config.monitoring.log_data = false;
    let (mut app, clock) = app_with(config, SimulatedDrive::new());

    for _ in 0..3 {
        assert!(!app.run_cycle().await.unwrap().published);
        clock.advance(Duration::from_secs(2));
    }
    assert!(app.sink().records.is_empty());
}

#[test]
fn shipped_config_loads() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../config/vfd.toml");
    let config = DriveAppConfig::from_file(&path).unwrap();
    assert_eq!(config.connection.port, 502);
    assert_eq!(config.operating.max_frequency_hz, 50.0);
    assert!(config.control_enabled);
}

#[test]
fn config_from_temp_file() {
    use std::io::Write;

    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
control_enabled = false

[shared]
service_name = "pump-02"

[operating]
max_frequency_hz = 60.0
"#
    )
    .unwrap();

    let config = DriveAppConfig::from_file(file.path()).unwrap();
    assert!(!config.control_enabled);
    assert_eq!(config.display_name, "ACQ580 Drive");
    assert_eq!(config.operating.clamp_frequency(75.0), 60.0);
}
