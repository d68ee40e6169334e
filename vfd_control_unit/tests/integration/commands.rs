//! Operator command surface.

use super::support::*;
use vfd_common::drive::consts::REG_REFERENCE;
use vfd_control_unit::annunciator::NullAnnunciator;
use vfd_control_unit::publish::LogSink;
use vfd_control_unit::{CommandError, DriveApplication, DriveState};
use vfd_hal::SimulatedDrive;

#[tokio::test]
async fn setpoint_is_clamped_to_max_frequency() {
    let (mut app, _clock) = ready_app().await;

    assert_eq!(app.set_speed_setpoint(999.0).await, Ok(50.0));
    assert_eq!(app.client().transport().register(REG_REFERENCE), 5000);

    assert_eq!(app.set_speed_setpoint(-5.0).await, Ok(0.0));
    assert_eq!(app.client().transport().register(REG_REFERENCE), 0);
}

#[tokio::test]
async fn setpoint_respects_min_frequency() {
    let mut config = config();
    config.operating.min_frequency_hz = 15.0;
    let (mut app, _clock) = app_with(config, SimulatedDrive::new());

    assert_eq!(app.set_speed_setpoint(5.0).await, Ok(15.0));
    assert_eq!(app.client().transport().register(REG_REFERENCE), 1500);
}

#[tokio::test]
async fn inverted_frequency_window_clamps_to_max() {
    let mut config = config();
    config.operating.min_frequency_hz = 60.0;
    config.operating.max_frequency_hz = 50.0;
    let (mut app, _clock) = app_with(config, SimulatedDrive::new());

    assert_eq!(app.set_speed_setpoint(55.0).await, Ok(50.0));
    assert_eq!(app.client().transport().register(REG_REFERENCE), 5000);
}

#[tokio::test]
async fn textual_setpoints() {
    let (mut app, _clock) = ready_app().await;

    assert_eq!(app.set_speed_setpoint_text(" 42.5 ").await, Ok(42.5));
    assert_eq!(app.client().transport().register(REG_REFERENCE), 4250);

    let writes = app.client().transport().writes().len();
    assert_eq!(
        app.set_speed_setpoint_text("fast").await,
        Err(CommandError::InvalidSetpoint("fast".to_string()))
    );
    assert!(matches!(
        app.set_speed_setpoint_text("NaN").await,
        Err(CommandError::InvalidSetpoint(_))
    ));
    assert!(matches!(
        app.set_speed_setpoint(f64::INFINITY).await,
        Err(CommandError::InvalidSetpoint(_))
    ));
    assert_eq!(app.client().transport().writes().len(), writes);
}

#[tokio::test]
async fn control_disabled_blocks_start_and_setpoint() {
    let mut config = config();
    config.control_enabled = false;
    let (mut app, _clock) = app_with(config, SimulatedDrive::new());
    app.run_cycle().await.unwrap();
    assert_eq!(app.state(), DriveState::Ready);

    assert_eq!(app.start(), Err(CommandError::ControlDisabled));
    assert_eq!(
        app.annunciator()
            .alerts_containing("Control disabled in configuration"),
        1
    );
    assert!(!app.machine().requests().start);

    assert_eq!(
        app.set_speed_setpoint(30.0).await,
        Err(CommandError::ControlDisabled)
    );
    assert!(app.client().transport().writes().is_empty());

    // Stop and emergency stop are never gated.
    app.emergency_stop();
    assert_eq!(app.run_cycle().await.unwrap().state, DriveState::Emergency);
}

#[tokio::test]
async fn setpoint_write_failure_is_reported() {
    let (mut app, _clock) = ready_app().await;
    app.client_mut().transport_mut().set_online(false);
    assert_eq!(
        app.set_speed_setpoint(20.0).await,
        Err(CommandError::WriteFailed)
    );
}

#[tokio::test]
async fn stop_outside_running_is_ignored() {
    let (mut app, _clock) = ready_app().await;
    assert!(!app.stop());
    assert!(!app.machine().requests().stop);
}

#[tokio::test]
async fn application_runs_with_plain_collaborators() {
    let mut app = DriveApplication::new(config(), SimulatedDrive::new(), NullAnnunciator, LogSink);
    let report = app.run_cycle().await.unwrap();
    assert_eq!(report.state, DriveState::Ready);
    assert!(report.published);

    app.shutdown().await;
    assert!(!app.client().connected());
}
