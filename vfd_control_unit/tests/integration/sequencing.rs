//! State sequencing against the simulated drive.

use super::support::*;
use std::time::Duration;
use vfd_common::drive::consts::REG_CONTROL_WORD;
use vfd_control_unit::annunciator::{AlarmKind, AlertSeverity};
use vfd_control_unit::DriveState;

#[tokio::test]
async fn first_cycle_connects_and_detects_ready() {
    let (mut app, _clock) = app();
    assert_eq!(app.state(), DriveState::Disconnected);

    let report = app.run_cycle().await.unwrap();
    assert_eq!(report.state, DriveState::Ready);
    assert!(report.connected);
    assert_eq!(report.error_count, 0);
    assert!(report.status.is_some());
    assert!(!app.annunciator().alarm(AlarmKind::Communication));
    assert_eq!(app.annunciator().connection, Some((true, 0)));
    assert_eq!(app.annunciator().displayed, Some(DriveState::Ready));
}

#[tokio::test]
async fn start_then_stop_round_trip() {
    let (mut app, _clock) = running_app().await;
    let status = app.last_status().unwrap();
    assert_eq!(status.output_frequency_hz, 30.0);
    assert!(status.at_reference);

    assert!(app.stop());
    assert_eq!(app.run_cycle().await.unwrap().state, DriveState::Stopping);
    assert_eq!(app.run_cycle().await.unwrap().state, DriveState::Ready);

    assert_eq!(
        app.client().transport().control_writes(),
        vec![0x0011, 0x0010]
    );
}

#[tokio::test]
async fn start_request_outside_ready_is_ignored() {
    let (mut app, _clock) = app();
    assert_eq!(app.start(), Ok(false));
    app.run_cycle().await.unwrap();
    app.run_cycle().await.unwrap();
    assert_eq!(app.state(), DriveState::Ready);
    assert!(app.client().transport().control_writes().is_empty());
}

#[tokio::test]
async fn emergency_stop_from_running() {
    let (mut app, _clock) = running_app().await;

    app.emergency_stop();
    let report = app.run_cycle().await.unwrap();
    assert_eq!(report.state, DriveState::Emergency);

    let estops = app
        .client()
        .transport()
        .control_writes()
        .into_iter()
        .filter(|w| *w == 0x0018)
        .count();
    assert_eq!(estops, 1);
    assert!(
        app.annunciator()
            .alerts
            .iter()
            .any(|(s, m)| *s == AlertSeverity::Critical && m.contains("Emergency"))
    );

    // No automatic exit, however long it waits.
    for _ in 0..3 {
        assert_eq!(app.run_cycle().await.unwrap().state, DriveState::Emergency);
    }
}

#[tokio::test]
async fn emergency_release_returns_to_ready() {
    let (mut app, _clock) = running_app().await;
    app.emergency_stop();
    app.run_cycle().await.unwrap();
    // The drive drops ready once it has seen the emergency stop word.
    app.run_cycle().await.unwrap();
    assert!(!app.last_status().unwrap().ready);

    assert_eq!(app.reset_emergency().await, Ok(true));
    assert_eq!(app.state(), DriveState::Connected);
    assert_eq!(
        app.client().transport().register(REG_CONTROL_WORD),
        0x0010
    );

    assert_eq!(app.run_cycle().await.unwrap().state, DriveState::Ready);
    assert_eq!(app.reset_emergency().await, Ok(false));
}

#[tokio::test]
async fn link_loss_raises_comms_alarm_and_recovers() {
    let (mut app, _clock) = running_app().await;

    app.client_mut().transport_mut().set_online(false);
    let report = app.run_cycle().await.unwrap();
    assert_eq!(report.state, DriveState::Disconnected);
    assert!(report.status.is_none());
    assert!(!report.connected);
    assert!(!report.published);
    assert!(app.annunciator().alarm(AlarmKind::Communication));
    assert!(app.last_status().is_none());

    // Still down: stays disconnected, error count keeps climbing.
    let errors = report.error_count;
    let report = app.run_cycle().await.unwrap();
    assert_eq!(report.state, DriveState::Disconnected);
    assert!(report.error_count > errors);

    app.client_mut().transport_mut().set_online(true);
    let report = app.run_cycle().await.unwrap();
    assert!(report.connected);
    assert_ne!(report.state, DriveState::Disconnected);
    assert!(!app.annunciator().alarm(AlarmKind::Communication));
}

#[tokio::test]
async fn start_timeout_faults_without_explicit_trigger() {
    let (mut app, clock) = ready_app().await;
    app.client_mut().transport_mut().set_run_inhibit(true);

    app.start().unwrap();
    assert_eq!(app.run_cycle().await.unwrap().state, DriveState::Starting);

    clock.advance(Duration::from_secs(5));
    assert_eq!(app.run_cycle().await.unwrap().state, DriveState::Starting);

    clock.advance(Duration::from_secs(6));
    assert_eq!(app.run_cycle().await.unwrap().state, DriveState::Fault);
    assert_eq!(app.annunciator().alerts_containing("running within"), 1);
}

#[tokio::test]
async fn drive_fault_and_reset() {
    let (mut app, _clock) = running_app().await;

    app.client_mut().transport_mut().inject_fault(2);
    assert_eq!(app.run_cycle().await.unwrap().state, DriveState::Fault);
    assert_eq!(app.annunciator().alerts_containing("DC overvoltage"), 1);

    // Fault persists: no new alert.
    assert_eq!(app.run_cycle().await.unwrap().state, DriveState::Fault);
    assert_eq!(app.annunciator().alerts_containing("DC overvoltage"), 1);

    let outcome = app.fault_reset().await;
    assert!(outcome.is_success());
    assert!(app.machine().requests().fault_reset);

    assert_eq!(app.run_cycle().await.unwrap().state, DriveState::Ready);
}

#[tokio::test]
async fn start_pending_at_emergency_is_dropped_on_release() {
    let (mut app, _clock) = ready_app().await;
    assert_eq!(app.start(), Ok(true));
    app.emergency_stop();
    assert_eq!(app.run_cycle().await.unwrap().state, DriveState::Emergency);
    assert!(!app.machine().requests().start);

    assert_eq!(app.reset_emergency().await, Ok(true));
    assert_eq!(app.run_cycle().await.unwrap().state, DriveState::Ready);
    assert_eq!(app.run_cycle().await.unwrap().state, DriveState::Ready);

    assert_eq!(
        app.client().transport().control_writes(),
        vec![0x0018, 0x0010]
    );
}
