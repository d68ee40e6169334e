//! Operator command surface.
//!
//! Start, stop, fault reset and emergency stop are fire-and-forget: they
//! latch a state machine request that the next poll cycle consumes. Fault
//! reset additionally pulses the reset bit right away. Speed setpoints are
//! validated, clamped to the operating window and written immediately.
//!
//! `start` and setpoint commands honour the `control_enabled` gate.

use crate::annunciator::{AlertSeverity, Annunciator};
use crate::cycle::DriveApplication;
use crate::error::{CommandError, ControlError};
use crate::publish::RecordSink;
use crate::state::{DriveState, Trigger};
use tracing::{error, info, warn};
use vfd_common::clock::Clock;
use vfd_common::drive::transport::RegisterTransport;
use vfd_common::drive::types::ControlFlags;
use vfd_hal::FaultResetOutcome;

impl<T, N, S, C> DriveApplication<T, N, S, C>
where
    T: RegisterTransport,
    N: Annunciator,
    S: RecordSink,
    C: Clock + Clone,
{
    fn check_control_enabled(&self, command: &str) -> Result<(), CommandError> {
        if self.config.control_enabled {
            return Ok(());
        }
        warn!("Control disabled - {} ignored", command);
        Err(CommandError::ControlDisabled)
    }

    /// Request a start. Returns whether the request was latched.
    pub fn start(&mut self) -> Result<bool, CommandError> {
        if let Err(e) = self.check_control_enabled("start command") {
            self.annunciator
                .send_alert(AlertSeverity::Warning, "Control disabled in configuration");
            return Err(e);
        }
        info!("Start drive command received");
        Ok(self.machine.request_start())
    }

    /// Request a stop. Returns whether the request was latched.
    pub fn stop(&mut self) -> bool {
        info!("Stop drive command received");
        self.machine.request_stop()
    }

    /// Latch a fault reset and pulse the drive's reset bit.
    pub async fn fault_reset(&mut self) -> FaultResetOutcome {
        info!("Fault reset command received");
        self.machine.request_fault_reset();
        let outcome = self.client.reset_fault().await;
        if outcome == FaultResetOutcome::ReleaseFailed {
            self.annunciator.send_alert(
                AlertSeverity::Warning,
                "Fault reset bit could not be cleared",
            );
        }
        outcome
    }

    /// Request an emergency stop. Always latched.
    pub fn emergency_stop(&mut self) {
        error!("Emergency stop command received!");
        self.machine.request_emergency_stop();
    }

    /// Leave `Emergency` and release the emergency stop bit.
    ///
    /// Returns `Ok(false)` if the machine is not in `Emergency`.
    pub async fn reset_emergency(&mut self) -> Result<bool, ControlError> {
        if self.machine.state() != DriveState::Emergency {
            info!(
                "Emergency reset ignored in state {}",
                self.machine.state()
            );
            return Ok(false);
        }

        self.machine
            .fire(Trigger::EmergencyReset, &mut self.client, &mut self.annunciator)
            .await?;

        if !self.client.write_control(ControlFlags::stop()).await {
            warn!("Emergency stop release write failed");
        }
        Ok(true)
    }

    /// Clamp a setpoint into the operating window and write it.
    /// Returns the frequency actually sent.
    pub async fn set_speed_setpoint(&mut self, frequency_hz: f64) -> Result<f64, CommandError> {
        self.check_control_enabled("setpoint change")?;

        if !frequency_hz.is_finite() {
            error!("Invalid setpoint value: {}", frequency_hz);
            return Err(CommandError::InvalidSetpoint(frequency_hz.to_string()));
        }

        let clamped = self.config.operating.clamp_frequency(frequency_hz);
        info!("Setting speed reference to {:.1} Hz", clamped);
        if !self.client.set_reference(clamped).await {
            return Err(CommandError::WriteFailed);
        }
        Ok(clamped)
    }

    /// Parse and apply a textual setpoint. Unparseable input never reaches
    /// the drive.
    pub async fn set_speed_setpoint_text(&mut self, text: &str) -> Result<f64, CommandError> {
        let frequency_hz = text.trim().parse::<f64>().map_err(|e| {
            error!("Invalid setpoint value: {} - {}", text, e);
            CommandError::InvalidSetpoint(text.to_string())
        })?;
        self.set_speed_setpoint(frequency_hz).await
    }
}

/// Operator command as typed on the console.
#[derive(Debug, Clone, PartialEq)]
pub enum OperatorCommand {
    Start,
    Stop,
    FaultReset,
    EmergencyStop,
    ReleaseEmergency,
    Speed(String),
}

impl OperatorCommand {
    /// Parse one console line. Blank lines yield `Ok(None)`.
    pub fn parse(line: &str) -> Result<Option<Self>, CommandError> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            return Ok(None);
        };
        let command = match verb.to_ascii_lowercase().as_str() {
            "start" => Self::Start,
            "stop" => Self::Stop,
            "reset" => Self::FaultReset,
            "estop" => Self::EmergencyStop,
            "release" => Self::ReleaseEmergency,
            "speed" => match words.next() {
                Some(value) => Self::Speed(value.to_string()),
                None => return Err(CommandError::InvalidSetpoint(String::new())),
            },
            other => return Err(CommandError::UnknownCommand(other.to_string())),
        };
        Ok(Some(command))
    }
}
