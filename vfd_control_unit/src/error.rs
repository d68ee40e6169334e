//! Control unit error types.
//!
//! Communication failures never appear here: the drive client reports them
//! as `None`/`false`. These errors cover programmer errors in trigger
//! sequencing and operator commands rejected at the boundary.

use crate::state::{DriveState, Trigger};
use thiserror::Error;

/// A trigger was fired from a state that is not one of its sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ControlError {
    #[error("Trigger {trigger:?} is not valid from state {state:?}")]
    InvalidTransition { trigger: Trigger, state: DriveState },
}

/// Operator command rejected before reaching the drive.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("Control disabled in configuration")]
    ControlDisabled,

    #[error("Invalid setpoint value: {0}")]
    InvalidSetpoint(String),

    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    /// The write did not reach the drive.
    #[error("Drive write failed")]
    WriteFailed,
}
