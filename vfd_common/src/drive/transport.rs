//! Register transport trait and error types.
//!
//! This module defines:
//! - `RegisterTransport` trait - Interface for pluggable register transports
//! - `LinkError` enum - Failure of a single register transaction

use std::future::Future;
use std::time::Duration;
use thiserror::Error;

/// Failure of a single register transaction.
///
/// Variants are split into two classes. Transport failures mean the
/// session is unusable and must be re-established. Protocol failures mean
/// the device answered with an error but the session may still be good.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LinkError {
    /// Connection refused, reset or otherwise lost.
    #[error("Transport error: {0}")]
    Transport(String),

    /// No response within the configured timeout.
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// No session is open.
    #[error("Not connected")]
    NotConnected,

    /// The device answered with an exception response.
    #[error("Device exception: {0}")]
    Exception(String),

    /// The device answered with a response of the wrong shape.
    #[error("Malformed response: expected {expected} words, got {actual}")]
    MalformedResponse { expected: usize, actual: usize },
}

impl LinkError {
    /// True if the failure invalidates the session.
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Timeout(_) | Self::NotConnected)
    }
}

/// Trait defining the interface for register transports.
///
/// The protocol client drives one transport instance per device and never
/// issues two transactions concurrently. Implementations exist for Modbus
/// TCP and for an in-memory simulated drive.
///
/// # Lifecycle
///
/// 1. `connect()` - Open a session (may be called again after a failure)
/// 2. `read_holding_registers()` / `write_single_register()` - Transactions
/// 3. `disconnect()` - Close the session
pub trait RegisterTransport: Send {
    /// Returns the transport's identifier (e.g., "modbus-tcp", "simulation").
    fn name(&self) -> &'static str;

    /// Open (or re-open) the session to the device.
    ///
    /// # Errors
    /// Returns a transport-class `LinkError` if the device is unreachable.
    fn connect(&mut self) -> impl Future<Output = Result<(), LinkError>> + Send;

    /// Close the session. Never fails; closing a closed session is a no-op.
    fn disconnect(&mut self) -> impl Future<Output = ()> + Send;

    /// Read `count` contiguous holding registers starting at `address`.
    fn read_holding_registers(
        &mut self,
        address: u16,
        count: u16,
    ) -> impl Future<Output = Result<Vec<u16>, LinkError>> + Send;

    /// Write a single holding register.
    fn write_single_register(
        &mut self,
        address: u16,
        value: u16,
    ) -> impl Future<Output = Result<(), LinkError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_class_errors() {
        assert!(LinkError::Transport("reset".into()).is_transport());
        assert!(LinkError::Timeout(Duration::from_secs(3)).is_transport());
        assert!(LinkError::NotConnected.is_transport());
        assert!(!LinkError::Exception("IllegalDataAddress".into()).is_transport());
        assert!(
            !LinkError::MalformedResponse {
                expected: 16,
                actual: 2
            }
            .is_transport()
        );
    }

    #[test]
    fn link_error_display() {
        let err = LinkError::Transport("connection refused".to_string());
        assert!(err.to_string().contains("connection refused"));

        let err = LinkError::MalformedResponse {
            expected: 16,
            actual: 4,
        };
        assert!(err.to_string().contains("16"));
    }
}
