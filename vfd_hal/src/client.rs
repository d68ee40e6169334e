//! Drive protocol client.
//!
//! `DriveClient` owns the one session to one drive. It batch-reads the
//! status block, decodes it through the register codec, and issues single
//! register writes for the control word and the speed reference.
//!
//! Expected communication failures never escape as errors: reads return
//! `None`, writes return `false`, and the failure is counted. A
//! transport-class failure also marks the client disconnected so the next
//! call reconnects; a device exception leaves the session in place.

use std::time::Duration;
use tracing::{debug, info, warn};
use vfd_common::config::ConnectionConfig;
use vfd_common::drive::codec::{decode_status, encode_control, encode_reference};
use vfd_common::drive::consts::*;
use vfd_common::drive::transport::{LinkError, RegisterTransport};
use vfd_common::drive::types::{ControlFlags, DriveStatus};

/// Connectivity bookkeeping owned by the client.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionState {
    /// True while a session is believed usable.
    pub connected: bool,
    /// Cumulative protocol-level failures. Never reset.
    pub error_count: u64,
    /// Device host.
    pub host: String,
    /// Device port.
    pub port: u16,
    /// Device unit id.
    pub unit_id: u8,
    /// Per-request timeout.
    pub timeout: Duration,
}

/// Result of the two-write fault reset pulse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultResetOutcome {
    /// Reset bit set and cleared again.
    Completed,
    /// Reset bit set, but clearing it failed; the bit may still be latched.
    ReleaseFailed,
    /// Reset bit could not be set.
    Failed,
}

impl FaultResetOutcome {
    /// True if the reset edge reached the drive.
    pub const fn is_success(&self) -> bool {
        !matches!(self, Self::Failed)
    }
}

/// Protocol client for one drive.
pub struct DriveClient<T: RegisterTransport> {
    transport: T,
    state: ConnectionState,
}

impl<T: RegisterTransport> DriveClient<T> {
    /// Create an unconnected client.
    pub fn new(transport: T, config: &ConnectionConfig) -> Self {
        Self {
            transport,
            state: ConnectionState {
                connected: false,
                error_count: 0,
                host: config.host.clone(),
                port: config.port,
                unit_id: config.unit_id,
                timeout: config.timeout(),
            },
        }
    }

    /// True while a session is believed usable.
    pub fn connected(&self) -> bool {
        self.state.connected
    }

    /// Cumulative failure count.
    pub fn error_count(&self) -> u64 {
        self.state.error_count
    }

    /// Connection bookkeeping.
    pub fn connection(&self) -> &ConnectionState {
        &self.state
    }

    /// Underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Underlying transport, mutable (fault injection in tests).
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Open the session. Does not retry; the poll cadence drives retries.
    pub async fn connect(&mut self) -> bool {
        match self.transport.connect().await {
            Ok(()) => {
                info!(
                    "Connected to drive at {}:{} (unit {}, {})",
                    self.state.host,
                    self.state.port,
                    self.state.unit_id,
                    self.transport.name()
                );
                self.state.connected = true;
                true
            }
            Err(e) => {
                self.state.connected = false;
                self.state.error_count += 1;
                warn!(
                    "Failed to connect to drive at {}:{}: {} (errors: {})",
                    self.state.host, self.state.port, e, self.state.error_count
                );
                false
            }
        }
    }

    /// Close the session.
    pub async fn disconnect(&mut self) {
        self.transport.disconnect().await;
        self.state.connected = false;
        info!("Disconnected from drive");
    }

    /// Read and decode the full drive status.
    ///
    /// Returns `None` on any failure; `None` means "no new information",
    /// never "drive stopped".
    pub async fn read_status(&mut self) -> Option<DriveStatus> {
        if !self.ensure_connected().await {
            return None;
        }

        let block = match self.read_block(STATUS_BLOCK_START, STATUS_BLOCK_LEN).await {
            Ok(block) => block,
            Err(e) => {
                self.record_failure("status read", &e);
                return None;
            }
        };

        let codes = match self.read_block(CODES_BLOCK_START, CODES_BLOCK_LEN).await {
            Ok(codes) => codes,
            Err(e) => {
                self.record_failure("fault code read", &e);
                return None;
            }
        };

        match decode_status(&block, codes[0], codes[1]) {
            Ok(status) => Some(status),
            Err(e) => {
                warn!("Status decode failed: {}", e);
                self.state.error_count += 1;
                None
            }
        }
    }

    /// Encode and write the control word.
    pub async fn write_control(&mut self, flags: ControlFlags) -> bool {
        let word = encode_control(&flags);
        let ok = self.write_register("control word", REG_CONTROL_WORD, word).await;
        if ok {
            debug!("Control word written: {:#06x}", word);
        }
        ok
    }

    /// Write the speed reference in Hz, clamped to the register range.
    pub async fn set_reference(&mut self, frequency_hz: f64) -> bool {
        let raw = encode_reference(frequency_hz);
        let ok = self.write_register("speed reference", REG_REFERENCE, raw).await;
        if ok {
            debug!("Speed reference set to {:.2} Hz", raw as f64 / DIV_FREQUENCY);
        }
        ok
    }

    /// Run forward in remote.
    pub async fn start(&mut self) -> bool {
        info!("Starting drive");
        self.write_control(ControlFlags::start()).await
    }

    /// Normal stop.
    pub async fn stop(&mut self) -> bool {
        info!("Stopping drive");
        self.write_control(ControlFlags::stop()).await
    }

    /// Emergency stop.
    pub async fn emergency_stop(&mut self) -> bool {
        warn!("Emergency stop activated");
        self.write_control(ControlFlags::emergency_stop()).await
    }

    /// Fault reset pulse: set the reset bit, then clear it.
    ///
    /// Success is decided by the first write. A failed second write is
    /// reported as `ReleaseFailed` rather than dropped.
    pub async fn reset_fault(&mut self) -> FaultResetOutcome {
        info!("Resetting fault");
        if !self.write_control(ControlFlags::fault_reset(true)).await {
            return FaultResetOutcome::Failed;
        }
        if !self.write_control(ControlFlags::fault_reset(false)).await {
            warn!("Fault reset bit could not be cleared");
            return FaultResetOutcome::ReleaseFailed;
        }
        FaultResetOutcome::Completed
    }

    async fn ensure_connected(&mut self) -> bool {
        self.state.connected || self.connect().await
    }

    async fn read_block(&mut self, address: u16, count: u16) -> Result<Vec<u16>, LinkError> {
        let words = self.transport.read_holding_registers(address, count).await?;
        if words.len() < count as usize {
            return Err(LinkError::MalformedResponse {
                expected: count as usize,
                actual: words.len(),
            });
        }
        Ok(words)
    }

    async fn write_register(&mut self, what: &str, address: u16, value: u16) -> bool {
        if !self.ensure_connected().await {
            return false;
        }
        match self.transport.write_single_register(address, value).await {
            Ok(()) => true,
            Err(e) => {
                self.record_failure(what, &e);
                false
            }
        }
    }

    fn record_failure(&mut self, what: &str, err: &LinkError) {
        self.state.error_count += 1;
        if err.is_transport() {
            self.state.connected = false;
        }
        warn!(
            "Drive {} failed: {} (errors: {}, connected: {})",
            what, err, self.state.error_count, self.state.connected
        );
    }
}
