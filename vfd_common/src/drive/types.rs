//! Drive status and command types.
//!
//! - `StatusWord` / `ControlWord` - bitflag views of the two bit-field registers
//! - `ControlFlags` - desired command flags, encoded by the codec
//! - `DriveStatus` - decoded snapshot of one read cycle
//! - `fault_description()` - fault code table

use crate::drive::consts::*;
use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Status word (register 1).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct StatusWord: u16 {
        /// Ready to run.
        const READY        = 1 << SW_BIT_READY;
        /// Drive running.
        const RUNNING      = 1 << SW_BIT_RUNNING;
        /// Reverse direction (cleared = forward).
        const REVERSE      = 1 << SW_BIT_DIRECTION;
        /// Fault active.
        const FAULT        = 1 << SW_BIT_FAULT;
        /// Warning active.
        const WARNING      = 1 << SW_BIT_WARNING;
        /// At reference speed.
        const AT_REFERENCE = 1 << SW_BIT_AT_REFERENCE;
        /// Remote control active.
        const REMOTE       = 1 << SW_BIT_REMOTE;
    }
}

bitflags! {
    /// Control word (register 0).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ControlWord: u16 {
        /// Run command.
        const RUN            = 1 << CW_BIT_RUN;
        /// Reverse direction.
        const REVERSE        = 1 << CW_BIT_DIRECTION;
        /// Fault reset.
        const FAULT_RESET    = 1 << CW_BIT_FAULT_RESET;
        /// Emergency stop.
        const EMERGENCY_STOP = 1 << CW_BIT_EMERGENCY_STOP;
        /// Remote control.
        const REMOTE         = 1 << CW_BIT_REMOTE;
    }
}

/// Desired control flags for one control-word write.
///
/// `run` and `direction_forward` are tri-state: `None` leaves the bit
/// cleared. The codec does not merge with a previous word, so callers that
/// want "no change" must re-supply the current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlFlags {
    pub run: Option<bool>,
    pub direction_forward: Option<bool>,
    pub fault_reset: bool,
    pub emergency_stop: bool,
    pub remote: bool,
}

impl ControlFlags {
    /// Run forward in remote.
    pub const fn start() -> Self {
        Self {
            run: Some(true),
            ..Self::remote()
        }
    }

    /// Normal stop in remote.
    pub const fn stop() -> Self {
        Self {
            run: Some(false),
            ..Self::remote()
        }
    }

    /// Emergency stop in remote.
    pub const fn emergency_stop() -> Self {
        Self {
            run: Some(false),
            emergency_stop: true,
            ..Self::remote()
        }
    }

    /// Fault reset pulse edge. `active = false` clears the reset bit again.
    pub const fn fault_reset(active: bool) -> Self {
        Self {
            fault_reset: active,
            ..Self::remote()
        }
    }

    /// Remote bit only, everything else unset.
    pub const fn remote() -> Self {
        Self {
            run: None,
            direction_forward: None,
            fault_reset: false,
            emergency_stop: false,
            remote: true,
        }
    }
}

impl Default for ControlFlags {
    fn default() -> Self {
        Self::remote()
    }
}

/// Decoded drive status for one successful read cycle.
///
/// Built fresh on every read, never mutated afterwards. All measurements
/// come from unsigned registers and are therefore never negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriveStatus {
    pub ready: bool,
    pub running: bool,
    pub fault: bool,
    pub warning: bool,
    pub at_reference: bool,
    pub remote_control: bool,
    pub direction_forward: bool,

    pub output_frequency_hz: f64,
    pub output_current_a: f64,
    pub output_voltage_v: f64,
    pub output_power_kw: f64,
    pub motor_speed_rpm: f64,
    pub motor_torque_pct: f64,
    pub dc_bus_voltage_v: f64,
    pub drive_temperature_c: f64,
    pub run_hours: f64,
    pub energy_kwh: f64,
    pub speed_reference_hz: f64,

    pub fault_code: u16,
    pub warning_code: u16,
}

impl DriveStatus {
    /// Human-readable drive state.
    pub fn state_description(&self) -> String {
        if self.fault {
            return format!("FAULT ({})", self.fault_code);
        }
        if !self.ready {
            return "NOT READY".to_string();
        }
        if self.running {
            if self.at_reference {
                return "RUNNING".to_string();
            }
            return "ACCELERATING".to_string();
        }
        "READY".to_string()
    }

    /// Description of the active fault code.
    pub fn fault_description(&self) -> String {
        fault_description(self.fault_code)
    }
}

impl Default for DriveStatus {
    fn default() -> Self {
        Self {
            ready: false,
            running: false,
            fault: false,
            warning: false,
            at_reference: false,
            remote_control: false,
            direction_forward: true,
            output_frequency_hz: 0.0,
            output_current_a: 0.0,
            output_voltage_v: 0.0,
            output_power_kw: 0.0,
            motor_speed_rpm: 0.0,
            motor_torque_pct: 0.0,
            dc_bus_voltage_v: 0.0,
            drive_temperature_c: 0.0,
            run_hours: 0.0,
            energy_kwh: 0.0,
            speed_reference_hz: 0.0,
            fault_code: 0,
            warning_code: 0,
        }
    }
}

/// Drive fault code table.
const FAULT_CODES: [&str; 24] = [
    "No fault",
    "Overcurrent",
    "DC overvoltage",
    "Device overtemperature",
    "Short circuit",
    "IGBT overtemperature",
    "Ground fault",
    "DC undervoltage",
    "Motor overtemperature",
    "Output phase supervision",
    "Encoder fault",
    "External fault 1",
    "External fault 2",
    "Panel loss",
    "Parameter fault",
    "Safe torque off",
    "Supply phase loss",
    "Motor stall",
    "Underload",
    "Overspeed",
    "PID supervision",
    "Drive overload",
    "Motor overload",
    "Communication loss",
];

/// Human-readable description of a drive fault code.
pub fn fault_description(code: u16) -> String {
    FAULT_CODES
        .get(code as usize)
        .map(|s| s.to_string())
        .unwrap_or_else(|| format!("Unknown fault ({code})"))
}
