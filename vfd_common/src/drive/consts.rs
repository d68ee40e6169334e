//! Drive register map constants.
//!
//! Holding-register offsets, control/status word bit positions and the
//! fixed decimal divisors of every scaled measurement. These values are
//! the wire contract with the drive and must stay bit-exact.

use static_assertions::const_assert;

// ─── Register Offsets ───────────────────────────────────────────────

/// Control word (read/write).
pub const REG_CONTROL_WORD: u16 = 0;
/// Status word (read-only).
pub const REG_STATUS_WORD: u16 = 1;
/// Speed reference, 0.01 Hz units (read/write).
pub const REG_REFERENCE: u16 = 2;

/// Output frequency, 0.01 Hz.
pub const REG_OUTPUT_FREQUENCY: u16 = 3;
/// Output current, 0.1 A.
pub const REG_OUTPUT_CURRENT: u16 = 4;
/// Output voltage, 0.1 V.
pub const REG_OUTPUT_VOLTAGE: u16 = 5;
/// Output power, 0.1 kW.
pub const REG_OUTPUT_POWER: u16 = 6;
/// Motor speed, 1 RPM.
pub const REG_MOTOR_SPEED: u16 = 7;
/// Motor torque, 0.1 %.
pub const REG_MOTOR_TORQUE: u16 = 8;
/// DC bus voltage, 1 V.
pub const REG_DC_BUS_VOLTAGE: u16 = 9;
/// Drive temperature, 0.1 °C.
pub const REG_DRIVE_TEMPERATURE: u16 = 10;
/// Run hours, 1 h.
pub const REG_RUN_HOURS: u16 = 11;
/// Energy counter, 0.1 kWh.
pub const REG_ENERGY_KWH: u16 = 12;

/// Last fault code.
pub const REG_FAULT_CODE: u16 = 50;
/// Active warning code.
pub const REG_WARNING_CODE: u16 = 51;

/// First register of the batched status read.
pub const STATUS_BLOCK_START: u16 = REG_CONTROL_WORD;
/// Number of contiguous words in the batched status read.
pub const STATUS_BLOCK_LEN: u16 = 16;
/// First register of the fault/warning code read.
pub const CODES_BLOCK_START: u16 = REG_FAULT_CODE;
/// Number of words in the fault/warning code read.
pub const CODES_BLOCK_LEN: u16 = 2;

const_assert!(REG_ENERGY_KWH < STATUS_BLOCK_START + STATUS_BLOCK_LEN);
const_assert!(REG_WARNING_CODE == CODES_BLOCK_START + 1);

// ─── Control Word Bits ──────────────────────────────────────────────

/// Run (1) / stop (0).
pub const CW_BIT_RUN: u8 = 0;
/// Direction: 0 = forward, 1 = reverse.
pub const CW_BIT_DIRECTION: u8 = 1;
/// Fault reset.
pub const CW_BIT_FAULT_RESET: u8 = 2;
/// Emergency stop.
pub const CW_BIT_EMERGENCY_STOP: u8 = 3;
/// Remote (1) / local (0) control.
pub const CW_BIT_REMOTE: u8 = 4;

// ─── Status Word Bits ───────────────────────────────────────────────

/// Ready to run.
pub const SW_BIT_READY: u8 = 0;
/// Drive running.
pub const SW_BIT_RUNNING: u8 = 1;
/// Direction: 0 = forward, 1 = reverse.
pub const SW_BIT_DIRECTION: u8 = 2;
/// Fault active.
pub const SW_BIT_FAULT: u8 = 3;
/// Warning active.
pub const SW_BIT_WARNING: u8 = 4;
/// At reference speed.
pub const SW_BIT_AT_REFERENCE: u8 = 5;
/// Remote control active.
pub const SW_BIT_REMOTE: u8 = 6;

// ─── Scaling Divisors ───────────────────────────────────────────────

/// Frequency and speed reference (0.01 Hz).
pub const DIV_FREQUENCY: f64 = 100.0;
/// Current (0.1 A).
pub const DIV_CURRENT: f64 = 10.0;
/// Voltage (0.1 V).
pub const DIV_VOLTAGE: f64 = 10.0;
/// Power (0.1 kW).
pub const DIV_POWER: f64 = 10.0;
/// Motor speed (1 RPM).
pub const DIV_SPEED: f64 = 1.0;
/// Torque (0.1 %).
pub const DIV_TORQUE: f64 = 10.0;
/// DC bus voltage (1 V).
pub const DIV_DC_BUS: f64 = 1.0;
/// Temperature (0.1 °C).
pub const DIV_TEMPERATURE: f64 = 10.0;
/// Run hours (1 h).
pub const DIV_RUN_HOURS: f64 = 1.0;
/// Energy (0.1 kWh).
pub const DIV_ENERGY: f64 = 10.0;

/// Highest frequency the reference register can carry (65535 / 100).
pub const MAX_REFERENCE_HZ: f64 = u16::MAX as f64 / DIV_FREQUENCY;

// ─── Connection Defaults ────────────────────────────────────────────

/// Default Modbus TCP port.
pub const DEFAULT_PORT: u16 = 502;
/// Lowest valid unit id.
pub const MIN_UNIT_ID: u8 = 1;
/// Highest valid unit id.
pub const MAX_UNIT_ID: u8 = 247;
