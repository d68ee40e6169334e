//! Register codec.
//!
//! Pure, side-effect-free translation between raw 16-bit register words
//! and domain values: bit-field extraction, fixed-point scaling, control
//! word encoding and status block decoding.

use crate::drive::consts::*;
use crate::drive::types::{ControlFlags, ControlWord, DriveStatus, StatusWord};
use thiserror::Error;

/// Error decoding a register block.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The device returned fewer words than the block layout needs.
    #[error("Register block too short: expected {expected} words, got {actual}")]
    ShortBlock { expected: usize, actual: usize },
}

/// True iff bit `bit` of `word` is set. Bits past 15 read as clear.
#[inline]
pub const fn has_bit(word: u16, bit: u8) -> bool {
    match word.checked_shr(bit as u32) {
        Some(shifted) => shifted & 1 == 1,
        None => false,
    }
}

/// Scale a raw register word by its fixed decimal divisor.
#[inline]
pub fn scaled(raw: u16, divisor: f64) -> f64 {
    raw as f64 / divisor
}

/// Encode desired control flags into a control word.
///
/// Unset `run` / `direction_forward` leave their bits cleared. The
/// direction bit is the reverse bit and is set only for
/// `direction_forward == Some(false)`.
pub fn encode_control(flags: &ControlFlags) -> u16 {
    let mut word = ControlWord::empty();
    word.set(ControlWord::RUN, flags.run == Some(true));
    word.set(ControlWord::REVERSE, flags.direction_forward == Some(false));
    word.set(ControlWord::FAULT_RESET, flags.fault_reset);
    word.set(ControlWord::EMERGENCY_STOP, flags.emergency_stop);
    word.set(ControlWord::REMOTE, flags.remote);
    word.bits()
}

/// Decode a control word back into explicit flags.
///
/// Bits outside the defined set are ignored.
pub fn decode_control(word: u16) -> ControlFlags {
    ControlFlags {
        run: Some(has_bit(word, CW_BIT_RUN)),
        direction_forward: Some(!has_bit(word, CW_BIT_DIRECTION)),
        fault_reset: has_bit(word, CW_BIT_FAULT_RESET),
        emergency_stop: has_bit(word, CW_BIT_EMERGENCY_STOP),
        remote: has_bit(word, CW_BIT_REMOTE),
    }
}

/// Encode a frequency in Hz into the reference register (0.01 Hz units).
///
/// Out-of-range values are clamped to [0, 655.35] Hz; NaN encodes as 0.
pub fn encode_reference(frequency_hz: f64) -> u16 {
    if frequency_hz.is_nan() {
        return 0;
    }
    let raw = (frequency_hz * DIV_FREQUENCY).round();
    raw.clamp(0.0, u16::MAX as f64) as u16
}

/// Decode a status block read from [`STATUS_BLOCK_START`] together with the
/// fault and warning codes.
///
/// # Errors
/// Returns `DecodeError::ShortBlock` if `block` does not reach the last
/// measurement register.
pub fn decode_status(
    block: &[u16],
    fault_code: u16,
    warning_code: u16,
) -> Result<DriveStatus, DecodeError> {
    let expected = (REG_ENERGY_KWH - STATUS_BLOCK_START) as usize + 1;
    if block.len() < expected {
        return Err(DecodeError::ShortBlock {
            expected,
            actual: block.len(),
        });
    }

    let reg = |offset: u16| block[(offset - STATUS_BLOCK_START) as usize];
    let word = StatusWord::from_bits_truncate(reg(REG_STATUS_WORD));

    Ok(DriveStatus {
        ready: word.contains(StatusWord::READY),
        running: word.contains(StatusWord::RUNNING),
        direction_forward: !word.contains(StatusWord::REVERSE),
        fault: word.contains(StatusWord::FAULT),
        warning: word.contains(StatusWord::WARNING),
        at_reference: word.contains(StatusWord::AT_REFERENCE),
        remote_control: word.contains(StatusWord::REMOTE),

        speed_reference_hz: scaled(reg(REG_REFERENCE), DIV_FREQUENCY),
        output_frequency_hz: scaled(reg(REG_OUTPUT_FREQUENCY), DIV_FREQUENCY),
        output_current_a: scaled(reg(REG_OUTPUT_CURRENT), DIV_CURRENT),
        output_voltage_v: scaled(reg(REG_OUTPUT_VOLTAGE), DIV_VOLTAGE),
        output_power_kw: scaled(reg(REG_OUTPUT_POWER), DIV_POWER),
        motor_speed_rpm: scaled(reg(REG_MOTOR_SPEED), DIV_SPEED),
        motor_torque_pct: scaled(reg(REG_MOTOR_TORQUE), DIV_TORQUE),
        dc_bus_voltage_v: scaled(reg(REG_DC_BUS_VOLTAGE), DIV_DC_BUS),
        drive_temperature_c: scaled(reg(REG_DRIVE_TEMPERATURE), DIV_TEMPERATURE),
        run_hours: scaled(reg(REG_RUN_HOURS), DIV_RUN_HOURS),
        energy_kwh: scaled(reg(REG_ENERGY_KWH), DIV_ENERGY),

        fault_code,
        warning_code,
    })
}
