//! Simulated drive transport.
//!
//! An in-memory register bank that behaves like a drive on the far side of
//! the wire: it reacts to the control word, ramps output frequency toward
//! the reference on every status read and derives the measurement
//! registers from the frequency. Faults, exception responses and loss of
//! the link can be injected for testing.

use tracing::{debug, info, warn};
use vfd_common::drive::codec::{encode_reference, has_bit};
use vfd_common::drive::consts::*;
use vfd_common::drive::transport::{LinkError, RegisterTransport};
use vfd_common::drive::types::StatusWord;

/// Size of the simulated register bank.
const REGISTER_COUNT: usize = 64;

/// Nominal motor frequency the measurement model is scaled against.
const NOMINAL_HZ: f64 = 50.0;

/// Simulated drive behind a register transport.
pub struct SimulatedDrive {
    registers: [u16; REGISTER_COUNT],
    online: bool,
    connected: bool,
    pending_exception: Option<String>,

    ready: bool,
    fault: bool,
    emergency_latched: bool,
    run_command: bool,
    run_inhibit: bool,
    reverse: bool,
    remote: bool,
    frequency_hz: f64,
    ramp_step_hz: f64,

    writes: Vec<(u16, u16)>,
}

impl SimulatedDrive {
    /// Create an online, ready, stopped drive that ramps 10 Hz per read.
    pub fn new() -> Self {
        let mut drive = Self {
            registers: [0; REGISTER_COUNT],
            online: true,
            connected: false,
            pending_exception: None,
            ready: true,
            fault: false,
            emergency_latched: false,
            run_command: false,
            run_inhibit: false,
            reverse: false,
            remote: false,
            frequency_hz: 0.0,
            ramp_step_hz: 10.0,
            writes: Vec::new(),
        };
        drive.refresh_registers();
        drive
    }

    /// Set how far output frequency moves per status read.
    pub fn with_ramp_step(mut self, step_hz: f64) -> Self {
        self.ramp_step_hz = step_hz.max(0.0);
        self
    }

    /// Take the link up or down. Going down drops any open session.
    pub fn set_online(&mut self, online: bool) {
        self.online = online;
        if !online {
            self.connected = false;
        }
    }

    /// Answer the next request with an exception response.
    pub fn fail_next_request(&mut self, exception: &str) {
        self.pending_exception = Some(exception.to_string());
    }

    /// Trip the drive with the given fault code.
    pub fn inject_fault(&mut self, code: u16) {
        warn!("Simulated drive fault {}", code);
        self.fault = true;
        self.ready = false;
        self.run_command = false;
        self.frequency_hz = 0.0;
        self.registers[REG_FAULT_CODE as usize] = code;
        self.refresh_registers();
    }

    /// Force the ready bit (e.g. to emulate a drive that is not ready).
    pub fn set_ready(&mut self, ready: bool) {
        self.ready = ready;
        self.refresh_registers();
    }

    /// Ignore run commands while staying ready, as with a missing run enable.
    pub fn set_run_inhibit(&mut self, inhibit: bool) {
        self.run_inhibit = inhibit;
        if inhibit {
            self.run_command = false;
        }
        self.refresh_registers();
    }

    /// Raw register value.
    pub fn register(&self, address: u16) -> u16 {
        self.registers
            .get(address as usize)
            .copied()
            .unwrap_or_default()
    }

    /// Overwrite a raw register (measurement override for tests).
    pub fn set_register(&mut self, address: u16, value: u16) {
        if let Some(slot) = self.registers.get_mut(address as usize) {
            *slot = value;
        }
    }

    /// Every accepted write, in order.
    pub fn writes(&self) -> &[(u16, u16)] {
        &self.writes
    }

    /// Control words written so far, in order.
    pub fn control_writes(&self) -> Vec<u16> {
        self.writes
            .iter()
            .filter(|(addr, _)| *addr == REG_CONTROL_WORD)
            .map(|(_, value)| *value)
            .collect()
    }

    /// True while a session is open.
    pub fn is_connected(&self) -> bool {
        self.connected
    }

    fn check_link(&mut self) -> Result<(), LinkError> {
        if !self.online {
            self.connected = false;
            return Err(LinkError::Transport("simulated link down".to_string()));
        }
        if !self.connected {
            return Err(LinkError::NotConnected);
        }
        if let Some(exception) = self.pending_exception.take() {
            return Err(LinkError::Exception(exception));
        }
        Ok(())
    }

    fn apply_control_word(&mut self, word: u16) {
        if has_bit(word, CW_BIT_EMERGENCY_STOP) {
            if !self.emergency_latched {
                warn!("Simulated drive emergency stop");
            }
            self.emergency_latched = true;
            self.run_command = false;
            self.frequency_hz = 0.0;
        } else {
            self.emergency_latched = false;
        }

        if has_bit(word, CW_BIT_FAULT_RESET) && self.fault {
            info!("Simulated drive fault reset");
            self.fault = false;
            self.ready = true;
            self.registers[REG_FAULT_CODE as usize] = 0;
        }

        let run = has_bit(word, CW_BIT_RUN);
        self.run_command =
            run && self.ready && !self.fault && !self.emergency_latched && !self.run_inhibit;
        self.reverse = has_bit(word, CW_BIT_DIRECTION);
        self.remote = has_bit(word, CW_BIT_REMOTE);
        self.refresh_registers();
    }

    /// Advance the ramp by one step.
    fn tick(&mut self) {
        let target = if self.run_command {
            self.register(REG_REFERENCE) as f64 / DIV_FREQUENCY
        } else {
            0.0
        };
        let delta = target - self.frequency_hz;
        if delta.abs() <= self.ramp_step_hz {
            self.frequency_hz = target;
        } else {
            self.frequency_hz += self.ramp_step_hz.copysign(delta);
        }
        self.refresh_registers();
    }

    fn refresh_registers(&mut self) {
        let running = self.run_command || self.frequency_hz > 0.0;
        let reference = self.register(REG_REFERENCE) as f64 / DIV_FREQUENCY;
        let at_reference =
            running && self.run_command && (self.frequency_hz - reference).abs() < f64::EPSILON;

        let mut word = StatusWord::empty();
        word.set(
            StatusWord::READY,
            self.ready && !self.fault && !self.emergency_latched,
        );
        word.set(StatusWord::RUNNING, running);
        word.set(StatusWord::REVERSE, self.reverse);
        word.set(StatusWord::FAULT, self.fault);
        word.set(StatusWord::AT_REFERENCE, at_reference);
        word.set(StatusWord::REMOTE, self.remote);
        self.registers[REG_STATUS_WORD as usize] = word.bits();

        let load = (self.frequency_hz / NOMINAL_HZ).clamp(0.0, 2.0);
        let voltage_v = 400.0 * load;
        let current_a = if running { 2.0 + 18.0 * load } else { 0.0 };
        let power_kw = 3f64.sqrt() * voltage_v * current_a * 0.85 / 1000.0;

        self.registers[REG_OUTPUT_FREQUENCY as usize] = encode_reference(self.frequency_hz);
        self.registers[REG_OUTPUT_CURRENT as usize] = scale_up(current_a, DIV_CURRENT);
        self.registers[REG_OUTPUT_VOLTAGE as usize] = scale_up(voltage_v, DIV_VOLTAGE);
        self.registers[REG_OUTPUT_POWER as usize] = scale_up(power_kw, DIV_POWER);
        self.registers[REG_MOTOR_SPEED as usize] = scale_up(1450.0 * load, DIV_SPEED);
        self.registers[REG_MOTOR_TORQUE as usize] =
            scale_up(if running { 75.0 } else { 0.0 }, DIV_TORQUE);
        self.registers[REG_DC_BUS_VOLTAGE as usize] = scale_up(560.0, DIV_DC_BUS);
        self.registers[REG_DRIVE_TEMPERATURE as usize] =
            scale_up(35.0 + 15.0 * load, DIV_TEMPERATURE);
    }
}

impl Default for SimulatedDrive {
    fn default() -> Self {
        Self::new()
    }
}

fn scale_up(value: f64, divisor: f64) -> u16 {
    (value * divisor).round().clamp(0.0, u16::MAX as f64) as u16
}

impl RegisterTransport for SimulatedDrive {
    fn name(&self) -> &'static str {
        "simulation"
    }

    async fn connect(&mut self) -> Result<(), LinkError> {
        if !self.online {
            return Err(LinkError::Transport("simulated link down".to_string()));
        }
        self.connected = true;
        debug!("Simulated drive session open");
        Ok(())
    }

    async fn disconnect(&mut self) {
        self.connected = false;
    }

    async fn read_holding_registers(
        &mut self,
        address: u16,
        count: u16,
    ) -> Result<Vec<u16>, LinkError> {
        self.check_link()?;
        let start = address as usize;
        let end = start + count as usize;
        if end > REGISTER_COUNT {
            return Err(LinkError::Exception("IllegalDataAddress".to_string()));
        }
        if address == STATUS_BLOCK_START {
            self.tick();
        }
        Ok(self.registers[start..end].to_vec())
    }

    async fn write_single_register(&mut self, address: u16, value: u16) -> Result<(), LinkError> {
        self.check_link()?;
        match address {
            REG_CONTROL_WORD => {
                self.registers[REG_CONTROL_WORD as usize] = value;
                self.apply_control_word(value);
            }
            REG_REFERENCE => {
                self.registers[REG_REFERENCE as usize] = value;
                self.refresh_registers();
            }
            _ => return Err(LinkError::Exception("IllegalDataAddress".to_string())),
        }
        self.writes.push((address, value));
        Ok(())
    }
}
