//! # VFD Control Unit Library
//!
//! Sequencing and supervision for one variable-frequency drive. A poll
//! cycle reads the drive status through `vfd_hal::DriveClient`, feeds it to
//! the control state machine, and reports alarms and data records to
//! injected collaborators.
//!
//! ## Modules
//!
//! - [`state`] - Drive states, transition table and the state machine
//! - [`cycle`] - `DriveApplication` and the poll cycle
//! - [`command`] - Operator command surface
//! - [`alarms`] - Edge-triggered threshold alarms
//! - [`publish`] - Throttled JSON data records
//! - [`annunciator`] - Operator notification seam
//!
//! ## Data Flow
//!
//! ```text
//! poll tick ──► DriveClient::read_status ──► ControlStateMachine::spin ──► entry effects
//!                                                   ▲                     (start/stop/e-stop)
//!                     operator commands ── latches ─┘
//! ```

pub mod alarms;
pub mod annunciator;
pub mod command;
pub mod cycle;
pub mod error;
pub mod publish;
pub mod state;

pub use crate::annunciator::{AlarmKind, AlertSeverity, Annunciator, LogAnnunciator};
pub use crate::cycle::{CycleReport, DriveApplication};
pub use crate::error::{CommandError, ControlError};
pub use crate::state::DriveState;
pub use crate::state::machine::{ControlStateMachine, DriveActions};
