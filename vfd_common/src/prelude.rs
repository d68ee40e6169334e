//! Prelude module for common re-exports.
//!
//! ```rust
//! use vfd_common::prelude::*;
//! ```

// ─── Logging ────────────────────────────────────────────────────────
pub use crate::config::LogLevel;

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{
    AlarmThresholds, ConfigError, ConfigLoader, ConnectionConfig, DriveAppConfig, LoadConfig,
    MonitoringConfig, OperatingLimits, SharedConfig,
};

// ─── Drive ──────────────────────────────────────────────────────────
pub use crate::drive::codec::{decode_status, encode_control, encode_reference, has_bit, scaled};
pub use crate::drive::transport::{LinkError, RegisterTransport};
pub use crate::drive::types::{ControlFlags, DriveStatus, fault_description};

// ─── Time ───────────────────────────────────────────────────────────
pub use crate::clock::{Clock, ManualClock, SystemClock};
