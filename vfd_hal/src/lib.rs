//! # VFD HAL Library
//!
//! Protocol client for one variable-frequency drive, with pluggable
//! register transports.
//!
//! Transports implement the `RegisterTransport` trait defined in
//! `vfd_common::drive::transport`.
//!
//! # Module Structure
//!
//! - [`client`] - `DriveClient`: connection lifecycle, batched status reads, command writes
//! - [`transport`] - Transport implementations (Modbus TCP, simulation)
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        vfd_hal                               │
//! │  ┌──────────────┐    ┌──────────────┐    ┌────────────────┐  │
//! │  │ Register     │◄──►│ DriveClient  │◄──►│ RegisterTrans- │  │
//! │  │ codec        │    │ (status,     │    │ port (trait)   │  │
//! │  │ (vfd_common) │    │  commands)   │    │                │  │
//! │  └──────────────┘    └──────────────┘    └───────┬────────┘  │
//! │                                                  │           │
//! │                               ┌──────────────────┴───────┐   │
//! │                               ▼                          ▼   │
//! │                      ModbusTcpTransport        SimulatedDrive│
//! └──────────────────────────────────────────────────────────────┘
//! ```

#![deny(missing_docs)]

pub mod client;
pub mod transport;

pub use crate::client::{ConnectionState, DriveClient, FaultResetOutcome};
pub use crate::transport::simulation::SimulatedDrive;
pub use crate::transport::tcp::ModbusTcpTransport;
