//! Register transport implementations.
//!
//! - [`tcp`] - Modbus TCP transport for real drives and gateways
//! - [`simulation`] - In-memory drive for development and testing
//!
//! # Adding New Transports
//!
//! 1. Create a new submodule under `transport/`
//! 2. Implement the `RegisterTransport` trait from `vfd_common::drive::transport`
//! 3. Re-export it from the crate root

pub mod simulation;
pub mod tcp;
