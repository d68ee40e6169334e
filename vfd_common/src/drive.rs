//! Drive register model.
//!
//! This module contains the register map of the drive, the pure codec
//! between raw register words and typed values, the decoded status
//! snapshot and the transport seam used by the protocol client.

pub mod codec;
pub mod consts;
pub mod transport;
pub mod types;
