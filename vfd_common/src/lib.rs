//! VFD Common Library
//!
//! This crate provides the register map, the register codec, the drive
//! status model and configuration loading utilities shared by all VFD
//! workspace crates.
//!
//! # Module Structure
//!
//! - [`drive`] - Register map constants, codec, status types and the transport seam
//! - [`config`] - Configuration loading traits and types
//! - [`clock`] - Monotonic clock abstraction (real and manual)
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```toml
//! [dependencies]
//! vfd_common = { workspace = true }
//! ```
//!
//! ```rust
//! use vfd_common::drive::codec::{has_bit, scaled};
//! use vfd_common::config::{ConfigLoader, SharedConfig};
//! ```

pub mod clock;
pub mod config;
pub mod drive;
pub mod prelude;
