//! Integration test modules.

pub mod commands;
pub mod monitoring;
pub mod sequencing;
pub mod support;
