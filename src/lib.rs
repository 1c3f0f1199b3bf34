//! CNC relay firmware library.
//!
//! Exposes the pure-logic modules for integration testing and fuzzing.
//! All ESP-IDF-specific code is guarded by `#[cfg(target_os = "espidf")]`
//! within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod error;
pub mod settings;
pub mod status;
pub mod text;

pub mod adapters;
pub mod drivers;
pub mod pins;
