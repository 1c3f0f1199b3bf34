//! Actuator drivers.

pub mod peripheral;
