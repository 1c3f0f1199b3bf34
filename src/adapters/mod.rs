//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter | Implements       | Connects to                  |
//! |---------|------------------|------------------------------|
//! | `nvs`   | ConfigStore      | NVS / in-memory store        |
//! | `time`  | (clock)          | ESP32 system timer           |
//! | `uart`  | HostPort         | USB-UART bridge, BT module   |
//! |         | ControllerPort   | GRBL serial                  |

pub mod nvs;
pub mod time;
#[cfg(target_os = "espidf")]
pub mod uart;
