//! Application core — relay logic, zero direct I/O.
//!
//! Command vocabulary, dispatch, the periodic tick and the per-iteration
//! bridge loop.  All interaction with UARTs and flash happens through the
//! **port traits** in [`ports`]; relays are plain `OutputPin`s.  The whole
//! layer runs on the host against mock adapters.

pub mod bridge;
pub mod commands;
pub mod dispatch;
pub mod line_buffer;
pub mod ports;
pub mod session;
pub mod tick;
