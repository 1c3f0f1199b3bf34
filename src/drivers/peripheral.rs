//! Relay-switched auxiliary peripheral (vacuum, work lights, coolant fan).
//!
//! A peripheral is a single digital output plus a name.  Every transition
//! is idempotent: enabling an enabled peripheral does nothing, and only a
//! real change reaches the pin and produces a host notification.
//!
//! ## Dual-target design
//!
//! The pin is any `embedded_hal::digital::OutputPin`.  On ESP-IDF it is a
//! `PinDriver`; on host/test it is a mock that records levels.

use embedded_hal::digital::OutputPin;
use log::warn;

use crate::app::ports::HostSink;

pub const MSG_ENABLE: &str = "Enabling ";
pub const MSG_DISABLE: &str = "Disabling ";
/// Line terminator for every host-visible message.
pub const MSG_NLCR: &str = "\n\r";

pub struct Peripheral<P> {
    pin: P,
    name: &'static str,
    enabled: bool,
}

impl<P: OutputPin> Peripheral<P> {
    /// Take ownership of `pin` and drive it low.
    pub fn new(mut pin: P, name: &'static str) -> Self {
        if let Err(e) = pin.set_low() {
            warn!("{}: initial pin write failed: {:?}", name, e);
        }
        Self {
            pin,
            name,
            enabled: false,
        }
    }

    pub fn enable(&mut self, host: &mut impl HostSink) {
        if self.enabled {
            return;
        }
        if let Err(e) = self.pin.set_high() {
            warn!("{}: enable failed: {:?}", self.name, e);
            return;
        }
        self.enabled = true;
        host.send(&format!("{MSG_ENABLE}{}{MSG_NLCR}", self.name));
    }

    pub fn disable(&mut self, host: &mut impl HostSink) {
        if !self.enabled {
            return;
        }
        if let Err(e) = self.pin.set_low() {
            warn!("{}: disable failed: {:?}", self.name, e);
            return;
        }
        self.enabled = false;
        host.send(&format!("{MSG_DISABLE}{}{MSG_NLCR}", self.name));
    }

    pub fn toggle(&mut self, host: &mut impl HostSink) {
        if self.enabled {
            self.disable(host);
        } else {
            self.enable(host);
        }
    }

    /// Drive to `on`, with the same idempotence as enable/disable.
    pub fn set(&mut self, on: bool, host: &mut impl HostSink) {
        if on {
            self.enable(host);
        } else {
            self.disable(host);
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Borrow the underlying pin (used by tests to inspect mock levels).
    pub fn pin(&self) -> &P {
        &self.pin
    }
}
