//! UART links: the GRBL controller and the two host-facing streams.
//!
//! | Adapter                | Implements       | Connects to                 |
//! |------------------------|------------------|-----------------------------|
//! | [`UartControllerLink`] | `ControllerPort` | GRBL serial                 |
//! | [`UartHostLink`]       | `HostPort`       | USB-UART bridge + BT module |
//!
//! All reads use `NON_BLOCK`: the main loop only ever takes bytes that
//! are already in the driver's RX buffer.  The wireless module raises its
//! STATE pin while a client is paired and connected.

use esp_idf_hal::delay::NON_BLOCK;
use esp_idf_hal::gpio::{AnyInputPin, Input, PinDriver};
use esp_idf_hal::uart::UartDriver;
use log::warn;

use crate::app::ports::{ControllerPort, HostPort, Transport};

fn read_available(uart: &UartDriver<'_>, buf: &mut [u8], link: &str) -> usize {
    match uart.read(buf, NON_BLOCK) {
        Ok(n) => n,
        Err(e) => {
            warn!("{}: UART read failed: {}", link, e);
            0
        }
    }
}

fn write_all(uart: &UartDriver<'_>, mut bytes: &[u8], link: &str) {
    while !bytes.is_empty() {
        match uart.write(bytes) {
            Ok(0) => {
                warn!("{}: UART accepted no bytes, dropping {}", link, bytes.len());
                return;
            }
            Ok(n) => bytes = &bytes[n..],
            Err(e) => {
                warn!("{}: UART write failed: {}", link, e);
                return;
            }
        }
    }
}

// ── Controller ────────────────────────────────────────────────

pub struct UartControllerLink<'d> {
    uart: UartDriver<'d>,
}

impl<'d> UartControllerLink<'d> {
    pub fn new(uart: UartDriver<'d>) -> Self {
        Self { uart }
    }
}

impl ControllerPort for UartControllerLink<'_> {
    fn read(&mut self, buf: &mut [u8]) -> usize {
        read_available(&self.uart, buf, "grbl")
    }

    fn write(&mut self, bytes: &[u8]) {
        write_all(&self.uart, bytes, "grbl");
    }
}

// ── Host ──────────────────────────────────────────────────────

pub struct UartHostLink<'d> {
    wired: UartDriver<'d>,
    wireless: UartDriver<'d>,
    wireless_state: PinDriver<'d, AnyInputPin, Input>,
}

impl<'d> UartHostLink<'d> {
    pub fn new(
        wired: UartDriver<'d>,
        wireless: UartDriver<'d>,
        wireless_state: PinDriver<'d, AnyInputPin, Input>,
    ) -> Self {
        Self {
            wired,
            wireless,
            wireless_state,
        }
    }

    fn uart(&self, transport: Transport) -> (&UartDriver<'d>, &'static str) {
        match transport {
            Transport::Wireless => (&self.wireless, "bt"),
            Transport::Wired => (&self.wired, "usb"),
        }
    }
}

impl HostPort for UartHostLink<'_> {
    fn wireless_connected(&self) -> bool {
        self.wireless_state.is_high()
    }

    fn read(&mut self, transport: Transport, buf: &mut [u8]) -> usize {
        let (uart, link) = self.uart(transport);
        read_available(uart, buf, link)
    }

    fn write(&mut self, transport: Transport, bytes: &[u8]) {
        let (uart, link) = self.uart(transport);
        write_all(uart, bytes, link);
    }
}
