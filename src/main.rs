//! CNC relay firmware — main entry point.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    Adapters (outer ring)                     │
//! │                                                              │
//! │  UartHostLink      UartControllerLink   NvsConfigStore       │
//! │  (HostPort)        (ControllerPort)     (ConfigStore)        │
//! │  PinDriver ×4 (OutputPin)               MonotonicClock       │
//! │                                                              │
//! │  ──────────────── Port Trait Boundary ─────────────────      │
//! │                                                              │
//! │  ┌────────────────────────────────────────────────────────┐  │
//! │  │  Bridge ─▶ Session (pure logic)                        │  │
//! │  │  Status · Dispatch · Settings · Tick                   │  │
//! │  └────────────────────────────────────────────────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use esp_idf_hal::delay::FreeRtos;
use esp_idf_hal::gpio::{AnyIOPin, AnyInputPin, AnyOutputPin, PinDriver};
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_hal::uart::{UartDriver, config::Config as UartConfig};
use esp_idf_hal::units::Hertz;
use log::{info, warn};

use cncrelay::adapters::nvs::NvsConfigStore;
use cncrelay::adapters::time::MonotonicClock;
use cncrelay::adapters::uart::{UartControllerLink, UartHostLink};
use cncrelay::app::bridge::Bridge;
use cncrelay::app::session::Session;
use cncrelay::pins;

/// Yield to FreeRTOS between iterations so the idle task can feed the
/// task watchdog.
const LOOP_YIELD_MS: u32 = 1;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  CncRelay v{}                      ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    let peripherals = Peripherals::take()?;
    let clock = MonotonicClock::new();

    // ── 2. Relay outputs + link LED ───────────────────────────
    // SAFETY: each GPIO number is claimed exactly once, here, and nothing
    // else in the firmware touches these pins.
    let (vacuum, lights, coolant, link_led) = unsafe {
        (
            PinDriver::output(AnyOutputPin::new(pins::VACUUM_RELAY_GPIO))?,
            PinDriver::output(AnyOutputPin::new(pins::LIGHTS_RELAY_GPIO))?,
            PinDriver::output(AnyOutputPin::new(pins::COOLANT_RELAY_GPIO))?,
            PinDriver::output(AnyOutputPin::new(pins::LINK_LED_GPIO))?,
        )
    };

    // ── 3. Serial links ───────────────────────────────────────
    let uart_config = UartConfig::default().baudrate(Hertz(pins::UART_BAUD));
    // SAFETY: as above; UART pins are not shared with any other driver.
    let (wired, wireless, grbl, bt_state) = unsafe {
        (
            UartDriver::new(
                peripherals.uart0,
                AnyIOPin::new(pins::HOST_UART_TX_GPIO),
                AnyIOPin::new(pins::HOST_UART_RX_GPIO),
                Option::<AnyIOPin>::None,
                Option::<AnyIOPin>::None,
                &uart_config,
            )?,
            UartDriver::new(
                peripherals.uart1,
                AnyIOPin::new(pins::BT_UART_TX_GPIO),
                AnyIOPin::new(pins::BT_UART_RX_GPIO),
                Option::<AnyIOPin>::None,
                Option::<AnyIOPin>::None,
                &uart_config,
            )?,
            UartDriver::new(
                peripherals.uart2,
                AnyIOPin::new(pins::GRBL_UART_TX_GPIO),
                AnyIOPin::new(pins::GRBL_UART_RX_GPIO),
                Option::<AnyIOPin>::None,
                Option::<AnyIOPin>::None,
                &uart_config,
            )?,
            PinDriver::input(AnyInputPin::new(pins::BT_STATE_GPIO))?,
        )
    };
    let mut host = UartHostLink::new(wired, wireless, bt_state);
    let mut controller = UartControllerLink::new(grbl);

    // ── 4. Persistent settings ────────────────────────────────
    let mut store = NvsConfigStore::new().unwrap_or_else(|e| {
        warn!("NVS init failed ({}), settings will not persist", e);
        NvsConfigStore::unavailable()
    });

    // ── 5. Relay core ─────────────────────────────────────────
    let session = Session::new(vacuum, lights, coolant, clock.uptime_ms());
    let mut bridge = Bridge::new(session, link_led);
    bridge.start(&mut host, &store);

    info!("System ready. Entering relay loop.");

    // ── 6. Relay loop ─────────────────────────────────────────
    loop {
        bridge.poll(&mut host, &mut controller, &mut store, clock.uptime_ms());
        FreeRtos::delay_ms(LOOP_YIELD_MS);
    }
}
