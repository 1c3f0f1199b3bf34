//! GPIO / UART assignments for the relay board (ESP32-S3).
//!
//! Single source of truth: `main` builds every driver from these numbers.
//! The ESP-IDF console stays on the USB-Serial-JTAG port, so the UARTs
//! below carry relayed traffic only.

// ---------------------------------------------------------------------------
// Relay outputs (active HIGH, opto-isolated relay module)
// ---------------------------------------------------------------------------

/// Dust extraction vacuum.
pub const VACUUM_RELAY_GPIO: i32 = 4;
/// Work lights; also flash during ALARM.
pub const LIGHTS_RELAY_GPIO: i32 = 5;
/// Spindle coolant fan.
pub const COOLANT_RELAY_GPIO: i32 = 6;

// ---------------------------------------------------------------------------
// Indicators
// ---------------------------------------------------------------------------

/// Lit while the wireless link carries host traffic.
pub const LINK_LED_GPIO: i32 = 2;

// ---------------------------------------------------------------------------
// Wired host (UART0 through the on-board USB-UART bridge)
// ---------------------------------------------------------------------------

pub const HOST_UART_TX_GPIO: i32 = 43;
pub const HOST_UART_RX_GPIO: i32 = 44;

// ---------------------------------------------------------------------------
// Wireless host (UART1 to an HC-05 class Bluetooth serial module)
// ---------------------------------------------------------------------------

pub const BT_UART_TX_GPIO: i32 = 17;
pub const BT_UART_RX_GPIO: i32 = 18;
/// Module STATE output: HIGH while a client is connected.
pub const BT_STATE_GPIO: i32 = 8;

// ---------------------------------------------------------------------------
// GRBL controller (UART2)
// ---------------------------------------------------------------------------

pub const GRBL_UART_TX_GPIO: i32 = 15;
pub const GRBL_UART_RX_GPIO: i32 = 16;

/// Baud rate shared by every link (GRBL default).
pub const UART_BAUD: u32 = 115_200;
