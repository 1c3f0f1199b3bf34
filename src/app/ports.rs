//! Port traits — the hexagonal boundary between relay logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ Session / Bridge (domain)
//! ```
//!
//! Driven adapters (UART links, the wireless module, NVS) implement these
//! traits.  The [`Bridge`](super::bridge::Bridge) and
//! [`Session`](super::session::Session) consume them via generics, so the
//! domain core never touches a UART or flash directly.
//!
//! Relay outputs are not a port of their own: they are plain
//! `embedded_hal::digital::OutputPin`s owned by
//! [`Peripheral`](crate::drivers::peripheral::Peripheral).

// ───────────────────────────────────────────────────────────────
// Host sink (domain → host computer)
// ───────────────────────────────────────────────────────────────

/// Text destined for the host computer on whichever link is active.
///
/// Notifications, config dumps and diagnostics all go through here.
pub trait HostSink {
    fn send(&mut self, text: &str);
}

/// Collects host output in memory.
impl HostSink for String {
    fn send(&mut self, text: &str) {
        self.push_str(text);
    }
}

// ───────────────────────────────────────────────────────────────
// Host links (two interchangeable byte streams)
// ───────────────────────────────────────────────────────────────

/// Which host link currently carries traffic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    /// Wireless serial module with a connected client.
    Wireless,
    /// Wired UART / USB serial.
    Wired,
}

/// Both host-facing byte streams plus the wireless presence signal.
pub trait HostPort {
    /// `true` while a client is connected on the wireless link.
    fn wireless_connected(&self) -> bool;

    /// Non-blocking read of already-available bytes.  Returns the count
    /// written into `buf` (0 when nothing is pending).
    fn read(&mut self, transport: Transport, buf: &mut [u8]) -> usize;

    /// Write bytes to the given link.  Failures are the adapter's to log.
    fn write(&mut self, transport: Transport, bytes: &[u8]);
}

// ───────────────────────────────────────────────────────────────
// Controller link (GRBL motion controller)
// ───────────────────────────────────────────────────────────────

pub trait ControllerPort {
    /// Non-blocking read of already-available bytes.
    fn read(&mut self, buf: &mut [u8]) -> usize;

    fn write(&mut self, bytes: &[u8]);
}

// ───────────────────────────────────────────────────────────────
// Config store (driven adapter: domain ↔ NVS / flash)
// ───────────────────────────────────────────────────────────────

/// Single persisted text blob holding `KEY=VALUE\n` lines.
///
/// Writes replace the whole blob; there is no append.
pub trait ConfigStore {
    fn read_config(&self) -> Result<String, StorageError>;

    fn write_config(&mut self, contents: &str) -> Result<(), StorageError>;
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`ConfigStore`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    /// The storage backend could not be initialised at boot.
    Unavailable,
    /// Nothing has been persisted yet.
    NotFound,
    /// Storage partition is full.
    Full,
    /// Stored blob is not valid text.
    Corrupted,
    /// Generic I/O error.
    IoError,
}

impl core::fmt::Display for StorageError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Unavailable => write!(f, "storage unavailable"),
            Self::NotFound => write!(f, "config not found"),
            Self::Full => write!(f, "storage full"),
            Self::Corrupted => write!(f, "config corrupted"),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}
