//! Command vocabulary recognised by the relay.
//!
//! Two families:
//!
//! - [`LocalCommand`]: tokens from a `/`-prefixed host line, addressed to
//!   this firmware and never forwarded.
//! - [`MachineCode`]: `M` tokens inside lines bound for the controller,
//!   which the relay reacts to while still forwarding them.
//!
//! GRBL's single-byte realtime commands are listed here too; they bypass
//! line handling entirely.

use crate::settings::parse_lenient_int;
use crate::text::{contains_any, split, strip_chars};

/// Prefix marking a host line as a local command.
pub const CHAR_LOCAL_COMMAND: char = '/';
/// Prefix of a machine code token (`M3`, `M05`, ...).
pub const CHAR_CMD_MACHINE: char = 'M';
pub const CHAR_EQUALS: char = '=';
pub const CHAR_SPACE: char = ' ';

pub const CMD_LIGHTS: &str = "L";
pub const CMD_COOLER: &str = "C";
pub const CMD_VACUUM: &str = "V";
pub const CMD_SAVE_CONFIG: &str = "S";
/// Settings dump; GRBL answers it too, so it is still forwarded.
pub const CMD_CONFIG_QUERY: &str = "$$";

// --- GRBL realtime bytes (act immediately, never part of a line) ---

pub const RT_STATUS_REPORT: u8 = b'?';
pub const RT_FEED_HOLD: u8 = b'!';
pub const RT_CYCLE_START: u8 = b'~';
pub const RT_SOFT_RESET: u8 = 0x18;

/// `true` for bytes the controller interprets on arrival: the single-char
/// commands above and every extended (>= 0x80) override byte.
pub fn is_realtime(byte: u8) -> bool {
    matches!(
        byte,
        RT_STATUS_REPORT | RT_FEED_HOLD | RT_CYCLE_START | RT_SOFT_RESET
    ) || byte >= 0x80
}

/// A single upper-cased token from a local command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocalCommand {
    ToggleLights,
    ToggleCoolant,
    ToggleVacuum,
    SaveConfig,
    /// `KEY=VALUE`: update a registered setting.
    Set { key: String, value: String },
}

impl LocalCommand {
    /// Interpret one upper-cased token.  `None` for tokens that are ignored.
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            CMD_LIGHTS => Some(Self::ToggleLights),
            CMD_COOLER => Some(Self::ToggleCoolant),
            CMD_VACUUM => Some(Self::ToggleVacuum),
            CMD_SAVE_CONFIG => Some(Self::SaveConfig),
            _ if contains_any(token, &[CHAR_EQUALS]) => {
                let mut parts = split(token, &[CHAR_EQUALS]).into_iter();
                match (parts.next(), parts.next()) {
                    (Some(key), Some(value)) => Some(Self::Set { key, value }),
                    _ => None,
                }
            }
            _ => None,
        }
    }
}

/// Split a line into upper-cased whitespace-separated tokens.
pub fn tokenize(line: &str) -> Vec<String> {
    split(line, &[CHAR_SPACE])
        .into_iter()
        .map(|t| t.to_ascii_uppercase())
        .collect()
}

/// M-codes the relay reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MachineCode {
    /// M0: program pause (produces a hold).
    ProgramPause,
    /// M3: spindle on, clockwise.
    SpindleStartCw,
    /// M4: spindle on, counter-clockwise.
    SpindleStartCcw,
    /// M5: spindle off, usually end of job.
    SpindleStop,
    /// M6: tool change.
    ToolChange,
    Other(i64),
}

impl MachineCode {
    /// Parse an upper-cased token starting with `M`.
    ///
    /// Every `M` is removed and the rest parsed leniently, so `M03` is 3,
    /// `M3S1000` is 3 and a bare `M` is 0.  `None` if the token is not a
    /// machine code at all.
    pub fn parse(token: &str) -> Option<Self> {
        if !token.starts_with(CHAR_CMD_MACHINE) {
            return None;
        }
        let code = parse_lenient_int(&strip_chars(token, &[CHAR_CMD_MACHINE]));
        Some(match code {
            0 => Self::ProgramPause,
            3 => Self::SpindleStartCw,
            4 => Self::SpindleStartCcw,
            5 => Self::SpindleStop,
            6 => Self::ToolChange,
            other => Self::Other(other),
        })
    }
}
