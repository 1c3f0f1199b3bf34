//! Machine status tracking from controller output.
//!
//! The tracker taps every line the controller sends towards the host and
//! keeps the last known [`MachineStatus`].  It never alters or swallows
//! traffic.
//!
//! Classification, in order:
//!
//! 1. `<...>` status report: strip the brackets, split on `|`, and take the
//!    first character of the first section as the state code.
//! 2. Anything that is neither `<...>` nor `[...]`: split on `:`; only an
//!    `A` in first position is acted on (e.g. `ALARM:1`).
//! 3. `[...]` feedback: ignored.

use log::debug;

use crate::text::{split, starts_with_any, strip_chars};

pub const CHAR_MESSAGE_BEGIN: char = '<';
pub const CHAR_MESSAGE_END: char = '>';
pub const CHAR_FEEDBACK_BEGIN: char = '[';
/// Separates status report sections.
pub const CHAR_VERTICAL: char = '|';
/// Separates a field name from its data.
pub const CHAR_COLON: char = ':';

/// Controller state as reported in the first letter of a status word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MachineStatus {
    Alarm,
    Idle,
    Run,
    Jog,
    Door,
    Check,
    /// Feed hold; also `Home`, which shares the leading `H`.
    Hold,
    Sleep,
}

impl MachineStatus {
    pub fn from_code(code: char) -> Option<Self> {
        match code {
            'A' => Some(Self::Alarm),
            'I' => Some(Self::Idle),
            'R' => Some(Self::Run),
            'J' => Some(Self::Jog),
            'D' => Some(Self::Door),
            'C' => Some(Self::Check),
            'H' => Some(Self::Hold),
            'S' => Some(Self::Sleep),
            _ => None,
        }
    }

    pub fn code(self) -> char {
        match self {
            Self::Alarm => 'A',
            Self::Idle => 'I',
            Self::Run => 'R',
            Self::Jog => 'J',
            Self::Door => 'D',
            Self::Check => 'C',
            Self::Hold => 'H',
            Self::Sleep => 'S',
        }
    }
}

pub struct StatusTracker {
    status: MachineStatus,
}

impl Default for StatusTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusTracker {
    /// Starts in [`MachineStatus::Idle`].
    pub fn new() -> Self {
        Self {
            status: MachineStatus::Idle,
        }
    }

    pub fn status(&self) -> MachineStatus {
        self.status
    }

    pub fn set(&mut self, status: MachineStatus) {
        if status != self.status {
            debug!("status: {:?} -> {:?}", self.status, status);
        }
        self.status = status;
    }

    /// Classify one controller message and update the tracked status.
    ///
    /// Returns the status in effect afterwards.  An unrecognised state code
    /// leaves the previous status in place.
    pub fn observe(&mut self, msg: &str) -> MachineStatus {
        if starts_with_any(msg, &[CHAR_MESSAGE_BEGIN]) {
            let body = strip_chars(msg, &[CHAR_MESSAGE_BEGIN, CHAR_MESSAGE_END]);
            let sections = split(&body, &[CHAR_VERTICAL]);
            if let Some(code) = sections.first().and_then(|s| s.chars().next()) {
                match MachineStatus::from_code(code) {
                    Some(status) => self.set(status),
                    None => debug!("status: unknown state code {:?}", code),
                }
            }
        } else if !starts_with_any(msg, &[CHAR_FEEDBACK_BEGIN]) {
            let fields = split(msg, &[CHAR_COLON]);
            let first = fields.first().and_then(|f| f.chars().next());
            if first == Some(MachineStatus::Alarm.code()) {
                self.set(MachineStatus::Alarm);
            }
        }
        self.status
    }
}
