//! Periodic state-dependent behaviour, as a pure function.
//!
//! [`step`] maps (machine status, settings, peripheral states, timers,
//! now) to the peripheral states and timers that should hold after one
//! loop iteration.  The [`Session`](super::session::Session) applies the
//! result to the real outputs.
//!
//! | Status      | Effect                                              |
//! |-------------|-----------------------------------------------------|
//! | ALARM       | flash lights (if enabled), force vacuum off         |
//! | RUN / JOG   | coolant on, coolant deadline = now + delay          |
//! | SLEEP       | lights and vacuum off                               |
//! | any         | coolant off once its deadline has passed            |

use crate::config::Settings;
use crate::status::MachineStatus;

/// On/off state of the three peripherals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Outputs {
    pub lights: bool,
    pub vacuum: bool,
    pub coolant: bool,
}

/// Deadlines in monotonic milliseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Timers {
    /// Next alarm-flash light transition.
    pub next_alarm_flash_ms: u64,
    /// Coolant switches off once `now` passes this.
    pub coolant_off_ms: u64,
}

impl Timers {
    /// Both deadlines at `now_ms`.
    pub fn starting_at(now_ms: u64) -> Self {
        Self {
            next_alarm_flash_ms: now_ms,
            coolant_off_ms: now_ms,
        }
    }
}

pub fn step(
    status: MachineStatus,
    settings: &Settings,
    mut outputs: Outputs,
    mut timers: Timers,
    now_ms: u64,
) -> (Outputs, Timers) {
    match status {
        MachineStatus::Sleep => {
            outputs.lights = false;
            outputs.vacuum = false;
        }
        MachineStatus::Alarm => {
            if settings.flash_on_alarm && timers.next_alarm_flash_ms < now_ms {
                // The phase about to start is the opposite of the current one.
                let phase_ms = if outputs.lights {
                    settings.alarm_flash_off_ms
                } else {
                    settings.alarm_flash_on_ms
                };
                timers.next_alarm_flash_ms = now_ms + u64::from(phase_ms);
                outputs.lights = !outputs.lights;
            }
            outputs.vacuum = false;
        }
        MachineStatus::Run | MachineStatus::Jog => {
            outputs.coolant = true;
            timers.coolant_off_ms = now_ms + u64::from(settings.coolant_off_delay_ms);
        }
        MachineStatus::Idle | MachineStatus::Door | MachineStatus::Check | MachineStatus::Hold => {}
    }

    if outputs.coolant && timers.coolant_off_ms < now_ms {
        outputs.coolant = false;
    }

    (outputs, timers)
}
