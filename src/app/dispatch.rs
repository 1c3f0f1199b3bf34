//! Command dispatch — the two paths a host line can take.
//!
//! - [`Session::handle_local_line`]: `/`-prefixed lines addressed to the
//!   relay.  Never forwarded.
//! - [`Session::intercept`]: every other line.  Machine codes trigger
//!   peripheral side effects while the line still goes to the controller;
//!   in simulation mode the first spindle start is cut out of the line.
//!
//! Both paths upper-case and split the line on spaces first, then act
//! token by token.

use embedded_hal::digital::OutputPin;
use log::{debug, warn};

use crate::drivers::peripheral::MSG_NLCR;
use crate::status::MachineStatus;
use crate::text::strip_chars;

use super::commands::{
    CHAR_LOCAL_COMMAND, CHAR_SPACE, CMD_CONFIG_QUERY, LocalCommand, MachineCode, tokenize,
};
use super::ports::{ConfigStore, HostSink};
use super::session::Session;

/// What to send to the controller for an intercepted line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Passthrough {
    /// Forward the line exactly as received.
    Original,
    /// Forward this text instead (no terminator).  May be empty.
    Rewritten(String),
}

impl<P: OutputPin> Session<P> {
    /// Run every token of a local command line.
    ///
    /// Failures (unknown key, storage) are reported to the host and do not
    /// stop the remaining tokens.
    pub fn handle_local_line(
        &mut self,
        line: &str,
        now_ms: u64,
        store: &mut impl ConfigStore,
        host: &mut impl HostSink,
    ) {
        let body = strip_chars(line, &['\n', '\r', CHAR_LOCAL_COMMAND]);
        for token in tokenize(&body) {
            let Some(command) = LocalCommand::parse(&token) else {
                debug!("local: ignoring token '{}'", token);
                continue;
            };
            match command {
                LocalCommand::ToggleLights => self.lights.toggle(host),
                LocalCommand::ToggleCoolant => {
                    self.coolant.toggle(host);
                    self.timers.coolant_off_ms =
                        now_ms + u64::from(self.settings.coolant_off_delay_ms);
                }
                LocalCommand::ToggleVacuum => {
                    if self.tracker.status() == MachineStatus::Alarm {
                        self.vacuum.disable(host);
                    } else {
                        self.vacuum.toggle(host);
                    }
                }
                LocalCommand::SaveConfig => self
                    .save_config(store, host)
                    .unwrap_or_else(|e| warn!("local: save not applied: {}", e)),
                LocalCommand::Set { key, value } => self
                    .apply_setting(&key, &value, host)
                    .unwrap_or_else(|e| warn!("local: {}={} not applied: {}", key, value, e)),
            }
        }
    }

    /// Inspect a line bound for the controller and apply its side effects.
    pub fn intercept(&mut self, line: &str, host: &mut impl HostSink) -> Passthrough {
        let body = strip_chars(line, &['\n', '\r']);
        let tokens = tokenize(&body);

        for (index, token) in tokens.iter().enumerate() {
            if token == CMD_CONFIG_QUERY {
                self.dump_config(host);
                continue;
            }
            let Some(code) = MachineCode::parse(token) else {
                continue;
            };
            match code {
                MachineCode::SpindleStartCw | MachineCode::SpindleStartCcw => {
                    let simulating = self.settings.simulation_mode;
                    if self.settings.vacuum_follows_router && !simulating {
                        self.vacuum.enable(host);
                    }
                    if self.settings.lights_follow_router {
                        self.lights.enable(host);
                    }
                    if simulating {
                        debug!("simulation: dropping '{}'", token);
                        return Passthrough::Rewritten(join_without(&tokens, index));
                    }
                }
                MachineCode::SpindleStop => {
                    if self.settings.vacuum_follows_router {
                        self.vacuum.disable(host);
                    }
                    if self.settings.lights_follow_router {
                        self.lights.disable(host);
                    }
                }
                MachineCode::ProgramPause | MachineCode::ToolChange => {
                    if self.settings.vacuum_follows_router {
                        self.vacuum.disable(host);
                    }
                }
                MachineCode::Other(_) => {}
            }
        }
        Passthrough::Original
    }

    fn dump_config(&self, host: &mut impl HostSink) {
        for (key, binding) in self.registry.iter() {
            let value = binding.slot().render(&self.settings);
            host.send(&format!(
                "{key}={value}   ({}){MSG_NLCR}",
                binding.description()
            ));
        }
    }
}

fn join_without(tokens: &[String], skip: usize) -> String {
    let mut out = String::new();
    for (i, token) in tokens.iter().enumerate() {
        if i == skip {
            continue;
        }
        if !out.is_empty() {
            out.push(CHAR_SPACE);
        }
        out.push_str(token);
    }
    out
}
