//! Session — the relay's explicit context object.
//!
//! [`Session`] owns everything the dispatcher and the periodic tick read
//! or mutate: the live [`Settings`] and their registry, the tracked
//! machine status, the three peripherals and the two deadlines.  All I/O
//! flows through port traits passed in at call sites, so a session runs
//! unchanged against mock pins and an in-memory store.
//!
//! ```text
//!  controller lines ──▶ ┌──────────────────────────────┐ ──▶ HostSink
//!  host lines       ──▶ │  Session                     │
//!                       │  Settings · Status · Timers  │ ──▶ OutputPin ×3
//!  ConfigStore     ◀──▶ └──────────────────────────────┘
//! ```
//!
//! The local-command and pass-through paths live in
//! [`dispatch`](super::dispatch).

use embedded_hal::digital::OutputPin;
use log::{info, warn};

use crate::config::Settings;
use crate::drivers::peripheral::{MSG_NLCR, Peripheral};
use crate::error::Result;
use crate::settings::{LoadReport, SettingsRegistry};
use crate::status::{MachineStatus, StatusTracker};

use super::ports::{ConfigStore, HostSink};
use super::tick::{self, Outputs, Timers};

pub const PERIPHERAL_VACUUM: &str = "Vacuum";
pub const PERIPHERAL_LIGHTS: &str = "Lights";
pub const PERIPHERAL_COOLER: &str = "Cooler";

pub const MSG_CONFIG_LOADED: &str = "Configuration loaded.";
pub const MSG_CONFIG_LOAD_FAILED: &str = "Failed to load configuration.";
pub const MSG_CONFIG_SAVED: &str = "Configuration saved.";
pub const MSG_CONFIG_SAVE_FAILED: &str = "Failed to save configuration.";
pub const MSG_SETTING_NOT_FOUND: &str = "Could not find setting: ";

pub struct Session<P> {
    pub(super) settings: Settings,
    pub(super) registry: SettingsRegistry<Settings>,
    pub(super) tracker: StatusTracker,
    pub(super) vacuum: Peripheral<P>,
    pub(super) lights: Peripheral<P>,
    pub(super) coolant: Peripheral<P>,
    pub(super) timers: Timers,
}

impl<P: OutputPin> Session<P> {
    /// Build a session with compiled-in defaults, status IDLE and both
    /// deadlines at `now_ms`.  Every peripheral starts off.
    pub fn new(vacuum_pin: P, lights_pin: P, coolant_pin: P, now_ms: u64) -> Self {
        Self {
            settings: Settings::default(),
            registry: Settings::registry(),
            tracker: StatusTracker::new(),
            vacuum: Peripheral::new(vacuum_pin, PERIPHERAL_VACUUM),
            lights: Peripheral::new(lights_pin, PERIPHERAL_LIGHTS),
            coolant: Peripheral::new(coolant_pin, PERIPHERAL_COOLER),
            timers: Timers::starting_at(now_ms),
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Direct access to the live settings; the registry sees every change.
    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    pub fn registry(&self) -> &SettingsRegistry<Settings> {
        &self.registry
    }

    pub fn status(&self) -> MachineStatus {
        self.tracker.status()
    }

    pub fn timers(&self) -> Timers {
        self.timers
    }

    pub fn vacuum(&self) -> &Peripheral<P> {
        &self.vacuum
    }

    pub fn lights(&self) -> &Peripheral<P> {
        &self.lights
    }

    pub fn coolant(&self) -> &Peripheral<P> {
        &self.coolant
    }

    pub fn outputs(&self) -> Outputs {
        Outputs {
            lights: self.lights.is_enabled(),
            vacuum: self.vacuum.is_enabled(),
            coolant: self.coolant.is_enabled(),
        }
    }

    // ── Status ────────────────────────────────────────────────

    /// Feed one controller line to the status tracker.
    pub fn observe_controller(&mut self, line: &str) -> MachineStatus {
        self.tracker.observe(line)
    }

    /// Override the tracked status (boot, tests).
    pub fn set_status(&mut self, status: MachineStatus) {
        self.tracker.set(status);
    }

    // ── Settings persistence ──────────────────────────────────

    /// Load persisted settings and report the outcome to the host.
    pub fn load_config(
        &mut self,
        store: &impl ConfigStore,
        host: &mut impl HostSink,
    ) -> Result<LoadReport> {
        match self.registry.load_all(&mut self.settings, store) {
            Ok(report) => {
                host.send(&format!("{MSG_CONFIG_LOADED}{MSG_NLCR}"));
                Ok(report)
            }
            Err(e) => {
                warn!("config load failed: {}", e);
                host.send(&format!("{MSG_CONFIG_LOAD_FAILED}{MSG_NLCR}"));
                Err(e.into())
            }
        }
    }

    /// Persist every setting and report the outcome to the host.
    pub fn save_config(
        &mut self,
        store: &mut impl ConfigStore,
        host: &mut impl HostSink,
    ) -> Result<()> {
        match self.registry.save_all(&self.settings, store) {
            Ok(()) => {
                host.send(&format!("{MSG_CONFIG_SAVED}{MSG_NLCR}"));
                Ok(())
            }
            Err(e) => {
                host.send(&format!("{MSG_CONFIG_SAVE_FAILED}{MSG_NLCR}"));
                Err(e.into())
            }
        }
    }

    /// Set one setting from text and echo the new value (or the miss).
    pub fn apply_setting(
        &mut self,
        key: &str,
        value: &str,
        host: &mut impl HostSink,
    ) -> Result<()> {
        if let Err(e) = self.registry.set_from_text(&mut self.settings, key, value) {
            host.send(&format!("{MSG_SETTING_NOT_FOUND}{key}{MSG_NLCR}"));
            return Err(e.into());
        }
        let rendered = self.registry.get_as_text(&self.settings, key).unwrap_or_default();
        info!("setting {} = {}", key, rendered);
        host.send(&format!("{key} set to: {rendered}{MSG_NLCR}"));
        Ok(())
    }

    // ── Periodic behaviour ────────────────────────────────────

    /// Run one state-dependent tick and drive the peripherals to match.
    pub fn tick(&mut self, now_ms: u64, host: &mut impl HostSink) {
        let (outputs, timers) = tick::step(
            self.tracker.status(),
            &self.settings,
            self.outputs(),
            self.timers,
            now_ms,
        );
        self.timers = timers;
        self.lights.set(outputs.lights, host);
        self.vacuum.set(outputs.vacuum, host);
        self.coolant.set(outputs.coolant, host);
    }

    /// Transport changed: the controller has been soft-reset, so nothing
    /// it was doing should keep the vacuum running.
    pub fn on_link_reset(&mut self, host: &mut impl HostSink) {
        self.vacuum.disable(host);
    }
}
