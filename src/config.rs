//! Runtime settings for the relay firmware.
//!
//! [`Settings`] holds the live variables that parameterise peripheral
//! behaviour.  The persisted copy lives in NVS as `KEY=VALUE` text and is
//! reached through the registry built by [`Settings::registry`]; the keys
//! are the short mnemonics typed at the host terminal (`/VR=1`).

use crate::field;
use crate::settings::{SettingsRegistry, Slot};

// --- Setting keys (upper case: local commands are upper-cased) ---

/// Flash the work lights while the controller is in ALARM.
pub const KEY_ALARM_FLASH_ENABLE: &str = "AFE";
/// Lights-on phase of the alarm flash (ms).
pub const KEY_ALARM_TON: &str = "ATON";
/// Lights-off phase of the alarm flash (ms).
pub const KEY_ALARM_TOFF: &str = "ATOFF";
/// Coolant fan run-on after motion stops (ms).
pub const KEY_COOLER_TOFF: &str = "CTOFF";
pub const KEY_VACUUM_ROUTER: &str = "VR";
pub const KEY_LIGHTS_ROUTER: &str = "LR";
pub const KEY_SIMULATION: &str = "SIM";

/// Live settings, bound into the registry by field projection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    // --- Alarm ---
    pub flash_on_alarm: bool,
    pub alarm_flash_on_ms: u32,
    pub alarm_flash_off_ms: u32,

    // --- Coolant fan ---
    pub coolant_off_delay_ms: u32,

    // --- Router coupling ---
    /// Switch the vacuum with the spindle (M3/M4 on, M5/M0/M6 off).
    pub vacuum_follows_router: bool,
    /// Switch the lights with the spindle (M3/M4 on, M5 off).
    pub lights_follow_router: bool,

    /// Strip spindle-start commands before they reach the controller.
    pub simulation_mode: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            flash_on_alarm: true,
            alarm_flash_on_ms: 5000,
            alarm_flash_off_ms: 1000,
            coolant_off_delay_ms: 1000,
            vacuum_follows_router: false,
            lights_follow_router: false,
            simulation_mode: false,
        }
    }
}

impl Settings {
    /// Registry binding every persisted key to its field.
    pub fn registry() -> SettingsRegistry<Self> {
        let entries: [(&'static str, Slot<Self>, &'static str); 7] = [
            (
                KEY_ALARM_FLASH_ENABLE,
                Slot::Bool(field!(Settings, flash_on_alarm)),
                "Enable flashing lights on alarm (bool)",
            ),
            (
                KEY_ALARM_TON,
                Slot::U32(field!(Settings, alarm_flash_on_ms)),
                "Alarm flash time on (msec)",
            ),
            (
                KEY_ALARM_TOFF,
                Slot::U32(field!(Settings, alarm_flash_off_ms)),
                "Alarm flash time off (msec)",
            ),
            (
                KEY_COOLER_TOFF,
                Slot::U32(field!(Settings, coolant_off_delay_ms)),
                "Cooler fan off delay (msec)",
            ),
            (
                KEY_VACUUM_ROUTER,
                Slot::Bool(field!(Settings, vacuum_follows_router)),
                "Enable vacuum on router enable (bool)",
            ),
            (
                KEY_LIGHTS_ROUTER,
                Slot::Bool(field!(Settings, lights_follow_router)),
                "Enable lights on router enable (bool)",
            ),
            (
                KEY_SIMULATION,
                Slot::Bool(field!(Settings, simulation_mode)),
                "Enable simulation mode (bool)",
            ),
        ];

        let mut registry = SettingsRegistry::new();
        for (key, slot, description) in entries {
            if let Err(e) = registry.register(key, slot, description) {
                log::error!("settings: {}", e);
            }
        }
        registry
    }
}
