//! Fuzz target: `SettingsRegistry::apply_text`
//!
//! Loads arbitrary bytes as a persisted config blob.  Whatever was applied,
//! saving and re-loading the result must be a fixed point.
//!
//! cargo fuzz run fuzz_config_load

#![no_main]

use cncrelay::config::Settings;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(blob) = core::str::from_utf8(data) else {
        return;
    };

    let registry = Settings::registry();
    let mut settings = Settings::default();
    registry.apply_text(&mut settings, blob);

    let saved = registry.render_all(&settings);
    let mut reloaded = Settings::default();
    let report = registry.apply_text(&mut reloaded, &saved);

    assert_eq!(report.applied, registry.len());
    assert_eq!(reloaded, settings);
});
