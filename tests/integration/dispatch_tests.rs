//! Integration tests: host line → Session dispatch → relays and host output.

use crate::mock_hw::{MemStore, MockPin};

use cncrelay::app::dispatch::Passthrough;
use cncrelay::app::session::Session;
use cncrelay::status::MachineStatus;

fn make_session() -> Session<MockPin> {
    Session::new(MockPin::default(), MockPin::default(), MockPin::default(), 0)
}

// ── Pass-through interception ─────────────────────────────────

#[test]
fn simulation_strips_spindle_start_and_skips_vacuum() {
    let mut s = make_session();
    s.settings_mut().simulation_mode = true;
    s.settings_mut().vacuum_follows_router = true;
    let mut host = String::new();

    let out = s.intercept("M3 S1000", &mut host);

    assert_eq!(out, Passthrough::Rewritten("S1000".into()));
    assert!(!s.vacuum().is_enabled());
    assert!(host.is_empty());
}

#[test]
fn simulation_still_follows_lights() {
    let mut s = make_session();
    s.settings_mut().simulation_mode = true;
    s.settings_mut().lights_follow_router = true;
    let mut host = String::new();

    let out = s.intercept("m4 s500\r\n", &mut host);

    assert_eq!(out, Passthrough::Rewritten("S500".into()));
    assert!(s.lights().is_enabled());
    assert_eq!(host, "Enabling Lights\n\r");
}

#[test]
fn simulation_only_strips_the_first_spindle_start() {
    let mut s = make_session();
    s.settings_mut().simulation_mode = true;
    let mut host = String::new();

    let out = s.intercept("G0 M3 M4 S1", &mut host);

    assert_eq!(out, Passthrough::Rewritten("G0 M4 S1".into()));
}

#[test]
fn simulation_with_lone_spindle_start_rewrites_to_empty() {
    let mut s = make_session();
    s.settings_mut().simulation_mode = true;
    let mut host = String::new();
    assert_eq!(s.intercept("M3", &mut host), Passthrough::Rewritten(String::new()));
}

#[test]
fn spindle_start_enables_followers_and_forwards_unchanged() {
    let mut s = make_session();
    s.settings_mut().vacuum_follows_router = true;
    s.settings_mut().lights_follow_router = true;
    let mut host = String::new();

    let out = s.intercept("M3 S1000", &mut host);

    assert_eq!(out, Passthrough::Original);
    assert!(s.vacuum().is_enabled());
    assert!(s.lights().is_enabled());
    assert!(s.vacuum().pin().high);
    assert_eq!(host, "Enabling Vacuum\n\rEnabling Lights\n\r");
}

#[test]
fn spindle_start_without_followers_does_nothing() {
    let mut s = make_session();
    let mut host = String::new();
    assert_eq!(s.intercept("M3 S1000", &mut host), Passthrough::Original);
    assert!(!s.vacuum().is_enabled());
    assert!(!s.lights().is_enabled());
}

#[test]
fn spindle_stop_disables_followers() {
    let mut s = make_session();
    s.settings_mut().vacuum_follows_router = true;
    s.settings_mut().lights_follow_router = true;
    let mut host = String::new();
    s.intercept("M3", &mut host);
    host.clear();

    assert_eq!(s.intercept("M5", &mut host), Passthrough::Original);

    assert!(!s.vacuum().is_enabled());
    assert!(!s.lights().is_enabled());
    assert_eq!(host, "Disabling Vacuum\n\rDisabling Lights\n\r");
}

#[test]
fn pause_and_tool_change_stop_only_the_vacuum() {
    for line in ["M0", "M6 T2", "M00"] {
        let mut s = make_session();
        s.settings_mut().vacuum_follows_router = true;
        s.settings_mut().lights_follow_router = true;
        let mut host = String::new();
        s.intercept("M3", &mut host);

        s.intercept(line, &mut host);

        assert!(!s.vacuum().is_enabled(), "{line}");
        assert!(s.lights().is_enabled(), "{line}");
    }
}

#[test]
fn other_machine_codes_are_ignored() {
    let mut s = make_session();
    s.settings_mut().vacuum_follows_router = true;
    let mut host = String::new();
    assert_eq!(s.intercept("M8 M9 M30", &mut host), Passthrough::Original);
    assert!(host.is_empty());
}

#[test]
fn config_dump_lists_every_setting_and_forwards() {
    let mut s = make_session();
    let mut host = String::new();

    assert_eq!(s.intercept("$$", &mut host), Passthrough::Original);

    let lines: Vec<&str> = host.split("\n\r").filter(|l| !l.is_empty()).collect();
    assert_eq!(lines.len(), 7);
    assert_eq!(lines[0], "AFE=1   (Enable flashing lights on alarm (bool))");
    assert_eq!(lines[1], "ATOFF=1000   (Alarm flash time off (msec))");
    assert_eq!(lines[6], "VR=0   (Enable vacuum on router enable (bool))");
}

// ── Local commands ────────────────────────────────────────────

#[test]
fn toggle_lights_and_vacuum_in_one_line() {
    let mut s = make_session();
    let mut store = MemStore::default();
    let mut host = String::new();

    s.handle_local_line("/l v\n", 0, &mut store, &mut host);

    assert!(s.lights().is_enabled());
    assert!(s.vacuum().is_enabled());
    assert_eq!(host, "Enabling Lights\n\rEnabling Vacuum\n\r");
}

#[test]
fn vacuum_never_turns_on_during_alarm() {
    let mut s = make_session();
    let mut store = MemStore::default();
    let mut host = String::new();
    s.handle_local_line("/V", 0, &mut store, &mut host);
    assert!(s.vacuum().is_enabled());

    s.set_status(MachineStatus::Alarm);
    s.handle_local_line("/V", 0, &mut store, &mut host);
    assert!(!s.vacuum().is_enabled());

    s.handle_local_line("/V", 0, &mut store, &mut host);
    assert!(!s.vacuum().is_enabled());
}

#[test]
fn toggle_coolant_reschedules_deadline() {
    let mut s = make_session();
    s.settings_mut().coolant_off_delay_ms = 2500;
    let mut store = MemStore::default();
    let mut host = String::new();

    s.handle_local_line("/C", 1000, &mut store, &mut host);

    assert!(s.coolant().is_enabled());
    assert_eq!(s.timers().coolant_off_ms, 3500);
    assert_eq!(host, "Enabling Cooler\n\r");

    // The tick switches it back off once the deadline passes.
    s.tick(3500, &mut host);
    assert!(s.coolant().is_enabled());
    s.tick(3501, &mut host);
    assert!(!s.coolant().is_enabled());
}

#[test]
fn set_reports_new_value() {
    let mut s = make_session();
    let mut store = MemStore::default();
    let mut host = String::new();

    s.handle_local_line("/vr=1 aton=250ms", 0, &mut store, &mut host);

    assert!(s.settings().vacuum_follows_router);
    assert_eq!(s.settings().alarm_flash_on_ms, 250);
    assert_eq!(host, "VR set to: 1\n\rATON set to: 250\n\r");
}

#[test]
fn set_unknown_key_reports_and_continues() {
    let mut s = make_session();
    let mut store = MemStore::default();
    let mut host = String::new();

    s.handle_local_line("/XX=1 L", 0, &mut store, &mut host);

    assert_eq!(host, "Could not find setting: XX\n\rEnabling Lights\n\r");
}

#[test]
fn unrecognised_tokens_are_silent() {
    let mut s = make_session();
    let mut store = MemStore::default();
    let mut host = String::new();
    s.handle_local_line("/HELLO X =", 0, &mut store, &mut host);
    assert!(host.is_empty());
    assert!(store.blob.is_none());
}

#[test]
fn save_persists_and_reports() {
    let mut s = make_session();
    let mut store = MemStore::default();
    let mut host = String::new();

    s.handle_local_line("/SIM=1 S", 0, &mut store, &mut host);

    assert_eq!(
        store.blob.as_deref(),
        Some("AFE=1\nATOFF=1000\nATON=5000\nCTOFF=1000\nLR=0\nSIM=1\nVR=0\n")
    );
    assert!(host.ends_with("Configuration saved.\n\r"));
}

#[test]
fn save_failure_is_reported_every_time() {
    let mut s = make_session();
    let mut store = MemStore::broken();
    let mut host = String::new();

    s.handle_local_line("/S S", 0, &mut store, &mut host);

    assert_eq!(
        host,
        "Failed to save configuration.\n\rFailed to save configuration.\n\r"
    );
}

#[test]
fn load_applies_persisted_values() {
    let mut s = make_session();
    let store = MemStore::with("VR=1\nCTOFF=42\nBOGUS=7\n");
    let mut host = String::new();

    let report = s.load_config(&store, &mut host).unwrap();

    assert_eq!(report.applied, 2);
    assert_eq!(report.unknown, 1);
    assert!(s.settings().vacuum_follows_router);
    assert_eq!(s.settings().coolant_off_delay_ms, 42);
    assert_eq!(host, "Configuration loaded.\n\r");
}

#[test]
fn load_from_unavailable_store_keeps_defaults() {
    let mut s = make_session();
    let mut host = String::new();

    assert!(s.load_config(&MemStore::broken(), &mut host).is_err());

    assert_eq!(s.settings(), &cncrelay::config::Settings::default());
    assert_eq!(host, "Failed to load configuration.\n\r");
}
