//! Integration tests: scripted host/controller links → Bridge::poll.

use crate::mock_hw::{MemStore, MockPin, ScriptedController, ScriptedHost};

use cncrelay::app::bridge::Bridge;
use cncrelay::app::ports::Transport;
use cncrelay::app::session::Session;
use cncrelay::status::MachineStatus;

const SOFT_RESET: u8 = 0x18;

struct Rig {
    bridge: Bridge<MockPin>,
    host: ScriptedHost,
    controller: ScriptedController,
    store: MemStore,
}

impl Rig {
    fn new() -> Self {
        let session = Session::new(MockPin::default(), MockPin::default(), MockPin::default(), 0);
        Self {
            bridge: Bridge::new(session, MockPin::default()),
            host: ScriptedHost::new(),
            controller: ScriptedController::new(),
            store: MemStore::default(),
        }
    }

    fn poll(&mut self, now_ms: u64) {
        self.bridge
            .poll(&mut self.host, &mut self.controller, &mut self.store, now_ms);
    }

    /// First poll settles the transport; forget its side effects.
    fn settled() -> Self {
        let mut rig = Self::new();
        rig.poll(0);
        rig.controller.clear_written();
        rig.host.clear_output();
        rig
    }
}

// ── Transport selection ───────────────────────────────────────

#[test]
fn first_poll_resets_controller_on_wired_link() {
    let mut rig = Rig::new();
    assert_eq!(rig.bridge.transport(), None);

    rig.poll(0);

    assert_eq!(rig.bridge.transport(), Some(Transport::Wired));
    assert_eq!(rig.controller.written, vec![SOFT_RESET]);
    assert!(!rig.bridge.link_led().high);
}

#[test]
fn wireless_client_takes_over_and_stops_vacuum() {
    let mut rig = Rig::settled();
    rig.host.type_wired("/V\n");
    rig.poll(1);
    assert!(rig.bridge.session().vacuum().is_enabled());

    rig.host.wireless = true;
    rig.poll(2);

    assert_eq!(rig.bridge.transport(), Some(Transport::Wireless));
    assert!(rig.bridge.link_led().high);
    assert!(!rig.bridge.session().vacuum().is_enabled());
    assert_eq!(rig.controller.written, vec![SOFT_RESET]);
    assert_eq!(rig.host.wireless_text(), "Disabling Vacuum\n\r");
}

#[test]
fn steady_transport_does_not_reset_again() {
    let mut rig = Rig::settled();
    rig.poll(1);
    rig.poll(2);
    assert!(rig.controller.written.is_empty());
}

#[test]
fn only_the_active_link_is_read() {
    let mut rig = Rig::settled();
    rig.host.type_wireless("/L\n");
    rig.poll(1);
    assert!(!rig.bridge.session().lights().is_enabled());

    rig.host.wireless = true;
    rig.poll(2);
    assert!(rig.bridge.session().lights().is_enabled());
    assert!(rig.host.wireless_text().ends_with("Enabling Lights\n\r"));
}

// ── Controller → host ─────────────────────────────────────────

#[test]
fn controller_output_is_relayed_and_classified() {
    let mut rig = Rig::settled();
    rig.controller.reply("<Run|MPos:0.000,0.000,0.000|FS:0,0>\r\nok\r\n");

    rig.poll(10);

    // RUN starts the coolant on the tick that follows the relay.
    assert_eq!(
        rig.host.wired_text(),
        "<Run|MPos:0.000,0.000,0.000|FS:0,0>\r\nok\r\nEnabling Cooler\n\r"
    );
    assert_eq!(rig.bridge.session().status(), MachineStatus::Run);
}

#[test]
fn long_controller_output_is_fully_drained() {
    let mut rig = Rig::settled();
    let burst = "[MSG:".to_string() + &"x".repeat(300) + "]\r\nALARM:1\r\n";
    rig.controller.reply(&burst);

    rig.poll(10);

    assert!(rig.host.wired_text().starts_with(&burst));
    assert_eq!(rig.bridge.session().status(), MachineStatus::Alarm);
}

#[test]
fn overlong_feedback_line_is_not_classified() {
    let mut rig = Rig::settled();
    let feedback = "[MSG:".to_string() + &"x".repeat(251) + "ALARM hint]\r\n";
    rig.controller.reply(&feedback);

    rig.poll(10);

    assert_eq!(rig.host.wired_text(), feedback);
    assert_eq!(rig.bridge.session().status(), MachineStatus::Idle);
    assert!(!rig.bridge.session().lights().is_enabled());

    rig.controller.reply("ALARM:1\r\n");
    rig.poll(11);
    assert_eq!(rig.bridge.session().status(), MachineStatus::Alarm);
}

#[test]
fn controller_traffic_has_priority_over_host_input() {
    let mut rig = Rig::settled();
    rig.controller.reply("ok\r\n");
    rig.host.type_wired("/L\n");

    rig.poll(1);
    assert!(!rig.bridge.session().lights().is_enabled());
    assert_eq!(rig.host.wired_text(), "ok\r\n");

    rig.poll(2);
    assert!(rig.bridge.session().lights().is_enabled());
}

// ── Host → controller ─────────────────────────────────────────

#[test]
fn gcode_lines_are_forwarded_verbatim() {
    let mut rig = Rig::settled();
    rig.host.type_wired("g0 x1\r\n$$\n");

    rig.poll(1);

    assert_eq!(rig.controller.written_text(), "g0 x1\n$$\n");
    assert!(rig.host.wired_text().starts_with("AFE=1   ("));
}

#[test]
fn local_lines_never_reach_the_controller() {
    let mut rig = Rig::settled();
    rig.host.type_wired("/C\n");

    rig.poll(1);

    assert!(rig.controller.written.is_empty());
    assert!(rig.bridge.session().coolant().is_enabled());
}

#[test]
fn realtime_bytes_bypass_line_framing() {
    let mut rig = Rig::settled();
    rig.host.type_wired("G1 X?5");

    rig.poll(1);
    assert_eq!(rig.controller.written_text(), "?");

    rig.host.type_wired("\n!");
    rig.poll(2);
    assert_eq!(rig.controller.written_text(), "?G1 X5\n!");
}

#[test]
fn partial_lines_wait_for_terminator() {
    let mut rig = Rig::settled();
    rig.host.type_wired("G0 ");
    rig.poll(1);
    assert!(rig.controller.written.is_empty());

    rig.host.type_wired("Y2\n");
    rig.poll(2);
    assert_eq!(rig.controller.written_text(), "G0 Y2\n");
}

#[test]
fn overlong_host_line_is_forwarded_unmodified() {
    let mut rig = Rig::settled();
    rig.host.type_wired("/VR=1\n");
    rig.poll(1);
    rig.host.clear_output();

    let long = "G1 X1 (".to_string() + &"c".repeat(260) + ")M3\r\n";
    rig.host.type_wired(&long);
    rig.host.type_wired("G0 Y1\n");
    for now in 2..12 {
        rig.poll(now);
    }

    assert_eq!(rig.controller.written_text(), long + "G0 Y1\n");
    assert!(!rig.bridge.session().vacuum().is_enabled());
    assert!(rig.host.wired_text().is_empty());
}

#[test]
fn simulation_rewrites_or_drops_spindle_start() {
    let mut rig = Rig::settled();
    rig.host.type_wired("/SIM=1\nM3 S1000\nM3\nG0 X0\n");

    rig.poll(1);

    assert_eq!(rig.controller.written_text(), "S1000\nG0 X0\n");
}

// ── Periodic tick ─────────────────────────────────────────────

#[test]
fn alarm_flashes_lights_through_the_bridge() {
    let mut rig = Rig::settled();
    rig.controller.reply("ALARM:1\r\n");

    rig.poll(10);
    assert!(rig.bridge.session().lights().is_enabled());

    rig.poll(5011);
    assert!(!rig.bridge.session().lights().is_enabled());
}

#[test]
fn sleep_turns_lights_and_vacuum_off() {
    let mut rig = Rig::settled();
    rig.host.type_wired("/L V\n");
    rig.poll(1);
    rig.controller.reply("<Sleep>\r\n");

    rig.poll(2);

    let session = rig.bridge.session();
    assert!(!session.lights().is_enabled());
    assert!(!session.vacuum().is_enabled());
}

// ── Boot ──────────────────────────────────────────────────────

#[test]
fn start_loads_settings_and_reports_on_active_link() {
    let mut rig = Rig::new();
    rig.store = MemStore::with("LR=1\n");
    rig.host.wireless = true;

    rig.bridge.start(&mut rig.host, &rig.store);

    assert!(rig.bridge.settings().lights_follow_router);
    assert_eq!(rig.host.wireless_text(), "Configuration loaded.\n\r");
    assert!(rig.host.wired_out.is_empty());
}

#[test]
fn start_without_storage_reports_failure() {
    let mut rig = Rig::new();
    rig.store = MemStore::broken();

    rig.bridge.start(&mut rig.host, &rig.store);

    assert_eq!(rig.host.wired_text(), "Failed to load configuration.\n\r");
    assert_eq!(rig.bridge.session().status(), MachineStatus::Idle);
}
