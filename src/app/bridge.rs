//! Bridge — one cooperative loop iteration of the relay.
//!
//! [`Bridge::poll`] is called from the main loop and never blocks:
//!
//! 1. Pick the active host link (wireless if a client is connected).  On a
//!    change, soft-reset the controller, stop the vacuum and update the
//!    link LED.
//! 2. If the controller has bytes pending, drain them to the host, letting
//!    the status tracker see every completed line.  Host input waits for
//!    the next iteration.
//! 3. Otherwise read one batch from the host: realtime bytes go straight
//!    to the controller, complete lines go through the local or
//!    pass-through path.  Lines longer than the frame buffer are
//!    forwarded byte for byte and never inspected.
//! 4. Run the periodic tick.

use embedded_hal::digital::OutputPin;
use log::{info, warn};

use crate::config::Settings;

use super::commands::{CHAR_LOCAL_COMMAND, RT_SOFT_RESET, is_realtime};
use super::dispatch::Passthrough;
use super::line_buffer::{Frame, LineBuffer};
use super::ports::{ConfigStore, ControllerPort, HostPort, HostSink, Transport};
use super::session::Session;

/// Bytes moved per read call.
pub const CHUNK_LEN: usize = 64;

/// [`HostSink`] writing to whichever host link is active.
pub struct ActiveHost<'a, H> {
    port: &'a mut H,
    transport: Transport,
}

impl<'a, H: HostPort> ActiveHost<'a, H> {
    pub fn new(port: &'a mut H, transport: Transport) -> Self {
        Self { port, transport }
    }
}

impl<H: HostPort> HostSink for ActiveHost<'_, H> {
    fn send(&mut self, text: &str) {
        self.port.write(self.transport, text.as_bytes());
    }
}

pub struct Bridge<P> {
    session: Session<P>,
    link_led: P,
    transport: Option<Transport>,
    host_lines: LineBuffer,
    controller_lines: LineBuffer,
}

impl<P: OutputPin> Bridge<P> {
    pub fn new(session: Session<P>, mut link_led: P) -> Self {
        if let Err(e) = link_led.set_low() {
            warn!("link LED init failed: {:?}", e);
        }
        Self {
            session,
            link_led,
            transport: None,
            host_lines: LineBuffer::new(),
            controller_lines: LineBuffer::new(),
        }
    }

    /// Boot step: load persisted settings and report the result on the
    /// link that is active right now.
    pub fn start(&mut self, host: &mut impl HostPort, store: &impl ConfigStore) {
        let transport = detect_transport(host);
        let mut sink = ActiveHost::new(host, transport);
        if let Ok(report) = self.session.load_config(store, &mut sink) {
            info!(
                "bridge: started on {:?}, {} settings applied",
                transport, report.applied
            );
        } else {
            info!("bridge: started on {:?} with default settings", transport);
        }
    }

    pub fn poll(
        &mut self,
        host: &mut impl HostPort,
        controller: &mut impl ControllerPort,
        store: &mut impl ConfigStore,
        now_ms: u64,
    ) {
        let transport = self.sync_transport(host, controller);
        let mut buf = [0u8; CHUNK_LEN];

        let mut n = controller.read(&mut buf);
        if n > 0 {
            while n > 0 {
                let chunk = &buf[..n];
                for &byte in chunk {
                    // The tail of an overlong line is not a line of its own.
                    if let Some(Frame::Line(line)) = self.controller_lines.feed(byte) {
                        self.session.observe_controller(&line);
                    }
                }
                host.write(transport, chunk);
                n = controller.read(&mut buf);
            }
        } else {
            let n = host.read(transport, &mut buf);
            for &byte in &buf[..n] {
                if is_realtime(byte) {
                    controller.write(&[byte]);
                    continue;
                }
                match self.host_lines.feed(byte) {
                    Some(Frame::Line(line)) => {
                        self.route_host_line(&line, transport, host, controller, store, now_ms);
                    }
                    Some(Frame::Overlong(head)) => {
                        warn!("bridge: host line over {} bytes, forwarding raw", head.len() - 1);
                        controller.write(&head);
                    }
                    Some(Frame::Raw(b)) => controller.write(&[b]),
                    None => {}
                }
            }
        }

        let mut sink = ActiveHost::new(host, transport);
        self.session.tick(now_ms, &mut sink);
    }

    fn route_host_line(
        &mut self,
        line: &str,
        transport: Transport,
        host: &mut impl HostPort,
        controller: &mut impl ControllerPort,
        store: &mut impl ConfigStore,
        now_ms: u64,
    ) {
        let mut sink = ActiveHost::new(host, transport);
        if line.starts_with(CHAR_LOCAL_COMMAND) {
            self.session.handle_local_line(line, now_ms, store, &mut sink);
            return;
        }
        match self.session.intercept(line, &mut sink) {
            Passthrough::Original => {
                controller.write(line.as_bytes());
                controller.write(b"\n");
            }
            Passthrough::Rewritten(text) if text.is_empty() => {}
            Passthrough::Rewritten(text) => {
                controller.write(text.as_bytes());
                controller.write(b"\n");
            }
        }
    }

    fn sync_transport(
        &mut self,
        host: &mut impl HostPort,
        controller: &mut impl ControllerPort,
    ) -> Transport {
        let active = detect_transport(host);
        if self.transport == Some(active) {
            return active;
        }

        info!("transport: {:?} -> {:?}", self.transport, active);
        self.transport = Some(active);
        self.host_lines.clear();
        self.controller_lines.clear();
        controller.write(&[RT_SOFT_RESET]);

        let mut sink = ActiveHost::new(host, active);
        self.session.on_link_reset(&mut sink);

        let led = if active == Transport::Wireless {
            self.link_led.set_high()
        } else {
            self.link_led.set_low()
        };
        if let Err(e) = led {
            warn!("link LED write failed: {:?}", e);
        }
        active
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn session(&self) -> &Session<P> {
        &self.session
    }

    pub fn settings(&self) -> &Settings {
        self.session.settings()
    }

    /// Link in use since the last poll; `None` before the first one.
    pub fn transport(&self) -> Option<Transport> {
        self.transport
    }

    pub fn link_led(&self) -> &P {
        &self.link_led
    }
}

fn detect_transport(host: &impl HostPort) -> Transport {
    if host.wireless_connected() {
        Transport::Wireless
    } else {
        Transport::Wired
    }
}
