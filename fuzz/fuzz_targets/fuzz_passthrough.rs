//! Fuzz target: `Session::intercept` / `Session::handle_local_line`
//!
//! Feeds arbitrary host lines through both dispatch paths with every
//! router-coupling flag set, asserting that nothing panics and that a
//! rewrite only ever appears in simulation mode.
//!
//! cargo fuzz run fuzz_passthrough

#![no_main]

use core::convert::Infallible;

use cncrelay::app::dispatch::Passthrough;
use cncrelay::app::ports::{ConfigStore, StorageError};
use cncrelay::app::session::Session;
use embedded_hal::digital::{ErrorType, OutputPin};
use libfuzzer_sys::fuzz_target;

struct Pin;

impl ErrorType for Pin {
    type Error = Infallible;
}

impl OutputPin for Pin {
    fn set_low(&mut self) -> Result<(), Infallible> {
        Ok(())
    }
    fn set_high(&mut self) -> Result<(), Infallible> {
        Ok(())
    }
}

struct NullStore;

impl ConfigStore for NullStore {
    fn read_config(&self) -> Result<String, StorageError> {
        Err(StorageError::NotFound)
    }
    fn write_config(&mut self, _contents: &str) -> Result<(), StorageError> {
        Ok(())
    }
}

fuzz_target!(|data: &[u8]| {
    let Some((&flags, rest)) = data.split_first() else {
        return;
    };
    let line = String::from_utf8_lossy(rest);

    let mut session = Session::new(Pin, Pin, Pin, 0);
    session.settings_mut().vacuum_follows_router = flags & 1 != 0;
    session.settings_mut().lights_follow_router = flags & 2 != 0;
    session.settings_mut().simulation_mode = flags & 4 != 0;
    let simulating = session.settings().simulation_mode;

    let mut host = String::new();
    let out = session.intercept(&line, &mut host);
    if !simulating {
        assert_eq!(out, Passthrough::Original);
    }

    session.handle_local_line(&line, u64::from(flags), &mut NullStore, &mut host);
});
