//! Typed key/value settings registry.
//!
//! A [`SettingsRegistry`] maps short case-sensitive keys to [`Binding`]s.
//! A binding never stores a value.  It holds a [`Slot`], a tagged pair of
//! field projections into the live settings struct, so every read and
//! write goes straight through to the variable the rest of the firmware
//! observes.
//!
//! ```text
//!   "VR" ──▶ Binding { Slot::Bool(|s| &s.vacuum_follows_router) } ──▶ Settings
//! ```
//!
//! Persisted form is one `KEY=VALUE\n` line per binding, in key order.
//!
//! ## Numeric text
//!
//! Values arrive from a serial terminal and from flash.  They are parsed
//! with [`parse_lenient_int`]: leading digits only, anything else reads as
//! zero.  Malformed numbers are never an error.

use std::collections::BTreeMap;

use log::{info, warn};

use crate::app::ports::{ConfigStore, StorageError};
use crate::error::SettingsError;

// ───────────────────────────────────────────────────────────────
// Field projections
// ───────────────────────────────────────────────────────────────

/// Read and write projections from a settings struct `S` to one field `T`.
pub struct Field<S, T> {
    get: fn(&S) -> &T,
    get_mut: fn(&mut S) -> &mut T,
}

impl<S, T> Field<S, T> {
    pub const fn new(get: fn(&S) -> &T, get_mut: fn(&mut S) -> &mut T) -> Self {
        Self { get, get_mut }
    }

    pub fn get<'a>(&self, target: &'a S) -> &'a T {
        (self.get)(target)
    }

    pub fn get_mut<'a>(&self, target: &'a mut S) -> &'a mut T {
        (self.get_mut)(target)
    }
}

/// Build a [`Field`] projecting `$ty.$field`.
///
/// ```
/// use cncrelay::field;
/// use cncrelay::settings::Slot;
///
/// struct Cfg { on: bool }
/// let slot: Slot<Cfg> = Slot::Bool(field!(Cfg, on));
/// ```
#[macro_export]
macro_rules! field {
    ($ty:ty, $field:ident) => {
        $crate::settings::Field::new(|s: &$ty| &s.$field, |s: &mut $ty| &mut s.$field)
    };
}

/// The typed variable a binding points at.
pub enum Slot<S> {
    Bool(Field<S, bool>),
    U8(Field<S, u8>),
    U16(Field<S, u16>),
    U32(Field<S, u32>),
    Text(Field<S, String>),
}

impl<S> Slot<S> {
    /// Render the current value: booleans as `0`/`1`, integers in decimal,
    /// text verbatim.
    pub fn render(&self, target: &S) -> String {
        match self {
            Self::Bool(f) => String::from(if *f.get(target) { "1" } else { "0" }),
            Self::U8(f) => f.get(target).to_string(),
            Self::U16(f) => f.get(target).to_string(),
            Self::U32(f) => f.get(target).to_string(),
            Self::Text(f) => f.get(target).clone(),
        }
    }

    /// Parse `text` for this slot's type and write it through.
    pub fn assign(&self, target: &mut S, text: &str) {
        match self {
            Self::Bool(f) => *f.get_mut(target) = parse_lenient_int(text) > 0,
            // Out-of-range values truncate to the field width.
            Self::U8(f) => *f.get_mut(target) = parse_lenient_int(text) as u8,
            Self::U16(f) => *f.get_mut(target) = parse_lenient_int(text) as u16,
            Self::U32(f) => *f.get_mut(target) = parse_lenient_int(text) as u32,
            Self::Text(f) => *f.get_mut(target) = text.to_string(),
        }
    }
}

/// Parse the leading integer of `text` the way a C `atol` does.
///
/// Leading whitespace and one sign are accepted, parsing stops at the
/// first non-digit, and text with no digits yields 0.  Values beyond the
/// 64-bit range saturate.
pub fn parse_lenient_int(text: &str) -> i64 {
    let trimmed = text.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let mut value: i64 = 0;
    for b in digits.bytes().take_while(u8::is_ascii_digit) {
        value = value.saturating_mul(10).saturating_add(i64::from(b - b'0'));
    }
    if negative {
        -value
    } else {
        value
    }
}

// ───────────────────────────────────────────────────────────────
// Bindings & registry
// ───────────────────────────────────────────────────────────────

pub struct Binding<S> {
    slot: Slot<S>,
    description: &'static str,
}

impl<S> Binding<S> {
    pub fn slot(&self) -> &Slot<S> {
        &self.slot
    }

    pub fn description(&self) -> &'static str {
        self.description
    }
}

/// Outcome of applying a persisted config blob.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Lines whose key matched a binding.
    pub applied: usize,
    /// Well-formed lines with an unregistered key.
    pub unknown: usize,
    /// Non-empty lines without `=`.
    pub malformed: usize,
}

/// Registry of bindings into a settings struct `S`.
///
/// Populated once at startup; afterwards only the pointed-to values change.
pub struct SettingsRegistry<S> {
    bindings: BTreeMap<&'static str, Binding<S>>,
}

impl<S> Default for SettingsRegistry<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> SettingsRegistry<S> {
    pub fn new() -> Self {
        Self {
            bindings: BTreeMap::new(),
        }
    }

    /// Add a binding.  Each key may be registered once.
    pub fn register(
        &mut self,
        key: &'static str,
        slot: Slot<S>,
        description: &'static str,
    ) -> Result<(), SettingsError> {
        if self.bindings.contains_key(key) {
            return Err(SettingsError::Duplicate(key));
        }
        self.bindings.insert(key, Binding { slot, description });
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&Binding<S>> {
        self.bindings.get(key)
    }

    pub fn set_from_text(&self, target: &mut S, key: &str, text: &str) -> Result<(), SettingsError> {
        let binding = self.bindings.get(key).ok_or(SettingsError::NotFound)?;
        binding.slot.assign(target, text);
        Ok(())
    }

    pub fn get_as_text(&self, target: &S, key: &str) -> Option<String> {
        self.bindings.get(key).map(|b| b.slot.render(target))
    }

    /// Bindings in registry (key) order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &Binding<S>)> {
        self.bindings.iter().map(|(k, b)| (*k, b))
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// One `KEY=VALUE\n` line per binding, in registry order.
    pub fn render_all(&self, target: &S) -> String {
        let mut out = String::new();
        for (key, binding) in self.iter() {
            out.push_str(key);
            out.push('=');
            out.push_str(&binding.slot.render(target));
            out.push('\n');
        }
        out
    }

    /// Apply a `KEY=VALUE\n` blob.  Lines split on their first `=`.
    pub fn apply_text(&self, target: &mut S, contents: &str) -> LoadReport {
        let mut report = LoadReport::default();
        for line in contents.split('\n') {
            let line = line.strip_suffix('\r').unwrap_or(line);
            if line.is_empty() {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                report.malformed += 1;
                continue;
            };
            match self.set_from_text(target, key, value) {
                Ok(()) => report.applied += 1,
                Err(_) => report.unknown += 1,
            }
        }
        report
    }

    pub fn load_all(
        &self,
        target: &mut S,
        store: &impl ConfigStore,
    ) -> Result<LoadReport, StorageError> {
        let contents = store.read_config()?;
        let report = self.apply_text(target, &contents);
        if report.unknown > 0 || report.malformed > 0 {
            warn!(
                "settings: ignored {} unknown and {} malformed lines",
                report.unknown, report.malformed
            );
        }
        info!("settings: loaded {} values", report.applied);
        Ok(report)
    }

    /// Replace the persisted blob with every binding's current value.
    pub fn save_all(&self, target: &S, store: &mut impl ConfigStore) -> Result<(), StorageError> {
        let contents = self.render_all(target);
        store.write_config(&contents)?;
        info!("settings: saved {} values ({} bytes)", self.len(), contents.len());
        Ok(())
    }
}
