//! Purpose: Marshal host config property bags into the engine configure call.
//! Exports: `ConfigSet`, `Engine::configure`.
//! Invariants: A failed push leaves exactly the previously built entries
//! owned by the set; abandoning the set releases them all.
//! Invariants: The parallel pointer arrays exist only for the ABI call.

use std::ffi::CString;
use std::os::raw::{c_char, c_longlong};

use crate::core::engine::{Engine, EngineMessage};
use crate::core::error::Error;
use crate::core::value::{ConfigValue, c_string};

/// An ordered list of config entries, held as owned NUL-terminated strings
/// ready to cross the boundary. Keys need not be unique; interpretation
/// belongs to the engine.
#[derive(Default)]
pub struct ConfigSet {
    keys: Vec<CString>,
    vals: Vec<CString>,
}

impl ConfigSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserves for the host-reported property count up front.
    pub fn with_capacity(entries: usize) -> Self {
        Self {
            keys: Vec::with_capacity(entries),
            vals: Vec::with_capacity(entries),
        }
    }

    /// Extracts and appends one entry. On failure nothing is appended: the
    /// set still holds exactly the entries that succeeded before, and any
    /// half-extracted string for this entry is released on the spot.
    pub fn push(&mut self, key: &str, value: ConfigValue) -> Result<(), Error> {
        let key = c_string(key, "config key")?;
        let val = c_string(&value.into_text(), "config value")?;
        self.keys.push(key);
        self.vals.push(val);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl Engine {
    /// Passes a fully built set to the engine's configure entry point.
    ///
    /// Takes `&mut self`: configuration rewrites engine-global state, so a
    /// configure call must be the only call in flight. The global registry
    /// enforces this with its write guard; direct handle owners get the
    /// same guarantee from the borrow checker.
    pub fn configure(&mut self, set: &ConfigSet) -> Result<(), Error> {
        tracing::debug!(entries = set.len(), "applying engine configuration");

        // Pointer arrays borrow the set's strings and are dropped right
        // after the call returns, on both outcomes.
        let mut keys: Vec<*mut c_char> = set
            .keys
            .iter()
            .map(|key| key.as_ptr() as *mut c_char)
            .collect();
        let mut vals: Vec<*mut c_char> = set
            .vals
            .iter()
            .map(|val| val.as_ptr() as *mut c_char)
            .collect();

        let raw = unsafe {
            (self.api.configure)(keys.as_mut_ptr(), vals.as_mut_ptr(), set.len() as c_longlong)
        };
        match unsafe { EngineMessage::from_raw(raw) } {
            Some(message) => Err(message.into_error()),
            None => Ok(()),
        }
    }
}
