use rustc_hash::FxHashMap;

use crate::error::Error;
use crate::gpio::{GpioBackend, Level};
use crate::registry::PinRegistry;

/// Buffered pin I/O: input levels are sampled once per iteration into a
/// cache (keeping the previous sample for edge detection), and output
/// writes are staged and committed in one batch at the iteration boundary.
#[derive(Default)]
pub struct IoBuffer {
    current_inputs: FxHashMap<String, Level>,
    previous_inputs: FxHashMap<String, Level>,
    current_outputs: FxHashMap<String, Level>,
    pending_outputs: FxHashMap<String, Level>,
}

impl IoBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.current_inputs.clear();
        self.previous_inputs.clear();
        self.current_outputs.clear();
        self.pending_outputs.clear();
    }

    /// Cached input level from the last refresh.
    pub fn get(&self, registry: &PinRegistry, name: &str) -> Result<Level, Error> {
        registry
            .input(name)
            .ok_or_else(|| Error::UnregisteredInput(name.to_string()))?;
        self.current_inputs
            .get(name)
            .copied()
            .ok_or_else(|| Error::Io(format!("input `{name}` has not been sampled yet")))
    }

    /// Reads the pin right now, bypassing the cache (the fresh level is
    /// cached as the current sample).
    pub fn read_now(
        &mut self,
        backend: &dyn GpioBackend,
        registry: &PinRegistry,
        name: &str,
    ) -> Result<Level, Error> {
        let pin = registry
            .input(name)
            .ok_or_else(|| Error::UnregisteredInput(name.to_string()))?;
        let level = backend.read_value(pin)?;
        self.current_inputs.insert(name.to_string(), level);
        Ok(level)
    }

    /// Stages an output write for the next flush. Staging the same name
    /// twice in one iteration keeps the last value.
    pub fn set(&mut self, registry: &PinRegistry, name: &str, level: Level) -> Result<(), Error> {
        registry
            .output(name)
            .ok_or_else(|| Error::UnregisteredOutput(name.to_string()))?;
        self.pending_outputs.insert(name.to_string(), level);
        Ok(())
    }

    /// Writes the pin right now, bypassing the staging buffer.
    pub fn write_now(
        &mut self,
        backend: &dyn GpioBackend,
        registry: &PinRegistry,
        name: &str,
        level: Level,
    ) -> Result<(), Error> {
        let pin = registry
            .output(name)
            .ok_or_else(|| Error::UnregisteredOutput(name.to_string()))?;
        backend.write_value(pin, level)?;
        self.current_outputs.insert(name.to_string(), level);
        Ok(())
    }

    pub fn has_pending(&self) -> bool {
        !self.pending_outputs.is_empty()
    }

    /// Commits every staged output write, in no particular order across
    /// names, then clears the staging buffer.
    pub fn flush_delayed(
        &mut self,
        backend: &dyn GpioBackend,
        registry: &PinRegistry,
    ) -> Result<(), Error> {
        let staged: Vec<(String, Level)> = self.pending_outputs.drain().collect();
        for (name, level) in staged {
            let pin = registry
                .output(&name)
                .ok_or_else(|| Error::UnregisteredOutput(name.clone()))?;
            backend.write_value(pin, level)?;
            self.current_outputs.insert(name, level);
        }
        Ok(())
    }

    /// Re-reads every registered input. The whole current sample set is
    /// snapshotted into the previous one before any pin is touched.
    pub fn refresh_inputs(
        &mut self,
        backend: &dyn GpioBackend,
        registry: &PinRegistry,
    ) -> Result<(), Error> {
        self.previous_inputs = self.current_inputs.clone();
        for (name, pin) in registry.inputs() {
            let level = backend.read_value(pin)?;
            self.current_inputs.insert(name.clone(), level);
        }
        Ok(())
    }

    /// True iff the input went High → Low between the two most recent
    /// refreshes. False for every other transition and before a previous
    /// sample exists.
    pub fn falling_edge(&self, name: &str) -> bool {
        matches!(
            (self.previous_inputs.get(name), self.current_inputs.get(name)),
            (Some(Level::High), Some(Level::Low))
        )
    }
}
