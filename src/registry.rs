use std::thread;
use std::time::Duration;

use log::{error, info, warn};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::gpio::{Direction, GpioBackend};

/// Pause after exporting a batch, giving the kernel time to finish creating
/// the per-pin control files.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_secs(1);

/// Owns the named pin bindings of one run and drives export/unexport and
/// direction assignment against the backend.
pub struct PinRegistry {
    inputs: FxHashMap<String, u32>,
    outputs: FxHashMap<String, u32>,
    exported: Vec<u32>,
    settle_delay: Duration,
}

impl PinRegistry {
    pub fn new(settle_delay: Duration) -> Self {
        Self {
            inputs: FxHashMap::default(),
            outputs: FxHashMap::default(),
            exported: Vec::new(),
            settle_delay,
        }
    }

    pub fn clear(&mut self) {
        self.inputs.clear();
        self.outputs.clear();
        self.exported.clear();
    }

    pub fn input(&self, name: &str) -> Option<u32> {
        self.inputs.get(name).copied()
    }

    pub fn output(&self, name: &str) -> Option<u32> {
        self.outputs.get(name).copied()
    }

    pub fn inputs(&self) -> impl Iterator<Item = (&String, u32)> {
        self.inputs.iter().map(|(name, &pin)| (name, pin))
    }

    pub fn outputs(&self) -> impl Iterator<Item = (&String, u32)> {
        self.outputs.iter().map(|(name, &pin)| (name, pin))
    }

    /// Registers one batch of pins with the kernel. Failures are aggregated
    /// and logged, never returned as errors: the result says whether the
    /// whole batch registered, and the caller decides to quit on `false`.
    ///
    /// Every pin is unexported first in case a previous run left it behind;
    /// the outcome of that is deliberately ignored. Pins whose export
    /// succeeds are remembered for teardown even when the batch as a whole
    /// fails and the name maps stay untouched.
    pub fn register(
        &mut self,
        backend: &dyn GpioBackend,
        direction: Direction,
        pins: &FxHashMap<String, u32>,
    ) -> bool {
        if pins.is_empty() {
            return true;
        }

        for &pin in pins.values() {
            let _ = backend.unexport(pin);
        }

        let mut ok = true;
        for (name, &pin) in pins {
            match backend.export(pin) {
                Ok(()) => {
                    self.exported.push(pin);
                    info!("Exported GPIO {pin}.");
                }
                Err(e) => {
                    ok = false;
                    warn!("Required GPIO {pin} (`{name}`) could not be exported: {e}");
                }
            }
        }

        if !ok {
            error!("Could not properly export GPIOs.");
            return false;
        }

        info!("Waiting {:?} for GPIO settings to settle.", self.settle_delay);
        thread::sleep(self.settle_delay);

        for (name, &pin) in pins {
            match backend.set_direction(pin, direction) {
                Ok(()) => {
                    let map = match direction {
                        Direction::In => &mut self.inputs,
                        Direction::Out => &mut self.outputs,
                    };
                    map.insert(name.clone(), pin);
                    info!("Registered `{direction}` GPIO {pin} as `{name}`.");
                }
                Err(e) => {
                    ok = false;
                    warn!("Required `{direction}` GPIO {pin} direction could not be set: {e}");
                }
            }
        }

        if !ok {
            error!("Could not properly register GPIOs.");
        }
        ok
    }

    /// Best-effort teardown: unexports every pin this registry exported,
    /// including pins from batches that never finished registering. Logs
    /// each outcome and never fails the caller.
    pub fn unregister_all(&mut self, backend: &dyn GpioBackend) {
        let mut done = FxHashSet::default();
        for (name, &pin) in &self.inputs {
            done.insert(pin);
            match backend.unexport(pin) {
                Ok(()) => info!("Unregistered `in` GPIO {pin} as `{name}`."),
                Err(e) => warn!("Could not unexport GPIO {pin} (`{name}`): {e}"),
            }
        }
        for (name, &pin) in &self.outputs {
            done.insert(pin);
            match backend.unexport(pin) {
                Ok(()) => info!("Unregistered `out` GPIO {pin} as `{name}`."),
                Err(e) => warn!("Could not unexport GPIO {pin} (`{name}`): {e}"),
            }
        }
        for &pin in &self.exported {
            if done.insert(pin) {
                match backend.unexport(pin) {
                    Ok(()) => info!("Unexported GPIO {pin}."),
                    Err(e) => warn!("Could not unexport GPIO {pin}: {e}"),
                }
            }
        }
        self.clear();
    }
}
