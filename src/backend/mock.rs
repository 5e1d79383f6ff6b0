use std::collections::VecDeque;

use parking_lot::Mutex;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::error::Error;
use crate::gpio::{Direction, GpioBackend, Level};

/// One recorded backend operation, in call order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockOp {
    Export(u32),
    Unexport(u32),
    SetDirection(u32, Direction),
    Write(u32, Level),
    Read(u32),
}

#[derive(Default)]
struct MockInner {
    journal: Vec<MockOp>,
    exported: FxHashSet<u32>,
    fail_export: FxHashSet<u32>,
    fail_direction: FxHashSet<u32>,
    missing_value_file: FxHashSet<u32>,
    values: FxHashMap<u32, Level>,
    input_scripts: FxHashMap<u32, VecDeque<Level>>,
}

/// In-memory backend for tests and dry runs. Records every call in a
/// journal, can be told to fail specific pins, and can replay a scripted
/// sequence of input levels (the last scripted level repeats once the
/// script is exhausted).
#[derive(Default)]
pub struct MockBackend {
    inner: Mutex<MockInner>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn journal(&self) -> Vec<MockOp> {
        self.inner.lock().journal.clone()
    }

    /// Last value written to the pin, if any.
    pub fn value(&self, pin: u32) -> Option<Level> {
        self.inner.lock().values.get(&pin).copied()
    }

    pub fn is_exported(&self, pin: u32) -> bool {
        self.inner.lock().exported.contains(&pin)
    }

    /// Make every export of `pin` fail, as a permission problem would.
    pub fn fail_export(&self, pin: u32) {
        self.inner.lock().fail_export.insert(pin);
    }

    pub fn fail_direction(&self, pin: u32) {
        self.inner.lock().fail_direction.insert(pin);
    }

    /// Pretend the kernel never created the pin's value file.
    pub fn missing_value_file(&self, pin: u32) {
        self.inner.lock().missing_value_file.insert(pin);
    }

    pub fn set_value(&self, pin: u32, level: Level) {
        self.inner.lock().values.insert(pin, level);
    }

    pub fn set_input_sequence<I: IntoIterator<Item = Level>>(&self, pin: u32, levels: I) {
        self.inner
            .lock()
            .input_scripts
            .insert(pin, levels.into_iter().collect());
    }
}

impl GpioBackend for MockBackend {
    fn export(&self, pin: u32) -> Result<(), Error> {
        let mut inner = self.inner.lock();
        inner.journal.push(MockOp::Export(pin));
        if inner.fail_export.contains(&pin) {
            return Err(Error::Io(format!("export pin {pin}: permission denied")));
        }
        inner.exported.insert(pin);
        Ok(())
    }

    fn unexport(&self, pin: u32) -> Result<(), Error> {
        let mut inner = self.inner.lock();
        inner.journal.push(MockOp::Unexport(pin));
        if !inner.exported.remove(&pin) {
            return Err(Error::Io(format!("unexport pin {pin}: not exported")));
        }
        Ok(())
    }

    fn set_direction(&self, pin: u32, direction: Direction) -> Result<(), Error> {
        let mut inner = self.inner.lock();
        inner.journal.push(MockOp::SetDirection(pin, direction));
        if inner.fail_direction.contains(&pin) {
            return Err(Error::Io(format!("set direction of pin {pin}: denied")));
        }
        Ok(())
    }

    fn read_value(&self, pin: u32) -> Result<Level, Error> {
        let mut inner = self.inner.lock();
        inner.journal.push(MockOp::Read(pin));
        if inner.missing_value_file.contains(&pin) {
            return Err(Error::Io(format!("value file of pin {pin} does not exist")));
        }
        if let Some(script) = inner.input_scripts.get_mut(&pin) {
            let level = if script.len() > 1 {
                script.pop_front().unwrap_or(Level::Low)
            } else {
                script.front().copied().unwrap_or(Level::Low)
            };
            inner.values.insert(pin, level);
            return Ok(level);
        }
        Ok(inner.values.get(&pin).copied().unwrap_or(Level::Low))
    }

    fn write_value(&self, pin: u32, level: Level) -> Result<(), Error> {
        let mut inner = self.inner.lock();
        inner.journal.push(MockOp::Write(pin, level));
        if inner.missing_value_file.contains(&pin) {
            return Err(Error::Io(format!("value file of pin {pin} does not exist")));
        }
        inner.values.insert(pin, level);
        Ok(())
    }
}
