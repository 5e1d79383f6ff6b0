use log::{info, warn};
use std::time::Duration;

use crate::buffer::IoBuffer;
use crate::config::ConfigSource;
use crate::error::Error;
use crate::gpio::{Direction, GpioBackend, Level};
use crate::registry::{DEFAULT_SETTLE_DELAY, PinRegistry};

/// Lifecycle of one engine instance. `Running` is skipped entirely when
/// registration fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Uninitialized,
    Initializing,
    Running,
    Closing,
    Terminated,
}

#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// Pause between exporting a pin batch and assigning directions.
    pub settle_delay: Duration,
    /// Force every registered output to Low before unexporting at close.
    pub reset_outputs_on_close: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            settle_delay: DEFAULT_SETTLE_DELAY,
            reset_outputs_on_close: false,
        }
    }
}

/// Per-iteration handle passed to the user callback. Buffered `get`/`set`
/// work against the iteration caches; the `_now` variants touch the pin
/// immediately.
pub struct Cycle<'a> {
    backend: &'a dyn GpioBackend,
    registry: &'a PinRegistry,
    buffer: &'a mut IoBuffer,
    running: &'a mut bool,
}

impl Cycle<'_> {
    /// Input level sampled at the start of this iteration.
    pub fn get(&self, name: &str) -> Result<Level, Error> {
        self.buffer.get(self.registry, name)
    }

    /// Reads the input pin immediately, bypassing the iteration cache.
    pub fn read_now(&mut self, name: &str) -> Result<Level, Error> {
        self.buffer.read_now(self.backend, self.registry, name)
    }

    /// Stages an output write, committed at the next iteration boundary.
    pub fn set(&mut self, name: &str, level: Level) -> Result<(), Error> {
        self.buffer.set(self.registry, name, level)
    }

    /// Writes the output pin immediately, bypassing the staging buffer.
    pub fn write_now(&mut self, name: &str, level: Level) -> Result<(), Error> {
        self.buffer.write_now(self.backend, self.registry, name, level)
    }

    /// True iff the input went High → Low between the previous and the
    /// current iteration.
    pub fn falling_edge(&self, name: &str) -> bool {
        self.buffer.falling_edge(name)
    }

    /// Asks the engine to stop. Takes effect once the callback returns;
    /// idempotent.
    pub fn quit(&mut self) {
        *self.running = false;
    }
}

/// The application body: invoked once per iteration, after outputs are
/// flushed and inputs refreshed. Implemented for any matching closure.
pub trait UserLoop {
    fn tick(&mut self, cycle: &mut Cycle<'_>) -> Result<(), Error>;
}

impl<F> UserLoop for F
where
    F: FnMut(&mut Cycle<'_>) -> Result<(), Error>,
{
    fn tick(&mut self, cycle: &mut Cycle<'_>) -> Result<(), Error> {
        self(cycle)
    }
}

/// Polling-loop engine tying registration, buffered I/O and the user
/// callback together.
///
/// One `run` call walks the whole lifecycle: pins are registered from the
/// configuration, then each iteration commits staged outputs, refreshes
/// the input caches and invokes the callback, until the callback calls
/// [`Cycle::quit`]. Teardown unexports every pin that was exported, also
/// when registration only partially succeeded.
///
/// Strictly synchronous and single-threaded; every pin operation blocks
/// until the backend call completes.
pub struct LoopEngine<B: GpioBackend> {
    backend: B,
    registry: PinRegistry,
    buffer: IoBuffer,
    options: EngineOptions,
    state: EngineState,
    running: bool,
}

impl<B: GpioBackend> LoopEngine<B> {
    pub fn new(backend: B) -> Self {
        Self::with_options(backend, EngineOptions::default())
    }

    pub fn with_options(backend: B, options: EngineOptions) -> Self {
        Self {
            backend,
            registry: PinRegistry::new(options.settle_delay),
            buffer: IoBuffer::new(),
            options,
            state: EngineState::Uninitialized,
            running: false,
        }
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Runs the loop to completion.
    ///
    /// Registration failures are not errors: they are logged, the loop body
    /// is skipped and teardown still runs. A hard error from inside an
    /// iteration (a missing value file, an error returned by the callback)
    /// propagates out without teardown.
    pub fn run<S>(&mut self, source: S, user: &mut dyn UserLoop) -> Result<(), Error>
    where
        S: Into<ConfigSource>,
    {
        self.state = EngineState::Initializing;
        self.registry.clear();
        self.buffer.clear();
        self.running = true;

        let config = source.into().resolve()?;

        // Inputs first, then outputs. Both batches are attempted even if
        // the first fails, so teardown sees everything that got exported.
        if !self
            .registry
            .register(&self.backend, Direction::In, &config.input)
        {
            self.running = false;
        }
        if !self
            .registry
            .register(&self.backend, Direction::Out, &config.output)
        {
            self.running = false;
        }

        if self.running {
            self.state = EngineState::Running;
            // Priming pass: commit anything staged before the loop and take
            // the first input samples before the callback ever runs.
            self.buffer.flush_delayed(&self.backend, &self.registry)?;
            self.buffer.refresh_inputs(&self.backend, &self.registry)?;
            while self.running {
                self.buffer.flush_delayed(&self.backend, &self.registry)?;
                self.buffer.refresh_inputs(&self.backend, &self.registry)?;
                let mut cycle = Cycle {
                    backend: &self.backend,
                    registry: &self.registry,
                    buffer: &mut self.buffer,
                    running: &mut self.running,
                };
                user.tick(&mut cycle)?;
            }
        }

        self.close();
        Ok(())
    }

    fn close(&mut self) {
        self.state = EngineState::Closing;

        // Writes staged by the final iteration would otherwise be lost.
        if self.buffer.has_pending() {
            if let Err(e) = self.buffer.flush_delayed(&self.backend, &self.registry) {
                warn!("Could not commit staged outputs during close: {e}");
            }
        }

        if self.options.reset_outputs_on_close {
            let outputs: Vec<String> = self.registry.outputs().map(|(name, _)| name.clone()).collect();
            for name in outputs {
                if let Err(e) = self
                    .buffer
                    .write_now(&self.backend, &self.registry, &name, Level::Low)
                {
                    warn!("Could not reset output `{name}` to low: {e}");
                }
            }
        }

        self.registry.unregister_all(&self.backend);
        self.buffer.clear();
        info!("Fin.");
        self.running = false;
        self.state = EngineState::Terminated;
    }
}
