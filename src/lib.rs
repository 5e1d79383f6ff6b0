pub mod backend;
pub mod buffer;
pub mod config;
pub mod engine;
pub mod error;
pub mod gpio;
pub mod registry;

pub use backend::{MockBackend, MockOp, SysfsBackend};
pub use buffer::IoBuffer;
pub use config::{ConfigSource, LoopConfig};
pub use engine::{Cycle, EngineOptions, EngineState, LoopEngine, UserLoop};
pub use error::Error;
pub use gpio::{Direction, GpioBackend, Level};
pub use registry::{DEFAULT_SETTLE_DELAY, PinRegistry};
