use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Logical state of a digital pin, written to and read from a
/// `gpio<N>/value` file as `"1"`/`"0"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Level {
    Low,
    High,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Low => "0",
            Level::High => "1",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s {
            "0" => Ok(Level::Low),
            "1" => Ok(Level::High),
            other => Err(Error::InvalidValue(format!(
                "expected `0` or `1`, got `{other}`"
            ))),
        }
    }
}

/// Pin direction, written to a `gpio<N>/direction` file as `"in"`/`"out"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    In,
    Out,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::In => "in",
            Direction::Out => "out",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Low-level pin access, shaped after the sysfs GPIO class control surface.
///
/// `SysfsBackend` talks to the kernel; `MockBackend` keeps everything in
/// memory for tests and dry runs.
pub trait GpioBackend {
    fn export(&self, pin: u32) -> Result<(), Error>;
    fn unexport(&self, pin: u32) -> Result<(), Error>;
    fn set_direction(&self, pin: u32, direction: Direction) -> Result<(), Error>;
    fn read_value(&self, pin: u32) -> Result<Level, Error>;
    fn write_value(&self, pin: u32, level: Level) -> Result<(), Error>;
}
