use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Error;
use crate::gpio::{Direction, GpioBackend, Level};

pub const DEFAULT_SYSFS_ROOT: &str = "/sys/class/gpio";

const EXPORT_FILE: &str = "export";
const UNEXPORT_FILE: &str = "unexport";
const DIRECTION_FILE: &str = "direction";
const VALUE_FILE: &str = "value";
const PIN_DIR_PREFIX: &str = "gpio";

/// Backend speaking the Linux sysfs GPIO class ABI: pins are exported and
/// unexported by writing their decimal number to shared control files, and
/// controlled through per-pin `direction`/`value` files.
pub struct SysfsBackend {
    root: PathBuf,
}

impl SysfsBackend {
    pub fn new() -> Self {
        Self::with_root(DEFAULT_SYSFS_ROOT)
    }

    /// Backend rooted at an arbitrary directory instead of `/sys/class/gpio`.
    pub fn with_root<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn pin_file(&self, pin: u32, file: &str) -> PathBuf {
        self.root.join(format!("{PIN_DIR_PREFIX}{pin}")).join(file)
    }

    fn write_control(&self, file: &str, pin: u32) -> Result<(), Error> {
        let path = self.root.join(file);
        fs::write(&path, pin.to_string())
            .map_err(|e| Error::Io(format!("write {} to {}: {e}", pin, path.display())))
    }

    fn value_path(&self, pin: u32) -> Result<PathBuf, Error> {
        let path = self.pin_file(pin, VALUE_FILE);
        if !path.exists() {
            return Err(Error::Io(format!(
                "value file {} does not exist",
                path.display()
            )));
        }
        Ok(path)
    }
}

impl Default for SysfsBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl GpioBackend for SysfsBackend {
    fn export(&self, pin: u32) -> Result<(), Error> {
        self.write_control(EXPORT_FILE, pin)
    }

    fn unexport(&self, pin: u32) -> Result<(), Error> {
        self.write_control(UNEXPORT_FILE, pin)
    }

    fn set_direction(&self, pin: u32, direction: Direction) -> Result<(), Error> {
        let path = self.pin_file(pin, DIRECTION_FILE);
        fs::write(&path, direction.as_str())
            .map_err(|e| Error::Io(format!("set direction of pin {pin}: {e}")))
    }

    fn read_value(&self, pin: u32) -> Result<Level, Error> {
        let path = self.value_path(pin)?;
        let raw = fs::read_to_string(&path)
            .map_err(|e| Error::Io(format!("read value of pin {pin}: {e}")))?;
        raw.trim().parse()
    }

    fn write_value(&self, pin: u32, level: Level) -> Result<(), Error> {
        let path = self.value_path(pin)?;
        fs::write(&path, level.as_str())
            .map_err(|e| Error::Io(format!("write value of pin {pin}: {e}")))
    }
}
