pub mod mock;
pub mod sysfs;

pub use mock::{MockBackend, MockOp};
pub use sysfs::SysfsBackend;
