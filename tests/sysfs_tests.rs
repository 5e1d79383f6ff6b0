use std::fs;
use std::path::Path;
use std::time::Duration;

use pinloop::{
    ConfigSource, Cycle, Direction, EngineOptions, EngineState, Error, GpioBackend, Level,
    LoopConfig, LoopEngine, SysfsBackend,
};
use tempfile::TempDir;

fn fake_root() -> TempDir {
    let dir = TempDir::new().expect("tempdir");
    fs::write(dir.path().join("export"), "").unwrap();
    fs::write(dir.path().join("unexport"), "").unwrap();
    dir
}

// The kernel creates the per-pin files on export; with a plain directory
// standing in for sysfs they have to exist up front.
fn add_pin(root: &Path, pin: u32, value: &str) {
    let dir = root.join(format!("gpio{pin}"));
    fs::create_dir(&dir).unwrap();
    fs::write(dir.join("direction"), "in").unwrap();
    fs::write(dir.join("value"), value).unwrap();
}

fn read(root: &Path, rel: &str) -> String {
    fs::read_to_string(root.join(rel)).unwrap()
}

#[test]
fn export_and_unexport_write_the_decimal_pin_number() {
    let root = fake_root();
    let backend = SysfsBackend::with_root(root.path());

    backend.export(17).expect("export");
    assert_eq!(read(root.path(), "export"), "17");

    backend.unexport(17).expect("unexport");
    assert_eq!(read(root.path(), "unexport"), "17");
}

#[test]
fn direction_and_value_files_hold_the_textual_forms() {
    let root = fake_root();
    add_pin(root.path(), 17, "0");
    let backend = SysfsBackend::with_root(root.path());

    backend.set_direction(17, Direction::Out).expect("direction");
    assert_eq!(read(root.path(), "gpio17/direction"), "out");

    backend.write_value(17, Level::High).expect("write");
    assert_eq!(read(root.path(), "gpio17/value"), "1");
    assert_eq!(backend.read_value(17).expect("read"), Level::High);

    backend.write_value(17, Level::Low).expect("write");
    assert_eq!(backend.read_value(17).expect("read"), Level::Low);
}

#[test]
fn read_trims_whitespace() {
    let root = fake_root();
    add_pin(root.path(), 27, "1\n");
    let backend = SysfsBackend::with_root(root.path());

    assert_eq!(backend.read_value(27).expect("read"), Level::High);
}

#[test]
fn missing_value_file_is_an_io_error() {
    let root = fake_root();
    let backend = SysfsBackend::with_root(root.path());

    assert!(matches!(backend.read_value(99), Err(Error::Io(_))));
    assert!(matches!(
        backend.write_value(99, Level::High),
        Err(Error::Io(_))
    ));
}

#[test]
fn junk_value_content_is_invalid() {
    let root = fake_root();
    add_pin(root.path(), 27, "z");
    let backend = SysfsBackend::with_root(root.path());

    assert!(matches!(
        backend.read_value(27),
        Err(Error::InvalidValue(_))
    ));
}

#[test]
fn full_run_against_a_fake_sysfs_tree() {
    let root = fake_root();
    add_pin(root.path(), 17, "0");
    add_pin(root.path(), 27, "1");

    let config: LoopConfig =
        serde_json::from_str(r#"{"input":{"button":27},"output":{"led":17}}"#).unwrap();
    let mut engine = LoopEngine::with_options(
        SysfsBackend::with_root(root.path()),
        EngineOptions {
            settle_delay: Duration::ZERO,
            reset_outputs_on_close: false,
        },
    );

    let mut observed = None;
    let mut tick = |cycle: &mut Cycle<'_>| -> Result<(), Error> {
        observed = Some(cycle.get("button")?);
        cycle.set("led", Level::High)?;
        cycle.quit();
        Ok(())
    };
    engine
        .run(ConfigSource::Inline(config), &mut tick)
        .expect("run completes");

    assert_eq!(observed, Some(Level::High));
    assert_eq!(engine.state(), EngineState::Terminated);
    assert_eq!(read(root.path(), "gpio17/direction"), "out");
    assert_eq!(read(root.path(), "gpio17/value"), "1");
    assert_eq!(read(root.path(), "gpio27/direction"), "in");
    // Both pins went through the unexport control file at teardown.
    let unexported = read(root.path(), "unexport");
    assert!(unexported == "17" || unexported == "27");
}
