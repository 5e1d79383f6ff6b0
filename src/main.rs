use log::info;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use pinloop::{ConfigSource, Cycle, Error, Level, LoopEngine, SysfsBackend, UserLoop};

const BLINK_CYCLES: usize = 20;

/// Five-phase two-LED blink pattern, stepping once per second.
struct DiodeBlinker {
    phase: u8,
    ticks: usize,
}

impl UserLoop for DiodeBlinker {
    fn tick(&mut self, cycle: &mut Cycle<'_>) -> Result<(), Error> {
        let (red, yellow) = match self.phase {
            0 => (Level::Low, Level::Low),
            1 => (Level::High, Level::Low),
            2 => (Level::Low, Level::High),
            3 => (Level::High, Level::High),
            _ => (Level::High, Level::Low),
        };
        cycle.set("red", red)?;
        cycle.set("yellow", yellow)?;

        self.phase = (self.phase + 1) % 5;
        self.ticks += 1;
        if self.ticks >= BLINK_CYCLES {
            cycle.quit();
        }

        thread::sleep(Duration::from_secs(1));
        Ok(())
    }
}

fn main() -> Result<(), Error> {
    env_logger::init();

    let config_path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("PINLOOP_CONFIG").ok())
        .unwrap_or_else(|| "config.json".to_string());

    let backend = match std::env::var("PINLOOP_GPIO_ROOT") {
        Ok(root) => SysfsBackend::with_root(root),
        Err(_) => SysfsBackend::new(),
    };

    info!("Running blink pattern from {config_path}...");

    let mut engine = LoopEngine::new(backend);
    let mut blinker = DiodeBlinker { phase: 0, ticks: 0 };
    engine.run(ConfigSource::File(PathBuf::from(config_path)), &mut blinker)
}
