//! Wires the `log` facade to the shared serial port, the way
//! `TheDigitalVirus-goofy-os`'s `tasks/scheduler.rs` logs every
//! scheduling decision through `serial_println!` -- here that call site
//! is behind `log::info!`/`log::trace!` instead of the macro directly, so
//! the verbosity is a runtime knob rather than baked into call sites.

use log::{Level, LevelFilter, Metadata, Record};

struct SerialLogger;

static LOGGER: SerialLogger = SerialLogger;

impl log::Log for SerialLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= Level::Trace
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            bsp::serial_println!("[{}] {}", record.level(), record.args());
        }
    }

    fn flush(&self) {}
}

/// Installs the serial-backed logger as the global `log` sink. Must run
/// once, before the first `log::info!`/etc. call.
pub fn init(level: LevelFilter) {
    log::set_logger(&LOGGER)
        .map(|()| log::set_max_level(level))
        .expect("logger must be initialized exactly once");
}
