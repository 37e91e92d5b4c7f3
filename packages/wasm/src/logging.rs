//! `log` backend that writes to the browser console.
//!
//! Core modules log through the `log` macros only. Inside the browser the
//! start hook installs [`ConsoleLogger`]; native builds (tests, tools) are
//! free to install any other `log` backend, or none.

use log::{Level, LevelFilter, Log, Metadata, Record};
use wasm_bindgen::JsValue;

/// Forwards log records to `console.*` through web-sys.
pub struct ConsoleLogger;

static LOGGER: ConsoleLogger = ConsoleLogger;

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let line = JsValue::from(format_record(record));
        match record.level() {
            Level::Error => web_sys::console::error_1(&line),
            Level::Warn => web_sys::console::warn_1(&line),
            Level::Info => web_sys::console::info_1(&line),
            Level::Debug => web_sys::console::debug_1(&line),
            Level::Trace => web_sys::console::log_1(&line),
        }
    }

    fn flush(&self) {}
}

/// `[LEVEL target] message`
pub fn format_record(record: &Record) -> String {
    format!("[{} {}] {}", record.level(), record.target(), record.args())
}

/// Install the console logger. Later calls only change the level.
pub fn init(level: LevelFilter) {
    // set_logger fails if a logger is already installed; keep that one.
    let _ = log::set_logger(&LOGGER);
    log::set_max_level(level);
}

/// Parse a level name ("off", "error", ..., "trace"), case-insensitive.
pub fn parse_level(name: &str) -> Option<LevelFilter> {
    name.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_record() {
        let line = format_record(
            &Record::builder()
                .level(Level::Warn)
                .target("packet_dag_wasm::sim")
                .args(format_args!("round {} empty", 7))
                .build(),
        );
        assert_eq!(line, "[WARN packet_dag_wasm::sim] round 7 empty");
    }

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("debug"), Some(LevelFilter::Debug));
        assert_eq!(parse_level("TRACE"), Some(LevelFilter::Trace));
        assert_eq!(parse_level("off"), Some(LevelFilter::Off));
        assert_eq!(parse_level("loud"), None);
    }
}
