//! Test logger that keeps every `log` record so tests can assert on them.

use log::{Level, LevelFilter, Log, Metadata, Record};
use std::sync::{Mutex, Once};

struct CaptureLogger;

static RECORDS: Mutex<Vec<(Level, String)>> = Mutex::new(Vec::new());
static INIT: Once = Once::new();

impl Log for CaptureLogger {
    fn enabled(&self, _: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        if let Ok(mut records) = RECORDS.lock() {
            records.push((record.level(), record.args().to_string()));
        }
    }

    fn flush(&self) {}
}

pub fn init() {
    INIT.call_once(|| {
        let _ = log::set_logger(&CaptureLogger);
        log::set_max_level(LevelFilter::Trace);
    });
}

/// Whether a record at `level` containing `needle` was logged by any test.
pub fn logged(level: Level, needle: &str) -> bool {
    RECORDS
        .lock()
        .map(|records| records.iter().any(|(l, msg)| *l == level && msg.contains(needle)))
        .unwrap_or(false)
}
