//! Shared helpers for unit tests

use std::sync::{Arc, Mutex};
use std::thread::ThreadId;
use crate::engine::Engine;
use crate::log::{LogEntry, LogSeverity, Logger};

/// Logger that keeps every entry in memory, tagged with the emitting thread
struct CapturingLogger {
    entries: Arc<Mutex<Vec<(ThreadId, LogEntry)>>>,
}

impl Logger for CapturingLogger {
    fn log(&self, entry: &LogEntry) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push((std::thread::current().id(), entry.clone()));
        }
    }
}

/// Handle over captured logs; restores the default logger on drop.
///
/// Only entries emitted from the thread that installed the capture are
/// reported, so tests running in parallel do not see each other's logs.
/// Tests that install a capture must still be `#[serial]`.
pub struct CapturedLogs {
    thread: ThreadId,
    entries: Arc<Mutex<Vec<(ThreadId, LogEntry)>>>,
}

impl CapturedLogs {
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .filter(|(thread, _)| *thread == self.thread)
            .map(|(_, entry)| entry.clone())
            .collect()
    }

    pub fn count(&self, severity: LogSeverity) -> usize {
        self.entries().iter().filter(|e| e.severity == severity).count()
    }

    pub fn contains(&self, severity: LogSeverity, needle: &str) -> bool {
        self.entries()
            .iter()
            .any(|e| e.severity == severity && e.message.contains(needle))
    }

    pub fn clear(&self) {
        self.entries.lock().unwrap().clear();
    }
}

impl Drop for CapturedLogs {
    fn drop(&mut self) {
        Engine::reset_logger();
    }
}

/// Install a capturing logger for the current test
pub fn capture_logs() -> CapturedLogs {
    let entries = Arc::new(Mutex::new(Vec::new()));
    Engine::set_logger(CapturingLogger { entries: entries.clone() });
    CapturedLogs {
        thread: std::thread::current().id(),
        entries,
    }
}
