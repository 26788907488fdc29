use std::sync::{Arc, Mutex};

/// Logging capability handed to steps at construction.
pub trait Log: Send + Sync {
    fn info(&self, message: &str);
    fn debug(&self, message: &str);
}

/// Routes step messages into the process-wide `tracing` subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLog;

impl Log for TracingLog {
    fn info(&self, message: &str) {
        tracing::info!("{message}");
    }

    fn debug(&self, message: &str) {
        tracing::debug!("{message}");
    }
}

/// Debug sink for conversion diagnostics. Only built when debug output was
/// requested; every line is tagged `[debug] `.
#[derive(Clone)]
pub struct DebugLog {
    inner: Arc<dyn Log>,
}

impl DebugLog {
    pub fn new(inner: Arc<dyn Log>) -> Self {
        Self { inner }
    }

    pub fn log(&self, message: &str) {
        self.inner.info(&format!("[debug] {message}"));
    }
}

impl std::fmt::Debug for DebugLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("DebugLog")
    }
}

/// Keeps every message in memory, in emission order.
#[derive(Debug, Default)]
pub struct RecordingLog {
    lines: Mutex<Vec<String>>,
}

impl RecordingLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().map(|l| l.clone()).unwrap_or_default()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.lines().iter().any(|l| l.contains(needle))
    }

    fn push(&self, line: String) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(line);
        }
    }
}

impl Log for RecordingLog {
    fn info(&self, message: &str) {
        self.push(message.to_string());
    }

    fn debug(&self, message: &str) {
        self.push(message.to_string());
    }
}
