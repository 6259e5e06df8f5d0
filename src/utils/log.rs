// File: log.rs
// Created: 2026-03-02 10:12:44

// Colored prefixes for stderr logging. Pipeline code never prints directly;
// it receives a `LogSink` so callers (CLI, tests) decide where messages go.

use std::sync::Mutex;

pub const INFO: &str = "\x1b[1;32m[INFO]\x1b[0m";
pub const FAIL: &str = "\x1b[1;31m[FAIL]\x1b[0m";
pub const WARN: &str = "\x1b[1;33m[WARN]\x1b[0m";
pub const DONE: &str = "\x1b[1;34m[DONE]\x1b[0m";
pub const DBUG: &str = "\x1b[1;35m[DBUG]\x1b[0m";

pub fn log_msg(prefix: &str, msg: &str) -> String { format!("{} {}", prefix, msg) }
pub fn print_log_msg(prefix: &str, msg: &str) { eprintln!("{}", log_msg(prefix, msg)); }

/// Verbosity, ordered from quietest to loudest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Error,
    Warning,
    Info,
    Debug,
}

impl LogLevel {
    pub fn get_with_str(level: &str) -> Option<Self> {
        match level.to_ascii_lowercase().as_str() {
            "error" => Some(LogLevel::Error),
            "warning" | "warn" => Some(LogLevel::Warning),
            "info" => Some(LogLevel::Info),
            "debug" => Some(LogLevel::Debug),
            _ => None,
        }
    }

    pub fn prefix(&self) -> &'static str {
        match self {
            LogLevel::Error => FAIL,
            LogLevel::Warning => WARN,
            LogLevel::Info => INFO,
            LogLevel::Debug => DBUG,
        }
    }
}

/// Destination for pipeline messages.
pub trait LogSink: Send + Sync {
    fn log(&self, level: LogLevel, msg: &str);

    fn error(&self, msg: &str) { self.log(LogLevel::Error, msg); }
    fn warn(&self, msg: &str) { self.log(LogLevel::Warning, msg); }
    fn info(&self, msg: &str) { self.log(LogLevel::Info, msg); }
    fn debug(&self, msg: &str) { self.log(LogLevel::Debug, msg); }
}

/// Prints messages at or above `level` to stderr with colored prefixes.
#[derive(Debug, Clone, Copy)]
pub struct StderrSink {
    pub level: LogLevel,
}

impl StderrSink {
    pub fn new(level: LogLevel) -> Self {
        StderrSink { level }
    }
}

impl Default for StderrSink {
    fn default() -> Self {
        StderrSink { level: LogLevel::Warning }
    }
}

impl LogSink for StderrSink {
    fn log(&self, level: LogLevel, msg: &str) {
        if level <= self.level {
            print_log_msg(level.prefix(), msg);
        }
    }
}

/// Keeps every message in memory. Used by tests to check what was reported.
#[derive(Debug, Default)]
pub struct MemorySink {
    messages: Mutex<Vec<(LogLevel, String)>>,
}

impl MemorySink {
    pub fn new() -> Self {
        MemorySink::default()
    }

    pub fn messages(&self) -> Vec<(LogLevel, String)> {
        match self.messages.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn warnings(&self) -> Vec<String> {
        self.messages()
            .into_iter()
            .filter(|(level, _)| *level == LogLevel::Warning)
            .map(|(_, msg)| msg)
            .collect()
    }
}

impl LogSink for MemorySink {
    fn log(&self, level: LogLevel, msg: &str) {
        match self.messages.lock() {
            Ok(mut guard) => guard.push((level, msg.to_string())),
            Err(poisoned) => poisoned.into_inner().push((level, msg.to_string())),
        }
    }
}

/// Evaluate an expression and report its wall time through a sink at INFO.
#[macro_export]
macro_rules! measure_time {
    ($sink:expr, $label:expr, $e:expr) => {{
        let start = std::time::Instant::now();
        let result = $e;
        $sink.info(&format!("{} took {:.3?}", $label, start.elapsed()));
        result
    }};
}
