// src/utils/log.rs

//! Centralized logging module with server-style formatting.
//!
//! Provides consistent log output with timestamps and log levels,
//! mirrored to the configured log file.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::sync::{Mutex, OnceLock};

use chrono::Local;

use crate::error::Result;

/// Log level enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }

    fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "debug" => LogLevel::Debug,
            "info" => LogLevel::Info,
            "warn" => LogLevel::Warn,
            "error" => LogLevel::Error,
            _ => LogLevel::Info,
        }
    }
}

/// Current log level
static LOG_LEVEL: OnceLock<LogLevel> = OnceLock::new();

/// File sink shared by all log calls
static LOG_FILE: OnceLock<Mutex<File>> = OnceLock::new();

/// Initialize the logging system with a level and a log file path.
pub fn init(level: &str, log_file: &str) -> Result<()> {
    let _ = LOG_LEVEL.set(LogLevel::from_str(level));
    let file = OpenOptions::new().create(true).append(true).open(log_file)?;
    let _ = LOG_FILE.set(Mutex::new(file));
    Ok(())
}

/// Check if a log level should be displayed
fn should_log(level: LogLevel) -> bool {
    let current = LOG_LEVEL.get().copied().unwrap_or(LogLevel::Info);
    level >= current
}

/// Format a log message with timestamp and level
fn format_log(level: LogLevel, message: &str) -> String {
    let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
    format!("[{}] [{}] {}", timestamp, level.as_str(), message)
}

/// Emit a formatted line to the console and, if configured, the log file.
fn emit(level: LogLevel, message: &str, to_stderr: bool) {
    let line = format_log(level, message);
    if to_stderr {
        eprintln!("{line}");
    } else {
        println!("{line}");
    }

    // File sink failures are swallowed
    if let Some(file) = LOG_FILE.get() {
        if let Ok(mut f) = file.lock() {
            let _ = writeln!(f, "{line}");
        }
    }
}

/// Log a debug message
pub fn debug(message: &str) {
    if should_log(LogLevel::Debug) {
        emit(LogLevel::Debug, message, true);
    }
}

/// Log an info message
pub fn info(message: &str) {
    if should_log(LogLevel::Info) {
        emit(LogLevel::Info, message, false);
    }
}

/// Log a warning message
pub fn warn(message: &str) {
    if should_log(LogLevel::Warn) {
        emit(LogLevel::Warn, message, true);
    }
}

/// Log an error message
pub fn error(message: &str) {
    if should_log(LogLevel::Error) {
        emit(LogLevel::Error, message, true);
    }
}

/// Log a header
pub fn header(title: &str) {
    if should_log(LogLevel::Info) {
        let border = "═".repeat(60);
        emit(LogLevel::Info, &border, false);
        emit(LogLevel::Info, &format!("  {}", title), false);
        emit(LogLevel::Info, &border, false);
    }
}

/// Log a summary section
pub fn summary(title: &str, items: &[(&str, String)]) {
    if should_log(LogLevel::Info) {
        emit(LogLevel::Info, &format!("[SUMMARY] {}", title), false);

        for (key, value) in items {
            emit(LogLevel::Info, &format!("    {}: {}", key, value), false);
        }
    }
}
