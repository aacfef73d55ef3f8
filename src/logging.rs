//! Named workflow logger
//!
//! A [`Logger`] writes every message twice: as a formatted line on the
//! host's output channel, and as a `tracing` event under [`LOG_TARGET`]
//! carrying the logger name.

use chrono::Local;
use std::fmt;
use std::sync::Arc;

use crate::env::OutputChannel;

/// Target for diagnostics that must never reach a dialog.
pub const DIAGNOSTIC_TARGET: &str = "janitor::diagnostic";

/// Target of the events mirroring channel lines. Hosts whose channel is
/// already the terminal filter it out.
pub const LOG_TARGET: &str = "janitor::log";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        };
        f.write_str(name)
    }
}

#[derive(Clone)]
pub struct Logger {
    name: String,
    channel: Arc<dyn OutputChannel>,
}

impl Logger {
    pub fn new(name: impl Into<String>, channel: Arc<dyn OutputChannel>) -> Self {
        Self {
            name: name.into(),
            channel,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn log(&self, level: LogLevel, message: &str) {
        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
        self.channel
            .append_line(&format!("{timestamp} {level} [{}] {message}", self.name));

        let logger = self.name.as_str();
        match level {
            LogLevel::Trace => tracing::trace!(target: LOG_TARGET, logger = %logger, "{message}"),
            LogLevel::Debug => tracing::debug!(target: LOG_TARGET, logger = %logger, "{message}"),
            LogLevel::Info => tracing::info!(target: LOG_TARGET, logger = %logger, "{message}"),
            LogLevel::Warn => tracing::warn!(target: LOG_TARGET, logger = %logger, "{message}"),
            LogLevel::Error => tracing::error!(target: LOG_TARGET, logger = %logger, "{message}"),
        }
    }

    pub fn trace(&self, message: &str) {
        self.log(LogLevel::Trace, message);
    }

    pub fn debug(&self, message: &str) {
        self.log(LogLevel::Debug, message);
    }

    pub fn info(&self, message: &str) {
        self.log(LogLevel::Info, message);
    }

    pub fn warn(&self, message: &str) {
        self.log(LogLevel::Warn, message);
    }

    pub fn error(&self, message: &str) {
        self.log(LogLevel::Error, message);
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger").field("name", &self.name).finish()
    }
}
