//! Structured logging system with visual formatting.
//!
//! This module provides the logging handle used throughout rgbshift. Instead of a
//! process-wide singleton, a [`Log`] value is created once in `main` and handed to
//! every component that needs to report something. Clones share the same enable
//! switch, so quieting one handle quiets all of them.
//!
//! Verbosity follows the usual convention:
//! - `0`: operational messages only
//! - `1`: debug output (interpolation fractions, connection details)
//! - `2`: trace output (neighbouring keyframes, raw socket traffic)

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Log level enumeration for categorizing message importance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Log,  // Normal operational logs
    Warn, // Warning messages (non-fatal issues)
    Err,  // Error messages
    Crit, // Critical errors (process will terminate)
    Info, // Informational messages (status updates)
}

impl LogLevel {
    fn prefix(self) -> &'static str {
        match self {
            LogLevel::Log => "[LOG]",
            LogLevel::Warn => "[WARN]",
            LogLevel::Err => "[ERR]",
            LogLevel::Crit => "[CRIT]",
            LogLevel::Info => "[INFO]",
        }
    }
}

/// Injected logging capability providing structured output formatting.
#[derive(Debug, Clone)]
pub struct Log {
    enabled: Arc<AtomicBool>,
    verbosity: u8,
    name: Option<&'static str>,
}

impl Default for Log {
    fn default() -> Self {
        Self::new(0)
    }
}

impl Log {
    /// Create a new enabled logger with the given verbosity.
    pub fn new(verbosity: u8) -> Self {
        Self {
            enabled: Arc::new(AtomicBool::new(true)),
            verbosity,
            name: None,
        }
    }

    /// Create a logger that prints nothing until re-enabled.
    ///
    /// Used by tests so assertions are not interleaved with decorated output.
    pub fn quiet() -> Self {
        let log = Self::new(0);
        log.set_enabled(false);
        log
    }

    /// Derive a handle for a named component.
    ///
    /// The name is prefixed to leveled messages; the enable switch stays shared.
    pub fn named(&self, name: &'static str) -> Self {
        Self {
            enabled: Arc::clone(&self.enabled),
            verbosity: self.verbosity,
            name: Some(name),
        }
    }

    /// Enable or disable output for this handle and all of its clones.
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }

    /// Check if logging is currently enabled.
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    pub fn verbosity(&self) -> u8 {
        self.verbosity
    }

    /// Whether messages at the given verbosity level would be shown.
    pub fn v(&self, level: u8) -> bool {
        self.is_enabled() && self.verbosity >= level
    }

    /// Main log function with level-based prefixes.
    ///
    /// # Arguments
    /// * `level` - LogLevel indicating message importance
    /// * `message` - Text content to log
    pub fn log(&self, level: LogLevel, message: &str) {
        if !self.is_enabled() {
            return;
        }

        match self.name {
            Some(name) => println!("{} [{}] {}", level.prefix(), name, message),
            None => println!("{} {}", level.prefix(), message),
        }
    }

    // ═══ Convenience Methods for Common Log Levels ═══

    pub fn log_error(&self, message: &str) {
        self.log(LogLevel::Err, message);
    }

    pub fn log_warning(&self, message: &str) {
        self.log(LogLevel::Warn, message);
    }

    pub fn log_info(&self, message: &str) {
        self.log(LogLevel::Info, message);
    }

    pub fn log_critical(&self, message: &str) {
        self.log(LogLevel::Crit, message);
    }

    /// Log a debug message, shown from verbosity 1.
    pub fn log_debug(&self, message: &str) {
        if self.v(1) {
            self.log(LogLevel::Log, message);
        }
    }

    /// Log a trace message, shown from verbosity 2.
    pub fn log_trace(&self, message: &str) {
        if self.v(2) {
            self.log(LogLevel::Log, message);
        }
    }

    // ═══ Visual Formatting Functions ═══

    /// Log a decorated message with visual branching indicator.
    pub fn log_decorated(&self, message: &str) {
        if !self.is_enabled() {
            return;
        }
        println!("┣ {}", message);
    }

    /// Log an indented message for sub-items or details.
    pub fn log_indented(&self, message: &str) {
        if !self.is_enabled() {
            return;
        }
        println!("┃   {}", message);
    }

    pub fn log_pipe(&self) {
        if !self.is_enabled() {
            return;
        }
        println!("┃");
    }

    /// Log a block start message with visual separation.
    pub fn log_block_start(&self, message: &str) {
        if !self.is_enabled() {
            return;
        }
        println!("┃");
        println!("┣ {}", message);
    }

    /// Log the application version header.
    pub fn log_version(&self) {
        if !self.is_enabled() {
            return;
        }
        println!("┏ rgbshift v{} ━━╸", env!("CARGO_PKG_VERSION"));
        println!("┃");
    }

    /// Log the final termination marker.
    pub fn log_end(&self) {
        if !self.is_enabled() {
            return;
        }
        println!("╹");
    }
}
