// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 U.S. Federal Government (in countries where recognized)
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Injected logging for the signing workflow.
//!
//! Library components never reach for a global logger. They receive a
//! [`Logger`] and emit leveled [`LogEntry`] values through it:
//!
//! - [`TracingLogger`] forwards to `tracing` and is what the `tgsign`
//!   binary uses once its subscriber is installed.
//! - [`MemoryLogger`] keeps entries in memory, for tests and for callers
//!   that want to inspect what happened.
//!
//! # Example
//!
//! ```
//! use tgsign::logging::{LogLevel, Logger, MemoryLogger};
//!
//! let logger = MemoryLogger::new();
//! logger.info("Loading config");
//! logger.log_with_fields(LogLevel::Error, "Signing failed", &[("api_id", "ops")]);
//!
//! assert_eq!(logger.entries().len(), 2);
//! ```

use std::sync::Mutex;

/// Log level for filtering messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum LogLevel {
    /// Debug information.
    Debug = 1,
    /// Informational messages.
    #[default]
    Info = 2,
    /// Warnings.
    Warn = 3,
    /// Errors only.
    Error = 4,
}

impl LogLevel {
    /// Get the level name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A log entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    /// Log level.
    pub level: LogLevel,
    /// Log message.
    pub message: String,
    /// Structured fields, in insertion order.
    pub fields: Vec<(String, String)>,
}

impl LogEntry {
    /// Create a new log entry.
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            fields: Vec::new(),
        }
    }

    /// Add a field to the entry.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((key.into(), value.into()));
        self
    }

    /// Format as plain text: the message followed by `key=value` pairs.
    pub fn format_text(&self) -> String {
        let mut parts = vec![self.message.clone()];

        for (k, v) in &self.fields {
            parts.push(format!("{}={}", k, v));
        }

        parts.join(" ")
    }
}

/// A destination for workflow log entries.
///
/// Only [`Logger::log`] is required; the leveled helpers build an entry and
/// hand it to it.
pub trait Logger: Send + Sync {
    /// Log an entry.
    fn log(&self, entry: &LogEntry);

    /// Log at debug level.
    fn debug(&self, message: &str) {
        self.log(&LogEntry::new(LogLevel::Debug, message));
    }

    /// Log at info level.
    fn info(&self, message: &str) {
        self.log(&LogEntry::new(LogLevel::Info, message));
    }

    /// Log at error level.
    fn error(&self, message: &str) {
        self.log(&LogEntry::new(LogLevel::Error, message));
    }

    /// Log with structured fields.
    fn log_with_fields(&self, level: LogLevel, message: &str, fields: &[(&str, &str)]) {
        let mut entry = LogEntry::new(level, message);
        for (k, v) in fields {
            entry = entry.with_field(*k, *v);
        }
        self.log(&entry);
    }
}

/// Logger that forwards entries to the `tracing` subscriber.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn log(&self, entry: &LogEntry) {
        let line = entry.format_text();
        match entry.level {
            LogLevel::Debug => tracing::debug!("{}", line),
            LogLevel::Info => tracing::info!("{}", line),
            LogLevel::Warn => tracing::warn!("{}", line),
            LogLevel::Error => tracing::error!("{}", line),
        }
    }
}

/// Logger that keeps every entry in memory.
#[derive(Debug, Default)]
pub struct MemoryLogger {
    entries: Mutex<Vec<LogEntry>>,
}

impl MemoryLogger {
    /// Create an empty in-memory logger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the entries logged so far.
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }

    /// Returns true if any entry's text contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.entries()
            .iter()
            .any(|entry| entry.format_text().contains(needle))
    }
}

impl Logger for MemoryLogger {
    fn log(&self, entry: &LogEntry) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push(entry.clone());
        }
    }
}
