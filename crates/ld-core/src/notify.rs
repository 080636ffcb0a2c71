//! Notification sink for user-visible outcomes
//!
//! The core reports every user-visible outcome (draw success, empty pool,
//! import failure, reset) through this fire-and-forget contract. Delivery
//! is never depended on.

use serde::{Deserialize, Serialize};

/// Default display duration in milliseconds
pub const DEFAULT_DURATION_MS: u32 = 3000;

/// Message severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Error,
    Info,
    Warning,
}

/// Fire-and-forget message sink
pub trait NotificationSink {
    fn notify(&self, severity: Severity, message: &str, duration_ms: u32);

    /// Convenience wrapper using the default display duration
    fn toast(&self, severity: Severity, message: &str) {
        self.notify(severity, message, DEFAULT_DURATION_MS);
    }
}

/// Sink that routes messages to the `log` facade
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl NotificationSink for LogSink {
    fn notify(&self, severity: Severity, message: &str, _duration_ms: u32) {
        match severity {
            Severity::Error => log::error!("{message}"),
            Severity::Warning => log::warn!("{message}"),
            Severity::Success | Severity::Info => log::info!("{message}"),
        }
    }
}

/// Sink that discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl NotificationSink for NullSink {
    fn notify(&self, _severity: Severity, _message: &str, _duration_ms: u32) {}
}
