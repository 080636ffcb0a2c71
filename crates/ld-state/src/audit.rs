//! Append-only draw history
//!
//! Newest-first, hard-capped. Append-only except for truncation on
//! overflow and full replacement on reset or import.

use serde::{Deserialize, Serialize};

use ld_core::clock;

/// Default cap per game
pub const DEFAULT_MAX_LOGS: usize = 100;

/// One logged draw event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Epoch milliseconds
    pub timestamp: i64,
    pub action: String,
    pub result: String,
}

/// Capacity-bounded, newest-first log
#[derive(Debug, Clone)]
pub struct AuditLog {
    entries: Vec<LogEntry>,
    max_logs: usize,
}

impl Default for AuditLog {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_LOGS)
    }
}

impl AuditLog {
    pub fn new(max_logs: usize) -> Self {
        Self {
            entries: Vec::new(),
            max_logs,
        }
    }

    /// Rebuild from stored entries, enforcing the cap
    pub fn from_entries(mut entries: Vec<LogEntry>, max_logs: usize) -> Self {
        entries.truncate(max_logs);
        Self { entries, max_logs }
    }

    /// Insert at the front with the current timestamp, evicting the
    /// oldest entries beyond the cap
    pub fn append(&mut self, action: &str, result: &str) {
        self.entries.insert(
            0,
            LogEntry {
                timestamp: clock::epoch_ms(),
                action: action.to_string(),
                result: result.to_string(),
            },
        );
        self.entries.truncate(self.max_logs);
    }

    /// First `n` entries; `n == 0` means all
    pub fn recent(&self, n: usize) -> &[LogEntry] {
        if n == 0 || n >= self.entries.len() {
            &self.entries
        } else {
            &self.entries[..n]
        }
    }

    /// All entries, newest first
    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    /// Replace wholesale (import with an explicit log list)
    pub fn replace(&mut self, entries: Vec<LogEntry>) {
        self.entries = entries;
        self.entries.truncate(self.max_logs);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
