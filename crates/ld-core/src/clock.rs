//! Epoch-ms clock helpers

use chrono::Utc;

/// Current time as epoch milliseconds
pub fn epoch_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// Current date as `YYYY-MM-DD`, used for export filenames
pub fn date_stamp() -> String {
    Utc::now().format("%Y-%m-%d").to_string()
}
