//! Snapshot import/export
//!
//! A snapshot is the full point-in-time serialization of one game's state
//! plus its log. Imports are validated before anything touches live state;
//! exports are deep copies safe to serialize independently of later
//! in-memory mutation.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use ld_core::{LdError, LdResult, clock};

use crate::audit::LogEntry;

/// Validate shape, version tag and required fields
///
/// Fail-fast: the first failing check is reported, required fields in
/// declaration order.
pub fn validate(data: &Value, expected_version: &str, required_fields: &[&str]) -> LdResult<()> {
    let Some(object) = data.as_object() else {
        return Err(LdError::InvalidShape);
    };

    let actual = object
        .get("version")
        .and_then(Value::as_str)
        .unwrap_or("none");
    if actual != expected_version {
        return Err(LdError::VersionMismatch {
            expected: expected_version.to_string(),
            actual: actual.to_string(),
        });
    }

    for field in required_fields {
        if !object.contains_key(*field) {
            return Err(LdError::MissingField((*field).to_string()));
        }
    }

    Ok(())
}

/// Parse, validate and merge an imported snapshot over defaults
///
/// The merge is a shallow field overlay `{..defaults, ..raw, version}`:
/// missing fields inherit defaults, unknown extras are carried, nested
/// structures are wholesale-replaced rather than deep-merged. Returns the
/// merged state and, when the payload carries a `logs` array, the
/// imported log entries for explicit log replacement.
pub fn import_snapshot<T>(
    raw_json: &str,
    expected_version: &str,
    required_fields: &[&str],
    defaults: &T,
) -> LdResult<(T, Option<Vec<LogEntry>>)>
where
    T: Serialize + DeserializeOwned,
{
    let raw: Value =
        serde_json::from_str(raw_json).map_err(|e| LdError::Parse(e.to_string()))?;

    validate(&raw, expected_version, required_fields)?;

    let mut merged = match serde_json::to_value(defaults) {
        Ok(Value::Object(map)) => map,
        _ => return Err(LdError::InvalidShape),
    };

    let mut logs = None;
    if let Value::Object(incoming) = raw {
        for (key, value) in incoming {
            if key == "logs" {
                if let Value::Array(_) = &value {
                    logs = serde_json::from_value(value).ok();
                }
                continue;
            }
            merged.insert(key, value);
        }
    }
    merged.insert("version".to_string(), json!(expected_version));

    let state: T = serde_json::from_value(Value::Object(merged))
        .map_err(|e| LdError::Parse(e.to_string()))?;

    Ok((state, logs))
}

/// Produce the export payload `{..state, exportedAt, logs}`
pub fn export_snapshot<T: Serialize>(state: &T, logs: &[LogEntry]) -> LdResult<Value> {
    let mut object = match serde_json::to_value(state) {
        Ok(Value::Object(map)) => map,
        Ok(_) => return Err(LdError::InvalidShape),
        Err(e) => return Err(LdError::Parse(e.to_string())),
    };

    object.insert("exportedAt".to_string(), json!(clock::epoch_ms()));
    object.insert(
        "logs".to_string(),
        serde_json::to_value(logs).map_err(|e| LdError::Parse(e.to_string()))?,
    );

    Ok(Value::Object(object))
}

/// Export filename convention: `{game}_{ISO-date}.json`
pub fn export_filename(game: &str) -> String {
    format!("{game}_{}.json", clock::date_stamp())
}

/// Pretty-printed export text for file download
pub fn export_text(payload: &Value) -> String {
    serde_json::to_string_pretty(payload).unwrap_or_else(|_| "{}".to_string())
}
