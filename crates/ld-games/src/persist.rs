//! Per-game persistence keys
//!
//! Each game owns two keys in the store: its state under the version tag
//! and its log list under `{tag}_LOGS`. Write failures are logged and
//! swallowed so the game keeps running in memory.

use serde::Serialize;
use serde::de::DeserializeOwned;

use ld_state::{AuditLog, DEFAULT_MAX_LOGS, KeyedStore, StateStore};

/// State + log persistence for one game
#[derive(Debug)]
pub struct GameStore<S: StateStore> {
    store: KeyedStore<S>,
    state_key: &'static str,
    logs_key: String,
}

impl<S: StateStore> GameStore<S> {
    pub fn new(backend: S, state_key: &'static str) -> Self {
        Self {
            store: KeyedStore::new(backend),
            state_key,
            logs_key: format!("{state_key}_LOGS"),
        }
    }

    pub fn load_state<T: DeserializeOwned + Default>(&self) -> T {
        self.store.get_or(self.state_key, T::default())
    }

    pub fn save_state<T: Serialize>(&self, state: &T) {
        if let Err(e) = self.store.set(self.state_key, state) {
            log::warn!("persist: failed to save {}: {e}", self.state_key);
        }
    }

    pub fn load_logs(&self) -> AuditLog {
        AuditLog::from_entries(self.store.get_or(&self.logs_key, Vec::new()), DEFAULT_MAX_LOGS)
    }

    pub fn save_logs(&self, logs: &AuditLog) {
        if let Err(e) = self.store.set(&self.logs_key, &logs.entries()) {
            log::warn!("persist: failed to save {}: {e}", self.logs_key);
        }
    }

    /// Drop both keys
    pub fn clear(&self) {
        self.store.remove(self.state_key);
        self.store.remove(&self.logs_key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ld_state::MemoryStore;
    use serde::Deserialize;
    use std::sync::Arc;

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    struct Sample {
        count: u32,
    }

    #[test]
    fn test_state_roundtrip_and_default() {
        let store = GameStore::new(MemoryStore::new(), "TEST_V1");
        assert_eq!(store.load_state::<Sample>(), Sample::default());

        store.save_state(&Sample { count: 7 });
        assert_eq!(store.load_state::<Sample>(), Sample { count: 7 });
    }

    #[test]
    fn test_logs_live_under_their_own_key() {
        let backend = Arc::new(MemoryStore::new());
        let store = GameStore::new(backend.clone(), "TEST_V1");

        let mut logs = AuditLog::default();
        logs.append("draw", "red");
        store.save_logs(&logs);

        assert!(backend.read("TEST_V1_LOGS").is_some());
        assert!(backend.read("TEST_V1").is_none());
        assert_eq!(store.load_logs().entries()[0].result, "red");
    }

    #[test]
    fn test_clear_drops_both_keys() {
        let backend = Arc::new(MemoryStore::new());
        let store = GameStore::new(backend.clone(), "TEST_V1");
        store.save_state(&Sample { count: 1 });
        store.save_logs(&AuditLog::default());

        store.clear();

        assert!(backend.read("TEST_V1").is_none());
        assert!(backend.read("TEST_V1_LOGS").is_none());
    }
}
