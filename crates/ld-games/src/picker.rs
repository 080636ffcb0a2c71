//! Name picker
//!
//! Uniform draw over a roster with a blacklist filter. Picked names move
//! to the drawn list; the partition `drawn ∪ available = roster − blacklist`
//! is rebuilt whenever the roster or blacklist changes.

use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use ld_core::{LdError, LdResult, NotificationSink, Severity};
use ld_state::{AuditLog, NamePool, StateStore, parse_lines, snapshot};

use crate::persist::GameStore;
use crate::phase::GamePhase;
use crate::timing::{RevealProfile, RevealTimeline};

/// State key, doubling as the snapshot version tag
pub const VERSION: &str = "LUCKY_PICKER_V1";

const REQUIRED_FIELDS: &[&str] = &["allNames"];

/// Box shake, then the name card slides out
const SCHEDULE: &[(&str, f64)] = &[("shake", 600.0), ("reveal", 1600.0)];

const DEFAULT_NAMES: &[&str] = &[
    "Alice", "Bob", "Carol", "Dave", "Erin", "Frank", "Grace", "Heidi", "Ivan", "Judy",
];

/// Full persisted state of the picker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PickerState {
    pub version: String,
    #[serde(flatten)]
    pub names: NamePool,
}

impl Default for PickerState {
    fn default() -> Self {
        Self {
            version: VERSION.to_string(),
            names: NamePool::new(DEFAULT_NAMES.iter().map(|s| s.to_string()).collect()),
        }
    }
}

/// Name picker over a persistent store
pub struct PickerController<S: StateStore> {
    store: GameStore<S>,
    state: PickerState,
    logs: AuditLog,
    phase: GamePhase,
    timeline: Option<RevealTimeline>,
    pending: Option<(String, usize)>,
    profile: RevealProfile,
    rng: StdRng,
    sink: Arc<dyn NotificationSink>,
}

impl<S: StateStore> PickerController<S> {
    pub fn new(backend: S, sink: Arc<dyn NotificationSink>) -> Self {
        Self::with_rng(backend, sink, StdRng::from_os_rng())
    }

    pub fn with_rng(backend: S, sink: Arc<dyn NotificationSink>, rng: StdRng) -> Self {
        let store = GameStore::new(backend, VERSION);
        let mut state: PickerState = store.load_state();
        state.names.restore();
        let logs = store.load_logs();
        Self {
            store,
            state,
            logs,
            phase: GamePhase::default(),
            timeline: None,
            pending: None,
            profile: RevealProfile::default(),
            rng,
            sink,
        }
    }

    pub fn set_profile(&mut self, profile: RevealProfile) {
        self.profile = profile;
    }

    pub fn state(&self) -> &PickerState {
        &self.state
    }

    pub fn logs(&self) -> &AuditLog {
        &self.logs
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    /// Name decided for the reveal in flight
    pub fn pending(&self) -> Option<&str> {
        self.pending.as_ref().map(|(name, _)| name.as_str())
    }

    /// Start a pick. Busy cycles and an empty pool are no-ops.
    pub fn pick(&mut self) -> bool {
        if self.phase.is_busy() {
            return false;
        }
        let selected = match self.state.names.peek(&mut self.rng) {
            Ok(selected) => selected,
            Err(_) => {
                self.sink.toast(Severity::Warning, "No names left to pick");
                return false;
            }
        };
        self.pending = Some(selected);
        self.phase = GamePhase::Drawing;
        self.timeline = Some(RevealTimeline::new(self.profile, SCHEDULE));
        true
    }

    /// Drive the reveal clock; commits the pick once the schedule completes
    pub fn tick(&mut self, delta_ms: f64) -> Vec<&'static str> {
        let Some(timeline) = self.timeline.as_mut() else {
            return Vec::new();
        };
        let fired = timeline.advance(delta_ms);
        if !fired.is_empty() {
            self.phase = GamePhase::Revealing;
        }
        if timeline.is_complete() {
            self.finish_pick();
        }
        fired
    }

    fn finish_pick(&mut self) {
        self.timeline = None;
        self.phase = GamePhase::Idle;
        let Some((name, index)) = self.pending.take() else {
            return;
        };
        // the pool may have been edited mid-reveal; re-anchor the index
        let index = if self.state.names.available().get(index) == Some(&name) {
            Some(index)
        } else {
            self.state.names.available().iter().position(|n| *n == name)
        };
        match index.map(|i| self.state.names.commit_draw(i)) {
            Some(Ok(picked)) => {
                self.logs.append("pick", &picked);
                self.store.save_state(&self.state);
                self.store.save_logs(&self.logs);
                self.sink
                    .toast(Severity::Success, &format!("Picked: {picked}"));
            }
            _ => {
                self.sink.toast(Severity::Warning, "Name no longer available");
            }
        }
    }

    /// Put the last picked name back where it was
    pub fn undo(&mut self) -> bool {
        if self.phase.is_busy() {
            return false;
        }
        match self.state.names.undo() {
            Ok(name) => {
                self.logs.append("undo", &name);
                self.store.save_state(&self.state);
                self.store.save_logs(&self.logs);
                self.sink
                    .toast(Severity::Info, &format!("Returned: {name}"));
                true
            }
            Err(_) => {
                self.sink.toast(Severity::Warning, "Nothing to undo");
                false
            }
        }
    }

    /// Replace the roster from editor text, one name per line
    pub fn apply_names(&mut self, text: &str) -> LdResult<()> {
        let names = parse_lines(text, true);
        if names.is_empty() {
            self.sink.toast(Severity::Warning, "Name list is empty");
            return Err(LdError::EmptyPool);
        }
        self.state.names.apply_names(names);
        self.store.save_state(&self.state);
        self.sink.toast(Severity::Success, "Name list saved");
        Ok(())
    }

    /// Replace the blacklist from editor text; an empty text clears it
    pub fn apply_blacklist(&mut self, text: &str) {
        self.state.names.apply_blacklist(parse_lines(text, true));
        self.store.save_state(&self.state);
        self.sink.toast(Severity::Success, "Blacklist saved");
    }

    /// Return every drawn name to the pool
    pub fn clear_drawn(&mut self) {
        if self.phase.is_busy() {
            return;
        }
        let returned = self.state.names.drawn().len();
        self.state.names.clear_drawn();
        self.logs
            .append("clear", &format!("{returned} returned to pool"));
        self.store.save_state(&self.state);
        self.store.save_logs(&self.logs);
        self.sink.toast(Severity::Info, "Drawn list cleared");
    }

    /// Back to defaults, history included
    pub fn reset(&mut self) {
        if self.phase.is_busy() {
            return;
        }
        self.state = PickerState::default();
        self.logs.clear();
        self.pending = None;
        self.store.save_state(&self.state);
        self.store.save_logs(&self.logs);
        self.sink.toast(Severity::Info, "Picker reset");
    }

    /// Validate and apply a snapshot; live state is untouched on failure
    pub fn import(&mut self, raw_json: &str) -> LdResult<()> {
        match snapshot::import_snapshot::<PickerState>(
            raw_json,
            VERSION,
            REQUIRED_FIELDS,
            &PickerState::default(),
        ) {
            Ok((mut state, logs)) => {
                state.names.restore();
                self.state = state;
                if let Some(entries) = logs {
                    self.logs.replace(entries);
                }
                self.store.save_state(&self.state);
                self.store.save_logs(&self.logs);
                self.sink.toast(Severity::Success, "Import complete");
                Ok(())
            }
            Err(e) => {
                self.sink
                    .toast(Severity::Error, &format!("Import failed: {e}"));
                Err(e)
            }
        }
    }

    /// `(filename, pretty JSON)` for download
    pub fn export(&self) -> LdResult<(String, String)> {
        let payload = snapshot::export_snapshot(&self.state, self.logs.entries())?;
        Ok((
            snapshot::export_filename("picker"),
            snapshot::export_text(&payload),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ld_core::NullSink;
    use ld_state::MemoryStore;

    fn controller_on(backend: Arc<MemoryStore>) -> PickerController<Arc<MemoryStore>> {
        let mut c =
            PickerController::with_rng(backend, Arc::new(NullSink), StdRng::seed_from_u64(7));
        c.set_profile(RevealProfile::Instant);
        c
    }

    fn controller() -> PickerController<Arc<MemoryStore>> {
        controller_on(Arc::new(MemoryStore::new()))
    }

    #[test]
    fn test_pick_commits_at_reveal() {
        let mut c = controller();

        assert!(c.pick());
        assert!(c.state().names.drawn().is_empty());
        let decided = c.pending().unwrap().to_string();

        c.tick(0.0);

        assert_eq!(c.state().names.available().len(), DEFAULT_NAMES.len() - 1);
        assert_eq!(c.state().names.drawn(), &[decided]);
        assert_eq!(c.logs().entries()[0].action, "pick");
    }

    #[test]
    fn test_pick_while_busy_is_dropped() {
        let mut c = controller();
        c.set_profile(RevealProfile::Normal);
        assert!(c.pick());
        assert!(!c.pick());
        c.tick(1600.0);
        assert_eq!(c.state().names.drawn().len(), 1);
    }

    #[test]
    fn test_undo_returns_name() {
        let mut c = controller();
        c.pick();
        c.tick(0.0);
        let picked = c.state().names.drawn()[0].clone();

        assert!(c.undo());
        assert!(c.state().names.available().contains(&picked));
        assert!(c.state().names.drawn().is_empty());
        assert!(!c.undo());
    }

    #[test]
    fn test_apply_names_rejects_empty_text() {
        let mut c = controller();
        let before = c.state().clone();
        assert_eq!(c.apply_names("  \n \n"), Err(LdError::EmptyPool));
        assert_eq!(c.state(), &before);
    }

    #[test]
    fn test_blacklist_filters_available_only() {
        let mut c = controller();
        c.pick();
        c.tick(0.0);
        let picked = c.state().names.drawn()[0].clone();

        c.apply_blacklist(&format!("{picked}\nalice"));

        assert_eq!(c.state().names.drawn(), &[picked]);
        assert!(
            !c.state()
                .names
                .available()
                .iter()
                .any(|n| n.eq_ignore_ascii_case("alice"))
        );
    }

    #[test]
    fn test_import_rebuilds_partition_case_insensitively() {
        let mut c = controller();
        let raw = format!(
            r#"{{"version":"{VERSION}","allNames":["Ann","Ben","Cid"],"drawn":["ben"]}}"#
        );
        c.import(&raw).unwrap();

        assert_eq!(
            c.state().names.available(),
            &["Ann".to_string(), "Cid".to_string()]
        );
        assert_eq!(c.state().names.drawn(), &["ben".to_string()]);
    }

    #[test]
    fn test_import_requires_roster_field() {
        let mut c = controller();
        let err = c
            .import(&format!(r#"{{"version":"{VERSION}"}}"#))
            .unwrap_err();
        assert_eq!(err, LdError::MissingField("allNames".into()));
    }

    #[test]
    fn test_reload_restores_partition() {
        let backend = Arc::new(MemoryStore::new());
        {
            let mut c = controller_on(backend.clone());
            c.pick();
            c.tick(0.0);
        }

        let c = controller_on(backend);
        assert_eq!(
            c.state().names.available().len() + c.state().names.drawn().len(),
            DEFAULT_NAMES.len()
        );
        assert_eq!(c.state().names.drawn().len(), 1);
    }

    #[test]
    fn test_export_filename() {
        let c = controller();
        let (filename, _) = c.export().unwrap();
        assert!(filename.starts_with("picker_"));
    }
}
