//! Prize wheel
//!
//! Uniform draw over ordered segments; the pool order drives the wheel
//! layout, so the landing segment is decided up front and the pointer
//! animates toward it. Duplicate-allowed mode keeps the segment on the
//! wheel after it wins.

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
pub const VERSION: &str = "LUCKY_WHEEL_V1";

const REQUIRED_FIELDS: &[&str] = &["pool"];

/// One long deceleration, then the pointer settles
const SCHEDULE: &[(&str, f64)] = &[("reveal", 4000.0)];

const DEFAULT_ENTRIES: &[&str] = &[
    "Alice", "Bob", "Carol", "Dave", "Erin", "Frank", "Grace", "Heidi",
];

/// What the wheel draws: people or prizes. Cosmetic only, the pool
/// mechanics are identical.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WheelMode {
    #[default]
    Person,
    Prize,
}

impl WheelMode {
    fn log_action(self) -> &'static str {
        match self {
            Self::Person => "person",
            Self::Prize => "prize",
        }
    }
}

/// Full persisted state of the wheel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WheelState {
    pub version: String,
    pub mode: WheelMode,
    pub allow_duplicate: bool,
    #[serde(flatten)]
    pub entries: NamePool,
}

impl Default for WheelState {
    fn default() -> Self {
        Self {
            version: VERSION.to_string(),
            mode: WheelMode::default(),
            allow_duplicate: false,
            entries: NamePool::new(DEFAULT_ENTRIES.iter().map(|s| s.to_string()).collect()),
        }
    }
}

/// Prize wheel over a persistent store
pub struct WheelController<S: StateStore> {
    store: GameStore<S>,
    state: WheelState,
    logs: AuditLog,
    phase: GamePhase,
    timeline: Option<RevealTimeline>,
    pending: Option<(String, usize)>,
    profile: RevealProfile,
    rng: StdRng,
    sink: Arc<dyn NotificationSink>,
}

impl<S: StateStore> WheelController<S> {
    pub fn new(backend: S, sink: Arc<dyn NotificationSink>) -> Self {
        Self::with_rng(backend, sink, StdRng::from_os_rng())
    }

    pub fn with_rng(backend: S, sink: Arc<dyn NotificationSink>, rng: StdRng) -> Self {
        let store = GameStore::new(backend, VERSION);
        let mut state: WheelState = store.load_state();
        // stored segment order is authoritative; only fold in names the
        // roster has never seen (legacy payloads)
        state.entries.adopt_partition();
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

    pub fn state(&self) -> &WheelState {
        &self.state
    }

    pub fn logs(&self) -> &AuditLog {
        &self.logs
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    /// Landing segment decided for the spin in flight
    pub fn pending(&self) -> Option<(&str, usize)> {
        self.pending
            .as_ref()
            .map(|(name, index)| (name.as_str(), *index))
    }

    /// Start a spin. Busy cycles and an empty wheel are no-ops.
    pub fn spin(&mut self) -> bool {
        if self.phase.is_busy() {
            return false;
        }
        let selected = match self.state.entries.peek(&mut self.rng) {
            Ok(selected) => selected,
            Err(_) => {
                self.sink.toast(Severity::Warning, "The wheel is empty");
                return false;
            }
        };
        self.pending = Some(selected);
        self.phase = GamePhase::Drawing;
        self.timeline = Some(RevealTimeline::new(self.profile, SCHEDULE));
        true
    }

    /// Drive the spin clock; commits the result once the pointer settles
    pub fn tick(&mut self, delta_ms: f64) -> Vec<&'static str> {
        let Some(timeline) = self.timeline.as_mut() else {
            return Vec::new();
        };
        let fired = timeline.advance(delta_ms);
        if timeline.is_complete() {
            self.finish_spin();
        }
        fired
    }

    fn finish_spin(&mut self) {
        self.timeline = None;
        self.phase = GamePhase::Idle;
        let Some((name, index)) = self.pending.take() else {
            return;
        };

        let committed = if self.state.allow_duplicate {
            self.state.entries.mark_drawn_in_place(&name, index);
            Some(name.clone())
        } else {
            // segments edited mid-spin; re-anchor before committing
            let index = if self.state.entries.available().get(index) == Some(&name) {
                Some(index)
            } else {
                self.state
                    .entries
                    .available()
                    .iter()
                    .position(|n| *n == name)
            };
            index.and_then(|i| self.state.entries.commit_draw(i).ok())
        };

        match committed {
            Some(result) => {
                self.logs.append(self.state.mode.log_action(), &result);
                self.store.save_state(&self.state);
                self.store.save_logs(&self.logs);
                self.sink
                    .toast(Severity::Success, &format!("Winner: {result}"));
            }
            None => {
                self.sink
                    .toast(Severity::Warning, "Segment no longer on the wheel");
            }
        }
    }

    /// Reverse the last spin
    ///
    /// In duplicate-allowed mode the segment never left the wheel, so
    /// undo only clears the remembered draw.
    pub fn undo(&mut self) -> bool {
        if self.phase.is_busy() {
            return false;
        }
        match self.state.entries.undo() {
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

    /// Replace the segments from editor text, one entry per line
    pub fn apply_entries(&mut self, text: &str) -> LdResult<()> {
        let entries = parse_lines(text, true);
        if entries.is_empty() {
            self.sink.toast(Severity::Warning, "Segment list is empty");
            return Err(LdError::EmptyPool);
        }
        self.state.entries.apply_names(entries);
        self.store.save_state(&self.state);
        self.sink.toast(Severity::Success, "Wheel saved");
        Ok(())
    }

    pub fn set_mode(&mut self, mode: WheelMode) {
        self.state.mode = mode;
        self.store.save_state(&self.state);
    }

    pub fn set_allow_duplicate(&mut self, allow: bool) {
        self.state.allow_duplicate = allow;
        self.store.save_state(&self.state);
    }

    /// Return every drawn segment to the wheel
    pub fn clear_drawn(&mut self) {
        if self.phase.is_busy() {
            return;
        }
        let returned = self.state.entries.drawn().len();
        self.state.entries.clear_drawn();
        self.logs
            .append("clear", &format!("{returned} back on the wheel"));
        self.store.save_state(&self.state);
        self.store.save_logs(&self.logs);
        self.sink.toast(Severity::Info, "Drawn list cleared");
    }

    /// Back to defaults, history included
    pub fn reset(&mut self) {
        if self.phase.is_busy() {
            return;
        }
        self.state = WheelState::default();
        self.logs.clear();
        self.pending = None;
        self.store.save_state(&self.state);
        self.store.save_logs(&self.logs);
        self.sink.toast(Severity::Info, "Wheel reset");
    }

    /// Validate and apply a snapshot; live state is untouched on failure
    pub fn import(&mut self, raw_json: &str) -> LdResult<()> {
        // legacy exports carry only the pool/drawn partition; an empty
        // baseline roster keeps default names out of the merge, and
        // adopt_partition rebuilds the roster from the payload instead
        let defaults = WheelState {
            entries: NamePool::default(),
            ..WheelState::default()
        };
        match snapshot::import_snapshot::<WheelState>(raw_json, VERSION, REQUIRED_FIELDS, &defaults)
        {
            Ok((mut state, logs)) => {
                state.entries.adopt_partition();
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
            snapshot::export_filename("wheel"),
            snapshot::export_text(&payload),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ld_core::NullSink;
    use ld_state::MemoryStore;

    fn controller() -> WheelController<Arc<MemoryStore>> {
        let mut c = WheelController::with_rng(
            Arc::new(MemoryStore::new()),
            Arc::new(NullSink),
            StdRng::seed_from_u64(21),
        );
        c.set_profile(RevealProfile::Instant);
        c
    }

    #[test]
    fn test_spin_commits_at_pointer_settle() {
        let mut c = controller();

        assert!(c.spin());
        assert!(c.state().entries.drawn().is_empty());
        let (decided, _) = c.pending().map(|(n, i)| (n.to_string(), i)).unwrap();

        c.tick(0.0);

        assert_eq!(c.state().entries.drawn(), &[decided]);
        assert_eq!(c.logs().entries()[0].action, "person");
    }

    #[test]
    fn test_duplicate_mode_keeps_segment_on_wheel() {
        let mut c = controller();
        c.set_allow_duplicate(true);
        let before = c.state().entries.available().len();

        c.spin();
        c.tick(0.0);

        assert_eq!(c.state().entries.available().len(), before);
        assert!(c.state().entries.drawn().is_empty());
        assert_eq!(c.logs().len(), 1);
    }

    #[test]
    fn test_duplicate_mode_undo_leaves_pool_untouched() {
        let mut c = controller();
        c.set_allow_duplicate(true);
        c.spin();
        c.tick(0.0);
        let before = c.state().entries.available().to_vec();

        assert!(c.undo());
        assert_eq!(c.state().entries.available(), before);
        assert!(!c.undo());
    }

    #[test]
    fn test_undo_reinserts_segment() {
        let mut c = controller();
        c.spin();
        c.tick(0.0);
        let name = c.state().entries.drawn()[0].clone();

        assert!(c.undo());
        assert!(c.state().entries.available().contains(&name));
        assert!(c.state().entries.drawn().is_empty());
    }

    #[test]
    fn test_legacy_import_with_partition_only() {
        let mut c = controller();
        let raw = format!(
            r#"{{"version":"{VERSION}","allNames":[],"pool":["Coffee","Tea"],"drawn":["Cake"]}}"#
        );
        c.import(&raw).unwrap();

        assert_eq!(
            c.state().entries.available(),
            &["Coffee".to_string(), "Tea".to_string()]
        );
        assert_eq!(c.state().entries.all_names().len(), 3);
    }

    #[test]
    fn test_legacy_import_without_roster_keeps_defaults_out() {
        let mut c = controller();
        let raw =
            format!(r#"{{"version":"{VERSION}","pool":["Coffee","Tea"],"drawn":["Cake"]}}"#);
        c.import(&raw).unwrap();

        assert_eq!(
            c.state().entries.all_names(),
            &["Coffee".to_string(), "Tea".to_string(), "Cake".to_string()]
        );
        assert_eq!(
            c.state().entries.available().len() + c.state().entries.drawn().len(),
            c.state().entries.all_names().len()
        );

        c.clear_drawn();
        assert!(
            !c.state()
                .entries
                .available()
                .iter()
                .any(|n| DEFAULT_ENTRIES.contains(&n.as_str()))
        );
    }

    #[test]
    fn test_import_requires_pool_field() {
        let mut c = controller();
        let err = c
            .import(&format!(r#"{{"version":"{VERSION}","allNames":[]}}"#))
            .unwrap_err();
        assert_eq!(err, LdError::MissingField("pool".into()));
    }

    #[test]
    fn test_mode_label_reaches_the_log() {
        let mut c = controller();
        c.set_mode(WheelMode::Prize);
        c.spin();
        c.tick(0.0);
        assert_eq!(c.logs().entries()[0].action, "prize");
    }

    #[test]
    fn test_clear_drawn_restores_all_segments() {
        let mut c = controller();
        c.spin();
        c.tick(0.0);
        c.spin();
        c.tick(0.0);

        c.clear_drawn();

        assert_eq!(c.state().entries.available().len(), DEFAULT_ENTRIES.len());
        assert!(c.state().entries.drawn().is_empty());
    }
}
