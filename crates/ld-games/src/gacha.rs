//! Capsule gacha machine
//!
//! Finite capsule colors deplete as draws consume them. The outcome is
//! decided the moment the lever is pulled and committed when the capsule
//! opens at the end of the reveal.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use ld_core::{LdResult, NotificationSink, Severity};
use ld_state::{AuditLog, CapacityPool, CapacityUnit, StateStore, UnitSettings, snapshot};

use crate::persist::GameStore;
use crate::phase::GamePhase;
use crate::timing::{RevealProfile, RevealTimeline};

/// State key, doubling as the snapshot version tag
pub const VERSION: &str = "LUCKY_GACHA_V1";

const REQUIRED_FIELDS: &[&str] = &["colors"];

/// Machine shake, capsule drop, prize card
const SCHEDULE: &[(&str, f64)] = &[("capsule_drop", 500.0), ("reveal", 1300.0)];

/// Capsule colors handed out when a slot is added without one
const PALETTE: &[&str] = &[
    "#ef4444", "#f97316", "#f59e0b", "#22c55e", "#14b8a6", "#3b82f6", "#8b5cf6", "#ec4899",
];

/// Full persisted state of the gacha machine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GachaState {
    pub version: String,
    pub colors: CapacityPool,
    pub drawn_count: u32,
    pub next_color_id: u32,
}

impl Default for GachaState {
    fn default() -> Self {
        Self {
            version: VERSION.to_string(),
            colors: CapacityPool::new(vec![
                CapacityUnit::new(1, "Grand Prize", "#ef4444", 1),
                CapacityUnit::new(2, "First Prize", "#f59e0b", 2),
                CapacityUnit::new(3, "Second Prize", "#22c55e", 5),
                CapacityUnit::new(4, "Third Prize", "#3b82f6", 10),
                CapacityUnit::new(5, "Consolation", "#8b5cf6", 20),
            ]),
            drawn_count: 0,
            next_color_id: 6,
        }
    }
}

/// Gacha machine over a persistent store
pub struct GachaController<S: StateStore> {
    store: GameStore<S>,
    state: GachaState,
    logs: AuditLog,
    phase: GamePhase,
    timeline: Option<RevealTimeline>,
    pending: Option<CapacityUnit>,
    profile: RevealProfile,
    rng: StdRng,
    sink: Arc<dyn NotificationSink>,
}

impl<S: StateStore> GachaController<S> {
    pub fn new(backend: S, sink: Arc<dyn NotificationSink>) -> Self {
        Self::with_rng(backend, sink, StdRng::from_os_rng())
    }

    pub fn with_rng(backend: S, sink: Arc<dyn NotificationSink>, rng: StdRng) -> Self {
        let store = GameStore::new(backend, VERSION);
        let state = store.load_state();
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

    pub fn state(&self) -> &GachaState {
        &self.state
    }

    pub fn logs(&self) -> &AuditLog {
        &self.logs
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    /// Outcome decided for the reveal in flight
    pub fn pending(&self) -> Option<&CapacityUnit> {
        self.pending.as_ref()
    }

    /// Pull the lever. Busy cycles and an empty machine are no-ops.
    pub fn draw(&mut self) -> bool {
        if self.phase.is_busy() {
            return false;
        }
        let unit = match self.state.colors.peek(&mut self.rng) {
            Ok(unit) => unit,
            Err(_) => {
                self.sink.toast(Severity::Warning, "No capsules left");
                return false;
            }
        };
        self.pending = Some(unit);
        self.phase = GamePhase::Drawing;
        self.timeline = Some(RevealTimeline::new(self.profile, SCHEDULE));
        true
    }

    /// Drive the reveal clock; commits the draw once the schedule completes
    pub fn tick(&mut self, delta_ms: f64) -> Vec<&'static str> {
        let Some(timeline) = self.timeline.as_mut() else {
            return Vec::new();
        };
        let fired = timeline.advance(delta_ms);
        if !fired.is_empty() {
            self.phase = GamePhase::Revealing;
        }
        if timeline.is_complete() {
            self.finish_draw();
        }
        fired
    }

    fn finish_draw(&mut self) {
        self.timeline = None;
        self.phase = GamePhase::Idle;
        let Some(unit) = self.pending.take() else {
            return;
        };
        match self.state.colors.consume(unit.id) {
            Ok(consumed) => {
                self.state.drawn_count += 1;
                self.logs.append("draw", &consumed.name);
                self.store.save_state(&self.state);
                self.store.save_logs(&self.logs);
                self.sink
                    .toast(Severity::Success, &format!("You got: {}", consumed.name));
            }
            Err(_) => {
                // settings changed mid-reveal and emptied the slot
                self.sink.toast(Severity::Warning, "Capsule no longer available");
            }
        }
    }

    /// Put the last capsule back
    pub fn undo(&mut self) -> bool {
        if self.phase.is_busy() {
            return false;
        }
        match self.state.colors.undo() {
            Ok(unit) => {
                self.state.drawn_count = self.state.drawn_count.saturating_sub(1);
                self.logs.append("undo", &unit.name);
                self.store.save_state(&self.state);
                self.store.save_logs(&self.logs);
                self.sink
                    .toast(Severity::Info, &format!("Returned: {}", unit.name));
                true
            }
            Err(_) => {
                self.sink.toast(Severity::Warning, "Nothing to undo");
                false
            }
        }
    }

    /// Append a color slot with a palette color, returning its id
    pub fn add_color(&mut self, name: &str, total: u32) -> u32 {
        let color = PALETTE[self.rng.random_range(0..PALETTE.len())];
        let id = self.state.next_color_id;
        self.state.next_color_id += 1;
        self.state.colors.add_unit(id, name, color, total);
        self.store.save_state(&self.state);
        id
    }

    pub fn remove_color(&mut self, id: u32) {
        self.state.colors.remove_unit(id);
        self.store.save_state(&self.state);
    }

    /// Apply the settings sheet; consumed counts survive resizing
    pub fn apply_settings(&mut self, rows: &[UnitSettings]) {
        let GachaState {
            colors,
            next_color_id,
            ..
        } = &mut self.state;
        colors.apply_settings(rows, next_color_id);
        self.store.save_state(&self.state);
        self.sink.toast(Severity::Success, "Settings saved");
    }

    /// Back to defaults, history included
    pub fn reset(&mut self) {
        if self.phase.is_busy() {
            return;
        }
        self.state = GachaState::default();
        self.logs.clear();
        self.pending = None;
        self.store.save_state(&self.state);
        self.store.save_logs(&self.logs);
        self.sink.toast(Severity::Info, "Machine reset");
    }

    /// Validate and apply a snapshot; live state is untouched on failure
    pub fn import(&mut self, raw_json: &str) -> LdResult<()> {
        match snapshot::import_snapshot::<GachaState>(
            raw_json,
            VERSION,
            REQUIRED_FIELDS,
            &GachaState::default(),
        ) {
            Ok((state, logs)) => {
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
            snapshot::export_filename("gacha"),
            snapshot::export_text(&payload),
        ))
    }
}
