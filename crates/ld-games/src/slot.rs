//! Slot machine
//!
//! Three reels, one outcome. Pool mode consumes finite prize stock and
//! the reels show a triple of the winning symbol; weight mode samples a
//! fixed table with a miss band, and a miss renders as a deliberately
//! broken triple. The outcome is decided at lever pull and committed
//! after the last reel stops.

use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use ld_core::{LdResult, NotificationSink, Severity};
use ld_state::{
    AuditLog, CapacityPool, CapacityUnit, PrizeOutcome, StateStore, UnitSettings, WeightedPrize,
    draw_prize, miss_symbols, snapshot,
};

use crate::persist::GameStore;
use crate::phase::GamePhase;
use crate::timing::{RevealProfile, RevealTimeline};

/// State key, doubling as the snapshot version tag
pub const VERSION: &str = "LUCKY_SLOT_V1";

const REQUIRED_FIELDS: &[&str] = &["mode"];

/// Staggered reel stops, then the lever releases
const SCHEDULE: &[(&str, f64)] = &[
    ("reel_stop_1", 1000.0),
    ("reel_stop_2", 1500.0),
    ("reel_stop_3", 2000.0),
    ("reveal", 2500.0),
];

/// Reel symbol ids, in display order
pub const SYMBOLS: &[&str] = &["seven", "star", "circle", "square", "triangle", "diamond"];

/// Glyph shown on the reel for a symbol id
pub fn glyph(symbol: &str) -> &'static str {
    match symbol {
        "seven" => "7",
        "star" => "★",
        "circle" => "●",
        "square" => "■",
        "triangle" => "▲",
        "diamond" => "◆",
        _ => "?",
    }
}

/// How prizes are drawn: finite stock or a fixed weight table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotMode {
    #[default]
    Pool,
    Weight,
}

/// Outcome of one spin
#[derive(Debug, Clone, PartialEq)]
pub enum SpinOutcome {
    PoolWin(CapacityUnit),
    WeightWin(WeightedPrize),
    Miss,
}

impl SpinOutcome {
    pub fn is_win(&self) -> bool {
        !matches!(self, Self::Miss)
    }
}

/// Full persisted state of the slot machine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SlotState {
    pub version: String,
    pub mode: SlotMode,
    pub pool_items: CapacityPool,
    pub next_item_id: u32,
    pub weight_items: Vec<WeightedPrize>,
    pub miss_weight: u32,
    pub spin_count: u32,
    pub win_count: u32,
    pub miss_count: u32,
}

fn weight_row(symbol: &str, prize: &str, weight: u32) -> WeightedPrize {
    WeightedPrize {
        symbol: symbol.to_string(),
        prize: prize.to_string(),
        weight,
        is_win: true,
    }
}

impl Default for SlotState {
    fn default() -> Self {
        Self {
            version: VERSION.to_string(),
            mode: SlotMode::default(),
            pool_items: CapacityPool::new(vec![
                CapacityUnit::new(1, "Jackpot", "seven", 1),
                CapacityUnit::new(2, "First Prize", "star", 2),
                CapacityUnit::new(3, "Second Prize", "circle", 3),
                CapacityUnit::new(4, "Third Prize", "square", 5),
                CapacityUnit::new(5, "Consolation", "triangle", 10),
            ]),
            next_item_id: 6,
            weight_items: vec![
                weight_row("seven", "Jackpot", 5),
                weight_row("star", "Big Prize", 10),
                weight_row("circle", "Small Prize", 15),
                weight_row("square", "Consolation", 20),
            ],
            miss_weight: 50,
            spin_count: 0,
            win_count: 0,
            miss_count: 0,
        }
    }
}

/// Slot machine over a persistent store
pub struct SlotController<S: StateStore> {
    store: GameStore<S>,
    state: SlotState,
    logs: AuditLog,
    phase: GamePhase,
    timeline: Option<RevealTimeline>,
    pending: Option<(SpinOutcome, [String; 3])>,
    profile: RevealProfile,
    rng: StdRng,
    sink: Arc<dyn NotificationSink>,
}

impl<S: StateStore> SlotController<S> {
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

    pub fn state(&self) -> &SlotState {
        &self.state
    }

    pub fn logs(&self) -> &AuditLog {
        &self.logs
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    /// Outcome and reel faces decided for the spin in flight
    pub fn pending(&self) -> Option<(&SpinOutcome, &[String; 3])> {
        self.pending.as_ref().map(|(o, s)| (o, s))
    }

    /// Pull the lever. Busy cycles and an empty pool are no-ops.
    pub fn spin(&mut self) -> bool {
        if self.phase.is_busy() {
            return false;
        }
        let decided = match self.state.mode {
            SlotMode::Pool => match self.state.pool_items.peek(&mut self.rng) {
                Ok(unit) => {
                    let symbols = [unit.tag.clone(), unit.tag.clone(), unit.tag.clone()];
                    (SpinOutcome::PoolWin(unit), symbols)
                }
                Err(_) => {
                    self.sink.toast(Severity::Warning, "No prizes left");
                    return false;
                }
            },
            SlotMode::Weight => {
                match draw_prize(&mut self.rng, &self.state.weight_items, self.state.miss_weight) {
                    PrizeOutcome::Win(prize) => {
                        let symbols =
                            [prize.symbol.clone(), prize.symbol.clone(), prize.symbol.clone()];
                        (SpinOutcome::WeightWin(prize), symbols)
                    }
                    PrizeOutcome::Miss => {
                        let faces: Vec<String> = SYMBOLS.iter().map(|s| s.to_string()).collect();
                        (SpinOutcome::Miss, miss_symbols(&mut self.rng, &faces))
                    }
                }
            }
        };
        self.pending = Some(decided);
        self.phase = GamePhase::Drawing;
        self.timeline = Some(RevealTimeline::new(self.profile, SCHEDULE));
        true
    }

    /// Drive the reel clock; commits the spin after the last reel stops
    pub fn tick(&mut self, delta_ms: f64) -> Vec<&'static str> {
        let Some(timeline) = self.timeline.as_mut() else {
            return Vec::new();
        };
        let fired = timeline.advance(delta_ms);
        if !fired.is_empty() {
            self.phase = GamePhase::Revealing;
        }
        if timeline.is_complete() {
            self.finish_spin();
        }
        fired
    }

    fn finish_spin(&mut self) {
        self.timeline = None;
        self.phase = GamePhase::Idle;
        let Some((outcome, _)) = self.pending.take() else {
            return;
        };
        self.state.spin_count += 1;

        match outcome {
            SpinOutcome::PoolWin(unit) => match self.state.pool_items.consume(unit.id) {
                Ok(consumed) => {
                    self.state.win_count += 1;
                    self.logs.append("win", &consumed.name);
                    self.sink
                        .toast(Severity::Success, &format!("You won: {}", consumed.name));
                }
                Err(_) => {
                    // settings emptied the slot mid-spin
                    self.state.miss_count += 1;
                    self.logs.append("miss", "no prize");
                    self.sink.toast(Severity::Warning, "Prize no longer available");
                }
            },
            SpinOutcome::WeightWin(prize) => {
                self.state.win_count += 1;
                self.logs.append("win", &prize.prize);
                self.sink
                    .toast(Severity::Success, &format!("You won: {}", prize.prize));
            }
            SpinOutcome::Miss => {
                self.state.miss_count += 1;
                self.logs.append("miss", "no prize");
                self.sink.toast(Severity::Info, "No prize this time");
            }
        }

        self.store.save_state(&self.state);
        self.store.save_logs(&self.logs);
    }

    pub fn set_mode(&mut self, mode: SlotMode) {
        self.state.mode = mode;
        self.store.save_state(&self.state);
    }

    /// Apply the pool settings sheet; consumed counts survive resizing
    pub fn apply_pool_settings(&mut self, rows: &[UnitSettings]) {
        let SlotState {
            pool_items,
            next_item_id,
            ..
        } = &mut self.state;
        pool_items.apply_settings(rows, next_item_id);
        self.store.save_state(&self.state);
        self.sink.toast(Severity::Success, "Settings saved");
    }

    /// Replace the weight table and miss band
    pub fn apply_weight_settings(&mut self, items: Vec<WeightedPrize>, miss_weight: u32) {
        self.state.weight_items = items;
        self.state.miss_weight = miss_weight;
        self.store.save_state(&self.state);
        self.sink.toast(Severity::Success, "Settings saved");
    }

    /// Back to defaults, counters and history included
    pub fn reset(&mut self) {
        if self.phase.is_busy() {
            return;
        }
        self.state = SlotState::default();
        self.logs.clear();
        self.pending = None;
        self.store.save_state(&self.state);
        self.store.save_logs(&self.logs);
        self.sink.toast(Severity::Info, "Machine reset");
    }

    /// Validate and apply a snapshot; live state is untouched on failure
    pub fn import(&mut self, raw_json: &str) -> LdResult<()> {
        match snapshot::import_snapshot::<SlotState>(
            raw_json,
            VERSION,
            REQUIRED_FIELDS,
            &SlotState::default(),
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
            snapshot::export_filename("slot"),
            snapshot::export_text(&payload),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ld_core::{LdError, NullSink};
    use ld_state::MemoryStore;

    fn controller() -> SlotController<Arc<MemoryStore>> {
        let mut c = SlotController::with_rng(
            Arc::new(MemoryStore::new()),
            Arc::new(NullSink),
            StdRng::seed_from_u64(3),
        );
        c.set_profile(RevealProfile::Instant);
        c
    }

    #[test]
    fn test_pool_mode_spin_commits_after_last_reel() {
        let mut c = controller();
        let before = c.state().pool_items.remaining_total();

        assert!(c.spin());
        assert_eq!(c.state().pool_items.remaining_total(), before);
        let (outcome, symbols) = c.pending().unwrap();
        assert!(outcome.is_win());
        assert!(symbols.iter().all(|s| s == &symbols[0]));

        c.tick(0.0);

        assert_eq!(c.state().pool_items.remaining_total(), before - 1);
        assert_eq!(c.state().spin_count, 1);
        assert_eq!(c.state().win_count, 1);
        assert_eq!(c.logs().entries()[0].action, "win");
    }

    #[test]
    fn test_reels_stop_one_at_a_time() {
        let mut c = controller();
        c.set_profile(RevealProfile::Normal);
        assert!(c.spin());

        assert_eq!(c.tick(1000.0), vec!["reel_stop_1"]);
        assert_eq!(c.phase(), GamePhase::Revealing);
        assert!(!c.spin());

        assert_eq!(c.tick(500.0), vec!["reel_stop_2"]);
        assert_eq!(c.tick(500.0), vec!["reel_stop_3"]);
        assert_eq!(c.state().spin_count, 0);

        assert_eq!(c.tick(500.0), vec!["reveal"]);
        assert_eq!(c.phase(), GamePhase::Idle);
        assert_eq!(c.state().spin_count, 1);
    }

    #[test]
    fn test_weight_mode_miss_is_a_broken_triple() {
        let mut c = controller();
        c.set_mode(SlotMode::Weight);
        c.apply_weight_settings(Vec::new(), 1);

        assert!(c.spin());
        let (outcome, symbols) = c.pending().unwrap();
        assert_eq!(outcome, &SpinOutcome::Miss);
        assert!(!(symbols[0] == symbols[1] && symbols[1] == symbols[2]));

        c.tick(0.0);
        assert_eq!(c.state().miss_count, 1);
        assert_eq!(c.state().win_count, 0);
        assert_eq!(c.logs().entries()[0].action, "miss");
    }

    #[test]
    fn test_weight_mode_without_miss_band_always_wins() {
        let mut c = controller();
        c.set_mode(SlotMode::Weight);
        c.apply_weight_settings(vec![weight_row("seven", "Jackpot", 3)], 0);

        for _ in 0..20 {
            c.spin();
            c.tick(0.0);
        }

        assert_eq!(c.state().win_count, 20);
        assert_eq!(c.state().miss_count, 0);
    }

    #[test]
    fn test_depleted_pool_refuses_to_spin() {
        let mut c = controller();
        c.apply_pool_settings(&[UnitSettings::new(Some(1), "Jackpot", "seven", 1)]);

        assert!(c.spin());
        c.tick(0.0);
        assert!(!c.spin());
        assert_eq!(c.state().spin_count, 1);
    }

    #[test]
    fn test_import_requires_mode_field() {
        let mut c = controller();
        let err = c
            .import(&format!(r#"{{"version":"{VERSION}"}}"#))
            .unwrap_err();
        assert_eq!(err, LdError::MissingField("mode".into()));
    }

    #[test]
    fn test_export_filename() {
        let c = controller();
        let (filename, _) = c.export().unwrap();
        assert!(filename.starts_with("slot_"));
    }

    #[test]
    fn test_glyphs_cover_every_symbol() {
        for symbol in SYMBOLS {
            assert_ne!(glyph(symbol), "?");
        }
    }
}
