//! Scratch cards
//!
//! Each card's prize is decided when the card is prepared and committed
//! only when enough of the foil is scratched off. Pool mode consumes
//! finite stock; weight mode samples a fixed table whose losing entries
//! are explicit rows. An optional per-session card limit caps how many
//! cards can be scratched.

use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use ld_core::{LdResult, NotificationSink, Severity};
use ld_state::{
    AuditLog, CapacityPool, CapacityUnit, PrizeOutcome, StateStore, UnitSettings, WeightedPrize,
    draw_prize, snapshot,
};

use crate::persist::GameStore;

/// State key, doubling as the snapshot version tag
pub const VERSION: &str = "LUCKY_SCRATCH_V1";

const REQUIRED_FIELDS: &[&str] = &["mode"];

/// How card prizes are drawn: finite stock or a fixed weight table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScratchMode {
    #[default]
    Pool,
    Weight,
}

/// Prize hidden under the current card's foil
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardPrize {
    pub prize: String,
    pub is_win: bool,
    /// Pool unit to consume at reveal; `None` in weight mode
    #[serde(default)]
    pub unit_id: Option<u32>,
}

/// One revealed card in the running session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResult {
    pub prize: String,
    pub is_win: bool,
}

/// Full persisted state of the scratch game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScratchState {
    pub version: String,
    pub mode: ScratchMode,
    /// Cards per session; `0` means unlimited
    pub max_cards: u32,
    pub pool_items: CapacityPool,
    pub next_item_id: u32,
    pub weight_items: Vec<WeightedPrize>,
    pub session_results: Vec<SessionResult>,
    pub current_prize: Option<CardPrize>,
    pub is_revealed: bool,
    pub scratched_count: u32,
}

fn weight_row(prize: &str, weight: u32, is_win: bool) -> WeightedPrize {
    WeightedPrize {
        symbol: String::new(),
        prize: prize.to_string(),
        weight,
        is_win,
    }
}

impl Default for ScratchState {
    fn default() -> Self {
        Self {
            version: VERSION.to_string(),
            mode: ScratchMode::default(),
            max_cards: 10,
            pool_items: CapacityPool::new(vec![
                CapacityUnit::new(1, "Grand Prize", "", 1),
                CapacityUnit::new(2, "First Prize", "", 2),
                CapacityUnit::new(3, "Second Prize", "", 3),
                CapacityUnit::new(4, "Third Prize", "", 5),
                CapacityUnit::new(5, "Thanks for playing", "", 20).losing(),
            ]),
            next_item_id: 6,
            weight_items: vec![
                weight_row("Big Prize", 5, true),
                weight_row("Medium Prize", 15, true),
                weight_row("Small Prize", 30, true),
                weight_row("Thanks for playing", 50, false),
            ],
            session_results: Vec::new(),
            current_prize: None,
            is_revealed: false,
            scratched_count: 0,
        }
    }
}

/// Scratch cards over a persistent store
pub struct ScratchController<S: StateStore> {
    store: GameStore<S>,
    state: ScratchState,
    logs: AuditLog,
    rng: StdRng,
    sink: Arc<dyn NotificationSink>,
}

impl<S: StateStore> ScratchController<S> {
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
            rng,
            sink,
        }
    }

    pub fn state(&self) -> &ScratchState {
        &self.state
    }

    pub fn logs(&self) -> &AuditLog {
        &self.logs
    }

    /// Prize hidden under the current card, if one is prepared
    pub fn current(&self) -> Option<&CardPrize> {
        self.state.current_prize.as_ref()
    }

    /// Cards left in this session; `None` when unlimited
    pub fn cards_remaining(&self) -> Option<u32> {
        if self.state.max_cards == 0 {
            None
        } else {
            Some(
                self.state
                    .max_cards
                    .saturating_sub(self.state.scratched_count),
            )
        }
    }

    /// Prepare the next card, deciding its prize up front
    ///
    /// No-ops (returning `false`) while an unrevealed card is on the
    /// table, when the session limit is hit, and when nothing can be
    /// drawn.
    pub fn prepare_card(&mut self) -> bool {
        if self.state.current_prize.is_some() && !self.state.is_revealed {
            return false;
        }
        if self.cards_remaining() == Some(0) {
            self.sink.toast(Severity::Warning, "Card limit reached");
            return false;
        }

        let prize = match self.state.mode {
            ScratchMode::Pool => match self.state.pool_items.peek(&mut self.rng) {
                Ok(unit) => CardPrize {
                    prize: unit.name.clone(),
                    is_win: unit.is_win,
                    unit_id: Some(unit.id),
                },
                Err(_) => {
                    self.sink.toast(Severity::Warning, "No cards left");
                    return false;
                }
            },
            ScratchMode::Weight => {
                match draw_prize(&mut self.rng, &self.state.weight_items, 0) {
                    PrizeOutcome::Win(row) => CardPrize {
                        prize: row.prize,
                        is_win: row.is_win,
                        unit_id: None,
                    },
                    PrizeOutcome::Miss => {
                        self.sink.toast(Severity::Warning, "Prize table is empty");
                        return false;
                    }
                }
            }
        };

        self.state.current_prize = Some(prize);
        self.state.is_revealed = false;
        self.store.save_state(&self.state);
        true
    }

    /// Commit the current card once the foil threshold is crossed
    ///
    /// Idempotent: a card reveals once, later calls return `None`.
    pub fn reveal(&mut self) -> Option<SessionResult> {
        if self.state.is_revealed {
            return None;
        }
        let card = self.state.current_prize.clone()?;

        self.state.is_revealed = true;
        self.state.scratched_count += 1;

        if let Some(id) = card.unit_id {
            if self.state.pool_items.consume(id).is_err() {
                log::warn!("scratch: pool unit {id} vanished before reveal");
            }
        }

        let result = SessionResult {
            prize: card.prize.clone(),
            is_win: card.is_win,
        };
        self.state.session_results.push(result.clone());
        self.logs.append("scratch", &card.prize);
        self.store.save_state(&self.state);
        self.store.save_logs(&self.logs);

        if card.is_win {
            self.sink
                .toast(Severity::Success, &format!("You won: {}", card.prize));
        } else {
            self.sink.toast(Severity::Info, &card.prize);
        }
        Some(result)
    }

    /// Start a fresh session
    ///
    /// Session results and the card counter clear; pool stock stays
    /// consumed.
    pub fn new_session(&mut self) {
        self.state.session_results.clear();
        self.state.scratched_count = 0;
        self.state.current_prize = None;
        self.state.is_revealed = false;
        self.store.save_state(&self.state);
        self.sink.toast(Severity::Info, "New session started");
    }

    pub fn set_mode(&mut self, mode: ScratchMode) {
        self.state.mode = mode;
        self.store.save_state(&self.state);
    }

    pub fn set_max_cards(&mut self, max_cards: u32) {
        self.state.max_cards = max_cards;
        self.store.save_state(&self.state);
    }

    /// Apply the pool settings sheet; consumed counts survive resizing
    pub fn apply_pool_settings(&mut self, rows: &[UnitSettings]) {
        let ScratchState {
            pool_items,
            next_item_id,
            ..
        } = &mut self.state;
        pool_items.apply_settings(rows, next_item_id);
        self.store.save_state(&self.state);
        self.sink.toast(Severity::Success, "Settings saved");
    }

    /// Replace the weight table (losing entries are explicit rows)
    pub fn apply_weight_settings(&mut self, items: Vec<WeightedPrize>) {
        self.state.weight_items = items;
        self.store.save_state(&self.state);
        self.sink.toast(Severity::Success, "Settings saved");
    }

    /// Back to defaults, history included
    pub fn reset(&mut self) {
        self.state = ScratchState::default();
        self.logs.clear();
        self.store.save_state(&self.state);
        self.store.save_logs(&self.logs);
        self.sink.toast(Severity::Info, "Scratch game reset");
    }

    /// Validate and apply a snapshot; live state is untouched on failure
    pub fn import(&mut self, raw_json: &str) -> LdResult<()> {
        match snapshot::import_snapshot::<ScratchState>(
            raw_json,
            VERSION,
            REQUIRED_FIELDS,
            &ScratchState::default(),
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
            snapshot::export_filename("scratch"),
            snapshot::export_text(&payload),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ld_core::{LdError, NullSink};
    use ld_state::MemoryStore;

    fn controller() -> ScratchController<Arc<MemoryStore>> {
        ScratchController::with_rng(
            Arc::new(MemoryStore::new()),
            Arc::new(NullSink),
            StdRng::seed_from_u64(17),
        )
    }

    #[test]
    fn test_prepare_decides_without_consuming() {
        let mut c = controller();
        let before = c.state().pool_items.remaining_total();

        assert!(c.prepare_card());
        assert!(c.current().is_some());
        assert_eq!(c.state().pool_items.remaining_total(), before);

        let result = c.reveal().unwrap();

        assert_eq!(c.state().pool_items.remaining_total(), before - 1);
        assert_eq!(c.state().scratched_count, 1);
        assert_eq!(c.state().session_results, vec![result]);
        assert_eq!(c.logs().entries()[0].action, "scratch");
    }

    #[test]
    fn test_reveal_is_idempotent() {
        let mut c = controller();
        c.prepare_card();
        assert!(c.reveal().is_some());
        assert!(c.reveal().is_none());
        assert_eq!(c.state().scratched_count, 1);
    }

    #[test]
    fn test_unrevealed_card_blocks_the_next_one() {
        let mut c = controller();
        c.prepare_card();
        let decided = c.current().cloned();

        assert!(!c.prepare_card());
        assert_eq!(c.current().cloned(), decided);
    }

    #[test]
    fn test_session_card_limit() {
        let mut c = controller();
        c.set_max_cards(2);

        for _ in 0..2 {
            assert!(c.prepare_card());
            c.reveal();
        }

        assert_eq!(c.cards_remaining(), Some(0));
        assert!(!c.prepare_card());
        assert_eq!(c.state().scratched_count, 2);
    }

    #[test]
    fn test_zero_max_cards_means_unlimited() {
        let mut c = controller();
        c.set_max_cards(0);
        assert_eq!(c.cards_remaining(), None);

        for _ in 0..15 {
            assert!(c.prepare_card());
            c.reveal();
        }
        assert_eq!(c.state().scratched_count, 15);
    }

    #[test]
    fn test_losing_entries_are_recorded_as_losses() {
        let mut c = controller();
        c.set_mode(ScratchMode::Weight);
        c.apply_weight_settings(vec![weight_row("Thanks for playing", 10, false)]);

        c.prepare_card();
        let result = c.reveal().unwrap();

        assert!(!result.is_win);
        assert_eq!(result.prize, "Thanks for playing");
    }

    #[test]
    fn test_empty_weight_table_refuses_a_card() {
        let mut c = controller();
        c.set_mode(ScratchMode::Weight);
        c.apply_weight_settings(Vec::new());
        assert!(!c.prepare_card());
    }

    #[test]
    fn test_new_session_keeps_pool_depletion() {
        let mut c = controller();
        c.prepare_card();
        c.reveal();
        let remaining = c.state().pool_items.remaining_total();

        c.new_session();

        assert!(c.state().session_results.is_empty());
        assert_eq!(c.state().scratched_count, 0);
        assert!(c.current().is_none());
        assert_eq!(c.state().pool_items.remaining_total(), remaining);
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
        assert!(filename.starts_with("scratch_"));
    }
}
