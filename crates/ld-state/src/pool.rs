//! Capacity-mode draw pool
//!
//! Units carry a finite starting count that depletes as draws consume it.
//! Depleted units become unselectable in place but stay in the inventory;
//! configuration never silently deletes them.

use rand::Rng;
use serde::{Deserialize, Serialize};

use ld_core::{LdError, LdResult, Weighted, pick_weighted};

/// A prize/slot with a finite starting count
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapacityUnit {
    pub id: u32,
    /// Prize name shown to the user
    pub name: String,
    /// Display tag: capsule color for gacha, reel symbol for slot
    pub tag: String,
    pub total: u32,
    pub remaining: u32,
    /// Scratch pools carry explicit non-winning entries
    #[serde(default = "default_is_win")]
    pub is_win: bool,
}

fn default_is_win() -> bool {
    true
}

impl CapacityUnit {
    pub fn new(id: u32, name: &str, tag: &str, total: u32) -> Self {
        Self {
            id,
            name: name.to_string(),
            tag: tag.to_string(),
            total,
            remaining: total,
            is_win: true,
        }
    }

    /// Mark as a non-winning entry (scratch "thanks for playing")
    pub fn losing(mut self) -> Self {
        self.is_win = false;
        self
    }

    /// How many of this unit have been consumed
    pub fn drawn_count(&self) -> u32 {
        self.total.saturating_sub(self.remaining)
    }
}

/// One row of a settings update
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitSettings {
    /// `None` appends a new unit
    pub id: Option<u32>,
    pub name: String,
    pub tag: String,
    pub total: u32,
    pub is_win: bool,
}

impl UnitSettings {
    pub fn new(id: Option<u32>, name: &str, tag: &str, total: u32) -> Self {
        Self {
            id,
            name: name.to_string(),
            tag: tag.to_string(),
            total,
            is_win: true,
        }
    }
}

/// Capacity-mode pool with single-level undo
///
/// Serializes as the bare unit array; the undo slot is session-local and
/// never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CapacityPool {
    units: Vec<CapacityUnit>,
    #[serde(skip)]
    last_drawn: Option<u32>,
}

impl CapacityPool {
    pub fn new(units: Vec<CapacityUnit>) -> Self {
        Self {
            units,
            last_drawn: None,
        }
    }

    pub fn units(&self) -> &[CapacityUnit] {
        &self.units
    }

    /// Total remaining across all units, recomputed on every call
    pub fn remaining_total(&self) -> u32 {
        self.units.iter().map(|u| u.remaining).sum()
    }

    /// Total configured capacity
    pub fn grand_total(&self) -> u32 {
        self.units.iter().map(|u| u.total).sum()
    }

    /// The unit remembered for undo, if any
    pub fn last_drawn(&self) -> Option<&CapacityUnit> {
        self.last_drawn
            .and_then(|id| self.units.iter().find(|u| u.id == id))
    }

    /// Select a unit weighted by its remaining count, without mutating
    ///
    /// The total weight is recomputed from current state on every call.
    /// Used to decide an outcome before a timed reveal; pair with
    /// [`consume`](Self::consume) to commit it.
    pub fn peek<R: Rng + ?Sized>(&self, rng: &mut R) -> LdResult<CapacityUnit> {
        let weighted: Vec<Weighted<u32>> = self
            .units
            .iter()
            .filter(|u| u.remaining > 0)
            .map(|u| Weighted::new(u.id, u.remaining as f64))
            .collect();

        let id = *pick_weighted(rng, &weighted).ok_or(LdError::EmptyPool)?;
        self.units
            .iter()
            .find(|u| u.id == id)
            .cloned()
            .ok_or(LdError::EmptyPool)
    }

    /// Commit a previously selected draw: decrement `remaining` and
    /// remember the unit for exactly one level of undo (a later commit
    /// discards the previous undo target)
    pub fn consume(&mut self, id: u32) -> LdResult<CapacityUnit> {
        let unit = self
            .units
            .iter_mut()
            .find(|u| u.id == id && u.remaining > 0)
            .ok_or(LdError::EmptyPool)?;
        unit.remaining -= 1;
        let snapshot = unit.clone();
        self.last_drawn = Some(id);
        Ok(snapshot)
    }

    /// Draw one unit, weighted by its remaining count
    pub fn draw<R: Rng + ?Sized>(&mut self, rng: &mut R) -> LdResult<CapacityUnit> {
        let selected = self.peek(rng)?;
        self.consume(selected.id)
    }

    /// Reverse exactly the last draw
    pub fn undo(&mut self) -> LdResult<CapacityUnit> {
        let id = self.last_drawn.take().ok_or(LdError::NothingToUndo)?;
        let unit = self
            .units
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or(LdError::NothingToUndo)?;
        unit.remaining = (unit.remaining + 1).min(unit.total);
        Ok(unit.clone())
    }

    /// Append a new unit, returning its id
    pub fn add_unit(&mut self, next_id: u32, name: &str, tag: &str, total: u32) -> u32 {
        self.units.push(CapacityUnit::new(next_id, name, tag, total));
        next_id
    }

    /// Remove a unit by id
    pub fn remove_unit(&mut self, id: u32) {
        self.units.retain(|u| u.id != id);
        if self.last_drawn == Some(id) {
            self.last_drawn = None;
        }
    }

    /// Apply a settings update
    ///
    /// When a unit's configured total changes, the consumed count is
    /// preserved: `remaining = max(0, new_total - already_drawn)`. Rows
    /// without an id append; units absent from the rows are removed.
    pub fn apply_settings(&mut self, rows: &[UnitSettings], next_id: &mut u32) {
        let mut updated: Vec<CapacityUnit> = Vec::with_capacity(rows.len());

        for row in rows {
            match row.id.and_then(|id| self.units.iter().find(|u| u.id == id)) {
                Some(existing) => {
                    let drawn = existing.drawn_count();
                    let remaining = row.total.saturating_sub(drawn);
                    updated.push(CapacityUnit {
                        id: existing.id,
                        name: row.name.clone(),
                        tag: row.tag.clone(),
                        total: row.total,
                        remaining,
                        is_win: row.is_win,
                    });
                }
                None => {
                    let id = *next_id;
                    *next_id += 1;
                    let mut unit = CapacityUnit::new(id, &row.name, &row.tag, row.total);
                    unit.is_win = row.is_win;
                    updated.push(unit);
                }
            }
        }

        if let Some(id) = self.last_drawn {
            if !updated.iter().any(|u| u.id == id) {
                self.last_drawn = None;
            }
        }
        self.units = updated;
    }

    /// Restore every unit to its full configured count
    pub fn reset_all(&mut self) {
        for unit in &mut self.units {
            unit.remaining = unit.total;
        }
        self.last_drawn = None;
    }
}
