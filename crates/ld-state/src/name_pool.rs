//! Name-pool draw pool
//!
//! Pure pool units: drawn names move from `available` to `drawn`.
//! Invariant: `drawn ∪ available = all_names − blacklist`, membership
//! matched case-insensitively, no duplicates across the partition.

use rand::Rng;
use serde::{Deserialize, Serialize};

use ld_core::{LdError, LdResult};

/// The last draw, with enough context to reverse it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastDraw {
    pub name: String,
    /// Position the name held in `available` before the draw; reinsert
    /// here on undo so wheel segment angles stay stable
    pub index: usize,
}

/// Name pool with single-level undo and blacklist filtering
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NamePool {
    all_names: Vec<String>,
    blacklist: Vec<String>,
    /// Names still eligible for selection
    pool: Vec<String>,
    /// Insertion order = draw order
    drawn: Vec<String>,
    last_drawn: Option<LastDraw>,
}

fn lower_set(names: &[String]) -> Vec<String> {
    names.iter().map(|n| n.to_lowercase()).collect()
}

impl NamePool {
    pub fn new(all_names: Vec<String>) -> Self {
        let mut pool = Self {
            all_names,
            ..Self::default()
        };
        pool.rebuild();
        pool
    }

    pub fn all_names(&self) -> &[String] {
        &self.all_names
    }

    pub fn blacklist(&self) -> &[String] {
        &self.blacklist
    }

    pub fn available(&self) -> &[String] {
        &self.pool
    }

    pub fn drawn(&self) -> &[String] {
        &self.drawn
    }

    pub fn last_drawn(&self) -> Option<&LastDraw> {
        self.last_drawn.as_ref()
    }

    /// Recompute `available = all_names − blacklist − drawn`
    fn rebuild(&mut self) {
        let black = lower_set(&self.blacklist);
        let drawn = lower_set(&self.drawn);
        self.pool = self
            .all_names
            .iter()
            .filter(|name| {
                let lower = name.to_lowercase();
                !black.contains(&lower) && !drawn.contains(&lower)
            })
            .cloned()
            .collect();
    }

    /// Select one name uniformly, without mutating
    ///
    /// Returns the name and its current pool index. Used to decide an
    /// outcome before a timed reveal (the wheel needs the index up front
    /// to aim the landing segment); pair with
    /// [`commit_draw`](Self::commit_draw) to commit it.
    pub fn peek<R: Rng + ?Sized>(&self, rng: &mut R) -> LdResult<(String, usize)> {
        if self.pool.is_empty() {
            return Err(LdError::EmptyPool);
        }
        let index = rng.random_range(0..self.pool.len());
        Ok((self.pool[index].clone(), index))
    }

    /// Commit a previously selected draw: move the name at `index` from
    /// `available` to `drawn` and remember it for undo
    pub fn commit_draw(&mut self, index: usize) -> LdResult<String> {
        if index >= self.pool.len() {
            return Err(LdError::EmptyPool);
        }
        let name = self.pool.remove(index);
        self.drawn.push(name.clone());
        self.last_drawn = Some(LastDraw {
            name: name.clone(),
            index,
        });
        Ok(name)
    }

    /// Draw one name uniformly
    pub fn draw<R: Rng + ?Sized>(&mut self, rng: &mut R) -> LdResult<String> {
        let (_, index) = self.peek(rng)?;
        self.commit_draw(index)
    }

    /// Remember a draw without moving the name (duplicate-allowed mode)
    pub fn mark_drawn_in_place(&mut self, name: &str, index: usize) {
        self.last_drawn = Some(LastDraw {
            name: name.to_string(),
            index,
        });
    }

    /// Reverse exactly the last draw: remove from `drawn`, reinsert into
    /// `available` at the original position
    pub fn undo(&mut self) -> LdResult<String> {
        let last = self.last_drawn.take().ok_or(LdError::NothingToUndo)?;

        if let Some(pos) = self.drawn.iter().rposition(|n| *n == last.name) {
            self.drawn.remove(pos);
            let index = last.index.min(self.pool.len());
            self.pool.insert(index, last.name.clone());
        }
        Ok(last.name)
    }

    /// Replace the full name list; clears drawn history
    pub fn apply_names(&mut self, names: Vec<String>) {
        self.all_names = names;
        self.drawn.clear();
        self.last_drawn = None;
        self.rebuild();
    }

    /// Replace the blacklist and refilter `available`; `drawn` untouched
    pub fn apply_blacklist(&mut self, blacklist: Vec<String>) {
        self.blacklist = blacklist;
        self.rebuild();
    }

    /// Return every drawn name to the pool
    pub fn clear_drawn(&mut self) {
        self.drawn.clear();
        self.last_drawn = None;
        self.rebuild();
    }

    /// Restore the full configured set
    pub fn reset_all(&mut self) {
        self.drawn.clear();
        self.blacklist.clear();
        self.last_drawn = None;
        self.rebuild();
    }

    /// Rebuild `available` after deserialization
    pub fn restore(&mut self) {
        self.rebuild();
    }

    /// Reconcile `all_names` with a stored partition
    ///
    /// Legacy payloads carry only `pool` and `drawn`; any name there that
    /// `all_names` does not know is adopted. The stored `available` order
    /// is kept as-is (it drives wheel segment layout).
    pub fn adopt_partition(&mut self) {
        let mut known = lower_set(&self.all_names);
        for name in self.pool.iter().chain(self.drawn.iter()) {
            let lower = name.to_lowercase();
            if !known.contains(&lower) {
                self.all_names.push(name.clone());
                known.push(lower);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn pool() -> NamePool {
        NamePool::new(names(&["Alice", "Bob", "Carol", "Dave"]))
    }

    #[test]
    fn test_draw_moves_to_drawn() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut pool = pool();

        let name = pool.draw(&mut rng).unwrap();

        assert_eq!(pool.available().len(), 3);
        assert_eq!(pool.drawn(), &[name.clone()]);
        assert!(!pool.available().contains(&name));
    }

    #[test]
    fn test_draw_empty_pool() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut pool = NamePool::new(Vec::new());
        assert_eq!(pool.draw(&mut rng), Err(LdError::EmptyPool));
    }

    #[test]
    fn test_draw_then_undo_restores_exactly() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut pool = pool();
        let before = pool.clone();

        pool.draw(&mut rng).unwrap();
        pool.undo().unwrap();

        assert_eq!(pool.available(), before.available());
        assert_eq!(pool.drawn(), before.drawn());
    }

    #[test]
    fn test_undo_reinserts_at_original_index() {
        let mut pool = pool();
        // force a deterministic draw of the middle name
        let name = pool.available()[2].clone();
        pool.commit_draw(2).unwrap();
        assert_ne!(pool.available().get(2), Some(&name));

        pool.undo().unwrap();
        assert_eq!(pool.available()[2], name);
    }

    #[test]
    fn test_second_undo_fails() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut pool = pool();
        pool.draw(&mut rng).unwrap();
        pool.undo().unwrap();
        assert_eq!(pool.undo().unwrap_err(), LdError::NothingToUndo);
    }

    #[test]
    fn test_blacklist_case_insensitive_and_idempotent() {
        let mut pool = NamePool::new(names(&["alice", "ALICE", "Alice", "Bob"]));

        pool.apply_blacklist(names(&["Alice"]));
        assert_eq!(pool.available(), &["Bob".to_string()]);

        // applying again changes nothing
        pool.apply_blacklist(names(&["Alice"]));
        assert_eq!(pool.available(), &["Bob".to_string()]);
    }

    #[test]
    fn test_blacklist_never_mutates_drawn() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut pool = pool();
        let name = pool.draw(&mut rng).unwrap();

        pool.apply_blacklist(names(&[&name]));

        assert_eq!(pool.drawn(), &[name.clone()]);
        assert!(!pool.available().contains(&name));
    }

    #[test]
    fn test_partition_invariant_after_operations() {
        let mut rng = StdRng::seed_from_u64(6);
        let mut pool = pool();
        pool.apply_blacklist(names(&["Dave"]));
        pool.draw(&mut rng).unwrap();

        let eligible = pool.all_names().len() - pool.blacklist().len();
        assert_eq!(pool.available().len() + pool.drawn().len(), eligible);
    }

    #[test]
    fn test_clear_drawn_returns_everyone() {
        let mut rng = StdRng::seed_from_u64(6);
        let mut pool = pool();
        pool.draw(&mut rng).unwrap();
        pool.draw(&mut rng).unwrap();

        pool.clear_drawn();

        assert_eq!(pool.available().len(), 4);
        assert!(pool.drawn().is_empty());
        assert_eq!(pool.undo().unwrap_err(), LdError::NothingToUndo);
    }

    #[test]
    fn test_adopt_partition_learns_unknown_names() {
        let mut pool: NamePool = serde_json::from_value(serde_json::json!({
            "allNames": [],
            "blacklist": [],
            "pool": ["Coffee", "Tea"],
            "drawn": ["Cake"],
            "lastDrawn": null
        }))
        .unwrap();

        pool.adopt_partition();

        assert_eq!(pool.all_names().len(), 3);
        // stored order untouched
        assert_eq!(pool.available(), &["Coffee".to_string(), "Tea".to_string()]);
        assert_eq!(pool.drawn(), &["Cake".to_string()]);
    }

    #[test]
    fn test_apply_names_clears_history() {
        let mut rng = StdRng::seed_from_u64(6);
        let mut pool = pool();
        pool.draw(&mut rng).unwrap();

        pool.apply_names(names(&["Erin", "Frank"]));

        assert_eq!(pool.available(), &["Erin".to_string(), "Frank".to_string()]);
        assert!(pool.drawn().is_empty());
    }
}
