//! Weight-mode prize tables
//!
//! Unlike capacity mode, weight mode never depletes: every draw samples a
//! fixed table, and a configurable miss band makes "no prize" a possible
//! outcome.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// A prize with an explicit draw weight
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightedPrize {
    /// Reel symbol id (slot) or empty for scratch cards
    #[serde(default)]
    pub symbol: String,
    pub prize: String,
    pub weight: u32,
    /// Scratch cards carry explicit non-winning entries
    #[serde(default = "default_is_win")]
    pub is_win: bool,
}

fn default_is_win() -> bool {
    true
}

/// Outcome of a weight-mode draw
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrizeOutcome {
    Win(WeightedPrize),
    Miss,
}

/// Draw against the table plus a miss band
///
/// One draw from `[0, total + miss_weight)`; weights accumulate in
/// declaration order, and anything past the table's total falls into the
/// miss band. With `miss_weight == 0` the table always wins (provided it
/// has any weight at all).
pub fn draw_prize<R: Rng + ?Sized>(
    rng: &mut R,
    items: &[WeightedPrize],
    miss_weight: u32,
) -> PrizeOutcome {
    let table_total: u64 = items.iter().map(|i| i.weight as u64).sum();
    let total = table_total + miss_weight as u64;
    if total == 0 {
        return PrizeOutcome::Miss;
    }

    let r = rng.random_range(0.0..total as f64);
    let mut cumulative = 0.0;
    for item in items {
        cumulative += item.weight as f64;
        if r < cumulative {
            return PrizeOutcome::Win(item.clone());
        }
    }
    PrizeOutcome::Miss
}

/// Three symbols for a miss reveal: uniform draws, re-rolled while all
/// three match so a miss never renders as a winning triple
pub fn miss_symbols<R: Rng + ?Sized>(rng: &mut R, symbols: &[String]) -> [String; 3] {
    // a triple is unavoidable with fewer than two distinct symbols
    let distinct = symbols
        .iter()
        .enumerate()
        .filter(|(i, s)| symbols.iter().position(|o| &o == s) == Some(*i))
        .count();
    if distinct < 2 {
        let s = symbols.first().cloned().unwrap_or_default();
        return [s.clone(), s.clone(), s];
    }
    loop {
        let a = symbols[rng.random_range(0..symbols.len())].clone();
        let b = symbols[rng.random_range(0..symbols.len())].clone();
        let c = symbols[rng.random_range(0..symbols.len())].clone();
        if !(a == b && b == c) {
            return [a, b, c];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn table() -> Vec<WeightedPrize> {
        vec![
            WeightedPrize {
                symbol: "seven".into(),
                prize: "jackpot".into(),
                weight: 5,
                is_win: true,
            },
            WeightedPrize {
                symbol: "star".into(),
                prize: "medium".into(),
                weight: 10,
                is_win: true,
            },
        ]
    }

    #[test]
    fn test_zero_total_is_always_miss() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(draw_prize(&mut rng, &[], 0), PrizeOutcome::Miss);
    }

    #[test]
    fn test_zero_miss_weight_always_wins() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..200 {
            assert!(matches!(
                draw_prize(&mut rng, &table(), 0),
                PrizeOutcome::Win(_)
            ));
        }
    }

    #[test]
    fn test_miss_rate_tracks_miss_weight() {
        // table total 15, miss 85: expect roughly 85% misses
        let mut rng = StdRng::seed_from_u64(77);
        let n = 40_000;
        let misses = (0..n)
            .filter(|_| matches!(draw_prize(&mut rng, &table(), 85), PrizeOutcome::Miss))
            .count();
        let rate = misses as f64 / n as f64;
        assert!((rate - 0.85).abs() < 0.01, "miss rate {rate}");
    }

    #[test]
    fn test_miss_symbols_never_a_triple() {
        let mut rng = StdRng::seed_from_u64(13);
        let symbols: Vec<String> =
            ["seven", "star", "circle"].iter().map(|s| s.to_string()).collect();
        for _ in 0..500 {
            let [a, b, c] = miss_symbols(&mut rng, &symbols);
            assert!(!(a == b && b == c));
        }
    }

    #[test]
    fn test_miss_symbols_duplicate_only_list_terminates() {
        let mut rng = StdRng::seed_from_u64(13);
        let same = vec!["seven".to_string(), "seven".to_string(), "seven".to_string()];
        let [a, b, c] = miss_symbols(&mut rng, &same);
        assert_eq!([a, b, c], ["seven", "seven", "seven"].map(String::from));
    }

    #[test]
    fn test_miss_symbols_degenerate_input() {
        let mut rng = StdRng::seed_from_u64(13);
        let one = vec!["seven".to_string()];
        let [a, b, c] = miss_symbols(&mut rng, &one);
        assert_eq!([a, b, c], ["seven", "seven", "seven"].map(String::from));
    }
}
