//! Random selection primitives
//!
//! Pure functions over finite collections. All of them treat an empty or
//! weightless input as a defined outcome (`None`) rather than an error.

use rand::Rng;

/// An item paired with its draw weight
#[derive(Debug, Clone, PartialEq)]
pub struct Weighted<T> {
    pub item: T,
    pub weight: f64,
}

impl<T> Weighted<T> {
    pub fn new(item: T, weight: f64) -> Self {
        Self { item, weight }
    }
}

/// Pick one element with equal probability 1/n
///
/// Returns `None` on empty input, never panics.
pub fn pick_uniform<'a, T, R: Rng + ?Sized>(rng: &mut R, items: &'a [T]) -> Option<&'a T> {
    if items.is_empty() {
        return None;
    }
    let index = rng.random_range(0..items.len());
    Some(&items[index])
}

/// Pick one element proportionally to its weight
///
/// Draws `r` uniformly from `[0, total)` and scans the items in their
/// given order, subtracting each weight from `r` until it drops to zero
/// or below. Scan order is the tie-break on floating-point boundary
/// equality and must not be replaced by a weight-sorted scan. Returns
/// `None` when the total weight is not positive.
pub fn pick_weighted<'a, T, R: Rng + ?Sized>(
    rng: &mut R,
    items: &'a [Weighted<T>],
) -> Option<&'a T> {
    if items.is_empty() {
        return None;
    }

    let total: f64 = items.iter().map(|w| w.weight).sum();
    if total <= 0.0 {
        return None;
    }

    let mut r = rng.random_range(0.0..total);
    for weighted in items {
        r -= weighted.weight;
        if r <= 0.0 {
            return Some(&weighted.item);
        }
    }

    // Float underflow can leave a sliver of r; the last item absorbs it.
    items.last().map(|w| &w.item)
}

/// Fisher-Yates shuffle on a copy
///
/// Walks from the last index down to 1, swapping with a uniformly chosen
/// earlier-or-equal index. The input is not mutated.
pub fn shuffle<T: Clone, R: Rng + ?Sized>(rng: &mut R, items: &[T]) -> Vec<T> {
    let mut out = items.to_vec();
    for i in (1..out.len()).rev() {
        let j = rng.random_range(0..=i);
        out.swap(i, j);
    }
    out
}
