//! ld-state: persistent draw-pool state machine
//!
//! Shared state core used by every game in the family:
//! - `KeyedStore` — typed facade over a string-keyed JSON store
//! - `AuditLog` — newest-first, capacity-bounded draw history
//! - `SnapshotIO` — versioned import/export with fail-fast validation
//! - `CapacityPool` / `NamePool` — the two draw-pool shapes, both with
//!   single-level undo
//! - `WeightedPrize` tables for may-miss weight mode

pub mod audit;
pub mod lines;
pub mod name_pool;
pub mod pool;
pub mod prize;
pub mod snapshot;
pub mod store;

pub use audit::*;
pub use lines::*;
pub use name_pool::*;
pub use pool::*;
pub use prize::*;
pub use snapshot::*;
pub use store::*;
