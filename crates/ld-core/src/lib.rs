//! ld-core: shared core for the lucky-draw mini-game family
//!
//! Leaf crate with no game-specific knowledge:
//! - Error taxonomy (`LdError` / `LdResult`)
//! - Random selection primitives (uniform pick, weighted pick, shuffle)
//! - Notification sink contract for user-visible outcomes
//! - Epoch-ms clock helpers

pub mod clock;
pub mod error;
pub mod notify;
pub mod random;

pub use clock::*;
pub use error::*;
pub use notify::*;
pub use random::*;
