//! Lucky-draw game controllers
//!
//! Five mini-games over the shared draw-pool state: capsule gacha, name
//! picker, prize wheel, slot machine and scratch cards. Each controller
//! owns its persisted state, its audit log and its reveal choreography,
//! and writes through to the keyed store after every mutation.
//!
//! Timed games decide their outcome when the draw starts and commit it
//! when the reveal finishes, so an interrupted animation never leaves a
//! half-applied draw behind.

pub mod gacha;
pub mod persist;
pub mod phase;
pub mod picker;
pub mod scratch;
pub mod slot;
pub mod timing;
pub mod wheel;

pub use gacha::GachaController;
pub use persist::GameStore;
pub use phase::GamePhase;
pub use picker::PickerController;
pub use scratch::{ScratchController, ScratchMode};
pub use slot::{SlotController, SlotMode, SpinOutcome};
pub use timing::{RevealProfile, RevealStep, RevealTimeline};
pub use wheel::{WheelController, WheelMode};
