//! Draw-cycle phase gating

/// Where a game sits in its draw cycle
///
/// Draw commands arriving while the cycle is busy are dropped, not
/// queued.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum GamePhase {
    /// Accepting commands
    #[default]
    Idle,
    /// Outcome decided, animation running
    Drawing,
    /// Outcome partially visible (reels stopping, capsule dropped)
    Revealing,
}

impl GamePhase {
    pub fn is_busy(self) -> bool {
        !matches!(self, Self::Idle)
    }
}
