//! Reveal choreography
//!
//! A timed game decides its outcome up front and stretches the reveal
//! over a fixed schedule of labeled steps. The caller drives the clock:
//! each [`RevealTimeline::advance`] reports the steps that just came due,
//! and completion is the controller's cue to commit the outcome.

use serde::{Deserialize, Serialize};

/// Playback speed for reveal schedules
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RevealProfile {
    /// Real-time animation pacing
    #[default]
    Normal,
    /// Every step due immediately; the first tick completes the reveal
    Instant,
}

impl RevealProfile {
    pub fn scale(self) -> f64 {
        match self {
            Self::Normal => 1.0,
            Self::Instant => 0.0,
        }
    }
}

/// One scheduled point in a reveal
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RevealStep {
    pub label: &'static str,
    /// Offset from the start of the reveal
    pub at_ms: f64,
}

/// A fixed schedule of reveal steps driven by an external clock
#[derive(Debug, Clone)]
pub struct RevealTimeline {
    steps: Vec<RevealStep>,
    elapsed_ms: f64,
    next: usize,
}

impl RevealTimeline {
    /// Build from `(label, offset_ms)` pairs, scaled by the profile
    pub fn new(profile: RevealProfile, schedule: &[(&'static str, f64)]) -> Self {
        let scale = profile.scale();
        let mut steps: Vec<RevealStep> = schedule
            .iter()
            .map(|&(label, at_ms)| RevealStep {
                label,
                at_ms: at_ms * scale,
            })
            .collect();
        steps.sort_by(|a, b| a.at_ms.total_cmp(&b.at_ms));
        Self {
            steps,
            elapsed_ms: 0.0,
            next: 0,
        }
    }

    /// Advance the clock, returning labels of steps that just came due
    pub fn advance(&mut self, delta_ms: f64) -> Vec<&'static str> {
        self.elapsed_ms += delta_ms.max(0.0);
        let mut fired = Vec::new();
        while self.next < self.steps.len() && self.steps[self.next].at_ms <= self.elapsed_ms {
            fired.push(self.steps[self.next].label);
            self.next += 1;
        }
        fired
    }

    pub fn is_complete(&self) -> bool {
        self.next == self.steps.len()
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed_ms
    }

    /// Offset of the final step
    pub fn duration_ms(&self) -> f64 {
        self.steps.last().map_or(0.0, |s| s.at_ms)
    }
}
