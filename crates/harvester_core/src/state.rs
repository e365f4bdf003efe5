use std::time::Duration;

use crate::report::{ImageTally, RevealProgress};

/// Knobs bounding a single poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollSettings {
    /// Reveal at most this many items in one call.
    pub target: usize,
    /// Start probing for an expansion control once this many items are revealed.
    pub control_threshold: usize,
    /// Reveal-position increment per step.
    pub reveal_step: u32,
    pub settle: Duration,
    pub max_steps: u32,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            target: 12,
            control_threshold: 8,
            reveal_step: 400,
            settle: Duration::from_millis(1_500),
            max_steps: 20,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PollPhase {
    #[default]
    Idle,
    Probing,
    Incrementing,
    /// Target reached; waiting on one last image tally before finishing.
    StableAtCap,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum Awaiting {
    #[default]
    Nothing,
    Count,
    Images,
    Control,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollState {
    pub(crate) settings: PollSettings,
    pub(crate) phase: PollPhase,
    pub(crate) awaiting: Awaiting,
    pub(crate) revealed: usize,
    pub(crate) steps: u32,
    pub(crate) images: Option<ImageTally>,
}

impl PollState {
    pub fn new(settings: PollSettings) -> Self {
        Self {
            settings,
            phase: PollPhase::Idle,
            awaiting: Awaiting::Nothing,
            revealed: 0,
            steps: 0,
            images: None,
        }
    }

    pub fn phase(&self) -> PollPhase {
        self.phase
    }

    pub fn revealed(&self) -> usize {
        self.revealed
    }

    pub fn steps(&self) -> u32 {
        self.steps
    }

    pub fn settings(&self) -> &PollSettings {
        &self.settings
    }

    pub(crate) fn progress(&self) -> RevealProgress {
        RevealProgress {
            revealed: self.revealed,
            target: self.settings.target,
            step: self.steps,
            images: self.images.unwrap_or_default(),
        }
    }
}
