use std::fmt;

/// How many visible items expose a resolved image versus a pending one.
///
/// Advisory telemetry only; extraction never waits on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ImageTally {
    pub resolved: usize,
    pub pending: usize,
}

impl ImageTally {
    pub fn total(&self) -> usize {
        self.resolved + self.pending
    }

    pub fn is_complete(&self) -> bool {
        self.pending == 0
    }
}

/// Which condition ended a poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// The revealed count reached the target for this call.
    StableAtCap,
    /// A "reveal more" control became visible at or past the threshold.
    FoundExpansionControl,
    /// The step ceiling ran out first.
    MaxStepsExhausted,
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Termination::StableAtCap => write!(f, "stable at cap"),
            Termination::FoundExpansionControl => write!(f, "found expansion control"),
            Termination::MaxStepsExhausted => write!(f, "max steps exhausted"),
        }
    }
}

/// Snapshot emitted each time the revealed count grows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevealProgress {
    pub revealed: usize,
    pub target: usize,
    pub step: u32,
    pub images: ImageTally,
}

/// Final result of one poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollReport {
    /// Items judged ready to extract, never more than the target.
    pub ready: usize,
    /// Items materialized when the poll stopped.
    pub revealed: usize,
    pub termination: Termination,
    pub steps: u32,
    pub images: Option<ImageTally>,
}
