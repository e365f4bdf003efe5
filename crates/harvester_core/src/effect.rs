use std::time::Duration;

use crate::report::{PollReport, RevealProgress};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Read the materialized item count without waiting.
    SampleCount,
    /// Move the reveal position forward, wait `settle`, then read the count.
    AdvanceAndSample { by: u32, settle: Duration },
    SampleImages,
    /// Look for a "reveal more" control. Never activate it.
    ProbeExpansionControl,
    ReportProgress(RevealProgress),
    Finish(PollReport),
}
