use crate::report::ImageTally;

/// Observations fed back into the poller by whoever executes its effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Msg {
    /// Begin polling from the idle state.
    Start,
    /// Number of items currently materialized on the surface.
    CountSampled(usize),
    /// Image resolution tally for the currently visible items.
    ImagesSampled(ImageTally),
    /// Whether a visible, enabled expansion control is present.
    ControlProbed(bool),
}
