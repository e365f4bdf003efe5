//! Harvester core: record model, duplicate-safe merging, and the pure
//! convergence-poller state machine.
mod effect;
mod merge;
mod msg;
mod normalize;
pub mod query;
mod record;
mod report;
mod signature;
mod state;
mod update;

pub use effect::Effect;
pub use merge::{merge, MergeOutcome};
pub use msg::Msg;
pub use normalize::{absolutize, BaseOrigin, OriginError};
pub use record::{Corpus, Provenance, Record, SCRAPER_VERSION, UNKNOWN_TITLE};
pub use report::{ImageTally, PollReport, RevealProgress, Termination};
pub use signature::Signature;
pub use state::{PollPhase, PollSettings, PollState};
pub use update::update;
