//! Harvester engine: rendering capability, effect execution, extraction and
//! persistence around the pure core.
mod decode;
mod engine;
mod error;
mod extract;
mod fetch;
mod persist;
mod poll;
mod progress;
mod render;
mod reveal;
mod settings;
mod snapshot;
mod static_page;
mod store;
mod types;

pub use decode::{decode_html, DecodeError, DecodedHtml};
pub use engine::{Clock, Harvester, IncrementalHarvest, InitialHarvest};
pub use error::{FailureKind, HarvestError, RenderError};
pub use extract::{ExtractionDefaults, Extractor, RecordExtractor, Rejection};
pub use fetch::{FetchSettings, Fetcher, ReqwestFetcher};
pub use persist::{ensure_store_dir, AtomicFileWriter, PersistError};
pub use poll::{await_surface, run_poll};
pub use progress::{ChannelProgressSink, LogProgressSink, ProgressSink};
pub use render::{ControlHandle, ControlMatchers, RenderBackend, Renderer, SurfaceSpec};
pub use reveal::{reveal_more, RevealOutcome, RevealSettings};
pub use settings::{HarvestSettings, PollKnobs, RevealKnobs, SettingsError, SurfaceKnobs};
pub use snapshot::{load_corpus, load_records, save_corpus, ENVELOPE_KEY, PRODUCTS_KEY};
pub use static_page::{StaticPageBackend, StaticPageRenderer};
pub use store::{FileStore, MemoryStore, SnapshotStore, StoreError};
pub use types::{
    FetchError, FetchFailure, FetchMetadata, FetchOutput, HarvestEvent, HarvestKind, Stage,
};
