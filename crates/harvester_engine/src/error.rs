use std::fmt;

use crate::types::FetchError;

/// Reason code attached to every failed harvest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// An initial harvest was asked for zero items.
    InvalidTarget,
    /// The rendering capability could not be acquired or started.
    RenderingUnavailable,
    /// The listing container never appeared within the wait ceiling.
    SurfaceNotFound,
    /// The capability failed after the surface was loaded.
    RenderingFailed,
    /// An initial pass yielded no records. The stored corpus is left as it was.
    NothingExtracted,
    /// Another harvest holds the busy flag. Retry later.
    ConcurrentHarvestRejected,
    /// An incremental harvest needs a non-empty stored corpus.
    CorpusMissing,
    StoreUnavailable,
    /// The persisted envelope could not be decoded. Not repaired.
    StoreCorrupt,
}

impl FailureKind {
    pub fn code(self) -> &'static str {
        match self {
            FailureKind::InvalidTarget => "invalid_target",
            FailureKind::RenderingUnavailable => "rendering_unavailable",
            FailureKind::SurfaceNotFound => "surface_not_found",
            FailureKind::RenderingFailed => "rendering_failed",
            FailureKind::NothingExtracted => "nothing_extracted",
            FailureKind::ConcurrentHarvestRejected => "concurrent_harvest_rejected",
            FailureKind::CorpusMissing => "corpus_missing",
            FailureKind::StoreUnavailable => "store_unavailable",
            FailureKind::StoreCorrupt => "store_corrupt",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct HarvestError {
    pub kind: FailureKind,
    pub message: String,
}

impl HarvestError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.kind == FailureKind::ConcurrentHarvestRejected
    }
}

/// Failure reported by a rendering capability.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("rendering backend unavailable: {0}")]
    Unavailable(String),
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),
    #[error("invalid selector {selector:?}: {message}")]
    Selector { selector: String, message: String },
    #[error("no surface loaded")]
    NotLoaded,
    #[error("{0}")]
    Other(String),
}
