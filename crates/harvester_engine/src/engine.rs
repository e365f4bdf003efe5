//! The harvest orchestrator.
//!
//! A [`Harvester`] owns the busy flag and runs one harvest at a time. Each call
//! acquires a fresh renderer from its backend and closes it on every exit path
//! before any result is returned.

use std::ops::Range;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use engine_logging::{engine_debug, engine_error, engine_info, engine_warn};
use harvester_core::{merge, Corpus, PollReport, Record};

use crate::extract::{Extractor, RecordExtractor};
use crate::poll::{await_surface, run_poll};
use crate::progress::{LogProgressSink, ProgressSink};
use crate::render::{RenderBackend, Renderer};
use crate::reveal::{reveal_more, RevealOutcome};
use crate::settings::{HarvestSettings, SettingsError};
use crate::snapshot::{load_corpus, save_corpus};
use crate::store::SnapshotStore;
use crate::{FailureKind, HarvestError, HarvestEvent, HarvestKind, RenderError, Stage};

/// Supplies the envelope timestamp.
pub type Clock = Arc<dyn Fn() -> String + Send + Sync>;

/// Result of seeding the corpus.
#[derive(Debug, Clone, PartialEq)]
pub struct InitialHarvest {
    pub records: Vec<Record>,
    pub poll: PollReport,
}

/// Result of one reveal-more pass merged into the stored corpus.
#[derive(Debug, Clone, PartialEq)]
pub struct IncrementalHarvest {
    pub corpus: Corpus,
    /// Records admitted by the merge. Zero is a successful no-op.
    pub added: usize,
    /// Records extracted from the new range before deduplication.
    pub extracted: usize,
    pub reveal: RevealOutcome,
}

pub struct Harvester {
    settings: HarvestSettings,
    backend: Arc<dyn RenderBackend>,
    store: Arc<dyn SnapshotStore>,
    sink: Arc<dyn ProgressSink>,
    extractor: RecordExtractor,
    clock: Clock,
    busy: AtomicBool,
}

impl Harvester {
    pub fn new(
        settings: HarvestSettings,
        backend: Arc<dyn RenderBackend>,
        store: Arc<dyn SnapshotStore>,
    ) -> Result<Self, SettingsError> {
        let extractor = RecordExtractor::new(settings.extraction_defaults()?);
        Ok(Self {
            settings,
            backend,
            store,
            sink: Arc::new(LogProgressSink),
            extractor,
            clock: Arc::new(|| chrono::Utc::now().to_rfc3339()),
            busy: AtomicBool::new(false),
        })
    }

    pub fn with_sink(mut self, sink: Arc<dyn ProgressSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Whether a harvest of either kind is running right now.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    pub fn settings(&self) -> &HarvestSettings {
        &self.settings
    }

    /// Reveal up to `target` items from a fresh surface and store them as a new
    /// corpus, replacing whatever was stored before. A pass that yields no
    /// records fails with [`FailureKind::NothingExtracted`] and writes nothing.
    pub async fn initial_harvest(&self, target: usize) -> Result<InitialHarvest, HarvestError> {
        let kind = HarvestKind::Initial;
        if target == 0 {
            return Err(HarvestError::new(
                FailureKind::InvalidTarget,
                "initial harvest target must be at least 1",
            ));
        }
        let _guard = self.acquire()?;
        engine_info!("initial harvest of up to {target} items from {}", self.settings.target_url);

        let mut renderer = self.launch(kind).await?;
        let result = self.poll_and_extract(renderer.as_mut(), target).await;
        renderer.close().await;
        if let Err(err) = &result {
            engine_error!("initial harvest failed: {err}");
        }
        let harvest = result?;

        if harvest.records.is_empty() {
            engine_warn!(
                "initial harvest extracted nothing from {} items; stored corpus kept",
                harvest.poll.ready
            );
            return Err(HarvestError::new(
                FailureKind::NothingExtracted,
                format!("no records among {} revealed items", harvest.poll.ready),
            ));
        }

        let corpus = Corpus::seeded(
            harvest.records.clone(),
            &self.settings.target_url,
            (self.clock)(),
        );
        self.stage(kind, Stage::Persisting);
        save_corpus(self.store.as_ref(), &corpus)?;
        self.sink.emit(HarvestEvent::Completed {
            kind,
            extracted: harvest.records.len(),
            added: harvest.records.len(),
            corpus_len: corpus.products.len(),
        });
        self.stage(kind, Stage::Done);
        Ok(harvest)
    }

    /// Activate the expansion control once, extract only the items it revealed
    /// and merge them into the stored corpus.
    pub async fn incremental_harvest(&self) -> Result<IncrementalHarvest, HarvestError> {
        let kind = HarvestKind::Incremental;
        let _guard = self.acquire()?;

        let existing = match load_corpus(self.store.as_ref())? {
            Some(corpus) if !corpus.is_empty() => corpus,
            _ => {
                return Err(HarvestError::new(
                    FailureKind::CorpusMissing,
                    "no stored corpus to extend; run an initial harvest first",
                ))
            }
        };
        engine_info!(
            "incremental harvest over {} stored records",
            existing.products.len()
        );

        let mut renderer = self.launch(kind).await?;
        let result = self.reveal_and_extract(renderer.as_mut()).await;
        renderer.close().await;
        if let Err(err) = &result {
            engine_error!("incremental harvest failed: {err}");
        }
        let (batch, reveal) = result?;

        self.stage(kind, Stage::Merging);
        let extracted = batch.len();
        let outcome = merge(existing.products, batch);
        if outcome.is_noop() {
            engine_info!("reveal-more pass added nothing new ({reveal:?})");
        }
        let corpus = Corpus::grown(
            outcome.corpus,
            outcome.added,
            &self.settings.target_url,
            (self.clock)(),
        );

        self.stage(kind, Stage::Persisting);
        save_corpus(self.store.as_ref(), &corpus)?;
        self.sink.emit(HarvestEvent::Completed {
            kind,
            extracted,
            added: outcome.added,
            corpus_len: corpus.products.len(),
        });
        self.stage(kind, Stage::Done);

        Ok(IncrementalHarvest {
            corpus,
            added: outcome.added,
            extracted,
            reveal,
        })
    }

    fn acquire(&self) -> Result<BusyGuard<'_>, HarvestError> {
        BusyGuard::try_acquire(&self.busy).ok_or_else(|| {
            engine_warn!("harvest rejected: another harvest is in progress");
            HarvestError::new(
                FailureKind::ConcurrentHarvestRejected,
                "a harvest is already in progress",
            )
        })
    }

    async fn launch(&self, kind: HarvestKind) -> Result<Box<dyn Renderer>, HarvestError> {
        self.stage(kind, Stage::Launching);
        self.backend.launch().await.map_err(|err| {
            let err = HarvestError::new(FailureKind::RenderingUnavailable, err.to_string());
            engine_error!("{kind} harvest failed: {err}");
            err
        })
    }

    async fn load_surface(&self, renderer: &mut dyn Renderer) -> Result<(), HarvestError> {
        let surface = self.settings.surface_spec();
        renderer
            .load(&surface)
            .await
            .map_err(|err| HarvestError::new(FailureKind::SurfaceNotFound, err.to_string()))?;
        let container = await_surface(
            renderer,
            &surface,
            self.settings.surface_wait(),
            self.settings.surface_poll(),
        )
        .await
        .map_err(rendering_failed)?;
        match container {
            Some(container) => {
                engine_debug!("surface ready under {container}");
                Ok(())
            }
            None => Err(HarvestError::new(
                FailureKind::SurfaceNotFound,
                format!(
                    "none of {:?} appeared within {:?}",
                    surface.containers,
                    self.settings.surface_wait()
                ),
            )),
        }
    }

    async fn poll_and_extract(
        &self,
        renderer: &mut dyn Renderer,
        target: usize,
    ) -> Result<InitialHarvest, HarvestError> {
        let kind = HarvestKind::Initial;
        self.stage(kind, Stage::LoadingSurface);
        self.load_surface(renderer).await?;

        self.stage(kind, Stage::Revealing);
        let poll = run_poll(
            renderer,
            self.settings.poll_settings(target),
            &self.settings.controls,
            self.sink.as_ref(),
        )
        .await
        .map_err(rendering_failed)?;
        engine_info!(
            "poll ended ({}) with {} ready of {} revealed after {} steps",
            poll.termination,
            poll.ready,
            poll.revealed,
            poll.steps
        );

        self.stage(kind, Stage::Extracting);
        let records = self.extract_range(renderer, 0..poll.ready).await?;
        Ok(InitialHarvest { records, poll })
    }

    async fn reveal_and_extract(
        &self,
        renderer: &mut dyn Renderer,
    ) -> Result<(Vec<Record>, RevealOutcome), HarvestError> {
        let kind = HarvestKind::Incremental;
        self.stage(kind, Stage::LoadingSurface);
        self.load_surface(renderer).await?;

        // Bring the surface to the same state an initial harvest leaves it in.
        self.stage(kind, Stage::Revealing);
        let poll = run_poll(
            renderer,
            self.settings.poll_settings(self.settings.initial_target),
            &self.settings.controls,
            self.sink.as_ref(),
        )
        .await
        .map_err(rendering_failed)?;
        engine_debug!("base poll ended ({}) at {} items", poll.termination, poll.revealed);
        if poll.revealed > poll.ready {
            engine_debug!(
                "items {}..{} were shown up front and are outside this pass",
                poll.ready,
                poll.revealed
            );
        }

        self.stage(kind, Stage::Expanding);
        let reveal = reveal_more(
            renderer,
            &self.settings.controls,
            &self.settings.reveal_settings(),
        )
        .await
        .map_err(rendering_failed)?;

        self.stage(kind, Stage::Extracting);
        let records = self.extract_range(renderer, reveal.new_range()).await?;
        Ok((records, reveal))
    }

    /// Extract the items in `range` in revealed order, skipping rejected ones.
    async fn extract_range(
        &self,
        renderer: &mut dyn Renderer,
        range: Range<usize>,
    ) -> Result<Vec<Record>, HarvestError> {
        if range.is_empty() {
            return Ok(Vec::new());
        }
        let start = range.start;
        let fragments = renderer
            .item_fragments(range)
            .await
            .map_err(rendering_failed)?;

        let mut records = Vec::with_capacity(fragments.len());
        for (offset, fragment) in fragments.iter().enumerate() {
            let index = start + offset + 1;
            match self.extractor.extract(fragment, index) {
                Ok(record) => records.push(record),
                Err(rejection) => engine_debug!("skipped item {index}: {rejection}"),
            }
        }
        engine_info!(
            "extracted {} records from {} items",
            records.len(),
            fragments.len()
        );
        Ok(records)
    }

    fn stage(&self, kind: HarvestKind, stage: Stage) {
        self.sink.emit(HarvestEvent::Stage { kind, stage });
    }
}

fn rendering_failed(err: RenderError) -> HarvestError {
    HarvestError::new(FailureKind::RenderingFailed, err.to_string())
}

/// Holds the busy flag for one harvest and clears it on drop.
struct BusyGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> BusyGuard<'a> {
    fn try_acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}
