#![allow(dead_code)]

use std::collections::VecDeque;
use std::ops::Range;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use harvester_core::ImageTally;
use harvester_engine::{
    ControlHandle, ControlMatchers, HarvestSettings, MemoryStore, PollKnobs, RenderBackend,
    RenderError, Renderer, RevealKnobs, SnapshotStore, StoreError, SurfaceKnobs, SurfaceSpec,
};
use tokio::sync::Notify;

/// Markup for one listing tile the extractor accepts.
pub fn tile(id: &str, title: &str, price: &str) -> String {
    format!(
        r#"<li class="product-item"><div class="cp-product" id="{id}"><h3 class="product-title"><a href="/p/{id}">{title}</a></h3><span data-testid="new-price">{price}</span></div></li>"#
    )
}

pub fn tiles(count: usize) -> Vec<String> {
    (1..=count)
        .map(|n| tile(&format!("sku{n}"), &format!("Brand{n} Model {n}"), &format!("₹{n},000")))
        .collect()
}

/// Settings with every wait shrunk so the poller finishes quickly.
pub fn fast_settings() -> HarvestSettings {
    HarvestSettings {
        poll: PollKnobs {
            settle_ms: 1,
            max_steps: 6,
            ..PollKnobs::default()
        },
        surface: SurfaceKnobs {
            wait_ms: 20,
            poll_ms: 1,
            ..SurfaceKnobs::default()
        },
        reveal: RevealKnobs {
            wait_ms: 50,
            poll_ms: 2,
        },
        ..HarvestSettings::default()
    }
}

/// How one simulated page behaves for a single harvest call.
#[derive(Debug, Clone)]
pub struct SurfacePlan {
    pub items: Vec<String>,
    /// Items rendered right after load.
    pub visible: usize,
    /// Items added by each reveal-position advance.
    pub per_step: usize,
    /// The expansion control shows once this many items are visible.
    pub control_at: Option<usize>,
    /// Items added when the control is activated.
    pub on_activate: usize,
    pub container_present: bool,
}

impl SurfacePlan {
    pub fn new(items: Vec<String>) -> Self {
        let visible = items.len();
        Self {
            items,
            visible,
            per_step: 0,
            control_at: None,
            on_activate: 0,
            container_present: true,
        }
    }

    pub fn visible(mut self, visible: usize) -> Self {
        self.visible = visible;
        self
    }

    pub fn per_step(mut self, per_step: usize) -> Self {
        self.per_step = per_step;
        self
    }

    pub fn control_at(mut self, at: usize, reveals: usize) -> Self {
        self.control_at = Some(at);
        self.on_activate = reveals;
        self
    }

    pub fn without_container(mut self) -> Self {
        self.container_present = false;
        self
    }
}

/// Parks a launch until the test releases it.
#[derive(Default)]
pub struct LaunchGate {
    pub entered: Notify,
    pub release: Notify,
}

#[derive(Default)]
pub struct Counters {
    pub launches: AtomicUsize,
    pub closes: AtomicUsize,
    pub activations: AtomicUsize,
}

/// A rendering backend that replays one [`SurfacePlan`] per launch.
pub struct SimulatedBackend {
    plans: Mutex<VecDeque<SurfacePlan>>,
    gate: Option<Arc<LaunchGate>>,
    unavailable: bool,
    pub counters: Arc<Counters>,
}

impl SimulatedBackend {
    pub fn new(plans: Vec<SurfacePlan>) -> Self {
        Self {
            plans: Mutex::new(plans.into()),
            gate: None,
            unavailable: false,
            counters: Arc::new(Counters::default()),
        }
    }

    pub fn gated(mut self, gate: Arc<LaunchGate>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::new(Vec::new())
        }
    }
}

#[async_trait::async_trait]
impl RenderBackend for SimulatedBackend {
    async fn launch(&self) -> Result<Box<dyn Renderer>, RenderError> {
        if self.unavailable {
            return Err(RenderError::Unavailable("no display available".into()));
        }
        if let Some(gate) = &self.gate {
            gate.entered.notify_one();
            gate.release.notified().await;
        }
        self.counters.launches.fetch_add(1, Ordering::SeqCst);
        let plan = self
            .plans
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| RenderError::Unavailable("no more simulated pages".into()))?;
        Ok(Box::new(SimulatedRenderer {
            plan,
            surface: None,
            counters: self.counters.clone(),
        }))
    }
}

struct SimulatedRenderer {
    plan: SurfacePlan,
    surface: Option<SurfaceSpec>,
    counters: Arc<Counters>,
}

impl SimulatedRenderer {
    fn shown(&self) -> usize {
        self.plan.visible.min(self.plan.items.len())
    }
}

#[async_trait::async_trait]
impl Renderer for SimulatedRenderer {
    async fn load(&mut self, surface: &SurfaceSpec) -> Result<(), RenderError> {
        self.surface = Some(surface.clone());
        Ok(())
    }

    async fn has_element(&mut self, selector: &str) -> Result<bool, RenderError> {
        let surface = self.surface.as_ref().ok_or(RenderError::NotLoaded)?;
        Ok(self.plan.container_present && surface.containers.iter().any(|c| c == selector))
    }

    async fn item_count(&mut self) -> Result<usize, RenderError> {
        Ok(self.shown())
    }

    async fn advance_reveal(&mut self, _by: u32) -> Result<(), RenderError> {
        self.plan.visible += self.plan.per_step;
        Ok(())
    }

    async fn image_tally(&mut self) -> Result<ImageTally, RenderError> {
        Ok(ImageTally {
            resolved: self.shown(),
            pending: 0,
        })
    }

    async fn find_control(
        &mut self,
        _matchers: &ControlMatchers,
    ) -> Result<Option<ControlHandle>, RenderError> {
        let visible = self.plan.control_at.is_some_and(|at| self.shown() >= at);
        Ok(visible.then(|| ControlHandle {
            label: "View More".to_string(),
            locator: None,
        }))
    }

    async fn activate_control(&mut self, _control: &ControlHandle) -> Result<(), RenderError> {
        self.counters.activations.fetch_add(1, Ordering::SeqCst);
        self.plan.visible += self.plan.on_activate;
        Ok(())
    }

    async fn item_fragments(&mut self, range: Range<usize>) -> Result<Vec<String>, RenderError> {
        let shown = self.shown();
        let range = range.start.min(shown)..range.end.min(shown);
        Ok(self.plan.items[range].to_vec())
    }

    async fn close(&mut self) {
        self.counters.closes.fetch_add(1, Ordering::SeqCst);
    }
}

/// Wraps a [`MemoryStore`] and counts every access.
#[derive(Default)]
pub struct CountingStore {
    inner: MemoryStore,
    pub gets: AtomicUsize,
    pub sets: AtomicUsize,
}

impl CountingStore {
    pub fn touches(&self) -> usize {
        self.gets.load(Ordering::SeqCst) + self.sets.load(Ordering::SeqCst)
    }
}

impl SnapshotStore for CountingStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        self.sets.fetch_add(1, Ordering::SeqCst);
        self.inner.set(key, value)
    }
}
